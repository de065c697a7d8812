use crate::models::BlockProps;
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

/// Named palette entry. `Default` means "unset".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, AsRefStr, EnumIter, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum PaletteColor {
    Default,
    Gray,
    Brown,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    Red,
}

impl PaletteColor {
    pub fn label(self) -> &'static str {
        match self {
            PaletteColor::Default => "Default",
            PaletteColor::Gray => "Gray",
            PaletteColor::Brown => "Brown",
            PaletteColor::Orange => "Orange",
            PaletteColor::Yellow => "Yellow",
            PaletteColor::Green => "Green",
            PaletteColor::Blue => "Blue",
            PaletteColor::Purple => "Purple",
            PaletteColor::Pink => "Pink",
            PaletteColor::Red => "Red",
        }
    }

    pub fn text_css(self) -> Option<&'static str> {
        match self {
            PaletteColor::Default => None,
            PaletteColor::Gray => Some("#787774"),
            PaletteColor::Brown => Some("#9f6b53"),
            PaletteColor::Orange => Some("#d9730d"),
            PaletteColor::Yellow => Some("#cb912f"),
            PaletteColor::Green => Some("#448361"),
            PaletteColor::Blue => Some("#337ea9"),
            PaletteColor::Purple => Some("#9065b0"),
            PaletteColor::Pink => Some("#c14c8a"),
            PaletteColor::Red => Some("#d44c47"),
        }
    }

    pub fn bg_css(self) -> Option<&'static str> {
        match self {
            PaletteColor::Default => None,
            PaletteColor::Gray => Some("#f1f1ef"),
            PaletteColor::Brown => Some("#f4eeee"),
            PaletteColor::Orange => Some("#fbecdd"),
            PaletteColor::Yellow => Some("#fbf3db"),
            PaletteColor::Green => Some("#edf3ec"),
            PaletteColor::Blue => Some("#e7f3f8"),
            PaletteColor::Purple => Some("#f6f3f9"),
            PaletteColor::Pink => Some("#faf1f5"),
            PaletteColor::Red => Some("#fdebec"),
        }
    }

    pub fn lookup(name: &str) -> Option<PaletteColor> {
        name.parse().ok()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorChannel {
    Text,
    Background,
}

impl ColorChannel {
    pub fn label(self) -> &'static str {
        match self {
            ColorChannel::Text => "Text color",
            ColorChannel::Background => "Background",
        }
    }
}

/// Write a palette name into the matching prop. `default` (or an unknown
/// name) clears it.
pub(crate) fn set_color(props: &mut BlockProps, channel: ColorChannel, name: &str) {
    let value = match PaletteColor::lookup(name) {
        Some(PaletteColor::Default) | None => None,
        Some(c) => Some(c.as_ref().to_string()),
    };
    match channel {
        ColorChannel::Text => props.text_color = value,
        ColorChannel::Background => props.bg_color = value,
    }
}

/// Inline style for a block's colors; empty when both are unset.
pub(crate) fn color_style(props: &BlockProps) -> String {
    let mut out = String::new();
    if let Some(css) = props
        .text_color
        .as_deref()
        .and_then(PaletteColor::lookup)
        .and_then(|c| c.text_css())
    {
        out.push_str(&format!("color: {css};"));
    }
    if let Some(css) = props
        .bg_color
        .as_deref()
        .and_then(PaletteColor::lookup)
        .and_then(|c| c.bg_css())
    {
        out.push_str(&format!("background-color: {css};"));
    }
    out
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Swatch {
    pub name: String,
    pub label: &'static str,
    pub css: Option<&'static str>,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorSection {
    pub channel: ColorChannel,
    pub swatches: Vec<Swatch>,
}

/// View fragment for the color picker: one section per channel with the
/// currently applied entry marked.
pub fn color_picker(props: &BlockProps) -> Vec<ColorSection> {
    [ColorChannel::Text, ColorChannel::Background]
        .into_iter()
        .map(|channel| {
            let current = match channel {
                ColorChannel::Text => props.text_color.as_deref(),
                ColorChannel::Background => props.bg_color.as_deref(),
            }
            .unwrap_or(PaletteColor::Default.as_ref());

            let swatches = PaletteColor::iter()
                .map(|c| Swatch {
                    name: c.as_ref().to_string(),
                    label: c.label(),
                    css: match channel {
                        ColorChannel::Text => c.text_css(),
                        ColorChannel::Background => c.bg_css(),
                    },
                    selected: c.as_ref() == current,
                })
                .collect();

            ColorSection { channel, swatches }
        })
        .collect()
}
