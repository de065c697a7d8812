use crate::editor::geometry::Point;
use crate::editor::keys::KeyInput;
use crate::models::BlockType;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlashAction {
    Transform(BlockType),
    /// Listed for discoverability; cannot be selected yet.
    Reserved,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlashCommand {
    pub id: &'static str,
    pub label: &'static str,
    pub keywords: &'static [&'static str],
    pub category: &'static str,
    pub icon: &'static str,
    pub action: SlashAction,
}

impl SlashCommand {
    pub fn disabled(&self) -> bool {
        self.action == SlashAction::Reserved
    }

    fn matches(&self, q: &str) -> bool {
        if q.is_empty() {
            return true;
        }
        self.label.to_lowercase().contains(q) || self.keywords.iter().any(|k| k.contains(q))
    }
}

const BASIC: &str = "Basic blocks";
const LAYOUT: &str = "Layout";
const MEDIA: &str = "Media";

const fn cmd(
    id: &'static str,
    label: &'static str,
    keywords: &'static [&'static str],
    category: &'static str,
    icon: &'static str,
    action: SlashAction,
) -> SlashCommand {
    SlashCommand {
        id,
        label,
        keywords,
        category,
        icon,
        action,
    }
}

pub(crate) static CATALOG: &[SlashCommand] = &[
    cmd("text", "Text", &["paragraph", "plain"], BASIC, "T", SlashAction::Transform(BlockType::Text)),
    cmd("h1", "Heading 1", &["title", "h1", "big"], BASIC, "H1", SlashAction::Transform(BlockType::Heading1)),
    cmd("h2", "Heading 2", &["subtitle", "h2"], BASIC, "H2", SlashAction::Transform(BlockType::Heading2)),
    cmd("h3", "Heading 3", &["h3", "small"], BASIC, "H3", SlashAction::Transform(BlockType::Heading3)),
    cmd("bullet", "Bulleted list", &["ul", "bullet", "unordered"], BASIC, "•", SlashAction::Transform(BlockType::BulletedList)),
    cmd("number", "Numbered list", &["ol", "ordered", "number"], BASIC, "1.", SlashAction::Transform(BlockType::NumberedList)),
    cmd("todo", "To-do list", &["todo", "task", "checkbox"], BASIC, "☐", SlashAction::Transform(BlockType::Todo)),
    cmd("toggle", "Toggle", &["collapse", "disclosure"], BASIC, "▸", SlashAction::Transform(BlockType::Toggle)),
    cmd("quote", "Quote", &["blockquote", "citation"], BASIC, "❝", SlashAction::Transform(BlockType::Quote)),
    cmd("callout", "Callout", &["note", "tip", "info"], BASIC, "💡", SlashAction::Transform(BlockType::Callout)),
    cmd("code", "Code", &["snippet", "pre", "source"], BASIC, "</>", SlashAction::Transform(BlockType::Code)),
    cmd("divider", "Divider", &["hr", "separator", "line"], BASIC, "—", SlashAction::Transform(BlockType::Divider)),
    cmd("page", "Link to page", &["link", "page"], BASIC, "↗", SlashAction::Reserved),
    cmd("cols2", "2 columns", &["columns", "layout", "grid"], LAYOUT, "▥", SlashAction::Transform(BlockType::Columns2)),
    cmd("cols3", "3 columns", &["columns", "layout", "grid"], LAYOUT, "▥", SlashAction::Transform(BlockType::Columns3)),
    cmd("cols4", "4 columns", &["columns", "layout", "grid"], LAYOUT, "▥", SlashAction::Transform(BlockType::Columns4)),
    cmd("cols5", "5 columns", &["columns", "layout", "grid"], LAYOUT, "▥", SlashAction::Transform(BlockType::Columns5)),
    cmd("image", "Image", &["picture", "photo", "media"], MEDIA, "🖼", SlashAction::Reserved),
    cmd("file", "File", &["upload", "attachment", "media"], MEDIA, "📎", SlashAction::Reserved),
];

#[derive(Clone, Debug, PartialEq)]
pub enum PaletteOutcome {
    /// Key not consumed by the palette.
    Ignored,
    Handled,
    Selected(SlashCommand),
    Closed,
}

/// Floating `/` command menu.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SlashPalette {
    block_id: Option<String>,
    anchor: Point,
    filter: String,
    /// Index into [`SlashPalette::visible`]; always an enabled entry.
    selected: Option<usize>,
}

impl SlashPalette {
    pub fn open(&mut self, block_id: &str, anchor: Point) {
        self.block_id = Some(block_id.to_string());
        self.anchor = anchor;
        self.filter.clear();
        self.reset_selection();
    }

    pub fn close(&mut self) {
        self.block_id = None;
        self.filter.clear();
        self.selected = None;
    }

    pub fn is_open(&self) -> bool {
        self.block_id.is_some()
    }

    pub fn block_id(&self) -> Option<&str> {
        self.block_id.as_deref()
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn set_filter(&mut self, q: &str) {
        if self.filter != q {
            self.filter = q.to_string();
            self.reset_selection();
        }
    }

    pub fn visible(&self) -> Vec<&'static SlashCommand> {
        let q = self.filter.trim().to_lowercase();
        CATALOG.iter().filter(|c| c.matches(&q)).collect()
    }

    /// Visible entries grouped by category in catalog order, each paired with
    /// its index into [`SlashPalette::visible`].
    pub fn grouped(&self) -> Vec<(&'static str, Vec<(usize, &'static SlashCommand)>)> {
        let mut out: Vec<(&'static str, Vec<(usize, &'static SlashCommand)>)> = vec![];
        for (i, c) in self.visible().into_iter().enumerate() {
            if let Some((_, items)) = out.last_mut().filter(|(cat, _)| *cat == c.category) {
                items.push((i, c));
            } else {
                out.push((c.category, vec![(i, c)]));
            }
        }
        out
    }

    fn reset_selection(&mut self) {
        self.selected = self.visible().iter().position(|c| !c.disabled());
    }

    /// Step to the next enabled entry in direction `delta`, wrapping around.
    pub fn move_selection(&mut self, delta: isize) {
        let items = self.visible();
        let n = items.len() as isize;
        if n == 0 {
            self.selected = None;
            return;
        }
        let mut i = self.selected.map(|s| s as isize).unwrap_or(-delta.signum());
        for _ in 0..n {
            i = (i + delta).rem_euclid(n);
            if !items[i as usize].disabled() {
                self.selected = Some(i as usize);
                return;
            }
        }
        self.selected = None;
    }

    pub fn hover(&mut self, idx: usize) {
        if self.visible().get(idx).is_some_and(|c| !c.disabled()) {
            self.selected = Some(idx);
        }
    }

    /// Activate entry `idx`. Disabled entries are not selectable.
    pub fn activate(&mut self, idx: usize) -> Option<SlashCommand> {
        let c = **self.visible().get(idx)?;
        if c.disabled() {
            return None;
        }
        self.close();
        Some(c)
    }

    pub fn handle_key(&mut self, k: &KeyInput) -> PaletteOutcome {
        if !self.is_open() {
            return PaletteOutcome::Ignored;
        }
        match k.key.as_str() {
            "ArrowDown" => {
                self.move_selection(1);
                PaletteOutcome::Handled
            }
            "ArrowUp" => {
                self.move_selection(-1);
                PaletteOutcome::Handled
            }
            "Enter" => {
                let picked = self.selected;
                match picked.and_then(|i| self.activate(i)) {
                    Some(c) => PaletteOutcome::Selected(c),
                    None => {
                        self.close();
                        PaletteOutcome::Closed
                    }
                }
            }
            "Escape" => {
                self.close();
                PaletteOutcome::Closed
            }
            _ => PaletteOutcome::Ignored,
        }
    }
}
