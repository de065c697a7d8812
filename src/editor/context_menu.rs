use crate::editor::color::{ColorChannel, PaletteColor};
use crate::editor::geometry::Point;
use crate::editor::keys::KeyInput;
use crate::models::BlockType;
use strum::IntoEnumIterator;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContextItem {
    TurnInto,
    Color,
    Duplicate,
    CopyLink,
    MoveTo,
    Delete,
}

impl ContextItem {
    pub const ALL: [ContextItem; 6] = [
        ContextItem::TurnInto,
        ContextItem::Color,
        ContextItem::Duplicate,
        ContextItem::CopyLink,
        ContextItem::MoveTo,
        ContextItem::Delete,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ContextItem::TurnInto => "Turn into",
            ContextItem::Color => "Color",
            ContextItem::Duplicate => "Duplicate",
            ContextItem::CopyLink => "Copy link to block",
            ContextItem::MoveTo => "Move to",
            ContextItem::Delete => "Delete",
        }
    }

    pub fn shortcut(self) -> &'static str {
        match self {
            ContextItem::Duplicate => "Ctrl+D",
            ContextItem::Delete => "Del",
            _ => "",
        }
    }

    pub fn submenu(self) -> Option<Submenu> {
        match self {
            ContextItem::TurnInto => Some(Submenu::Transform),
            ContextItem::Color => Some(Submenu::Color),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Submenu {
    Transform,
    Color,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextAction {
    Transform(BlockType),
    SetColor(ColorChannel, PaletteColor),
    Duplicate,
    CopyLink,
    MoveTo,
    Delete,
}

/// Types offered by the Transform submenu.
pub(crate) fn transform_targets() -> Vec<BlockType> {
    BlockType::iter()
        .filter(|t| *t != BlockType::PageLink)
        .collect()
}

/// Flat keyboard order of the Color submenu: text colors, then backgrounds.
pub(crate) fn color_targets() -> Vec<(ColorChannel, PaletteColor)> {
    [ColorChannel::Text, ColorChannel::Background]
        .into_iter()
        .flat_map(|ch| PaletteColor::iter().map(move |c| (ch, c)))
        .collect()
}

fn submenu_action(kind: Submenu, idx: usize) -> Option<ContextAction> {
    match kind {
        Submenu::Transform => transform_targets()
            .get(idx)
            .map(|t| ContextAction::Transform(*t)),
        Submenu::Color => color_targets()
            .get(idx)
            .map(|(ch, c)| ContextAction::SetColor(*ch, *c)),
    }
}

fn submenu_len(kind: Submenu) -> usize {
    match kind {
        Submenu::Transform => transform_targets().len(),
        Submenu::Color => color_targets().len(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmenuState {
    pub kind: Submenu,
    pub selected: Option<usize>,
    /// Keys go to the submenu rather than the parent list.
    pub focused: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MenuOutcome {
    Ignored,
    Handled,
    Action(ContextAction),
    Closed,
}

/// Right-click block menu with one level of nested submenu.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContextMenu {
    block_id: Option<String>,
    anchor: Point,
    selected: Option<usize>,
    can_delete: bool,
    submenu: Option<SubmenuState>,
}

impl ContextMenu {
    pub fn open(&mut self, block_id: &str, anchor: Point, can_delete: bool) {
        self.block_id = Some(block_id.to_string());
        self.anchor = anchor;
        self.can_delete = can_delete;
        self.selected = Some(0);
        self.submenu = None;
    }

    /// Closing the parent always closes its submenu.
    pub fn close(&mut self) {
        self.block_id = None;
        self.selected = None;
        self.submenu = None;
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

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn submenu(&self) -> Option<SubmenuState> {
        self.submenu
    }

    pub fn is_disabled(&self, item: ContextItem) -> bool {
        item == ContextItem::Delete && !self.can_delete
    }

    /// Pointer entered top-level item `idx`: select it, open its submenu if it
    /// has one, and close any sibling's submenu.
    pub fn hover(&mut self, idx: usize) {
        let Some(item) = ContextItem::ALL.get(idx).copied() else {
            return;
        };
        if self.is_disabled(item) {
            return;
        }
        self.selected = Some(idx);
        self.submenu = item.submenu().map(|kind| SubmenuState {
            kind,
            selected: None,
            focused: false,
        });
    }

    pub fn hover_sub(&mut self, idx: usize) {
        if let Some(sub) = self.submenu.as_mut() {
            if idx < submenu_len(sub.kind) {
                sub.selected = Some(idx);
            }
        }
    }

    /// Activate top-level item `idx`. Submenu parents open their submenu with
    /// keyboard focus instead of producing an action.
    pub fn activate(&mut self, idx: usize) -> MenuOutcome {
        let Some(item) = ContextItem::ALL.get(idx).copied() else {
            return MenuOutcome::Ignored;
        };
        if self.is_disabled(item) {
            return MenuOutcome::Handled;
        }
        if let Some(kind) = item.submenu() {
            self.selected = Some(idx);
            self.submenu = Some(SubmenuState {
                kind,
                selected: Some(0),
                focused: true,
            });
            return MenuOutcome::Handled;
        }
        let action = match item {
            ContextItem::Duplicate => ContextAction::Duplicate,
            ContextItem::CopyLink => ContextAction::CopyLink,
            ContextItem::MoveTo => ContextAction::MoveTo,
            _ => ContextAction::Delete,
        };
        self.close();
        MenuOutcome::Action(action)
    }

    pub fn activate_sub(&mut self, idx: usize) -> MenuOutcome {
        let Some(sub) = self.submenu else {
            return MenuOutcome::Ignored;
        };
        match submenu_action(sub.kind, idx) {
            Some(action) => {
                self.close();
                MenuOutcome::Action(action)
            }
            None => MenuOutcome::Handled,
        }
    }

    fn step(&mut self, delta: isize) {
        let n = ContextItem::ALL.len() as isize;
        let mut i = self.selected.map(|s| s as isize).unwrap_or(-delta.signum());
        for _ in 0..n {
            i = (i + delta).rem_euclid(n);
            if !self.is_disabled(ContextItem::ALL[i as usize]) {
                self.selected = Some(i as usize);
                self.submenu = None;
                return;
            }
        }
    }

    pub fn handle_key(&mut self, k: &KeyInput) -> MenuOutcome {
        if !self.is_open() {
            return MenuOutcome::Ignored;
        }

        if let Some(mut sub) = self.submenu.filter(|s| s.focused) {
            let n = submenu_len(sub.kind) as isize;
            let cur = sub.selected.map(|s| s as isize).unwrap_or(-1);
            return match k.key.as_str() {
                "ArrowDown" => {
                    sub.selected = Some((cur + 1).rem_euclid(n) as usize);
                    self.submenu = Some(sub);
                    MenuOutcome::Handled
                }
                "ArrowUp" => {
                    sub.selected = Some((cur - 1).rem_euclid(n) as usize);
                    self.submenu = Some(sub);
                    MenuOutcome::Handled
                }
                "Enter" => match sub.selected {
                    Some(i) => self.activate_sub(i),
                    None => MenuOutcome::Handled,
                },
                "ArrowLeft" | "Escape" => {
                    self.submenu = None;
                    MenuOutcome::Handled
                }
                _ => MenuOutcome::Ignored,
            };
        }

        match k.key.as_str() {
            "ArrowDown" => {
                self.step(1);
                MenuOutcome::Handled
            }
            "ArrowUp" => {
                self.step(-1);
                MenuOutcome::Handled
            }
            "Enter" => match self.selected {
                Some(i) => self.activate(i),
                None => MenuOutcome::Handled,
            },
            "ArrowRight" => match self.selected {
                Some(i) if ContextItem::ALL[i].submenu().is_some() => self.activate(i),
                _ => MenuOutcome::Handled,
            },
            "Escape" => {
                self.close();
                MenuOutcome::Closed
            }
            _ => MenuOutcome::Ignored,
        }
    }
}
