/// Key press normalized away from the DOM event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyInput {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyInput {
    #[cfg(test)]
    pub fn plain(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Default::default()
        }
    }

    #[cfg(test)]
    pub fn with_mod(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: true,
            ..Default::default()
        }
    }

    #[cfg(test)]
    pub fn shifted(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn from_event(ev: &web_sys::KeyboardEvent) -> Self {
        Self {
            key: ev.key(),
            ctrl: ev.ctrl_key(),
            meta: ev.meta_key(),
            shift: ev.shift_key(),
            alt: ev.alt_key(),
        }
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn is_mod(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn has_modifier(&self) -> bool {
        self.ctrl || self.meta || self.shift || self.alt
    }
}

/// Editor-wide shortcuts that work regardless of which element has focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Shortcut {
    Undo,
    Redo,
    Duplicate,
    DeleteIfEmpty,
    CloseMenus,
}

pub(crate) fn shortcut_for(k: &KeyInput) -> Option<Shortcut> {
    let key = k.key.to_lowercase();
    if k.is_mod() {
        return match key.as_str() {
            "z" if k.shift => Some(Shortcut::Redo),
            "z" => Some(Shortcut::Undo),
            "y" => Some(Shortcut::Redo),
            "d" => Some(Shortcut::Duplicate),
            _ => None,
        };
    }
    match key.as_str() {
        "delete" if !k.shift && !k.alt => Some(Shortcut::DeleteIfEmpty),
        "escape" => Some(Shortcut::CloseMenus),
        _ => None,
    }
}
