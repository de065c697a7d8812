/// Components that can capture keyboard input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputOwner {
    SlashPalette,
    ContextMenu,
    MoveTo,
}

/// Who receives key events: the top transient menu if any, else the editor.
///
/// At most one menu is on the stack. Opening a menu closes whatever menu was
/// capturing before it, so two menus never capture keys at once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct OwnerStack {
    stack: Vec<InputOwner>,
}

impl OwnerStack {
    /// Claim key capture for `owner`; returns the owner that was displaced.
    pub fn claim(&mut self, owner: InputOwner) -> Option<InputOwner> {
        let displaced = self.stack.pop().filter(|o| *o != owner);
        self.stack.clear();
        self.stack.push(owner);
        displaced
    }

    pub fn release(&mut self, owner: InputOwner) {
        self.stack.retain(|o| *o != owner);
    }

    pub fn top(&self) -> Option<InputOwner> {
        self.stack.last().copied()
    }

    pub fn is_editor(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn clear(&mut self) -> Option<InputOwner> {
        let top = self.top();
        self.stack.clear();
        top
    }
}
