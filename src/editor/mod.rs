//! Block editor: pure editing state in `core` and its helpers, browser glue in
//! `sync`, `view` and `menus`.

pub(crate) mod autosave;
pub(crate) mod color;
pub(crate) mod context_menu;
pub(crate) mod core;
pub(crate) mod deep_link;
pub(crate) mod document;
pub(crate) mod drag;
pub(crate) mod geometry;
pub(crate) mod history;
pub(crate) mod keys;
pub(crate) mod menus;
pub(crate) mod move_to;
pub(crate) mod owner;
pub(crate) mod render;
pub(crate) mod slash;
pub(crate) mod sync;
pub(crate) mod text;
pub(crate) mod view;

pub use view::BlockEditor;
