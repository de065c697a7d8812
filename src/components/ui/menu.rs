use leptos::prelude::*;
use leptos_ui::clx;

pub use crate::components::ui::separator::Separator as MenuSeparator;

mod components {
    use super::*;
    clx! {MenuPanel, div, "fixed z-50 min-w-[14rem] max-h-[70vh] overflow-y-auto rounded-md border border-border-strong bg-popover text-popover-foreground p-1 text-sm shadow-lg"}
    clx! {MenuLabel, div, "px-2 pt-2 pb-1 text-xs font-medium text-muted-foreground"}
    clx! {MenuItem, div, "flex w-full cursor-pointer select-none items-center gap-2 rounded-sm px-2 py-1.5 text-sm transition-colors aria-selected:bg-accent aria-selected:text-accent-foreground aria-disabled:cursor-default aria-disabled:opacity-50"}
    clx! {MenuShortcut, span, "ml-auto pl-4 text-xs tracking-widest text-muted-foreground"}
    clx! {MenuEmpty, div, "px-2 py-1.5 text-xs text-muted-foreground"}
}

pub use components::*;
