use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {AlertStack, div, "pointer-events-none fixed bottom-4 right-4 z-[100] flex flex-col items-end gap-2"}
    clx! {Alert, div, "pointer-events-auto relative flex w-80 max-w-[90vw] items-start gap-3 rounded-lg border bg-card px-4 py-3 text-sm shadow-lg"}
    clx! {AlertDescription, p, "min-w-0 flex-1 break-words text-sm [&_p]:leading-relaxed"}
}

pub use components::*;
