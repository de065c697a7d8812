use crate::components::ui::{Alert, AlertDescription, AlertStack};
use crate::config::EditorConfig;
use crate::pages::{EditorPage, RootPage};
use crate::state::{AppContext, AppState, ToastKind};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App(config: EditorConfig) -> impl IntoView {
    provide_context(AppContext(AppState::new(config)));

    // IMPORTANT:
    // - Leptos CSR requires the `csr` feature on `leptos`.
    // - router hooks require a <Router> context.
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("p/:page_id") view=EditorPage />
                <Route path=path!("") view=RootPage />
            </Routes>
        </Router>
        <Toaster />
    }
}

#[component]
fn Toaster() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let toasts = app_state.0.toasts;

    view! {
        <AlertStack attr:aria-live="polite">
            <For
                each=move || toasts.get()
                key=|t| t.id
                children=move |t| {
                    let app_state = app_state.clone();
                    let class = match t.kind {
                        ToastKind::Info => "",
                        ToastKind::Error => "border-destructive/50 text-destructive",
                    };
                    view! {
                        <Alert class=class attr:role="status">
                            <AlertDescription>{t.message.clone()}</AlertDescription>
                            <button
                                class="text-xs text-muted-foreground hover:text-foreground"
                                title="Dismiss"
                                on:click=move |_| app_state.0.dismiss(t.id)
                            >
                                "✕"
                            </button>
                        </Alert>
                    }
                }
            />
        </AlertStack>
    }
}
