use crate::components::ui::Spinner;
use crate::editor::BlockEditor;
use crate::models::Page;
use crate::state::AppContext;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_params;
use leptos_router::params::Params;

#[derive(Params, PartialEq, Clone, Debug)]
pub struct PageRouteParams {
    pub page_id: Option<String>,
}

/// `/p/:page_id`: one editor per page. Switching pages re-mounts the editor;
/// fragment changes (`#block=…`) do not.
#[component]
pub fn EditorPage() -> impl IntoView {
    let params = use_params::<PageRouteParams>();
    let page_id = Memo::new(move |_| {
        params
            .get()
            .ok()
            .and_then(|p| p.page_id)
            .unwrap_or_default()
    });

    view! {
        {move || {
            let id = page_id.get();
            if id.trim().is_empty() {
                view! { <div class="px-4 py-8 text-xs text-muted-foreground">"No page selected"</div> }
                    .into_any()
            } else {
                view! { <BlockEditor page_id=id /> }.into_any()
            }
        }}
    }
}

/// Landing page listing the pages the service knows about.
#[component]
pub fn RootPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let pages: RwSignal<Vec<Page>> = RwSignal::new(vec![]);
    let loading: RwSignal<bool> = RwSignal::new(true);
    let error: RwSignal<Option<String>> = RwSignal::new(None);

    let api_client = app_state.0.api_client.get_untracked();
    spawn_local(async move {
        match api_client.list_pages().await {
            Ok(list) => pages.set(list),
            Err(e) => {
                log::warn!("pages: list failed: {e}");
                error.set(Some(e.to_string()));
            }
        }
        loading.set(false);
    });

    view! {
        <div class="mx-auto w-full max-w-3xl space-y-3 px-6 py-8">
            <h1 class="text-xl font-semibold">"Pages"</h1>

            <Show when=move || loading.get()>
                <div class="flex items-center gap-2 text-xs text-muted-foreground">
                    <Spinner />
                    "Loading…"
                </div>
            </Show>

            {move || error.get().map(|e| view! {
                <div class="text-xs text-destructive">{e}</div>
            })}

            <Show when=move || !loading.get() && error.get().is_none() && pages.get().is_empty()>
                <div class="text-sm text-muted-foreground">"No pages."</div>
            </Show>

            <ul class="space-y-1">
                <For
                    each=move || pages.get()
                    key=|p| p.id.clone()
                    children=move |p| {
                        let href = format!("/p/{}", urlencoding::encode(&p.id));
                        let title = if p.title.trim().is_empty() {
                            "Untitled".to_string()
                        } else {
                            p.title.clone()
                        };
                        view! {
                            <li>
                                <a
                                    class="flex items-center gap-2 rounded-md px-2 py-1.5 text-sm hover:bg-surface-hover"
                                    href=href
                                >
                                    <span class="w-6 text-center">{p.icon.clone().unwrap_or_else(|| "📄".to_string())}</span>
                                    <span class="truncate">{title}</span>
                                </a>
                            </li>
                        }
                    }
                />
            </ul>
        </div>
    }
}
