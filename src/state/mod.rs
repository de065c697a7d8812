use crate::api::ApiClient;
use crate::config::EditorConfig;
use crate::models::Actor;
use crate::storage::load_actor;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

const TOAST_TTL_MS: i32 = 4000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ToastKind {
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub config: EditorConfig,
    pub api_client: RwSignal<ApiClient>,

    /// Identity context; `None` when the host did not provide one.
    pub actor: RwSignal<Option<Actor>>,

    pub toasts: RwSignal<Vec<Toast>>,
    next_toast_id: RwSignal<u64>,
}

impl AppState {
    pub fn new(config: EditorConfig) -> Self {
        let api_client = ApiClient::load_from_storage(config.api_url.clone());
        Self {
            config,
            api_client: RwSignal::new(api_client),
            actor: RwSignal::new(load_actor()),
            toasts: RwSignal::new(vec![]),
            next_toast_id: RwSignal::new(1),
        }
    }

    pub fn actor_id(&self) -> Option<String> {
        self.actor.get_untracked().map(|a| a.id)
    }

    /// Show a toast that dismisses itself.
    pub fn notify(&self, kind: ToastKind, message: impl Into<String>) {
        let id = self.next_toast_id.get_untracked();
        self.next_toast_id.set(id + 1);
        self.toasts.update(|xs| {
            xs.push(Toast {
                id,
                kind,
                message: message.into(),
            })
        });

        let Some(win) = web_sys::window() else {
            return;
        };
        let toasts = self.toasts;
        let cb = wasm_bindgen::closure::Closure::once_into_js(move || {
            toasts.update(|xs| xs.retain(|t| t.id != id));
        });
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
            cb.as_ref().unchecked_ref(),
            TOAST_TTL_MS,
        );
    }

    pub fn dismiss(&self, id: u64) {
        self.toasts.update(|xs| xs.retain(|t| t.id != id));
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);
