use crate::api::{ApiError, ApiErrorKind, ApiResult};
use crate::editor::core::{EditorCore, KeyOutcome, KeyTarget, ServiceCall};
use crate::editor::deep_link::{current_hash, current_origin, link_url, parse_block_slug, HIGHLIGHT_MS};
use crate::editor::keys::KeyInput;
use crate::state::{AppContext, ToastKind};
use crate::util::now_ms;
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::future::Future;
use std::sync::{Arc, Mutex};
use wasm_bindgen::JsCast;

/// Browser timers may fire a hair before the requested delay.
const TIMER_SLACK_MS: i64 = 5;

/// What the host's status line shows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum SaveStatus {
    #[default]
    Idle,
    Editing,
    Saving,
    Saved,
    Error(String),
}

impl SaveStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SaveStatus::Idle => "",
            SaveStatus::Editing => "editing…",
            SaveStatus::Saving => "saving…",
            SaveStatus::Saved => "saved",
            SaveStatus::Error(_) => "error",
        }
    }
}

/// Counts in-flight persistence requests.
///
/// A batch starts when a request begins with nothing in flight. Any failure
/// inside the batch marks the whole batch as failed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct StatusTracker {
    in_flight: usize,
    failure: Option<String>,
    settled: bool,
}

impl StatusTracker {
    pub fn begin(&mut self) {
        if self.in_flight == 0 {
            self.failure = None;
        }
        self.in_flight += 1;
    }

    pub fn end(&mut self, result: Result<(), String>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.settled = true;
        if let Err(e) = result {
            self.failure = Some(e);
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// `editing` is true while debounced edits are still waiting to be sent.
    pub fn status(&self, editing: bool) -> SaveStatus {
        if self.in_flight > 0 {
            SaveStatus::Saving
        } else if editing {
            SaveStatus::Editing
        } else if let Some(e) = &self.failure {
            SaveStatus::Error(e.clone())
        } else if self.settled {
            SaveStatus::Saved
        } else {
            SaveStatus::Idle
        }
    }
}

/// Drives an [`EditorCore`] from the browser.
///
/// Responsibilities:
/// - run core operations with the current clock
/// - execute queued service calls through the API client
/// - keep one timer armed for the earliest debounced save
/// - feed results (real ids, page lists, failures) back into the core
#[derive(Clone)]
pub(crate) struct EditorSync {
    app: AppContext,
    pub core: RwSignal<EditorCore>,
    tracker: RwSignal<StatusTracker>,
    flush_timer: Arc<Mutex<Option<i32>>>,
    flush_on_unmount: bool,
}

impl EditorSync {
    pub fn new(app: AppContext, page_id: &str) -> Self {
        let settings = app.0.config.editor_settings();
        let flush_on_unmount = app.0.config.flush_on_unmount;
        let core = EditorCore::new(page_id, app.0.actor_id(), settings);
        Self {
            app,
            core: RwSignal::new(core),
            tracker: RwSignal::new(StatusTracker::default()),
            flush_timer: Arc::new(Mutex::new(None)),
            flush_on_unmount,
        }
    }

    /// Tracked: re-evaluates when edits or requests change.
    pub fn status(&self) -> SaveStatus {
        let editing = self.core.with(|c| c.has_pending_saves());
        self.tracker.with(|t| t.status(editing))
    }

    /// Run an editor operation, then dispatch whatever it queued.
    pub fn apply<R>(&self, f: impl FnOnce(&mut EditorCore, i64) -> R) -> Option<R> {
        let now = now_ms();
        let out = self.core.try_update(|c| f(c, now));
        self.drain();
        out
    }

    pub fn handle_key(&self, target: KeyTarget, k: &KeyInput) -> KeyOutcome {
        self.apply(|c, now| c.handle_key(target, k, now))
            .unwrap_or(KeyOutcome::Ignored)
    }

    pub fn mount(&self) {
        let api = self.app.0.api_client.get_untracked();
        let page_id = self.core.with_untracked(|c| c.page_id().to_string());
        let s = self.clone();
        spawn_local(async move {
            let result = api.list_blocks(&page_id).await;
            if let Err(e) = &result {
                s.app
                    .0
                    .notify(ToastKind::Error, format!("Could not load this page: {e}"));
            }
            s.apply(|c, now| c.load(result.map_err(|e| e.to_string()), now));
            s.follow_deep_link().await;
        });
    }

    pub fn unmount(&self) {
        self.clear_flush_timer();
        let flush = self.flush_on_unmount;
        let calls = self
            .core
            .try_update_untracked(|c| c.unmount(flush))
            .unwrap_or_default();
        for call in calls {
            self.execute(call);
        }
    }

    async fn follow_deep_link(&self) {
        let Some(slug) = current_hash().and_then(|h| parse_block_slug(&h)) else {
            return;
        };
        let api = self.app.0.api_client.get_untracked();
        match api.resolve_link(&slug).await {
            Ok(block_id) => {
                if self.apply(|c, _| c.highlight(&block_id)) != Some(true) {
                    log::info!("deep link: block {block_id} is not on this page");
                    return;
                }
                let core = self.core;
                set_timeout_ms(HIGHLIGHT_MS, move || {
                    core.try_update(|c| c.clear_highlight());
                });
            }
            Err(e) => log::warn!("deep link: could not resolve {slug}: {e}"),
        }
    }

    fn drain(&self) {
        if self.core.with_untracked(|c| c.has_pending_calls()) {
            let calls = self
                .core
                .try_update_untracked(|c| c.take_pending_calls())
                .unwrap_or_default();
            for call in calls {
                self.execute(call);
            }
        }
        self.rearm();
    }

    fn execute(&self, call: ServiceCall) {
        let api = self.app.0.api_client.get_untracked();
        log::debug!("sync: {call:?}");

        match call {
            ServiceCall::Create { tmp_id, draft } => {
                let s = self.clone();
                self.track("Create block", async move {
                    match api.create_block(&draft).await {
                        Ok(block) => {
                            s.core.try_update(|c| c.resolve_created(&tmp_id, &block.id));
                            s.drain();
                            Ok(())
                        }
                        Err(e) => {
                            s.core.try_update(|c| c.create_failed(&tmp_id));
                            Err(e)
                        }
                    }
                });
            }
            ServiceCall::Update { block_id, patch } => {
                self.track("Save", async move { api.update_block(&block_id, patch).await });
            }
            ServiceCall::Delete { block_id } => {
                self.track("Delete", async move { api.delete_block(&block_id).await });
            }
            ServiceCall::Duplicate { source_id, tmp_id } => {
                let s = self.clone();
                self.track("Duplicate", async move {
                    match api.duplicate_block(&source_id).await {
                        Ok(block) => {
                            s.core.try_update(|c| c.resolve_created(&tmp_id, &block.id));
                            s.drain();
                            Ok(())
                        }
                        Err(e) => {
                            s.core.try_update(|c| c.create_failed(&tmp_id));
                            Err(e)
                        }
                    }
                });
            }
            ServiceCall::Reorder {
                page_id,
                ordered_ids,
            } => {
                self.track("Reorder", async move {
                    api.reorder_blocks(&page_id, ordered_ids).await
                });
            }
            ServiceCall::MoveToPage {
                block_id,
                target_page_id,
            } => {
                let app = self.app.clone();
                self.track("Move", async move {
                    let max = api.max_position(&target_page_id).await?;
                    api.move_block(&block_id, &target_page_id, max + 1.0).await?;
                    app.0.notify(ToastKind::Info, "Block moved");
                    Ok(())
                });
            }
            ServiceCall::CreateLink { block_id } => {
                let app = self.app.clone();
                let page_id = self.core.with_untracked(|c| c.page_id().to_string());
                self.track("Copy link", async move {
                    let link = api.create_link(&block_id).await?;
                    let url = link_url(&current_origin(), &page_id, &link.slug);
                    if copy_to_clipboard(&url) {
                        app.0.notify(ToastKind::Info, "Link copied to clipboard");
                    } else {
                        app.0.notify(ToastKind::Info, format!("Link: {url}"));
                    }
                    Ok(())
                });
            }
            ServiceCall::ListPages { request_id } => {
                let core = self.core;
                spawn_local(async move {
                    let result = api.list_pages().await.map_err(|e| e.to_string());
                    core.try_update(|c| c.set_move_to_pages(request_id, result));
                });
            }
        }
    }

    /// Run a persistence request under the status tracker. Failures are
    /// logged and toasted; the in-memory edit stays as it is.
    fn track(&self, what: &'static str, fut: impl Future<Output = ApiResult<()>> + 'static) {
        self.tracker.update(|t| t.begin());
        let tracker = self.tracker;
        let app = self.app.clone();
        spawn_local(async move {
            let result = fut.await;
            tracker.try_update(|t| t.end(result.clone().map_err(|e| e.to_string())));
            if let Err(e) = result {
                report_failure(&app, what, &e);
            }
        });
    }

    fn clear_flush_timer(&self) {
        let Some(win) = web_sys::window() else {
            return;
        };
        if let Ok(mut slot) = self.flush_timer.lock() {
            if let Some(tid) = slot.take() {
                win.clear_timeout_with_handle(tid);
            }
        }
    }

    /// Keep exactly one timer armed for the earliest pending deadline.
    fn rearm(&self) {
        self.clear_flush_timer();
        let Some(deadline) = self.core.with_untracked(|c| c.next_autosave_deadline()) else {
            return;
        };
        let delay = (deadline - now_ms()).clamp(0, i32::MAX as i64) as i32;

        let s = self.clone();
        let tid = set_timeout_ms(delay, move || {
            if let Ok(mut slot) = s.flush_timer.lock() {
                slot.take();
            }
            s.core.try_update(|c| c.flush_due(now_ms() + TIMER_SLACK_MS));
            s.drain();
        });

        if let Ok(mut slot) = self.flush_timer.lock() {
            *slot = tid;
        }
    }
}

fn report_failure(app: &AppContext, what: &str, e: &ApiError) {
    log::warn!("sync: {what} failed: {e}");
    let message = match e.kind {
        ApiErrorKind::Unauthorized => format!("{what} failed: please sign in again"),
        ApiErrorKind::Network => format!("{what} failed: the server is unreachable"),
        ApiErrorKind::Http | ApiErrorKind::Parse => format!("{what} failed: {e}"),
    };
    app.0.notify(ToastKind::Error, message);
}

pub(crate) fn set_timeout_ms(delay: i32, f: impl FnOnce() + 'static) -> Option<i32> {
    let win = web_sys::window()?;
    let cb = wasm_bindgen::closure::Closure::once_into_js(f);
    win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), delay)
        .ok()
}

/// `navigator.clipboard.writeText`, looked up dynamically so browsers without
/// the async clipboard API fall back to showing the link.
fn copy_to_clipboard(text: &str) -> bool {
    let Some(win) = web_sys::window() else {
        return false;
    };
    let navigator = win.navigator();
    let Ok(clipboard) = js_sys::Reflect::get(&navigator, &"clipboard".into()) else {
        return false;
    };
    if clipboard.is_undefined() || clipboard.is_null() {
        return false;
    }
    let Ok(write) = js_sys::Reflect::get(&clipboard, &"writeText".into()) else {
        return false;
    };
    let Ok(write) = write.dyn_into::<js_sys::Function>() else {
        return false;
    };
    write.call1(&clipboard, &text.into()).is_ok()
}
