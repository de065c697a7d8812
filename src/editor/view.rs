use crate::components::ui::{Button, ButtonSize, ButtonVariant, Spinner};
use crate::editor::core::{Caret, KeyOutcome, KeyTarget, LoadState, RowData, Selection};
use crate::editor::drag::DropEdge;
use crate::editor::geometry::{Point, Rect};
use crate::editor::keys::KeyInput;
use crate::editor::menus::{ContextMenuView, MoveToDialog, SlashMenu};
use crate::editor::render::{Template, CODE_LANGUAGES};
use crate::editor::sync::{set_timeout_ms, EditorSync, SaveStatus};
use crate::editor::text::{char_len, char_to_utf16, utf16_to_char};
use crate::models::BlockType;
use crate::state::AppContext;
use leptos::ev;
use leptos::prelude::*;
use leptos_dom::helpers::window_event_listener;
use wasm_bindgen::JsCast;

fn input_dom_id(row_key: u64) -> String {
    format!("block-input-{row_key}")
}

fn row_dom_id(row_key: u64) -> String {
    format!("block-row-{row_key}")
}

/// Selection of a textarea in chars; selectionStart/End are UTF-16 units.
fn textarea_selection(el: &web_sys::HtmlTextAreaElement) -> Selection {
    let value = el.value();
    let start = el.selection_start().ok().flatten().unwrap_or(0);
    let end = el.selection_end().ok().flatten().unwrap_or(start);
    Selection {
        start: utf16_to_char(&value, start),
        end: utf16_to_char(&value, end),
    }
}

fn event_textarea(ev: &web_sys::Event) -> Option<web_sys::HtmlTextAreaElement> {
    ev.target()
        .and_then(|t| t.dyn_into::<web_sys::HtmlTextAreaElement>().ok())
}

fn current_rect(ev: &web_sys::Event) -> Option<Rect> {
    ev.current_target()
        .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
        .map(|el| Rect::from_dom(&el.get_bounding_client_rect()))
}

/// Focus a row's surface and place the caret. Runs on the next tick so a
/// freshly re-mounted row is in the DOM.
fn focus_row(row_key: u64, caret: Caret) {
    set_timeout_ms(0, move || {
        let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(&input_dom_id(row_key)))
        else {
            return;
        };

        if let Some(ta) = el.dyn_ref::<web_sys::HtmlTextAreaElement>() {
            let _ = ta.focus();
            let value = ta.value();
            let at = match caret {
                Caret::Start => 0,
                Caret::End => char_len(&value),
                Caret::At(n) => n.min(char_len(&value)),
            };
            let pos = char_to_utf16(&value, at);
            let _ = ta.set_selection_range(pos, pos);
        } else if let Some(html) = el.dyn_ref::<web_sys::HtmlElement>() {
            let _ = html.focus();
        }
    });
}

fn scroll_row_into_view(row_key: u64) {
    let Some(el) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(&row_dom_id(row_key)))
    else {
        return;
    };
    let opts = web_sys::ScrollIntoViewOptions::new();
    opts.set_block(web_sys::ScrollLogicalPosition::Center);
    el.scroll_into_view_with_scroll_into_view_options(&opts);
}

#[component]
pub fn BlockEditor(#[prop(into)] page_id: String) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let sync = EditorSync::new(app_state, &page_id);
    provide_context(sync.clone());
    sync.mount();

    let core = sync.core;

    let s = sync.clone();
    let keys = window_event_listener(ev::keydown, move |ev| {
        if ev.default_prevented() || ev.is_composing() {
            return;
        }
        let k = KeyInput::from_event(&ev);
        if s.handle_key(KeyTarget::Window, &k) == KeyOutcome::Handled {
            ev.prevent_default();
        }
    });

    let s = sync.clone();
    on_cleanup(move || {
        keys.remove();
        s.unmount();
    });

    // Apply each focus request once, in order.
    let applied_seq = StoredValue::new(0u64);
    Effect::new(move |_| {
        let Some(req) = core.with(|c| c.focus_request().cloned()) else {
            return;
        };
        if req.seq <= applied_seq.get_value() {
            return;
        }
        applied_seq.set_value(req.seq);
        focus_row(req.row_key, req.caret);
    });

    Effect::new(move |_| {
        let row_key = core.with(|c| c.highlighted().and_then(|id| c.row_key(id)));
        if let Some(row_key) = row_key {
            set_timeout_ms(0, move || scroll_row_into_view(row_key));
        }
    });

    let s = sync.clone();
    let status = Memo::new(move |_| s.status());
    let load_state = Memo::new(move |_| core.with(|c| c.load_state().clone()));

    let s_undo = sync.clone();
    let s_redo = sync.clone();

    view! {
        <div class="mx-auto w-full max-w-3xl px-6 py-8">
            <div class="mb-4 flex items-center justify-end gap-2 text-xs text-muted-foreground">
                <span
                    class=move || match status.get() {
                        SaveStatus::Error(_) => "text-destructive",
                        _ => "",
                    }
                    title=move || match status.get() {
                        SaveStatus::Error(e) => e,
                        _ => String::new(),
                    }
                >
                    {move || status.get().label()}
                </span>
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Sm
                    attr:title="Undo (Ctrl+Z)"
                    attr:disabled=move || !core.with(|c| c.can_undo())
                    on:click=move |_| {
                        s_undo.apply(|c, now| c.undo(now));
                    }
                >
                    "Undo"
                </Button>
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Sm
                    attr:title="Redo (Ctrl+Shift+Z)"
                    attr:disabled=move || !core.with(|c| c.can_redo())
                    on:click=move |_| {
                        s_redo.apply(|c, now| c.redo(now));
                    }
                >
                    "Redo"
                </Button>
            </div>

            {move || match load_state.get() {
                LoadState::Loading => view! {
                    <div class="flex items-center gap-2 text-xs text-muted-foreground">
                        <Spinner />
                        "Loading…"
                    </div>
                }
                .into_any(),
                LoadState::Failed(e) => view! {
                    <div class="text-xs text-destructive">{format!("Could not load this page: {e}")}</div>
                }
                .into_any(),
                LoadState::Ready => view! {
                    <div class="block-editor space-y-0.5">
                        <For
                            each=move || core.with(|c| c.rows())
                            key=|r| (r.row_key, r.rev, r.fragment.template.clone())
                            children=move |row| view! { <BlockRow row=row /> }
                        />
                    </div>
                }
                .into_any(),
            }}

            <SlashMenu />
            <ContextMenuView />
            <MoveToDialog />
        </div>
    }
}

/// One block: drag handle, insert button, type-specific prefix and surface.
#[component]
fn BlockRow(row: RowData) -> impl IntoView {
    let sync = expect_context::<EditorSync>();
    let core = sync.core;

    let RowData {
        row_key, fragment, ..
    } = row;
    let id = StoredValue::new(fragment.id.clone());

    let row_class = move || {
        let highlighted = core.with(|c| {
            c.highlighted()
                .is_some_and(|h| c.row_key(h) == Some(row_key))
        });
        let edge = core.with(|c| c.drop_edge_for(&id.get_value()));
        let mut class = String::from("block-row group relative flex items-start gap-1 rounded-sm py-0.5");
        if highlighted {
            class.push_str(" bg-primary/10 ring-1 ring-primary/30 transition-colors");
        }
        match edge {
            Some(DropEdge::Above) => class.push_str(" border-t-2 border-primary"),
            Some(DropEdge::Below) => class.push_str(" border-b-2 border-primary"),
            None => {}
        }
        class
    };
    let row_style = move || core.with(|c| c.style_for(&id.get_value()));

    let s_ctx = sync.clone();
    let s_over = sync.clone();
    let s_drop = sync.clone();
    let s_start = sync.clone();
    let s_end = sync.clone();
    let s_add = sync.clone();

    let prefix = block_prefix(&fragment.template, id, sync.clone());
    let surface = block_surface(row_key, &fragment, id, sync.clone());

    view! {
        <div
            id=row_dom_id(row_key)
            class=row_class
            style=row_style
            attr:data-block-type=fragment.kind.as_ref().to_string()
            on:contextmenu=move |ev: web_sys::MouseEvent| {
                ev.prevent_default();
                let at = Point { x: ev.client_x() as f64, y: ev.client_y() as f64 };
                s_ctx.apply(|c, _| c.open_context_menu(&id.get_value(), at));
            }
            on:dragover=move |ev: web_sys::DragEvent| {
                if !core.with_untracked(|c| c.drag().is_dragging()) {
                    return;
                }
                ev.prevent_default();
                if let Some(dt) = ev.data_transfer() {
                    dt.set_drop_effect("move");
                }
                let Some(rect) = current_rect(&ev) else {
                    return;
                };
                let y = ev.client_y() as f64;
                let changed = s_over
                    .core
                    .try_update_untracked(|c| c.drag_over(&id.get_value(), y, rect))
                    .unwrap_or(false);
                if changed {
                    core.notify();
                }
            }
            on:drop=move |ev: web_sys::DragEvent| {
                ev.prevent_default();
                s_drop.apply(|c, _| c.drag_drop());
            }
        >
            <div class="flex shrink-0 items-center opacity-0 group-hover:opacity-100 transition-opacity">
                <button
                    class="h-6 w-5 text-sm leading-none text-muted-foreground hover:text-foreground"
                    title="Add a block below"
                    on:click=move |_| {
                        s_add.apply(|c, now| c.insert_after(&id.get_value(), BlockType::Text, "", now));
                    }
                >
                    "+"
                </button>
                <span
                    class="h-6 w-4 cursor-grab text-sm leading-6 text-muted-foreground hover:text-foreground"
                    title="Drag to move"
                    draggable="true"
                    on:dragstart=move |ev: web_sys::DragEvent| {
                        if let Some(dt) = ev.data_transfer() {
                            let _ = dt.set_data("text/plain", &id.get_value());
                            dt.set_effect_allowed("move");
                        }
                        s_start.apply(|c, _| c.drag_start(&id.get_value()));
                    }
                    on:dragend=move |_| {
                        s_end.apply(|c, _| c.drag_cancel());
                    }
                >
                    "⋮⋮"
                </span>
            </div>
            {prefix}
            <div class="min-w-0 flex-1">{surface}</div>
        </div>
    }
}

fn block_prefix(template: &Template, id: StoredValue<String>, sync: EditorSync) -> AnyView {
    let marker = "mt-0.5 w-6 shrink-0 select-none text-center text-sm text-muted-foreground";
    match template.clone() {
        Template::Bulleted => view! { <span class=marker>"•"</span> }.into_any(),
        Template::Numbered { number } => {
            view! { <span class=marker>{format!("{number}.")}</span> }.into_any()
        }
        Template::Todo { checked } => view! {
            <input
                type="checkbox"
                class="mt-1.5 size-4 shrink-0 cursor-pointer accent-primary"
                prop:checked=checked
                on:change=move |_| {
                    sync.apply(|c, _| c.toggle_checked(&id.get_value()));
                }
            />
        }
        .into_any(),
        Template::Toggle { open } => view! {
            <button
                class="mt-0.5 h-5 w-6 shrink-0 text-base leading-none text-muted-foreground hover:text-foreground/80"
                title=if open { "Collapse" } else { "Expand" }
                on:click=move |_| {
                    sync.apply(|c, _| c.toggle_open(&id.get_value()));
                }
            >
                {if open { "▾" } else { "▸" }}
            </button>
        }
        .into_any(),
        Template::Code { language } => view! {
            <select
                class="mt-0.5 h-6 shrink-0 rounded border border-input bg-transparent px-1 text-xs text-muted-foreground"
                on:change=move |ev| {
                    let lang = event_target_value(&ev);
                    sync.apply(|c, _| c.set_language(&id.get_value(), &lang));
                }
            >
                {CODE_LANGUAGES
                    .iter()
                    .map(|l| view! { <option value=*l selected=*l == language>{*l}</option> })
                    .collect_view()}
            </select>
        }
        .into_any(),
        Template::Callout { emoji } => {
            view! { <span class="mt-0.5 w-6 shrink-0 text-center">{emoji}</span> }.into_any()
        }
        Template::Quote => {
            view! { <span class="w-1 shrink-0 self-stretch rounded bg-border-strong"></span> }.into_any()
        }
        Template::PageLink { target: Some(target) } => view! {
            <a
                class="mt-0.5 w-6 shrink-0 text-center text-sm text-primary"
                href=format!("/p/{}", urlencoding::encode(&target))
                title="Open page"
            >
                "↗"
            </a>
        }
        .into_any(),
        _ => ().into_view().into_any(),
    }
}

fn block_surface(
    row_key: u64,
    fragment: &crate::editor::render::BlockFragment,
    id: StoredValue<String>,
    sync: EditorSync,
) -> AnyView {
    let s_key = sync.clone();
    let on_structural_key = move |ev: web_sys::KeyboardEvent| {
        let k = KeyInput::from_event(&ev);
        let target = KeyTarget::Block {
            id: id.get_value(),
            selection: Selection::default(),
        };
        if s_key.handle_key(target, &k) == KeyOutcome::Handled {
            ev.prevent_default();
            ev.stop_propagation();
        }
    };
    let s_focus = sync.clone();
    let on_structural_focus = move |_| {
        s_focus.core.update_untracked(|c| c.on_focus(&id.get_value()));
    };
    let s_blur = sync.clone();
    let on_structural_blur = move |_| {
        s_blur.core.update_untracked(|c| c.on_blur(&id.get_value()));
    };

    match fragment.template {
        Template::Divider => {
            return view! {
                <div
                    id=input_dom_id(row_key)
                    tabindex="0"
                    role="separator"
                    class="w-full rounded-sm py-2 outline-none focus-visible:ring-2 focus-visible:ring-ring/50"
                    on:keydown=on_structural_key
                    on:focus=on_structural_focus
                    on:blur=on_structural_blur
                >
                    <hr class="border-border-strong" />
                </div>
            }
            .into_any();
        }
        Template::Columns { count } => {
            return view! {
                <div
                    id=input_dom_id(row_key)
                    tabindex="0"
                    class="grid w-full gap-3 rounded-sm outline-none focus-visible:ring-2 focus-visible:ring-ring/50"
                    style=format!("grid-template-columns: repeat({count}, minmax(0, 1fr));")
                    on:keydown=on_structural_key
                    on:focus=on_structural_focus
                    on:blur=on_structural_blur
                >
                    {(0..count)
                        .map(|_| view! { <div class="min-h-10 rounded border border-dashed border-border"></div> })
                        .collect_view()}
                </div>
            }
            .into_any();
        }
        _ => {}
    }

    let s_input = sync.clone();
    let s_keydown = sync.clone();
    let s_paste = sync.clone();
    let s_focus = sync.clone();
    let s_blur = sync;

    view! {
        <textarea
            id=input_dom_id(row_key)
            rows="1"
            class=format!("{} [field-sizing:content]", fragment.class)
            placeholder=fragment.placeholder
            spellcheck=if matches!(fragment.template, Template::Code { .. }) { "false" } else { "true" }
            prop:value=fragment.text.clone()
            on:input=move |ev: web_sys::Event| {
                let Some(el) = event_textarea(&ev) else {
                    return;
                };
                let text = el.value();
                let r = el.get_bounding_client_rect();
                let anchor = Point { x: r.left(), y: r.bottom() };
                s_input.apply(|c, now| c.on_input(&id.get_value(), &text, anchor, now));
            }
            on:keydown=move |ev: web_sys::KeyboardEvent| {
                if ev.is_composing() {
                    return;
                }
                let Some(el) = ev
                    .target()
                    .and_then(|t| t.dyn_into::<web_sys::HtmlTextAreaElement>().ok())
                else {
                    return;
                };
                let target = KeyTarget::Block {
                    id: id.get_value(),
                    selection: textarea_selection(&el),
                };
                let k = KeyInput::from_event(&ev);
                if s_keydown.handle_key(target, &k) == KeyOutcome::Handled {
                    ev.prevent_default();
                    ev.stop_propagation();
                }
            }
            on:paste=move |ev: web_sys::ClipboardEvent| {
                let Some(raw) = ev
                    .clipboard_data()
                    .and_then(|dt| dt.get_data("text/plain").ok())
                else {
                    return;
                };
                let Some(el) = ev
                    .target()
                    .and_then(|t| t.dyn_into::<web_sys::HtmlTextAreaElement>().ok())
                else {
                    return;
                };
                ev.prevent_default();
                let sel = textarea_selection(&el);
                s_paste.apply(|c, now| c.paste(&id.get_value(), sel, &raw, now));
            }
            on:focus=move |_| {
                s_focus.core.update_untracked(|c| c.on_focus(&id.get_value()));
            }
            on:blur=move |_| {
                s_blur.core.update_untracked(|c| c.on_blur(&id.get_value()));
            }
        ></textarea>
    }
    .into_any()
}
