//! Transient menus: slash palette, block context menu and the move-to picker.
//!
//! Each view only renders what the core holds and forwards pointer input.
//! Keyboard input reaches the menus through the core's input owner.

use crate::components::ui::{
    Input, MenuEmpty, MenuItem, MenuLabel, MenuPanel, MenuSeparator, MenuShortcut,
    Spinner,
};
use crate::editor::color::{color_picker, ColorChannel, PaletteColor};
use crate::editor::context_menu::{transform_targets, ContextItem, Submenu};
use crate::editor::geometry::{clamp_to_viewport, place_submenu, Point, Rect, Size};
use crate::editor::move_to::PageList;
use crate::editor::sync::{set_timeout_ms, EditorSync};
use leptos::html;
use leptos::prelude::*;
use strum::IntoEnumIterator;
use wasm_bindgen::JsValue;

const SLASH_MENU_SIZE: Size = Size {
    width: 288.0,
    height: 320.0,
};
const CONTEXT_MENU_SIZE: Size = Size {
    width: 240.0,
    height: 240.0,
};
const SUBMENU_SIZE: Size = Size {
    width: 224.0,
    height: 360.0,
};

fn viewport() -> Size {
    let Some(win) = web_sys::window() else {
        return Size::default();
    };
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    Size {
        width: dim(win.inner_width()),
        height: dim(win.inner_height()),
    }
}

fn element_rect(dom_id: &str) -> Option<Rect> {
    web_sys::window()?
        .document()?
        .get_element_by_id(dom_id)
        .map(|el| Rect::from_dom(&el.get_bounding_client_rect()))
}

fn position_style(at: Point) -> String {
    format!("left: {}px; top: {}px;", at.x, at.y)
}

fn aria_flag(on: bool) -> &'static str {
    if on {
        "true"
    } else {
        "false"
    }
}

fn prevent_blur(ev: web_sys::MouseEvent) {
    // Keep focus (and the caret) in the block being edited.
    ev.prevent_default();
}

#[component]
pub fn SlashMenu() -> impl IntoView {
    let sync = expect_context::<EditorSync>();
    let core = sync.core;
    let open = Memo::new(move |_| core.with(|c| c.slash().is_open()));

    view! {
        <Show when=move || open.get()>
            {
                let s_close = sync.clone();
                let s_items = sync.clone();
                let style = move || {
                    let anchor = core.with(|c| c.slash().anchor());
                    position_style(clamp_to_viewport(anchor, SLASH_MENU_SIZE, viewport()))
                };
                view! {
                    <div
                        class="fixed inset-0 z-40"
                        on:mousedown=move |ev: web_sys::MouseEvent| {
                            ev.prevent_default();
                            s_close.apply(|c, _| c.close_menus());
                        }
                    ></div>
                    <MenuPanel class="w-72" attr:role="listbox" attr:style=style on:mousedown=prevent_blur>
                        {move || {
                            let groups = core.with(|c| c.slash().grouped());
                            if groups.is_empty() {
                                return view! { <MenuEmpty>"No matching blocks"</MenuEmpty> }.into_any();
                            }
                            let selected = core.with(|c| c.slash().selected());
                            groups
                                .into_iter()
                                .map(|(category, items)| {
                                    let s = s_items.clone();
                                    view! {
                                        <MenuLabel>{category}</MenuLabel>
                                        {items
                                            .into_iter()
                                            .map(|(i, cmd)| {
                                                let s_hover = s.clone();
                                                let s_click = s.clone();
                                                view! {
                                                    <MenuItem
                                                        attr:role="option"
                                                        attr:aria-selected=aria_flag(selected == Some(i))
                                                        attr:aria-disabled=aria_flag(cmd.disabled())
                                                        on:mouseenter=move |_| {
                                                            s_hover.apply(|c, _| c.slash_hover(i));
                                                        }
                                                        on:click=move |_| {
                                                            s_click.apply(|c, _| c.slash_activate(i));
                                                        }
                                                    >
                                                        <span class="w-6 text-center text-muted-foreground">{cmd.icon}</span>
                                                        <span>{cmd.label}</span>
                                                        {cmd.disabled().then(|| view! { <MenuShortcut>"Soon"</MenuShortcut> })}
                                                    </MenuItem>
                                                }
                                            })
                                            .collect_view()}
                                    }
                                })
                                .collect_view()
                                .into_any()
                        }}
                    </MenuPanel>
                }
            }
        </Show>
    }
}

#[component]
pub fn ContextMenuView() -> impl IntoView {
    let sync = expect_context::<EditorSync>();
    let core = sync.core;
    let open = Memo::new(move |_| core.with(|c| c.context_menu().is_open()));

    view! {
        <Show when=move || open.get()>
            {
                let s_close = sync.clone();
                let s_items = sync.clone();
                let s_sub = sync.clone();
                let style = move || {
                    let anchor = core.with(|c| c.context_menu().anchor());
                    position_style(clamp_to_viewport(anchor, CONTEXT_MENU_SIZE, viewport()))
                };
                view! {
                    <div
                        class="fixed inset-0 z-40"
                        on:mousedown=move |ev: web_sys::MouseEvent| {
                            ev.prevent_default();
                            s_close.apply(|c, _| c.close_menus());
                        }
                    ></div>
                    <MenuPanel class="w-60" attr:role="menu" attr:style=style on:mousedown=prevent_blur>
                        {ContextItem::ALL
                            .into_iter()
                            .enumerate()
                            .map(|(i, item)| {
                                let s_hover = s_items.clone();
                                let s_click = s_items.clone();
                                let selected = move || core.with(|c| c.context_menu().selected() == Some(i));
                                let disabled = move || core.with(|c| c.context_menu().is_disabled(item));
                                let trailing = if item.submenu().is_some() { "›" } else { item.shortcut() };
                                view! {
                                    {(item == ContextItem::Delete).then(|| view! { <MenuSeparator class="my-1" /> })}
                                    <MenuItem
                                        attr:id=format!("ctx-item-{i}")
                                        attr:role="menuitem"
                                        attr:aria-selected=move || aria_flag(selected())
                                        attr:aria-disabled=move || aria_flag(disabled())
                                        class=if item == ContextItem::Delete { "text-destructive" } else { "" }
                                        on:mouseenter=move |_| {
                                            s_hover.apply(|c, _| c.context_hover(i));
                                        }
                                        on:click=move |_| {
                                            s_click.apply(|c, now| c.context_activate(i, now));
                                        }
                                    >
                                        <span>{item.label()}</span>
                                        <MenuShortcut>{trailing}</MenuShortcut>
                                    </MenuItem>
                                }
                            })
                            .collect_view()}
                    </MenuPanel>
                    {move || {
                        let sub = core.with(|c| c.context_menu().submenu())?;
                        let parent = ContextItem::ALL
                            .iter()
                            .position(|item| item.submenu() == Some(sub.kind))?;
                        let parent_rect = element_rect(&format!("ctx-item-{parent}"))?;
                        let (at, _) = place_submenu(parent_rect, SUBMENU_SIZE, viewport());
                        let items = submenu_items(sub.kind, sub.selected, s_sub.clone());
                        Some(view! {
                            <MenuPanel class="w-56" attr:role="menu" attr:style=position_style(at) on:mousedown=prevent_blur>
                                {items}
                            </MenuPanel>
                        })
                    }}
                }
            }
        </Show>
    }
}

fn submenu_items(kind: Submenu, selected: Option<usize>, sync: EditorSync) -> AnyView {
    let core = sync.core;
    let item = move |idx: usize, label: String, swatch: Option<String>, current: bool| {
        let s_hover = sync.clone();
        let s_click = sync.clone();
        view! {
            <MenuItem
                attr:role="menuitem"
                attr:aria-selected=aria_flag(selected == Some(idx))
                on:mouseenter=move |_| {
                    s_hover.apply(|c, _| c.context_hover_sub(idx));
                }
                on:click=move |_| {
                    s_click.apply(|c, now| c.context_activate_sub(idx, now));
                }
            >
                {swatch.map(|style| view! {
                    <span class="inline-flex size-5 items-center justify-center rounded border border-border text-xs" style=style>"A"</span>
                })}
                <span>{label}</span>
                {current.then(|| view! { <MenuShortcut>"✓"</MenuShortcut> })}
            </MenuItem>
        }
    };

    match kind {
        Submenu::Transform => transform_targets()
            .into_iter()
            .enumerate()
            .map(|(i, t)| item(i, t.label().to_string(), None, false))
            .collect_view()
            .into_any(),
        Submenu::Color => {
            let props = core
                .with_untracked(|c| {
                    c.context_menu()
                        .block_id()
                        .and_then(|id| c.block(id))
                        .map(|b| b.props.clone())
                })
                .unwrap_or_default();
            let per_section = PaletteColor::iter().count();
            color_picker(&props)
                .into_iter()
                .enumerate()
                .map(|(si, section)| {
                    let swatches = section
                        .swatches
                        .into_iter()
                        .enumerate()
                        .map(|(j, sw)| {
                            let style = sw
                                .css
                                .map(|css| match section.channel {
                                    ColorChannel::Background => format!("background-color: {css};"),
                                    ColorChannel::Text => format!("color: {css};"),
                                })
                                .unwrap_or_default();
                            item(si * per_section + j, sw.label.to_string(), Some(style), sw.selected)
                        })
                        .collect_view();
                    view! {
                        <MenuLabel>{section.channel.label()}</MenuLabel>
                        {swatches}
                    }
                })
                .collect_view()
                .into_any()
        }
    }
}

#[component]
pub fn MoveToDialog() -> impl IntoView {
    let sync = expect_context::<EditorSync>();
    let core = sync.core;
    let open = Memo::new(move |_| core.with(|c| c.move_to().is_open()));

    view! {
        <Show when=move || open.get()>
            {
                let filter = RwSignal::new(String::new());
                let input_ref: NodeRef<html::Input> = NodeRef::new();

                Effect::new(move |_| {
                    let q = filter.get();
                    core.try_update(|c| c.move_to_filter(&q));
                });
                Effect::new(move |_| {
                    if let Some(el) = input_ref.get() {
                        set_timeout_ms(0, move || {
                            let _ = el.focus();
                        });
                    }
                });

                let s_close = sync.clone();
                let s_list = sync.clone();
                view! {
                    <div
                        class="fixed inset-0 z-40 bg-black/30"
                        on:mousedown=move |_| {
                            s_close.apply(|c, _| c.close_menus());
                        }
                    ></div>
                    <div
                        class="fixed left-1/2 top-24 z-50 w-[28rem] max-w-[90vw] -translate-x-1/2 rounded-md border border-border-strong bg-card text-card-foreground p-3 shadow-lg"
                        role="dialog"
                        aria-label="Move block to page"
                    >
                        <div class="mb-2 text-sm font-medium">"Move to"</div>
                        <Input bind_value=filter placeholder="Search pages…" node_ref=input_ref />
                        <div class="mt-2 max-h-72 overflow-y-auto">
                            {move || match core.with(|c| c.move_to().pages().clone()) {
                                PageList::Loading => view! {
                                    <div class="flex items-center gap-2 px-2 py-1.5 text-xs text-muted-foreground">
                                        <Spinner />
                                        "Loading pages…"
                                    </div>
                                }
                                .into_any(),
                                PageList::Failed(e) => view! {
                                    <div class="px-2 py-1.5 text-xs text-destructive">{format!("Could not load pages: {e}")}</div>
                                }
                                .into_any(),
                                PageList::Ready(_) => {
                                    let (pages, selected) = core.with(|c| (c.move_to().visible(), c.move_to().selected()));
                                    if pages.is_empty() {
                                        return view! { <MenuEmpty>"No other pages"</MenuEmpty> }.into_any();
                                    }
                                    pages
                                        .into_iter()
                                        .enumerate()
                                        .map(|(i, page)| {
                                            let s_hover = s_list.clone();
                                            let s_click = s_list.clone();
                                            let page_id = page.id.clone();
                                            let title = if page.title.trim().is_empty() {
                                                "Untitled".to_string()
                                            } else {
                                                page.title.clone()
                                            };
                                            view! {
                                                <MenuItem
                                                    attr:role="option"
                                                    attr:aria-selected=aria_flag(selected == i)
                                                    on:mouseenter=move |_| {
                                                        s_hover.apply(|c, _| c.move_to_hover(i));
                                                    }
                                                    on:click=move |_| {
                                                        s_click.apply(|c, _| c.move_to_pick(&page_id));
                                                    }
                                                >
                                                    <span class="w-6 text-center">{page.icon.clone().unwrap_or_else(|| "📄".to_string())}</span>
                                                    <span class="truncate">{title}</span>
                                                </MenuItem>
                                            }
                                        })
                                        .collect_view()
                                        .into_any()
                                }
                            }}
                        </div>
                    </div>
                }
            }
        </Show>
    }
}
