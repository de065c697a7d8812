//! Editor Orchestrator.
//!
//! `EditorCore` owns the live block list and every transient menu. It never
//! performs I/O: each operation mutates local state (local state is the
//! source of truth for the session) and queues [`ServiceCall`]s that the sync
//! layer drains and executes asynchronously.

use crate::editor::autosave::{AutosaveQueue, DEFAULT_AUTOSAVE_MS};
use crate::editor::color::{self, ColorChannel};
use crate::editor::context_menu::{ContextAction, ContextMenu, MenuOutcome};
use crate::editor::document::{
    find, find_mut, index_of, next_position, ordered_ids, position_after, renumber,
    sort_by_position,
};
use crate::editor::drag::{drop_index, DragState, DropEdge};
use crate::editor::geometry::{Point, Rect};
use crate::editor::history::{reconcile, History, Snapshot, DEFAULT_HISTORY_LIMIT};
use crate::editor::keys::{shortcut_for, KeyInput, Shortcut};
use crate::editor::move_to::{MoveToPicker, PickerOutcome};
use crate::editor::owner::{InputOwner, OwnerStack};
use crate::editor::render::{render_blocks, BlockFragment};
use crate::editor::slash::{PaletteOutcome, SlashAction, SlashCommand, SlashPalette};
use crate::editor::text::{char_len, normalize_pasted, replace_range, split_at_char};
use crate::models::{Block, BlockContent, BlockDraft, BlockPatch, BlockProps, BlockType, Page};
use crate::util::{is_tmp_id, make_tmp_id, random_u64};
use std::collections::{HashMap, HashSet};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("unknown block {0}")]
    UnknownBlock(String),
    #[error("refusing to remove the only block of the page")]
    LastBlock,
    #[error("block {0} has not been created on the server yet")]
    PendingCreate(String),
    #[error("no previous block to merge into")]
    NothingToMerge,
    #[error("drop has no valid target")]
    NoDropTarget,
    #[error("nothing to undo or redo")]
    EmptyHistory,
    #[error("block {0} is already in that state")]
    Unchanged(String),
}

/// Invalid operations are silent no-ops for the caller; they only get logged.
fn quietly<T>(r: Result<T, EditorError>) -> Option<T> {
    match r {
        Ok(v) => Some(v),
        Err(e) => {
            log::debug!("editor: ignored operation: {e}");
            None
        }
    }
}

/// A call to the persistence service, queued by an editor operation.
#[derive(Clone, Debug, PartialEq)]
pub enum ServiceCall {
    Create { tmp_id: String, draft: BlockDraft },
    Update { block_id: String, patch: BlockPatch },
    Delete { block_id: String },
    Duplicate { source_id: String, tmp_id: String },
    Reorder { page_id: String, ordered_ids: Vec<String> },
    MoveToPage { block_id: String, target_page_id: String },
    CreateLink { block_id: String },
    ListPages { request_id: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Caret {
    Start,
    End,
    /// Char offset into the block text.
    At(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FocusRequest {
    pub block_id: String,
    pub row_key: u64,
    pub caret: Caret,
    /// Increases with every request so the view can tell repeats apart.
    pub seq: u64,
}

/// Selection inside the focused text surface, in chars.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn caret(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyTarget {
    Block { id: String, selection: Selection },
    Window,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Ignored,
    Handled,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct EditorSettings {
    pub autosave_ms: i64,
    pub history_limit: usize,
    /// Idle gap that ends a typing burst (one undo step per burst).
    pub text_burst_ms: i64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            autosave_ms: DEFAULT_AUTOSAVE_MS,
            history_limit: DEFAULT_HISTORY_LIMIT,
            text_burst_ms: DEFAULT_AUTOSAVE_MS,
        }
    }
}

/// What the view needs to mount one row.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RowData {
    pub row_key: u64,
    pub rev: u64,
    pub fragment: BlockFragment,
}

#[derive(Clone, Debug)]
pub struct EditorCore {
    page_id: String,
    actor_id: Option<String>,
    settings: EditorSettings,
    load: LoadState,

    blocks: Vec<Block>,

    /// Stable per-row key; survives tmp → real id swaps.
    row_keys: HashMap<String, u64>,
    next_row_key: u64,
    /// Render revision per block; bumping it re-mounts only that row.
    revisions: HashMap<String, u64>,
    next_rev: u64,

    history: History,
    text_burst_until: Option<i64>,
    autosave: AutosaveQueue,
    outbox: Vec<ServiceCall>,

    /// tmp id → real id, for callers still holding a tmp id.
    aliases: HashMap<String, String>,
    pending_creates: HashSet<String>,
    /// tmp blocks that need one full update once their real id is known.
    tmp_dirty: HashSet<String>,
    /// tmp blocks removed locally before their create resolved.
    tmp_deleted: HashSet<String>,
    /// tmp blocks whose create was rejected; the next edit sends it again.
    failed_creates: HashSet<String>,
    /// Blocks put back by undo/redo; their next save is a full upsert.
    restored: HashSet<String>,

    focused: Option<String>,
    focus_request: Option<FocusRequest>,
    focus_seq: u64,
    highlighted: Option<String>,

    owners: OwnerStack,
    slash: SlashPalette,
    context_menu: ContextMenu,
    move_to: MoveToPicker,
    drag: DragState,
}

impl EditorCore {
    pub fn new(page_id: &str, actor_id: Option<String>, settings: EditorSettings) -> Self {
        Self {
            page_id: page_id.to_string(),
            actor_id,
            history: History::new(settings.history_limit),
            autosave: AutosaveQueue::new(settings.autosave_ms),
            settings,
            load: LoadState::Loading,
            blocks: vec![],
            row_keys: HashMap::new(),
            next_row_key: 1,
            revisions: HashMap::new(),
            next_rev: 1,
            text_burst_until: None,
            outbox: vec![],
            aliases: HashMap::new(),
            pending_creates: HashSet::new(),
            tmp_dirty: HashSet::new(),
            tmp_deleted: HashSet::new(),
            failed_creates: HashSet::new(),
            restored: HashSet::new(),
            focused: None,
            focus_request: None,
            focus_seq: 0,
            highlighted: None,
            owners: OwnerStack::default(),
            slash: SlashPalette::default(),
            context_menu: ContextMenu::default(),
            move_to: MoveToPicker::default(),
            drag: DragState::default(),
        }
    }

    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        find(&self.blocks, &self.canonical(id))
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn focus_request(&self) -> Option<&FocusRequest> {
        self.focus_request.as_ref()
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    pub fn slash(&self) -> &SlashPalette {
        &self.slash
    }

    pub fn context_menu(&self) -> &ContextMenu {
        &self.context_menu
    }

    pub fn move_to(&self) -> &MoveToPicker {
        &self.move_to
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    #[cfg(test)]
    pub fn input_owner(&self) -> Option<InputOwner> {
        self.owners.top()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn has_pending_saves(&self) -> bool {
        self.autosave.len() > 0
    }

    /// Earliest deadline a flush could act on; tmp blocks wait for their id.
    pub fn next_autosave_deadline(&self) -> Option<i64> {
        self.autosave.next_deadline(|id| !is_tmp_id(id))
    }

    pub fn has_pending_calls(&self) -> bool {
        !self.outbox.is_empty()
    }

    /// Map an id a caller may have captured before a create resolved.
    pub fn canonical(&self, id: &str) -> String {
        self.aliases
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    pub fn row_key(&self, id: &str) -> Option<u64> {
        self.row_keys.get(&self.canonical(id)).copied()
    }

    pub fn rows(&self) -> Vec<RowData> {
        self.blocks
            .iter()
            .zip(render_blocks(&self.blocks))
            .map(|(b, fragment)| RowData {
                row_key: self.row_keys.get(&b.id).copied().unwrap_or_default(),
                rev: self.revisions.get(&b.id).copied().unwrap_or_default(),
                fragment,
            })
            .collect()
    }

    /// Inline color style; read reactively so color changes stay attribute-only.
    pub fn style_for(&self, id: &str) -> String {
        self.block(id)
            .map(|b| color::color_style(&b.props))
            .unwrap_or_default()
    }

    pub fn drop_edge_for(&self, id: &str) -> Option<DropEdge> {
        self.drag.indicator_for(&self.canonical(id))
    }

    /// Drain queued service calls.
    pub fn take_pending_calls(&mut self) -> Vec<ServiceCall> {
        std::mem::take(&mut self.outbox)
    }

    fn require(&self, id: &str) -> Result<usize, EditorError> {
        index_of(&self.blocks, id).ok_or_else(|| EditorError::UnknownBlock(id.to_string()))
    }

    fn require_persisted(&self, id: &str) -> Result<usize, EditorError> {
        let idx = self.require(id)?;
        if is_tmp_id(id) {
            return Err(EditorError::PendingCreate(id.to_string()));
        }
        Ok(idx)
    }

    fn track_row(&mut self, id: &str) {
        if !self.row_keys.contains_key(id) {
            self.row_keys.insert(id.to_string(), self.next_row_key);
            self.next_row_key += 1;
        }
        self.bump(id);
    }

    fn bump(&mut self, id: &str) {
        self.revisions.insert(id.to_string(), self.next_rev);
        self.next_rev += 1;
    }

    fn bump_all(&mut self) {
        let ids = ordered_ids(&self.blocks);
        for id in ids {
            self.track_row(&id);
        }
    }

    fn forget_row(&mut self, id: &str) {
        self.row_keys.remove(id);
        self.revisions.remove(id);
        // Rows that held the old tmp id are gone with it.
        self.aliases.retain(|_, real| real != id);
    }

    fn focus(&mut self, id: &str, caret: Caret) {
        let Some(row_key) = self.row_keys.get(id).copied() else {
            return;
        };
        self.focus_seq += 1;
        self.focused = Some(id.to_string());
        self.focus_request = Some(FocusRequest {
            block_id: id.to_string(),
            row_key,
            caret,
            seq: self.focus_seq,
        });
    }

    /// Push the current state as an undo step. Ends any typing burst.
    fn checkpoint(&mut self) {
        self.history.record(Snapshot::capture(&self.blocks));
        self.text_burst_until = None;
    }

    fn new_block(&self, kind: BlockType, text: &str, position: f64, now_ms: i64) -> Block {
        Block {
            id: make_tmp_id(now_ms, random_u64()),
            kind,
            content: BlockContent::new(text),
            props: BlockProps::defaults_for(kind),
            position,
            page_id: self.page_id.clone(),
            created_by: self.actor_id.clone(),
            updated_at: None,
        }
    }

    fn queue_create(&mut self, b: &Block) {
        self.pending_creates.insert(b.id.clone());
        self.outbox.push(ServiceCall::Create {
            tmp_id: b.id.clone(),
            draft: BlockDraft {
                page_id: b.page_id.clone(),
                kind: b.kind,
                content: b.content.clone(),
                props: b.props.clone(),
                position: b.position,
                created_by: b.created_by.clone(),
            },
        });
    }

    /// Queue an immediate update. Updates for tmp blocks wait for their id.
    fn queue_update(&mut self, id: &str, patch: BlockPatch) {
        if is_tmp_id(id) {
            if !self.retry_create(id) {
                self.tmp_dirty.insert(id.to_string());
            }
            return;
        }
        self.outbox.push(ServiceCall::Update {
            block_id: id.to_string(),
            patch,
        });
    }

    /// Send a rejected create again, carrying the block as it is now.
    fn retry_create(&mut self, id: &str) -> bool {
        if !self.failed_creates.remove(id) {
            return false;
        }
        let Some(b) = find(&self.blocks, id).cloned() else {
            return false;
        };
        self.autosave.cancel(id);
        self.queue_create(&b);
        true
    }

    fn queue_delete(&mut self, id: &str) {
        self.autosave.cancel(id);
        self.restored.remove(id);
        if is_tmp_id(id) {
            // A rejected create stays marked so an undo that brings the
            // block back sends it again.
            self.tmp_dirty.remove(id);
            if self.pending_creates.contains(id) {
                self.tmp_deleted.insert(id.to_string());
            }
            return;
        }
        self.outbox.push(ServiceCall::Delete {
            block_id: id.to_string(),
        });
    }

    /// Patch for a debounced save of `id`.
    fn save_patch(&mut self, id: &str) -> Option<BlockPatch> {
        let b = find(&self.blocks, id)?;
        if self.restored.remove(id) {
            Some(BlockPatch::full(b))
        } else {
            Some(BlockPatch::edit(b))
        }
    }

    /// Send a pending debounced save right away (before an op that depends on
    /// the server copy being current).
    fn flush_one(&mut self, id: &str) {
        if self.autosave.cancel(id) {
            if let Some(patch) = self.save_patch(id) {
                self.queue_update(id, patch);
            }
        }
    }

    fn remove_at(&mut self, idx: usize) -> Block {
        let b = self.blocks.remove(idx);
        self.queue_delete(&b.id);
        self.forget_row(&b.id);
        if self.focused.as_deref() == Some(b.id.as_str()) {
            self.focused = None;
        }
        if self.slash.block_id() == Some(b.id.as_str()) {
            self.close_menus();
        }
        b
    }

    fn insert_block_after(&mut self, idx: usize, kind: BlockType, text: &str, now_ms: i64) -> String {
        let position = position_after(&self.blocks, idx);
        let b = self.new_block(kind, text, position, now_ms);
        let id = b.id.clone();
        self.queue_create(&b);
        self.blocks.insert(idx + 1, b);
        self.track_row(&id);
        id
    }

    /// Apply the result of the initial page fetch.
    ///
    /// An empty page gets one empty text block. A failed fetch leaves the
    /// editor visibly empty instead of failing the host page.
    pub fn load(&mut self, result: Result<Vec<Block>, String>, now_ms: i64) {
        self.history.clear();
        self.autosave = AutosaveQueue::new(self.settings.autosave_ms);
        self.outbox.clear();
        self.aliases.clear();
        self.restored.clear();
        self.failed_creates.clear();

        let mut blocks = match result {
            Ok(blocks) => blocks,
            Err(e) => {
                log::warn!("editor: failed to load page {}: {e}", self.page_id);
                self.blocks.clear();
                self.load = LoadState::Failed(e);
                return;
            }
        };

        blocks.retain(|b| b.page_id == self.page_id || b.page_id.is_empty());
        sort_by_position(&mut blocks);
        self.blocks = blocks;

        if self.blocks.is_empty() {
            let b = self.new_block(BlockType::Text, "", next_position(&[]), now_ms);
            self.queue_create(&b);
            self.blocks.push(b);
        }

        self.bump_all();
        self.load = LoadState::Ready;
        if let Some(first) = self.blocks.first().map(|b| b.id.clone()) {
            self.focus(&first, Caret::Start);
        }
        log::info!(
            "editor: page {} loaded with {} blocks",
            self.page_id,
            self.blocks.len()
        );
    }

    /// Tear down transient state. Pending debounced saves are cancelled unless
    /// `flush` is set, in which case they are queued immediately.
    pub fn unmount(&mut self, flush: bool) -> Vec<ServiceCall> {
        self.close_menus();
        self.drag.cancel();
        let pending = self.autosave.take_all();
        if flush {
            for id in pending {
                if let Some(patch) = self.save_patch(&id) {
                    self.queue_update(&id, patch);
                }
            }
        } else if !pending.is_empty() {
            log::warn!(
                "editor: unmounting with {} unsaved block edit(s); discarding",
                pending.len()
            );
        }
        self.take_pending_calls()
    }

    /// Insert a new block right after `after_id` and focus its start.
    pub fn insert_after(
        &mut self,
        after_id: &str,
        kind: BlockType,
        text: &str,
        now_ms: i64,
    ) -> Option<String> {
        let after_id = self.canonical(after_id);
        let idx = quietly(self.require(&after_id))?;
        self.checkpoint();
        let id = self.insert_block_after(idx, kind, text, now_ms);
        self.focus(&id, Caret::Start);
        Some(id)
    }

    pub fn delete_block(&mut self, id: &str) -> bool {
        let id = self.canonical(id);
        quietly(self.try_delete(&id)).is_some()
    }

    fn try_delete(&mut self, id: &str) -> Result<(), EditorError> {
        let idx = self.require(id)?;
        if self.blocks.len() <= 1 {
            return Err(EditorError::LastBlock);
        }
        self.checkpoint();
        self.remove_at(idx);

        let (target, caret) = if idx > 0 {
            (self.blocks[idx - 1].id.clone(), Caret::End)
        } else {
            (self.blocks[0].id.clone(), Caret::Start)
        };
        self.focus(&target, caret);
        Ok(())
    }

    pub fn duplicate(&mut self, id: &str, now_ms: i64) -> Option<String> {
        let id = self.canonical(id);
        let idx = quietly(self.require_persisted(&id))?;
        self.checkpoint();
        // The server clones its own copy, so it must be current.
        self.flush_one(&id);

        let position = position_after(&self.blocks, idx);
        let mut copy = self.blocks[idx].clone();
        copy.id = make_tmp_id(now_ms, random_u64());
        copy.position = position;
        copy.created_by = self.actor_id.clone();
        copy.updated_at = None;
        let copy_id = copy.id.clone();

        self.pending_creates.insert(copy_id.clone());
        // The server picks its own position for the clone; realign afterwards.
        self.tmp_dirty.insert(copy_id.clone());
        self.outbox.push(ServiceCall::Duplicate {
            source_id: id.clone(),
            tmp_id: copy_id.clone(),
        });

        self.blocks.insert(idx + 1, copy);
        self.track_row(&copy_id);
        self.focus(&copy_id, Caret::Start);
        Some(copy_id)
    }

    /// Change a block's type. Text is preserved; props only gain defaults.
    pub fn transform(&mut self, id: &str, kind: BlockType) -> bool {
        let id = self.canonical(id);
        quietly(self.try_transform(&id, kind, Caret::End)).is_some()
    }

    fn try_transform(&mut self, id: &str, kind: BlockType, caret: Caret) -> Result<(), EditorError> {
        let idx = self.require(id)?;
        if self.blocks[idx].kind == kind {
            return Err(EditorError::Unchanged(id.to_string()));
        }
        self.checkpoint();
        let b = &mut self.blocks[idx];
        b.kind = kind;
        b.props.apply_defaults(kind);
        let patch = BlockPatch {
            kind: Some(kind),
            props: Some(b.props.clone()),
            ..Default::default()
        };
        self.bump(id);
        self.queue_update(id, patch);
        self.focus(id, caret);
        Ok(())
    }

    /// Attribute-only change; the row is not re-rendered.
    pub fn set_color(&mut self, id: &str, channel: ColorChannel, name: &str) -> bool {
        let id = self.canonical(id);
        let Some(b) = find_mut(&mut self.blocks, &id) else {
            return false;
        };
        color::set_color(&mut b.props, channel, name);
        let patch = BlockPatch::props(&b.props);
        self.queue_update(&id, patch);
        true
    }

    fn update_props(&mut self, id: &str, f: impl FnOnce(&mut BlockProps)) -> bool {
        let id = self.canonical(id);
        let Some(b) = find_mut(&mut self.blocks, &id) else {
            return false;
        };
        f(&mut b.props);
        let patch = BlockPatch::props(&b.props);
        self.bump(&id);
        self.queue_update(&id, patch);
        true
    }

    pub fn toggle_checked(&mut self, id: &str) -> bool {
        self.update_props(id, |p| p.checked = Some(!p.checked.unwrap_or(false)))
    }

    pub fn toggle_open(&mut self, id: &str) -> bool {
        self.update_props(id, |p| p.open = Some(!p.open.unwrap_or(false)))
    }

    pub fn set_language(&mut self, id: &str, language: &str) -> bool {
        let language = language.to_string();
        self.update_props(id, move |p| p.language = Some(language))
    }

    /// Ask the service for a shareable slug; no model change.
    pub fn request_link(&mut self, id: &str) -> bool {
        let id = self.canonical(id);
        if quietly(self.require_persisted(&id)).is_none() {
            return false;
        }
        self.outbox.push(ServiceCall::CreateLink { block_id: id });
        true
    }

    /// Move a block to another page. It leaves this page's list; the target
    /// page is not loaded.
    pub fn move_to_page(&mut self, id: &str, target_page_id: &str) -> bool {
        let id = self.canonical(id);
        quietly(self.try_move(&id, target_page_id)).is_some()
    }

    fn try_move(&mut self, id: &str, target_page_id: &str) -> Result<(), EditorError> {
        let idx = self.require_persisted(id)?;
        if target_page_id == self.page_id {
            return Err(EditorError::Unchanged(id.to_string()));
        }
        if self.blocks.len() <= 1 {
            return Err(EditorError::LastBlock);
        }
        // The pending save must not carry this page's id or position.
        self.restored.remove(id);
        self.flush_one(id);
        self.history.forget(id);
        self.outbox.push(ServiceCall::MoveToPage {
            block_id: id.to_string(),
            target_page_id: target_page_id.to_string(),
        });
        // Not a delete on the server: drop locally without queueing one.
        let b = self.blocks.remove(idx);
        self.forget_row(&b.id);
        let target = self.blocks[idx.saturating_sub(1)].id.clone();
        self.focus(&target, Caret::End);
        Ok(())
    }

    pub fn on_focus(&mut self, id: &str) {
        let id = self.canonical(id);
        if find(&self.blocks, &id).is_some() {
            self.focused = Some(id);
        }
    }

    /// Focus left the surface of `id`. Window shortcuts stop targeting it.
    pub fn on_blur(&mut self, id: &str) {
        let id = self.canonical(id);
        if self.focused.as_deref() == Some(id.as_str()) {
            self.focused = None;
        }
    }

    /// The text surface of `id` now holds `text`.
    ///
    /// The first edit after an idle gap records an undo step, so a burst of
    /// keystrokes undoes as one unit. The block's debounced save is re-armed.
    pub fn on_input(&mut self, id: &str, text: &str, anchor: Point, now_ms: i64) -> bool {
        let id = self.canonical(id);
        let Some(current) = find(&self.blocks, &id).map(|b| b.content.text.clone()) else {
            return false;
        };
        if current == text {
            return false;
        }

        let in_burst = self.text_burst_until.is_some_and(|until| now_ms < until);
        if !in_burst {
            self.history.record(Snapshot::capture(&self.blocks));
        }
        self.text_burst_until = Some(now_ms + self.settings.text_burst_ms);

        if let Some(b) = find_mut(&mut self.blocks, &id) {
            b.content.text = text.to_string();
        }
        if !self.retry_create(&id) {
            self.autosave.touch(&id, now_ms);
        }
        self.focused = Some(id.clone());

        if text == "/" {
            self.open_slash(&id, anchor);
        } else if self.slash.block_id() == Some(id.as_str()) {
            match text.strip_prefix('/') {
                Some(q) => self.slash.set_filter(q),
                None => {
                    self.close_menus();
                }
            }
        }
        true
    }

    /// Insert clipboard text as plain text over `sel`; returns the new caret.
    pub fn paste(&mut self, id: &str, sel: Selection, raw: &str, now_ms: i64) -> Option<usize> {
        let id = self.canonical(id);
        let current = find(&self.blocks, &id)?.content.text.clone();
        let (next, caret) = replace_range(&current, sel.start, sel.end, &normalize_pasted(raw));
        self.on_input(&id, &next, Point::default(), now_ms);
        self.bump(&id);
        self.focus(&id, Caret::At(caret));
        Some(caret)
    }

    /// Queue every debounced save whose deadline has passed.
    pub fn flush_due(&mut self, now_ms: i64) -> usize {
        let due = self.autosave.take_due(now_ms, |id| !is_tmp_id(id));
        for id in due.iter() {
            if let Some(patch) = self.save_patch(id) {
                self.outbox.push(ServiceCall::Update {
                    block_id: id.clone(),
                    patch,
                });
            }
        }
        due.len()
    }

    /// Enter: split at the selection. The tail moves into a new block of the
    /// same list family (otherwise plain text).
    fn split(&mut self, id: &str, sel: Selection, now_ms: i64) -> Result<(), EditorError> {
        let idx = self.require(id)?;
        let text = self.blocks[idx].content.text.clone();
        let (head, _) = split_at_char(&text, sel.start.min(sel.end));
        let (_, tail) = split_at_char(&text, sel.start.max(sel.end));
        let kind = self.blocks[idx].kind.continuation();

        self.checkpoint();
        self.blocks[idx].content.text = head.clone();
        self.bump(id);
        self.autosave.cancel(id);
        self.queue_update(id, BlockPatch::content(&head));

        let new_id = self.insert_block_after(idx, kind, &tail, now_ms);
        self.focus(&new_id, Caret::Start);
        Ok(())
    }

    /// Backspace at offset 0 of a collapsed selection.
    fn backspace_at_start(&mut self, id: &str) -> Result<(), EditorError> {
        let idx = self.require(id)?;
        let kind = self.blocks[idx].kind;
        if kind != BlockType::Text && kind.has_text() {
            // First backspace only flattens formatting.
            return self.try_transform(id, BlockType::Text, Caret::Start);
        }
        if idx == 0 {
            return Err(EditorError::NothingToMerge);
        }

        self.checkpoint();
        if !self.blocks[idx - 1].kind.has_text() {
            self.remove_at(idx - 1);
            self.focus(id, Caret::Start);
            return Ok(());
        }

        let tail = self.blocks[idx].content.text.clone();
        let prev = &mut self.blocks[idx - 1];
        let boundary = char_len(&prev.content.text);
        prev.content.text.push_str(&tail);
        let prev_id = prev.id.clone();
        let merged = prev.content.text.clone();

        self.bump(&prev_id);
        self.autosave.cancel(&prev_id);
        self.queue_update(&prev_id, BlockPatch::content(&merged));
        self.remove_at(idx);
        self.focus(&prev_id, Caret::At(boundary));
        Ok(())
    }

    fn neighbor(&self, id: &str, delta: isize) -> Option<String> {
        let idx = index_of(&self.blocks, id)? as isize + delta;
        if idx < 0 {
            return None;
        }
        self.blocks.get(idx as usize).map(|b| b.id.clone())
    }

    pub fn handle_key(&mut self, target: KeyTarget, k: &KeyInput, now_ms: i64) -> KeyOutcome {
        if self.route_to_owner(k) == KeyOutcome::Handled {
            return KeyOutcome::Handled;
        }
        match target {
            // An open menu owns the keyboard; shortcuts wait until it closes.
            KeyTarget::Window if !self.owners.is_editor() => KeyOutcome::Ignored,
            KeyTarget::Window => self.handle_shortcut(k, now_ms),
            KeyTarget::Block { id, selection } => {
                let id = self.canonical(&id);
                self.handle_block_key(&id, selection, k, now_ms)
            }
        }
    }

    fn route_to_owner(&mut self, k: &KeyInput) -> KeyOutcome {
        match self.owners.top() {
            Some(InputOwner::SlashPalette) => {
                let block_id = self.slash.block_id().map(str::to_string);
                match self.slash.handle_key(k) {
                    PaletteOutcome::Ignored => KeyOutcome::Ignored,
                    PaletteOutcome::Handled => KeyOutcome::Handled,
                    PaletteOutcome::Selected(cmd) => {
                        self.owners.release(InputOwner::SlashPalette);
                        if let Some(id) = block_id {
                            self.apply_slash(&id, cmd);
                        }
                        KeyOutcome::Handled
                    }
                    PaletteOutcome::Closed => {
                        self.owners.release(InputOwner::SlashPalette);
                        KeyOutcome::Handled
                    }
                }
            }
            Some(InputOwner::ContextMenu) => {
                let block_id = self.context_menu.block_id().map(str::to_string);
                let outcome = self.context_menu.handle_key(k);
                self.after_context_outcome(block_id, outcome)
            }
            Some(InputOwner::MoveTo) => {
                let outcome = self.move_to.handle_key(k);
                self.after_picker_outcome(outcome)
            }
            None => KeyOutcome::Ignored,
        }
    }

    fn handle_shortcut(&mut self, k: &KeyInput, now_ms: i64) -> KeyOutcome {
        let Some(shortcut) = shortcut_for(k) else {
            return KeyOutcome::Ignored;
        };
        let handled = match shortcut {
            Shortcut::Undo => self.undo(now_ms),
            Shortcut::Redo => self.redo(now_ms),
            Shortcut::Duplicate => match self.focused.clone() {
                Some(id) => self.duplicate(&id, now_ms).is_some(),
                None => false,
            },
            Shortcut::DeleteIfEmpty => {
                let empty_focused = self
                    .focused
                    .as_deref()
                    .and_then(|id| find(&self.blocks, id))
                    .filter(|b| b.content.text.is_empty())
                    .map(|b| b.id.clone());
                match empty_focused {
                    Some(id) => {
                        self.delete_block(&id);
                        true
                    }
                    None => false,
                }
            }
            Shortcut::CloseMenus => self.close_menus(),
        };
        if handled {
            KeyOutcome::Handled
        } else {
            KeyOutcome::Ignored
        }
    }

    fn handle_block_key(&mut self, id: &str, sel: Selection, k: &KeyInput, now_ms: i64) -> KeyOutcome {
        let Some(block) = find(&self.blocks, id) else {
            return KeyOutcome::Ignored;
        };
        let has_text = block.kind.has_text();
        let len = char_len(&block.content.text);
        let plain = !k.has_modifier();

        if !has_text {
            return match k.key.as_str() {
                "Backspace" | "Delete" => {
                    self.delete_block(id);
                    KeyOutcome::Handled
                }
                "Enter" => {
                    self.insert_after(id, BlockType::Text, "", now_ms);
                    KeyOutcome::Handled
                }
                "ArrowUp" => self.focus_neighbor(id, -1, Caret::End),
                "ArrowDown" => self.focus_neighbor(id, 1, Caret::Start),
                _ => KeyOutcome::Ignored,
            };
        }

        match k.key.as_str() {
            "Enter" if plain => {
                quietly(self.split(id, sel, now_ms));
                KeyOutcome::Handled
            }
            "Backspace" if plain && sel.is_collapsed() && sel.start == 0 => {
                quietly(self.backspace_at_start(id));
                KeyOutcome::Handled
            }
            "ArrowUp" if plain && sel.is_collapsed() && sel.start == 0 => {
                self.focus_neighbor(id, -1, Caret::End)
            }
            "ArrowDown" if plain && sel.is_collapsed() && sel.start >= len => {
                self.focus_neighbor(id, 1, Caret::Start)
            }
            _ => KeyOutcome::Ignored,
        }
    }

    fn focus_neighbor(&mut self, id: &str, delta: isize, caret: Caret) -> KeyOutcome {
        match self.neighbor(id, delta) {
            Some(next) => {
                self.focus(&next, caret);
                KeyOutcome::Handled
            }
            None => KeyOutcome::Ignored,
        }
    }

    pub fn undo(&mut self, now_ms: i64) -> bool {
        let current = Snapshot::capture(&self.blocks);
        match self.history.undo(current) {
            Some(prev) => {
                self.restore(&prev, now_ms);
                true
            }
            None => quietly::<()>(Err(EditorError::EmptyHistory)).is_some(),
        }
    }

    pub fn redo(&mut self, now_ms: i64) -> bool {
        let current = Snapshot::capture(&self.blocks);
        match self.history.redo(current) {
            Some(next) => {
                self.restore(&next, now_ms);
                true
            }
            None => quietly::<()>(Err(EditorError::EmptyHistory)).is_some(),
        }
    }

    fn restore(&mut self, snap: &Snapshot, now_ms: i64) {
        self.text_burst_until = None;
        self.close_menus();
        self.drag.cancel();

        let r = reconcile(&mut self.blocks, snap, &self.page_id);

        for id in r.dropped.iter() {
            self.queue_delete(id);
            self.forget_row(id);
        }
        for id in r.recreated.iter() {
            if self.tmp_deleted.remove(id) {
                self.tmp_dirty.insert(id.clone());
            }
        }
        let to_save = r.to_save().cloned().collect::<Vec<_>>();
        for id in to_save.iter() {
            if is_tmp_id(id) {
                if !self.retry_create(id) {
                    self.tmp_dirty.insert(id.clone());
                }
            } else {
                self.restored.insert(id.clone());
                self.autosave.touch(id, now_ms);
            }
        }

        self.bump_all();

        let keep = self
            .focused
            .clone()
            .filter(|id| find(&self.blocks, id).is_some())
            .or_else(|| self.blocks.first().map(|b| b.id.clone()));
        match keep {
            Some(id) => self.focus(&id, Caret::End),
            None => self.focused = None,
        }
    }

    pub fn drag_start(&mut self, id: &str) {
        let id = self.canonical(id);
        if find(&self.blocks, &id).is_some() {
            self.close_menus();
            self.drag.start(&id);
        }
    }

    pub fn drag_over(&mut self, id: &str, pointer_y: f64, rect: Rect) -> bool {
        let id = self.canonical(id);
        self.drag.over(&id, pointer_y, rect)
    }

    pub fn drag_cancel(&mut self) {
        self.drag.cancel();
    }

    /// Finish a drag. A valid drop renumbers every position to 1..=n and
    /// persists the full order in one call.
    pub fn drag_drop(&mut self) -> bool {
        quietly(self.try_drop()).is_some()
    }

    fn try_drop(&mut self) -> Result<(), EditorError> {
        let plan = self.drag.finish().ok_or(EditorError::NoDropTarget)?;
        if let Some(tmp) = self.blocks.iter().find(|b| is_tmp_id(&b.id)) {
            return Err(EditorError::PendingCreate(tmp.id.clone()));
        }
        let ids = ordered_ids(&self.blocks);
        let (from, to) = drop_index(&ids, &plan.dragged_id, &plan.target_id, plan.after)
            .ok_or(EditorError::NoDropTarget)?;
        if from == to {
            return Err(EditorError::Unchanged(plan.dragged_id));
        }

        self.checkpoint();
        let b = self.blocks.remove(from);
        self.blocks.insert(to, b);
        renumber(&mut self.blocks);
        self.bump_all();
        self.outbox.push(ServiceCall::Reorder {
            page_id: self.page_id.clone(),
            ordered_ids: ordered_ids(&self.blocks),
        });
        Ok(())
    }

    /// Close every transient menu; true if one was open.
    pub fn close_menus(&mut self) -> bool {
        let was_open = self.slash.is_open() || self.context_menu.is_open() || self.move_to.is_open();
        self.slash.close();
        self.context_menu.close();
        self.move_to.close();
        self.owners.clear();
        was_open
    }

    fn claim(&mut self, owner: InputOwner) {
        if let Some(displaced) = self.owners.claim(owner) {
            match displaced {
                InputOwner::SlashPalette => self.slash.close(),
                InputOwner::ContextMenu => self.context_menu.close(),
                InputOwner::MoveTo => self.move_to.close(),
            }
        }
    }

    fn open_slash(&mut self, id: &str, anchor: Point) {
        self.claim(InputOwner::SlashPalette);
        self.slash.open(id, anchor);
    }

    pub fn slash_hover(&mut self, idx: usize) {
        self.slash.hover(idx);
    }

    /// Pointer selection of palette entry `idx`.
    pub fn slash_activate(&mut self, idx: usize) -> bool {
        let Some(id) = self.slash.block_id().map(str::to_string) else {
            return false;
        };
        match self.slash.activate(idx) {
            Some(cmd) => {
                self.owners.release(InputOwner::SlashPalette);
                self.apply_slash(&id, cmd);
                true
            }
            None => false,
        }
    }

    /// Clear the typed `/query` and transform the block.
    fn apply_slash(&mut self, id: &str, cmd: SlashCommand) {
        let id = self.canonical(id);
        let SlashAction::Transform(kind) = cmd.action else {
            return;
        };
        let Ok(idx) = self.require(&id) else {
            return;
        };
        self.checkpoint();
        let b = &mut self.blocks[idx];
        b.content.text.clear();
        b.kind = kind;
        b.props.apply_defaults(kind);
        let patch = BlockPatch {
            kind: Some(kind),
            content: Some(b.content.clone()),
            props: Some(b.props.clone()),
            ..Default::default()
        };
        self.autosave.cancel(&id);
        self.bump(&id);
        self.queue_update(&id, patch);
        self.focus(&id, Caret::Start);
    }

    pub fn open_context_menu(&mut self, id: &str, anchor: Point) -> bool {
        let id = self.canonical(id);
        if find(&self.blocks, &id).is_none() {
            return false;
        }
        self.claim(InputOwner::ContextMenu);
        let can_delete = self.blocks.len() > 1;
        self.context_menu.open(&id, anchor, can_delete);
        true
    }

    pub fn context_hover(&mut self, idx: usize) {
        self.context_menu.hover(idx);
    }

    pub fn context_hover_sub(&mut self, idx: usize) {
        self.context_menu.hover_sub(idx);
    }

    pub fn context_activate(&mut self, idx: usize, now_ms: i64) -> bool {
        let block_id = self.context_menu.block_id().map(str::to_string);
        let outcome = self.context_menu.activate(idx);
        self.finish_context(block_id, outcome, now_ms)
    }

    pub fn context_activate_sub(&mut self, idx: usize, now_ms: i64) -> bool {
        let block_id = self.context_menu.block_id().map(str::to_string);
        let outcome = self.context_menu.activate_sub(idx);
        self.finish_context(block_id, outcome, now_ms)
    }

    fn finish_context(&mut self, block_id: Option<String>, outcome: MenuOutcome, now_ms: i64) -> bool {
        match outcome {
            MenuOutcome::Action(action) => {
                self.owners.release(InputOwner::ContextMenu);
                if let Some(id) = block_id {
                    self.apply_context_action(&id, action, now_ms);
                }
                true
            }
            MenuOutcome::Closed => {
                self.owners.release(InputOwner::ContextMenu);
                true
            }
            MenuOutcome::Handled => true,
            MenuOutcome::Ignored => false,
        }
    }

    fn after_context_outcome(&mut self, block_id: Option<String>, outcome: MenuOutcome) -> KeyOutcome {
        // Keyboard-driven actions carry no clock; debounce-free ops ignore it.
        if self.finish_context(block_id, outcome, 0) {
            KeyOutcome::Handled
        } else {
            KeyOutcome::Ignored
        }
    }

    fn apply_context_action(&mut self, id: &str, action: ContextAction, now_ms: i64) {
        match action {
            ContextAction::Transform(kind) => {
                self.transform(id, kind);
            }
            ContextAction::SetColor(channel, c) => {
                self.set_color(id, channel, c.as_ref());
            }
            ContextAction::Duplicate => {
                self.duplicate(id, now_ms);
            }
            ContextAction::CopyLink => {
                self.request_link(id);
            }
            ContextAction::MoveTo => {
                self.open_move_to(id);
            }
            ContextAction::Delete => {
                self.delete_block(id);
            }
        }
    }

    pub fn open_move_to(&mut self, id: &str) -> bool {
        let id = self.canonical(id);
        if quietly(self.require_persisted(&id)).is_none() {
            return false;
        }
        self.claim(InputOwner::MoveTo);
        let request_id = self.move_to.open(&id, &self.page_id.clone());
        self.outbox.push(ServiceCall::ListPages { request_id });
        true
    }

    pub fn set_move_to_pages(&mut self, request_id: u64, result: Result<Vec<Page>, String>) -> bool {
        self.move_to.set_pages(request_id, result)
    }

    pub fn move_to_filter(&mut self, q: &str) {
        self.move_to.set_filter(q);
    }

    pub fn move_to_hover(&mut self, idx: usize) {
        self.move_to.hover(idx);
    }

    pub fn move_to_pick(&mut self, page_id: &str) -> bool {
        let outcome = self.move_to.pick(page_id);
        self.after_picker_outcome(outcome) == KeyOutcome::Handled
    }

    fn after_picker_outcome(&mut self, outcome: PickerOutcome) -> KeyOutcome {
        match outcome {
            PickerOutcome::Ignored => KeyOutcome::Ignored,
            PickerOutcome::Handled => KeyOutcome::Handled,
            PickerOutcome::Picked { block_id, page_id } => {
                self.owners.release(InputOwner::MoveTo);
                self.move_to_page(&block_id, &page_id);
                KeyOutcome::Handled
            }
            PickerOutcome::Closed => {
                self.owners.release(InputOwner::MoveTo);
                KeyOutcome::Handled
            }
        }
    }

    /// A create (or duplicate) resolved: adopt the server id everywhere the
    /// tmp id lives, then send what was held back.
    pub fn resolve_created(&mut self, tmp_id: &str, real_id: &str) {
        self.pending_creates.remove(tmp_id);
        self.aliases.insert(tmp_id.to_string(), real_id.to_string());
        self.history.swap_id(tmp_id, real_id);

        if self.tmp_deleted.remove(tmp_id) {
            self.outbox.push(ServiceCall::Delete {
                block_id: real_id.to_string(),
            });
            return;
        }

        if let Some(b) = find_mut(&mut self.blocks, tmp_id) {
            b.id = real_id.to_string();
        }
        if let Some(k) = self.row_keys.remove(tmp_id) {
            self.row_keys.insert(real_id.to_string(), k);
        }
        if let Some(r) = self.revisions.remove(tmp_id) {
            self.revisions.insert(real_id.to_string(), r);
        }
        for slot in [&mut self.focused, &mut self.highlighted] {
            if slot.as_deref() == Some(tmp_id) {
                *slot = Some(real_id.to_string());
            }
        }
        if let Some(req) = self.focus_request.as_mut().filter(|r| r.block_id == tmp_id) {
            req.block_id = real_id.to_string();
        }

        let pending_save = self.autosave.rename(tmp_id, real_id);
        if self.tmp_dirty.remove(tmp_id) && !pending_save {
            if let Some(b) = find(&self.blocks, real_id) {
                let patch = BlockPatch::full(b);
                self.outbox.push(ServiceCall::Update {
                    block_id: real_id.to_string(),
                    patch,
                });
            }
        }
    }

    /// A create was rejected. The block stays local and its next edit sends
    /// the create again; a block already deleted locally is simply dropped.
    pub fn create_failed(&mut self, tmp_id: &str) {
        self.pending_creates.remove(tmp_id);
        self.tmp_dirty.remove(tmp_id);
        self.autosave.cancel(tmp_id);
        if !self.tmp_deleted.remove(tmp_id) && find(&self.blocks, tmp_id).is_some() {
            self.failed_creates.insert(tmp_id.to_string());
        }
    }

    pub fn highlight(&mut self, id: &str) -> bool {
        let id = self.canonical(id);
        if find(&self.blocks, &id).is_none() {
            return false;
        }
        self.highlighted = Some(id.clone());
        self.focus(&id, Caret::Start);
        true
    }

    pub fn clear_highlight(&mut self) {
        self.highlighted = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::document::block;
    use crate::editor::history::Snapshot;
    use pretty_assertions::assert_eq;

    const T0: i64 = 1_000_000;

    fn editor(blocks: Vec<Block>) -> EditorCore {
        let mut e = EditorCore::new("p1", Some("u1".to_string()), EditorSettings::default());
        e.load(Ok(blocks), T0);
        e.take_pending_calls();
        e
    }

    fn texts(e: &EditorCore) -> Vec<String> {
        e.blocks().iter().map(|b| b.content.text.clone()).collect()
    }

    fn key_at(e: &mut EditorCore, id: &str, at: usize, key: &str) -> KeyOutcome {
        e.handle_key(
            KeyTarget::Block {
                id: id.to_string(),
                selection: Selection::caret(at),
            },
            &KeyInput::plain(key),
            T0,
        )
    }

    fn focus_of(e: &EditorCore) -> (String, Caret) {
        let r = e.focus_request().expect("focus requested");
        (r.block_id.clone(), r.caret)
    }

    #[test]
    fn test_load_empty_page_bootstraps_text_block() {
        let mut e = EditorCore::new("p1", None, EditorSettings::default());
        e.load(Ok(vec![]), T0);
        assert_eq!(e.blocks().len(), 1);
        assert_eq!(e.blocks()[0].kind, BlockType::Text);
        let calls = e.take_pending_calls();
        assert!(matches!(calls.as_slice(), [ServiceCall::Create { .. }]));
        assert_eq!(e.load_state(), &LoadState::Ready);
    }

    #[test]
    fn test_load_failure_degrades_to_empty_editor() {
        let mut e = EditorCore::new("p1", None, EditorSettings::default());
        e.load(Err("offline".to_string()), T0);
        assert!(e.blocks().is_empty());
        assert_eq!(e.load_state(), &LoadState::Failed("offline".to_string()));
        assert!(e.take_pending_calls().is_empty());
    }

    #[test]
    fn test_load_sorts_and_focuses_first() {
        let e = editor(vec![block("b", "2", 2.0), block("a", "1", 1.0)]);
        assert_eq!(texts(&e), vec!["1", "2"]);
        assert_eq!(focus_of(&e), ("a".to_string(), Caret::Start));
    }

    #[test]
    fn test_split_then_merge_restores_text_and_caret() {
        let mut e = editor(vec![block("a", "Hello world", 1.0)]);
        assert_eq!(key_at(&mut e, "a", 6, "Enter"), KeyOutcome::Handled);
        assert_eq!(texts(&e), vec!["Hello ", "world"]);
        let second = e.blocks()[1].id.clone();
        assert_eq!(focus_of(&e), (second.clone(), Caret::Start));

        assert_eq!(key_at(&mut e, &second, 0, "Backspace"), KeyOutcome::Handled);
        assert_eq!(texts(&e), vec!["Hello world"]);
        assert_eq!(focus_of(&e), ("a".to_string(), Caret::At(6)));
    }

    #[test]
    fn test_split_inserts_between_with_fractional_position() {
        let mut e = editor(vec![block("a", "ab", 1.0), block("z", "", 2.0)]);
        key_at(&mut e, "a", 1, "Enter");
        assert_eq!(e.blocks()[1].position, 1.5);
        let calls = e.take_pending_calls();
        assert!(calls.iter().any(|c| matches!(
            c,
            ServiceCall::Update { block_id, patch } if block_id == "a"
                && patch.content == Some(BlockContent::new("a"))
        )));
        assert!(calls.iter().any(|c| matches!(
            c,
            ServiceCall::Create { draft, .. } if draft.content.text == "b" && draft.position == 1.5
        )));
    }

    #[test]
    fn test_split_continues_list_family() {
        let mut todo = block("a", "buy milk", 1.0);
        todo.kind = BlockType::Todo;
        todo.props.checked = Some(true);
        let mut e = editor(vec![todo]);
        key_at(&mut e, "a", 8, "Enter");
        let new = &e.blocks()[1];
        assert_eq!(new.kind, BlockType::Todo);
        assert_eq!(new.props.checked, Some(false));

        let mut h = block("h", "Title", 1.0);
        h.kind = BlockType::Heading1;
        let mut e = editor(vec![h]);
        key_at(&mut e, "h", 5, "Enter");
        assert_eq!(e.blocks()[1].kind, BlockType::Text);
    }

    #[test]
    fn test_shift_enter_is_native() {
        let mut e = editor(vec![block("a", "ab", 1.0)]);
        let out = e.handle_key(
            KeyTarget::Block {
                id: "a".to_string(),
                selection: Selection::caret(1),
            },
            &KeyInput::plain("Enter").shifted(),
            T0,
        );
        assert_eq!(out, KeyOutcome::Ignored);
        assert_eq!(e.blocks().len(), 1);
    }

    #[test]
    fn test_backspace_flattens_non_text_first() {
        let mut q = block("a", "x", 1.0);
        q.kind = BlockType::Quote;
        let mut e = editor(vec![block("z", "top", 0.5), q]);
        key_at(&mut e, "a", 0, "Backspace");
        assert_eq!(e.blocks().len(), 2);
        assert_eq!(e.blocks()[1].kind, BlockType::Text);
        assert_eq!(focus_of(&e), ("a".to_string(), Caret::Start));
    }

    #[test]
    fn test_backspace_on_first_block_is_noop() {
        let mut e = editor(vec![block("a", "x", 1.0), block("b", "y", 2.0)]);
        assert_eq!(key_at(&mut e, "a", 0, "Backspace"), KeyOutcome::Handled);
        assert_eq!(texts(&e), vec!["x", "y"]);
        assert!(!e.can_undo());
    }

    #[test]
    fn test_backspace_mid_text_is_native() {
        let mut e = editor(vec![block("a", "x", 1.0), block("b", "yz", 2.0)]);
        assert_eq!(key_at(&mut e, "b", 1, "Backspace"), KeyOutcome::Ignored);
    }

    #[test]
    fn test_merge_into_divider_removes_divider() {
        let mut d = block("d", "", 1.0);
        d.kind = BlockType::Divider;
        let mut e = editor(vec![block("a", "top", 0.5), d, block("b", "text", 2.0)]);
        key_at(&mut e, "b", 0, "Backspace");
        assert_eq!(texts(&e), vec!["top", "text"]);
        assert_eq!(focus_of(&e), ("b".to_string(), Caret::Start));
        let calls = e.take_pending_calls();
        assert!(calls.contains(&ServiceCall::Delete {
            block_id: "d".to_string()
        }));
    }

    #[test]
    fn test_arrow_navigation_crosses_blocks() {
        let mut e = editor(vec![block("a", "one", 1.0), block("b", "two", 2.0)]);
        assert_eq!(key_at(&mut e, "b", 0, "ArrowUp"), KeyOutcome::Handled);
        assert_eq!(focus_of(&e), ("a".to_string(), Caret::End));

        assert_eq!(key_at(&mut e, "a", 1, "ArrowDown"), KeyOutcome::Ignored);
        assert_eq!(key_at(&mut e, "a", 3, "ArrowDown"), KeyOutcome::Handled);
        assert_eq!(focus_of(&e), ("b".to_string(), Caret::Start));

        // No block below the last one: native caret movement.
        assert_eq!(key_at(&mut e, "b", 3, "ArrowDown"), KeyOutcome::Ignored);
    }

    #[test]
    fn test_delete_guard_keeps_last_block() {
        let mut e = editor(vec![block("a", "only", 1.0)]);
        assert!(!e.delete_block("a"));
        assert_eq!(e.blocks().len(), 1);
        assert!(e.take_pending_calls().is_empty());
    }

    #[test]
    fn test_delete_focuses_previous_or_first() {
        let mut e = editor(vec![
            block("a", "1", 1.0),
            block("b", "2", 2.0),
            block("c", "3", 3.0),
        ]);
        assert!(e.delete_block("b"));
        assert_eq!(focus_of(&e), ("a".to_string(), Caret::End));
        assert!(e.delete_block("a"));
        assert_eq!(focus_of(&e), ("c".to_string(), Caret::Start));
        let calls = e.take_pending_calls();
        assert_eq!(
            calls,
            vec![
                ServiceCall::Delete {
                    block_id: "b".to_string()
                },
                ServiceCall::Delete {
                    block_id: "a".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_transform_preserves_text_and_existing_props() {
        let mut b = block("a", "Hello world", 1.0);
        b.props.emoji = Some("🔥".to_string());
        b.props.text_color = Some("red".to_string());
        let mut e = editor(vec![b]);

        assert!(e.transform("a", BlockType::Callout));
        let after = e.block("a").unwrap();
        assert_eq!(after.text(), "Hello world");
        assert_eq!(after.props.emoji.as_deref(), Some("🔥"));
        assert_eq!(after.props.text_color.as_deref(), Some("red"));

        assert!(e.transform("a", BlockType::Heading1));
        let after = e.block("a").unwrap();
        assert_eq!(after.kind, BlockType::Heading1);
        assert_eq!(after.props.emoji.as_deref(), Some("🔥"));
        assert_eq!(focus_of(&e), ("a".to_string(), Caret::End));
    }

    #[test]
    fn test_transform_bumps_only_that_row() {
        let mut e = editor(vec![block("a", "1", 1.0), block("b", "2", 2.0)]);
        let before = e.rows();
        e.transform("a", BlockType::Quote);
        let after = e.rows();
        assert_ne!(before[0].rev, after[0].rev);
        assert_eq!(before[1].rev, after[1].rev);
    }

    #[test]
    fn test_set_color_is_attribute_only() {
        let mut e = editor(vec![block("a", "1", 1.0)]);
        let rev = e.rows()[0].rev;
        assert!(e.set_color("a", ColorChannel::Text, "blue"));
        assert_eq!(e.rows()[0].rev, rev);
        assert_eq!(e.style_for("a"), "color: #337ea9;");
        assert!(e.set_color("a", ColorChannel::Text, "default"));
        assert_eq!(e.block("a").unwrap().props.text_color, None);
    }

    #[test]
    fn test_debounce_coalesces_edits() {
        let mut e = editor(vec![block("a", "", 1.0)]);
        for (i, t) in ["H", "He", "Hel", "Hell", "Hello"].iter().enumerate() {
            e.on_input("a", t, Point::default(), T0 + i as i64 * 100);
        }
        assert_eq!(e.flush_due(T0 + 1000), 0);
        assert_eq!(e.flush_due(T0 + 400 + 800), 1);
        let calls = e.take_pending_calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            ServiceCall::Update { block_id, patch } => {
                assert_eq!(block_id, "a");
                assert_eq!(patch.content, Some(BlockContent::new("Hello")));
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[test]
    fn test_typing_burst_is_one_undo_step() {
        let mut e = editor(vec![block("a", "", 1.0)]);
        e.on_input("a", "a", Point::default(), T0);
        e.on_input("a", "ab", Point::default(), T0 + 300);
        e.on_input("a", "abc", Point::default(), T0 + 600);
        // Idle gap, then a second burst.
        e.on_input("a", "abcd", Point::default(), T0 + 2000);

        assert!(e.undo(T0 + 2100));
        assert_eq!(texts(&e), vec!["abc"]);
        assert!(e.undo(T0 + 2200));
        assert_eq!(texts(&e), vec![""]);
        assert!(!e.undo(T0 + 2300));
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut e = editor(vec![block("a", "Hello world", 1.0), block("b", "x", 2.0)]);
        let s0 = Snapshot::capture(e.blocks());

        key_at(&mut e, "a", 6, "Enter");
        e.transform("b", BlockType::Heading2);
        e.delete_block("b");
        let s3 = Snapshot::capture(e.blocks());

        for _ in 0..3 {
            assert!(e.undo(T0));
        }
        assert_eq!(Snapshot::capture(e.blocks()), s0);

        for _ in 0..3 {
            assert!(e.redo(T0));
        }
        assert_eq!(Snapshot::capture(e.blocks()), s3);
    }

    #[test]
    fn test_undo_of_delete_restores_and_schedules_save() {
        let mut e = editor(vec![block("a", "1", 1.0), block("b", "2", 2.0)]);
        e.delete_block("b");
        e.take_pending_calls();
        assert!(e.undo(T0));
        assert_eq!(texts(&e), vec!["1", "2"]);
        assert!(e.has_pending_saves());
        e.flush_due(T0 + 800);
        let calls = e.take_pending_calls();
        assert!(matches!(
            calls.as_slice(),
            [ServiceCall::Update { block_id, patch }] if block_id == "b" && patch.page_id.is_some()
        ));
    }

    #[test]
    fn test_undo_of_insert_drops_new_block() {
        let mut e = editor(vec![block("a", "1", 1.0)]);
        let id = e.insert_after("a", BlockType::Text, "", T0).unwrap();
        e.resolve_created(&id, "real-2");
        e.take_pending_calls();
        assert!(e.undo(T0));
        assert_eq!(e.blocks().len(), 1);
        assert_eq!(
            e.take_pending_calls(),
            vec![ServiceCall::Delete {
                block_id: "real-2".to_string()
            }]
        );
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut e = editor(vec![block("a", "1", 1.0), block("b", "2", 2.0)]);
        e.transform("a", BlockType::Quote);
        e.undo(T0);
        assert!(e.can_redo());
        e.transform("b", BlockType::Quote);
        assert!(!e.can_redo());
    }

    #[test]
    fn test_reorder_renumbers_and_persists_order() {
        let mut e = editor(vec![block("a", "Hello world", 1.0), block("b", "other", 2.0)]);
        e.transform("a", BlockType::Heading1);
        e.take_pending_calls();

        e.drag_start("a");
        assert!(e.drag_over(
            "b",
            35.0,
            Rect {
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 40.0
            }
        ));
        assert!(e.drag_drop());

        assert_eq!(ordered_ids(e.blocks()), vec!["b", "a"]);
        assert_eq!(
            e.blocks().iter().map(|b| b.position).collect::<Vec<_>>(),
            vec![1.0, 2.0]
        );
        assert_eq!(
            e.take_pending_calls(),
            vec![ServiceCall::Reorder {
                page_id: "p1".to_string(),
                ordered_ids: vec!["b".to_string(), "a".to_string()]
            }]
        );
    }

    #[test]
    fn test_drop_without_target_is_silent() {
        let mut e = editor(vec![block("a", "1", 1.0), block("b", "2", 2.0)]);
        e.drag_start("a");
        assert!(!e.drag_drop());
        assert!(!e.can_undo());
        assert!(e.take_pending_calls().is_empty());
    }

    #[test]
    fn test_slash_palette_flow() {
        let mut e = editor(vec![block("a", "", 1.0)]);
        e.on_input("a", "/", Point { x: 5.0, y: 5.0 }, T0);
        assert!(e.slash().is_open());
        assert_eq!(e.input_owner(), Some(InputOwner::SlashPalette));

        e.on_input("a", "/quo", Point::default(), T0 + 50);
        assert_eq!(e.slash().filter(), "quo");

        assert_eq!(key_at(&mut e, "a", 4, "Enter"), KeyOutcome::Handled);
        let b = e.block("a").unwrap();
        assert_eq!(b.kind, BlockType::Quote);
        assert_eq!(b.text(), "");
        assert!(!e.slash().is_open());
        assert_eq!(e.input_owner(), None);
        assert_eq!(e.blocks().len(), 1);
    }

    #[test]
    fn test_slash_closes_when_prefix_removed() {
        let mut e = editor(vec![block("a", "", 1.0)]);
        e.on_input("a", "/", Point::default(), T0);
        e.on_input("a", "", Point::default(), T0 + 10);
        assert!(!e.slash().is_open());
    }

    #[test]
    fn test_only_one_menu_captures_keys() {
        let mut e = editor(vec![block("a", "", 1.0), block("b", "", 2.0)]);
        e.on_input("a", "/", Point::default(), T0);
        assert!(e.open_context_menu("b", Point::default()));
        assert!(!e.slash().is_open());
        assert_eq!(e.input_owner(), Some(InputOwner::ContextMenu));

        let out = e.handle_key(KeyTarget::Window, &KeyInput::plain("Escape"), T0);
        assert_eq!(out, KeyOutcome::Handled);
        assert!(!e.context_menu().is_open());
        assert_eq!(e.input_owner(), None);
    }

    #[test]
    fn test_context_menu_move_to_flow() {
        let mut e = editor(vec![block("a", "1", 1.0), block("b", "2", 2.0)]);
        e.open_context_menu("b", Point::default());
        // "Move to" is the fifth entry.
        assert!(e.context_activate(4, T0));
        assert_eq!(e.input_owner(), Some(InputOwner::MoveTo));
        let calls = e.take_pending_calls();
        let [ServiceCall::ListPages { request_id }] = calls.as_slice() else {
            panic!("expected a page list request, got {calls:?}");
        };

        e.set_move_to_pages(
            *request_id,
            Ok(vec![
                Page {
                    id: "p1".to_string(),
                    title: "Here".to_string(),
                    icon: None,
                },
                Page {
                    id: "p2".to_string(),
                    title: "There".to_string(),
                    icon: None,
                },
            ]),
        );
        assert!(e.move_to_pick("p2"));
        assert_eq!(texts(&e), vec!["1"]);
        assert_eq!(
            e.take_pending_calls(),
            vec![ServiceCall::MoveToPage {
                block_id: "b".to_string(),
                target_page_id: "p2".to_string()
            }]
        );
        assert_eq!(e.input_owner(), None);
    }

    #[test]
    fn test_move_flushes_pending_edit_first() {
        let mut e = editor(vec![block("a", "1", 1.0), block("b", "2", 2.0)]);
        e.on_input("b", "22", Point::default(), T0);
        assert!(e.move_to_page("b", "p2"));
        let calls = e.take_pending_calls();
        assert!(matches!(
            &calls[0],
            ServiceCall::Update { block_id, patch }
                if block_id == "b" && patch.page_id.is_none() && patch.position.is_none()
        ));
        assert!(matches!(calls[1], ServiceCall::MoveToPage { .. }));
        assert!(!e.has_pending_saves());
    }

    #[test]
    fn test_moved_block_stays_gone_after_undo() {
        let mut e = editor(vec![block("a", "1", 1.0), block("b", "2", 2.0), block("c", "3", 3.0)]);
        e.transform("a", BlockType::Quote);
        assert!(e.move_to_page("c", "p2"));
        e.take_pending_calls();

        assert!(e.undo(T0));
        assert_eq!(texts(&e), vec!["1", "2"]);
        assert_eq!(e.blocks()[0].kind, BlockType::Text);
        assert!(e.redo(T0));
        assert_eq!(texts(&e), vec!["1", "2"]);

        e.flush_due(T0 + 800);
        let calls = e.take_pending_calls();
        assert!(!calls.is_empty());
        for call in calls.iter() {
            assert!(
                !matches!(call, ServiceCall::Update { block_id, .. } | ServiceCall::Delete { block_id } if block_id == "c"),
                "moved block touched by {call:?}"
            );
        }
    }

    #[test]
    fn test_typing_saves_leave_page_and_position_alone() {
        let mut e = editor(vec![block("a", "1", 1.0)]);
        e.on_input("a", "12", Point::default(), T0);
        e.flush_due(T0 + 800);
        let calls = e.take_pending_calls();
        assert!(matches!(
            calls.as_slice(),
            [ServiceCall::Update { patch, .. }] if patch.page_id.is_none() && patch.position.is_none()
        ));
    }

    #[test]
    fn test_global_shortcuts() {
        let mut e = editor(vec![block("a", "1", 1.0), block("b", "", 2.0)]);
        e.on_focus("a");
        let out = e.handle_key(KeyTarget::Window, &KeyInput::with_mod("d"), T0);
        assert_eq!(out, KeyOutcome::Handled);
        assert_eq!(texts(&e), vec!["1", "1", ""]);

        // Delete only removes an empty focused block.
        e.on_focus("a");
        let out = e.handle_key(KeyTarget::Window, &KeyInput::plain("Delete"), T0);
        assert_eq!(out, KeyOutcome::Ignored);
        e.on_focus("b");
        let out = e.handle_key(KeyTarget::Window, &KeyInput::plain("Delete"), T0);
        assert_eq!(out, KeyOutcome::Handled);
        assert_eq!(texts(&e), vec!["1", "1"]);

        let out = e.handle_key(KeyTarget::Window, &KeyInput::with_mod("z"), T0);
        assert_eq!(out, KeyOutcome::Handled);
        assert_eq!(texts(&e), vec!["1", "1", ""]);
        let out = e.handle_key(KeyTarget::Window, &KeyInput::with_mod("y"), T0);
        assert_eq!(out, KeyOutcome::Handled);
        assert_eq!(texts(&e), vec!["1", "1"]);
    }

    #[test]
    fn test_blur_stops_window_shortcuts_targeting_block() {
        let mut e = editor(vec![block("a", "1", 1.0), block("b", "", 2.0)]);
        e.on_focus("b");
        e.on_blur("b");
        // Focus now sits on some other control, e.g. the language select.
        let out = e.handle_key(KeyTarget::Window, &KeyInput::plain("Delete"), T0);
        assert_eq!(out, KeyOutcome::Ignored);
        let out = e.handle_key(KeyTarget::Window, &KeyInput::with_mod("d"), T0);
        assert_eq!(out, KeyOutcome::Ignored);
        assert_eq!(texts(&e), vec!["1", ""]);

        // A late blur from a row that already lost focus changes nothing.
        e.on_focus("b");
        e.on_blur("a");
        let out = e.handle_key(KeyTarget::Window, &KeyInput::plain("Delete"), T0);
        assert_eq!(out, KeyOutcome::Handled);
        assert_eq!(texts(&e), vec!["1"]);
    }

    #[test]
    fn test_refused_duplicate_shortcut_is_not_handled() {
        let mut e = editor(vec![block("a", "1", 1.0)]);
        let tmp = e.insert_after("a", BlockType::Text, "", T0).unwrap();
        e.on_focus(&tmp);
        let out = e.handle_key(KeyTarget::Window, &KeyInput::with_mod("d"), T0);
        assert_eq!(out, KeyOutcome::Ignored);
        assert_eq!(e.blocks().len(), 2);
    }

    #[test]
    fn test_tmp_block_edits_wait_for_real_id() {
        let mut e = editor(vec![block("a", "x", 1.0)]);
        let tmp = e.insert_after("a", BlockType::Text, "", T0).unwrap();
        e.take_pending_calls();

        e.on_input(&tmp, "typed", Point::default(), T0);
        assert_eq!(e.flush_due(T0 + 5000), 0);
        // The autosave timer is not armed for a block that has no real id.
        assert_eq!(e.next_autosave_deadline(), None);
        assert!(e.transform(&tmp, BlockType::Quote));
        assert!(e.take_pending_calls().is_empty());

        let row_key = e.row_key(&tmp);
        e.resolve_created(&tmp, "real");
        assert_eq!(e.row_key("real"), row_key);
        // Callers holding the tmp id still reach the block.
        assert_eq!(e.block(&tmp).map(|b| b.id.as_str()), Some("real"));
        assert!(e.next_autosave_deadline().is_some());

        assert_eq!(e.flush_due(T0 + 5000), 1);
        let calls = e.take_pending_calls();
        assert!(matches!(
            calls.as_slice(),
            [ServiceCall::Update { block_id, patch }]
                if block_id == "real" && patch.kind == Some(BlockType::Quote)
        ));
    }

    #[test]
    fn test_rejected_create_is_sent_again_on_next_edit() {
        let mut e = editor(vec![block("a", "x", 1.0)]);
        let tmp = e.insert_after("a", BlockType::Text, "", T0).unwrap();
        e.take_pending_calls();

        e.create_failed(&tmp);
        assert!(!e.has_pending_saves());

        assert!(e.on_input(&tmp, "important text", Point::default(), T0 + 10));
        let calls = e.take_pending_calls();
        assert!(matches!(
            calls.as_slice(),
            [ServiceCall::Create { tmp_id, draft }]
                if tmp_id == &tmp && draft.content.text == "important text"
        ));
        // The create carries the edit; nothing is left waiting on the tmp id.
        assert!(!e.has_pending_saves());

        e.resolve_created(&tmp, "real");
        assert!(e.take_pending_calls().is_empty());
        e.on_input("real", "important text!", Point::default(), T0 + 20);
        assert_eq!(e.flush_due(T0 + 20 + 800), 1);
    }

    #[test]
    fn test_undo_sends_rejected_create_again() {
        let mut e = editor(vec![block("a", "x", 1.0)]);
        let tmp = e.insert_after("a", BlockType::Text, "kept", T0).unwrap();
        e.take_pending_calls();
        e.create_failed(&tmp);

        assert!(e.delete_block(&tmp));
        assert!(e.take_pending_calls().is_empty());
        assert!(e.undo(T0));
        let calls = e.take_pending_calls();
        assert!(matches!(
            calls.as_slice(),
            [ServiceCall::Create { tmp_id, draft }] if tmp_id == &tmp && draft.content.text == "kept"
        ));
    }

    #[test]
    fn test_alias_dropped_with_its_row() {
        let mut e = editor(vec![block("a", "x", 1.0)]);
        let tmp = e.insert_after("a", BlockType::Text, "", T0).unwrap();
        e.resolve_created(&tmp, "real");
        assert_eq!(e.canonical(&tmp), "real");
        assert!(e.delete_block("real"));
        assert_eq!(e.canonical(&tmp), tmp);
    }

    #[test]
    fn test_tmp_block_deleted_before_create_resolves() {
        let mut e = editor(vec![block("a", "x", 1.0)]);
        let tmp = e.insert_after("a", BlockType::Text, "", T0).unwrap();
        e.take_pending_calls();
        e.delete_block(&tmp);
        assert!(e.take_pending_calls().is_empty());
        e.resolve_created(&tmp, "real");
        assert_eq!(
            e.take_pending_calls(),
            vec![ServiceCall::Delete {
                block_id: "real".to_string()
            }]
        );
    }

    #[test]
    fn test_duplicate_inserts_after_and_realigns() {
        let mut e = editor(vec![block("a", "1", 1.0), block("b", "2", 2.0)]);
        let tmp = e.duplicate("a", T0).unwrap();
        assert_eq!(texts(&e), vec!["1", "1", "2"]);
        assert_eq!(e.blocks()[1].position, 1.5);
        assert_eq!(focus_of(&e), (tmp.clone(), Caret::Start));
        assert_eq!(
            e.take_pending_calls(),
            vec![ServiceCall::Duplicate {
                source_id: "a".to_string(),
                tmp_id: tmp.clone()
            }]
        );
        e.resolve_created(&tmp, "a2");
        let calls = e.take_pending_calls();
        assert!(matches!(
            calls.as_slice(),
            [ServiceCall::Update { block_id, patch }] if block_id == "a2" && patch.position == Some(1.5)
        ));
    }

    #[test]
    fn test_tmp_blocks_cannot_be_linked_or_moved() {
        let mut e = editor(vec![block("a", "x", 1.0)]);
        let tmp = e.insert_after("a", BlockType::Text, "", T0).unwrap();
        assert!(!e.request_link(&tmp));
        assert!(!e.move_to_page(&tmp, "p2"));
        assert!(e.duplicate(&tmp, T0).is_none());
        assert!(e.request_link("a"));
    }

    #[test]
    fn test_unmount_discards_or_flushes() {
        let mut e = editor(vec![block("a", "x", 1.0)]);
        e.on_input("a", "xy", Point::default(), T0);
        assert!(e.unmount(false).is_empty());

        let mut e = editor(vec![block("a", "x", 1.0)]);
        e.on_input("a", "xy", Point::default(), T0);
        let calls = e.unmount(true);
        assert_eq!(calls.len(), 1);
    }

    #[test]
    fn test_paste_inserts_plain_text() {
        let mut e = editor(vec![block("a", "Hello world", 1.0)]);
        let caret = e.paste(
            "a",
            Selection { start: 6, end: 11 },
            "there\r\nfriend",
            T0,
        );
        assert_eq!(caret, Some(18));
        assert_eq!(texts(&e), vec!["Hello there\nfriend"]);
        assert_eq!(focus_of(&e), ("a".to_string(), Caret::At(18)));
    }

    #[test]
    fn test_highlight_requires_known_block() {
        let mut e = editor(vec![block("a", "x", 1.0)]);
        assert!(!e.highlight("nope"));
        assert!(e.highlight("a"));
        assert_eq!(e.highlighted(), Some("a"));
        e.clear_highlight();
        assert_eq!(e.highlighted(), None);
    }

    #[test]
    fn test_numbered_rows_renumber_after_insert() {
        let mut a = block("a", "1", 1.0);
        a.kind = BlockType::NumberedList;
        let mut b = block("b", "2", 2.0);
        b.kind = BlockType::NumberedList;
        let mut e = editor(vec![a, b]);
        e.insert_after("a", BlockType::Text, "", T0);
        let templates = e
            .rows()
            .into_iter()
            .map(|r| r.fragment.template)
            .collect::<Vec<_>>();
        use crate::editor::render::Template;
        assert_eq!(
            templates,
            vec![
                Template::Numbered { number: 1 },
                Template::Paragraph,
                Template::Numbered { number: 1 },
            ]
        );
    }

    #[test]
    fn test_concrete_scenario() {
        let mut e = editor(vec![block("a", "Hello world", 1.0), block("b", "below", 2.0)]);

        key_at(&mut e, "a", 6, "Enter");
        let second = e.blocks()[1].id.clone();
        e.resolve_created(&second, "a-tail");
        assert_eq!(texts(&e), vec!["Hello ", "world", "below"]);

        key_at(&mut e, "a-tail", 0, "Backspace");
        assert_eq!(texts(&e), vec!["Hello world", "below"]);
        assert_eq!(focus_of(&e), ("a".to_string(), Caret::At(6)));

        let props_before = e.block("a").unwrap().props.clone();
        e.transform("a", BlockType::Heading1);
        let a = e.block("a").unwrap();
        assert_eq!(a.text(), "Hello world");
        assert_eq!(a.props, props_before);
        e.take_pending_calls();

        e.drag_start("a");
        e.drag_over(
            "b",
            39.0,
            Rect {
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 40.0,
            },
        );
        assert!(e.drag_drop());
        assert_eq!(
            e.blocks()
                .iter()
                .map(|b| (b.id.as_str(), b.position))
                .collect::<Vec<_>>(),
            vec![("b", 1.0), ("a", 2.0)]
        );
        assert_eq!(
            e.take_pending_calls(),
            vec![ServiceCall::Reorder {
                page_id: "p1".to_string(),
                ordered_ids: vec!["b".to_string(), "a".to_string()]
            }]
        );
    }
}
