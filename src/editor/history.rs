use crate::editor::document::{find_mut, sort_by_position};
use crate::models::{Block, BlockContent, BlockProps, BlockType};
use std::collections::{HashSet, VecDeque};

pub(crate) const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Editable fields of one block at a point in time.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BlockSnapshot {
    pub id: String,
    pub kind: BlockType,
    pub content: BlockContent,
    pub props: BlockProps,
    pub position: f64,
}

/// Deep copy of the whole block list. Never persisted.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Snapshot {
    pub blocks: Vec<BlockSnapshot>,
}

impl Snapshot {
    pub fn capture(blocks: &[Block]) -> Self {
        Self {
            blocks: blocks
                .iter()
                .map(|b| BlockSnapshot {
                    id: b.id.clone(),
                    kind: b.kind,
                    content: b.content.clone(),
                    props: b.props.clone(),
                    position: b.position,
                })
                .collect(),
        }
    }

    fn swap_id(&mut self, from: &str, to: &str) -> bool {
        let mut changed = false;
        for b in self.blocks.iter_mut() {
            if b.id == from {
                b.id = to.to_string();
                changed = true;
            }
        }
        changed
    }

    fn forget(&mut self, id: &str) {
        self.blocks.retain(|b| b.id != id);
    }
}

/// What a restore did to the live list.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Reconciliation {
    /// In the snapshot but missing live; re-inserted.
    pub recreated: Vec<String>,
    /// Live but missing from the snapshot; removed.
    pub dropped: Vec<String>,
    /// Present in both with at least one field overwritten.
    pub changed: Vec<String>,
}

impl Reconciliation {
    /// Blocks whose server copy must be brought in line with the live list.
    pub fn to_save(&self) -> impl Iterator<Item = &String> {
        self.recreated.iter().chain(self.changed.iter())
    }
}

/// Make `live` equal to `snap`.
///
/// Membership is decided purely by id-set diffing: a block that exists in the
/// snapshot but not live is recreated; one that exists live but not in the
/// snapshot is dropped; survivors get every editable field overwritten.
pub(crate) fn reconcile(live: &mut Vec<Block>, snap: &Snapshot, page_id: &str) -> Reconciliation {
    let snap_ids: HashSet<&str> = snap.blocks.iter().map(|b| b.id.as_str()).collect();
    let mut out = Reconciliation::default();

    live.retain(|b| {
        let keep = snap_ids.contains(b.id.as_str());
        if !keep {
            out.dropped.push(b.id.clone());
        }
        keep
    });

    for s in snap.blocks.iter() {
        match find_mut(live, &s.id) {
            Some(b) => {
                let differs = b.kind != s.kind
                    || b.content != s.content
                    || b.props != s.props
                    || b.position != s.position;
                if differs {
                    b.kind = s.kind;
                    b.content = s.content.clone();
                    b.props = s.props.clone();
                    b.position = s.position;
                    out.changed.push(s.id.clone());
                }
            }
            None => {
                live.push(Block {
                    id: s.id.clone(),
                    kind: s.kind,
                    content: s.content.clone(),
                    props: s.props.clone(),
                    position: s.position,
                    page_id: page_id.to_string(),
                    created_by: None,
                    updated_at: None,
                });
                out.recreated.push(s.id.clone());
            }
        }
    }

    sort_by_position(live);
    out
}

/// Bounded undo/redo stacks of whole-document snapshots.
#[derive(Clone, Debug)]
pub(crate) struct History {
    undo: VecDeque<Snapshot>,
    redo: VecDeque<Snapshot>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    fn push_capped(stack: &mut VecDeque<Snapshot>, snap: Snapshot, limit: usize) {
        stack.push_back(snap);
        while stack.len() > limit {
            stack.pop_front();
        }
    }

    /// Record the state before a new edit. Invalidates the redo stack.
    pub fn record(&mut self, before: Snapshot) {
        Self::push_capped(&mut self.undo, before, self.limit);
        self.redo.clear();
    }

    /// Pop the previous state, parking `current` on the redo stack.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let prev = self.undo.pop_back()?;
        Self::push_capped(&mut self.redo, current, self.limit);
        Some(prev)
    }

    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo.pop_back()?;
        Self::push_capped(&mut self.undo, current, self.limit);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[cfg(test)]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Rename a block id across every stored snapshot.
    pub fn swap_id(&mut self, from: &str, to: &str) {
        for s in self.undo.iter_mut().chain(self.redo.iter_mut()) {
            s.swap_id(from, to);
        }
    }

    /// Drop a block from every stored snapshot, so no restore brings it back.
    pub fn forget(&mut self, id: &str) {
        for s in self.undo.iter_mut().chain(self.redo.iter_mut()) {
            s.forget(id);
        }
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::document::{block, ordered_ids};
    use pretty_assertions::assert_eq;

    fn snap(xs: &[Block]) -> Snapshot {
        Snapshot::capture(xs)
    }

    #[test]
    fn test_reconcile_recreates_drops_and_overwrites() {
        let before = vec![block("a", "one", 1.0), block("b", "two", 2.0)];
        let s = snap(&before);

        let mut live = vec![block("a", "ONE", 1.0), block("c", "new", 3.0)];
        let r = reconcile(&mut live, &s, "p1");

        assert_eq!(r.recreated, vec!["b".to_string()]);
        assert_eq!(r.dropped, vec!["c".to_string()]);
        assert_eq!(r.changed, vec!["a".to_string()]);
        assert_eq!(Snapshot::capture(&live), s);
    }

    #[test]
    fn test_reconcile_sorts_by_position() {
        let s = snap(&[block("b", "", 1.0), block("a", "", 2.0)]);
        let mut live = vec![block("a", "", 1.0), block("b", "", 2.0)];
        reconcile(&mut live, &s, "p1");
        assert_eq!(ordered_ids(&live), vec!["b", "a"]);
    }

    #[test]
    fn test_reconcile_untouched_blocks_not_saved() {
        let xs = vec![block("a", "x", 1.0)];
        let mut live = xs.clone();
        let r = reconcile(&mut live, &snap(&xs), "p1");
        assert_eq!(r.to_save().count(), 0);
    }

    #[test]
    fn test_record_clears_redo() {
        let mut h = History::new(10);
        h.record(Snapshot::default());
        assert!(h.undo(Snapshot::default()).is_some());
        assert!(h.can_redo());
        h.record(Snapshot::default());
        assert!(!h.can_redo());
    }

    #[test]
    fn test_history_is_capped() {
        let mut h = History::new(3);
        for i in 0..5 {
            h.record(snap(&[block(&format!("b{i}"), "", 1.0)]));
        }
        assert_eq!(h.undo_len(), 3);
        // Oldest two were evicted; the newest remains on top.
        let top = h.undo(Snapshot::default()).expect("has history");
        assert_eq!(top.blocks[0].id, "b4");
    }

    #[test]
    fn test_undo_redo_mirror() {
        let mut h = History::default();
        let s0 = snap(&[block("a", "0", 1.0)]);
        let s1 = snap(&[block("a", "1", 1.0)]);
        h.record(s0.clone());

        assert_eq!(h.undo(s1.clone()), Some(s0.clone()));
        assert_eq!(h.redo(s0.clone()), Some(s1));
        assert!(h.can_undo());
        assert!(!h.can_redo());
    }

    #[test]
    fn test_swap_id_in_all_snapshots() {
        let mut h = History::default();
        h.record(snap(&[block("tmp-1", "", 1.0)]));
        h.record(snap(&[block("tmp-1", "", 1.0), block("b", "", 2.0)]));
        h.swap_id("tmp-1", "real-1");
        let top = h.undo(Snapshot::default()).unwrap();
        assert_eq!(top.blocks[0].id, "real-1");
        let next = h.undo(Snapshot::default()).unwrap();
        assert_eq!(next.blocks[0].id, "real-1");
    }

    #[test]
    fn test_forget_removes_block_from_both_stacks() {
        let ids = |s: &Snapshot| s.blocks.iter().map(|b| b.id.clone()).collect::<Vec<_>>();
        let mut h = History::default();
        h.record(snap(&[block("a", "", 1.0), block("c", "", 2.0)]));
        h.record(snap(&[block("a", "x", 1.0), block("c", "", 2.0)]));
        let current = snap(&[block("a", "y", 1.0), block("c", "", 2.0)]);
        assert!(h.undo(current).is_some());

        h.forget("c");

        let older = h.undo(Snapshot::default()).expect("undo entry");
        assert_eq!(ids(&older), vec!["a".to_string()]);
        // Skip the empty snapshot the undo above parked on the redo stack.
        assert!(h.redo(Snapshot::default()).is_some());
        let newer = h.redo(Snapshot::default()).expect("redo entry");
        assert_eq!(ids(&newer), vec!["a".to_string()]);
    }
}
