use std::collections::HashMap;

pub(crate) const DEFAULT_AUTOSAVE_MS: i64 = 800;

/// Per-block debounce deadlines.
///
/// Each touch pushes that block's deadline out by the debounce window; blocks
/// never wait on each other.
#[derive(Clone, Debug)]
pub(crate) struct AutosaveQueue {
    debounce_ms: i64,
    deadlines: HashMap<String, i64>,
}

impl Default for AutosaveQueue {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_MS)
    }
}

impl AutosaveQueue {
    pub fn new(debounce_ms: i64) -> Self {
        Self {
            debounce_ms: debounce_ms.max(0),
            deadlines: HashMap::new(),
        }
    }

    pub fn debounce_ms(&self) -> i64 {
        self.debounce_ms
    }

    /// (Re)arm the timer for `block_id`; returns the new deadline.
    pub fn touch(&mut self, block_id: &str, now_ms: i64) -> i64 {
        let due = now_ms + self.debounce_ms;
        self.deadlines.insert(block_id.to_string(), due);
        due
    }

    #[cfg(test)]
    pub fn is_pending(&self, block_id: &str) -> bool {
        self.deadlines.contains_key(block_id)
    }

    pub fn cancel(&mut self, block_id: &str) -> bool {
        self.deadlines.remove(block_id).is_some()
    }

    /// Remove and return every block whose deadline has passed, skipping ids
    /// rejected by `ready` (those stay queued).
    pub fn take_due(&mut self, now_ms: i64, ready: impl Fn(&str) -> bool) -> Vec<String> {
        let mut due = self
            .deadlines
            .iter()
            .filter(|(id, at)| **at <= now_ms && ready(id))
            .map(|(id, _)| id.clone())
            .collect::<Vec<_>>();
        due.sort();
        for id in due.iter() {
            self.deadlines.remove(id);
        }
        due
    }

    /// Drain everything regardless of deadline.
    pub fn take_all(&mut self) -> Vec<String> {
        let mut all = self.deadlines.drain().map(|(id, _)| id).collect::<Vec<_>>();
        all.sort();
        all
    }

    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        match self.deadlines.remove(from) {
            Some(at) => {
                self.deadlines.insert(to.to_string(), at);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    /// Earliest deadline among ids accepted by `ready`.
    pub fn next_deadline(&self, ready: impl Fn(&str) -> bool) -> Option<i64> {
        self.deadlines
            .iter()
            .filter(|(id, _)| ready(id))
            .map(|(_, at)| *at)
            .min()
    }
}
