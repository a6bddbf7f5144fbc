use std::collections::VecDeque;

pub const DEFAULT_UNDO_LIMIT: usize = 40;

/// Bounded undo/redo history of document snapshots.
///
/// `present` can move ahead of the last recorded snapshot through
/// uncommitted updates; the next commit records the last committed
/// value, so intermediate states never show up in the undo stack.
#[derive(Debug, Clone)]
pub struct History<T: Clone> {
    past: VecDeque<T>,
    present: T,
    future: Vec<T>,
    latest_committed: T,
    limit: usize,
}

impl<T: Clone> History<T> {
    pub fn new(present: T, limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            latest_committed: present.clone(),
            present,
            future: Vec::new(),
            limit: limit.max(1),
        }
    }

    pub fn present(&self) -> &T {
        &self.present
    }

    /// Replaces the present. Only `commit` updates create an undo step.
    pub fn record(&mut self, next: T, commit: bool) {
        if commit {
            let previous = std::mem::replace(&mut self.latest_committed, next.clone());
            self.past.push_back(previous);
            while self.past.len() > self.limit {
                self.past.pop_front();
            }
            self.future.clear();
        }
        self.present = next;
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        self.present = previous.clone();
        let committed = std::mem::replace(&mut self.latest_committed, previous);
        self.future.push(committed);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.latest_committed, next.clone());
        self.past.push_back(current);
        self.present = next;
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.past.len()
    }

    pub fn redo_count(&self) -> usize {
        self.future.len()
    }

    /// Drops all history and starts over from `present`.
    pub fn reset(&mut self, present: T) {
        self.past.clear();
        self.future.clear();
        self.latest_committed = present.clone();
        self.present = present;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undo_redo_round_trip() {
        let mut h = History::new(0, 10);
        h.record(1, true);
        h.record(2, true);
        assert!(h.undo());
        assert_eq!(*h.present(), 1);
        assert!(h.undo());
        assert_eq!(*h.present(), 0);
        assert!(!h.undo());
        assert!(h.redo());
        assert!(h.redo());
        assert_eq!(*h.present(), 2);
        assert!(!h.redo());
    }

    #[test]
    fn previews_are_not_undo_steps() {
        let mut h = History::new(0, 10);
        h.record(1, false);
        h.record(2, false);
        h.record(3, true);
        assert_eq!(h.undo_count(), 1);
        assert!(h.undo());
        assert_eq!(*h.present(), 0);
    }

    #[test]
    fn redo_restores_committed_state_not_preview() {
        let mut h = History::new("a", 10);
        h.record("b", true);
        h.record("c", false);
        assert!(h.undo());
        assert_eq!(*h.present(), "a");
        assert!(h.redo());
        assert_eq!(*h.present(), "b");
        assert!(h.can_undo());
        assert!(!h.can_redo());
    }

    #[test]
    fn commit_clears_redo() {
        let mut h = History::new(0, 10);
        h.record(1, true);
        h.undo();
        assert!(h.can_redo());
        h.record(5, true);
        assert!(!h.can_redo());
    }

    #[test]
    fn depth_is_bounded() {
        let mut h = History::new(0, 3);
        for i in 1..=10 {
            h.record(i, true);
        }
        assert_eq!(h.undo_count(), 3);
        while h.undo() {}
        assert_eq!(*h.present(), 7);
    }
}
