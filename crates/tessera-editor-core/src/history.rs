//! Undo/redo over whole-text snapshots.
//!
//! The editor records the surface's plain text each time it handles input.
//! Undo and redo hand back the snapshot to restore; applying it to the
//! surface is the caller's job.

use smol_str::{SmolStr, ToSmolStr};

#[derive(Debug, Clone)]
pub struct SnapshotHistory {
    current: SmolStr,
    undo_stack: Vec<SmolStr>,
    redo_stack: Vec<SmolStr>,
    max_steps: usize,
}

impl Default for SnapshotHistory {
    fn default() -> Self {
        Self::new(100)
    }
}

impl SnapshotHistory {
    pub fn new(max_steps: usize) -> Self {
        Self {
            current: SmolStr::default(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_steps,
        }
    }

    /// Reset history to a single known state.
    pub fn reset(&mut self, content: &str) {
        self.current = content.to_smolstr();
        self.clear_history();
    }

    /// The most recently recorded or restored content.
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Record new content. Returns false if it matches the current snapshot.
    ///
    /// A new edit clears the redo stack.
    pub fn record(&mut self, content: &str) -> bool {
        if self.current == content {
            return false;
        }

        let previous = std::mem::replace(&mut self.current, content.to_smolstr());
        self.undo_stack.push(previous);
        self.redo_stack.clear();

        if self.undo_stack.len() > self.max_steps {
            let excess = self.undo_stack.len() - self.max_steps;
            self.undo_stack.drain(..excess);
        }
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Step back. Returns the content to restore.
    pub fn undo(&mut self) -> Option<SmolStr> {
        let previous = self.undo_stack.pop()?;
        let current = std::mem::replace(&mut self.current, previous.clone());
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Step forward again. Returns the content to restore.
    pub fn redo(&mut self) -> Option<SmolStr> {
        let next = self.redo_stack.pop()?;
        let current = std::mem::replace(&mut self.current, next.clone());
        self.undo_stack.push(current);
        Some(next)
    }

    pub fn clear_history(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo() {
        let mut history = SnapshotHistory::default();
        assert!(history.record("a"));
        assert!(history.record("ab"));
        assert!(!history.record("ab"));

        assert_eq!(history.undo().as_deref(), Some("a"));
        assert_eq!(history.undo().as_deref(), Some(""));
        assert_eq!(history.undo(), None);
        assert!(history.can_redo());

        assert_eq!(history.redo().as_deref(), Some("a"));
        assert_eq!(history.current(), "a");
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut history = SnapshotHistory::default();
        history.record("one");
        history.record("two");
        history.undo();
        assert!(history.can_redo());

        history.record("three");
        assert!(!history.can_redo());
        assert_eq!(history.undo().as_deref(), Some("one"));
    }

    #[test]
    fn test_max_steps() {
        let mut history = SnapshotHistory::new(2);
        for text in ["a", "b", "c", "d"] {
            history.record(text);
        }
        assert_eq!(history.undo().as_deref(), Some("c"));
        assert_eq!(history.undo().as_deref(), Some("b"));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_reset() {
        let mut history = SnapshotHistory::default();
        history.record("x");
        history.reset("start");
        assert!(!history.can_undo());
        assert_eq!(history.current(), "start");
    }
}
