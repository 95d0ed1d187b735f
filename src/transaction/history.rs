//! Undo History
//!
//! Snapshot-based undo/redo. Each recorded transaction keeps the document
//! as it was before the change, together with whether image removals in
//! that change are reported.

use crate::document::Document;

const DEFAULT_DEPTH: usize = 100;

/// One history step: a snapshot and how its change was committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub doc: Document,
    /// Images leaving the document across this step count as removals.
    /// False for image replacement.
    pub observe_removals: bool,
}

/// Undo and redo stacks of document snapshots
#[derive(Debug, Clone)]
pub struct History {
    undo: Vec<Entry>,
    redo: Vec<Entry>,
    depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH)
    }
}

impl History {
    pub fn new(depth: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            depth: depth.max(1),
        }
    }

    /// Record the document as it was before a change. Clears the redo stack.
    pub fn record(&mut self, before: Document, observe_removals: bool) {
        if self.undo.len() == self.depth {
            self.undo.remove(0);
        }
        self.undo.push(Entry {
            doc: before,
            observe_removals,
        });
        self.redo.clear();
    }

    /// Entry to restore for undo; `current` moves to the redo stack
    pub fn undo(&mut self, current: &Document) -> Option<Entry> {
        let previous = self.undo.pop()?;
        self.redo.push(Entry {
            doc: current.clone(),
            observe_removals: previous.observe_removals,
        });
        Some(previous)
    }

    /// Entry to restore for redo; `current` moves to the undo stack
    pub fn redo(&mut self, current: &Document) -> Option<Entry> {
        let next = self.redo.pop()?;
        self.undo.push(Entry {
            doc: current.clone(),
            observe_removals: next.observe_removals,
        });
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
