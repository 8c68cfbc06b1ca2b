//! Undo history: a stack of whole-buffer snapshots.
//!
//! Each entry is the buffer content and cursor as they were just before a
//! change. Undo pops the top entry and restores both. There is no redo.
//!
//! Snapshots are rope clones ([`Snapshot`]), so consecutive entries share
//! every tree node the change did not touch. Keeping the whole buffer per
//! entry means restoring is a pointer swap and there is no edit log to get
//! out of sync with the text.
//!
//! # Push policy
//!
//! [`push`](History::push) ignores a snapshot whose content equals the
//! current top, so a run of no-op keystrokes never stacks duplicates.

use crate::buffer::{Buffer, Snapshot};
use crate::position::Position;

/// One undo step: content plus cursor position to restore.
#[derive(Debug, Clone)]
pub struct Entry {
    pub snapshot: Snapshot,
    pub cursor: Position,
}

/// The undo stack.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<Entry>,
}

impl History {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record the state before a change. Returns `false` (and stores
    /// nothing) when `snapshot` has the same content as the top entry.
    pub fn push(&mut self, snapshot: Snapshot, cursor: Position) -> bool {
        if self.top().is_some_and(|top| top.snapshot == snapshot) {
            return false;
        }
        self.entries.push(Entry { snapshot, cursor });
        true
    }

    /// Pop the most recent entry and restore it into `buf`. Returns the
    /// cursor to restore, or `None` when the history is empty.
    pub fn undo(&mut self, buf: &mut Buffer) -> Option<Position> {
        let entry = self.entries.pop()?;
        buf.restore(&entry.snapshot);
        Some(entry.cursor)
    }

    /// The most recent entry.
    #[must_use]
    pub fn top(&self) -> Option<&Entry> {
        self.entries.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
