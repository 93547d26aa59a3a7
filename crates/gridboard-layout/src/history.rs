#![forbid(unsafe_code)]

//! Linear snapshot history for undo/redo.
//!
//! The history is a sequence of full-state snapshots plus a cursor:
//!
//! ```text
//! push(s4)
//! ┌──────────────────────────────────┐
//! │ Entries: [s0, s1, s2, s3, s4]    │
//! │ Cursor:                   ^      │
//! └──────────────────────────────────┘
//!
//! undo() x2
//! ┌──────────────────────────────────┐
//! │ Entries: [s0, s1, s2, s3, s4]    │
//! │ Cursor:           ^              │
//! └──────────────────────────────────┘
//!
//! push(s5)  <-- new branch, redo tail discarded
//! ┌──────────────────────────────────┐
//! │ Entries: [s0, s1, s2, s5]        │
//! │ Cursor:               ^          │
//! └──────────────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. `cursor < entries.len()` whenever entries is non-empty.
//! 2. Push truncates everything past the cursor before appending.
//! 3. Undo at the earliest entry and redo at the latest are no-ops, not errors.
//! 4. `entries.len() <= config.max_depth`; the oldest entry is evicted first.

use std::collections::{BTreeSet, VecDeque};

use gridboard_core::id::BoxId;

use crate::board::{Board, BoxNode};

/// Configuration for the history stack.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Maximum number of snapshots to keep.
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_depth: 100 }
    }
}

impl HistoryConfig {
    /// Create a configuration with a custom depth limit.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
        }
    }

    /// Create unlimited configuration (for testing).
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }
}

/// An immutable deep snapshot of layout + selection.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    pub boxes: Vec<BoxNode>,
    pub selection: BTreeSet<BoxId>,
}

impl BoardSnapshot {
    /// Deep-copy the committing state out of a board.
    #[must_use]
    pub fn capture(board: &Board) -> Self {
        Self {
            boxes: board.boxes().to_vec(),
            selection: board.selection().clone(),
        }
    }
}

/// Linear undo/redo history over board snapshots.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<BoardSnapshot>,
    cursor: usize,
    config: HistoryConfig,
}

impl Default for History {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl History {
    /// Create an empty history with the given configuration.
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: 0,
            config,
        }
    }

    /// Record a snapshot: discard any redo tail, append, advance the cursor,
    /// and evict the oldest entry if the depth cap is exceeded.
    pub fn push(&mut self, snapshot: BoardSnapshot) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(snapshot);
        while self.entries.len() > self.config.max_depth {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step back one entry. Returns the snapshot to restore, or `None` (a
    /// no-op) if the cursor is already at the earliest entry.
    pub fn undo(&mut self) -> Option<&BoardSnapshot> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward one entry. Returns the snapshot to restore, or `None`
    /// (a no-op) if the cursor is already at the latest entry.
    pub fn redo(&mut self) -> Option<&BoardSnapshot> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    /// The snapshot at the cursor, if any.
    #[must_use]
    pub fn current(&self) -> Option<&BoardSnapshot> {
        self.entries.get(self.cursor)
    }

    /// True if an undo step is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// True if a redo step is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Number of recorded snapshots.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Current cursor index.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}
