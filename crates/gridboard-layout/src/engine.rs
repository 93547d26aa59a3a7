#![forbid(unsafe_code)]

//! The gesture reducer: a single-threaded update loop over board + history.
//!
//! Every mutation arrives as a [`GestureCommand`]. The reducer applies it to
//! the [`Board`] and decides whether the result is a committing action that
//! deserves a history snapshot:
//!
//! - add, delete, clear-all, import: always commit.
//! - drag/resize settle: commit unless the placement resolver reverted.
//! - deselect edges (plain select over others, multi toggle-off,
//!   deselect-all): commit when at least one box settled.
//! - intermediate drag/resize frames, plain selection growth, container
//!   resize: never commit. Expensive work (deep-copy snapshots, overlap
//!   probing) is deferred to settle edges.
//!
//! Command failures that are delivery races (missing IDs, mismatched gesture
//! ends, out-of-range undo/redo) are silent no-ops.

use gridboard_core::event::GestureCommand;
use gridboard_core::id::BoxId;

use crate::board::{Board, SettleOutcome};
use crate::grid::GridMetrics;
use crate::history::{BoardSnapshot, History, HistoryConfig};
use crate::persist::{self, BoardDocument, ImportError};

/// Board + history behind a command interface.
#[derive(Debug, Clone)]
pub struct Engine {
    board: Board,
    history: History,
}

impl Engine {
    /// Create an engine with an empty board. The initial state is recorded
    /// as the first history entry so the first action can be undone.
    #[must_use]
    pub fn new(metrics: GridMetrics) -> Self {
        Self::with_history_config(metrics, HistoryConfig::default())
    }

    /// Create an engine with a custom history depth.
    #[must_use]
    pub fn with_history_config(metrics: GridMetrics, config: HistoryConfig) -> Self {
        let board = Board::new(metrics);
        let mut history = History::new(config);
        history.push(BoardSnapshot::capture(&board));
        Self { board, history }
    }

    /// Read access to the board for rendering and inspection.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Read access to the history cursor state.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Apply one gesture command. Infallible by design: every failure mode
    /// is a defined no-op (see module docs).
    pub fn apply(&mut self, command: GestureCommand) {
        match command {
            GestureCommand::AddBox => {
                if let Ok(_id) = self.board.add_box() {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(id = %_id, "box added");
                    self.commit();
                }
            }
            GestureCommand::DeleteBox { id } => {
                if self.board.delete_box(&id) {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(id = %id, "box deleted");
                    self.commit();
                }
            }
            GestureCommand::ClearAll => {
                if self.board.clear() {
                    self.commit();
                }
            }
            GestureCommand::Select { id, multi } => {
                if self.board.select(&id, multi) > 0 {
                    self.commit();
                }
            }
            GestureCommand::DeselectAll => {
                if self.board.deselect_all() > 0 {
                    self.commit();
                }
            }
            GestureCommand::BeginDrag { id, pointer } => {
                if self.board.begin_drag(&id, pointer).is_some_and(|n| n > 0) {
                    self.commit();
                }
            }
            GestureCommand::UpdateDrag { id, pointer } => {
                self.board.update_drag(&id, pointer);
            }
            GestureCommand::EndDrag { id } => {
                self.settle(&id, false);
            }
            GestureCommand::BeginResize { id, pointer } => {
                if self.board.begin_resize(&id, pointer).is_some_and(|n| n > 0) {
                    self.commit();
                }
            }
            GestureCommand::UpdateResize { id, pointer } => {
                self.board.update_resize(&id, pointer);
            }
            GestureCommand::EndResize { id } => {
                self.settle(&id, true);
            }
            GestureCommand::Undo => self.undo(),
            GestureCommand::Redo => self.redo(),
            GestureCommand::SetContainerWidth { width } => {
                // Geometry refresh only; invalid widths are ignored, keeping
                // the previous metrics.
                let _ = self.board.set_container_width(width);
            }
        }
    }

    fn settle(&mut self, id: &BoxId, resize: bool) {
        let outcome = if resize {
            self.board.end_resize(id)
        } else {
            self.board.end_drag(id)
        };
        if outcome == SettleOutcome::Committed {
            #[cfg(feature = "tracing")]
            tracing::debug!(id = %id, resize, "gesture settled");
            self.commit();
        }
    }

    /// Step the history cursor back and restore the snapshot. No-op at the
    /// earliest entry.
    pub fn undo(&mut self) {
        if let Some(snapshot) = self.history.undo() {
            let snapshot = snapshot.clone();
            self.board.restore(snapshot.boxes, snapshot.selection);
        }
    }

    /// Step the history cursor forward and restore the snapshot. No-op at
    /// the latest entry.
    pub fn redo(&mut self) {
        if let Some(snapshot) = self.history.redo() {
            let snapshot = snapshot.clone();
            self.board.restore(snapshot.boxes, snapshot.selection);
        }
    }

    /// Replace the layout from a JSON document (envelope or legacy bare
    /// array). On any parse, shape, or validation error the board and
    /// history are left untouched.
    pub fn import_json(&mut self, json: &str) -> Result<(), ImportError> {
        let document = persist::parse_document(json)?;
        let boxes = persist::boxes_from_document(&document, self.board.metrics())?;
        self.board.replace_all(boxes);
        #[cfg(feature = "tracing")]
        tracing::info!(boxes = self.board.len(), "layout imported");
        self.commit();
        Ok(())
    }

    /// Export the current layout as the canonical versioned document.
    #[must_use]
    pub fn export_document(&self) -> BoardDocument {
        persist::document_from_board(&self.board)
    }

    /// Export the current layout as a JSON string.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.export_document())
    }

    fn commit(&mut self) {
        self.history.push(BoardSnapshot::capture(&self.board));
    }
}

/// Replay a recorded command trace onto a fresh engine.
///
/// Identical traces over identical metrics produce identical boards; compare
/// [`Board::state_hash`] to detect divergence.
#[must_use]
pub fn replay(metrics: GridMetrics, commands: &[GestureCommand]) -> Engine {
    let mut engine = Engine::new(metrics);
    for command in commands {
        engine.apply(command.clone());
    }
    engine
}
