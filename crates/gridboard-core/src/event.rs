#![forbid(unsafe_code)]

//! Semantic gesture commands consumed by the layout engine.
//!
//! [`GestureCommand`] represents user *intentions* rather than raw pointer or
//! key events. The host UI is responsible for turning its input stream into
//! these commands and forwarding them, in order, to the engine's reducer.
//!
//! # Design
//!
//! ## Invariants
//! 1. Every drag sequence is well-formed: `BeginDrag` → zero or more
//!    `UpdateDrag` → `EndDrag`; resize is the mirror image. The engine
//!    tolerates broken sequences (they degrade to no-ops) but hosts should
//!    not produce them.
//! 2. Commands naming an ID that no longer exists are no-ops, never errors:
//!    UI event delivery can race a prior deletion.
//! 3. Intermediate `UpdateDrag` / `UpdateResize` frames never commit history;
//!    commit-time work runs on the `End*` (settle) edge only.
//!
//! ## Replay
//! Commands derive serde so a recorded sequence can be replayed onto a fresh
//! engine for deterministic reproduction of a layout session.

use serde::{Deserialize, Serialize};

use crate::geometry::PixelPoint;
use crate::id::BoxId;

/// A semantic gesture command, the reducer's input language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum GestureCommand {
    /// Append a new box below all current content.
    AddBox,
    /// Remove a box. No-op if the ID is gone.
    DeleteBox { id: BoxId },
    /// Remove every box and clear the selection.
    ClearAll,
    /// Select a box. A plain click (`multi: false`) clears the set and
    /// selects exactly this ID; a modified click toggles membership.
    Select { id: BoxId, multi: bool },
    /// Clear the selection, settling every free box back onto the grid.
    DeselectAll,
    /// Pointer-down on a box body: start a move gesture.
    BeginDrag { id: BoxId, pointer: PixelPoint },
    /// Pointer-move during a drag: reposition the free box.
    UpdateDrag { id: BoxId, pointer: PixelPoint },
    /// Pointer-up: settle the drag (snap, resolve collisions, commit).
    EndDrag { id: BoxId },
    /// Pointer-down on a box resize handle: start a resize gesture.
    BeginResize { id: BoxId, pointer: PixelPoint },
    /// Pointer-move during a resize: adjust the free box size.
    UpdateResize { id: BoxId, pointer: PixelPoint },
    /// Pointer-up: settle the resize.
    EndResize { id: BoxId },
    /// Step the history cursor back. No-op at the earliest entry.
    Undo,
    /// Step the history cursor forward. No-op at the latest entry.
    Redo,
    /// The host container was resized; re-derive the grid metrics.
    SetContainerWidth { width: f64 },
}

impl GestureCommand {
    /// The box ID this command targets, if any.
    #[must_use]
    pub fn target(&self) -> Option<&BoxId> {
        match self {
            Self::DeleteBox { id }
            | Self::Select { id, .. }
            | Self::BeginDrag { id, .. }
            | Self::UpdateDrag { id, .. }
            | Self::EndDrag { id }
            | Self::BeginResize { id, .. }
            | Self::UpdateResize { id, .. }
            | Self::EndResize { id } => Some(id),
            Self::AddBox
            | Self::ClearAll
            | Self::DeselectAll
            | Self::Undo
            | Self::Redo
            | Self::SetContainerWidth { .. } => None,
        }
    }

    /// True for the high-frequency intermediate frames of a gesture.
    ///
    /// These mutate in-memory state only and must never snapshot history.
    #[must_use]
    pub const fn is_intermediate(&self) -> bool {
        matches!(self, Self::UpdateDrag { .. } | Self::UpdateResize { .. })
    }
}
