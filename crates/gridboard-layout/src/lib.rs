#![forbid(unsafe_code)]

//! Layout engine: grid coordinate transforms, collision resolution, and the
//! authoritative box arrangement state.
//!
//! # Role in gridboard
//! This crate is the whole of the design content: the bidirectional mapping
//! between grid units and pixel space, the snapping and clamping rules that
//! keep boxes valid after free-form gestures, the row-probe collision policy,
//! the board state with its free/anchored transition machine, linear
//! undo/redo, and the JSON document format.
//!
//! # How it fits in the system
//! A host UI forwards [`GestureCommand`] values to an [`Engine`] and renders
//! from [`Board`] each frame: [`grid::grid_to_pixel`] for anchored boxes,
//! the free pixel rectangle for selected ones. The host never computes
//! geometry itself.

pub mod board;
pub mod collision;
pub mod engine;
pub mod grid;
pub mod history;
pub mod persist;

pub use board::{Board, BoxNode, Placement, SettleOutcome};
pub use collision::{MAX_RESOLVE_ATTEMPTS, PlacementError, overlaps, resolve};
pub use engine::{Engine, replay};
pub use grid::{
    DEFAULT_COLUMNS, GRID_GAP, GridMetrics, GridModelError, GridRect, MAX_SPAN, ROW_HEIGHT,
    grid_to_pixel, pixel_to_grid, snap,
};
pub use gridboard_core::{BoxId, GestureCommand, PixelPoint, PixelRect};
pub use history::{BoardSnapshot, History, HistoryConfig};
pub use persist::{BoardDocument, BoxRecord, DOCUMENT_VERSION, ImportError};
