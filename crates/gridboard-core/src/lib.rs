#![forbid(unsafe_code)]

//! Core: pixel-space geometry, box identity, and the gesture command vocabulary.
//!
//! # Role in gridboard
//! `gridboard-core` is the vocabulary layer. It owns the primitive types the
//! layout engine and its host share: free-mode pixel rectangles, stable box
//! identifiers, and the semantic gesture commands a host UI forwards to the
//! engine.
//!
//! # Primary responsibilities
//! - **PixelRect / PixelPoint**: absolute pixel coordinates for boxes in free
//!   (selected) mode.
//! - **BoxId**: opaque, non-empty, lifetime-stable box identifiers.
//! - **GestureCommand**: the reducer's input language (add, delete, select,
//!   drag/resize lifecycle, undo/redo), serializable for recorded-trace replay.
//!
//! # How it fits in the system
//! The engine (`gridboard-layout`) consumes `GestureCommand` values and keeps
//! the authoritative layout. The rendering layer is independent of this crate's
//! logic; it only reads the geometry types back out.

pub mod event;
pub mod geometry;
pub mod id;

pub use event::GestureCommand;
pub use geometry::{PixelPoint, PixelRect};
pub use id::{BoxId, IdError};
