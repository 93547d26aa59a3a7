#![forbid(unsafe_code)]

//! Stable box identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier for a box, stable for the box's lifetime.
///
/// The empty string is reserved/invalid so identifiers are always non-empty.
/// Imported documents may carry arbitrary identifier strings; engine-generated
/// identifiers come from a monotonic counter owned by the board.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoxId(String);

impl BoxId {
    /// Create a new box ID, rejecting the empty string.
    pub fn new(raw: impl Into<String>) -> Result<Self, IdError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(IdError::Empty);
        }
        Ok(Self(raw))
    }

    /// View the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors from box ID construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdError {
    /// The identifier string was empty.
    Empty,
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "box identifier must not be empty"),
        }
    }
}

impl std::error::Error for IdError {}
