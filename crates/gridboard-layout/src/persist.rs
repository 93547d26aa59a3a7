#![forbid(unsafe_code)]

//! Persisted layout document: JSON import/export with versioning.
//!
//! The canonical wire shape is a versioned envelope:
//!
//! ```json
//! {
//!   "boxes": [
//!     { "id": "box-1", "col": 1, "row": 1, "colSpan": 2, "rowSpan": 1 }
//!   ],
//!   "version": "2.0"
//! }
//! ```
//!
//! A legacy variant — a bare top-level array of boxes — is accepted on import
//! only and never produced on export.
//!
//! # Import policy
//!
//! Imports are all-or-nothing: parse, validate every record, then place the
//! boxes in document order, running each through the collision resolver so
//! the no-overlap invariant holds even for hand-edited documents. Any error
//! leaves the caller's state untouched. Missing or mistyped numeric fields
//! are rejected, never coerced.

use std::collections::BTreeSet;
use std::fmt;

use gridboard_core::id::BoxId;
use serde::{Deserialize, Serialize};

use crate::board::{Board, BoxNode, Placement};
use crate::collision::resolve;
use crate::grid::{GridMetrics, GridModelError, GridRect};

/// Current document schema version.
pub const DOCUMENT_VERSION: &str = "2.0";

/// One box record on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxRecord {
    pub id: String,
    #[serde(flatten)]
    pub rect: GridRect,
}

/// The canonical persisted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardDocument {
    pub boxes: Vec<BoxRecord>,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    DOCUMENT_VERSION.to_string()
}

/// Parse a JSON payload into a document, accepting both the versioned
/// envelope and the legacy bare-array shape.
pub fn parse_document(json: &str) -> Result<BoardDocument, ImportError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|err| ImportError::Parse(err.to_string()))?;
    match value {
        serde_json::Value::Array(_) => {
            let boxes: Vec<BoxRecord> = serde_json::from_value(value)
                .map_err(|err| ImportError::Shape(err.to_string()))?;
            Ok(BoardDocument {
                boxes,
                version: DOCUMENT_VERSION.to_string(),
            })
        }
        serde_json::Value::Object(ref map) if map.contains_key("boxes") => {
            serde_json::from_value(value).map_err(|err| ImportError::Shape(err.to_string()))
        }
        _ => Err(ImportError::MissingBoxes),
    }
}

/// Validate a document and produce board nodes, placing each box through the
/// collision resolver in document order.
pub fn boxes_from_document(
    document: &BoardDocument,
    metrics: &GridMetrics,
) -> Result<Vec<BoxNode>, ImportError> {
    if document.version != DOCUMENT_VERSION {
        return Err(ImportError::UnsupportedVersion {
            found: document.version.clone(),
        });
    }

    let mut seen = BTreeSet::new();
    let mut placed: Vec<GridRect> = Vec::with_capacity(document.boxes.len());
    let mut nodes = Vec::with_capacity(document.boxes.len());

    for (index, record) in document.boxes.iter().enumerate() {
        let id = BoxId::new(record.id.as_str()).map_err(|_| ImportError::InvalidId { index })?;
        if !seen.insert(id.clone()) {
            return Err(ImportError::DuplicateId { id: record.id.clone() });
        }
        record
            .rect
            .validate(metrics.columns)
            .map_err(|source| ImportError::InvalidBox {
                id: record.id.clone(),
                source,
            })?;
        let rect = resolve(record.rect, &placed).map_err(|_| ImportError::Unplaceable {
            id: record.id.clone(),
        })?;
        placed.push(rect);
        nodes.push(BoxNode {
            id,
            placement: Placement::Anchored(rect),
        });
    }

    Ok(nodes)
}

/// Build the canonical document from a board's current layout.
///
/// Free boxes export their grid mirror, so a document written mid-gesture is
/// still well-formed.
#[must_use]
pub fn document_from_board(board: &Board) -> BoardDocument {
    BoardDocument {
        boxes: board
            .boxes()
            .iter()
            .map(|node| BoxRecord {
                id: node.id.to_string(),
                rect: node.grid_rect(),
            })
            .collect(),
        version: DOCUMENT_VERSION.to_string(),
    }
}

/// Errors from import. Every variant leaves the board untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportError {
    /// The payload is not valid JSON.
    Parse(String),
    /// The payload is JSON but not a document or box array.
    Shape(String),
    /// Neither a `boxes` envelope nor a bare array.
    MissingBoxes,
    /// The document carries a schema version this build does not read.
    UnsupportedVersion { found: String },
    /// A box record has an empty identifier.
    InvalidId { index: usize },
    /// Two box records share an identifier.
    DuplicateId { id: String },
    /// A box record violates the grid invariants.
    InvalidBox { id: String, source: GridModelError },
    /// A box could not be placed without overlap within the probe budget.
    Unplaceable { id: String },
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(reason) => write!(f, "invalid JSON: {reason}"),
            Self::Shape(reason) => write!(f, "unexpected document shape: {reason}"),
            Self::MissingBoxes => write!(f, "document has no boxes array"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported document version {found:?} (expected {DOCUMENT_VERSION:?})")
            }
            Self::InvalidId { index } => write!(f, "box {index} has an empty identifier"),
            Self::DuplicateId { id } => write!(f, "duplicate box identifier {id:?}"),
            Self::InvalidBox { id, source } => write!(f, "box {id:?} is invalid: {source}"),
            Self::Unplaceable { id } => {
                write!(f, "box {id:?} cannot be placed without overlap")
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidBox { source, .. } => Some(source),
            _ => None,
        }
    }
}
