#![forbid(unsafe_code)]

//! Grid metrics and the bidirectional grid↔pixel coordinate transform.
//!
//! Grid units are 1-based: a box at `col = 1, row = 1` sits in the top-left
//! cell. Pixel space is the host container's coordinate system, with a derived
//! cell width, a fixed row height, and a fixed gap between cells.
//!
//! # Invariants
//!
//! 1. [`grid_to_pixel`] and [`pixel_to_grid`] are mutual inverses up to
//!    rounding whenever the gap is smaller than the cell width (true for any
//!    reasonable container).
//! 2. [`snap`] is total: any finite pixel rectangle, however invalid, maps to
//!    a [`GridRect`] that satisfies [`GridRect::validate`].
//! 3. Rows are unbounded above; the grid grows to fit content. Columns are
//!    bounded by [`GridMetrics::columns`].

use std::fmt;

use gridboard_core::geometry::PixelRect;
use serde::{Deserialize, Serialize};

/// Number of grid columns unless the host configures otherwise.
pub const DEFAULT_COLUMNS: u16 = 12;

/// Fixed row height in pixels.
pub const ROW_HEIGHT: f64 = 80.0;

/// Fixed gap between cells in pixels, both axes.
pub const GRID_GAP: f64 = 8.0;

/// Maximum box span in cells, both axes.
pub const MAX_SPAN: u16 = 5;

/// A rectangle in grid units: 1-based top-left cell plus spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRect {
    /// 1-based column of the top-left cell.
    pub col: u16,
    /// 1-based row of the top-left cell.
    pub row: u16,
    /// Width in cells, ≥ 1.
    pub col_span: u16,
    /// Height in cells, ≥ 1.
    pub row_span: u16,
}

impl GridRect {
    /// Create a new grid rectangle. Invariants are checked by [`validate`],
    /// not here, so callers can build candidates before clamping.
    ///
    /// [`validate`]: GridRect::validate
    #[must_use]
    pub const fn new(col: u16, row: u16, col_span: u16, row_span: u16) -> Self {
        Self {
            col,
            row,
            col_span,
            row_span,
        }
    }

    /// Exclusive end column (`col + col_span`).
    #[inline]
    #[must_use]
    pub const fn col_end(&self) -> u32 {
        self.col as u32 + self.col_span as u32
    }

    /// Exclusive end row (`row + row_span`).
    #[inline]
    #[must_use]
    pub const fn row_end(&self) -> u32 {
        self.row as u32 + self.row_span as u32
    }

    /// Last occupied row (`row + row_span − 1`).
    #[inline]
    #[must_use]
    pub const fn last_row(&self) -> u32 {
        self.row as u32 + self.row_span as u32 - 1
    }

    /// Check structural validity against a column count.
    pub fn validate(&self, columns: u16) -> Result<(), GridModelError> {
        if self.col == 0 {
            return Err(GridModelError::ZeroCoordinate { field: "col" });
        }
        if self.row == 0 {
            return Err(GridModelError::ZeroCoordinate { field: "row" });
        }
        if self.col_span == 0 || self.col_span > MAX_SPAN {
            return Err(GridModelError::SpanOutOfRange {
                field: "colSpan",
                value: self.col_span,
            });
        }
        if self.row_span == 0 || self.row_span > MAX_SPAN {
            return Err(GridModelError::SpanOutOfRange {
                field: "rowSpan",
                value: self.row_span,
            });
        }
        if self.col_end() - 1 > columns as u32 {
            return Err(GridModelError::ColumnOverflow {
                col: self.col,
                col_span: self.col_span,
                columns,
            });
        }
        Ok(())
    }
}

/// Derived layout metrics for the current container width.
///
/// Recomputed (never persisted) whenever the container width changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    /// Number of columns in the grid.
    pub columns: u16,
    /// Derived width of one cell in pixels.
    pub cell_width: f64,
    /// Fixed height of one row in pixels.
    pub row_height: f64,
    /// Fixed gap between cells in pixels.
    pub gap: f64,
}

impl GridMetrics {
    /// Derive metrics from a container width:
    /// `cell_width = (container_width − (columns − 1) · gap) / columns`.
    pub fn from_container_width(container_width: f64, columns: u16) -> Result<Self, GridModelError> {
        if columns == 0 {
            return Err(GridModelError::ZeroColumns);
        }
        if !container_width.is_finite() || container_width <= 0.0 {
            return Err(GridModelError::InvalidContainerWidth {
                width: container_width,
            });
        }
        let usable = container_width - (columns as f64 - 1.0) * GRID_GAP;
        if usable <= 0.0 {
            return Err(GridModelError::InvalidContainerWidth {
                width: container_width,
            });
        }
        Ok(Self {
            columns,
            cell_width: usable / columns as f64,
            row_height: ROW_HEIGHT,
            gap: GRID_GAP,
        })
    }

    /// Horizontal pitch: one cell plus one gap.
    #[inline]
    #[must_use]
    pub fn col_step(&self) -> f64 {
        self.cell_width + self.gap
    }

    /// Vertical pitch: one row plus one gap.
    #[inline]
    #[must_use]
    pub fn row_step(&self) -> f64 {
        self.row_height + self.gap
    }

    /// Pixel width of `span` cells including interior gaps.
    #[must_use]
    pub fn span_width(&self, span: u16) -> f64 {
        span as f64 * self.cell_width + (span.saturating_sub(1)) as f64 * self.gap
    }

    /// Pixel height of `span` rows including interior gaps.
    #[must_use]
    pub fn span_height(&self, span: u16) -> f64 {
        span as f64 * self.row_height + (span.saturating_sub(1)) as f64 * self.gap
    }
}

impl Default for GridMetrics {
    /// Metrics for a 1200px container with the default column count.
    fn default() -> Self {
        Self::from_container_width(1200.0, DEFAULT_COLUMNS)
            .unwrap_or(Self {
                columns: DEFAULT_COLUMNS,
                cell_width: 92.0,
                row_height: ROW_HEIGHT,
                gap: GRID_GAP,
            })
    }
}

/// Convert a grid rectangle to its on-screen pixel rectangle.
///
/// Pure and deterministic; called by the transition manager and by the
/// rendering layer every frame for grid-anchored boxes.
#[must_use]
pub fn grid_to_pixel(rect: &GridRect, metrics: &GridMetrics) -> PixelRect {
    PixelRect::new(
        (rect.col as f64 - 1.0) * metrics.col_step(),
        (rect.row as f64 - 1.0) * metrics.row_step(),
        metrics.span_width(rect.col_span),
        metrics.span_height(rect.row_span),
    )
}

/// Round a pixel rectangle to the nearest grid rectangle.
///
/// Coordinates and spans are floored at 1 but no column-fit or maximum-span
/// clamping happens here; use [`snap`] for a fully valid result.
#[must_use]
pub fn pixel_to_grid(rect: &PixelRect, metrics: &GridMetrics) -> GridRect {
    GridRect::new(
        round_unit(rect.x / metrics.col_step()) + 1,
        round_unit(rect.y / metrics.row_step()) + 1,
        round_unit(rect.width / metrics.col_step()).max(1),
        round_unit(rect.height / metrics.row_step()).max(1),
    )
}

/// Round a pixel ratio to a non-negative grid unit. Saturates one below
/// `u16::MAX` so the 1-based offset in [`pixel_to_grid`] cannot overflow.
/// Total over any f64 input (NaN and −∞ land on 0).
fn round_unit(ratio: f64) -> u16 {
    const LIMIT: u16 = u16::MAX - 1;
    let rounded = ratio.round();
    if rounded.is_nan() || rounded <= 0.0 {
        0
    } else if rounded >= LIMIT as f64 {
        LIMIT
    } else {
        rounded as u16
    }
}

/// Snap a free-mode pixel rectangle to a structurally valid grid rectangle.
///
/// Applies the inverse geometry formula then clamps:
/// - `col ≥ 1`; a span overflowing the right edge is reduced to fit, floor 1.
/// - `col > columns` forces `col = columns, col_span = 1`. This degenerate
///   edge policy is preserved for compatibility with existing documents.
/// - `row ≥ 1`; rows are unbounded above.
/// - Both spans clamped to `[1, MAX_SPAN]`.
#[must_use]
pub fn snap(rect: &PixelRect, metrics: &GridMetrics) -> GridRect {
    let raw = pixel_to_grid(rect, metrics);
    let mut col = raw.col.max(1);
    let mut col_span = raw.col_span.clamp(1, MAX_SPAN);
    let row = raw.row.max(1);
    let row_span = raw.row_span.clamp(1, MAX_SPAN);

    if col > metrics.columns {
        col = metrics.columns;
        col_span = 1;
    } else if col as u32 + col_span as u32 - 1 > metrics.columns as u32 {
        col_span = metrics.columns - col + 1;
    }

    GridRect::new(col, row, col_span, row_span)
}

/// Errors from grid model construction and validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridModelError {
    /// The grid must have at least one column.
    ZeroColumns,
    /// The container width cannot produce a positive cell width.
    InvalidContainerWidth { width: f64 },
    /// A 1-based coordinate was zero.
    ZeroCoordinate { field: &'static str },
    /// A span was zero or above [`MAX_SPAN`].
    SpanOutOfRange { field: &'static str, value: u16 },
    /// The box extends past the last column.
    ColumnOverflow { col: u16, col_span: u16, columns: u16 },
}

impl fmt::Display for GridModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroColumns => write!(f, "grid must have at least one column"),
            Self::InvalidContainerWidth { width } => {
                write!(f, "container width {width} cannot produce a positive cell width")
            }
            Self::ZeroCoordinate { field } => {
                write!(f, "{field} is 1-based and must be at least 1")
            }
            Self::SpanOutOfRange { field, value } => {
                write!(f, "{field} {value} outside valid range 1..={MAX_SPAN}")
            }
            Self::ColumnOverflow {
                col,
                col_span,
                columns,
            } => write!(
                f,
                "box at col {col} with span {col_span} extends past column {columns}"
            ),
        }
    }
}

impl std::error::Error for GridModelError {}

#[cfg(test)]
mod tests {
    use super::*;
    use gridboard_core::geometry::PixelRect;
    use proptest::prelude::*;

    fn metrics(container_width: f64, columns: u16) -> GridMetrics {
        GridMetrics::from_container_width(container_width, columns).unwrap()
    }

    // ---- Metrics ----

    #[test]
    fn cell_width_formula() {
        let m = metrics(1200.0, 12);
        // (1200 − 11·8) / 12
        assert!((m.cell_width - (1200.0 - 11.0 * GRID_GAP) / 12.0).abs() < 1e-9);
        assert_eq!(m.row_height, ROW_HEIGHT);
        assert_eq!(m.gap, GRID_GAP);
    }

    #[test]
    fn metrics_reject_bad_inputs() {
        assert_eq!(
            GridMetrics::from_container_width(1200.0, 0).unwrap_err(),
            GridModelError::ZeroColumns
        );
        assert!(matches!(
            GridMetrics::from_container_width(0.0, 12).unwrap_err(),
            GridModelError::InvalidContainerWidth { .. }
        ));
        assert!(matches!(
            GridMetrics::from_container_width(f64::NAN, 12).unwrap_err(),
            GridModelError::InvalidContainerWidth { .. }
        ));
        // 12 columns of gaps alone exceed 50px of container
        assert!(matches!(
            GridMetrics::from_container_width(50.0, 12).unwrap_err(),
            GridModelError::InvalidContainerWidth { .. }
        ));
    }

    #[test]
    fn span_sizes_include_interior_gaps() {
        let m = metrics(1200.0, 12);
        assert!((m.span_width(1) - m.cell_width).abs() < 1e-9);
        assert!((m.span_width(3) - (3.0 * m.cell_width + 2.0 * m.gap)).abs() < 1e-9);
        assert!((m.span_height(2) - (2.0 * ROW_HEIGHT + GRID_GAP)).abs() < 1e-9);
    }

    // ---- Forward transform ----

    #[test]
    fn grid_to_pixel_origin_cell() {
        let m = metrics(1200.0, 12);
        let px = grid_to_pixel(&GridRect::new(1, 1, 1, 1), &m);
        assert_eq!(px.x, 0.0);
        assert_eq!(px.y, 0.0);
        assert!((px.width - m.cell_width).abs() < 1e-9);
        assert_eq!(px.height, ROW_HEIGHT);
    }

    #[test]
    fn grid_to_pixel_offsets_by_pitch() {
        let m = metrics(1200.0, 12);
        let px = grid_to_pixel(&GridRect::new(3, 2, 2, 1), &m);
        assert!((px.x - 2.0 * m.col_step()).abs() < 1e-9);
        assert!((px.y - m.row_step()).abs() < 1e-9);
        assert!((px.width - m.span_width(2)).abs() < 1e-9);
    }

    // ---- Round trip ----

    #[test]
    fn round_trip_exact_cells() {
        let m = metrics(1200.0, 12);
        for rect in [
            GridRect::new(1, 1, 1, 1),
            GridRect::new(5, 3, 4, 2),
            GridRect::new(12, 40, 1, 5),
            GridRect::new(8, 1, 5, 1),
        ] {
            assert_eq!(pixel_to_grid(&grid_to_pixel(&rect, &m), &m), rect);
        }
    }

    proptest! {
        #[test]
        fn prop_round_trip(
            container in 400.0f64..4000.0,
            columns in 2u16..=24,
            col in 1u16..=24,
            row in 1u16..=500,
            col_span in 1u16..=MAX_SPAN,
            row_span in 1u16..=MAX_SPAN,
        ) {
            let m = metrics(container, columns);
            prop_assume!(m.gap < m.cell_width);
            let rect = GridRect::new(col.min(columns), row, col_span, row_span);
            prop_assert_eq!(pixel_to_grid(&grid_to_pixel(&rect, &m), &m), rect);
        }

        #[test]
        fn prop_snap_total(
            x in -1e7f64..1e7,
            y in -1e7f64..1e7,
            w in -1e5f64..1e7,
            h in -1e5f64..1e7,
        ) {
            let m = metrics(1200.0, 12);
            let snapped = snap(&PixelRect::new(x, y, w, h), &m);
            prop_assert!(snapped.validate(m.columns).is_ok());
        }
    }

    // ---- Snap & clamp ----

    #[test]
    fn snap_negative_coordinates_floor_to_origin() {
        let m = metrics(1200.0, 12);
        let snapped = snap(&PixelRect::new(-500.0, -900.0, m.cell_width, ROW_HEIGHT), &m);
        assert_eq!(snapped, GridRect::new(1, 1, 1, 1));
    }

    #[test]
    fn snap_reduces_overflowing_span() {
        // 10 columns, box at col 9 spanning 3: the span clamps to 2.
        let m = metrics(1000.0, 10);
        let px = grid_to_pixel(&GridRect::new(9, 1, 3, 1), &m);
        let snapped = snap(&px, &m);
        assert_eq!(snapped.col, 9);
        assert_eq!(snapped.col_span, 2);
    }

    #[test]
    fn snap_degenerate_edge_forces_last_column() {
        let m = metrics(1000.0, 10);
        let px = PixelRect::new(40.0 * m.col_step(), 0.0, m.cell_width, ROW_HEIGHT);
        let snapped = snap(&px, &m);
        assert_eq!(snapped.col, 10);
        assert_eq!(snapped.col_span, 1);
    }

    #[test]
    fn snap_caps_spans_at_max() {
        let m = metrics(2000.0, 12);
        let px = PixelRect::new(0.0, 0.0, 12.0 * m.col_step(), 40.0 * m.row_step());
        let snapped = snap(&px, &m);
        assert_eq!(snapped.col_span, MAX_SPAN);
        assert_eq!(snapped.row_span, MAX_SPAN);
    }

    #[test]
    fn snap_rows_unbounded_above() {
        let m = metrics(1200.0, 12);
        let px = PixelRect::new(0.0, 900.0 * m.row_step(), m.cell_width, ROW_HEIGHT);
        assert_eq!(snap(&px, &m).row, 901);
    }

    #[test]
    fn snap_saturates_far_off_grid_coordinates() {
        let m = metrics(1200.0, 12);
        // Coordinates whose cell ratio rounds past the u16 range.
        let snapped = snap(&PixelRect::new(7.0e6, 7.0e6, 100.0, 80.0), &m);
        assert!(snapped.validate(m.columns).is_ok());
        assert_eq!(snapped.row, u16::MAX);
        assert_eq!((snapped.col, snapped.col_span), (12, 1));
    }

    #[test]
    fn snap_handles_nan_input() {
        let m = metrics(1200.0, 12);
        let snapped = snap(&PixelRect::new(f64::NAN, f64::NAN, f64::NAN, f64::NAN), &m);
        assert!(snapped.validate(m.columns).is_ok());
    }

    // ---- Validation ----

    #[test]
    fn validate_rejects_zero_fields() {
        assert!(matches!(
            GridRect::new(0, 1, 1, 1).validate(12),
            Err(GridModelError::ZeroCoordinate { field: "col" })
        ));
        assert!(matches!(
            GridRect::new(1, 0, 1, 1).validate(12),
            Err(GridModelError::ZeroCoordinate { field: "row" })
        ));
        assert!(matches!(
            GridRect::new(1, 1, 0, 1).validate(12),
            Err(GridModelError::SpanOutOfRange { field: "colSpan", .. })
        ));
    }

    #[test]
    fn validate_rejects_span_above_max() {
        assert!(matches!(
            GridRect::new(1, 1, 1, MAX_SPAN + 1).validate(12),
            Err(GridModelError::SpanOutOfRange { field: "rowSpan", .. })
        ));
    }

    #[test]
    fn validate_rejects_column_overflow() {
        assert!(matches!(
            GridRect::new(11, 1, 3, 1).validate(12),
            Err(GridModelError::ColumnOverflow { .. })
        ));
        assert!(GridRect::new(11, 1, 2, 1).validate(12).is_ok());
    }

    #[test]
    fn serde_uses_camel_case_spans() {
        let json = serde_json::to_string(&GridRect::new(1, 2, 3, 4)).unwrap();
        assert!(json.contains("\"colSpan\":3"));
        assert!(json.contains("\"rowSpan\":4"));
    }

    #[test]
    fn error_display_is_actionable() {
        let err = GridRect::new(11, 1, 3, 1).validate(12).unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("11"));
        assert!(msg.contains("12"));
    }
}
