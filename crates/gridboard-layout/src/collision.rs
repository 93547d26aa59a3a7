#![forbid(unsafe_code)]

//! Axis-aligned collision detection and the row-probe placement resolver.
//!
//! When a box leaves free mode it must land on the grid without overlapping
//! any grid-anchored box. The tie-break is asymmetric: the moving box yields,
//! never the stationary ones, and only rows are shifted — the search is a
//! strictly increasing one-dimensional probe down the grid.

use std::fmt;

use crate::grid::GridRect;

/// Maximum number of row shifts before the resolver gives up.
pub const MAX_RESOLVE_ATTEMPTS: u16 = 100;

/// Open-interval axis-aligned overlap test.
///
/// Touching edges do not count as overlap.
#[inline]
#[must_use]
pub fn overlaps(a: &GridRect, b: &GridRect) -> bool {
    (a.col as u32) < b.col_end()
        && a.col_end() > b.col as u32
        && (a.row as u32) < b.row_end()
        && a.row_end() > b.row as u32
}

/// True if `candidate` overlaps any rectangle in `others`.
#[must_use]
pub fn overlaps_any<'a>(
    candidate: &GridRect,
    others: impl IntoIterator<Item = &'a GridRect>,
) -> bool {
    others.into_iter().any(|other| overlaps(candidate, other))
}

/// Find the nearest non-overlapping placement for `candidate` by shifting it
/// down one row at a time.
///
/// `others` must hold only grid-anchored rectangles; boxes mid-selection are
/// excluded by the caller. Returns [`PlacementError::Unresolved`] after
/// [`MAX_RESOLVE_ATTEMPTS`] shifts so the caller can keep the box's previous
/// committed position instead of corrupting the layout.
pub fn resolve(candidate: GridRect, others: &[GridRect]) -> Result<GridRect, PlacementError> {
    let mut probe = candidate;
    for _ in 0..=MAX_RESOLVE_ATTEMPTS {
        if !overlaps_any(&probe, others) {
            return Ok(probe);
        }
        probe.row = probe.row.saturating_add(1);
    }
    Err(PlacementError::Unresolved {
        attempts: MAX_RESOLVE_ATTEMPTS,
    })
}

/// Failure from the placement resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    /// No free row was found within the probe budget.
    Unresolved { attempts: u16 },
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved { attempts } => {
                write!(f, "no free placement found after {attempts} row shifts")
            }
        }
    }
}

impl std::error::Error for PlacementError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(col: u16, row: u16, col_span: u16, row_span: u16) -> GridRect {
        GridRect::new(col, row, col_span, row_span)
    }

    // ---- Overlap test ----

    #[test]
    fn identical_rects_overlap() {
        let a = rect(1, 1, 2, 2);
        assert!(overlaps(&a, &a));
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = rect(1, 1, 2, 2);
        assert!(!overlaps(&a, &rect(3, 1, 2, 2)), "right edge touch");
        assert!(!overlaps(&a, &rect(1, 3, 2, 2)), "bottom edge touch");
    }

    #[test]
    fn partial_overlap_detected_both_axes() {
        let a = rect(1, 1, 3, 3);
        assert!(overlaps(&a, &rect(3, 3, 2, 2)));
        assert!(overlaps(&a, &rect(2, 2, 1, 1)), "containment counts");
    }

    #[test]
    fn disjoint_rows_never_overlap() {
        assert!(!overlaps(&rect(1, 1, 5, 1), &rect(1, 5, 5, 1)));
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = rect(2, 2, 3, 2);
        let b = rect(4, 3, 2, 2);
        assert_eq!(overlaps(&a, &b), overlaps(&b, &a));
    }

    // ---- Resolver ----

    #[test]
    fn resolve_keeps_conflict_free_candidate() {
        let others = [rect(1, 1, 2, 1)];
        let candidate = rect(3, 1, 2, 1);
        assert_eq!(resolve(candidate, &others).unwrap(), candidate);
    }

    #[test]
    fn resolve_shifts_below_single_blocker() {
        let others = [rect(1, 1, 2, 2)];
        let resolved = resolve(rect(1, 1, 2, 1), &others).unwrap();
        assert_eq!(resolved, rect(1, 3, 2, 1));
        assert!(!overlaps_any(&resolved, &others));
    }

    #[test]
    fn resolve_probes_past_stacked_blockers() {
        // A solid column of boxes in rows 1..=6; the candidate lands in row 7.
        let others: Vec<GridRect> = (0..3).map(|i| rect(1, 1 + i * 2, 2, 2)).collect();
        let resolved = resolve(rect(1, 2, 2, 1), &others).unwrap();
        assert_eq!(resolved.row, 7);
    }

    #[test]
    fn resolve_never_shifts_columns() {
        let others = [rect(2, 1, 2, 3)];
        let resolved = resolve(rect(3, 2, 2, 1), &others).unwrap();
        assert_eq!(resolved.col, 3);
        assert!(resolved.row > 2);
    }

    #[test]
    fn resolve_exhausts_on_saturated_rows() {
        // One blocker per probe step: rows 1..=101 occupied at full width.
        let others: Vec<GridRect> = (1..=101).map(|row| rect(1, row, 5, 1)).collect();
        let err = resolve(rect(1, 1, 5, 1), &others).unwrap_err();
        assert_eq!(
            err,
            PlacementError::Unresolved {
                attempts: MAX_RESOLVE_ATTEMPTS
            }
        );
    }

    #[test]
    fn resolve_row_saturation_terminates() {
        // Probe at the top of the row range must not wrap around.
        let blocker = rect(1, u16::MAX, 5, 5);
        let err = resolve(rect(1, u16::MAX, 5, 1), std::slice::from_ref(&blocker));
        assert!(err.is_err());
    }

    #[test]
    fn placement_error_display() {
        let msg = format!(
            "{}",
            PlacementError::Unresolved {
                attempts: MAX_RESOLVE_ATTEMPTS
            }
        );
        assert!(msg.contains("100"));
    }
}
