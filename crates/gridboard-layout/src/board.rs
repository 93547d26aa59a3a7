#![forbid(unsafe_code)]

//! The authoritative board: box list, selection set, and the free/anchored
//! transition state machine.
//!
//! # Invariants
//!
//! 1. Box IDs are unique within the board; insertion order is z/list order.
//! 2. A box is [`Placement::Free`] if and only if its ID is in the selection
//!    set. Entering the selection attaches a pixel rectangle computed from the
//!    grid; leaving it snaps the pixels back to a resolved grid rectangle.
//! 3. No two *anchored* boxes overlap after any committing operation. Free
//!    boxes are deliberately unconstrained until they settle.
//! 4. Gesture events naming a missing ID are no-ops: UI delivery can race a
//!    prior deletion.
//!
//! History snapshots are owned by the engine, not the board; board operations
//! report whether they committed so the engine knows when to snapshot.

use std::collections::BTreeSet;

use gridboard_core::geometry::{PixelPoint, PixelRect};
use gridboard_core::id::BoxId;

use crate::collision::{PlacementError, resolve};
use crate::grid::{GridMetrics, GridModelError, GridRect, MAX_SPAN, grid_to_pixel, snap};

/// Column position for newly added boxes.
const ADD_COL: u16 = 1;
/// Column span for newly added boxes.
const ADD_COL_SPAN: u16 = 2;
/// Row span for newly added boxes.
const ADD_ROW_SPAN: u16 = 1;

/// Positioning mode for one box.
///
/// Exactly one mode is active at a time; the pixel rectangle exists if and
/// only if the box is free (selected).
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    /// Position expressed in grid units, recomputed to pixels on render.
    Anchored(GridRect),
    /// Position expressed in raw pixels, independent of cell boundaries.
    /// `grid` mirrors the snapped position for display only; `pixels` is
    /// authoritative until the box settles.
    Free { grid: GridRect, pixels: PixelRect },
}

/// One box on the board.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxNode {
    pub id: BoxId,
    pub placement: Placement,
}

impl BoxNode {
    /// The box's grid rectangle: authoritative when anchored, the display
    /// mirror when free.
    #[must_use]
    pub fn grid_rect(&self) -> GridRect {
        match &self.placement {
            Placement::Anchored(grid) => *grid,
            Placement::Free { grid, .. } => *grid,
        }
    }

    /// True while the box is in free (selected) mode.
    #[must_use]
    pub fn is_free(&self) -> bool {
        matches!(self.placement, Placement::Free { .. })
    }

    /// The rectangle the rendering layer should draw this frame.
    #[must_use]
    pub fn display_rect(&self, metrics: &GridMetrics) -> PixelRect {
        match &self.placement {
            Placement::Anchored(grid) => grid_to_pixel(grid, metrics),
            Placement::Free { pixels, .. } => *pixels,
        }
    }
}

/// Outcome of a settle (drag-end / resize-end / deselect) transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// The snapped, collision-resolved rectangle was applied.
    Committed,
    /// The resolver exhausted its probe budget; the previous committed
    /// position was restored. Silent to the user, never corrupting.
    Reverted,
    /// No matching gesture or box; nothing happened.
    Ignored,
}

/// In-flight gesture bookkeeping.
#[derive(Debug, Clone)]
enum ActiveGesture {
    Drag {
        id: BoxId,
        /// Pointer offset from the box origin at gesture start.
        grab: PixelPoint,
        /// Committed grid rectangle to restore if the settle fails.
        origin: GridRect,
    },
    Resize {
        id: BoxId,
        origin: GridRect,
    },
}

impl ActiveGesture {
    fn id(&self) -> &BoxId {
        match self {
            Self::Drag { id, .. } | Self::Resize { id, .. } => id,
        }
    }

    fn origin(&self) -> GridRect {
        match self {
            Self::Drag { origin, .. } | Self::Resize { origin, .. } => *origin,
        }
    }
}

/// The authoritative layout state.
#[derive(Debug, Clone)]
pub struct Board {
    boxes: Vec<BoxNode>,
    selection: BTreeSet<BoxId>,
    metrics: GridMetrics,
    /// Monotonic counter for generated IDs; never reset, so undo cannot
    /// resurrect an ID collision.
    id_serial: u64,
    gesture: Option<ActiveGesture>,
}

impl Board {
    /// Create an empty board with the given metrics.
    #[must_use]
    pub fn new(metrics: GridMetrics) -> Self {
        Self {
            boxes: Vec::new(),
            selection: BTreeSet::new(),
            metrics,
            id_serial: 0,
            gesture: None,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// All boxes in z/list order.
    #[must_use]
    pub fn boxes(&self) -> &[BoxNode] {
        &self.boxes
    }

    /// Look up a box by ID.
    #[must_use]
    pub fn get(&self, id: &BoxId) -> Option<&BoxNode> {
        self.boxes.iter().find(|node| &node.id == id)
    }

    /// The current selection set.
    #[must_use]
    pub fn selection(&self) -> &BTreeSet<BoxId> {
        &self.selection
    }

    /// True if the ID is currently selected.
    #[must_use]
    pub fn is_selected(&self, id: &BoxId) -> bool {
        self.selection.contains(id)
    }

    /// Current grid metrics.
    #[must_use]
    pub fn metrics(&self) -> &GridMetrics {
        &self.metrics
    }

    /// Number of boxes on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// True if the board has no boxes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Highest occupied row, or 0 on an empty board.
    #[must_use]
    pub fn max_occupied_row(&self) -> u32 {
        self.boxes
            .iter()
            .map(|node| node.grid_rect().last_row())
            .max()
            .unwrap_or(0)
    }

    /// Deterministic hash over IDs, grid rectangles, and selection, for
    /// replay divergence diagnostics.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        for node in &self.boxes {
            node.id.hash(&mut hasher);
            node.grid_rect().hash(&mut hasher);
            node.is_free().hash(&mut hasher);
        }
        for id in &self.selection {
            id.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Grid rectangles of every anchored box except `skip`.
    fn anchored_rects_except(&self, skip: &BoxId) -> Vec<GridRect> {
        self.boxes
            .iter()
            .filter(|node| !node.is_free() && &node.id != skip)
            .map(|node| node.grid_rect())
            .collect()
    }

    // ========================================================================
    // Structural mutations
    // ========================================================================

    /// Append a new box at column 1, one row past the current content,
    /// spanning 2×1 cells. Returns the generated ID.
    ///
    /// The candidate runs through the placement resolver, so when the row
    /// range is saturated at `u16::MAX` the add fails instead of overlapping
    /// an existing box.
    pub fn add_box(&mut self) -> Result<BoxId, PlacementError> {
        let id = self.next_id();
        let row = (self.max_occupied_row() + 1).min(u16::MAX as u32) as u16;
        let col_span = ADD_COL_SPAN.min(self.metrics.columns);
        let candidate = GridRect::new(ADD_COL, row.max(1), col_span, ADD_ROW_SPAN);
        let others: Vec<GridRect> = self
            .boxes
            .iter()
            .filter(|node| !node.is_free())
            .map(|node| node.grid_rect())
            .collect();
        let rect = resolve(candidate, &others)?;
        self.boxes.push(BoxNode {
            id: id.clone(),
            placement: Placement::Anchored(rect),
        });
        Ok(id)
    }

    /// Remove a box, dropping it from the selection and aborting any gesture
    /// that targets it. Returns false (no-op) if the ID is gone.
    pub fn delete_box(&mut self, id: &BoxId) -> bool {
        let Some(index) = self.boxes.iter().position(|node| &node.id == id) else {
            return false;
        };
        self.boxes.remove(index);
        self.selection.remove(id);
        if self.gesture.as_ref().is_some_and(|g| g.id() == id) {
            self.gesture = None;
        }
        true
    }

    /// Remove every box. Returns false if the board was already empty.
    pub fn clear(&mut self) -> bool {
        if self.boxes.is_empty() {
            return false;
        }
        self.boxes.clear();
        self.selection.clear();
        self.gesture = None;
        true
    }

    /// Replace the entire layout with imported, already-validated boxes.
    /// Clears the selection and aborts any in-flight gesture.
    pub(crate) fn replace_all(&mut self, boxes: Vec<BoxNode>) {
        self.boxes = boxes;
        self.selection.clear();
        self.gesture = None;
    }

    /// Restore a snapshot of boxes + selection (undo/redo). Any in-flight
    /// gesture is aborted; metrics are untouched.
    pub(crate) fn restore(&mut self, boxes: Vec<BoxNode>, selection: BTreeSet<BoxId>) {
        self.boxes = boxes;
        self.selection = selection;
        self.gesture = None;
    }

    /// Generate a fresh unique ID from the monotonic counter.
    fn next_id(&mut self) -> BoxId {
        loop {
            self.id_serial += 1;
            let candidate = format!("box-{}", self.id_serial);
            if !self.boxes.iter().any(|node| node.id.as_str() == candidate) {
                // The counter only produces non-empty strings.
                if let Ok(id) = BoxId::new(candidate) {
                    return id;
                }
            }
        }
    }

    // ========================================================================
    // Selection & transitions
    // ========================================================================

    /// Select a box. `multi: false` clears the set first (plain click);
    /// `multi: true` toggles membership without touching the rest.
    ///
    /// Returns the number of boxes that settled back onto the grid as a side
    /// effect (deselected boxes anchoring); the engine snapshots when > 0.
    /// No-op if the ID is gone. Re-selecting an already sole-selected box is
    /// idempotent.
    pub fn select(&mut self, id: &BoxId, multi: bool) -> usize {
        if self.get(id).is_none() {
            return 0;
        }
        if multi {
            if self.selection.contains(id) {
                let outcome = self.anchor_box(id);
                self.selection.remove(id);
                return usize::from(outcome != SettleOutcome::Ignored);
            }
            self.selection.insert(id.clone());
            self.float_box(id);
            return 0;
        }

        // Plain click: everything else settles, this ID floats.
        let mut anchored = 0;
        let others: Vec<BoxId> = self
            .selection
            .iter()
            .filter(|selected| *selected != id)
            .cloned()
            .collect();
        for other in &others {
            if self.anchor_box(other) != SettleOutcome::Ignored {
                anchored += 1;
            }
            self.selection.remove(other);
        }
        if self.selection.insert(id.clone()) {
            self.float_box(id);
        }
        anchored
    }

    /// Clear the selection, settling every free box. Returns the number of
    /// boxes that settled.
    pub fn deselect_all(&mut self) -> usize {
        let selected: Vec<BoxId> = self.selection.iter().cloned().collect();
        let mut anchored = 0;
        for id in &selected {
            if self.anchor_box(id) != SettleOutcome::Ignored {
                anchored += 1;
            }
        }
        self.selection.clear();
        anchored
    }

    /// `Anchored → Free`: attach a pixel rectangle computed from the grid.
    /// Idempotent while already free.
    fn float_box(&mut self, id: &BoxId) {
        let metrics = self.metrics;
        if let Some(node) = self.boxes.iter_mut().find(|node| &node.id == id)
            && let Placement::Anchored(grid) = node.placement
        {
            node.placement = Placement::Free {
                grid,
                pixels: grid_to_pixel(&grid, &metrics),
            };
        }
    }

    /// `Free → Anchored`: snap the pixels, resolve collisions against the
    /// other anchored boxes, and drop the pixel rectangle. On resolver
    /// exhaustion the box lands on its previous committed rectangle,
    /// probing downward from there if that spot has since been taken.
    fn anchor_box(&mut self, id: &BoxId) -> SettleOutcome {
        let Some(index) = self.boxes.iter().position(|node| &node.id == id) else {
            return SettleOutcome::Ignored;
        };
        let Placement::Free { grid, pixels } = self.boxes[index].placement else {
            return SettleOutcome::Ignored;
        };
        let others = self.anchored_rects_except(id);
        let candidate = snap(&pixels, &self.metrics);
        match resolve(candidate, &others) {
            Ok(resolved) => {
                self.boxes[index].placement = Placement::Anchored(resolved);
                SettleOutcome::Committed
            }
            Err(_) => {
                // Fall back to the last committed rectangle, probing from it
                // if another box has since settled there; only when even that
                // probe exhausts is the mirror kept as-is.
                let fallback = resolve(grid, &others).unwrap_or(grid);
                self.boxes[index].placement = Placement::Anchored(fallback);
                SettleOutcome::Reverted
            }
        }
    }

    // ========================================================================
    // Drag
    // ========================================================================

    /// Start a move gesture. Selects the box (plain) if it is not already
    /// selected; returns the number of boxes that settled as a side effect,
    /// or `None` if the ID is gone.
    pub fn begin_drag(&mut self, id: &BoxId, pointer: PixelPoint) -> Option<usize> {
        self.begin_gesture(id, pointer, false)
    }

    /// Reposition the dragged box. Pixels move freely: no collision checks,
    /// no cell clamping. The grid mirror is refreshed for display only.
    /// No-op unless a matching drag is active.
    pub fn update_drag(&mut self, id: &BoxId, pointer: PixelPoint) -> bool {
        let Some(ActiveGesture::Drag { id: active, grab, .. }) = &self.gesture else {
            return false;
        };
        if active != id {
            return false;
        }
        let grab = *grab;
        let metrics = self.metrics;
        let Some(node) = self.boxes.iter_mut().find(|node| &node.id == id) else {
            return false;
        };
        let Placement::Free { grid, pixels } = &mut node.placement else {
            return false;
        };
        pixels.x = pointer.x - grab.x;
        pixels.y = pointer.y - grab.y;
        *grid = snap(pixels, &metrics);
        true
    }

    /// Settle the drag: snap, resolve, and re-align the free pixels to the
    /// resolved grid rectangle. The box stays selected (free) until deselect.
    pub fn end_drag(&mut self, id: &BoxId) -> SettleOutcome {
        self.end_gesture(id, false)
    }

    // ========================================================================
    // Resize
    // ========================================================================

    /// Start a resize gesture; same selection side effects as [`begin_drag`].
    ///
    /// [`begin_drag`]: Board::begin_drag
    pub fn begin_resize(&mut self, id: &BoxId, pointer: PixelPoint) -> Option<usize> {
        self.begin_gesture(id, pointer, true)
    }

    /// Adjust the free box size from the pointer position. The size is
    /// bounded immediately to `[1 cell, MAX_SPAN cells]` in pixel terms so a
    /// degenerate box can never exist, even mid-gesture.
    pub fn update_resize(&mut self, id: &BoxId, pointer: PixelPoint) -> bool {
        let Some(ActiveGesture::Resize { id: active, .. }) = &self.gesture else {
            return false;
        };
        if active != id {
            return false;
        }
        let metrics = self.metrics;
        let Some(node) = self.boxes.iter_mut().find(|node| &node.id == id) else {
            return false;
        };
        let Placement::Free { grid, pixels } = &mut node.placement else {
            return false;
        };
        let min_width = metrics.span_width(1);
        let max_width = metrics.span_width(MAX_SPAN);
        let min_height = metrics.span_height(1);
        let max_height = metrics.span_height(MAX_SPAN);
        pixels.width = (pointer.x - pixels.x).clamp(min_width, max_width);
        pixels.height = (pointer.y - pixels.y).clamp(min_height, max_height);
        *grid = snap(pixels, &metrics);
        true
    }

    /// Settle the resize; see [`end_drag`](Board::end_drag).
    pub fn end_resize(&mut self, id: &BoxId) -> SettleOutcome {
        self.end_gesture(id, true)
    }

    // ========================================================================
    // Gesture internals
    // ========================================================================

    fn begin_gesture(&mut self, id: &BoxId, pointer: PixelPoint, resize: bool) -> Option<usize> {
        if self.get(id).is_none() {
            return None;
        }
        let anchored = if self.is_selected(id) {
            0
        } else {
            self.select(id, false)
        };
        let node = self.get(id)?;
        let origin = node.grid_rect();
        let pixels = node.display_rect(&self.metrics);
        self.gesture = Some(if resize {
            ActiveGesture::Resize {
                id: id.clone(),
                origin,
            }
        } else {
            ActiveGesture::Drag {
                id: id.clone(),
                grab: PixelPoint::new(pointer.x - pixels.x, pointer.y - pixels.y),
                origin,
            }
        });
        Some(anchored)
    }

    fn end_gesture(&mut self, id: &BoxId, resize: bool) -> SettleOutcome {
        let matches = match (&self.gesture, resize) {
            (Some(ActiveGesture::Drag { id: active, .. }), false) => active == id,
            (Some(ActiveGesture::Resize { id: active, .. }), true) => active == id,
            _ => false,
        };
        if !matches {
            return SettleOutcome::Ignored;
        }
        let origin = self
            .gesture
            .take()
            .map(|gesture| gesture.origin())
            .unwrap_or_else(|| GridRect::new(1, 1, 1, 1));

        let Some(index) = self.boxes.iter().position(|node| &node.id == id) else {
            return SettleOutcome::Ignored;
        };
        let Placement::Free { pixels, .. } = self.boxes[index].placement else {
            return SettleOutcome::Ignored;
        };

        let others = self.anchored_rects_except(id);
        let candidate = snap(&pixels, &self.metrics);
        match resolve(candidate, &others) {
            Ok(resolved) => {
                // Stay free (still selected) but align the pixels to the
                // settled grid position so the display matches the commit.
                self.boxes[index].placement = Placement::Free {
                    grid: resolved,
                    pixels: grid_to_pixel(&resolved, &self.metrics),
                };
                SettleOutcome::Committed
            }
            Err(_) => {
                self.boxes[index].placement = Placement::Free {
                    grid: origin,
                    pixels: grid_to_pixel(&origin, &self.metrics),
                };
                SettleOutcome::Reverted
            }
        }
    }

    // ========================================================================
    // Metrics
    // ========================================================================

    /// Re-derive metrics for a new container width. Free boxes keep their
    /// pixel rectangles (pixels are authoritative while free); anchored boxes
    /// pick up the new metrics on the next display query.
    pub fn set_container_width(&mut self, width: f64) -> Result<(), GridModelError> {
        self.metrics = GridMetrics::from_container_width(width, self.metrics.columns)?;
        Ok(())
    }
}
