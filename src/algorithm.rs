//! Masking strategies that decide which cells get traced and in what shape
//!
//! The tracers never look at the mask directly. They ask a
//! [`ContourAlgorithm`] for the [`CellShape`] of each cell, which is either
//! the full quad, a triangle (corner masking), or nothing.

use crate::config::CornerMask;
use crate::grid::{Corner, Grid, Quad};

/// The polygon actually traced for one grid cell
///
/// Corners are counter-clockwise in index space. A quad keeps the canonical
/// bottom-left, bottom-right, top-right, top-left order; a triangle is the
/// quad with its masked corner dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellShape {
    pub row: usize,
    pub col: usize,
    corners: [Corner; 4],
    len: usize,
    center: f64,
}

impl CellShape {
    /// Trace the whole quad
    pub fn quad(quad: &Quad) -> Self {
        Self {
            row: quad.row,
            col: quad.col,
            corners: quad.corners,
            len: 4,
            center: quad.center_value(),
        }
    }

    /// Trace the quad without corner `skip` (0..4, canonical order)
    pub fn triangle(quad: &Quad, skip: usize) -> Self {
        let mut corners = quad.corners;
        // keep cyclic order, the unused fourth slot is never read
        corners.copy_within(skip + 1.., skip);
        let kept = &corners[..3];
        Self {
            row: quad.row,
            col: quad.col,
            corners,
            len: 3,
            center: kept.iter().map(|c| c.value).sum::<f64>() / 3.0,
        }
    }

    /// Corners in counter-clockwise order
    pub fn corners(&self) -> &[Corner] {
        &self.corners[..self.len]
    }

    pub fn is_triangle(&self) -> bool {
        self.len == 3
    }

    /// Value used to resolve saddles: the bilinear centre value of a quad
    pub fn center_value(&self) -> f64 {
        self.center
    }

    /// The cell across side `k` (from corner `k` to corner `k + 1`)
    ///
    /// `None` when the side is a triangle's diagonal or lies on the low edge
    /// of the grid. Cells past the high edge are returned as-is and must be
    /// bounds-checked by the caller.
    pub fn side_neighbor(&self, k: usize) -> Option<(usize, usize)> {
        let corners = self.corners();
        let a = corners[k];
        let b = corners[(k + 1) % corners.len()];
        if a.row == b.row {
            if a.row == self.row {
                self.row.checked_sub(1).map(|r| (r, self.col))
            } else {
                Some((self.row + 1, self.col))
            }
        } else if a.col == b.col {
            if a.col == self.col {
                self.col.checked_sub(1).map(|c| (self.row, c))
            } else {
                Some((self.row, self.col + 1))
            }
        } else {
            None
        }
    }
}

/// Strategy deciding how each grid cell is traced
///
/// Implementations are selected once, from [`CornerMask`], when a
/// [`ContourSet`](crate::ContourSet) or [`ContourGenerator`](crate::ContourGenerator)
/// is built.
pub trait ContourAlgorithm: Send + Sync + std::fmt::Debug {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// The shape to trace for cell `(row, col)`, or `None` to skip it
    fn cell_shape(&self, grid: &Grid, row: usize, col: usize) -> Option<CellShape>;
}

/// Whole-cell exclusion: any masked corner removes the cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegacyMasking;

impl ContourAlgorithm for LegacyMasking {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn cell_shape(&self, grid: &Grid, row: usize, col: usize) -> Option<CellShape> {
        let quad = grid.cell(row, col);
        if quad.is_masked() {
            None
        } else {
            Some(CellShape::quad(&quad))
        }
    }
}

/// Standard masking, optionally keeping the unmasked triangle of a quad
///
/// With `corner_mask` off this excludes the same cells as [`LegacyMasking`].
/// With it on, a quad with exactly one masked corner is traced as the
/// triangle of its three valid corners.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StandardMasking {
    pub corner_mask: bool,
}

impl ContourAlgorithm for StandardMasking {
    fn name(&self) -> &'static str {
        if self.corner_mask {
            "corner-mask"
        } else {
            "standard"
        }
    }

    fn cell_shape(&self, grid: &Grid, row: usize, col: usize) -> Option<CellShape> {
        let quad = grid.cell(row, col);
        match quad.masked_count() {
            0 => Some(CellShape::quad(&quad)),
            1 if self.corner_mask => {
                let skip = quad.masked_corners().iter().position(|&m| m)?;
                Some(CellShape::triangle(&quad, skip))
            }
            _ => None,
        }
    }
}

/// The algorithm for a `corner_mask` setting
pub fn select(corner_mask: CornerMask) -> Box<dyn ContourAlgorithm> {
    match corner_mask {
        CornerMask::Legacy => Box::new(LegacyMasking),
        CornerMask::Enabled => Box::new(StandardMasking { corner_mask: true }),
        CornerMask::Disabled => Box::new(StandardMasking { corner_mask: false }),
    }
}
