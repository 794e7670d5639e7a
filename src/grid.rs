//! Validated, read-only view over the sampled field
//!
//! A [`Grid`] owns the X, Y and Z samples (row-major, `rows x cols`) and an
//! optional mask. It is built once, validated up front, and then shared
//! read-only by every trace, including traces running on other threads.

use crate::error::{ContourError, Result};
use crate::point::Point;

/// One sample of the grid: its indices, coordinates and scalar value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corner {
    /// Row index (`i`)
    pub row: usize,
    /// Column index (`j`)
    pub col: usize,
    /// Data coordinates of the sample
    pub point: Point,
    /// Scalar value at this sample
    pub value: f64,
}

/// The four samples bounding cell `(row, col)`
///
/// Corners are stored in canonical order: bottom-left `(i, j)`, bottom-right
/// `(i, j+1)`, top-right `(i+1, j+1)`, top-left `(i+1, j)`. Walking them in
/// this order is counter-clockwise in index space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub row: usize,
    pub col: usize,
    pub corners: [Corner; 4],
    masked: [bool; 4],
}

impl Quad {
    /// Whether any corner is masked
    pub fn is_masked(&self) -> bool {
        self.masked.iter().any(|&m| m)
    }

    /// Per-corner mask flags, in canonical corner order
    pub fn masked_corners(&self) -> [bool; 4] {
        self.masked
    }

    /// Number of masked corners
    pub fn masked_count(&self) -> usize {
        self.masked.iter().filter(|&&m| m).count()
    }

    /// Mean of the corner values, which is the bilinear value at the cell centre
    pub fn center_value(&self) -> f64 {
        self.corners.iter().map(|c| c.value).sum::<f64>() / 4.0
    }
}

/// Builder for [`Grid`] with the less common construction options
#[derive(Debug, Clone)]
pub struct GridBuilder {
    z: Vec<Vec<f64>>,
    coords: Coords,
    mask: Option<Vec<Vec<bool>>>,
    mask_non_finite: bool,
}

#[derive(Debug, Clone)]
enum Coords {
    Index,
    Axes(Vec<f64>, Vec<f64>),
    Full(Vec<Vec<f64>>, Vec<Vec<f64>>),
}

impl GridBuilder {
    /// Start from the scalar field; coordinates default to sample indices
    pub fn new(z: Vec<Vec<f64>>) -> Self {
        Self {
            z,
            coords: Coords::Index,
            mask: None,
            mask_non_finite: false,
        }
    }

    /// 1-D coordinate vectors: `x` has one entry per column, `y` one per row
    pub fn axes(mut self, x: Vec<f64>, y: Vec<f64>) -> Self {
        self.coords = Coords::Axes(x, y);
        self
    }

    /// Full 2-D coordinate arrays with the same shape as Z
    pub fn coords(mut self, x: Vec<Vec<f64>>, y: Vec<Vec<f64>>) -> Self {
        self.coords = Coords::Full(x, y);
        self
    }

    /// Sample mask, `true` marks an invalid sample
    pub fn mask(mut self, mask: Vec<Vec<bool>>) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Fold NaN/Inf samples into the mask instead of rejecting them
    pub fn mask_non_finite(mut self, enabled: bool) -> Self {
        self.mask_non_finite = enabled;
        self
    }

    /// Validate and build the grid
    pub fn build(self) -> Result<Grid> {
        let rows = self.z.len();
        let cols = self.z.first().map_or(0, |r| r.len());
        if rows < 2 || cols < 2 {
            return Err(ContourError::shape_mismatch(format!(
                "grid must be at least 2x2, got {}x{}",
                rows, cols
            )));
        }
        let z = flatten("z", self.z, rows, cols)?;

        let (x, y) = match self.coords {
            Coords::Index => {
                let x = (0..rows)
                    .flat_map(|_| (0..cols).map(|j| j as f64))
                    .collect();
                let y = (0..rows)
                    .flat_map(|i| std::iter::repeat(i as f64).take(cols))
                    .collect();
                (x, y)
            }
            Coords::Axes(xs, ys) => {
                if xs.len() != cols || ys.len() != rows {
                    return Err(ContourError::shape_mismatch(format!(
                        "1-D x must have length {} and y length {}, got {} and {}",
                        cols,
                        rows,
                        xs.len(),
                        ys.len()
                    )));
                }
                let x = (0..rows).flat_map(|_| xs.iter().copied()).collect();
                let y = ys
                    .iter()
                    .flat_map(|&v| std::iter::repeat(v).take(cols))
                    .collect();
                (x, y)
            }
            Coords::Full(xs, ys) => (flatten("x", xs, rows, cols)?, flatten("y", ys, rows, cols)?),
        };
        if let Some(idx) = (0..rows * cols).find(|&i| !x[i].is_finite() || !y[i].is_finite()) {
            return Err(ContourError::InvalidCoordinate {
                row: idx / cols,
                col: idx % cols,
                x: x[idx],
                y: y[idx],
            });
        }
        let orientation = orientation(&x, &y, rows, cols);

        let mut mask = match self.mask {
            Some(m) => {
                if m.len() != rows || m.iter().any(|r| r.len() != cols) {
                    return Err(ContourError::invalid_mask(format!(
                        "mask shape does not match z shape {}x{}",
                        rows, cols
                    )));
                }
                let flat: Vec<bool> = m.into_iter().flatten().collect();
                // An all-false mask is no mask at all
                if flat.iter().any(|&b| b) {
                    Some(flat)
                } else {
                    None
                }
            }
            None => None,
        };

        let mut folded = 0usize;
        for (idx, &value) in z.iter().enumerate() {
            if value.is_finite() || mask.as_ref().is_some_and(|m| m[idx]) {
                continue;
            }
            if !self.mask_non_finite {
                return Err(ContourError::InvalidData {
                    row: idx / cols,
                    col: idx % cols,
                    value,
                });
            }
            mask.get_or_insert_with(|| vec![false; rows * cols])[idx] = true;
            folded += 1;
        }
        if folded > 0 {
            tracing::warn!(folded, rows, cols, "non-finite samples folded into mask");
        }

        let z_range = z
            .iter()
            .enumerate()
            .filter(|(idx, _)| !mask.as_ref().is_some_and(|m| m[*idx]))
            .fold(None, |acc: Option<(f64, f64)>, (_, &v)| match acc {
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                None => Some((v, v)),
            });

        Ok(Grid {
            rows,
            cols,
            x,
            y,
            z,
            mask,
            z_range,
            orientation,
        })
    }
}

/// Sign of the index-to-data mapping: the summed data-space area of every
/// cell, counter-clockwise in index space
fn orientation(x: &[f64], y: &[f64], rows: usize, cols: usize) -> f64 {
    let mut area = 0.0;
    for row in 0..rows - 1 {
        for col in 0..cols - 1 {
            let p0 = row * cols + col;
            let p1 = p0 + 1;
            let p2 = p0 + cols + 1;
            let p3 = p0 + cols;
            area += (x[p2] - x[p0]) * (y[p3] - y[p1]) - (x[p3] - x[p1]) * (y[p2] - y[p0]);
        }
    }
    if area < 0.0 {
        -1.0
    } else {
        1.0
    }
}

fn flatten(name: &str, data: Vec<Vec<f64>>, rows: usize, cols: usize) -> Result<Vec<f64>> {
    if data.len() != rows {
        return Err(ContourError::shape_mismatch(format!(
            "{} has {} rows, expected {}",
            name,
            data.len(),
            rows
        )));
    }
    if let Some((i, row)) = data.iter().enumerate().find(|(_, r)| r.len() != cols) {
        return Err(ContourError::shape_mismatch(format!(
            "{} row {} has {} columns, expected {}",
            name,
            i,
            row.len(),
            cols
        )));
    }
    Ok(data.into_iter().flatten().collect())
}

/// The grid context every trace runs against
#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    mask: Option<Vec<bool>>,
    z_range: Option<(f64, f64)>,
    orientation: f64,
}

impl Grid {
    /// Build from full 2-D X, Y and Z arrays
    pub fn new(
        x: Vec<Vec<f64>>,
        y: Vec<Vec<f64>>,
        z: Vec<Vec<f64>>,
        mask: Option<Vec<Vec<bool>>>,
    ) -> Result<Self> {
        let mut builder = GridBuilder::new(z).coords(x, y);
        if let Some(m) = mask {
            builder = builder.mask(m);
        }
        builder.build()
    }

    /// Build from 1-D axes: `x.len() == cols`, `y.len() == rows`
    pub fn from_axes(
        x: &[f64],
        y: &[f64],
        z: Vec<Vec<f64>>,
        mask: Option<Vec<Vec<bool>>>,
    ) -> Result<Self> {
        let mut builder = GridBuilder::new(z).axes(x.to_vec(), y.to_vec());
        if let Some(m) = mask {
            builder = builder.mask(m);
        }
        builder.build()
    }

    /// Build with index coordinates (`x = j`, `y = i`)
    pub fn from_values(z: Vec<Vec<f64>>, mask: Option<Vec<Vec<bool>>>) -> Result<Self> {
        let mut builder = GridBuilder::new(z);
        if let Some(m) = mask {
            builder = builder.mask(m);
        }
        builder.build()
    }

    /// Start a [`GridBuilder`]
    pub fn builder(z: Vec<Vec<f64>>) -> GridBuilder {
        GridBuilder::new(z)
    }

    /// `(rows, cols)` in samples
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// `(rows, cols)` in cells
    pub fn cell_shape(&self) -> (usize, usize) {
        (self.rows - 1, self.cols - 1)
    }

    fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// Scalar value at sample `(row, col)`
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.z[self.index(row, col)]
    }

    /// Coordinates of sample `(row, col)`
    pub fn point(&self, row: usize, col: usize) -> Point {
        let idx = self.index(row, col);
        Point::new(self.x[idx], self.y[idx])
    }

    /// Whether sample `(row, col)` is masked
    pub fn is_masked(&self, row: usize, col: usize) -> bool {
        self.mask.as_ref().is_some_and(|m| m[self.index(row, col)])
    }

    /// Whether the grid carries any mask at all
    pub fn has_mask(&self) -> bool {
        self.mask.is_some()
    }

    /// Sample `(row, col)` as a [`Corner`]
    pub fn corner(&self, row: usize, col: usize) -> Corner {
        Corner {
            row,
            col,
            point: self.point(row, col),
            value: self.value(row, col),
        }
    }

    /// Cell `(row, col)`, with `row < rows - 1` and `col < cols - 1`
    pub fn cell(&self, row: usize, col: usize) -> Quad {
        let ids = [
            (row, col),
            (row, col + 1),
            (row + 1, col + 1),
            (row + 1, col),
        ];
        Quad {
            row,
            col,
            corners: ids.map(|(r, c)| self.corner(r, c)),
            masked: ids.map(|(r, c)| self.is_masked(r, c)),
        }
    }

    /// Minimum and maximum over unmasked samples, `None` when everything is masked
    pub fn z_range(&self) -> Option<(f64, f64)> {
        self.z_range
    }

    /// `1.0` when counter-clockwise in index space is counter-clockwise in
    /// data coordinates, `-1.0` when one axis runs backwards
    pub fn orientation(&self) -> f64 {
        self.orientation
    }
}
