//! Line and filled contour tracing over a whole grid
//!
//! Both tracers visit cells in row-major order, collect directed edges from
//! [`CellWalk`] and link them with an [`EdgeAssembler`]. Filled tracing does
//! this once per chunk window.

use crate::algorithm::{self, ContourAlgorithm};
use crate::chunk::ChunkWindows;
use crate::classify::{Band, CellWalk};
use crate::config::CornerMask;
use crate::edge::{Bound, DirectedEdge, EdgeAssembler};
use crate::error::{ContourError, Result};
use crate::grid::Grid;
use crate::point::{PathCode, Point};
use std::ops::Range;
use std::time::Instant;

/// One contour polyline
///
/// Closed loops do not repeat their first point.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub points: Vec<Point>,
    pub closed: bool,
}

/// One boundary loop of a filled band, with its path kind codes
///
/// `vertices` ends with a copy of its first vertex and `kinds` is
/// `[1, 2, ..., 2, 79]`. In index space outer boundaries wind
/// counter-clockwise and holes clockwise; `hole` records which. The sign of
/// [`signed_area`](Self::signed_area) is taken in data coordinates and flips
/// when one grid axis decreases.
#[derive(Debug, Clone, PartialEq)]
pub struct FilledPolygon {
    pub vertices: Vec<Point>,
    pub kinds: Vec<u8>,
    pub hole: bool,
}

impl FilledPolygon {
    /// Close `ring` and attach kind codes; `None` for fewer than 3 vertices
    ///
    /// A clockwise ring in data coordinates is taken to be a hole.
    pub fn from_ring(ring: Vec<Point>) -> Option<Self> {
        if ring.len() < 3 {
            return None;
        }
        let n = ring.len();
        let mut vertices = ring;
        vertices.push(vertices[0]);

        let mut kinds = Vec::with_capacity(n + 1);
        kinds.push(PathCode::MoveTo.code());
        kinds.extend(std::iter::repeat(PathCode::LineTo.code()).take(n - 1));
        kinds.push(PathCode::ClosePoly.code());

        let mut polygon = Self {
            vertices,
            kinds,
            hole: false,
        };
        polygon.hole = polygon.signed_area() < 0.0;
        Some(polygon)
    }

    /// Re-decide `hole` for a ring traced on a grid with the given
    /// [`Grid::orientation`]
    pub(crate) fn with_orientation(mut self, orientation: f64) -> Self {
        self.hole = self.signed_area() * orientation < 0.0;
        self
    }

    /// The loop without its closing vertex
    pub fn ring(&self) -> &[Point] {
        &self.vertices[..self.vertices.len().saturating_sub(1)]
    }

    /// Shoelace area in data coordinates, positive for counter-clockwise loops
    pub fn signed_area(&self) -> f64 {
        self.vertices
            .windows(2)
            .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
            .sum::<f64>()
            / 2.0
    }

    /// Whether this loop is a hole
    pub fn is_hole(&self) -> bool {
        self.hole
    }
}

/// Trace the contour lines of `level`
///
/// Higher values lie to the left of every segment. Open segments, which end
/// on the grid border or at excluded cells, come first.
pub fn trace_lines(
    grid: &Grid,
    algorithm: &dyn ContourAlgorithm,
    level: f64,
) -> Result<Vec<Segment>> {
    if level.is_nan() {
        return Err(ContourError::invalid_levels("contour level is NaN"));
    }
    let start = Instant::now();

    let (cell_rows, cell_cols) = grid.cell_shape();
    let band = Band::line(level);
    let mut assembler = EdgeAssembler::new();
    let mut chords = Vec::with_capacity(2);

    for row in 0..cell_rows {
        for col in 0..cell_cols {
            let Some(shape) = algorithm.cell_shape(grid, row, col) else {
                continue;
            };
            chords.clear();
            CellWalk::new(&shape, band).chords(Bound::Lower, &mut chords);
            for chord in chords.drain(..) {
                assembler.push(chord);
            }
        }
    }

    let chord_count = assembler.len();
    let segments: Vec<Segment> = assembler
        .assemble()
        .into_iter()
        .filter(|chain| chain.points.len() >= if chain.closed { 3 } else { 2 })
        .map(|chain| Segment {
            points: chain.points,
            closed: chain.closed,
        })
        .collect();

    tracing::debug!(
        level,
        algorithm = algorithm.name(),
        chords = chord_count,
        segments = segments.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "traced contour lines"
    );

    Ok(segments)
}

/// Trace the filled region `lower < z <= upper`
///
/// When `lower` is at or below the data minimum the band also takes in
/// `z == lower`. With `nchunk > 0` each window of at most `nchunk x nchunk`
/// cells is traced on its own and the results concatenated in window order.
pub fn trace_filled(
    grid: &Grid,
    algorithm: &dyn ContourAlgorithm,
    lower: f64,
    upper: f64,
    nchunk: usize,
) -> Result<Vec<FilledPolygon>> {
    if lower.is_nan() || upper.is_nan() {
        return Err(ContourError::invalid_levels("band bound is NaN"));
    }
    if lower >= upper {
        return Err(ContourError::invalid_levels(format!(
            "lower level {} must be below upper level {}",
            lower, upper
        )));
    }
    let start = Instant::now();

    let include_lower = grid.z_range().is_some_and(|(zmin, _)| lower <= zmin);
    let band = Band::new(lower, upper, include_lower);

    let (rows, cols) = grid.shape();
    let orientation = grid.orientation();
    let windows = ChunkWindows::new(rows, cols, nchunk);
    let (row_windows, col_windows) = windows.counts();
    let mut polygons = Vec::new();
    let mut edge_count = 0usize;

    for (row_range, col_range) in windows {
        let edges = window_edges(grid, algorithm, band, &row_range, &col_range);
        edge_count += edges.len();

        let mut assembler = EdgeAssembler::new();
        for edge in edges {
            assembler.push(edge);
        }
        for chain in assembler.assemble() {
            if !chain.closed {
                tracing::warn!(
                    lower,
                    upper,
                    points = chain.points.len(),
                    "dropping unclosed band boundary"
                );
                continue;
            }
            polygons.extend(
                FilledPolygon::from_ring(chain.points).map(|p| p.with_orientation(orientation)),
            );
        }
    }

    tracing::debug!(
        lower,
        upper,
        include_lower,
        algorithm = algorithm.name(),
        windows = row_windows * col_windows,
        edges = edge_count,
        polygons = polygons.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "traced filled band"
    );

    Ok(polygons)
}

/// Boundary edges of `band` for the cells inside one sample window
fn window_edges(
    grid: &Grid,
    algorithm: &dyn ContourAlgorithm,
    band: Band,
    rows: &Range<usize>,
    cols: &Range<usize>,
) -> Vec<DirectedEdge> {
    let cell_rows = rows.start..rows.end - 1;
    let cell_cols = cols.start..cols.end - 1;
    let mut edges = Vec::new();
    let mut open = [false; 4];

    for row in cell_rows.clone() {
        for col in cell_cols.clone() {
            let Some(shape) = algorithm.cell_shape(grid, row, col) else {
                continue;
            };
            let walk = CellWalk::new(&shape, band);
            if walk.is_empty() {
                continue;
            }

            let sides = shape.corners().len();
            for (k, side_open) in open.iter_mut().enumerate().take(sides) {
                *side_open = match shape.side_neighbor(k) {
                    None => true,
                    Some((r, c)) => {
                        !cell_rows.contains(&r)
                            || !cell_cols.contains(&c)
                            || (grid.has_mask() && algorithm.cell_shape(grid, r, c).is_none())
                    }
                };
            }
            walk.band_edges(&open[..sides], &mut edges);
        }
    }

    edges
}

/// A grid paired with the masking strategy to trace it with
#[derive(Debug)]
pub struct ContourGenerator<'g> {
    grid: &'g Grid,
    algorithm: Box<dyn ContourAlgorithm>,
}

impl<'g> ContourGenerator<'g> {
    pub fn new(grid: &'g Grid, corner_mask: CornerMask) -> Self {
        Self::with_algorithm(grid, algorithm::select(corner_mask))
    }

    pub fn with_algorithm(grid: &'g Grid, algorithm: Box<dyn ContourAlgorithm>) -> Self {
        Self { grid, algorithm }
    }

    pub fn grid(&self) -> &'g Grid {
        self.grid
    }

    pub fn algorithm_name(&self) -> &'static str {
        self.algorithm.name()
    }

    /// See [`trace_lines`]
    pub fn trace_lines(&self, level: f64) -> Result<Vec<Segment>> {
        trace_lines(self.grid, self.algorithm.as_ref(), level)
    }

    /// See [`trace_filled`]
    pub fn trace_filled(&self, lower: f64, upper: f64, nchunk: usize) -> Result<Vec<FilledPolygon>> {
        trace_filled(self.grid, self.algorithm.as_ref(), lower, upper, nchunk)
    }
}
