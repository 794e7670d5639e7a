//! Overlapping sub-windows for chunked filled tracing
//!
//! Windows are given as sample index ranges. Neighbouring windows share one
//! sample row or column, so the cells of all windows tile the grid exactly
//! once and polygons split at a seam line up on both sides.

use std::iter::FusedIterator;
use std::ops::Range;

/// Lazy row-major iterator over `(row_range, col_range)` sample windows
///
/// Each window spans at most `nchunk x nchunk` cells. `nchunk == 0` yields the
/// whole grid as a single window.
#[derive(Debug)]
pub struct ChunkWindows {
    rows: usize,
    cols: usize,
    step: usize,
    row_start: usize,
    col_start: usize,
    done: bool,
}

impl ChunkWindows {
    /// Windows over a grid of `rows x cols` samples
    pub fn new(rows: usize, cols: usize, nchunk: usize) -> Self {
        let cells = rows.max(cols).saturating_sub(1);
        let step = if nchunk == 0 { cells } else { nchunk.min(cells) };
        Self {
            rows,
            cols,
            step,
            row_start: 0,
            col_start: 0,
            done: rows < 2 || cols < 2,
        }
    }

    /// Number of windows along each axis, `(row_windows, col_windows)`
    pub fn counts(&self) -> (usize, usize) {
        let per_axis = |n: usize| {
            let cells = n.saturating_sub(1);
            if self.step == 0 {
                0
            } else {
                cells.div_ceil(self.step)
            }
        };
        (per_axis(self.rows), per_axis(self.cols))
    }

    fn window_end(&self, start: usize, len: usize) -> usize {
        (start + self.step + 1).min(len)
    }
}

impl Iterator for ChunkWindows {
    type Item = (Range<usize>, Range<usize>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let row_end = self.window_end(self.row_start, self.rows);
        let col_end = self.window_end(self.col_start, self.cols);
        let window = (self.row_start..row_end, self.col_start..col_end);

        if col_end < self.cols {
            self.col_start = col_end - 1;
        } else if row_end < self.rows {
            self.col_start = 0;
            self.row_start = row_end - 1;
        } else {
            self.done = true;
        }

        Some(window)
    }
}

impl FusedIterator for ChunkWindows {}
