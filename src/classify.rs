//! Per-cell classification against a level band
//!
//! Each corner of a cell is classified as below, within or above the band.
//! Walking the cell perimeter counter-clockwise yields the in-band corners and
//! the crossing points of both bounds in order. From that walk a cell emits
//! its directed boundary edges, with the in-band region on their left:
//!
//! - chords joining two crossings of the same bound through the cell interior;
//! - perimeter pieces, but only along sides the caller marks as open (grid
//!   border, chunk border, excluded neighbour, triangle diagonal). Pieces on
//!   shared sides would cancel against the neighbour's and are never emitted.
//!
//! Line contours reuse the same walk with the band `(level, +inf)` and keep
//! only the chords, so line and filled output always agree on saddles.

use crate::algorithm::CellShape;
use crate::edge::{Bound, DirectedEdge, SideKey, VertexKey};
use crate::grid::Corner;
use crate::point::Point;

/// Where a sample value lies relative to a band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CornerState {
    Below,
    Within,
    Above,
}

/// The half-open value interval `lower < z <= upper`
///
/// With `include_lower` the interval also contains `z == lower`, which is how
/// the lowest filled band keeps the data minimum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub lower: f64,
    pub upper: f64,
    pub include_lower: bool,
}

impl Band {
    pub fn new(lower: f64, upper: f64, include_lower: bool) -> Self {
        Self {
            lower,
            upper,
            include_lower,
        }
    }

    /// The band whose lower boundary is the contour line at `level`
    pub fn line(level: f64) -> Self {
        Self::new(level, f64::INFINITY, false)
    }

    pub fn classify(&self, value: f64) -> CornerState {
        if self.is_below(value) {
            CornerState::Below
        } else if value > self.upper {
            CornerState::Above
        } else {
            CornerState::Within
        }
    }

    fn is_below(&self, value: f64) -> bool {
        if self.include_lower {
            value < self.lower
        } else {
            value <= self.lower
        }
    }

    fn level(&self, bound: Bound) -> f64 {
        match bound {
            Bound::Lower => self.lower,
            Bound::Upper => self.upper,
        }
    }

    /// Whether `value` is on the high side of `bound`
    fn is_high(&self, bound: Bound, value: f64) -> bool {
        match bound {
            Bound::Lower => !self.is_below(value),
            Bound::Upper => value > self.upper,
        }
    }
}

/// The grid edge between two corners of a cell
pub fn side_key(a: &Corner, b: &Corner) -> SideKey {
    let row = a.row.min(b.row);
    let col = a.col.min(b.col);
    if a.row == b.row {
        SideKey::Horizontal { row, col }
    } else if a.col == b.col {
        SideKey::Vertical { row, col }
    } else {
        SideKey::Diagonal { row, col }
    }
}

/// Where `level` crosses the edge between `a` and `b`
///
/// Always interpolates from the endpoint with the smaller `(row, col)` so that
/// both cells sharing the edge compute bit-identical points.
pub fn crossing_point(a: &Corner, b: &Corner, level: f64) -> Point {
    let (p, q) = if (a.row, a.col) <= (b.row, b.col) {
        (a, b)
    } else {
        (b, a)
    };
    let t = ((level - p.value) / (q.value - p.value)).clamp(0.0, 1.0);
    p.point.lerp(&q.point, t)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    /// An in-band corner
    Corner,
    /// Crossing where the counter-clockwise walk enters the band
    Entry(Bound),
    /// Crossing where the counter-clockwise walk leaves the band
    Exit(Bound),
}

#[derive(Debug, Clone, Copy)]
struct Node {
    key: VertexKey,
    point: Point,
    kind: NodeKind,
    /// Perimeter side walked to reach this node
    side: usize,
}

impl Node {
    fn bound(&self) -> Option<Bound> {
        match self.kind {
            NodeKind::Entry(b) | NodeKind::Exit(b) => Some(b),
            NodeKind::Corner => None,
        }
    }

    /// The stretch of perimeter after this node is in band
    fn opens_band(&self) -> bool {
        matches!(self.kind, NodeKind::Corner | NodeKind::Entry(_))
    }
}

/// Crossings met walking from a corner in state `from` to one in state `to`,
/// in walk order, tagged as entries into or exits from the band
fn side_crossings(from: CornerState, to: CornerState) -> &'static [NodeKind] {
    use CornerState::*;
    use NodeKind::*;
    match (from, to) {
        (Below, Within) => &[Entry(Bound::Lower)],
        (Within, Below) => &[Exit(Bound::Lower)],
        (Within, Above) => &[Exit(Bound::Upper)],
        (Above, Within) => &[Entry(Bound::Upper)],
        (Below, Above) => &[Entry(Bound::Lower), Exit(Bound::Upper)],
        (Above, Below) => &[Entry(Bound::Upper), Exit(Bound::Lower)],
        _ => &[],
    }
}

/// The perimeter walk of one cell against one band
#[derive(Debug)]
pub struct CellWalk<'a> {
    shape: &'a CellShape,
    band: Band,
    nodes: Vec<Node>,
}

impl<'a> CellWalk<'a> {
    /// Classify the corners of `shape` and collect the perimeter nodes
    pub fn new(shape: &'a CellShape, band: Band) -> Self {
        let corners = shape.corners();
        let n = corners.len();
        let states: Vec<CornerState> = corners.iter().map(|c| band.classify(c.value)).collect();

        let mut nodes = Vec::with_capacity(2 * n + 2);
        for k in 0..n {
            let a = &corners[k];
            if states[k] == CornerState::Within {
                nodes.push(Node {
                    key: VertexKey::Corner {
                        row: a.row,
                        col: a.col,
                    },
                    point: a.point,
                    kind: NodeKind::Corner,
                    side: (k + n - 1) % n,
                });
            }

            let next = (k + 1) % n;
            let b = &corners[next];
            let side = side_key(a, b);
            for &kind in side_crossings(states[k], states[next]) {
                let bound = match kind {
                    NodeKind::Entry(bound) | NodeKind::Exit(bound) => bound,
                    NodeKind::Corner => continue,
                };
                nodes.push(Node {
                    key: VertexKey::Crossing { side, bound },
                    point: crossing_point(a, b, band.level(bound)),
                    kind,
                    side: k,
                });
            }
        }

        Self { shape, band, nodes }
    }

    /// Whether nothing of the band touches this cell
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether every corner is in band and no bound crosses the cell
    pub fn is_full(&self) -> bool {
        self.nodes.len() == self.shape.corners().len()
            && self.nodes.iter().all(|n| n.kind == NodeKind::Corner)
    }

    /// Interior chords of one bound, oriented with the band on the left
    pub fn chords(&self, bound: Bound, out: &mut Vec<DirectedEdge>) {
        let crossings: Vec<&Node> = self
            .nodes
            .iter()
            .filter(|n| n.bound() == Some(bound))
            .collect();

        match crossings.len() {
            2 => push_chord(crossings[0], crossings[1], out),
            4 => {
                // Saddle: each chord cuts off one corner. Corners whose side
                // of the level differs from the centre's are the ones cut off;
                // the other pair stays joined through the centre.
                let corners = self.shape.corners();
                let center_high = self.band.is_high(bound, self.shape.center_value());
                let corner1_high = self.band.is_high(bound, corners[1].value);
                if corner1_high != center_high {
                    // cut corners 1 and 3
                    push_chord(crossings[0], crossings[1], out);
                    push_chord(crossings[2], crossings[3], out);
                } else {
                    // cut corners 2 and 0
                    push_chord(crossings[1], crossings[2], out);
                    push_chord(crossings[3], crossings[0], out);
                }
            }
            _ => {}
        }
    }

    /// Perimeter pieces of the in-band region along sides where `open[k]` holds
    pub fn perimeter(&self, open: &[bool], out: &mut Vec<DirectedEdge>) {
        let m = self.nodes.len();
        for i in 0..m {
            let a = &self.nodes[i];
            let b = &self.nodes[(i + 1) % m];
            if a.opens_band() && open[b.side] {
                out.push(DirectedEdge::new(a.key, a.point, b.key, b.point));
            }
        }
    }

    /// All boundary edges of the in-band region for filled contours
    pub fn band_edges(&self, open: &[bool], out: &mut Vec<DirectedEdge>) {
        self.chords(Bound::Lower, out);
        self.chords(Bound::Upper, out);
        self.perimeter(open, out);
    }
}

/// Orient a chord from the band exit to the band entry
fn push_chord(a: &Node, b: &Node, out: &mut Vec<DirectedEdge>) {
    let (from, to) = match (a.kind, b.kind) {
        (NodeKind::Exit(_), NodeKind::Entry(_)) => (a, b),
        (NodeKind::Entry(_), NodeKind::Exit(_)) => (b, a),
        _ => return,
    };
    out.push(DirectedEdge::new(from.key, from.point, to.key, to.point));
}
