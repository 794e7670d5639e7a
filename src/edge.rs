//! Directed boundary edges and their assembly into chains and loops
//!
//! Every vertex a cell emits is keyed by grid topology rather than by its
//! coordinates: a crossing is identified by the grid edge it lies on and the
//! bound it belongs to, a corner by its sample indices. Two cells sharing a
//! grid edge therefore agree exactly on the vertices they have in common, and
//! linking edges is a hash lookup instead of a tolerance search.

use crate::point::Point;
use std::collections::{HashMap, HashSet};

/// Which of the two band bounds a crossing belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    Lower,
    Upper,
}

/// A grid edge between two samples
///
/// Horizontal edges join `(row, col)` and `(row, col + 1)`, vertical edges
/// join `(row, col)` and `(row + 1, col)`. A diagonal belongs to the cell
/// `(row, col)` and only exists when that cell is traced as a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SideKey {
    Horizontal { row: usize, col: usize },
    Vertical { row: usize, col: usize },
    Diagonal { row: usize, col: usize },
}

/// Topological identity of a boundary vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexKey {
    Corner { row: usize, col: usize },
    Crossing { side: SideKey, bound: Bound },
}

/// A directed piece of contour or region boundary
#[derive(Debug, Clone, PartialEq)]
pub struct DirectedEdge {
    pub from: VertexKey,
    pub to: VertexKey,
    pub start: Point,
    pub end: Point,
}

impl DirectedEdge {
    pub fn new(from: VertexKey, start: Point, to: VertexKey, end: Point) -> Self {
        Self {
            from,
            to,
            start,
            end,
        }
    }
}

/// An assembled polyline; closed chains do not repeat their first point
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub points: Vec<Point>,
    pub closed: bool,
}

/// Collects directed edges from cells and links them into chains
///
/// Edges keep their insertion order, and cells push their edges in row-major
/// order, so the assembled output is deterministic.
#[derive(Debug, Default)]
pub struct EdgeAssembler {
    edges: Vec<DirectedEdge>,
}

impl EdgeAssembler {
    /// Create an empty assembler
    pub fn new() -> Self {
        Self { edges: Vec::new() }
    }

    /// Add one edge
    pub fn push(&mut self, edge: DirectedEdge) {
        self.edges.push(edge);
    }

    /// Number of edges collected so far
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether no edges were collected
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Link all edges into chains
    ///
    /// Chains starting at a vertex that nothing leads into (a grid or mask
    /// boundary) come first, as open polylines. Everything left over forms
    /// closed loops. Each edge is consumed exactly once.
    pub fn assemble(&self) -> Vec<Chain> {
        let mut outgoing: HashMap<VertexKey, Vec<usize>> = HashMap::with_capacity(self.edges.len());
        let mut incoming: HashSet<VertexKey> = HashSet::with_capacity(self.edges.len());
        for (idx, edge) in self.edges.iter().enumerate() {
            outgoing.entry(edge.from).or_default().push(idx);
            incoming.insert(edge.to);
        }

        let mut used = vec![false; self.edges.len()];
        let mut chains = Vec::new();

        for idx in 0..self.edges.len() {
            if !used[idx] && !incoming.contains(&self.edges[idx].from) {
                chains.push(self.walk(idx, &outgoing, &mut used));
            }
        }
        for idx in 0..self.edges.len() {
            if !used[idx] {
                chains.push(self.walk(idx, &outgoing, &mut used));
            }
        }

        chains
    }

    fn walk(
        &self,
        first: usize,
        outgoing: &HashMap<VertexKey, Vec<usize>>,
        used: &mut [bool],
    ) -> Chain {
        let origin = self.edges[first].from;
        let mut points = vec![self.edges[first].start];
        let mut current = first;
        let mut closed = false;

        loop {
            used[current] = true;
            let edge = &self.edges[current];

            if edge.to == origin {
                closed = true;
                break;
            }
            push_distinct(&mut points, edge.end);

            // Lowest unused outgoing edge keeps pinch vertices deterministic
            let next = outgoing
                .get(&edge.to)
                .and_then(|candidates| candidates.iter().copied().find(|&i| !used[i]));
            match next {
                Some(i) => current = i,
                None => break,
            }
        }

        if closed && points.len() > 1 && points.first() == points.last() {
            points.pop();
        }

        Chain { points, closed }
    }
}

fn push_distinct(points: &mut Vec<Point>, p: Point) {
    if points.last() != Some(&p) {
        points.push(p);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner(row: usize, col: usize) -> VertexKey {
        VertexKey::Corner { row, col }
    }

    fn edge(a: (usize, usize), b: (usize, usize)) -> DirectedEdge {
        DirectedEdge::new(
            corner(a.0, a.1),
            Point::new(a.1 as f64, a.0 as f64),
            corner(b.0, b.1),
            Point::new(b.1 as f64, b.0 as f64),
        )
    }

    #[test]
    fn test_assembler_single_edge() {
        let mut assembler = EdgeAssembler::new();
        assembler.push(edge((0, 0), (1, 1)));

        let chains = assembler.assemble();

        assert_eq!(chains.len(), 1);
        assert!(!chains[0].closed);
        assert_eq!(chains[0].points, vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
    }

    #[test]
    fn test_assembler_closed_loop_out_of_order() {
        let mut assembler = EdgeAssembler::new();
        assembler.push(edge((1, 1), (0, 1)));
        assembler.push(edge((0, 0), (1, 0)));
        assembler.push(edge((0, 1), (0, 0)));
        assembler.push(edge((1, 0), (1, 1)));

        let chains = assembler.assemble();

        assert_eq!(chains.len(), 1);
        assert!(chains[0].closed);
        assert_eq!(chains[0].points.len(), 4);
        assert_eq!(chains[0].points[0], Point::new(1.0, 1.0));
    }

    #[test]
    fn test_open_chains_come_first() {
        let mut assembler = EdgeAssembler::new();
        // closed triangle
        assembler.push(edge((5, 5), (5, 6)));
        assembler.push(edge((5, 6), (6, 5)));
        assembler.push(edge((6, 5), (5, 5)));
        // open two-edge chain pushed middle-first
        assembler.push(edge((0, 1), (0, 2)));
        assembler.push(edge((0, 0), (0, 1)));

        let chains = assembler.assemble();

        assert_eq!(chains.len(), 2);
        assert!(!chains[0].closed);
        assert_eq!(chains[0].points.len(), 3);
        assert!(chains[1].closed);
    }

    #[test]
    fn test_pinch_vertex_splits_into_two_loops() {
        let mut assembler = EdgeAssembler::new();
        // two triangles sharing vertex (1, 1)
        assembler.push(edge((1, 1), (0, 1)));
        assembler.push(edge((0, 1), (0, 0)));
        assembler.push(edge((0, 0), (1, 1)));
        assembler.push(edge((1, 1), (2, 1)));
        assembler.push(edge((2, 1), (2, 2)));
        assembler.push(edge((2, 2), (1, 1)));

        let chains = assembler.assemble();

        assert_eq!(chains.len(), 2);
        assert!(chains.iter().all(|c| c.closed && c.points.len() == 3));
    }

    #[test]
    fn test_duplicate_coordinates_collapsed() {
        let mut assembler = EdgeAssembler::new();
        let p = Point::new(0.5, 0.0);
        let crossing = VertexKey::Crossing {
            side: SideKey::Horizontal { row: 0, col: 0 },
            bound: Bound::Lower,
        };
        assembler.push(DirectedEdge::new(corner(0, 0), Point::new(0.0, 0.0), crossing, p));
        assembler.push(DirectedEdge::new(crossing, p, corner(0, 1), p));

        let chains = assembler.assemble();

        assert_eq!(chains[0].points, vec![Point::new(0.0, 0.0), p]);
    }
}
