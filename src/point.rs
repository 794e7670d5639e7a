use std::hash::{Hash, Hasher};

/// A vertex in data coordinates
#[derive(Debug, Clone, Copy)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a point from coordinates
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation from `self` towards `other`, `t` in `[0, 1]`
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point::new(
            self.x + t * (other.x - self.x),
            self.y + t * (other.y - self.y),
        )
    }

    /// As an `[x, y]` pair
    pub fn to_array(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

// Bitwise equality: crossings on a shared grid edge are computed the same way
// by both neighbouring cells, so exact comparison is meaningful here.
impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.x.to_bits() == other.x.to_bits() && self.y.to_bits() == other.y.to_bits()
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.to_bits().hash(state);
        self.y.to_bits().hash(state);
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Vector path kind codes consumed by the rendering layer
///
/// The numeric values follow the common vector path encoding: a subpath starts
/// with `MoveTo`, continues with `LineTo` and ends with `ClosePoly`, whose
/// vertex repeats the subpath's first vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PathCode {
    MoveTo = 1,
    LineTo = 2,
    ClosePoly = 79,
}

impl PathCode {
    /// Numeric kind code
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<PathCode> for u8 {
    fn from(code: PathCode) -> Self {
        code.code()
    }
}
