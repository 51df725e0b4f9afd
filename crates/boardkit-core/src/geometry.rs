#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Board space is measured in pixels with the origin at the top-left corner.
//! Pointer coordinates are fractional; grid cells are addressed by signed
//! `(row, col)` pairs so that neighbours of edge cells can be represented
//! before they are bounds-checked against a grid.

/// A point in board space (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise offset from `other` to `self`.
    #[inline]
    #[must_use]
    pub fn delta(self, other: Self) -> (f64, f64) {
        (self.x - other.x, self.y - other.y)
    }

    /// Translate by a `(dx, dy)` offset.
    #[inline]
    #[must_use]
    pub fn offset(self, (dx, dy): (f64, f64)) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The cell whose top-left corner is at or before this point.
    #[inline]
    #[must_use]
    pub fn cell(self, cell_size: u32) -> Cell {
        let size = f64::from(cell_size.max(1));
        Cell::new((self.y / size).floor() as i32, (self.x / size).floor() as i32)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in board space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A `size × size` square with its top-left corner at `origin`.
    #[inline]
    #[must_use]
    pub fn square(origin: Point, size: f64) -> Self {
        Self::new(origin.x, origin.y, size, size)
    }

    /// Right edge.
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Check if a point is inside the rectangle, edges included.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Compute the intersection with another rectangle, returning `None` if
    /// the two do not overlap with a positive area.
    #[inline]
    #[must_use]
    pub fn intersection_opt(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Area shared with `other`; zero when they do not overlap.
    #[inline]
    #[must_use]
    pub fn overlap_area(&self, other: &Rect) -> f64 {
        self.intersection_opt(other).map_or(0.0, |r| r.area())
    }
}

/// A grid cell addressed by `(row, col)`.
///
/// Cells may lie outside any particular grid; bounds are checked by the grid
/// that interprets them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    #[inline]
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Top-left corner of this cell in pixels.
    #[inline]
    #[must_use]
    pub fn origin(self, cell_size: u32) -> Point {
        let size = f64::from(cell_size);
        Point::new(f64::from(self.col) * size, f64::from(self.row) * size)
    }

    /// The pixel area this cell covers.
    #[inline]
    #[must_use]
    pub fn bounds(self, cell_size: u32) -> Rect {
        Rect::square(self.origin(cell_size), f64::from(cell_size))
    }

    /// Chebyshev (king-move) distance to another cell.
    #[inline]
    #[must_use]
    pub fn chebyshev_distance(self, other: Self) -> u32 {
        (self.row - other.row)
            .unsigned_abs()
            .max((self.col - other.col).unsigned_abs())
    }

    #[inline]
    #[must_use]
    pub const fn right(self) -> Self {
        Self::new(self.row, self.col + 1)
    }

    #[inline]
    #[must_use]
    pub const fn below(self) -> Self {
        Self::new(self.row + 1, self.col)
    }
}

impl From<(i32, i32)> for Cell {
    fn from((row, col): (i32, i32)) -> Self {
        Self { row, col }
    }
}
