//! Geometric primitives.

use serde::{Deserialize, Serialize};

use crate::orientation::{Edge, Orientation};

/// A point in layout pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component along the given axis.
    #[inline]
    pub const fn along(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Horizontal => self.x,
            Orientation::Vertical => self.y,
        }
    }
}

/// A rectangle for layout bounds, drop outlines, and hit testing.
///
/// Origin at top-left, `x`/`y` inclusive, `right`/`bottom` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from origin with given size.
    #[inline]
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Centre of the rectangle.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if the rectangle has zero (or negative) area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Start coordinate along an axis.
    #[inline]
    pub const fn start(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Horizontal => self.x,
            Orientation::Vertical => self.y,
        }
    }

    /// Extent along an axis.
    #[inline]
    pub const fn extent(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Horizontal => self.width,
            Orientation::Vertical => self.height,
        }
    }

    /// Take a slice `[offset, offset + length)` along `orientation`, keeping
    /// the full extent of the cross axis.
    pub fn slice(&self, orientation: Orientation, offset: f64, length: f64) -> Rect {
        match orientation {
            Orientation::Horizontal => Rect::new(self.x + offset, self.y, length, self.height),
            Orientation::Vertical => Rect::new(self.x, self.y + offset, self.width, length),
        }
    }

    /// Split off a band of `size` pixels flush against `edge`.
    ///
    /// Returns `(band, remainder)`. The band is clamped to the rectangle.
    pub fn split_edge(&self, edge: Edge, size: f64) -> (Rect, Rect) {
        let axis = edge.orientation();
        let size = size.clamp(0.0, self.extent(axis));
        let rest = self.extent(axis) - size;
        if edge.is_near() {
            (self.slice(axis, 0.0, size), self.slice(axis, size, rest))
        } else {
            (self.slice(axis, rest, size), self.slice(axis, 0.0, rest))
        }
    }

    /// Create a new rectangle inside the current one with the given insets.
    pub fn inner(&self, insets: Insets) -> Rect {
        Rect {
            x: self.x + insets.left,
            y: self.y + insets.top,
            width: (self.width - insets.horizontal_sum()).max(0.0),
            height: (self.height - insets.vertical_sum()).max(0.0),
        }
    }

    /// Create a new rectangle that is the union of this rectangle and another.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Compute the intersection with another rectangle, returning `None` if no overlap.
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

    /// Relative position of a point inside the rectangle, each axis in `0..=1`.
    ///
    /// Returns `None` for zero-area rectangles.
    pub fn relative(&self, point: Point) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        Some((
            (point.x - self.x) / self.width,
            (point.y - self.y) / self.height,
        ))
    }
}

/// Per-edge insets, e.g. the space taken by docked borders.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Insets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Insets {
    /// Create insets with specific values.
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Inset on one edge.
    pub const fn get(&self, edge: Edge) -> f64 {
        match edge {
            Edge::Top => self.top,
            Edge::Right => self.right,
            Edge::Bottom => self.bottom,
            Edge::Left => self.left,
        }
    }

    /// Set the inset on one edge.
    pub fn set(&mut self, edge: Edge, value: f64) {
        match edge {
            Edge::Top => self.top = value,
            Edge::Right => self.right = value,
            Edge::Bottom => self.bottom = value,
            Edge::Left => self.left = value,
        }
    }

    /// Sum of left and right.
    #[inline]
    pub fn horizontal_sum(&self) -> f64 {
        self.left + self.right
    }

    /// Sum of top and bottom.
    #[inline]
    pub fn vertical_sum(&self) -> f64 {
        self.top + self.bottom
    }
}
