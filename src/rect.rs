//! Geometry.
//!
//! Positions are always relative to the parent widget; the y-axis points down.

use cgmath::{EuclideanSpace, Point2, Vector2, Zero};

/// A point, usually in some widget’s local coordinate system.
pub type Point = Point2<f64>;

/// A width and a height.
pub type Size = Vector2<f64>;

/// A translation between two coordinate systems.
pub type Offset = Vector2<f64>;

/// A rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Rectangle origin.
    pub origin: Point,

    /// Rectangle size.
    pub size: Size,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(origin: Point, size: Size) -> Rect {
        Rect { origin, size }
    }

    /// Returns a rectangle of the given size at the origin.
    pub fn from_size(size: Size) -> Rect {
        Rect {
            origin: Point::origin(),
            size,
        }
    }

    /// Returns a zero-sized rectangle at the origin.
    pub fn zero() -> Rect {
        Rect::from_size(Size::zero())
    }

    /// Returns true if the point is inside the rectangle.
    ///
    /// The left and top edges are inclusive, the right and bottom edges are not.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.origin.x
            && point.y >= self.origin.y
            && point.x < self.origin.x + self.size.x
            && point.y < self.origin.y + self.size.y
    }

    /// Returns the bottom right corner.
    pub fn max(&self) -> Point {
        self.origin + self.size
    }

    /// Returns a new rectangle with the given origin.
    pub fn with_origin(&self, origin: Point) -> Rect {
        Rect {
            origin,
            size: self.size,
        }
    }
}

/// Panics if the point has a NaN component.
#[track_caller]
pub(crate) fn assert_point(point: Point, what: &str) {
    assert!(
        !point.x.is_nan() && !point.y.is_nan(),
        "{} must not be NaN (got {:?})",
        what,
        point
    );
}

/// Panics if the size has a NaN component.
#[track_caller]
pub(crate) fn assert_size(size: Size, what: &str) {
    assert!(
        !size.x.is_nan() && !size.y.is_nan(),
        "{} must not be NaN (got {:?})",
        what,
        size
    );
}

#[test]
fn test_rect_contains_edges() {
    let rect = Rect::new(Point::new(10., 10.), Size::new(20., 5.));
    assert!(rect.contains(Point::new(10., 10.)), "top left corner is inside");
    assert!(rect.contains(Point::new(29.5, 14.5)));
    assert!(!rect.contains(Point::new(30., 12.)), "right edge is outside");
    assert!(!rect.contains(Point::new(12., 15.)), "bottom edge is outside");
    assert_eq!(rect.max(), Point::new(30., 15.));
}

#[test]
#[should_panic(expected = "must not be NaN")]
fn test_nan_size_is_fatal() {
    assert_size(Size::new(std::f64::NAN, 1.), "widget size");
}
