//! Integer geometry in window and screen coordinates.

use std::ops::{Add, Sub};

/// A point in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The origin point (0, 0).
    pub const ZERO: Self = Self { x: 0, y: 0 };
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A size in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Zero size.
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };
}

/// An axis-aligned rectangle. The right and bottom edges are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    /// Create a new rectangle from origin and size.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            origin: Point { x, y },
            size: Size { width, height },
        }
    }

    /// Rectangle of the given size anchored at the origin.
    #[inline]
    pub const fn from_size(size: Size) -> Self {
        Self {
            origin: Point::ZERO,
            size,
        }
    }

    /// Empty rectangle at origin.
    pub const ZERO: Self = Self {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    #[inline]
    pub fn left(&self) -> i32 {
        self.origin.x
    }

    #[inline]
    pub fn top(&self) -> i32 {
        self.origin.y
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.origin.x + self.size.width
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.origin.y + self.size.height
    }

    /// Whether the rectangle has no area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.width <= 0 || self.size.height <= 0
    }

    /// Check whether a point lies inside the rectangle.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }

    /// The same rectangle moved by `(dx, dy)`.
    pub fn offset(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            origin: Point::new(self.origin.x + dx, self.origin.y + dy),
            size: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_excludes_far_edges() {
        let rect = Rect::new(10, 10, 20, 5);
        assert!(rect.contains(Point::new(10, 10)));
        assert!(rect.contains(Point::new(29, 14)));
        assert!(!rect.contains(Point::new(30, 14)));
        assert!(!rect.contains(Point::new(29, 15)));
        assert!(!rect.contains(Point::new(9, 12)));
    }

    #[test]
    fn test_offset_keeps_size() {
        let rect = Rect::new(0, 0, 4, 4).offset(-2, 3);
        assert_eq!(rect, Rect::new(-2, 3, 4, 4));
    }

    #[test]
    fn test_empty_rect() {
        assert!(Rect::ZERO.is_empty());
        assert!(Rect::new(5, 5, 0, 10).is_empty());
        assert!(!Rect::from_size(Size::new(1, 1)).is_empty());
    }

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(3, 4);
        let b = Point::from((1, 1));
        assert_eq!(a - b, Point::new(2, 3));
        assert_eq!(a + b, Point::new(4, 5));
    }
}
