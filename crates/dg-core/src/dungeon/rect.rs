//! Grid geometry shared by every generation stage
//!
//! Rectangles are half-open: `min` is the first cell inside, `max` is one past
//! the last cell on each axis, so `width = max.x - min.x`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// An integer grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis a partition is cut along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum SplitAxis {
    /// Cut by a vertical line at some x (children are left and right)
    Vertical,
    /// Cut by a horizontal line at some y (children are bottom and top)
    Horizontal,
}

/// Edge of a room a corridor can leave from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// North and South edges run along x; corridors leaving them run along y
    pub const fn is_north_south(self) -> bool {
        matches!(self, Direction::North | Direction::South)
    }
}

/// A half-open rectangle `[min, max)` of grid cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    /// Create a new rectangle from its bottom-left cell and the corner one past its top-right cell
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min: Point::new(min_x, min_y),
            max: Point::new(max_x, max_y),
        }
    }

    pub fn from_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub fn width(&self) -> i32 {
        (self.max.x - self.min.x).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.max.y - self.min.y).max(0)
    }

    pub fn area(&self) -> i32 {
        self.width() * self.height()
    }

    /// Check if the rectangle covers at least one cell
    pub fn is_valid(&self) -> bool {
        self.max.x > self.min.x && self.max.y > self.min.y
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    /// Check if this rectangle contains another
    pub fn contains(&self, other: &Rect) -> bool {
        self.min.x <= other.min.x
            && self.max.x >= other.max.x
            && self.min.y <= other.min.y
            && self.max.y >= other.max.y
    }

    /// Check if this rectangle shares at least one cell with another
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::new(
            self.min.x.min(other.min.x),
            self.min.y.min(other.min.y),
            self.max.x.max(other.max.x),
            self.max.y.max(other.max.y),
        )
    }

    /// Geometric center (may fall on a cell boundary)
    pub fn center(&self) -> (f32, f32) {
        (
            (self.min.x + self.max.x) as f32 / 2.0,
            (self.min.y + self.max.y) as f32 / 2.0,
        )
    }

    /// Iterate every cell, column by column
    pub fn cells(self) -> impl Iterator<Item = Point> {
        let (y0, y1) = (self.min.y, self.max.y);
        (self.min.x..self.max.x).flat_map(move |x| (y0..y1).map(move |y| Point::new(x, y)))
    }
}

/// Overlap of the half-open spans `[a0, a1)` and `[b0, b1)`, if non-empty
pub fn span_overlap(a0: i32, a1: i32, b0: i32, b1: i32) -> Option<(i32, i32)> {
    let lo = a0.max(b0);
    let hi = a1.min(b1);
    (hi > lo).then_some((lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_dimensions() {
        let r = Rect::new(10, 20, 16, 26);
        assert_eq!(r.width(), 6);
        assert_eq!(r.height(), 6);
        assert_eq!(r.area(), 36);
        assert_eq!(r.cells().count(), 36);
    }

    #[test]
    fn test_rect_contains() {
        let outer = Rect::new(0, 0, 20, 20);
        let inner = Rect::new(5, 5, 10, 10);
        let outside = Rect::new(25, 25, 30, 30);

        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(!outer.contains(&outside));
        assert!(outer.contains_point(Point::new(19, 0)));
        assert!(!outer.contains_point(Point::new(20, 0)));
    }

    #[test]
    fn test_rect_intersects_half_open() {
        let r1 = Rect::new(0, 0, 10, 10);
        let touching = Rect::new(10, 0, 20, 10);
        let r2 = Rect::new(5, 5, 15, 15);

        assert!(r1.intersects(&r2));
        assert!(!r1.intersects(&touching));
        assert_eq!(r1.union(&touching), Rect::new(0, 0, 20, 10));
    }

    #[test]
    fn test_span_overlap() {
        assert_eq!(span_overlap(0, 10, 5, 20), Some((5, 10)));
        assert_eq!(span_overlap(0, 5, 5, 10), None);
    }

    #[test]
    fn test_direction_opposites() {
        assert_eq!(Direction::North.opposite(), Direction::South);
        assert_eq!(Direction::West.opposite(), Direction::East);
        assert!(Direction::South.is_north_south());
        assert!(!Direction::East.is_north_south());
    }
}
