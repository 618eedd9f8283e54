//! Wall topology
//!
//! Reads a finished grid and reports where wall geometry belongs: one segment
//! on every cell edge between walkable and solid space, and a corner on every
//! lattice vertex where the walkable area turns.
//!
//! Coordinates are on the vertex lattice: vertex `(x, y)` is the bottom-left
//! corner of cell `(x, y)`, so a `w × l` grid has vertices `[0, w] × [0, l]`.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::rect::{Direction, Point};
use super::Grid;

bitflags! {
    /// Walkable cells around a lattice vertex
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Neighbors: u8 {
        const BOTTOM_LEFT = 0x01;
        const BOTTOM_RIGHT = 0x02;
        const TOP_LEFT = 0x04;
        const TOP_RIGHT = 0x08;
    }
}

impl Neighbors {
    /// Sample the four cells that share vertex `(x, y)`
    pub fn around(grid: &Grid, x: i32, y: i32) -> Self {
        let mut n = Neighbors::empty();
        n.set(Neighbors::BOTTOM_LEFT, grid.is_walkable(x - 1, y - 1));
        n.set(Neighbors::BOTTOM_RIGHT, grid.is_walkable(x, y - 1));
        n.set(Neighbors::TOP_LEFT, grid.is_walkable(x - 1, y));
        n.set(Neighbors::TOP_RIGHT, grid.is_walkable(x, y));
        n
    }
}

/// How the walkable area turns at a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter)]
pub enum CornerKind {
    /// One walkable cell: the outside of a room corner
    Convex,
    /// Three walkable cells: an inside corner
    Concave,
    /// Two diagonally opposite walkable cells
    Saddle,
}

impl CornerKind {
    pub fn classify(n: Neighbors) -> Option<CornerKind> {
        match n.bits().count_ones() {
            1 => Some(CornerKind::Convex),
            3 => Some(CornerKind::Concave),
            2 if n == Neighbors::BOTTOM_LEFT | Neighbors::TOP_RIGHT
                || n == Neighbors::BOTTOM_RIGHT | Neighbors::TOP_LEFT =>
            {
                Some(CornerKind::Saddle)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
pub enum WallOrientation {
    /// From vertex `(x, y)` to `(x + 1, y)`
    Horizontal,
    /// From vertex `(x, y)` to `(x, y + 1)`
    Vertical,
}

/// One unit of wall between a walkable cell and solid space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WallSegment {
    pub orientation: WallOrientation,
    pub y: i32,
    pub x: i32,
    /// Side of the walkable cell the wall is on
    pub side: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Corner {
    pub vertex: Point,
    pub kind: CornerKind,
    pub neighbors: Neighbors,
}

/// Wall segments and corners of a grid, in deterministic order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WallLayout {
    pub segments: Vec<WallSegment>,
    pub corners: Vec<Corner>,
}

impl WallLayout {
    pub fn analyze(grid: &Grid) -> Self {
        let mut segments = Vec::new();
        for (p, cell) in grid.cells() {
            if !cell.is_walkable() {
                continue;
            }
            let (x, y) = (p.x, p.y);
            let edges = [
                (x, y + 1, Direction::North, WallOrientation::Horizontal, Point::new(x, y + 1)),
                (x, y - 1, Direction::South, WallOrientation::Horizontal, Point::new(x, y)),
                (x + 1, y, Direction::East, WallOrientation::Vertical, Point::new(x + 1, y)),
                (x - 1, y, Direction::West, WallOrientation::Vertical, Point::new(x, y)),
            ];
            for (nx, ny, side, orientation, at) in edges {
                if !grid.is_walkable(nx, ny) {
                    segments.push(WallSegment {
                        orientation,
                        y: at.y,
                        x: at.x,
                        side,
                    });
                }
            }
        }
        segments.sort_unstable();

        let mut corners = Vec::new();
        for y in 0..=grid.length() {
            for x in 0..=grid.width() {
                let neighbors = Neighbors::around(grid, x, y);
                if let Some(kind) = CornerKind::classify(neighbors) {
                    corners.push(Corner {
                        vertex: Point::new(x, y),
                        kind,
                        neighbors,
                    });
                }
            }
        }

        log::debug!("wall layout: {} segments, {} corners", segments.len(), corners.len());
        Self { segments, corners }
    }

    /// Every corner vertex, where a pillar hides the joint between wall pieces
    pub fn pillars(&self) -> impl Iterator<Item = Point> + '_ {
        self.corners.iter().map(|c| c.vertex)
    }

    pub fn count(&self, kind: CornerKind) -> usize {
        self.corners.iter().filter(|c| c.kind == kind).count()
    }
}
