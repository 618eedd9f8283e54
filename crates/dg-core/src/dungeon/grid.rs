//! Dungeon grid
//!
//! A dense `width × length` store of [`Cell`]s. Lookups outside the grid
//! return `None`, which every later pass treats as solid rock; that lets wall
//! and corner scans run off the edge of the map without their own bounds
//! checks.

use super::rect::{Point, Rect};
use super::{Cell, CellKind, RoomId};

/// The shared mutable layout every pipeline stage writes into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    length: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid with every cell Empty
    ///
    /// Sides beyond `i32::MAX` are clamped; parameter validation rejects them
    /// before a grid is ever built.
    pub fn new(width: u32, length: u32) -> Self {
        let size = width as usize * length as usize;
        Self {
            width: i32::try_from(width).unwrap_or(i32::MAX),
            length: i32::try_from(length).unwrap_or(i32::MAX),
            cells: vec![Cell::empty(); size],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn length(&self) -> i32 {
        self.length
    }

    /// Whole-grid rectangle
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.length)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.length {
            return None;
        }
        Some((y * self.width + x) as usize)
    }

    /// Cell at `(x, y)`, or `None` outside the grid
    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn get_point(&self, p: Point) -> Option<&Cell> {
        self.get(p.x, p.y)
    }

    /// Cell type at `(x, y)`; outside the grid this is `None`
    pub fn kind_at(&self, x: i32, y: i32) -> Option<CellKind> {
        self.get(x, y).map(|c| c.kind)
    }

    /// Walkable check that treats absent cells as solid
    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(Cell::is_walkable)
    }

    /// Write a cell type
    ///
    /// Floor always wins: a request to turn Floor into Wall or Corridor is
    /// ignored, as is any write outside the grid. The owning room is kept
    /// only for Floor. Returns whether the cell was written.
    pub fn set(&mut self, x: i32, y: i32, kind: CellKind, room: Option<RoomId>) -> bool {
        let Some(i) = self.index(x, y) else {
            return false;
        };
        let cell = &mut self.cells[i];
        if cell.kind == CellKind::Floor && matches!(kind, CellKind::Wall | CellKind::Corridor) {
            return false;
        }
        cell.kind = kind;
        cell.room = if kind == CellKind::Floor { room } else { None };
        true
    }

    /// Mark a cell as claimed by a decoration
    pub fn set_occupied(&mut self, x: i32, y: i32, occupied: bool) {
        if let Some(i) = self.index(x, y) {
            self.cells[i].occupied = occupied;
        }
    }

    /// All cells in row-major order (y outer, x inner)
    pub fn cells(&self) -> impl Iterator<Item = (Point, &Cell)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (Point::new(i as i32 % width, i as i32 / width), cell))
    }

    /// Number of cells of the given type
    pub fn count(&self, kind: CellKind) -> usize {
        self.cells.iter().filter(|c| c.kind == kind).count()
    }

    /// Floor cells owned by `room` inside `area`
    pub fn floor_cells_of(&self, room: RoomId, area: &Rect) -> Vec<Point> {
        area.cells()
            .filter(|p| self.get_point(*p).is_some_and(|c| c.is_floor_of(room)))
            .collect()
    }

    /// One character per cell, top row first
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(((self.width + 1) * self.length) as usize);
        for y in (0..self.length).rev() {
            for x in 0..self.width {
                out.push(self.cells[(y * self.width + x) as usize].kind.symbol());
            }
            out.push('\n');
        }
        out
    }
}
