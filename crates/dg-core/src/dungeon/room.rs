//! Rooms and room placement
//!
//! Each partition leaf gets exactly one room: an inset rectangle whose corners
//! are drawn between the leaf edge (plus a fixed offset) and the corner
//! modifiers, then clamped back up to the minimum room size.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::config::DungeonParams;
use crate::rng::DungeonRng;

use super::bsp::{NodeId, PartitionTree};
use super::rect::{Point, Rect};
use super::{CellKind, Grid, RoomShape};

/// Index of a room in the dungeon's room list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct RoomId(pub usize);

/// Gameplay role of a room, filled in by an external pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum RoomType {
    Start,
    Normal,
    Boss,
}

/// A room carved out of one partition leaf
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: RoomId,
    /// Leaf this room was placed in
    pub leaf: NodeId,
    /// Bounds of that leaf
    pub partition: Rect,
    /// Tight bounds of the room's floor
    pub bounds: Rect,
    pub shape: RoomShape,
    pub room_type: Option<RoomType>,
    /// Decorative prefab chosen by an external pass
    pub prefab: Option<String>,
}

impl Room {
    pub fn new(id: RoomId, leaf: NodeId, partition: Rect, bounds: Rect) -> Self {
        Self {
            id,
            leaf,
            partition,
            bounds,
            shape: RoomShape::Rectangle,
            room_type: None,
            prefab: None,
        }
    }

    pub fn width(&self) -> i32 {
        self.bounds.width()
    }

    pub fn height(&self) -> i32 {
        self.bounds.height()
    }

    /// Center cell of the bounds
    pub fn center(&self) -> Point {
        Point::new(
            self.bounds.min.x + self.width() / 2,
            self.bounds.min.y + self.height() / 2,
        )
    }

    /// Shrink the bounds to the Floor cells this room still owns
    ///
    /// Returns `false` and leaves the bounds untouched when no Floor cell is
    /// left.
    pub fn recompute_bounds(&mut self, grid: &Grid) -> bool {
        let cells = grid.floor_cells_of(self.id, &self.bounds);
        let Some(first) = cells.first() else {
            return false;
        };
        let (mut min, mut max) = (*first, *first);
        for p in &cells {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        self.bounds = Rect::new(min.x, min.y, max.x + 1, max.y + 1);
        true
    }
}

/// Place one room in every leaf and write it to the grid
pub fn generate_rooms(
    tree: &PartitionTree,
    params: &DungeonParams,
    grid: &mut Grid,
    rng: &mut DungeonRng,
) -> Vec<Room> {
    let rooms: Vec<Room> = tree
        .leaves()
        .into_iter()
        .enumerate()
        .map(|(i, leaf)| {
            let partition = tree.node(leaf).bounds;
            let bounds = place_room(&partition, params, rng);
            Room::new(RoomId(i), leaf, partition, bounds)
        })
        .collect();

    for room in &rooms {
        carve_room(room, grid);
    }

    log::debug!("placed {} rooms", rooms.len());
    rooms
}

/// Draw the inset rectangle for one leaf
pub fn place_room(leaf: &Rect, params: &DungeonParams, rng: &mut DungeonRng) -> Rect {
    let offset = params.room_offset as i32;
    let bottom = params.room_bottom_corner_modifier;
    let top = params.room_top_corner_modifier;

    let (min_x, max_x) = (leaf.min.x + offset, leaf.max.x - offset);
    let (min_y, max_y) = (leaf.min.y + offset, leaf.max.y - offset);

    let bl_x = rng.range(min_x, fraction(min_x, max_x, bottom));
    let bl_y = rng.range(min_y, fraction(min_y, max_y, bottom));
    let tr_x = rng.range(fraction(min_x, max_x, top), max_x);
    let tr_y = rng.range(fraction(min_y, max_y, top), max_y);

    let (x0, x1) = clamp_span(bl_x, tr_x, params.room_width_min as i32, leaf.min.x, leaf.max.x);
    let (y0, y1) = clamp_span(bl_y, tr_y, params.room_length_min as i32, leaf.min.y, leaf.max.y);
    Rect::new(x0, y0, x1, y1)
}

/// `lo + (hi - lo) * t`, truncated
fn fraction(lo: i32, hi: i32, t: f32) -> i32 {
    lo + ((hi - lo) as f32 * t) as i32
}

/// Grow `[lo, hi)` to at least `min_len` without leaving `[bound_lo, bound_hi)`
fn clamp_span(lo: i32, hi: i32, min_len: i32, bound_lo: i32, bound_hi: i32) -> (i32, i32) {
    let min_len = min_len.min(bound_hi - bound_lo);
    let mut lo = lo.clamp(bound_lo, bound_hi);
    let mut hi = hi.clamp(lo, bound_hi);
    if hi - lo < min_len {
        hi = (lo + min_len).min(bound_hi);
    }
    if hi - lo < min_len {
        lo = (hi - min_len).max(bound_lo);
    }
    (lo, hi)
}

/// Write a room's floor and the wall ring around it (corners left out, never over Floor)
pub fn carve_room(room: &Room, grid: &mut Grid) {
    let b = room.bounds;
    for p in b.cells() {
        grid.set(p.x, p.y, CellKind::Floor, Some(room.id));
    }

    for x in b.min.x..b.max.x {
        grid.set(x, b.min.y - 1, CellKind::Wall, None);
        grid.set(x, b.max.y, CellKind::Wall, None);
    }
    for y in b.min.y..b.max.y {
        grid.set(b.min.x - 1, y, CellKind::Wall, None);
        grid.set(b.max.x, y, CellKind::Wall, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_b_params() -> DungeonParams {
        DungeonParams {
            room_width_min: 10,
            room_length_min: 10,
            room_bottom_corner_modifier: 0.1,
            room_top_corner_modifier: 0.9,
            room_offset: 1,
            ..DungeonParams::default()
        }
    }

    #[test]
    fn test_single_leaf_room_size() {
        let params = scenario_b_params();
        let leaf = Rect::new(0, 0, 20, 20);
        for seed in 0..200 {
            let mut rng = DungeonRng::new(seed);
            let room = place_room(&leaf, &params, &mut rng);
            assert!((10..=18).contains(&room.width()), "seed {seed}: {room:?}");
            assert!((10..=18).contains(&room.height()), "seed {seed}: {room:?}");
            assert!(leaf.contains(&room));
        }
    }

    #[test]
    fn test_clamp_to_minimum() {
        let params = DungeonParams {
            room_width_min: 12,
            room_length_min: 12,
            room_bottom_corner_modifier: 0.3,
            room_top_corner_modifier: 0.7,
            room_offset: 2,
            ..DungeonParams::default()
        };
        let leaf = Rect::new(40, 10, 60, 30);
        for seed in 0..100 {
            let mut rng = DungeonRng::new(seed);
            let room = place_room(&leaf, &params, &mut rng);
            assert!(room.width() >= 12 && room.height() >= 12, "{room:?}");
            assert!(leaf.contains(&room));
        }
    }

    #[test]
    fn test_clamp_span_never_leaves_bounds() {
        assert_eq!(clamp_span(5, 7, 10, 0, 20), (5, 15));
        assert_eq!(clamp_span(15, 17, 10, 0, 20), (10, 20));
        assert_eq!(clamp_span(2, 4, 10, 0, 6), (0, 6));
    }

    #[test]
    fn test_carve_room_walls_skip_corners() {
        let mut grid = Grid::new(10, 10);
        let room = Room::new(RoomId(0), NodeId(0), grid.bounds(), Rect::new(2, 2, 6, 5));
        carve_room(&room, &mut grid);

        assert_eq!(grid.count(CellKind::Floor), 12);
        assert_eq!(grid.count(CellKind::Wall), 2 * 4 + 2 * 3);
        assert_eq!(grid.kind_at(1, 1), Some(CellKind::Empty));
        assert_eq!(grid.kind_at(6, 5), Some(CellKind::Empty));
        assert_eq!(grid.kind_at(1, 3), Some(CellKind::Wall));
        assert_eq!(grid.get(3, 3).unwrap().room, Some(RoomId(0)));
    }

    #[test]
    fn test_generate_rooms_stay_in_leaves() {
        let params = DungeonParams::with_seed(42);
        let mut rng = DungeonRng::new(42);
        let tree = PartitionTree::build(100, 100, 10, 10, 10, &mut rng);
        let mut grid = Grid::new(100, 100);
        let rooms = generate_rooms(&tree, &params, &mut grid, &mut rng);

        assert_eq!(rooms.len(), tree.leaves().len());
        for room in &rooms {
            assert!(room.partition.contains(&room.bounds));
            assert_eq!(grid.floor_cells_of(room.id, &room.bounds).len() as i32, room.bounds.area());
        }
    }

    #[test]
    fn test_recompute_bounds() {
        let mut grid = Grid::new(20, 20);
        let mut room = Room::new(RoomId(0), NodeId(0), grid.bounds(), Rect::new(2, 2, 10, 10));
        carve_room(&room, &mut grid);
        for p in Rect::new(2, 2, 10, 4).cells() {
            grid.set(p.x, p.y, CellKind::Empty, None);
        }
        assert!(room.recompute_bounds(&grid));
        assert_eq!(room.bounds, Rect::new(2, 4, 10, 10));

        for p in room.bounds.cells() {
            grid.set(p.x, p.y, CellKind::Empty, None);
        }
        assert!(!room.recompute_bounds(&grid));
        assert_eq!(room.bounds, Rect::new(2, 4, 10, 10));
    }
}
