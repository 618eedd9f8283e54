//! Room shapes
//!
//! Rooms start as rectangles. A shape turns some of a room's Floor cells back
//! into Empty to give it an L, T, U, cross, circular or notched footprint. The
//! catalog is closed: every shape is a variant of [`RoomShape`] and carries
//! its own size predicate and carving rule.

use strum::{Display, EnumIter, IntoEnumIterator};

use crate::config::RoomShapeConfig;
use crate::rng::DungeonRng;

use super::rect::{Point, Rect};
use super::{CellKind, Grid, Room, RoomId};

/// Shapes need at least this many cells on both sides (U, cross, circular)
const LARGE_SHAPE_MIN: i32 = 8;

/// Circular rooms tolerate this much difference between width and height
const CIRCULAR_MAX_ASPECT_DIFF: i32 = 4;

/// Cross cuts are scaled down to keep the middle connected
const CROSS_CUT_SCALE: f32 = 0.7;

/// Footprint of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter)]
pub enum RoomShape {
    #[default]
    Rectangle,
    LShape,
    TShape,
    UShape,
    Cross,
    Circular,
    WithRecesses,
}

/// Cells removed from one room by its shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeCarve {
    pub room: RoomId,
    pub shape: RoomShape,
    pub removed: Vec<Point>,
}

impl RoomShape {
    /// Check if a `width × height` room is large enough for this shape
    pub fn can_apply(self, width: i32, height: i32, config: &RoomShapeConfig) -> bool {
        let min = config.min_size_for_shapes as i32;
        match self {
            RoomShape::Rectangle => true,
            _ if width < min || height < min => false,
            RoomShape::LShape | RoomShape::TShape | RoomShape::WithRecesses => true,
            RoomShape::UShape | RoomShape::Cross => width >= LARGE_SHAPE_MIN && height >= LARGE_SHAPE_MIN,
            RoomShape::Circular => {
                width >= LARGE_SHAPE_MIN
                    && height >= LARGE_SHAPE_MIN
                    && (width - height).abs() <= CIRCULAR_MAX_ASPECT_DIFF
            }
        }
    }

    /// Carve this shape out of `room`'s current bounds
    pub fn apply(self, room: &Room, grid: &mut Grid, config: &RoomShapeConfig, rng: &mut DungeonRng) -> ShapeCarve {
        let mut carver = Carver {
            grid,
            room: room.id,
            removed: Vec::new(),
        };
        let b = room.bounds;
        match self {
            RoomShape::Rectangle => {}
            RoomShape::LShape => carve_l(&mut carver, &b, config, rng),
            RoomShape::TShape => carve_t(&mut carver, &b, config, rng),
            RoomShape::UShape => carve_u(&mut carver, &b, rng),
            RoomShape::Cross => carve_cross(&mut carver, &b, config, rng),
            RoomShape::Circular => carve_circle(&mut carver, &b, rng),
            RoomShape::WithRecesses => carve_recesses(&mut carver, &b, config, rng),
        }
        ShapeCarve {
            room: room.id,
            shape: self,
            removed: carver.removed,
        }
    }

    /// Weighted draw among the shapes that fit a `width × height` room
    ///
    /// Returns `Rectangle` without drawing when no other shape fits.
    pub fn select(width: i32, height: i32, config: &RoomShapeConfig, rng: &mut DungeonRng) -> RoomShape {
        let candidates: Vec<(RoomShape, f32)> = RoomShape::iter()
            .filter(|s| s.can_apply(width, height, config))
            .map(|s| (s, config.weight(s)))
            .filter(|(_, w)| *w > 0.0)
            .collect();

        if !candidates.iter().any(|(s, _)| *s != RoomShape::Rectangle) {
            return RoomShape::Rectangle;
        }

        let total: f32 = candidates.iter().map(|(_, w)| w).sum();
        let roll = rng.range_f32(0.0, total);
        let mut cumulative = 0.0;
        for (shape, weight) in &candidates {
            cumulative += weight;
            if roll < cumulative {
                return *shape;
            }
        }
        candidates.last().map_or(RoomShape::Rectangle, |(s, _)| *s)
    }
}

/// Reshape every room, recording the chosen shape on the room
pub fn apply_shapes(rooms: &mut [Room], grid: &mut Grid, config: &RoomShapeConfig, rng: &mut DungeonRng) -> Vec<ShapeCarve> {
    let mut carves = Vec::with_capacity(rooms.len());
    for room in rooms.iter_mut() {
        let shape = RoomShape::select(room.width(), room.height(), config, rng);
        room.shape = shape;
        carves.push(shape.apply(room, grid, config, rng));
    }
    log::debug!(
        "reshaped {} of {} rooms",
        carves.iter().filter(|c| c.shape != RoomShape::Rectangle).count(),
        rooms.len()
    );
    carves
}

/// Recompute room bounds from the grid; returns rooms left without floor
pub fn recompute_room_bounds(rooms: &mut [Room], grid: &Grid) -> Vec<RoomId> {
    let mut degenerate = Vec::new();
    for room in rooms.iter_mut() {
        if !room.recompute_bounds(grid) {
            log::warn!("room {} lost all of its floor to its {} shape; keeping stale bounds", room.id.0, room.shape);
            degenerate.push(room.id);
        }
    }
    degenerate
}

struct Carver<'a> {
    grid: &'a mut Grid,
    room: RoomId,
    removed: Vec<Point>,
}

impl Carver<'_> {
    /// Turn this room's Floor cells in `[x1, x2) × [y1, y2)` into Empty
    fn remove(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        for x in x1..x2 {
            for y in y1..y2 {
                self.remove_cell(x, y);
            }
        }
    }

    fn remove_cell(&mut self, x: i32, y: i32) {
        if self.grid.get(x, y).is_some_and(|c| c.is_floor_of(self.room)) {
            self.grid.set(x, y, CellKind::Empty, None);
            self.removed.push(Point::new(x, y));
        }
    }
}

fn cutout(side: i32, min: f32, max: f32, rng: &mut DungeonRng) -> i32 {
    (side as f32 * rng.range_f32(min, max)).round() as i32
}

fn carve_l(c: &mut Carver<'_>, b: &Rect, config: &RoomShapeConfig, rng: &mut DungeonRng) {
    let corner = rng.range(0, 4);
    let cut_w = cutout(b.width(), config.cutout_min_size, config.cutout_max_size, rng);
    let cut_h = cutout(b.height(), config.cutout_min_size, config.cutout_max_size, rng);
    carve_corner(c, b, corner, cut_w, cut_h);
}

/// Remove a `cut_w × cut_h` block from corner 0 = BL, 1 = BR, 2 = TL, 3 = TR
fn carve_corner(c: &mut Carver<'_>, b: &Rect, corner: i32, cut_w: i32, cut_h: i32) {
    match corner {
        0 => c.remove(b.min.x, b.min.y, b.min.x + cut_w, b.min.y + cut_h),
        1 => c.remove(b.max.x - cut_w, b.min.y, b.max.x, b.min.y + cut_h),
        2 => c.remove(b.min.x, b.max.y - cut_h, b.min.x + cut_w, b.max.y),
        _ => c.remove(b.max.x - cut_w, b.max.y - cut_h, b.max.x, b.max.y),
    }
}

fn carve_t(c: &mut Carver<'_>, b: &Rect, config: &RoomShapeConfig, rng: &mut DungeonRng) {
    let (w, h) = (b.width(), b.height());
    let horizontal = rng.coin();
    let cut = cutout(if horizontal { h } else { w }, config.cutout_min_size, config.cutout_max_size, rng);
    let first_side = rng.coin();

    if horizontal {
        let third = w / 3;
        let (y1, y2) = if first_side {
            (b.max.y - cut, b.max.y)
        } else {
            (b.min.y, b.min.y + cut)
        };
        c.remove(b.min.x, y1, b.min.x + third, y2);
        c.remove(b.max.x - third, y1, b.max.x, y2);
    } else {
        let third = h / 3;
        let (x1, x2) = if first_side {
            (b.min.x, b.min.x + cut)
        } else {
            (b.max.x - cut, b.max.x)
        };
        c.remove(x1, b.min.y, x2, b.min.y + third);
        c.remove(x1, b.max.y - third, x2, b.max.y);
    }
}

fn carve_u(c: &mut Carver<'_>, b: &Rect, rng: &mut DungeonRng) {
    let (w, h) = (b.width(), b.height());
    let side = rng.range(0, 4);
    let cut_w = cutout(w, 0.3, 0.5, rng);
    let cut_h = cutout(h, 0.3, 0.5, rng);

    match side {
        0 => c.remove(b.min.x + w / 4, b.max.y - cut_h, b.max.x - w / 4, b.max.y),
        1 => c.remove(b.min.x + w / 4, b.min.y, b.max.x - w / 4, b.min.y + cut_h),
        2 => c.remove(b.min.x, b.min.y + h / 4, b.min.x + cut_w, b.max.y - h / 4),
        _ => c.remove(b.max.x - cut_w, b.min.y + h / 4, b.max.x, b.max.y - h / 4),
    }
}

fn carve_cross(c: &mut Carver<'_>, b: &Rect, config: &RoomShapeConfig, rng: &mut DungeonRng) {
    let min = config.cutout_min_size * CROSS_CUT_SCALE;
    let max = config.cutout_max_size * CROSS_CUT_SCALE;
    let cut_w = cutout(b.width(), min, max, rng);
    let cut_h = cutout(b.height(), min, max, rng);
    for corner in 0..4 {
        carve_corner(c, b, corner, cut_w, cut_h);
    }
}

fn carve_circle(c: &mut Carver<'_>, b: &Rect, rng: &mut DungeonRng) {
    let (cx, cy) = b.center();
    let radius = b.width().min(b.height()) as f32 / 2.0 * rng.range_f32(0.85, 0.95);

    for x in b.min.x..b.max.x {
        for y in b.min.y..b.max.y {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            if (dx * dx + dy * dy).sqrt() > radius {
                c.remove_cell(x, y);
            }
        }
    }
}

fn carve_recesses(c: &mut Carver<'_>, b: &Rect, config: &RoomShapeConfig, rng: &mut DungeonRng) {
    let (w, h) = (b.width(), b.height());
    for _ in 0..config.recess_count {
        let side = rng.range(0, 4);
        let depth = rng.range(2, 4);
        let along = if side < 2 { w } else { h };
        let length = rng.range(3, (along / 3).max(4));

        match side {
            0 | 1 => {
                let start = rng.range(b.min.x + 2, (b.min.x + 3).max(b.max.x - length - 2));
                if side == 0 {
                    c.remove(start, b.min.y, start + length, b.min.y + depth);
                } else {
                    c.remove(start, b.max.y - depth, start + length, b.max.y);
                }
            }
            _ => {
                let start = rng.range(b.min.y + 2, (b.min.y + 3).max(b.max.y - length - 2));
                if side == 2 {
                    c.remove(b.min.x, start, b.min.x + depth, start + length);
                } else {
                    c.remove(b.max.x - depth, start, b.max.x, start + length);
                }
            }
        }
    }
}
