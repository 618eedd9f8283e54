//! Corridor routing
//!
//! Every internal partition node joins its two subtrees with one corridor.
//! Two routers share the segment model and the rasterizer:
//!
//! - connection points: pick the closest pair of facing floor runs between
//!   any room on the left and any room on the right, then join them with a
//!   straight run or an L with one turn
//! - bounding boxes: bridge the gap between the two children across the cut,
//!   preferring a pair of rooms that face each other
//!
//! Routing only reads the grid. [`rasterize`] writes the corridors and their
//! flanking walls afterwards.

use std::collections::VecDeque;

use crate::config::CorridorStrategy;

use super::bsp::{NodeId, PartitionNode, PartitionTree};
use super::connection::{self, ConnectionPoint};
use super::rect::{span_overlap, Point, Rect, SplitAxis};
use super::{CellKind, Grid, Room, RoomId};

/// An axis-aligned corridor piece; both corners are inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorridorSegment {
    pub start: Point,
    pub end: Point,
    /// Runs along x when true, along y otherwise
    pub is_horizontal: bool,
}

impl CorridorSegment {
    /// A run along x from `x0` to `x1` (either order), `width` rows centered on `center_y`
    pub fn horizontal(x0: i32, x1: i32, center_y: i32, width: i32) -> Self {
        let y = center_y - width / 2;
        Self {
            start: Point::new(x0.min(x1), y),
            end: Point::new(x0.max(x1), y + width - 1),
            is_horizontal: true,
        }
    }

    /// A run along y from `y0` to `y1` (either order), `width` columns centered on `center_x`
    pub fn vertical(y0: i32, y1: i32, center_x: i32, width: i32) -> Self {
        let x = center_x - width / 2;
        Self {
            start: Point::new(x, y0.min(y1)),
            end: Point::new(x + width - 1, y0.max(y1)),
            is_horizontal: false,
        }
    }

    /// The cells covered, as a half-open rectangle
    pub fn rect(&self) -> Rect {
        Rect::new(self.start.x, self.start.y, self.end.x + 1, self.end.y + 1)
    }

    /// Cells across the direction of travel
    pub fn cross_section(&self) -> i32 {
        if self.is_horizontal {
            self.end.y - self.start.y + 1
        } else {
            self.end.x - self.start.x + 1
        }
    }

    /// Cells along the direction of travel
    pub fn length(&self) -> i32 {
        if self.is_horizontal {
            self.end.x - self.start.x + 1
        } else {
            self.end.y - self.start.y + 1
        }
    }
}

/// One corridor joining two rooms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorridorPath {
    pub from_room: RoomId,
    pub to_room: RoomId,
    pub segments: Vec<CorridorSegment>,
    /// Two perpendicular segments instead of one straight one
    pub is_bent: bool,
    /// The floor runs the path was routed between (connection-point mode only)
    pub endpoints: Option<(ConnectionPoint, ConnectionPoint)>,
}

/// An internal node whose subtrees could not be joined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailedConnection {
    pub node: NodeId,
    pub depth: u32,
    pub bounds: Rect,
}

/// Output of a routing pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorridorPlan {
    pub paths: Vec<CorridorPath>,
    pub failed: Vec<FailedConnection>,
}

/// Cells changed by [`rasterize`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RasterStats {
    pub corridor_cells: usize,
    pub wall_cells: usize,
}

/// Route one corridor per internal node with the chosen strategy
pub fn route_corridors(
    tree: &PartitionTree,
    rooms: &[Room],
    grid: &Grid,
    strategy: CorridorStrategy,
    width: i32,
) -> CorridorPlan {
    let plan = match strategy {
        CorridorStrategy::ConnectionPoints => route_connection_points(tree, rooms, grid, width),
        CorridorStrategy::BoundingBox => route_bounding_boxes(tree, rooms, grid, width),
    };
    log::debug!(
        "routed {} corridors ({} bent), {} failed",
        plan.paths.len(),
        plan.paths.iter().filter(|p| p.is_bent).count(),
        plan.failed.len()
    );
    plan
}

/// Join every pair of sibling subtrees through their rooms' connection points
pub fn route_connection_points(tree: &PartitionTree, rooms: &[Room], grid: &Grid, width: i32) -> CorridorPlan {
    let points = connection::analyze_rooms(rooms, grid);
    let by_leaf = rooms_by_leaf(tree, rooms);
    let mut plan = CorridorPlan::default();

    for node in tree.internal_nodes() {
        let (left, right) = child_rooms(tree, node, &by_leaf);
        match connect_rooms(&left, &right, &points, width) {
            Some(path) => plan.paths.push(path),
            None => fail(&mut plan, node),
        }
    }
    plan
}

/// Closest usable connection between any room in `left` and any in `right`
///
/// Every room pair offers its best facing pair, and the pair with the
/// shortest distance between points wins. Perpendicular pairs are only
/// considered when no room pair across the split has a facing pair.
pub fn connect_rooms(
    left: &[RoomId],
    right: &[RoomId],
    points: &[Vec<ConnectionPoint>],
    width: i32,
) -> Option<CorridorPath> {
    let (p1, p2) = closest_pair(left, right, points, connection::find_best_pair)
        .or_else(|| closest_pair(left, right, points, connection::find_best_bend_pair))?;
    Some(path_between(p1, p2, width))
}

fn closest_pair(
    left: &[RoomId],
    right: &[RoomId],
    points: &[Vec<ConnectionPoint>],
    best_of: impl for<'a> Fn(&'a [ConnectionPoint], &'a [ConnectionPoint]) -> Option<(&'a ConnectionPoint, &'a ConnectionPoint)>,
) -> Option<(ConnectionPoint, ConnectionPoint)> {
    let mut best = None;
    let mut best_distance = f32::MAX;

    for r1 in left {
        for r2 in right {
            let (Some(a), Some(b)) = (points.get(r1.0), points.get(r2.0)) else {
                continue;
            };
            let Some((p1, p2)) = best_of(a, b) else {
                continue;
            };
            let distance = p1.position.distance(&p2.position);
            if distance < best_distance {
                best_distance = distance;
                best = Some((*p1, *p2));
            }
        }
    }
    best
}

/// Straight path when the points line up within `width`, an L otherwise
pub fn path_between(p1: ConnectionPoint, p2: ConnectionPoint, width: i32) -> CorridorPath {
    let is_bent = !are_aligned(&p1, &p2, width);
    let segments = if is_bent {
        bent_path(&p1, &p2, width)
    } else {
        vec![straight_path(&p1, &p2, width)]
    };
    CorridorPath {
        from_room: p1.room,
        to_room: p2.room,
        segments,
        is_bent,
        endpoints: Some((p1, p2)),
    }
}

fn are_aligned(p1: &ConnectionPoint, p2: &ConnectionPoint, width: i32) -> bool {
    if p2.direction != p1.direction.opposite() {
        return false;
    }
    if p1.direction.is_north_south() {
        (p1.position.x - p2.position.x).abs() <= width
    } else {
        (p1.position.y - p2.position.y).abs() <= width
    }
}

fn straight_path(p1: &ConnectionPoint, p2: &ConnectionPoint, width: i32) -> CorridorSegment {
    let (a, b) = (p1.position, p2.position);
    if p1.direction.is_north_south() {
        CorridorSegment::vertical(a.y, b.y, (a.x + b.x) / 2, width)
    } else {
        CorridorSegment::horizontal(a.x, b.x, (a.y + b.y) / 2, width)
    }
}

/// First leg leaves `p1` along its own axis; the second is perpendicular
fn bent_path(p1: &ConnectionPoint, p2: &ConnectionPoint, width: i32) -> Vec<CorridorSegment> {
    let (a, b) = (p1.position, p2.position);
    let corner = p1.corner_with(p2);
    if p1.direction.is_north_south() {
        vec![
            CorridorSegment::vertical(a.y, corner.y, a.x, width),
            CorridorSegment::horizontal(corner.x, b.x, corner.y, width),
        ]
    } else {
        vec![
            CorridorSegment::horizontal(a.x, corner.x, a.y, width),
            CorridorSegment::vertical(corner.y, b.y, corner.x, width),
        ]
    }
}

/// Bridge every pair of sibling subtrees across their cut
pub fn route_bounding_boxes(tree: &PartitionTree, rooms: &[Room], grid: &Grid, width: i32) -> CorridorPlan {
    let by_leaf = rooms_by_leaf(tree, rooms);
    let mut plan = CorridorPlan::default();

    for node in tree.internal_nodes() {
        let (left, right) = child_rooms(tree, node, &by_leaf);
        let axis = node.split.unwrap_or(SplitAxis::Vertical);
        match bridge(&left, &right, rooms, grid, axis, width) {
            Some(path) => plan.paths.push(path),
            None => fail(&mut plan, node),
        }
    }
    plan
}

/// `(near, far)` extent of a rectangle across the cut and its `(lo, hi)` extent along it
fn spans(r: &Rect, axis: SplitAxis) -> ((i32, i32), (i32, i32)) {
    match axis {
        SplitAxis::Vertical => ((r.min.x, r.max.x), (r.min.y, r.max.y)),
        SplitAxis::Horizontal => ((r.min.y, r.max.y), (r.min.x, r.max.x)),
    }
}

/// A point split into `(across, along)` coordinates relative to the cut
fn split_point(p: Point, axis: SplitAxis) -> (i32, i32) {
    match axis {
        SplitAxis::Vertical => (p.x, p.y),
        SplitAxis::Horizontal => (p.y, p.x),
    }
}

fn crossing(axis: SplitAxis, from: i32, to: i32, center: i32, width: i32) -> CorridorSegment {
    match axis {
        SplitAxis::Vertical => CorridorSegment::horizontal(from, to, center, width),
        SplitAxis::Horizontal => CorridorSegment::vertical(from, to, center, width),
    }
}

/// Extent across the cut of a room's own floor, for each line along the cut
struct FloorProfile {
    lo: i32,
    lines: Vec<Option<(i32, i32)>>,
}

impl FloorProfile {
    fn new(room: &Room, grid: &Grid, axis: SplitAxis) -> Self {
        let (_, (lo, hi)) = spans(&room.bounds, axis);
        let mut lines: Vec<Option<(i32, i32)>> = vec![None; (hi - lo).max(0) as usize];
        for p in grid.floor_cells_of(room.id, &room.bounds) {
            let (across, along) = split_point(p, axis);
            if let Some(line) = lines.get_mut((along - lo) as usize) {
                *line = Some(match *line {
                    Some((near, far)) => (near.min(across), far.max(across)),
                    None => (across, across),
                });
            }
        }
        Self { lo, lines }
    }

    /// Floor extent across the cut within the band `[start, start + width)`
    fn band(&self, start: i32, width: i32) -> Option<(i32, i32)> {
        (start..start + width)
            .filter_map(|along| self.lines.get(usize::try_from(along - self.lo).ok()?).copied().flatten())
            .reduce(|(n1, f1), (n2, f2)| (n1.min(n2), f1.max(f2)))
    }
}

fn bridge(
    left: &[RoomId],
    right: &[RoomId],
    rooms: &[Room],
    grid: &Grid,
    axis: SplitAxis,
    width: i32,
) -> Option<CorridorPath> {
    let left_rooms = profiles(left, rooms, grid, axis);
    let right_rooms = profiles(right, rooms, grid, axis);

    // facing pair: a band of lines both rooms' floor reaches, smallest gap first
    let mut best: Option<(RoomId, RoomId, i32, i32, i32)> = None;
    let mut best_gap = i32::MAX;
    for (a, a_floor) in &left_rooms {
        for (b, b_floor) in &right_rooms {
            let (_, (a_lo, a_hi)) = spans(&a.bounds, axis);
            let (_, (b_lo, b_hi)) = spans(&b.bounds, axis);
            let Some((lo, hi)) = span_overlap(a_lo, a_hi, b_lo, b_hi) else {
                continue;
            };
            for start in lo..=hi - width {
                let (Some((_, a_end)), Some((b_start, _))) = (a_floor.band(start, width), b_floor.band(start, width))
                else {
                    continue;
                };
                let gap = b_start - a_end;
                if gap < best_gap {
                    best_gap = gap;
                    best = Some((a.id, b.id, a_end, b_start, start + width / 2));
                }
            }
        }
    }
    if let Some((from_room, to_room, from, to, center)) = best {
        return Some(CorridorPath {
            from_room,
            to_room,
            segments: vec![crossing(axis, from, to, center, width)],
            is_bent: false,
            endpoints: None,
        });
    }

    // no facing pair: turn once between the floor cells nearest the cut
    let a = nearest_floor(&left_rooms, grid, axis, 1);
    let b = nearest_floor(&right_rooms, grid, axis, -1);
    if let (Some((from_room, a)), Some((to_room, b))) = (a, b) {
        let (a_across, a_along) = split_point(a, axis);
        let (b_across, b_along) = split_point(b, axis);
        let mut segments = vec![crossing(axis, a_across, b_across, a_along, width)];
        if a_along != b_along {
            segments.push(along_cut(axis, a_along, b_along, b_across, width));
        }
        return Some(CorridorPath {
            from_room,
            to_room,
            is_bent: segments.len() == 2,
            segments,
            endpoints: None,
        });
    }

    // a side without any floor: span the occupied boxes so the split is still bridged
    let left_box = occupied_box(left, rooms)?;
    let right_box = occupied_box(right, rooms)?;
    let ((_, l_far), (l_lo, l_hi)) = spans(&left_box, axis);
    let ((r_near, _), (r_lo, r_hi)) = spans(&right_box, axis);
    let center = match span_overlap(l_lo, l_hi, r_lo, r_hi) {
        Some((lo, hi)) => lo + (hi - lo) / 2,
        None => ((l_lo + l_hi) / 2 + (r_lo + r_hi) / 2) / 2,
    };

    let from_room = nearest(left, rooms, |r| -spans(r, axis).0.1)?;
    let to_room = nearest(right, rooms, |r| spans(r, axis).0.0)?;
    Some(CorridorPath {
        from_room,
        to_room,
        segments: vec![crossing(axis, l_far - 1, r_near, center, width)],
        is_bent: false,
        endpoints: None,
    })
}

fn profiles<'r>(ids: &[RoomId], rooms: &'r [Room], grid: &Grid, axis: SplitAxis) -> Vec<(&'r Room, FloorProfile)> {
    ids.iter()
        .filter_map(|id| rooms.get(id.0))
        .map(|r| (r, FloorProfile::new(r, grid, axis)))
        .collect()
}

/// Owned floor cell closest to the cut; `toward_cut` is 1 below the cut, -1 above it
fn nearest_floor(side: &[(&Room, FloorProfile)], grid: &Grid, axis: SplitAxis, toward_cut: i32) -> Option<(RoomId, Point)> {
    side.iter()
        .flat_map(|(r, _)| {
            let id = r.id;
            grid.floor_cells_of(id, &r.bounds).into_iter().map(move |p| (id, p))
        })
        .min_by_key(|(_, p)| {
            let (across, along) = split_point(*p, axis);
            (-toward_cut * across, along)
        })
}

/// A run parallel to the cut, `width` lines centered on `center` across it
fn along_cut(axis: SplitAxis, from: i32, to: i32, center: i32, width: i32) -> CorridorSegment {
    match axis {
        SplitAxis::Vertical => CorridorSegment::vertical(from, to, center, width),
        SplitAxis::Horizontal => CorridorSegment::horizontal(from, to, center, width),
    }
}

fn occupied_box(ids: &[RoomId], rooms: &[Room]) -> Option<Rect> {
    ids.iter()
        .filter_map(|id| rooms.get(id.0))
        .map(|r| r.bounds)
        .reduce(|acc, b| acc.union(&b))
}

/// Room closest to the cut, by the given key (first one wins ties)
fn nearest(ids: &[RoomId], rooms: &[Room], key: impl Fn(&Rect) -> i32) -> Option<RoomId> {
    ids.iter()
        .filter_map(|id| rooms.get(id.0))
        .min_by_key(|r| key(&r.bounds))
        .map(|r| r.id)
}

fn fail(plan: &mut CorridorPlan, node: &PartitionNode) {
    log::warn!(
        "no corridor between the children of node {} at depth {} ({}x{} at {},{})",
        node.id.0,
        node.depth,
        node.bounds.width(),
        node.bounds.height(),
        node.bounds.min.x,
        node.bounds.min.y
    );
    plan.failed.push(FailedConnection {
        node: node.id,
        depth: node.depth,
        bounds: node.bounds,
    });
}

/// Room placed in each leaf, indexed by node id
fn rooms_by_leaf(tree: &PartitionTree, rooms: &[Room]) -> Vec<Option<RoomId>> {
    let mut by_leaf = vec![None; tree.nodes().len()];
    for room in rooms {
        if let Some(slot) = by_leaf.get_mut(room.leaf.0) {
            *slot = Some(room.id);
        }
    }
    by_leaf
}

/// Rooms under each child of an internal node, in breadth-first leaf order
fn child_rooms(tree: &PartitionTree, node: &PartitionNode, by_leaf: &[Option<RoomId>]) -> (Vec<RoomId>, Vec<RoomId>) {
    let under = |id: NodeId| -> Vec<RoomId> {
        tree.leaves_under(id)
            .into_iter()
            .filter_map(|leaf| by_leaf.get(leaf.0).copied().flatten())
            .collect()
    };
    match node.children {
        Some([a, b]) => (under(a), under(b)),
        None => (Vec::new(), Vec::new()),
    }
}

/// Write corridor cells and the walls along each segment's long edges
///
/// Corridors never replace Floor. Walls never replace Floor or Corridor.
pub fn rasterize(paths: &[CorridorPath], grid: &mut Grid) -> RasterStats {
    let mut stats = RasterStats::default();
    for segment in paths.iter().flat_map(|p| &p.segments) {
        for p in segment.rect().cells() {
            let before = grid.kind_at(p.x, p.y);
            if before != Some(CellKind::Corridor) && grid.set(p.x, p.y, CellKind::Corridor, None) {
                stats.corridor_cells += 1;
            }
        }

        let (s, e) = (segment.start, segment.end);
        let flanks: Vec<Point> = if segment.is_horizontal {
            (s.x..=e.x)
                .flat_map(|x| [Point::new(x, s.y - 1), Point::new(x, e.y + 1)])
                .collect()
        } else {
            (s.y..=e.y)
                .flat_map(|y| [Point::new(s.x - 1, y), Point::new(e.x + 1, y)])
                .collect()
        };
        for p in flanks {
            if grid.kind_at(p.x, p.y) == Some(CellKind::Empty) && grid.set(p.x, p.y, CellKind::Wall, None) {
                stats.wall_cells += 1;
            }
        }
    }
    log::debug!(
        "rasterized {} corridor cells and {} wall cells",
        stats.corridor_cells,
        stats.wall_cells
    );
    stats
}

/// Tracks which rooms are joined together
#[derive(Debug, Clone)]
pub struct ConnectivityTracker {
    /// Each room's equivalence class
    class: Vec<usize>,
}

impl ConnectivityTracker {
    pub fn new(num_rooms: usize) -> Self {
        Self {
            class: (0..num_rooms).collect(),
        }
    }

    /// Rooms joined through walkable cells of the finished grid
    ///
    /// Flood-fills walkable space (4-connected) and merges every room whose
    /// floor lands in the same region. A room without floor stays alone.
    pub fn from_grid(rooms: &[Room], grid: &Grid) -> Self {
        let mut tracker = Self::new(rooms.len());
        let width = grid.width();
        let index = |p: Point| (p.y * width + p.x) as usize;

        let mut region = vec![None; grid.cells().count()];
        let mut owner: Vec<Option<RoomId>> = Vec::new();
        for (start, cell) in grid.cells() {
            if !cell.is_walkable() || region[index(start)].is_some() {
                continue;
            }
            let label = owner.len();
            owner.push(None);
            region[index(start)] = Some(label);
            let mut queue = VecDeque::from([start]);
            while let Some(p) = queue.pop_front() {
                for q in [
                    Point::new(p.x + 1, p.y),
                    Point::new(p.x - 1, p.y),
                    Point::new(p.x, p.y + 1),
                    Point::new(p.x, p.y - 1),
                ] {
                    if grid.is_walkable(q.x, q.y) && region[index(q)].is_none() {
                        region[index(q)] = Some(label);
                        queue.push_back(q);
                    }
                }
            }
        }

        for room in rooms {
            for p in grid.floor_cells_of(room.id, &room.bounds) {
                let Some(label) = region[index(p)] else {
                    continue;
                };
                match owner[label] {
                    Some(first) => tracker.merge(first, room.id),
                    None => owner[label] = Some(room.id),
                }
            }
        }
        tracker
    }

    pub fn are_connected(&self, a: RoomId, b: RoomId) -> bool {
        match (self.class.get(a.0), self.class.get(b.0)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    pub fn merge(&mut self, a: RoomId, b: RoomId) {
        let (Some(&new_class), Some(&old_class)) = (self.class.get(a.0), self.class.get(b.0)) else {
            return;
        };
        for c in &mut self.class {
            if *c == old_class {
                *c = new_class;
            }
        }
    }

    pub fn all_connected(&self) -> bool {
        self.class.windows(2).all(|w| w[0] == w[1])
    }

    /// Number of separate groups of rooms
    pub fn component_count(&self) -> usize {
        let mut classes = self.class.clone();
        classes.sort_unstable();
        classes.dedup();
        classes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DungeonParams;
    use crate::dungeon::rect::Direction;
    use crate::dungeon::room::{carve_room, generate_rooms};
    use crate::rng::DungeonRng;

    fn carve(grid: &mut Grid, id: usize, bounds: Rect) -> Room {
        let room = Room::new(RoomId(id), NodeId(id), grid.bounds(), bounds);
        carve_room(&room, grid);
        room
    }

    fn layout(seed: u32) -> (PartitionTree, Vec<Room>, Grid) {
        let params = DungeonParams::with_seed(seed);
        let mut rng = DungeonRng::new(seed);
        let tree = PartitionTree::build(100, 100, 10, 10, 10, &mut rng);
        let mut grid = Grid::new(100, 100);
        let rooms = generate_rooms(&tree, &params, &mut grid, &mut rng);
        (tree, rooms, grid)
    }

    #[test]
    fn test_segment_cross_section_is_exact() {
        for width in 5..=8 {
            let h = CorridorSegment::horizontal(30, 10, 20, width);
            assert_eq!(h.cross_section(), width);
            assert_eq!(h.length(), 21);
            assert_eq!(h.start.x, 10);
            let v = CorridorSegment::vertical(4, 9, 50, width);
            assert_eq!(v.cross_section(), width);
            assert_eq!(v.rect().area(), width * 6);
        }
        let h = CorridorSegment::horizontal(0, 3, 10, 5);
        assert_eq!((h.start.y, h.end.y), (8, 12));
    }

    #[test]
    fn test_facing_rooms_get_straight_corridor() {
        let mut grid = Grid::new(40, 40);
        let rooms = vec![
            carve(&mut grid, 0, Rect::new(10, 10, 20, 20)),
            carve(&mut grid, 1, Rect::new(10, 21, 20, 31)),
        ];
        let points = connection::analyze_rooms(&rooms, &grid);
        let path = connect_rooms(&[RoomId(0)], &[RoomId(1)], &points, 5).unwrap();

        assert!(!path.is_bent);
        assert_eq!(path.segments.len(), 1);
        let seg = path.segments[0];
        assert!(!seg.is_horizontal);
        assert_eq!(seg.cross_section(), 5);
        assert_eq!((seg.start, seg.end), (Point::new(13, 19), Point::new(17, 21)));

        rasterize(&[path], &mut grid);
        assert_eq!(grid.kind_at(15, 20), Some(CellKind::Corridor));
        assert_eq!(grid.kind_at(15, 19), Some(CellKind::Floor));
        assert_eq!(grid.kind_at(15, 21), Some(CellKind::Floor));
        assert_eq!(grid.kind_at(12, 20), Some(CellKind::Wall));
    }

    #[test]
    fn test_perpendicular_edges_get_one_turn() {
        let mut grid = Grid::new(60, 60);
        // wide and flat: only North/South runs; tall and thin: only East/West runs
        let rooms = vec![
            carve(&mut grid, 0, Rect::new(10, 10, 19, 14)),
            carve(&mut grid, 1, Rect::new(30, 30, 34, 39)),
        ];
        let points = connection::analyze_rooms(&rooms, &grid);
        assert!(points[0].iter().all(|p| p.direction.is_north_south()));
        assert!(points[1].iter().all(|p| !p.direction.is_north_south()));

        let path = connect_rooms(&[RoomId(0)], &[RoomId(1)], &points, 5).unwrap();
        assert!(path.is_bent);
        assert_eq!(path.segments.len(), 2);
        let (p1, p2) = path.endpoints.unwrap();
        assert_eq!(p1.direction, Direction::North);
        assert_eq!(p2.direction, Direction::West);

        let corner = Point::new(14, 34);
        let [first, second] = [path.segments[0], path.segments[1]];
        assert!(!first.is_horizontal);
        assert!(second.is_horizontal);
        assert!(first.rect().contains_point(corner));
        assert!(second.rect().contains_point(corner));

        rasterize(&[path], &mut grid);
        assert_eq!(grid.kind_at(14, 20), Some(CellKind::Corridor));
        assert_eq!(grid.kind_at(22, 34), Some(CellKind::Corridor));
        assert_eq!(grid.kind_at(30, 34), Some(CellKind::Floor));
    }

    #[test]
    fn test_facing_pair_beats_nearer_perpendicular_pair() {
        let mut grid = Grid::new(60, 60);
        let rooms = vec![
            // flat room: North/South runs only
            carve(&mut grid, 0, Rect::new(10, 10, 19, 14)),
            // far above it, facing back down
            carve(&mut grid, 1, Rect::new(10, 50, 19, 54)),
            // close by, East/West runs only
            carve(&mut grid, 2, Rect::new(30, 30, 34, 39)),
        ];
        let points = connection::analyze_rooms(&rooms, &grid);

        let bend_only = connect_rooms(&[RoomId(0)], &[RoomId(2)], &points, 5).unwrap();
        assert!(bend_only.is_bent);
        let (n, w) = bend_only.endpoints.unwrap();
        let facing = connection::find_best_pair(&points[0], &points[1]).unwrap();
        assert!(n.position.distance(&w.position) < facing.0.position.distance(&facing.1.position));

        let path = connect_rooms(&[RoomId(0)], &[RoomId(1), RoomId(2)], &points, 5).unwrap();
        assert_eq!(path.to_room, RoomId(1));
        assert!(!path.is_bent);
        let (p1, p2) = path.endpoints.unwrap();
        assert_eq!((p1.direction, p2.direction), (Direction::North, Direction::South));
    }

    #[test]
    fn test_no_usable_pair_fails() {
        let mut grid = Grid::new(60, 30);
        let rooms = vec![
            carve(&mut grid, 0, Rect::new(10, 10, 19, 14)),
            carve(&mut grid, 1, Rect::new(40, 10, 49, 14)),
        ];
        let points = connection::analyze_rooms(&rooms, &grid);
        assert!(connect_rooms(&[RoomId(0)], &[RoomId(1)], &points, 5).is_none());
    }

    #[test]
    fn test_one_route_per_internal_node() {
        let (tree, rooms, grid) = layout(42);
        let plan = route_connection_points(&tree, &rooms, &grid, 5);
        assert_eq!(plan.paths.len() + plan.failed.len(), tree.internal_nodes().count());
        for seg in plan.paths.iter().flat_map(|p| &p.segments) {
            assert_eq!(seg.cross_section(), 5);
        }
        for path in &plan.paths {
            assert_ne!(path.from_room, path.to_room);
            assert_eq!(path.segments.len(), if path.is_bent { 2 } else { 1 });
        }
    }

    #[test]
    fn test_bounding_box_router_never_fails() {
        for seed in 0..10 {
            let (tree, rooms, mut grid) = layout(seed);
            let plan = route_bounding_boxes(&tree, &rooms, &grid, 6);
            assert!(plan.failed.is_empty());
            assert_eq!(plan.paths.len(), tree.internal_nodes().count());
            for path in &plan.paths {
                assert!(path.endpoints.is_none());
                assert_eq!(path.segments.len(), if path.is_bent { 2 } else { 1 });
                for seg in &path.segments {
                    assert_eq!(seg.cross_section(), 6);
                }
            }

            let floor_before = grid.count(CellKind::Floor);
            rasterize(&plan.paths, &mut grid);
            assert_eq!(grid.count(CellKind::Floor), floor_before);

            let tracker = ConnectivityTracker::from_grid(&rooms, &grid);
            for path in &plan.paths {
                assert!(tracker.are_connected(path.from_room, path.to_room), "seed {seed}");
            }
            assert!(tracker.all_connected(), "seed {seed}");
        }
    }

    #[test]
    fn test_bounding_box_crossing_reaches_recessed_floor() {
        let mut grid = Grid::new(50, 40);
        let rooms = vec![
            carve(&mut grid, 0, Rect::new(5, 10, 20, 30)),
            carve(&mut grid, 1, Rect::new(30, 20, 45, 30)),
        ];
        // L-shaped left room: its upper rows only reach x = 9
        for p in Rect::new(10, 15, 20, 30).cells() {
            grid.set(p.x, p.y, CellKind::Empty, None);
        }
        assert_eq!(rooms[0].bounds, Rect::new(5, 10, 20, 30));

        let path = bridge(&[RoomId(0)], &[RoomId(1)], &rooms, &grid, SplitAxis::Vertical, 5).unwrap();
        assert_eq!((path.from_room, path.to_room), (RoomId(0), RoomId(1)));
        assert!(!path.is_bent);
        assert_eq!(path.segments.len(), 1);
        let seg = path.segments[0];
        assert!(seg.is_horizontal);
        assert_eq!((seg.start, seg.end), (Point::new(9, 20), Point::new(30, 24)));

        assert!(!ConnectivityTracker::from_grid(&rooms, &grid).are_connected(RoomId(0), RoomId(1)));
        rasterize(&[path], &mut grid);
        assert_eq!(grid.kind_at(15, 22), Some(CellKind::Corridor));
        assert!(ConnectivityTracker::from_grid(&rooms, &grid).are_connected(RoomId(0), RoomId(1)));
    }

    #[test]
    fn test_bounding_box_turns_when_rooms_miss_each_other() {
        let mut grid = Grid::new(50, 50);
        let rooms = vec![
            carve(&mut grid, 0, Rect::new(5, 5, 15, 12)),
            carve(&mut grid, 1, Rect::new(30, 30, 40, 40)),
        ];

        let path = bridge(&[RoomId(0)], &[RoomId(1)], &rooms, &grid, SplitAxis::Vertical, 5).unwrap();
        assert!(path.is_bent);
        let [first, second] = [path.segments[0], path.segments[1]];
        assert_eq!((first.start, first.end), (Point::new(14, 3), Point::new(30, 7)));
        assert_eq!((second.start, second.end), (Point::new(28, 5), Point::new(32, 30)));

        rasterize(&[path], &mut grid);
        assert!(ConnectivityTracker::from_grid(&rooms, &grid).all_connected());
    }

    #[test]
    fn test_rasterize_counts_and_walls() {
        let mut grid = Grid::new(30, 30);
        let path = CorridorPath {
            from_room: RoomId(0),
            to_room: RoomId(1),
            segments: vec![CorridorSegment::horizontal(5, 14, 10, 5)],
            is_bent: false,
            endpoints: None,
        };
        let stats = rasterize(std::slice::from_ref(&path), &mut grid);
        assert_eq!(stats.corridor_cells, 50);
        assert_eq!(stats.wall_cells, 20);
        assert_eq!(grid.kind_at(5, 7), Some(CellKind::Wall));
        assert_eq!(grid.kind_at(5, 13), Some(CellKind::Wall));

        // a second pass changes nothing
        let again = rasterize(&[path], &mut grid);
        assert_eq!(again, RasterStats::default());
    }

    #[test]
    fn test_connectivity_tracker() {
        let mut tracker = ConnectivityTracker::new(4);
        assert!(!tracker.are_connected(RoomId(0), RoomId(1)));
        assert_eq!(tracker.component_count(), 4);

        tracker.merge(RoomId(0), RoomId(1));
        tracker.merge(RoomId(1), RoomId(2));
        assert!(tracker.are_connected(RoomId(0), RoomId(2)));
        assert!(!tracker.all_connected());
        assert_eq!(tracker.component_count(), 2);

        tracker.merge(RoomId(3), RoomId(0));
        assert!(tracker.all_connected());
        assert_eq!(tracker.component_count(), 1);
    }

    #[test]
    fn test_tracker_from_grid_follows_walkable_cells() {
        let mut grid = Grid::new(40, 20);
        let rooms = vec![
            carve(&mut grid, 0, Rect::new(2, 5, 8, 10)),
            carve(&mut grid, 1, Rect::new(14, 5, 20, 10)),
            carve(&mut grid, 2, Rect::new(28, 5, 34, 10)),
            Room::new(RoomId(3), NodeId(3), grid.bounds(), Rect::new(36, 15, 38, 17)),
        ];
        let tracker = ConnectivityTracker::from_grid(&rooms, &grid);
        assert_eq!(tracker.component_count(), 4);

        // a door and a corridor strip join the first two rooms
        grid.set(8, 7, CellKind::Door, None);
        for x in 9..13 {
            grid.set(x, 7, CellKind::Corridor, None);
        }
        grid.set(13, 7, CellKind::Door, None);
        let tracker = ConnectivityTracker::from_grid(&rooms, &grid);
        assert!(tracker.are_connected(RoomId(0), RoomId(1)));
        assert!(!tracker.are_connected(RoomId(1), RoomId(2)));
        // no floor at all: its own group
        assert!(!tracker.are_connected(RoomId(2), RoomId(3)));
        assert_eq!(tracker.component_count(), 3);
    }
}
