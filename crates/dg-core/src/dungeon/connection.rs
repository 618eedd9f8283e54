//! Connection points
//!
//! Finds the stretches of a room's floor edge wide enough for a corridor to
//! attach to, and scores pairs of them between two rooms.

use super::rect::{Direction, Point};
use super::{Grid, Room, RoomId};

/// Shortest floor run a corridor may attach to
pub const MIN_CONNECTION_WIDTH: i32 = 5;

/// Edge scans stay this far away from the room corners
pub const DISTANCE_FROM_CORNER: i32 = 2;

/// Score per cell of overlap between two facing points
const OVERLAP_BONUS: i32 = 5;

const MAX_QUALITY: i32 = 100;

/// A run of floor along one room edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionPoint {
    /// Middle cell of the run
    pub position: Point,
    /// Edge the run lies on
    pub direction: Direction,
    pub quality: i32,
    pub room: RoomId,
    /// First cell of the run
    pub range_start: Point,
    /// Last cell of the run (inclusive)
    pub range_end: Point,
}

impl ConnectionPoint {
    /// The run as an inclusive span along its edge
    pub fn span(&self) -> (i32, i32) {
        if self.direction.is_north_south() {
            (self.range_start.x, self.range_end.x)
        } else {
            (self.range_start.y, self.range_end.y)
        }
    }

    pub fn width(&self) -> i32 {
        let (lo, hi) = self.span();
        hi - lo + 1
    }

    /// Cells covered by the run
    pub fn cells(&self) -> impl Iterator<Item = Point> + '_ {
        let (lo, hi) = self.span();
        (lo..=hi).map(move |i| {
            if self.direction.is_north_south() {
                Point::new(i, self.position.y)
            } else {
                Point::new(self.position.x, i)
            }
        })
    }

    /// Opposite edges whose runs overlap across the corridor axis
    pub fn can_align_with(&self, other: &ConnectionPoint) -> bool {
        if other.direction != self.direction.opposite() {
            return false;
        }
        let (a0, a1) = self.span();
        let (b0, b1) = other.span();
        !(a1 < b0 || a0 > b1)
    }

    /// Cells shared by the two spans
    pub fn overlap(&self, other: &ConnectionPoint) -> i32 {
        let (a0, a1) = self.span();
        let (b0, b1) = other.span();
        (a1.min(b1) - a0.max(b0) + 1).max(0)
    }

    /// Where an L corridor between the two points turns
    ///
    /// The vertical leg runs along the North/South point's column, the
    /// horizontal leg along the East/West point's row.
    pub fn corner_with(&self, other: &ConnectionPoint) -> Point {
        if self.direction.is_north_south() {
            Point::new(self.position.x, other.position.y)
        } else {
            Point::new(other.position.x, self.position.y)
        }
    }

    /// One vertical and one horizontal point whose outward rays meet
    pub fn can_bend_with(&self, other: &ConnectionPoint) -> bool {
        if self.direction.is_north_south() == other.direction.is_north_south() {
            return false;
        }
        let corner = self.corner_with(other);
        self.faces(corner) && other.faces(corner)
    }

    /// Whether `target` lies strictly outside this point's edge
    pub fn faces(&self, target: Point) -> bool {
        match self.direction {
            Direction::North => target.y > self.position.y,
            Direction::South => target.y < self.position.y,
            Direction::East => target.x > self.position.x,
            Direction::West => target.x < self.position.x,
        }
    }
}

/// Every connection point of a room, edges in N, S, E, W order
pub fn analyze_room(room: &Room, grid: &Grid) -> Vec<ConnectionPoint> {
    let b = room.bounds;
    let mut points = Vec::new();
    let (x_lo, x_hi) = (b.min.x + DISTANCE_FROM_CORNER, b.max.x - DISTANCE_FROM_CORNER);
    let (y_lo, y_hi) = (b.min.y + DISTANCE_FROM_CORNER, b.max.y - DISTANCE_FROM_CORNER);

    scan_edge(grid, room.id, Direction::North, b.max.y - 1, x_lo, x_hi, &mut points);
    scan_edge(grid, room.id, Direction::South, b.min.y, x_lo, x_hi, &mut points);
    scan_edge(grid, room.id, Direction::East, b.max.x - 1, y_lo, y_hi, &mut points);
    scan_edge(grid, room.id, Direction::West, b.min.x, y_lo, y_hi, &mut points);
    points
}

/// Connection points of every room, indexed by room id
pub fn analyze_rooms(rooms: &[Room], grid: &Grid) -> Vec<Vec<ConnectionPoint>> {
    let points: Vec<Vec<ConnectionPoint>> = rooms.iter().map(|r| analyze_room(r, grid)).collect();
    log::debug!(
        "found {} connection points over {} rooms",
        points.iter().map(Vec::len).sum::<usize>(),
        rooms.len()
    );
    points
}

/// Collect the qualifying floor runs on the line `fixed` between `[start, end)`
fn scan_edge(
    grid: &Grid,
    room: RoomId,
    direction: Direction,
    fixed: i32,
    start: i32,
    end: i32,
    points: &mut Vec<ConnectionPoint>,
) {
    let cell_at = |i: i32| {
        if direction.is_north_south() {
            Point::new(i, fixed)
        } else {
            Point::new(fixed, i)
        }
    };

    let mut run_start = None;
    for i in start..end {
        let floor = grid.get_point(cell_at(i)).is_some_and(|c| c.is_floor_of(room));
        match (floor, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(s)) => {
                push_run(room, direction, s, i - s, &cell_at, points);
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = run_start {
        push_run(room, direction, s, end - s, &cell_at, points);
    }
}

fn push_run(
    room: RoomId,
    direction: Direction,
    start: i32,
    len: i32,
    cell_at: &impl Fn(i32) -> Point,
    points: &mut Vec<ConnectionPoint>,
) {
    if len < MIN_CONNECTION_WIDTH {
        return;
    }
    points.push(ConnectionPoint {
        position: cell_at(start + len / 2),
        direction,
        quality: (len * 10).min(MAX_QUALITY),
        room,
        range_start: cell_at(start),
        range_end: cell_at(start + len - 1),
    });
}

/// Highest-scoring alignable pair between two rooms' points
///
/// Scores are `q1 + q2 + 5 * overlap`; the first maximum found wins.
pub fn find_best_pair<'a>(
    first: &'a [ConnectionPoint],
    second: &'a [ConnectionPoint],
) -> Option<(&'a ConnectionPoint, &'a ConnectionPoint)> {
    let mut best = None;
    let mut best_score = -1;
    for p1 in first {
        for p2 in second {
            if !p1.can_align_with(p2) {
                continue;
            }
            let score = p1.quality + p2.quality + OVERLAP_BONUS * p1.overlap(p2);
            if score > best_score {
                best_score = score;
                best = Some((p1, p2));
            }
        }
    }
    best
}

/// Highest-scoring perpendicular pair that an L corridor can join
pub fn find_best_bend_pair<'a>(
    first: &'a [ConnectionPoint],
    second: &'a [ConnectionPoint],
) -> Option<(&'a ConnectionPoint, &'a ConnectionPoint)> {
    let mut best = None;
    let mut best_score = -1;
    for p1 in first {
        for p2 in second {
            if !p1.can_bend_with(p2) {
                continue;
            }
            let score = p1.quality + p2.quality;
            if score > best_score {
                best_score = score;
                best = Some((p1, p2));
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::CellKind;
    use crate::dungeon::bsp::NodeId;
    use crate::dungeon::rect::Rect;
    use crate::dungeon::room::carve_room;

    fn carve(grid: &mut Grid, id: usize, bounds: Rect) -> Room {
        let room = Room::new(RoomId(id), NodeId(id), grid.bounds(), bounds);
        carve_room(&room, grid);
        room
    }

    fn point(direction: Direction, position: Point, lo: i32, hi: i32) -> ConnectionPoint {
        let (range_start, range_end) = if direction.is_north_south() {
            (Point::new(lo, position.y), Point::new(hi, position.y))
        } else {
            (Point::new(position.x, lo), Point::new(position.x, hi))
        };
        ConnectionPoint {
            position,
            direction,
            quality: ((hi - lo + 1) * 10).min(100),
            room: RoomId(0),
            range_start,
            range_end,
        }
    }

    #[test]
    fn test_shared_wall_yields_one_point_per_room() {
        let mut grid = Grid::new(40, 40);
        let below = carve(&mut grid, 0, Rect::new(10, 10, 20, 20));
        let above = carve(&mut grid, 1, Rect::new(10, 21, 20, 31));

        let below_points = analyze_room(&below, &grid);
        let above_points = analyze_room(&above, &grid);

        let north: Vec<_> = below_points.iter().filter(|p| p.direction == Direction::North).collect();
        let south: Vec<_> = above_points.iter().filter(|p| p.direction == Direction::South).collect();
        assert_eq!(north.len(), 1);
        assert_eq!(south.len(), 1);
        assert_eq!(north[0].width(), 6);
        assert_eq!(north[0].quality, 60);
        assert_eq!(north[0].position, Point::new(15, 19));
        assert_eq!(south[0].position, Point::new(15, 21));

        let (p1, p2) = find_best_pair(&below_points, &above_points).unwrap();
        assert_eq!(p1.direction, Direction::North);
        assert_eq!(p2.direction, Direction::South);
    }

    #[test]
    fn test_points_cover_only_own_floor() {
        let mut grid = Grid::new(40, 40);
        let room = carve(&mut grid, 0, Rect::new(5, 5, 25, 25));
        // break the north edge into a 4-run and a 9-run
        grid.set(11, 24, CellKind::Empty, None);
        let points = analyze_room(&room, &grid);

        let north: Vec<_> = points.iter().filter(|p| p.direction == Direction::North).collect();
        assert_eq!(north.len(), 1);
        assert_eq!(north[0].span(), (12, 22));
        for p in &points {
            assert!(p.width() >= MIN_CONNECTION_WIDTH);
            for c in p.cells() {
                assert!(grid.get_point(c).unwrap().is_floor_of(room.id));
            }
        }
    }

    #[test]
    fn test_quality_caps_at_100() {
        let mut grid = Grid::new(60, 20);
        let room = carve(&mut grid, 0, Rect::new(2, 2, 40, 10));
        let points = analyze_room(&room, &grid);
        let north = points.iter().find(|p| p.direction == Direction::North).unwrap();
        assert_eq!(north.width(), 34);
        assert_eq!(north.quality, 100);
    }

    #[test]
    fn test_narrow_room_has_no_points_on_short_edges() {
        let mut grid = Grid::new(40, 40);
        let room = carve(&mut grid, 0, Rect::new(5, 5, 13, 25));
        let points = analyze_room(&room, &grid);
        assert!(points.iter().all(|p| !p.direction.is_north_south()));
    }

    #[test]
    fn test_alignment_needs_opposite_overlap() {
        let n = point(Direction::North, Point::new(12, 9), 10, 14);
        let s = point(Direction::South, Point::new(16, 20), 14, 18);
        let far = point(Direction::South, Point::new(20, 20), 18, 22);
        let e = point(Direction::East, Point::new(9, 12), 10, 14);

        assert!(n.can_align_with(&s));
        assert_eq!(n.overlap(&s), 1);
        assert!(!n.can_align_with(&far));
        assert!(!n.can_align_with(&e));
        assert!(!n.can_align_with(&n));
    }

    #[test]
    fn test_first_maximum_wins() {
        let a = [
            point(Direction::North, Point::new(12, 9), 10, 14),
            point(Direction::South, Point::new(12, 0), 10, 14),
        ];
        let b = [
            point(Direction::South, Point::new(12, 20), 10, 14),
            point(Direction::North, Point::new(12, 30), 10, 14),
        ];
        let (p1, p2) = find_best_pair(&a, &b).unwrap();
        assert_eq!((p1.direction, p2.direction), (Direction::North, Direction::South));
    }

    #[test]
    fn test_bend_pair_requires_outward_corner() {
        let north = point(Direction::North, Point::new(14, 13), 12, 16);
        let west = point(Direction::West, Point::new(30, 34), 32, 36);
        let east = point(Direction::East, Point::new(33, 34), 32, 36);

        assert!(north.can_bend_with(&west));
        assert!(west.can_bend_with(&north));
        assert_eq!(north.corner_with(&west), Point::new(14, 34));
        assert_eq!(west.corner_with(&north), Point::new(14, 34));
        assert!(!north.can_bend_with(&east));

        let near = [north];
        let far = [east, west];
        let (p1, p2) = find_best_bend_pair(&near, &far).unwrap();
        assert_eq!(p1.direction, Direction::North);
        assert_eq!(p2.direction, Direction::West);
        assert!(find_best_pair(&[north], &[east, west]).is_none());
    }
}
