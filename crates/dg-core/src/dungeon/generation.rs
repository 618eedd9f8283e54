//! Dungeon generation pipeline
//!
//! Runs the stages in their fixed order over one grid and one RNG:
//! partition, rooms, shapes, bounds, corridors, wall topology. Parameters are
//! validated before anything is drawn, so a bad parameter block never
//! produces a half-built dungeon.

use std::fmt;

use serde::Serialize;

use crate::config::{DungeonParams, SeedChoice};
use crate::error::ConfigError;
use crate::rng::DungeonRng;

use super::bsp::PartitionTree;
use super::corridor::{self, ConnectivityTracker, CorridorPath, FailedConnection, RasterStats};
use super::room::generate_rooms;
use super::shape::{apply_shapes, recompute_room_bounds, ShapeCarve};
use super::walls::WallLayout;
use super::{CellKind, Grid, Room, RoomId};

/// A finished layout and everything that went into it
#[derive(Debug, Clone)]
pub struct Dungeon {
    /// The seed actually used, even when the parameters asked for a random one
    pub seed: u32,
    pub params: DungeonParams,
    pub tree: PartitionTree,
    pub rooms: Vec<Room>,
    pub grid: Grid,
    pub carves: Vec<ShapeCarve>,
    pub degenerate_rooms: Vec<RoomId>,
    pub corridors: Vec<CorridorPath>,
    pub failed_connections: Vec<FailedConnection>,
    pub raster: RasterStats,
    pub walls: WallLayout,
}

/// Summary counts of a generated dungeon
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub seed: u32,
    pub partition_depth: u32,
    pub rooms: usize,
    pub reshaped_rooms: usize,
    pub degenerate_rooms: Vec<RoomId>,
    pub corridors: usize,
    pub bent_corridors: usize,
    pub failed_connections: usize,
    /// Groups of rooms joined by walkable cells; 1 means fully connected
    pub room_groups: usize,
    pub floor_cells: usize,
    pub corridor_cells: usize,
    pub wall_cells: usize,
    pub wall_segments: usize,
    pub pillars: usize,
}

impl Dungeon {
    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id.0)
    }

    /// Room owning the Floor cell at `(x, y)`
    pub fn room_at(&self, x: i32, y: i32) -> Option<&Room> {
        self.grid.get(x, y).and_then(|c| c.room).and_then(|id| self.room(id))
    }

    pub fn report(&self) -> GenerationReport {
        let tracker = ConnectivityTracker::from_grid(&self.rooms, &self.grid);
        GenerationReport {
            seed: self.seed,
            partition_depth: self.tree.depth(),
            rooms: self.rooms.len(),
            reshaped_rooms: self.carves.iter().filter(|c| !c.removed.is_empty()).count(),
            degenerate_rooms: self.degenerate_rooms.clone(),
            corridors: self.corridors.len(),
            bent_corridors: self.corridors.iter().filter(|c| c.is_bent).count(),
            failed_connections: self.failed_connections.len(),
            room_groups: tracker.component_count(),
            floor_cells: self.grid.count(CellKind::Floor),
            corridor_cells: self.grid.count(CellKind::Corridor),
            wall_cells: self.grid.count(CellKind::Wall),
            wall_segments: self.walls.segments.len(),
            pillars: self.walls.corners.len(),
        }
    }
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Seed:        {}", self.seed)?;
        writeln!(
            f,
            "Rooms:       {} ({} reshaped, {} degenerate)",
            self.rooms,
            self.reshaped_rooms,
            self.degenerate_rooms.len()
        )?;
        writeln!(
            f,
            "Corridors:   {} ({} bent, {} failed)",
            self.corridors, self.bent_corridors, self.failed_connections
        )?;
        writeln!(f, "Room groups: {}", self.room_groups)?;
        writeln!(
            f,
            "Cells:       {} floor, {} corridor, {} wall",
            self.floor_cells, self.corridor_cells, self.wall_cells
        )?;
        write!(
            f,
            "Geometry:    {} wall segments, {} pillars, depth {}",
            self.wall_segments, self.pillars, self.partition_depth
        )
    }
}

/// Build a dungeon from a parameter block
pub fn generate_dungeon(params: &DungeonParams) -> Result<Dungeon, ConfigError> {
    params.validate()?;

    let seed = match params.seed {
        SeedChoice::Fixed(seed) => seed,
        SeedChoice::Random => DungeonRng::random_seed(),
    };
    let mut rng = DungeonRng::new(seed);
    log::info!(
        "generating {}x{} dungeon with seed {}",
        params.dungeon_width,
        params.dungeon_length,
        seed
    );

    let tree = PartitionTree::build(
        params.dungeon_width as i32,
        params.dungeon_length as i32,
        params.max_iterations,
        params.room_width_min as i32,
        params.room_length_min as i32,
        &mut rng,
    );

    let mut grid = Grid::new(params.dungeon_width, params.dungeon_length);
    let mut rooms = generate_rooms(&tree, params, &mut grid, &mut rng);

    let carves = match &params.shapes {
        Some(config) => apply_shapes(&mut rooms, &mut grid, config, &mut rng),
        None => Vec::new(),
    };
    let degenerate_rooms = recompute_room_bounds(&mut rooms, &grid);

    let width = params.effective_corridor_width();
    let plan = corridor::route_corridors(&tree, &rooms, &grid, params.corridor_strategy, width);
    let raster = corridor::rasterize(&plan.paths, &mut grid);

    let walls = WallLayout::analyze(&grid);

    Ok(Dungeon {
        seed,
        params: params.clone(),
        tree,
        rooms,
        grid,
        carves,
        degenerate_rooms,
        corridors: plan.paths,
        failed_connections: plan.failed,
        raster,
        walls,
    })
}
