//! Dungeon layout
//!
//! Grid, partition tree, rooms and their shapes, corridors, and the wall
//! topology read off the finished grid.

pub mod bsp;
mod cell;
pub mod connection;
pub mod corridor;
mod generation;
mod grid;
pub mod rect;
pub mod room;
pub mod shape;
pub mod walls;

pub use bsp::{NodeId, PartitionNode, PartitionTree};
pub use cell::{Cell, CellKind};
pub use connection::ConnectionPoint;
pub use corridor::{CorridorPath, CorridorPlan, CorridorSegment, FailedConnection, RasterStats};
pub use generation::{generate_dungeon, Dungeon, GenerationReport};
pub use grid::Grid;
pub use rect::{Direction, Point, Rect, SplitAxis};
pub use room::{Room, RoomId, RoomType};
pub use shape::{RoomShape, ShapeCarve};
pub use walls::{Corner, CornerKind, WallLayout, WallOrientation, WallSegment};
