//! dg-core: seeded dungeon layout generation
//!
//! Builds a 2D grid dungeon from an integer seed: binary space partitioning,
//! room placement, optional room shapes, corridors between sibling
//! partitions, and the wall/corner topology a renderer needs. The same seed
//! and parameters always reproduce the same grid.
//!
//! This crate does no I/O beyond reading a parameter file.

pub mod config;
pub mod dungeon;
pub mod error;

mod rng;

pub use config::{CorridorStrategy, DungeonParams, RoomShapeConfig, SeedChoice};
pub use dungeon::{generate_dungeon, Dungeon, GenerationReport};
pub use error::ConfigError;
pub use rng::DungeonRng;
