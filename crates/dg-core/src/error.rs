//! Configuration errors
//!
//! Generation itself never fails once the parameters are accepted; everything
//! that can go wrong is caught here, before partitioning starts.

use thiserror::Error;

/// Parameter validation and config loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Dungeon dimensions must be positive and fit the grid, got {width}x{length}")]
    InvalidDimensions { width: u32, length: u32 },

    #[error("Minimum room size {width}x{length} is below the smallest allowed size {min}")]
    RoomTooSmall { width: u32, length: u32, min: u32 },

    #[error("Minimum room size {room_width}x{room_length} does not fit in a {width}x{length} dungeon")]
    RoomExceedsDungeon {
        room_width: u32,
        room_length: u32,
        width: u32,
        length: u32,
    },

    #[error("{name} must be in [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("Room offset must be 0, 1 or 2, got {0}")]
    InvalidOffset(u32),

    #[error("max_iterations must be at least 1")]
    ZeroIterations,

    #[error("Invalid shape configuration: {0}")]
    InvalidShapeConfig(String),
}
