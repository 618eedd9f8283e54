//! Generation parameters
//!
//! [`DungeonParams`] is the whole input of a build: grid extent, partition
//! budget, room and corridor sizing, the seed, and an optional
//! [`RoomShapeConfig`]. Both derive serde so a parameter file can be loaded
//! from JSON; missing fields take their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dungeon::RoomShape;
use crate::error::ConfigError;

/// Corridors are never narrower than this
pub const MIN_CORRIDOR_WIDTH: u32 = 5;

/// Smallest accepted `room_width_min` / `room_length_min`
pub const MIN_ROOM_DIMENSION: u32 = 4;

/// Which corridor router to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorridorStrategy {
    /// Route between qualifying edge runs of reshaped rooms
    #[default]
    ConnectionPoints,
    /// Bridge the occupied rectangles of sibling subtrees
    BoundingBox,
}

/// Seed selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedChoice {
    Fixed(u32),
    /// Draw one at build time; the value used is recorded on the dungeon
    #[default]
    Random,
}

/// Probabilities and sizes for non-rectangular rooms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomShapeConfig {
    pub rectangle_chance: f32,
    pub l_shape_chance: f32,
    pub t_shape_chance: f32,
    pub u_shape_chance: f32,
    pub cross_shape_chance: f32,
    pub circular_chance: f32,
    pub with_recesses_chance: f32,

    /// Smallest corner cut for L/T/Cross, as a fraction of the side
    pub cutout_min_size: f32,
    /// Largest corner cut for L/T/Cross, as a fraction of the side
    pub cutout_max_size: f32,
    /// Notches carved by the recess shape
    pub recess_count: u32,
    /// Rooms narrower or shorter than this always stay rectangular
    pub min_size_for_shapes: u32,
}

impl Default for RoomShapeConfig {
    fn default() -> Self {
        Self {
            rectangle_chance: 0.35,
            l_shape_chance: 0.2,
            t_shape_chance: 0.15,
            u_shape_chance: 0.05,
            cross_shape_chance: 0.1,
            circular_chance: 0.05,
            with_recesses_chance: 0.1,
            cutout_min_size: 0.3,
            cutout_max_size: 0.5,
            recess_count: 2,
            min_size_for_shapes: 6,
        }
    }
}

impl RoomShapeConfig {
    /// Configured weight of a shape
    pub fn weight(&self, shape: RoomShape) -> f32 {
        match shape {
            RoomShape::Rectangle => self.rectangle_chance,
            RoomShape::LShape => self.l_shape_chance,
            RoomShape::TShape => self.t_shape_chance,
            RoomShape::UShape => self.u_shape_chance,
            RoomShape::Cross => self.cross_shape_chance,
            RoomShape::Circular => self.circular_chance,
            RoomShape::WithRecesses => self.with_recesses_chance,
        }
    }

    /// A config that always picks `shape` when it fits
    pub fn only(shape: RoomShape) -> Self {
        Self {
            rectangle_chance: 0.0,
            l_shape_chance: 0.0,
            t_shape_chance: 0.0,
            u_shape_chance: 0.0,
            cross_shape_chance: 0.0,
            circular_chance: 0.0,
            with_recesses_chance: 0.0,
            ..Self::default()
        }
        .with_weight(shape, 1.0)
    }

    fn with_weight(mut self, shape: RoomShape, weight: f32) -> Self {
        let slot = match shape {
            RoomShape::Rectangle => &mut self.rectangle_chance,
            RoomShape::LShape => &mut self.l_shape_chance,
            RoomShape::TShape => &mut self.t_shape_chance,
            RoomShape::UShape => &mut self.u_shape_chance,
            RoomShape::Cross => &mut self.cross_shape_chance,
            RoomShape::Circular => &mut self.circular_chance,
            RoomShape::WithRecesses => &mut self.with_recesses_chance,
        };
        *slot = weight;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = [
            self.rectangle_chance,
            self.l_shape_chance,
            self.t_shape_chance,
            self.u_shape_chance,
            self.cross_shape_chance,
            self.circular_chance,
            self.with_recesses_chance,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ConfigError::InvalidShapeConfig(
                "shape weights must be finite and non-negative".into(),
            ));
        }
        check_range("cutout_min_size", self.cutout_min_size, 0.0, 1.0)?;
        check_range("cutout_max_size", self.cutout_max_size, 0.0, 1.0)?;
        if self.cutout_min_size > self.cutout_max_size {
            return Err(ConfigError::InvalidShapeConfig(format!(
                "cutout_min_size {} exceeds cutout_max_size {}",
                self.cutout_min_size, self.cutout_max_size
            )));
        }
        if self.recess_count == 0 {
            return Err(ConfigError::InvalidShapeConfig("recess_count must be at least 1".into()));
        }
        Ok(())
    }
}

/// Full parameter block for one build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonParams {
    pub dungeon_width: u32,
    pub dungeon_length: u32,
    pub room_width_min: u32,
    pub room_length_min: u32,
    /// Depth cap of the partition tree
    pub max_iterations: u32,
    /// Requested corridor width; see [`DungeonParams::effective_corridor_width`]
    pub corridor_width: u32,
    /// Upper bound (as a fraction of the leaf) of the bottom-left inset, in [0, 0.3]
    pub room_bottom_corner_modifier: f32,
    /// Lower bound (as a fraction of the leaf) of the top-right corner, in [0.7, 1.0]
    pub room_top_corner_modifier: f32,
    /// Fixed margin between a leaf edge and its room, 0..=2
    pub room_offset: u32,
    pub seed: SeedChoice,
    pub corridor_strategy: CorridorStrategy,
    /// `None` keeps every room rectangular
    pub shapes: Option<RoomShapeConfig>,
}

impl Default for DungeonParams {
    fn default() -> Self {
        Self {
            dungeon_width: 100,
            dungeon_length: 100,
            room_width_min: 10,
            room_length_min: 10,
            max_iterations: 10,
            corridor_width: 5,
            room_bottom_corner_modifier: 0.1,
            room_top_corner_modifier: 0.9,
            room_offset: 1,
            seed: SeedChoice::Random,
            corridor_strategy: CorridorStrategy::ConnectionPoints,
            shapes: None,
        }
    }
}

impl DungeonParams {
    /// Defaults with a fixed seed
    pub fn with_seed(seed: u32) -> Self {
        Self {
            seed: SeedChoice::Fixed(seed),
            ..Self::default()
        }
    }

    /// Loads parameters from a JSON file and validates them
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&contents)?;
        params.validate()?;
        Ok(params)
    }

    /// Corridor width actually used for routing and rasterization
    pub fn effective_corridor_width(&self) -> i32 {
        self.corridor_width.max(MIN_CORRIDOR_WIDTH) as i32
    }

    /// Reject malformed parameters before any generation work
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cells = i32::try_from(self.dungeon_width)
            .ok()
            .zip(i32::try_from(self.dungeon_length).ok())
            .and_then(|(w, l)| w.checked_mul(l));
        if self.dungeon_width == 0 || self.dungeon_length == 0 || cells.is_none() {
            return Err(ConfigError::InvalidDimensions {
                width: self.dungeon_width,
                length: self.dungeon_length,
            });
        }
        if self.room_width_min < MIN_ROOM_DIMENSION || self.room_length_min < MIN_ROOM_DIMENSION {
            return Err(ConfigError::RoomTooSmall {
                width: self.room_width_min,
                length: self.room_length_min,
                min: MIN_ROOM_DIMENSION,
            });
        }
        if self.room_width_min > self.dungeon_width || self.room_length_min > self.dungeon_length {
            return Err(ConfigError::RoomExceedsDungeon {
                room_width: self.room_width_min,
                room_length: self.room_length_min,
                width: self.dungeon_width,
                length: self.dungeon_length,
            });
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        check_range("room_bottom_corner_modifier", self.room_bottom_corner_modifier, 0.0, 0.3)?;
        check_range("room_top_corner_modifier", self.room_top_corner_modifier, 0.7, 1.0)?;
        if self.room_offset > 2 {
            return Err(ConfigError::InvalidOffset(self.room_offset));
        }
        if let Some(shapes) = &self.shapes {
            shapes.validate()?;
        }
        Ok(())
    }
}

fn check_range(name: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { name, value, min, max })
    }
}
