//! Command-line arguments
//!
//! Flags override whatever the parameter file (or the defaults) say.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use dg_core::{ConfigError, CorridorStrategy, DungeonParams, RoomShapeConfig, SeedChoice};
use log::LevelFilter;

use crate::display::GraphicsMode;

/// Seeded BSP dungeon generator
#[derive(Parser, Debug)]
#[command(name = "dungeon-gen")]
#[command(author, version, about = "Generate a dungeon layout from a seed", long_about = None)]
pub struct Args {
    /// Seed (a random one is drawn and reported when omitted)
    #[arg(short, long)]
    pub seed: Option<u32>,

    /// JSON parameter file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Dungeon width in cells
    #[arg(short = 'W', long)]
    pub width: Option<u32>,

    /// Dungeon length in cells
    #[arg(short = 'L', long)]
    pub length: Option<u32>,

    /// Minimum room width
    #[arg(long)]
    pub room_width_min: Option<u32>,

    /// Minimum room length
    #[arg(long)]
    pub room_length_min: Option<u32>,

    /// Partition depth cap
    #[arg(short = 'i', long)]
    pub max_iterations: Option<u32>,

    /// Corridor width (never below 5)
    #[arg(long)]
    pub corridor_width: Option<u32>,

    /// Reshape rooms with the default shape weights
    #[arg(long)]
    pub shapes: bool,

    /// Corridor router
    #[arg(long, value_enum)]
    pub strategy: Option<Strategy>,

    /// Map glyphs (classic, fancy, auto)
    #[arg(short, long, default_value_t = GraphicsMode::Auto)]
    pub graphics: GraphicsMode,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Do not print the map
    #[arg(long)]
    pub no_map: bool,

    /// More log output (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    ConnectionPoints,
    BoundingBox,
}

impl From<Strategy> for CorridorStrategy {
    fn from(s: Strategy) -> Self {
        match s {
            Strategy::ConnectionPoints => CorridorStrategy::ConnectionPoints,
            Strategy::BoundingBox => CorridorStrategy::BoundingBox,
        }
    }
}

impl Args {
    /// Resolve the parameter block: file or defaults, then flag overrides
    pub fn params(&self) -> Result<DungeonParams, ConfigError> {
        let mut params = match &self.config {
            Some(path) => DungeonParams::from_json_file(path)?,
            None => DungeonParams::default(),
        };

        if let Some(seed) = self.seed {
            params.seed = SeedChoice::Fixed(seed);
        }
        if let Some(width) = self.width {
            params.dungeon_width = width;
        }
        if let Some(length) = self.length {
            params.dungeon_length = length;
        }
        if let Some(w) = self.room_width_min {
            params.room_width_min = w;
        }
        if let Some(l) = self.room_length_min {
            params.room_length_min = l;
        }
        if let Some(n) = self.max_iterations {
            params.max_iterations = n;
        }
        if let Some(w) = self.corridor_width {
            params.corridor_width = w;
        }
        if let Some(strategy) = self.strategy {
            params.corridor_strategy = strategy.into();
        }
        if self.shapes && params.shapes.is_none() {
            params.shapes = Some(RoomShapeConfig::default());
        }

        params.validate()?;
        Ok(params)
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
