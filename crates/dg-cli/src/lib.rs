//! dg-cli: command-line front end for dg-core
//!
//! Argument parsing and map rendering for the `dungeon-gen` binary.

pub mod args;
pub mod display;

pub use args::{Args, Strategy};
pub use display::{GraphicsMode, detect_glyph_set, render_map};
