//! Dungeon generator
//!
//! Builds one dungeon, prints its map and a summary.

use clap::Parser;
use simplelog::LevelFilter;

use dg_cli::{Args, detect_glyph_set, render_map};
use dg_core::generate_dungeon;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    simplelog::TermLogger::init(
        args.log_level(),
        simplelog::ConfigBuilder::new()
            .set_target_level(LevelFilter::Off)
            .set_location_level(LevelFilter::Off)
            .build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let params = args.params()?;
    let dungeon = generate_dungeon(&params)?;

    if !args.no_map {
        let glyphs = detect_glyph_set(args.graphics);
        print!("{}", render_map(&dungeon.grid, glyphs.as_ref()));
    }

    let report = dungeon.report();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
