//! Glyphs for printing a dungeon grid
//!
//! Supports both classic ASCII and Unicode block characters.

use dg_core::dungeon::{CellKind, Grid};
use strum::{Display, EnumString, VariantNames};

/// Available graphics modes for map output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, VariantNames, Default)]
#[strum(serialize_all = "lowercase")]
pub enum GraphicsMode {
    /// Classic ASCII characters.
    Classic,
    /// Unicode block characters.
    Fancy,
    /// Automatically detect support.
    #[default]
    Auto,
}

/// Set of glyphs used for rendering map cells.
pub trait GlyphSet: Send + Sync {
    fn cell_char(&self, kind: CellKind) -> char;
}

/// One ASCII character per cell kind.
pub struct ClassicGlyphs;

impl GlyphSet for ClassicGlyphs {
    fn cell_char(&self, kind: CellKind) -> char {
        kind.symbol()
    }
}

/// Unicode shading glyph set.
pub struct FancyGlyphs;

impl GlyphSet for FancyGlyphs {
    fn cell_char(&self, kind: CellKind) -> char {
        match kind {
            CellKind::Empty => ' ',
            CellKind::Floor => '·',
            CellKind::Wall => '█',
            CellKind::Corridor => '░',
            CellKind::Door => '+',
        }
    }
}

/// Detect if the terminal supports Unicode/UTF-8.
pub fn supports_unicode() -> bool {
    for var in ["LC_ALL", "LC_CTYPE", "LANG"] {
        if let Ok(val) = std::env::var(var) {
            let val = val.to_uppercase();
            if val.contains("UTF-8") || val.contains("UTF8") {
                return true;
            }
        }
    }
    false
}

/// Returns the best available glyph set for the current environment.
pub fn detect_glyph_set(mode: GraphicsMode) -> Box<dyn GlyphSet> {
    match mode {
        GraphicsMode::Classic => Box::new(ClassicGlyphs),
        GraphicsMode::Fancy => Box::new(FancyGlyphs),
        GraphicsMode::Auto => {
            if supports_unicode() {
                Box::new(FancyGlyphs)
            } else {
                Box::new(ClassicGlyphs)
            }
        }
    }
}

/// Render the grid top row first, one line per row, trailing blanks trimmed
pub fn render_map(grid: &Grid, glyphs: &dyn GlyphSet) -> String {
    let mut out = String::new();
    for y in (0..grid.length()).rev() {
        let line: String = (0..grid.width())
            .map(|x| grid.kind_at(x, y).map_or(' ', |k| glyphs.cell_char(k)))
            .collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
