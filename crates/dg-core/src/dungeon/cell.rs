//! Map cell types

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::RoomId;

/// Cell/terrain type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum CellKind {
    #[default]
    Empty = 0,
    Floor = 1,
    Wall = 2,
    Corridor = 3,
    Door = 4,
}

impl CellKind {
    /// Check if this is passable space (Floor, Corridor, Door)
    pub const fn is_walkable(&self) -> bool {
        matches!(self, CellKind::Floor | CellKind::Corridor | CellKind::Door)
    }

    /// Get the display character for this cell type
    pub const fn symbol(&self) -> char {
        match self {
            CellKind::Empty => ' ',
            CellKind::Floor => '.',
            CellKind::Wall => '#',
            CellKind::Corridor => ',',
            CellKind::Door => '+',
        }
    }
}

/// A single map cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    /// Terrain type
    pub kind: CellKind,

    /// Owning room, only ever set on Floor cells
    pub room: Option<RoomId>,

    /// Claimed by a decoration or spawned object
    pub occupied: bool,
}

impl Cell {
    /// Create a new empty cell
    pub const fn empty() -> Self {
        Self {
            kind: CellKind::Empty,
            room: None,
            occupied: false,
        }
    }

    /// Check if walkable
    pub const fn is_walkable(&self) -> bool {
        self.kind.is_walkable()
    }

    /// Check if this is floor belonging to `room`
    pub fn is_floor_of(&self, room: RoomId) -> bool {
        self.kind == CellKind::Floor && self.room == Some(room)
    }
}
