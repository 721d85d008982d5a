//! Terrain classification and movement costs.

use serde::{Deserialize, Serialize};

/// Movement cost of a tile carrying a road, regardless of the terrain under
/// it. Road is a derived per-tile bit, not a terrain kind.
pub const ROAD_MOVE_COST: u32 = 1;

/// The terrain of a single world tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Terrain {
    /// Impassable.
    Wall,
    /// Ordinary ground.
    Plain,
    /// Slow ground.
    Swamp,
}

impl Terrain {
    /// Movement cost of the bare tile, or `None` for walls.
    pub const fn move_cost(self) -> Option<u32> {
        match self {
            Self::Wall => None,
            Self::Plain => Some(2),
            Self::Swamp => Some(10),
        }
    }

    /// Whether the tile blocks movement entirely.
    pub const fn is_wall(self) -> bool {
        matches!(self, Self::Wall)
    }
}
