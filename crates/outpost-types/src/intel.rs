//! Room intelligence written back by scout corps.
//!
//! Intel is the controller's memory of rooms it has no live vision into.
//! Resources recovered from intel get synthetic `intel-*` ids until a creep
//! regains vision and the host object id replaces them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coords::{RoomName, WorldPos};

/// A source observed by a scout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceIntel {
    /// Where the source sits.
    pub pos: WorldPos,
    /// Capacity per regeneration cycle at observation time.
    pub capacity: u32,
}

/// A controller observed by a scout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerIntel {
    /// Where the controller sits.
    pub pos: WorldPos,
    /// Owner username, if owned.
    pub owner: Option<String>,
    /// Reserving username, if reserved.
    pub reservation: Option<String>,
    /// Controller level at observation time.
    pub level: u8,
}

/// Everything a scout records about one room visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomIntel {
    /// The room visited.
    pub room: RoomName,
    /// Sources seen.
    pub sources: Vec<SourceIntel>,
    /// Controller seen, if the room has one.
    pub controller: Option<ControllerIntel>,
    /// Hostile creeps counted during the visit.
    pub hostile_count: u32,
    /// Tick of the visit.
    pub gathered_at: u64,
    /// Wall-clock time of the visit, for export tooling.
    pub gathered_time: DateTime<Utc>,
}

impl RoomIntel {
    /// Synthetic resource id for an intel-recovered object at `pos`.
    pub fn synthetic_id(pos: &WorldPos) -> String {
        format!("intel-{}-{}-{}", pos.room, pos.x, pos.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_ids_are_positional() {
        let pos = WorldPos::new("W2N3", 14, 41);
        assert_eq!(RoomIntel::synthetic_id(&pos), "intel-W2N3-14-41");
    }
}
