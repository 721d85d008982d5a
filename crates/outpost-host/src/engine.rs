//! The [`Host`] trait: everything the controller expects its engine to do.
//!
//! The contract is deliberately narrow. Terrain and exits are pure lookups;
//! time is a nondecreasing integer; spawning and creep commands are atomic
//! per-tick requests whose results the core reads only as success or a
//! retryable failure code. Anything richer (pathfinding, per-creep state
//! machines, visuals) belongs to the host, not the controller.

use std::collections::BTreeMap;

use outpost_types::{
    Body, CreepName, CreepRole, Direction, ResourceId, ResourceRecord, RoomName, Terrain,
    WorldPos,
};

/// Result code of a host command.
///
/// Ephemeral failures (`Busy`, `NotEnoughEnergy`, `InvalidTarget`) are
/// handled locally by the issuing corp: retry next tick, no propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum HostCode {
    /// The command was accepted.
    Ok,
    /// Not enough energy to satisfy the command this tick.
    NotEnoughEnergy,
    /// The target structure is occupied with an earlier command.
    Busy,
    /// The named target does not exist or is out of range.
    InvalidTarget,
}

impl HostCode {
    /// Whether the command was accepted.
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// The host-engine contract.
///
/// Implementations must keep `terrain` and `exits` deterministic and pure,
/// and `time` monotonically nondecreasing.
pub trait Host {
    /// Terrain of a world tile. Deterministic and pure.
    fn terrain(&self, pos: &WorldPos) -> Terrain;

    /// Current tick.
    fn time(&self) -> u64;

    /// Adjacent rooms by exit direction.
    fn exits(&self, room: &RoomName) -> BTreeMap<Direction, RoomName>;

    /// Rooms we own a controller in.
    fn owned_rooms(&self) -> Vec<RoomName>;

    /// Live objects visible in a room: sources, controller, spawns,
    /// containers, storage. Empty when the room is out of vision.
    fn room_objects(&self, room: &RoomName) -> Vec<ResourceRecord>;

    /// Spawn energy `(available, capacity)` for a room.
    fn spawn_energy(&self, room: &RoomName) -> (u32, u32);

    /// Number of active construction sites in a room.
    fn construction_sites(&self, room: &RoomName) -> u32;

    /// Whether a creep with this name is alive.
    fn creep_exists(&self, name: &CreepName) -> bool;

    /// Remaining ticks-to-live of a creep, if alive.
    fn creep_ttl(&self, name: &CreepName) -> Option<u32>;

    /// Atomically spawn a body. `Ok` consumes energy equal to the body cost.
    fn spawn_creep(
        &mut self,
        spawn: &ResourceId,
        body: &Body,
        name: &CreepName,
        role: CreepRole,
    ) -> HostCode;

    /// Ask a creep to move toward a tile this tick.
    fn move_creep(&mut self, creep: &CreepName, target: &WorldPos) -> HostCode;

    /// Ask a creep to harvest a source this tick.
    fn harvest(&mut self, creep: &CreepName, source: &ResourceId) -> HostCode;

    /// Ask a creep to transfer energy to a target this tick.
    fn transfer(&mut self, creep: &CreepName, target: &ResourceId, quantity: u32) -> HostCode;

    /// Ask a creep to upgrade a controller this tick.
    fn upgrade(&mut self, creep: &CreepName, controller: &ResourceId) -> HostCode;

    /// Ask a creep to work a construction site this tick.
    fn build(&mut self, creep: &CreepName, site: &ResourceId) -> HostCode;

    /// Optional room visual. No semantic effect; default is a no-op.
    fn draw_text(&mut self, _pos: &WorldPos, _text: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes() {
        assert!(HostCode::Ok.is_ok());
        assert!(!HostCode::Busy.is_ok());
        assert!(!HostCode::NotEnoughEnergy.is_ok());
    }
}
