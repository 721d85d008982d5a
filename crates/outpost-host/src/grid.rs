//! [`GridHost`]: a deterministic in-memory host for tests and the binary.
//!
//! The grid host models exactly as much of an engine as the controller can
//! observe through the [`Host`] trait: terrain, exits between declared
//! rooms, spawn energy accounting, source regeneration, and creep lifetimes.
//! Movement is resolved instantly -- travel costs are modeled by the
//! planner's distance math, not simulated tile-by-tile here.
//!
//! Rooms are laid out on a lattice by parsing their compass-quadrant names,
//! so `W1N1` and `W2N1` are automatically adjacent. Room borders are walls
//! except for a carved exit band wherever a declared neighbor exists.

use std::collections::BTreeMap;

use tracing::debug;

use outpost_types::{
    Body, CreepName, CreepRole, Direction, ResourceId, ResourceKind, ResourceRecord, RoomName,
    Terrain, WorldPos, CREEP_LIFE_TIME, ENERGY_REGEN_TIME, ROOM_SIZE,
};

use crate::engine::{Host, HostCode};

/// Ticks of spawn occupancy per body part.
const SPAWN_TICKS_PER_PART: u64 = 3;

/// Exit band carved into a border shared with a declared neighbor.
const EXIT_BAND: core::ops::Range<u8> = 20..30;

// ---------------------------------------------------------------------------
// Room and creep records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct RoomData {
    terrain: Vec<Terrain>,
    objects: BTreeMap<ResourceId, ResourceRecord>,
    source_energy: BTreeMap<ResourceId, u32>,
    spawn_energy: u32,
    spawn_energy_capacity: u32,
    spawn_busy_until: u64,
    construction_sites: u32,
    owned: bool,
}

impl RoomData {
    fn filled(fill: Terrain) -> Self {
        Self {
            terrain: vec![fill; usize::from(ROOM_SIZE) * usize::from(ROOM_SIZE)],
            objects: BTreeMap::new(),
            source_energy: BTreeMap::new(),
            spawn_energy: 0,
            spawn_energy_capacity: 0,
            spawn_busy_until: 0,
            construction_sites: 0,
            owned: false,
        }
    }
}

#[derive(Debug, Clone)]
struct CreepData {
    role: CreepRole,
    body: Body,
    ttl: u32,
    pos: WorldPos,
}

// ---------------------------------------------------------------------------
// GridHost
// ---------------------------------------------------------------------------

/// A deterministic in-memory implementation of [`Host`].
#[derive(Debug, Default)]
pub struct GridHost {
    tick: u64,
    rooms: BTreeMap<RoomName, RoomData>,
    creeps: BTreeMap<CreepName, CreepData>,
    /// Spawn energy regained per tick, modeling refill logistics the
    /// offline harness does not simulate creep-by-creep.
    pub energy_recharge: u32,
}

impl GridHost {
    /// Create an empty world.
    pub fn new() -> Self {
        Self {
            tick: 0,
            rooms: BTreeMap::new(),
            creeps: BTreeMap::new(),
            energy_recharge: 1,
        }
    }

    /// Add a room filled with plain terrain and walled borders. Exits are
    /// carved later by [`carve_exits`] once all neighbors are declared.
    ///
    /// [`carve_exits`]: GridHost::carve_exits
    pub fn add_open_room(&mut self, room: impl Into<RoomName>) {
        let room = room.into();
        let mut data = RoomData::filled(Terrain::Plain);
        let last = ROOM_SIZE - 1;
        for i in 0..ROOM_SIZE {
            Self::set(&mut data, i, 0, Terrain::Wall);
            Self::set(&mut data, i, last, Terrain::Wall);
            Self::set(&mut data, 0, i, Terrain::Wall);
            Self::set(&mut data, last, i, Terrain::Wall);
        }
        self.rooms.insert(room, data);
    }

    /// Add a room filled entirely with the given terrain (tests carve the
    /// shapes they need afterwards).
    pub fn add_filled_room(&mut self, room: impl Into<RoomName>, fill: Terrain) {
        self.rooms.insert(room.into(), RoomData::filled(fill));
    }

    /// Open an exit band on every border shared with a declared neighbor.
    pub fn carve_exits(&mut self) {
        let names: Vec<RoomName> = self.rooms.keys().cloned().collect();
        for room in &names {
            for (dir, neighbor) in Self::lattice_neighbors(room) {
                if !self.rooms.contains_key(&neighbor) {
                    continue;
                }
                let Some(data) = self.rooms.get_mut(room) else {
                    continue;
                };
                let last = ROOM_SIZE - 1;
                for i in EXIT_BAND {
                    match dir {
                        Direction::Top => Self::set(data, i, 0, Terrain::Plain),
                        Direction::Bottom => Self::set(data, i, last, Terrain::Plain),
                        Direction::Left => Self::set(data, 0, i, Terrain::Plain),
                        Direction::Right => Self::set(data, last, i, Terrain::Plain),
                    }
                }
            }
        }
    }

    /// Overwrite the terrain of a single tile.
    pub fn set_terrain(&mut self, pos: &WorldPos, terrain: Terrain) {
        if let Some(data) = self.rooms.get_mut(&pos.room) {
            Self::set(data, pos.x, pos.y, terrain);
        }
    }

    /// Place a source. Returns its deterministic id.
    pub fn add_source(&mut self, room: impl Into<RoomName>, x: u8, y: u8, capacity: u32) -> ResourceId {
        let room = room.into();
        let pos = WorldPos { room: room.clone(), x, y };
        let id = ResourceId::new(format!("src-{}-{}-{}", pos.room, x, y));
        if let Some(data) = self.rooms.get_mut(&room) {
            data.objects.insert(
                id.clone(),
                ResourceRecord::new(
                    id.clone(),
                    pos,
                    ResourceKind::Source {
                        capacity,
                        regen_ticks: ENERGY_REGEN_TIME,
                    },
                ),
            );
            data.source_energy.insert(id.clone(), capacity);
        }
        id
    }

    /// Place a controller. Returns its deterministic id.
    pub fn add_controller(
        &mut self,
        room: impl Into<RoomName>,
        x: u8,
        y: u8,
        level: u8,
        owned: bool,
    ) -> ResourceId {
        let room = room.into();
        let pos = WorldPos { room: room.clone(), x, y };
        let id = ResourceId::new(format!("ctl-{}", pos.room));
        if let Some(data) = self.rooms.get_mut(&room) {
            data.objects.insert(
                id.clone(),
                ResourceRecord::new(id.clone(), pos, ResourceKind::Controller { level, owned }),
            );
            data.owned = data.owned || owned;
        }
        id
    }

    /// Place a spawn with the given room energy capacity. Returns its id.
    pub fn add_spawn(
        &mut self,
        room: impl Into<RoomName>,
        x: u8,
        y: u8,
        energy_capacity: u32,
    ) -> ResourceId {
        let room = room.into();
        let pos = WorldPos { room: room.clone(), x, y };
        let id = ResourceId::new(format!("spawn-{}", pos.room));
        if let Some(data) = self.rooms.get_mut(&room) {
            data.objects.insert(
                id.clone(),
                ResourceRecord::new(id.clone(), pos, ResourceKind::Spawn { energy_capacity }),
            );
            data.spawn_energy = energy_capacity;
            data.spawn_energy_capacity = energy_capacity;
        }
        id
    }

    /// Set the number of construction sites reported for a room.
    pub fn set_construction_sites(&mut self, room: &RoomName, count: u32) {
        if let Some(data) = self.rooms.get_mut(room) {
            data.construction_sites = count;
        }
    }

    /// Advance the world one tick: refill sources on the regen cadence,
    /// recharge spawn energy, age creeps, and remove the dead.
    pub fn step(&mut self) {
        self.tick += 1;
        for data in self.rooms.values_mut() {
            if self.tick % u64::from(ENERGY_REGEN_TIME) == 0 {
                for (id, energy) in &mut data.source_energy {
                    if let Some(ResourceKind::Source { capacity, .. }) =
                        data.objects.get(id).map(|record| &record.kind)
                    {
                        *energy = *capacity;
                    }
                }
            }
            data.spawn_energy =
                (data.spawn_energy + self.energy_recharge).min(data.spawn_energy_capacity);
        }
        let mut dead = Vec::new();
        for (name, creep) in &mut self.creeps {
            creep.ttl = creep.ttl.saturating_sub(1);
            if creep.ttl == 0 {
                dead.push(name.clone());
            }
        }
        for name in dead {
            debug!(creep = %name, "creep expired");
            self.creeps.remove(&name);
        }
    }

    /// Count live creeps of a role, for assertions.
    pub fn creep_count(&self, role: CreepRole) -> usize {
        self.creeps.values().filter(|c| c.role == role).count()
    }

    /// Remaining energy of a source, for assertions.
    pub fn source_energy(&self, source: &ResourceId) -> Option<u32> {
        self.rooms
            .values()
            .find_map(|data| data.source_energy.get(source).copied())
    }

    fn set(data: &mut RoomData, x: u8, y: u8, terrain: Terrain) {
        let idx = usize::from(y) * usize::from(ROOM_SIZE) + usize::from(x);
        if let Some(slot) = data.terrain.get_mut(idx) {
            *slot = terrain;
        }
    }

    fn lattice_neighbors(room: &RoomName) -> Vec<(Direction, RoomName)> {
        let Some((gx, gy)) = room.grid_coords() else {
            return Vec::new();
        };
        Direction::ALL
            .iter()
            .map(|&dir| {
                let (dx, dy) = dir.offset();
                (dir, room_name_at(gx + dx, gy + dy))
            })
            .collect()
    }
}

/// Compose the compass-quadrant name of the room at absolute grid `(x, y)`.
fn room_name_at(x: i32, y: i32) -> RoomName {
    let h = if x >= 0 {
        format!("E{x}")
    } else {
        format!("W{}", -1 - x)
    };
    let v = if y >= 0 {
        format!("S{y}")
    } else {
        format!("N{}", -1 - y)
    };
    RoomName::new(format!("{h}{v}"))
}

impl Host for GridHost {
    fn terrain(&self, pos: &WorldPos) -> Terrain {
        let Some(data) = self.rooms.get(&pos.room) else {
            return Terrain::Wall;
        };
        let idx = usize::from(pos.y) * usize::from(ROOM_SIZE) + usize::from(pos.x);
        data.terrain.get(idx).copied().unwrap_or(Terrain::Wall)
    }

    fn time(&self) -> u64 {
        self.tick
    }

    fn exits(&self, room: &RoomName) -> BTreeMap<Direction, RoomName> {
        Self::lattice_neighbors(room)
            .into_iter()
            .filter(|(_, neighbor)| self.rooms.contains_key(neighbor))
            .collect()
    }

    fn owned_rooms(&self) -> Vec<RoomName> {
        self.rooms
            .iter()
            .filter(|(_, data)| data.owned)
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn room_objects(&self, room: &RoomName) -> Vec<ResourceRecord> {
        self.rooms
            .get(room)
            .map(|data| data.objects.values().cloned().collect())
            .unwrap_or_default()
    }

    fn spawn_energy(&self, room: &RoomName) -> (u32, u32) {
        self.rooms
            .get(room)
            .map(|data| (data.spawn_energy, data.spawn_energy_capacity))
            .unwrap_or((0, 0))
    }

    fn construction_sites(&self, room: &RoomName) -> u32 {
        self.rooms.get(room).map_or(0, |data| data.construction_sites)
    }

    fn creep_exists(&self, name: &CreepName) -> bool {
        self.creeps.contains_key(name)
    }

    fn creep_ttl(&self, name: &CreepName) -> Option<u32> {
        self.creeps.get(name).map(|c| c.ttl)
    }

    fn spawn_creep(
        &mut self,
        spawn: &ResourceId,
        body: &Body,
        name: &CreepName,
        role: CreepRole,
    ) -> HostCode {
        let Some((room, pos)) = self.rooms.iter().find_map(|(room, data)| {
            data.objects
                .get(spawn)
                .map(|record| (room.clone(), record.pos.clone()))
        }) else {
            return HostCode::InvalidTarget;
        };
        let Some(data) = self.rooms.get_mut(&room) else {
            return HostCode::InvalidTarget;
        };
        if data.spawn_busy_until > self.tick {
            return HostCode::Busy;
        }
        let cost = body.cost();
        if cost > data.spawn_energy || !body.is_spawnable() {
            return HostCode::NotEnoughEnergy;
        }
        data.spawn_energy -= cost;
        data.spawn_busy_until = self.tick + u64::from(body.len()) * SPAWN_TICKS_PER_PART;
        self.creeps.insert(
            name.clone(),
            CreepData {
                role,
                body: body.clone(),
                ttl: CREEP_LIFE_TIME,
                pos,
            },
        );
        debug!(creep = %name, %role, cost, "spawned");
        HostCode::Ok
    }

    fn move_creep(&mut self, creep: &CreepName, target: &WorldPos) -> HostCode {
        match self.creeps.get_mut(creep) {
            Some(data) => {
                data.pos = target.clone();
                HostCode::Ok
            }
            None => HostCode::InvalidTarget,
        }
    }

    fn harvest(&mut self, creep: &CreepName, source: &ResourceId) -> HostCode {
        let Some(creep_data) = self.creeps.get(creep) else {
            return HostCode::InvalidTarget;
        };
        let power = creep_data.body.count(outpost_types::Part::Work)
            * outpost_types::HARVEST_POWER;
        for data in self.rooms.values_mut() {
            if let Some(energy) = data.source_energy.get_mut(source) {
                if *energy == 0 {
                    return HostCode::NotEnoughEnergy;
                }
                *energy = energy.saturating_sub(power);
                return HostCode::Ok;
            }
        }
        HostCode::InvalidTarget
    }

    fn transfer(&mut self, creep: &CreepName, target: &ResourceId, _quantity: u32) -> HostCode {
        if !self.creeps.contains_key(creep) {
            return HostCode::InvalidTarget;
        }
        let exists = self
            .rooms
            .values()
            .any(|data| data.objects.contains_key(target));
        if exists { HostCode::Ok } else { HostCode::InvalidTarget }
    }

    fn upgrade(&mut self, creep: &CreepName, controller: &ResourceId) -> HostCode {
        if !self.creeps.contains_key(creep) {
            return HostCode::InvalidTarget;
        }
        let exists = self
            .rooms
            .values()
            .any(|data| data.objects.contains_key(controller));
        if exists { HostCode::Ok } else { HostCode::InvalidTarget }
    }

    fn build(&mut self, creep: &CreepName, _site: &ResourceId) -> HostCode {
        if !self.creeps.contains_key(creep) {
            return HostCode::InvalidTarget;
        }
        HostCode::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_owned_room(host: &mut GridHost) -> (ResourceId, ResourceId) {
        host.add_open_room("W1N1");
        let spawn = host.add_spawn("W1N1", 25, 25, 550);
        let source = host.add_source("W1N1", 10, 10, 1500);
        host.add_controller("W1N1", 40, 40, 2, true);
        (spawn, source)
    }

    #[test]
    fn open_room_has_walled_border() {
        let mut host = GridHost::new();
        host.add_open_room("W1N1");
        assert_eq!(host.terrain(&WorldPos::new("W1N1", 0, 10)), Terrain::Wall);
        assert_eq!(host.terrain(&WorldPos::new("W1N1", 25, 25)), Terrain::Plain);
        // Unknown rooms read as solid wall.
        assert_eq!(host.terrain(&WorldPos::new("W9N9", 25, 25)), Terrain::Wall);
    }

    #[test]
    fn exits_follow_the_lattice() {
        let mut host = GridHost::new();
        host.add_open_room("W1N1");
        host.add_open_room("W2N1");
        host.carve_exits();
        let exits = host.exits(&RoomName::from("W1N1"));
        assert_eq!(exits.get(&Direction::Left), Some(&RoomName::from("W2N1")));
        assert_eq!(exits.len(), 1);
        // The shared border is open in the exit band.
        assert_eq!(host.terrain(&WorldPos::new("W1N1", 0, 25)), Terrain::Plain);
    }

    #[test]
    fn spawning_consumes_energy_and_occupies_spawn() {
        let mut host = GridHost::new();
        let (spawn, _) = make_owned_room(&mut host);
        let body = Body::from_counts(2, 1, 2);
        let name = CreepName::from("miner-1");
        assert_eq!(
            host.spawn_creep(&spawn, &body, &name, CreepRole::Miner),
            HostCode::Ok
        );
        assert!(host.creep_exists(&name));
        assert_eq!(host.spawn_energy(&RoomName::from("W1N1")).0, 550 - 350);
        // Occupied until the body finishes.
        assert_eq!(
            host.spawn_creep(&spawn, &body, &CreepName::from("miner-2"), CreepRole::Miner),
            HostCode::Busy
        );
    }

    #[test]
    fn sources_regenerate_on_cadence() {
        let mut host = GridHost::new();
        let (spawn, source) = make_owned_room(&mut host);
        let name = CreepName::from("miner-1");
        let _ = host.spawn_creep(&spawn, &Body::from_counts(5, 0, 3), &name, CreepRole::Miner);
        for _ in 0..10 {
            let _ = host.harvest(&name, &source);
        }
        assert_eq!(host.source_energy(&source), Some(1500 - 100));
        for _ in 0..300 {
            host.step();
        }
        assert_eq!(host.source_energy(&source), Some(1500));
    }

    #[test]
    fn creeps_expire() {
        let mut host = GridHost::new();
        let (spawn, _) = make_owned_room(&mut host);
        let name = CreepName::from("scout-1");
        let _ = host.spawn_creep(&spawn, &Body::from_counts(0, 0, 1), &name, CreepRole::Scout);
        for _ in 0..u64::from(CREEP_LIFE_TIME) {
            host.step();
        }
        assert!(!host.creep_exists(&name));
    }
}
