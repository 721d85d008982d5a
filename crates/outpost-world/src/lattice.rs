//! [`RoomLattice`]: absolute embedding of the analyzed room set.
//!
//! Cross-room BFS needs one coordinate plane, but the host only provides
//! per-room tiles and an exit map. The lattice assigns every analyzed room
//! an integer grid offset by walking exits breadth-first from the start
//! set, so a world tile embeds as `offset * 50 + local`. Disconnected
//! start rooms are placed far apart on synthetic origins so their absolute
//! coordinates can never collide.

use std::collections::{BTreeMap, VecDeque};

use outpost_host::Host;
use outpost_types::{RoomName, WorldPos, ROOM_SIZE};

/// Gap between synthetic origins of disconnected analysis islands, in
/// rooms. Large enough that no capped analysis can bridge it.
const ISLAND_STRIDE: i32 = 1_000;

/// Absolute embedding of a set of rooms reachable through exits.
#[derive(Debug, Clone, Default)]
pub struct RoomLattice {
    offsets: BTreeMap<RoomName, (i32, i32)>,
    by_offset: BTreeMap<(i32, i32), RoomName>,
}

impl RoomLattice {
    /// Build a lattice by BFS over exits from `start_rooms`, visiting at
    /// most `max_rooms` rooms. An empty start set yields an empty lattice.
    pub fn build(host: &dyn Host, start_rooms: &[RoomName], max_rooms: usize) -> Self {
        let mut lattice = Self::default();
        let mut queue: VecDeque<RoomName> = VecDeque::new();
        let mut island = 0i32;

        for start in start_rooms {
            if lattice.offsets.contains_key(start) || lattice.offsets.len() >= max_rooms {
                continue;
            }
            // Prefer the room's own grid coordinates so ids stay stable
            // across analyses; fall back to a synthetic island origin.
            let origin = start
                .grid_coords()
                .unwrap_or((island * ISLAND_STRIDE, island * ISLAND_STRIDE));
            island += 1;
            if !lattice.try_insert(start.clone(), origin) {
                continue;
            }
            queue.push_back(start.clone());

            while let Some(room) = queue.pop_front() {
                if lattice.offsets.len() >= max_rooms {
                    break;
                }
                let Some(&(rx, ry)) = lattice.offsets.get(&room) else {
                    continue;
                };
                for (dir, neighbor) in host.exits(&room) {
                    if lattice.offsets.len() >= max_rooms {
                        break;
                    }
                    if lattice.offsets.contains_key(&neighbor) {
                        continue;
                    }
                    let (dx, dy) = dir.offset();
                    if lattice.try_insert(neighbor.clone(), (rx + dx, ry + dy)) {
                        queue.push_back(neighbor);
                    }
                }
            }
        }
        lattice
    }

    fn try_insert(&mut self, room: RoomName, offset: (i32, i32)) -> bool {
        if self.by_offset.contains_key(&offset) {
            return false;
        }
        self.by_offset.insert(offset, room.clone());
        self.offsets.insert(room, offset);
        true
    }

    /// Whether the lattice contains a room.
    pub fn contains(&self, room: &RoomName) -> bool {
        self.offsets.contains_key(room)
    }

    /// Number of rooms in the lattice.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Whether the lattice is empty.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// The analyzed rooms, in sorted order.
    pub fn rooms(&self) -> impl Iterator<Item = &RoomName> {
        self.offsets.keys()
    }

    /// Absolute coordinates of a tile, if its room is in the lattice.
    pub fn to_abs(&self, pos: &WorldPos) -> Option<(i32, i32)> {
        let &(rx, ry) = self.offsets.get(&pos.room)?;
        Some((
            rx * i32::from(ROOM_SIZE) + i32::from(pos.x),
            ry * i32::from(ROOM_SIZE) + i32::from(pos.y),
        ))
    }

    /// The tile at absolute coordinates, if its room is in the lattice.
    pub fn from_abs(&self, x: i32, y: i32) -> Option<WorldPos> {
        let size = i32::from(ROOM_SIZE);
        let (rx, lx) = (x.div_euclid(size), x.rem_euclid(size));
        let (ry, ly) = (y.div_euclid(size), y.rem_euclid(size));
        let room = self.by_offset.get(&(rx, ry))?;
        Some(WorldPos {
            room: room.clone(),
            x: lx as u8,
            y: ly as u8,
        })
    }

    /// Manhattan distance between two rooms' lattice offsets, if both are
    /// present. Used to estimate rooms crossed on a fallback path.
    pub fn room_distance(&self, a: &RoomName, b: &RoomName) -> Option<u32> {
        let &(ax, ay) = self.offsets.get(a)?;
        let &(bx, by) = self.offsets.get(b)?;
        Some((ax - bx).unsigned_abs() + (ay - by).unsigned_abs())
    }
}

/// The 3×3 analysis box around a room: the room itself plus everything
/// reachable within two exit hops that stays within Chebyshev distance 1
/// of it on the lattice. At most 9 rooms.
pub fn analysis_box(host: &dyn Host, center: &RoomName) -> Vec<RoomName> {
    let lattice = RoomLattice::build(host, core::slice::from_ref(center), 25);
    let Some(&(cx, cy)) = lattice.offsets.get(center) else {
        return vec![center.clone()];
    };
    lattice
        .offsets
        .iter()
        .filter(|&(_, &(x, y))| (x - cx).abs() <= 1 && (y - cy).abs() <= 1)
        .map(|(room, _)| room.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use outpost_host::GridHost;
    use outpost_types::Terrain;

    use super::*;

    fn three_rooms() -> GridHost {
        let mut host = GridHost::new();
        host.add_open_room("W2N1");
        host.add_open_room("W1N1");
        host.add_open_room("W1N2");
        host.carve_exits();
        host
    }

    #[test]
    fn embeds_connected_rooms_on_one_plane() {
        let host = three_rooms();
        let lattice = RoomLattice::build(&host, &[RoomName::from("W1N1")], 9);
        assert_eq!(lattice.len(), 3);
        let a = lattice.to_abs(&WorldPos::new("W1N1", 0, 0));
        let b = lattice.to_abs(&WorldPos::new("W2N1", 49, 0));
        // W2N1 sits directly west: its x=49 column abuts W1N1's x=0.
        assert!(a.is_some());
        assert!(b.is_some());
        let (ax, ay) = a.unwrap_or((0, 0));
        let (bx, by) = b.unwrap_or((0, 0));
        assert_eq!(ax - bx, 1);
        assert_eq!(ay, by);
    }

    #[test]
    fn abs_round_trips() {
        let host = three_rooms();
        let lattice = RoomLattice::build(&host, &[RoomName::from("W1N1")], 9);
        let pos = WorldPos::new("W1N2", 7, 42);
        let (x, y) = lattice.to_abs(&pos).unwrap_or((0, 0));
        assert_eq!(lattice.from_abs(x, y), Some(pos));
    }

    #[test]
    fn respects_the_room_cap() {
        let host = three_rooms();
        let lattice = RoomLattice::build(&host, &[RoomName::from("W1N1")], 2);
        assert_eq!(lattice.len(), 2);
    }

    #[test]
    fn empty_start_set_is_empty() {
        let host = three_rooms();
        let lattice = RoomLattice::build(&host, &[], 9);
        assert!(lattice.is_empty());
    }

    #[test]
    fn analysis_box_is_bounded() {
        let mut host = GridHost::new();
        // A 5-wide strip of rooms; the box around the center keeps 3.
        for name in ["W5N1", "W4N1", "W3N1", "W2N1", "W1N1"] {
            host.add_filled_room(name, Terrain::Plain);
        }
        let rooms = analysis_box(&host, &RoomName::from("W3N1"));
        assert_eq!(rooms.len(), 3);
        assert!(rooms.contains(&RoomName::from("W3N1")));
        assert!(rooms.contains(&RoomName::from("W2N1")));
        assert!(rooms.contains(&RoomName::from("W4N1")));
    }
}
