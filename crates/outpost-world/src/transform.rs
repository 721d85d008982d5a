//! The openness transform: cross-room distance from walls.
//!
//! A breadth-first sweep seeds every wall at zero and expands over the
//! 8-neighborhood of world tiles, crossing room boundaries transparently on
//! the [`RoomLattice`]. The stored value is *openness* -- the inverted view
//! of wall proximity where wide-open centers carry the largest values and
//! walls stay at zero. Tiles bordering unanalyzed rooms treat the outside
//! as wall, which keeps the transform deterministic for any capped extent.
//!
//! Complexity is Θ(tiles visited). An empty start set produces an empty
//! transform; callers treat that as "analysis already current".

use std::collections::{BTreeMap, VecDeque};

use tracing::debug;

use outpost_host::Host;
use outpost_types::{RoomName, Terrain, WorldPos, ROOM_SIZE};

use crate::lattice::RoomLattice;

/// The 8-neighborhood offsets, in scan order.
pub const NEIGHBORS8: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// The 4-neighborhood offsets, in scan order.
pub const NEIGHBORS4: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Cross-room openness values for an analyzed extent.
#[derive(Debug, Clone, Default)]
pub struct OpennessTransform {
    /// The room embedding the transform was computed on.
    pub lattice: RoomLattice,
    openness: BTreeMap<(i32, i32), u32>,
    /// Largest openness in the extent.
    pub global_max: u32,
}

impl OpennessTransform {
    /// Compute the transform for the rooms reachable from `start_rooms`,
    /// capped at `max_rooms`.
    pub fn compute(host: &dyn Host, start_rooms: &[RoomName], max_rooms: usize) -> Self {
        let lattice = RoomLattice::build(host, start_rooms, max_rooms);
        if lattice.is_empty() {
            return Self::default();
        }

        // Collect every walkable tile of the extent up front; everything
        // absent from this map reads as wall.
        let mut openness: BTreeMap<(i32, i32), u32> = BTreeMap::new();
        for room in lattice.rooms() {
            for y in 0..ROOM_SIZE {
                for x in 0..ROOM_SIZE {
                    let pos = WorldPos {
                        room: room.clone(),
                        x,
                        y,
                    };
                    if host.terrain(&pos) != Terrain::Wall {
                        if let Some(abs) = lattice.to_abs(&pos) {
                            openness.insert(abs, 0);
                        }
                    }
                }
            }
        }

        // Multi-source BFS: walls sit at distance zero, so every walkable
        // tile touching one starts at one.
        let mut queue: VecDeque<(i32, i32)> = VecDeque::new();
        let seeds: Vec<(i32, i32)> = openness
            .keys()
            .copied()
            .filter(|&(x, y)| {
                NEIGHBORS8
                    .iter()
                    .any(|&(dx, dy)| !openness.contains_key(&(x + dx, y + dy)))
            })
            .collect();
        for seed in seeds {
            if let Some(slot) = openness.get_mut(&seed) {
                *slot = 1;
                queue.push_back(seed);
            }
        }

        let mut global_max = 0u32;
        while let Some((x, y)) = queue.pop_front() {
            let here = openness.get(&(x, y)).copied().unwrap_or(0);
            global_max = global_max.max(here);
            for &(dx, dy) in &NEIGHBORS8 {
                let next = (x + dx, y + dy);
                if let Some(slot) = openness.get_mut(&next) {
                    if *slot == 0 {
                        *slot = here + 1;
                        queue.push_back(next);
                    }
                }
            }
        }

        debug!(
            rooms = lattice.len(),
            tiles = openness.len(),
            global_max,
            "openness transform computed"
        );

        Self {
            lattice,
            openness,
            global_max,
        }
    }

    /// Openness of a tile; zero for walls and tiles outside the extent.
    pub fn openness(&self, pos: &WorldPos) -> u32 {
        self.lattice
            .to_abs(pos)
            .and_then(|abs| self.openness.get(&abs).copied())
            .unwrap_or(0)
    }

    /// Openness at absolute coordinates.
    pub fn openness_abs(&self, abs: (i32, i32)) -> u32 {
        self.openness.get(&abs).copied().unwrap_or(0)
    }

    /// Whether a tile is walkable (inside the extent and not a wall).
    pub fn walkable(&self, abs: (i32, i32)) -> bool {
        self.openness.contains_key(&abs)
    }

    /// Iterate `(abs, openness)` in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = (&(i32, i32), &u32)> {
        self.openness.iter()
    }

    /// Number of walkable tiles in the extent.
    pub fn walkable_tiles(&self) -> usize {
        self.openness.len()
    }

    /// Whether the transform holds no tiles.
    pub fn is_empty(&self) -> bool {
        self.openness.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use outpost_host::GridHost;

    use super::*;

    /// A 9×9 open plaza centered at (25,25), everything else wall.
    pub(crate) fn plaza_host() -> GridHost {
        let mut host = GridHost::new();
        host.add_filled_room("W1N1", Terrain::Wall);
        for y in 21..=29u8 {
            for x in 21..=29u8 {
                host.set_terrain(&WorldPos::new("W1N1", x, y), Terrain::Plain);
            }
        }
        host
    }

    #[test]
    fn empty_start_set_is_already_current() {
        let host = plaza_host();
        let transform = OpennessTransform::compute(&host, &[], 9);
        assert!(transform.is_empty());
    }

    #[test]
    fn plaza_center_is_the_most_open_tile() {
        let host = plaza_host();
        let transform =
            OpennessTransform::compute(&host, &[RoomName::from("W1N1")], 9);
        assert_eq!(transform.walkable_tiles(), 81);
        assert_eq!(transform.global_max, 5);
        assert_eq!(transform.openness(&WorldPos::new("W1N1", 25, 25)), 5);
        // Ring tiles sit one step from the wall.
        assert_eq!(transform.openness(&WorldPos::new("W1N1", 21, 25)), 1);
        // Walls stay at zero.
        assert_eq!(transform.openness(&WorldPos::new("W1N1", 20, 25)), 0);
    }

    #[test]
    fn transform_crosses_room_boundaries() {
        let mut host = GridHost::new();
        host.add_open_room("W1N1");
        host.add_open_room("W2N1");
        host.carve_exits();
        let transform =
            OpennessTransform::compute(&host, &[RoomName::from("W1N1")], 9);
        // Exit-band tiles on the shared border are walkable and counted.
        assert!(transform.openness(&WorldPos::new("W1N1", 0, 25)) > 0);
        assert!(transform.openness(&WorldPos::new("W2N1", 49, 25)) > 0);
        assert_eq!(
            transform.walkable_tiles(),
            transform.iter().count()
        );
    }

    #[test]
    fn room_cap_limits_the_extent() {
        let mut host = GridHost::new();
        host.add_open_room("W1N1");
        host.add_open_room("W2N1");
        host.carve_exits();
        let transform =
            OpennessTransform::compute(&host, &[RoomName::from("W1N1")], 1);
        assert!(!transform.lattice.contains(&RoomName::from("W2N1")));
    }
}
