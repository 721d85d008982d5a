//! Territory partition: shared-queue BFS from every peak.
//!
//! All peaks seed a single breadth-first queue in descending height order;
//! the first peak to reach a tile owns it, so ties at equal wavefront
//! distance resolve toward the taller peak. The result is a disjoint
//! covering of every walkable tile reachable from any peak.

use std::collections::{BTreeMap, VecDeque};

use tracing::debug;

use outpost_types::{NodeId, WorldPos};

use crate::peaks::Peak;
use crate::transform::{OpennessTransform, NEIGHBORS4};

/// Partition the transform's walkable tiles among the peaks.
///
/// Input peaks must be sorted descending by height (the order
/// [`filter_peaks`] returns). Output tile lists are coordinate-sorted.
///
/// [`filter_peaks`]: crate::peaks::filter_peaks
pub fn partition(
    transform: &OpennessTransform,
    peaks: &[Peak],
) -> BTreeMap<NodeId, Vec<WorldPos>> {
    let mut claims: BTreeMap<(i32, i32), usize> = BTreeMap::new();
    let mut queue: VecDeque<(i32, i32)> = VecDeque::new();

    for (index, peak) in peaks.iter().enumerate() {
        let Some(abs) = transform.lattice.to_abs(&peak.centroid) else {
            continue;
        };
        if transform.walkable(abs) && !claims.contains_key(&abs) {
            claims.insert(abs, index);
            queue.push_back(abs);
        }
    }

    while let Some((x, y)) = queue.pop_front() {
        let Some(&owner) = claims.get(&(x, y)) else {
            continue;
        };
        for &(dx, dy) in &NEIGHBORS4 {
            let next = (x + dx, y + dy);
            if transform.walkable(next) && !claims.contains_key(&next) {
                claims.insert(next, owner);
                queue.push_back(next);
            }
        }
    }

    let mut territories: BTreeMap<NodeId, Vec<WorldPos>> = peaks
        .iter()
        .map(|peak| (peak.id.clone(), Vec::new()))
        .collect();
    for (&(x, y), &owner) in &claims {
        let (Some(peak), Some(pos)) = (peaks.get(owner), transform.lattice.from_abs(x, y))
        else {
            continue;
        };
        if let Some(tiles) = territories.get_mut(&peak.id) {
            tiles.push(pos);
        }
    }
    for tiles in territories.values_mut() {
        tiles.sort();
    }

    debug!(
        peaks = peaks.len(),
        claimed = claims.len(),
        "territory partition complete"
    );
    territories
}

#[cfg(test)]
mod tests {
    use outpost_types::{RoomName, Terrain};

    use crate::peaks::{detect_peaks, filter_peaks};
    use crate::transform::tests::plaza_host;

    use super::*;

    #[test]
    fn partition_covers_every_walkable_tile() {
        let host = plaza_host();
        let transform = OpennessTransform::compute(&host, &[RoomName::from("W1N1")], 9);
        let peaks = filter_peaks(&transform, detect_peaks(&transform));
        let territories = partition(&transform, &peaks);
        let total: usize = territories.values().map(Vec::len).sum();
        assert_eq!(total, transform.walkable_tiles());
    }

    #[test]
    fn partition_is_disjoint() {
        let mut host = outpost_host::GridHost::new();
        host.add_filled_room("W1N1", Terrain::Wall);
        // Two plazas joined by a corridor: tiles split between two peaks.
        for (cx, cy) in [(10u8, 25u8), (40, 25)] {
            for y in cy - 3..=cy + 3 {
                for x in cx - 3..=cx + 3 {
                    host.set_terrain(&WorldPos::new("W1N1", x, y), Terrain::Plain);
                }
            }
        }
        for x in 13..=37u8 {
            host.set_terrain(&WorldPos::new("W1N1", x, 25), Terrain::Plain);
        }
        let transform = OpennessTransform::compute(&host, &[RoomName::from("W1N1")], 9);
        let peaks = filter_peaks(&transform, detect_peaks(&transform));
        let territories = partition(&transform, &peaks);

        let mut seen = std::collections::BTreeSet::new();
        for tiles in territories.values() {
            for tile in tiles {
                assert!(seen.insert(tile.clone()), "tile {tile} claimed twice");
            }
        }
        assert_eq!(seen.len(), transform.walkable_tiles());
    }

    #[test]
    fn peak_owns_its_own_centroid() {
        let host = plaza_host();
        let transform = OpennessTransform::compute(&host, &[RoomName::from("W1N1")], 9);
        let peaks = filter_peaks(&transform, detect_peaks(&transform));
        let territories = partition(&transform, &peaks);
        for peak in &peaks {
            let tiles = territories.get(&peak.id).map(Vec::as_slice).unwrap_or(&[]);
            assert!(tiles.contains(&peak.centroid));
        }
    }
}
