//! Edge synthesis: spatial adjacency plus an MST backbone, and capped
//! top-K economic edges.
//!
//! Spatial edges connect nodes whose territories touch, with a minimum
//! spanning tree over peak centroids layered on top so the graph stays
//! connected even where adjacencies are sparse. Edge weight is the walking
//! distance between the two peaks (8-neighbor BFS through walkable tiles),
//! falling back to Chebyshev distance plus 50 per room crossed when no
//! in-extent path exists.
//!
//! Economic edges link nodes that own a tradeable resource, found by
//! shortest-path search over the spatial graph that never expands *through*
//! another economic node, capped at a total distance and truncated to the
//! nearest K neighbors per node.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::debug;

use outpost_types::{EdgeKey, NodeId, WorldPos};

use crate::peaks::Peak;
use crate::transform::{OpennessTransform, NEIGHBORS8};

/// Cumulative distance cap for economic edges.
pub const ECONOMIC_EDGE_MAX_DISTANCE: u32 = 2_000;

/// Economic neighbors retained per node.
pub const ECONOMIC_NEIGHBOR_CAP: usize = 10;

/// Fallback weight added per room crossed when no walking path exists.
const ROOM_CROSSING_COST: u32 = 50;

// ---------------------------------------------------------------------------
// Spatial edges
// ---------------------------------------------------------------------------

/// Synthesize the spatial edge set for a peak list and its partition.
pub fn spatial_edges(
    transform: &OpennessTransform,
    peaks: &[Peak],
    territories: &BTreeMap<NodeId, Vec<WorldPos>>,
) -> BTreeMap<EdgeKey, u32> {
    let mut pairs: BTreeSet<EdgeKey> = BTreeSet::new();

    // Territory adjacency: any 4-neighboring tiles under different owners.
    let mut owner: BTreeMap<(i32, i32), &NodeId> = BTreeMap::new();
    for (id, tiles) in territories {
        for tile in tiles {
            if let Some(abs) = transform.lattice.to_abs(tile) {
                owner.insert(abs, id);
            }
        }
    }
    for (&(x, y), &id) in &owner {
        for (dx, dy) in [(1, 0), (0, 1)] {
            if let Some(&other) = owner.get(&(x + dx, y + dy)) {
                if other != id {
                    pairs.insert(EdgeKey::new(id.clone(), other.clone()));
                }
            }
        }
    }

    // MST backbone over peak centroids by Manhattan distance, so sparse
    // adjacency never leaves the graph disconnected.
    for key in mst_pairs(transform, peaks) {
        pairs.insert(key);
    }

    // Weigh each pair by walking distance between the peaks.
    let centroid: BTreeMap<&NodeId, &WorldPos> =
        peaks.iter().map(|p| (&p.id, &p.centroid)).collect();
    let mut edges = BTreeMap::new();
    for key in pairs {
        let (Some(&a), Some(&b)) = (centroid.get(&key.a), centroid.get(&key.b)) else {
            continue;
        };
        let weight = walking_distance(transform, a, b)
            .unwrap_or_else(|| fallback_distance(transform, a, b));
        edges.insert(key, weight);
    }

    debug!(count = edges.len(), "spatial edges synthesized");
    edges
}

/// Walking distance between two tiles: 8-neighbor BFS through walkable
/// tiles of the analyzed extent. `None` when no path exists.
pub fn walking_distance(
    transform: &OpennessTransform,
    from: &WorldPos,
    to: &WorldPos,
) -> Option<u32> {
    let start = transform.lattice.to_abs(from)?;
    let goal = transform.lattice.to_abs(to)?;
    if start == goal {
        return Some(0);
    }
    if !transform.walkable(start) || !transform.walkable(goal) {
        return None;
    }
    let mut dist: BTreeMap<(i32, i32), u32> = BTreeMap::new();
    let mut queue = VecDeque::new();
    dist.insert(start, 0);
    queue.push_back(start);
    while let Some((x, y)) = queue.pop_front() {
        let here = dist.get(&(x, y)).copied().unwrap_or(0);
        for &(dx, dy) in &NEIGHBORS8 {
            let next = (x + dx, y + dy);
            if transform.walkable(next) && !dist.contains_key(&next) {
                if next == goal {
                    return Some(here + 1);
                }
                dist.insert(next, here + 1);
                queue.push_back(next);
            }
        }
    }
    None
}

/// Chebyshev distance plus a per-room crossing cost, for unreachable pairs.
fn fallback_distance(transform: &OpennessTransform, a: &WorldPos, b: &WorldPos) -> u32 {
    let cheb = match (transform.lattice.to_abs(a), transform.lattice.to_abs(b)) {
        (Some((ax, ay)), Some((bx, by))) => {
            (ax - bx).unsigned_abs().max((ay - by).unsigned_abs())
        }
        _ => ROOM_CROSSING_COST,
    };
    let rooms = transform
        .lattice
        .room_distance(&a.room, &b.room)
        .unwrap_or(0);
    cheb + ROOM_CROSSING_COST * rooms
}

/// Minimum spanning tree over peak centroids by Manhattan distance
/// (Prim's algorithm; peaks are few).
fn mst_pairs(transform: &OpennessTransform, peaks: &[Peak]) -> Vec<EdgeKey> {
    let abs: Vec<Option<(i32, i32)>> = peaks
        .iter()
        .map(|p| transform.lattice.to_abs(&p.centroid))
        .collect();
    let n = peaks.len();
    if n < 2 {
        return Vec::new();
    }
    let manhattan = |i: usize, j: usize| -> u32 {
        match (abs.get(i).copied().flatten(), abs.get(j).copied().flatten()) {
            (Some((ax, ay)), Some((bx, by))) => {
                (ax - bx).unsigned_abs() + (ay - by).unsigned_abs()
            }
            _ => u32::MAX,
        }
    };

    let mut in_tree = vec![false; n];
    let mut best: Vec<(u32, usize)> = (0..n).map(|i| (manhattan(0, i), 0)).collect();
    in_tree[0] = true;
    let mut out = Vec::with_capacity(n - 1);

    for _ in 1..n {
        let Some(next) = (0..n)
            .filter(|&i| !in_tree[i])
            .min_by_key(|&i| (best.get(i).map_or(u32::MAX, |b| b.0), i))
        else {
            break;
        };
        let parent = best.get(next).map_or(0, |b| b.1);
        if let (Some(a), Some(b)) = (peaks.get(next), peaks.get(parent)) {
            out.push(EdgeKey::new(a.id.clone(), b.id.clone()));
        }
        in_tree[next] = true;
        for i in 0..n {
            if !in_tree[i] {
                let d = manhattan(next, i);
                if let Some(slot) = best.get_mut(i) {
                    if d < slot.0 {
                        *slot = (d, next);
                    }
                }
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Economic edges
// ---------------------------------------------------------------------------

/// Synthesize economic edges over the spatial graph.
///
/// From each economic node, shortest-path search propagates cumulative
/// distance without expanding through other economic nodes, stopping at
/// `max_distance`. Each node then keeps only its `top_k` nearest economic
/// neighbors; an edge survives when both endpoints keep it.
pub fn economic_edges(
    economic: &BTreeSet<NodeId>,
    spatial: &BTreeMap<EdgeKey, u32>,
    max_distance: u32,
    top_k: usize,
) -> BTreeMap<EdgeKey, u32> {
    // Adjacency list of the spatial graph.
    let mut adjacency: BTreeMap<&NodeId, Vec<(&NodeId, u32)>> = BTreeMap::new();
    for (key, &w) in spatial {
        adjacency.entry(&key.a).or_default().push((&key.b, w));
        adjacency.entry(&key.b).or_default().push((&key.a, w));
    }

    // Candidate neighbor lists per economic node.
    let mut candidates: BTreeMap<&NodeId, Vec<(u32, &NodeId)>> = BTreeMap::new();
    for origin in economic {
        let mut dist: BTreeMap<&NodeId, u32> = BTreeMap::new();
        let mut frontier: BTreeSet<(u32, &NodeId)> = BTreeSet::new();
        dist.insert(origin, 0);
        frontier.insert((0, origin));
        let mut found: Vec<(u32, &NodeId)> = Vec::new();

        while let Some(&(d, node)) = frontier.iter().next() {
            frontier.remove(&(d, node));
            if dist.get(node).is_some_and(|&best| d > best) {
                continue;
            }
            let reached_economic = node != origin && economic.contains(node);
            if reached_economic {
                found.push((d, node));
                // Do not expand through an economic neighbor.
                continue;
            }
            for &(next, w) in adjacency.get(node).map(Vec::as_slice).unwrap_or(&[]) {
                let nd = d.saturating_add(w);
                if nd > max_distance {
                    continue;
                }
                if dist.get(next).is_none_or(|&best| nd < best) {
                    dist.insert(next, nd);
                    frontier.insert((nd, next));
                }
            }
        }
        candidates.insert(origin, found);
    }

    // Top-K retention per node: keep the nearest neighbors with their
    // distances, ties broken by id.
    let mut kept: BTreeMap<&NodeId, BTreeMap<&NodeId, u32>> = BTreeMap::new();
    for (origin, mut found) in candidates {
        found.sort();
        kept.insert(
            origin,
            found.into_iter().take(top_k).map(|(d, n)| (n, d)).collect(),
        );
    }

    // An edge survives when both endpoints keep it.
    let mut edges = BTreeMap::new();
    for (origin, neighbors) in &kept {
        for (neighbor, &d) in neighbors {
            let mutual = kept
                .get(*neighbor)
                .is_some_and(|back| back.contains_key(*origin));
            if mutual {
                edges.insert(EdgeKey::new((*origin).clone(), (*neighbor).clone()), d);
            }
        }
    }

    debug!(count = edges.len(), "economic edges synthesized");
    edges
}

#[cfg(test)]
mod tests {
    use outpost_types::{RoomName, Terrain};

    use crate::peaks::{detect_peaks, filter_peaks};
    use crate::territory::partition;
    use crate::transform::OpennessTransform;

    use super::*;

    fn corridor_host() -> outpost_host::GridHost {
        let mut host = outpost_host::GridHost::new();
        host.add_filled_room("W1N1", Terrain::Wall);
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
        host
    }

    #[test]
    fn adjacent_territories_get_weighted_edges() {
        let host = corridor_host();
        let transform = OpennessTransform::compute(&host, &[RoomName::from("W1N1")], 9);
        let peaks = filter_peaks(&transform, detect_peaks(&transform));
        // Two plaza summits plus the low corridor plateau between them.
        assert_eq!(peaks.len(), 3);
        let territories = partition(&transform, &peaks);
        let edges = spatial_edges(&transform, &peaks, &territories);
        // The corridor node bridges the two plazas; the plazas never touch.
        assert_eq!(edges.len(), 2);
        let corridor = NodeId::from("node-W1N1-25-25");
        for (key, &weight) in &edges {
            assert!(key.touches(&corridor));
            // Straight-line walk from a plaza summit to mid-corridor.
            assert_eq!(weight, 15);
        }
        assert!(edges
            .keys()
            .any(|k| k.touches(&NodeId::from("node-W1N1-10-25"))));
        assert!(edges
            .keys()
            .any(|k| k.touches(&NodeId::from("node-W1N1-40-25"))));
    }

    #[test]
    fn mst_connects_disjoint_territories() {
        let mut host = outpost_host::GridHost::new();
        host.add_filled_room("W1N1", Terrain::Wall);
        // Two plazas with no corridor: adjacency alone finds nothing.
        for (cx, cy) in [(10u8, 10u8), (40, 40)] {
            for y in cy - 2..=cy + 2 {
                for x in cx - 2..=cx + 2 {
                    host.set_terrain(&WorldPos::new("W1N1", x, y), Terrain::Plain);
                }
            }
        }
        let transform = OpennessTransform::compute(&host, &[RoomName::from("W1N1")], 9);
        let peaks = filter_peaks(&transform, detect_peaks(&transform));
        let territories = partition(&transform, &peaks);
        let edges = spatial_edges(&transform, &peaks, &territories);
        assert_eq!(edges.len(), 1);
        // No walking path exists, so the weight is the Chebyshev fallback.
        assert_eq!(edges.values().next().copied(), Some(30));
    }

    #[test]
    fn economic_truncation_keeps_the_ten_nearest() {
        // A hub with 15 economic spokes at distinct distances.
        let hub = NodeId::from("hub");
        let mut economic: BTreeSet<NodeId> = BTreeSet::new();
        economic.insert(hub.clone());
        let mut spatial: BTreeMap<EdgeKey, u32> = BTreeMap::new();
        for i in 0..15u32 {
            let spoke = NodeId::from(format!("spoke-{i:02}").as_str());
            spatial.insert(EdgeKey::new(hub.clone(), spoke.clone()), 100 + i * 10);
            economic.insert(spoke);
        }
        let edges = economic_edges(&economic, &spatial, ECONOMIC_EDGE_MAX_DISTANCE, 10);
        let hub_edges: Vec<(&EdgeKey, &u32)> =
            edges.iter().filter(|(k, _)| k.touches(&hub)).collect();
        assert_eq!(hub_edges.len(), 10);
        let max_kept = hub_edges.iter().map(|&(_, &d)| d).max().unwrap_or(0);
        // Every omitted spoke is strictly farther than every retained one.
        assert_eq!(max_kept, 190);
    }

    #[test]
    fn economic_search_respects_the_distance_cap() {
        let a = NodeId::from("a");
        let b = NodeId::from("b");
        let economic: BTreeSet<NodeId> = [a.clone(), b.clone()].into_iter().collect();
        let mut spatial = BTreeMap::new();
        spatial.insert(EdgeKey::new(a.clone(), b.clone()), 2_500);
        let edges = economic_edges(&economic, &spatial, ECONOMIC_EDGE_MAX_DISTANCE, 10);
        assert!(edges.is_empty());
    }

    #[test]
    fn economic_search_does_not_tunnel_through_economic_nodes() {
        // a -- b -- c, all economic: a reaches b, but not c through b.
        let ids: Vec<NodeId> = ["a", "b", "c"].iter().map(|&s| NodeId::from(s)).collect();
        let economic: BTreeSet<NodeId> = ids.iter().cloned().collect();
        let mut spatial = BTreeMap::new();
        spatial.insert(EdgeKey::new(ids[0].clone(), ids[1].clone()), 100);
        spatial.insert(EdgeKey::new(ids[1].clone(), ids[2].clone()), 100);
        let edges = economic_edges(&economic, &spatial, ECONOMIC_EDGE_MAX_DISTANCE, 10);
        assert_eq!(edges.len(), 2);
        assert!(!edges.contains_key(&EdgeKey::new(ids[0].clone(), ids[2].clone())));
    }
}
