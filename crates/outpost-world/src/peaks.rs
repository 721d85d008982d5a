//! Peak detection: plateau clustering and height-scaled suppression.
//!
//! A peak is a local-maximum plateau of the openness transform -- ground as
//! far from any wall as its surroundings allow, ideal for infrastructure.
//! Detection walks tiles in descending openness and flood-fills 4-connected
//! clusters of exactly equal height. The filter then lets taller peaks
//! dominate: each accepted peak excludes a square of radius
//! `⌊0.75 × height⌋` around its centroid, and any later peak whose centroid
//! falls inside an excluded square is dropped. Ring-shaped plateaus (the
//! equal-height shells around a summit) average to a centroid near the
//! summit itself, which is how the filter absorbs them.

use std::collections::BTreeSet;

use tracing::debug;

use outpost_types::{NodeId, WorldPos};

use crate::transform::{OpennessTransform, NEIGHBORS4};

/// A detected peak: one equal-height plateau and its centroid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peak {
    /// Deterministic id derived from the centroid tile.
    pub id: NodeId,
    /// Plateau centroid, rounded to the nearest tile.
    pub centroid: WorldPos,
    /// Plateau openness.
    pub height: u32,
    /// The plateau's tiles.
    pub tiles: Vec<WorldPos>,
}

/// Detect every plateau in the transform.
///
/// Returns peaks sorted by descending height, then by id -- the order the
/// filter and the territory partition both consume. Two runs over identical
/// terrain produce identical peak ids in identical order.
pub fn detect_peaks(transform: &OpennessTransform) -> Vec<Peak> {
    let mut by_height: Vec<((i32, i32), u32)> = transform
        .iter()
        .filter(|&(_, &h)| h > 0)
        .map(|(&abs, &h)| (abs, h))
        .collect();
    by_height.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut visited: BTreeSet<(i32, i32)> = BTreeSet::new();
    let mut peaks = Vec::new();

    for (start, height) in by_height {
        if visited.contains(&start) {
            continue;
        }
        // Flood-fill the plateau: 4-connected tiles of exactly this height.
        let mut plateau = vec![start];
        let mut frontier = vec![start];
        visited.insert(start);
        while let Some((x, y)) = frontier.pop() {
            for &(dx, dy) in &NEIGHBORS4 {
                let next = (x + dx, y + dy);
                if !visited.contains(&next) && transform.openness_abs(next) == height {
                    visited.insert(next);
                    plateau.push(next);
                    frontier.push(next);
                }
            }
        }
        plateau.sort_unstable();

        let centroid_abs = centroid_of(&plateau);
        let Some(centroid) = transform.lattice.from_abs(centroid_abs.0, centroid_abs.1) else {
            continue;
        };
        let tiles = plateau
            .iter()
            .filter_map(|&(x, y)| transform.lattice.from_abs(x, y))
            .collect();
        peaks.push(Peak {
            id: NodeId::for_peak(&centroid),
            centroid,
            height,
            tiles,
        });
    }

    peaks.sort_by(|a, b| b.height.cmp(&a.height).then(a.id.cmp(&b.id)));
    debug!(count = peaks.len(), "plateaus detected");
    peaks
}

/// Suppress peaks dominated by taller neighbors.
///
/// Accepted peaks whose rounded centroid does not lie on their own plateau
/// (ring-shaped survivors) are snapped to the nearest plateau tile so the
/// territory partition can seed from a walkable tile; the id follows the
/// snapped centroid.
pub fn filter_peaks(transform: &OpennessTransform, peaks: Vec<Peak>) -> Vec<Peak> {
    let mut excluded: Vec<((i32, i32), i32)> = Vec::new();
    let mut accepted = Vec::new();

    for mut peak in peaks {
        let Some(abs) = transform.lattice.to_abs(&peak.centroid) else {
            continue;
        };
        let dominated = excluded
            .iter()
            .any(|&((cx, cy), r)| (abs.0 - cx).abs() <= r && (abs.1 - cy).abs() <= r);
        if dominated {
            continue;
        }
        let radius = (peak.height * 3 / 4) as i32;
        excluded.push((abs, radius));

        if !peak.tiles.contains(&peak.centroid) {
            if let Some(snapped) = snap_to_plateau(transform, abs, &peak.tiles) {
                peak.id = NodeId::for_peak(&snapped);
                peak.centroid = snapped;
            }
        }
        accepted.push(peak);
    }

    debug!(count = accepted.len(), "peaks accepted after suppression");
    accepted
}

/// Rounded average of a non-empty tile set.
fn centroid_of(tiles: &[(i32, i32)]) -> (i32, i32) {
    let n = tiles.len().max(1) as f64;
    let sx: i64 = tiles.iter().map(|&(x, _)| i64::from(x)).sum();
    let sy: i64 = tiles.iter().map(|&(_, y)| i64::from(y)).sum();
    (
        (sx as f64 / n).round() as i32,
        (sy as f64 / n).round() as i32,
    )
}

/// The plateau tile nearest to `abs` by Chebyshev distance, ties broken by
/// coordinate order.
fn snap_to_plateau(
    transform: &OpennessTransform,
    abs: (i32, i32),
    tiles: &[WorldPos],
) -> Option<WorldPos> {
    tiles
        .iter()
        .filter_map(|pos| transform.lattice.to_abs(pos).map(|t| (t, pos)))
        .min_by_key(|&((x, y), _)| ((abs.0 - x).abs().max((abs.1 - y).abs()), (x, y)))
        .map(|(_, pos)| pos.clone())
}

#[cfg(test)]
mod tests {
    use outpost_types::RoomName;

    use crate::transform::tests::plaza_host;
    use crate::transform::OpennessTransform;

    use super::*;

    #[test]
    fn plaza_yields_exactly_one_peak() {
        let host = plaza_host();
        let transform = OpennessTransform::compute(&host, &[RoomName::from("W1N1")], 9);
        let peaks = filter_peaks(&transform, detect_peaks(&transform));
        assert_eq!(peaks.len(), 1);
        let peak = &peaks[0];
        assert_eq!(peak.centroid, WorldPos::new("W1N1", 25, 25));
        assert_eq!(peak.height, 5);
        assert_eq!(peak.id.as_str(), "node-W1N1-25-25");
    }

    #[test]
    fn detection_is_deterministic() {
        let host = plaza_host();
        let transform = OpennessTransform::compute(&host, &[RoomName::from("W1N1")], 9);
        let first: Vec<NodeId> = detect_peaks(&transform).into_iter().map(|p| p.id).collect();
        let second: Vec<NodeId> = detect_peaks(&transform).into_iter().map(|p| p.id).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn distant_plazas_each_keep_a_peak() {
        use outpost_types::Terrain;
        let mut host = outpost_host::GridHost::new();
        host.add_filled_room("W1N1", Terrain::Wall);
        for (cx, cy) in [(10u8, 10u8), (40, 40)] {
            for y in cy - 2..=cy + 2 {
                for x in cx - 2..=cx + 2 {
                    host.set_terrain(&WorldPos::new("W1N1", x, y), Terrain::Plain);
                }
            }
        }
        let transform = OpennessTransform::compute(&host, &[RoomName::from("W1N1")], 9);
        let peaks = filter_peaks(&transform, detect_peaks(&transform));
        assert_eq!(peaks.len(), 2);
        assert!(peaks.iter().any(|p| p.centroid == WorldPos::new("W1N1", 10, 10)));
        assert!(peaks.iter().any(|p| p.centroid == WorldPos::new("W1N1", 40, 40)));
    }

    #[test]
    fn plateau_tiles_share_the_height() {
        let host = plaza_host();
        let transform = OpennessTransform::compute(&host, &[RoomName::from("W1N1")], 9);
        for peak in detect_peaks(&transform) {
            for tile in &peak.tiles {
                assert_eq!(transform.openness(tile), peak.height);
            }
        }
    }
}
