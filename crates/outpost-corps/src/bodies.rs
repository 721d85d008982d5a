//! Body composition against live spawn capacity, and the part distributor.
//!
//! Spawn orders carry requested parts, not bodies; these builders convert a
//! request into the largest body the room can actually afford, shrinking
//! from the target rather than failing. The distributor splits a body too
//! expensive for one creep across several smaller ones.

use outpost_types::{Body, CreepRole, HaulRatio, MAX_BODY_PARTS};

/// Cheapest useful body: one WORK and one MOVE. Below this capacity no
/// split can help.
const MIN_USEFUL_CAPACITY: u32 = 150;

/// Result of splitting part demand across creeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split {
    /// Creeps required.
    pub creeps: u32,
    /// Parts per creep after the split.
    pub parts_per_creep: u32,
}

/// Split `total_parts` of demand costing `total_cost` across as few creeps
/// as the spawn capacity allows: `N = ceil(cost / capacity)`, each creep
/// carrying `ceil(parts / N)`.
///
/// Returns `None` when the capacity cannot support any useful body.
pub fn distribute_parts(total_parts: u32, total_cost: u32, capacity: u32) -> Option<Split> {
    if capacity < MIN_USEFUL_CAPACITY || total_parts == 0 {
        return None;
    }
    let creeps = total_cost.div_ceil(capacity).max(1);
    let parts_per_creep = total_parts.div_ceil(creeps);
    if parts_per_creep > MAX_BODY_PARTS {
        return None;
    }
    Some(Split {
        creeps,
        parts_per_creep,
    })
}

/// The body for a spawn order, given the room's current energy capacity.
///
/// Returns `None` when even the smallest body of the role does not fit.
pub fn compose(
    role: CreepRole,
    work_target: u32,
    haul_demand: Option<u32>,
    ratio: HaulRatio,
    capacity: u32,
) -> Option<Body> {
    match role {
        CreepRole::Miner => miner_body(work_target, capacity),
        CreepRole::Hauler => hauler_body(haul_demand.unwrap_or(10), ratio, capacity),
        CreepRole::Upgrader | CreepRole::Builder => worker_body(work_target.min(5), capacity),
        CreepRole::Scout => Some(Body::from_counts(0, 0, 1)).filter(|b| b.cost() <= capacity),
        CreepRole::Jack => jack_body(capacity),
    }
}

/// A miner: WORK-heavy, one CARRY of buffer, MOVE to get there once.
fn miner_body(work_target: u32, capacity: u32) -> Option<Body> {
    for work in (1..=work_target.max(1)).rev() {
        let carry = u32::from(work >= 3);
        let moves = work.div_ceil(2).max(1);
        let body = Body::from_counts(work, carry, moves);
        if body.cost() <= capacity && body.is_spawnable() {
            return Some(body);
        }
    }
    None
}

/// A hauler: CARRY plus the MOVE the terrain ratio demands.
fn hauler_body(carry_target: u32, ratio: HaulRatio, capacity: u32) -> Option<Body> {
    for carry in (1..=carry_target.max(1)).rev() {
        let body = Body::from_counts(0, carry, ratio.moves_for(carry));
        if body.cost() <= capacity && body.is_spawnable() {
            return Some(body);
        }
    }
    None
}

/// An upgrader or builder: balanced WORK/CARRY with enough MOVE.
fn worker_body(work_target: u32, capacity: u32) -> Option<Body> {
    for work in (1..=work_target.max(1)).rev() {
        let carry = work.div_ceil(2).max(1);
        let moves = work.div_ceil(2).max(1);
        let body = Body::from_counts(work, carry, moves);
        if body.cost() <= capacity && body.is_spawnable() {
            return Some(body);
        }
    }
    None
}

/// A bootstrap jack: equal WORK/CARRY/MOVE units, as many as fit.
fn jack_body(capacity: u32) -> Option<Body> {
    for units in (1..=5u32).rev() {
        let body = Body::from_counts(units, units, units);
        if body.cost() <= capacity {
            return Some(body);
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use outpost_types::Part;

    use super::*;

    #[test]
    fn distributor_matches_the_ceiling_formulas() {
        // 1000-cost hauler under a 700 cap: two creeps of 10 parts.
        let split = distribute_parts(20, 1000, 700).unwrap();
        assert_eq!(split.creeps, 2);
        assert_eq!(split.parts_per_creep, 10);
        // Fits in one: no split.
        let split = distribute_parts(9, 700, 700).unwrap();
        assert_eq!(split.creeps, 1);
        assert_eq!(split.parts_per_creep, 9);
        assert!(distribute_parts(9, 700, 100).is_none());
    }

    #[test]
    fn miner_shrinks_to_capacity() {
        let body = miner_body(5, 700).unwrap();
        assert_eq!(body.count(Part::Work), 5);
        assert_eq!(body.cost(), 700);
        let small = miner_body(5, 300).unwrap();
        assert!(small.cost() <= 300);
        assert!(small.count(Part::Work) >= 1);
        assert!(miner_body(5, 100).is_none());
    }

    #[test]
    fn hauler_respects_the_terrain_ratio() {
        let road = hauler_body(10, HaulRatio::RoadHeavy, 2_000).unwrap();
        assert_eq!(road.count(Part::Move), 5);
        let swamp = hauler_body(10, HaulRatio::SwampHeavy, 2_000).unwrap();
        assert_eq!(swamp.count(Part::Move), 20);
        let cramped = hauler_body(10, HaulRatio::Balanced, 500).unwrap();
        assert!(cramped.cost() <= 500);
    }

    #[test]
    fn upgrader_is_capped_at_five_work() {
        let body = compose(CreepRole::Upgrader, 9, None, HaulRatio::Balanced, 5_000).unwrap();
        assert_eq!(body.count(Part::Work), 5);
    }

    #[test]
    fn scout_is_a_single_move() {
        let body = compose(CreepRole::Scout, 0, None, HaulRatio::Balanced, 300).unwrap();
        assert_eq!(body.len(), 1);
        assert_eq!(body.cost(), 50);
    }
}
