//! The edge-variant evaluator: steady-state scoring of mining
//! configurations for one source→sink edge.
//!
//! A variant fixes three choices: the mining mode (drop, container, link),
//! the harvester's own CARRY buffer (0..=4 parts), and the hauler build
//! ratio the terrain dictates. Each tuple is scored on steady-state energy
//! flow minus amortized body, travel, decay, and infrastructure costs, all
//! in energy per tick, and the best feasible variant wins.
//!
//! Two modeling notes that matter:
//!
//! - Hauler travel time is `2 × path length`: the build ratio buys full
//!   speed on the worst stretch, so terrain shows up in hauler *body cost*
//!   rather than trip time.
//! - Drop-mode decay scales with mining *stations* (full-time positions,
//!   one per 5 WORK), not with how many creeps the spawn-capacity
//!   distributor splits a body across -- split miners rotate through the
//!   same station and feed the same pile.

use tracing::debug;

use outpost_types::{
    Body, EdgeConstraints, EdgeVariant, HaulRatio, MiningMode, TerrainProfile, CARRY_CAPACITY,
    CREEP_LIFE_TIME, ENERGY_REGEN_TIME, HARVEST_POWER,
};

use crate::bodies::distribute_parts;

/// WORK parts on a standard harvester.
pub const HARVESTER_WORK_PARTS: u32 = 5;

/// MOVE parts on a standard harvester.
pub const HARVESTER_MOVE_PARTS: u32 = 3;

/// CARRY parts on a standard (logical) hauler unit.
pub const STD_HAULER_CARRY: u32 = 10;

/// Energy per tick a drop miner pours into its buffer while filling.
const DROP_FILL_RATE: f64 = 10.0;

/// WORK parts one mining station supports.
const MAX_WORK_PER_STATION: u32 = 5;

/// Amortized container build/repair cost, energy per tick.
const CONTAINER_AMORTIZATION: f64 = 0.5;

/// Amortized link build cost plus transfer loss, energy per tick.
const LINK_AMORTIZATION: f64 = 0.8;

/// Enumerate and score every feasible variant for an edge.
///
/// Returned variants are sorted best-first by the selection order:
/// efficiency, then fewer haulers, then lower infrastructure cost, then
/// variant id.
pub fn evaluate(profile: &TerrainProfile, constraints: &EdgeConstraints) -> Vec<EdgeVariant> {
    let mut out = Vec::new();
    for mode in [MiningMode::Drop, MiningMode::Container, MiningMode::Link] {
        let permitted = match mode {
            MiningMode::Drop => true,
            MiningMode::Container => constraints.can_build_container,
            MiningMode::Link => constraints.can_build_link,
        };
        if !permitted {
            continue;
        }
        for carry in 0..=4u32 {
            // A 0-carry harvester cannot self-buffer.
            if carry == 0 && !mode.buffers() {
                continue;
            }
            if let Some(variant) = score(mode, carry, profile, constraints) {
                out.push(variant);
            }
        }
    }
    out.sort_by(|a, b| {
        b.efficiency
            .total_cmp(&a.efficiency)
            .then(a.haulers_needed.cmp(&b.haulers_needed))
            .then(a.infrastructure_cost.total_cmp(&b.infrastructure_cost))
            .then(a.id.cmp(&b.id))
    });
    out
}

/// Select the best feasible variant, if any.
pub fn select(profile: &TerrainProfile, constraints: &EdgeConstraints) -> Option<EdgeVariant> {
    let best = evaluate(profile, constraints).into_iter().next();
    if let Some(variant) = &best {
        debug!(
            id = %variant.id,
            efficiency = variant.efficiency,
            haulers = variant.haulers_needed,
            "edge variant selected"
        );
    }
    best
}

/// Score one tuple; `None` when the constraints rule it out.
fn score(
    mode: MiningMode,
    carry: u32,
    profile: &TerrainProfile,
    constraints: &EdgeConstraints,
) -> Option<EdgeVariant> {
    let cap = constraints.spawn_energy_capacity;
    if cap == 0 {
        return None;
    }
    let lifetime = f64::from(CREEP_LIFE_TIME);
    let gross = f64::from(constraints.source_capacity) / f64::from(ENERGY_REGEN_TIME);
    let ratio = profile.ratio();

    // Mining stations: one full-time position per 5 WORK of demand.
    let work_needed = (gross / f64::from(HARVEST_POWER)).ceil() as u32;
    let stations = work_needed.div_ceil(MAX_WORK_PER_STATION).max(1);

    // Harvester body, possibly split across several creeps by the
    // distributor. Each split creep needs its own adjacent tile.
    let harvester_body =
        Body::from_counts(HARVESTER_WORK_PARTS, carry, HARVESTER_MOVE_PARTS);
    let body_cost = harvester_body.cost();
    let split = distribute_parts(harvester_body.len(), body_cost, cap)?;
    if stations.max(split.creeps) > constraints.mining_spots {
        return None;
    }

    // Hauler leg. The ratio holds full speed, so a round trip is twice
    // the path length; link mode has no hauling at all.
    let round_trip = 2.0 * f64::from(profile.len());
    let (haulers, hauler_body_cost) = if mode == MiningMode::Link {
        (0u32, 0u32)
    } else {
        let moves = ratio.moves_for(STD_HAULER_CARRY);
        let body = Body::from_counts(0, STD_HAULER_CARRY, moves);
        // Per-hauler steady-state throughput over its lifetime.
        let throughput = if round_trip > 0.0 {
            f64::from(STD_HAULER_CARRY * CARRY_CAPACITY) / round_trip
        } else {
            f64::INFINITY
        };
        let needed = if throughput.is_finite() {
            (gross / throughput).ceil() as u32
        } else {
            0
        };
        // Each logical hauler must itself be spawnable, split if needed.
        distribute_parts(body.len(), body.cost(), cap)?;
        (needed.max(1), body.cost())
    };

    let travel_overhead =
        2.0 * f64::from(constraints.spawn_to_source_distance) * gross / lifetime;
    let harvester_cost = (f64::from(body_cost) + travel_overhead) / lifetime;
    let haul_cost = f64::from(haulers) * f64::from(hauler_body_cost) / lifetime;

    let decay_cost = if mode == MiningMode::Drop {
        let fill_time = f64::from(carry * CARRY_CAPACITY) / DROP_FILL_RATE;
        f64::from(stations) * (round_trip - fill_time).max(0.0) / round_trip.max(1.0)
    } else {
        0.0
    };

    let infrastructure_cost = match mode {
        MiningMode::Drop => 0.0,
        MiningMode::Container => CONTAINER_AMORTIZATION,
        MiningMode::Link => LINK_AMORTIZATION,
    };
    if infrastructure_cost > constraints.infrastructure_budget {
        return None;
    }

    let net = gross - harvester_cost - haul_cost - decay_cost - infrastructure_cost;
    let efficiency = if gross > 0.0 { net / gross } else { 0.0 };

    Some(EdgeVariant {
        id: EdgeVariant::compose_id(mode, carry, ratio),
        mode,
        carry_parts: carry,
        ratio,
        gross_per_tick: gross,
        round_trip_ticks: round_trip,
        harvester_cost,
        haul_cost,
        decay_cost,
        infrastructure_cost,
        haulers_needed: haulers,
        hauler_carry_parts: STD_HAULER_CARRY,
        mining_spots: stations,
        efficiency,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn constraints(source_capacity: u32, cap: u32, distance: u32) -> EdgeConstraints {
        EdgeConstraints {
            spawn_energy_capacity: cap,
            can_build_container: false,
            can_build_link: false,
            infrastructure_budget: 0.0,
            source_capacity,
            spawn_to_source_distance: distance,
            mining_spots: 1,
        }
    }

    #[test]
    fn single_plain_source_picks_drop_one_carry() {
        // A 1500 source, sink at distance 15, all plain, one mining spot,
        // spawn capacity that fits exactly the one-carry harvester.
        let profile = TerrainProfile::new(0, 15, 0);
        let variant = select(&profile, &constraints(1500, 700, 15)).unwrap();
        assert_eq!(variant.id, "drop-1c-1:1");
        assert!((variant.gross_per_tick - 5.0).abs() < 1e-9);
        assert_eq!(variant.haulers_needed, 1);
        assert_eq!(variant.hauler_carry_parts, 10);
        assert!(variant.efficiency >= 0.55, "efficiency {}", variant.efficiency);
    }

    #[test]
    fn owned_sources_with_roads_pick_container_zero_carry() {
        // A 3000 source with a road to the sink and container rights.
        let profile = TerrainProfile::new(10, 0, 0);
        let mut cons = constraints(3000, 700, 10);
        cons.can_build_container = true;
        cons.infrastructure_budget = 1.0;
        let variant = select(&profile, &cons).unwrap();
        assert_eq!(variant.id, "container-0c-2:1");
        assert!((variant.gross_per_tick - 10.0).abs() < 1e-9);
        assert!((variant.decay_cost).abs() < f64::EPSILON);
        assert!((variant.infrastructure_cost - 0.5).abs() < 1e-9);
    }

    #[test]
    fn swamp_route_takes_the_move_heavy_ratio() {
        // Cross-room distance 100 through swamp; capacity forces split
        // miners, which need a second spot.
        let profile = TerrainProfile::new(0, 0, 100);
        let mut cons = constraints(1500, 550, 100);
        cons.mining_spots = 2;
        let variant = select(&profile, &cons).unwrap();
        assert_eq!(variant.ratio, HaulRatio::SwampHeavy);
        assert_eq!(variant.id, "drop-1c-1:2");
        assert_eq!(variant.haulers_needed, 2);
        assert!(
            variant.efficiency >= 0.15 && variant.efficiency <= 0.35,
            "efficiency {}",
            variant.efficiency
        );
    }

    #[test]
    fn zero_carry_drop_is_never_offered() {
        let profile = TerrainProfile::new(0, 15, 0);
        let variants = evaluate(&profile, &constraints(1500, 700, 15));
        assert!(variants.iter().all(|v| !(v.mode == MiningMode::Drop && v.carry_parts == 0)));
    }

    #[test]
    fn infrastructure_budget_gates_container_mining() {
        let profile = TerrainProfile::new(10, 0, 0);
        let mut cons = constraints(3000, 800, 10);
        cons.can_build_container = true;
        cons.infrastructure_budget = 0.1; // below the container amortization
        let variant = select(&profile, &cons).unwrap();
        assert_eq!(variant.mode, MiningMode::Drop);
    }

    #[test]
    fn gross_is_monotone_in_source_capacity() {
        let profile = TerrainProfile::new(0, 15, 0);
        let mut last = 0.0f64;
        for capacity in [1500u32, 2000, 3000, 4500] {
            let mut cons = constraints(capacity, 700, 15);
            cons.mining_spots = 4;
            let variant = select(&profile, &cons).unwrap();
            assert!(variant.gross_per_tick >= last);
            last = variant.gross_per_tick;
        }
    }

    #[test]
    fn link_mode_has_no_hauling_leg() {
        let profile = TerrainProfile::new(0, 15, 0);
        let mut cons = constraints(1500, 800, 15);
        cons.can_build_link = true;
        cons.infrastructure_budget = 1.0;
        let variants = evaluate(&profile, &cons);
        let link = variants.iter().find(|v| v.mode == MiningMode::Link).unwrap();
        assert_eq!(link.haulers_needed, 0);
        assert!(link.haul_cost.abs() < f64::EPSILON);
        // With no decay and no hauler fleet, link wins the edge.
        assert_eq!(variants.first().map(|v| v.mode), Some(MiningMode::Link));
    }

    #[test]
    fn selection_tie_breaks_are_stable() {
        let profile = TerrainProfile::new(0, 15, 0);
        let a = evaluate(&profile, &constraints(1500, 700, 15));
        let b = evaluate(&profile, &constraints(1500, 700, 15));
        let ids_a: Vec<&str> = a.iter().map(|v| v.id.as_str()).collect();
        let ids_b: Vec<&str> = b.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids_a, ids_b);
    }
}
