//! The spawn orchestrator: workforce assessment and the lockstep policy.
//!
//! Miners without haulers stack on undrained sources; haulers without
//! miners idle at empty piles. The lockstep rule keeps the two populations
//! within one of each other -- haulers never exceed miners + 1, miners
//! never exceed haulers + 1 unless the hauler fleet has already reached
//! its target -- and only once mining infrastructure stands does the room
//! spend spawn time on builders and upgraders.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use outpost_host::Host;
use outpost_types::{CorpKind, CreepRole, ResourceId, ResourceKind, RoomName, SpawnOrder};

use crate::corp::{Corp, CorpRegistry, RoleState};
use crate::params::EconomyParams;
use crate::upgrade::MAX_UPGRADER_WORK;

/// Controller level at which full saturation is demanded before builders
/// and upgraders get spawn time.
const SATURATION_LEVEL: u8 = 3;

/// Live workforce of one room, assessed at the top of each tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workforce {
    /// Live miners.
    pub miners: u32,
    /// Live haulers.
    pub haulers: u32,
    /// Live upgraders.
    pub upgraders: u32,
    /// Live builders.
    pub builders: u32,
    /// Live bootstrap jacks.
    pub jacks: u32,
    /// Live miners per source.
    pub miners_by_source: BTreeMap<ResourceId, u32>,
    /// Construction sites open in the room.
    pub construction_sites: u32,
    /// Controller level, zero when unowned or unknown.
    pub controller_level: u8,
}

/// Assess the live workforce of every owned room.
pub fn assess(corps: &CorpRegistry, host: &dyn Host) -> BTreeMap<RoomName, Workforce> {
    let mut out: BTreeMap<RoomName, Workforce> = BTreeMap::new();
    for room in host.owned_rooms() {
        let mut workforce = Workforce {
            construction_sites: host.construction_sites(&room),
            ..Default::default()
        };
        for record in host.room_objects(&room) {
            if let ResourceKind::Controller { level, owned: true } = record.kind {
                workforce.controller_level = level;
            }
        }
        out.insert(room, workforce);
    }

    for corp in corps.corps.values() {
        let Some(workforce) = out.get_mut(&corp.home_room) else {
            continue;
        };
        let live = corp.live_creeps(host);
        match &corp.role {
            RoleState::Harvest(state) => {
                workforce.miners += live;
                *workforce
                    .miners_by_source
                    .entry(state.source.clone())
                    .or_insert(0) += live;
            }
            RoleState::Haul(_) => workforce.haulers += live,
            RoleState::Upgrade(_) => workforce.upgraders += live,
            RoleState::Construct(_) => workforce.builders += live,
            RoleState::Bootstrap(_) => workforce.jacks += live,
            RoleState::Spawning(_) | RoleState::Scout(_) => {}
        }
    }
    out
}

/// Run the lockstep policy: enqueue at most one order per room per tick.
pub fn orchestrate(
    corps: &mut CorpRegistry,
    workforce: &BTreeMap<RoomName, Workforce>,
    params: &EconomyParams,
    tick: u64,
) {
    let mut orders: Vec<(RoomName, SpawnOrder)> = Vec::new();

    for (room, live) in workforce {
        let pending = pending_by_role(corps, room);
        let queue_len: usize = pending.values().map(|&n| n as usize).sum();
        if queue_len >= params.max_pending_orders {
            continue;
        }
        if let Some(order) = next_order(corps, room, live, &pending, tick) {
            debug!(%room, role = %order.role, "lockstep order");
            orders.push((room.clone(), order));
        }
    }

    for (room, order) in orders {
        if let Some(spawning) = corps.spawning_of_room_mut(&room) {
            if let RoleState::Spawning(state) = &mut spawning.role {
                let _ = state.enqueue(order, params.max_pending_orders);
            }
        }
    }
}

/// Queued-but-unspawned orders per role, which count toward targets.
fn pending_by_role(corps: &CorpRegistry, room: &RoomName) -> BTreeMap<CreepRole, u32> {
    let mut out = BTreeMap::new();
    for corp in corps.of_room(room) {
        if let RoleState::Spawning(state) = &corp.role {
            for order in &state.queue {
                *out.entry(order.role).or_insert(0) += 1;
            }
        }
    }
    out
}

fn next_order(
    corps: &CorpRegistry,
    room: &RoomName,
    live: &Workforce,
    pending: &BTreeMap<CreepRole, u32>,
    tick: u64,
) -> Option<SpawnOrder> {
    let miners = live.miners + pending.get(&CreepRole::Miner).copied().unwrap_or(0);
    let haulers = live.haulers + pending.get(&CreepRole::Hauler).copied().unwrap_or(0);

    // Per-source miner deficits and the room's hauler target come from the
    // variants the harvest and haul corps chose at planning time.
    let mut miner_deficit: Option<&Corp> = None;
    let mut hauler_target = 0u32;
    let mut hauler_carry = 10u32;
    let mut harvest_corps = 0u32;
    for corp in corps.of_room(room) {
        match &corp.role {
            RoleState::Harvest(state) => {
                harvest_corps += 1;
                let target = state.variant.as_ref().map_or(0, |v| v.mining_spots);
                let on_source = live
                    .miners_by_source
                    .get(&state.source)
                    .copied()
                    .unwrap_or(0)
                    + pending.get(&CreepRole::Miner).copied().unwrap_or(0);
                if on_source < target && miner_deficit.is_none() {
                    miner_deficit = Some(corp);
                }
            }
            RoleState::Haul(state) => {
                hauler_target += state.hauler_target();
                if let Some(variant) = &state.variant {
                    hauler_carry = variant.hauler_carry_parts;
                }
            }
            _ => {}
        }
    }

    // Bootstrap: a room with sources but no surveyed harvest corps yet
    // runs on jacks.
    if harvest_corps == 0 {
        let bootstrap = corps
            .of_room(room)
            .find(|c| c.kind() == CorpKind::Bootstrap)?;
        if let RoleState::Bootstrap(state) = &bootstrap.role {
            let jacks = live.jacks + pending.get(&CreepRole::Jack).copied().unwrap_or(0);
            if state.active && (jacks as usize) < state.sources.len() {
                return Some(SpawnOrder {
                    buyer: bootstrap.id.clone(),
                    role: CreepRole::Jack,
                    work_parts: 2,
                    haul_demand: None,
                    queued_at: tick,
                });
            }
        }
        return None;
    }

    let haulers_saturated = haulers >= hauler_target;

    // Miners first: a source needs one, and the lockstep bound permits it
    // (miners never run ahead of haulers unless the fleet is saturated).
    if let Some(harvest) = miner_deficit {
        if haulers >= miners || haulers_saturated {
            if let RoleState::Harvest(state) = &harvest.role {
                return Some(SpawnOrder {
                    buyer: harvest.id.clone(),
                    role: CreepRole::Miner,
                    work_parts: state.target_work_parts().max(1),
                    haul_demand: None,
                    queued_at: tick,
                });
            }
        }
    }

    // Then haulers, never running ahead of the miners feeding them.
    if haulers < hauler_target && miners >= 1 && haulers < miners + 1 {
        let haul = corps
            .of_room(room)
            .find(|c| matches!(&c.role, RoleState::Haul(_)))?;
        return Some(SpawnOrder {
            buyer: haul.id.clone(),
            role: CreepRole::Hauler,
            work_parts: 0,
            haul_demand: Some(hauler_carry),
            queued_at: tick,
        });
    }

    // Mining infrastructure stands: spend spawn time downstream.
    let infra_complete = if live.controller_level >= SATURATION_LEVEL {
        miner_deficit.is_none() && haulers_saturated
    } else {
        miners >= 1 && haulers >= 1
    };
    if !infra_complete {
        return None;
    }

    if live.construction_sites > 0
        && live.builders + pending.get(&CreepRole::Builder).copied().unwrap_or(0) == 0
    {
        let construct = corps
            .of_room(room)
            .find(|c| c.kind() == CorpKind::Construct)?;
        return Some(SpawnOrder {
            buyer: construct.id.clone(),
            role: CreepRole::Builder,
            work_parts: 5,
            haul_demand: None,
            queued_at: tick,
        });
    }

    if live.upgraders + pending.get(&CreepRole::Upgrader).copied().unwrap_or(0) == 0 {
        let upgrade = corps
            .of_room(room)
            .find(|c| c.kind() == CorpKind::Upgrade)?;
        return Some(SpawnOrder {
            buyer: upgrade.id.clone(),
            role: CreepRole::Upgrader,
            work_parts: MAX_UPGRADER_WORK,
            haul_demand: None,
            queued_at: tick,
        });
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use outpost_ledger::Accounts;
    use outpost_world::NodeRegistry;

    use crate::corp::CorpContext;

    use super::*;

    fn colony() -> (outpost_host::GridHost, CorpRegistry, Accounts) {
        let mut host = outpost_host::GridHost::new();
        host.add_open_room("W1N1");
        let _ = host.add_spawn("W1N1", 25, 20, 700);
        let _ = host.add_source("W1N1", 10, 10, 1500);
        let _ = host.add_controller("W1N1", 40, 40, 2, true);

        let registry = NodeRegistry::new();
        let params = EconomyParams::default();
        let mut accounts = Accounts::new();
        let mut corps = CorpRegistry::new();
        corps.ensure_colony_corps(&host, &registry, &params, &mut accounts, 1);

        // Plan every corp so variants exist.
        let workforce = assess(&corps, &host);
        let mut energy = std::collections::BTreeMap::new();
        energy.insert(RoomName::from("W1N1"), host.spawn_energy(&RoomName::from("W1N1")));
        let ctx = CorpContext {
            tick: 1,
            registry: &registry,
            params: &params,
            workforce: &workforce,
            spawn_energy: &energy,
        };
        let ids: Vec<_> = corps.corps.keys().cloned().collect();
        for id in ids {
            if let Some(corp) = corps.corps.get_mut(&id) {
                corp.plan(&ctx);
            }
        }
        (host, corps, accounts)
    }

    fn queued_roles(corps: &CorpRegistry, room: &RoomName) -> Vec<CreepRole> {
        corps
            .of_room(room)
            .filter_map(|c| match &c.role {
                RoleState::Spawning(state) => {
                    Some(state.queue.iter().map(|o| o.role).collect::<Vec<_>>())
                }
                _ => None,
            })
            .flatten()
            .collect()
    }

    #[test]
    fn first_order_is_a_miner() {
        let (host, mut corps, _) = colony();
        let params = EconomyParams::default();
        let workforce = assess(&corps, &host);
        orchestrate(&mut corps, &workforce, &params, 2);
        assert_eq!(
            queued_roles(&corps, &RoomName::from("W1N1")),
            vec![CreepRole::Miner]
        );
    }

    #[test]
    fn hauler_follows_the_first_miner() {
        let (mut host, mut corps, _) = colony();
        let params = EconomyParams::default();
        let room = RoomName::from("W1N1");

        // Hand the harvest corp a live miner.
        let spawn = outpost_types::ResourceId::from("spawn-W1N1");
        let name = outpost_types::CreepName::from("miner-W1N1-0");
        let _ = host.spawn_creep(
            &spawn,
            &outpost_types::Body::from_counts(3, 1, 2),
            &name,
            CreepRole::Miner,
        );
        let harvest_id = corps
            .by_kind(CorpKind::Harvest)
            .next()
            .map(|c| c.id.clone())
            .unwrap();
        corps.corps.get_mut(&harvest_id).unwrap().creeps.insert(name);

        let workforce = assess(&corps, &host);
        assert_eq!(workforce.get(&room).unwrap().miners, 1);
        orchestrate(&mut corps, &workforce, &params, 3);
        assert_eq!(queued_roles(&corps, &room), vec![CreepRole::Hauler]);
    }

    #[test]
    fn lockstep_never_runs_haulers_two_ahead() {
        let (host, mut corps, _) = colony();
        let params = EconomyParams::default();
        let room = RoomName::from("W1N1");

        // Repeated orchestration without spawning anything queues at most
        // the pending cap, never a hauler before any miner exists.
        for tick in 0..10 {
            let workforce = assess(&corps, &host);
            orchestrate(&mut corps, &workforce, &params, tick);
        }
        let roles = queued_roles(&corps, &room);
        assert!(roles.len() <= params.max_pending_orders);
        assert!(roles.iter().all(|&r| r == CreepRole::Miner || r == CreepRole::Hauler));
        let haulers = roles.iter().filter(|&&r| r == CreepRole::Hauler).count();
        let miners = roles.iter().filter(|&&r| r == CreepRole::Miner).count();
        assert!(haulers <= miners + 1);
    }
}
