//! The corp record, the role dispatch, and the corp registry.
//!
//! A corp is a process-wide economic actor: it outlives its creeps, holds a
//! ledger account, and exposes one shared capability set -- `buys`,
//! `sells`, `plan`, `execute`, `work` -- dispatched over a tagged
//! [`RoleState`]. Corps never touch their balances directly; credits move
//! only through market settlement and the mint/tax paths, while
//! `total_revenue`/`total_cost` here are P&L bookkeeping written at
//! clearing time.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use outpost_host::Host;
use outpost_types::{
    Contract, ContractId, CorpId, CorpKind, CreepName, CreepRole, NodeId, Offer, ResourceId,
    ResourceKind, RoomIntel, RoomName, TerrainProfile, WorldPos,
};
use outpost_world::NodeRegistry;

use crate::bootstrap::BootstrapState;
use crate::construct::ConstructState;
use crate::harvest::HarvestState;
use crate::haul::HaulState;
use crate::orchestrator::Workforce;
use crate::params::EconomyParams;
use crate::scout::ScoutState;
use crate::spawning::SpawningState;
use crate::upgrade::UpgradeState;
use crate::{bootstrap, construct, harvest, haul, scout, spawning, upgrade};

// ---------------------------------------------------------------------------
// Context and outcomes
// ---------------------------------------------------------------------------

/// Read-only view corps plan and quote against.
pub struct CorpContext<'a> {
    /// Current tick.
    pub tick: u64,
    /// The node registry (read-only outside the analysis phase).
    pub registry: &'a NodeRegistry,
    /// Economy tuning.
    pub params: &'a EconomyParams,
    /// Per-room live workforce, assessed at the top of the tick.
    pub workforce: &'a BTreeMap<RoomName, Workforce>,
    /// Per-room spawn energy `(available, capacity)`.
    pub spawn_energy: &'a BTreeMap<RoomName, (u32, u32)>,
}

/// A creep manufactured this tick, to be assigned to its buyer corp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnedCreep {
    /// The corp the creep belongs to.
    pub owner: CorpId,
    /// The creep's host name.
    pub name: CreepName,
    /// The role it was built for.
    pub role: CreepRole,
}

/// Everything a corp's `work` phase hands back to the tick driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkOutcome {
    /// Units delivered against contracts this tick.
    pub deliveries: Vec<(ContractId, u32)>,
    /// Creeps spawned this tick (spawning corps only).
    pub spawned: Vec<SpawnedCreep>,
    /// Intel gathered this tick (scout corps only).
    pub intel: Vec<RoomIntel>,
}

impl WorkOutcome {
    /// Merge another outcome into this one.
    pub fn absorb(&mut self, other: Self) {
        self.deliveries.extend(other.deliveries);
        self.spawned.extend(other.spawned);
        self.intel.extend(other.intel);
    }
}

// ---------------------------------------------------------------------------
// Role state
// ---------------------------------------------------------------------------

/// Role-specific corp state, one variant per business unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "camelCase")]
pub enum RoleState {
    /// Sells energy mined at a source.
    Harvest(HarvestState),
    /// Buys energy at sources, sells at sinks.
    Haul(HaulState),
    /// Buys energy at the controller and mints from upgrade points.
    Upgrade(UpgradeState),
    /// Owns the spawn order queue; sells spawn work.
    Spawning(SpawningState),
    /// Buys energy and produces construction progress.
    Construct(ConstructState),
    /// Jack-of-all-trades fallback while a room has no mining pair.
    Bootstrap(BootstrapState),
    /// Ventures across borders and records intel.
    Scout(ScoutState),
}

impl RoleState {
    /// The corp kind this state belongs to.
    pub const fn kind(&self) -> CorpKind {
        match self {
            Self::Harvest(_) => CorpKind::Harvest,
            Self::Haul(_) => CorpKind::Haul,
            Self::Upgrade(_) => CorpKind::Upgrade,
            Self::Spawning(_) => CorpKind::Spawning,
            Self::Construct(_) => CorpKind::Construct,
            Self::Bootstrap(_) => CorpKind::Bootstrap,
            Self::Scout(_) => CorpKind::Scout,
        }
    }
}

// ---------------------------------------------------------------------------
// Corp
// ---------------------------------------------------------------------------

/// One economic actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corp {
    /// Deterministic corp id.
    pub id: CorpId,
    /// The room the corp operates from.
    pub home_room: RoomName,
    /// The territory node it is attached to, once analysis has run.
    pub node: Option<NodeId>,
    /// Lifetime revenue booked at clearing.
    pub total_revenue: Decimal,
    /// Lifetime cost booked at clearing.
    pub total_cost: Decimal,
    /// Resources the corp has committed quantities against.
    pub committed: BTreeMap<ResourceId, u32>,
    /// Creeps currently assigned.
    pub creeps: BTreeSet<CreepName>,
    /// Last tick `plan` ran.
    pub last_planned: u64,
    /// Last tick the corp saw contract activity (for the idle levy).
    pub last_activity: u64,
    /// Role-specific state.
    pub role: RoleState,
}

impl Corp {
    /// Found a corp.
    pub fn new(id: CorpId, home_room: RoomName, role: RoleState) -> Self {
        Self {
            id,
            home_room,
            node: None,
            total_revenue: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            committed: BTreeMap::new(),
            creeps: BTreeSet::new(),
            last_planned: 0,
            last_activity: 0,
            role,
        }
    }

    /// The corp's kind.
    pub const fn kind(&self) -> CorpKind {
        self.role.kind()
    }

    /// Whether this corp's staggered planning slot falls on `tick`.
    ///
    /// Corps replan every `plan_interval` ticks, offset by a hash of their
    /// id so the planning load spreads evenly.
    pub fn plan_due(&self, tick: u64, interval: u64) -> bool {
        if interval == 0 {
            return true;
        }
        let offset: u64 = self
            .id
            .as_str()
            .bytes()
            .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));
        tick % interval == offset % interval || self.last_planned == 0
    }

    /// Current buy quotes.
    pub fn buys(&self, ctx: &CorpContext<'_>) -> Vec<Offer> {
        match &self.role {
            RoleState::Bootstrap(_) | RoleState::Scout(_) | RoleState::Spawning(_) => {
                Vec::new()
            }
            RoleState::Harvest(state) => {
                harvest::buys(&self.id, &self.home_room, state, ctx)
            }
            RoleState::Haul(state) => haul::buys(&self.id, state, ctx),
            RoleState::Upgrade(state) => upgrade::buys(&self.id, state, ctx),
            RoleState::Construct(state) => {
                construct::buys(&self.id, &self.home_room, state, ctx)
            }
        }
    }

    /// Current sell quotes.
    pub fn sells(&self, ctx: &CorpContext<'_>) -> Vec<Offer> {
        match &self.role {
            RoleState::Harvest(state) => harvest::sells(&self.id, state, ctx),
            RoleState::Haul(state) => haul::sells(&self.id, state, ctx),
            RoleState::Spawning(state) => spawning::sells(&self.id, state, ctx),
            _ => Vec::new(),
        }
    }

    /// Recompute the corp's configuration (variant choice, targets).
    pub fn plan(&mut self, ctx: &CorpContext<'_>) {
        self.last_planned = ctx.tick;
        let home = self.home_room.clone();
        match &mut self.role {
            RoleState::Harvest(state) => harvest::plan(state, &home, ctx),
            RoleState::Haul(state) => haul::plan(state, &home, ctx),
            RoleState::Bootstrap(state) => bootstrap::plan(state, &home, ctx),
            _ => {}
        }
    }

    /// Reconcile against the active contract table: sync delivered
    /// quantities into role bookkeeping (hauler stock, upgrade points).
    pub fn execute(&mut self, contracts: &BTreeMap<ContractId, Contract>, tick: u64) {
        let id = self.id.clone();
        let touched = match &mut self.role {
            RoleState::Haul(state) => haul::execute(&id, state, contracts),
            RoleState::Upgrade(state) => upgrade::execute(&id, state, contracts),
            RoleState::Harvest(state) => harvest::execute(&id, state, contracts),
            RoleState::Spawning(state) => spawning::execute(&id, state, contracts),
            _ => false,
        };
        if touched {
            self.last_activity = tick;
        }
    }

    /// Drain upgrade points awaiting credit conversion (upgrade corps).
    pub fn take_pending_mint(&mut self) -> u32 {
        match &mut self.role {
            RoleState::Upgrade(state) => state.take_pending_mint(),
            _ => 0,
        }
    }

    /// Drive assigned creeps and report deliveries, spawns, and intel.
    pub fn work(&mut self, host: &mut dyn Host, ctx: &CorpContext<'_>) -> WorkOutcome {
        self.prune_dead_creeps(host);
        let id = self.id.clone();
        let creeps = self.creeps.clone();
        let home = self.home_room.clone();
        match &mut self.role {
            RoleState::Harvest(state) => harvest::work(&creeps, state, host),
            RoleState::Haul(state) => haul::work(&creeps, state, host),
            RoleState::Upgrade(state) => upgrade::work(&creeps, state, host),
            RoleState::Spawning(state) => spawning::work(&id, state, host, ctx),
            RoleState::Construct(state) => construct::work(&creeps, &home, state, host),
            RoleState::Bootstrap(state) => bootstrap::work(&creeps, state, host),
            RoleState::Scout(state) => scout::work(&creeps, &home, state, host, ctx),
        }
    }

    /// Book revenue agreed at clearing.
    pub fn record_revenue(&mut self, amount: Decimal) {
        self.total_revenue += amount;
    }

    /// Book cost agreed at clearing.
    pub fn record_cost(&mut self, amount: Decimal) {
        self.total_cost += amount;
    }

    /// Drop creeps the host no longer knows.
    pub fn prune_dead_creeps(&mut self, host: &dyn Host) {
        self.creeps.retain(|name| host.creep_exists(name));
    }

    /// Number of live assigned creeps.
    pub fn live_creeps(&self, host: &dyn Host) -> u32 {
        self.creeps
            .iter()
            .filter(|name| host.creep_exists(name))
            .count() as u32
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// All corps, keyed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpRegistry {
    /// The corps.
    pub corps: BTreeMap<CorpId, Corp>,
}

impl CorpRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            corps: BTreeMap::new(),
        }
    }

    /// Iterate corps of one kind, in id order.
    pub fn by_kind(&self, kind: CorpKind) -> impl Iterator<Item = &Corp> {
        self.corps.values().filter(move |c| c.kind() == kind)
    }

    /// Iterate corps homed in a room.
    pub fn of_room<'a>(&'a self, room: &'a RoomName) -> impl Iterator<Item = &'a Corp> {
        self.corps.values().filter(move |c| &c.home_room == room)
    }

    /// The spawning corp of a room, if founded.
    pub fn spawning_of_room_mut(&mut self, room: &RoomName) -> Option<&mut Corp> {
        self.corps
            .values_mut()
            .find(|c| c.kind() == CorpKind::Spawning && &c.home_room == room)
    }

    /// Found any corps the colony is missing: one harvest and one haul
    /// corp per visible source, plus upgrade, spawning, construct,
    /// bootstrap, and scout corps per owned room. Newly founded corps get
    /// an account seeded from the mint.
    pub fn ensure_colony_corps(
        &mut self,
        host: &dyn Host,
        registry: &NodeRegistry,
        params: &EconomyParams,
        accounts: &mut outpost_ledger::Accounts,
        tick: u64,
    ) {
        for room in host.owned_rooms() {
            let objects = host.room_objects(&room);
            let spawn = objects.iter().find(|r| matches!(r.kind, ResourceKind::Spawn { .. }));
            let controller = objects
                .iter()
                .find(|r| matches!(r.kind, ResourceKind::Controller { owned: true, .. }));
            let sink = spawn.or(controller);
            let (_, spawn_capacity) = host.spawn_energy(&room);

            for object in &objects {
                let ResourceKind::Source { capacity, .. } = &object.kind else {
                    continue;
                };
                let capacity = *capacity;
                let sink_pos = sink.map(|s| s.pos.clone());
                let distance = sink_pos
                    .as_ref()
                    .and_then(|p| p.chebyshev(&object.pos))
                    .unwrap_or(25);
                let spots = free_neighbors(host, &object.pos);
                let profile = TerrainProfile::new(0, distance, 0);
                let constraints = outpost_types::EdgeConstraints {
                    spawn_energy_capacity: spawn_capacity,
                    can_build_container: false,
                    can_build_link: false,
                    infrastructure_budget: 0.0,
                    source_capacity: capacity,
                    spawn_to_source_distance: distance,
                    mining_spots: spots,
                };

                let harvest_id = CorpId::new(format!("harvest-{}", object.id));
                self.found(
                    harvest_id,
                    room.clone(),
                    RoleState::Harvest(HarvestState::new(
                        object.id.clone(),
                        object.pos.clone(),
                        profile,
                        constraints,
                    )),
                    registry,
                    params,
                    accounts,
                    tick,
                );

                if let (Some(sink_record), Some(sink_pos)) = (sink, sink_pos) {
                    let haul_id = CorpId::new(format!("haul-{}", object.id));
                    self.found(
                        haul_id,
                        room.clone(),
                        RoleState::Haul(HaulState::new(
                            object.id.clone(),
                            object.pos.clone(),
                            sink_record.id.clone(),
                            sink_pos,
                            profile,
                            constraints,
                        )),
                        registry,
                        params,
                        accounts,
                        tick,
                    );
                }
            }

            if let Some(controller) = controller {
                self.found(
                    CorpId::new(format!("upgrade-{room}")),
                    room.clone(),
                    RoleState::Upgrade(UpgradeState::new(
                        controller.id.clone(),
                        controller.pos.clone(),
                    )),
                    registry,
                    params,
                    accounts,
                    tick,
                );
            }
            if let Some(spawn) = spawn {
                self.found(
                    CorpId::new(format!("spawning-{room}")),
                    room.clone(),
                    RoleState::Spawning(SpawningState::new(spawn.id.clone(), room.clone())),
                    registry,
                    params,
                    accounts,
                    tick,
                );
            }
            let sources: Vec<ResourceId> = objects
                .iter()
                .filter(|r| r.kind.is_source())
                .map(|r| r.id.clone())
                .collect();
            self.found(
                CorpId::new(format!("construct-{room}")),
                room.clone(),
                RoleState::Construct(ConstructState::default()),
                registry,
                params,
                accounts,
                tick,
            );
            self.found(
                CorpId::new(format!("bootstrap-{room}")),
                room.clone(),
                RoleState::Bootstrap(BootstrapState::new(sources)),
                registry,
                params,
                accounts,
                tick,
            );
            self.found(
                CorpId::new(format!("scout-{room}")),
                room.clone(),
                RoleState::Scout(ScoutState::new(room.clone())),
                registry,
                params,
                accounts,
                tick,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn found(
        &mut self,
        id: CorpId,
        room: RoomName,
        role: RoleState,
        registry: &NodeRegistry,
        params: &EconomyParams,
        accounts: &mut outpost_ledger::Accounts,
        tick: u64,
    ) {
        if self.corps.contains_key(&id) {
            return;
        }
        let mut corp = Corp::new(id.clone(), room.clone(), role);
        corp.last_activity = tick;
        corp.node = registry
            .nodes
            .values()
            .find(|n| n.rooms.contains(&room))
            .map(|n| n.id.clone());
        accounts.open(&id);
        if params.seed_capital > Decimal::ZERO {
            let _ = accounts.mint(&id, params.seed_capital);
        }
        info!(corp = %id, kind = %corp.kind(), %room, "corp founded");
        self.corps.insert(id, corp);
    }
}

/// Non-wall tiles in the 8-neighborhood of a position.
pub fn free_neighbors(host: &dyn Host, pos: &WorldPos) -> u32 {
    pos.room_neighbors8()
        .iter()
        .filter(|n| !host.terrain(n).is_wall())
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planning_is_staggered_by_corp_id() {
        let a = Corp::new(
            CorpId::from("harvest-src-a"),
            RoomName::from("W1N1"),
            RoleState::Construct(ConstructState::default()),
        );
        let interval = 50;
        let due: Vec<u64> = (1..=200).filter(|&t| {
            let mut corp = a.clone();
            corp.last_planned = 1; // suppress the first-plan override
            corp.plan_due(t, interval)
        }).collect();
        // Exactly one slot per interval window.
        assert_eq!(due.len(), 4);
        assert_eq!(due[1] - due[0], 50);
    }

    #[test]
    fn unplanned_corps_plan_immediately() {
        let corp = Corp::new(
            CorpId::from("construct-W1N1"),
            RoomName::from("W1N1"),
            RoleState::Construct(ConstructState::default()),
        );
        assert!(corp.plan_due(3, 50));
    }
}
