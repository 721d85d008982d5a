//! Harvest corps: sell energy at the source.
//!
//! A harvest corp owns one source. Its `plan` asks the variant evaluator
//! for the best configuration under live spawn capacity; its ask price is
//! marginal cost (amortized harvester body, decay, infrastructure, per
//! unit of gross income) plus the standing margin, so it never sells below
//! cost. Delivery is reported while at least one assigned miner is alive,
//! at the edge's gross rate, against open sale contracts oldest-first.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use outpost_host::Host;
use outpost_types::{
    Commodity, Contract, ContractId, CorpId, CreepName, EdgeConstraints, EdgeVariant, Offer,
    ResourceId, RoomName, Side, TerrainProfile, WorldPos,
};

use crate::corp::{CorpContext, WorkOutcome};
use crate::variants;

/// State of one harvest corp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestState {
    /// The source being mined.
    pub source: ResourceId,
    /// Where the source sits (sale location).
    pub source_pos: WorldPos,
    /// Terrain profile of the edge to the sink.
    pub profile: TerrainProfile,
    /// Live constraints fed to the evaluator.
    pub constraints: EdgeConstraints,
    /// The currently chosen configuration.
    pub variant: Option<EdgeVariant>,
    /// Remaining units per open sale contract, synced each tick.
    pub sale_quota: BTreeMap<ContractId, u32>,
}

impl HarvestState {
    /// Create state for a source.
    pub fn new(
        source: ResourceId,
        source_pos: WorldPos,
        profile: TerrainProfile,
        constraints: EdgeConstraints,
    ) -> Self {
        Self {
            source,
            source_pos,
            profile,
            constraints,
            variant: None,
            sale_quota: BTreeMap::new(),
        }
    }

    /// WORK parts the corp wants across its miners.
    pub fn target_work_parts(&self) -> u32 {
        self.variant
            .as_ref()
            .map(|v| (v.gross_per_tick / 2.0).ceil() as u32)
            .unwrap_or(0)
    }
}

/// Re-evaluate the edge under live spawn capacity.
pub fn plan(state: &mut HarvestState, home: &RoomName, ctx: &CorpContext<'_>) {
    if let Some(&(_, capacity)) = ctx.spawn_energy.get(home) {
        state.constraints.spawn_energy_capacity = capacity;
    }
    state.variant = variants::select(&state.profile, &state.constraints);
}

/// Bid for spawn work while the source has no live miner; the lockstep
/// orchestrator turns the demand into a concrete order.
pub fn buys(
    id: &CorpId,
    home: &RoomName,
    state: &HarvestState,
    ctx: &CorpContext<'_>,
) -> Vec<Offer> {
    let mined = ctx
        .workforce
        .get(home)
        .and_then(|w| w.miners_by_source.get(&state.source))
        .copied()
        .unwrap_or(0);
    let parts = state.target_work_parts();
    if mined > 0 || parts == 0 {
        return Vec::new();
    }
    vec![Offer {
        corp: id.clone(),
        side: Side::Buy,
        commodity: Commodity::SpawnWork,
        quantity: parts,
        price: ctx.params.spawn_work_bid,
        location: None,
        duration: ctx.params.offer_duration,
    }]
}

/// Sell up to `gross × duration` energy at marginal cost plus margin.
pub fn sells(id: &CorpId, state: &HarvestState, ctx: &CorpContext<'_>) -> Vec<Offer> {
    let Some(variant) = &state.variant else {
        return Vec::new();
    };
    let duration = ctx.params.offer_duration;
    let quantity = (variant.gross_per_tick * duration as f64) as u32;
    if quantity == 0 {
        return Vec::new();
    }
    let price = marginal_cost(variant, ctx) * (Decimal::ONE + ctx.params.margin);
    vec![Offer {
        corp: id.clone(),
        side: Side::Sell,
        commodity: Commodity::Energy,
        quantity,
        price,
        location: Some(state.source_pos.clone()),
        duration,
    }]
}

/// Sync open sale contracts; returns whether any are live.
pub fn execute(
    id: &CorpId,
    state: &mut HarvestState,
    contracts: &BTreeMap<ContractId, Contract>,
) -> bool {
    state.sale_quota = contracts
        .values()
        .filter(|c| &c.seller == id && c.commodity == Commodity::Energy)
        .map(|c| (c.id, c.agreed_quantity - c.delivered))
        .collect();
    !state.sale_quota.is_empty()
}

/// Drive miners and report deliveries at the gross rate.
pub fn work(
    creeps: &std::collections::BTreeSet<CreepName>,
    state: &mut HarvestState,
    host: &mut dyn Host,
) -> WorkOutcome {
    let mut outcome = WorkOutcome::default();
    for creep in creeps {
        let _ = host.harvest(creep, &state.source);
    }
    if creeps.is_empty() {
        return outcome;
    }
    let mut budget = state
        .variant
        .as_ref()
        .map(|v| v.gross_per_tick.round() as u32)
        .unwrap_or(0);
    for (contract, quota) in &mut state.sale_quota {
        if budget == 0 {
            break;
        }
        let delivered = budget.min(*quota);
        if delivered > 0 {
            outcome.deliveries.push((*contract, delivered));
            *quota -= delivered;
            budget -= delivered;
        }
    }
    outcome
}

/// Marginal cost per unit of energy, in credits: the harvester-side share
/// of the variant's amortized costs.
fn marginal_cost(variant: &EdgeVariant, ctx: &CorpContext<'_>) -> Decimal {
    let fraction = if variant.gross_per_tick > 0.0 {
        (variant.harvester_cost + variant.decay_cost + variant.infrastructure_cost)
            / variant.gross_per_tick
    } else {
        0.0
    };
    let fraction = Decimal::from_f64_retain(fraction).unwrap_or(Decimal::ZERO);
    (ctx.params.energy_value * fraction).max(Decimal::new(1, 3))
}
