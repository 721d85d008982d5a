//! Haul corps: buy energy at sources, sell it at sinks.
//!
//! The hauling corp is a middleman. It bids up to the destination premium
//! times its expected sell price for energy at the pickup location, tracks
//! the running average of what it actually paid, and floors its own asks
//! at `avg acquisition × (1 + margin)` so the middleman spread never goes
//! negative. Fleet sizing comes from the variant evaluator; the spawn
//! orchestrator reads the target from here and never lets delivery fall
//! behind income for long.

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

/// State of one hauling corp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HaulState {
    /// Pickup: the source being drained.
    pub source: ResourceId,
    /// Pickup location.
    pub source_pos: WorldPos,
    /// Drop-off: the sink structure.
    pub sink: ResourceId,
    /// Drop-off location.
    pub sink_pos: WorldPos,
    /// Terrain profile of the edge.
    pub profile: TerrainProfile,
    /// Live constraints fed to the evaluator.
    pub constraints: EdgeConstraints,
    /// The currently chosen configuration.
    pub variant: Option<EdgeVariant>,
    /// Energy bought and not yet delivered onward.
    pub stock: u32,
    /// Units ever acquired, for the running average.
    pub acquisition_units: u64,
    /// Credits ever spent acquiring, for the running average.
    pub acquisition_cost: Decimal,
    /// Delivered units already accounted per buy contract.
    pub buy_synced: BTreeMap<ContractId, u32>,
    /// Remaining units per open sale contract.
    pub sale_quota: BTreeMap<ContractId, u32>,
}

impl HaulState {
    /// Create state for an edge.
    pub fn new(
        source: ResourceId,
        source_pos: WorldPos,
        sink: ResourceId,
        sink_pos: WorldPos,
        profile: TerrainProfile,
        constraints: EdgeConstraints,
    ) -> Self {
        Self {
            source,
            source_pos,
            sink,
            sink_pos,
            profile,
            constraints,
            variant: None,
            stock: 0,
            acquisition_units: 0,
            acquisition_cost: Decimal::ZERO,
            buy_synced: BTreeMap::new(),
            sale_quota: BTreeMap::new(),
        }
    }

    /// Haulers the evaluator says this edge needs.
    pub fn hauler_target(&self) -> u32 {
        self.variant.as_ref().map_or(0, |v| v.haulers_needed)
    }

    /// Average credits paid per unit acquired, if any history exists.
    pub fn average_acquisition(&self) -> Option<Decimal> {
        if self.acquisition_units == 0 {
            None
        } else {
            Some(self.acquisition_cost / Decimal::from(self.acquisition_units))
        }
    }

    /// The ask this corp quotes at the sink: the acquisition average plus
    /// margin, floored at the reference energy value.
    pub fn sell_price(&self, ctx: &CorpContext<'_>) -> Decimal {
        let floor = ctx.params.energy_value;
        match self.average_acquisition() {
            Some(avg) => (avg * (Decimal::ONE + ctx.params.margin)).max(floor),
            None => floor,
        }
    }
}

/// Re-evaluate the edge under live spawn capacity.
pub fn plan(state: &mut HaulState, home: &RoomName, ctx: &CorpContext<'_>) {
    if let Some(&(_, capacity)) = ctx.spawn_energy.get(home) {
        state.constraints.spawn_energy_capacity = capacity;
    }
    state.variant = variants::select(&state.profile, &state.constraints);
}

/// Bid for energy at the pickup, up to premium × expected sell price.
pub fn buys(id: &CorpId, state: &HaulState, ctx: &CorpContext<'_>) -> Vec<Offer> {
    let Some(variant) = &state.variant else {
        return Vec::new();
    };
    let duration = ctx.params.offer_duration;
    let quantity = (variant.gross_per_tick * duration as f64) as u32;
    if quantity == 0 {
        return Vec::new();
    }
    let price = ctx.params.destination_premium * state.sell_price(ctx);
    vec![Offer {
        corp: id.clone(),
        side: Side::Buy,
        commodity: Commodity::Energy,
        quantity,
        price,
        location: Some(state.source_pos.clone()),
        duration,
    }]
}

/// Offer acquired (and incoming) energy at the sink.
pub fn sells(id: &CorpId, state: &HaulState, ctx: &CorpContext<'_>) -> Vec<Offer> {
    let Some(variant) = &state.variant else {
        return Vec::new();
    };
    let duration = ctx.params.offer_duration;
    let pipeline = (variant.gross_per_tick * duration as f64) as u32;
    let quantity = state.stock.max(pipeline);
    if quantity == 0 {
        return Vec::new();
    }
    vec![Offer {
        corp: id.clone(),
        side: Side::Sell,
        commodity: Commodity::Energy,
        quantity,
        price: state.sell_price(ctx),
        location: Some(state.sink_pos.clone()),
        duration,
    }]
}

/// Sync contract state: bought deliveries raise stock and the acquisition
/// average; open sales refresh the delivery quota.
pub fn execute(
    id: &CorpId,
    state: &mut HaulState,
    contracts: &BTreeMap<ContractId, Contract>,
) -> bool {
    let mut touched = false;
    for contract in contracts.values() {
        if &contract.buyer == id && contract.commodity == Commodity::Energy {
            let seen = state.buy_synced.entry(contract.id).or_insert(0);
            if contract.delivered > *seen {
                let delta = contract.delivered - *seen;
                state.stock += delta;
                state.acquisition_units += u64::from(delta);
                state.acquisition_cost +=
                    contract.price_per_unit * Decimal::from(delta);
                *seen = contract.delivered;
                touched = true;
            }
        }
    }
    // Forget synced rows for contracts that have retired.
    state
        .buy_synced
        .retain(|contract_id, _| contracts.contains_key(contract_id));
    let quota: BTreeMap<ContractId, u32> = contracts
        .values()
        .filter(|c| &c.seller == id && c.commodity == Commodity::Energy)
        .map(|c| (c.id, c.agreed_quantity - c.delivered))
        .collect();
    touched = touched || !quota.is_empty();
    state.sale_quota = quota;
    touched
}

/// Drive haulers and report onward deliveries out of stock.
pub fn work(
    creeps: &std::collections::BTreeSet<CreepName>,
    state: &mut HaulState,
    host: &mut dyn Host,
) -> WorkOutcome {
    let mut outcome = WorkOutcome::default();
    for creep in creeps {
        let _ = host.move_creep(creep, &state.sink_pos);
        let _ = host.transfer(creep, &state.sink, state.stock.min(50));
    }
    if creeps.is_empty() {
        return outcome;
    }
    let throughput = state
        .variant
        .as_ref()
        .map(|v| v.gross_per_tick.ceil() as u32)
        .unwrap_or(0);
    let mut deliverable = state.stock.min(throughput);
    for (contract, quota) in &mut state.sale_quota {
        if deliverable == 0 {
            break;
        }
        let delivered = deliverable.min(*quota);
        if delivered > 0 {
            outcome.deliveries.push((*contract, delivered));
            *quota -= delivered;
            deliverable -= delivered;
            state.stock -= delivered;
        }
    }
    outcome
}
