//! Upgrade corps: buy energy at the controller and mint from the points.
//!
//! The upgrade corp produces no market output. Its income is the minting
//! path: every unit of energy delivered to it becomes upgrade points,
//! which the tick driver converts to credits at the configured mint value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use outpost_host::Host;
use outpost_types::{
    Commodity, Contract, ContractId, CorpId, CreepName, Offer, ResourceId, Side, WorldPos,
};

use crate::corp::{CorpContext, WorkOutcome};

/// WORK parts one upgrader runs at most.
pub const MAX_UPGRADER_WORK: u32 = 5;

/// State of one upgrade corp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeState {
    /// The controller being fed.
    pub controller: ResourceId,
    /// Delivery location.
    pub controller_pos: WorldPos,
    /// WORK parts the corp wants on its upgrader.
    pub work_target: u32,
    /// Upgrade points earned and not yet minted.
    pub pending_mint_units: u32,
    /// Delivered units already accounted per buy contract.
    pub buy_synced: BTreeMap<ContractId, u32>,
}

impl UpgradeState {
    /// Create state for a controller.
    pub fn new(controller: ResourceId, controller_pos: WorldPos) -> Self {
        Self {
            controller,
            controller_pos,
            work_target: MAX_UPGRADER_WORK,
            pending_mint_units: 0,
            buy_synced: BTreeMap::new(),
        }
    }

    /// Drain points awaiting conversion to credits.
    pub fn take_pending_mint(&mut self) -> u32 {
        core::mem::take(&mut self.pending_mint_units)
    }
}

/// Bid for energy at the controller, below valuation times urgency.
pub fn buys(id: &CorpId, state: &UpgradeState, ctx: &CorpContext<'_>) -> Vec<Offer> {
    let duration = ctx.params.offer_duration;
    let quantity = state.work_target * duration as u32;
    if quantity == 0 {
        return Vec::new();
    }
    vec![Offer {
        corp: id.clone(),
        side: Side::Buy,
        commodity: Commodity::Energy,
        quantity,
        price: ctx.params.mint_value * ctx.params.upgrade_urgency,
        location: Some(state.controller_pos.clone()),
        duration,
    }]
}

/// Sync delivered energy into pending upgrade points.
pub fn execute(
    id: &CorpId,
    state: &mut UpgradeState,
    contracts: &BTreeMap<ContractId, Contract>,
) -> bool {
    let mut touched = false;
    for contract in contracts.values() {
        if &contract.buyer == id && contract.commodity == Commodity::Energy {
            let seen = state.buy_synced.entry(contract.id).or_insert(0);
            if contract.delivered > *seen {
                state.pending_mint_units += contract.delivered - *seen;
                *seen = contract.delivered;
                touched = true;
            }
        }
    }
    state
        .buy_synced
        .retain(|contract_id, _| contracts.contains_key(contract_id));
    touched
}

/// Drive upgraders.
pub fn work(
    creeps: &std::collections::BTreeSet<CreepName>,
    state: &mut UpgradeState,
    host: &mut dyn Host,
) -> WorkOutcome {
    for creep in creeps {
        let _ = host.upgrade(creep, &state.controller);
    }
    WorkOutcome::default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn delivered_energy_becomes_pending_points() {
        let me = CorpId::from("upgrade-W1N1");
        let mut state = UpgradeState::new(
            ResourceId::from("ctl-W1N1"),
            WorldPos::new("W1N1", 40, 40),
        );
        let mut contracts = BTreeMap::new();
        contracts.insert(
            ContractId(3),
            Contract {
                id: ContractId(3),
                seller: CorpId::from("haul-src"),
                buyer: me.clone(),
                commodity: Commodity::Energy,
                agreed_quantity: 250,
                price_per_unit: dec!(0.144),
                delivered: 60,
                paid_units: 0,
                open_tick: 0,
                duration: 50,
            },
        );
        assert!(execute(&me, &mut state, &contracts));
        assert_eq!(state.take_pending_mint(), 60);
        assert_eq!(state.take_pending_mint(), 0);
    }
}
