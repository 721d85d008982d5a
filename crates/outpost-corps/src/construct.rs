//! Construct corps: buy energy and turn it into construction progress.
//!
//! The corp quotes demand only while its room actually has construction
//! sites; placements themselves (roads along territory spines, containers
//! at sources) are scheduled by the external building layer.

use serde::{Deserialize, Serialize};

use outpost_host::Host;
use outpost_types::{Commodity, CorpId, CreepName, Offer, ResourceId, RoomName, Side};

use crate::corp::{CorpContext, WorkOutcome};

/// WORK parts a builder crew targets.
const BUILDER_WORK_TARGET: u32 = 5;

/// State of one construct corp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConstructState {
    /// Construction progress produced over the corp's lifetime.
    pub progress_delivered: u64,
}

/// Bid for energy while the room has sites to work.
pub fn buys(
    id: &CorpId,
    home: &RoomName,
    _state: &ConstructState,
    ctx: &CorpContext<'_>,
) -> Vec<Offer> {
    let sites = ctx
        .workforce
        .get(home)
        .map_or(0, |w| w.construction_sites);
    if sites == 0 {
        return Vec::new();
    }
    let duration = ctx.params.offer_duration;
    vec![Offer {
        corp: id.clone(),
        side: Side::Buy,
        commodity: Commodity::Energy,
        quantity: BUILDER_WORK_TARGET * duration as u32,
        price: ctx.params.energy_value * (rust_decimal::Decimal::ONE + ctx.params.margin),
        location: None,
        duration,
    }]
}

/// Drive builders at the room's sites.
pub fn work(
    creeps: &std::collections::BTreeSet<CreepName>,
    home: &RoomName,
    state: &mut ConstructState,
    host: &mut dyn Host,
) -> WorkOutcome {
    let site = ResourceId::new(format!("sites-{home}"));
    for creep in creeps {
        if host.build(creep, &site).is_ok() {
            state.progress_delivered += u64::from(outpost_types::BUILD_POWER);
        }
    }
    WorkOutcome::default()
}
