//! Spawning corps: the FIFO spawn queue and spawn-work sales.
//!
//! A spawning corp owns one spawn structure. Each tick, if the spawn is
//! idle and the room can pay for the head order's body, the order spawns;
//! stale orders are evicted at the TTL, and the queue never grows past the
//! configured pending cap. Sold spawn work is delivered in body parts as
//! orders complete.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use outpost_host::{Host, HostCode};
use outpost_types::{
    Commodity, Contract, ContractId, CorpId, CreepName, CreepRole, HaulRatio, Offer,
    ResourceId, RoomName, Side, SpawnOrder,
};

use crate::bodies;
use crate::corp::{CorpContext, SpawnedCreep, WorkOutcome};
use crate::error::CorpError;

/// Parts of spawn work quoted per free queue slot.
const PARTS_PER_SLOT: u32 = 10;

/// State of one spawning corp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawningState {
    /// The spawn structure.
    pub spawn: ResourceId,
    /// The room whose energy pays for bodies.
    pub room: RoomName,
    /// Pending orders, oldest first.
    pub queue: VecDeque<SpawnOrder>,
    /// Monotonic counter for creep names.
    pub next_seq: u64,
    /// Remaining parts per open spawn-work sale.
    pub sale_quota: BTreeMap<ContractId, u32>,
}

impl SpawningState {
    /// Create state for a spawn.
    pub fn new(spawn: ResourceId, room: RoomName) -> Self {
        Self {
            spawn,
            room,
            queue: VecDeque::new(),
            next_seq: 0,
            sale_quota: BTreeMap::new(),
        }
    }

    /// Enqueue an order, respecting the pending cap.
    ///
    /// # Errors
    ///
    /// Returns [`CorpError::SpawnQueueFull`] at the cap.
    pub fn enqueue(&mut self, order: SpawnOrder, max_pending: usize) -> Result<(), CorpError> {
        if self.queue.len() >= max_pending {
            return Err(CorpError::SpawnQueueFull {
                room: self.room.clone(),
                pending: self.queue.len(),
            });
        }
        debug!(room = %self.room, role = %order.role, "spawn order queued");
        self.queue.push_back(order);
        Ok(())
    }

    /// Drop every pending order (console command).
    pub fn clear_queue(&mut self) -> usize {
        let drained = self.queue.len();
        self.queue.clear();
        drained
    }
}

/// Offer free queue capacity as spawn work.
pub fn sells(id: &CorpId, state: &SpawningState, ctx: &CorpContext<'_>) -> Vec<Offer> {
    let free = ctx
        .params
        .max_pending_orders
        .saturating_sub(state.queue.len()) as u32;
    if free == 0 {
        return Vec::new();
    }
    vec![Offer {
        corp: id.clone(),
        side: Side::Sell,
        commodity: Commodity::SpawnWork,
        quantity: free * PARTS_PER_SLOT,
        price: ctx.params.spawn_work_ask,
        location: None,
        duration: ctx.params.offer_duration,
    }]
}

/// Sync open spawn-work sales.
pub fn execute(
    id: &CorpId,
    state: &mut SpawningState,
    contracts: &BTreeMap<ContractId, Contract>,
) -> bool {
    state.sale_quota = contracts
        .values()
        .filter(|c| &c.seller == id && c.commodity == Commodity::SpawnWork)
        .map(|c| (c.id, c.agreed_quantity - c.delivered))
        .collect();
    !state.sale_quota.is_empty()
}

/// Evict stale orders, then try to spawn the head of the queue.
pub fn work(
    _id: &CorpId,
    state: &mut SpawningState,
    host: &mut dyn Host,
    ctx: &CorpContext<'_>,
) -> WorkOutcome {
    let mut outcome = WorkOutcome::default();
    let ttl = ctx.params.spawn_order_ttl;
    let now = ctx.tick;
    state.queue.retain(|order| {
        let stale = order.is_stale(now, ttl);
        if stale {
            debug!(role = %order.role, queued_at = order.queued_at, "stale spawn order evicted");
        }
        !stale
    });

    let Some(order) = state.queue.front().cloned() else {
        return outcome;
    };
    let (_, capacity) = host.spawn_energy(&state.room);
    // Orders do not carry terrain; the balanced ratio is the safe default
    // for bodies sized here.
    let ratio = HaulRatio::Balanced;
    let Some(body) =
        bodies::compose(order.role, order.work_parts, order.haul_demand, ratio, capacity)
    else {
        // The room cannot build this body at all; drop the order.
        state.queue.pop_front();
        return outcome;
    };

    let name = CreepName::new(format!(
        "{}-{}-{}",
        order.role, state.room, state.next_seq
    ));
    match host.spawn_creep(&state.spawn, &body, &name, order.role) {
        HostCode::Ok => {
            info!(creep = %name, role = %order.role, cost = body.cost(), "creep spawned");
            state.next_seq += 1;
            state.queue.pop_front();
            outcome.spawned.push(SpawnedCreep {
                owner: order.buyer.clone(),
                name,
                role: order.role,
            });
            // Deliver sold spawn work in parts.
            let mut parts = body.len();
            for (contract, quota) in &mut state.sale_quota {
                if parts == 0 {
                    break;
                }
                let delivered = parts.min(*quota);
                if delivered > 0 {
                    outcome.deliveries.push((*contract, delivered));
                    *quota -= delivered;
                    parts -= delivered;
                }
            }
        }
        HostCode::Busy | HostCode::NotEnoughEnergy => {
            // Ephemeral: retry next tick.
        }
        HostCode::InvalidTarget => {
            debug!(spawn = %state.spawn, "spawn target invalid, order dropped");
            state.queue.pop_front();
        }
    }
    outcome
}
