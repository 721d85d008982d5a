//! Spawn orders queued against spawning corps.

use serde::{Deserialize, Serialize};

use crate::body::CreepRole;
use crate::ids::CorpId;

/// A request to manufacture a creep, queued FIFO on a spawning corp.
///
/// Orders carry *requested parts*, not bodies: the spawning corp converts
/// the request into a concrete body against the room's live energy capacity
/// at the moment it reaches the head of the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnOrder {
    /// The corp the creep will be assigned to.
    pub buyer: CorpId,
    /// Role the creep is built for.
    pub role: CreepRole,
    /// WORK parts requested (miners, upgraders, builders).
    pub work_parts: u32,
    /// CARRY parts requested, for hauler-shaped orders.
    pub haul_demand: Option<u32>,
    /// Tick the order was enqueued; orders past their TTL are evicted.
    pub queued_at: u64,
}

impl SpawnOrder {
    /// Whether the order has outlived `ttl` at `now`.
    pub const fn is_stale(&self, now: u64, ttl: u64) -> bool {
        now.saturating_sub(self.queued_at) > ttl
    }
}
