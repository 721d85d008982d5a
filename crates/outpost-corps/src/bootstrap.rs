//! Bootstrap corps: the jack-of-all-trades fallback.
//!
//! Active only while the room lacks a complete mining-plus-hauling pair.
//! Jacks mine, carry, and dump energy themselves; the moment specialized
//! corps stand on their own the bootstrap corp goes dormant and its jacks
//! age out.

use serde::{Deserialize, Serialize};

use outpost_host::Host;
use outpost_types::{CreepName, ResourceId, RoomName};

use crate::corp::{CorpContext, WorkOutcome};

/// State of one bootstrap corp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BootstrapState {
    /// Sources jacks rotate across.
    pub sources: Vec<ResourceId>,
    /// Whether the room still needs the fallback.
    pub active: bool,
}

impl BootstrapState {
    /// Create state over the room's sources.
    pub fn new(sources: Vec<ResourceId>) -> Self {
        Self {
            sources,
            active: true,
        }
    }
}

/// The fallback engages only while the mining pair is incomplete.
pub fn plan(state: &mut BootstrapState, home: &RoomName, ctx: &CorpContext<'_>) {
    let complete = ctx
        .workforce
        .get(home)
        .is_some_and(|w| w.miners > 0 && w.haulers > 0);
    state.active = !complete;
}

/// Rotate jacks across the room's sources.
pub fn work(
    creeps: &std::collections::BTreeSet<CreepName>,
    state: &mut BootstrapState,
    host: &mut dyn Host,
) -> WorkOutcome {
    if !state.active || state.sources.is_empty() {
        return WorkOutcome::default();
    }
    for (index, creep) in creeps.iter().enumerate() {
        if let Some(source) = state.sources.get(index % state.sources.len()) {
            let _ = host.harvest(creep, source);
        }
    }
    WorkOutcome::default()
}
