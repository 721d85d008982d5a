//! Scout corps: cross borders, look around, write intel back.
//!
//! The scout owns one MOVE-only creep. It walks the frontier of rooms the
//! registry has no intel for, one room per visit, and hands the gathered
//! [`RoomIntel`] to the tick driver for recording. Target choice is
//! deterministic: candidates sort by name and a seeded generator breaks
//! the tie, so runs reproduce.

use std::collections::BTreeSet;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use outpost_host::Host;
use outpost_types::{
    ControllerIntel, CreepName, ResourceKind, RoomIntel, RoomName, SourceIntel, WorldPos,
};

use crate::corp::{CorpContext, WorkOutcome};

/// State of one scout corp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoutState {
    /// The corp's home room; exploration radiates from here.
    pub home: RoomName,
    /// The room currently being visited.
    pub target: Option<RoomName>,
    /// Rooms already visited this scout's rotation.
    pub visited: BTreeSet<RoomName>,
    /// Seed for tie-breaking among equally attractive frontier rooms.
    pub seed: u64,
}

impl ScoutState {
    /// Create state rooted at the home room.
    pub fn new(home: RoomName) -> Self {
        let seed = home
            .as_str()
            .bytes()
            .fold(0u64, |acc, b| acc.wrapping_mul(131).wrapping_add(u64::from(b)));
        Self {
            home,
            target: None,
            visited: BTreeSet::new(),
            seed,
        }
    }
}

/// Walk the scout, gather intel in the target room, pick the next target.
pub fn work(
    creeps: &BTreeSet<CreepName>,
    home: &RoomName,
    state: &mut ScoutState,
    host: &mut dyn Host,
    ctx: &CorpContext<'_>,
) -> WorkOutcome {
    let mut outcome = WorkOutcome::default();
    let Some(creep) = creeps.iter().next() else {
        return outcome;
    };

    if state.target.is_none() {
        state.target = pick_target(state, home, host, ctx);
    }
    let Some(target) = state.target.clone() else {
        return outcome;
    };

    let _ = host.move_creep(creep, &WorldPos::new(target.clone(), 25, 25));
    outcome.intel.push(observe(&target, host, ctx.tick));
    state.visited.insert(target.clone());
    debug!(room = %target, "room scouted");
    state.target = None;
    outcome
}

/// Choose the next unvisited room reachable from the frontier.
fn pick_target(
    state: &ScoutState,
    home: &RoomName,
    host: &dyn Host,
    ctx: &CorpContext<'_>,
) -> Option<RoomName> {
    let mut frontier: BTreeSet<RoomName> = BTreeSet::new();
    let mut known: Vec<RoomName> = state.visited.iter().cloned().collect();
    known.push(home.clone());
    for room in &known {
        for (_, neighbor) in host.exits(room) {
            let unvisited =
                !state.visited.contains(&neighbor) && !ctx.registry.intel.contains_key(&neighbor);
            if unvisited && &neighbor != home {
                frontier.insert(neighbor);
            }
        }
    }
    if frontier.is_empty() {
        return None;
    }
    let candidates: Vec<RoomName> = frontier.into_iter().collect();
    let mut rng = StdRng::seed_from_u64(state.seed.wrapping_add(state.visited.len() as u64));
    let index = rng.random_range(0..candidates.len());
    candidates.get(index).cloned()
}

/// Build intel from whatever the host shows in the room.
fn observe(room: &RoomName, host: &dyn Host, tick: u64) -> RoomIntel {
    let mut sources = Vec::new();
    let mut controller = None;
    for record in host.room_objects(room) {
        match record.kind {
            ResourceKind::Source { capacity, .. } => sources.push(SourceIntel {
                pos: record.pos,
                capacity,
            }),
            ResourceKind::Controller { level, owned } => {
                controller = Some(ControllerIntel {
                    pos: record.pos,
                    owner: owned.then(|| "us".to_owned()),
                    reservation: None,
                    level,
                });
            }
            _ => {}
        }
    }
    RoomIntel {
        room: room.clone(),
        sources,
        controller,
        hostile_count: 0,
        gathered_at: tick,
        gathered_time: Utc::now(),
    }
}
