//! The incremental analysis scheduler: a three-phase state machine behind
//! a cache TTL.
//!
//! Full spatial analysis of every owned room's 3×3 box is far too heavy
//! for one tick, so it is split: *analyzing* processes one batch of at
//! most nine rooms per tick, *merging* closes the batch list, and
//! *updating* applies every batch to the node registry in one pass. State
//! lives in-process only -- a restart mid-rebuild loses the run, and the
//! last cached result stays valid until the TTL expires or someone resets
//! the scheduler.

use std::collections::{BTreeSet, VecDeque};

use tracing::{debug, info};

use outpost_host::Host;
use outpost_types::RoomName;
use outpost_world::{analysis_box, Analysis, NodeRegistry};

use crate::config::AnalysisConfig;

/// Where the scheduler currently stands.
#[derive(Debug, Default)]
enum Phase {
    /// Nothing in flight.
    #[default]
    Idle,
    /// Processing batches, one per tick.
    Analyzing {
        queue: VecDeque<Vec<RoomName>>,
        done: Vec<Analysis>,
    },
    /// All batches processed; close the run.
    Merging { done: Vec<Analysis> },
    /// Apply the merged result to the registry.
    Updating { done: Vec<Analysis> },
}

/// The incremental rebuild state machine.
#[derive(Debug, Default)]
pub struct AnalysisScheduler {
    phase: Phase,
    last_complete: Option<u64>,
}

impl AnalysisScheduler {
    /// Create an idle scheduler with no cached result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a rebuild is due at `tick`.
    pub fn due(&self, tick: u64, cache_ttl: u64) -> bool {
        match self.last_complete {
            None => true,
            Some(last) => tick.saturating_sub(last) >= cache_ttl,
        }
    }

    /// Whether a rebuild is currently in flight.
    pub const fn in_flight(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// Tick of the last completed rebuild.
    pub const fn last_complete(&self) -> Option<u64> {
        self.last_complete
    }

    /// Abort any in-flight rebuild and invalidate the cache; the next
    /// `step` starts a fresh run.
    pub fn reset(&mut self) {
        info!("analysis scheduler reset");
        self.phase = Phase::Idle;
        self.last_complete = None;
    }

    /// Advance the state machine by at most one phase transition.
    ///
    /// Returns `true` when this step applied a completed analysis to the
    /// registry.
    pub fn step(
        &mut self,
        host: &dyn Host,
        registry: &mut NodeRegistry,
        config: &AnalysisConfig,
        tick: u64,
    ) -> bool {
        match core::mem::take(&mut self.phase) {
            Phase::Idle => {
                if !self.due(tick, config.cache_ttl) {
                    return false;
                }
                let queue = plan_batches(host);
                if queue.is_empty() {
                    // Nothing to analyze; treat the cache as current.
                    self.last_complete = Some(tick);
                    return false;
                }
                debug!(batches = queue.len(), "analysis run started");
                self.phase = Phase::Analyzing {
                    queue,
                    done: Vec::new(),
                };
                false
            }
            Phase::Analyzing { mut queue, mut done } => {
                if let Some(batch) = queue.pop_front() {
                    let analysis = Analysis::run(host, &batch, config.max_rooms_per_batch);
                    debug!(
                        rooms = batch.len(),
                        peaks = analysis.peaks.len(),
                        remaining = queue.len(),
                        "analysis batch processed"
                    );
                    if !analysis.is_empty() {
                        done.push(analysis);
                    }
                }
                self.phase = if queue.is_empty() {
                    Phase::Merging { done }
                } else {
                    Phase::Analyzing { queue, done }
                };
                false
            }
            Phase::Merging { done } => {
                debug!(batches = done.len(), "analysis batches merged");
                self.phase = Phase::Updating { done };
                false
            }
            Phase::Updating { done } => {
                for analysis in &done {
                    registry.apply_analysis(analysis, host);
                }
                self.last_complete = Some(tick);
                self.phase = Phase::Idle;
                info!(
                    nodes = registry.nodes.len(),
                    edges = registry.spatial_edges.len(),
                    "analysis applied to registry"
                );
                true
            }
        }
    }
}

/// One batch per owned room: its 3×3 lattice box, skipping boxes whose
/// rooms an earlier batch already covers.
fn plan_batches(host: &dyn Host) -> VecDeque<Vec<RoomName>> {
    let mut covered: BTreeSet<RoomName> = BTreeSet::new();
    let mut queue = VecDeque::new();
    for room in host.owned_rooms() {
        let batch = analysis_box(host, &room);
        if batch.iter().all(|r| covered.contains(r)) {
            continue;
        }
        covered.extend(batch.iter().cloned());
        queue.push_back(batch);
    }
    queue
}

#[cfg(test)]
mod tests {
    use outpost_host::GridHost;
    use outpost_types::Terrain;

    use super::*;

    fn owned_plaza() -> GridHost {
        let mut host = GridHost::new();
        host.add_filled_room("W1N1", Terrain::Wall);
        for y in 21..=29u8 {
            for x in 21..=29u8 {
                host.set_terrain(
                    &outpost_types::WorldPos::new("W1N1", x, y),
                    Terrain::Plain,
                );
            }
        }
        let _ = host.add_spawn("W1N1", 25, 24, 550);
        let _ = host.add_controller("W1N1", 27, 27, 2, true);
        host
    }

    #[test]
    fn a_full_run_takes_one_batch_through_to_the_registry() {
        let host = owned_plaza();
        let mut registry = NodeRegistry::new();
        let mut scheduler = AnalysisScheduler::new();
        let config = AnalysisConfig::default();

        // Idle → Analyzing → Merging → Updating.
        assert!(!scheduler.step(&host, &mut registry, &config, 1));
        assert!(scheduler.in_flight());
        assert!(!scheduler.step(&host, &mut registry, &config, 2));
        assert!(!scheduler.step(&host, &mut registry, &config, 3));
        assert!(scheduler.step(&host, &mut registry, &config, 4));
        assert!(!scheduler.in_flight());
        assert_eq!(scheduler.last_complete(), Some(4));
        assert_eq!(registry.nodes.len(), 1);
    }

    #[test]
    fn cache_ttl_gates_the_next_run() {
        let host = owned_plaza();
        let mut registry = NodeRegistry::new();
        let mut scheduler = AnalysisScheduler::new();
        let config = AnalysisConfig::default();
        for tick in 1..=4 {
            let _ = scheduler.step(&host, &mut registry, &config, tick);
        }
        // Fresh cache: idle steps do nothing.
        assert!(!scheduler.step(&host, &mut registry, &config, 10));
        assert!(!scheduler.in_flight());
        // Past the TTL the next run begins.
        assert!(!scheduler.step(&host, &mut registry, &config, 4 + config.cache_ttl));
        assert!(scheduler.in_flight());
    }

    #[test]
    fn reset_discards_in_flight_work() {
        let host = owned_plaza();
        let mut registry = NodeRegistry::new();
        let mut scheduler = AnalysisScheduler::new();
        let config = AnalysisConfig::default();
        let _ = scheduler.step(&host, &mut registry, &config, 1);
        assert!(scheduler.in_flight());
        scheduler.reset();
        assert!(!scheduler.in_flight());
        assert!(scheduler.due(2, config.cache_ttl));
    }
}
