//! [`Colony`]: the per-tick phase driver.
//!
//! Phase order within a tick, per the concurrency contract:
//!
//! 0. Restore persisted state (first tick only) and found missing corps.
//! 1. Corps act: workforce assessment, the lockstep orchestrator, then
//!    every corp's staggered `plan` and its `work` against the host.
//! 2. Market clearing over the corps' published offers.
//! 3. Contract settlement, corp reconciliation, minting, the idle levy,
//!    and the money-supply audit.
//! 4. Colony surveying (ROI refresh).
//! 5. At most one step of the incremental spatial scheduler.
//! 6. Persistence (best-effort).
//! 7. Cadenced reporting.
//!
//! Phases communicate only through registries already updated this tick
//! or earlier ones, and the driver never lets an error escape the tick.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{error, warn};

use outpost_corps::{CorpContext, CorpRegistry, EconomyParams, WorkOutcome};
use outpost_host::{Host, Store};
use outpost_ledger::{verify_conservation, Accounts, ConservationResult};
use outpost_market::Market;
use outpost_types::{ClearingSummary, CorpId, RoomName};
use outpost_world::{NodeRegistry, Surveyor};

use crate::config::ControllerConfig;
use crate::persist;
use crate::report;
use crate::scheduler::AnalysisScheduler;

/// Ticks between idle-levy sweeps.
const IDLE_TAX_INTERVAL: u64 = 1_000;

/// The whole colony: every registry the tick phases share.
#[derive(Debug)]
pub struct Colony {
    /// Controller configuration.
    pub config: ControllerConfig,
    /// The node registry.
    pub registry: NodeRegistry,
    /// All corps.
    pub corps: CorpRegistry,
    /// The internal market.
    pub market: Market,
    /// Credit accounts.
    pub accounts: Accounts,
    /// The incremental analysis scheduler.
    pub scheduler: AnalysisScheduler,
    /// The ROI surveyor.
    pub surveyor: Surveyor,
    /// Last clearing round's summary, for reporting and the console.
    pub last_clearing: ClearingSummary,
    restored: bool,
}

impl Colony {
    /// Create a colony from configuration, with empty registries.
    pub fn new(config: ControllerConfig) -> Self {
        let surveyor = Surveyor::new(config.survey.clone());
        Self {
            config,
            registry: NodeRegistry::new(),
            corps: CorpRegistry::new(),
            market: Market::new(),
            accounts: Accounts::new(),
            scheduler: AnalysisScheduler::new(),
            surveyor,
            last_clearing: ClearingSummary::default(),
            restored: false,
        }
    }

    /// Run one tick against the host and store.
    pub fn tick(&mut self, host: &mut dyn Host, store: &mut dyn Store) {
        let tick = host.time();

        // Phase 0: restore once, then found whatever corps are missing.
        if !self.restored {
            persist::restore(self, store);
            self.restored = true;
        }
        self.corps.ensure_colony_corps(
            host,
            &self.registry,
            &self.config.economy,
            &mut self.accounts,
            tick,
        );

        // Phase 1: corps act.
        let workforce = outpost_corps::assess(&self.corps, host);
        let spawn_energy: BTreeMap<RoomName, (u32, u32)> = host
            .owned_rooms()
            .into_iter()
            .map(|room| {
                let energy = host.spawn_energy(&room);
                (room, energy)
            })
            .collect();
        outpost_corps::orchestrate(&mut self.corps, &workforce, &self.config.economy, tick);

        let ids: Vec<CorpId> = self.corps.corps.keys().cloned().collect();
        let mut outcome = WorkOutcome::default();
        for id in &ids {
            let ctx = CorpContext {
                tick,
                registry: &self.registry,
                params: &self.config.economy,
                workforce: &workforce,
                spawn_energy: &spawn_energy,
            };
            if let Some(corp) = self.corps.corps.get_mut(id) {
                if corp.plan_due(tick, self.config.economy.plan_interval) {
                    corp.plan(&ctx);
                }
                outcome.absorb(corp.work(host, &ctx));
            }
        }
        self.apply_work_outcome(outcome, tick);

        // Phase 2: market clearing.
        let mut offers = Vec::new();
        for id in &ids {
            let ctx = CorpContext {
                tick,
                registry: &self.registry,
                params: &self.config.economy,
                workforce: &workforce,
                spawn_energy: &spawn_energy,
            };
            if let Some(corp) = self.corps.corps.get(id) {
                offers.extend(corp.buys(&ctx));
                offers.extend(corp.sells(&ctx));
            }
        }
        let summary = self.market.clear(&offers, tick);
        for contract_id in &summary.contracts {
            let Some(contract) = self.market.contract(*contract_id) else {
                continue;
            };
            let value = contract.total_price();
            let (seller, buyer) = (contract.seller.clone(), contract.buyer.clone());
            if let Some(corp) = self.corps.corps.get_mut(&seller) {
                corp.record_revenue(value);
                corp.last_activity = tick;
            }
            if let Some(corp) = self.corps.corps.get_mut(&buyer) {
                corp.record_cost(value);
                corp.last_activity = tick;
            }
        }
        self.last_clearing = summary;

        // Phase 3: settlement, reconciliation, minting, levy, audit.
        let _ = outpost_market::settle(&mut self.market, &mut self.accounts, tick);
        let contracts = self.market.contracts().clone();
        for id in &ids {
            if let Some(corp) = self.corps.corps.get_mut(id) {
                corp.execute(&contracts, tick);
                let points = corp.take_pending_mint();
                if points > 0 {
                    let credits =
                        self.config.economy.mint_value * Decimal::from(points);
                    if let Err(err) = self.accounts.mint(&corp.id, credits) {
                        warn!(corp = %corp.id, %err, "mint failed");
                    }
                }
            }
        }
        self.apply_idle_levy(tick);
        if let ConservationResult::Anomaly(anomaly) = verify_conservation(&self.accounts) {
            error!(
                expected = %anomaly.expected,
                actual = %anomaly.actual,
                "money supply audit failed"
            );
        }

        // Phase 4: survey.
        let owned = host.owned_rooms();
        self.surveyor.survey(&mut self.registry, &owned);

        // Phase 5: one scheduler step.
        let _ = self
            .scheduler
            .step(host, &mut self.registry, &self.config.analysis, tick);

        // Phase 6: persist (best-effort).
        persist::save(self, store);

        // Phase 7: report.
        report::maybe_report(self, tick);
    }

    fn apply_work_outcome(&mut self, outcome: WorkOutcome, tick: u64) {
        for (contract, quantity) in outcome.deliveries {
            if let Err(err) = self.market.record_delivery(contract, quantity) {
                // The contract may have expired between phases; drop it.
                warn!(%contract, %err, "delivery on retired contract dropped");
            }
        }
        for spawned in outcome.spawned {
            if let Some(corp) = self.corps.corps.get_mut(&spawned.owner) {
                corp.creeps.insert(spawned.name);
                corp.last_activity = tick;
            }
        }
        for intel in outcome.intel {
            self.registry.record_intel(intel);
        }
    }

    /// Tax corps that have gone a full interval without contract activity.
    fn apply_idle_levy(&mut self, tick: u64) {
        let levy = self.config.economy.idle_tax;
        if levy <= Decimal::ZERO || tick == 0 || tick % IDLE_TAX_INTERVAL != 0 {
            return;
        }
        let idle: Vec<CorpId> = self
            .corps
            .corps
            .values()
            .filter(|corp| tick.saturating_sub(corp.last_activity) >= IDLE_TAX_INTERVAL)
            .map(|corp| corp.id.clone())
            .collect();
        for id in idle {
            if let Err(err) = self.accounts.tax(&id, levy) {
                warn!(corp = %id, %err, "idle levy failed");
            }
        }
    }

    /// Economy tuning in use.
    pub const fn params(&self) -> &EconomyParams {
        &self.config.economy
    }
}
