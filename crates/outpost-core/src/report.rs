//! Cadenced log summaries: spawn, market, and supply-side stats.

use tracing::info;

use outpost_corps::RoleState;
use outpost_types::CorpKind;

use crate::tick::Colony;

/// Emit the periodic summary when the tick lands on the cadence.
pub fn maybe_report(colony: &Colony, tick: u64) {
    let interval = colony.config.logging.report_interval;
    if interval == 0 || tick == 0 || tick % interval != 0 {
        return;
    }

    let pending: usize = colony
        .corps
        .by_kind(CorpKind::Spawning)
        .map(|corp| match &corp.role {
            RoleState::Spawning(state) => state.queue.len(),
            _ => 0,
        })
        .sum();
    let creeps: usize = colony.corps.corps.values().map(|c| c.creeps.len()).sum();

    info!(
        tick,
        corps = colony.corps.corps.len(),
        creeps,
        spawn_queue = pending,
        "colony summary"
    );
    info!(
        tick,
        contracts = colony.market.contracts().len(),
        volume = colony.last_clearing.total_volume,
        unmatched_buys = colony.last_clearing.unmatched_buys,
        unmatched_sells = colony.last_clearing.unmatched_sells,
        "market summary"
    );
    info!(
        tick,
        minted = %colony.accounts.minted(),
        taxed = %colony.accounts.taxed(),
        treasury = %colony.accounts.treasury(),
        balances = %colony.accounts.total_balances(),
        "supply summary"
    );
}
