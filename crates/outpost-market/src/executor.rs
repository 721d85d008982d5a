//! Contract settlement: credits follow deliveries, then contracts retire.
//!
//! Each tick, every contract pays out `(delivered − paid) × price` from
//! buyer to seller through the ledger, in contract-id order (creation
//! order, so settlement is deterministic). A contract retires once fully
//! delivered and paid, or at its expiry tick. Retired contracts stay in
//! the transaction log for auditing.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use outpost_ledger::Accounts;
use outpost_types::ContractId;

use crate::clearing::Market;

/// What one settlement pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettlementSummary {
    /// Total credits moved buyer → seller.
    pub paid: Decimal,
    /// Contracts retired as fulfilled.
    pub fulfilled: Vec<ContractId>,
    /// Contracts retired at expiry.
    pub expired: Vec<ContractId>,
}

/// Settle every contract against the ledger at tick `now`.
pub fn settle(market: &mut Market, accounts: &mut Accounts, now: u64) -> SettlementSummary {
    let mut summary = SettlementSummary::default();
    let ids: Vec<ContractId> = market.contracts().keys().copied().collect();

    for id in ids {
        let Some(contract) = market.contract(id) else {
            continue;
        };
        let unpaid = contract.unpaid_units();
        let buyer = contract.buyer.clone();
        let seller = contract.seller.clone();
        let price = contract.price_per_unit;
        let fulfilled = contract.is_fulfilled();
        let expired = contract.expires_at() <= now;

        if unpaid > 0 {
            let due = price * Decimal::from(unpaid);
            match accounts.transfer(&buyer, &seller, due) {
                Ok(()) => {
                    if let Some(contract) = market.contracts_mut().get_mut(&id) {
                        contract.paid_units += unpaid;
                    }
                    summary.paid += due;
                    debug!(contract = %id, %due, "contract payment settled");
                }
                Err(err) => {
                    // Ephemeral: leave the debt on the contract and retry
                    // next tick.
                    warn!(contract = %id, %err, "payment deferred");
                }
            }
        }

        if fulfilled {
            market.retire(id);
            summary.fulfilled.push(id);
        } else if expired {
            market.retire(id);
            summary.expired.push(id);
        }
    }
    summary
}
