//! [`Market`]: the contract table and the per-tick clearing round.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use outpost_ledger::TransactionLog;
use outpost_types::{
    ClearingSummary, Commodity, Contract, ContractId, Offer, Side, Transaction,
};

use crate::book::effective_ask;
use crate::error::MarketError;

/// The market: active contracts, the audit log, and the clearing engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Market {
    contracts: BTreeMap<ContractId, Contract>,
    /// Audit rows for the last thousand matches, retained past retirement.
    pub log: TransactionLog,
    next_contract: ContractId,
}

impl Market {
    /// Create an empty market.
    pub fn new() -> Self {
        Self::default()
    }

    /// The active contract table, keyed by id.
    pub const fn contracts(&self) -> &BTreeMap<ContractId, Contract> {
        &self.contracts
    }

    /// Look up one contract.
    pub fn contract(&self, id: ContractId) -> Option<&Contract> {
        self.contracts.get(&id)
    }

    /// Contracts still active at `now`, in id order.
    pub fn active_contracts(&self, now: u64) -> impl Iterator<Item = &Contract> {
        self.contracts.values().filter(move |c| c.is_active(now))
    }

    /// Remove a contract from the active table (the log keeps its rows).
    pub(crate) fn retire(&mut self, id: ContractId) -> Option<Contract> {
        self.contracts.remove(&id)
    }

    /// Mutable access for settlement bookkeeping.
    pub(crate) fn contracts_mut(&mut self) -> &mut BTreeMap<ContractId, Contract> {
        &mut self.contracts
    }

    /// Record units delivered against a contract, clamped so delivery can
    /// never exceed the agreed quantity.
    ///
    /// Returns the units actually credited.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::UnknownContract`] when the contract has
    /// already retired or never existed.
    pub fn record_delivery(
        &mut self,
        id: ContractId,
        quantity: u32,
    ) -> Result<u32, MarketError> {
        let contract = self
            .contracts
            .get_mut(&id)
            .ok_or(MarketError::UnknownContract(id))?;
        let room = contract.agreed_quantity - contract.delivered;
        let credited = quantity.min(room);
        contract.delivered += credited;
        Ok(credited)
    }

    /// Drop all active contracts and the audit log (god-mode reset).
    pub fn reset(&mut self) {
        self.contracts.clear();
        self.log.clear();
    }

    /// Run one clearing round over the published offers.
    ///
    /// Offers are partitioned by commodity. Within each commodity buyers
    /// are walked in descending bid order (urgency first); each buyer
    /// consumes the cheapest compatible sellers -- ordered by effective
    /// price including the distance premium toward the buyer's location --
    /// until its quantity is exhausted or no remaining ask fits under its
    /// bid. Each atomic match emits a contract at `max(ask, bid)` with
    /// duration `min(seller, buyer)`.
    ///
    /// Clearing is deterministic for a given offer list: ties in price
    /// resolve by corp id, then input order.
    pub fn clear(&mut self, offers: &[Offer], tick: u64) -> ClearingSummary {
        let mut summary = ClearingSummary::default();
        let mut traded_value = Decimal::ZERO;

        for commodity in Commodity::ALL {
            let mut sells: Vec<(Offer, u32)> = offers
                .iter()
                .filter(|o| o.commodity == commodity && o.side == Side::Sell && o.quantity > 0)
                .map(|o| (o.clone(), o.quantity))
                .collect();
            let mut buys: Vec<(Offer, u32)> = offers
                .iter()
                .filter(|o| o.commodity == commodity && o.side == Side::Buy && o.quantity > 0)
                .map(|o| (o.clone(), o.quantity))
                .collect();
            if buys.is_empty() && sells.is_empty() {
                continue;
            }

            // Urgency first; ties by corp for determinism.
            buys.sort_by(|(a, _), (b, _)| {
                b.price.cmp(&a.price).then_with(|| a.corp.cmp(&b.corp))
            });

            for (buyer, remaining) in &mut buys {
                // Cheapest effective price first for this buyer.
                sells.sort_by(|(a, _), (b, _)| {
                    effective_ask(a, buyer.location.as_ref())
                        .cmp(&effective_ask(b, buyer.location.as_ref()))
                        .then_with(|| a.price.cmp(&b.price))
                        .then_with(|| a.corp.cmp(&b.corp))
                });

                for (seller, available) in &mut sells {
                    if *remaining == 0 {
                        break;
                    }
                    if *available == 0 || seller.corp == buyer.corp {
                        continue;
                    }
                    if effective_ask(seller, buyer.location.as_ref()) > buyer.price {
                        // Sellers are sorted: nothing further can fit.
                        break;
                    }
                    let quantity = (*remaining).min(*available);
                    // The seller's floor is preserved; the buyer pays its
                    // urgency premium when it exceeds the floor.
                    let price = seller.price.max(buyer.price);
                    let contract = self.emit_contract(seller, buyer, quantity, price, tick);
                    traded_value += price * Decimal::from(quantity);
                    summary.total_volume += quantity;
                    summary.contracts.push(contract);
                    *remaining -= quantity;
                    *available -= quantity;
                }
            }

            summary.unmatched_buys += buys.iter().map(|(_, r)| r).sum::<u32>();
            summary.unmatched_sells += sells.iter().map(|(_, r)| r).sum::<u32>();
        }

        if summary.total_volume > 0 {
            summary.average_price = Some(traded_value / Decimal::from(summary.total_volume));
            info!(
                tick,
                volume = summary.total_volume,
                contracts = summary.contracts.len(),
                unmatched_buys = summary.unmatched_buys,
                unmatched_sells = summary.unmatched_sells,
                "market cleared"
            );
        } else {
            debug!(tick, "market cleared with no matches");
        }
        summary
    }

    fn emit_contract(
        &mut self,
        seller: &Offer,
        buyer: &Offer,
        quantity: u32,
        price: Decimal,
        tick: u64,
    ) -> ContractId {
        let id = self.next_contract;
        self.next_contract = self.next_contract.next();
        let contract = Contract {
            id,
            seller: seller.corp.clone(),
            buyer: buyer.corp.clone(),
            commodity: seller.commodity,
            agreed_quantity: quantity,
            price_per_unit: price,
            delivered: 0,
            paid_units: 0,
            open_tick: tick,
            duration: seller.duration.min(buyer.duration),
        };
        self.log.push(Transaction {
            tick,
            contract: id,
            seller: seller.corp.clone(),
            buyer: buyer.corp.clone(),
            commodity: seller.commodity,
            quantity,
            price_per_unit: price,
        });
        self.contracts.insert(id, contract);
        id
    }
}
