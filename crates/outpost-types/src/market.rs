//! Market offers, contracts, transactions, and clearing summaries.
//!
//! Prices and credit amounts are [`Decimal`] throughout: the money-supply
//! identity (`treasury + Σ balances == minted − taxed`) must hold exactly,
//! and `Decimal`'s total ordering doubles as the market's sort key.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::coords::WorldPos;
use crate::ids::{ContractId, CorpId};

// ---------------------------------------------------------------------------
// Commodities
// ---------------------------------------------------------------------------

/// A tradeable commodity. The order book is partitioned by commodity before
/// matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Commodity {
    /// Raw energy, priced per unit.
    Energy,
    /// Spawn work-ticks: units of body-part capacity per spawn cycle.
    SpawnWork,
    /// Construction progress.
    BuildWork,
}

impl Commodity {
    /// All commodities in matching order.
    pub const ALL: [Self; 3] = [Self::Energy, Self::SpawnWork, Self::BuildWork];

    /// Stable lowercase name for logs and persistence.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Energy => "energy",
            Self::SpawnWork => "spawnWork",
            Self::BuildWork => "buildWork",
        }
    }
}

impl core::fmt::Display for Commodity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of the book an offer sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    /// Wants to acquire the commodity.
    Buy,
    /// Wants to dispose of the commodity.
    Sell,
}

// ---------------------------------------------------------------------------
// Offers
// ---------------------------------------------------------------------------

/// A quote published by a corp for one clearing round.
///
/// Invariants the publisher owes the market: a seller's price is at or above
/// its marginal cost; a buyer's price is at or below its valuation times
/// urgency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    /// The quoting corp.
    pub corp: CorpId,
    /// Buy or sell.
    pub side: Side,
    /// The commodity quoted.
    pub commodity: Commodity,
    /// Units offered or wanted.
    pub quantity: u32,
    /// Price per unit, in credits.
    pub price: Decimal,
    /// Where delivery happens, when location matters (adds a distance
    /// premium to sellers farther from a buyer's location).
    pub location: Option<WorldPos>,
    /// Ticks a resulting contract should stay open.
    pub duration: u64,
}

impl Offer {
    /// Shorthand for a sell quote.
    pub fn sell(
        corp: CorpId,
        commodity: Commodity,
        quantity: u32,
        price: Decimal,
        duration: u64,
    ) -> Self {
        Self {
            corp,
            side: Side::Sell,
            commodity,
            quantity,
            price,
            location: None,
            duration,
        }
    }

    /// Shorthand for a buy quote.
    pub fn buy(
        corp: CorpId,
        commodity: Commodity,
        quantity: u32,
        price: Decimal,
        duration: u64,
    ) -> Self {
        Self {
            corp,
            side: Side::Buy,
            commodity,
            quantity,
            price,
            location: None,
            duration,
        }
    }

    /// Attach a delivery location.
    #[must_use]
    pub fn at(mut self, location: WorldPos) -> Self {
        self.location = Some(location);
        self
    }
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// A binding agreement produced by a market match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    /// Monotonic contract id.
    pub id: ContractId,
    /// The selling corp.
    pub seller: CorpId,
    /// The buying corp.
    pub buyer: CorpId,
    /// The commodity traded.
    pub commodity: Commodity,
    /// Units agreed.
    pub agreed_quantity: u32,
    /// Price per unit, `max(seller ask, buyer bid)` at clearing.
    pub price_per_unit: Decimal,
    /// Units delivered so far. Never exceeds `agreed_quantity`.
    pub delivered: u32,
    /// Units paid for so far. Payment never runs ahead of delivery.
    pub paid_units: u32,
    /// Tick the contract opened.
    pub open_tick: u64,
    /// Ticks the contract stays open.
    pub duration: u64,
}

impl Contract {
    /// Total price if fully delivered.
    pub fn total_price(&self) -> Decimal {
        self.price_per_unit * Decimal::from(self.agreed_quantity)
    }

    /// Credits paid so far.
    pub fn paid(&self) -> Decimal {
        self.price_per_unit * Decimal::from(self.paid_units)
    }

    /// First tick at which the contract is expired.
    pub const fn expires_at(&self) -> u64 {
        self.open_tick + self.duration
    }

    /// Whether the contract is still active at `now`.
    pub const fn is_active(&self, now: u64) -> bool {
        self.open_tick <= now && now < self.open_tick + self.duration
            && self.delivered < self.agreed_quantity
    }

    /// Whether every agreed unit has been delivered.
    pub const fn is_fulfilled(&self) -> bool {
        self.delivered >= self.agreed_quantity
    }

    /// Units delivered but not yet paid for.
    pub const fn unpaid_units(&self) -> u32 {
        self.delivered.saturating_sub(self.paid_units)
    }
}

// ---------------------------------------------------------------------------
// Transactions and summaries
// ---------------------------------------------------------------------------

/// An audit row recorded for every clearing match and kept after the
/// contract retires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Tick of the clearing round.
    pub tick: u64,
    /// The contract this row belongs to.
    pub contract: ContractId,
    /// Selling corp.
    pub seller: CorpId,
    /// Buying corp.
    pub buyer: CorpId,
    /// Commodity traded.
    pub commodity: Commodity,
    /// Units agreed.
    pub quantity: u32,
    /// Price per unit.
    pub price_per_unit: Decimal,
}

/// What one clearing round produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ClearingSummary {
    /// Ids of contracts emitted this round.
    pub contracts: Vec<ContractId>,
    /// Total units matched across all commodities.
    pub total_volume: u32,
    /// Volume-weighted average trade price, when any trade happened.
    pub average_price: Option<Decimal>,
    /// Buy quantity that found no seller at or below its bid.
    pub unmatched_buys: u32,
    /// Sell quantity that found no buyer at or above its ask.
    pub unmatched_sells: u32,
}
