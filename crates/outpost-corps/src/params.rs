//! Economy tuning parameters shared by every corp.
//!
//! The mint value and idle tax are deliberately configuration, not
//! constants: the upstream policy for both is unsettled, so the controller
//! exposes them with documented defaults instead of guessing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Economy-wide tuning, loaded as part of the controller config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EconomyParams {
    /// Reference price of one unit of energy, in credits.
    pub energy_value: Decimal,
    /// Margin sellers quote over marginal cost.
    pub margin: Decimal,
    /// Premium haulers pay for energy at a distant pickup.
    pub destination_premium: Decimal,
    /// Credits minted per upgrade point delivered to the controller.
    pub mint_value: Decimal,
    /// Fraction of its valuation an upgrade corp actually bids.
    pub upgrade_urgency: Decimal,
    /// Ask price per part of spawn work.
    pub spawn_work_ask: Decimal,
    /// Bid price per part of spawn work.
    pub spawn_work_bid: Decimal,
    /// Ticks an offer (and the contract it produces) stays open.
    pub offer_duration: u64,
    /// Ticks between a corp's planning passes (staggered per corp).
    pub plan_interval: u64,
    /// Ticks before an unserved spawn order is evicted.
    pub spawn_order_ttl: u64,
    /// Maximum pending spawn orders per room.
    pub max_pending_orders: usize,
    /// Credits taxed from a corp per 1,000 ticks without contract
    /// activity. Zero disables the levy.
    pub idle_tax: Decimal,
    /// Credits minted for each newly founded corp.
    pub seed_capital: Decimal,
}

impl Default for EconomyParams {
    fn default() -> Self {
        Self {
            energy_value: Decimal::new(10, 2),        // 0.10
            margin: Decimal::new(20, 2),              // 0.20
            destination_premium: Decimal::new(12, 1), // 1.2
            mint_value: Decimal::ONE,
            upgrade_urgency: Decimal::new(8, 1),      // 0.8
            spawn_work_ask: Decimal::new(8, 0),
            spawn_work_bid: Decimal::new(10, 0),
            offer_duration: 50,
            plan_interval: 50,
            spawn_order_ttl: 500,
            max_pending_orders: 2,
            idle_tax: Decimal::ZERO,
            seed_capital: Decimal::new(100, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let params = EconomyParams::default();
        assert!(params.energy_value > Decimal::ZERO);
        assert!(params.destination_premium > Decimal::ONE);
        assert_eq!(params.max_pending_orders, 2);
        assert_eq!(params.idle_tax, Decimal::ZERO);
    }

    #[test]
    fn params_round_trip_through_yaml_style_serde() {
        let params = EconomyParams::default();
        let json = serde_json::to_string(&params).unwrap_or_default();
        let back: EconomyParams = serde_json::from_str(&json).unwrap_or_default();
        assert_eq!(back, params);
    }
}
