//! The money-supply identity check.
//!
//! Every balanced operation on [`Accounts`] preserves the identity by
//! construction, so this check exists as defense-in-depth: a violation
//! means data corruption or a bug bypassing the mutation paths, and it is
//! the economy's most serious integrity alert.

use rust_decimal::Decimal;
use tracing::error;

use crate::accounts::Accounts;

/// A detected breach of the money-supply identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAnomaly {
    /// `minted − taxed`: what the supply should be.
    pub expected: Decimal,
    /// `treasury + Σ balances`: what the supply is.
    pub actual: Decimal,
}

/// The result of a conservation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConservationResult {
    /// The identity holds.
    Balanced,
    /// The identity is broken.
    Anomaly(LedgerAnomaly),
}

/// Verify `treasury + Σ balances == minted − taxed`.
pub fn verify_conservation(accounts: &Accounts) -> ConservationResult {
    let expected = accounts.minted() - accounts.taxed();
    let actual = accounts.treasury() + accounts.total_balances();
    if expected == actual {
        ConservationResult::Balanced
    } else {
        error!(%expected, %actual, "money supply identity violated");
        ConservationResult::Anomaly(LedgerAnomaly { expected, actual })
    }
}
