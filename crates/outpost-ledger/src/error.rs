//! Error types for ledger operations.

use outpost_types::CorpId;
use rust_decimal::Decimal;

/// Errors raised by account operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The corp has no open account.
    #[error("no account for corp {0}")]
    UnknownAccount(CorpId),

    /// The corp's balance is frozen pending a reset.
    #[error("account for corp {0} is frozen")]
    FrozenAccount(CorpId),

    /// A transfer, mint, or tax amount must be positive.
    #[error("non-positive amount {amount} in {operation}")]
    NonPositiveAmount {
        /// The offending amount.
        amount: Decimal,
        /// Which operation was attempted.
        operation: &'static str,
    },
}
