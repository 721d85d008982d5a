//! Error types for market operations.

use outpost_types::ContractId;

/// Errors raised by the market and settlement.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    /// A delivery or payment referenced a contract the market no longer
    /// holds.
    #[error("unknown contract {0}")]
    UnknownContract(ContractId),

    /// A delivery would exceed the contract's agreed quantity.
    #[error("delivery of {quantity} exceeds remainder of contract {contract}")]
    OverDelivery {
        /// The contract.
        contract: ContractId,
        /// The excess quantity offered.
        quantity: u32,
    },
}
