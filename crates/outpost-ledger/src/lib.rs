//! Credit accounts and money-supply bookkeeping for the Outpost colony
//! controller.
//!
//! Credits enter the economy by minting (upgrade points delivered to the
//! controller) and leave it by taxation (idle corps, debt resets). Between
//! those flows every movement is a balanced transfer, so the money-supply
//! identity holds at all times:
//!
//! ```text
//! treasury + Σ corp balances == minted − taxed
//! ```
//!
//! # Design
//!
//! - **Single mutation path**: balances change only through
//!   [`Accounts::transfer`], [`Accounts::mint`], and [`Accounts::tax`]
//!   (and their treasury variants). Direct writes do not exist.
//! - **Exact arithmetic**: all quantities are [`rust_decimal::Decimal`].
//! - **Freezing**: a balance overdrawn past the grace threshold marks the
//!   corp inactive; outgoing transfers are refused until a reset.
//!
//! # Modules
//!
//! - [`accounts`] -- The [`Accounts`] table: balances, treasury, mint/tax
//! - [`conservation`] -- The money-supply identity check
//! - [`log`] -- Bounded transaction log kept for auditing

pub mod accounts;
pub mod conservation;
pub mod error;
pub mod log;

pub use accounts::Accounts;
pub use conservation::{verify_conservation, ConservationResult, LedgerAnomaly};
pub use error::LedgerError;
pub use log::TransactionLog;
