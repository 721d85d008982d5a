//! Error types for the tick driver and its phases.

/// Errors surfaced by core phases. All of them stop at the tick boundary:
/// the driver logs and the tick completes.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Configuration failed to load or parse.
    #[error("configuration error: {source}")]
    Config {
        /// The underlying error.
        #[from]
        source: crate::config::ConfigError,
    },

    /// Persisted state failed to decode; the affected registry was
    /// dropped and rebuilt from live state.
    #[error("persisted state invalid under key {key}: {reason}")]
    InvalidPersistedState {
        /// The store key that failed.
        key: String,
        /// Why decoding failed.
        reason: String,
    },

    /// A ledger operation inside a phase failed.
    #[error("ledger error: {source}")]
    Ledger {
        /// The underlying error.
        #[from]
        source: outpost_ledger::LedgerError,
    },
}
