//! Error types for corp operations.

use outpost_types::{CorpId, RoomName};

/// Errors raised by corp management.
#[derive(Debug, thiserror::Error)]
pub enum CorpError {
    /// A corp id was looked up that the registry does not hold.
    #[error("unknown corp {0}")]
    UnknownCorp(CorpId),

    /// A spawn order was rejected because the queue is full.
    #[error("spawn queue full in {room} ({pending} pending)")]
    SpawnQueueFull {
        /// The room whose queue is full.
        room: RoomName,
        /// Orders already pending.
        pending: usize,
    },

    /// Persisted corp state failed schema validation.
    #[error("persisted corp state failed validation: {reason}")]
    InvalidPersistedState {
        /// What was wrong with the stored data.
        reason: String,
    },
}
