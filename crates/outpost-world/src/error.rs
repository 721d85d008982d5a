//! Error types for spatial analysis and the node registry.

use outpost_types::{NodeId, ResourceId};

/// Errors raised by spatial analysis or registry operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A node id was looked up that the registry does not hold.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// A resource would be claimed by two nodes at once.
    #[error("resource {resource} already claimed by {holder}, rejected claim by {claimant}")]
    DoubleClaim {
        /// The contested resource.
        resource: ResourceId,
        /// The node holding the claim.
        holder: NodeId,
        /// The node whose claim was rejected.
        claimant: NodeId,
    },

    /// A peak produced an empty territory, which violates the partition
    /// invariant.
    #[error("peak {0} owns no territory")]
    EmptyTerritory(NodeId),

    /// Persisted registry state failed schema validation.
    #[error("persisted registry failed validation: {reason}")]
    InvalidPersistedState {
        /// What was wrong with the stored data.
        reason: String,
    },
}
