//! Type-safe identifier wrappers for entities in the controller.
//!
//! Identifiers are deterministic strings rather than random UUIDs: a node id
//! derives from its peak's world coordinate, a corp id from its role and
//! assignment, and resource ids are either host-engine object ids or
//! synthetic `intel-*` ids recovered from stored intel. Determinism matters
//! because ids must survive serialization round trips and full spatial
//! rebuilds unchanged.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around [`String`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create an identifier from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Return the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

define_id! {
    /// Identifier for a territory node, derived from its peak coordinate.
    NodeId
}

define_id! {
    /// Identifier for a corp (role-typed economic actor).
    CorpId
}

define_id! {
    /// Identifier for a world resource: a host object id when vision is
    /// live, or a synthetic `intel-*` id when recovered from stored intel.
    ResourceId
}

define_id! {
    /// Name of a creep issued at spawn time and used for host commands.
    CreepName
}

/// Identifier for a market contract.
///
/// Contract ids are monotonically increasing within a market instance, so
/// iterating contracts in id order reproduces creation order -- settlement
/// relies on this for determinism.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ContractId(pub u64);

impl ContractId {
    /// Return the next contract id in sequence.
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl core::fmt::Display for ContractId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ct-{}", self.0)
    }
}
