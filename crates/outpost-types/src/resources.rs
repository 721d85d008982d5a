//! Resource records claimed by territory nodes.
//!
//! A resource is anything in the world a corp can be built around: sources,
//! controllers, minerals, spawns, and the container/storage sinks haulers
//! deliver to. Records are plain data; the live host object is looked up by
//! id at the start of each tick.

use serde::{Deserialize, Serialize};

use crate::coords::WorldPos;
use crate::ids::ResourceId;

/// Energy capacity of an unreserved neutral source.
pub const SOURCE_CAPACITY_NEUTRAL: u32 = 1500;

/// Energy capacity of an owned or reserved source.
pub const SOURCE_CAPACITY_OWNED: u32 = 3000;

/// Ticks between source regenerations.
pub const ENERGY_REGEN_TIME: u32 = 300;

/// The kind of a world resource, with kind-specific data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ResourceKind {
    /// An energy source that refills every `regen_ticks`.
    Source {
        /// Energy per regeneration cycle.
        capacity: u32,
        /// Ticks between refills.
        regen_ticks: u32,
    },
    /// A room controller.
    Controller {
        /// Current controller level.
        level: u8,
        /// Whether we own it.
        owned: bool,
    },
    /// A mineral deposit.
    Mineral {
        /// Mineral type, as reported by the host.
        mineral: String,
    },
    /// A spawn structure.
    Spawn {
        /// Energy capacity available for spawning in its room.
        energy_capacity: u32,
    },
    /// A container sink/buffer.
    Container,
    /// A storage sink.
    Storage,
}

impl ResourceKind {
    /// Whether this resource makes its node *economic* (tradeable).
    pub const fn is_economic(&self) -> bool {
        matches!(
            self,
            Self::Source { .. } | Self::Controller { .. } | Self::Mineral { .. }
        )
    }

    /// Whether this is a source.
    pub const fn is_source(&self) -> bool {
        matches!(self, Self::Source { .. })
    }

    /// Whether this is a controller.
    pub const fn is_controller(&self) -> bool {
        matches!(self, Self::Controller { .. })
    }
}

/// A resource claimed by a territory node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Host object id, or a synthetic `intel-*` id.
    pub id: ResourceId,
    /// Where the resource sits.
    pub pos: WorldPos,
    /// What it is.
    pub kind: ResourceKind,
}

impl ResourceRecord {
    /// Create a record.
    pub fn new(id: impl Into<ResourceId>, pos: WorldPos, kind: ResourceKind) -> Self {
        Self {
            id: id.into(),
            pos,
            kind,
        }
    }
}
