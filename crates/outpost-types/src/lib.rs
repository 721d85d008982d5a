//! Shared type definitions for the Outpost colony controller.
//!
//! This crate is the single source of truth for all plain-data types used
//! across the Outpost workspace. Everything here is serializable and free of
//! live host handles: the controller separates the records it owns and
//! persists from the host-engine views it rehydrates each tick.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe string identifiers for nodes, corps, resources
//! - [`coords`] -- Room names, world tiles, directions, distance helpers
//! - [`terrain`] -- Terrain classification and movement costs
//! - [`body`] -- Creep body parts, part costs, roles
//! - [`resources`] -- Resource records claimed by territory nodes
//! - [`node`] -- Territory nodes, ROI records, edge keys
//! - [`market`] -- Offers, contracts, transactions, clearing summaries
//! - [`variant`] -- Mining-mode/carry/ratio variants for source→sink edges
//! - [`spawn`] -- Spawn orders queued against spawning corps
//! - [`intel`] -- Room intelligence written back by scouts

pub mod body;
pub mod coords;
pub mod ids;
pub mod intel;
pub mod market;
pub mod node;
pub mod resources;
pub mod spawn;
pub mod terrain;
pub mod variant;

// Re-export all public types at crate root for convenience.
pub use body::{
    Body, CreepRole, Part, BUILD_POWER, CARRY_CAPACITY, CREEP_LIFE_TIME, HARVEST_POWER,
    MAX_BODY_PARTS, UPGRADE_POWER,
};
pub use coords::{Direction, RoomName, WorldPos, ROOM_SIZE};
pub use ids::{ContractId, CorpId, CreepName, NodeId, ResourceId};
pub use intel::{ControllerIntel, RoomIntel, SourceIntel};
pub use market::{ClearingSummary, Commodity, Contract, Offer, Side, Transaction};
pub use node::{CorpKind, EdgeKey, Node, NodeRoi, PotentialCorp};
pub use resources::{
    ResourceKind, ResourceRecord, ENERGY_REGEN_TIME, SOURCE_CAPACITY_NEUTRAL,
    SOURCE_CAPACITY_OWNED,
};
pub use spawn::SpawnOrder;
pub use terrain::{Terrain, ROAD_MOVE_COST};
pub use variant::{EdgeConstraints, EdgeVariant, HaulRatio, MiningMode, TerrainProfile};
