//! Spatial core for the Outpost colony controller.
//!
//! This crate turns raw terrain into the node graph every other subsystem
//! consumes: a cross-room wall-distance transform, peak detection with
//! height-scaled suppression, BFS territory partitioning, spatial and
//! economic edge synthesis, the node registry, and the ROI surveyor.
//!
//! # Modules
//!
//! - [`lattice`] -- [`RoomLattice`]: absolute embedding of the analyzed
//!   room set, built from the host's exit map.
//! - [`transform`] -- The openness transform (wall distance, inverted view
//!   of distance-to-open-ground), cross-room, capped at `max_rooms`.
//! - [`peaks`] -- Plateau detection and radius suppression.
//! - [`territory`] -- Shared-queue BFS partition of tiles among peaks.
//! - [`edges`] -- Spatial edges (adjacency + MST backbone) and capped
//!   top-K economic edges.
//! - [`registry`] -- The node registry: nodes, claimed resources, intel,
//!   delivery points.
//! - [`survey`] -- Per-node potential corps and ROI scoring.
//! - [`error`] -- Error types for spatial analysis.

pub mod edges;
pub mod error;
pub mod lattice;
pub mod peaks;
pub mod registry;
pub mod survey;
pub mod territory;
pub mod transform;

pub use edges::{economic_edges, spatial_edges};
pub use error::WorldError;
pub use lattice::{analysis_box, RoomLattice};
pub use peaks::{detect_peaks, filter_peaks, Peak};
pub use registry::{Analysis, NodeRegistry};
pub use survey::{SurveyConfig, Surveyor};
pub use territory::partition;
pub use transform::OpennessTransform;
