//! Host-engine boundary for the Outpost colony controller.
//!
//! The controller treats its host as four things: a terrain provider, an
//! actuator that accepts spawn and creep commands, a time source, and a
//! key-value store for persisted state. This crate defines those contracts
//! and ships a deterministic in-memory implementation ([`GridHost`]) plus
//! the scenario-file loader used for offline evaluation.
//!
//! # Modules
//!
//! - [`engine`] -- The [`Host`] trait and command result codes
//! - [`store`] -- The [`Store`] persistence trait and [`MemoryStore`]
//! - [`grid`] -- [`GridHost`]: an in-memory world for tests and the binary
//! - [`scenario`] -- Scenario JSON schema and loader
//! - [`error`] -- Host-side error types

pub mod engine;
pub mod error;
pub mod grid;
pub mod scenario;
pub mod store;

pub use engine::{Host, HostCode};
pub use error::HostError;
pub use grid::GridHost;
pub use scenario::{Scenario, ScenarioConfig, ScenarioRoom, RouteSpec};
pub use store::{MemoryStore, Store};
