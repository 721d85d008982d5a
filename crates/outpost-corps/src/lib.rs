//! Role corps for the Outpost colony controller.
//!
//! Corps are the colony's business units: process-wide economic actors
//! that buy and sell on the internal market, own creeps, and translate
//! market outcomes into host commands. One tagged variant per role keeps
//! the shared capability set (`buys`, `sells`, `plan`, `execute`, `work`)
//! in one place; the hard economics -- the edge-variant evaluator and the
//! lockstep spawn policy -- live beside them.
//!
//! # Modules
//!
//! - [`corp`] -- The [`Corp`] record, role dispatch, and [`CorpRegistry`]
//! - [`params`] -- Economy tuning ([`EconomyParams`])
//! - [`variants`] -- The edge-variant evaluator
//! - [`bodies`] -- Body composition and the part distributor
//! - [`orchestrator`] -- Workforce assessment and the lockstep policy
//! - [`harvest`], [`haul`], [`upgrade`], [`spawning`], [`construct`],
//!   [`bootstrap`], [`scout`] -- the seven role implementations
//! - [`error`] -- Corp error types

pub mod bodies;
pub mod bootstrap;
pub mod construct;
pub mod corp;
pub mod error;
pub mod harvest;
pub mod haul;
pub mod orchestrator;
pub mod params;
pub mod scout;
pub mod spawning;
pub mod upgrade;
pub mod variants;

pub use corp::{Corp, CorpContext, CorpRegistry, RoleState, SpawnedCreep, WorkOutcome};
pub use error::CorpError;
pub use orchestrator::{assess, orchestrate, Workforce};
pub use params::EconomyParams;
pub use variants::{evaluate, select};
