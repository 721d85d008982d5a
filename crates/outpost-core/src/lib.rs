//! Tick orchestration for the Outpost colony controller.
//!
//! One `tick` invocation per discrete host tick is the unit of work. The
//! phases run in strict order -- restore, corps work, market clearing,
//! contract settlement, surveying, one batch of incremental spatial
//! analysis, persistence, reporting -- and no two phases share mutable
//! state concurrently. A tick never throws past its boundary: every
//! fallible phase logs and the tick completes.
//!
//! # Modules
//!
//! - [`config`] -- Typed YAML configuration
//! - [`tick`] -- [`Colony`]: the per-tick phase driver
//! - [`scheduler`] -- Three-phase incremental analysis with a cache TTL
//! - [`persist`] -- The persistence codec over the host's key-value store
//! - [`console`] -- Command surface as pure functions over the colony
//! - [`report`] -- Cadenced log summaries
//! - [`error`] -- Core error types

pub mod config;
pub mod console;
pub mod error;
pub mod persist;
pub mod report;
pub mod scheduler;
pub mod tick;

pub use config::ControllerConfig;
pub use error::CoreError;
pub use scheduler::AnalysisScheduler;
pub use tick::Colony;
