//! Typed configuration for the controller, loaded from YAML.
//!
//! Every field has a default matching the controller's standing policy, so
//! an empty file (or none at all) yields a working configuration. The
//! economy and survey blocks are re-exported from the crates that consume
//! them; this module only composes and loads.

use std::path::Path;

use serde::{Deserialize, Serialize};

use outpost_corps::EconomyParams;
use outpost_world::SurveyConfig;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        #[from]
        source: serde_yml::Error,
    },
}

/// Spatial-analysis cadence and batching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisConfig {
    /// Ticks a completed analysis stays valid.
    pub cache_ttl: u64,
    /// Maximum rooms processed in one batch (one batch per tick).
    pub max_rooms_per_batch: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cache_ttl: 5_000,
            max_rooms_per_batch: 9,
        }
    }
}

/// Logging cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggingConfig {
    /// Ticks between summary report lines. Zero disables them.
    pub report_interval: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            report_interval: 100,
        }
    }
}

/// Top-level controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ControllerConfig {
    /// Spatial analysis settings.
    pub analysis: AnalysisConfig,
    /// Economy tuning shared by corps and the market.
    pub economy: EconomyParams,
    /// ROI scoring knobs.
    pub survey: SurveyConfig,
    /// Logging cadence.
    pub logging: LoggingConfig,
}

impl ControllerConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yml::from_str(&contents)?)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = ControllerConfig::parse("{}").unwrap();
        assert_eq!(config.analysis.cache_ttl, 5_000);
        assert_eq!(config.analysis.max_rooms_per_batch, 9);
        assert_eq!(config.logging.report_interval, 100);
        assert!(!config.survey.include_sk_rooms);
    }

    #[test]
    fn overrides_apply() {
        let yaml = r"
analysis:
  cacheTtl: 1000
economy:
  maxPendingOrders: 4
survey:
  includeSkRooms: true
";
        let config = ControllerConfig::parse(yaml).unwrap();
        assert_eq!(config.analysis.cache_ttl, 1_000);
        assert_eq!(config.economy.max_pending_orders, 4);
        assert!(config.survey.include_sk_rooms);
        // Untouched blocks keep their defaults.
        assert_eq!(config.analysis.max_rooms_per_batch, 9);
    }
}
