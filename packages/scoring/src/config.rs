//! Pipeline configuration, loaded from TOML.
//!
//! The defaults live in `config/default.toml` and are embedded at compile
//! time. A user file only needs the keys it overrides.

use std::path::Path;

use equity_map_indicator_models::AggregationLevel;
use serde::{Deserialize, Serialize};

use crate::ScoringError;
use crate::centroid::MissingCentroid;
use crate::composite::DEFAULT_TOP_N;

/// Embedded default configuration.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config/default.toml");

/// Settings shared by every aggregation level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Units kept per level after ranking.
    pub top_n: usize,
    /// Policy for ranked units without a centroid.
    pub missing_centroid: MissingCentroid,
    /// Whether census tracts get an explanation.
    pub explain_tracts: bool,
    /// Levels built by a full run.
    pub levels: Vec<AggregationLevel>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            missing_centroid: MissingCentroid::Drop,
            explain_tracts: false,
            levels: AggregationLevel::ALL.to_vec(),
        }
    }
}

impl PipelineConfig {
    /// Parses and validates a TOML document. Missing keys take their
    /// default values.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::ConfigParse`] for malformed TOML or unknown
    /// keys, and [`ScoringError::InvalidConfig`] for out-of-range values.
    pub fn from_toml(toml_str: &str) -> Result<Self, ScoringError> {
        let config: Self = toml::de::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the config at `path`, or the embedded defaults when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError`] if the file cannot be read or is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ScoringError> {
        match path {
            Some(path) => {
                log::info!("Loading pipeline config from {}", path.display());
                Self::from_toml(&std::fs::read_to_string(path)?)
            }
            None => Self::from_toml(DEFAULT_CONFIG_TOML),
        }
    }

    /// Whether ranked areas at `level` get an explanation.
    #[must_use]
    pub const fn explains(&self, level: AggregationLevel) -> bool {
        match level {
            AggregationLevel::CensusTract => self.explain_tracts,
            _ => level.explained_by_default(),
        }
    }

    /// Replaces `top_n`, keeping the config valid.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::InvalidConfig`] if `top_n` is zero.
    pub fn with_top_n(mut self, top_n: usize) -> Result<Self, ScoringError> {
        self.top_n = top_n;
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ScoringError> {
        if self.top_n == 0 {
            return Err(ScoringError::InvalidConfig {
                message: "top_n must be at least 1".to_string(),
            });
        }
        if self.levels.is_empty() {
            return Err(ScoringError::InvalidConfig {
                message: "levels must name at least one aggregation level".to_string(),
            });
        }
        Ok(())
    }
}
