#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Composite disadvantage scoring for geographic units.
//!
//! Turns percentile indicator records into ranked, annotated areas:
//! population density is ranked within each aggregation level
//! ([`density`]), the eight indicators are summed and ranked
//! ([`composite`]), each area gets a "ranks highly in" explanation
//! ([`explanation`]) and a centroid ([`centroid`]). [`rollup`] builds the
//! county, state and city records from census tracts, and [`pipeline`]
//! runs the stages for one level.

pub mod centroid;
pub mod composite;
pub mod config;
pub mod density;
pub mod explanation;
pub mod percentile;
pub mod pipeline;
pub mod progress;
pub mod rollup;

use thiserror::Error;

/// Errors that can occur while configuring or running the scoring pipeline.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// Reading a config file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A config file is not valid TOML for [`config::PipelineConfig`].
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A config value is out of range.
    #[error("Invalid config: {message}")]
    InvalidConfig {
        /// Description of what went wrong.
        message: String,
    },
}
