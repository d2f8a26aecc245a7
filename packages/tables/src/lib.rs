#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Table I/O for the equity map.
//!
//! Reads the screening-tool tract table, pre-aggregated level tables, the
//! cities lookup and centroid lookups from CSV ([`read`]), and writes
//! ranked areas as JSON records, CSV and a point `GeoJSON` layer
//! ([`write`]). Column names are matched case-insensitively, and empty
//! cells are read as absent values.

pub mod paths;
pub mod read;
pub mod write;

/// Errors that can occur while reading or writing tables.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// I/O error (file open, create, write).
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// CSV reading or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required column is missing from a table header.
    #[error("{table} table has no '{column}' column")]
    MissingColumn {
        /// Which table was being read.
        table: &'static str,
        /// The expected column name.
        column: String,
    },
}

impl TableError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
