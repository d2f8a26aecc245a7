//! Canonical file paths for equity map inputs and outputs.
//!
//! All paths are relative to the project root's `data/` directory.

use std::path::{Path, PathBuf};

use equity_map_indicator_models::AggregationLevel;

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`.
///
/// # Panics
///
/// Panics if the project root cannot be resolved.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("Failed to find project root from CARGO_MANIFEST_DIR")
        .to_path_buf()
}

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    project_root().join("data")
}

/// Returns the `data/inputs/` directory holding the screening-tool exports.
#[must_use]
pub fn inputs_dir() -> PathBuf {
    data_dir().join("inputs")
}

/// Returns the default census tract indicator table path.
#[must_use]
pub fn tracts_path() -> PathBuf {
    inputs_dir().join("census_tracts.csv")
}

/// Returns the default cities lookup path.
#[must_use]
pub fn cities_path() -> PathBuf {
    inputs_dir().join("cities.csv")
}

/// Returns the default directory of per-level centroid tables.
#[must_use]
pub fn centroids_dir() -> PathBuf {
    inputs_dir().join("centroids")
}

/// Returns the centroid table path for `level` inside `dir`
/// (e.g. `county_centres.csv`).
#[must_use]
pub fn centroids_path(dir: &Path, level: AggregationLevel) -> PathBuf {
    dir.join(format!("{level}_centres.csv"))
}

/// Returns the `data/generated/` directory for ranked outputs.
#[must_use]
pub fn generated_dir() -> PathBuf {
    data_dir().join("generated")
}

/// Returns the output path for `level` with extension `ext` inside `dir`
/// (e.g. `county_ranked.geojson`).
#[must_use]
pub fn output_path(dir: &Path, level: AggregationLevel, ext: &str) -> PathBuf {
    dir.join(format!("{level}_ranked.{ext}"))
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_file_names() {
        let dir = Path::new("/tmp/out");
        assert_eq!(
            centroids_path(dir, AggregationLevel::CensusTract),
            Path::new("/tmp/out/census_tract_centres.csv")
        );
        assert_eq!(
            output_path(dir, AggregationLevel::City, "geojson"),
            Path::new("/tmp/out/city_ranked.geojson")
        );
    }

    #[test]
    fn data_dir_is_under_project_root() {
        assert!(generated_dir().starts_with(data_dir()));
        assert!(tracts_path().starts_with(inputs_dir()));
    }
}
