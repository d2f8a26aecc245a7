//! Runs the ranking pipeline for one or more aggregation levels.
//!
//! Inputs are read once and shared behind [`Arc`]; each level is rolled up,
//! ranked and written on its own blocking task with its own progress bar.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use equity_map_cli_utils::{IndicatifProgress, MultiProgress};
use equity_map_indicator_models::AggregationLevel;
use equity_map_scoring::centroid::CentroidTable;
use equity_map_scoring::config::PipelineConfig;
use equity_map_scoring::pipeline::{self, LevelOutput};
use equity_map_scoring::rollup::{self, PrimaryCities};
use equity_map_tables::{TableError, paths, read, write};

/// Input tables for a full run.
pub struct Inputs {
    pub tracts: PathBuf,
    pub cities: PathBuf,
    pub centroids_dir: PathBuf,
}

fn read_centroid_table(path: &Path) -> Result<CentroidTable, TableError> {
    let table: CentroidTable = read::read_centroids_file(path)?.into_iter().collect();
    log::debug!("Loaded {} centroid(s) from {}", table.len(), path.display());
    Ok(table)
}

fn log_summary(output: &LevelOutput, files: &[PathBuf]) {
    log::info!(
        "{}: {} of {} unit(s) scored, {} written",
        output.level.label(),
        output.scored_units,
        output.input_units,
        output.areas.len()
    );
    if let Some(top) = output.areas.first() {
        log::info!("{}: #1 is {} ({:.2})", output.level.label(), top.name, top.score);
    }
    for file in files {
        log::debug!("  {}", file.display());
    }
}

/// Rolls the tract table up to each of `levels`, ranks every level in
/// parallel and writes the outputs to `out_dir`.
///
/// The cities lookup is only read when the city level is requested; its
/// primary cities double as the city centroids.
///
/// # Errors
///
/// Returns an error if an input table cannot be read or an output cannot
/// be written.
pub async fn rank_levels(
    multi: &MultiProgress,
    inputs: &Inputs,
    levels: &[AggregationLevel],
    config: PipelineConfig,
    out_dir: &Path,
) -> Result<Vec<LevelOutput>, Box<dyn std::error::Error>> {
    let start = Instant::now();

    let mut unique: Vec<AggregationLevel> = Vec::with_capacity(levels.len());
    for level in levels {
        if !unique.contains(level) {
            unique.push(*level);
        }
    }

    let tracts_path = inputs.tracts.clone();
    let tracts =
        tokio::task::spawn_blocking(move || read::read_tracts_file(&tracts_path)).await??;
    log::info!(
        "Loaded {} tract(s) from {}",
        tracts.len(),
        inputs.tracts.display()
    );

    let cities = if unique.contains(&AggregationLevel::City) {
        let cities_path = inputs.cities.clone();
        let cities =
            tokio::task::spawn_blocking(move || read::read_cities_file(&cities_path)).await??;
        let primary = PrimaryCities::select(&cities);
        log::info!(
            "Selected {} primary cities from {} city record(s)",
            primary.len(),
            cities.len()
        );
        primary
    } else {
        PrimaryCities::default()
    };

    let tracts = Arc::new(tracts);
    let cities = Arc::new(cities);
    let config = Arc::new(config);

    let mut handles = Vec::with_capacity(unique.len());
    for level in unique {
        let progress = IndicatifProgress::stages_bar(multi, level.label());
        let tracts = Arc::clone(&tracts);
        let cities = Arc::clone(&cities);
        let config = Arc::clone(&config);
        let centroids_path = paths::centroids_path(&inputs.centroids_dir, level);
        let out_dir = out_dir.to_path_buf();

        handles.push(tokio::task::spawn_blocking(
            move || -> Result<(LevelOutput, Vec<PathBuf>), TableError> {
                let centroids = match level {
                    AggregationLevel::City => cities.centroids(),
                    _ => read_centroid_table(&centroids_path)?,
                };
                let records = rollup::rollup(&tracts, level, &cities);
                let output =
                    pipeline::rank_level(level, records, &centroids, &config, progress.as_ref());
                let files = write::write_level(&out_dir, level, &output.areas)?;
                Ok((output, files))
            },
        ));
    }

    let mut outputs = Vec::with_capacity(handles.len());
    for handle in handles {
        let (output, files) = handle.await??;
        log_summary(&output, &files);
        outputs.push(output);
    }

    log::info!(
        "Ranked {} level(s) in {:.1}s",
        outputs.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(outputs)
}

/// Ranks a single pre-aggregated level table and writes the outputs to
/// `out_dir`.
///
/// # Errors
///
/// Returns an error if the table or centroids cannot be read or an output
/// cannot be written.
pub async fn rank_table(
    multi: &MultiProgress,
    level: AggregationLevel,
    table: &Path,
    centroids: &Path,
    config: PipelineConfig,
    out_dir: &Path,
) -> Result<LevelOutput, Box<dyn std::error::Error>> {
    let progress = IndicatifProgress::stages_bar(multi, level.label());
    let table = table.to_path_buf();
    let centroids = centroids.to_path_buf();
    let out_dir = out_dir.to_path_buf();

    let (output, files) = tokio::task::spawn_blocking(
        move || -> Result<(LevelOutput, Vec<PathBuf>), TableError> {
            let records = read::read_level_table_file(&table)?;
            log::info!("Loaded {} record(s) from {}", records.len(), table.display());
            let centroids = read_centroid_table(&centroids)?;
            let output =
                pipeline::rank_level(level, records, &centroids, &config, progress.as_ref());
            let files = write::write_level(&out_dir, level, &output.areas)?;
            Ok((output, files))
        },
    )
    .await??;

    log_summary(&output, &files);

    Ok(output)
}
