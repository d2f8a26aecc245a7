//! Runs the scoring stages for one aggregation level.
//!
//! density -> composite score -> rank + top-N -> centroid join and
//! explanation. Levels share nothing mutable, so callers may run them in
//! parallel.

use equity_map_indicator_models::{AggregationLevel, IndicatorRecord, RankedArea};

use crate::centroid::{self, CentroidTable};
use crate::composite;
use crate::config::PipelineConfig;
use crate::density;
use crate::progress::ProgressCallback;

const STAGES: u64 = 4;

/// Result of ranking one level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelOutput {
    /// The level that was ranked.
    pub level: AggregationLevel,
    /// Ranked areas, best rank first.
    pub areas: Vec<RankedArea>,
    /// Records given to the pipeline.
    pub input_units: usize,
    /// Records with a complete indicator set.
    pub scored_units: usize,
}

/// Ranks the records of one level.
#[must_use]
pub fn rank_level(
    level: AggregationLevel,
    mut records: Vec<IndicatorRecord>,
    centroids: &CentroidTable,
    config: &PipelineConfig,
    progress: &dyn ProgressCallback,
) -> LevelOutput {
    let input_units = records.len();
    progress.set_total(STAGES);

    progress.set_message(format!("{}: population density", level.label()));
    let with_density = density::apply(&mut records);
    progress.inc(1);

    progress.set_message(format!("{}: composite score", level.label()));
    let scored = composite::score(&records);
    let scored_units = scored.len();
    progress.inc(1);

    progress.set_message(format!("{}: ranking", level.label()));
    let ranked = composite::rank(scored, config.top_n);
    progress.inc(1);

    progress.set_message(format!("{}: centroids", level.label()));
    let areas = centroid::attach(
        ranked,
        centroids,
        config.missing_centroid,
        config.explains(level),
    );
    progress.inc(1);

    log::info!(
        "{level}: {input_units} unit(s), {with_density} with density, {scored_units} scored, {} ranked",
        areas.len()
    );
    progress.finish(format!("{}: {} ranked area(s)", level.label(), areas.len()));

    LevelOutput {
        level,
        areas,
        input_units,
        scored_units,
    }
}
