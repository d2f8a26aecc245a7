//! Interactive mode, used when no subcommand is given.
//!
//! Prompts for the levels to build and, optionally, the pipeline settings,
//! then runs [`crate::run::rank_levels`] on the default input paths.

use dialoguer::{Confirm, Input, MultiSelect, Select};
use equity_map_cli_utils::MultiProgress;
use equity_map_indicator_models::AggregationLevel;
use equity_map_scoring::centroid::MissingCentroid;
use equity_map_scoring::config::PipelineConfig;
use equity_map_tables::paths;

use crate::run::{self, Inputs};

const POLICIES: &[(MissingCentroid, &str)] = &[
    (MissingCentroid::Drop, "Drop areas without a centroid"),
    (MissingCentroid::Retain, "Keep them without a map marker"),
];

/// Runs the interactive flow.
///
/// # Errors
///
/// Returns an error if a prompt fails, the config is invalid, or the run
/// fails.
pub async fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    println!("Equity Map");
    println!();

    let config = PipelineConfig::load(None)?;

    let labels: Vec<&str> = AggregationLevel::ALL
        .iter()
        .map(|level| level.label())
        .collect();
    let defaults: Vec<bool> = AggregationLevel::ALL
        .iter()
        .map(|level| config.levels.contains(level))
        .collect();

    let selected = MultiSelect::new()
        .with_prompt("Levels to rank (space=toggle, a=all, enter=confirm)")
        .items(&labels)
        .defaults(&defaults)
        .interact()?;

    if selected.is_empty() {
        println!("No levels selected.");
        return Ok(());
    }

    let levels: Vec<AggregationLevel> = selected
        .iter()
        .map(|&i| AggregationLevel::ALL[i])
        .collect();

    let customize = Confirm::new()
        .with_prompt("Customize settings?")
        .default(false)
        .interact()?;

    let config = if customize {
        prompt_settings(config)?
    } else {
        config
    };

    let inputs = Inputs {
        tracts: paths::tracts_path(),
        cities: paths::cities_path(),
        centroids_dir: paths::centroids_dir(),
    };

    run::rank_levels(multi, &inputs, &levels, config, &paths::generated_dir()).await?;

    Ok(())
}

fn prompt_settings(config: PipelineConfig) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    let top_n: usize = Input::new()
        .with_prompt("Areas kept per level")
        .default(config.top_n)
        .interact_text()?;

    let policy_labels: Vec<&str> = POLICIES.iter().map(|(_, label)| *label).collect();
    let current = POLICIES
        .iter()
        .position(|(policy, _)| *policy == config.missing_centroid)
        .unwrap_or(0);
    let policy = Select::new()
        .with_prompt("Areas without a centroid")
        .items(&policy_labels)
        .default(current)
        .interact()?;

    let explain_tracts = Confirm::new()
        .with_prompt("Explain census tract rankings?")
        .default(config.explain_tracts)
        .interact()?;

    let mut config = config.with_top_n(top_n)?;
    config.missing_centroid = POLICIES[policy].0;
    config.explain_tracts = explain_tracts;

    Ok(config)
}
