#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI for the equity map.
//!
//! `rank` rolls the census tract table up to each requested aggregation
//! level and writes the ranked JSON, CSV and `GeoJSON` outputs. `rank-table`
//! ranks a single pre-aggregated level table. Run without a subcommand to
//! pick levels interactively.
//!
//! Uses `indicatif-log-bridge` (via [`equity_map_cli_utils::init_logger`])
//! so log lines and progress bars never fight for the terminal.

mod interactive;
mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use equity_map_indicator_models::AggregationLevel;
use equity_map_scoring::config::PipelineConfig;
use equity_map_tables::paths;

#[derive(Parser)]
#[command(name = "equity_map", about = "Rank areas by composite disadvantage score")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Roll the tract table up to each level and rank it
    Rank {
        /// Census tract indicator table
        #[arg(long)]
        tracts: Option<PathBuf>,

        /// Cities lookup used for the city level
        #[arg(long)]
        cities: Option<PathBuf>,

        /// Directory holding `<level>_centres.csv` files
        #[arg(long)]
        centroids_dir: Option<PathBuf>,

        /// Level to build (repeatable; defaults to the configured levels)
        #[arg(long = "level")]
        levels: Vec<AggregationLevel>,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Rank one pre-aggregated level table
    RankTable {
        /// Aggregation level of the table
        #[arg(long)]
        level: AggregationLevel,

        /// Indicator table for the level
        #[arg(long)]
        table: PathBuf,

        /// Centroid table for the level
        #[arg(long)]
        centroids: Option<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(clap::Args)]
struct CommonArgs {
    /// Areas kept per level
    #[arg(long)]
    top_n: Option<usize>,

    /// Pipeline config TOML (defaults to the embedded config)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

impl CommonArgs {
    fn config(&self) -> Result<PipelineConfig, equity_map_scoring::ScoringError> {
        let config = PipelineConfig::load(self.config.as_deref())?;
        match self.top_n {
            Some(top_n) => config.with_top_n(top_n),
            None => Ok(config),
        }
    }

    fn out_dir(&self) -> PathBuf {
        self.out_dir.clone().unwrap_or_else(paths::generated_dir)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = equity_map_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Rank {
            tracts,
            cities,
            centroids_dir,
            levels,
            common,
        }) => {
            let config = common.config()?;
            let levels = if levels.is_empty() {
                config.levels.clone()
            } else {
                levels
            };
            let inputs = run::Inputs {
                tracts: tracts.unwrap_or_else(paths::tracts_path),
                cities: cities.unwrap_or_else(paths::cities_path),
                centroids_dir: centroids_dir.unwrap_or_else(paths::centroids_dir),
            };
            run::rank_levels(&multi, &inputs, &levels, config, &common.out_dir()).await?;
        }
        Some(Commands::RankTable {
            level,
            table,
            centroids,
            common,
        }) => {
            let config = common.config()?;
            let centroids =
                centroids.unwrap_or_else(|| paths::centroids_path(&paths::centroids_dir(), level));
            run::rank_table(&multi, level, &table, &centroids, config, &common.out_dir()).await?;
        }
        None => interactive::run(&multi).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_levels() {
        let cli = Cli::try_parse_from([
            "equity_map",
            "rank",
            "--level",
            "county",
            "--level",
            "census_tract",
            "--top-n",
            "10",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Rank { levels, common, .. }) => {
                assert_eq!(
                    levels,
                    vec![AggregationLevel::County, AggregationLevel::CensusTract]
                );
                assert_eq!(common.top_n, Some(10));
                assert_eq!(common.config().unwrap().top_n, 10);
            }
            _ => panic!("expected rank"),
        }
    }

    #[test]
    fn parses_rank_table() {
        let cli = Cli::try_parse_from([
            "equity_map",
            "rank-table",
            "--level",
            "state",
            "--table",
            "states.csv",
            "--centroids",
            "state_centres.csv",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::RankTable {
                level,
                table,
                centroids,
                ..
            }) => {
                assert_eq!(level, AggregationLevel::State);
                assert_eq!(table, PathBuf::from("states.csv"));
                assert_eq!(centroids, Some(PathBuf::from("state_centres.csv")));
            }
            _ => panic!("expected rank-table"),
        }
    }

    #[test]
    fn rejects_unknown_level_and_zero_top_n() {
        assert!(Cli::try_parse_from(["equity_map", "rank", "--level", "zip"]).is_err());

        let cli = Cli::try_parse_from(["equity_map", "rank", "--top-n", "0"]).unwrap();
        match cli.command {
            Some(Commands::Rank { common, .. }) => assert!(common.config().is_err()),
            _ => panic!("expected rank"),
        }
    }

    #[test]
    fn no_subcommand_is_interactive() {
        let cli = Cli::try_parse_from(["equity_map"]).unwrap();
        assert!(cli.command.is_none());
    }
}
