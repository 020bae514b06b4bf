// Command line interface: one subcommand per report, each printed as JSON.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing::warn;

use guillotine_core::career::{average_finishes, career_profile};
use guillotine_core::death_bell::death_bell;
use guillotine_core::model::Week;
use guillotine_core::recap::generate_recap;
use guillotine_core::season::{process_season, SeasonReport};
use guillotine_core::transactions::transaction_report;

use crate::config::Config;
use crate::ingest::season_snapshot;

/// Guillotine league reports
#[derive(Debug, Parser)]
#[command(name = "guillotine")]
#[command(about = "Standings, recaps and FAAB reports for a guillotine fantasy league")]
pub struct Cli {
    /// Directory holding config/ (or defaults/ on first run)
    #[arg(short, long, default_value = ".")]
    pub base_dir: PathBuf,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Standings, FAAB and weekly statistics for one season
    Season {
        season: u32,
        /// View the season as it stood after this week
        #[arg(short, long)]
        week: Option<Week>,
    },
    /// Season recap: elimination order, superlatives, close calls, blowouts
    Recap { season: u32 },
    /// Waiver wins and weekly FAAB spend
    Transactions {
        season: u32,
        #[arg(short, long)]
        week: Option<Week>,
    },
    /// Players who were rostered by a team in its chop week
    ChoppedPlayers { season: u32 },
    /// Career profile for one manager across every configured season
    Manager { name: String },
    /// Every manager's finish per season, best average first
    AverageFinishes,
    /// Configured seasons
    Seasons,
}

/// Run `command` and return its JSON output.
pub fn execute(config: &Config, command: &Command) -> Result<Value> {
    let value = match command {
        Command::Season { season, week } => serde_json::to_value(season_report(config, *season, *week)?)?,
        Command::Recap { season } => {
            let report = season_report(config, *season, None)?;
            serde_json::to_value(generate_recap(&report, &config.season_settings().recap))?
        }
        Command::Transactions { season, week } => {
            let snapshot = season_snapshot(config, *season, *week)?;
            serde_json::to_value(transaction_report(&snapshot, config.league.season_length))?
        }
        Command::ChoppedPlayers { season } => {
            let snapshot = season_snapshot(config, *season, None)?;
            let report = process_season(&snapshot, &config.season_settings());
            serde_json::to_value(death_bell(&snapshot, &report))?
        }
        Command::Manager { name } => {
            let reports = all_seasons(config);
            let Some(profile) = career_profile(&reports, name) else {
                bail!("manager {name:?} not found in any configured season");
            };
            serde_json::to_value(profile)?
        }
        Command::AverageFinishes => serde_json::to_value(average_finishes(&all_seasons(config)))?,
        Command::Seasons => {
            let seasons: Vec<u32> = config.seasons.keys().copied().collect();
            json!({
                "league": config.league.name,
                "current_season": seasons.last(),
                "seasons": seasons,
            })
        }
    };
    Ok(value)
}

fn season_report(config: &Config, season: u32, week: Option<Week>) -> Result<SeasonReport> {
    let snapshot = season_snapshot(config, season, week)
        .with_context(|| format!("failed to load season {season}"))?;
    Ok(process_season(&snapshot, &config.season_settings()))
}

/// Every configured season that loads; broken ones are logged and skipped.
fn all_seasons(config: &Config) -> Vec<SeasonReport> {
    config
        .seasons
        .keys()
        .filter_map(|&season| match season_report(config, season, None) {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(season, "skipping season: {e:#}");
                None
            }
        })
        .collect()
}
