// Configuration loading and parsing (league.toml).

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use guillotine_core::model::{RecapSettings, RemainingBudgetPolicy, SeasonSettings, Week};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub thresholds: Thresholds,
    /// Season year → snapshot file, resolved against the base directory.
    pub seasons: BTreeMap<u32, PathBuf>,
}

impl Config {
    /// Core settings assembled from the `[league]` and `[thresholds]` tables.
    pub fn season_settings(&self) -> SeasonSettings {
        SeasonSettings {
            season_length: self.league.season_length,
            starting_budget: self.league.starting_budget,
            close_call_margin: self.thresholds.close_call_margin,
            remaining_budget_policy: self.league.remaining_budget_policy,
            recap: RecapSettings {
                close_call_margin: self.thresholds.recap_close_call_margin,
                blowout_margin: self.thresholds.recap_blowout_margin,
                list_len: self.thresholds.recap_list_len,
            },
        }
    }

    pub fn season_path(&self, season: u32) -> Option<&Path> {
        self.seasons.get(&season).map(PathBuf::as_path)
    }
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire league.toml file.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
    #[serde(default)]
    thresholds: Thresholds,
    /// TOML keys are strings; years are parsed during validation.
    #[serde(default)]
    seasons: BTreeMap<String, PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    pub season_length: Week,
    pub starting_budget: u32,
    #[serde(default)]
    pub remaining_budget_policy: RemainingBudgetPolicy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub close_call_margin: f64,
    pub recap_close_call_margin: f64,
    pub recap_blowout_margin: f64,
    pub recap_list_len: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        let recap = RecapSettings::default();
        Thresholds {
            close_call_margin: SeasonSettings::default().close_call_margin,
            recap_close_call_margin: recap.close_call_margin,
            recap_blowout_margin: recap.blowout_margin,
            recap_list_len: recap.list_len,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/league.toml` relative to `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let league_path = base_dir.join("config").join("league.toml");
    let league_text = read_file(&league_path)?;
    let file: LeagueFile = toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
        path: league_path.clone(),
        source: e,
    })?;

    let seasons = parse_seasons(&file.seasons, base_dir)?;
    let config = Config {
        league: file.league,
        thresholds: file.thresholds,
        seasons,
    };

    validate(&config)?;

    Ok(config)
}

/// Seed `config/league.toml` from `defaults/league.toml` on first run.
///
/// Returns the written path, or `None` when the league file already exists.
/// An existing league file is never overwritten.
pub fn ensure_league_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join("league.toml");
    if target.exists() {
        return Ok(None);
    }

    let source = base_dir.join("defaults").join("league.toml");
    if !source.exists() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "no league.toml in {}/config or {}/defaults",
                base_dir.display(),
                base_dir.display()
            ),
        });
    }

    let copy_error = |e: std::io::Error| ConfigError::DefaultsCopyError {
        message: format!("failed to seed {} from defaults: {e}", target.display()),
    };
    std::fs::create_dir_all(base_dir.join("config")).map_err(copy_error)?;
    std::fs::copy(&source, &target).map_err(copy_error)?;
    info!(path = %target.display(), "seeded league config from defaults");

    Ok(Some(target))
}

/// Copy defaults if needed, then load config from `base_dir`.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_league_file(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn parse_seasons(
    raw: &BTreeMap<String, PathBuf>,
    base_dir: &Path,
) -> Result<BTreeMap<u32, PathBuf>, ConfigError> {
    raw.iter()
        .map(|(year, path)| {
            let year: u32 = year.trim().parse().map_err(|_| ConfigError::ValidationError {
                field: format!("seasons.{year}"),
                message: "season keys must be years".into(),
            })?;
            Ok((year, base_dir.join(path)))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.season_length == 0 {
        return Err(ConfigError::ValidationError {
            field: "league.season_length".into(),
            message: "must be greater than 0".into(),
        });
    }

    let t = &config.thresholds;
    let margins: &[(&str, f64)] = &[
        ("thresholds.close_call_margin", t.close_call_margin),
        ("thresholds.recap_close_call_margin", t.recap_close_call_margin),
        ("thresholds.recap_blowout_margin", t.recap_blowout_margin),
    ];
    for (name, val) in margins {
        if !val.is_finite() || *val < 0.0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be a non-negative number, got {val}"),
            });
        }
    }

    if t.recap_list_len == 0 {
        return Err(ConfigError::ValidationError {
            field: "thresholds.recap_list_len".into(),
            message: "must be > 0".into(),
        });
    }

    for (year, path) in &config.seasons {
        let supported = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json") || e.eq_ignore_ascii_case("csv"));
        if !supported {
            return Err(ConfigError::ValidationError {
                field: format!("seasons.{year}"),
                message: format!("expected a .json or .csv file, got {}", path.display()),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
