// Snapshot files on disk → `SeasonSnapshot`.
//
// `.json` files are season bundles written by the fetch job; `.csv` files
// are historical score grids.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use guillotine_core::historical::read_score_grid;
use guillotine_core::model::{SeasonSnapshot, Week};
use guillotine_core::upstream::SeasonBundle;
use guillotine_core::CoreError;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("season {season} is not configured")]
    UnknownSeason { season: u32 },

    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode { path: PathBuf, source: CoreError },

    #[error("unsupported snapshot format: {path}")]
    UnsupportedFormat { path: PathBuf },
}

/// Read one season's snapshot file.
pub fn load_snapshot(path: &Path, season: u32, season_length: Week) -> Result<SeasonSnapshot, IngestError> {
    let format = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|e| e == "json" || e == "csv")
        .ok_or_else(|| IngestError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;

    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    let decode = |source: CoreError| IngestError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let mut snapshot = if format == "json" {
        SeasonBundle::from_reader(reader)
            .map_err(decode)?
            .into_snapshot(season_length)
    } else {
        read_score_grid(season, reader).map_err(decode)?
    };
    // The config's year wins over whatever the bundle recorded.
    snapshot.season = season;

    info!(
        season,
        path = %path.display(),
        teams = snapshot.teams.len(),
        current_week = snapshot.current_week,
        "snapshot loaded"
    );
    Ok(snapshot)
}

/// Load a configured season, optionally viewed as of an earlier week.
///
/// A requested week is clamped to `1..=season_length`.
pub fn season_snapshot(
    config: &Config,
    season: u32,
    as_of_week: Option<Week>,
) -> Result<SeasonSnapshot, IngestError> {
    let path = config
        .season_path(season)
        .ok_or(IngestError::UnknownSeason { season })?;
    let season_length = config.league.season_length;
    let mut snapshot = load_snapshot(path, season, season_length)?;
    if let Some(week) = as_of_week {
        snapshot.current_week = week.clamp(1, season_length);
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn csv_grid_round_trips_through_disk() {
        let tmp = std::env::temp_dir().join("guillotine_ingest_csv");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        let path = tmp.join("2023.csv");
        fs::write(&path, "manager,draft_position,wk1\nAnn,1,99.5\nBob,2,101\n").unwrap();

        let snap = load_snapshot(&path, 2023, 17).unwrap();
        assert_eq!(snap.season, 2023);
        assert_eq!(snap.current_week, 1);
        assert_eq!(snap.teams.len(), 2);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_snapshot(Path::new("/nonexistent/guillotine/2020.json"), 2020, 17).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }

    #[test]
    fn malformed_bundle_is_decode_error() {
        let tmp = std::env::temp_dir().join("guillotine_ingest_bad_json");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        let path = tmp.join("2025.json");
        fs::write(&path, "{ \"season\": ").unwrap();

        let err = load_snapshot(&path, 2025, 17).unwrap_err();
        assert!(matches!(err, IngestError::Decode { .. }));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let tmp = std::env::temp_dir().join("guillotine_ingest_xlsx");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        let path = tmp.join("2022.xlsx");
        fs::write(&path, "binary").unwrap();

        let err = load_snapshot(&path, 2022, 17).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat { .. }));

        let _ = fs::remove_dir_all(&tmp);
    }
}
