// Historical score grids.
//
// Seasons that predate the upstream API are kept as a CSV grid, one row
// per manager:
//
//     manager,draft_position,wk1,wk2,...,wkN
//
// Blank cells are weeks the manager did not play (chopped or unplayed).
// Rows get roster ids in file order starting at 1, so ties on the weekly
// minimum chop whichever tied manager is listed first.

use std::io::Read;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::error::{CoreError, Result};
use crate::model::{ScoreTable, SeasonSnapshot, Team, TeamId, Week};

const MANAGER_COLUMN: &str = "manager";
const DRAFT_COLUMN: &str = "draft_position";

/// Parse a score grid into a snapshot for `season`.
///
/// The snapshot's current week is the last week with any score. Rows with
/// a blank manager name are skipped.
pub fn read_score_grid<R: Read>(season: u32, reader: R) -> Result<SeasonSnapshot> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let weeks = week_columns(rdr.headers()?)?;

    let mut teams = Vec::new();
    let mut scores = ScoreTable::new();

    for record in rdr.records() {
        let record = record?;
        let manager = record.get(0).unwrap_or("").to_string();
        if manager.is_empty() {
            warn!(line = ?record.position().map(|p| p.line()), "skipping score grid row without a manager");
            continue;
        }
        let id = teams.len() as TeamId + 1;

        let draft_position = match record.get(1).unwrap_or("") {
            "" => None,
            raw => Some(parse_cell::<u32>(&manager, DRAFT_COLUMN, raw)?),
        };

        scores.register_team(id);
        for (i, &week) in weeks.iter().enumerate() {
            let raw = record.get(i + 2).unwrap_or("");
            if raw.is_empty() {
                continue;
            }
            let column = format!("wk{week}");
            scores.insert(id, week, parse_score(&manager, &column, raw)?);
        }

        teams.push(Team {
            id,
            owner_name: manager,
            draft_position,
        });
    }

    let current_week = scores.weeks().last().copied().unwrap_or(0);
    debug!(season, teams = teams.len(), current_week, "score grid loaded");

    Ok(SeasonSnapshot {
        season,
        teams,
        scores,
        current_week,
        ..Default::default()
    })
}

/// Week numbers named by the `wkN` headers, in column order.
fn week_columns(headers: &StringRecord) -> Result<Vec<Week>> {
    let invalid = || CoreError::GridHeader {
        header: headers.iter().map(str::to_string).collect(),
    };

    let mut fields = headers.iter();
    if fields.next() != Some(MANAGER_COLUMN) || fields.next() != Some(DRAFT_COLUMN) {
        return Err(invalid());
    }
    fields
        .map(|h| {
            h.strip_prefix("wk")
                .and_then(|n| n.parse::<Week>().ok())
                .filter(|&w| w > 0)
                .ok_or_else(invalid)
        })
        .collect()
}

fn parse_cell<T: std::str::FromStr>(manager: &str, column: &str, raw: &str) -> Result<T> {
    raw.parse().map_err(|_| CoreError::GridValue {
        manager: manager.to_string(),
        column: column.to_string(),
        value: raw.to_string(),
    })
}

/// A weekly score; `NaN` and infinities are rejected like unparseable text.
fn parse_score(manager: &str, column: &str, raw: &str) -> Result<f64> {
    let score = parse_cell::<f64>(manager, column, raw)?;
    if score.is_finite() {
        Ok(score)
    } else {
        Err(CoreError::GridValue {
            manager: manager.to_string(),
            column: column.to_string(),
            value: raw.to_string(),
        })
    }
}
