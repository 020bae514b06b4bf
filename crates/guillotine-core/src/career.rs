// Cross-season manager profile.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Week;
use crate::ranking::round_to;
use crate::season::{ManagerSeasonRecord, SeasonReport};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeekMark {
    pub score: f64,
    pub season: u32,
    pub week: Week,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CareerStats {
    pub seasons_played: u32,
    pub championships: u32,
    pub top_3_finishes: u32,
    pub total_weeks_played: u32,
    pub total_points: f64,
    pub best_week: Option<WeekMark>,
    pub worst_week: Option<WeekMark>,
    pub close_calls: u32,
    pub total_faab_spent: u32,
    pub total_faab_wasted: u32,
    /// Mean of the decided finishes, `None` if there are none yet.
    pub average_finish: Option<f64>,
    pub career_avg_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonLine {
    pub finish_position: Option<u32>,
    pub chop_week: Option<Week>,
    pub draft_position: Option<u32>,
    pub faab_remaining: u32,
    pub faab_spent: u32,
    pub faab_wasted: u32,
    pub avg_pos_above_chop: f64,
    pub close_calls: u32,
    pub weekly_scores: BTreeMap<Week, Option<f64>>,
    pub season_total: f64,
    pub weeks_played: u32,
    pub avg_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishEntry {
    pub season: u32,
    pub finish: Option<u32>,
    pub chop_week: Option<Week>,
    pub draft_position: Option<u32>,
}

/// One row of the league-wide average finishes table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishRow {
    /// Name as it appears in the most recent season played.
    pub user_name: String,
    /// Finish per configured season; `None` when absent or undecided.
    pub finishes: BTreeMap<u32, Option<u32>>,
    pub average_finish: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AverageFinishes {
    pub managers: Vec<FinishRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerProfile {
    /// Name as it appears in the most recent season played.
    pub user_name: String,
    pub seasons: BTreeMap<u32, SeasonLine>,
    pub career_stats: CareerStats,
    pub finishes: Vec<FinishEntry>,
}

/// Build a manager's profile from every season report they appear in.
///
/// Lookup is case-insensitive. Returns `None` when the manager never
/// played in any of `reports`.
pub fn career_profile(reports: &[SeasonReport], manager: &str) -> Option<CareerProfile> {
    let mut ordered: Vec<&SeasonReport> = reports.iter().collect();
    ordered.sort_by_key(|r| r.season);

    let mut stats = CareerStats::default();
    let mut seasons = BTreeMap::new();
    let mut finishes = Vec::new();
    let mut user_name = None;

    for report in ordered {
        let Some(record) = report.manager(manager) else {
            continue;
        };
        user_name = Some(record.user_name.clone());
        stats.seasons_played += 1;

        let finish = record.finish_position;
        if finish == Some(1) {
            stats.championships += 1;
        }
        if finish.is_some_and(|f| f <= 3) {
            stats.top_3_finishes += 1;
        }
        finishes.push(FinishEntry {
            season: report.season,
            finish,
            chop_week: record.chop_week,
            draft_position: record.draft_position,
        });

        let (season_total, weeks_played) = accumulate_weeks(&mut stats, report.season, record);
        stats.close_calls += record.close_calls;
        stats.total_faab_spent = stats.total_faab_spent.saturating_add(record.faab_spent);
        stats.total_faab_wasted = stats.total_faab_wasted.saturating_add(record.faab_wasted);

        seasons.insert(report.season, season_line(record, season_total, weeks_played));
    }

    let user_name = user_name?;

    stats.average_finish = mean_finish(finishes.iter().filter_map(|f| f.finish));
    if stats.total_weeks_played > 0 {
        stats.career_avg_score =
            round_to(stats.total_points / stats.total_weeks_played as f64, 2);
    }
    stats.total_points = round_to(stats.total_points, 2);

    Some(CareerProfile {
        user_name,
        seasons,
        career_stats: stats,
        finishes,
    })
}

/// Every manager's finish in every season, best average first.
///
/// Managers are matched across seasons case-insensitively. Managers with no
/// decided finish sort last; ties fall back to name order.
pub fn average_finishes(reports: &[SeasonReport]) -> AverageFinishes {
    let mut ordered: Vec<&SeasonReport> = reports.iter().collect();
    ordered.sort_by_key(|r| r.season);

    let mut rows: BTreeMap<String, FinishRow> = BTreeMap::new();
    for report in &ordered {
        for record in &report.managers {
            let row = rows
                .entry(record.user_name.to_lowercase())
                .or_insert_with(|| FinishRow {
                    user_name: String::new(),
                    finishes: ordered.iter().map(|r| (r.season, None)).collect(),
                    average_finish: None,
                });
            row.user_name = record.user_name.clone();
            row.finishes.insert(report.season, record.finish_position);
        }
    }

    let mut managers: Vec<FinishRow> = rows
        .into_values()
        .map(|mut row| {
            row.average_finish = mean_finish(row.finishes.values().flatten().copied());
            row
        })
        .collect();
    managers.sort_by(|a, b| {
        let key = |r: &FinishRow| r.average_finish.unwrap_or(f64::MAX);
        key(a)
            .total_cmp(&key(b))
            .then_with(|| a.user_name.to_lowercase().cmp(&b.user_name.to_lowercase()))
    });

    AverageFinishes { managers }
}

/// Mean of the decided finishes to two decimals.
fn mean_finish(finishes: impl Iterator<Item = u32>) -> Option<f64> {
    let (sum, count) = finishes.fold((0u64, 0u32), |(sum, count), f| (sum + u64::from(f), count + 1));
    (count > 0).then(|| round_to(sum as f64 / f64::from(count), 2))
}

/// Fold one season's weekly scores into the career totals and return the
/// season's (total, weeks played).
fn accumulate_weeks(stats: &mut CareerStats, season: u32, record: &ManagerSeasonRecord) -> (f64, u32) {
    let mut total = 0.0;
    let mut weeks = 0;
    for (week, score) in record.played_weeks() {
        total += score;
        weeks += 1;
        let mark = WeekMark { score, season, week };
        if stats.best_week.map_or(true, |best| score > best.score) {
            stats.best_week = Some(mark);
        }
        if stats.worst_week.map_or(true, |worst| score < worst.score) {
            stats.worst_week = Some(mark);
        }
    }
    stats.total_points += total;
    stats.total_weeks_played += weeks;
    (total, weeks)
}

fn season_line(record: &ManagerSeasonRecord, season_total: f64, weeks_played: u32) -> SeasonLine {
    SeasonLine {
        finish_position: record.finish_position,
        chop_week: record.chop_week,
        draft_position: record.draft_position,
        faab_remaining: record.faab_remaining,
        faab_spent: record.faab_spent,
        faab_wasted: record.faab_wasted,
        avg_pos_above_chop: record.avg_pos_above_chop,
        close_calls: record.close_calls,
        weekly_scores: record.weekly_scores.clone(),
        season_total: round_to(season_total, 2),
        weeks_played,
        avg_score: if weeks_played > 0 {
            round_to(season_total / weeks_played as f64, 2)
        } else {
            0.0
        },
    }
}
