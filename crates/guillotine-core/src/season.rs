// Season pipeline: snapshot in, manager standings and weekly stats out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::budget::{remaining_budget, track_budget};
use crate::elimination::{simulate, EliminationOutcome};
use crate::model::{SeasonSettings, SeasonSnapshot, TeamId, Week};
use crate::ranking::chop_line_history;
use crate::weekly_stats::{season_weekly_stats, WeeklyStatistics};

/// One manager's season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerSeasonRecord {
    pub user_name: String,
    pub roster_id: TeamId,
    pub draft_position: Option<u32>,
    /// Week the team was chopped; `None` while alive or as champion.
    pub chop_week: Option<Week>,
    pub faab_remaining: u32,
    pub faab_spent: u32,
    pub faab_wasted: u32,
    pub avg_pos_above_chop: f64,
    pub close_calls: u32,
    /// Score per week `1..=season_length`; `None` once chopped or unplayed.
    pub weekly_scores: BTreeMap<Week, Option<f64>>,
    /// 1 for the champion, `N - chop_week + 1` for chopped teams, `None`
    /// for teams still alive in an undecided season.
    pub finish_position: Option<u32>,
}

impl ManagerSeasonRecord {
    /// Scores actually posted, as (week, score).
    pub fn played_weeks(&self) -> impl Iterator<Item = (Week, f64)> + '_ {
        self.weekly_scores
            .iter()
            .filter_map(|(&week, score)| score.map(|s| (week, s)))
    }

    pub fn score(&self, week: Week) -> Option<f64> {
        self.weekly_scores.get(&week).copied().flatten()
    }
}

/// Full standings for a league-season as of `current_week`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonReport {
    pub season: u32,
    pub current_week: Week,
    pub season_length: Week,
    pub starting_faab: u32,
    pub champion: Option<String>,
    pub managers: Vec<ManagerSeasonRecord>,
    pub weekly_stats: BTreeMap<Week, WeeklyStatistics>,
}

impl SeasonReport {
    pub fn is_complete(&self) -> bool {
        self.current_week == self.season_length
    }

    pub fn is_preseason(&self) -> bool {
        self.current_week == 0
    }

    /// Case-insensitive manager lookup.
    pub fn manager(&self, name: &str) -> Option<&ManagerSeasonRecord> {
        self.managers
            .iter()
            .find(|m| m.user_name.eq_ignore_ascii_case(name))
    }
}

/// Finish position for a team chopped in `chop_week` out of `total_teams`.
pub fn finish_position(total_teams: usize, chop_week: Option<Week>) -> Option<u32> {
    chop_week.map(|week| (total_teams as u32 + 1).saturating_sub(week))
}

/// Clamp the requested as-of week into `0..=season_length`.
pub fn clamp_week(week: Week, season_length: Week) -> Week {
    week.min(season_length)
}

/// Run the whole season pipeline.
pub fn process_season(snapshot: &SeasonSnapshot, settings: &SeasonSettings) -> SeasonReport {
    let current_week = clamp_week(snapshot.current_week, settings.season_length);
    if current_week == 0 {
        return preseason_report(snapshot, settings);
    }

    let scores = snapshot.registered_scores();
    let outcome = simulate(&scores, current_week);
    let ledgers = track_budget(&snapshot.transactions, current_week);
    let weekly_stats =
        season_weekly_stats(&scores, &outcome, current_week, settings.season_length);

    info!(
        season = snapshot.season,
        current_week,
        teams = snapshot.teams.len(),
        eliminated = outcome.eliminated.len(),
        "season processed"
    );

    let season_over = current_week == settings.season_length;
    let champion_id = champion(snapshot, &outcome, season_over);
    let total_teams = snapshot.teams.len();

    let mut managers: Vec<ManagerSeasonRecord> = snapshot
        .teams
        .iter()
        .map(|team| {
            let chop_week = outcome.elimination_week(team.id);
            let ledger = ledgers.get(&team.id).copied().unwrap_or_default();
            let history = chop_line_history(
                team.id,
                current_week,
                &scores,
                &outcome,
                settings.close_call_margin,
            );

            let weekly_scores = (1..=settings.season_length)
                .map(|week| {
                    let shown = week <= current_week && outcome.alive_entering(team.id, week);
                    (week, if shown { scores.score(team.id, week) } else { None })
                })
                .collect();

            let finish = if champion_id == Some(team.id) {
                Some(1)
            } else {
                finish_position(total_teams, chop_week)
            };

            ManagerSeasonRecord {
                user_name: team.owner_name.clone(),
                roster_id: team.id,
                draft_position: team.draft_position,
                chop_week,
                faab_remaining: remaining_budget(
                    settings.starting_budget,
                    &ledger,
                    chop_week.is_some(),
                    settings.remaining_budget_policy,
                ),
                faab_spent: ledger.spent,
                faab_wasted: ledger.wasted,
                avg_pos_above_chop: history.avg_positions_above_chop(),
                close_calls: history.close_calls,
                weekly_scores,
                finish_position: finish,
            }
        })
        .collect();

    sort_managers(&mut managers);

    SeasonReport {
        season: snapshot.season,
        current_week,
        season_length: settings.season_length,
        starting_faab: settings.starting_budget,
        champion: champion_id.map(|id| snapshot.owner_name(id)),
        managers,
        weekly_stats,
    }
}

/// Upstream-declared winner first (only once the season is over), then the
/// last team standing.
fn champion(
    snapshot: &SeasonSnapshot,
    outcome: &EliminationOutcome,
    season_over: bool,
) -> Option<TeamId> {
    match snapshot.winner.filter(|_| season_over) {
        Some(id) if outcome.elimination_week(id).is_none() => Some(id),
        Some(id) => {
            debug!(team = id, "upstream winner was chopped; ignoring it");
            outcome.last_team_standing()
        }
        None => outcome.last_team_standing(),
    }
}

/// Chopped managers first by chop week, then survivors by average position.
fn sort_managers(managers: &mut [ManagerSeasonRecord]) {
    managers.sort_by(|a, b| {
        let key = |m: &ManagerSeasonRecord| (m.chop_week.is_none(), m.chop_week.unwrap_or(Week::MAX));
        key(a)
            .cmp(&key(b))
            .then_with(|| a.avg_pos_above_chop.total_cmp(&b.avg_pos_above_chop))
    });
}

fn preseason_report(snapshot: &SeasonSnapshot, settings: &SeasonSettings) -> SeasonReport {
    let managers = snapshot
        .teams
        .iter()
        .map(|team| ManagerSeasonRecord {
            user_name: team.owner_name.clone(),
            roster_id: team.id,
            draft_position: team.draft_position,
            chop_week: None,
            faab_remaining: settings.starting_budget,
            faab_spent: 0,
            faab_wasted: 0,
            avg_pos_above_chop: 0.0,
            close_calls: 0,
            weekly_scores: (1..=settings.season_length).map(|w| (w, None)).collect(),
            finish_position: None,
        })
        .collect();

    SeasonReport {
        season: snapshot.season,
        current_week: 0,
        season_length: settings.season_length,
        starting_faab: settings.starting_budget,
        champion: None,
        managers,
        weekly_stats: BTreeMap::new(),
    }
}
