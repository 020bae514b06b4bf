// Weekly ranking among alive teams, positions above the chop line, and
// close-call detection.
//
// Every rank-derived statistic in the crate goes through this module.

use serde::{Deserialize, Serialize};

use crate::elimination::EliminationOutcome;
use crate::model::{ScoreTable, TeamId, Week};

/// A team's standing in one week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRank {
    /// 1 = top scorer.
    pub rank: usize,
    /// Alive teams with a score this week.
    pub teams_alive: usize,
    /// `teams_alive - rank`. 0 is the chopped team.
    pub positions_above_chop: usize,
}

/// Alive teams for `week`, best first.
///
/// Equal scores are ordered so the team the simulator would chop (the lower
/// id) sits lower, keeping the chopped team at position 0.
pub fn week_standings(
    week: Week,
    scores: &ScoreTable,
    outcome: &EliminationOutcome,
) -> Vec<(TeamId, f64)> {
    let alive = scores
        .teams()
        .filter(|&team| outcome.alive_entering(team, week));
    let mut standings = scores.week_scores(week, alive);
    standings.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| b.0.cmp(&a.0)));
    standings
}

/// Rank of `team` in `week`, or `None` when the team has no score or was
/// already chopped.
pub fn rank(
    team: TeamId,
    week: Week,
    scores: &ScoreTable,
    outcome: &EliminationOutcome,
) -> Option<WeekRank> {
    let standings = week_standings(week, scores, outcome);
    rank_in(team, &standings)
}

fn rank_in(team: TeamId, standings: &[(TeamId, f64)]) -> Option<WeekRank> {
    let idx = standings.iter().position(|&(t, _)| t == team)?;
    let teams_alive = standings.len();
    let rank = idx + 1;
    Some(WeekRank {
        rank,
        teams_alive,
        positions_above_chop: teams_alive - rank,
    })
}

/// Whether a week counts as a close call.
///
/// Finishing one spot above the chop always counts. Otherwise a survivor
/// within `margin` points of the chop score counts. When the week has no
/// chop score only the positional rule applies.
pub fn is_close_call(rank: &WeekRank, score: f64, chop_score: Option<f64>, margin: f64) -> bool {
    if rank.positions_above_chop == 1 {
        return true;
    }
    match chop_score {
        Some(chop) => rank.positions_above_chop > 0 && score - chop <= margin,
        None => false,
    }
}

/// Positions-above-chop history for one team.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChopLineHistory {
    /// (week, rank) for each counted week.
    pub weeks: Vec<(Week, WeekRank)>,
    pub close_calls: u32,
}

impl ChopLineHistory {
    /// Mean positions above chop, rounded to one decimal; 0 with no weeks.
    pub fn avg_positions_above_chop(&self) -> f64 {
        if self.weeks.is_empty() {
            return 0.0;
        }
        let total: usize = self.weeks.iter().map(|(_, r)| r.positions_above_chop).sum();
        round_to(total as f64 / self.weeks.len() as f64, 1)
    }
}

/// Walk weeks `1..=end` for `team`, where `end` is its chop week or
/// `current_week` when it is still alive.
pub fn chop_line_history(
    team: TeamId,
    current_week: Week,
    scores: &ScoreTable,
    outcome: &EliminationOutcome,
    close_call_margin: f64,
) -> ChopLineHistory {
    let end = outcome.elimination_week(team).unwrap_or(current_week);
    let mut history = ChopLineHistory::default();

    for week in 1..=end {
        let standings = week_standings(week, scores, outcome);
        let Some(r) = rank_in(team, &standings) else {
            continue;
        };
        let score = standings[r.rank - 1].1;
        if is_close_call(&r, score, outcome.chop_score(week), close_call_margin) {
            history.close_calls += 1;
        }
        history.weeks.push((week, r));
    }

    history
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
