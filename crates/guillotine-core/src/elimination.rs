// Elimination simulator.
//
// Replays a season week by week and chops the lowest scorer among the
// teams still alive. Incomplete weeks end the replay without error, so a
// half-played season simply yields fewer eliminations.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{ScoreTable, TeamId, Week};

/// Result of replaying a season up to some week.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EliminationOutcome {
    /// Team → week it was chopped. Teams still alive are absent.
    pub eliminated: BTreeMap<TeamId, Week>,
    /// Week → minimum alive score (the score that got chopped).
    pub chop_scores: BTreeMap<Week, f64>,
    /// Teams that were never chopped, in id order.
    pub survivors: BTreeSet<TeamId>,
}

impl EliminationOutcome {
    pub fn elimination_week(&self, team: TeamId) -> Option<Week> {
        self.eliminated.get(&team).copied()
    }

    pub fn chop_score(&self, week: Week) -> Option<f64> {
        self.chop_scores.get(&week).copied()
    }

    /// Whether `team` entered `week` alive. A team chopped in `week` was
    /// still alive entering it.
    pub fn alive_entering(&self, team: TeamId, week: Week) -> bool {
        self.elimination_week(team).map_or(true, |chop| chop >= week)
    }

    /// The team chopped in `week`, if that week was simulated.
    pub fn chopped_in(&self, week: Week) -> Option<TeamId> {
        self.eliminated
            .iter()
            .find(|(_, &w)| w == week)
            .map(|(&team, _)| team)
    }

    /// (week, team) pairs in elimination order.
    pub fn order(&self) -> Vec<(Week, TeamId)> {
        let mut order: Vec<(Week, TeamId)> =
            self.eliminated.iter().map(|(&t, &w)| (w, t)).collect();
        order.sort_unstable();
        order
    }

    /// Last week that produced an elimination, or 0.
    pub fn last_simulated_week(&self) -> Week {
        self.chop_scores.keys().next_back().copied().unwrap_or(0)
    }

    /// The lone survivor once every other team has been chopped.
    pub fn last_team_standing(&self) -> Option<TeamId> {
        if self.survivors.len() == 1 {
            self.survivors.iter().next().copied()
        } else {
            None
        }
    }
}

/// Replay weeks `1..=through_week`, chopping the lowest alive scorer.
///
/// Each week considers only alive teams that have a score for that week;
/// if none do, the replay stops there. Ties on the minimum chop the lowest
/// team id. The replay also stops once a single team is left, which is
/// the champion and is never chopped.
pub fn simulate(scores: &ScoreTable, through_week: Week) -> EliminationOutcome {
    let mut alive: BTreeSet<TeamId> = scores.teams().collect();
    let mut outcome = EliminationOutcome::default();

    for week in 1..=through_week {
        if alive.len() <= 1 {
            debug!(week, "one team left standing; replay finished");
            break;
        }

        let week_scores = scores.week_scores(week, alive.iter().copied());
        let Some(&(chopped, chop_score)) = week_scores
            .iter()
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
        else {
            debug!(week, "no scores recorded; season has not reached this week");
            break;
        };

        debug!(week, team = chopped, score = chop_score, "team chopped");
        outcome.eliminated.insert(chopped, week);
        outcome.chop_scores.insert(week, chop_score);
        alive.remove(&chopped);
    }

    outcome.survivors = alive;
    outcome
}
