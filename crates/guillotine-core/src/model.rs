// Season data model: teams, weekly scores, waiver transactions, and the
// frozen snapshot every computation in this crate consumes.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Upstream roster identifier. A tie on the weekly minimum chops the
/// lower id.
pub type TeamId = u32;

/// 1-indexed scoring week.
pub type Week = u32;

// ---------------------------------------------------------------------------
// Season settings
// ---------------------------------------------------------------------------

/// Default regular-season length for a guillotine league.
pub const DEFAULT_SEASON_LENGTH: Week = 17;

/// Default FAAB pool granted to every team at the start of a season.
pub const DEFAULT_STARTING_BUDGET: u32 = 1000;

/// How `faab_remaining` is reported for teams that have been chopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainingBudgetPolicy {
    /// `starting_budget - spent`, whether or not the team is still alive.
    #[default]
    PreserveUnspent,
    /// Chopped teams report zero remaining budget.
    ZeroWhenEliminated,
}

/// Per-recap thresholds for the "close calls" and "blowouts" lists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecapSettings {
    /// A week is a recap close call when the survivor margin is below this.
    pub close_call_margin: f64,
    /// A week is a blowout when the margin to safety is above this.
    pub blowout_margin: f64,
    /// Maximum entries kept in each list.
    pub list_len: usize,
}

impl Default for RecapSettings {
    fn default() -> Self {
        RecapSettings {
            close_call_margin: 5.0,
            blowout_margin: 20.0,
            list_len: 5,
        }
    }
}

/// Per-season constants. Nothing in the core hard-codes these.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonSettings {
    pub season_length: Week,
    pub starting_budget: u32,
    /// Points above the chop score that still count as a close call.
    pub close_call_margin: f64,
    pub remaining_budget_policy: RemainingBudgetPolicy,
    pub recap: RecapSettings,
}

impl Default for SeasonSettings {
    fn default() -> Self {
        SeasonSettings {
            season_length: DEFAULT_SEASON_LENGTH,
            starting_budget: DEFAULT_STARTING_BUDGET,
            close_call_margin: 5.0,
            remaining_budget_policy: RemainingBudgetPolicy::default(),
            recap: RecapSettings::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Teams and scores
// ---------------------------------------------------------------------------

/// A league team and its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub owner_name: String,
    /// First-round pick number, when the draft has happened.
    pub draft_position: Option<u32>,
}

/// Weekly points per team.
///
/// A team may be registered with no scores at all. A missing entry means
/// the week has not been played yet or the team was already chopped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreTable {
    scores: BTreeMap<TeamId, BTreeMap<Week, f64>>,
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `team` takes part in the season even before it scores.
    pub fn register_team(&mut self, team: TeamId) {
        self.scores.entry(team).or_default();
    }

    /// Record a score, replacing any earlier value for the same week.
    pub fn insert(&mut self, team: TeamId, week: Week, score: f64) {
        self.scores.entry(team).or_default().insert(week, score);
    }

    pub fn score(&self, team: TeamId, week: Week) -> Option<f64> {
        self.scores.get(&team).and_then(|weeks| weeks.get(&week)).copied()
    }

    /// All registered teams in ascending id order.
    pub fn teams(&self) -> impl Iterator<Item = TeamId> + '_ {
        self.scores.keys().copied()
    }

    pub fn team_count(&self) -> usize {
        self.scores.len()
    }

    /// Every week for which at least one team has a score.
    pub fn weeks(&self) -> BTreeSet<Week> {
        self.scores
            .values()
            .flat_map(|weeks| weeks.keys().copied())
            .collect()
    }

    /// Scores of `teams` for `week`, skipping teams without a score.
    pub fn week_scores<I>(&self, week: Week, teams: I) -> Vec<(TeamId, f64)>
    where
        I: IntoIterator<Item = TeamId>,
    {
        teams
            .into_iter()
            .filter_map(|team| self.score(team, week).map(|s| (team, s)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Waiver transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Complete,
    Failed,
}

/// One blind FAAB bid on one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub week: Week,
    pub player_id: String,
    pub team: TeamId,
    pub bid: u32,
    pub status: TransactionStatus,
}

impl Transaction {
    pub fn is_complete(&self) -> bool {
        self.status == TransactionStatus::Complete
    }
}

// ---------------------------------------------------------------------------
// Lineups (who was on a roster in a given week)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lineup {
    pub players: Vec<String>,
    pub starters: Vec<String>,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Everything known about one league-season at the time of the request.
///
/// The fetch layer assembles this once; the computations never go back
/// upstream for more data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonSnapshot {
    pub season: u32,
    /// Teams sorted by id.
    pub teams: Vec<Team>,
    pub scores: ScoreTable,
    pub transactions: Vec<Transaction>,
    /// Week → team → rostered players, when the upstream provided them.
    #[serde(default)]
    pub lineups: BTreeMap<Week, BTreeMap<TeamId, Lineup>>,
    /// Player id → display name, when known.
    #[serde(default)]
    pub player_names: BTreeMap<String, String>,
    /// Latest completed week. 0 means the season has not started.
    pub current_week: Week,
    /// Winner reported by the upstream league metadata, if any.
    #[serde(default)]
    pub winner: Option<TeamId>,
}

impl SeasonSnapshot {
    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    /// Owner name for `id`, or the `Team <id>` placeholder.
    pub fn owner_name(&self, id: TeamId) -> String {
        self.team(id)
            .map(|t| t.owner_name.clone())
            .unwrap_or_else(|| crate::names::team_placeholder(id))
    }

    /// Display name for a player id, falling back to `Player <id>`.
    pub fn player_name(&self, player_id: &str) -> String {
        self.player_names
            .get(player_id)
            .cloned()
            .unwrap_or_else(|| format!("Player {player_id}"))
    }

    /// Score table with every rostered team registered.
    pub fn registered_scores(&self) -> ScoreTable {
        let mut scores = self.scores.clone();
        for team in &self.teams {
            scores.register_team(team.id);
        }
        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_table_registers_teams_without_scores() {
        let mut table = ScoreTable::new();
        table.register_team(3);
        table.insert(1, 1, 100.0);

        assert_eq!(table.teams().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(table.score(3, 1), None);
        assert_eq!(table.score(1, 1), Some(100.0));
    }

    #[test]
    fn week_scores_skips_missing_entries() {
        let mut table = ScoreTable::new();
        table.insert(1, 2, 90.5);
        table.insert(2, 1, 80.0);

        let scores = table.week_scores(2, [1, 2]);
        assert_eq!(scores, vec![(1, 90.5)]);
        assert_eq!(table.weeks().into_iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn snapshot_name_fallbacks() {
        let snapshot = SeasonSnapshot {
            teams: vec![Team {
                id: 1,
                owner_name: "alice".into(),
                draft_position: Some(4),
            }],
            ..Default::default()
        };
        assert_eq!(snapshot.owner_name(1), "alice");
        assert_eq!(snapshot.owner_name(9), "Team 9");
        assert_eq!(snapshot.player_name("4046"), "Player 4046");
    }

    #[test]
    fn default_settings_match_league_rules() {
        let settings = SeasonSettings::default();
        assert_eq!(settings.season_length, 17);
        assert_eq!(settings.starting_budget, 1000);
        assert_eq!(
            settings.remaining_budget_policy,
            RemainingBudgetPolicy::PreserveUnspent
        );
        assert_eq!(settings.recap.list_len, 5);
    }
}
