// Sleeper payload models and their conversion into a `SeasonSnapshot`.
//
// The fetch layer writes every payload for one league-season into a single
// JSON bundle. Per-week payloads are kept as raw JSON so that one malformed
// week can be skipped without losing the rest of the season.

use std::collections::BTreeMap;
use std::io::Read;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::model::{
    Lineup, ScoreTable, SeasonSnapshot, Team, TeamId, Transaction, TransactionStatus, Week,
};
use crate::names::{self, NameSources};

// ---------------------------------------------------------------------------
// Raw upstream shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLeague {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub settings: RawLeagueSettings,
    #[serde(default)]
    pub metadata: Option<RawLeagueMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLeagueSettings {
    /// Sleeper's current-week counter.
    #[serde(default)]
    pub leg: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLeagueMetadata {
    /// Sleeper sends this as a string.
    #[serde(default)]
    pub latest_league_winner_roster_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawUser {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRoster {
    pub roster_id: TeamId,
    #[serde(default)]
    pub owner_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMatchup {
    pub roster_id: TeamId,
    #[serde(default)]
    pub points: Option<f64>,
    #[serde(default)]
    pub players: Option<Vec<String>>,
    #[serde(default)]
    pub starters: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub roster_ids: Vec<TeamId>,
    /// Player id → receiving roster.
    #[serde(default)]
    pub adds: Option<BTreeMap<String, TeamId>>,
    #[serde(default)]
    pub settings: Option<RawTransactionSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTransactionSettings {
    #[serde(default)]
    pub waiver_bid: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDraftPick {
    pub round: u32,
    pub roster_id: TeamId,
    pub pick_no: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPlayer {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}

impl RawPlayer {
    /// `First Last (POS)`, or `None` when both name parts are missing.
    pub fn display_name(&self) -> Option<String> {
        let first = self.first_name.as_deref().unwrap_or("").trim();
        let last = self.last_name.as_deref().unwrap_or("").trim();
        let name = format!("{first} {last}").trim().to_string();
        if name.is_empty() {
            return None;
        }
        match self.position.as_deref().map(str::trim) {
            Some(pos) if !pos.is_empty() => Some(format!("{name} ({pos})")),
            _ => Some(name),
        }
    }
}

// ---------------------------------------------------------------------------
// Bundle
// ---------------------------------------------------------------------------

/// Every upstream payload for one league-season.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonBundle {
    pub season: u32,
    #[serde(default)]
    pub league: RawLeague,
    #[serde(default)]
    pub users: Vec<RawUser>,
    #[serde(default)]
    pub rosters: Vec<RawRoster>,
    /// Week → raw matchup array.
    #[serde(default)]
    pub matchups: BTreeMap<Week, Value>,
    /// Week → raw transaction array.
    #[serde(default)]
    pub transactions: BTreeMap<Week, Value>,
    #[serde(default)]
    pub draft_picks: Vec<RawDraftPick>,
    #[serde(default)]
    pub players: BTreeMap<String, RawPlayer>,
}

impl SeasonBundle {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Freeze the bundle into a snapshot as of the league's current week.
    pub fn into_snapshot(self, season_length: Week) -> SeasonSnapshot {
        let current_week = current_week(&self.league, season_length);
        let winner = winner_roster_id(&self.league);
        let teams = self.teams();

        let mut scores = ScoreTable::new();
        let mut lineups: BTreeMap<Week, BTreeMap<TeamId, Lineup>> = BTreeMap::new();
        for (week, payload) in self.matchups {
            let Some(matchups) = decode_week::<RawMatchup>("matchups", week, payload) else {
                continue;
            };
            for m in matchups {
                if let Some(points) = m.points {
                    scores.insert(m.roster_id, week, points);
                }
                lineups.entry(week).or_default().insert(
                    m.roster_id,
                    Lineup {
                        players: m.players.unwrap_or_default(),
                        starters: m.starters.unwrap_or_default(),
                    },
                );
            }
        }

        let mut transactions = Vec::new();
        for (week, payload) in self.transactions {
            let Some(raw) = decode_week::<RawTransaction>("transactions", week, payload) else {
                continue;
            };
            transactions.extend(raw.iter().flat_map(|t| waiver_bids(week, t)));
        }

        let player_names = self
            .players
            .iter()
            .filter_map(|(id, p)| p.display_name().map(|name| (id.clone(), name)))
            .collect();

        SeasonSnapshot {
            season: self.season,
            teams,
            scores,
            transactions,
            lineups,
            player_names,
            current_week,
            winner,
        }
    }

    /// Teams in roster-id order, named through the owner-name policy.
    fn teams(&self) -> Vec<Team> {
        let owners: BTreeMap<&str, String> = self
            .users
            .iter()
            .map(|u| {
                let name = names::user_name(&NameSources {
                    user_id: &u.user_id,
                    display_name: u.display_name.as_deref(),
                    username: u.username.as_deref(),
                });
                (u.user_id.as_str(), name)
            })
            .collect();

        let mut draft_positions: BTreeMap<TeamId, u32> = BTreeMap::new();
        for pick in self.draft_picks.iter().filter(|p| p.round == 1) {
            draft_positions.entry(pick.roster_id).or_insert(pick.pick_no);
        }

        let mut teams: Vec<Team> = self
            .rosters
            .iter()
            .map(|r| Team {
                id: r.roster_id,
                owner_name: r
                    .owner_id
                    .as_deref()
                    .and_then(|id| owners.get(id).cloned())
                    .unwrap_or_else(|| names::team_placeholder(r.roster_id)),
                draft_position: draft_positions.get(&r.roster_id).copied(),
            })
            .collect();
        teams.sort_by_key(|t| t.id);
        teams
    }
}

/// Decode one week's payload; a malformed week is logged and dropped.
fn decode_week<T: serde::de::DeserializeOwned>(
    what: &str,
    week: Week,
    payload: Value,
) -> Option<Vec<T>> {
    match serde_json::from_value::<Option<Vec<T>>>(payload) {
        Ok(items) => Some(items.unwrap_or_default()),
        Err(e) => {
            warn!(week, "skipping malformed {what} payload: {e}");
            None
        }
    }
}

/// One bid per player a waiver claim tried to add.
fn waiver_bids(week: Week, raw: &RawTransaction) -> Vec<Transaction> {
    if raw.kind != "waiver" {
        return Vec::new();
    }
    let bid = raw
        .settings
        .as_ref()
        .and_then(|s| s.waiver_bid)
        .unwrap_or(0);
    let status = if raw.status == "complete" {
        TransactionStatus::Complete
    } else {
        TransactionStatus::Failed
    };
    let Some(adds) = raw.adds.as_ref() else {
        debug!(week, "waiver claim without adds");
        return Vec::new();
    };

    adds.iter()
        .map(|(player_id, &receiver)| Transaction {
            week,
            player_id: player_id.clone(),
            team: raw.roster_ids.first().copied().unwrap_or(receiver),
            bid,
            status,
        })
        .collect()
}

/// Latest completed week implied by the league status.
///
/// `complete` means the whole season; `pre_draft` and `drafting` mean it
/// has not started. Otherwise Sleeper's `leg` counter is used when it
/// falls inside the season, else week 1.
pub fn current_week(league: &RawLeague, season_length: Week) -> Week {
    match league.status.as_str() {
        "complete" => season_length,
        "pre_draft" | "drafting" => 0,
        _ => match league.settings.leg {
            Some(leg) if (1..=season_length).contains(&leg) => leg,
            _ => 1,
        },
    }
}

fn winner_roster_id(league: &RawLeague) -> Option<TeamId> {
    let raw = league
        .metadata
        .as_ref()?
        .latest_league_winner_roster_id
        .as_deref()?;
    match raw.trim().parse() {
        Ok(id) => Some(id),
        Err(_) => {
            warn!(value = raw, "ignoring unparseable league winner id");
            None
        }
    }
}
