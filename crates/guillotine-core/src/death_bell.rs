// "Death bell" tracking: players who were rostered by a team in the week
// it got chopped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{SeasonSnapshot, Week};
use crate::season::SeasonReport;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChopEvent {
    pub week: Week,
    pub manager: String,
    pub was_starter: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoppedPlayer {
    pub player_id: String,
    pub player_name: String,
    pub times_chopped: usize,
    pub chop_events: Vec<ChopEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathBellReport {
    pub season: u32,
    pub current_week: Week,
    pub chopped_players: Vec<ChoppedPlayer>,
    pub total_unique_players_chopped: usize,
}

/// Collect every player on a chopped team's roster in its chop week.
///
/// Weeks without lineup data contribute nothing. Players are ordered by
/// `times_chopped` descending, then by player id.
pub fn death_bell(snapshot: &SeasonSnapshot, report: &SeasonReport) -> DeathBellReport {
    let mut history: BTreeMap<&str, Vec<ChopEvent>> = BTreeMap::new();

    for manager in &report.managers {
        let Some(week) = manager.chop_week else {
            continue;
        };
        let Some(lineup) = snapshot
            .lineups
            .get(&week)
            .and_then(|teams| teams.get(&manager.roster_id))
        else {
            debug!(week, roster_id = manager.roster_id, "no lineup for chopped team");
            continue;
        };

        for player in &lineup.players {
            history.entry(player.as_str()).or_default().push(ChopEvent {
                week,
                manager: manager.user_name.clone(),
                was_starter: lineup.starters.contains(player),
            });
        }
    }

    let mut chopped_players: Vec<ChoppedPlayer> = history
        .into_iter()
        .map(|(player_id, mut chop_events)| {
            chop_events.sort_by_key(|e| e.week);
            ChoppedPlayer {
                player_id: player_id.to_string(),
                player_name: snapshot.player_name(player_id),
                times_chopped: chop_events.len(),
                chop_events,
            }
        })
        .collect();
    chopped_players.sort_by(|a, b| b.times_chopped.cmp(&a.times_chopped));

    DeathBellReport {
        season: report.season,
        current_week: report.current_week,
        total_unique_players_chopped: chopped_players.len(),
        chopped_players,
    }
}
