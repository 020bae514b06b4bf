// Waiver activity report: one row per won contest, grouped by week.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::budget::resolve_contests;
use crate::model::{SeasonSnapshot, TeamId, Week};
use crate::season::clamp_week;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaiverWin {
    pub week: Week,
    pub player_id: String,
    pub player_name: String,
    pub manager: String,
    pub roster_id: TeamId,
    pub winning_bid: u32,
    /// Best rival offer from another team, 0 if uncontested.
    pub second_highest_bid: u32,
    pub num_bidders: usize,
    pub wasted: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekSummary {
    pub total_spent: u32,
    pub num_transactions: usize,
    pub transactions: Vec<WaiverWin>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionReport {
    pub season: u32,
    pub current_week: Week,
    pub transactions: Vec<WaiverWin>,
    /// Every week `1..=current_week`, empty weeks included.
    pub weekly_summaries: BTreeMap<Week, WeekSummary>,
}

/// Summarize waiver wins through `snapshot.current_week`.
pub fn transaction_report(snapshot: &SeasonSnapshot, season_length: Week) -> TransactionReport {
    let current_week = clamp_week(snapshot.current_week, season_length);
    let mut weekly_summaries: BTreeMap<Week, WeekSummary> =
        (1..=current_week).map(|w| (w, WeekSummary::default())).collect();
    let mut transactions = Vec::new();

    for contest in resolve_contests(&snapshot.transactions) {
        if contest.week > current_week {
            continue;
        }
        let Some(winner) = contest.winner() else {
            continue;
        };

        let win = WaiverWin {
            week: contest.week,
            player_name: snapshot.player_name(&contest.player_id),
            player_id: contest.player_id.clone(),
            manager: snapshot.owner_name(winner.team),
            roster_id: winner.team,
            winning_bid: winner.amount,
            second_highest_bid: contest.runner_up_amount(),
            num_bidders: contest.bids.len(),
            wasted: contest.wasted(),
        };

        let summary = weekly_summaries.entry(contest.week).or_default();
        summary.total_spent = summary.total_spent.saturating_add(win.winning_bid);
        summary.num_transactions += 1;
        summary.transactions.push(win.clone());
        transactions.push(win);
    }

    TransactionReport {
        season: snapshot.season,
        current_week,
        transactions,
        weekly_summaries,
    }
}
