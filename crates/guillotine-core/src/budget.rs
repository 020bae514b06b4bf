// FAAB budget tracking.
//
// Replays the waiver log: winning bids are spent, and any amount a winner
// bid beyond the next-best rival offer plus the $1 minimum increment is
// counted as wasted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{RemainingBudgetPolicy, TeamId, Transaction, Week};

/// Spend totals for one team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetLedger {
    pub spent: u32,
    pub wasted: u32,
}

/// A single bid inside a contest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bid {
    pub team: TeamId,
    pub amount: u32,
    pub complete: bool,
}

/// Every bid placed on one player in one week, and how it resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contest {
    pub week: Week,
    pub player_id: String,
    /// Bids in descending amount order; equal amounts keep log order.
    pub bids: Vec<Bid>,
}

impl Contest {
    /// The highest completed bid.
    pub fn winner(&self) -> Option<Bid> {
        self.bids.iter().find(|b| b.complete).copied()
    }

    /// Highest bid placed by any team other than the winner, 0 if none.
    pub fn runner_up_amount(&self) -> u32 {
        let Some(winner) = self.winner() else {
            return 0;
        };
        self.bids
            .iter()
            .filter(|b| b.team != winner.team)
            .map(|b| b.amount)
            .max()
            .unwrap_or(0)
    }

    /// `max(0, winning - runner_up - 1)`, or 0 without a winner.
    pub fn wasted(&self) -> u32 {
        match self.winner() {
            Some(winner) => winner
                .amount
                .saturating_sub(self.runner_up_amount())
                .saturating_sub(1),
            None => 0,
        }
    }
}

/// Group the waiver log into per-(week, player) contests.
///
/// Contests come back ordered by week, then by first appearance in the log.
pub fn resolve_contests(transactions: &[Transaction]) -> Vec<Contest> {
    let mut index: BTreeMap<(Week, &str), usize> = BTreeMap::new();
    let mut contests: Vec<Contest> = Vec::new();

    for txn in transactions {
        let idx = *index
            .entry((txn.week, txn.player_id.as_str()))
            .or_insert_with(|| {
                contests.push(Contest {
                    week: txn.week,
                    player_id: txn.player_id.clone(),
                    bids: Vec::new(),
                });
                contests.len() - 1
            });
        contests[idx].bids.push(Bid {
            team: txn.team,
            amount: txn.bid,
            complete: txn.is_complete(),
        });
    }

    for contest in &mut contests {
        // Stable sort keeps log order between equal amounts.
        contest.bids.sort_by(|a, b| b.amount.cmp(&a.amount));
    }
    contests.sort_by_key(|c| c.week);
    contests
}

/// Spent and wasted totals per team that won at least one bid in weeks
/// `1..=through_week`. Later bids are ignored.
pub fn track_budget(transactions: &[Transaction], through_week: Week) -> BTreeMap<TeamId, BudgetLedger> {
    let played: Vec<Transaction> = transactions
        .iter()
        .filter(|t| t.week <= through_week)
        .cloned()
        .collect();
    let mut ledgers: BTreeMap<TeamId, BudgetLedger> = BTreeMap::new();

    for txn in played.iter().filter(|t| t.is_complete()) {
        let ledger = ledgers.entry(txn.team).or_default();
        ledger.spent = ledger.spent.saturating_add(txn.bid);
    }

    for contest in resolve_contests(&played) {
        if let Some(winner) = contest.winner() {
            let ledger = ledgers.entry(winner.team).or_default();
            ledger.wasted = ledger.wasted.saturating_add(contest.wasted());
        }
    }

    ledgers
}

/// Remaining budget under `policy`.
pub fn remaining_budget(
    starting_budget: u32,
    ledger: &BudgetLedger,
    eliminated: bool,
    policy: RemainingBudgetPolicy,
) -> u32 {
    match policy {
        RemainingBudgetPolicy::ZeroWhenEliminated if eliminated => 0,
        _ => starting_budget.saturating_sub(ledger.spent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransactionStatus;
    use proptest::prelude::*;

    fn txn(week: Week, player: &str, team: TeamId, bid: u32, complete: bool) -> Transaction {
        Transaction {
            week,
            player_id: player.to_string(),
            team,
            bid,
            status: if complete {
                TransactionStatus::Complete
            } else {
                TransactionStatus::Failed
            },
        }
    }

    #[test]
    fn single_contested_player() {
        let log = vec![txn(3, "p1", 10, 50, true), txn(3, "p1", 20, 30, false)];
        let ledgers = track_budget(&log, Week::MAX);
        assert_eq!(ledgers[&10], BudgetLedger { spent: 50, wasted: 19 });
        assert!(!ledgers.contains_key(&20));
    }

    #[test]
    fn uncontested_win_wastes_all_but_one() {
        let log = vec![txn(1, "p1", 1, 25, true)];
        assert_eq!(track_budget(&log, Week::MAX)[&1], BudgetLedger { spent: 25, wasted: 24 });
    }

    #[test]
    fn winning_by_exactly_one_wastes_nothing() {
        let log = vec![txn(1, "p1", 1, 31, true), txn(1, "p1", 2, 30, false)];
        assert_eq!(track_budget(&log, Week::MAX)[&1].wasted, 0);
    }

    #[test]
    fn zero_bid_wastes_nothing() {
        let log = vec![txn(1, "p1", 1, 0, true)];
        assert_eq!(track_budget(&log, Week::MAX)[&1], BudgetLedger { spent: 0, wasted: 0 });
    }

    #[test]
    fn winners_own_lower_bids_do_not_count_as_rival() {
        let log = vec![
            txn(2, "p1", 1, 40, true),
            txn(2, "p1", 1, 35, false),
            txn(2, "p1", 2, 10, false),
        ];
        assert_eq!(track_budget(&log, Week::MAX)[&1].wasted, 29);
    }

    #[test]
    fn same_player_in_different_weeks_are_separate_contests() {
        let log = vec![
            txn(1, "p1", 1, 10, true),
            txn(1, "p1", 2, 9, false),
            txn(4, "p1", 2, 12, true),
        ];
        let contests = resolve_contests(&log);
        assert_eq!(contests.len(), 2);
        let ledgers = track_budget(&log, Week::MAX);
        assert_eq!(ledgers[&1], BudgetLedger { spent: 10, wasted: 0 });
        assert_eq!(ledgers[&2], BudgetLedger { spent: 12, wasted: 11 });
    }

    #[test]
    fn contest_without_winner_wastes_nothing() {
        let log = vec![txn(1, "p1", 1, 10, false), txn(1, "p1", 2, 9, false)];
        let contests = resolve_contests(&log);
        assert_eq!(contests[0].winner(), None);
        assert_eq!(contests[0].wasted(), 0);
        assert!(track_budget(&log, Week::MAX).is_empty());
    }

    #[test]
    fn contests_sorted_descending_by_bid() {
        let log = vec![
            txn(1, "p1", 1, 5, false),
            txn(1, "p1", 2, 50, true),
            txn(1, "p1", 3, 20, false),
        ];
        let contest = &resolve_contests(&log)[0];
        let amounts: Vec<u32> = contest.bids.iter().map(|b| b.amount).collect();
        assert_eq!(amounts, vec![50, 20, 5]);
        assert_eq!(contest.runner_up_amount(), 20);
    }

    #[test]
    fn bids_after_through_week_are_ignored() {
        let log = vec![
            txn(1, "p1", 1, 40, true),
            txn(2, "p7", 1, 10, true),
            txn(3, "p9", 2, 5, true),
        ];
        let ledgers = track_budget(&log, 1);
        assert_eq!(ledgers[&1], BudgetLedger { spent: 40, wasted: 39 });
        assert!(!ledgers.contains_key(&2));
        assert_eq!(track_budget(&log, 2)[&1].spent, 50);
    }

    #[test]
    fn huge_bids_saturate_instead_of_overflowing() {
        let log = vec![txn(1, "p1", 1, u32::MAX, true), txn(2, "p2", 1, u32::MAX, true)];
        let ledger = track_budget(&log, 2)[&1];
        assert_eq!(ledger.spent, u32::MAX);
        assert_eq!(ledger.wasted, u32::MAX);
    }

    #[test]
    fn remaining_budget_policies() {
        let ledger = BudgetLedger { spent: 300, wasted: 40 };
        assert_eq!(
            remaining_budget(1000, &ledger, true, RemainingBudgetPolicy::PreserveUnspent),
            700
        );
        assert_eq!(
            remaining_budget(1000, &ledger, true, RemainingBudgetPolicy::ZeroWhenEliminated),
            0
        );
        assert_eq!(
            remaining_budget(1000, &ledger, false, RemainingBudgetPolicy::ZeroWhenEliminated),
            700
        );
    }

    #[test]
    fn overspend_saturates_at_zero() {
        let ledger = BudgetLedger { spent: 1200, wasted: 0 };
        assert_eq!(
            remaining_budget(1000, &ledger, false, RemainingBudgetPolicy::PreserveUnspent),
            0
        );
    }

    proptest! {
        #[test]
        fn wasted_never_exceeds_spent(
            bids in prop::collection::vec((1u32..4, 0u32..5, 1u32..6, 0u32..200, any::<bool>()), 0..60)
        ) {
            let log: Vec<Transaction> = bids
                .into_iter()
                .map(|(week, player, team, bid, complete)| {
                    txn(week, &format!("p{player}"), team, bid, complete)
                })
                .collect();
            for ledger in track_budget(&log, Week::MAX).values() {
                prop_assert!(ledger.wasted <= ledger.spent);
            }
        }
    }
}
