// End-to-end tests: a recorded season bundle goes through the whole
// pipeline and every report built on top of it.

use guillotine_core::career::career_profile;
use guillotine_core::death_bell::death_bell;
use guillotine_core::historical::read_score_grid;
use guillotine_core::model::{RemainingBudgetPolicy, SeasonSettings};
use guillotine_core::recap::generate_recap;
use guillotine_core::season::{process_season, SeasonReport};
use guillotine_core::transactions::transaction_report;
use guillotine_core::upstream::SeasonBundle;
use guillotine_core::SeasonSnapshot;

const FIXTURES: &str = "tests/fixtures";

fn settings() -> SeasonSettings {
    SeasonSettings {
        season_length: 3,
        ..Default::default()
    }
}

fn snapshot() -> SeasonSnapshot {
    let file = std::fs::File::open(format!("{FIXTURES}/season_2025.json")).unwrap();
    SeasonBundle::from_reader(file).unwrap().into_snapshot(3)
}

fn report() -> SeasonReport {
    process_season(&snapshot(), &settings())
}

#[test]
fn bundle_decodes_into_snapshot() {
    let snap = snapshot();
    assert_eq!(snap.current_week, 3);
    assert_eq!(snap.winner, Some(1));
    assert_eq!(snap.owner_name(3), "cal");
    // Week 3 transactions are garbage and dropped; the free-agent add is
    // not a bid.
    assert_eq!(snap.transactions.len(), 3);
}

#[test]
fn season_finishes_in_elimination_order() {
    let report = report();
    assert!(report.is_complete());
    assert_eq!(report.champion.as_deref(), Some("Ann"));

    let order: Vec<(&str, Option<u32>, Option<u32>)> = report
        .managers
        .iter()
        .map(|m| (m.user_name.as_str(), m.chop_week, m.finish_position))
        .collect();
    assert_eq!(
        order,
        vec![
            ("cal", Some(1), Some(4)),
            ("Dee", Some(2), Some(3)),
            ("Bob", Some(3), Some(2)),
            ("Ann", None, Some(1)),
        ]
    );
}

#[test]
fn chop_line_history_per_manager() {
    let report = report();
    let ann = report.manager("ann").unwrap();
    assert_eq!(ann.avg_pos_above_chop, 1.7);
    assert_eq!(ann.close_calls, 2);
    assert_eq!(ann.draft_position, Some(2));

    let bob = report.manager("Bob").unwrap();
    assert_eq!(bob.avg_pos_above_chop, 1.3);
    assert_eq!(bob.close_calls, 1);

    // Cal's week-2 score came after the chop.
    assert_eq!(report.manager("cal").unwrap().score(2), None);
}

#[test]
fn faab_accounting() {
    let report = report();
    let bob = report.manager("Bob").unwrap();
    assert_eq!((bob.faab_spent, bob.faab_wasted, bob.faab_remaining), (40, 14, 960));
    let ann = report.manager("Ann").unwrap();
    assert_eq!((ann.faab_spent, ann.faab_wasted), (10, 9));

    let mut zeroed = settings();
    zeroed.remaining_budget_policy = RemainingBudgetPolicy::ZeroWhenEliminated;
    let report = process_season(&snapshot(), &zeroed);
    assert_eq!(report.manager("Bob").unwrap().faab_remaining, 0);
    assert_eq!(report.manager("Ann").unwrap().faab_remaining, 990);
}

#[test]
fn weekly_stats_track_the_chop() {
    let report = report();
    let wk1 = report.weekly_stats[&1];
    assert_eq!(wk1.chop_score, Some(80.4));
    assert_eq!(wk1.high_score, Some(110.2));
    assert_eq!(wk1.chop_differential, Some(1.6));
    // Only Ann and Bob were alive in week 3.
    let wk3 = report.weekly_stats[&3];
    assert_eq!(wk3.chop_score, Some(88.8));
    assert_eq!(wk3.percentile_75, Some(130.0));
}

#[test]
fn recap_matches_report() {
    let report = report();
    let recap = generate_recap(&report, &settings().recap);
    assert!(recap.is_complete);
    assert_eq!(recap.champion.as_deref(), Some("Ann"));
    let chopped: Vec<&str> = recap
        .elimination_order
        .iter()
        .map(|e| e.manager.as_str())
        .collect();
    assert_eq!(chopped, vec!["cal", "Dee", "Bob"]);
    assert_eq!(recap.weekly_highlights.len(), 3);
    let top = recap.superlatives.highest_score.unwrap();
    assert_eq!((top.manager.as_str(), top.score, top.week), ("Ann", 130.0, 3));
}

#[test]
fn transactions_and_death_bell() {
    let snap = snapshot();
    let txns = transaction_report(&snap, 3);
    assert_eq!(txns.transactions.len(), 2);
    assert_eq!(txns.transactions[0].player_name, "Jinx Player (RB)");
    assert_eq!(txns.transactions[0].wasted, 14);
    assert_eq!(txns.weekly_summaries[&3].num_transactions, 0);

    let bell = death_bell(&snap, &process_season(&snap, &settings()));
    assert_eq!(bell.total_unique_players_chopped, 4);
    assert_eq!(bell.chopped_players[0].player_id, "p1");
    assert_eq!(bell.chopped_players[0].times_chopped, 2);
}

#[test]
fn career_spans_bundle_and_grid_seasons() {
    let grid = "\
manager,draft_position,wk1,wk2,wk3
Ann,1,70,,
Bob,2,90,100,110
cal,3,95,85,90
Dee,4,80,90,105
";
    let mut old_settings = settings();
    old_settings.starting_budget = 100;
    let old = process_season(&read_score_grid(2024, grid.as_bytes()).unwrap(), &old_settings);
    assert_eq!(old.champion.as_deref(), Some("Bob"));

    let reports = vec![report(), old];
    let profile = career_profile(&reports, "ANN").unwrap();
    assert_eq!(profile.career_stats.seasons_played, 2);
    assert_eq!(profile.career_stats.championships, 1);
    assert_eq!(profile.career_stats.average_finish, Some(2.5));
    assert_eq!(profile.finishes[0].season, 2024);
    assert_eq!(profile.seasons[&2024].weeks_played, 1);
    assert_eq!(profile.career_stats.worst_week.unwrap().score, 70.0);
}
