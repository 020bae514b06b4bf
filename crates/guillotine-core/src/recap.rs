// Season recap: elimination timeline, superlatives, and weekly highlights.
//
// Everything here is derived from a finished `SeasonReport`; nothing is
// recomputed from raw scores.

use serde::{Deserialize, Serialize};

use crate::model::{RecapSettings, Week};
use crate::ranking::round_to;
use crate::season::{ManagerSeasonRecord, SeasonReport};

// ---------------------------------------------------------------------------
// Recap types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EliminationEntry {
    pub week: Week,
    pub manager: String,
    pub score: Option<f64>,
}

/// A single score tied to a manager and week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreMark {
    pub score: f64,
    pub manager: String,
    pub week: Week,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseCallLeader {
    pub manager: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvgPositionLeader {
    pub manager: String,
    pub avg_pos: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Superlatives {
    pub highest_score: Option<ScoreMark>,
    /// Lowest score that did not get its owner chopped that week.
    pub lowest_survivor_score: Option<ScoreMark>,
    pub most_close_calls: Option<CloseCallLeader>,
    pub best_avg_position: Option<AvgPositionLeader>,
}

/// A week where the survivor barely cleared the chopped team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecapCloseCall {
    pub week: Week,
    pub survivor: String,
    pub survivor_score: f64,
    pub chopped: String,
    pub chopped_score: f64,
    pub margin: f64,
}

/// A week where the chopped team was nowhere near safety.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blowout {
    pub week: Week,
    pub chopped: String,
    pub score: f64,
    pub margin_to_safety: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyHighlight {
    pub week: Week,
    pub high_scorer: Option<String>,
    pub high_score: f64,
    pub median: Option<f64>,
    pub eliminated: Option<String>,
    pub chop_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recap {
    pub season: u32,
    pub current_week: Week,
    pub is_complete: bool,
    pub champion: Option<String>,
    pub superlatives: Superlatives,
    pub weekly_highlights: Vec<WeeklyHighlight>,
    pub elimination_order: Vec<EliminationEntry>,
    pub close_calls: Vec<RecapCloseCall>,
    pub biggest_blowouts: Vec<Blowout>,
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Build the recap for `report`.
pub fn generate_recap(report: &SeasonReport, settings: &RecapSettings) -> Recap {
    let elimination_order = elimination_order(&report.managers);
    let (close_calls, biggest_blowouts) = bottom_margins(report, settings);

    Recap {
        season: report.season,
        current_week: report.current_week,
        is_complete: report.is_complete(),
        champion: report.champion.clone(),
        superlatives: superlatives(&report.managers),
        weekly_highlights: weekly_highlights(report, &elimination_order),
        elimination_order,
        close_calls,
        biggest_blowouts,
    }
}

fn elimination_order(managers: &[ManagerSeasonRecord]) -> Vec<EliminationEntry> {
    let mut order: Vec<EliminationEntry> = managers
        .iter()
        .filter_map(|m| {
            m.chop_week.map(|week| EliminationEntry {
                week,
                manager: m.user_name.clone(),
                score: m.score(week),
            })
        })
        .collect();
    order.sort_by_key(|e| e.week);
    order
}

fn superlatives(managers: &[ManagerSeasonRecord]) -> Superlatives {
    let mut out = Superlatives::default();

    for m in managers {
        for (week, score) in m.played_weeks() {
            let mark = || ScoreMark {
                score,
                manager: m.user_name.clone(),
                week,
            };
            if out.highest_score.as_ref().map_or(score > 0.0, |h| score > h.score) {
                out.highest_score = Some(mark());
            }
            let survived = m.chop_week != Some(week);
            if survived
                && out
                    .lowest_survivor_score
                    .as_ref()
                    .map_or(true, |l| score < l.score)
            {
                out.lowest_survivor_score = Some(mark());
            }
        }

        let best_calls = out.most_close_calls.as_ref().map_or(0, |c| c.count);
        if m.close_calls > best_calls {
            out.most_close_calls = Some(CloseCallLeader {
                manager: m.user_name.clone(),
                count: m.close_calls,
            });
        }

        let best_avg = out.best_avg_position.as_ref().map_or(0.0, |a| a.avg_pos);
        if m.avg_pos_above_chop > best_avg {
            out.best_avg_position = Some(AvgPositionLeader {
                manager: m.user_name.clone(),
                avg_pos: round_to(m.avg_pos_above_chop, 1),
            });
        }
    }

    out
}

/// Close calls and blowouts at the bottom of each played week.
fn bottom_margins(
    report: &SeasonReport,
    settings: &RecapSettings,
) -> (Vec<RecapCloseCall>, Vec<Blowout>) {
    let mut close_calls = Vec::new();
    let mut blowouts = Vec::new();

    for (&week, stats) in &report.weekly_stats {
        if stats.chop_score.is_none() {
            continue;
        }

        // (manager, score, chopped this week)
        let mut bottom: Vec<(&str, f64, bool)> = report
            .managers
            .iter()
            .filter(|m| m.chop_week.map_or(true, |c| c >= week))
            .filter_map(|m| {
                m.score(week)
                    .map(|s| (m.user_name.as_str(), s, m.chop_week == Some(week)))
            })
            .collect();
        if bottom.len() < 2 {
            continue;
        }
        bottom.sort_by(|a, b| a.1.total_cmp(&b.1).then(b.2.cmp(&a.2)));

        let (chopped, chopped_score, _) = bottom[0];
        let (survivor, survivor_score, _) = bottom[1];
        let margin = round_to(survivor_score - chopped_score, 2);

        if margin < settings.close_call_margin {
            close_calls.push(RecapCloseCall {
                week,
                survivor: survivor.to_string(),
                survivor_score,
                chopped: chopped.to_string(),
                chopped_score,
                margin,
            });
        }
        if margin > settings.blowout_margin {
            blowouts.push(Blowout {
                week,
                chopped: chopped.to_string(),
                score: chopped_score,
                margin_to_safety: margin,
            });
        }
    }

    close_calls.sort_by(|a, b| a.margin.total_cmp(&b.margin));
    close_calls.truncate(settings.list_len);
    blowouts.sort_by(|a, b| b.margin_to_safety.total_cmp(&a.margin_to_safety));
    blowouts.truncate(settings.list_len);

    (close_calls, blowouts)
}

fn weekly_highlights(
    report: &SeasonReport,
    elimination_order: &[EliminationEntry],
) -> Vec<WeeklyHighlight> {
    (1..=report.current_week)
        .filter_map(|week| {
            let stats = report.weekly_stats.get(&week)?;
            if stats.is_placeholder() {
                return None;
            }

            let mut high_scorer = None;
            let mut high_score = 0.0;
            for m in &report.managers {
                if let Some(score) = m.score(week) {
                    if score > high_score {
                        high_score = score;
                        high_scorer = Some(m.user_name.clone());
                    }
                }
            }

            Some(WeeklyHighlight {
                week,
                high_scorer,
                high_score,
                median: stats.median,
                eliminated: elimination_order
                    .iter()
                    .find(|e| e.week == week)
                    .map(|e| e.manager.clone()),
                chop_score: stats.chop_score,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ScoreTable, SeasonSettings, SeasonSnapshot, Team, TeamId};
    use crate::season::process_season;

    /// Build a complete season from per-team weekly score rows.
    fn report_from(rows: &[(&str, &[f64])]) -> SeasonReport {
        let mut scores = ScoreTable::new();
        let mut teams = Vec::new();
        for (i, (name, weeks)) in rows.iter().enumerate() {
            let id = i as TeamId + 1;
            teams.push(Team {
                id,
                owner_name: name.to_string(),
                draft_position: None,
            });
            for (w, &s) in weeks.iter().enumerate() {
                scores.insert(id, w as Week + 1, s);
            }
        }
        let season_length = (rows.len() - 1) as Week;
        let snap = SeasonSnapshot {
            season: 2024,
            teams,
            scores,
            current_week: season_length,
            ..Default::default()
        };
        process_season(
            &snap,
            &SeasonSettings {
                season_length,
                ..Default::default()
            },
        )
    }

    fn four_team_report() -> SeasonReport {
        // wk1: D chopped at 60 (next 63, margin 3)
        // wk2: C chopped at 70 (next 100, margin 30)
        // wk3: B chopped at 90 (next 140, margin 50)
        report_from(&[
            ("A", &[120.0, 100.0, 140.0]),
            ("B", &[63.0, 150.0, 90.0]),
            ("C", &[110.0, 70.0]),
            ("D", &[60.0]),
        ])
    }

    #[test]
    fn elimination_order_is_chronological() {
        let recap = generate_recap(&four_team_report(), &RecapSettings::default());
        let order: Vec<(Week, &str, Option<f64>)> = recap
            .elimination_order
            .iter()
            .map(|e| (e.week, e.manager.as_str(), e.score))
            .collect();
        assert_eq!(
            order,
            vec![(1, "D", Some(60.0)), (2, "C", Some(70.0)), (3, "B", Some(90.0))]
        );
        assert!(recap.is_complete);
        assert_eq!(recap.champion.as_deref(), Some("A"));
    }

    #[test]
    fn superlatives_are_tracked() {
        let recap = generate_recap(&four_team_report(), &RecapSettings::default());
        let s = &recap.superlatives;

        let high = s.highest_score.as_ref().unwrap();
        assert_eq!((high.manager.as_str(), high.week, high.score), ("B", 2, 150.0));

        // 60, 70 and 90 were chop scores; the lowest surviving score is B's 63.
        let low = s.lowest_survivor_score.as_ref().unwrap();
        assert_eq!((low.manager.as_str(), low.week, low.score), ("B", 1, 63.0));

        let avg = s.best_avg_position.as_ref().unwrap();
        assert_eq!(avg.manager, "A");
    }

    #[test]
    fn close_calls_and_blowouts() {
        let recap = generate_recap(&four_team_report(), &RecapSettings::default());

        assert_eq!(recap.close_calls.len(), 1);
        let cc = &recap.close_calls[0];
        assert_eq!(cc.week, 1);
        assert_eq!(cc.survivor, "B");
        assert_eq!(cc.chopped, "D");
        assert_eq!(cc.margin, 3.0);

        let margins: Vec<f64> = recap
            .biggest_blowouts
            .iter()
            .map(|b| b.margin_to_safety)
            .collect();
        assert_eq!(margins, vec![50.0, 30.0]);
        assert_eq!(recap.biggest_blowouts[0].chopped, "B");
    }

    #[test]
    fn lists_are_capped_and_sorted() {
        // Seven teams, six weeks, every bottom margin below 5.
        let report = report_from(&[
            ("A", &[200.0, 200.0, 200.0, 200.0, 200.0, 103.0]),
            ("B", &[104.0, 103.0, 102.0, 101.5, 100.5, 100.2]),
            ("C", &[104.5, 103.5, 102.5, 101.8, 100.0]),
            ("D", &[105.0, 104.0, 101.0, 101.0]),
            ("E", &[106.0, 100.0, 100.0]),
            ("F", &[107.0, 99.0]),
            ("G", &[100.0]),
        ]);
        let recap = generate_recap(&report, &RecapSettings::default());
        assert_eq!(recap.close_calls.len(), 5);
        let margins: Vec<f64> = recap.close_calls.iter().map(|c| c.margin).collect();
        let mut sorted = margins.clone();
        sorted.sort_by(f64::total_cmp);
        assert_eq!(margins, sorted);
        assert!(recap.biggest_blowouts.is_empty());
    }

    #[test]
    fn weekly_highlights_cover_played_weeks() {
        let recap = generate_recap(&four_team_report(), &RecapSettings::default());
        assert_eq!(recap.weekly_highlights.len(), 3);

        let wk2 = &recap.weekly_highlights[1];
        assert_eq!(wk2.week, 2);
        assert_eq!(wk2.high_scorer.as_deref(), Some("B"));
        assert_eq!(wk2.high_score, 150.0);
        assert_eq!(wk2.median, Some(100.0));
        assert_eq!(wk2.eliminated.as_deref(), Some("C"));
        assert_eq!(wk2.chop_score, Some(70.0));
    }

    #[test]
    fn preseason_recap_is_empty() {
        let snap = SeasonSnapshot {
            season: 2026,
            teams: vec![Team {
                id: 1,
                owner_name: "A".into(),
                draft_position: None,
            }],
            current_week: 0,
            ..Default::default()
        };
        let report = process_season(&snap, &SeasonSettings::default());
        let recap = generate_recap(&report, &RecapSettings::default());
        assert!(!recap.is_complete);
        assert!(recap.elimination_order.is_empty());
        assert!(recap.weekly_highlights.is_empty());
        assert_eq!(recap.superlatives, Superlatives::default());
    }
}
