// Per-week score distribution over alive teams.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::elimination::EliminationOutcome;
use crate::model::{ScoreTable, Week};
use crate::ranking::round_to;

/// Distribution of alive-team scores for one week. Every field is `None`
/// for weeks that have not been played.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyStatistics {
    pub high_score: Option<f64>,
    pub percentile_75: Option<f64>,
    pub median: Option<f64>,
    pub percentile_25: Option<f64>,
    /// Lowest alive score, i.e. the week's chop score.
    pub chop_score: Option<f64>,
    /// Second-lowest minus lowest, rounded to cents.
    pub chop_differential: Option<f64>,
}

impl WeeklyStatistics {
    /// All-null entry for an unplayed week.
    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn is_placeholder(&self) -> bool {
        self.high_score.is_none()
    }
}

/// Summarize one week's alive scores.
///
/// With fewer than four scores the quartiles collapse to the extremes.
/// Otherwise the sorted scores are split into a lower and an upper half
/// (the middle value is left out of both when the count is odd) and each
/// quartile is the median of its half.
pub fn weekly_stats(scores: &[f64]) -> WeeklyStatistics {
    if scores.is_empty() {
        return WeeklyStatistics::placeholder();
    }

    let mut sorted = scores.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    let low = sorted[0];
    let high = sorted[n - 1];

    let (p25, p75) = if n >= 4 {
        let half = n / 2;
        (median(&sorted[..half]), median(&sorted[n - half..]))
    } else {
        (low, high)
    };

    let chop_differential = if n >= 2 {
        round_to(sorted[1] - sorted[0], 2)
    } else {
        0.0
    };

    WeeklyStatistics {
        high_score: Some(high),
        percentile_75: Some(p75),
        median: Some(median(&sorted)),
        percentile_25: Some(p25),
        chop_score: Some(low),
        chop_differential: Some(chop_differential),
    }
}

/// Median of already-sorted, non-empty data.
fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Statistics for every week `1..=season_length`.
///
/// Weeks after `current_week`, and weeks with no alive scores, are
/// placeholders.
pub fn season_weekly_stats(
    scores: &ScoreTable,
    outcome: &EliminationOutcome,
    current_week: Week,
    season_length: Week,
) -> BTreeMap<Week, WeeklyStatistics> {
    (1..=season_length)
        .map(|week| {
            if week > current_week {
                return (week, WeeklyStatistics::placeholder());
            }
            let alive = scores
                .teams()
                .filter(|&team| outcome.alive_entering(team, week));
            let week_scores: Vec<f64> = scores
                .week_scores(week, alive)
                .into_iter()
                .map(|(_, s)| s)
                .collect();
            (week, weekly_stats(&week_scores))
        })
        .collect()
}
