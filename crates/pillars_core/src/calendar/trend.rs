//! Score aggregates over one pillar's history.
//!
//! # Invariants
//! - Inputs are ordered by date ascending; "latest" means last element.
//! - An empty month is `MonthlyAverage::NoData`, never a zero average.

use crate::calendar::day::{Dated, YearMonth};
use crate::model::entry::{DailyEntry, Score};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Placeholder rendered when a month has no entries.
pub const NO_DATA_PLACEHOLDER: &str = "—";

/// Direction of the latest change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Stable => "stable",
        }
    }
}

/// Average of one month's scores, or the absence of any.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MonthlyAverage {
    NoData,
    /// Rounded to one decimal place.
    Average(f64),
}

impl MonthlyAverage {
    pub fn value(self) -> Option<f64> {
        match self {
            Self::NoData => None,
            Self::Average(value) => Some(value),
        }
    }
}

impl Display for MonthlyAverage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoData => write!(f, "{NO_DATA_PLACEHOLDER}"),
            Self::Average(value) => write!(f, "{value:.1}"),
        }
    }
}

/// Chart window over the most recent entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    Week,
    Month,
}

impl Timeframe {
    pub fn entry_count(self) -> usize {
        match self {
            Self::Week => 7,
            Self::Month => 30,
        }
    }
}

/// Up/down/stable from the two most recent entries.
pub fn trend(entries: &[DailyEntry]) -> Trend {
    match entries {
        [.., previous, latest] if latest.score > previous.score => Trend::Up,
        [.., previous, latest] if latest.score < previous.score => Trend::Down,
        _ => Trend::Stable,
    }
}

/// Score of the most recent entry.
pub fn current_score(entries: &[DailyEntry]) -> Option<Score> {
    entries.last().map(|entry| entry.score)
}

/// Mean score of entries whose day falls in `month`.
pub fn monthly_average(entries: &[DailyEntry], month: YearMonth) -> MonthlyAverage {
    let (sum, count) = entries
        .iter()
        .filter(|entry| month.contains(entry.day()))
        .fold((0_u32, 0_u32), |(sum, count), entry| {
            (sum + u32::from(entry.score.value()), count + 1)
        });

    if count == 0 {
        return MonthlyAverage::NoData;
    }

    MonthlyAverage::Average(round_one_decimal(f64::from(sum) / f64::from(count)))
}

/// Last `timeframe.entry_count()` entries, still in date order.
pub fn recent_window(entries: &[DailyEntry], timeframe: Timeframe) -> &[DailyEntry] {
    let start = entries.len().saturating_sub(timeframe.entry_count());
    &entries[start..]
}

// f64::round rounds half away from zero.
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::{
        current_score, monthly_average, recent_window, trend, MonthlyAverage, Timeframe, Trend,
    };
    use crate::calendar::day::YearMonth;
    use crate::model::entry::{DailyEntry, Score};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn entries(dated_scores: &[(u32, u32, i64)]) -> Vec<DailyEntry> {
        let pillar = Uuid::new_v4();
        dated_scores
            .iter()
            .map(|&(month, day, score)| {
                DailyEntry::new(
                    pillar,
                    NaiveDate::from_ymd_opt(2024, month, day).unwrap(),
                    Score::new(score).unwrap(),
                    "",
                    0,
                )
            })
            .collect()
    }

    #[test]
    fn trend_follows_last_two_scores() {
        assert_eq!(trend(&entries(&[(3, 1, 2), (3, 2, 6), (3, 3, 8)])), Trend::Up);
        assert_eq!(trend(&entries(&[(3, 1, 9), (3, 2, 8), (3, 3, 6)])), Trend::Down);
        assert_eq!(trend(&entries(&[(3, 2, 7), (3, 3, 7)])), Trend::Stable);
        assert_eq!(trend(&entries(&[(3, 3, 4)])), Trend::Stable);
        assert_eq!(trend(&[]), Trend::Stable);
    }

    #[test]
    fn monthly_average_ignores_other_months() {
        let history = entries(&[(2, 28, 1), (3, 1, 5), (3, 2, 7), (3, 3, 9)]);
        let march = YearMonth::new(2024, 3).unwrap();
        assert_eq!(monthly_average(&history, march), MonthlyAverage::Average(7.0));
    }

    #[test]
    fn monthly_average_without_entries_is_no_data() {
        let history = entries(&[(2, 28, 1)]);
        let march = YearMonth::new(2024, 3).unwrap();
        let average = monthly_average(&history, march);
        assert_eq!(average, MonthlyAverage::NoData);
        assert_eq!(average.to_string(), "—");
        assert_eq!(average.value(), None);
    }

    #[test]
    fn monthly_average_rounds_to_one_decimal() {
        let history = entries(&[(3, 1, 7), (3, 2, 8), (3, 3, 8)]);
        let march = YearMonth::new(2024, 3).unwrap();
        // 23 / 3 = 7.666..
        assert_eq!(monthly_average(&history, march).to_string(), "7.7");

        let halves = entries(&[(3, 1, 0), (3, 2, 0), (3, 3, 0), (3, 4, 1)]);
        // 1 / 4 = 0.25 -> 0.3
        assert_eq!(monthly_average(&halves, march), MonthlyAverage::Average(0.3));
    }

    #[test]
    fn current_score_and_window_use_latest_entries() {
        let history: Vec<(u32, u32, i64)> =
            (1..=10_u32).map(|day| (3, day, i64::from(day))).collect();
        let history = entries(&history);
        assert_eq!(current_score(&history), Some(Score::new(10).unwrap()));

        let week = recent_window(&history, Timeframe::Week);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].score.value(), 4);
        assert_eq!(recent_window(&history, Timeframe::Month).len(), 10);
        assert_eq!(current_score(&[]), None);
    }
}
