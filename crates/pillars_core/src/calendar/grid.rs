//! Monthly heat-map grid.
//!
//! # Responsibility
//! - Lay out a month as a Sunday-first, 7-column grid.
//! - Attach entries and today/future/selection flags to each day cell.
//! - Classify scores into display bands.
//!
//! # Invariants
//! - Leading blank cells == weekday index (Sunday = 0) of day 1.
//! - Exactly one day cell per day of month, in order, no trailing padding.

use crate::calendar::day::{filter_month, is_future, YearMonth};
use crate::model::entry::{DailyEntry, Score};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

/// Columns per grid row, Sunday first.
pub const WEEKDAY_COLUMNS: usize = 7;

/// Color band for a day's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    NoData,
    /// 0..=3
    Low,
    /// 4..=6
    Mid,
    /// 7..=10
    High,
}

impl ScoreBand {
    pub fn for_score(score: Option<Score>) -> Self {
        match score.map(Score::value) {
            None => Self::NoData,
            Some(0..=3) => Self::Low,
            Some(4..=6) => Self::Mid,
            Some(_) => Self::High,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    /// 1-based day of month.
    pub day: u32,
    pub date: NaiveDate,
    pub entry: Option<DailyEntry>,
    pub band: ScoreBand,
    pub is_future: bool,
    pub is_today: bool,
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalendarCell {
    Blank,
    Day(DayCell),
}

impl CalendarCell {
    pub fn as_day(&self) -> Option<&DayCell> {
        match self {
            Self::Blank => None,
            Self::Day(cell) => Some(cell),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub month: YearMonth,
    pub cells: Vec<CalendarCell>,
}

impl MonthGrid {
    pub fn leading_blanks(&self) -> usize {
        self.cells
            .iter()
            .take_while(|cell| matches!(cell, CalendarCell::Blank))
            .count()
    }

    pub fn day(&self, day: u32) -> Option<&DayCell> {
        self.days().find(|cell| cell.day == day)
    }

    pub fn days(&self) -> impl Iterator<Item = &DayCell> {
        self.cells.iter().filter_map(CalendarCell::as_day)
    }

    /// Grid rows; the last row may be shorter than 7 cells.
    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarCell]> {
        self.cells.chunks(WEEKDAY_COLUMNS)
    }
}

/// Builds the grid for `month` from one pillar's entries.
///
/// `today` must be resolved once by the caller for the whole render pass.
pub fn build_month_grid(
    month: YearMonth,
    entries: &[DailyEntry],
    today: NaiveDate,
    selected: Option<NaiveDate>,
) -> MonthGrid {
    let by_date: HashMap<NaiveDate, &DailyEntry> = filter_month(entries, month)
        .into_iter()
        .map(|entry| (entry.date, entry))
        .collect();

    let first = month.first_day();
    let leading = first.weekday().num_days_from_sunday() as usize;
    let days_in_month = month.days_in_month();

    let mut cells = Vec::with_capacity(leading + days_in_month as usize);
    cells.extend(std::iter::repeat(CalendarCell::Blank).take(leading));

    for date in first.iter_days().take(days_in_month as usize) {
        let entry = by_date.get(&date).map(|entry| (*entry).clone());
        cells.push(CalendarCell::Day(DayCell {
            day: date.day(),
            date,
            band: ScoreBand::for_score(entry.as_ref().map(|entry| entry.score)),
            entry,
            is_future: is_future(date, today),
            is_today: date == today,
            is_selected: selected == Some(date),
        }));
    }

    MonthGrid { month, cells }
}
