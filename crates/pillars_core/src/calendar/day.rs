//! Calendar-day normalization shared by every date-aware call site.
//!
//! # Responsibility
//! - Resolve "today" in the viewer's local offset.
//! - Turn stored date strings into local day keys without timezone drift.
//! - Bucket dated records by day and by month.
//!
//! # Invariants
//! - A date-only string is a local calendar date and is never shifted.
//! - A timestamp at exactly UTC midnight is a serialized date and keeps its
//!   date; other timestamps are converted into the local offset first.
//! - `today` is derived from a single clock read per call.

use crate::model::diary::DiaryEntry;
use crate::model::entry::DailyEntry;
use crate::model::reflection::Reflection;
use chrono::{
    DateTime, Datelike, FixedOffset, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, Utc,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

static DATE_ONLY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date-only regex"));

/// Rejection reasons for day-key parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayKeyError {
    Empty,
    Invalid(String),
}

impl Display for DayKeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "date must not be empty"),
            Self::Invalid(raw) => write!(f, "invalid date `{raw}`; expected YYYY-MM-DD"),
        }
    }
}

impl Error for DayKeyError {}

/// Parses a stored date string into a local day key.
pub fn parse_day_key(raw: &str, offset: FixedOffset) -> Result<NaiveDate, DayKeyError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DayKeyError::Empty);
    }

    if DATE_ONLY_RE.is_match(trimmed) {
        return NaiveDate::parse_from_str(trimmed, DAY_KEY_FORMAT)
            .map_err(|_| DayKeyError::Invalid(trimmed.to_string()));
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        let utc = instant.with_timezone(&Utc);
        if utc.time() == NaiveTime::MIN && instant.offset().local_minus_utc() == 0 {
            return Ok(utc.date_naive());
        }
        return Ok(utc.with_timezone(&offset).date_naive());
    }

    // Wall-clock timestamps without a zone are already local.
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S"))
        .map(|local| local.date())
        .map_err(|_| DayKeyError::Invalid(trimmed.to_string()))
}

/// Formats a day key as stored in the database (`YYYY-MM-DD`).
pub fn format_day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

/// Returns whether `date` lies strictly after `today`.
pub fn is_future(date: NaiveDate, today: NaiveDate) -> bool {
    date > today
}

/// Returns whether `date` falls in `month` of `year`.
pub fn is_in_month(date: NaiveDate, year: i32, month: u32) -> bool {
    date.year() == year && date.month() == month
}

/// Source of "now" bound to the viewer's UTC offset.
///
/// Tests pin the instant; production reads the system clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalClock {
    offset: FixedOffset,
    pinned_now: Option<DateTime<Utc>>,
}

impl LocalClock {
    /// Uses the host's current local offset.
    pub fn system() -> Self {
        Self::with_offset(*Local::now().offset())
    }

    pub fn with_offset(offset: FixedOffset) -> Self {
        Self {
            offset,
            pinned_now: None,
        }
    }

    /// Returns `None` when the offset exceeds ±24h.
    pub fn with_offset_minutes(minutes: i32) -> Option<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self::with_offset)
    }

    /// Clock frozen at `now`.
    pub fn pinned(offset: FixedOffset, now: DateTime<Utc>) -> Self {
        Self {
            offset,
            pinned_now: Some(now),
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn now_utc(&self) -> DateTime<Utc> {
        self.pinned_now.unwrap_or_else(Utc::now)
    }

    pub fn now_ms(&self) -> i64 {
        self.now_utc().timestamp_millis()
    }

    /// Local calendar day of the current instant.
    pub fn today(&self) -> NaiveDate {
        self.now_utc().with_timezone(&self.offset).date_naive()
    }

    pub fn parse_day(&self, raw: &str) -> Result<NaiveDate, DayKeyError> {
        parse_day_key(raw, self.offset)
    }
}

/// A calendar month, represented by its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    /// Returns `None` for months outside `1..=12` or unrepresentable years.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(self) -> i32 {
        self.first.year()
    }

    /// 1-based month number.
    pub fn month(self) -> u32 {
        self.first.month()
    }

    pub fn first_day(self) -> NaiveDate {
        self.first
    }

    pub fn days_in_month(self) -> u32 {
        let month = self.first.month();
        self.first
            .iter_days()
            .take_while(|day| day.month() == month)
            .count() as u32
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        is_in_month(date, self.year(), self.month())
    }

    pub fn next(self) -> Option<Self> {
        self.first
            .checked_add_months(Months::new(1))
            .map(|first| Self { first })
    }

    pub fn prev(self) -> Option<Self> {
        self.first
            .checked_sub_months(Months::new(1))
            .map(|first| Self { first })
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// Records that belong to one local calendar day.
pub trait Dated {
    fn day(&self) -> NaiveDate;
}

impl Dated for DailyEntry {
    fn day(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for Reflection {
    fn day(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for DiaryEntry {
    fn day(&self) -> NaiveDate {
        self.date
    }
}

/// Keeps records whose day falls in `month`, preserving input order.
pub fn filter_month<T: Dated>(items: &[T], month: YearMonth) -> Vec<&T> {
    items
        .iter()
        .filter(|item| month.contains(item.day()))
        .collect()
}

/// Groups records by day; each bucket keeps input order.
pub fn group_by_day<T: Dated>(items: &[T]) -> BTreeMap<NaiveDate, Vec<&T>> {
    let mut groups: BTreeMap<NaiveDate, Vec<&T>> = BTreeMap::new();
    for item in items {
        groups.entry(item.day()).or_default().push(item);
    }
    groups
}
