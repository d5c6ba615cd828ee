//! Daily score entry model.
//!
//! # Responsibility
//! - Define the per-pillar, per-day score record (`notas` row).
//! - Own range validation for user-entered scores.
//!
//! # Invariants
//! - `Score` values are always within `0..=10`.
//! - `(pillar_id, date)` identifies at most one entry.
//! - `id` is preserved when an entry is updated in place.

use crate::model::pillar::PillarId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a daily entry (`notas.id`).
pub type EntryId = Uuid;

/// Rejection reasons for user-entered scores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreValidationError {
    /// Input is not an integer.
    NotANumber(String),
    /// Input is an integer outside `0..=10`.
    OutOfRange(i64),
}

impl Display for ScoreValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotANumber(raw) => write!(
                f,
                "please enter a valid score between {} and {} (got `{raw}`)",
                Score::MIN,
                Score::MAX
            ),
            Self::OutOfRange(value) => write!(
                f,
                "please enter a valid score between {} and {} (got {value})",
                Score::MIN,
                Score::MAX
            ),
        }
    }
}

impl Error for ScoreValidationError {}

/// Integer score in `0..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 10;

    /// Validates an integer score.
    pub fn new(value: i64) -> Result<Self, ScoreValidationError> {
        if value < i64::from(Self::MIN) || value > i64::from(Self::MAX) {
            return Err(ScoreValidationError::OutOfRange(value));
        }
        // Range-checked above, the cast cannot truncate.
        Ok(Self(value as u8))
    }

    /// Parses user text such as `" 7 "`.
    ///
    /// Fractional and non-numeric input is rejected instead of truncated.
    pub fn parse(text: &str) -> Result<Self, ScoreValidationError> {
        let trimmed = text.trim();
        let value = trimmed
            .parse::<i64>()
            .map_err(|_| ScoreValidationError::NotANumber(trimmed.to_string()))?;
        Self::new(value)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Score {
    type Error = ScoreValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for u8 {
    fn from(value: Score) -> Self {
        value.0
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One scored day for one pillar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyEntry {
    pub id: EntryId,
    pub pillar_id: PillarId,
    /// Local calendar day, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub score: Score,
    /// Free text, possibly empty.
    pub notes: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Bumped on every in-place update.
    pub updated_at: i64,
}

impl DailyEntry {
    /// Creates a new entry with a generated stable ID.
    pub fn new(
        pillar_id: PillarId,
        date: NaiveDate,
        score: Score,
        notes: impl Into<String>,
        now_ms: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            pillar_id,
            date,
            score,
            notes: notes.into(),
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Returns whether this entry carries a non-blank note.
    pub fn has_notes(&self) -> bool {
        !self.notes.trim().is_empty()
    }
}
