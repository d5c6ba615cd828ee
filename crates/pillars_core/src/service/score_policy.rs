//! Insert-vs-update and future-date rules for score submissions.
//!
//! # Invariants
//! - A date strictly after local today is rejected before any store access.
//! - Updates keep the existing entry id and `created_at`.
//! - A non-blank note yields a mirrored reflection only when mirroring is on.

use crate::calendar::day::is_future;
use crate::model::entry::{DailyEntry, Score};
use crate::model::pillar::PillarId;
use crate::model::reflection::Reflection;
use crate::repo::entry_repo::{EntryWrite, ScoreWriteSet};
use chrono::NaiveDate;
use std::fmt::{Display, Formatter};

/// Why a submission was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FutureDateRejection {
    pub date: NaiveDate,
    pub today: NaiveDate,
}

impl Display for FutureDateRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cannot record a score for {} because it is after today ({})",
            self.date, self.today
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreUpsertPolicy {
    /// Keep the notes/reflections denormalization of the original feed.
    pub mirror_notes_to_reflections: bool,
}

impl Default for ScoreUpsertPolicy {
    fn default() -> Self {
        Self {
            mirror_notes_to_reflections: true,
        }
    }
}

impl ScoreUpsertPolicy {
    pub fn check_date(
        &self,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<(), FutureDateRejection> {
        if is_future(date, today) {
            return Err(FutureDateRejection { date, today });
        }
        Ok(())
    }

    /// Builds the write set for one submission.
    ///
    /// `existing` must be the stored entry for `(pillar_id, date)`, if any.
    pub fn plan(
        &self,
        pillar_id: PillarId,
        date: NaiveDate,
        score: Score,
        notes: &str,
        existing: Option<DailyEntry>,
        now_ms: i64,
    ) -> ScoreWriteSet {
        let entry = match existing {
            Some(mut entry) => {
                entry.score = score;
                entry.notes = notes.to_string();
                entry.updated_at = now_ms;
                EntryWrite::Update(entry)
            }
            None => EntryWrite::Insert(DailyEntry::new(pillar_id, date, score, notes, now_ms)),
        };

        let trimmed = notes.trim();
        let reflection = (self.mirror_notes_to_reflections && !trimmed.is_empty())
            .then(|| Reflection::new(pillar_id, date, trimmed, now_ms));

        ScoreWriteSet { entry, reflection }
    }
}

#[cfg(test)]
mod tests {
    use super::ScoreUpsertPolicy;
    use crate::model::entry::{DailyEntry, Score};
    use crate::repo::entry_repo::EntryWrite;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn rejects_only_strictly_future_dates() {
        let policy = ScoreUpsertPolicy::default();
        assert!(policy.check_date(date(10), date(10)).is_ok());
        assert!(policy.check_date(date(9), date(10)).is_ok());
        let rejection = policy.check_date(date(11), date(10)).unwrap_err();
        assert_eq!(rejection.date, date(11));
        assert!(rejection.to_string().contains("after today"));
    }

    #[test]
    fn existing_entry_becomes_update_with_same_identity() {
        let pillar = Uuid::new_v4();
        let existing = DailyEntry::new(pillar, date(3), Score::new(4).unwrap(), "old", 100);
        let write = ScoreUpsertPolicy::default().plan(
            pillar,
            date(3),
            Score::new(8).unwrap(),
            "",
            Some(existing.clone()),
            200,
        );

        match write.entry {
            EntryWrite::Update(entry) => {
                assert_eq!(entry.id, existing.id);
                assert_eq!(entry.created_at, 100);
                assert_eq!(entry.updated_at, 200);
                assert_eq!(entry.score.value(), 8);
                assert_eq!(entry.notes, "");
            }
            other => panic!("expected update, got {other:?}"),
        }
        assert!(write.reflection.is_none());
    }

    #[test]
    fn missing_entry_becomes_insert_and_mirrors_notes() {
        let pillar = Uuid::new_v4();
        let write = ScoreUpsertPolicy::default().plan(
            pillar,
            date(3),
            Score::new(6).unwrap(),
            "  walked 5km  ",
            None,
            300,
        );

        assert!(matches!(write.entry, EntryWrite::Insert(_)));
        let reflection = write.reflection.expect("note should be mirrored");
        assert_eq!(reflection.text, "walked 5km");
        assert_eq!(reflection.date, date(3));
        assert_eq!(reflection.pillar_id, pillar);
    }

    #[test]
    fn mirroring_can_be_disabled() {
        let policy = ScoreUpsertPolicy {
            mirror_notes_to_reflections: false,
        };
        let write = policy.plan(
            Uuid::new_v4(),
            date(3),
            Score::new(6).unwrap(),
            "note",
            None,
            0,
        );
        assert!(write.reflection.is_none());
        assert_eq!(write.entry.entry().notes, "note");
    }
}
