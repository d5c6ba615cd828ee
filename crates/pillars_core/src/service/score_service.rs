//! Score recording use-case.
//!
//! # Responsibility
//! - Persist one (pillar, date, score, note) submission through the upsert
//!   policy.
//! - Return the stored entry as read back from the store.
//!
//! # Invariants
//! - Future dates never reach the repository.
//! - A failed write leaves no partial state; callers keep their local view.

use crate::calendar::day::LocalClock;
use crate::model::entry::{DailyEntry, Score};
use crate::model::pillar::PillarId;
use crate::repo::entry_repo::{EntryRepository, EntryWrite};
use crate::repo::{RepoError, RepoResult};
use crate::service::score_policy::{FutureDateRejection, ScoreUpsertPolicy};
use chrono::NaiveDate;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ScoreServiceError {
    FutureDate(FutureDateRejection),
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ScoreServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FutureDate(rejection) => write!(f, "{rejection}"),
            Self::Repo(err) => write!(f, "failed to save score: {err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent score state: {details}"),
        }
    }
}

impl Error for ScoreServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ScoreServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// One score submission. The score is validated by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreWriteRequest {
    pub pillar_id: PillarId,
    /// Local today when `None`.
    pub date: Option<NaiveDate>,
    pub score: Score,
    /// Empty when `None`.
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAction {
    Inserted,
    Updated,
}

impl WriteAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inserted => "insert",
            Self::Updated => "update",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreWriteOutcome {
    pub entry: DailyEntry,
    pub action: WriteAction,
    /// A reflection was appended for the note.
    pub reflection_mirrored: bool,
}

/// Score service facade over an entry repository.
pub struct ScoreService<R: EntryRepository> {
    repo: R,
    clock: LocalClock,
    policy: ScoreUpsertPolicy,
}

impl<R: EntryRepository> ScoreService<R> {
    pub fn new(repo: R, clock: LocalClock, policy: ScoreUpsertPolicy) -> Self {
        Self {
            repo,
            clock,
            policy,
        }
    }

    /// Records a score, creating or updating the day's entry.
    pub fn record_score(
        &self,
        request: &ScoreWriteRequest,
    ) -> Result<ScoreWriteOutcome, ScoreServiceError> {
        let today = self.clock.today();
        let date = request.date.unwrap_or(today);

        if let Err(rejection) = self.policy.check_date(date, today) {
            warn!(
                "event=score_write module=service status=rejected reason=future_date date={date} today={today}"
            );
            return Err(ScoreServiceError::FutureDate(rejection));
        }

        match self.write(request.pillar_id, date, request) {
            Ok(outcome) => {
                info!(
                    "event=score_write module=service status=ok action={} reflection_mirrored={}",
                    outcome.action.as_str(),
                    outcome.reflection_mirrored
                );
                Ok(outcome)
            }
            Err(err) => {
                error!("event=score_write module=service status=error error={err}");
                Err(err)
            }
        }
    }

    /// Stored entry for one pillar and day.
    pub fn get_entry(
        &self,
        pillar_id: PillarId,
        date: NaiveDate,
    ) -> RepoResult<Option<DailyEntry>> {
        self.repo.get_entry(pillar_id, date)
    }

    fn write(
        &self,
        pillar_id: PillarId,
        date: NaiveDate,
        request: &ScoreWriteRequest,
    ) -> Result<ScoreWriteOutcome, ScoreServiceError> {
        let existing = self.repo.get_entry(pillar_id, date)?;
        let write = self.policy.plan(
            pillar_id,
            date,
            request.score,
            request.notes.as_deref().unwrap_or_default(),
            existing,
            self.clock.now_ms(),
        );
        let action = match write.entry {
            EntryWrite::Insert(_) => WriteAction::Inserted,
            EntryWrite::Update(_) => WriteAction::Updated,
        };

        let receipt = self.repo.apply_score_write(&write)?;
        let entry = self
            .repo
            .get_entry(pillar_id, date)?
            .ok_or(ScoreServiceError::InconsistentState(
                "saved entry not found in read-back",
            ))?;

        Ok(ScoreWriteOutcome {
            entry,
            action,
            reflection_mirrored: receipt.reflection_inserted,
        })
    }
}
