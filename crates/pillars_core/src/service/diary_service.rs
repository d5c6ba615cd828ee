//! Diary use-cases.
//!
//! # Invariants
//! - A page is always saved for local today; saving twice the same day
//!   updates the existing page.
//! - A page with both fields blank is rejected.

use crate::calendar::day::LocalClock;
use crate::model::diary::{DiaryEntry, DiaryId};
use crate::model::pillar::PillarId;
use crate::repo::diary_repo::{DiaryListQuery, DiaryRepository};
use crate::repo::{RepoError, RepoResult};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum DiaryServiceError {
    /// Reflection and action plan are both blank.
    EmptyEntry,
    DiaryNotFound(DiaryId),
    Repo(RepoError),
}

impl Display for DiaryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyEntry => write!(
                f,
                "fill in at least the reflection or the action plan before saving"
            ),
            Self::DiaryNotFound(id) => write!(f, "diary page not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DiaryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for DiaryServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind: "diary", id } => Self::DiaryNotFound(id),
            other => Self::Repo(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveDiaryRequest {
    pub pillar_id: PillarId,
    pub reflection: String,
    pub action_plan: String,
}

pub struct DiaryService<R: DiaryRepository> {
    repo: R,
    clock: LocalClock,
}

impl<R: DiaryRepository> DiaryService<R> {
    pub fn new(repo: R, clock: LocalClock) -> Self {
        Self { repo, clock }
    }

    /// Creates or updates today's page for the pillar.
    pub fn save_today(&self, request: &SaveDiaryRequest) -> Result<DiaryEntry, DiaryServiceError> {
        let entry = DiaryEntry::new(
            request.pillar_id,
            self.clock.today(),
            request.reflection.trim(),
            request.action_plan.trim(),
            self.clock.now_ms(),
        );
        if entry.is_blank() {
            return Err(DiaryServiceError::EmptyEntry);
        }

        match self.repo.upsert_diary(&entry) {
            Ok(stored) => {
                info!(
                    "event=diary_save module=service status=ok action={}",
                    if stored.id == entry.id { "insert" } else { "update" }
                );
                Ok(stored)
            }
            Err(err) => {
                error!("event=diary_save module=service status=error error={err}");
                Err(err.into())
            }
        }
    }

    /// Pages newest first, never after today.
    pub fn list(&self, pillar_id: Option<PillarId>) -> RepoResult<Vec<DiaryEntry>> {
        self.repo.list_diary(&DiaryListQuery {
            pillar_id,
            up_to: Some(self.clock.today()),
        })
    }

    pub fn set_favorite(&self, id: DiaryId, is_favorite: bool) -> Result<(), DiaryServiceError> {
        self.repo.set_diary_favorite(id, is_favorite)?;
        info!("event=diary_favorite module=service status=ok is_favorite={is_favorite}");
        Ok(())
    }
}
