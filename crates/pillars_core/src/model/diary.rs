//! Diary page model.
//!
//! # Invariants
//! - `(pillar_id, date)` identifies at most one diary page.
//! - At least one of `reflection` / `action_plan` is non-blank.

use crate::model::pillar::PillarId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a diary page (`diario.id`).
pub type DiaryId = Uuid;

/// Long-form reflection plus action plan for one pillar and day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub id: DiaryId,
    pub pillar_id: PillarId,
    pub date: NaiveDate,
    pub reflection: String,
    pub action_plan: String,
    pub is_favorite: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl DiaryEntry {
    pub fn new(
        pillar_id: PillarId,
        date: NaiveDate,
        reflection: impl Into<String>,
        action_plan: impl Into<String>,
        now_ms: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            pillar_id,
            date,
            reflection: reflection.into(),
            action_plan: action_plan.into(),
            is_favorite: false,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.reflection.trim().is_empty() && self.action_plan.trim().is_empty()
    }
}
