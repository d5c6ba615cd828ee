//! Reflection feed model.
//!
//! # Responsibility
//! - Define free-standing reflections (`reflexoes` rows).
//! - Derive the short preview shown in feed cards.
//!
//! # Invariants
//! - Reflections are append-only; only `is_favorite` changes after insert.
//! - `text` is never blank.

use crate::model::pillar::PillarId;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a reflection (`reflexoes.id`).
pub type ReflectionId = Uuid;

const PREVIEW_MAX_CHARS: usize = 100;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reflection {
    pub id: ReflectionId,
    pub pillar_id: PillarId,
    pub date: NaiveDate,
    pub text: String,
    pub is_favorite: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Reflection {
    /// Creates a new reflection with a generated stable ID.
    pub fn new(pillar_id: PillarId, date: NaiveDate, text: impl Into<String>, now_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            pillar_id,
            date,
            text: text.into(),
            is_favorite: false,
            created_at: now_ms,
        }
    }

    /// Single-line summary capped at 100 chars.
    pub fn preview(&self) -> String {
        let normalized = WHITESPACE_RE.replace_all(self.text.trim(), " ");
        let mut preview: String = normalized.chars().take(PREVIEW_MAX_CHARS).collect();
        if normalized.chars().count() > PREVIEW_MAX_CHARS {
            preview.push_str("...");
        }
        preview
    }
}
