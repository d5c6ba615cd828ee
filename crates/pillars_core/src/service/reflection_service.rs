//! Reflections feed use-cases.
//!
//! # Responsibility
//! - Append free-standing reflections for today.
//! - Serve the filtered feed (pillar, day, text search, favorites).
//! - Toggle favorites.
//!
//! # Invariants
//! - Feed items are never dated after local today.
//! - Feed order is day descending, then newest insert first.
//! - Search is case-insensitive over reflection text and pillar name.

use crate::calendar::day::{group_by_day, Dated, LocalClock};
use crate::model::pillar::{Pillar, PillarId};
use crate::model::reflection::{Reflection, ReflectionId};
use crate::repo::pillar_repo::PillarRepository;
use crate::repo::reflection_repo::{ReflectionListQuery, ReflectionRepository};
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use log::{error, info};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ReflectionServiceError {
    /// Text is blank after trimming.
    EmptyText,
    PillarNotFound(PillarId),
    ReflectionNotFound(ReflectionId),
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ReflectionServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "reflection text must not be empty"),
            Self::PillarNotFound(id) => write!(f, "pillar not found: {id}"),
            Self::ReflectionNotFound(id) => write!(f, "reflection not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent reflection state: {details}")
            }
        }
    }
}

impl Error for ReflectionServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ReflectionServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                kind: "reflection",
                id,
            } => Self::ReflectionNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Feed filters; all optional and combinable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReflectionFeedQuery {
    pub pillar_id: Option<PillarId>,
    pub date: Option<NaiveDate>,
    /// Case-insensitive substring; blank means no search.
    pub search: Option<String>,
    pub favorites_only: bool,
}

/// Reflection joined with its pillar's display fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectionFeedItem {
    pub reflection: Reflection,
    pub pillar_name: String,
    pub pillar_icon: String,
}

impl Dated for ReflectionFeedItem {
    fn day(&self) -> NaiveDate {
        self.reflection.date
    }
}

/// Latest reflection slot for one pillar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PillarLatestReflection {
    pub pillar: Pillar,
    pub latest: Option<Reflection>,
}

pub struct ReflectionService<R: ReflectionRepository, P: PillarRepository> {
    reflections: R,
    pillars: P,
    clock: LocalClock,
}

impl<R: ReflectionRepository, P: PillarRepository> ReflectionService<R, P> {
    pub fn new(reflections: R, pillars: P, clock: LocalClock) -> Self {
        Self {
            reflections,
            pillars,
            clock,
        }
    }

    /// Appends a reflection dated local today.
    pub fn add_reflection(
        &self,
        pillar_id: PillarId,
        text: &str,
    ) -> Result<Reflection, ReflectionServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ReflectionServiceError::EmptyText);
        }
        if self.pillars.get_pillar(pillar_id)?.is_none() {
            return Err(ReflectionServiceError::PillarNotFound(pillar_id));
        }

        let reflection = Reflection::new(pillar_id, self.clock.today(), text, self.clock.now_ms());
        let id = self.reflections.insert_reflection(&reflection).map_err(|err| {
            error!("event=reflection_create module=service status=error error={err}");
            err
        })?;
        info!("event=reflection_create module=service status=ok");

        self.reflections
            .get_reflection(id)?
            .ok_or(ReflectionServiceError::InconsistentState(
                "created reflection not found in read-back",
            ))
    }

    /// Filtered feed, newest first.
    pub fn feed(&self, query: &ReflectionFeedQuery) -> RepoResult<Vec<ReflectionFeedItem>> {
        let pillars: HashMap<PillarId, Pillar> = self
            .pillars
            .list_pillars()?
            .into_iter()
            .map(|pillar| (pillar.id, pillar))
            .collect();

        let reflections = self.reflections.list_reflections(&ReflectionListQuery {
            pillar_id: query.pillar_id,
            date: query.date,
            up_to: Some(self.clock.today()),
            favorites_only: query.favorites_only,
        })?;

        let needle = query
            .search
            .as_deref()
            .map(|search| search.trim().to_lowercase())
            .filter(|search| !search.is_empty());

        let items = reflections
            .into_iter()
            .map(|reflection| {
                let (pillar_name, pillar_icon) = pillars
                    .get(&reflection.pillar_id)
                    .map(|pillar| (pillar.name.clone(), pillar.icon.clone()))
                    .unwrap_or_default();
                ReflectionFeedItem {
                    reflection,
                    pillar_name,
                    pillar_icon,
                }
            })
            .filter(|item| match needle.as_deref() {
                Some(needle) => {
                    item.reflection.text.to_lowercase().contains(needle)
                        || item.pillar_name.to_lowercase().contains(needle)
                }
                None => true,
            })
            .collect();
        Ok(items)
    }

    /// Newest reflection per pillar, one slot per pillar in pillar order.
    pub fn latest_by_pillar(&self) -> RepoResult<Vec<PillarLatestReflection>> {
        let mut latest: HashMap<PillarId, Reflection> = HashMap::new();
        let reflections = self.reflections.list_reflections(&ReflectionListQuery {
            up_to: Some(self.clock.today()),
            ..ReflectionListQuery::default()
        })?;
        // Newest first, so the first hit per pillar wins.
        for reflection in reflections {
            latest.entry(reflection.pillar_id).or_insert(reflection);
        }

        Ok(self
            .pillars
            .list_pillars()?
            .into_iter()
            .map(|pillar| PillarLatestReflection {
                latest: latest.remove(&pillar.id),
                pillar,
            })
            .collect())
    }

    /// Flips the favorite flag; returns the updated reflection.
    pub fn toggle_favorite(&self, id: ReflectionId) -> Result<Reflection, ReflectionServiceError> {
        let current = self
            .reflections
            .get_reflection(id)?
            .ok_or(ReflectionServiceError::ReflectionNotFound(id))?;
        self.reflections
            .set_reflection_favorite(id, !current.is_favorite)?;
        info!(
            "event=reflection_favorite module=service status=ok is_favorite={}",
            !current.is_favorite
        );

        self.reflections
            .get_reflection(id)?
            .ok_or(ReflectionServiceError::InconsistentState(
                "toggled reflection not found in read-back",
            ))
    }
}

/// Groups feed items by day, newest day first; items keep feed order.
pub fn group_feed_by_day(
    items: &[ReflectionFeedItem],
) -> Vec<(NaiveDate, Vec<&ReflectionFeedItem>)> {
    group_by_day(items).into_iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::{group_feed_by_day, ReflectionFeedItem};
    use crate::model::reflection::Reflection;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn item(day: u32, text: &str) -> ReflectionFeedItem {
        let date = NaiveDate::from_ymd_opt(2024, 2, day).unwrap();
        ReflectionFeedItem {
            reflection: Reflection::new(Uuid::new_v4(), date, text, 0),
            pillar_name: "Saude".to_string(),
            pillar_icon: "🏃".to_string(),
        }
    }

    #[test]
    fn groups_newest_day_first_keeping_item_order() {
        let items = vec![item(5, "b"), item(5, "a"), item(3, "c")];
        let groups = group_feed_by_day(&items);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, NaiveDate::from_ymd_opt(2024, 2, 5).unwrap());
        let texts: Vec<&str> = groups[0]
            .1
            .iter()
            .map(|item| item.reflection.text.as_str())
            .collect();
        assert_eq!(texts, vec!["b", "a"]);
        assert_eq!(groups[1].1.len(), 1);
    }
}
