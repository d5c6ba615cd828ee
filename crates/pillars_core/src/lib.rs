//! Core domain logic for Life Pillars.
//! This crate is the single source of truth for scoring, date and history rules.

pub mod calendar;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use calendar::day::{
    format_day_key, is_in_month, parse_day_key, DayKeyError, LocalClock, YearMonth,
};
pub use calendar::grid::{build_month_grid, CalendarCell, DayCell, MonthGrid, ScoreBand};
pub use calendar::trend::{MonthlyAverage, Timeframe, Trend};
pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::diary::{DiaryEntry, DiaryId};
pub use model::entry::{DailyEntry, EntryId, Score, ScoreValidationError};
pub use model::pillar::{Pillar, PillarId};
pub use model::reflection::{Reflection, ReflectionId};
pub use model::view_state::LoadState;
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use repo::{RepoError, RepoResult};
pub use service::diary_service::{DiaryService, DiaryServiceError, SaveDiaryRequest};
pub use service::maintenance::{cleanup_future_rows, CleanupReport};
pub use service::pillar_service::{DayOverview, DayPillarItem, PillarOverview, PillarService};
pub use service::reflection_service::{
    group_feed_by_day, PillarLatestReflection, ReflectionFeedItem, ReflectionFeedQuery,
    ReflectionService, ReflectionServiceError,
};
pub use service::score_policy::{FutureDateRejection, ScoreUpsertPolicy};
pub use service::score_service::{
    ScoreService, ScoreServiceError, ScoreWriteOutcome, ScoreWriteRequest, WriteAction,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
