//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Map core results into flat envelopes (`ok`, `message`, payload).
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Validation failures carry the user-facing message verbatim; store
//!   failures are prefixed with the operation name.
//! - Every call opens its own migrated connection and resolves "today" once.

use pillars_core::config::ENV_LOG_DIR;
use pillars_core::repo::diary_repo::SqliteDiaryRepository;
use pillars_core::repo::entry_repo::SqliteEntryRepository;
use pillars_core::repo::pillar_repo::SqlitePillarRepository;
use pillars_core::repo::reflection_repo::SqliteReflectionRepository;
use pillars_core::{
    cleanup_future_rows, core_version as core_version_inner, format_day_key, group_feed_by_day,
    init_logging as init_logging_inner, init_logging_from_config,
    logging_status as logging_status_inner, open_db, ping as ping_inner, AppConfig, CalendarCell,
    DailyEntry, DiaryEntry, DiaryService, DiaryServiceError, LoadState, LocalClock, PillarOverview,
    PillarService, ReflectionFeedItem, ReflectionFeedQuery, ReflectionService,
    ReflectionServiceError, SaveDiaryRequest, Score, ScoreService, ScoreServiceError,
    ScoreUpsertPolicy, ScoreWriteRequest, Timeframe, YearMonth,
};
use rusqlite::Connection;
use uuid::Uuid;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Logging state as seen by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingStatusResponse {
    pub ok: bool,
    pub active: bool,
    pub level: Option<String>,
    pub log_dir: Option<String>,
    pub message: String,
}

/// Initializes logging from `PILLARS_LOG_LEVEL` and `PILLARS_LOG_DIR`.
///
/// # FFI contract
/// - An unset `PILLARS_LOG_DIR` leaves logging untouched and is not an error.
/// - Same idempotency and reconfiguration rules as `init_logging`.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging_from_env() -> LoggingStatusResponse {
    let result = AppConfig::from_env()
        .map_err(|err| err.to_string())
        .and_then(|config| init_logging_from_config(&config).map(|()| config.log_dir.is_some()));
    match result {
        Ok(true) => logging_status_response(true, "Logging initialized.".to_string()),
        Ok(false) => logging_status_response(
            true,
            format!("{ENV_LOG_DIR} is not set; logging left unchanged."),
        ),
        Err(message) => logging_status_response(false, message),
    }
}

/// Reports whether logging is active, with its level and directory.
#[flutter_rust_bridge::frb(sync)]
pub fn logging_status() -> LoggingStatusResponse {
    logging_status_response(true, String::new())
}

/// Generic action response envelope for write commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// ID of the created or touched record.
    pub id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: String) -> Self {
        Self {
            ok: true,
            id: Some(id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

/// One pillar card.
#[derive(Debug, Clone, PartialEq)]
pub struct PillarCardItem {
    pub pillar_id: String,
    pub name: String,
    pub icon: String,
    pub category: String,
    pub color: String,
    pub description: String,
    pub current_score: Option<u8>,
    /// `up|down|stable`.
    pub trend: String,
    /// `None` when the current month has no entries.
    pub monthly_average: Option<f64>,
    /// Display text for the average (`—` when empty).
    pub monthly_average_label: String,
    pub entry_count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PillarsOverviewResponse {
    pub ok: bool,
    /// `loaded|failed`.
    pub state: String,
    pub items: Vec<PillarCardItem>,
    pub message: String,
}

/// Seeds a pillar record.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; returns the created pillar ID on success.
#[flutter_rust_bridge::frb(sync)]
pub fn pillar_seed(name: String, icon: String, category: String) -> ActionResponse {
    let result = with_connection("pillar_seed", |conn, config| {
        let service = pillar_service(conn, config.clock())?;
        service
            .seed_pillar(&name, icon.trim(), category.trim())
            .map_err(|err| format!("pillar_seed failed: {err}"))
    });
    match result {
        Ok(pillar) => ActionResponse::success("Pillar created.", pillar.id.to_string()),
        Err(message) => ActionResponse::failure(message),
    }
}

/// Lists every pillar card with derived score, trend and monthly average.
#[flutter_rust_bridge::frb(sync)]
pub fn pillars_overview() -> PillarsOverviewResponse {
    let result = with_connection("pillars_overview", |conn, config| {
        pillar_service(conn, config.clock())?
            .overview()
            .map_err(|err| format!("pillars_overview failed: {err}"))
    });
    let state = LoadState::from_result(result)
        .map(|cards| cards.into_iter().map(to_pillar_card).collect::<Vec<_>>());
    let message = list_message(&state, "No pillars yet.", "pillar(s)");
    PillarsOverviewResponse {
        ok: state.error().is_none(),
        state: state.label().to_string(),
        message,
        items: state.into_loaded().unwrap_or_default(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PillarDetailResponse {
    pub ok: bool,
    pub card: Option<PillarCardItem>,
    /// Full history up to today, oldest first.
    pub history: Vec<ChartPoint>,
    pub message: String,
}

/// Card and score history for one pillar.
///
/// # FFI contract
/// - Unknown pillar IDs return `ok=false` with a not-found message.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn pillar_detail(pillar_id: String) -> PillarDetailResponse {
    let result = parse_id(&pillar_id, "pillar_id").and_then(|pillar_id| {
        with_connection("pillar_detail", |conn, config| {
            pillar_service(conn, config.clock())?
                .pillar_detail(pillar_id)
                .map_err(|err| format!("pillar_detail failed: {err}"))
        })
    });
    match result {
        Ok(overview) => PillarDetailResponse {
            ok: true,
            history: overview.entries.iter().map(to_chart_point).collect(),
            card: Some(to_pillar_card(overview)),
            message: String::new(),
        },
        Err(message) => PillarDetailResponse {
            ok: false,
            card: None,
            history: Vec::new(),
            message,
        },
    }
}

/// Score write response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecordResponse {
    pub ok: bool,
    pub entry_id: Option<String>,
    /// `insert|update` on success.
    pub action: Option<String>,
    /// Stored score as read back.
    pub score: Option<u8>,
    pub reflection_mirrored: bool,
    pub message: String,
}

impl ScoreRecordResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            entry_id: None,
            action: None,
            score: None,
            reflection_mirrored: false,
            message: message.into(),
        }
    }
}

/// Records a score for a pillar and day.
///
/// Input semantics:
/// - `score_text`: raw user text; must be a whole number in `0..=10`.
/// - `date`: `YYYY-MM-DD` or RFC 3339; local today when `None`.
/// - `notes`: optional free text.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Future dates and invalid scores are rejected before any write.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn score_record(
    pillar_id: String,
    score_text: String,
    date: Option<String>,
    notes: Option<String>,
) -> ScoreRecordResponse {
    let score = match Score::parse(&score_text) {
        Ok(score) => score,
        Err(err) => return ScoreRecordResponse::failure(err.to_string()),
    };
    let pillar_id = match parse_id(&pillar_id, "pillar_id") {
        Ok(id) => id,
        Err(message) => return ScoreRecordResponse::failure(message),
    };

    let result = with_connection("score_record", |conn, config| {
        let clock = config.clock();
        let date = parse_optional_day(&clock, date.as_deref())?;
        let repo = SqliteEntryRepository::try_new(conn)
            .map_err(|err| format!("score_record failed: {err}"))?;
        let policy = ScoreUpsertPolicy {
            mirror_notes_to_reflections: config.mirror_notes_to_reflections,
        };
        let request = ScoreWriteRequest {
            pillar_id,
            date,
            score,
            notes,
        };
        ScoreService::new(repo, clock, policy)
            .record_score(&request)
            .map_err(|err| match err {
                ScoreServiceError::FutureDate(rejection) => rejection.to_string(),
                other => format!("score_record failed: {other}"),
            })
    });

    match result {
        Ok(outcome) => ScoreRecordResponse {
            ok: true,
            entry_id: Some(outcome.entry.id.to_string()),
            action: Some(outcome.action.as_str().to_string()),
            score: Some(outcome.entry.score.value()),
            reflection_mirrored: outcome.reflection_mirrored,
            message: "Score saved.".to_string(),
        },
        Err(message) => ScoreRecordResponse::failure(message),
    }
}

/// One chart point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPoint {
    pub date: String,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSeriesResponse {
    pub ok: bool,
    pub points: Vec<ChartPoint>,
    pub message: String,
}

/// Most recent entries of a pillar for the chart.
///
/// `timeframe` is `week` (last 7 entries) or `month` (last 30 entries).
#[flutter_rust_bridge::frb(sync)]
pub fn chart_series(pillar_id: String, timeframe: String) -> ChartSeriesResponse {
    let result = parse_timeframe(&timeframe).and_then(|timeframe| {
        let pillar_id = parse_id(&pillar_id, "pillar_id")?;
        with_connection("chart_series", |conn, config| {
            pillar_service(conn, config.clock())?
                .chart_series(pillar_id, timeframe)
                .map_err(|err| format!("chart_series failed: {err}"))
        })
    });
    match result {
        Ok(entries) => ChartSeriesResponse {
            ok: true,
            points: entries.iter().map(to_chart_point).collect(),
            message: String::new(),
        },
        Err(message) => ChartSeriesResponse {
            ok: false,
            points: Vec::new(),
            message,
        },
    }
}

/// One calendar day cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDayItem {
    pub day: u32,
    pub date: String,
    pub score: Option<u8>,
    pub notes: Option<String>,
    /// `no_data|low|mid|high`.
    pub band: String,
    pub is_future: bool,
    pub is_today: bool,
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMonthResponse {
    pub ok: bool,
    pub year: i32,
    pub month: u32,
    /// Blank cells before day 1 in a Sunday-first grid.
    pub leading_blanks: u32,
    pub days: Vec<CalendarDayItem>,
    pub message: String,
}

/// Month heat-map for one pillar.
///
/// # FFI contract
/// - `month` is 1-based; out-of-range values return `ok=false`.
/// - `selected_date` is optional and only flags the matching cell.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_month(
    pillar_id: String,
    year: i32,
    month: u32,
    selected_date: Option<String>,
) -> CalendarMonthResponse {
    let failure = |message: String| CalendarMonthResponse {
        ok: false,
        year,
        month,
        leading_blanks: 0,
        days: Vec::new(),
        message,
    };
    let Some(year_month) = YearMonth::new(year, month) else {
        return failure(format!("invalid month: {year}-{month}"));
    };
    let pillar_id = match parse_id(&pillar_id, "pillar_id") {
        Ok(id) => id,
        Err(message) => return failure(message),
    };

    let result = with_connection("calendar_month", |conn, config| {
        let clock = config.clock();
        let selected = parse_optional_day(&clock, selected_date.as_deref())?;
        pillar_service(conn, clock)?
            .month_grid(pillar_id, Some(year_month), selected)
            .map_err(|err| format!("calendar_month failed: {err}"))
    });

    match result {
        Ok(grid) => CalendarMonthResponse {
            ok: true,
            year: grid.month.year(),
            month: grid.month.month(),
            leading_blanks: count_u32(grid.leading_blanks()),
            days: grid
                .cells
                .iter()
                .filter_map(CalendarCell::as_day)
                .map(|cell| CalendarDayItem {
                    day: cell.day,
                    date: format_day_key(cell.date),
                    score: cell.entry.as_ref().map(|entry| entry.score.value()),
                    notes: cell
                        .entry
                        .as_ref()
                        .filter(|entry| entry.has_notes())
                        .map(|entry| entry.notes.clone()),
                    band: band_label(cell.band).to_string(),
                    is_future: cell.is_future,
                    is_today: cell.is_today,
                    is_selected: cell.is_selected,
                })
                .collect(),
            message: String::new(),
        },
        Err(message) => failure(message),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDaysResponse {
    pub ok: bool,
    pub year: i32,
    pub month: u32,
    /// `YYYY-MM-DD` keys, ascending.
    pub dates: Vec<String>,
    pub message: String,
}

/// Days of a month on which any pillar has a score.
///
/// # FFI contract
/// - `month` is 1-based; out-of-range values return `ok=false`.
/// - Days after local today are never listed.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_days_with_entries(year: i32, month: u32) -> CalendarDaysResponse {
    let result = YearMonth::new(year, month)
        .ok_or_else(|| format!("invalid month: {year}-{month}"))
        .and_then(|year_month| {
            with_connection("calendar_days_with_entries", |conn, config| {
                pillar_service(conn, config.clock())?
                    .days_with_entries(year_month)
                    .map_err(|err| format!("calendar_days_with_entries failed: {err}"))
            })
        });
    match result {
        Ok(dates) => CalendarDaysResponse {
            ok: true,
            year,
            month,
            dates: dates.into_iter().map(format_day_key).collect(),
            message: String::new(),
        },
        Err(message) => CalendarDaysResponse {
            ok: false,
            year,
            month,
            dates: Vec::new(),
            message,
        },
    }
}

/// One pillar row of the day overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayPillarRow {
    pub pillar_id: String,
    pub name: String,
    pub icon: String,
    pub score: Option<u8>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayOverviewResponse {
    pub ok: bool,
    pub date: String,
    pub rows: Vec<DayPillarRow>,
    pub has_any_entry: bool,
    pub message: String,
}

/// Every pillar's score and note for one day.
#[flutter_rust_bridge::frb(sync)]
pub fn day_overview(date: String) -> DayOverviewResponse {
    let result = with_connection("day_overview", |conn, config| {
        let clock = config.clock();
        let day = clock
            .parse_day(&date)
            .map_err(|err| format!("invalid date: {err}"))?;
        pillar_service(conn, clock)?
            .day_overview(day)
            .map_err(|err| format!("day_overview failed: {err}"))
    });
    match result {
        Ok(overview) => DayOverviewResponse {
            ok: true,
            date: format_day_key(overview.date),
            has_any_entry: overview.has_any_entry,
            rows: overview
                .items
                .into_iter()
                .map(|item| DayPillarRow {
                    pillar_id: item.pillar.id.to_string(),
                    name: item.pillar.name,
                    icon: item.pillar.icon,
                    score: item.entry.as_ref().map(|entry| entry.score.value()),
                    notes: item
                        .entry
                        .filter(|entry| entry.has_notes())
                        .map(|entry| entry.notes),
                })
                .collect(),
            message: String::new(),
        },
        Err(message) => DayOverviewResponse {
            ok: false,
            date,
            rows: Vec::new(),
            has_any_entry: false,
            message,
        },
    }
}

/// Reflection feed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectionItem {
    pub reflection_id: String,
    pub pillar_id: String,
    pub pillar_name: String,
    pub pillar_icon: String,
    pub date: String,
    pub text: String,
    pub preview: String,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectionsFeedResponse {
    pub ok: bool,
    /// `loaded|failed`.
    pub state: String,
    /// Newest day first, then newest insert first.
    pub items: Vec<ReflectionItem>,
    pub message: String,
}

/// Appends a reflection for today.
#[flutter_rust_bridge::frb(sync)]
pub fn reflection_create(pillar_id: String, text: String) -> ActionResponse {
    let result = parse_id(&pillar_id, "pillar_id").and_then(|pillar_id| {
        with_connection("reflection_create", |conn, config| {
            reflection_service(conn, config.clock())?
                .add_reflection(pillar_id, &text)
                .map_err(|err| reflection_error_message("reflection_create", err))
        })
    });
    match result {
        Ok(reflection) => ActionResponse::success("Reflection saved.", reflection.id.to_string()),
        Err(message) => ActionResponse::failure(message),
    }
}

/// Flips a reflection's favorite flag.
#[flutter_rust_bridge::frb(sync)]
pub fn reflection_toggle_favorite(reflection_id: String) -> ActionResponse {
    let result = parse_id(&reflection_id, "reflection_id").and_then(|id| {
        with_connection("reflection_toggle_favorite", |conn, config| {
            reflection_service(conn, config.clock())?
                .toggle_favorite(id)
                .map_err(|err| reflection_error_message("reflection_toggle_favorite", err))
        })
    });
    match result {
        Ok(reflection) if reflection.is_favorite => {
            ActionResponse::success("Added to favorites.", reflection.id.to_string())
        }
        Ok(reflection) => {
            ActionResponse::success("Removed from favorites.", reflection.id.to_string())
        }
        Err(message) => ActionResponse::failure(message),
    }
}

/// Filtered reflection feed.
///
/// Input semantics:
/// - `pillar_id`, `date`: optional exact filters.
/// - `search`: case-insensitive substring over text and pillar name.
/// - `favorites_only`: keep favorited reflections only.
#[flutter_rust_bridge::frb(sync)]
pub fn reflections_feed(
    pillar_id: Option<String>,
    date: Option<String>,
    search: Option<String>,
    favorites_only: bool,
) -> ReflectionsFeedResponse {
    let result = load_feed("reflections_feed", pillar_id, date, search, favorites_only);
    let state = LoadState::from_result(result)
        .map(|items| items.into_iter().map(to_reflection_item).collect::<Vec<_>>());
    let message = list_message(&state, "No reflections found.", "reflection(s)");
    ReflectionsFeedResponse {
        ok: state.error().is_none(),
        state: state.label().to_string(),
        message,
        items: state.into_loaded().unwrap_or_default(),
    }
}

/// Reflections sharing one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectionDayGroup {
    pub date: String,
    pub items: Vec<ReflectionItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectionsByDayResponse {
    pub ok: bool,
    /// `loaded|failed`.
    pub state: String,
    /// Newest day first; items keep feed order.
    pub days: Vec<ReflectionDayGroup>,
    pub message: String,
}

/// Same filters as `reflections_feed`, grouped by day.
#[flutter_rust_bridge::frb(sync)]
pub fn reflections_feed_by_day(
    pillar_id: Option<String>,
    date: Option<String>,
    search: Option<String>,
    favorites_only: bool,
) -> ReflectionsByDayResponse {
    let result = load_feed("reflections_feed_by_day", pillar_id, date, search, favorites_only);
    let state = LoadState::from_result(result).map(|items| {
        group_feed_by_day(&items)
            .into_iter()
            .map(|(date, group)| ReflectionDayGroup {
                date: format_day_key(date),
                items: group.into_iter().cloned().map(to_reflection_item).collect(),
            })
            .collect::<Vec<_>>()
    });
    let message = list_message(&state, "No reflections found.", "day(s)");
    ReflectionsByDayResponse {
        ok: state.error().is_none(),
        state: state.label().to_string(),
        message,
        days: state.into_loaded().unwrap_or_default(),
    }
}

/// Latest reflection slot for one pillar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestReflectionItem {
    pub pillar_id: String,
    pub pillar_name: String,
    pub pillar_icon: String,
    /// `None` when the pillar has no reflection up to today.
    pub latest: Option<ReflectionItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestReflectionsResponse {
    pub ok: bool,
    /// One slot per pillar, in pillar order.
    pub items: Vec<LatestReflectionItem>,
    pub message: String,
}

/// Newest reflection of every pillar.
#[flutter_rust_bridge::frb(sync)]
pub fn reflections_latest_by_pillar() -> LatestReflectionsResponse {
    let result = with_connection("reflections_latest_by_pillar", |conn, config| {
        reflection_service(conn, config.clock())?
            .latest_by_pillar()
            .map_err(|err| format!("reflections_latest_by_pillar failed: {err}"))
    });
    match result {
        Ok(slots) => LatestReflectionsResponse {
            ok: true,
            items: slots
                .into_iter()
                .map(|slot| LatestReflectionItem {
                    pillar_id: slot.pillar.id.to_string(),
                    latest: slot.latest.map(|reflection| {
                        to_reflection_item(ReflectionFeedItem {
                            reflection,
                            pillar_name: slot.pillar.name.clone(),
                            pillar_icon: slot.pillar.icon.clone(),
                        })
                    }),
                    pillar_name: slot.pillar.name,
                    pillar_icon: slot.pillar.icon,
                })
                .collect(),
            message: String::new(),
        },
        Err(message) => LatestReflectionsResponse {
            ok: false,
            items: Vec::new(),
            message,
        },
    }
}

/// Diary page item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiaryItem {
    pub diary_id: String,
    pub pillar_id: String,
    pub date: String,
    pub reflection: String,
    pub action_plan: String,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiaryListResponse {
    pub ok: bool,
    pub items: Vec<DiaryItem>,
    pub message: String,
}

/// Saves today's diary page for a pillar, updating it when it exists.
#[flutter_rust_bridge::frb(sync)]
pub fn diary_save(pillar_id: String, reflection: String, action_plan: String) -> ActionResponse {
    let result = parse_id(&pillar_id, "pillar_id").and_then(|pillar_id| {
        with_connection("diary_save", |conn, config| {
            let request = SaveDiaryRequest {
                pillar_id,
                reflection,
                action_plan,
            };
            diary_service(conn, config.clock())?
                .save_today(&request)
                .map_err(|err| diary_error_message("diary_save", err))
        })
    });
    match result {
        Ok(entry) => ActionResponse::success("Diary saved.", entry.id.to_string()),
        Err(message) => ActionResponse::failure(message),
    }
}

/// Diary pages, newest first, optionally for one pillar.
#[flutter_rust_bridge::frb(sync)]
pub fn diary_list(pillar_id: Option<String>) -> DiaryListResponse {
    let result = with_connection("diary_list", |conn, config| {
        let pillar_id = pillar_id
            .as_deref()
            .map(|raw| parse_id(raw, "pillar_id"))
            .transpose()?;
        diary_service(conn, config.clock())?
            .list(pillar_id)
            .map_err(|err| format!("diary_list failed: {err}"))
    });
    match result {
        Ok(entries) => DiaryListResponse {
            ok: true,
            items: entries.into_iter().map(to_diary_item).collect(),
            message: String::new(),
        },
        Err(message) => DiaryListResponse {
            ok: false,
            items: Vec::new(),
            message,
        },
    }
}

/// Sets or clears a diary page's favorite flag.
#[flutter_rust_bridge::frb(sync)]
pub fn diary_set_favorite(diary_id: String, is_favorite: bool) -> ActionResponse {
    let result = parse_id(&diary_id, "diary_id").and_then(|id| {
        with_connection("diary_set_favorite", |conn, config| {
            diary_service(conn, config.clock())?
                .set_favorite(id, is_favorite)
                .map_err(|err| diary_error_message("diary_set_favorite", err))?;
            Ok(id)
        })
    });
    match result {
        Ok(id) => ActionResponse::success("Diary updated.", id.to_string()),
        Err(message) => ActionResponse::failure(message),
    }
}

/// Startup cleanup result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceResponse {
    pub ok: bool,
    pub removed_entries: u32,
    pub removed_reflections: u32,
    pub removed_diary: u32,
    pub message: String,
}

/// Deletes rows dated after local today.
///
/// # FFI contract
/// - Intended to run once at app startup, before the first read.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn maintenance_cleanup() -> MaintenanceResponse {
    let result = with_connection("maintenance_cleanup", |conn, config| {
        cleanup_future_rows(conn, &config.clock())
            .map_err(|err| format!("maintenance_cleanup failed: {err}"))
    });
    match result {
        Ok(report) => MaintenanceResponse {
            ok: true,
            removed_entries: count_u32(report.removed.entries),
            removed_reflections: count_u32(report.removed.reflections),
            removed_diary: count_u32(report.removed.diary),
            message: format!("Removed {} future row(s).", report.removed.total()),
        },
        Err(message) => MaintenanceResponse {
            ok: false,
            removed_entries: 0,
            removed_reflections: 0,
            removed_diary: 0,
            message,
        },
    }
}

fn with_connection<T>(
    operation: &str,
    f: impl FnOnce(&Connection, &AppConfig) -> Result<T, String>,
) -> Result<T, String> {
    let config = AppConfig::from_env().map_err(|err| {
        log::warn!("event=ffi_call module=ffi status=error operation={operation} reason=config");
        format!("{operation} failed: {err}")
    })?;
    let conn = open_db(&config.db_path).map_err(|err| format!("{operation} failed: {err}"))?;
    f(&conn, &config)
}

fn load_feed(
    operation: &str,
    pillar_id: Option<String>,
    date: Option<String>,
    search: Option<String>,
    favorites_only: bool,
) -> Result<Vec<ReflectionFeedItem>, String> {
    with_connection(operation, |conn, config| {
        let clock = config.clock();
        let query = ReflectionFeedQuery {
            pillar_id: pillar_id
                .as_deref()
                .map(|raw| parse_id(raw, "pillar_id"))
                .transpose()?,
            date: parse_optional_day(&clock, date.as_deref())?,
            search,
            favorites_only,
        };
        reflection_service(conn, clock)?
            .feed(&query)
            .map_err(|err| format!("{operation} failed: {err}"))
    })
}

fn logging_status_response(ok: bool, message: String) -> LoggingStatusResponse {
    let status = logging_status_inner();
    LoggingStatusResponse {
        ok,
        active: status.is_some(),
        level: status.as_ref().map(|(level, _)| (*level).to_string()),
        log_dir: status.map(|(_, dir)| dir.display().to_string()),
        message,
    }
}

type SqlitePillarService<'conn> =
    PillarService<SqlitePillarRepository<'conn>, SqliteEntryRepository<'conn>>;

fn pillar_service(conn: &Connection, clock: LocalClock) -> Result<SqlitePillarService<'_>, String> {
    let pillars = SqlitePillarRepository::try_new(conn).map_err(|err| err.to_string())?;
    let entries = SqliteEntryRepository::try_new(conn).map_err(|err| err.to_string())?;
    Ok(PillarService::new(pillars, entries, clock))
}

type SqliteReflectionService<'conn> =
    ReflectionService<SqliteReflectionRepository<'conn>, SqlitePillarRepository<'conn>>;

fn reflection_service(
    conn: &Connection,
    clock: LocalClock,
) -> Result<SqliteReflectionService<'_>, String> {
    let reflections = SqliteReflectionRepository::try_new(conn).map_err(|err| err.to_string())?;
    let pillars = SqlitePillarRepository::try_new(conn).map_err(|err| err.to_string())?;
    Ok(ReflectionService::new(reflections, pillars, clock))
}

fn diary_service(
    conn: &Connection,
    clock: LocalClock,
) -> Result<DiaryService<SqliteDiaryRepository<'_>>, String> {
    let repo = SqliteDiaryRepository::try_new(conn).map_err(|err| err.to_string())?;
    Ok(DiaryService::new(repo, clock))
}

fn reflection_error_message(operation: &str, err: ReflectionServiceError) -> String {
    match err {
        ReflectionServiceError::Repo(_) | ReflectionServiceError::InconsistentState(_) => {
            format!("{operation} failed: {err}")
        }
        other => other.to_string(),
    }
}

fn diary_error_message(operation: &str, err: DiaryServiceError) -> String {
    match err {
        DiaryServiceError::Repo(_) => format!("{operation} failed: {err}"),
        other => other.to_string(),
    }
}

fn list_message<T>(state: &LoadState<Vec<T>>, empty: &str, noun: &str) -> String {
    if let Some(error) = state.error() {
        return error.to_string();
    }
    if state.is_empty_loaded() {
        return empty.to_string();
    }
    let count = state.loaded().map_or(0, Vec::len);
    format!("Found {count} {noun}.")
}

fn parse_id(raw: &str, field: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid {field}: `{}`", raw.trim()))
}

fn parse_optional_day(
    clock: &LocalClock,
    raw: Option<&str>,
) -> Result<Option<chrono::NaiveDate>, String> {
    raw.map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| clock.parse_day(raw).map_err(|err| format!("invalid date: {err}")))
        .transpose()
}

fn parse_timeframe(raw: &str) -> Result<Timeframe, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "week" => Ok(Timeframe::Week),
        "month" => Ok(Timeframe::Month),
        other => Err(format!("invalid timeframe: `{other}` (expected week|month)")),
    }
}

fn to_pillar_card(card: PillarOverview) -> PillarCardItem {
    PillarCardItem {
        pillar_id: card.pillar.id.to_string(),
        color: card.color.to_string(),
        description: card.description.to_string(),
        current_score: card.current_score.map(Score::value),
        trend: card.trend.as_str().to_string(),
        monthly_average: card.monthly_average.value(),
        monthly_average_label: card.monthly_average.to_string(),
        entry_count: count_u32(card.entries.len()),
        name: card.pillar.name,
        icon: card.pillar.icon,
        category: card.pillar.category,
    }
}

fn to_chart_point(entry: &DailyEntry) -> ChartPoint {
    ChartPoint {
        date: format_day_key(entry.date),
        score: entry.score.value(),
    }
}

fn to_reflection_item(item: ReflectionFeedItem) -> ReflectionItem {
    ReflectionItem {
        reflection_id: item.reflection.id.to_string(),
        pillar_id: item.reflection.pillar_id.to_string(),
        date: format_day_key(item.reflection.date),
        preview: item.reflection.preview(),
        is_favorite: item.reflection.is_favorite,
        text: item.reflection.text,
        pillar_name: item.pillar_name,
        pillar_icon: item.pillar_icon,
    }
}

fn to_diary_item(entry: DiaryEntry) -> DiaryItem {
    DiaryItem {
        diary_id: entry.id.to_string(),
        pillar_id: entry.pillar_id.to_string(),
        date: format_day_key(entry.date),
        reflection: entry.reflection,
        action_plan: entry.action_plan,
        is_favorite: entry.is_favorite,
    }
}

fn band_label(band: pillars_core::ScoreBand) -> &'static str {
    match band {
        pillars_core::ScoreBand::NoData => "no_data",
        pillars_core::ScoreBand::Low => "low",
        pillars_core::ScoreBand::Mid => "mid",
        pillars_core::ScoreBand::High => "high",
    }
}

fn count_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}
