//! Process configuration resolved from environment variables.
//!
//! # Responsibility
//! - Resolve database path, logging options, viewer UTC offset and the
//!   notes-to-reflections mirroring switch.
//!
//! # Invariants
//! - Blank variables are treated as unset.
//! - Invalid values are rejected with the offending variable name; they
//!   never silently fall back to defaults.

use crate::calendar::day::LocalClock;
use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "PILLARS_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "PILLARS_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "PILLARS_LOG_DIR";
pub const ENV_UTC_OFFSET_MINUTES: &str = "PILLARS_UTC_OFFSET_MINUTES";
pub const ENV_MIRROR_NOTES: &str = "PILLARS_MIRROR_NOTES";

const DEFAULT_DB_FILE_NAME: &str = "pillars.sqlite3";
const MAX_OFFSET_MINUTES: i32 = 18 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue {
                key,
                value,
                expected,
            } => write!(f, "invalid {key} value `{value}`; expected {expected}"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    /// Viewer offset east of UTC; host local offset when unset.
    pub utc_offset_minutes: Option<i32>,
    /// Append a reflection for every scored write with a non-empty note.
    pub mirror_notes_to_reflections: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level(),
            log_dir: None,
            utc_offset_minutes: None,
            mirror_notes_to_reflections: true,
        }
    }
}

impl AppConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, one call per variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }

        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = normalize_level(&level).map_err(|_| ConfigError::InvalidValue {
                key: ENV_LOG_LEVEL,
                value: level.clone(),
                expected: "trace|debug|info|warn|error",
            })?;
        }

        config.log_dir = read(ENV_LOG_DIR).map(PathBuf::from);

        if let Some(raw) = read(ENV_UTC_OFFSET_MINUTES) {
            let minutes = raw
                .parse::<i32>()
                .ok()
                .filter(|minutes| (-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(minutes))
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: ENV_UTC_OFFSET_MINUTES,
                    value: raw.clone(),
                    expected: "whole minutes between -1080 and 1080",
                })?;
            config.utc_offset_minutes = Some(minutes);
        }

        if let Some(raw) = read(ENV_MIRROR_NOTES) {
            config.mirror_notes_to_reflections = parse_bool(&raw).ok_or_else(|| {
                ConfigError::InvalidValue {
                    key: ENV_MIRROR_NOTES,
                    value: raw.clone(),
                    expected: "true|false|1|0",
                }
            })?;
        }

        Ok(config)
    }

    /// Clock for the configured viewer offset.
    pub fn clock(&self) -> LocalClock {
        self.utc_offset_minutes
            .and_then(LocalClock::with_offset_minutes)
            .unwrap_or_else(LocalClock::system)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
