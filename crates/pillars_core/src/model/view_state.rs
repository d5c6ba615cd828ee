//! Tagged load state shared by every view-facing result.
//!
//! Replaces per-view `loading` / `error` flags with one value that is always
//! in exactly one state.

use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum LoadState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    /// Human-readable failure message.
    Failed(String),
}

impl<T> LoadState<T> {
    /// Builds `Loaded` or `Failed` from a finished operation.
    pub fn from_result<E: Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Loaded(value),
            Err(err) => Self::Failed(err.to_string()),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_loaded(self) -> Option<T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadState<U> {
        match self {
            Self::Idle => LoadState::Idle,
            Self::Loading => LoadState::Loading,
            Self::Loaded(value) => LoadState::Loaded(f(value)),
            Self::Failed(message) => LoadState::Failed(message),
        }
    }

    /// Short lowercase label (`idle|loading|loaded|failed`).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Loaded(_) => "loaded",
            Self::Failed(_) => "failed",
        }
    }
}

impl<T> LoadState<Vec<T>> {
    /// Loaded with nothing to show; views render a placeholder, not an error.
    pub fn is_empty_loaded(&self) -> bool {
        matches!(self, Self::Loaded(items) if items.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::LoadState;

    #[test]
    fn from_result_maps_both_branches() {
        let ok: LoadState<u8> = LoadState::from_result(Ok::<_, String>(3));
        assert_eq!(ok.loaded(), Some(&3));

        let failed: LoadState<u8> = LoadState::from_result(Err("store offline"));
        assert_eq!(failed.error(), Some("store offline"));
        assert_eq!(failed.label(), "failed");
    }

    #[test]
    fn empty_loaded_is_not_an_error() {
        let state: LoadState<Vec<u8>> = LoadState::Loaded(Vec::new());
        assert!(state.is_empty_loaded());
        assert!(state.error().is_none());
        assert!(!LoadState::<Vec<u8>>::Loading.is_empty_loaded());
    }

    #[test]
    fn map_preserves_non_loaded_states() {
        let loading: LoadState<u8> = LoadState::Loading;
        assert!(loading.map(|v| v + 1).is_loading());
        assert_eq!(LoadState::Loaded(1).map(|v| v + 1), LoadState::Loaded(2));
    }
}
