//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use quiz_core::SessionError;
use quiz_core::model::QuestionSetError;

/// Errors emitted while loading a question file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("question file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Questions(#[from] QuestionSetError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Errors emitted by `TimingSettings::new`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("flip delay must be <= 10s")]
    InvalidFlipDelay,
    #[error("countdown seconds must be between 1 and 600")]
    InvalidCountdownSeconds,
    #[error("countdown tick must be > 0")]
    InvalidCountdownTick,
    #[error("auto-close delay must be <= 60s")]
    InvalidAutoCloseDelay,
}
