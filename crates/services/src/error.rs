//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{AccessError, QuestionError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors raised while fetching a single question source.
///
/// These never escape the loader: a failing source contributes no questions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("source request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("malformed source: {0}")]
    Json(#[from] serde_json::Error),
    #[error("source must contain a JSON array of questions")]
    NotAnArray,
    #[error(transparent)]
    Question(#[from] QuestionError),
}

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("chapter is not available: {0}")]
    UnknownChapter(String),
    #[error("only a correctly answered review question can be removed")]
    RemovalNotAllowed,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the access gate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AccessGateError {
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
