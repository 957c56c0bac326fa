//! Error types, one enum per boundary.
//!
//! - `ConfigError` is fatal at startup.
//! - `PersistError` and `StoreError` are recovered where they happen and turned into
//!   a localized message plus a log line.
//! - `ApiError` is what HTTP handlers return; it renders as `{ "error": ... }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing Supabase environment variable: {0}")]
    MissingEnv(&'static str),
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid theme table: {0}")]
    Theme(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersistError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("insert rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for PersistError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PersistError::Decode(err.to_string())
        } else {
            PersistError::Transport(err.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("language store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("language store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("language store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("unknown session: {0}")]
    UnknownSession(String),
    #[error("session {0} is already completed")]
    AlreadyCompleted(String),
    #[error("required questions are unanswered: {}", .0.join(", "))]
    MissingAnswers(Vec<String>),
    #[error("could not persist language preference: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownSession(_) => StatusCode::NOT_FOUND,
            ApiError::AlreadyCompleted(_) => StatusCode::CONFLICT,
            ApiError::MissingAnswers(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            ApiError::MissingAnswers(names) => json!({ "error": self.to_string(), "missing": names }),
            _ => json!({ "error": self.to_string() }),
        };
        (self.status(), Json(body)).into_response()
    }
}
