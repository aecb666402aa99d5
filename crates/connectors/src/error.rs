use crate::file::csv::error::FileError;
use std::time::Duration;
use thiserror::Error;

/// Why a search call to the remote source did not produce a payload.
#[derive(Debug, Error)]
pub enum SearchFailure {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("server answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unreadable response body: {0}")]
    Body(String),
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// The data source failed; the same call may be retried.
    #[error("Search failed: {0}")]
    SearchFailed(#[from] SearchFailure),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid search parameters: {0}")]
    InvalidParams(String),

    #[error("File error: {0}")]
    File(#[from] FileError),
}

impl ApiError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::SearchFailed(_))
    }
}
