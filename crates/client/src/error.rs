//! Error types for Vikunja API calls.

use thiserror::Error;

/// Errors that can occur when talking to the Vikunja API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service rejected the bearer token (HTTP 401).
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The addressed resource does not exist (HTTP 404).
    #[error("resource not found: {0}")]
    NotFound(String),

    /// Any other HTTP error status, with the response body for context.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Transport-level failure (connection refused, timeout, bad JSON).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The bearer token contains bytes that cannot form a header value.
    #[error("invalid access token")]
    InvalidToken(#[source] reqwest::header::InvalidHeaderValue),

    /// The project has no kanban view, so bucket operations are impossible.
    #[error("no kanban view found for project {0}")]
    NoKanbanView(i64),
}

/// Convenience result alias for client operations.
pub type ApiResult<T> = Result<T, ApiError>;
