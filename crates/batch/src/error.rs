//! Error types for batch operations.
//!
//! Only failures that invalidate a whole operation surface here; per-item
//! failures inside a batch are collected as strings in the operation's
//! report instead.

use thiserror::Error;
use vikunja_client::ApiError;
use vikunja_config::ConfigError;

/// Errors that abort a batch operation outright.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The named template does not exist in the project's configuration.
    #[error("template '{name}' not found (available: {})", available.join(", "))]
    TemplateNotFound {
        /// Requested template name.
        name: String,
        /// Template names the project does define.
        available: Vec<String>,
    },

    /// The project has no configuration entry at all.
    #[error("no configuration for project {0}")]
    MissingProjectConfig(i64),

    /// The template anchor string is not a recognizable timestamp.
    #[error("invalid anchor date '{value}': {message}")]
    InvalidAnchor {
        /// The rejected anchor string.
        value: String,
        /// What was wrong with it.
        message: String,
    },

    /// A remote call failed in a way that invalidates the operation.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Reading or writing project configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result alias for batch operations.
pub type BatchResult<T> = Result<T, BatchError>;
