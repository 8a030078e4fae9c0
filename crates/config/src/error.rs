//! Error types for the configuration store.

use thiserror::Error;

/// Errors the configuration store can produce.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but is not a valid configuration document.
    #[error("malformed config file: {0}")]
    Parse(String),

    /// Reading the file failed for a reason other than it not existing.
    #[error("failed to read config file {path}")]
    Read {
        /// Path that was being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing the file (or its temp sibling) failed.
    #[error("failed to write config file {path}")]
    Write {
        /// Path that was being written.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Serializing the document to YAML failed.
    #[error("failed to serialize config")]
    Serialize(#[from] serde_yaml::Error),
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
