//! Error types for the `noisekit` support library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using `noisekit` Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for `noisekit` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A config file exists but could not be read
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config file is not valid JSON or holds an invalid value
    #[error("Failed to parse config file {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Tracing subscriber could not be installed
    #[error("Tracing initialisation failed: {0}")]
    Tracing(String),
}
