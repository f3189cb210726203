//! Error types for airfoilscout.
//!
//! This module defines all error types used throughout the airfoilscout crate.
//! Errors fall into two groups: failures local to a single catalog candidate,
//! which the scoring pipeline logs and skips, and failures that end the run.

use thiserror::Error;

/// The main error type for airfoilscout operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Candidate Errors ===
    /// A remote resource could not be retrieved.
    #[error("failed to fetch {url}: {message}")]
    Transport {
        /// The URL that was requested.
        url: String,
        /// Description of what went wrong.
        message: String,
    },

    /// Fetched data could not be parsed.
    #[error("failed to parse {source_name}: {message}")]
    Parse {
        /// Where the data came from (URL or file path).
        source_name: String,
        /// Description of what went wrong.
        message: String,
    },

    /// Numeric input is degenerate (zero denominators, too few points).
    #[error("degenerate input: {message}")]
    Data {
        /// Description of the degenerate value.
        message: String,
    },

    // === Run Errors ===
    /// No candidate survived the pipeline.
    #[error("no airfoil candidate could be scored")]
    EmptyResult,

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system or terminal operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for airfoilscout operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new transport error.
    #[must_use]
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a new parse error.
    #[must_use]
    pub fn parse(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create a new data error.
    #[must_use]
    pub fn data(message: impl Into<String>) -> Self {
        Self::Data {
            message: message.into(),
        }
    }

    /// Create a new configuration validation error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error only concerns a single candidate.
    ///
    /// Such errors are skipped by the scoring pipeline instead of aborting
    /// the run.
    #[must_use]
    pub fn is_candidate_local(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Parse { .. } | Self::Data { .. }
        )
    }

    /// Check if this error indicates that no candidate survived.
    #[must_use]
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::EmptyResult)
    }
}
