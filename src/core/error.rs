//! Error types and error handling for codebrief.
//!
//! Only [`BriefError`] aborts a run. Per-file and per-chunk failures
//! are captured inline in the result structure instead: see
//! [`FileReadError`], [`CapabilityError`] and [`SinkError`].

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Result type alias for codebrief operations
pub type Result<T> = std::result::Result<T, BriefError>;

/// Main error type for codebrief
#[derive(Error, Debug)]
pub enum BriefError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl BriefError {
    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Check if this is a "not found" type error
    pub fn is_not_found(&self) -> bool {
        matches!(self, BriefError::InvalidPath(_))
    }

    /// Check if this is a bad request error (invalid input)
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            BriefError::InvalidConfiguration(_) | BriefError::ConfigError(_)
        )
    }
}

/// Failure of the injected summarizer/embedder for one chunk.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CapabilityError {
    #[error("capability unavailable: {0}")]
    Unavailable(String),

    #[error("capability call failed: {0}")]
    Failed(String),

    #[error("malformed capability response: {0}")]
    MalformedResponse(String),
}

impl CapabilityError {
    pub fn failed(reason: impl Into<String>) -> Self {
        CapabilityError::Failed(reason.into())
    }
}

/// Failure to persist or forward a finished pipeline result.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to write {target}: {source}")]
    Write {
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Why a file could not be read. Recorded in the result for that
/// path; never aborts the walk.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FileReadError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("not valid UTF-8: {0}")]
    InvalidEncoding(String),

    #[error("file vanished during walk: {0}")]
    NotFound(String),

    #[error("read failed: {0}")]
    Io(String),
}

impl FileReadError {
    /// Classify an I/O error raised while reading a file
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => FileReadError::PermissionDenied(err.to_string()),
            io::ErrorKind::InvalidData => FileReadError::InvalidEncoding(err.to_string()),
            io::ErrorKind::NotFound => FileReadError::NotFound(err.to_string()),
            _ => FileReadError::Io(err.to_string()),
        }
    }
}
