//! Error types for record storage, the frontmatter codec, and setup.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while encoding, decoding, or framing a frontmatter document.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Document does not start with a '---' delimiter line")]
    MissingOpeningDelimiter,

    #[error("Document has no closing '---' delimiter line")]
    MissingClosingDelimiter,

    #[error("Frontmatter is not a mapping (found {0})")]
    NotAMapping(&'static str),

    #[error("Frontmatter key is not a string: {0}")]
    NonStringKey(String),

    #[error("Unsupported frontmatter value: {0}")]
    UnsupportedValue(String),

    #[error("Failed to encode frontmatter: {0}")]
    Encode(String),

    #[error("Failed to decode frontmatter: {0}")]
    Decode(String),

    #[error("Document is not valid UTF-8")]
    InvalidUtf8,
}

/// Error returned by a storage operation.
///
/// Every variant tied to a record carries the key it was issued for, so batch
/// callers can correlate failures.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Invalid record '{key}': {reason}")]
    Validation { key: String, reason: String },

    #[error("Failed to serialize frontmatter for '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: CodecError,
    },

    #[error("Failed to parse record '{key}': {source}")]
    Parse {
        key: String,
        #[source]
        source: CodecError,
    },

    #[error("Record not found: {key}")]
    NotFound {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("Record already exists: {key}")]
    AlreadyExists { key: String },

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        key: Option<String>,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RecordError {
    pub(crate) fn validation(key: &str, reason: impl Into<String>) -> Self {
        RecordError::Validation {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(key: Option<&str>, path: impl Into<PathBuf>, source: io::Error) -> Self {
        RecordError::Io {
            key: key.map(str::to_string),
            path: path.into(),
            source,
        }
    }

    /// Key of the record the failed operation targeted, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            RecordError::Validation { key, .. }
            | RecordError::Serialization { key, .. }
            | RecordError::Parse { key, .. }
            | RecordError::NotFound { key, .. }
            | RecordError::AlreadyExists { key } => Some(key.as_str()),
            RecordError::Io { key, .. } => key.as_deref(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RecordError::NotFound { .. })
    }
}

/// Errors raised while loading configuration or installing the log subscriber.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging error: {0}")]
    Logging(String),
}

impl From<config::ConfigError> for SetupError {
    fn from(err: config::ConfigError) -> Self {
        SetupError::Config(err.to_string())
    }
}
