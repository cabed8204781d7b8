//! FK-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, FkError>;

/// Top-level error type for FileKeeper.
#[derive(Debug, Error)]
pub enum FkError {
    #[error("[FK-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[FK-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[FK-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[FK-1101] environment failure: {details}")]
    Environment { details: String },

    #[error("[FK-2001] invalid retention period '{value}': {details}")]
    InvalidRetention { value: String, details: String },

    #[error("[FK-2002] invalid file pattern '{pattern}': {details}")]
    InvalidPattern { pattern: String, details: String },

    #[error("[FK-2003] cannot open sweep root {path}: {source}")]
    RootUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[FK-2004] sweep root is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("[FK-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[FK-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[FK-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl FkError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "FK-1001",
            Self::MissingConfig { .. } => "FK-1002",
            Self::ConfigParse { .. } => "FK-1003",
            Self::Environment { .. } => "FK-1101",
            Self::InvalidRetention { .. } => "FK-2001",
            Self::InvalidPattern { .. } => "FK-2002",
            Self::RootUnavailable { .. } => "FK-2003",
            Self::NotADirectory { .. } => "FK-2004",
            Self::Serialization { .. } => "FK-2101",
            Self::Io { .. } => "FK-3002",
            Self::Runtime { .. } => "FK-3900",
        }
    }

    /// Whether this error aborts a whole directory sweep rather than a single entry.
    #[must_use]
    pub const fn is_sweep_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidRetention { .. } | Self::RootUnavailable { .. } | Self::NotADirectory { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for FkError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for FkError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::ConfigParse {
            context: "yaml",
            details: value.to_string(),
        }
    }
}
