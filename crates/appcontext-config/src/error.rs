use std::path::PathBuf;

use appcontext_core::WriteError;
use thiserror::Error;

use crate::format::{DecodeError, EncodeError, Format};

/// Boxed error returned by validation hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for configuration management.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The requested format name is not JSON, YAML, or TOML.
    #[error("unsupported serialization format: '{0}'")]
    UnsupportedFormat(String),

    /// The path's extension does not match the configured format.
    #[error("path {} does not match the {format} format", .path.display())]
    PathFormatMismatch { path: PathBuf, format: Format },

    /// The path cannot hold a configuration file.
    #[error("invalid config path {}: {reason}", .path.display())]
    InvalidPath { path: PathBuf, reason: &'static str },

    /// No default location could be derived for the application.
    #[error("cannot determine config location for app '{app_name}'")]
    UnresolvablePath { app_name: String },

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file content could not be parsed.
    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    /// The value could not be serialized.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] EncodeError),

    /// The validation hook rejected the value.
    #[error("config validation failed: {0}")]
    Validation(#[source] BoxError),

    /// The serialized value could not be written.
    #[error("failed to persist config: {0}")]
    Persist(#[from] WriteError),

    /// Every candidate path failed to load.
    #[error(
        "no config candidate could be loaded:\n{}",
        .failures.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
    )]
    NoCandidate { failures: Vec<ConfigError> },
}
