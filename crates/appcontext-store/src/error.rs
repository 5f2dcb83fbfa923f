use std::path::PathBuf;

use appcontext_core::WriteError;
use thiserror::Error;

/// Error type for record store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record id must not be empty")]
    EmptyId,

    /// Insert was called with an id that is already present.
    #[error("record already exists: '{0}'")]
    AlreadyExists(String),

    /// Update, delete, or get named an id that is not present.
    #[error("record not found: '{0}'")]
    NotFound(String),

    /// A file system I/O error occurred.
    #[error("I/O error accessing store at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file is not a JSON object of records.
    #[error("failed to parse store {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize store: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The serialized records could not be written.
    #[error("failed to persist store: {0}")]
    Persist(#[from] WriteError),
}
