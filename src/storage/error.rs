//! Persistence error types.
//!
//! A persistence failure is fatal to the operation that hit it and is always
//! returned to the caller.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The store could not be read or written.
    #[error("failed to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store exists but does not hold a JSON array of results.
    #[error("malformed result log {path}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Results could not be serialized.
    #[error("failed to encode results")]
    Encode(#[from] serde_json::Error),

    /// Database operation failed.
    #[error("database error")]
    Database(#[from] libsql::Error),
}
