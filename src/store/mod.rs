//! Persisted store module
//!
//! Owns the SQLite rates table: schema lifecycle (create / guarded
//! destructive reset) and atomic batch inserts. Write-only from the
//! pipeline's perspective; the flush loop is the sole writer, so the
//! store needs no internal locking, only per-batch transactions.

mod rates;
mod schema;

pub use rates::RateStore;
pub use schema::ensure_schema;

use std::path::PathBuf;
use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// User declined a destructive reset. A normal early exit, not a fault.
    #[error("database reset aborted by user")]
    ConfirmationAborted,

    /// Creating the rates table failed. Fatal at startup.
    #[error("failed to initialize schema at {path}")]
    Schema {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The store file could not be opened. Fatal at startup.
    #[error("failed to open store at {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Filesystem fault while preparing or resetting the store file.
    #[error("filesystem error at {path}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A batch insert failed (lock contention, disk error). The batch is
    /// not partially applied; the caller decides whether to drop it.
    #[error("batch insert failed")]
    Insert(#[source] rusqlite::Error),

    /// A support query failed.
    #[error("query failed")]
    Query(#[source] rusqlite::Error),
}
