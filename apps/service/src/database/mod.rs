//! Durable status log
//!
//! Check results are appended to a single `status` table in a local LibSQL
//! (SQLite) file and read back oldest first.

pub mod migrations;
pub mod models;
pub mod repository;

pub use models::StatusRecord;
pub use repository::{LibsqlStatusStore, StatusStore};

use deadpool::managed::PoolError;
use thiserror::Error;

/// Failure reaching the database itself, below the store's semantics
#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Query(#[from] libsql::Error),

    #[error("connection pool: {0}")]
    Pool(#[from] PoolError<libsql::Error>),
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be opened or its schema created
    #[error("Storage unavailable at {path}: {reason}")]
    StorageUnavailable { path: String, reason: String },

    #[error("Failed to save status: {0}")]
    Write(#[source] DbError),

    #[error("Failed to read statuses: {0}")]
    Read(#[source] DbError),
}

impl StoreError {
    fn write(error: impl Into<DbError>) -> Self {
        Self::Write(error.into())
    }

    fn read(error: impl Into<DbError>) -> Self {
        Self::Read(error.into())
    }
}
