use std::path::Path;

use async_trait::async_trait;
use deadpool::managed::{Object, Pool, PoolConfig};
use libsql::{Row, Value, params};
use tracing::{debug, info, warn};

use super::migrations;
use super::models::StatusRecord;
use super::{DbError, StoreError};
use crate::pool::{LibsqlManager, LibsqlPool};

/// Connections kept open for the monitor task and concurrent API requests.
const MAX_CONNECTIONS: usize = 8;

/// Append-only, chronologically readable log of check results.
///
/// Shared between the monitor loop and the query API as
/// `Arc<dyn StatusStore>`; implementations must tolerate interleaved
/// appends and reads.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Persist one record, returning the id the store assigned to it
    async fn append(&self, record: &StatusRecord) -> Result<i64, StoreError>;

    /// Every record, oldest first. Rows that fail to decode are skipped.
    async fn list_all(&self) -> Result<Vec<StatusRecord>, StoreError>;
}

/// LibSQL implementation of [`StatusStore`]
pub struct LibsqlStatusStore {
    pool: LibsqlPool,
}

impl LibsqlStatusStore {
    /// Open (or create) the database file at `path` and make sure the schema
    /// exists. Calling this again on the same file keeps existing records.
    pub async fn initialize(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let unavailable = |reason: String| StoreError::StorageUnavailable {
            path: path.display().to_string(),
            reason,
        };

        let database = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let pool: LibsqlPool = Pool::builder(LibsqlManager::new(database))
            .config(PoolConfig::new(MAX_CONNECTIONS))
            .build()
            .map_err(|e| unavailable(e.to_string()))?;

        let conn = pool.get().await.map_err(|e| unavailable(e.to_string()))?;

        // WAL lets API reads proceed while the monitor is writing.
        conn.query("PRAGMA journal_mode = WAL", ())
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        migrations::run_migrations(&conn).await.map_err(|e| unavailable(e.to_string()))?;
        drop(conn);

        info!("Status store ready at {}", path.display());
        Ok(Self { pool })
    }

    async fn get_conn(&self) -> Result<Object<LibsqlManager>, DbError> {
        Ok(self.pool.get().await?)
    }

    /// Read an INTEGER column; any other storage class is a decode error.
    fn integer_column(row: &Row, idx: i32, name: &str) -> Result<i64, String> {
        match row.get_value(idx).map_err(|e| format!("{name}: {e}"))? {
            Value::Integer(n) => Ok(n),
            other => Err(format!("{name}: expected integer, found {other:?}")),
        }
    }

    fn decode_row(row: &Row) -> Result<StatusRecord, String> {
        let millis = Self::integer_column(row, 0, "timestamp")?;
        let online = Self::integer_column(row, 1, "online")?;
        let latency = Self::integer_column(row, 2, "latency")?;

        let timestamp = StatusRecord::i64_to_timestamp(millis)
            .ok_or_else(|| format!("timestamp out of range: {millis}"))?;
        let latency_ms =
            u64::try_from(latency).map_err(|_| format!("negative latency: {latency}"))?;

        Ok(StatusRecord::new(timestamp, online != 0, latency_ms))
    }
}

#[async_trait]
impl StatusStore for LibsqlStatusStore {
    async fn append(&self, record: &StatusRecord) -> Result<i64, StoreError> {
        let conn = self.get_conn().await.map_err(StoreError::Write)?;
        let latency = i64::try_from(record.latency_ms).unwrap_or(i64::MAX);

        conn.execute(
            "INSERT INTO status (timestamp, online, latency) VALUES (?, ?, ?)",
            params![
                StatusRecord::timestamp_to_i64(record.timestamp),
                i64::from(record.online),
                latency
            ],
        )
        .await
        .map_err(StoreError::write)?;

        let id = conn.last_insert_rowid();
        debug!("Saved status #{}", id);
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<StatusRecord>, StoreError> {
        let conn = self.get_conn().await.map_err(StoreError::Read)?;
        let mut rows = conn
            .query("SELECT timestamp, online, latency FROM status ORDER BY timestamp ASC, id ASC", ())
            .await
            .map_err(StoreError::read)?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await.map_err(StoreError::read)? {
            match Self::decode_row(&row) {
                Ok(record) => records.push(record),
                Err(reason) => warn!("Skipping undecodable status row: {}", reason),
            }
        }

        Ok(records)
    }
}
