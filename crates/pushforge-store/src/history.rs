//! Append-only send history with a size cap.

use parking_lot::Mutex;
use rusqlite::params;
use tracing::{debug, instrument};

use pushforge_core::{NewRecord, NotificationRecord};

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers::{format_time, parse_time};

/// Records kept after pruning.
pub const HISTORY_CAP: usize = 500;

/// Sink for completed send attempts. Records are never updated; they leave
/// only through [`prune`](HistoryStore::prune) or [`clear`](HistoryStore::clear).
pub trait HistoryStore: Send + Sync {
    fn append(&self, record: NewRecord) -> Result<NotificationRecord, StoreError>;

    /// Newest first.
    fn list(&self, limit: Option<usize>) -> Result<Vec<NotificationRecord>, StoreError>;

    fn count(&self) -> Result<usize, StoreError>;

    /// Deletes the oldest records (by `sent_at`, then id) beyond `cap`.
    /// Returns how many were deleted.
    fn prune(&self, cap: usize) -> Result<usize, StoreError>;

    /// Deletes everything. Returns how many were deleted.
    fn clear(&self) -> Result<usize, StoreError>;
}

const TABLE: &str = "notification_records";

pub struct SqliteHistoryStore {
    db: Database,
}

impl SqliteHistoryStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

struct RawRecord {
    id: i64,
    payload: String,
    bundle_identifier: String,
    device_label: String,
    device_identifier: String,
    success: bool,
    error_message: Option<String>,
    sent_at: String,
}

impl RawRecord {
    fn into_record(self) -> Result<NotificationRecord, StoreError> {
        Ok(NotificationRecord {
            id: self.id,
            payload: self.payload,
            bundle_identifier: self.bundle_identifier,
            device_label: self.device_label,
            device_identifier: self.device_identifier,
            success: self.success,
            error_message: self.error_message,
            sent_at: parse_time(&self.sent_at, TABLE, "sent_at")?,
        })
    }
}

impl HistoryStore for SqliteHistoryStore {
    #[instrument(skip(self, record), fields(device = %record.device_identifier, success = record.success))]
    fn append(&self, record: NewRecord) -> Result<NotificationRecord, StoreError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO notification_records
                 (payload, bundle_identifier, device_label, device_identifier, success, error_message, sent_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.payload,
                    record.bundle_identifier,
                    record.device_label,
                    record.device_identifier,
                    record.success,
                    record.error_message,
                    format_time(&record.sent_at),
                ],
            )?;
            Ok(NotificationRecord::from_new(conn.last_insert_rowid(), record))
        })
    }

    #[instrument(skip(self))]
    fn list(&self, limit: Option<usize>) -> Result<Vec<NotificationRecord>, StoreError> {
        let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, payload, bundle_identifier, device_label, device_identifier, success, error_message, sent_at
                 FROM notification_records ORDER BY sent_at DESC, id DESC LIMIT ?1",
            )?;
            let raw = stmt
                .query_map([limit], |row| {
                    Ok(RawRecord {
                        id: row.get(0)?,
                        payload: row.get(1)?,
                        bundle_identifier: row.get(2)?,
                        device_label: row.get(3)?,
                        device_identifier: row.get(4)?,
                        success: row.get(5)?,
                        error_message: row.get(6)?,
                        sent_at: row.get(7)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            raw.into_iter().map(RawRecord::into_record).collect()
        })
    }

    #[instrument(skip(self))]
    fn count(&self) -> Result<usize, StoreError> {
        self.db.with_conn(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM notification_records", [], |row| row.get(0))?;
            Ok(usize::try_from(n).unwrap_or(0))
        })
    }

    #[instrument(skip(self))]
    fn prune(&self, cap: usize) -> Result<usize, StoreError> {
        self.db.with_conn(|conn| {
            let total: i64 = conn.query_row("SELECT COUNT(*) FROM notification_records", [], |row| row.get(0))?;
            let excess = total - i64::try_from(cap).unwrap_or(i64::MAX);
            if excess <= 0 {
                return Ok(0);
            }
            let deleted = conn.execute(
                "DELETE FROM notification_records WHERE id IN (
                     SELECT id FROM notification_records ORDER BY sent_at ASC, id ASC LIMIT ?1
                 )",
                [excess],
            )?;
            debug!(deleted, cap, "pruned history");
            Ok(deleted)
        })
    }

    #[instrument(skip(self))]
    fn clear(&self) -> Result<usize, StoreError> {
        self.db
            .with_conn(|conn| Ok(conn.execute("DELETE FROM notification_records", [])?))
    }
}

/// Non-persistent store, for tests and `--no-history` runs.
#[derive(Default)]
pub struct MemoryHistoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    next_id: i64,
    records: Vec<NotificationRecord>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn append(&self, record: NewRecord) -> Result<NotificationRecord, StoreError> {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let stored = NotificationRecord::from_new(inner.next_id, record);
        inner.records.push(stored.clone());
        Ok(stored)
    }

    fn list(&self, limit: Option<usize>) -> Result<Vec<NotificationRecord>, StoreError> {
        let mut records = self.inner.lock().records.clone();
        records.sort_by(|a, b| b.sent_at.cmp(&a.sent_at).then(b.id.cmp(&a.id)));
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.inner.lock().records.len())
    }

    fn prune(&self, cap: usize) -> Result<usize, StoreError> {
        let mut inner = self.inner.lock();
        let excess = inner.records.len().saturating_sub(cap);
        if excess == 0 {
            return Ok(0);
        }
        inner.records.sort_by(|a, b| a.sent_at.cmp(&b.sent_at).then(a.id.cmp(&b.id)));
        inner.records.drain(..excess);
        Ok(excess)
    }

    fn clear(&self) -> Result<usize, StoreError> {
        let mut inner = self.inner.lock();
        let n = inner.records.len();
        inner.records.clear();
        Ok(n)
    }
}
