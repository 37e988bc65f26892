use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use tracing::instrument;

use pushforge_core::SavedDevice;

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers::{format_time, parse_time, parse_time_opt};

const TABLE: &str = "saved_devices";
const COLUMNS: &str = "id, label, bundle_identifier, device_identifier, device_type, created_at, last_used_at";

struct RawDevice {
    id: i64,
    label: String,
    bundle_identifier: String,
    device_identifier: String,
    device_type: String,
    created_at: String,
    last_used_at: Option<String>,
}

impl RawDevice {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            label: row.get(1)?,
            bundle_identifier: row.get(2)?,
            device_identifier: row.get(3)?,
            device_type: row.get(4)?,
            created_at: row.get(5)?,
            last_used_at: row.get(6)?,
        })
    }

    fn into_device(self) -> Result<SavedDevice, StoreError> {
        Ok(SavedDevice {
            id: self.id,
            label: self.label,
            bundle_identifier: self.bundle_identifier,
            device_identifier: self.device_identifier,
            device_type: self.device_type,
            created_at: parse_time(&self.created_at, TABLE, "created_at")?,
            last_used_at: parse_time_opt(self.last_used_at.as_deref(), TABLE, "last_used_at")?,
        })
    }
}

/// Remembered (device, app) pairs for quick re-targeting.
pub struct SavedDeviceRepo {
    db: Database,
}

impl SavedDeviceRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub fn add(
        &self,
        label: &str,
        bundle_identifier: &str,
        device_identifier: &str,
        device_type: &str,
    ) -> Result<SavedDevice, StoreError> {
        let created_at = Utc::now();
        let id = self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO saved_devices (label, bundle_identifier, device_identifier, device_type, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![label, bundle_identifier, device_identifier, device_type, format_time(&created_at)],
            )?;
            Ok(conn.last_insert_rowid())
        })?;
        self.get(id)
    }

    #[instrument(skip(self))]
    pub fn get(&self, id: i64) -> Result<SavedDevice, StoreError> {
        let raw = self.db.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {COLUMNS} FROM saved_devices WHERE id = ?1"),
                    [id],
                    RawDevice::from_row,
                )
                .optional()?)
        })?;
        raw.ok_or_else(|| StoreError::NotFound(format!("saved device {id}")))?
            .into_device()
    }

    /// Most recently used first; never-used devices last, newest first.
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<SavedDevice>, StoreError> {
        let raw = self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM saved_devices
                 ORDER BY last_used_at IS NULL, last_used_at DESC, created_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map([], RawDevice::from_row)?.collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;
        raw.into_iter().map(RawDevice::into_device).collect()
    }

    /// Marks the device as just used.
    #[instrument(skip(self))]
    pub fn touch(&self, id: i64) -> Result<SavedDevice, StoreError> {
        let now = format_time(&Utc::now());
        let changed = self.db.with_conn(|conn| {
            Ok(conn.execute("UPDATE saved_devices SET last_used_at = ?1 WHERE id = ?2", params![now, id])?)
        })?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("saved device {id}")));
        }
        self.get(id)
    }

    #[instrument(skip(self))]
    pub fn remove(&self, id: i64) -> Result<bool, StoreError> {
        self.db.with_conn(|conn| Ok(conn.execute("DELETE FROM saved_devices WHERE id = ?1", [id])? > 0))
    }
}
