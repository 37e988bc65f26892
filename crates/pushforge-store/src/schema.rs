/// SQL DDL for the history database.
pub const SCHEMA_VERSION: u32 = 1;

pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS notification_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    payload TEXT NOT NULL,
    bundle_identifier TEXT NOT NULL,
    device_label TEXT NOT NULL,
    device_identifier TEXT NOT NULL,
    success INTEGER NOT NULL,
    error_message TEXT,
    sent_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS saved_devices (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    label TEXT NOT NULL,
    bundle_identifier TEXT NOT NULL,
    device_identifier TEXT NOT NULL,
    device_type TEXT NOT NULL,
    created_at TEXT NOT NULL,
    last_used_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_records_sent_at ON notification_records(sent_at, id);
CREATE INDEX IF NOT EXISTS idx_saved_last_used ON saved_devices(last_used_at);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);
"#;

pub const PRAGMAS: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA busy_timeout = 5000;
PRAGMA synchronous = NORMAL;
"#;
