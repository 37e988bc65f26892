use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::StoreError;

/// Fixed-width RFC 3339 so text ordering matches time ordering.
pub fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a timestamp column, returning CorruptRow on failure.
pub fn parse_time(raw: &str, table: &'static str, column: &'static str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::CorruptRow {
            table,
            column,
            detail: format!("invalid timestamp {raw:?}: {e}"),
        })
}

pub fn parse_time_opt(
    raw: Option<&str>,
    table: &'static str,
    column: &'static str,
) -> Result<Option<DateTime<Utc>>, StoreError> {
    raw.map(|r| parse_time(r, table, column)).transpose()
}
