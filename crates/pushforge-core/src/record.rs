use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A completed send attempt, as handed to the history store.
///
/// Built exactly once per send and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    pub payload: String,
    pub bundle_identifier: String,
    pub device_label: String,
    pub device_identifier: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub sent_at: DateTime<Utc>,
}

impl NewRecord {
    pub fn success(
        payload: impl Into<String>,
        bundle_identifier: impl Into<String>,
        device_label: impl Into<String>,
        device_identifier: impl Into<String>,
    ) -> Self {
        Self {
            payload: payload.into(),
            bundle_identifier: bundle_identifier.into(),
            device_label: device_label.into(),
            device_identifier: device_identifier.into(),
            success: true,
            error_message: None,
            sent_at: Utc::now(),
        }
    }

    pub fn failure(
        payload: impl Into<String>,
        bundle_identifier: impl Into<String>,
        device_label: impl Into<String>,
        device_identifier: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            error_message: Some(error_message.into()),
            ..Self::success(payload, bundle_identifier, device_label, device_identifier)
        }
    }
}

/// A persisted history entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: i64,
    pub payload: String,
    pub bundle_identifier: String,
    pub device_label: String,
    pub device_identifier: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub sent_at: DateTime<Utc>,
}

impl NotificationRecord {
    pub fn from_new(id: i64, record: NewRecord) -> Self {
        Self {
            id,
            payload: record.payload,
            bundle_identifier: record.bundle_identifier,
            device_label: record.device_label,
            device_identifier: record.device_identifier,
            success: record.success,
            error_message: record.error_message,
            sent_at: record.sent_at,
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.success {
            "success"
        } else {
            "failure"
        }
    }
}

/// A remembered (device, bundle id) pair for quick re-targeting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedDevice {
    pub id: i64,
    pub label: String,
    pub bundle_identifier: String,
    pub device_identifier: String,
    /// "simulator" or "realDevice".
    pub device_type: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_record_carries_message() {
        let record = NewRecord::failure("{}", "com.example", "iPhone 15", "UDID-1", "Invalid device state");
        assert!(!record.success);
        assert_eq!(record.error_message.as_deref(), Some("Invalid device state"));
        assert_eq!(record.device_label, "iPhone 15");
    }

    #[test]
    fn success_record_has_no_message() {
        let record = NewRecord::success("{}", "com.example", "Desktop", "local");
        assert!(record.success);
        assert!(record.error_message.is_none());
        let stored = NotificationRecord::from_new(7, record);
        assert_eq!(stored.id, 7);
        assert_eq!(stored.status_label(), "success");
    }
}
