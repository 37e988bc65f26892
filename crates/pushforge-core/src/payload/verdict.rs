use serde::Serialize;

use super::MAX_PAYLOAD_BYTES;

/// The validator's structured judgement of a payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum ValidationVerdict {
    Valid,
    /// Advisory only; the payload can still be sent.
    ValidWithWarning { message: String, fix: Option<String> },
    InvalidJson { message: String, fix: Option<String> },
    MissingRequiredKey,
    PayloadTooLarge { byte_size: usize },
}

impl ValidationVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid | Self::ValidWithWarning { .. })
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Self::ValidWithWarning { .. })
    }

    pub fn message(&self) -> String {
        match self {
            Self::Valid => "Valid payload".to_string(),
            Self::ValidWithWarning { message, .. } => message.clone(),
            Self::InvalidJson { message, .. } => format!("Invalid JSON: {message}"),
            Self::MissingRequiredKey => "Payload must contain an \"aps\" key".to_string(),
            Self::PayloadTooLarge { byte_size } => {
                format!("Payload is {byte_size} bytes (max {MAX_PAYLOAD_BYTES})")
            }
        }
    }

    /// One-line suggestion, when there is one.
    pub fn fix(&self) -> Option<&str> {
        match self {
            Self::ValidWithWarning { fix, .. } | Self::InvalidJson { fix, .. } => fix.as_deref(),
            Self::MissingRequiredKey => Some("Wrap the notification content in an \"aps\" dictionary"),
            Self::PayloadTooLarge { .. } => Some("Remove custom keys or shorten text to fit in 4 KB"),
            Self::Valid => None,
        }
    }
}
