use serde::{Deserialize, Serialize};

/// Dispatcher send state.
///
/// `Idle -> Sending -> (Success | Failure)`. Only starting a new send leaves a
/// terminal state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum SendStatus {
    #[default]
    Idle,
    Sending,
    Success,
    Failure(String),
}

impl SendStatus {
    pub fn is_sending(&self) -> bool {
        matches!(self, Self::Sending)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failure(_))
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Failure(message) => Some(message),
            _ => None,
        }
    }
}

impl std::fmt::Display for SendStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Sending => write!(f, "sending"),
            Self::Success => write!(f, "sent"),
            Self::Failure(message) => write!(f, "failed: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!SendStatus::Idle.is_terminal());
        assert!(!SendStatus::Sending.is_terminal());
        assert!(SendStatus::Success.is_terminal());
        assert!(SendStatus::Failure("x".into()).is_terminal());
    }

    #[test]
    fn serde_shape() {
        let json = serde_json::to_value(SendStatus::Failure("boom".into())).unwrap();
        assert_eq!(json, serde_json::json!({"state": "failure", "message": "boom"}));
        let json = serde_json::to_value(SendStatus::Idle).unwrap();
        assert_eq!(json, serde_json::json!({"state": "idle"}));
    }
}
