use thiserror::Error;

/// The process could not be started. A non-zero exit is not an error.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("{program} not found")]
    NotFound { program: String },

    #[error("failed to launch {program}: {message}")]
    Spawn { program: String, message: String },
}

/// Listing devices or apps failed.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The tool itself is not installed, as opposed to failing.
    #[error("{0} is not installed")]
    ToolNotFound(String),

    #[error("{tool} failed: {message}")]
    CommandFailed { tool: String, message: String },

    #[error("unexpected {tool} output: {message}")]
    Parse { tool: String, message: String },

    #[error(transparent)]
    Process(ProcessError),
}

impl From<ProcessError> for InventoryError {
    fn from(e: ProcessError) -> Self {
        match e {
            ProcessError::NotFound { program } => InventoryError::ToolNotFound(program),
            other => InventoryError::Process(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("failed to show notification: {0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_becomes_tool_not_found() {
        let err: InventoryError = ProcessError::NotFound {
            program: "adb".into(),
        }
        .into();
        assert!(matches!(err, InventoryError::ToolNotFound(ref p) if p == "adb"));
        assert_eq!(err.to_string(), "adb is not installed");
    }

    #[test]
    fn spawn_failure_stays_a_process_error() {
        let err: InventoryError = ProcessError::Spawn {
            program: "xcrun".into(),
            message: "permission denied".into(),
        }
        .into();
        assert!(matches!(err, InventoryError::Process(_)));
        assert!(err.to_string().contains("permission denied"));
    }
}
