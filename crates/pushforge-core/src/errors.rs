use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("IO error reading {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("invalid template {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid template directory pattern: {0}")]
    Pattern(String),
}

impl From<glob::PatternError> for TemplateError {
    fn from(e: glob::PatternError) -> Self {
        TemplateError::Pattern(e.to_string())
    }
}
