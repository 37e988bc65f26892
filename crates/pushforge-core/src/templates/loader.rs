use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::{PayloadTemplate, TemplateCategory, TemplatePlatform};
use crate::errors::TemplateError;

/// On-disk template file shape.
#[derive(Deserialize)]
struct TemplateFile {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
    payload: Value,
}

/// Loads every `*.json` under `dir`, in path order.
///
/// A missing directory yields no templates. Files that fail to parse are
/// logged and skipped so one bad file doesn't hide the rest.
pub fn load_dir(dir: &Path) -> Result<Vec<PayloadTemplate>, TemplateError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let pattern = dir.join("**").join("*.json");
    let mut paths: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "unreadable template path");
                None
            }
        })
        .collect();
    paths.sort();

    let mut templates = Vec::with_capacity(paths.len());
    for path in paths {
        match parse_template_file(&path) {
            Ok(template) => templates.push(template),
            Err(e) => warn!(error = %e, "skipping template"),
        }
    }
    Ok(templates)
}

/// Reads one template file. The platform comes from the parent directory
/// name, then the category string, and defaults to iOS.
pub fn parse_template_file(path: &Path) -> Result<PayloadTemplate, TemplateError> {
    let raw = std::fs::read_to_string(path).map_err(|e| TemplateError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let file: TemplateFile = serde_json::from_str(&raw).map_err(|e| TemplateError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let platform = path
        .parent()
        .and_then(Path::file_name)
        .and_then(|name| TemplatePlatform::from_name(&name.to_string_lossy()))
        .or_else(|| TemplatePlatform::from_name(&file.category))
        .unwrap_or_default();

    // serde_json's default map is ordered, so this also sorts keys.
    let payload = serde_json::to_string_pretty(&file.payload).map_err(|e| TemplateError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(PayloadTemplate {
        id: file.id,
        name: file.name,
        description: file.description,
        category: TemplateCategory::from_name(&file.category),
        platform,
        payload,
    })
}
