//! Settings loading with deep merge and environment variable overrides.
//!
//! 1. Start with compiled [`ForgeSettings::default()`]
//! 2. If `~/.pushforge/settings.json` exists, deep-merge it over the defaults
//! 3. Apply `PUSHFORGE_*` environment overrides

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::ForgeSettings;

pub(crate) fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

/// `~/.pushforge`, the root for settings, history and user templates.
pub fn forge_dir() -> PathBuf {
    home_dir().join(".pushforge")
}

pub fn settings_path() -> PathBuf {
    forge_dir().join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<ForgeSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from `path` with env var overrides.
///
/// A missing file yields defaults; malformed JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<ForgeSettings> {
    let defaults = serde_json::to_value(ForgeSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: ForgeSettings = serde_json::from_value(merged)?;
    apply_overrides(&mut settings, |name| std::env::var(name).ok());
    expand_paths(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// Objects merge per key; arrays and primitives are replaced; nulls in
/// `source` are skipped.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = match target_map.remove(&key) {
                    Some(target_val) => deep_merge(target_val, source_val),
                    None => source_val,
                };
                target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Applies `PUSHFORGE_*` overrides read through `lookup`. Empty and invalid
/// values are ignored.
pub fn apply_overrides(settings: &mut ForgeSettings, lookup: impl Fn(&str) -> Option<String>) {
    let read = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(raw) = read("PUSHFORGE_TIMEOUT_SECS") {
        match parse_u64_range(&raw, 1, 3600) {
            Some(secs) => settings.process.timeout_secs = secs,
            None => tracing::warn!(key = "PUSHFORGE_TIMEOUT_SECS", value = %raw, "invalid timeout, ignoring"),
        }
    }
    if let Some(v) = read("PUSHFORGE_ADB") {
        settings.process.adb_path = Some(PathBuf::from(v));
    }
    if let Some(v) = read("PUSHFORGE_XCRUN") {
        settings.process.xcrun_path = v;
    }
    if let Some(v) = read("PUSHFORGE_HISTORY_DB") {
        settings.history.db_path = PathBuf::from(v);
    }
    if let Some(v) = read("PUSHFORGE_TEMPLATE_DIR") {
        settings.templates.user_dir = PathBuf::from(v);
    }
    if let Some(v) = read("PUSHFORGE_LOG") {
        settings.logging.level = v;
    }
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Resolves a leading `~/` against `$HOME`.
pub fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home_dir().join(rest),
        Err(_) => path.to_path_buf(),
    }
}

fn expand_paths(settings: &mut ForgeSettings) {
    settings.history.db_path = expand_tilde(&settings.history.db_path);
    settings.templates.user_dir = expand_tilde(&settings.templates.user_dir);
    if let Some(adb) = &settings.process.adb_path {
        settings.process.adb_path = Some(expand_tilde(adb));
    }
    for dir in &mut settings.desktop.app_dirs {
        *dir = expand_tilde(dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SettingsError;
    use std::collections::HashMap;

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({"process": {"timeoutSecs": 30, "xcrunPath": "xcrun"}});
        let source = serde_json::json!({"process": {"timeoutSecs": 5}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["process"]["timeoutSecs"], 5);
        assert_eq!(merged["process"]["xcrunPath"], "xcrun");
    }

    #[test]
    fn merge_skips_null_and_replaces_arrays() {
        let target = serde_json::json!({"a": 1, "dirs": ["x", "y"]});
        let source = serde_json::json!({"a": null, "dirs": ["z"]});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["dirs"], serde_json::json!(["z"]));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = load_settings_from_path(&tmp.path().join("nope.json")).unwrap();
        assert_eq!(settings.process.timeout_secs, ForgeSettings::default().process.timeout_secs);
    }

    #[test]
    fn file_values_are_merged() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.json");
        std::fs::write(&path, r#"{"desktop": {"sound": ""}, "logging": {"json": true}}"#).unwrap();
        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.desktop.sound, "");
        assert!(settings.logging.json);
        assert_eq!(settings.desktop.app_dirs.len(), 3);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_settings_from_path(&path), Err(SettingsError::Parse(_))));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("PUSHFORGE_TIMEOUT_SECS", "7"),
            ("PUSHFORGE_ADB", "/opt/sdk/adb"),
            ("PUSHFORGE_HISTORY_DB", "/tmp/h.db"),
            ("PUSHFORGE_LOG", "debug"),
            ("PUSHFORGE_XCRUN", ""),
        ]
        .into_iter()
        .collect();
        let mut settings = ForgeSettings::default();
        apply_overrides(&mut settings, |k| env.get(k).map(|v| v.to_string()));
        assert_eq!(settings.process.timeout_secs, 7);
        assert_eq!(settings.process.adb_path, Some(PathBuf::from("/opt/sdk/adb")));
        assert_eq!(settings.history.db_path, PathBuf::from("/tmp/h.db"));
        assert_eq!(settings.logging.level, "debug");
        assert_eq!(settings.process.xcrun_path, "xcrun");
    }

    #[test]
    fn invalid_timeout_is_ignored() {
        let mut settings = ForgeSettings::default();
        apply_overrides(&mut settings, |k| (k == "PUSHFORGE_TIMEOUT_SECS").then(|| "soon".to_string()));
        assert_eq!(settings.process.timeout_secs, 30);
    }

    #[test]
    fn tilde_expands_to_home() {
        let expanded = expand_tilde(Path::new("~/x/history.db"));
        assert_eq!(expanded, home_dir().join("x/history.db"));
        assert_eq!(expand_tilde(Path::new("/abs")), PathBuf::from("/abs"));
    }

    #[test]
    fn range_parsing() {
        assert_eq!(parse_u64_range("30", 1, 3600), Some(30));
        assert_eq!(parse_u64_range("0", 1, 3600), None);
        assert_eq!(parse_u64_range("-1", 1, 3600), None);
    }
}
