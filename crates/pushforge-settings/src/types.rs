//! Settings type definitions.
//!
//! Every section is `#[serde(default)]`, so a settings file may name only the
//! fields it changes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::loader::forge_dir;

/// Root settings for PushForge.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForgeSettings {
    pub process: ProcessSettings,
    pub history: HistorySettings,
    pub templates: TemplateSettings,
    pub desktop: DesktopSettings,
    pub logging: LoggingSettings,
}

/// External tool invocation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessSettings {
    /// Per-invocation timeout in seconds.
    pub timeout_secs: u64,
    pub xcrun_path: String,
    /// Explicit adb binary; otherwise looked up on `PATH` and the SDK dirs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adb_path: Option<PathBuf>,
    pub plutil_path: String,
    pub osascript_path: String,
    pub notify_send_path: String,
}

impl Default for ProcessSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            xcrun_path: "xcrun".to_string(),
            adb_path: None,
            plutil_path: "plutil".to_string(),
            osascript_path: "osascript".to_string(),
            notify_send_path: "notify-send".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistorySettings {
    pub db_path: PathBuf,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            db_path: forge_dir().join("history.db"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateSettings {
    /// Holds `<platform>/*.json` files that extend the built-ins.
    pub user_dir: PathBuf,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            user_dir: forge_dir().join("templates"),
        }
    }
}

/// Local desktop notification surface.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DesktopSettings {
    /// Directories scanned for installed `.app` bundles.
    pub app_dirs: Vec<PathBuf>,
    /// Sound name; empty plays no sound.
    pub sound: String,
}

impl Default for DesktopSettings {
    fn default() -> Self {
        let home = crate::loader::home_dir();
        Self {
            app_dirs: vec![
                PathBuf::from("/Applications"),
                PathBuf::from("/System/Applications"),
                home.join("Applications"),
            ],
            sound: "default".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = ForgeSettings::default();
        assert_eq!(settings.process.timeout_secs, 30);
        assert_eq!(settings.process.xcrun_path, "xcrun");
        assert!(settings.process.adb_path.is_none());
        assert!(settings.history.db_path.ends_with(".pushforge/history.db"));
        assert!(settings.templates.user_dir.ends_with(".pushforge/templates"));
        assert_eq!(settings.desktop.app_dirs.len(), 3);
        assert_eq!(settings.desktop.sound, "default");
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: ForgeSettings =
            serde_json::from_str(r#"{"process": {"timeoutSecs": 5}}"#).unwrap();
        assert_eq!(settings.process.timeout_secs, 5);
        assert_eq!(settings.process.osascript_path, "osascript");
        assert!(!settings.logging.json);
    }
}
