use std::path::PathBuf;
use std::time::Duration;

use pushforge_bridge::locator::find_adb;
use pushforge_bridge::DEFAULT_TIMEOUT;
use pushforge_settings::ForgeSettings;

/// Tool paths and delivery options for a [`Dispatcher`](crate::Dispatcher).
#[derive(Clone, Debug)]
pub struct DispatcherConfig {
    pub xcrun: String,
    pub adb: PathBuf,
    pub plutil: String,
    /// Scanned for desktop app bundles.
    pub app_dirs: Vec<PathBuf>,
    /// Desktop notification sound; `None` is silent.
    pub sound: Option<String>,
    /// Where iOS payload files are written before `simctl push`.
    pub temp_dir: PathBuf,
    /// Per external call, not per send.
    pub timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            xcrun: "xcrun".to_string(),
            adb: PathBuf::from("adb"),
            plutil: "plutil".to_string(),
            app_dirs: Vec::new(),
            sound: Some("default".to_string()),
            temp_dir: std::env::temp_dir(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl DispatcherConfig {
    pub fn from_settings(settings: &ForgeSettings) -> Self {
        let process = &settings.process;
        // An unresolved adb keeps the bare name so the first call reports it missing.
        let adb = find_adb(process.adb_path.as_deref()).unwrap_or_else(|| PathBuf::from("adb"));
        Self {
            xcrun: process.xcrun_path.clone(),
            adb,
            plutil: process.plutil_path.clone(),
            app_dirs: settings.desktop.app_dirs.clone(),
            sound: Some(settings.desktop.sound.clone()).filter(|s| !s.is_empty()),
            temp_dir: std::env::temp_dir(),
            timeout: Duration::from_secs(process.timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_carry_over() {
        let mut settings = ForgeSettings::default();
        settings.process.timeout_secs = 7;
        settings.process.xcrun_path = "/opt/xcrun".into();
        settings.desktop.sound = String::new();

        let config = DispatcherConfig::from_settings(&settings);
        assert_eq!(config.timeout, Duration::from_secs(7));
        assert_eq!(config.xcrun, "/opt/xcrun");
        assert_eq!(config.sound, None);
        assert_eq!(config.app_dirs.len(), 3);
    }

    #[test]
    fn missing_adb_override_falls_back_to_bare_name() {
        let mut settings = ForgeSettings::default();
        settings.process.adb_path = Some(PathBuf::from("/nonexistent/adb"));
        assert_eq!(DispatcherConfig::from_settings(&settings).adb, PathBuf::from("adb"));
    }
}
