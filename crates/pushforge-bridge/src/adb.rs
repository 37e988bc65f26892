//! Android emulator control through `adb`.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use pushforge_core::device::sort_apps;
use pushforge_core::{AndroidEmulator, AppInfo, EmulatorState};

use crate::apps::package_display_name;
use crate::errors::{InventoryError, ProcessError};
use crate::process::{args, ProcessOutput, ProcessRunner};

const TOOL: &str = "adb";
const EMULATOR_PREFIX: &str = "emulator-";

/// Parses `adb devices`, keeping emulator serials only.
pub fn parse_devices(stdout: &str) -> Vec<(String, EmulatorState)> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with(EMULATOR_PREFIX))
        .filter_map(|line| line.split_once('\t'))
        .map(|(serial, state)| (serial.to_string(), EmulatorState::from_raw(state)))
        .collect()
}

/// First non-empty line of `adb emu avd name`, which also prints a trailing `OK`.
pub fn parse_avd_name(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .filter(|line| *line != "OK")
        .map(str::to_string)
}

/// Escapes text for a single-quoted shell word: `'` becomes `'\''`.
pub fn shell_escape(text: &str) -> String {
    text.replace('\'', "'\\''")
}

/// The device-side command that posts a notification to the shade.
pub fn notification_command(title: &str, tag: &str, body: &str) -> String {
    format!(
        "cmd notification post -S bigtext -t '{}' '{}' '{}'",
        shell_escape(title),
        shell_escape(tag),
        shell_escape(body)
    )
}

/// Package ids from `cmd package query-activities --brief`, deduplicated in
/// first-seen order.
pub fn parse_launcher_packages(stdout: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    stdout
        .lines()
        .map(str::trim)
        .filter_map(|line| line.split_once('/').map(|(package, _)| package))
        .filter(|package| !package.is_empty() && package.contains('.') && !package.contains(char::is_whitespace))
        .filter(|package| seen.insert(package.to_string()))
        .map(str::to_string)
        .collect()
}

/// Thin async wrapper over `adb`.
#[derive(Clone)]
pub struct AdbBridge {
    runner: Arc<dyn ProcessRunner>,
    adb: PathBuf,
    timeout: Duration,
}

impl AdbBridge {
    pub fn new(runner: Arc<dyn ProcessRunner>, adb: PathBuf, timeout: Duration) -> Self {
        Self { runner, adb, timeout }
    }

    async fn adb(&self, argv: Vec<String>) -> Result<ProcessOutput, ProcessError> {
        self.runner
            .run(&self.adb.to_string_lossy(), &argv, self.timeout)
            .await
    }

    /// Lists emulators with their AVD names; a failed name query falls back
    /// to the serial.
    pub async fn list_emulators(&self) -> Result<Vec<AndroidEmulator>, InventoryError> {
        let output = self.adb(args(["devices"])).await?;
        if !output.succeeded() {
            return Err(InventoryError::CommandFailed {
                tool: TOOL.to_string(),
                message: output.failure_message(),
            });
        }

        let mut emulators = Vec::new();
        for (serial, state) in parse_devices(&output.stdout) {
            let name = self.avd_name(&serial).await.unwrap_or_else(|| serial.clone());
            emulators.push(AndroidEmulator { serial, name, state });
        }
        info!(count = emulators.len(), "listed emulators");
        Ok(emulators)
    }

    async fn avd_name(&self, serial: &str) -> Option<String> {
        match self.adb(args(["-s", serial, "emu", "avd", "name"])).await {
            Ok(output) if output.succeeded() => parse_avd_name(&output.stdout),
            Ok(output) => {
                debug!(serial, exit_code = output.exit_code, "avd name query failed");
                None
            }
            Err(e) => {
                debug!(serial, error = %e, "avd name query failed");
                None
            }
        }
    }

    pub async fn post_notification(
        &self,
        serial: &str,
        title: &str,
        body: &str,
        tag: &str,
    ) -> Result<ProcessOutput, ProcessError> {
        debug!(serial, tag, "posting notification");
        let command = notification_command(title, tag, body);
        self.adb(args(["-s", serial, "shell", command.as_str()])).await
    }

    /// Launcher-visible apps on `serial`, named from the well-known table.
    pub async fn list_apps(&self, serial: &str) -> Result<Vec<AppInfo>, InventoryError> {
        let output = self
            .adb(args([
                "-s",
                serial,
                "shell",
                "cmd package query-activities --brief -a android.intent.action.MAIN -c android.intent.category.LAUNCHER",
            ]))
            .await?;
        if !output.succeeded() {
            return Err(InventoryError::CommandFailed {
                tool: TOOL.to_string(),
                message: output.failure_message(),
            });
        }
        let mut apps: Vec<AppInfo> = parse_launcher_packages(&output.stdout)
            .into_iter()
            .map(|package| AppInfo::new(package_display_name(&package), package))
            .collect();
        sort_apps(&mut apps);
        Ok(apps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Scripted, ScriptedRunner};

    const DEVICES: &str = "List of devices attached\nemulator-5554\tdevice\nemulator-5556\toffline\nR58M123ABC\tdevice\n\n";

    #[test]
    fn devices_keep_emulators_only() {
        let parsed = parse_devices(DEVICES);
        assert_eq!(
            parsed,
            vec![
                ("emulator-5554".to_string(), EmulatorState::Online),
                ("emulator-5556".to_string(), EmulatorState::Offline),
            ]
        );
    }

    #[test]
    fn avd_name_first_line() {
        assert_eq!(parse_avd_name("Pixel_7_API_34\r\nOK\r\n"), Some("Pixel_7_API_34".into()));
        assert_eq!(parse_avd_name("OK\n"), None);
        assert_eq!(parse_avd_name("  \n"), None);
    }

    #[test]
    fn single_quotes_are_escaped() {
        assert_eq!(
            notification_command("It's", "pushforge-1", "Don't 'panic'"),
            r#"cmd notification post -S bigtext -t 'It'\''s' 'pushforge-1' 'Don'\''t '\''panic'\'''"#
        );
    }

    #[test]
    fn launcher_packages_dedupe() {
        let out = "com.android.settings/.Settings\ncom.google.android.gm/.ConversationListActivityGmail\ncom.android.settings/.SubSettings\n\nNo activities found\n";
        assert_eq!(
            parse_launcher_packages(out),
            vec!["com.android.settings".to_string(), "com.google.android.gm".to_string()]
        );
    }

    #[tokio::test]
    async fn emulator_names_fall_back_to_serial() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .on("-s emulator-5554 emu avd name", Scripted::ok("Pixel_7\nOK\n"))
                .on("-s emulator-5556 emu avd name", Scripted::fail(1, "KO"))
                .on("adb devices", Scripted::ok(DEVICES)),
        );
        let bridge = AdbBridge::new(runner, PathBuf::from("adb"), Duration::from_secs(1));
        let emulators = bridge.list_emulators().await.unwrap();
        assert_eq!(emulators.len(), 2);
        assert_eq!(emulators[0].name, "Pixel_7");
        assert!(emulators[0].is_online());
        assert_eq!(emulators[1].name, "emulator-5556");
    }

    #[tokio::test]
    async fn apps_are_named_and_sorted() {
        let runner = Arc::new(ScriptedRunner::new().on(
            "query-activities",
            Scripted::ok("com.example.zeta_tool/.Main\ncom.google.android.gm/.Gmail\n"),
        ));
        let bridge = AdbBridge::new(runner, PathBuf::from("adb"), Duration::from_secs(1));
        let apps = bridge.list_apps("emulator-5554").await.unwrap();
        assert_eq!(
            apps,
            vec![
                AppInfo::new("Gmail", "com.google.android.gm"),
                AppInfo::new("Zeta tool", "com.example.zeta_tool"),
            ]
        );
    }
}
