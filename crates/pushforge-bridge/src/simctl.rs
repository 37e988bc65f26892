//! iOS simulator control through `xcrun simctl`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info};

use pushforge_core::device::sort_apps;
use pushforge_core::{AppInfo, SimulatorDevice, SimulatorState};

use crate::errors::{InventoryError, ProcessError};
use crate::process::{args, ProcessOutput, ProcessRunner};

const RUNTIME_PREFIX: &str = "com.apple.CoreSimulator.SimRuntime.";
const TOOL: &str = "simctl";

#[derive(Deserialize)]
struct DeviceList {
    devices: HashMap<String, Vec<RawDevice>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDevice {
    udid: String,
    name: String,
    state: String,
    #[serde(default)]
    is_available: bool,
    /// Older Xcodes report `"(available)"` here instead of `isAvailable`.
    #[serde(default)]
    availability: Option<String>,
}

impl RawDevice {
    fn available(&self) -> bool {
        self.is_available || self.availability.as_deref() == Some("(available)")
    }
}

/// `com.apple.CoreSimulator.SimRuntime.iOS-17-2` -> `iOS 17.2`.
pub fn runtime_label(runtime_id: &str) -> String {
    static VERSION: OnceLock<Option<Regex>> = OnceLock::new();

    let dotted = runtime_id.trim_start_matches(RUNTIME_PREFIX).replace('-', ".");
    match VERSION.get_or_init(|| Regex::new(r"\.(\d+)\.(\d+)").ok()) {
        Some(re) => re.replace_all(&dotted, " $1.$2").into_owned(),
        None => dotted,
    }
}

/// Parses `simctl list devices --json`, keeping available devices only.
/// Booted devices sort first, then by name.
pub fn parse_device_list(json: &str) -> Result<Vec<SimulatorDevice>, InventoryError> {
    let list: DeviceList = serde_json::from_str(json).map_err(|e| InventoryError::Parse {
        tool: TOOL.to_string(),
        message: e.to_string(),
    })?;

    let mut devices: Vec<SimulatorDevice> = list
        .devices
        .into_iter()
        .flat_map(|(runtime_id, raw)| {
            let runtime = runtime_label(&runtime_id);
            raw.into_iter()
                .filter(RawDevice::available)
                .map(move |d| SimulatorDevice {
                    udid: d.udid,
                    name: d.name,
                    runtime: runtime.clone(),
                    state: SimulatorState::from_raw(&d.state),
                })
        })
        .collect();

    devices.sort_by(|a, b| {
        b.is_booted()
            .cmp(&a.is_booted())
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.runtime.cmp(&b.runtime))
    });
    Ok(devices)
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Parses the old-style plist printed by `simctl listapps <udid>`.
///
/// Only the top-level keys (bundle ids) and each entry's
/// `CFBundleDisplayName`/`CFBundleName` are read.
pub fn parse_listapps(text: &str) -> Vec<AppInfo> {
    let mut apps = Vec::new();
    let mut depth = 0usize;
    let mut current: Option<(String, Option<String>, Option<String>)> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if depth == 1 {
            if let Some((key, rest)) = trimmed.split_once('=') {
                if rest.trim_start().starts_with('{') {
                    current = Some((unquote(key).to_string(), None, None));
                }
            }
        } else if depth == 2 {
            if let (Some(entry), Some((key, value))) = (current.as_mut(), trimmed.split_once('=')) {
                let value = unquote(value.trim().trim_end_matches(';')).to_string();
                match key.trim() {
                    "CFBundleDisplayName" => entry.1 = Some(value),
                    "CFBundleName" => entry.2 = Some(value),
                    _ => {}
                }
            }
        }

        depth += trimmed.matches('{').count();
        depth = depth.saturating_sub(trimmed.matches('}').count());

        if depth == 1 {
            if let Some((id, display, name)) = current.take() {
                let label = display.or(name).unwrap_or_else(|| id.clone());
                apps.push(AppInfo::new(label, id));
            }
        }
    }

    sort_apps(&mut apps);
    apps
}

/// Thin async wrapper over `xcrun simctl`.
#[derive(Clone)]
pub struct SimctlBridge {
    runner: Arc<dyn ProcessRunner>,
    xcrun: String,
    timeout: Duration,
}

impl SimctlBridge {
    pub fn new(runner: Arc<dyn ProcessRunner>, xcrun: impl Into<String>, timeout: Duration) -> Self {
        Self {
            runner,
            xcrun: xcrun.into(),
            timeout,
        }
    }

    async fn simctl(&self, rest: Vec<String>) -> Result<ProcessOutput, ProcessError> {
        let mut argv = args(["simctl"]);
        argv.extend(rest);
        self.runner.run(&self.xcrun, &argv, self.timeout).await
    }

    pub async fn list_devices(&self) -> Result<Vec<SimulatorDevice>, InventoryError> {
        let output = self.simctl(args(["list", "devices", "--json"])).await?;
        if !output.succeeded() {
            return Err(InventoryError::CommandFailed {
                tool: TOOL.to_string(),
                message: output.failure_message(),
            });
        }
        let devices = parse_device_list(&output.stdout)?;
        info!(count = devices.len(), "listed simulators");
        Ok(devices)
    }

    pub async fn boot(&self, udid: &str) -> Result<ProcessOutput, ProcessError> {
        info!(udid, "booting simulator");
        self.simctl(args(["boot", udid])).await
    }

    pub async fn push(&self, udid: &str, bundle_id: &str, payload_file: &Path) -> Result<ProcessOutput, ProcessError> {
        debug!(udid, bundle_id, file = %payload_file.display(), "simctl push");
        self.simctl(vec![
            "push".to_string(),
            udid.to_string(),
            bundle_id.to_string(),
            payload_file.to_string_lossy().into_owned(),
        ])
        .await
    }

    pub async fn list_apps(&self, udid: &str) -> Result<Vec<AppInfo>, InventoryError> {
        let output = self.simctl(args(["listapps", udid])).await?;
        if !output.succeeded() {
            return Err(InventoryError::CommandFailed {
                tool: TOOL.to_string(),
                message: output.failure_message(),
            });
        }
        Ok(parse_listapps(&output.stdout))
    }
}
