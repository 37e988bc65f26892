use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulatorState {
    Booted,
    Shutdown,
    Other,
}

impl SimulatorState {
    /// Maps the device manager's `state` field.
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "Booted" => Self::Booted,
            "Shutdown" => Self::Shutdown,
            _ => Self::Other,
        }
    }
}

/// An iOS simulator as reported by the device manager.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimulatorDevice {
    pub udid: String,
    pub name: String,
    /// Human runtime label, e.g. "iOS 17.2".
    pub runtime: String,
    pub state: SimulatorState,
}

impl SimulatorDevice {
    pub fn is_booted(&self) -> bool {
        self.state == SimulatorState::Booted
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmulatorState {
    Online,
    Offline,
}

impl EmulatorState {
    /// `device` is the bridge's word for a ready emulator; anything else is offline.
    pub fn from_raw(raw: &str) -> Self {
        if raw.trim() == "device" {
            Self::Online
        } else {
            Self::Offline
        }
    }
}

/// An Android emulator reported by the device bridge.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AndroidEmulator {
    pub serial: String,
    /// AVD name, or the serial when the name query failed.
    pub name: String,
    pub state: EmulatorState,
}

impl AndroidEmulator {
    pub fn is_online(&self) -> bool {
        self.state == EmulatorState::Online
    }
}

/// A launchable application on some target.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppInfo {
    pub name: String,
    pub bundle_id: String,
}

impl AppInfo {
    pub fn new(name: impl Into<String>, bundle_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bundle_id: bundle_id.into(),
        }
    }
}

/// Sorts apps case-insensitively by display name.
pub fn sort_apps(apps: &mut [AppInfo]) {
    apps.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.bundle_id.cmp(&b.bundle_id))
    });
}
