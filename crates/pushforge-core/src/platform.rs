use serde::{Deserialize, Serialize};

/// The delivery target selected by the user. Exactly one is active at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPlatform {
    #[default]
    IosSimulator,
    AndroidEmulator,
    Desktop,
}

impl TargetPlatform {
    pub const ALL: [TargetPlatform; 3] = [
        TargetPlatform::IosSimulator,
        TargetPlatform::AndroidEmulator,
        TargetPlatform::Desktop,
    ];

    /// Human label used in messages and the CLI.
    pub fn label(&self) -> &'static str {
        match self {
            Self::IosSimulator => "iOS Simulator",
            Self::AndroidEmulator => "Android Emulator",
            Self::Desktop => "Desktop",
        }
    }

    /// Name of the application identifier on this platform.
    pub fn app_id_label(&self) -> &'static str {
        match self {
            Self::IosSimulator => "bundle id",
            Self::AndroidEmulator => "package",
            Self::Desktop => "app id",
        }
    }
}

impl std::fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IosSimulator => write!(f, "ios"),
            Self::AndroidEmulator => write!(f, "android"),
            Self::Desktop => write!(f, "desktop"),
        }
    }
}

impl std::str::FromStr for TargetPlatform {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ios" | "ios_simulator" | "simulator" => Ok(Self::IosSimulator),
            "android" | "android_emulator" | "emulator" => Ok(Self::AndroidEmulator),
            "desktop" | "web" => Ok(Self::Desktop),
            other => Err(format!("unknown target platform: {other}")),
        }
    }
}
