use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use pushforge_core::TargetPlatform;

/// Compose, check and send test push payloads to local simulators,
/// emulators and the desktop.
#[derive(Debug, Parser)]
#[command(name = "pushforge", version)]
pub struct Cli {
    /// Log level (overrides settings; RUST_LOG overrides both).
    #[arg(long, global = true)]
    pub log: Option<String>,

    /// Log as JSON lines on stderr.
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Settings file instead of ~/.pushforge/settings.json.
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Payload source: a file, or stdin when absent or `-`.
#[derive(Debug, Args)]
pub struct PayloadArg {
    pub file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check a payload against a target platform.
    Validate {
        #[command(flatten)]
        payload: PayloadArg,
        #[arg(short, long, default_value = "ios")]
        target: TargetPlatform,
        /// Print the verdict as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Replace curly quotes and dashes with their ASCII forms.
    Fix {
        #[command(flatten)]
        payload: PayloadArg,
    },

    /// Pretty-print (sorted keys) or minify a payload.
    Format {
        #[command(flatten)]
        payload: PayloadArg,
        #[arg(long)]
        minify: bool,
    },

    /// Show the title, subtitle and body a payload would display.
    Extract {
        #[command(flatten)]
        payload: PayloadArg,
    },

    /// List simulators and emulators.
    Devices {
        /// Only this platform.
        #[arg(short, long)]
        target: Option<TargetPlatform>,
    },

    /// Boot an iOS simulator.
    Boot { udid: String },

    /// List apps on a target.
    Apps {
        #[arg(short, long, default_value = "ios")]
        target: TargetPlatform,
        /// Simulator udid or emulator serial; defaults to the first ready device.
        #[arg(short, long)]
        device: Option<String>,
    },

    /// List payload templates, or print one.
    Templates {
        /// ios, android or web.
        #[arg(short, long)]
        platform: Option<String>,
        /// Print this template's payload.
        #[arg(long)]
        show: Option<String>,
    },

    /// Send a payload and record the result.
    Send(SendArgs),

    /// Show or clear send history.
    History {
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        clear: bool,
        #[arg(long)]
        json: bool,
    },

    /// Manage saved (device, app) pairs.
    Saved {
        #[command(subcommand)]
        action: SavedAction,
    },
}

#[derive(Debug, Args)]
pub struct SendArgs {
    #[command(flatten)]
    pub payload: PayloadArg,

    #[arg(short, long, default_value = "ios")]
    pub target: TargetPlatform,

    /// Bundle id, package or desktop app id.
    #[arg(short, long, default_value = "")]
    pub app: String,

    /// Simulator udid or emulator serial.
    #[arg(short, long)]
    pub device: Option<String>,

    /// Send a template's payload instead of FILE.
    #[arg(long, conflicts_with = "file")]
    pub template: Option<String>,

    /// Send to a saved device (iOS simulator) and its app.
    #[arg(long, conflicts_with_all = ["device", "app"])]
    pub saved: Option<i64>,

    /// Send even when validation fails.
    #[arg(long)]
    pub force: bool,

    /// Do not write to the history database.
    #[arg(long)]
    pub no_history: bool,
}

#[derive(Debug, Subcommand)]
pub enum SavedAction {
    List,
    Add {
        label: String,
        /// Simulator udid.
        device: String,
        bundle_id: String,
        #[arg(long, default_value = "simulator")]
        device_type: String,
    },
    Remove {
        id: i64,
    },
}
