//! Bridges to the external tools PushForge drives: `xcrun simctl`, `adb`,
//! `plutil` and the host's notification surface.

pub mod adb;
pub mod apps;
pub mod desktop;
pub mod errors;
pub mod locator;
pub mod mock;
pub mod notify;
pub mod process;
pub mod simctl;

pub use adb::AdbBridge;
pub use errors::{InventoryError, NotifyError, ProcessError};
pub use notify::{system_notifier, LocalNotification, LocalNotifier};
pub use process::{ProcessOutput, ProcessRunner, TokioProcessRunner, DEFAULT_TIMEOUT};
pub use simctl::SimctlBridge;
