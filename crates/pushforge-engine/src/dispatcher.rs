//! Send state machine.
//!
//! `Idle -> Sending -> (Success | Failure)`. A send is only accepted when no
//! other send is in flight and the current target is ready: a booted
//! simulator or an online emulator is selected, or the target is the
//! desktop. Every completed send appends exactly one history record and
//! then prunes history to [`HISTORY_CAP`].

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use pushforge_bridge::apps::{well_known, DEFAULT_IOS_BUNDLE_ID};
use pushforge_bridge::desktop::discover_desktop_apps;
use pushforge_bridge::{AdbBridge, InventoryError, LocalNotifier, ProcessRunner, SimctlBridge};
use pushforge_core::{AndroidEmulator, AppInfo, NewRecord, SendStatus, SimulatorDevice, TargetPlatform};
use pushforge_store::{HistoryStore, HISTORY_CAP};

use crate::config::DispatcherConfig;
use crate::delivery::{self, Outcome};
use crate::error::DispatchError;
use crate::selection::reselect;

/// Failure message for a send that ended without reaching a terminal state.
pub const SEND_INCOMPLETE: &str = "send did not complete";

const DESKTOP_LABEL: &str = "Desktop";
const DESKTOP_ID: &str = "local";

/// Whether a platform's tooling is installed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToolAvailability {
    /// Not checked yet.
    #[default]
    Unknown,
    Available,
    Missing,
}

/// Resolved destination of one send.
enum Route {
    Simulator { udid: String, name: String },
    Emulator { serial: String, name: String },
    Desktop,
}

impl Route {
    fn label(&self) -> &str {
        match self {
            Self::Simulator { name, .. } | Self::Emulator { name, .. } => name,
            Self::Desktop => DESKTOP_LABEL,
        }
    }

    fn identifier(&self) -> &str {
        match self {
            Self::Simulator { udid, .. } => udid,
            Self::Emulator { serial, .. } => serial,
            Self::Desktop => DESKTOP_ID,
        }
    }
}

/// Holds the status at `Sending` for the duration of one send. Dropped
/// without [`finish`](InFlight::finish) (the send future was cancelled), it
/// leaves a failure instead of a stuck `Sending`.
struct InFlight<'a> {
    status: &'a mut SendStatus,
}

impl<'a> InFlight<'a> {
    fn begin(status: &'a mut SendStatus) -> Self {
        *status = SendStatus::Sending;
        Self { status }
    }

    fn finish(self, outcome: &Outcome) -> SendStatus {
        *self.status = match outcome {
            Ok(()) => SendStatus::Success,
            Err(message) => SendStatus::Failure(message.clone()),
        };
        self.status.clone()
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.status.is_sending() {
            *self.status = SendStatus::Failure(SEND_INCOMPLETE.to_string());
        }
    }
}

pub struct Dispatcher {
    runner: Arc<dyn ProcessRunner>,
    simctl: SimctlBridge,
    adb: AdbBridge,
    notifier: Arc<dyn LocalNotifier>,
    history: Arc<dyn HistoryStore>,
    config: DispatcherConfig,

    target: TargetPlatform,
    status: SendStatus,
    simulators: Vec<SimulatorDevice>,
    emulators: Vec<AndroidEmulator>,
    selected_simulator: Option<String>,
    selected_emulator: Option<String>,
    ios_tools: ToolAvailability,
    android_tools: ToolAvailability,
}

impl Dispatcher {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        notifier: Arc<dyn LocalNotifier>,
        history: Arc<dyn HistoryStore>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            simctl: SimctlBridge::new(runner.clone(), config.xcrun.clone(), config.timeout),
            adb: AdbBridge::new(runner.clone(), config.adb.clone(), config.timeout),
            runner,
            notifier,
            history,
            config,
            target: TargetPlatform::default(),
            status: SendStatus::Idle,
            simulators: Vec::new(),
            emulators: Vec::new(),
            selected_simulator: None,
            selected_emulator: None,
            ios_tools: ToolAvailability::Unknown,
            android_tools: ToolAvailability::Unknown,
        }
    }

    pub fn with_target(mut self, target: TargetPlatform) -> Self {
        self.target = target;
        self
    }

    // ── State ───────────────────────────────────────────────────────────

    pub fn target(&self) -> TargetPlatform {
        self.target
    }

    pub fn set_target(&mut self, target: TargetPlatform) {
        self.target = target;
    }

    pub fn status(&self) -> &SendStatus {
        &self.status
    }

    pub fn simulators(&self) -> &[SimulatorDevice] {
        &self.simulators
    }

    pub fn booted_simulators(&self) -> impl Iterator<Item = &SimulatorDevice> {
        self.simulators.iter().filter(|d| d.is_booted())
    }

    /// Listed but not booted.
    pub fn available_simulators(&self) -> impl Iterator<Item = &SimulatorDevice> {
        self.simulators.iter().filter(|d| !d.is_booted())
    }

    pub fn emulators(&self) -> &[AndroidEmulator] {
        &self.emulators
    }

    pub fn online_emulators(&self) -> impl Iterator<Item = &AndroidEmulator> {
        self.emulators.iter().filter(|e| e.is_online())
    }

    pub fn selected_simulator(&self) -> Option<&SimulatorDevice> {
        let udid = self.selected_simulator.as_deref()?;
        self.simulators.iter().find(|d| d.udid == udid)
    }

    pub fn selected_emulator(&self) -> Option<&AndroidEmulator> {
        let serial = self.selected_emulator.as_deref()?;
        self.emulators.iter().find(|e| e.serial == serial)
    }

    pub fn select_simulator(&mut self, udid: &str) -> Result<(), DispatchError> {
        if !self.simulators.iter().any(|d| d.udid == udid) {
            return Err(DispatchError::UnknownDevice(udid.to_string()));
        }
        self.selected_simulator = Some(udid.to_string());
        Ok(())
    }

    pub fn select_emulator(&mut self, serial: &str) -> Result<(), DispatchError> {
        if !self.emulators.iter().any(|e| e.serial == serial) {
            return Err(DispatchError::UnknownDevice(serial.to_string()));
        }
        self.selected_emulator = Some(serial.to_string());
        Ok(())
    }

    pub fn tool_availability(&self, platform: TargetPlatform) -> ToolAvailability {
        match platform {
            TargetPlatform::IosSimulator => self.ios_tools,
            TargetPlatform::AndroidEmulator => self.android_tools,
            TargetPlatform::Desktop => ToolAvailability::Available,
        }
    }

    /// Whether the current target has a device to send to.
    pub fn is_ready(&self) -> bool {
        self.route().is_ok()
    }

    pub fn can_send(&self) -> bool {
        !self.status.is_sending() && self.is_ready()
    }

    // ── Discovery ───────────────────────────────────────────────────────

    /// Replaces the simulator list. On failure the list and selection are
    /// cleared; the error is returned for display only.
    #[instrument(skip(self))]
    pub async fn refresh_simulators(&mut self) -> Result<usize, InventoryError> {
        match self.simctl.list_devices().await {
            Ok(devices) => {
                self.ios_tools = ToolAvailability::Available;
                self.selected_simulator = reselect(self.selected_simulator.as_deref(), &devices);
                self.simulators = devices;
                Ok(self.simulators.len())
            }
            Err(e) => {
                warn!(error = %e, "simulator refresh failed");
                self.ios_tools = availability_after(&e);
                self.simulators.clear();
                self.selected_simulator = None;
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn refresh_emulators(&mut self) -> Result<usize, InventoryError> {
        match self.adb.list_emulators().await {
            Ok(emulators) => {
                self.android_tools = ToolAvailability::Available;
                self.selected_emulator = reselect(self.selected_emulator.as_deref(), &emulators);
                self.emulators = emulators;
                Ok(self.emulators.len())
            }
            Err(e) => {
                warn!(error = %e, "emulator refresh failed");
                self.android_tools = availability_after(&e);
                self.emulators.clear();
                self.selected_emulator = None;
                Err(e)
            }
        }
    }

    /// Refreshes the device list of the current target.
    pub async fn refresh(&mut self) -> Result<usize, InventoryError> {
        match self.target {
            TargetPlatform::IosSimulator => self.refresh_simulators().await,
            TargetPlatform::AndroidEmulator => self.refresh_emulators().await,
            TargetPlatform::Desktop => Ok(1),
        }
    }

    /// Boots a simulator, then refreshes and selects it. A failed boot is
    /// reported through the status as well as the error.
    #[instrument(skip(self))]
    pub async fn boot_simulator(&mut self, udid: &str) -> Result<(), DispatchError> {
        let message = match self.simctl.boot(udid).await {
            Ok(output) if output.succeeded() => None,
            Ok(output) => Some(output.failure_message()),
            Err(e) => Some(e.to_string()),
        };
        if let Some(message) = message {
            warn!(udid, error = %message, "boot failed");
            self.status = SendStatus::Failure(message.clone());
            return Err(DispatchError::BootFailed(message));
        }

        self.selected_simulator = Some(udid.to_string());
        // Logged inside; the boot itself succeeded.
        self.refresh_simulators().await.ok();
        Ok(())
    }

    /// Apps on the current target. Falls back to the well-known table when
    /// discovery fails or finds nothing.
    pub async fn discover_apps(&self) -> Vec<AppInfo> {
        let discovered = match self.target {
            TargetPlatform::IosSimulator => match self.selected_simulator() {
                Some(device) if device.is_booted() => self.simctl.list_apps(&device.udid).await,
                _ => Ok(Vec::new()),
            },
            TargetPlatform::AndroidEmulator => match self.selected_emulator() {
                Some(emulator) if emulator.is_online() => self.adb.list_apps(&emulator.serial).await,
                _ => Ok(Vec::new()),
            },
            TargetPlatform::Desktop => {
                discover_desktop_apps(
                    self.runner.clone(),
                    &self.config.plutil,
                    &self.config.app_dirs,
                    self.config.timeout,
                )
                .await
            }
        };

        match discovered {
            Ok(apps) if !apps.is_empty() => apps,
            Ok(_) => well_known(self.target),
            Err(e) => {
                warn!(platform = %self.target, error = %e, "app discovery failed, using well-known apps");
                well_known(self.target)
            }
        }
    }

    // ── Sending ─────────────────────────────────────────────────────────

    fn route(&self) -> Result<Route, DispatchError> {
        match self.target {
            TargetPlatform::IosSimulator => {
                let device = self
                    .selected_simulator()
                    .ok_or_else(|| DispatchError::NotReady("no simulator selected".into()))?;
                if !device.is_booted() {
                    return Err(DispatchError::NotReady(format!("{} is not booted", device.name)));
                }
                Ok(Route::Simulator {
                    udid: device.udid.clone(),
                    name: device.name.clone(),
                })
            }
            TargetPlatform::AndroidEmulator => {
                let emulator = self
                    .selected_emulator()
                    .ok_or_else(|| DispatchError::NotReady("no emulator selected".into()))?;
                if !emulator.is_online() {
                    return Err(DispatchError::NotReady(format!("{} is offline", emulator.name)));
                }
                Ok(Route::Emulator {
                    serial: emulator.serial.clone(),
                    name: emulator.name.clone(),
                })
            }
            TargetPlatform::Desktop => Ok(Route::Desktop),
        }
    }

    /// Sends `payload` to the current target and records the attempt.
    ///
    /// Refused sends (another send in flight, target not ready) return an
    /// error and record nothing. Every accepted send ends in `Success` or
    /// `Failure` and leaves exactly one history record.
    #[instrument(skip(self, payload), fields(platform = %self.target))]
    pub async fn send_push(&mut self, payload: &str, app_id: &str) -> Result<SendStatus, DispatchError> {
        if self.status.is_sending() {
            return Err(DispatchError::AlreadySending);
        }
        let route = self.route()?;
        let app_id = match (&route, app_id.trim()) {
            (Route::Simulator { .. }, "") => DEFAULT_IOS_BUNDLE_ID.to_string(),
            (_, id) => id.to_string(),
        };

        let in_flight = InFlight::begin(&mut self.status);
        let outcome = match &route {
            Route::Simulator { udid, .. } => {
                delivery::push_to_simulator(&self.simctl, &self.config.temp_dir, udid, &app_id, payload).await
            }
            Route::Emulator { serial, .. } => delivery::post_to_emulator(&self.adb, serial, payload).await,
            Route::Desktop => {
                delivery::show_on_desktop(self.notifier.as_ref(), self.config.sound.as_deref(), &app_id, payload).await
            }
        };
        let status = in_flight.finish(&outcome);

        let record = match outcome {
            Ok(()) => NewRecord::success(payload, app_id, route.label(), route.identifier()),
            Err(message) => NewRecord::failure(payload, app_id, route.label(), route.identifier(), message),
        };
        info!(device = route.identifier(), success = record.success, "send finished");
        self.record(record);
        Ok(status)
    }

    /// History errors never change the outcome of a send that already
    /// happened.
    fn record(&self, record: NewRecord) {
        if let Err(e) = self.history.append(record) {
            warn!(error = %e, "failed to record send");
            return;
        }
        match self.history.prune(HISTORY_CAP) {
            Ok(0) => {}
            Ok(deleted) => debug!(deleted, "history pruned"),
            Err(e) => warn!(error = %e, "history prune failed"),
        }
    }
}

fn availability_after(error: &InventoryError) -> ToolAvailability {
    match error {
        InventoryError::ToolNotFound(_) => ToolAvailability::Missing,
        _ => ToolAvailability::Available,
    }
}
