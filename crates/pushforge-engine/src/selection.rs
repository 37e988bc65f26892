//! Device selection across refreshes.

use pushforge_core::{AndroidEmulator, SimulatorDevice};

/// A device that can be picked as the send target.
pub trait Selectable {
    fn id(&self) -> &str;

    /// Booted simulator or online emulator.
    fn is_ready(&self) -> bool;
}

impl Selectable for SimulatorDevice {
    fn id(&self) -> &str {
        &self.udid
    }

    fn is_ready(&self) -> bool {
        self.is_booted()
    }
}

impl Selectable for AndroidEmulator {
    fn id(&self) -> &str {
        &self.serial
    }

    fn is_ready(&self) -> bool {
        self.is_online()
    }
}

/// Selection after a refresh replaced the device list: the previous pick if
/// it is still listed, else the first ready device, else the first device.
pub fn reselect<T: Selectable>(previous: Option<&str>, devices: &[T]) -> Option<String> {
    previous
        .and_then(|id| devices.iter().find(|d| d.id() == id))
        .or_else(|| devices.iter().find(|d| d.is_ready()))
        .or_else(|| devices.first())
        .map(|d| d.id().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pushforge_core::{EmulatorState, SimulatorState};

    fn sim(udid: &str, state: SimulatorState) -> SimulatorDevice {
        SimulatorDevice {
            udid: udid.into(),
            name: format!("Sim {udid}"),
            runtime: "iOS 17.2".into(),
            state,
        }
    }

    #[test]
    fn keeps_previous_when_still_present() {
        let devices = vec![sim("A", SimulatorState::Booted), sim("B", SimulatorState::Shutdown)];
        assert_eq!(reselect(Some("B"), &devices).as_deref(), Some("B"));
    }

    #[test]
    fn falls_back_to_first_ready() {
        let devices = vec![sim("A", SimulatorState::Shutdown), sim("B", SimulatorState::Booted)];
        assert_eq!(reselect(Some("gone"), &devices).as_deref(), Some("B"));
        assert_eq!(reselect(None, &devices).as_deref(), Some("B"));
    }

    #[test]
    fn falls_back_to_first() {
        let devices = vec![sim("A", SimulatorState::Shutdown), sim("B", SimulatorState::Other)];
        assert_eq!(reselect(None, &devices).as_deref(), Some("A"));
        assert_eq!(reselect::<SimulatorDevice>(Some("A"), &[]), None);
    }

    #[test]
    fn emulators_select_online() {
        let devices = vec![
            AndroidEmulator {
                serial: "emulator-5554".into(),
                name: "Pixel".into(),
                state: EmulatorState::Offline,
            },
            AndroidEmulator {
                serial: "emulator-5556".into(),
                name: "Pixel 2".into(),
                state: EmulatorState::Online,
            },
        ];
        assert_eq!(reselect(None, &devices).as_deref(), Some("emulator-5556"));
    }
}
