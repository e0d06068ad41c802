// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point-in-time view of one device.

use serde::{Deserialize, Serialize};

use crate::telemetry::DeviceStateReport;
use crate::types::PowerState;

/// The last known state of a device.
///
/// `brightness` and `color_temp` are `None` until the device reports them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    /// Device identifier (friendly name or topic).
    pub name: String,
    /// Whether the device was last seen on.
    pub is_on: bool,
    /// Last reported brightness, on the device's own scale.
    pub brightness: Option<u16>,
    /// Last reported color temperature in mireds.
    pub color_temp: Option<u16>,
}

impl DeviceSnapshot {
    /// Creates a snapshot for a device that is off with unknown levels.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_on: false,
            brightness: None,
            color_temp: None,
        }
    }

    /// Sets the power flag.
    #[must_use]
    pub fn with_on(mut self, is_on: bool) -> Self {
        self.is_on = is_on;
        self
    }

    /// Sets the brightness.
    #[must_use]
    pub fn with_brightness(mut self, brightness: u16) -> Self {
        self.brightness = Some(brightness);
        self
    }

    /// Returns the power state as a [`PowerState`].
    #[must_use]
    pub fn power(&self) -> PowerState {
        PowerState::from(self.is_on)
    }

    /// Applies a telemetry report, returning `true` if anything changed.
    ///
    /// A `TOGGLE` state in a report is ignored since it is not a state.
    pub fn apply(&mut self, report: &DeviceStateReport) -> bool {
        let before = self.clone();

        match report.state {
            Some(PowerState::On) => self.is_on = true,
            Some(PowerState::Off) => self.is_on = false,
            Some(PowerState::Toggle) | None => {}
        }
        if let Some(brightness) = report.brightness {
            self.brightness = Some(brightness);
        }
        if let Some(color_temp) = report.color_temp {
            self.color_temp = Some(color_temp);
        }

        *self != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_merges_present_fields() {
        let mut snapshot = DeviceSnapshot::new("Desk").with_brightness(10);
        let changed = snapshot.apply(&DeviceStateReport {
            state: Some(PowerState::On),
            brightness: None,
            color_temp: Some(250),
        });

        assert!(changed);
        assert!(snapshot.is_on);
        assert_eq!(snapshot.brightness, Some(10));
        assert_eq!(snapshot.color_temp, Some(250));
    }

    #[test]
    fn apply_same_values_reports_no_change() {
        let mut snapshot = DeviceSnapshot::new("Desk").with_on(true);
        let changed = snapshot.apply(&DeviceStateReport {
            state: Some(PowerState::On),
            ..DeviceStateReport::default()
        });
        assert!(!changed);
    }

    #[test]
    fn apply_ignores_toggle() {
        let mut snapshot = DeviceSnapshot::new("Desk").with_on(true);
        snapshot.apply(&DeviceStateReport {
            state: Some(PowerState::Toggle),
            ..DeviceStateReport::default()
        });
        assert_eq!(snapshot.power(), PowerState::On);
    }
}
