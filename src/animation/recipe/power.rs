// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! On/off recipes for a single target.

use serde::{Deserialize, Serialize};

use crate::animation::step::{Action, Step};
use crate::command::DeviceCommand;

use super::{CyclePlan, Outcome, defaults, millis};

/// Toggles one target on and off, then leaves it on.
///
/// Each cycle is `ON`, wait `interval / 2`, `OFF`, wait `interval / 2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pulse {
    /// Device or group name.
    pub target: String,
    /// Number of on/off cycles.
    #[serde(default = "defaults::pulse_cycles")]
    pub cycles: u32,
    /// Full on/off period in milliseconds.
    #[serde(default = "defaults::pulse_interval_ms")]
    pub interval_ms: u64,
}

impl Pulse {
    /// Creates a pulse with default timing.
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            cycles: defaults::pulse_cycles(),
            interval_ms: defaults::pulse_interval_ms(),
        }
    }
}

impl CyclePlan for Pulse {
    fn name(&self) -> &'static str {
        "pulse"
    }

    fn cycles(&self) -> u32 {
        self.cycles
    }

    fn cycle(&self, _index: u32) -> Vec<Action> {
        let half = millis(self.interval_ms / 2);
        vec![
            Step::new(self.target.as_str(), DeviceCommand::on(), half).into(),
            Step::new(self.target.as_str(), DeviceCommand::off(), half).into(),
        ]
    }

    fn settle(&self, _outcome: Outcome, _lit: &[String]) -> Vec<Step> {
        vec![Step::immediate(self.target.as_str(), DeviceCommand::on())]
    }
}

/// Flashes a group target a fixed number of times.
///
/// The final flash ends with `OFF` and no trailing pause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynchronizedFlash {
    /// Group name (or a single device).
    pub target: String,
    /// Number of flashes.
    #[serde(default = "defaults::flashes")]
    pub flashes: u32,
    /// How long each flash stays on, in milliseconds.
    #[serde(default = "defaults::flash_on_ms")]
    pub on_duration_ms: u64,
    /// Pause between flashes, in milliseconds.
    #[serde(default = "defaults::flash_off_ms")]
    pub off_duration_ms: u64,
}

impl SynchronizedFlash {
    /// Creates a flash with default timing.
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            flashes: defaults::flashes(),
            on_duration_ms: defaults::flash_on_ms(),
            off_duration_ms: defaults::flash_off_ms(),
        }
    }
}

impl CyclePlan for SynchronizedFlash {
    fn name(&self) -> &'static str {
        "synchronized_flash"
    }

    fn cycles(&self) -> u32 {
        self.flashes
    }

    fn cycle(&self, index: u32) -> Vec<Action> {
        let off_hold = if index + 1 < self.flashes {
            millis(self.off_duration_ms)
        } else {
            millis(0)
        };
        vec![
            Step::new(
                self.target.as_str(),
                DeviceCommand::on(),
                millis(self.on_duration_ms),
            )
            .into(),
            Step::new(self.target.as_str(), DeviceCommand::off(), off_hold).into(),
        ]
    }
}
