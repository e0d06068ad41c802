// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hue rotation around the color wheel.

use serde::{Deserialize, Serialize};

use crate::animation::step::{Action, Step};
use crate::command::DeviceCommand;
use crate::error::AnimationError;
use crate::types::HsbColor;

use super::{CyclePlan, defaults, invalid, millis};

/// Cycles the hue around the color wheel at fixed saturation and brightness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRotation {
    /// Device or group name.
    pub target: String,
    /// Number of full rotations.
    #[serde(default = "defaults::rotation_cycles")]
    pub cycles: u32,
    /// Hue increment in degrees (1-360).
    #[serde(default = "defaults::hue_step")]
    pub hue_step: u16,
    /// Pause between hue steps in milliseconds.
    #[serde(default = "defaults::rotation_delay_ms")]
    pub delay_ms: u64,
    /// Saturation percentage.
    #[serde(default = "defaults::saturation")]
    pub saturation: u8,
    /// Brightness percentage.
    #[serde(default = "defaults::rotation_brightness")]
    pub brightness: u8,
}

impl ColorRotation {
    /// Creates a rotation with default step, timing and color.
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            cycles: defaults::rotation_cycles(),
            hue_step: defaults::hue_step(),
            delay_ms: defaults::rotation_delay_ms(),
            saturation: defaults::saturation(),
            brightness: defaults::rotation_brightness(),
        }
    }
}

impl CyclePlan for ColorRotation {
    fn name(&self) -> &'static str {
        "color_rotation"
    }

    fn cycles(&self) -> u32 {
        self.cycles
    }

    fn cycle(&self, _index: u32) -> Vec<Action> {
        let step = usize::from(self.hue_step.max(1));
        (0..360)
            .step_by(step)
            .filter_map(|hue| HsbColor::new(hue, self.saturation, self.brightness).ok())
            .map(|color| {
                Step::new(
                    self.target.as_str(),
                    DeviceCommand::HsbColor(color),
                    millis(self.delay_ms),
                )
                .into()
            })
            .collect()
    }

    fn validate(&self) -> Result<(), AnimationError> {
        if self.hue_step == 0 || self.hue_step > 360 {
            return Err(invalid(
                self.name(),
                format!("hue_step {} is out of range [1, 360]", self.hue_step),
            ));
        }
        HsbColor::new(0, self.saturation, self.brightness)
            .map_err(|e| invalid(self.name(), e.to_string()))?;
        Ok(())
    }
}
