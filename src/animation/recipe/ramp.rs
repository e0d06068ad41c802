// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Up-and-down ramps of brightness or color temperature.

use serde::{Deserialize, Serialize};

use crate::animation::step::{Action, Step};
use crate::command::DeviceCommand;
use crate::error::AnimationError;
use crate::types::{Brightness, BrightnessScale, ColorTemp};

use super::{CyclePlan, Outcome, defaults, invalid, millis};

/// Sub-steps per ramp direction.
const RAMP_STEPS: u32 = 20;

/// Ramp positions of one up-and-down cycle: `0..20` up, then `20..=1` down.
fn ramp_positions() -> impl Iterator<Item = u32> {
    (0..RAMP_STEPS).chain((1..=RAMP_STEPS).rev())
}

/// Ramps brightness up and down smoothly.
///
/// A cycle is 20 steps up and 20 steps down, each held for
/// `cycle_duration / 40`. The target is left at full brightness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breathe {
    /// Device or group name.
    pub target: String,
    /// Number of breaths.
    #[serde(default = "defaults::breathe_cycles")]
    pub cycles: u32,
    /// Duration of one breath in milliseconds.
    #[serde(default = "defaults::breathe_cycle_ms")]
    pub cycle_duration_ms: u64,
    /// Brightness scale the target expects.
    #[serde(default = "defaults::scale")]
    pub scale: BrightnessScale,
}

impl Breathe {
    /// Creates a breathe with default timing on the percent scale.
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            cycles: defaults::breathe_cycles(),
            cycle_duration_ms: defaults::breathe_cycle_ms(),
            scale: defaults::scale(),
        }
    }
}

impl CyclePlan for Breathe {
    fn name(&self) -> &'static str {
        "breathe"
    }

    fn cycles(&self) -> u32 {
        self.cycles
    }

    fn cycle(&self, _index: u32) -> Vec<Action> {
        let hold = millis(self.cycle_duration_ms / u64::from(RAMP_STEPS * 2));
        ramp_positions()
            .map(|i| {
                let level = Brightness::clamped(self.scale.fraction(i, RAMP_STEPS), self.scale);
                Step::new(self.target.as_str(), DeviceCommand::Brightness(level), hold).into()
            })
            .collect()
    }

    fn settle(&self, _outcome: Outcome, _lit: &[String]) -> Vec<Step> {
        vec![Step::immediate(
            self.target.as_str(),
            DeviceCommand::Brightness(Brightness::full(self.scale)),
        )]
    }
}

/// Sweeps color temperature between warm and cool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorTempSweep {
    /// Device or group name.
    pub target: String,
    /// Number of sweeps.
    #[serde(default = "defaults::color_temp_cycles")]
    pub cycles: u32,
    /// Coolest end of the sweep, in mireds.
    #[serde(default = "defaults::min_temp")]
    pub min_temp: u16,
    /// Warmest end of the sweep, in mireds.
    #[serde(default = "defaults::max_temp")]
    pub max_temp: u16,
    /// Duration of one sweep in milliseconds.
    #[serde(default = "defaults::color_temp_cycle_ms")]
    pub cycle_duration_ms: u64,
}

impl ColorTempSweep {
    /// Creates a full-range sweep with default timing.
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            cycles: defaults::color_temp_cycles(),
            min_temp: defaults::min_temp(),
            max_temp: defaults::max_temp(),
            cycle_duration_ms: defaults::color_temp_cycle_ms(),
        }
    }

    fn temp_at(&self, position: u32) -> u16 {
        let span = u32::from(self.max_temp.saturating_sub(self.min_temp));
        let offset = span * position / RAMP_STEPS;
        self.min_temp + u16::try_from(offset).unwrap_or(0)
    }
}

impl CyclePlan for ColorTempSweep {
    fn name(&self) -> &'static str {
        "color_temp_sweep"
    }

    fn cycles(&self) -> u32 {
        self.cycles
    }

    fn cycle(&self, _index: u32) -> Vec<Action> {
        let hold = millis(self.cycle_duration_ms / u64::from(RAMP_STEPS * 2));
        ramp_positions()
            .map(|i| {
                Step::new(
                    self.target.as_str(),
                    DeviceCommand::ColorTemp(self.temp_at(i)),
                    hold,
                )
                .into()
            })
            .collect()
    }

    fn validate(&self) -> Result<(), AnimationError> {
        for mireds in [self.min_temp, self.max_temp] {
            ColorTemp::new(mireds).map_err(|e| invalid(self.name(), e.to_string()))?;
        }
        if self.min_temp > self.max_temp {
            return Err(invalid(
                self.name(),
                format!(
                    "min_temp {} is greater than max_temp {}",
                    self.min_temp, self.max_temp
                ),
            ));
        }
        Ok(())
    }
}

/// Steps brightness linearly from off to full and back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrightnessSweep {
    /// Device or group name.
    pub target: String,
    /// Number of sweeps.
    #[serde(default = "defaults::sweep_cycles")]
    pub cycles: u32,
    /// Brightness increment per step.
    #[serde(default = "defaults::sweep_step")]
    pub step_size: u16,
    /// Pause between steps in milliseconds.
    #[serde(default = "defaults::sweep_delay_ms")]
    pub delay_ms: u64,
    /// Brightness scale the target expects.
    #[serde(default = "defaults::scale")]
    pub scale: BrightnessScale,
}

impl BrightnessSweep {
    /// Creates a sweep with default step and timing on the percent scale.
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            cycles: defaults::sweep_cycles(),
            step_size: defaults::sweep_step(),
            delay_ms: defaults::sweep_delay_ms(),
            scale: defaults::scale(),
        }
    }
}

impl CyclePlan for BrightnessSweep {
    fn name(&self) -> &'static str {
        "brightness_sweep"
    }

    fn cycles(&self) -> u32 {
        self.cycles
    }

    fn cycle(&self, _index: u32) -> Vec<Action> {
        let max = self.scale.max();
        let step = usize::from(self.step_size.max(1));
        let up = (0..=max).step_by(step);
        let down = (0..=max).rev().step_by(step);
        up.chain(down)
            .map(|value| {
                Step::new(
                    self.target.as_str(),
                    DeviceCommand::Brightness(Brightness::clamped(value, self.scale)),
                    millis(self.delay_ms),
                )
                .into()
            })
            .collect()
    }

    fn validate(&self) -> Result<(), AnimationError> {
        if self.step_size == 0 {
            return Err(invalid(self.name(), "step_size must be greater than 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::animation::recipe::{Cycled, Recipe, drain};

    fn levels(actions: &[Action]) -> Vec<u16> {
        actions
            .iter()
            .map(|a| match a.command() {
                DeviceCommand::Brightness(b) => b.value(),
                DeviceCommand::ColorTemp(ct) => ct,
                other => panic!("unexpected command {other}"),
            })
            .collect()
    }

    #[test]
    fn breathe_ramps_in_forty_steps() {
        let mut recipe = Cycled::new(Breathe {
            target: "Desk".to_string(),
            cycles: 1,
            cycle_duration_ms: 4000,
            scale: BrightnessScale::Percent,
        });
        let actions = drain(&mut recipe);
        let levels = levels(&actions);

        assert_eq!(actions.len(), 40);
        assert_eq!(levels[0], 0);
        assert_eq!(levels[19], 95);
        assert_eq!(levels[20], 100);
        assert_eq!(levels[39], 5);
        assert!(actions.iter().all(|a| a.hold() == Duration::from_millis(100)));
    }

    #[test]
    fn breathe_settles_at_full_brightness() {
        let mut recipe = Cycled::new(Breathe {
            scale: BrightnessScale::Byte,
            ..Breathe::new("Desk")
        });
        recipe.next_action();
        let settle = recipe.settle(Outcome::Cancelled);
        assert_eq!(
            settle,
            vec![Step::immediate(
                "Desk",
                DeviceCommand::Brightness(Brightness::full(BrightnessScale::Byte))
            )]
        );
    }

    #[test]
    fn color_temp_sweep_covers_range() {
        let mut recipe = Cycled::new(ColorTempSweep {
            cycles: 1,
            min_temp: 200,
            max_temp: 400,
            ..ColorTempSweep::new("Hall")
        });
        let levels = levels(&drain(&mut recipe));
        assert_eq!(levels.len(), 40);
        assert_eq!(levels[0], 200);
        assert_eq!(levels[1], 210);
        assert_eq!(levels[20], 400);
        assert_eq!(levels[39], 210);
        assert!(recipe.settle(Outcome::Completed).is_empty());
    }

    #[test]
    fn color_temp_sweep_rejects_inverted_range() {
        let sweep = ColorTempSweep {
            min_temp: 400,
            max_temp: 200,
            ..ColorTempSweep::new("Hall")
        };
        assert!(matches!(
            sweep.validate(),
            Err(AnimationError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn color_temp_sweep_rejects_out_of_range_mireds() {
        let sweep = ColorTempSweep {
            max_temp: 600,
            ..ColorTempSweep::new("Hall")
        };
        assert!(sweep.validate().is_err());
    }

    #[test]
    fn brightness_sweep_is_inclusive_both_ways() {
        let mut recipe = Cycled::new(BrightnessSweep {
            cycles: 1,
            step_size: 25,
            ..BrightnessSweep::new("Desk")
        });
        assert_eq!(
            levels(&drain(&mut recipe)),
            [0, 25, 50, 75, 100, 100, 75, 50, 25, 0]
        );
    }

    #[test]
    fn brightness_sweep_rejects_zero_step() {
        let sweep = BrightnessSweep {
            step_size: 0,
            ..BrightnessSweep::new("Desk")
        };
        assert_eq!(
            sweep.validate(),
            Err(AnimationError::InvalidParameter {
                recipe: "brightness_sweep".to_string(),
                message: "step_size must be greater than 0".to_string(),
            })
        );
    }
}
