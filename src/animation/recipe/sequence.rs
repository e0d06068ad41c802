// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Multi-target patterns.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::animation::step::{Action, Deferred, Step};
use crate::command::DeviceCommand;
use crate::error::AnimationError;
use crate::types::{Brightness, BrightnessScale};

use super::{CyclePlan, Outcome, defaults, millis};

fn require_targets(recipe: &str, targets: &[String]) -> Result<(), AnimationError> {
    if targets.is_empty() {
        return Err(AnimationError::NoTargets(recipe.to_string()));
    }
    Ok(())
}

/// Turns targets on one by one, then off one by one.
///
/// An empty target list means every device the snapshot provider knows.
/// All targets are switched on at the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequential {
    /// Device or group names, in order.
    #[serde(default)]
    pub targets: Vec<String>,
    /// Number of on/off sweeps.
    #[serde(default = "defaults::sequential_cycles")]
    pub cycles: u32,
    /// Pause after each command in milliseconds.
    #[serde(default = "defaults::sequential_delay_ms")]
    pub delay_ms: u64,
}

impl Sequential {
    /// Creates a sequence over `targets` with default timing.
    #[must_use]
    pub fn new(targets: Vec<String>) -> Self {
        Self {
            targets,
            cycles: defaults::sequential_cycles(),
            delay_ms: defaults::sequential_delay_ms(),
        }
    }
}

impl CyclePlan for Sequential {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn cycles(&self) -> u32 {
        self.cycles
    }

    fn cycle(&self, _index: u32) -> Vec<Action> {
        let hold = millis(self.delay_ms);
        let on = self
            .targets
            .iter()
            .map(|t| Step::new(t.as_str(), DeviceCommand::on(), hold).into());
        let off = self
            .targets
            .iter()
            .map(|t| Step::new(t.as_str(), DeviceCommand::off(), hold).into());
        on.chain(off).collect()
    }

    fn validate(&self) -> Result<(), AnimationError> {
        require_targets(self.name(), &self.targets)
    }

    fn settle(&self, _outcome: Outcome, _lit: &[String]) -> Vec<Step> {
        self.targets
            .iter()
            .map(|t| Step::immediate(t.as_str(), DeviceCommand::on()))
            .collect()
    }
}

/// Lights a single moving point that wraps around the target list.
///
/// Each frame switches the next target on and the previous one off, then
/// waits. Targets still lit when the chase ends are switched off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chase {
    /// Device or group names, in chase order.
    pub targets: Vec<String>,
    /// Number of passes over the targets.
    #[serde(default = "defaults::chase_cycles")]
    pub cycles: u32,
    /// Frame duration in milliseconds.
    #[serde(default = "defaults::chase_delay_ms")]
    pub delay_ms: u64,
}

impl Chase {
    /// Creates a chase over `targets` with default timing.
    #[must_use]
    pub fn new(targets: Vec<String>) -> Self {
        Self {
            targets,
            cycles: defaults::chase_cycles(),
            delay_ms: defaults::chase_delay_ms(),
        }
    }

    /// Index of the target lit in the frame before `(cycle, i)`, if it
    /// differs from `i`.
    fn previous(&self, cycle: u32, i: usize) -> Option<usize> {
        let last = self.targets.len() - 1;
        match i {
            0 if cycle == 0 || last == 0 => None,
            0 => Some(last),
            _ => Some(i - 1),
        }
    }
}

impl CyclePlan for Chase {
    fn name(&self) -> &'static str {
        "chase"
    }

    fn cycles(&self) -> u32 {
        if self.targets.is_empty() {
            0
        } else {
            self.cycles
        }
    }

    fn cycle(&self, index: u32) -> Vec<Action> {
        let frame = millis(self.delay_ms);
        let mut actions = Vec::with_capacity(self.targets.len() * 2);
        for (i, target) in self.targets.iter().enumerate() {
            match self.previous(index, i) {
                Some(prev) => {
                    actions.push(Step::immediate(target.as_str(), DeviceCommand::on()).into());
                    actions.push(
                        Step::new(self.targets[prev].as_str(), DeviceCommand::off(), frame).into(),
                    );
                }
                None => {
                    actions.push(Step::new(target.as_str(), DeviceCommand::on(), frame).into());
                }
            }
        }
        actions
    }

    fn validate(&self) -> Result<(), AnimationError> {
        require_targets(self.name(), &self.targets)
    }

    fn settle(&self, _outcome: Outcome, lit: &[String]) -> Vec<Step> {
        lit.iter()
            .map(|t| Step::immediate(t.as_str(), DeviceCommand::off()))
            .collect()
    }
}

/// Ripples a short on-pulse across the targets.
///
/// Each target is switched on, and its switch-off is scheduled
/// `on_duration` later while the wave already moves on to the next target
/// after `delay`. Runs once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wave {
    /// Device or group names, in wave order.
    pub targets: Vec<String>,
    /// Delay between consecutive targets in milliseconds.
    #[serde(default = "defaults::wave_delay_ms")]
    pub delay_ms: u64,
    /// How long each target stays on, in milliseconds.
    #[serde(default = "defaults::wave_on_ms")]
    pub on_duration_ms: u64,
}

impl Wave {
    /// Creates a wave over `targets` with default timing.
    #[must_use]
    pub fn new(targets: Vec<String>) -> Self {
        Self {
            targets,
            delay_ms: defaults::wave_delay_ms(),
            on_duration_ms: defaults::wave_on_ms(),
        }
    }
}

impl CyclePlan for Wave {
    fn name(&self) -> &'static str {
        "wave"
    }

    fn cycles(&self) -> u32 {
        1
    }

    fn cycle(&self, _index: u32) -> Vec<Action> {
        self.targets
            .iter()
            .flat_map(|t| {
                [
                    Step::immediate(t.as_str(), DeviceCommand::on()).into(),
                    Deferred {
                        target: t.clone(),
                        command: DeviceCommand::off(),
                        delay: millis(self.on_duration_ms),
                        hold: millis(self.delay_ms),
                    }
                    .into(),
                ]
            })
            .collect()
    }

    fn validate(&self) -> Result<(), AnimationError> {
        require_targets(self.name(), &self.targets)
    }
}

/// Brightness lost per position of distance from the wave front, out of 255.
const WAVE_FALLOFF: u16 = 60;

/// Sweeps a bright spot across the targets, dimming neighbours by distance.
///
/// Every frame puts the wave front on the next target. A target `d`
/// positions away from the front is set to `255 - 60 * d` out of 255,
/// rescaled to `scale`, and switched off once that reaches zero. Each frame
/// is held for `delay`. An empty target list means every device the
/// snapshot provider knows. All targets are left at full brightness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrightnessWave {
    /// Device or group names, in wave order.
    #[serde(default)]
    pub targets: Vec<String>,
    /// Number of passes across the targets.
    #[serde(default = "defaults::brightness_wave_cycles")]
    pub cycles: u32,
    /// Pause between frames in milliseconds.
    #[serde(default = "defaults::brightness_wave_delay_ms")]
    pub delay_ms: u64,
    /// Brightness scale the targets expect.
    #[serde(default = "defaults::scale")]
    pub scale: BrightnessScale,
}

impl BrightnessWave {
    /// Creates a wave over `targets` with default timing on the percent scale.
    #[must_use]
    pub fn new(targets: Vec<String>) -> Self {
        Self {
            targets,
            cycles: defaults::brightness_wave_cycles(),
            delay_ms: defaults::brightness_wave_delay_ms(),
            scale: defaults::scale(),
        }
    }

    fn command_at(&self, distance: usize) -> DeviceCommand {
        let dimmed = u16::try_from(distance)
            .unwrap_or(u16::MAX)
            .saturating_mul(WAVE_FALLOFF);
        match BrightnessScale::Byte.max().saturating_sub(dimmed) {
            0 => DeviceCommand::off(),
            level => DeviceCommand::Brightness(
                Brightness::clamped(level, BrightnessScale::Byte).rescale(self.scale),
            ),
        }
    }
}

impl CyclePlan for BrightnessWave {
    fn name(&self) -> &'static str {
        "brightness_wave"
    }

    fn cycles(&self) -> u32 {
        self.cycles
    }

    fn cycle(&self, _index: u32) -> Vec<Action> {
        let last = self.targets.len().saturating_sub(1);
        let delay = millis(self.delay_ms);
        let mut frames = Vec::with_capacity(self.targets.len() * self.targets.len());
        for front in 0..self.targets.len() {
            for (j, target) in self.targets.iter().enumerate() {
                let hold = if j == last { delay } else { Duration::ZERO };
                let command = self.command_at(front.abs_diff(j));
                frames.push(Action::from(Step::new(target.as_str(), command, hold)));
            }
        }
        frames
    }

    fn validate(&self) -> Result<(), AnimationError> {
        require_targets(self.name(), &self.targets)
    }

    fn settle(&self, _outcome: Outcome, _lit: &[String]) -> Vec<Step> {
        let full = DeviceCommand::Brightness(Brightness::full(self.scale));
        self.targets
            .iter()
            .map(|t| Step::immediate(t.as_str(), full))
            .collect()
    }
}
