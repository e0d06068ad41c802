// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Animation recipes.
//!
//! A recipe turns its parameters into a lazy sequence of [`Action`]s. It
//! never sleeps and never talks to a transport: the
//! [`AnimationRunner`](super::AnimationRunner) pulls actions one at a time,
//! sends them, waits out their hold and checks for cancellation in between.
//! This keeps every recipe testable without a clock.
//!
//! | Recipe | Targets | Settles to |
//! |--------|---------|------------|
//! | [`Pulse`] | one | on |
//! | [`Breathe`] | one | full brightness |
//! | [`ColorTempSweep`] | one | |
//! | [`BrightnessSweep`] | one | |
//! | [`ColorRotation`] | one | |
//! | [`SynchronizedFlash`] | one group | |
//! | [`Sequential`] | many, or all known | all on |
//! | [`RandomBlink`] | many, or all known | all on |
//! | [`Wave`] | many | |
//! | [`BrightnessWave`] | many, or all known | full brightness |
//! | [`Chase`] | many | lit targets off |
//!
//! Recipes are usually built from a [`RecipeSpec`], either deserialized or
//! assembled from a recipe name and a parameter map.

mod color;
mod power;
mod random_blink;
mod ramp;
mod sequence;
mod spec;

pub use color::ColorRotation;
pub use power::{Pulse, SynchronizedFlash};
pub use random_blink::{RandomBlink, RandomBlinkSequence};
pub use ramp::{Breathe, BrightnessSweep, ColorTempSweep};
pub use sequence::{BrightnessWave, Chase, Sequential, Wave};
pub use spec::RecipeSpec;

use std::collections::VecDeque;
use std::time::Duration;

use crate::error::AnimationError;
use crate::types::PowerState;

use super::step::{Action, Step};

/// How an animation loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The recipe ran out of actions.
    Completed,
    /// The animation was stopped before the recipe finished.
    Cancelled,
}

/// A generator of animation actions.
pub trait Recipe: Send {
    /// Returns the recipe name, e.g. `"pulse"`.
    fn name(&self) -> &'static str;

    /// Returns the next action, or `None` when the animation is complete.
    fn next_action(&mut self) -> Option<Action>;

    /// Returns the commands that leave devices in a sensible final state.
    ///
    /// Called exactly once after the loop ends, whether it completed or was
    /// cancelled. Settle steps are sent back to back; their holds are ignored.
    fn settle(&mut self, outcome: Outcome) -> Vec<Step> {
        let _ = outcome;
        Vec::new()
    }
}

/// A recipe described one cycle at a time.
///
/// Wrapped in [`Cycled`] to become a [`Recipe`].
pub(crate) trait CyclePlan: Send + 'static {
    fn name(&self) -> &'static str;

    fn cycles(&self) -> u32;

    /// Actions of cycle `index`, in emission order.
    fn cycle(&self, index: u32) -> Vec<Action>;

    fn validate(&self) -> Result<(), AnimationError> {
        Ok(())
    }

    /// `lit` lists targets switched on by emitted actions and not switched
    /// off since, in the order they were lit.
    fn settle(&self, outcome: Outcome, lit: &[String]) -> Vec<Step> {
        let _ = (outcome, lit);
        Vec::new()
    }
}

/// Expands a [`CyclePlan`] lazily and tracks which targets it left on.
pub(crate) struct Cycled<P> {
    plan: P,
    next_cycle: u32,
    pending: VecDeque<Action>,
    lit: Vec<String>,
}

impl<P: CyclePlan> Cycled<P> {
    pub(crate) fn new(plan: P) -> Self {
        Self {
            plan,
            next_cycle: 0,
            pending: VecDeque::new(),
            lit: Vec::new(),
        }
    }

    fn track(&mut self, action: &Action) {
        // Deferred commands fire later; only immediate sends count.
        let Action::Send(step) = action else {
            return;
        };
        let Some(power) = step.command.power_state() else {
            return;
        };
        let position = self.lit.iter().position(|t| *t == step.target);
        match (power, position) {
            (PowerState::On | PowerState::Toggle, None) => self.lit.push(step.target.clone()),
            (PowerState::Off | PowerState::Toggle, Some(i)) => {
                self.lit.remove(i);
            }
            _ => {}
        }
    }
}

impl<P: CyclePlan> Recipe for Cycled<P> {
    fn name(&self) -> &'static str {
        self.plan.name()
    }

    fn next_action(&mut self) -> Option<Action> {
        while self.pending.is_empty() {
            if self.next_cycle >= self.plan.cycles() {
                return None;
            }
            self.pending.extend(self.plan.cycle(self.next_cycle));
            self.next_cycle += 1;
        }
        let action = self.pending.pop_front()?;
        self.track(&action);
        Some(action)
    }

    fn settle(&mut self, outcome: Outcome) -> Vec<Step> {
        self.plan.settle(outcome, &self.lit)
    }
}

/// Converts a millisecond parameter into a `Duration`.
pub(crate) const fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

pub(crate) fn invalid(recipe: &str, message: impl Into<String>) -> AnimationError {
    AnimationError::InvalidParameter {
        recipe: recipe.to_string(),
        message: message.into(),
    }
}

/// Parameter defaults, shared by serde and the constructors.
pub(crate) mod defaults {
    use crate::types::BrightnessScale;

    pub(crate) const fn pulse_cycles() -> u32 {
        10
    }
    pub(crate) const fn pulse_interval_ms() -> u64 {
        500
    }
    pub(crate) const fn breathe_cycles() -> u32 {
        5
    }
    pub(crate) const fn breathe_cycle_ms() -> u64 {
        3000
    }
    pub(crate) const fn color_temp_cycles() -> u32 {
        5
    }
    pub(crate) const fn color_temp_cycle_ms() -> u64 {
        4000
    }
    pub(crate) const fn min_temp() -> u16 {
        153
    }
    pub(crate) const fn max_temp() -> u16 {
        500
    }
    pub(crate) const fn sequential_cycles() -> u32 {
        3
    }
    pub(crate) const fn sequential_delay_ms() -> u64 {
        500
    }
    pub(crate) const fn random_blink_secs() -> u64 {
        30
    }
    pub(crate) const fn rotation_cycles() -> u32 {
        3
    }
    pub(crate) const fn hue_step() -> u16 {
        10
    }
    pub(crate) const fn rotation_delay_ms() -> u64 {
        30
    }
    pub(crate) const fn saturation() -> u8 {
        100
    }
    pub(crate) const fn rotation_brightness() -> u8 {
        50
    }
    pub(crate) const fn wave_delay_ms() -> u64 {
        100
    }
    pub(crate) const fn wave_on_ms() -> u64 {
        500
    }
    pub(crate) const fn brightness_wave_cycles() -> u32 {
        3
    }
    pub(crate) const fn brightness_wave_delay_ms() -> u64 {
        300
    }
    pub(crate) const fn chase_cycles() -> u32 {
        3
    }
    pub(crate) const fn chase_delay_ms() -> u64 {
        200
    }
    pub(crate) const fn flashes() -> u32 {
        5
    }
    pub(crate) const fn flash_on_ms() -> u64 {
        100
    }
    pub(crate) const fn flash_off_ms() -> u64 {
        100
    }
    pub(crate) const fn sweep_cycles() -> u32 {
        3
    }
    pub(crate) const fn sweep_step() -> u16 {
        5
    }
    pub(crate) const fn sweep_delay_ms() -> u64 {
        50
    }
    pub(crate) const fn scale() -> BrightnessScale {
        BrightnessScale::Percent
    }
}

#[cfg(test)]
pub(crate) fn drain(recipe: &mut dyn Recipe) -> Vec<Action> {
    std::iter::from_fn(|| recipe.next_action()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::DeviceCommand;

    struct Blink {
        cycles: u32,
    }

    impl CyclePlan for Blink {
        fn name(&self) -> &'static str {
            "blink"
        }

        fn cycles(&self) -> u32 {
            self.cycles
        }

        fn cycle(&self, index: u32) -> Vec<Action> {
            if index % 2 == 1 {
                return Vec::new();
            }
            vec![
                Step::immediate("a", DeviceCommand::on()).into(),
                Step::immediate("b", DeviceCommand::on()).into(),
                Step::immediate("a", DeviceCommand::off()).into(),
            ]
        }

        fn settle(&self, _outcome: Outcome, lit: &[String]) -> Vec<Step> {
            lit.iter()
                .map(|t| Step::immediate(t.as_str(), DeviceCommand::off()))
                .collect()
        }
    }

    #[test]
    fn cycled_skips_empty_cycles() {
        let mut recipe = Cycled::new(Blink { cycles: 3 });
        assert_eq!(drain(&mut recipe).len(), 6);
        assert!(recipe.next_action().is_none());
    }

    #[test]
    fn cycled_without_cycles_is_empty() {
        let mut recipe = Cycled::new(Blink { cycles: 0 });
        assert!(recipe.next_action().is_none());
        assert!(recipe.settle(Outcome::Completed).is_empty());
    }

    #[test]
    fn cycled_tracks_lit_targets() {
        let mut recipe = Cycled::new(Blink { cycles: 1 });
        recipe.next_action();
        recipe.next_action();
        let settle = recipe.settle(Outcome::Cancelled);
        let targets: Vec<_> = settle.iter().map(|s| s.target.as_str()).collect();
        assert_eq!(targets, ["a", "b"]);

        recipe.next_action();
        let settle = recipe.settle(Outcome::Completed);
        assert_eq!(settle, vec![Step::immediate("b", DeviceCommand::off())]);
    }
}
