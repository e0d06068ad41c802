// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Random on/off flicker across several targets.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::animation::step::{Action, Step};
use crate::command::DeviceCommand;
use crate::error::AnimationError;
use crate::protocol::DeviceSnapshotProvider;
use crate::types::PowerState;

use super::{Outcome, Recipe, defaults};

/// Shortest pause between two toggles, in milliseconds.
const MIN_HOLD_MS: u64 = 100;

/// Longest pause between two toggles (exclusive), in milliseconds.
const MAX_HOLD_MS: u64 = 500;

/// Parameters of a random blink.
///
/// Every step picks a random target and flips it, starting from the power
/// state the snapshot provider reports. An empty target list means every
/// known device. All targets are switched on at the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomBlink {
    /// Device names to blink.
    #[serde(default)]
    pub targets: Vec<String>,
    /// How long to keep blinking, in seconds.
    #[serde(default = "defaults::random_blink_secs")]
    pub duration_secs: u64,
}

impl RandomBlink {
    /// Creates a blink over `targets` with the default duration.
    #[must_use]
    pub fn new(targets: Vec<String>) -> Self {
        Self {
            targets,
            duration_secs: defaults::random_blink_secs(),
        }
    }

    /// Resolves targets against `snapshots` and seeds the local power state.
    ///
    /// # Errors
    ///
    /// Returns `AnimationError::NoTargets` if nothing is left to blink, or
    /// `AnimationError::TargetNotFound` for a target the provider does not
    /// know.
    pub fn into_sequence(
        self,
        snapshots: &dyn DeviceSnapshotProvider,
    ) -> Result<RandomBlinkSequence, AnimationError> {
        self.into_sequence_with_rng(snapshots, StdRng::from_os_rng())
    }

    pub(crate) fn into_sequence_with_rng(
        self,
        snapshots: &dyn DeviceSnapshotProvider,
        rng: StdRng,
    ) -> Result<RandomBlinkSequence, AnimationError> {
        let devices = if self.targets.is_empty() {
            snapshots.get_all()
        } else {
            self.targets
                .iter()
                .map(|name| {
                    snapshots
                        .get(name)
                        .ok_or_else(|| AnimationError::TargetNotFound(name.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?
        };
        if devices.is_empty() {
            return Err(AnimationError::NoTargets("random_blink".to_string()));
        }

        let (targets, lit): (Vec<String>, Vec<bool>) = devices.into_iter().map(|d| (d.name, d.is_on)).unzip();
        Ok(RandomBlinkSequence {
            targets,
            lit,
            duration: Duration::from_secs(self.duration_secs),
            deadline: None,
            rng,
        })
    }
}

/// A running random blink. Built by [`RandomBlink::into_sequence`].
#[derive(Debug)]
pub struct RandomBlinkSequence {
    targets: Vec<String>,
    lit: Vec<bool>,
    duration: Duration,
    deadline: Option<Instant>,
    rng: StdRng,
}

impl RandomBlinkSequence {
    /// Returns the resolved targets.
    #[must_use]
    pub fn targets(&self) -> &[String] {
        &self.targets
    }
}

impl Recipe for RandomBlinkSequence {
    fn name(&self) -> &'static str {
        "random_blink"
    }

    fn next_action(&mut self) -> Option<Action> {
        let now = Instant::now();
        // The clock starts with the first pull, not at construction.
        let deadline = *self.deadline.get_or_insert(now + self.duration);
        if now >= deadline || self.targets.is_empty() {
            return None;
        }

        let index = self.rng.random_range(0..self.targets.len());
        self.lit[index] = !self.lit[index];
        let hold = Duration::from_millis(self.rng.random_range(MIN_HOLD_MS..MAX_HOLD_MS));
        Some(
            Step::new(
                self.targets[index].as_str(),
                DeviceCommand::Power(PowerState::from(self.lit[index])),
                hold,
            )
            .into(),
        )
    }

    fn settle(&mut self, _outcome: Outcome) -> Vec<Step> {
        self.targets
            .iter()
            .map(|t| Step::immediate(t.as_str(), DeviceCommand::on()))
            .collect()
    }
}
