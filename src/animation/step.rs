// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The units a recipe hands to the runner.

use std::time::Duration;

use crate::command::DeviceCommand;

/// One command to send, followed by a pause.
///
/// The pause (`hold`) happens after the command was emitted and before the
/// runner asks the recipe for its next action. A zero hold means the next
/// command goes out immediately, which is how recipes express several
/// commands sharing one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Device or group name.
    pub target: String,
    /// The command to send.
    pub command: DeviceCommand,
    /// Time to wait after sending.
    pub hold: Duration,
}

impl Step {
    /// Creates a step.
    #[must_use]
    pub fn new(target: impl Into<String>, command: DeviceCommand, hold: Duration) -> Self {
        Self {
            target: target.into(),
            command,
            hold,
        }
    }

    /// Creates a step with no hold.
    #[must_use]
    pub fn immediate(target: impl Into<String>, command: DeviceCommand) -> Self {
        Self::new(target, command, Duration::ZERO)
    }
}

/// A command scheduled to fire later, independently of the main sequence.
///
/// The runner spawns it as a child task and moves on after `hold`. The
/// child is cancelled together with its animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deferred {
    /// Device or group name.
    pub target: String,
    /// The command to send once `delay` elapsed.
    pub command: DeviceCommand,
    /// Delay before the command fires, measured from scheduling.
    pub delay: Duration,
    /// Time the main sequence waits after scheduling.
    pub hold: Duration,
}

/// What a recipe wants the runner to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send now, then hold.
    Send(Step),
    /// Schedule a command for later, then hold.
    Defer(Deferred),
}

impl Action {
    /// Returns the time the main sequence pauses after this action.
    #[must_use]
    pub fn hold(&self) -> Duration {
        match self {
            Self::Send(step) => step.hold,
            Self::Defer(deferred) => deferred.hold,
        }
    }

    /// Returns the target of this action.
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::Send(step) => &step.target,
            Self::Defer(deferred) => &deferred.target,
        }
    }

    /// Returns the command carried by this action.
    #[must_use]
    pub fn command(&self) -> DeviceCommand {
        match self {
            Self::Send(step) => step.command,
            Self::Defer(deferred) => deferred.command,
        }
    }
}

impl From<Step> for Action {
    fn from(step: Step) -> Self {
        Self::Send(step)
    }
}

impl From<Deferred> for Action {
    fn from(deferred: Deferred) -> Self {
        Self::Defer(deferred)
    }
}
