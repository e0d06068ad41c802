// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Timed light animations.
//!
//! - [`recipe`]: parameterized generators of [`Action`]s (pulse, breathe,
//!   chase, ...), free of timing and I/O
//! - [`AnimationRunner`]: the loop that sends a recipe's steps through a
//!   [`DeviceCommandSink`](crate::protocol::DeviceCommandSink), honoring
//!   holds and cancellation
//! - [`AnimationRegistry`]: at most one live animation per
//!   [`AnimationKey`], with start/stop/stop-all and lifecycle events
//!
//! # Cancellation
//!
//! Stopping is cooperative. The runner checks its token before every
//! action and races every hold against it, so a stopped animation sends at
//! most the step it was emitting, followed by the recipe's settle commands.

mod config;
mod key;
pub mod recipe;
mod registry;
mod runner;
mod step;

pub use config::{DEFAULT_SEND_TIMEOUT, RunnerConfig};
pub use key::{AnimationId, AnimationKey};
pub use recipe::{Outcome, Recipe, RecipeSpec};
pub use registry::{
    AnimationInfo, AnimationRegistry, AnimationRegistryBuilder, AnimationState, Started,
};
pub use runner::{AnimationRunner, RunReport};
pub use step::{Action, Deferred, Step};
