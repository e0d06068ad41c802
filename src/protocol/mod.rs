// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Collaborator interfaces and transport adapters.
//!
//! The animation core only ever talks to two traits:
//!
//! - [`DeviceCommandSink`]: "send command `X` with value `Y` to target `T`"
//! - [`DeviceSnapshotProvider`]: read-only, eventually-consistent device state
//!
//! # Adapters
//!
//! - [`MqttCommandSink`]: publishes at QoS 0 through `rumqttc`, either to
//!   Tasmota/OpenBeken `cmnd/` topics or to Zigbee2MQTT `/set` topics
//!   (see [`TopicStyle`])
//! - [`SnapshotStore`](crate::state::SnapshotStore): an in-memory provider
//!   fed from Zigbee2MQTT telemetry

#[cfg(feature = "mqtt")]
mod mqtt;
mod topic;

#[cfg(feature = "mqtt")]
pub use mqtt::{MqttCommandSink, MqttCommandSinkBuilder, MqttSinkConfig};
pub use topic::TopicStyle;

use async_trait::async_trait;

use crate::error::SendError;
use crate::state::DeviceSnapshot;

/// Destination for outgoing device commands.
///
/// `target` is either a single device identifier or a group name; the
/// animation core does not distinguish the two. Implementations should be
/// fire-and-forget and return quickly: the runner bounds every call with
/// [`RunnerConfig::send_timeout`](crate::animation::RunnerConfig).
#[async_trait]
pub trait DeviceCommandSink: Send + Sync {
    /// Sends `command` with `value` to `target`.
    ///
    /// # Errors
    ///
    /// Returns `SendError` if the transport cannot accept the command.
    async fn send(&self, target: &str, command: &str, value: &str) -> Result<(), SendError>;
}

/// Read-only access to the last known state of devices.
///
/// Snapshots are updated asynchronously from device telemetry and are not
/// guaranteed to be fresh at call time.
pub trait DeviceSnapshotProvider: Send + Sync {
    /// Returns every known device, ordered by name.
    fn get_all(&self) -> Vec<DeviceSnapshot>;

    /// Returns the device called `name`, if known.
    fn get(&self, name: &str) -> Option<DeviceSnapshot> {
        self.get_all().into_iter().find(|device| device.name == name)
    }
}
