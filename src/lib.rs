// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `Lumen` Lib - cancellable lighting animations for home-automation bridges.
//!
//! This library drives timed light effects (pulse, breathe, chase, wave,
//! ...) against Zigbee2MQTT, Tasmota and OpenBeken devices over MQTT. It
//! owns the timing, the cancellation and the "one animation per key"
//! bookkeeping; sending a command and knowing device state are delegated to
//! two small traits.
//!
//! # Architecture
//!
//! - [`animation::recipe`]: pure step generators, one per effect
//! - [`AnimationRunner`](animation::AnimationRunner): sends steps, holds
//!   between them, stops at the next step boundary when cancelled
//! - [`AnimationRegistry`]: start/stop/stop-all by key, lifecycle events
//! - [`protocol::DeviceCommandSink`]: where commands go (see
//!   [`protocol::MqttCommandSink`])
//! - [`protocol::DeviceSnapshotProvider`]: last known device state (see
//!   [`state::SnapshotStore`])
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use lumen_lib::AnimationRegistry;
//! use lumen_lib::protocol::{MqttCommandSink, TopicStyle};
//! use lumen_lib::state::SnapshotStore;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> lumen_lib::Result<()> {
//!     let store = SnapshotStore::new();
//!     let sink = MqttCommandSink::builder()
//!         .broker("mqtt://192.168.1.50:1883")?
//!         .topic_style(TopicStyle::zigbee2mqtt())
//!         .snapshot_store(store.clone())
//!         .build()
//!         .await?;
//!
//!     let registry = AnimationRegistry::builder(Arc::new(sink))
//!         .snapshot_provider(Arc::new(store))
//!         .build();
//!
//!     let params = json!({"targets": ["Hall", "Kitchen", "Desk"], "delay_ms": 150});
//!     registry.start("chase-downstairs", "chase", params.as_object().unwrap())?;
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(5)).await;
//!     registry.stop("chase-downstairs");
//!     Ok(())
//! }
//! ```
//!
//! ## Custom Transports
//!
//! Anything that can deliver "command `X` with value `Y` to `T`" can drive
//! animations:
//!
//! ```
//! use async_trait::async_trait;
//! use lumen_lib::error::SendError;
//! use lumen_lib::protocol::DeviceCommandSink;
//!
//! struct Log;
//!
//! #[async_trait]
//! impl DeviceCommandSink for Log {
//!     async fn send(&self, target: &str, command: &str, value: &str) -> Result<(), SendError> {
//!         println!("{target}: {command} {value}");
//!         Ok(())
//!     }
//! }
//! ```

pub mod animation;
pub mod command;
pub mod error;
pub mod event;
pub mod protocol;
pub mod state;
pub mod telemetry;
pub mod types;

pub use animation::{
    AnimationId, AnimationKey, AnimationRegistry, AnimationState, RecipeSpec, RunnerConfig,
};
pub use command::{Command, DeviceCommand, RawCommand};
pub use error::{AnimationError, Error, ParseError, Result, SendError, ValueError};
pub use event::{AnimationEvent, EventBus};
#[cfg(feature = "mqtt")]
pub use protocol::MqttCommandSink;
pub use protocol::{DeviceCommandSink, DeviceSnapshotProvider, TopicStyle};
pub use state::{DeviceSnapshot, SnapshotStore};
pub use types::{Brightness, BrightnessScale, ColorTemp, HsbColor, Hue, PowerState};
