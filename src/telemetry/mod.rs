// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Telemetry parsing for Zigbee2MQTT messages.
//!
//! Zigbee2MQTT publishes on two kinds of topics under its base topic:
//!
//! - `<base>/bridge/devices` - The full device list (retained)
//! - `<base>/<friendly_name>` - Device state (`state`, `brightness`, `color_temp`, ...)
//!
//! Everything else (`/set`, `/get`, `/availability`, other bridge topics) is
//! rejected with [`ParseError::UnexpectedTopic`] so callers can ignore it.
//!
//! # Examples
//!
//! ```
//! use lumen_lib::telemetry::{TelemetryMessage, parse_telemetry};
//!
//! let msg = parse_telemetry(
//!     "zigbee2mqtt",
//!     "zigbee2mqtt/Desk Lamp",
//!     r#"{"state":"ON","brightness":180,"linkquality":96}"#,
//! )
//! .unwrap();
//!
//! match msg {
//!     TelemetryMessage::State { device, state } => {
//!         assert_eq!(device, "Desk Lamp");
//!         assert_eq!(state.brightness, Some(180));
//!     }
//!     TelemetryMessage::DeviceList(_) => unreachable!(),
//! }
//! ```

mod zigbee2mqtt;

pub use zigbee2mqtt::{BridgeDevice, DeviceStateReport};

use crate::error::ParseError;

/// A parsed Zigbee2MQTT message.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryMessage {
    /// Device list from `<base>/bridge/devices`.
    DeviceList(Vec<BridgeDevice>),

    /// State report from `<base>/<friendly_name>`.
    State {
        /// The friendly name extracted from the topic.
        device: String,
        /// The parsed state fields.
        state: DeviceStateReport,
    },
}

/// Parses a Zigbee2MQTT topic and payload.
///
/// Friendly names may contain `/`; everything between the base topic and the
/// end of the topic is taken as the name.
///
/// # Errors
///
/// Returns `ParseError::UnexpectedTopic` for topics that carry no device
/// state, or `ParseError::Json` if the payload is malformed.
pub fn parse_telemetry(
    base_topic: &str,
    topic: &str,
    payload: &str,
) -> Result<TelemetryMessage, ParseError> {
    let unexpected = || ParseError::UnexpectedTopic(topic.to_string());

    let rest = topic
        .strip_prefix(base_topic)
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|rest| !rest.is_empty())
        .ok_or_else(unexpected)?;

    if rest == "bridge/devices" {
        let devices: Vec<BridgeDevice> = serde_json::from_str(payload)?;
        return Ok(TelemetryMessage::DeviceList(devices));
    }

    if rest.starts_with("bridge/")
        || rest.ends_with("/set")
        || rest.ends_with("/get")
        || rest.ends_with("/availability")
    {
        return Err(unexpected());
    }

    let state: DeviceStateReport = serde_json::from_str(payload)?;
    Ok(TelemetryMessage::State {
        device: rest.to_string(),
        state,
    })
}
