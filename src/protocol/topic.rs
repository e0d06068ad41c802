// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topic and payload layout for the supported MQTT device families.

use serde_json::json;

use crate::command::{BRIGHTNESS, COLOR_TEMP, DIMMER, HSB_COLOR, POWER};
use crate::error::SendError;
use crate::types::{Brightness, BrightnessScale, HsbColor, PowerState};

/// Default Zigbee2MQTT base topic.
pub const DEFAULT_Z2M_BASE_TOPIC: &str = "zigbee2mqtt";

/// Highest `brightness` Zigbee2MQTT accepts.
const Z2M_MAX_BRIGHTNESS: u16 = 254;

/// How commands are mapped onto MQTT topics and payloads.
///
/// # Examples
///
/// ```
/// use lumen_lib::protocol::TopicStyle;
///
/// let tasmota = TopicStyle::Tasmota;
/// assert_eq!(tasmota.command_topic("animations", "Power"), "cmnd/animations/Power");
/// assert_eq!(tasmota.payload("Power", "ON").unwrap(), "ON");
///
/// let z2m = TopicStyle::zigbee2mqtt();
/// assert_eq!(z2m.command_topic("Desk", "Power"), "zigbee2mqtt/Desk/set");
/// assert_eq!(z2m.payload("Power", "OFF").unwrap(), r#"{"state":"OFF"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TopicStyle {
    /// `cmnd/<target>/<Command>` with the raw value as payload.
    ///
    /// Used by Tasmota and OpenBeken firmware, including group topics.
    /// `Brightness` has no Tasmota equivalent and goes out as a `Dimmer`
    /// percentage.
    #[default]
    Tasmota,
    /// `<base_topic>/<target>/set` with a JSON body.
    Zigbee2Mqtt {
        /// The Zigbee2MQTT base topic, usually `zigbee2mqtt`.
        base_topic: String,
    },
}

impl TopicStyle {
    /// Zigbee2MQTT style with the default base topic.
    #[must_use]
    pub fn zigbee2mqtt() -> Self {
        Self::Zigbee2Mqtt {
            base_topic: DEFAULT_Z2M_BASE_TOPIC.to_string(),
        }
    }

    /// Returns the topic a command for `target` is published to.
    #[must_use]
    pub fn command_topic(&self, target: &str, command: &str) -> String {
        match self {
            Self::Tasmota if command == BRIGHTNESS => format!("cmnd/{target}/{DIMMER}"),
            Self::Tasmota => format!("cmnd/{target}/{command}"),
            Self::Zigbee2Mqtt { base_topic } => format!("{base_topic}/{target}/set"),
        }
    }

    /// Builds the payload for `command` with `value`.
    ///
    /// # Errors
    ///
    /// Returns `SendError::InvalidValue` if the value does not parse for a
    /// known command, or `SendError::Rejected` if Zigbee2MQTT has no
    /// equivalent for the command.
    pub fn payload(&self, command: &str, value: &str) -> Result<String, SendError> {
        match self {
            Self::Tasmota if command == BRIGHTNESS => {
                let raw = parse_level(command, value)?;
                let percent = Brightness::clamped(raw, BrightnessScale::Byte)
                    .rescale(BrightnessScale::Percent);
                Ok(percent.value().to_string())
            }
            Self::Tasmota => Ok(value.to_string()),
            Self::Zigbee2Mqtt { .. } => Ok(zigbee2mqtt_payload(command, value)?.to_string()),
        }
    }
}

fn invalid_value(command: &str, value: &str) -> SendError {
    SendError::InvalidValue {
        command: command.to_string(),
        value: value.to_string(),
    }
}

fn parse_level(command: &str, value: &str) -> Result<u16, SendError> {
    value.trim().parse().map_err(|_| invalid_value(command, value))
}

/// Maps a brightness on `scale` onto Zigbee2MQTT's 0-254 range.
fn z2m_brightness(value: u16, scale: BrightnessScale) -> u16 {
    match scale {
        BrightnessScale::Percent => {
            let percent = u32::from(value.min(scale.max()));
            u16::try_from(percent * u32::from(Z2M_MAX_BRIGHTNESS) / 100)
                .unwrap_or(Z2M_MAX_BRIGHTNESS)
        }
        BrightnessScale::Byte => value.min(Z2M_MAX_BRIGHTNESS),
    }
}

/// Translates a Tasmota-vocabulary command into a Zigbee2MQTT `/set` body.
fn zigbee2mqtt_payload(command: &str, value: &str) -> Result<serde_json::Value, SendError> {
    let invalid = || invalid_value(command, value);

    match command {
        POWER => {
            let state: PowerState = value.parse().map_err(|_| invalid())?;
            Ok(json!({ "state": state.as_str() }))
        }
        DIMMER | BRIGHTNESS => {
            let scale = if command == DIMMER {
                BrightnessScale::Percent
            } else {
                BrightnessScale::Byte
            };
            let level = parse_level(command, value)?;
            Ok(json!({
                "state": PowerState::On.as_str(),
                "brightness": z2m_brightness(level, scale)
            }))
        }
        COLOR_TEMP => {
            let mireds = parse_level(command, value)?;
            Ok(json!({ "state": PowerState::On.as_str(), "color_temp": mireds }))
        }
        HSB_COLOR => {
            let color: HsbColor = value.parse().map_err(|_| invalid())?;
            let brightness =
                z2m_brightness(u16::from(color.brightness()), BrightnessScale::Percent);
            Ok(json!({
                "state": PowerState::On.as_str(),
                "color": {
                    "hue": color.hue().degrees(),
                    "saturation": color.saturation()
                },
                "brightness": brightness
            }))
        }
        other => Err(SendError::Rejected(format!(
            "{other} has no Zigbee2MQTT equivalent"
        ))),
    }
}
