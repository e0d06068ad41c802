// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Zigbee2MQTT payload types.

use serde::Deserialize;

use crate::types::PowerState;

/// One entry of the `<base>/bridge/devices` list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BridgeDevice {
    /// The user-facing device name, also its topic segment.
    pub friendly_name: String,

    /// `Coordinator`, `Router` or `EndDevice`.
    #[serde(rename = "type", default)]
    pub device_type: Option<String>,

    /// IEEE address, e.g. `0x00158d0001234567`.
    #[serde(default)]
    pub ieee_address: Option<String>,

    /// Model identifier reported by the device.
    #[serde(default)]
    pub model_id: Option<String>,

    /// Manufacturer name reported by the device.
    #[serde(default)]
    pub manufacturer: Option<String>,

    /// Whether Zigbee2MQTT has a converter for this device.
    #[serde(default = "default_supported")]
    pub supported: bool,
}

const fn default_supported() -> bool {
    true
}

impl BridgeDevice {
    /// Returns `false` for the coordinator and for routers, which are
    /// infrastructure rather than controllable lights.
    #[must_use]
    pub fn is_controllable(&self) -> bool {
        !matches!(
            self.device_type.as_deref(),
            Some("Coordinator" | "Router")
        )
    }
}

/// The state fields of a `<base>/<friendly_name>` message.
///
/// Any other fields (`linkquality`, `update`, ...) are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct DeviceStateReport {
    /// Reported power state.
    #[serde(default)]
    pub state: Option<PowerState>,

    /// Reported brightness (0-255).
    #[serde(default)]
    pub brightness: Option<u16>,

    /// Reported color temperature in mireds.
    #[serde(default)]
    pub color_temp: Option<u16>,
}

impl DeviceStateReport {
    /// Returns `true` if the report carries none of the tracked fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.is_none() && self.brightness.is_none() && self.color_temp.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_device_defaults() {
        let device: BridgeDevice = serde_json::from_str(r#"{"friendly_name":"Desk"}"#).unwrap();
        assert!(device.supported);
        assert!(device.is_controllable());
        assert_eq!(device.device_type, None);
    }

    #[test]
    fn infrastructure_is_not_controllable() {
        let router: BridgeDevice =
            serde_json::from_str(r#"{"friendly_name":"Plug","type":"Router"}"#).unwrap();
        assert!(!router.is_controllable());
    }

    #[test]
    fn state_report_ignores_unknown_fields() {
        let report: DeviceStateReport = serde_json::from_str(
            r#"{"state":"ON","brightness":254,"color_temp":370,"linkquality":120}"#,
        )
        .unwrap();
        assert_eq!(report.state, Some(PowerState::On));
        assert_eq!(report.brightness, Some(254));
        assert_eq!(report.color_temp, Some(370));
    }

    #[test]
    fn state_report_without_tracked_fields_is_empty() {
        let report: DeviceStateReport =
            serde_json::from_str(r#"{"linkquality":42,"battery":90}"#).unwrap();
        assert!(report.is_empty());
    }
}
