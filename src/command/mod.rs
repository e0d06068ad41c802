// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device command definitions.
//!
//! A command is a name plus a textual value, which is exactly what a
//! [`DeviceCommandSink`](crate::protocol::DeviceCommandSink) accepts. Names
//! follow the Tasmota/OpenBeken vocabulary; sink adapters for other
//! transports translate from it.
//!
//! | Command | Name | Value |
//! |---------|------|-------|
//! | [`DeviceCommand::Power`] | `Power` | `ON`, `OFF`, `TOGGLE` |
//! | [`DeviceCommand::Brightness`] (percent) | `Dimmer` | 0-100 |
//! | [`DeviceCommand::Brightness`] (byte) | `Brightness` | 0-255 |
//! | [`DeviceCommand::ColorTemp`] | `CT` | mireds |
//! | [`DeviceCommand::HsbColor`] | `HsbColor` | `hue,saturation,brightness` |
//!
//! # Examples
//!
//! ```
//! use lumen_lib::command::{Command, DeviceCommand};
//! use lumen_lib::types::PowerState;
//!
//! let cmd = DeviceCommand::Power(PowerState::On);
//! assert_eq!(cmd.name(), "Power");
//! assert_eq!(cmd.payload(), Some("ON".to_string()));
//! ```

mod device;

pub use device::{DeviceCommand, RawCommand};

/// Command name for power control.
pub const POWER: &str = "Power";

/// Command name for brightness as a 0-100 percentage.
pub const DIMMER: &str = "Dimmer";

/// Command name for raw 0-255 brightness.
///
/// Not a Tasmota command; the Tasmota topic style rewrites it to [`DIMMER`].
pub const BRIGHTNESS: &str = "Brightness";

/// Command name for color temperature.
pub const COLOR_TEMP: &str = "CT";

/// Command name for HSB color.
pub const HSB_COLOR: &str = "HsbColor";

/// A command that can be sent to a device or group.
pub trait Command {
    /// Returns the command name, e.g. `"Power"` or `"Dimmer"`.
    fn name(&self) -> String;

    /// Returns the command value, if any.
    fn payload(&self) -> Option<String>;

    /// Returns the value sent over the wire; empty for value-less commands.
    fn wire_payload(&self) -> String {
        self.payload().unwrap_or_default()
    }
}
