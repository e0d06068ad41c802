// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed and raw device commands.

use std::fmt;

use crate::command::{BRIGHTNESS, COLOR_TEMP, Command, DIMMER, HSB_COLOR, POWER};
use crate::types::{Brightness, BrightnessScale, HsbColor, PowerState};

/// A light command emitted by an animation step.
///
/// # Examples
///
/// ```
/// use lumen_lib::command::{Command, DeviceCommand};
/// use lumen_lib::types::{Brightness, BrightnessScale, HsbColor};
///
/// let dim = DeviceCommand::Brightness(Brightness::full(BrightnessScale::Percent));
/// assert_eq!(dim.name(), "Dimmer");
/// assert_eq!(dim.wire_payload(), "100");
///
/// let raw = DeviceCommand::Brightness(Brightness::full(BrightnessScale::Byte));
/// assert_eq!(raw.name(), "Brightness");
/// assert_eq!(raw.wire_payload(), "255");
///
/// let color = DeviceCommand::HsbColor(HsbColor::new(30, 100, 50).unwrap());
/// assert_eq!(color.wire_payload(), "30,100,50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceCommand {
    /// Switch power.
    Power(PowerState),
    /// Set brightness. Percent values go out as `Dimmer`, byte values as
    /// `Brightness`.
    Brightness(Brightness),
    /// Set color temperature in mireds.
    ColorTemp(u16),
    /// Set hue, saturation and brightness.
    HsbColor(HsbColor),
}

impl DeviceCommand {
    /// Shorthand for `Power(On)`.
    #[must_use]
    pub const fn on() -> Self {
        Self::Power(PowerState::On)
    }

    /// Shorthand for `Power(Off)`.
    #[must_use]
    pub const fn off() -> Self {
        Self::Power(PowerState::Off)
    }

    /// Shorthand for `Power(Toggle)`.
    #[must_use]
    pub const fn toggle() -> Self {
        Self::Power(PowerState::Toggle)
    }

    /// Returns the power state if this is a power command.
    #[must_use]
    pub const fn power_state(&self) -> Option<PowerState> {
        match self {
            Self::Power(state) => Some(*state),
            _ => None,
        }
    }
}

impl Command for DeviceCommand {
    fn name(&self) -> String {
        match self {
            Self::Power(_) => POWER,
            Self::Brightness(b) => match b.scale() {
                BrightnessScale::Percent => DIMMER,
                BrightnessScale::Byte => BRIGHTNESS,
            },
            Self::ColorTemp(_) => COLOR_TEMP,
            Self::HsbColor(_) => HSB_COLOR,
        }
        .to_string()
    }

    fn payload(&self) -> Option<String> {
        Some(match self {
            Self::Power(state) => state.as_str().to_string(),
            Self::Brightness(brightness) => brightness.value().to_string(),
            Self::ColorTemp(mireds) => mireds.to_string(),
            Self::HsbColor(color) => color.to_command_string(),
        })
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.wire_payload())
    }
}

/// An arbitrary command passed through to the sink untouched.
///
/// Used for direct device/group commands outside of animations, where the
/// caller already speaks the device's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawCommand {
    name: String,
    value: String,
}

impl RawCommand {
    /// Creates a raw command.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Command for RawCommand {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn payload(&self) -> Option<String> {
        if self.value.is_empty() {
            None
        } else {
            Some(self.value.clone())
        }
    }
}

impl From<DeviceCommand> for RawCommand {
    fn from(command: DeviceCommand) -> Self {
        Self::new(command.name(), command.wire_payload())
    }
}
