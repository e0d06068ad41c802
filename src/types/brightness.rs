// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brightness on the two scales used by the supported device families.
//!
//! Hue-bridge and Tasmota/OpenBeken lights take a 0-100 percentage, raw
//! Zigbee2MQTT devices take 0-255. Recipes are parameterized by the scale of
//! their target space and produce values already on that scale.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// The numeric range a device family expects for brightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrightnessScale {
    /// 0-100, as used by Hue bridges and Tasmota `Dimmer`.
    #[default]
    Percent,
    /// 0-255, as used by Zigbee2MQTT `brightness`.
    Byte,
}

impl BrightnessScale {
    /// Returns the full-brightness value of this scale.
    #[must_use]
    pub const fn max(self) -> u16 {
        match self {
            Self::Percent => 100,
            Self::Byte => 255,
        }
    }

    /// Returns `max * numerator / denominator` using integer division.
    ///
    /// This is how ramps place their sub-steps: step `i` of `n` is
    /// `scale.fraction(i, n)`. A zero denominator yields zero.
    #[must_use]
    pub fn fraction(self, numerator: u32, denominator: u32) -> u16 {
        if denominator == 0 {
            return 0;
        }
        let value = u32::from(self.max()) * numerator.min(denominator) / denominator;
        u16::try_from(value).unwrap_or(self.max())
    }
}

/// A brightness value tagged with its scale.
///
/// # Examples
///
/// ```
/// use lumen_lib::types::{Brightness, BrightnessScale};
///
/// let half = Brightness::new(50, BrightnessScale::Percent).unwrap();
/// assert_eq!(half.rescale(BrightnessScale::Byte).value(), 127);
///
/// assert!(Brightness::new(256, BrightnessScale::Byte).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Brightness {
    value: u16,
    scale: BrightnessScale,
}

impl Brightness {
    /// Creates a brightness value on the given scale.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidBrightness` if `value` exceeds the scale's maximum.
    pub fn new(value: u16, scale: BrightnessScale) -> Result<Self, ValueError> {
        if value > scale.max() {
            return Err(ValueError::InvalidBrightness(value));
        }
        Ok(Self { value, scale })
    }

    /// Creates a brightness value, clamping to the scale's maximum.
    #[must_use]
    pub const fn clamped(value: u16, scale: BrightnessScale) -> Self {
        let max = scale.max();
        Self {
            value: if value > max { max } else { value },
            scale,
        }
    }

    /// Full brightness on the given scale.
    #[must_use]
    pub const fn full(scale: BrightnessScale) -> Self {
        Self {
            value: scale.max(),
            scale,
        }
    }

    /// Returns the raw value on this brightness's scale.
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.value
    }

    /// Returns the scale this value is expressed in.
    #[must_use]
    pub const fn scale(&self) -> BrightnessScale {
        self.scale
    }

    /// Converts to another scale, rounding down.
    #[must_use]
    pub fn rescale(self, scale: BrightnessScale) -> Self {
        if scale == self.scale {
            return self;
        }
        Self {
            value: scale.fraction(u32::from(self.value), u32::from(self.scale.max())),
            scale,
        }
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scale {
            BrightnessScale::Percent => write!(f, "{}%", self.value),
            BrightnessScale::Byte => write!(f, "{}/255", self.value),
        }
    }
}
