// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Color types for light control.
//!
//! Hue is always carried in degrees inside the crate; adapters that talk to
//! raw 16-bit hue APIs convert with [`Hue::to_raw`].

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Hue angle in degrees (0-360, where 0 and 360 are both red).
///
/// # Examples
///
/// ```
/// use lumen_lib::types::Hue;
///
/// let cyan = Hue::new(180).unwrap();
/// assert_eq!(cyan.degrees(), 180);
/// assert_eq!(cyan.to_raw(), 32767);
/// assert!(Hue::new(361).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Hue(u16);

impl Hue {
    /// Maximum hue in degrees.
    pub const MAX_DEGREES: u16 = 360;

    /// Maximum raw hue used by 16-bit APIs.
    pub const MAX_RAW: u16 = u16::MAX;

    /// Creates a hue from degrees.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidHue` if `degrees` is greater than 360.
    pub fn new(degrees: u16) -> Result<Self, ValueError> {
        if degrees > Self::MAX_DEGREES {
            return Err(ValueError::InvalidHue(degrees));
        }
        Ok(Self(degrees))
    }

    /// Creates a hue from any angle, wrapping into 0-359.
    #[must_use]
    pub const fn wrapping(degrees: u32) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let wrapped = (degrees % 360) as u16;
        Self(wrapped)
    }

    /// Returns the angle in degrees.
    #[must_use]
    pub const fn degrees(&self) -> u16 {
        self.0
    }

    /// Converts to the 0-65535 range used by raw hue APIs.
    #[must_use]
    pub fn to_raw(&self) -> u16 {
        let raw = u32::from(self.0) * u32::from(Self::MAX_RAW) / u32::from(Self::MAX_DEGREES);
        u16::try_from(raw).unwrap_or(Self::MAX_RAW)
    }

    /// Converts from the 0-65535 raw range, rounding down to whole degrees.
    #[must_use]
    pub fn from_raw(raw: u16) -> Self {
        let degrees = u32::from(raw) * u32::from(Self::MAX_DEGREES) / u32::from(Self::MAX_RAW);
        Self(u16::try_from(degrees).unwrap_or(Self::MAX_DEGREES))
    }
}

impl fmt::Display for Hue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// HSB color (hue in degrees, saturation and brightness in percent).
///
/// # Examples
///
/// ```
/// use lumen_lib::types::HsbColor;
///
/// let color = HsbColor::new(120, 100, 50).unwrap();
/// assert_eq!(color.to_command_string(), "120,100,50");
///
/// let parsed: HsbColor = "120,100,50".parse().unwrap();
/// assert_eq!(parsed, color);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HsbColor {
    hue: Hue,
    saturation: u8,
    brightness: u8,
}

impl HsbColor {
    /// Maximum saturation value.
    pub const MAX_SATURATION: u8 = 100;

    /// Maximum brightness value.
    pub const MAX_BRIGHTNESS: u8 = 100;

    /// Creates a new HSB color.
    ///
    /// # Errors
    ///
    /// Returns error if any component is outside its valid range.
    pub fn new(hue: u16, saturation: u8, brightness: u8) -> Result<Self, ValueError> {
        let hue = Hue::new(hue)?;
        if saturation > Self::MAX_SATURATION {
            return Err(ValueError::InvalidSaturation(saturation));
        }
        if brightness > Self::MAX_BRIGHTNESS {
            return Err(ValueError::InvalidBrightness(u16::from(brightness)));
        }
        Ok(Self {
            hue,
            saturation,
            brightness,
        })
    }

    /// Returns the hue.
    #[must_use]
    pub const fn hue(&self) -> Hue {
        self.hue
    }

    /// Returns the saturation (0-100).
    #[must_use]
    pub const fn saturation(&self) -> u8 {
        self.saturation
    }

    /// Returns the brightness (0-100).
    #[must_use]
    pub const fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Returns the color in the Tasmota/OpenBeken `HsbColor` format.
    #[must_use]
    pub fn to_command_string(&self) -> String {
        format!(
            "{},{},{}",
            self.hue.degrees(),
            self.saturation,
            self.brightness
        )
    }
}

impl fmt::Display for HsbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HSB({}, {}%, {}%)",
            self.hue, self.saturation, self.brightness
        )
    }
}

impl FromStr for HsbColor {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [hue, saturation, brightness] = parts.as_slice() else {
            return Err(ValueError::InvalidHue(0));
        };
        let hue = hue.parse().map_err(|_| ValueError::InvalidHue(0))?;
        let saturation = saturation
            .parse()
            .map_err(|_| ValueError::InvalidSaturation(0))?;
        let brightness = brightness
            .parse()
            .map_err(|_| ValueError::InvalidBrightness(0))?;
        Self::new(hue, saturation, brightness)
    }
}

/// Color temperature in mireds.
///
/// Lower values are cooler (bluer), higher values warmer. Zigbee2MQTT's
/// `color_temp` and Tasmota's `CT` both use this unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColorTemp(u16);

impl ColorTemp {
    /// Coolest supported value (~6500K).
    pub const MIN: u16 = 153;

    /// Warmest supported value (~2000K).
    pub const MAX: u16 = 500;

    /// Creates a color temperature.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value is outside [153, 500].
    pub fn new(mireds: u16) -> Result<Self, ValueError> {
        if !(Self::MIN..=Self::MAX).contains(&mireds) {
            return Err(ValueError::OutOfRange {
                min: Self::MIN,
                max: Self::MAX,
                actual: mireds,
            });
        }
        Ok(Self(mireds))
    }

    /// Returns the value in mireds.
    #[must_use]
    pub const fn mireds(&self) -> u16 {
        self.0
    }

    /// Returns the approximate temperature in Kelvin.
    #[must_use]
    pub fn to_kelvin(&self) -> u32 {
        1_000_000 / u32::from(self.0)
    }
}

impl fmt::Display for ColorTemp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}K", self.to_kelvin())
    }
}
