// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for light control.
//!
//! Each type checks its range at construction time, so recipes and sink
//! adapters never have to re-validate what they receive.
//!
//! # Types
//!
//! - [`PowerState`] - On/Off/Toggle
//! - [`Brightness`] and [`BrightnessScale`] - 0-100 or 0-255 brightness
//! - [`Hue`] - Hue angle in degrees, convertible to raw 16-bit units
//! - [`HsbColor`] - Hue, saturation and brightness
//! - [`ColorTemp`] - Color temperature in mireds (153-500)

mod brightness;
mod color;
mod power;

pub use brightness::{Brightness, BrightnessScale};
pub use color::{ColorTemp, HsbColor, Hue};
pub use power::PowerState;
