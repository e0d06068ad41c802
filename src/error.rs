// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `Lumen` library.
//!
//! Registry-level failures ([`AnimationError`]) are returned synchronously to
//! whoever called `start`/`stop`. Transport failures ([`SendError`]) happen
//! inside running animations, where they are logged per step and never abort
//! the sequence.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error raised by the animation registry or a recipe.
    #[error("animation error: {0}")]
    Animation(#[from] AnimationError),

    /// Error occurred while sending a command to a device.
    #[error("send error: {0}")]
    Send(#[from] SendError),

    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while parsing device telemetry.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Errors raised when starting, stopping or building animations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnimationError {
    /// An animation with the same key is still live.
    #[error("animation '{0}' is already running")]
    AlreadyRunning(String),

    /// No live animation has this key.
    #[error("animation '{0}' not found")]
    NotFound(String),

    /// The recipe name is not one of the known recipes.
    #[error("unknown recipe: {0}")]
    UnknownRecipe(String),

    /// A recipe parameter is missing or out of range.
    #[error("invalid parameter for {recipe}: {message}")]
    InvalidParameter {
        /// The recipe being configured.
        recipe: String,
        /// What is wrong with the parameters.
        message: String,
    },

    /// A recipe referenced a device the snapshot provider does not know.
    #[error("target '{0}' not found")]
    TargetNotFound(String),

    /// A recipe that needs at least one target resolved none.
    #[error("no targets available for {0}")]
    NoTargets(String),
}

/// Errors raised by a [`DeviceCommandSink`](crate::protocol::DeviceCommandSink).
#[derive(Debug, Error)]
pub enum SendError {
    /// The broker address could not be parsed.
    #[error("invalid broker address: {0}")]
    InvalidAddress(String),

    /// Connecting to the broker failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The transport has no live connection.
    #[error("transport is not connected")]
    NotConnected,

    /// The send did not complete in time.
    #[error("send timed out after {0} ms")]
    Timeout(u64),

    /// The sink refused the command.
    #[error("command rejected: {0}")]
    Rejected(String),

    /// The command value cannot be translated for this transport.
    #[error("invalid value '{value}' for {command}")]
    InvalidValue {
        /// The command name.
        command: String,
        /// The offending value.
        value: String,
    },

    /// MQTT publish failed.
    #[cfg(feature = "mqtt")]
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Payload serialization failed.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors related to value validation and constraints.
///
/// These errors occur when attempting to create constrained types
/// with invalid values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// An invalid power state string was provided.
    #[error("invalid power state: {0}")]
    InvalidPowerState(String),

    /// A hue value is outside the valid range (0-360).
    #[error("hue value {0} is out of range [0, 360]")]
    InvalidHue(u16),

    /// A saturation value is outside the valid range (0-100).
    #[error("saturation value {0} is out of range [0, 100]")]
    InvalidSaturation(u8),

    /// A brightness value is outside the valid range of its scale.
    #[error("brightness value {0} is out of range")]
    InvalidBrightness(u16),
}

/// Errors related to parsing device telemetry.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The topic does not belong to the expected namespace.
    #[error("unexpected topic: {0}")]
    UnexpectedTopic(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
