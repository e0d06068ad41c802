// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Animation identifiers.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller-chosen name of a running animation.
///
/// Conventionally `<recipe-name>-<target>` or `<recipe-name>-<t1>-<t2>-...`.
/// The registry holds at most one live animation per key.
///
/// # Examples
///
/// ```
/// use lumen_lib::animation::AnimationKey;
///
/// let key = AnimationKey::for_target("pulse", "LivingRoom");
/// assert_eq!(key.as_str(), "pulse-LivingRoom");
///
/// let targets = ["devA", "devB", "devC"];
/// assert_eq!(AnimationKey::for_targets("wave", &targets).as_str(), "wave-devA-devB-devC");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimationKey(String);

impl AnimationKey {
    /// Wraps an arbitrary key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Builds `<recipe>-<target>`.
    #[must_use]
    pub fn for_target(recipe: &str, target: &str) -> Self {
        Self(format!("{recipe}-{target}"))
    }

    /// Builds `<recipe>-<t1>-<t2>-...`, or just `<recipe>` without targets.
    #[must_use]
    pub fn for_targets<S: AsRef<str>>(recipe: &str, targets: &[S]) -> Self {
        let mut key = recipe.to_string();
        for target in targets {
            key.push('-');
            key.push_str(target.as_ref());
        }
        Self(key)
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnimationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AnimationKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for AnimationKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl Borrow<str> for AnimationKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AnimationKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Unique identity of one animation run.
///
/// Two runs started under the same [`AnimationKey`] (one after the other)
/// always have different ids, which is how a finishing runner recognises
/// whether the registry entry is still its own.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimationId(Uuid);

impl AnimationId {
    /// Creates a new unique identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AnimationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = &self.0.to_string()[..8];
        write!(f, "AnimationId({short}...)")
    }
}

impl fmt::Display for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
