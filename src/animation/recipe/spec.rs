// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serializable recipe selection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::animation::AnimationKey;
use crate::error::AnimationError;
use crate::protocol::DeviceSnapshotProvider;

use super::{
    Breathe, BrightnessSweep, BrightnessWave, Chase, ColorRotation, ColorTempSweep, CyclePlan,
    Cycled, Pulse, RandomBlink, Recipe, Sequential, SynchronizedFlash, Wave, invalid,
};

/// A recipe together with its parameters.
///
/// Serialized with an internal `recipe` tag, so a request body such as
/// `{"recipe": "pulse", "target": "Desk", "cycles": 3}` deserializes
/// directly. Omitted parameters take their documented defaults.
///
/// # Examples
///
/// ```
/// use lumen_lib::animation::RecipeSpec;
/// use serde_json::json;
///
/// let params = json!({"target": "Desk", "cycles": 3});
/// let spec = RecipeSpec::from_params("pulse", params.as_object().unwrap()).unwrap();
/// assert_eq!(spec.name(), "pulse");
/// assert_eq!(spec.default_key().as_str(), "pulse-Desk");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "recipe", rename_all = "snake_case")]
pub enum RecipeSpec {
    /// See [`Pulse`].
    Pulse(Pulse),
    /// See [`Breathe`].
    Breathe(Breathe),
    /// See [`ColorTempSweep`].
    ColorTempSweep(ColorTempSweep),
    /// See [`Sequential`].
    Sequential(Sequential),
    /// See [`RandomBlink`].
    RandomBlink(RandomBlink),
    /// See [`ColorRotation`].
    ColorRotation(ColorRotation),
    /// See [`Wave`].
    Wave(Wave),
    /// See [`Chase`].
    Chase(Chase),
    /// See [`SynchronizedFlash`].
    SynchronizedFlash(SynchronizedFlash),
    /// See [`BrightnessSweep`].
    BrightnessSweep(BrightnessSweep),
    /// See [`BrightnessWave`].
    BrightnessWave(BrightnessWave),
}

impl RecipeSpec {
    /// Every recipe name accepted by [`RecipeSpec::from_params`].
    pub const NAMES: [&'static str; 11] = [
        "pulse",
        "breathe",
        "color_temp_sweep",
        "sequential",
        "random_blink",
        "color_rotation",
        "wave",
        "chase",
        "synchronized_flash",
        "brightness_sweep",
        "brightness_wave",
    ];

    /// Builds a spec from a recipe name and a JSON parameter map.
    ///
    /// The name may be written in `snake_case`, `kebab-case` or `camelCase`.
    ///
    /// # Errors
    ///
    /// Returns `AnimationError::UnknownRecipe` for an unrecognized name and
    /// `AnimationError::InvalidParameter` if the parameters do not fit the
    /// recipe.
    pub fn from_params(recipe: &str, params: &Map<String, Value>) -> Result<Self, AnimationError> {
        let normalized = normalize_name(recipe);
        let Some(name) = Self::NAMES.iter().find(|n| **n == normalized) else {
            return Err(AnimationError::UnknownRecipe(recipe.to_string()));
        };

        let mut object = params.clone();
        object.insert("recipe".to_string(), Value::String((*name).to_string()));
        serde_json::from_value(Value::Object(object)).map_err(|e| invalid(name, e.to_string()))
    }

    /// Returns the recipe name in `snake_case`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pulse(p) => p.name(),
            Self::Breathe(p) => p.name(),
            Self::ColorTempSweep(p) => p.name(),
            Self::Sequential(p) => p.name(),
            Self::RandomBlink(_) => "random_blink",
            Self::ColorRotation(p) => p.name(),
            Self::Wave(p) => p.name(),
            Self::Chase(p) => p.name(),
            Self::SynchronizedFlash(p) => p.name(),
            Self::BrightnessSweep(p) => p.name(),
            Self::BrightnessWave(p) => p.name(),
        }
    }

    /// Returns the single target of a one-target recipe.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Pulse(p) => Some(&p.target),
            Self::Breathe(p) => Some(&p.target),
            Self::ColorTempSweep(p) => Some(&p.target),
            Self::ColorRotation(p) => Some(&p.target),
            Self::SynchronizedFlash(p) => Some(&p.target),
            Self::BrightnessSweep(p) => Some(&p.target),
            Self::Sequential(_)
            | Self::RandomBlink(_)
            | Self::Wave(_)
            | Self::Chase(_)
            | Self::BrightnessWave(_) => None,
        }
    }

    /// Returns the target list of a multi-target recipe.
    #[must_use]
    pub fn targets(&self) -> Option<&[String]> {
        match self {
            Self::Sequential(p) => Some(&p.targets),
            Self::RandomBlink(p) => Some(&p.targets),
            Self::Wave(p) => Some(&p.targets),
            Self::Chase(p) => Some(&p.targets),
            Self::BrightnessWave(p) => Some(&p.targets),
            _ => None,
        }
    }

    /// Returns the conventional registry key, `<recipe-name>-<targets>`.
    #[must_use]
    pub fn default_key(&self) -> AnimationKey {
        let prefix = self.name().replace('_', "-");
        match (self.target(), self.targets()) {
            (Some(target), _) => AnimationKey::for_target(&prefix, target),
            (None, Some(targets)) => AnimationKey::for_targets(&prefix, targets),
            (None, None) => AnimationKey::new(prefix),
        }
    }

    /// Validates the parameters and builds the recipe.
    ///
    /// Multi-target recipes with an empty target list are resolved against
    /// `snapshots`.
    ///
    /// # Errors
    ///
    /// Returns `AnimationError::InvalidParameter` for out-of-range
    /// parameters, `AnimationError::NoTargets` when no target is left and
    /// `AnimationError::TargetNotFound` for unknown random-blink targets.
    pub fn build(
        self,
        snapshots: &dyn DeviceSnapshotProvider,
    ) -> Result<Box<dyn Recipe>, AnimationError> {
        if self.target().is_some_and(str::is_empty) {
            return Err(invalid(self.name(), "target must not be empty"));
        }

        match self {
            Self::Pulse(p) => cycled(p),
            Self::Breathe(p) => cycled(p),
            Self::ColorTempSweep(p) => cycled(p),
            Self::Sequential(mut p) => {
                fill_all_devices(&mut p.targets, snapshots);
                cycled(p)
            }
            Self::RandomBlink(p) => Ok(Box::new(p.into_sequence(snapshots)?)),
            Self::ColorRotation(p) => cycled(p),
            Self::Wave(p) => cycled(p),
            Self::Chase(p) => cycled(p),
            Self::SynchronizedFlash(p) => cycled(p),
            Self::BrightnessSweep(p) => cycled(p),
            Self::BrightnessWave(mut p) => {
                fill_all_devices(&mut p.targets, snapshots);
                cycled(p)
            }
        }
    }
}

/// Replaces an empty target list with every known device.
fn fill_all_devices(targets: &mut Vec<String>, snapshots: &dyn DeviceSnapshotProvider) {
    if targets.is_empty() {
        *targets = snapshots.get_all().into_iter().map(|d| d.name).collect();
    }
}

fn cycled<P: CyclePlan>(plan: P) -> Result<Box<dyn Recipe>, AnimationError> {
    plan.validate()?;
    Ok(Box::new(Cycled::new(plan)))
}

/// Maps `colorTempSweep`, `color-temp-sweep` and `color_temp_sweep` alike.
fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.trim().chars() {
        match c {
            '-' | ' ' => out.push('_'),
            c if c.is_ascii_uppercase() => {
                if !out.is_empty() && !out.ends_with('_') {
                    out.push('_');
                }
                out.push(c.to_ascii_lowercase());
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::animation::recipe::{Outcome, drain};
    use crate::command::Command;
    use crate::protocol::TopicStyle;
    use crate::state::{DeviceSnapshot, SnapshotStore};
    use crate::types::BrightnessScale;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn defaults_fill_missing_parameters() {
        let spec = RecipeSpec::from_params("breathe", &params(json!({"target": "Desk"}))).unwrap();
        assert_eq!(spec, RecipeSpec::Breathe(Breathe::new("Desk")));
    }

    #[test]
    fn name_spellings_are_normalized() {
        let p = params(json!({"target": "Hall"}));
        for name in ["colorTempSweep", "color-temp-sweep", "color_temp_sweep"] {
            let spec = RecipeSpec::from_params(name, &p).unwrap();
            assert_eq!(spec.name(), "color_temp_sweep");
        }
    }

    #[test]
    fn unknown_recipe() {
        let err = RecipeSpec::from_params("disco", &Map::new()).unwrap_err();
        assert_eq!(err, AnimationError::UnknownRecipe("disco".to_string()));
    }

    #[test]
    fn missing_target_is_invalid_parameter() {
        let err = RecipeSpec::from_params("pulse", &Map::new()).unwrap_err();
        assert!(matches!(
            err,
            AnimationError::InvalidParameter { ref recipe, .. } if recipe == "pulse"
        ));
    }

    #[test]
    fn wrong_type_is_invalid_parameter() {
        let err = RecipeSpec::from_params(
            "brightness_sweep",
            &params(json!({"target": "Desk", "step_size": "big"})),
        )
        .unwrap_err();
        assert!(matches!(err, AnimationError::InvalidParameter { .. }));
    }

    #[test]
    fn deserializes_tagged_body() {
        let spec: RecipeSpec = serde_json::from_value(json!({
            "recipe": "breathe",
            "target": "Desk",
            "scale": "byte"
        }))
        .unwrap();
        let RecipeSpec::Breathe(breathe) = spec else {
            panic!("expected breathe");
        };
        assert_eq!(breathe.scale, BrightnessScale::Byte);
    }

    #[test]
    fn default_keys() {
        let pulse = RecipeSpec::Pulse(Pulse::new("LivingRoom"));
        assert_eq!(pulse.default_key().as_str(), "pulse-LivingRoom");

        let wave = RecipeSpec::Wave(Wave::new(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(wave.default_key().as_str(), "wave-a-b");

        let flash = RecipeSpec::SynchronizedFlash(SynchronizedFlash::new("all"));
        assert_eq!(flash.default_key().as_str(), "synchronized-flash-all");

        let sequential = RecipeSpec::Sequential(Sequential::new(Vec::new()));
        assert_eq!(sequential.default_key().as_str(), "sequential");
    }

    #[test]
    fn build_validates() {
        let store = SnapshotStore::new();
        let spec = RecipeSpec::BrightnessSweep(BrightnessSweep {
            step_size: 0,
            ..BrightnessSweep::new("Desk")
        });
        assert!(matches!(
            spec.build(&store),
            Err(AnimationError::InvalidParameter { .. })
        ));

        let spec = RecipeSpec::Pulse(Pulse::new(""));
        assert!(spec.build(&store).is_err());

        let spec = RecipeSpec::Chase(Chase::new(Vec::new()));
        assert_eq!(
            spec.build(&store).err(),
            Some(AnimationError::NoTargets("chase".to_string()))
        );
    }

    #[test]
    fn sequential_without_targets_uses_all_devices() {
        let store = SnapshotStore::new();
        store.upsert(DeviceSnapshot::new("b"));
        store.upsert(DeviceSnapshot::new("a"));

        let spec = RecipeSpec::Sequential(Sequential {
            cycles: 1,
            ..Sequential::new(Vec::new())
        });
        let mut recipe = spec.build(&store).unwrap();
        let targets: Vec<_> = drain(recipe.as_mut())
            .iter()
            .map(|a| a.target().to_string())
            .collect();
        assert_eq!(targets, ["a", "b", "a", "b"]);
    }

    #[test]
    fn brightness_wave_without_targets_uses_all_devices() {
        let store = SnapshotStore::new();
        store.upsert(DeviceSnapshot::new("Hall"));
        store.upsert(DeviceSnapshot::new("Desk"));

        let spec =
            RecipeSpec::from_params("brightnessWave", &params(json!({"cycles": 1}))).unwrap();
        assert_eq!(spec.default_key().as_str(), "brightness-wave");
        let mut recipe = spec.build(&store).unwrap();
        assert_eq!(recipe.name(), "brightness_wave");
        let targets: Vec<_> = drain(recipe.as_mut())
            .iter()
            .map(|a| a.target().to_string())
            .collect();
        assert_eq!(targets, ["Desk", "Hall", "Desk", "Hall"]);
    }

    #[test]
    fn sequential_without_any_device_has_no_targets() {
        let spec = RecipeSpec::Sequential(Sequential::new(Vec::new()));
        assert_eq!(
            spec.build(&SnapshotStore::new()).err(),
            Some(AnimationError::NoTargets("sequential".to_string()))
        );
    }

    #[test]
    fn default_breathe_settles_at_full_zigbee2mqtt_brightness() {
        let spec = RecipeSpec::from_params("breathe", &params(json!({"target": "Desk"}))).unwrap();
        let mut recipe = spec.build(&SnapshotStore::new()).unwrap();
        let settle = recipe.settle(Outcome::Completed);
        assert_eq!(settle.len(), 1);

        let command = settle[0].command;
        let body = TopicStyle::zigbee2mqtt()
            .payload(&command.name(), &command.wire_payload())
            .unwrap();
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body, json!({"state": "ON", "brightness": 254}));
    }
}
