// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry of running animations.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::command::{Command, DeviceCommand};
use crate::error::{AnimationError, SendError};
use crate::event::{AnimationEvent, EventBus};
use crate::protocol::{DeviceCommandSink, DeviceSnapshotProvider};
use crate::state::SnapshotStore;

use super::config::RunnerConfig;
use super::recipe::{Recipe, RecipeSpec};
use super::runner::{AnimationRunner, send_bounded};
use super::{AnimationId, AnimationKey};

/// Lifecycle of a registered animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationState {
    /// The loop is emitting steps.
    Running,
    /// Stop was requested; the loop has not exited yet.
    Cancelling,
    /// The loop has exited and the key is free again.
    Finished,
}

/// A point-in-time view of one registered animation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnimationInfo {
    /// Registry key.
    pub key: AnimationKey,
    /// Run identity.
    pub id: AnimationId,
    /// Recipe name.
    pub recipe: &'static str,
    /// Current state.
    pub state: AnimationState,
    /// When the animation was registered.
    pub started_at: DateTime<Utc>,
}

/// Returned by a successful start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Started {
    /// The key the animation is registered under.
    pub key: AnimationKey,
    /// Identity of this particular run.
    pub id: AnimationId,
}

struct AnimationHandle {
    id: AnimationId,
    recipe: &'static str,
    cancel: CancellationToken,
    state: AnimationState,
    started_at: DateTime<Utc>,
}

impl AnimationHandle {
    fn info(&self, key: &AnimationKey) -> AnimationInfo {
        AnimationInfo {
            key: key.clone(),
            id: self.id,
            recipe: self.recipe,
            state: self.state,
            started_at: self.started_at,
        }
    }
}

struct RegistryInner {
    sink: Arc<dyn DeviceCommandSink>,
    snapshots: Arc<dyn DeviceSnapshotProvider>,
    config: RunnerConfig,
    handles: Mutex<HashMap<AnimationKey, AnimationHandle>>,
    events: EventBus,
}

impl RegistryInner {
    /// Frees `key` if it still belongs to run `id`.
    fn deregister(&self, key: &AnimationKey, id: AnimationId) -> bool {
        let mut handles = self.handles.lock();
        if handles.get(key).is_some_and(|h| h.id == id) {
            handles.remove(key);
            true
        } else {
            false
        }
    }
}

/// Removes the registry entry when the runner task ends, even by panic.
struct Registration {
    inner: Arc<RegistryInner>,
    key: AnimationKey,
    id: AnimationId,
}

impl Drop for Registration {
    fn drop(&mut self) {
        if self.inner.deregister(&self.key, self.id) {
            tracing::trace!(key = %self.key, id = %self.id, "Animation deregistered");
        }
    }
}

/// Owns every running animation, keyed by [`AnimationKey`].
///
/// Starting an animation registers a handle and spawns its loop on the
/// Tokio runtime; the key stays taken until the loop has exited. Stopping
/// only requests cancellation: the loop notices at its next step boundary,
/// sends the recipe's settle commands and then frees the key.
///
/// Cheap to clone; clones share the same animations.
///
/// # Examples
///
/// ```no_run
/// # async fn example(sink: std::sync::Arc<dyn lumen_lib::protocol::DeviceCommandSink>) -> lumen_lib::Result<()> {
/// use lumen_lib::animation::AnimationRegistry;
/// use serde_json::json;
///
/// let registry = AnimationRegistry::new(sink);
///
/// let params = json!({"target": "LivingRoom", "cycles": 3});
/// let started = registry.start("pulse-LivingRoom", "pulse", params.as_object().unwrap())?;
/// assert!(registry.is_any_running());
///
/// registry.stop(started.key.as_str());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AnimationRegistry {
    inner: Arc<RegistryInner>,
}

impl AnimationRegistry {
    /// Creates a registry sending through `sink`, with no known devices.
    #[must_use]
    pub fn new(sink: Arc<dyn DeviceCommandSink>) -> Self {
        Self::builder(sink).build()
    }

    /// Returns a builder for a registry sending through `sink`.
    #[must_use]
    pub fn builder(sink: Arc<dyn DeviceCommandSink>) -> AnimationRegistryBuilder {
        AnimationRegistryBuilder::new(sink)
    }

    /// Returns a receiver for lifecycle events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AnimationEvent> {
        self.inner.events.subscribe()
    }

    /// Starts recipe `recipe` with JSON `params` under `key`.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `AnimationError::AlreadyRunning` if `key` is taken, or any
    /// error from [`RecipeSpec::from_params`] and [`RecipeSpec::build`].
    pub fn start(
        &self,
        key: impl Into<AnimationKey>,
        recipe: &str,
        params: &Map<String, Value>,
    ) -> Result<Started, AnimationError> {
        let spec = RecipeSpec::from_params(recipe, params)?;
        self.start_spec(key, spec)
    }

    /// Starts a recipe spec under `key`.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `AnimationError::AlreadyRunning` if `key` is taken, or any
    /// error from [`RecipeSpec::build`].
    pub fn start_spec(
        &self,
        key: impl Into<AnimationKey>,
        spec: RecipeSpec,
    ) -> Result<Started, AnimationError> {
        let key = key.into();
        // Fail fast on a taken key before touching the snapshot provider.
        if self.inner.handles.lock().contains_key(&key) {
            return Err(AnimationError::AlreadyRunning(key.to_string()));
        }
        let recipe = spec.build(self.inner.snapshots.as_ref())?;
        self.start_recipe(key, recipe)
    }

    /// Starts an already built recipe under `key`.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `AnimationError::AlreadyRunning` if `key` is taken.
    pub fn start_recipe(
        &self,
        key: impl Into<AnimationKey>,
        recipe: Box<dyn Recipe>,
    ) -> Result<Started, AnimationError> {
        let key = key.into();
        let id = AnimationId::new();
        let cancel = CancellationToken::new();
        let recipe_name = recipe.name();

        {
            let mut handles = self.inner.handles.lock();
            if handles.contains_key(&key) {
                tracing::warn!(key = %key, "Animation already running");
                return Err(AnimationError::AlreadyRunning(key.to_string()));
            }
            handles.insert(
                key.clone(),
                AnimationHandle {
                    id,
                    recipe: recipe_name,
                    cancel: cancel.clone(),
                    state: AnimationState::Running,
                    started_at: Utc::now(),
                },
            );
        }

        tracing::info!(key = %key, id = %id, recipe = recipe_name, "Animation started");
        self.inner.events.publish(AnimationEvent::Started {
            key: key.clone(),
            id,
            recipe: recipe_name,
        });

        let registration = Registration {
            inner: Arc::clone(&self.inner),
            key: key.clone(),
            id,
        };
        let runner = AnimationRunner::new(
            key.clone(),
            Arc::clone(&self.inner.sink),
            cancel,
            self.inner.config,
        );
        tokio::spawn(async move {
            let report = runner.run(recipe).await;
            let inner = Arc::clone(&registration.inner);
            let key = registration.key.clone();
            drop(registration);
            tracing::info!(
                key = %key,
                id = %id,
                outcome = ?report.outcome,
                sent = report.sent,
                failed = report.failed,
                "Animation finished"
            );
            inner
                .events
                .publish(AnimationEvent::Finished { key, id, report });
        });

        Ok(Started { key, id })
    }

    /// Requests cancellation of the animation under `key`.
    ///
    /// Returns `true` if a live animation was found. The key stays taken
    /// until the loop has exited.
    pub fn stop(&self, key: &str) -> bool {
        let mut handles = self.inner.handles.lock();
        let Some(handle) = handles.get_mut(key) else {
            tracing::debug!(key, "No animation to stop");
            return false;
        };
        handle.cancel.cancel();
        if handle.state == AnimationState::Running {
            handle.state = AnimationState::Cancelling;
            tracing::info!(key, id = %handle.id, "Stopping animation");
            self.inner.events.publish(AnimationEvent::Stopping {
                key: AnimationKey::from(key),
                id: handle.id,
            });
        }
        true
    }

    /// Like [`stop`](Self::stop), but reports an unknown key as an error.
    ///
    /// # Errors
    ///
    /// Returns `AnimationError::NotFound` if nothing runs under `key`.
    pub fn try_stop(&self, key: &str) -> Result<(), AnimationError> {
        if self.stop(key) {
            Ok(())
        } else {
            Err(AnimationError::NotFound(key.to_string()))
        }
    }

    /// Cancels every animation and clears the registry immediately.
    ///
    /// Loops may still be sending their settle commands when this returns.
    pub fn stop_all(&self) {
        let drained: Vec<_> = self.inner.handles.lock().drain().collect();
        if drained.is_empty() {
            return;
        }
        tracing::info!(count = drained.len(), "Stopping all animations");
        for (key, handle) in drained {
            handle.cancel.cancel();
            if handle.state == AnimationState::Running {
                self.inner.events.publish(AnimationEvent::Stopping {
                    key,
                    id: handle.id,
                });
            }
        }
    }

    /// Returns the keys of all registered animations, sorted.
    ///
    /// May include animations that are in the middle of stopping.
    #[must_use]
    pub fn list_running(&self) -> Vec<AnimationKey> {
        let mut keys: Vec<_> = self.inner.handles.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Returns `true` if any animation is registered.
    #[must_use]
    pub fn is_any_running(&self) -> bool {
        !self.inner.handles.lock().is_empty()
    }

    /// Returns the state of `key`; unknown keys report `Finished`.
    #[must_use]
    pub fn state(&self, key: &str) -> AnimationState {
        self.inner
            .handles
            .lock()
            .get(key)
            .map_or(AnimationState::Finished, |h| h.state)
    }

    /// Returns details about the animation under `key`.
    #[must_use]
    pub fn info(&self, key: &str) -> Option<AnimationInfo> {
        let handles = self.inner.handles.lock();
        handles
            .get_key_value(key)
            .map(|(key, handle)| handle.info(key))
    }

    /// Returns details about every registered animation, sorted by key.
    #[must_use]
    pub fn infos(&self) -> Vec<AnimationInfo> {
        let mut infos: Vec<_> = self
            .inner
            .handles
            .lock()
            .iter()
            .map(|(key, handle)| handle.info(key))
            .collect();
        infos.sort_by(|a, b| a.key.cmp(&b.key));
        infos
    }

    /// Sends a single command to `target`, outside of any animation.
    ///
    /// # Errors
    ///
    /// Returns the sink's `SendError`, or `SendError::Timeout`.
    pub async fn send<C: Command + Sync + ?Sized>(
        &self,
        target: &str,
        command: &C,
    ) -> Result<(), SendError> {
        tracing::debug!(target, command = %command.name(), "Sending direct command");
        send_bounded(
            self.inner.sink.as_ref(),
            self.inner.config.send_timeout,
            target,
            command,
        )
        .await
    }

    /// Stops every animation, then switches `target` off.
    ///
    /// # Errors
    ///
    /// Returns the error of the final power-off send.
    pub async fn emergency_stop(&self, target: &str) -> Result<(), SendError> {
        tracing::warn!(target, "Emergency stop");
        self.stop_all();
        self.send(target, &DeviceCommand::off()).await
    }
}

impl std::fmt::Debug for AnimationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationRegistry")
            .field("running", &self.list_running())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`AnimationRegistry`].
pub struct AnimationRegistryBuilder {
    sink: Arc<dyn DeviceCommandSink>,
    snapshots: Option<Arc<dyn DeviceSnapshotProvider>>,
    config: RunnerConfig,
    event_capacity: Option<usize>,
}

impl AnimationRegistryBuilder {
    fn new(sink: Arc<dyn DeviceCommandSink>) -> Self {
        Self {
            sink,
            snapshots: None,
            config: RunnerConfig::default(),
            event_capacity: None,
        }
    }

    /// Sets where recipes look up devices. Defaults to an empty store.
    #[must_use]
    pub fn snapshot_provider(mut self, snapshots: Arc<dyn DeviceSnapshotProvider>) -> Self {
        self.snapshots = Some(snapshots);
        self
    }

    /// Sets the runner configuration.
    #[must_use]
    pub fn config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the per-subscriber event buffer size.
    #[must_use]
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = Some(capacity);
        self
    }

    /// Builds the registry.
    #[must_use]
    pub fn build(self) -> AnimationRegistry {
        let snapshots = self
            .snapshots
            .unwrap_or_else(|| Arc::new(SnapshotStore::new()));
        let events = self
            .event_capacity
            .map_or_else(EventBus::new, EventBus::with_capacity);
        AnimationRegistry {
            inner: Arc::new(RegistryInner {
                sink: self.sink,
                snapshots,
                config: self.config,
                handles: Mutex::new(HashMap::new()),
                events,
            }),
        }
    }
}
