// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory snapshot provider.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::protocol::DeviceSnapshotProvider;
use crate::telemetry::{DeviceStateReport, TelemetryMessage};

use super::DeviceSnapshot;

/// Thread-safe store of device snapshots, keyed by device name.
///
/// Cheap to clone; clones share the same underlying map. Writers are the
/// telemetry handler (or tests), readers are recipes resolving targets.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    devices: Arc<RwLock<BTreeMap<String, DeviceSnapshot>>>,
}

impl SnapshotStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a snapshot.
    pub fn upsert(&self, snapshot: DeviceSnapshot) {
        self.devices.write().insert(snapshot.name.clone(), snapshot);
    }

    /// Removes a device, returning its last snapshot.
    pub fn remove(&self, name: &str) -> Option<DeviceSnapshot> {
        self.devices.write().remove(name)
    }

    /// Returns the number of known devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    /// Returns `true` if no device is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }

    /// Applies a state report to `name`, creating the device if unknown.
    ///
    /// Returns `true` if the stored snapshot changed.
    pub fn apply_report(&self, name: &str, report: &DeviceStateReport) -> bool {
        let mut devices = self.devices.write();
        match devices.get_mut(name) {
            Some(snapshot) => snapshot.apply(report),
            None => {
                let mut snapshot = DeviceSnapshot::new(name);
                snapshot.apply(report);
                devices.insert(name.to_string(), snapshot);
                true
            }
        }
    }

    /// Folds a parsed telemetry message into the store.
    ///
    /// Device lists add controllable devices that are not yet known and
    /// leave existing snapshots untouched. Returns `true` if anything changed.
    pub fn ingest(&self, message: &TelemetryMessage) -> bool {
        match message {
            TelemetryMessage::DeviceList(list) => {
                let mut devices = self.devices.write();
                let mut changed = false;
                for device in list.iter().filter(|d| d.is_controllable()) {
                    if !devices.contains_key(&device.friendly_name) {
                        tracing::debug!(device = %device.friendly_name, "Discovered device");
                        devices.insert(
                            device.friendly_name.clone(),
                            DeviceSnapshot::new(device.friendly_name.clone()),
                        );
                        changed = true;
                    }
                }
                changed
            }
            TelemetryMessage::State { device, state } => {
                if state.is_empty() {
                    tracing::trace!(device = %device, "Ignoring report without state fields");
                    return false;
                }
                self.apply_report(device, state)
            }
        }
    }
}

impl DeviceSnapshotProvider for SnapshotStore {
    fn get_all(&self) -> Vec<DeviceSnapshot> {
        self.devices.read().values().cloned().collect()
    }

    fn get(&self, name: &str) -> Option<DeviceSnapshot> {
        self.devices.read().get(name).cloned()
    }
}
