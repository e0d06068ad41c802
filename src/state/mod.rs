// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Last known device state.
//!
//! [`DeviceSnapshot`] is the read-only view recipes consult (for example to
//! know which lights are currently on before toggling them).
//! [`SnapshotStore`] is an in-memory
//! [`DeviceSnapshotProvider`](crate::protocol::DeviceSnapshotProvider) kept
//! current from Zigbee2MQTT telemetry.
//!
//! # Examples
//!
//! ```
//! use lumen_lib::protocol::DeviceSnapshotProvider;
//! use lumen_lib::state::{DeviceSnapshot, SnapshotStore};
//!
//! let store = SnapshotStore::new();
//! store.upsert(DeviceSnapshot::new("Desk").with_on(true));
//!
//! assert!(store.get("Desk").unwrap().is_on);
//! ```

mod snapshot;
mod store;

pub use snapshot::DeviceSnapshot;
pub use store::SnapshotStore;
