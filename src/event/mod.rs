// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Animation lifecycle notifications.
//!
//! The registry publishes an [`AnimationEvent`] whenever an animation is
//! started, asked to stop, or has finished its loop. Subscribers (a status
//! endpoint, a websocket bridge, tests) receive them through the
//! [`EventBus`], a thin wrapper over tokio's broadcast channel.
//!
//! # Examples
//!
//! ```
//! use lumen_lib::animation::{AnimationId, AnimationKey};
//! use lumen_lib::event::{AnimationEvent, EventBus};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(AnimationEvent::Stopping {
//!     key: AnimationKey::new("pulse-Desk"),
//!     id: AnimationId::new(),
//! });
//! assert_eq!(rx.try_recv().unwrap().key().as_str(), "pulse-Desk");
//! ```

mod animation_event;
mod event_bus;

pub use animation_event::AnimationEvent;
pub use event_bus::EventBus;
