// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast channel for animation events.

use tokio::sync::broadcast;

use super::AnimationEvent;

/// Default channel capacity for the event bus.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Fan-out of [`AnimationEvent`]s to any number of subscribers.
///
/// Publishing never blocks an animation. A subscriber that falls more than
/// the channel capacity (default 256) behind loses the oldest events and
/// sees `RecvError::Lagged`.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AnimationEvent>,
}

impl EventBus {
    /// Creates a new event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a bus buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns a receiver for every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AnimationEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event; discarded if nobody listens.
    pub fn publish(&self, event: AnimationEvent) {
        let key = event.key().clone();
        // No subscribers is not an error.
        let receivers = self.sender.send(event).unwrap_or(0);
        tracing::trace!(key = %key, receivers, "Published animation event");
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationId, AnimationKey};

    fn started(key: &str) -> AnimationEvent {
        AnimationEvent::Started {
            key: AnimationKey::new(key),
            id: AnimationId::new(),
            recipe: "pulse",
        }
    }

    #[test]
    fn subscriber_count_follows_receivers() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);

        let rx1 = bus.subscribe();
        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(rx1);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn publish_delivers_to_every_subscriber() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(started("pulse-Desk"));

        assert_eq!(rx1.recv().await.unwrap().key().as_str(), "pulse-Desk");
        assert_eq!(rx2.recv().await.unwrap().key().as_str(), "pulse-Desk");
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_discarded() {
        let bus = EventBus::new();
        bus.publish(started("a"));

        let mut rx = bus.subscribe();
        bus.publish(started("b"));
        assert_eq!(rx.recv().await.unwrap().key().as_str(), "b");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn clone_shares_same_channel() {
        let bus1 = EventBus::with_capacity(8);
        let bus2 = bus1.clone();

        let _rx = bus1.subscribe();
        assert_eq!(bus2.subscriber_count(), 1);
    }

    #[test]
    fn slow_subscriber_lags() {
        let bus = EventBus::with_capacity(2);
        let mut rx = bus.subscribe();
        for key in ["a", "b", "c"] {
            bus.publish(started(key));
        }
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Lagged(1))
        ));
    }
}
