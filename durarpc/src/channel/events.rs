//
// Copyright 2026 The durarpc Authors. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Channel lifecycle events.
//!
//! Application code observes channel health through a broadcast
//! subscription. Publishing never blocks the state machine: slow or absent
//! subscribers miss events rather than stalling reconnection.

use super::ChannelId;
use tokio::sync::broadcast;

/// Default capacity of the per-channel event buffer.
const EVENT_BUFFER: usize = 32;

/// Lifecycle notifications emitted by a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The transport connection was lost; reconnection is starting.
    Interrupted,
    /// Reconnection succeeded and queued data was replayed.
    Restored,
    /// Reconnection was given up; the channel is permanently unusable.
    Aborted {
        /// Why the channel aborted.
        reason: String,
    },
    /// The caller closed the channel gracefully.
    Closed,
}

/// Broadcast publisher for channel lifecycle events.
#[derive(Debug)]
pub struct EventBus {
    channel_id: ChannelId,
    tx: broadcast::Sender<ChannelEvent>,
}

impl EventBus {
    /// Creates an event bus for the given channel.
    #[must_use]
    pub fn new(channel_id: ChannelId) -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER);
        Self { channel_id, tx }
    }

    /// Creates a new subscription receiving events published after this
    /// call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ChannelEvent> {
        self.tx.subscribe()
    }

    /// Publishes an event without blocking.
    ///
    /// Events published with no active subscribers are discarded.
    pub fn publish(&self, event: ChannelEvent) {
        tracing::debug!(channel_id = %self.channel_id, event = ?event, "Channel event");
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_events() {
        let bus = EventBus::new(ChannelId::new());
        let mut rx = bus.subscribe();

        bus.publish(ChannelEvent::Interrupted);
        bus.publish(ChannelEvent::Restored);

        assert_eq!(rx.recv().await.unwrap(), ChannelEvent::Interrupted);
        assert_eq!(rx.recv().await.unwrap(), ChannelEvent::Restored);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_does_not_block() {
        let bus = EventBus::new(ChannelId::new());
        bus.publish(ChannelEvent::Closed);
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_events() {
        let bus = EventBus::new(ChannelId::new());
        bus.publish(ChannelEvent::Interrupted);

        let mut rx = bus.subscribe();
        bus.publish(ChannelEvent::Restored);

        assert_eq!(rx.recv().await.unwrap(), ChannelEvent::Restored);
    }
}
