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

//! The outbound channel surface shared by direct and durable channels.

use super::epoch::EpochWaiter;
use super::events::ChannelEvent;
use super::{ChannelError, ChannelId};
use async_trait::async_trait;
use std::fmt;
use tokio::sync::broadcast;

/// Connection state of a channel, as observed by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Never opened, or gracefully closed.
    Closed,
    /// Connected; sends transmit immediately.
    Open,
    /// Transport loss detected; reconnection not yet started.
    Interrupted,
    /// Reconnection attempts in progress; sends are queued.
    Reconnecting,
    /// Reconnection given up; sends fail with `NotConnected`.
    Aborted,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::Interrupted => "interrupted",
            Self::Reconnecting => "reconnecting",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// What happened to a payload handed to [`OutputChannel::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The payload was written to the live transport.
    Delivered,
    /// The channel is mid-reconnect; the payload was queued and will be
    /// replayed in order on restoration.
    Queued,
}

impl SendOutcome {
    /// Returns true if the payload reached the transport immediately.
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// The outbound side of a channel, as seen by the invocation pipeline.
///
/// Both the non-durable [`DirectChannel`](super::DirectChannel) and the
/// reconnecting [`DurableChannel`](super::DurableChannel) implement this
/// trait, so the executors are written once against it.
#[async_trait]
pub trait OutputChannel: Send + Sync + 'static {
    /// Returns this channel's identifier.
    fn id(&self) -> ChannelId;

    /// Returns true if this channel survives transport loss by queueing
    /// and reconnecting.
    fn is_durable(&self) -> bool;

    /// Returns the channel's current connection status.
    fn status(&self) -> ConnectionStatus;

    /// Sends an already-serialized message.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::NotConnected`] after an abort,
    /// [`ChannelError::Closed`] after a graceful close, and
    /// [`ChannelError::TransportFailed`] when a non-durable channel's
    /// transport rejects the write.
    async fn send(&self, data: Vec<u8>) -> Result<SendOutcome, ChannelError>;

    /// Closes the channel gracefully. Idempotent; in-flight calls are
    /// released and later sends fail with [`ChannelError::Closed`].
    fn close(&self);

    /// Subscribes to the channel's cancellation epoch.
    fn epoch_waiter(&self) -> EpochWaiter;

    /// Subscribes to lifecycle events.
    fn subscribe_events(&self) -> broadcast::Receiver<ChannelEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(ConnectionStatus::Open.to_string(), "open");
        assert_eq!(ConnectionStatus::Reconnecting.to_string(), "reconnecting");
    }

    #[test]
    fn test_send_outcome_predicates() {
        assert!(SendOutcome::Delivered.is_delivered());
        assert!(!SendOutcome::Queued.is_delivered());
    }
}
