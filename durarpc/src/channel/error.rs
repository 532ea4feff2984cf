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

//! Error types for the channel layer.

use super::ChannelId;
use std::fmt;

/// Errors that can occur in the channel layer.
///
/// Channel errors are terminal for the call that observes them. A durable
/// channel absorbs transient transport loss internally (queueing instead of
/// failing), so the only errors it surfaces are post-abort and post-close
/// conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The channel aborted reconnection and no longer accepts data.
    ///
    /// Raised by `send` after the reconnection loop exhausted its attempts
    /// or the application callback requested an abort.
    NotConnected {
        /// The ID of the aborted channel.
        channel_id: ChannelId,
    },

    /// The channel was gracefully closed by the caller.
    Closed {
        /// The ID of the closed channel.
        channel_id: ChannelId,
    },

    /// The underlying transport rejected a send while the channel believed
    /// the connection was active.
    ///
    /// On a non-durable channel this is fatal to the call in flight. On a
    /// durable channel the data is re-queued instead and this error is not
    /// surfaced.
    TransportFailed {
        /// The ID of the channel.
        channel_id: ChannelId,
        /// A description of the underlying failure.
        reason: String,
    },
}

impl ChannelError {
    /// Returns true if this error is recoverable.
    ///
    /// All channel errors indicate a permanently unusable channel, so none
    /// of them are retryable on the same channel.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        false
    }

    /// Returns true if this error indicates the channel no longer accepts
    /// sends (aborted or closed).
    #[must_use]
    pub const fn is_not_connected(&self) -> bool {
        matches!(self, Self::NotConnected { .. } | Self::Closed { .. })
    }

    /// Returns the channel ID associated with this error.
    #[must_use]
    pub const fn channel_id(&self) -> ChannelId {
        match self {
            Self::NotConnected { channel_id }
            | Self::Closed { channel_id }
            | Self::TransportFailed { channel_id, .. } => *channel_id,
        }
    }
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected { channel_id } => {
                write!(f, "Channel {} is not connected", channel_id)
            }
            Self::Closed { channel_id } => {
                write!(f, "Channel {} is closed", channel_id)
            }
            Self::TransportFailed { channel_id, reason } => {
                write!(f, "Transport send failed on channel {}: {}", channel_id, reason)
            }
        }
    }
}

impl std::error::Error for ChannelError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_not_connected() {
        let not_connected = ChannelError::NotConnected {
            channel_id: ChannelId::from(1),
        };
        assert!(not_connected.is_not_connected());

        let failed = ChannelError::TransportFailed {
            channel_id: ChannelId::from(1),
            reason: "peer closed".to_string(),
        };
        assert!(!failed.is_not_connected());
    }

    #[test]
    fn test_error_channel_id() {
        let closed = ChannelError::Closed {
            channel_id: ChannelId::from(42),
        };
        assert_eq!(closed.channel_id(), ChannelId::from(42));
    }

    #[test]
    fn test_error_display() {
        let not_connected = ChannelError::NotConnected {
            channel_id: ChannelId::from(1),
        };
        assert_eq!(
            format!("{}", not_connected),
            "Channel Channel(1) is not connected"
        );

        let failed = ChannelError::TransportFailed {
            channel_id: ChannelId::from(1),
            reason: "peer closed".to_string(),
        };
        assert!(format!("{}", failed).contains("peer closed"));
    }

    #[test]
    fn test_error_not_recoverable() {
        let closed = ChannelError::Closed {
            channel_id: ChannelId::from(1),
        };
        assert!(!closed.is_recoverable());
    }
}
