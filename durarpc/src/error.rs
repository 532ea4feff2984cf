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

//! The top-level error type.
//!
//! Each layer has its own error enum; [`RpcError`] composes them so
//! applications that do not care which layer failed can hold one type.
//! `From` impls make `?` flow upward from any layer.
//!
//! # Examples
//!
//! ```rust
//! use durarpc::channel::ChannelError;
//! use durarpc::transport::TransportError;
//! use durarpc::{ChannelId, RpcError};
//!
//! let error: RpcError = TransportError::LinkClosed.into();
//! assert!(error.is_transport());
//!
//! let error: RpcError = ChannelError::Closed {
//!     channel_id: ChannelId::from(1),
//! }
//! .into();
//! assert!(error.is_channel());
//! ```

use crate::channel::ChannelError;
use crate::executor::CallError;
use crate::policy::PolicyError;
use crate::serialization::SerializationError;
use crate::transport::TransportError;
use std::fmt;

/// Any failure the runtime can report.
#[derive(Debug)]
pub enum RpcError {
    /// A connection-level failure.
    Transport(TransportError),
    /// A channel-level failure.
    Channel(ChannelError),
    /// A remote invocation failure.
    Call(CallError),
    /// A wire-format failure.
    Serialization(SerializationError),
    /// An interface contract failure.
    Policy(PolicyError),
}

impl RpcError {
    /// Returns true for connection-level failures.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns true for channel-level failures.
    #[must_use]
    pub const fn is_channel(&self) -> bool {
        matches!(self, Self::Channel(_))
    }

    /// Returns true for invocation failures.
    #[must_use]
    pub const fn is_call(&self) -> bool {
        matches!(self, Self::Call(_))
    }

    /// Returns true if retrying the failed operation may succeed.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Transport(error) => error.is_recoverable(),
            Self::Channel(error) => error.is_recoverable(),
            Self::Call(error) => error.is_recoverable(),
            Self::Serialization(_) | Self::Policy(_) => false,
        }
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(error) => write!(f, "transport error: {error}"),
            Self::Channel(error) => write!(f, "channel error: {error}"),
            Self::Call(error) => write!(f, "call error: {error}"),
            Self::Serialization(error) => write!(f, "serialization error: {error}"),
            Self::Policy(error) => write!(f, "policy error: {error}"),
        }
    }
}

impl std::error::Error for RpcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(error) => Some(error),
            Self::Channel(error) => Some(error),
            Self::Call(error) => Some(error),
            Self::Serialization(error) => Some(error),
            Self::Policy(error) => Some(error),
        }
    }
}

impl From<TransportError> for RpcError {
    fn from(error: TransportError) -> Self {
        Self::Transport(error)
    }
}

impl From<ChannelError> for RpcError {
    fn from(error: ChannelError) -> Self {
        Self::Channel(error)
    }
}

impl From<CallError> for RpcError {
    fn from(error: CallError) -> Self {
        Self::Call(error)
    }
}

impl From<SerializationError> for RpcError {
    fn from(error: SerializationError) -> Self {
        Self::Serialization(error)
    }
}

impl From<PolicyError> for RpcError {
    fn from(error: PolicyError) -> Self {
        Self::Policy(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelId;

    #[test]
    fn test_layer_predicates() {
        let error: RpcError = TransportError::LinkClosed.into();
        assert!(error.is_transport());
        assert!(!error.is_channel());

        let error: RpcError = ChannelError::Closed {
            channel_id: ChannelId::from(1),
        }
        .into();
        assert!(error.is_channel());

        let error: RpcError = CallError::NotConnected.into();
        assert!(error.is_call());
    }

    #[test]
    fn test_recoverability_delegates() {
        let error: RpcError = CallError::Timeout {
            interface: "I".to_string(),
            method: "M".to_string(),
            timeout: std::time::Duration::from_secs(1),
        }
        .into();
        assert!(error.is_recoverable());

        let error: RpcError = ChannelError::NotConnected {
            channel_id: ChannelId::from(1),
        }
        .into();
        assert!(!error.is_recoverable());
    }
}
