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

//! Transport layer error types.
//!
//! Transport errors are the lowest level of the error hierarchy. A channel
//! above the transport decides whether a given failure triggers
//! reconnection; the transport only reports what happened.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur in the transport layer.
///
/// # Examples
///
/// ```rust
/// use durarpc::transport::TransportError;
///
/// let error = TransportError::ConnectionFailed {
///     address: "server:4000".to_string(),
///     reason: "no listener".to_string(),
/// };
/// assert!(error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to establish a connection to the remote endpoint.
    ///
    /// Connection establishment may be retried, so this error is
    /// recoverable.
    #[error("failed to connect to {address}: {reason}")]
    ConnectionFailed {
        /// The address that failed to connect.
        address: String,
        /// Why the connection could not be established.
        reason: String,
    },

    /// Connection establishment exceeded its time limit.
    #[error("connecting to {address} timed out after {duration:?}")]
    ConnectionTimeout {
        /// The address that failed to connect.
        address: String,
        /// The limit that was exceeded.
        duration: Duration,
    },

    /// Failed to bind a listener to the requested address.
    ///
    /// Typically the address is already in use. Not recoverable.
    #[error("failed to bind listener at {address}: {reason}")]
    BindFailed {
        /// The address that failed to bind.
        address: String,
        /// Why the bind was rejected.
        reason: String,
    },

    /// The link's peer is gone and no further writes are possible.
    #[error("transport link is closed")]
    LinkClosed,
}

impl TransportError {
    /// Returns `true` if this error may succeed on retry.
    ///
    /// Connection failures and timeouts can be retried. A closed link or a
    /// failed bind cannot; the caller must obtain a fresh link or a fresh
    /// address.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::ConnectionTimeout { .. }
        )
    }
}
