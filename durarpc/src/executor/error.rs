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

//! Errors produced by remote invocations.

use crate::message::ExceptionKind;
use crate::policy::PolicyError;
use crate::serialization::SerializationError;
use std::fmt;
use std::time::Duration;

/// Why a remote call failed.
#[derive(Debug)]
pub enum CallError {
    /// The response window elapsed while connectivity was stable.
    Timeout {
        /// Interface the call targeted.
        interface: String,
        /// Method the call targeted.
        method: String,
        /// The effective response deadline that elapsed.
        timeout: Duration,
    },
    /// The channel gave up; the call can never complete.
    ConnectionAborted {
        /// Why the channel is gone.
        reason: String,
    },
    /// The channel was already closed or aborted before the call started.
    NotConnected,
    /// The method is not declared on the interface contract.
    UnknownMethod {
        /// Interface the call targeted.
        interface: String,
        /// The undeclared method name.
        method: String,
    },
    /// The remote side has no handler or no matching method.
    NoSuchOperation {
        /// The remote side's description of what was missing.
        message: String,
    },
    /// The remote handler ran and failed.
    Remote {
        /// Classification reported by the remote side.
        kind: ExceptionKind,
        /// The remote side's description of the failure.
        message: String,
    },
    /// The request or response could not cross the serializer boundary.
    Serialization(SerializationError),
    /// The interface contract could not be resolved.
    Policy(PolicyError),
}

impl CallError {
    /// Returns true if retrying the same call may succeed.
    ///
    /// Only [`CallError::Timeout`] is recoverable; everything else reports
    /// a state the caller must react to first.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout {
                interface,
                method,
                timeout,
            } => write!(
                f,
                "call {interface}.{method} timed out after {timeout:?}"
            ),
            Self::ConnectionAborted { reason } => write!(f, "call aborted: {reason}"),
            Self::NotConnected => f.write_str("channel is not connected"),
            Self::UnknownMethod { interface, method } => write!(
                f,
                "method {method} is not declared on interface {interface}"
            ),
            Self::NoSuchOperation { message } => f.write_str(message),
            Self::Remote { kind, message } => write!(f, "remote {kind}: {message}"),
            Self::Serialization(error) => write!(f, "serialization failed: {error}"),
            Self::Policy(error) => write!(f, "policy resolution failed: {error}"),
        }
    }
}

impl std::error::Error for CallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Serialization(error) => Some(error),
            Self::Policy(error) => Some(error),
            _ => None,
        }
    }
}

impl From<SerializationError> for CallError {
    fn from(error: SerializationError) -> Self {
        Self::Serialization(error)
    }
}

impl From<PolicyError> for CallError {
    fn from(error: PolicyError) -> Self {
        Self::Policy(error)
    }
}
