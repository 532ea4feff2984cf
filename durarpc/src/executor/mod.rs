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

//! The invocation layer.
//!
//! A [`RemoteExecutor`] turns `(interface, method, args)` triples into wire
//! traffic on one channel. Each call's effective policy is resolved first,
//! then the call is routed down one of two paths:
//!
//! - one-way: fire and forget, no correlation entry, no waiting;
//! - two-way: correlation entry, send, and a wait that survives durable
//!   reconnection by re-sending once per restored connection.
//!
//! The executor is channel-agnostic through [`OutputChannel`] and
//! format-agnostic through [`Serializer`], so the same invocation logic
//! serves direct and durable channels alike.

mod error;
mod one_way;
mod two_way;

pub use self::error::CallError;

use crate::channel::OutputChannel;
use crate::dispatch::{CorrelationIdGenerator, CorrelationRegistry};
use crate::message::{DefaultMessageFactory, MessageFactory};
use crate::policy::{PolicyRegistry, ReturnMode};
use crate::serialization::Serializer;
use std::sync::Arc;

/// Routes remote calls over one channel according to resolved policy.
pub struct RemoteExecutor {
    channel: Arc<dyn OutputChannel>,
    correlation: Arc<CorrelationRegistry>,
    ids: Arc<CorrelationIdGenerator>,
    policies: Arc<PolicyRegistry>,
    serializer: Arc<dyn Serializer>,
    factory: Arc<dyn MessageFactory>,
    activation_mode: ReturnMode,
}

impl RemoteExecutor {
    /// Creates an executor over `channel`.
    ///
    /// `activation_mode` is the default return mode for methods that
    /// declare no return value and carry no forced mode.
    #[must_use]
    pub fn new(
        channel: Arc<dyn OutputChannel>,
        correlation: Arc<CorrelationRegistry>,
        ids: Arc<CorrelationIdGenerator>,
        policies: Arc<PolicyRegistry>,
        serializer: Arc<dyn Serializer>,
        activation_mode: ReturnMode,
    ) -> Self {
        Self {
            channel,
            correlation,
            ids,
            policies,
            serializer,
            factory: Arc::new(DefaultMessageFactory),
            activation_mode,
        }
    }

    /// Replaces the message factory.
    #[must_use]
    pub fn with_message_factory(mut self, factory: Arc<dyn MessageFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Invokes `interface.method` with `args`.
    ///
    /// One-way methods return `Value::Null` as soon as the request is handed
    /// to the channel. Two-way methods block until a response, an abort, or
    /// the method's effective timeout.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::Policy`] or [`CallError::UnknownMethod`] when
    /// the target cannot be resolved, and the two-way failure modes
    /// otherwise. See [`CallError`].
    pub async fn invoke(
        &self,
        interface: &str,
        method: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, CallError> {
        let policy = self
            .policies
            .resolve_method(interface, method, self.activation_mode)?
            .ok_or_else(|| CallError::UnknownMethod {
                interface: interface.to_string(),
                method: method.to_string(),
            })?;

        match policy.return_mode {
            ReturnMode::OneWay => {
                one_way::invoke(self, interface, method, args).await;
                Ok(serde_json::Value::Null)
            }
            ReturnMode::TwoWay => two_way::invoke(self, interface, method, args, &policy).await,
        }
    }
}
