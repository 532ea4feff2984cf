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

//! The inbound message pump shared by both sides of a connection.

use super::{CorrelationRegistry, OperationRegistry};
use crate::message::Message;
use crate::serialization::{SerializationError, Serializer};
use std::sync::Arc;

/// Routes every inbound message to its destination.
///
/// Responses go to the [`CorrelationRegistry`] to wake the waiting call;
/// requests go to the [`OperationRegistry`] and may produce a reply to send
/// back. Both sides of a connection run one of these, which is what makes
/// every endpoint capable of serving calls as well as issuing them.
pub struct MessageDispatcher {
    correlation: Arc<CorrelationRegistry>,
    operations: Arc<OperationRegistry>,
    serializer: Arc<dyn Serializer>,
}

impl MessageDispatcher {
    /// Creates a dispatcher over the given registries and wire format.
    #[must_use]
    pub fn new(
        correlation: Arc<CorrelationRegistry>,
        operations: Arc<OperationRegistry>,
        serializer: Arc<dyn Serializer>,
    ) -> Self {
        Self {
            correlation,
            operations,
            serializer,
        }
    }

    /// Dispatches one decoded message, returning the reply to send back,
    /// if any.
    pub async fn dispatch(&self, message: Message) -> Option<Message> {
        match message {
            Message::Response(response) => {
                self.correlation.dispatch(response).await;
                None
            }
            Message::Request(request) => self
                .operations
                .handle(request)
                .await
                .map(Message::Response),
        }
    }

    /// Decodes and dispatches one wire payload, returning the encoded
    /// reply, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`SerializationError`] if the payload does not decode, or
    /// if the reply does not encode.
    pub async fn dispatch_bytes(
        &self,
        bytes: &[u8],
    ) -> Result<Option<Vec<u8>>, SerializationError> {
        let message = self.serializer.deserialize(bytes)?;
        match self.dispatch(message).await {
            Some(reply) => Ok(Some(self.serializer.serialize(&reply)?)),
            None => Ok(None),
        }
    }
}
