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

//! Serialization trait definitions.
//!
//! The core is wire-format agnostic: every message crossing a transport goes
//! through a [`Serializer`], and implementations decide the byte
//! representation. The trait is object safe so channels and dispatchers can
//! hold `Arc<dyn Serializer>`.

use super::SerializationError;
use crate::message::Message;

/// Encodes and decodes [`Message`] values for the wire.
///
/// # Examples
///
/// ```rust
/// use durarpc::message::{DefaultMessageFactory, Message, MessageFactory};
/// use durarpc::serialization::{JsonSerializer, Serializer};
///
/// # fn example() -> Result<(), durarpc::serialization::SerializationError> {
/// let serializer = JsonSerializer::new();
/// let factory = DefaultMessageFactory;
/// let request = Message::Request(factory.request(1, "IEcho", "Echo", vec![], true));
///
/// let bytes = serializer.serialize(&request)?;
/// let decoded = serializer.deserialize(&bytes)?;
/// assert_eq!(request, decoded);
/// # Ok(())
/// # }
/// ```
pub trait Serializer: Send + Sync + 'static {
    /// Encodes a message to bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`SerializationError`] if the message cannot be encoded.
    fn serialize(&self, message: &Message) -> Result<Vec<u8>, SerializationError>;

    /// Decodes a message from bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`SerializationError`] if the bytes are not a valid
    /// message in this format.
    fn deserialize(&self, bytes: &[u8]) -> Result<Message, SerializationError>;

    /// Returns the name of this format, used for logging.
    fn name(&self) -> &'static str;
}
