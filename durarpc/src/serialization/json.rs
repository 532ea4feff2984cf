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

//! JSON serializer implementation.
//!
//! The reference wire format. Human-readable, cross-language, and easy to
//! inspect in logs; binary formats can be substituted through the
//! [`Serializer`] trait without touching the core.

use super::{SerializationError, Serializer};
use crate::message::Message;

/// JSON serializer.
///
/// # Examples
///
/// ```rust
/// use durarpc::message::{Message, ResponseMessage};
/// use durarpc::serialization::{JsonSerializer, Serializer};
/// use serde_json::json;
///
/// # fn example() -> Result<(), durarpc::serialization::SerializationError> {
/// let serializer = JsonSerializer::new();
/// let message = Message::Response(ResponseMessage::value(1, json!(5)));
///
/// let bytes = serializer.serialize(&message)?;
/// let decoded = serializer.deserialize(&bytes)?;
/// assert_eq!(message, decoded);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct JsonSerializer {
    _private: (),
}

impl JsonSerializer {
    /// Creates a new JSON serializer producing compact output.
    #[must_use]
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Serializer for JsonSerializer {
    fn serialize(&self, message: &Message) -> Result<Vec<u8>, SerializationError> {
        serde_json::to_vec(message).map_err(Into::into)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Message, SerializationError> {
        serde_json::from_slice(bytes).map_err(Into::into)
    }

    fn name(&self) -> &'static str {
        "json"
    }
}
