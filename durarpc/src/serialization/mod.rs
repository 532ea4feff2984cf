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

//! Serialization layer for durarpc.
//!
//! Every message crossing a transport is encoded through a pluggable
//! [`Serializer`]. The runtime never looks at wire bytes itself, so the
//! format can be swapped without touching channels, dispatch, or the
//! executors.
//!
//! # Overview
//!
//! - **[`Serializer`] trait**: object-safe abstraction over wire formats
//! - **[`JsonSerializer`]**: the built-in, human-readable reference format
//! - **[`SerializationError`]**: the error type for both directions
//!
//! # Example
//!
//! ```rust
//! use durarpc::message::{Message, ResponseMessage};
//! use durarpc::serialization::{JsonSerializer, Serializer};
//! use serde_json::json;
//!
//! # fn example() -> Result<(), durarpc::serialization::SerializationError> {
//! let serializer = JsonSerializer::new();
//! let message = Message::Response(ResponseMessage::value(42, json!("ok")));
//!
//! let bytes = serializer.serialize(&message)?;
//! assert_eq!(serializer.deserialize(&bytes)?, message);
//! # Ok(())
//! # }
//! ```

mod error;
mod json;
mod traits;

pub use error::SerializationError;
pub use json::JsonSerializer;
pub use traits::Serializer;
