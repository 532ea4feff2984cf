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

#![doc = include_str!("../../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

//! # Layering
//!
//! The crate is organized bottom-up; each layer only knows the one below
//! it:
//!
//! - **[`transport`]**: connector, listener, and link abstractions plus the
//!   in-memory transport used throughout the tests
//! - **[`serialization`]**: the [`Serializer`] boundary and the JSON
//!   reference implementation
//! - **[`message`]**: request, response, and exception-response value types
//! - **[`policy`]**: interface contracts and effective-policy resolution
//! - **[`dispatch`]**: correlation of responses to in-flight calls and
//!   server-side operation dispatch
//! - **[`channel`]**: the direct (fail-fast) and durable (reconnecting)
//!   channel state machines
//! - **[`executor`]**: the one-way and two-way invocation paths
//! - **[`endpoint`]**: client and server assembly of all of the above
//!
//! Start at [`endpoint`] for the assembled API, or at [`executor`] and
//! [`channel`] for the call and reconnection machinery.

pub mod channel;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod executor;
pub mod message;
pub mod policy;
pub mod serialization;
pub mod transport;

pub use channel::{ChannelError, ChannelId, DirectChannel, DurableChannel, OutputChannel};
pub use endpoint::{ClientEndpoint, ServerEndpoint};
pub use error::RpcError;
pub use executor::{CallError, RemoteExecutor};
pub use policy::{ContractBuilder, PolicyRegistry};
pub use serialization::{JsonSerializer, SerializationError, Serializer};
pub use transport::{MemoryNetwork, TransportError};
