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

//! Channel layer: ordered payload pipes over a transport.
//!
//! A channel owns a transport link and turns link failures into channel
//! semantics. Two flavors exist:
//!
//! - [`DirectChannel`]: fail-fast. Transport loss aborts the channel.
//! - [`DurableChannel`]: reconnecting. Transport loss pauses the channel,
//!   queues outbound payloads, and replays them once a new link is up.
//!
//! Both implement [`OutputChannel`], so the invocation layer is agnostic
//! to durability. Consumers observe lifecycle transitions through
//! [`ChannelEvent`] broadcasts and through the channel's [`Epoch`], a
//! monotonic counter that advances on every interruption and restoration
//! so in-flight calls know when to resend.
//!
//! # Example
//!
//! ```rust
//! use durarpc::channel::{
//!     DurableChannel, DurableChannelConfig, OutputChannel, ReconnectSameAddress,
//! };
//! use durarpc::transport::MemoryNetwork;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let network = MemoryNetwork::new();
//! let mut listener = network.listen("server", 4000)?;
//!
//! let channel = DurableChannel::connect(
//!     "server",
//!     4000,
//!     Arc::new(network.connector()),
//!     Arc::new(ReconnectSameAddress::new("server", 4000)),
//!     DurableChannelConfig::default(),
//! )
//! .await?;
//! let _server_link = listener.accept().await.unwrap();
//!
//! let outcome = channel.send(b"ping".to_vec()).await?;
//! assert!(outcome.is_delivered());
//! # Ok(())
//! # }
//! ```

mod direct;
mod durable;
mod epoch;
mod error;
mod events;
mod id;
mod output;

pub use self::direct::DirectChannel;
pub use self::durable::{
    DurableChannel, DurableChannelConfig, PausedConnectionHandler, PausedDirective,
    ReconnectSameAddress,
};
pub use self::epoch::{Epoch, EpochState, EpochWaiter};
pub use self::error::ChannelError;
pub use self::events::{ChannelEvent, EventBus};
pub use self::id::ChannelId;
pub use self::output::{ConnectionStatus, OutputChannel, SendOutcome};
