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

//! Transport layer abstractions.
//!
//! Everything above this module talks to peers through message-oriented
//! links:
//!
//! - [`TransportLink`]: a live connection to one peer, split into
//!   [`LinkSender`] and [`LinkReceiver`] halves
//! - [`TransportConnector`]: dials new links, including the redials a
//!   durable channel performs after transport loss
//! - [`MemoryNetwork`]: the in-process implementation, with deterministic
//!   connects and disconnects
//!
//! # Example
//!
//! ```rust
//! use durarpc::transport::{MemoryNetwork, TransportEvent};
//!
//! # async fn example() -> Result<(), durarpc::transport::TransportError> {
//! let network = MemoryNetwork::new();
//! let mut listener = network.listen("echo", 4000)?;
//!
//! let client = network.connect("echo", 4000).await?;
//! let server = listener.accept().await.expect("listener is live");
//!
//! let (tx, _) = client.split();
//! let (_, mut rx) = server.split();
//! tx.send(b"hello".to_vec()).await?;
//! assert_eq!(rx.recv().await, TransportEvent::Data(b"hello".to_vec()));
//! # Ok(())
//! # }
//! ```

mod error;
mod memory;
mod traits;

pub use self::error::TransportError;
pub use self::memory::{MemoryConnector, MemoryListener, MemoryNetwork};
pub use self::traits::{
    LinkReceiver, LinkSender, TransportConnector, TransportEvent, TransportLink,
    TransportListener,
};
