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

//! In-memory transport implementation.
//!
//! A [`MemoryNetwork`] is a process-local namespace of listeners keyed by
//! `host:port`. It exists for tests and in-process wiring: connections are
//! Tokio channel pairs, disconnects are deterministic (drop the link), and a
//! dropped listener frees its address immediately so "kill the server and
//! bring it back" is a two-line affair.

use super::{TransportConnector, TransportError, TransportLink, TransportListener};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Capacity of each direction of a link's payload pipe.
const LINK_BUFFER: usize = 64;

/// First synthetic port handed to connecting sides.
const EPHEMERAL_BASE: u64 = 49152;

struct ListenerEntry {
    generation: u64,
    tx: mpsc::UnboundedSender<TransportLink>,
}

struct NetworkInner {
    listeners: Mutex<HashMap<(String, u16), ListenerEntry>>,
    next_generation: AtomicU64,
    next_ephemeral: AtomicU64,
}

/// A process-local network of in-memory listeners.
///
/// Cloning is cheap; all clones share one listener namespace.
///
/// # Examples
///
/// ```rust
/// use durarpc::transport::{MemoryNetwork, TransportEvent};
///
/// # async fn example() -> Result<(), durarpc::transport::TransportError> {
/// let network = MemoryNetwork::new();
/// let mut listener = network.listen("server", 4000)?;
///
/// let client_link = network.connect("server", 4000).await?;
/// let server_link = listener.accept().await.expect("listener is live");
///
/// let (tx, _rx) = client_link.split();
/// let (_server_tx, mut server_rx) = server_link.split();
/// tx.send(b"ping".to_vec()).await?;
/// assert_eq!(server_rx.recv().await, TransportEvent::Data(b"ping".to_vec()));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MemoryNetwork {
    inner: Arc<NetworkInner>,
}

impl MemoryNetwork {
    /// Creates an empty network.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(NetworkInner {
                listeners: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(1),
                next_ephemeral: AtomicU64::new(0),
            }),
        }
    }

    /// Registers a listener at `host:port`.
    ///
    /// Registration is synchronous: once this returns, a concurrent
    /// [`connect`](Self::connect) to the same address will reach the new
    /// listener.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::BindFailed`] if the address already has a
    /// live listener.
    pub fn listen(&self, host: &str, port: u16) -> Result<MemoryListener, TransportError> {
        let key = (host.to_string(), port);
        let mut listeners = self.inner.listeners.lock();
        if listeners.contains_key(&key) {
            return Err(TransportError::BindFailed {
                address: format!("{host}:{port}"),
                reason: "address already in use".to_string(),
            });
        }

        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        listeners.insert(key.clone(), ListenerEntry { generation, tx });
        debug!(host, port, "memory listener registered");

        Ok(MemoryListener {
            network: Arc::clone(&self.inner),
            key,
            generation,
            local_addr: synthetic_addr(port),
            rx,
        })
    }

    /// Connects to the listener at `host:port`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ConnectionFailed`] if no live listener is
    /// registered at the address.
    pub async fn connect(&self, host: &str, port: u16) -> Result<TransportLink, TransportError> {
        let refused = || TransportError::ConnectionFailed {
            address: format!("{host}:{port}"),
            reason: "no listener at address".to_string(),
        };

        let (client_to_server_tx, client_to_server_rx) = mpsc::channel(LINK_BUFFER);
        let (server_to_client_tx, server_to_client_rx) = mpsc::channel(LINK_BUFFER);

        let client_addr = self.next_client_addr();
        let listener_addr = synthetic_addr(port);

        let server_link = TransportLink::new(
            client_addr,
            listener_addr,
            server_to_client_tx,
            client_to_server_rx,
        );

        {
            let listeners = self.inner.listeners.lock();
            let entry = listeners
                .get(&(host.to_string(), port))
                .ok_or_else(refused)?;
            entry.tx.send(server_link).map_err(|_| refused())?;
        }
        debug!(host, port, %client_addr, "memory connection established");

        Ok(TransportLink::new(
            listener_addr,
            client_addr,
            client_to_server_tx,
            server_to_client_rx,
        ))
    }

    /// Returns a [`TransportConnector`] backed by this network.
    #[must_use]
    pub fn connector(&self) -> MemoryConnector {
        MemoryConnector {
            network: self.clone(),
        }
    }

    fn next_client_addr(&self) -> SocketAddr {
        let offset = self.inner.next_ephemeral.fetch_add(1, Ordering::Relaxed);
        let port = EPHEMERAL_BASE + (offset % (u64::from(u16::MAX) - EPHEMERAL_BASE));
        synthetic_addr(port as u16)
    }
}

impl Default for MemoryNetwork {
    fn default() -> Self {
        Self::new()
    }
}

/// Addresses in a memory network are synthetic loopback endpoints; only the
/// port is meaningful.
fn synthetic_addr(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

/// Accepts inbound links at one address of a [`MemoryNetwork`].
///
/// Dropping the listener unregisters the address, so a replacement can bind
/// to it right away.
pub struct MemoryListener {
    network: Arc<NetworkInner>,
    key: (String, u16),
    generation: u64,
    local_addr: SocketAddr,
    rx: mpsc::UnboundedReceiver<TransportLink>,
}

impl MemoryListener {
    /// Accepts the next inbound link.
    ///
    /// Returns `None` if the listener has been unregistered out from under
    /// its accept loop, which only happens during network teardown.
    pub async fn accept(&mut self) -> Option<TransportLink> {
        self.rx.recv().await
    }

    /// Returns the synthetic address this listener is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

#[async_trait]
impl TransportListener for MemoryListener {
    async fn accept(&mut self) -> Option<TransportLink> {
        self.rx.recv().await
    }

    fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl Drop for MemoryListener {
    fn drop(&mut self) {
        let mut listeners = self.network.listeners.lock();
        // A replacement listener may already hold this address; only remove
        // our own registration.
        if let Some(entry) = listeners.get(&self.key) {
            if entry.generation == self.generation {
                listeners.remove(&self.key);
                debug!(host = %self.key.0, port = self.key.1, "memory listener unregistered");
            }
        }
    }
}

/// [`TransportConnector`] over a [`MemoryNetwork`].
#[derive(Clone)]
pub struct MemoryConnector {
    network: MemoryNetwork,
}

#[async_trait]
impl TransportConnector for MemoryConnector {
    async fn connect(&self, host: &str, port: u16) -> Result<TransportLink, TransportError> {
        self.network.connect(host, port).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportEvent;

    #[tokio::test]
    async fn test_connect_and_exchange() {
        let network = MemoryNetwork::new();
        let mut listener = network.listen("server", 4000).unwrap();

        let client = network.connect("server", 4000).await.unwrap();
        let server = listener.accept().await.unwrap();

        let (client_tx, mut client_rx) = client.split();
        let (server_tx, mut server_rx) = server.split();

        client_tx.send(b"ping".to_vec()).await.unwrap();
        assert_eq!(
            server_rx.recv().await,
            TransportEvent::Data(b"ping".to_vec())
        );

        server_tx.send(b"pong".to_vec()).await.unwrap();
        assert_eq!(
            client_rx.recv().await,
            TransportEvent::Data(b"pong".to_vec())
        );
    }

    #[tokio::test]
    async fn test_connect_without_listener() {
        let network = MemoryNetwork::new();
        let result = network.connect("nowhere", 9).await;
        assert!(matches!(
            result,
            Err(TransportError::ConnectionFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_double_bind_rejected() {
        let network = MemoryNetwork::new();
        let _listener = network.listen("server", 4000).unwrap();
        assert!(matches!(
            network.listen("server", 4000),
            Err(TransportError::BindFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_rebind_after_drop() {
        let network = MemoryNetwork::new();
        let listener = network.listen("server", 4000).unwrap();
        drop(listener);

        let mut listener = network.listen("server", 4000).unwrap();
        let _client = network.connect("server", 4000).await.unwrap();
        assert!(listener.accept().await.is_some());
    }

    #[tokio::test]
    async fn test_peer_drop_surfaces_disconnect() {
        let network = MemoryNetwork::new();
        let mut listener = network.listen("server", 4000).unwrap();

        let client = network.connect("server", 4000).await.unwrap();
        let server = listener.accept().await.unwrap();
        drop(server);

        let (_client_tx, mut client_rx) = client.split();
        assert!(matches!(
            client_rx.recv().await,
            TransportEvent::Disconnected { .. }
        ));
    }

    #[tokio::test]
    async fn test_distinct_client_addresses() {
        let network = MemoryNetwork::new();
        let mut listener = network.listen("server", 4000).unwrap();

        let _c1 = network.connect("server", 4000).await.unwrap();
        let _c2 = network.connect("server", 4000).await.unwrap();
        let s1 = listener.accept().await.unwrap();
        let s2 = listener.accept().await.unwrap();
        assert_ne!(s1.peer_addr(), s2.peer_addr());
    }

    #[tokio::test]
    async fn test_connector_delegates() {
        let network = MemoryNetwork::new();
        let mut listener = network.listen("server", 4000).unwrap();
        let connector = network.connector();

        let link = connector.connect("server", 4000).await.unwrap();
        assert_eq!(link.peer_addr(), listener.local_addr());
        assert!(listener.accept().await.is_some());
    }
}
