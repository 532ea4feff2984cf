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

//! Core transport abstractions.
//!
//! A [`TransportLink`] is a message-oriented, bi-directional pipe to one
//! peer. Channels split a link into its [`LinkSender`] and [`LinkReceiver`]
//! halves so writes and reads live in different tasks. New links come from a
//! [`TransportConnector`] on the client side and from a listener's accept
//! loop on the server side.
//!
//! Links carry whole payloads, not byte streams. Framing is the transport
//! implementation's concern, which keeps the channel layer free of read
//! buffers and length prefixes.

use super::TransportError;
use async_trait::async_trait;
use std::net::SocketAddr;
use tokio::sync::mpsc;

/// What a [`LinkReceiver`] yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A payload arrived from the peer.
    Data(Vec<u8>),
    /// The link is gone. No further [`TransportEvent::Data`] will follow.
    Disconnected {
        /// Why the link ended.
        reason: String,
    },
}

/// The write half of a [`TransportLink`].
#[derive(Debug, Clone)]
pub struct LinkSender {
    tx: mpsc::Sender<Vec<u8>>,
}

impl LinkSender {
    /// Sends one payload to the peer.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::LinkClosed`] if the peer is gone.
    pub async fn send(&self, data: Vec<u8>) -> Result<(), TransportError> {
        self.tx
            .send(data)
            .await
            .map_err(|_| TransportError::LinkClosed)
    }

    /// Sends one payload, handing it back if the peer is gone.
    ///
    /// Callers that buffer undeliverable payloads use this to avoid
    /// cloning on the happy path.
    pub async fn send_reclaim(&self, data: Vec<u8>) -> Result<(), Vec<u8>> {
        match self.tx.reserve().await {
            Ok(permit) => {
                permit.send(data);
                Ok(())
            }
            Err(_) => Err(data),
        }
    }

    /// Returns true if the peer has gone away.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// The read half of a [`TransportLink`].
#[derive(Debug)]
pub struct LinkReceiver {
    rx: mpsc::Receiver<Vec<u8>>,
    disconnected: bool,
}

impl LinkReceiver {
    /// Receives the next event from the peer.
    ///
    /// Once the peer goes away this yields a single
    /// [`TransportEvent::Disconnected`] and keeps yielding it on every
    /// subsequent call, so a read loop can treat it as terminal without
    /// risking a hang.
    pub async fn recv(&mut self) -> TransportEvent {
        if self.disconnected {
            return TransportEvent::Disconnected {
                reason: "peer closed".to_string(),
            };
        }
        match self.rx.recv().await {
            Some(data) => TransportEvent::Data(data),
            None => {
                self.disconnected = true;
                TransportEvent::Disconnected {
                    reason: "peer closed".to_string(),
                }
            }
        }
    }
}

/// A live, message-oriented connection to one peer.
#[derive(Debug)]
pub struct TransportLink {
    peer_addr: SocketAddr,
    local_addr: SocketAddr,
    sender: LinkSender,
    receiver: LinkReceiver,
}

impl TransportLink {
    /// Assembles a link from its parts.
    ///
    /// Transport implementations call this after wiring the two payload
    /// pipes to the peer.
    #[must_use]
    pub fn new(
        peer_addr: SocketAddr,
        local_addr: SocketAddr,
        tx: mpsc::Sender<Vec<u8>>,
        rx: mpsc::Receiver<Vec<u8>>,
    ) -> Self {
        Self {
            peer_addr,
            local_addr,
            sender: LinkSender { tx },
            receiver: LinkReceiver {
                rx,
                disconnected: false,
            },
        }
    }

    /// Returns the peer's address.
    #[must_use]
    pub const fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Returns this side's address.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Splits the link into its send and receive halves.
    #[must_use]
    pub fn split(self) -> (LinkSender, LinkReceiver) {
        (self.sender, self.receiver)
    }
}

/// Establishes outbound links.
///
/// A durable channel holds a connector so it can dial the same, or a
/// redirected, address again after transport loss.
#[async_trait]
pub trait TransportConnector: Send + Sync + 'static {
    /// Connects to a listener at `host:port`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ConnectionFailed`] if no listener is
    /// reachable at the address.
    async fn connect(&self, host: &str, port: u16) -> Result<TransportLink, TransportError>;
}

/// Accepts inbound links on the server side.
#[async_trait]
pub trait TransportListener: Send + 'static {
    /// Accepts the next inbound link.
    ///
    /// Returns `None` once the listener is gone; an accept loop treats that
    /// as shutdown.
    async fn accept(&mut self) -> Option<TransportLink>;

    /// Returns the address the listener is bound to.
    fn local_addr(&self) -> SocketAddr;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    fn link_pair() -> (TransportLink, TransportLink) {
        let (tx_a, rx_a) = mpsc::channel(8);
        let (tx_b, rx_b) = mpsc::channel(8);
        let a = TransportLink::new(addr(2), addr(1), tx_a, rx_b);
        let b = TransportLink::new(addr(1), addr(2), tx_b, rx_a);
        (a, b)
    }

    #[tokio::test]
    async fn test_link_round_trip() {
        let (a, b) = link_pair();
        let (a_tx, _a_rx) = a.split();
        let (_b_tx, mut b_rx) = b.split();

        a_tx.send(b"hello".to_vec()).await.unwrap();
        assert_eq!(b_rx.recv().await, TransportEvent::Data(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn test_receiver_reports_disconnect() {
        let (a, b) = link_pair();
        let (_b_tx, mut b_rx) = b.split();
        drop(a);

        let event = b_rx.recv().await;
        assert!(matches!(event, TransportEvent::Disconnected { .. }));

        // Terminal: every subsequent recv repeats the disconnect.
        let event = b_rx.recv().await;
        assert!(matches!(event, TransportEvent::Disconnected { .. }));
    }

    #[tokio::test]
    async fn test_sender_fails_after_peer_drop() {
        let (a, b) = link_pair();
        let (a_tx, _a_rx) = a.split();
        drop(b);

        let result = a_tx.send(b"late".to_vec()).await;
        assert!(matches!(result, Err(TransportError::LinkClosed)));
        assert!(a_tx.is_closed());
    }

    #[test]
    fn test_link_addresses() {
        let (a, _b) = link_pair();
        assert_eq!(a.peer_addr(), addr(2));
        assert_eq!(a.local_addr(), addr(1));
    }
}
