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

//! The non-durable channel.
//!
//! A direct channel wraps one transport link for its whole life. Transport
//! loss is terminal: the channel aborts, waiters are released, and callers
//! must open a new channel. This is the fail-fast counterpart to
//! [`DurableChannel`](super::DurableChannel).

use super::epoch::{Epoch, EpochWaiter};
use super::events::{ChannelEvent, EventBus};
use super::output::{ConnectionStatus, OutputChannel, SendOutcome};
use super::{ChannelError, ChannelId};
use crate::transport::{LinkSender, TransportEvent, TransportLink};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};

/// Capacity of the inbound payload queue handed to the reader.
const INBOUND_BUFFER: usize = 256;

struct DirectState {
    id: ChannelId,
    status: RwLock<ConnectionStatus>,
    sender: LinkSender,
    epoch: Epoch,
    events: EventBus,
    graceful_closing: AtomicBool,
}

/// A channel bound to a single transport link, with no reconnection.
///
/// Inbound payloads are delivered through the receiver returned by
/// [`take_inbound`](Self::take_inbound); the owning endpoint drains it in
/// its reader loop.
pub struct DirectChannel {
    state: Arc<DirectState>,
    inbound: Mutex<Option<mpsc::Receiver<Vec<u8>>>>,
}

impl DirectChannel {
    /// Wraps an established transport link.
    #[must_use]
    pub fn new(link: TransportLink) -> Self {
        let id = ChannelId::new();
        let (sender, receiver) = link.split();
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_BUFFER);

        let state = Arc::new(DirectState {
            id,
            status: RwLock::new(ConnectionStatus::Open),
            sender,
            epoch: Epoch::new(),
            events: EventBus::new(id),
            graceful_closing: AtomicBool::new(false),
        });

        info!(channel_id = %id, "direct channel opened");
        tokio::spawn(Self::supervise(Arc::clone(&state), receiver, inbound_tx));

        Self {
            state,
            inbound: Mutex::new(Some(inbound_rx)),
        }
    }

    /// Takes the inbound payload receiver. Yields `Some` exactly once.
    #[must_use]
    pub fn take_inbound(&self) -> Option<mpsc::Receiver<Vec<u8>>> {
        self.inbound.lock().take()
    }

    async fn supervise(
        state: Arc<DirectState>,
        mut receiver: crate::transport::LinkReceiver,
        inbound_tx: mpsc::Sender<Vec<u8>>,
    ) {
        loop {
            match receiver.recv().await {
                TransportEvent::Data(data) => {
                    if inbound_tx.send(data).await.is_err() {
                        debug!(channel_id = %state.id, "inbound consumer gone; stopping reader");
                        return;
                    }
                }
                TransportEvent::Disconnected { reason } => {
                    if state.graceful_closing.load(Ordering::SeqCst) {
                        return;
                    }
                    *state.status.write() = ConnectionStatus::Aborted;
                    info!(channel_id = %state.id, %reason, "direct channel lost its transport");
                    state.events.publish(ChannelEvent::Aborted { reason });
                    state.epoch.abort();
                    return;
                }
            }
        }
    }
}

#[async_trait]
impl OutputChannel for DirectChannel {
    fn id(&self) -> ChannelId {
        self.state.id
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn status(&self) -> ConnectionStatus {
        *self.state.status.read()
    }

    async fn send(&self, data: Vec<u8>) -> Result<SendOutcome, ChannelError> {
        match *self.state.status.read() {
            ConnectionStatus::Open => {}
            ConnectionStatus::Closed => return Err(ChannelError::Closed {
                channel_id: self.state.id,
            }),
            _ => return Err(ChannelError::NotConnected {
                channel_id: self.state.id,
            }),
        }

        self.state.sender.send(data).await.map_err(|error| {
            ChannelError::TransportFailed {
                channel_id: self.state.id,
                reason: error.to_string(),
            }
        })?;
        Ok(SendOutcome::Delivered)
    }

    fn close(&self) {
        if self.state.graceful_closing.swap(true, Ordering::SeqCst) {
            return;
        }
        *self.state.status.write() = ConnectionStatus::Closed;
        info!(channel_id = %self.state.id, "direct channel closed");
        self.state.events.publish(ChannelEvent::Closed);
        self.state.epoch.abort();
    }

    fn epoch_waiter(&self) -> EpochWaiter {
        self.state.epoch.subscribe()
    }

    fn subscribe_events(&self) -> broadcast::Receiver<ChannelEvent> {
        self.state.events.subscribe()
    }
}
