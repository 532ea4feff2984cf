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

//! The durable channel.
//!
//! A [`DurableChannel`] survives transport loss. When its link dies, the
//! channel moves to `Interrupted`, bumps its epoch so in-flight calls can
//! resend, and runs a reconnection loop driven by a
//! [`PausedConnectionHandler`]. Payloads sent while disconnected are queued
//! and replayed in order once a new link is up. Only handler abort,
//! attempt exhaustion, or an explicit [`close`](DurableChannel::close)
//! ends the channel.

use super::epoch::{Epoch, EpochWaiter};
use super::events::{ChannelEvent, EventBus};
use super::output::{ConnectionStatus, OutputChannel, SendOutcome};
use super::{ChannelError, ChannelId};
use crate::transport::{
    LinkReceiver, LinkSender, TransportConnector, TransportError, TransportEvent,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

/// Capacity of the inbound payload queue handed to the reader.
const INBOUND_BUFFER: usize = 256;

/// Tunables for the reconnection loop.
#[derive(Debug, Clone)]
pub struct DurableChannelConfig {
    /// How many consecutive failed connection attempts the channel
    /// tolerates before aborting.
    pub retry_attempts: u32,
    /// Upper bound on a single connection attempt.
    pub connect_timeout: Duration,
}

impl Default for DurableChannelConfig {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// What a [`PausedConnectionHandler`] tells an interrupted channel to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PausedDirective {
    /// Dial the given address for the next attempt.
    Reconnect {
        /// Host to dial.
        host: String,
        /// Port to dial.
        port: u16,
    },
    /// Give up. The channel aborts.
    Abort,
}

/// Decides, per failed attempt, where an interrupted channel reconnects.
///
/// The handler runs between attempts, so it can also pace the loop by
/// sleeping before it returns, or redirect the channel to a fallback
/// address.
#[async_trait]
pub trait PausedConnectionHandler: Send + Sync + 'static {
    /// Called after the transport is lost and before every reconnection
    /// attempt. `failed_attempts` counts the attempts that have already
    /// failed in this interruption, starting at zero.
    async fn on_connection_paused(&self, failed_attempts: u32) -> PausedDirective;
}

/// The simplest handler: always reconnect to one fixed address.
#[derive(Debug, Clone)]
pub struct ReconnectSameAddress {
    host: String,
    port: u16,
}

impl ReconnectSameAddress {
    /// Creates a handler pinned to `host:port`.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

#[async_trait]
impl PausedConnectionHandler for ReconnectSameAddress {
    async fn on_connection_paused(&self, _failed_attempts: u32) -> PausedDirective {
        PausedDirective::Reconnect {
            host: self.host.clone(),
            port: self.port,
        }
    }
}

struct DurableState {
    id: ChannelId,
    status: parking_lot::RwLock<ConnectionStatus>,
    sender: parking_lot::RwLock<Option<LinkSender>>,
    pending: tokio::sync::Mutex<VecDeque<Vec<u8>>>,
    has_pending: AtomicBool,
    graceful_closing: AtomicBool,
    epoch: Epoch,
    events: EventBus,
    config: DurableChannelConfig,
    connector: Arc<dyn TransportConnector>,
    paused_handler: Arc<dyn PausedConnectionHandler>,
}

impl DurableState {
    fn abort(&self, reason: &str) {
        *self.status.write() = ConnectionStatus::Aborted;
        *self.sender.write() = None;
        error!(channel_id = %self.id, %reason, "durable channel aborted");
        self.events.publish(ChannelEvent::Aborted {
            reason: reason.to_string(),
        });
        self.epoch.abort();
    }
}

/// A channel that reconnects through transport loss.
///
/// Sends made while the channel is between links return
/// [`SendOutcome::Queued`] and are replayed in order after restoration.
/// Inbound payloads flow through the receiver returned by
/// [`take_inbound`](Self::take_inbound).
pub struct DurableChannel {
    state: Arc<DurableState>,
    inbound: parking_lot::Mutex<Option<mpsc::Receiver<Vec<u8>>>>,
}

impl DurableChannel {
    /// Connects to `host:port` and starts the channel supervisor.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ConnectionTimeout`] if the initial attempt
    /// outlives `config.connect_timeout`, or the connector's error if the
    /// dial itself fails. Later reconnects never surface here; they go
    /// through the [`PausedConnectionHandler`].
    pub async fn connect(
        host: &str,
        port: u16,
        connector: Arc<dyn TransportConnector>,
        paused_handler: Arc<dyn PausedConnectionHandler>,
        config: DurableChannelConfig,
    ) -> Result<Self, TransportError> {
        let link = match tokio::time::timeout(config.connect_timeout, connector.connect(host, port))
            .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(TransportError::ConnectionTimeout {
                    address: format!("{host}:{port}"),
                    duration: config.connect_timeout,
                })
            }
        };

        let id = ChannelId::new();
        let (sender, receiver) = link.split();
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_BUFFER);

        let state = Arc::new(DurableState {
            id,
            status: parking_lot::RwLock::new(ConnectionStatus::Open),
            sender: parking_lot::RwLock::new(Some(sender)),
            pending: tokio::sync::Mutex::new(VecDeque::new()),
            has_pending: AtomicBool::new(false),
            graceful_closing: AtomicBool::new(false),
            epoch: Epoch::new(),
            events: EventBus::new(id),
            config,
            connector,
            paused_handler,
        });

        info!(channel_id = %id, %host, port, "durable channel opened");
        tokio::spawn(Self::supervise(Arc::clone(&state), receiver, inbound_tx));

        Ok(Self {
            state,
            inbound: parking_lot::Mutex::new(Some(inbound_rx)),
        })
    }

    /// Takes the inbound payload receiver. Yields `Some` exactly once.
    #[must_use]
    pub fn take_inbound(&self) -> Option<mpsc::Receiver<Vec<u8>>> {
        self.inbound.lock().take()
    }

    async fn supervise(
        state: Arc<DurableState>,
        mut receiver: LinkReceiver,
        inbound_tx: mpsc::Sender<Vec<u8>>,
    ) {
        loop {
            // Read phase: pump the live link until it dies.
            let reason = loop {
                match receiver.recv().await {
                    TransportEvent::Data(data) => {
                        if inbound_tx.send(data).await.is_err() {
                            debug!(channel_id = %state.id, "inbound consumer gone; stopping supervisor");
                            return;
                        }
                    }
                    TransportEvent::Disconnected { reason } => break reason,
                }
            };

            if state.graceful_closing.load(Ordering::SeqCst) {
                return;
            }

            *state.status.write() = ConnectionStatus::Interrupted;
            *state.sender.write() = None;
            info!(channel_id = %state.id, %reason, "durable channel interrupted");
            state.events.publish(ChannelEvent::Interrupted);
            state.epoch.bump();
            *state.status.write() = ConnectionStatus::Reconnecting;

            match Self::reconnect(&state).await {
                Some(new_receiver) => receiver = new_receiver,
                None => return,
            }
        }
    }

    /// Runs the reconnection loop. Returns the new link's receiver on
    /// success, or `None` once the channel has aborted or closed.
    async fn reconnect(state: &Arc<DurableState>) -> Option<LinkReceiver> {
        let mut failed_attempts: u32 = 0;

        loop {
            if state.graceful_closing.load(Ordering::SeqCst) {
                return None;
            }
            if failed_attempts >= state.config.retry_attempts {
                state.abort("reconnection attempts exhausted");
                return None;
            }

            let (host, port) = match state
                .paused_handler
                .on_connection_paused(failed_attempts)
                .await
            {
                PausedDirective::Reconnect { host, port } => (host, port),
                PausedDirective::Abort => {
                    state.abort("reconnection aborted by handler");
                    return None;
                }
            };

            if state.graceful_closing.load(Ordering::SeqCst) {
                return None;
            }

            let attempt = tokio::time::timeout(
                state.config.connect_timeout,
                state.connector.connect(&host, port),
            )
            .await;

            let link = match attempt {
                Ok(Ok(link)) => link,
                Ok(Err(error)) => {
                    failed_attempts += 1;
                    warn!(
                        channel_id = %state.id, %host, port, failed_attempts, %error,
                        "reconnection attempt failed"
                    );
                    continue;
                }
                Err(_) => {
                    failed_attempts += 1;
                    warn!(
                        channel_id = %state.id, %host, port, failed_attempts,
                        "reconnection attempt timed out"
                    );
                    continue;
                }
            };

            let (sender, new_receiver) = link.split();

            // Restoration order matters: the sender is installed and the
            // status flipped to Open while the pending lock is held, so a
            // sender blocked on that lock can never enqueue into a queue
            // the drain below has already finished with.
            {
                let mut pending = state.pending.lock().await;
                *state.sender.write() = Some(sender.clone());
                *state.status.write() = ConnectionStatus::Open;

                while let Some(payload) = pending.pop_front() {
                    if let Err(payload) = sender.send_reclaim(payload).await {
                        pending.push_front(payload);
                        break;
                    }
                }
                state
                    .has_pending
                    .store(!pending.is_empty(), Ordering::SeqCst);
            }

            info!(channel_id = %state.id, %host, port, "durable channel restored");
            state.events.publish(ChannelEvent::Restored);
            state.epoch.bump();
            return Some(new_receiver);
        }
    }
}

#[async_trait]
impl OutputChannel for DurableChannel {
    fn id(&self) -> ChannelId {
        self.state.id
    }

    fn is_durable(&self) -> bool {
        true
    }

    fn status(&self) -> ConnectionStatus {
        *self.state.status.read()
    }

    async fn send(&self, data: Vec<u8>) -> Result<SendOutcome, ChannelError> {
        match *self.state.status.read() {
            ConnectionStatus::Closed => {
                return Err(ChannelError::Closed {
                    channel_id: self.state.id,
                })
            }
            ConnectionStatus::Aborted => {
                return Err(ChannelError::NotConnected {
                    channel_id: self.state.id,
                })
            }
            _ => {}
        }

        let mut data = data;

        // Fast path: open with an empty queue means in-order delivery is
        // safe without touching the pending lock.
        if *self.state.status.read() == ConnectionStatus::Open
            && !self.state.has_pending.load(Ordering::SeqCst)
        {
            let sender = self.state.sender.read().clone();
            if let Some(sender) = sender {
                match sender.send_reclaim(data).await {
                    Ok(()) => return Ok(SendOutcome::Delivered),
                    Err(reclaimed) => data = reclaimed,
                }
            }
        }

        // Slow path: serialize against the restoration drain.
        let mut pending = self.state.pending.lock().await;
        let status = *self.state.status.read();
        match status {
            ConnectionStatus::Closed => {
                return Err(ChannelError::Closed {
                    channel_id: self.state.id,
                })
            }
            ConnectionStatus::Aborted => {
                return Err(ChannelError::NotConnected {
                    channel_id: self.state.id,
                })
            }
            ConnectionStatus::Open if pending.is_empty() => {
                let sender = self.state.sender.read().clone();
                if let Some(sender) = sender {
                    match sender.send_reclaim(data).await {
                        Ok(()) => return Ok(SendOutcome::Delivered),
                        // The link died under us; the supervisor will
                        // notice. Queue for the next link.
                        Err(reclaimed) => pending.push_back(reclaimed),
                    }
                } else {
                    pending.push_back(data);
                }
            }
            _ => pending.push_back(data),
        }
        self.state.has_pending.store(true, Ordering::SeqCst);
        Ok(SendOutcome::Queued)
    }

    // Queued payloads are discarded on close; durability covers transport
    // loss, not caller-initiated shutdown.
    fn close(&self) {
        if self.state.graceful_closing.swap(true, Ordering::SeqCst) {
            return;
        }
        *self.state.status.write() = ConnectionStatus::Closed;
        *self.state.sender.write() = None;
        info!(channel_id = %self.state.id, "durable channel closed");
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
