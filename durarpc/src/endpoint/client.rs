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

//! The calling side of an RPC endpoint.

use crate::channel::{
    ChannelEvent, ChannelId, ConnectionStatus, DirectChannel, DurableChannel,
    DurableChannelConfig, OutputChannel, PausedConnectionHandler,
};
use crate::dispatch::{CorrelationIdGenerator, CorrelationRegistry};
use crate::executor::{CallError, RemoteExecutor};
use crate::message::Message;
use crate::policy::{PolicyRegistry, ReturnMode};
use crate::serialization::Serializer;
use crate::transport::{TransportConnector, TransportError};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

/// Issues remote calls over one channel.
///
/// The endpoint owns the channel, the correlation registry, and a
/// [`RemoteExecutor`], and wires them together: inbound responses complete
/// waiting calls, and a channel abort fails every call still in flight on
/// it.
pub struct ClientEndpoint {
    channel: Arc<dyn OutputChannel>,
    correlation: Arc<CorrelationRegistry>,
    executor: Arc<RemoteExecutor>,
}

impl ClientEndpoint {
    /// Connects a fail-fast endpoint. Transport loss aborts every
    /// in-flight call; the endpoint cannot be reused afterwards.
    ///
    /// # Errors
    ///
    /// Returns the connector's error if no listener is reachable.
    pub async fn connect_direct(
        host: &str,
        port: u16,
        connector: Arc<dyn TransportConnector>,
        policies: Arc<PolicyRegistry>,
        serializer: Arc<dyn Serializer>,
    ) -> Result<Self, TransportError> {
        let link = connector.connect(host, port).await?;
        let channel = DirectChannel::new(link);
        let inbound = channel
            .take_inbound()
            .unwrap_or_else(|| unreachable!("fresh channel always has its inbound receiver"));
        Ok(Self::assemble(Arc::new(channel), inbound, policies, serializer))
    }

    /// Connects a durable endpoint that survives transport loss.
    ///
    /// # Errors
    ///
    /// Returns the connector's error, or
    /// [`TransportError::ConnectionTimeout`], if the initial connection
    /// cannot be established. Later losses go through `paused_handler`
    /// instead of surfacing here.
    pub async fn connect_durable(
        host: &str,
        port: u16,
        connector: Arc<dyn TransportConnector>,
        paused_handler: Arc<dyn PausedConnectionHandler>,
        config: DurableChannelConfig,
        policies: Arc<PolicyRegistry>,
        serializer: Arc<dyn Serializer>,
    ) -> Result<Self, TransportError> {
        let channel =
            DurableChannel::connect(host, port, connector, paused_handler, config).await?;
        let inbound = channel
            .take_inbound()
            .unwrap_or_else(|| unreachable!("fresh channel always has its inbound receiver"));
        Ok(Self::assemble(Arc::new(channel), inbound, policies, serializer))
    }

    fn assemble(
        channel: Arc<dyn OutputChannel>,
        inbound: mpsc::Receiver<Vec<u8>>,
        policies: Arc<PolicyRegistry>,
        serializer: Arc<dyn Serializer>,
    ) -> Self {
        let correlation = Arc::new(CorrelationRegistry::new());
        let executor = Arc::new(RemoteExecutor::new(
            Arc::clone(&channel),
            Arc::clone(&correlation),
            Arc::new(CorrelationIdGenerator::new()),
            policies,
            Arc::clone(&serializer),
            ReturnMode::TwoWay,
        ));

        tokio::spawn(Self::pump_inbound(
            inbound,
            serializer,
            Arc::clone(&correlation),
        ));
        tokio::spawn(Self::bridge_aborts(
            channel.subscribe_events(),
            channel.id(),
            Arc::clone(&correlation),
        ));

        Self {
            channel,
            correlation,
            executor,
        }
    }

    /// Invokes `interface.method` with `args` under its resolved policy.
    ///
    /// # Errors
    ///
    /// See [`CallError`].
    pub async fn invoke(
        &self,
        interface: &str,
        method: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, CallError> {
        self.executor.invoke(interface, method, args).await
    }

    /// Returns the underlying executor for callers that hold it directly.
    #[must_use]
    pub fn executor(&self) -> Arc<RemoteExecutor> {
        Arc::clone(&self.executor)
    }

    /// Returns the channel's identifier.
    #[must_use]
    pub fn channel_id(&self) -> ChannelId {
        self.channel.id()
    }

    /// Returns the channel's current connection status.
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.channel.status()
    }

    /// Subscribes to the channel's lifecycle events.
    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<ChannelEvent> {
        self.channel.subscribe_events()
    }

    /// Returns the number of calls currently waiting for responses.
    pub async fn pending_calls(&self) -> usize {
        self.correlation.pending_count().await
    }

    /// Closes the endpoint's channel gracefully.
    pub fn close(&self) {
        self.channel.close();
    }

    /// Forwards inbound payloads to the correlation registry.
    async fn pump_inbound(
        mut inbound: mpsc::Receiver<Vec<u8>>,
        serializer: Arc<dyn Serializer>,
        correlation: Arc<CorrelationRegistry>,
    ) {
        while let Some(bytes) = inbound.recv().await {
            match serializer.deserialize(&bytes) {
                Ok(Message::Response(response)) => {
                    correlation.dispatch(response).await;
                }
                Ok(Message::Request(request)) => {
                    debug!(
                        interface = %request.interface,
                        method = %request.method,
                        "calling endpoint received a request; dropped"
                    );
                }
                Err(error) => {
                    warn!(%error, "undecodable payload dropped");
                }
            }
        }
    }

    /// Fails in-flight calls once the channel is terminally gone.
    ///
    /// The executors also observe the abort through the epoch; delivering
    /// abort responses here is what unblocks calls that are between
    /// select iterations when the channel dies.
    async fn bridge_aborts(
        mut events: broadcast::Receiver<ChannelEvent>,
        channel_id: ChannelId,
        correlation: Arc<CorrelationRegistry>,
    ) {
        loop {
            match events.recv().await {
                Ok(ChannelEvent::Aborted { reason }) => {
                    correlation
                        .dispatch_abort_responses_for(channel_id, &reason)
                        .await;
                    return;
                }
                Ok(ChannelEvent::Closed) => {
                    correlation
                        .dispatch_abort_responses_for(channel_id, "channel closed")
                        .await;
                    return;
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => return,
            }
        }
    }
}
