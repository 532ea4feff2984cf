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

//! The serving side of an RPC endpoint.

use crate::dispatch::{CorrelationRegistry, MessageDispatcher, OperationHandler, OperationRegistry};
use crate::message::Message;
use crate::policy::{PolicyRegistry, ReturnMode};
use crate::serialization::Serializer;
use crate::transport::{TransportEvent, TransportLink, TransportListener};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Accepts links and serves registered operation handlers over them.
///
/// One reader loop runs per accepted link. Each request is dispatched on
/// its own task so a slow handler never stalls the link's reader, and the
/// reply travels back over the same link.
pub struct ServerEndpoint {
    operations: Arc<OperationRegistry>,
    policies: Arc<PolicyRegistry>,
    serializer: Arc<dyn Serializer>,
    dispatcher: Arc<MessageDispatcher>,
}

impl ServerEndpoint {
    /// Creates a server endpoint with no handlers registered yet.
    ///
    /// `policies` drives sender-endpoint injection: methods whose effective
    /// policy requires the endpoint get the peer address appended to their
    /// arguments. Interfaces absent from the registry are served without
    /// injection.
    #[must_use]
    pub fn new(policies: Arc<PolicyRegistry>, serializer: Arc<dyn Serializer>) -> Self {
        let operations = Arc::new(OperationRegistry::new());
        let correlation = Arc::new(CorrelationRegistry::new());
        let dispatcher = Arc::new(MessageDispatcher::new(
            correlation,
            Arc::clone(&operations),
            Arc::clone(&serializer),
        ));
        Self {
            operations,
            policies,
            serializer,
            dispatcher,
        }
    }

    /// Registers a handler for its interface. A repeated registration
    /// replaces the previous handler.
    pub fn register_handler(&self, handler: Arc<dyn OperationHandler>) {
        self.operations.register(handler);
    }

    /// Accepts links until the listener is gone.
    ///
    /// Spawn this on its own task; it runs for the listener's lifetime.
    pub async fn serve<L: TransportListener>(self: Arc<Self>, mut listener: L) {
        info!(address = %listener.local_addr(), "server endpoint accepting links");
        while let Some(link) = listener.accept().await {
            debug!(peer = %link.peer_addr(), "link accepted");
            tokio::spawn(Arc::clone(&self).run_link(link));
        }
        info!("server endpoint listener gone; accept loop ending");
    }

    async fn run_link(self: Arc<Self>, link: TransportLink) {
        let peer = link.peer_addr();
        let (tx, mut rx) = link.split();

        loop {
            match rx.recv().await {
                TransportEvent::Data(bytes) => {
                    let message = match self.serializer.deserialize(&bytes) {
                        Ok(message) => message,
                        Err(error) => {
                            warn!(peer = %peer, %error, "undecodable payload dropped");
                            continue;
                        }
                    };

                    let message = match message {
                        Message::Request(mut request) => {
                            if self.requires_endpoint(&request.interface, &request.method) {
                                request.sender_endpoint = Some(peer);
                            }
                            Message::Request(request)
                        }
                        other => other,
                    };

                    let endpoint = Arc::clone(&self);
                    let reply_tx = tx.clone();
                    tokio::spawn(async move {
                        let Some(reply) = endpoint.dispatcher.dispatch(message).await else {
                            return;
                        };
                        match endpoint.serializer.serialize(&reply) {
                            Ok(bytes) => {
                                // A send failure means the peer is gone;
                                // the reader loop sees the same disconnect.
                                let _ = reply_tx.send(bytes).await;
                            }
                            Err(error) => {
                                warn!(peer = %peer, %error, "reply not serializable; dropped");
                            }
                        }
                    });
                }
                TransportEvent::Disconnected { reason } => {
                    debug!(peer = %peer, %reason, "link ended");
                    return;
                }
            }
        }
    }

    fn requires_endpoint(&self, interface: &str, method: &str) -> bool {
        self.policies
            .resolve_method(interface, method, ReturnMode::TwoWay)
            .ok()
            .flatten()
            .is_some_and(|policy| policy.requires_endpoint)
    }
}
