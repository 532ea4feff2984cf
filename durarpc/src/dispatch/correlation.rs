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

//! Correlation id generation and response routing.
//!
//! Every two-way request registers its correlation id here before it is
//! sent, so concurrent calls on one channel can be matched to their
//! responses without races. When a durable channel gives up reconnecting,
//! the registry synthesizes abort responses for every call still waiting on
//! that channel.

use crate::channel::ChannelId;
use crate::message::{ExceptionKind, ResponseMessage};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{oneshot, Mutex};
use tracing::debug;

/// Generates unique correlation ids for request-response matching.
///
/// Ids start at 1 and increment monotonically; 0 is reserved for
/// non-correlated traffic. Generation is lock-free and safe to share across
/// tasks.
///
/// # Example
///
/// ```rust
/// use durarpc::dispatch::CorrelationIdGenerator;
///
/// let generator = CorrelationIdGenerator::new();
/// assert_eq!(generator.next(), 1);
/// assert_eq!(generator.next(), 2);
/// ```
#[derive(Debug)]
pub struct CorrelationIdGenerator {
    next_id: AtomicU64,
}

impl CorrelationIdGenerator {
    /// Creates a generator starting at id 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
        }
    }

    /// Returns the next correlation id.
    #[must_use]
    pub fn next(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for CorrelationIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

struct PendingCall {
    scope: ChannelId,
    tx: oneshot::Sender<ResponseMessage>,
}

/// Routes responses back to the calls waiting for them.
///
/// One registry serves an entire endpoint; entries are scoped to the channel
/// the request went out on so an abort on one channel leaves calls on other
/// channels untouched.
pub struct CorrelationRegistry {
    pending: Mutex<HashMap<u64, PendingCall>>,
}

impl CorrelationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a call and returns the receiver its response will arrive on.
    ///
    /// # Panics
    ///
    /// Panics if `correlation_id` is already registered. Ids come from a
    /// [`CorrelationIdGenerator`] and never repeat, so a duplicate means the
    /// caller wired two calls to one id.
    pub async fn register(
        &self,
        correlation_id: u64,
        scope: ChannelId,
    ) -> oneshot::Receiver<ResponseMessage> {
        let (tx, rx) = oneshot::channel();
        let mut pending = self.pending.lock().await;
        assert!(
            pending
                .insert(correlation_id, PendingCall { scope, tx })
                .is_none(),
            "correlation id {correlation_id} registered twice"
        );
        rx
    }

    /// Removes a call that no longer expects a response.
    ///
    /// Callers unregister on every exit path, so this is a no-op when the
    /// response already claimed the entry.
    pub async fn unregister(&self, correlation_id: u64) {
        self.pending.lock().await.remove(&correlation_id);
    }

    /// Delivers a response to the call waiting for it.
    ///
    /// Returns `false` if nothing is waiting. Late responses after a timeout
    /// or an abort land here; they are dropped without error because the
    /// caller is already gone.
    pub async fn dispatch(&self, response: ResponseMessage) -> bool {
        let entry = self.pending.lock().await.remove(&response.correlation_id);
        match entry {
            Some(call) => {
                // The waiter may have raced away between unregister and
                // here; a failed send is equivalent to an unknown id.
                call.tx.send(response).is_ok()
            }
            None => {
                debug!(
                    correlation_id = response.correlation_id,
                    "dropping response with no waiting call"
                );
                false
            }
        }
    }

    /// Fails every call scoped to `channel_id` with an abort exception.
    ///
    /// A durable channel calls this after it gives up reconnecting, so
    /// waiters unblock immediately instead of running out their timeouts.
    pub async fn dispatch_abort_responses_for(&self, channel_id: ChannelId, reason: &str) {
        let mut pending = self.pending.lock().await;
        let aborted: Vec<u64> = pending
            .iter()
            .filter(|(_, call)| call.scope == channel_id)
            .map(|(id, _)| *id)
            .collect();

        for correlation_id in aborted {
            if let Some(call) = pending.remove(&correlation_id) {
                debug!(correlation_id, %channel_id, "aborting pending call");
                let response = ResponseMessage::exception(
                    correlation_id,
                    ExceptionKind::OperationAborted,
                    reason,
                );
                let _ = call.tx.send(response);
            }
        }
    }

    /// Returns the number of calls currently waiting.
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}

impl Default for CorrelationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ResponsePayload;
    use serde_json::json;

    #[test]
    fn test_generator_starts_at_one() {
        let generator = CorrelationIdGenerator::new();
        assert_eq!(generator.next(), 1);
        assert_eq!(generator.next(), 2);
    }

    #[tokio::test]
    async fn test_register_and_dispatch() {
        let registry = CorrelationRegistry::new();
        let rx = registry.register(1, ChannelId::from_u64(10)).await;

        assert!(registry.dispatch(ResponseMessage::value(1, json!(42))).await);
        let response = rx.await.unwrap();
        assert_eq!(response.payload, ResponsePayload::Value(json!(42)));
        assert_eq!(registry.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_response_dropped() {
        let registry = CorrelationRegistry::new();
        assert!(!registry.dispatch(ResponseMessage::value(99, json!(1))).await);
    }

    #[tokio::test]
    async fn test_unregister_removes_entry() {
        let registry = CorrelationRegistry::new();
        let _rx = registry.register(1, ChannelId::from_u64(10)).await;
        registry.unregister(1).await;
        assert_eq!(registry.pending_count().await, 0);
        assert!(!registry.dispatch(ResponseMessage::value(1, json!(1))).await);
    }

    #[tokio::test]
    #[should_panic(expected = "registered twice")]
    async fn test_duplicate_register_panics() {
        let registry = CorrelationRegistry::new();
        let _rx1 = registry.register(1, ChannelId::from_u64(10)).await;
        let _rx2 = registry.register(1, ChannelId::from_u64(10)).await;
    }

    #[tokio::test]
    async fn test_abort_is_scoped_to_channel() {
        let registry = CorrelationRegistry::new();
        let aborted = registry.register(1, ChannelId::from_u64(10)).await;
        let survivor = registry.register(2, ChannelId::from_u64(11)).await;

        registry
            .dispatch_abort_responses_for(ChannelId::from_u64(10), "gave up reconnecting")
            .await;

        let response = aborted.await.unwrap();
        assert!(matches!(
            response.payload,
            ResponsePayload::Exception {
                kind: ExceptionKind::OperationAborted,
                ..
            }
        ));

        // The other channel's call is still live.
        assert_eq!(registry.pending_count().await, 1);
        assert!(registry.dispatch(ResponseMessage::value(2, json!(7))).await);
        assert!(!survivor.await.unwrap().is_exception());
    }
}
