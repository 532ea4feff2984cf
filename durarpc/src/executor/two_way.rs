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

//! The blocking invocation path.
//!
//! A two-way call registers a correlation entry, sends, and parks on a
//! select over three outcomes: the response arrives, the channel's epoch
//! changes, or the response window elapses. Epoch changes drive the resend
//! discipline: an interruption arms the call's resend flag and the matching
//! restoration fires it, so each reconnection cycle re-sends the request
//! exactly once no matter how the wakeups interleave.

use super::error::CallError;
use super::RemoteExecutor;
use crate::channel::ChannelError;
use crate::message::{ExceptionKind, Message, ResponseMessage, ResponsePayload};
use crate::policy::EffectivePolicy;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, trace};

pub(super) async fn invoke(
    executor: &RemoteExecutor,
    interface: &str,
    method: &str,
    args: Vec<serde_json::Value>,
    policy: &EffectivePolicy,
) -> Result<serde_json::Value, CallError> {
    let correlation_id = executor.ids.next();
    let rx = executor
        .correlation
        .register(correlation_id, executor.channel.id())
        .await;

    let result = run_call(executor, correlation_id, rx, interface, method, args, policy).await;

    // Unregister on every exit path. A no-op when the response already
    // claimed the entry.
    executor.correlation.unregister(correlation_id).await;
    result
}

async fn run_call(
    executor: &RemoteExecutor,
    correlation_id: u64,
    mut rx: oneshot::Receiver<ResponseMessage>,
    interface: &str,
    method: &str,
    args: Vec<serde_json::Value>,
    policy: &EffectivePolicy,
) -> Result<serde_json::Value, CallError> {
    let request = executor
        .factory
        .request(correlation_id, interface, method, args, true);
    let payload = executor.serializer.serialize(&Message::Request(request))?;

    // Subscribe before the send so an interruption racing the send is
    // still observed.
    let mut waiter = executor.channel.epoch_waiter();

    send_request(executor, &payload).await?;
    trace!(correlation_id, interface, method, "request sent");

    // Armed by an interruption, fired by the matching restoration.
    let mut needs_resend = false;
    let mut budget = policy.timeout;

    loop {
        let window = if policy.timeout_is_strict {
            budget
        } else {
            policy.timeout
        };
        let waited_from = Instant::now();

        tokio::select! {
            response = &mut rx => {
                return match response {
                    Ok(response) => decode_response(response),
                    Err(_) => Err(CallError::ConnectionAborted {
                        reason: "call released without a response".to_string(),
                    }),
                };
            }
            state = waiter.cancelled() => {
                if state.aborted {
                    return Err(CallError::ConnectionAborted {
                        reason: "channel aborted".to_string(),
                    });
                }
                if policy.no_retries {
                    return Err(CallError::ConnectionAborted {
                        reason: "connection interrupted".to_string(),
                    });
                }

                needs_resend = !needs_resend;
                if !needs_resend {
                    debug!(correlation_id, interface, method, "connection restored; re-sending");
                    send_request(executor, &payload).await?;
                }

                if policy.timeout_is_strict {
                    budget = budget.saturating_sub(waited_from.elapsed());
                    if budget.is_zero() {
                        return Err(timeout_error(interface, method, policy));
                    }
                }
            }
            () = tokio::time::sleep(window) => {
                return Err(timeout_error(interface, method, policy));
            }
        }
    }
}

async fn send_request(executor: &RemoteExecutor, payload: &[u8]) -> Result<(), CallError> {
    match executor.channel.send(payload.to_vec()).await {
        // Queued counts as sent: the durable channel replays it on restore.
        Ok(_) => Ok(()),
        Err(ChannelError::Closed { .. } | ChannelError::NotConnected { .. }) => {
            Err(CallError::NotConnected)
        }
        Err(error) => Err(CallError::ConnectionAborted {
            reason: error.to_string(),
        }),
    }
}

fn timeout_error(interface: &str, method: &str, policy: &EffectivePolicy) -> CallError {
    CallError::Timeout {
        interface: interface.to_string(),
        method: method.to_string(),
        timeout: policy.timeout,
    }
}

fn decode_response(response: ResponseMessage) -> Result<serde_json::Value, CallError> {
    match response.payload {
        ResponsePayload::Value(value) => Ok(value),
        ResponsePayload::Exception { kind, message } => Err(match kind {
            ExceptionKind::OperationAborted => CallError::ConnectionAborted { reason: message },
            ExceptionKind::NoSuchOperation => CallError::NoSuchOperation { message },
            kind => CallError::Remote { kind, message },
        }),
    }
}
