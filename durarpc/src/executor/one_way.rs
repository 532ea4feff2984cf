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

//! The fire-and-forget invocation path.
//!
//! One-way calls never register a correlation entry and never wait. The
//! contract is best effort: delivery and queueing are both fine, and a
//! channel that can no longer send gets a log line instead of an error.

use super::RemoteExecutor;
use crate::message::Message;
use tracing::{debug, warn};

pub(super) async fn invoke(
    executor: &RemoteExecutor,
    interface: &str,
    method: &str,
    args: Vec<serde_json::Value>,
) {
    let correlation_id = executor.ids.next();
    let request = executor
        .factory
        .request(correlation_id, interface, method, args, false);

    let payload = match executor.serializer.serialize(&Message::Request(request)) {
        Ok(payload) => payload,
        Err(error) => {
            warn!(interface, method, %error, "one-way request not serializable; dropped");
            return;
        }
    };

    if let Err(error) = executor.channel.send(payload).await {
        debug!(interface, method, %error, "one-way send failed; dropped");
    }
}
