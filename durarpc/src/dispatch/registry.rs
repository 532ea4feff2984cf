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

//! Routing of inbound requests to their registered handlers.

use super::operation::OperationHandler;
use crate::message::{ExceptionKind, RequestMessage, ResponseMessage};
use parking_lot::RwLock;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Holds the [`OperationHandler`]s an endpoint serves, keyed by interface
/// name.
///
/// Handling a request resolves the handler, invokes it, and shapes the
/// outcome according to the request's `response_expected` flag: two-way
/// requests always produce a response (success or exception), one-way
/// requests never do, even on failure.
pub struct OperationRegistry {
    handlers: RwLock<HashMap<String, Arc<dyn OperationHandler>>>,
}

impl OperationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a handler under its interface name.
    ///
    /// A later registration for the same interface replaces the earlier
    /// one.
    pub fn register(&self, handler: Arc<dyn OperationHandler>) {
        let interface = handler.interface_name().to_string();
        debug!(%interface, "operation handler registered");
        self.handlers.write().insert(interface, handler);
    }

    /// Returns true if a handler is registered for `interface`.
    #[must_use]
    pub fn contains(&self, interface: &str) -> bool {
        self.handlers.read().contains_key(interface)
    }

    /// Handles one inbound request.
    ///
    /// Returns the response to send back, or `None` for one-way requests.
    /// When a one-way request fails, the failure is logged and swallowed;
    /// there is no correlated caller to deliver it to.
    pub async fn handle(&self, request: RequestMessage) -> Option<ResponseMessage> {
        let handler = self.handlers.read().get(&request.interface).cloned();

        let Some(handler) = handler else {
            let message = format!("no handler is defined for {} type", request.interface);
            if request.response_expected {
                return Some(ResponseMessage::exception(
                    request.correlation_id,
                    ExceptionKind::NoSuchOperation,
                    message,
                ));
            }
            warn!(
                interface = %request.interface,
                method = %request.method,
                "one-way request dropped: {message}"
            );
            return None;
        };

        let mut args = request.args;
        if let Some(endpoint) = request.sender_endpoint {
            args.push(json!(endpoint.to_string()));
        }

        match handler.call(&request.method, args).await {
            Ok(value) => request
                .response_expected
                .then(|| ResponseMessage::value(request.correlation_id, value)),
            Err(error) => {
                if request.response_expected {
                    Some(ResponseMessage::exception(
                        request.correlation_id,
                        error.kind(),
                        error.to_string(),
                    ))
                } else {
                    warn!(
                        interface = %request.interface,
                        method = %request.method,
                        %error,
                        "one-way request failed"
                    );
                    None
                }
            }
        }
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::HandlerError;
    use crate::message::{DefaultMessageFactory, MessageFactory, ResponsePayload};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::net::SocketAddr;

    struct Calculator;

    #[async_trait]
    impl OperationHandler for Calculator {
        fn interface_name(&self) -> &str {
            "ICalculator"
        }

        async fn call(&self, method: &str, args: Vec<Value>) -> Result<Value, HandlerError> {
            match method {
                "Add" => {
                    let a = args[0].as_i64().unwrap_or(0);
                    let b = args[1].as_i64().unwrap_or(0);
                    Ok(json!(a + b))
                }
                "EchoArgs" => Ok(json!(args)),
                "Fail" => Err(HandlerError::application("it broke")),
                _ => Err(HandlerError::no_such_method(self.interface_name(), method)),
            }
        }
    }

    fn registry() -> OperationRegistry {
        let registry = OperationRegistry::new();
        registry.register(Arc::new(Calculator));
        registry
    }

    #[tokio::test]
    async fn test_two_way_success() {
        let factory = DefaultMessageFactory;
        let request = factory.request(1, "ICalculator", "Add", vec![json!(2), json!(3)], true);

        let response = registry().handle(request).await.unwrap();
        assert_eq!(response.payload, ResponsePayload::Value(json!(5)));
    }

    #[tokio::test]
    async fn test_unknown_interface_two_way() {
        let factory = DefaultMessageFactory;
        let request = factory.request(2, "IMissing", "Anything", vec![], true);

        let response = registry().handle(request).await.unwrap();
        match response.payload {
            ResponsePayload::Exception { kind, message } => {
                assert_eq!(kind, ExceptionKind::NoSuchOperation);
                assert_eq!(message, "no handler is defined for IMissing type");
            }
            ResponsePayload::Value(_) => panic!("expected exception"),
        }
    }

    #[tokio::test]
    async fn test_unknown_method_two_way() {
        let factory = DefaultMessageFactory;
        let request = factory.request(3, "ICalculator", "Divide", vec![], true);

        let response = registry().handle(request).await.unwrap();
        match response.payload {
            ResponsePayload::Exception { kind, message } => {
                assert_eq!(kind, ExceptionKind::NoSuchOperation);
                assert!(message.contains("no matching method was found"));
            }
            ResponsePayload::Value(_) => panic!("expected exception"),
        }
    }

    #[tokio::test]
    async fn test_application_error_two_way() {
        let factory = DefaultMessageFactory;
        let request = factory.request(4, "ICalculator", "Fail", vec![], true);

        let response = registry().handle(request).await.unwrap();
        assert!(response.is_exception());
    }

    #[tokio::test]
    async fn test_one_way_produces_no_response() {
        let factory = DefaultMessageFactory;
        let ok = factory.request(0, "ICalculator", "Add", vec![json!(1), json!(1)], false);
        let err = factory.request(0, "ICalculator", "Fail", vec![], false);
        let missing = factory.request(0, "IMissing", "Anything", vec![], false);

        let registry = registry();
        assert!(registry.handle(ok).await.is_none());
        assert!(registry.handle(err).await.is_none());
        assert!(registry.handle(missing).await.is_none());
    }

    #[tokio::test]
    async fn test_sender_endpoint_appended() {
        let factory = DefaultMessageFactory;
        let mut request = factory.request(5, "ICalculator", "EchoArgs", vec![json!("x")], true);
        let endpoint: SocketAddr = "127.0.0.1:49152".parse().unwrap();
        request.sender_endpoint = Some(endpoint);

        let response = registry().handle(request).await.unwrap();
        assert_eq!(
            response.payload,
            ResponsePayload::Value(json!([json!("x"), json!("127.0.0.1:49152")]))
        );
    }
}
