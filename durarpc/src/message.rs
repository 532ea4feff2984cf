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

//! Wire-level message types.
//!
//! Three message shapes travel over a channel: a request, a success
//! response, and an exception response. Responses are tied back to their
//! request by correlation id. Construction goes through the
//! [`MessageFactory`] boundary so serialization-format-specific collaborators
//! can substitute their own representations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;

/// A remote call request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestMessage {
    /// Correlation token linking the eventual response back to the caller.
    /// 0 is reserved for non-correlated traffic.
    pub correlation_id: u64,
    /// Name of the target interface contract.
    pub interface: String,
    /// Name of the target method.
    pub method: String,
    /// Positional arguments, serialization-agnostic.
    pub args: Vec<serde_json::Value>,
    /// Whether the caller is blocked waiting for a response.
    pub response_expected: bool,
    /// The sender's transport endpoint, injected by the receiving side when
    /// the method's policy requires it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_endpoint: Option<SocketAddr>,
}

/// Classification of a remote failure carried in an exception response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExceptionKind {
    /// The handler ran and raised an application-level error.
    ApplicationError,
    /// No handler or no matching method was found for the request.
    NoSuchOperation,
    /// The call was aborted because its channel gave up reconnecting.
    OperationAborted,
    /// A kind this build does not know; preserved verbatim.
    Other(String),
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApplicationError => f.write_str("ApplicationError"),
            Self::NoSuchOperation => f.write_str("NoSuchOperation"),
            Self::OperationAborted => f.write_str("OperationAborted"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// The body of a response: either a value or a captured failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResponsePayload {
    /// Successful result value.
    Value(serde_json::Value),
    /// The callee failed; the failure travels as a kind plus message.
    Exception {
        /// Classification of the failure.
        kind: ExceptionKind,
        /// Human-readable description.
        message: String,
    },
}

/// A response to a two-way request, success or failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage {
    /// The correlation id of the request being answered.
    pub correlation_id: u64,
    /// Result or captured failure.
    pub payload: ResponsePayload,
}

impl ResponseMessage {
    /// Builds a success response.
    #[must_use]
    pub fn value(correlation_id: u64, value: serde_json::Value) -> Self {
        Self {
            correlation_id,
            payload: ResponsePayload::Value(value),
        }
    }

    /// Builds an exception response.
    #[must_use]
    pub fn exception(
        correlation_id: u64,
        kind: ExceptionKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            correlation_id,
            payload: ResponsePayload::Exception {
                kind,
                message: message.into(),
            },
        }
    }

    /// Returns true if this response carries a failure.
    #[must_use]
    pub const fn is_exception(&self) -> bool {
        matches!(self.payload, ResponsePayload::Exception { .. })
    }
}

/// Any message that can travel over a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// A remote call request.
    Request(RequestMessage),
    /// A response to a request.
    Response(ResponseMessage),
}

impl Message {
    /// Returns the correlation id carried by this message.
    #[must_use]
    pub fn correlation_id(&self) -> u64 {
        match self {
            Self::Request(request) => request.correlation_id,
            Self::Response(response) => response.correlation_id,
        }
    }
}

/// Constructs the message value objects the runtime sends.
///
/// The default implementation is sufficient for the built-in JSON wire
/// format; collaborators with format-specific needs provide their own.
pub trait MessageFactory: Send + Sync + 'static {
    /// Builds a request.
    fn request(
        &self,
        correlation_id: u64,
        interface: &str,
        method: &str,
        args: Vec<serde_json::Value>,
        response_expected: bool,
    ) -> RequestMessage;

    /// Builds a success response.
    fn response(&self, correlation_id: u64, value: serde_json::Value) -> ResponseMessage;

    /// Builds an exception response.
    fn exception_response(
        &self,
        correlation_id: u64,
        kind: ExceptionKind,
        message: &str,
    ) -> ResponseMessage;
}

/// The standard [`MessageFactory`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMessageFactory;

impl MessageFactory for DefaultMessageFactory {
    fn request(
        &self,
        correlation_id: u64,
        interface: &str,
        method: &str,
        args: Vec<serde_json::Value>,
        response_expected: bool,
    ) -> RequestMessage {
        RequestMessage {
            correlation_id,
            interface: interface.to_string(),
            method: method.to_string(),
            args,
            response_expected,
            sender_endpoint: None,
        }
    }

    fn response(&self, correlation_id: u64, value: serde_json::Value) -> ResponseMessage {
        ResponseMessage::value(correlation_id, value)
    }

    fn exception_response(
        &self,
        correlation_id: u64,
        kind: ExceptionKind,
        message: &str,
    ) -> ResponseMessage {
        ResponseMessage::exception(correlation_id, kind, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_factory_builds_request() {
        let factory = DefaultMessageFactory;
        let request = factory.request(7, "ICalculator", "Add", vec![json!(2), json!(3)], true);
        assert_eq!(request.correlation_id, 7);
        assert_eq!(request.interface, "ICalculator");
        assert_eq!(request.method, "Add");
        assert!(request.response_expected);
        assert!(request.sender_endpoint.is_none());
    }

    #[test]
    fn test_response_constructors() {
        let ok = ResponseMessage::value(1, json!(5));
        assert!(!ok.is_exception());

        let err = ResponseMessage::exception(1, ExceptionKind::NoSuchOperation, "missing");
        assert!(err.is_exception());
    }

    #[test]
    fn test_message_correlation_id() {
        let factory = DefaultMessageFactory;
        let request = Message::Request(factory.request(9, "I", "M", vec![], false));
        assert_eq!(request.correlation_id(), 9);

        let response = Message::Response(ResponseMessage::value(11, json!(null)));
        assert_eq!(response.correlation_id(), 11);
    }

    #[test]
    fn test_exception_kind_display() {
        assert_eq!(ExceptionKind::OperationAborted.to_string(), "OperationAborted");
        assert_eq!(
            ExceptionKind::Other("Custom".to_string()).to_string(),
            "Custom"
        );
    }
}
