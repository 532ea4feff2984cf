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

//! The handler trait implemented by server-side operations.

use crate::message::ExceptionKind;
use async_trait::async_trait;
use thiserror::Error;

/// Failure raised by an [`OperationHandler`].
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler exists but has no method matching the request.
    #[error("{message}")]
    NoSuchMethod {
        /// Description naming the missing method.
        message: String,
    },

    /// The method ran and failed.
    #[error("{message}")]
    Application {
        /// Description of the failure.
        message: String,
    },
}

impl HandlerError {
    /// Builds the failure for a method the handler does not implement.
    #[must_use]
    pub fn no_such_method(interface: &str, method: &str) -> Self {
        Self::NoSuchMethod {
            message: format!(
                "unable to call {method} on {interface} handler: no matching method was found"
            ),
        }
    }

    /// Builds an application-level failure.
    pub fn application(message: impl Into<String>) -> Self {
        Self::Application {
            message: message.into(),
        }
    }

    /// Maps this failure onto the wire-level exception classification.
    #[must_use]
    pub const fn kind(&self) -> ExceptionKind {
        match self {
            Self::NoSuchMethod { .. } => ExceptionKind::NoSuchOperation,
            Self::Application { .. } => ExceptionKind::ApplicationError,
        }
    }
}

/// A server-side implementation of one interface contract.
///
/// Handlers are method-name dispatched: the runtime hands over the method
/// and positional arguments, and the handler matches on the name. When the
/// contract's policy asks for the sender endpoint, it arrives appended as
/// the final argument.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use durarpc::dispatch::{HandlerError, OperationHandler};
/// use serde_json::{json, Value};
///
/// struct Calculator;
///
/// #[async_trait]
/// impl OperationHandler for Calculator {
///     fn interface_name(&self) -> &str {
///         "ICalculator"
///     }
///
///     async fn call(&self, method: &str, args: Vec<Value>) -> Result<Value, HandlerError> {
///         match method {
///             "Add" => {
///                 let a = args[0].as_i64().unwrap_or(0);
///                 let b = args[1].as_i64().unwrap_or(0);
///                 Ok(json!(a + b))
///             }
///             _ => Err(HandlerError::no_such_method(self.interface_name(), method)),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait OperationHandler: Send + Sync + 'static {
    /// Returns the name of the interface contract this handler serves.
    fn interface_name(&self) -> &str;

    /// Invokes `method` with positional `args`.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::NoSuchMethod`] when the name matches nothing,
    /// or [`HandlerError::Application`] when the method itself fails.
    async fn call(&self, method: &str, args: Vec<serde_json::Value>)
        -> Result<serde_json::Value, HandlerError>;
}
