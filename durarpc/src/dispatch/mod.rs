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

//! Inbound dispatch and response correlation.
//!
//! This module is the receiving half of the runtime:
//!
//! - [`CorrelationIdGenerator`] and [`CorrelationRegistry`] match responses
//!   to the calls waiting for them
//! - [`OperationHandler`] and [`OperationRegistry`] route requests to the
//!   interfaces an endpoint serves
//! - [`MessageDispatcher`] ties both together behind a single entry point
//!   that the endpoint read loops feed

mod correlation;
mod dispatcher;
mod operation;
mod registry;

pub use self::correlation::{CorrelationIdGenerator, CorrelationRegistry};
pub use self::dispatcher::MessageDispatcher;
pub use self::operation::{HandlerError, OperationHandler};
pub use self::registry::OperationRegistry;
