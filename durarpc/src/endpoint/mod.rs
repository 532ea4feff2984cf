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

//! Endpoint assembly.
//!
//! Endpoints wire the lower layers into something usable: a
//! [`ServerEndpoint`] accepts links and serves registered handlers over
//! them; a [`ClientEndpoint`] owns one channel (direct or durable) and
//! issues calls through a [`RemoteExecutor`](crate::executor::RemoteExecutor).
//!
//! ```rust
//! use durarpc::dispatch::{HandlerError, OperationHandler};
//! use durarpc::endpoint::{ClientEndpoint, ServerEndpoint};
//! use durarpc::policy::{ContractBuilder, PolicyRegistry};
//! use durarpc::serialization::{JsonSerializer, Serializer};
//! use durarpc::transport::MemoryNetwork;
//! use async_trait::async_trait;
//! use serde_json::{json, Value};
//! use std::sync::Arc;
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl OperationHandler for Echo {
//!     fn interface_name(&self) -> &str {
//!         "IEcho"
//!     }
//!
//!     async fn call(&self, method: &str, args: Vec<Value>) -> Result<Value, HandlerError> {
//!         match method {
//!             "Echo" => Ok(args.into_iter().next().unwrap_or(Value::Null)),
//!             _ => Err(HandlerError::no_such_method("IEcho", method)),
//!         }
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let policies = Arc::new(PolicyRegistry::new());
//! policies.register(
//!     ContractBuilder::new("IEcho")
//!         .method("Echo", 1, true, |m| m)
//!         .build(),
//! )?;
//! let serializer: Arc<dyn Serializer> = Arc::new(JsonSerializer::new());
//!
//! let network = MemoryNetwork::new();
//! let listener = network.listen("server", 4000)?;
//!
//! let server = Arc::new(ServerEndpoint::new(
//!     Arc::clone(&policies),
//!     Arc::clone(&serializer),
//! ));
//! server.register_handler(Arc::new(Echo));
//! tokio::spawn(Arc::clone(&server).serve(listener));
//!
//! let client = ClientEndpoint::connect_direct(
//!     "server",
//!     4000,
//!     Arc::new(network.connector()),
//!     policies,
//!     serializer,
//! )
//! .await?;
//!
//! let value = client.invoke("IEcho", "Echo", vec![json!("hi")]).await?;
//! assert_eq!(value, json!("hi"));
//! # Ok(())
//! # }
//! ```

mod client;
mod server;

pub use self::client::ClientEndpoint;
pub use self::server::ServerEndpoint;
