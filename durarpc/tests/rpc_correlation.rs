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

//! Request-response correlation over a live client/server pair.
//!
//! Each test stands up a [`ServerEndpoint`] over the memory transport and
//! checks that responses find their callers: concurrently, out of order,
//! and under disconnection.

use async_trait::async_trait;
use durarpc::dispatch::{HandlerError, OperationHandler};
use durarpc::endpoint::{ClientEndpoint, ServerEndpoint};
use durarpc::executor::CallError;
use durarpc::policy::{ContractBuilder, PolicyRegistry};
use durarpc::serialization::{JsonSerializer, Serializer};
use durarpc::transport::MemoryNetwork;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Answers `Add` immediately and `EchoAfter` after a caller-chosen delay,
/// so responses can be made to arrive out of request order.
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
            "EchoAfter" => {
                let delay = args[1].as_u64().unwrap_or(0);
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Ok(args.into_iter().next().unwrap_or(Value::Null))
            }
            _ => Err(HandlerError::no_such_method("ICalculator", method)),
        }
    }
}

fn calculator_policies() -> Arc<PolicyRegistry> {
    let registry = PolicyRegistry::new();
    registry
        .register(
            ContractBuilder::new("ICalculator")
                .method("Add", 2, true, |m| m.timeout(Duration::from_secs(5)))
                .method("EchoAfter", 2, true, |m| m.timeout(Duration::from_secs(5)))
                .method("Hang", 0, true, |m| m.timeout(Duration::from_secs(30)))
                .build(),
        )
        .unwrap();
    Arc::new(registry)
}

struct Fixture {
    network: MemoryNetwork,
    policies: Arc<PolicyRegistry>,
    serializer: Arc<dyn Serializer>,
}

fn start_server(port: u16) -> Fixture {
    let policies = calculator_policies();
    let serializer: Arc<dyn Serializer> = Arc::new(JsonSerializer::new());
    let network = MemoryNetwork::new();
    let listener = network.listen("server", port).unwrap();

    let server = Arc::new(ServerEndpoint::new(
        Arc::clone(&policies),
        Arc::clone(&serializer),
    ));
    server.register_handler(Arc::new(Calculator));
    tokio::spawn(Arc::clone(&server).serve(listener));

    Fixture {
        network,
        policies,
        serializer,
    }
}

async fn direct_client(fixture: &Fixture, port: u16) -> ClientEndpoint {
    ClientEndpoint::connect_direct(
        "server",
        port,
        Arc::new(fixture.network.connector()),
        Arc::clone(&fixture.policies),
        Arc::clone(&fixture.serializer),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_out_of_order_responses_reach_their_callers() {
    let fixture = start_server(4100);
    let client = Arc::new(direct_client(&fixture, 4100).await);

    let slow = {
        let client = Arc::clone(&client);
        tokio::spawn(async move {
            client
                .invoke("ICalculator", "EchoAfter", vec![json!("slow"), json!(150)])
                .await
        })
    };
    let fast = {
        let client = Arc::clone(&client);
        tokio::spawn(async move {
            client
                .invoke("ICalculator", "EchoAfter", vec![json!("fast"), json!(10)])
                .await
        })
    };

    // The later request answers first; each waiter still gets its own value.
    assert_eq!(fast.await.unwrap().unwrap(), json!("fast"));
    assert_eq!(slow.await.unwrap().unwrap(), json!("slow"));
    assert_eq!(client.pending_calls().await, 0);
}

#[tokio::test]
async fn test_sixty_four_concurrent_calls_correlate() {
    let fixture = start_server(4101);
    let client = Arc::new(direct_client(&fixture, 4101).await);

    let mut handles = Vec::new();
    for i in 0..64i64 {
        let client = Arc::clone(&client);
        handles.push(tokio::spawn(async move {
            client
                .invoke("ICalculator", "Add", vec![json!(i), json!(1000 - i)])
                .await
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), json!(1000));
    }
    assert_eq!(client.pending_calls().await, 0);
}

#[tokio::test]
async fn test_disconnect_fails_waiters_before_timeout() {
    // A hand-rolled server that swallows the request and hangs up, so the
    // thirty-second timeout never gets a chance to matter.
    let policies = calculator_policies();
    let serializer: Arc<dyn Serializer> = Arc::new(JsonSerializer::new());
    let network = MemoryNetwork::new();
    let mut listener = network.listen("server", 4102).unwrap();

    tokio::spawn(async move {
        let link = listener.accept().await.unwrap();
        let (_tx, mut rx) = link.split();
        let _ = rx.recv().await;
        // Both halves drop here, hanging up on the caller mid-wait.
    });

    let client = ClientEndpoint::connect_direct(
        "server",
        4102,
        Arc::new(network.connector()),
        policies,
        serializer,
    )
    .await
    .unwrap();

    let started = Instant::now();
    let error = client.invoke("ICalculator", "Hang", vec![]).await.unwrap_err();
    assert!(matches!(error, CallError::ConnectionAborted { .. }));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(client.pending_calls().await, 0);
}
