use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use eclusa_client::{
    Adapter, AdmissionError, ApiCall, Method, QueueConfig, Response, Transport, TransportError,
    TransportFuture, TransportRequest,
};
use serde_json::{json, Value};

/// Transport double: records every request and replays scripted outcomes.
struct FakeTransport {
    outcomes: Mutex<VecDeque<Result<Response, TransportError>>>,
    log: Mutex<Vec<TransportRequest>>,
}

impl FakeTransport {
    fn scripted(outcomes: Vec<Result<Response, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(VecDeque::from(outcomes)),
            log: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<TransportRequest> {
        self.log.lock().unwrap().clone()
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: TransportRequest) -> TransportFuture {
        self.log.lock().unwrap().push(request);
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .expect("transport invoked more times than scripted");
        Box::pin(async move { outcome })
    }
}

fn ok_response(status: u16, body: Value) -> Result<Response, TransportError> {
    Ok(Response {
        status,
        headers: HashMap::new(),
        body,
    })
}

fn too_many_requests() -> Result<Response, TransportError> {
    Err(TransportError::Status {
        status: 429,
        message: "too many requests".to_string(),
    })
}

#[tokio::test(start_paused = true)]
async fn post_reaches_the_transport_with_merged_headers_and_body() {
    let transport = FakeTransport::scripted(vec![ok_response(201, json!({"id": 7}))]);
    let mut adapter = Adapter::new(
        "https://api.example.com/v2",
        transport.clone(),
        QueueConfig::default(),
    )
    .unwrap();
    adapter.set_header("authorization", "Bearer token");

    let response = adapter
        .post(
            "/users",
            ApiCall::with_payload(json!({"name": "ada"})).header("x-request-source", "test"),
        )
        .await
        .unwrap();

    assert_eq!(response.status, 201);
    assert_eq!(response.body, json!({"id": 7}));

    let sent = transport.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, Method::Post);
    assert_eq!(sent[0].url, "https://api.example.com/v2/users");
    assert_eq!(sent[0].headers["authorization"], "Bearer token");
    assert_eq!(sent[0].headers["x-request-source"], "test");
    assert_eq!(sent[0].body, Some(json!({"name": "ada"})));
    assert_eq!(sent[0].params, None);
    adapter.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn get_payload_travels_as_query_params() {
    let transport = FakeTransport::scripted(vec![ok_response(200, json!([]))]);
    let adapter = Adapter::new(
        "https://api.example.com",
        transport.clone(),
        QueueConfig::default(),
    )
    .unwrap();

    let response = adapter
        .get("/users", ApiCall::with_payload(json!({"page": 3})))
        .await
        .unwrap();
    assert_eq!(response.status, 200);

    let sent = transport.requests();
    assert_eq!(sent[0].params, Some(json!({"page": 3})));
    assert_eq!(sent[0].body, None);
    adapter.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn throttled_call_is_retried_behind_the_scenes() {
    let transport = FakeTransport::scripted(vec![
        too_many_requests(),
        ok_response(200, json!({"ok": true})),
    ]);
    let adapter = Adapter::new(
        "https://api.example.com",
        transport.clone(),
        QueueConfig::default(),
    )
    .unwrap();

    let response = adapter.get("/status", ApiCall::default()).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!({"ok": true}));

    // Same descriptor sent twice; the 429 never surfaced.
    let sent = transport.requests();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], sent[1]);
    adapter.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn terminal_status_surfaces_to_the_caller() {
    let transport = FakeTransport::scripted(vec![Err(TransportError::Status {
        status: 503,
        message: "service unavailable".to_string(),
    })]);
    let adapter = Adapter::new(
        "https://api.example.com",
        transport.clone(),
        QueueConfig::default(),
    )
    .unwrap();

    let outcome = adapter.get("/status", ApiCall::default()).await;
    match outcome {
        Err(AdmissionError::Transport(TransportError::Status { status, .. })) => {
            assert_eq!(status, 503);
        }
        other => panic!("expected a 503 transport error, got {other:?}"),
    }
    assert_eq!(transport.requests().len(), 1, "no retry on non-throttle status");
    adapter.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn burst_of_calls_respects_the_slot_budget() {
    let outcomes = (0..12)
        .map(|i| ok_response(200, json!({ "n": i })))
        .collect();
    let transport = FakeTransport::scripted(outcomes);
    let config = QueueConfig {
        max_slots: 4,
        ..QueueConfig::default()
    };
    let adapter = Adapter::new("https://api.example.com", transport.clone(), config).unwrap();

    let tickets: Vec<_> = (0..12)
        .map(|i| adapter.get(&format!("/items/{i}"), ApiCall::default()))
        .collect();
    for ticket in tickets {
        assert_eq!(ticket.await.unwrap().status, 200);
    }

    // All twelve went out, in submission order.
    let urls: Vec<_> = transport
        .requests()
        .into_iter()
        .map(|r| r.url)
        .collect();
    let expected: Vec<_> = (0..12)
        .map(|i| format!("https://api.example.com/items/{i}"))
        .collect();
    assert_eq!(urls, expected);
    adapter.shutdown().await;
}
