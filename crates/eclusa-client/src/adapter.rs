use std::collections::HashMap;
use std::sync::Arc;

use eclusa_core::{AdmissionError, QueueConfig, QueueStats, RequestQueue, Ticket};
use serde_json::Value;
use tracing::debug;

use crate::transport::{Method, Response, Transport, TransportRequest};

/// Per-call inputs: extra headers layered over the adapter defaults and an
/// optional JSON payload.
#[derive(Debug, Clone, Default)]
pub struct ApiCall {
    pub headers: HashMap<String, String>,
    pub payload: Option<Value>,
}

impl ApiCall {
    pub fn with_payload(payload: Value) -> Self {
        Self {
            headers: HashMap::new(),
            payload: Some(payload),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// HTTP adapter that funnels every call through an admission queue.
///
/// The adapter owns the base URL and default headers; each call merges its
/// own headers over the defaults (call headers win), joins the path onto the
/// base URL, and routes the payload into query params for GET or the body
/// for everything else. Submission never blocks: the returned [`Ticket`]
/// settles once the request has run to a terminal result, with throttle
/// retries handled out of sight.
pub struct Adapter {
    base_url: String,
    default_headers: HashMap<String, String>,
    transport: Arc<dyn Transport>,
    queue: RequestQueue<Response>,
}

impl Adapter {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        config: QueueConfig,
    ) -> Result<Self, AdmissionError> {
        let queue = RequestQueue::new(config)?;
        Ok(Self {
            base_url: base_url.into(),
            default_headers: HashMap::new(),
            transport,
            queue,
        })
    }

    /// Set a default header sent with every subsequent call. Per-call
    /// headers with the same name take precedence.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.default_headers.insert(name.into(), value.into());
    }

    /// Queue a call and return its settlement ticket.
    pub fn request(&self, method: Method, path: &str, call: ApiCall) -> Ticket<Response> {
        let request = self.build_request(method, path, call);
        debug!(%method, url = %request.url, "call queued");
        let transport = Arc::clone(&self.transport);
        self.queue.push(move || transport.send(request.clone()))
    }

    pub fn get(&self, path: &str, call: ApiCall) -> Ticket<Response> {
        self.request(Method::Get, path, call)
    }

    pub fn post(&self, path: &str, call: ApiCall) -> Ticket<Response> {
        self.request(Method::Post, path, call)
    }

    pub fn put(&self, path: &str, call: ApiCall) -> Ticket<Response> {
        self.request(Method::Put, path, call)
    }

    pub fn patch(&self, path: &str, call: ApiCall) -> Ticket<Response> {
        self.request(Method::Patch, path, call)
    }

    pub fn delete(&self, path: &str, call: ApiCall) -> Ticket<Response> {
        self.request(Method::Delete, path, call)
    }

    /// Snapshot of the underlying queue.
    pub async fn stats(&self) -> Result<QueueStats, AdmissionError> {
        self.queue.stats().await
    }

    /// Shut the queue down, settling outstanding tickets with
    /// [`AdmissionError::Closed`].
    pub async fn shutdown(self) {
        self.queue.shutdown().await;
    }

    fn build_request(&self, method: Method, path: &str, call: ApiCall) -> TransportRequest {
        let mut headers = self.default_headers.clone();
        headers.extend(call.headers);

        let base = self.base_url.trim_end_matches('/');
        let url = if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        };

        let (params, body) = if method.payload_in_query() {
            (call.payload, None)
        } else {
            (None, call.payload)
        };

        TransportRequest {
            method,
            url,
            headers,
            params,
            body,
        }
    }
}
