use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use eclusa_core::TransportError;
use serde_json::Value;

/// HTTP methods the adapter can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Whether a call payload rides in the query string instead of the body.
    pub fn payload_in_query(self) -> bool {
        matches!(self, Method::Get)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved request descriptor handed to the transport: absolute URL,
/// merged headers, and the payload routed to either query params or body.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub params: Option<Value>,
    pub body: Option<Value>,
}

/// Response returned by a transport on success.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Value,
}

pub type TransportFuture = Pin<Box<dyn Future<Output = Result<Response, TransportError>> + Send>>;

/// Wire-level I/O seam.
///
/// Implementations resolve with [`Response`] only for success statuses and
/// reject every other outcome as a [`TransportError`]. Rejections carrying
/// the configured throttle status (429 by default) are what drive the
/// queue's cooldown and retry; they must be reported as
/// [`TransportError::Status`] with the code intact.
pub trait Transport: Send + Sync + 'static {
    fn send(&self, request: TransportRequest) -> TransportFuture;
}
