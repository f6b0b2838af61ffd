//! Thin HTTP adapter on top of the [`eclusa_core`] admission queue.
//!
//! [`Adapter`] holds a base URL and a set of default headers, builds one
//! transport descriptor per call, and submits it through a
//! [`RequestQueue`](eclusa_core::RequestQueue) so outbound traffic respects
//! the slot budget and throttle cooldowns. The actual wire I/O lives behind
//! the [`Transport`] trait.

mod adapter;
mod transport;

pub use adapter::{Adapter, ApiCall};
pub use transport::{Method, Response, Transport, TransportFuture, TransportRequest};

pub use eclusa_core::{
    AdmissionError, AdmissionResult, QueueConfig, QueueStats, Ticket, TransportError,
};
