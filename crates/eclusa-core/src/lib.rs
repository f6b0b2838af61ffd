//! Admission control for outbound HTTP requests.
//!
//! The core of this crate is [`RequestQueue`]: a FIFO queue that runs
//! submitted tasks under a self-replenishing slot budget, detects
//! server-side throttling, re-queues throttled requests ahead of newer
//! ones, and holds the budget at zero for a cooldown before resuming.
//! Every pushed task settles its caller's [`Ticket`] exactly once.

pub mod config;
pub mod error;
pub mod queue;
pub mod request;
pub mod telemetry;

pub use config::QueueConfig;
pub use error::{AdmissionError, AdmissionResult, TransportError};
pub use queue::{QueueStats, RequestQueue, Ticket};
pub use request::{RequestStatus, TaskFuture};
