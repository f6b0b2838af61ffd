use std::future::Future;
use std::pin::Pin;

use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::{AdmissionError, TransportError};

/// Future produced by one invocation of a queued task.
pub type TaskFuture<T> = Pin<Box<dyn Future<Output = Result<T, TransportError>> + Send>>;

/// A queued unit of work. Re-invocable so a throttled request can be retried
/// with a fresh transport future.
pub(crate) type BoxTask<T> = Box<dyn FnMut() -> TaskFuture<T> + Send>;

/// Completion handle for the caller's ticket.
pub(crate) type ReplySender<T> = oneshot::Sender<Result<T, AdmissionError>>;

/// Lifecycle of a request accepted by the queue.
///
/// Transitions run `Unstarted -> InFlight -> {Fulfilled | Throttled}`;
/// `Throttled -> Unstarted` (re-queue) is the only cycle. `Errored` is the
/// defensive case of a task panicking when invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Unstarted,
    InFlight,
    Fulfilled,
    Throttled,
    Errored,
}

/// One record per call accepted by the queue. Created on push, mutated only
/// by the scheduler, dropped once the caller's ticket settles terminally.
pub(crate) struct RequestRecord<T> {
    pub(crate) id: Uuid,
    pub(crate) task: BoxTask<T>,
    pub(crate) reply: Option<ReplySender<T>>,
    pub(crate) status: RequestStatus,
    /// Number of throttle recoveries this request went through.
    pub(crate) attempt: u32,
}

impl<T> RequestRecord<T> {
    pub(crate) fn new(task: BoxTask<T>, reply: ReplySender<T>) -> Self {
        Self {
            id: Uuid::now_v7(),
            task,
            reply: Some(reply),
            status: RequestStatus::Unstarted,
            attempt: 0,
        }
    }
}
