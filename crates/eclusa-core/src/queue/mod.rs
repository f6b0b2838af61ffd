//! The admission-control queue.
//!
//! [`RequestQueue`] owns a dedicated scheduler task that processes all
//! state changes sequentially: pushes from callers, settlements from
//! running tasks, and timer events (slot respawns, cooldown expiry) all
//! arrive as commands on one channel. Callers hold a [`Ticket`] that
//! settles exactly once with the terminal result of their request.

pub(crate) mod command;
pub mod metrics;
mod scheduler;
mod slots;
mod stats;

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::QueueConfig;
use crate::error::{AdmissionError, TransportError};
use crate::request::{BoxTask, TaskFuture};

use command::QueueCommand;
use scheduler::Scheduler;

pub use stats::QueueStats;

/// Admission-controlled request queue, generic over the task result type.
///
/// Rate-limit rejections (the configured throttle status) are retried
/// transparently and never surface to the caller; every other failure is
/// forwarded verbatim. There is no caller-initiated cancellation — once
/// pushed, a task runs to its terminal result or is retried indefinitely
/// under sustained throttling.
pub struct RequestQueue<T> {
    commands: mpsc::UnboundedSender<QueueCommand<T>>,
    scheduler_task: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> RequestQueue<T> {
    /// Create a queue, spawning its scheduler on the current Tokio runtime.
    pub fn new(config: QueueConfig) -> Result<Self, AdmissionError> {
        config.validate()?;
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(config, rx, tx.clone());
        let handle = tokio::spawn(scheduler.run());
        info!("request queue started");
        Ok(Self {
            commands: tx,
            scheduler_task: Some(handle),
        })
    }

    /// Enqueue a task at the back of the pending queue.
    ///
    /// The task is invoked once a slot is available and re-invoked
    /// transparently if the transport reports the throttle status. Never
    /// fails synchronously; if the queue is already shut down the returned
    /// ticket settles with [`AdmissionError::Closed`].
    pub fn push<F, Fut>(&self, mut task: F) -> Ticket<T>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, TransportError>> + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let boxed: BoxTask<T> = Box::new(move || Box::pin(task()) as TaskFuture<T>);
        let cmd = QueueCommand::Push {
            task: boxed,
            reply: reply_tx,
        };
        if let Err(mpsc::error::SendError(cmd)) = self.commands.send(cmd) {
            // Scheduler already gone — settle the ticket instead of panicking.
            if let QueueCommand::Push { reply, .. } = cmd {
                let _ = reply.send(Err(AdmissionError::Closed));
            }
        }
        Ticket { reply: reply_rx }
    }

    /// Snapshot of current queue state.
    pub async fn stats(&self) -> Result<QueueStats, AdmissionError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(QueueCommand::Stats { reply: tx })
            .map_err(|_| AdmissionError::Closed)?;
        rx.await.map_err(|_| AdmissionError::Closed)
    }

    /// Graceful shutdown: stop the scheduler and wait for it to finish.
    /// Outstanding tickets settle with [`AdmissionError::Closed`].
    pub async fn shutdown(mut self) {
        let _ = self.commands.send(QueueCommand::Shutdown);
        if let Some(handle) = self.scheduler_task.take() {
            let _ = handle.await;
        }
        info!("request queue shut down");
    }
}

impl<T> Drop for RequestQueue<T> {
    fn drop(&mut self) {
        // If shutdown wasn't called explicitly, stop the scheduler task.
        if self.scheduler_task.is_some() {
            let _ = self.commands.send(QueueCommand::Shutdown);
        }
    }
}

/// Future returned by [`RequestQueue::push`]. Settles exactly once with the
/// task's terminal result.
pub struct Ticket<T> {
    reply: oneshot::Receiver<Result<T, AdmissionError>>,
}

impl<T> Future for Ticket<T> {
    type Output = Result<T, AdmissionError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.reply).poll(cx).map(|res| match res {
            Ok(outcome) => outcome,
            // Scheduler dropped the reply handle without settling.
            Err(_) => Err(AdmissionError::Closed),
        })
    }
}
