use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{debug, error, warn};

use crate::error::{AdmissionError, TransportError};
use crate::request::RequestStatus;

use super::QueueCommand;
use super::Scheduler;

impl<T: Send + 'static> Scheduler<T> {
    /// Advance the schedule: reap settled records, recover throttled ones,
    /// start as many pending requests as the budget allows. Idempotent;
    /// runs after every batch of commands.
    pub(super) fn dispatch(&mut self) {
        self.reap_fulfilled();
        self.recover_throttled();
        self.start_pending();
        self.metrics.record_depths(
            self.pending.len() as u64,
            self.inflight.len() as u64,
            self.slots.available() as u64,
        );
    }

    /// Drop settled records from the in-flight set. Bookkeeping only —
    /// slots come back through their own respawn timers, never here.
    fn reap_fulfilled(&mut self) {
        self.inflight
            .retain(|r| r.status != RequestStatus::Fulfilled);
    }

    /// Move throttled records back to the front of the pending queue in
    /// their original relative order, then withhold the whole slot budget
    /// until the cooldown timer fires. Retries are served before requests
    /// that never started.
    fn recover_throttled(&mut self) {
        if !self
            .inflight
            .iter()
            .any(|r| r.status == RequestStatus::Throttled)
        {
            return;
        }

        let mut recovered = Vec::new();
        let mut i = 0;
        while i < self.inflight.len() {
            if self.inflight[i].status == RequestStatus::Throttled {
                recovered.push(self.inflight.remove(i));
            } else {
                i += 1;
            }
        }

        let count = recovered.len();
        for mut record in recovered.into_iter().rev() {
            record.status = RequestStatus::Unstarted;
            record.attempt += 1;
            self.metrics.record_retry();
            self.pending.push_front(record);
        }

        self.slots.drain();
        warn!(count, "throttled requests re-queued, budget withheld");

        if !self.cooldown_active {
            self.cooldown_active = true;
            self.metrics.record_cooldown();
            let tx = self.commands.clone();
            let timeout = self.config.retry_timeout();
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                let _ = tx.send(QueueCommand::CooldownOver);
            });
        }
    }

    /// Start pending requests while the budget lasts, FIFO.
    fn start_pending(&mut self) {
        let n = self.slots.available().min(self.pending.len());
        for _ in 0..n {
            let Some(mut record) = self.pending.pop_front() else {
                break;
            };

            let fut = match catch_unwind(AssertUnwindSafe(|| (record.task)())) {
                Ok(fut) => fut,
                Err(panic) => {
                    // A task must return a future, never panic when invoked.
                    // Reject the one affected caller; no slot is consumed.
                    record.status = RequestStatus::Errored;
                    let message = panic_message(panic);
                    error!(request_id = %record.id, %message, "task panicked during invocation");
                    if let Some(reply) = record.reply.take() {
                        let _ = reply.send(Err(AdmissionError::TaskPanicked(message)));
                    }
                    continue;
                }
            };

            record.status = RequestStatus::InFlight;
            self.slots.consume();
            self.metrics.record_start();
            debug!(
                request_id = %record.id,
                attempt = record.attempt,
                slots = self.slots.available(),
                "request started"
            );

            // Return this slot after the respawn delay, through the command
            // channel so only the scheduler ever touches the budget.
            let tx = self.commands.clone();
            let delay = self.config.slot_respawn_delay();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = tx.send(QueueCommand::RespawnSlot);
            });

            // Run the task and dispatch its settlement back into the queue.
            // The inner spawn isolates panics inside the task's future so
            // the caller still receives a terminal result.
            let tx = self.commands.clone();
            let id = record.id;
            let task_handle = tokio::spawn(fut);
            tokio::spawn(async move {
                let outcome = match task_handle.await {
                    Ok(outcome) => outcome,
                    Err(join_err) => Err(TransportError::Aborted(join_err.to_string())),
                };
                let _ = tx.send(QueueCommand::Settled { id, outcome });
            });

            self.inflight.push(record);
        }
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
