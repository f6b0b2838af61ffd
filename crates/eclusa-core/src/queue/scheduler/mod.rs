use std::collections::VecDeque;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::QueueConfig;
use crate::error::AdmissionError;
use crate::error::TransportError;
use crate::request::{RequestRecord, RequestStatus};

use super::command::QueueCommand;
use super::metrics::Metrics;
use super::slots::SlotBudget;
use super::stats::QueueStats;

mod dispatch;

/// Single-owner scheduler core. Owns all mutable queue state and processes
/// commands from callers, settlement tasks, and timers sequentially — the
/// only suspension point is waiting for the next command.
pub(crate) struct Scheduler<T> {
    config: QueueConfig,
    inbound: mpsc::UnboundedReceiver<QueueCommand<T>>,
    /// Handle cloned into settlement and timer tasks so their events come
    /// back through the same serialized channel.
    commands: mpsc::UnboundedSender<QueueCommand<T>>,
    running: bool,
    /// Requests awaiting a slot, FIFO. Throttled requests re-enter at the
    /// front in their original relative order.
    pending: VecDeque<RequestRecord<T>>,
    /// Requests whose task is running or settled but not yet reaped, in
    /// start order.
    inflight: Vec<RequestRecord<T>>,
    slots: SlotBudget,
    /// True while a cooldown timer is pending. Slot respawns arriving in
    /// this window are skipped, not banked.
    cooldown_active: bool,
    metrics: Metrics,
}

impl<T: Send + 'static> Scheduler<T> {
    pub(crate) fn new(
        config: QueueConfig,
        inbound: mpsc::UnboundedReceiver<QueueCommand<T>>,
        commands: mpsc::UnboundedSender<QueueCommand<T>>,
    ) -> Self {
        let slots = SlotBudget::new(config.max_slots);
        Self {
            config,
            inbound,
            commands,
            running: true,
            pending: VecDeque::new(),
            inflight: Vec::new(),
            slots,
            cooldown_active: false,
            metrics: Metrics::new(),
        }
    }

    /// Scheduler event loop. Runs until a `Shutdown` command arrives or
    /// every queue handle is dropped.
    pub(crate) async fn run(mut self) {
        info!(max_slots = self.config.max_slots, "admission scheduler started");

        while self.running {
            let Some(cmd) = self.inbound.recv().await else {
                break;
            };
            self.handle_command(cmd);

            // Drain whatever else is buffered before dispatching, so a burst
            // of settlements is recovered as one batch.
            while self.running {
                match self.inbound.try_recv() {
                    Ok(cmd) => self.handle_command(cmd),
                    Err(_) => break,
                }
            }

            if self.running {
                self.dispatch();
            }
        }

        info!(
            pending = self.pending.len(),
            in_flight = self.inflight.len(),
            "admission scheduler stopped"
        );
    }

    fn handle_command(&mut self, cmd: QueueCommand<T>) {
        match cmd {
            QueueCommand::Push { task, reply } => {
                let record = RequestRecord::new(task, reply);
                debug!(request_id = %record.id, pending = self.pending.len() + 1, "request pushed");
                self.metrics.record_push();
                self.pending.push_back(record);
            }
            QueueCommand::Settled { id, outcome } => {
                self.handle_settled(id, outcome);
            }
            QueueCommand::RespawnSlot => {
                if self.cooldown_active {
                    debug!("slot respawn skipped during cooldown");
                } else if self.slots.respawn() {
                    debug!(slots = self.slots.available(), "slot respawned");
                }
            }
            QueueCommand::CooldownOver => {
                self.cooldown_active = false;
                self.slots.refill();
                info!(slots = self.slots.available(), "cooldown expired, budget restored");
            }
            QueueCommand::Stats { reply } => {
                let _ = reply.send(self.snapshot());
            }
            QueueCommand::Shutdown => {
                info!("shutdown command received");
                self.running = false;
            }
        }
    }

    /// Record a task settlement. Success and terminal failure settle the
    /// caller's ticket here; a throttle rejection only marks the record —
    /// `dispatch` re-queues it and the ticket stays open.
    fn handle_settled(&mut self, id: Uuid, outcome: Result<T, TransportError>) {
        let Some(record) = self.inflight.iter_mut().find(|r| r.id == id) else {
            warn!(request_id = %id, "settlement for unknown request ignored");
            return;
        };

        match outcome {
            Ok(value) => {
                record.status = RequestStatus::Fulfilled;
                self.metrics.record_fulfilled();
                debug!(request_id = %id, "request fulfilled");
                if let Some(reply) = record.reply.take() {
                    let _ = reply.send(Ok(value));
                }
            }
            Err(err) if err.status() == Some(self.config.throttle_status) => {
                record.status = RequestStatus::Throttled;
                self.metrics.record_throttled();
                warn!(request_id = %id, attempt = record.attempt, "request throttled by server");
            }
            Err(err) => {
                record.status = RequestStatus::Fulfilled;
                self.metrics.record_failed();
                debug!(request_id = %id, error = %err, "request failed");
                if let Some(reply) = record.reply.take() {
                    let _ = reply.send(Err(AdmissionError::Transport(err)));
                }
            }
        }
    }

    fn snapshot(&self) -> QueueStats {
        QueueStats {
            pending: self.pending.len(),
            in_flight: self.inflight.len(),
            slots_available: self.slots.available(),
            max_slots: self.slots.max(),
            cooldown_active: self.cooldown_active,
        }
    }
}

#[cfg(test)]
mod tests;
