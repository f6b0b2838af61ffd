use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::*;
use crate::request::TaskFuture;

pub(super) type TestResult = Result<&'static str, TransportError>;
pub(super) type CommandSender = mpsc::UnboundedSender<QueueCommand<&'static str>>;
pub(super) type TicketReceiver = oneshot::Receiver<Result<&'static str, AdmissionError>>;
pub(super) type InvocationLog = Arc<Mutex<Vec<&'static str>>>;

pub(super) fn test_setup(config: QueueConfig) -> (CommandSender, Scheduler<&'static str>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let scheduler = Scheduler::new(config, rx, tx.clone());
    (tx, scheduler)
}

/// Config with short timers so paused-clock tests stay readable:
/// respawn delay is `1000 / max_slots` ms, cooldown is 500 ms.
pub(super) fn small_config(max_slots: usize) -> QueueConfig {
    QueueConfig {
        max_slots,
        window_ms: 1_000,
        retry_timeout_ms: 500,
        ..QueueConfig::default()
    }
}

/// Push a task through the command channel, returning the caller's ticket
/// receiver.
pub(super) fn send_push(
    tx: &CommandSender,
    task: impl FnMut() -> TaskFuture<&'static str> + Send + 'static,
) -> TicketReceiver {
    let (reply_tx, reply_rx) = oneshot::channel();
    tx.send(QueueCommand::Push {
        task: Box::new(task),
        reply: reply_tx,
    })
    .unwrap();
    reply_rx
}

/// Task that resolves immediately with `value`.
pub(super) fn ok_task(value: &'static str) -> impl FnMut() -> TaskFuture<&'static str> + Send + 'static {
    move || {
        let fut: TaskFuture<&'static str> = Box::pin(async move { Ok(value) });
        fut
    }
}

/// Task that records each invocation in `log` and pops the next scripted
/// outcome. Panics if invoked more times than scripted.
pub(super) fn scripted_task(
    name: &'static str,
    outcomes: Vec<TestResult>,
    log: &InvocationLog,
) -> impl FnMut() -> TaskFuture<&'static str> + Send + 'static {
    let log = Arc::clone(log);
    let outcomes = Arc::new(Mutex::new(VecDeque::from(outcomes)));
    move || {
        log.lock().unwrap().push(name);
        let outcome = outcomes
            .lock()
            .unwrap()
            .pop_front()
            .expect("task invoked more times than scripted");
        let fut: TaskFuture<&'static str> = Box::pin(async move { outcome });
        fut
    }
}

/// Task whose future stays pending until the returned trigger fires.
pub(super) fn gated_task() -> (
    oneshot::Sender<TestResult>,
    impl FnMut() -> TaskFuture<&'static str> + Send + 'static,
) {
    let (trigger_tx, trigger_rx) = oneshot::channel();
    let mut trigger_rx = Some(trigger_rx);
    let task = move || {
        let rx = trigger_rx.take().expect("gated task invoked twice");
        let fut: TaskFuture<&'static str> =
            Box::pin(async move { rx.await.expect("gate dropped before firing") });
        fut
    };
    (trigger_tx, task)
}

/// Task that panics when invoked (the defensive `Errored` case).
pub(super) fn panicking_task() -> impl FnMut() -> TaskFuture<&'static str> + Send + 'static {
    || panic!("boom")
}

pub(super) fn throttle_err() -> TransportError {
    TransportError::Status {
        status: 429,
        message: "too many requests".to_string(),
    }
}

impl<T: Send + 'static> Scheduler<T> {
    /// Drain all buffered commands and run a dispatch round.
    pub(super) fn drain_and_dispatch(&mut self) {
        while let Ok(cmd) = self.inbound.try_recv() {
            self.handle_command(cmd);
        }
        self.dispatch();
    }

    /// Wait for the next command (settlement or timer event), drain the
    /// rest, then dispatch. Paused-clock tests auto-advance to the next
    /// timer while we wait here.
    pub(super) async fn pump(&mut self) {
        let cmd = tokio::time::timeout(Duration::from_secs(60), self.inbound.recv())
            .await
            .expect("pump timed out waiting for a command");
        if let Some(cmd) = cmd {
            self.handle_command(cmd);
        }
        self.drain_and_dispatch();
    }
}

/// Pump until `cond` holds, with a generous bound on rounds.
pub(super) async fn pump_until<T: Send + 'static>(
    scheduler: &mut Scheduler<T>,
    mut cond: impl FnMut(&Scheduler<T>) -> bool,
) {
    for _ in 0..100 {
        if cond(scheduler) {
            return;
        }
        scheduler.pump().await;
    }
    panic!("condition not reached after 100 pump rounds");
}
