use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::TransportError;
use crate::request::{BoxTask, ReplySender};

use super::stats::QueueStats;

/// Commands dispatched into the single-owner scheduler task.
///
/// Caller-facing commands carry a `oneshot` reply handle. Timer events
/// (slot respawns, cooldown expiry) and task settlements are fire-and-forget
/// — they re-enter the scheduler through the same channel so all state
/// mutations stay serialized.
pub(crate) enum QueueCommand<T> {
    Push {
        task: BoxTask<T>,
        reply: ReplySender<T>,
    },
    /// A started task's future completed.
    Settled {
        id: Uuid,
        outcome: Result<T, TransportError>,
    },
    /// A consumed slot's respawn timer fired.
    RespawnSlot,
    /// The cooldown timer fired.
    CooldownOver,
    Stats {
        reply: oneshot::Sender<QueueStats>,
    },
    Shutdown,
}
