/// Point-in-time snapshot of queue state, for introspection and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueStats {
    /// Requests waiting for a slot.
    pub pending: usize,
    /// Requests currently running.
    pub in_flight: usize,
    /// Slots available for new starts.
    pub slots_available: usize,
    pub max_slots: usize,
    /// True while the queue is recovering from a throttling signal.
    pub cooldown_active: bool,
}
