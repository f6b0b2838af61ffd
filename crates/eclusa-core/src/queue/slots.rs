/// Integer concurrency budget for the admission queue.
///
/// One slot permits one task start. Slots are consumed when a task starts
/// and returned by per-slot respawn timers, never by task completion. On a
/// throttling signal the whole budget is withheld until the cooldown
/// expires.
///
/// Runs on the single-owner scheduler task — no synchronization needed.
pub(crate) struct SlotBudget {
    available: usize,
    max: usize,
}

impl SlotBudget {
    /// Create a budget starting at full capacity.
    pub(crate) fn new(max: usize) -> Self {
        Self {
            available: max,
            max,
        }
    }

    pub(crate) fn available(&self) -> usize {
        self.available
    }

    pub(crate) fn max(&self) -> usize {
        self.max
    }

    /// Consume one slot. Returns false without modification if the budget
    /// is exhausted.
    pub(crate) fn consume(&mut self) -> bool {
        if self.available > 0 {
            self.available -= 1;
            true
        } else {
            false
        }
    }

    /// Return one slot, capped at the maximum. Returns false if the budget
    /// is already full.
    pub(crate) fn respawn(&mut self) -> bool {
        if self.available < self.max {
            self.available += 1;
            true
        } else {
            false
        }
    }

    /// Withhold the entire budget (throttle recovery).
    pub(crate) fn drain(&mut self) {
        self.available = 0;
    }

    /// Restore the full budget (cooldown expiry).
    pub(crate) fn refill(&mut self) {
        self.available = self.max;
    }
}
