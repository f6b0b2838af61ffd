use std::time::Duration;

use serde::Deserialize;

use crate::error::AdmissionError;

/// Queue tuning constants, deserializable from TOML.
///
/// The defaults allow bursts of 10 concurrent requests, with each consumed
/// slot returning after `window_ms / max_slots` (400 ms), so sustained
/// throughput approaches `max_slots` requests per window once saturated.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Upper bound on concurrently running requests.
    pub max_slots: usize,
    /// Rate window in milliseconds, shared across all slots.
    pub window_ms: u64,
    /// Cooldown after a throttling signal, in milliseconds. While the
    /// cooldown is pending no request starts and no slot respawns.
    pub retry_timeout_ms: u64,
    /// Status code the transport reports for rate-limit rejections.
    pub throttle_status: u16,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_slots: 10,
            window_ms: 4_000,
            retry_timeout_ms: 1_000,
            throttle_status: 429,
        }
    }
}

impl QueueConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn retry_timeout(&self) -> Duration {
        Duration::from_millis(self.retry_timeout_ms)
    }

    /// Delay before a consumed slot is returned to the budget. Slots trickle
    /// back on independent timers rather than refilling all at once.
    pub fn slot_respawn_delay(&self) -> Duration {
        Duration::from_millis(self.window_ms / self.max_slots as u64)
    }

    /// Reject configurations the scheduler cannot run with.
    pub fn validate(&self) -> Result<(), AdmissionError> {
        if self.max_slots == 0 {
            return Err(AdmissionError::InvalidConfig(
                "max_slots must be at least 1".to_string(),
            ));
        }
        if self.window_ms == 0 {
            return Err(AdmissionError::InvalidConfig(
                "window_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
