use opentelemetry::metrics::{Counter, Gauge, Meter};

/// OTel metrics for the admission queue. Created once during scheduler init
/// and recorded on each state change. No-op when no global meter provider
/// is installed.
pub struct Metrics {
    pub requests_pushed: Counter<u64>,
    pub requests_started: Counter<u64>,
    pub requests_fulfilled: Counter<u64>,
    pub requests_failed: Counter<u64>,
    pub requests_throttled: Counter<u64>,
    pub requests_retried: Counter<u64>,
    pub cooldowns_entered: Counter<u64>,
    pub pending_depth: Gauge<u64>,
    pub inflight_depth: Gauge<u64>,
    pub slots_available: Gauge<u64>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create metrics from the global meter provider.
    pub fn new() -> Self {
        let meter = opentelemetry::global::meter("eclusa");
        Self::from_meter(&meter)
    }

    /// Create metrics from a specific meter (used in tests with an
    /// in-memory exporter).
    pub fn from_meter(meter: &Meter) -> Self {
        Self {
            requests_pushed: meter
                .u64_counter("eclusa.requests.pushed")
                .with_description("Total requests accepted by the queue")
                .build(),
            requests_started: meter
                .u64_counter("eclusa.requests.started")
                .with_description("Total task starts, including retries")
                .build(),
            requests_fulfilled: meter
                .u64_counter("eclusa.requests.fulfilled")
                .with_description("Total requests settled successfully")
                .build(),
            requests_failed: meter
                .u64_counter("eclusa.requests.failed")
                .with_description("Total requests settled with a terminal error")
                .build(),
            requests_throttled: meter
                .u64_counter("eclusa.requests.throttled")
                .with_description("Total rate-limit rejections reported by the transport")
                .build(),
            requests_retried: meter
                .u64_counter("eclusa.requests.retried")
                .with_description("Total throttled requests re-queued for retry")
                .build(),
            cooldowns_entered: meter
                .u64_counter("eclusa.cooldowns.entered")
                .with_description("Times the budget was withheld after a throttling signal")
                .build(),
            pending_depth: meter
                .u64_gauge("eclusa.queue.pending")
                .with_description("Requests waiting for a slot")
                .build(),
            inflight_depth: meter
                .u64_gauge("eclusa.queue.inflight")
                .with_description("Requests currently running")
                .build(),
            slots_available: meter
                .u64_gauge("eclusa.slots.available")
                .with_description("Slots available for new starts")
                .build(),
        }
    }

    pub fn record_push(&self) {
        self.requests_pushed.add(1, &[]);
    }

    pub fn record_start(&self) {
        self.requests_started.add(1, &[]);
    }

    pub fn record_fulfilled(&self) {
        self.requests_fulfilled.add(1, &[]);
    }

    pub fn record_failed(&self) {
        self.requests_failed.add(1, &[]);
    }

    pub fn record_throttled(&self) {
        self.requests_throttled.add(1, &[]);
    }

    pub fn record_retry(&self) {
        self.requests_retried.add(1, &[]);
    }

    pub fn record_cooldown(&self) {
        self.cooldowns_entered.add(1, &[]);
    }

    pub fn record_depths(&self, pending: u64, in_flight: u64, slots: u64) {
        self.pending_depth.record(pending, &[]);
        self.inflight_depth.record(in_flight, &[]);
        self.slots_available.record(slots, &[]);
    }
}
