//! Per-agent health tracking derived from heartbeat timestamps (§4.1).

use crate::clock::SharedClock;

/// Health snapshot for one agent.
///
/// An agent is healthy as long as a heartbeat has been observed within
/// `timeout_ms`. There is no background timer here: `is_healthy` is
/// evaluated on demand by the supervisor's health-check loop against the
/// clock it was built with.
#[derive(Debug, Clone)]
pub struct HealthStatus {
    last_heartbeat_ms: i64,
    timeout_ms: i64,
}

impl HealthStatus {
    /// Start a health record as of `now_ms`, e.g. when the agent is spawned.
    pub fn new(now_ms: i64, timeout_ms: i64) -> Self {
        Self {
            last_heartbeat_ms: now_ms,
            timeout_ms,
        }
    }

    /// Record a heartbeat (or heartbeat-ack) observed at `now_ms`.
    pub fn record_heartbeat(&mut self, now_ms: i64) {
        self.last_heartbeat_ms = now_ms;
    }

    /// Whether the agent is still within its heartbeat timeout as of `now_ms`.
    pub fn is_healthy(&self, now_ms: i64) -> bool {
        now_ms - self.last_heartbeat_ms < self.timeout_ms
    }

    /// Milliseconds since the last observed heartbeat, as of `now_ms`.
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        (now_ms - self.last_heartbeat_ms).max(0)
    }

    /// Timestamp of the last observed heartbeat.
    pub fn last_heartbeat_ms(&self) -> i64 {
        self.last_heartbeat_ms
    }
}

/// Evaluate health against a live clock rather than a caller-supplied
/// timestamp; a thin convenience wrapper used by the supervisor's polling
/// loop.
pub fn is_healthy_now(status: &HealthStatus, clock: &SharedClock) -> bool {
    status.is_healthy(clock.now_ms())
}
