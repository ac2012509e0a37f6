//! Background retention sweep (§4.9, §5): discards logged messages older
//! than `retention_ms` at a steady `housekeeping_interval_ms` cadence.
//!
//! A single `tokio::spawn`ed loop owned by the orchestrator, woken on a timer
//! rather than a channel.

// Layer 1: Standard library imports
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

// Layer 3: Internal module imports
use crate::clock::SharedClock;
use crate::message::Message;

/// Spawn the housekeeping loop. The returned handle is aborted when the
/// orchestrator that owns it is dropped.
pub(super) fn spawn(
    messages: Arc<Mutex<Vec<(Message, i64)>>>,
    clock: SharedClock,
    interval_ms: i64,
    retention_ms: i64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            sleep(Duration::from_millis(interval_ms.max(0) as u64)).await;
            let cutoff = clock.now_ms() - retention_ms;
            let mut log = messages.lock();
            let before = log.len();
            log.retain(|(_, logged_at)| *logged_at >= cutoff);
            let purged = before - log.len();
            if purged > 0 {
                debug!(purged, remaining = log.len(), "housekeeping purged expired messages");
            }
        }
    })
}
