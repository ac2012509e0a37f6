//! Zero-overhead [`Monitor`] for production deployments that ship metrics elsewhere.

use super::events::{AgentEvent, SupervisionEvent};
use super::traits::Monitor;

/// Discards every event. Compiles down to nothing observable at the call site.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMonitor;

impl Monitor for NoopMonitor {
    fn record_agent(&self, _event: AgentEvent) {}
    fn record_supervision(&self, _event: SupervisionEvent) {}
}
