//! The [`Monitor`] trait (§A.1).
//!
//! This runtime has two independent event streams (agent lifecycle,
//! supervision) that the orchestrator wants observed through one shared
//! sink, so `Monitor` is a plain, object-safe trait with one method per
//! stream rather than a generic parameterised over a single event type.

use super::events::{AgentEvent, SupervisionEvent};

/// Sink for runtime-observability events.
///
/// Implementations must be cheap to call from the hot path — recording is
/// not allowed to block a message loop.
pub trait Monitor: Send + Sync {
    /// Record an agent lifecycle/message-processing event.
    fn record_agent(&self, event: AgentEvent);

    /// Record a supervision-tree event.
    fn record_supervision(&self, event: SupervisionEvent);
}
