//! In-memory [`Monitor`] with bounded history, for tests and local dashboards.

use parking_lot::Mutex;

use super::events::{AgentEvent, Recorded, SupervisionEvent};
use super::traits::Monitor;

/// Records every event into a capped ring buffer per stream.
pub struct InMemoryMonitor {
    max_history: usize,
    agent_events: Mutex<Vec<Recorded<AgentEvent>>>,
    supervision_events: Mutex<Vec<Recorded<SupervisionEvent>>>,
}

impl InMemoryMonitor {
    /// Build a monitor retaining up to `max_history` events per stream.
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history: max_history.max(1),
            agent_events: Mutex::new(Vec::new()),
            supervision_events: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of currently retained agent events, oldest first.
    pub fn agent_events(&self) -> Vec<Recorded<AgentEvent>> {
        self.agent_events.lock().clone()
    }

    /// Snapshot of currently retained supervision events, oldest first.
    pub fn supervision_events(&self) -> Vec<Recorded<SupervisionEvent>> {
        self.supervision_events.lock().clone()
    }

    /// Drop all retained history.
    pub fn reset(&self) {
        self.agent_events.lock().clear();
        self.supervision_events.lock().clear();
    }

    fn push<T>(buffer: &mut Vec<T>, item: T, cap: usize) {
        if buffer.len() >= cap {
            buffer.remove(0);
        }
        buffer.push(item);
    }
}

impl Default for InMemoryMonitor {
    fn default() -> Self {
        Self::new(1_000)
    }
}

impl Clone for Recorded<AgentEvent> {
    fn clone(&self) -> Self {
        Self {
            at: self.at,
            event: self.event.clone(),
        }
    }
}

impl Clone for Recorded<SupervisionEvent> {
    fn clone(&self) -> Self {
        Self {
            at: self.at,
            event: self.event.clone(),
        }
    }
}

impl Monitor for InMemoryMonitor {
    fn record_agent(&self, event: AgentEvent) {
        let mut guard = self.agent_events.lock();
        Self::push(&mut guard, Recorded::now(event), self.max_history);
    }

    fn record_supervision(&self, event: SupervisionEvent) {
        let mut guard = self.supervision_events.lock();
        Self::push(&mut guard, Recorded::now(event), self.max_history);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::AgentId;

    #[test]
    fn records_and_caps_history() {
        let monitor = InMemoryMonitor::new(2);
        for _ in 0..5 {
            monitor.record_agent(AgentEvent::Started { id: AgentId::new() });
        }
        assert_eq!(monitor.agent_events().len(), 2);
    }

    #[test]
    fn reset_clears_both_streams() {
        let monitor = InMemoryMonitor::new(10);
        monitor.record_agent(AgentEvent::Started { id: AgentId::new() });
        monitor.record_supervision(SupervisionEvent::ChildStarted {
            supervisor: AgentId::new(),
            child: AgentId::new(),
        });
        monitor.reset();
        assert!(monitor.agent_events().is_empty());
        assert!(monitor.supervision_events().is_empty());
    }
}
