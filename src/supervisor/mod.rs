//! Supervision trees (§4.3).
//!
//! A [`Supervisor`] tracks its children's start order and decides, on
//! failure, which siblings the configured [`RestartStrategy`] requires to
//! restart — gated by a sliding-window [`RestartRateLimiter`] so a crash
//! loop escalates to `RestartLimitExceeded` instead of spinning forever.
//! Actually recreating a failed agent's `AgentRuntime` is the caller's job —
//! the supervisor only decides *who* needs restarting, keeping that decision
//! logic separate from actual child process management.

mod rate_limiter;
mod strategy;

pub use rate_limiter::RestartRateLimiter;
pub use strategy::RestartStrategy;

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::actor::{AgentLifecycle, AgentState};
use crate::health::HealthStatus;
use crate::ids::AgentId;
use crate::monitoring::{Monitor, SupervisionEvent};
use std::collections::HashMap;

/// A supervision tree node: a strategy, an ordered set of children, and the
/// rate limiter guarding restarts for the whole subtree.
pub struct Supervisor {
    id: AgentId,
    strategy: RestartStrategy,
    order: Vec<AgentId>,
    health: HashMap<AgentId, HealthStatus>,
    limiter: RestartRateLimiter,
    monitor: Arc<dyn Monitor>,
    lifecycle: AgentLifecycle,
}

impl Supervisor {
    pub fn new(
        id: AgentId,
        strategy: RestartStrategy,
        max_restarts: usize,
        max_restart_window_ms: i64,
        monitor: Arc<dyn Monitor>,
    ) -> Self {
        Self {
            id,
            strategy,
            order: Vec::new(),
            health: HashMap::new(),
            limiter: RestartRateLimiter::new(max_restarts, max_restart_window_ms),
            monitor,
            lifecycle: AgentLifecycle::new(),
        }
    }

    /// This supervisor's own lifecycle state.
    pub fn state(&self) -> AgentState {
        self.lifecycle.state()
    }

    /// Start the supervisor itself, then return every child in insertion
    /// order for the caller to actually start — the supervisor only decides
    /// order, the same boundary `on_failure` keeps for restarts.
    pub fn start(&mut self) -> Vec<AgentId> {
        self.lifecycle.transition_to(AgentState::Starting);
        self.lifecycle.transition_to(AgentState::Running);
        self.order.clone()
    }

    /// Return every child in reverse insertion order for the caller to stop,
    /// then mark the supervisor itself stopped.
    pub fn stop(&mut self) -> Vec<AgentId> {
        self.lifecycle.transition_to(AgentState::Stopping);
        let reverse_order: Vec<AgentId> = self.order.iter().rev().copied().collect();
        self.lifecycle.transition_to(AgentState::Stopped);
        reverse_order
    }

    /// Register a child, appending it to the start order.
    pub fn add_child(&mut self, child: AgentId, now_ms: i64, timeout_ms: i64) {
        self.order.push(child);
        self.health.insert(child, HealthStatus::new(now_ms, timeout_ms));
        self.monitor.record_supervision(SupervisionEvent::ChildStarted {
            supervisor: self.id,
            child,
        });
    }

    /// Drop a child from supervision entirely (e.g. after a clean stop).
    pub fn remove_child(&mut self, child: AgentId) {
        self.order.retain(|&id| id != child);
        self.health.remove(&child);
    }

    /// Record a heartbeat from `child` observed at `now_ms`.
    pub fn record_heartbeat(&mut self, child: AgentId, now_ms: i64) {
        if let Some(status) = self.health.get_mut(&child) {
            status.record_heartbeat(now_ms);
        }
    }

    /// Children whose heartbeat has lapsed as of `now_ms` — the health-check
    /// polling loop calls this on each tick to find who needs attention.
    pub fn unhealthy_children(&self, now_ms: i64) -> Vec<AgentId> {
        self.health
            .iter()
            .filter(|(_, status)| !status.is_healthy(now_ms))
            .map(|(&id, _)| id)
            .collect()
    }

    /// Decide which children must restart after `failed` crashed, per the
    /// configured strategy, or an empty list if the restart-rate limit for
    /// this subtree has been exceeded.
    pub fn on_failure(&mut self, failed: AgentId, reason: &str, now_ms: i64) -> Vec<AgentId> {
        self.monitor.record_supervision(SupervisionEvent::ChildFailed {
            supervisor: self.id,
            child: failed,
            reason: reason.to_string(),
        });

        if !self.limiter.allow(now_ms) {
            self.monitor
                .record_supervision(SupervisionEvent::RestartLimitExceeded {
                    supervisor: self.id,
                    child: failed,
                });
            return Vec::new();
        }

        let affected = match self.strategy {
            RestartStrategy::OneForOne => vec![failed],
            RestartStrategy::OneForAll => self.order.clone(),
            RestartStrategy::RestForOne => {
                let idx = self.order.iter().position(|&id| id == failed).unwrap_or(0);
                self.order[idx..].to_vec()
            }
        };

        self.limiter.record(now_ms);
        self.monitor.record_supervision(SupervisionEvent::StrategyApplied {
            supervisor: self.id,
            strategy: self.strategy,
            affected: affected.clone(),
        });
        for &child in &affected {
            let restart_count = self.limiter.count(now_ms) as u32;
            self.monitor.record_supervision(SupervisionEvent::ChildRestarted {
                supervisor: self.id,
                child,
                restart_count,
            });
        }
        affected
    }

    /// Start order of all currently-tracked children.
    pub fn children(&self) -> &[AgentId] {
        &self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::NoopMonitor;

    fn supervisor(strategy: RestartStrategy) -> Supervisor {
        Supervisor::new(AgentId::new(), strategy, 3, 60_000, Arc::new(NoopMonitor))
    }

    #[test]
    fn one_for_one_restarts_only_the_failed_child() {
        let mut sup = supervisor(RestartStrategy::OneForOne);
        let (a, b, c) = (AgentId::new(), AgentId::new(), AgentId::new());
        for id in [a, b, c] {
            sup.add_child(id, 0, 1_000);
        }
        let restarted = sup.on_failure(b, "boom", 10);
        assert_eq!(restarted, vec![b]);
    }

    #[test]
    fn one_for_all_restarts_everyone() {
        let mut sup = supervisor(RestartStrategy::OneForAll);
        let (a, b, c) = (AgentId::new(), AgentId::new(), AgentId::new());
        for id in [a, b, c] {
            sup.add_child(id, 0, 1_000);
        }
        let restarted = sup.on_failure(b, "boom", 10);
        assert_eq!(restarted, vec![a, b, c]);
    }

    #[test]
    fn rest_for_one_restarts_failed_and_later_siblings() {
        let mut sup = supervisor(RestartStrategy::RestForOne);
        let (a, b, c) = (AgentId::new(), AgentId::new(), AgentId::new());
        for id in [a, b, c] {
            sup.add_child(id, 0, 1_000);
        }
        let restarted = sup.on_failure(b, "boom", 10);
        assert_eq!(restarted, vec![b, c]);
    }

    #[test]
    fn restart_limit_exceeded_yields_no_restarts() {
        let mut sup = supervisor(RestartStrategy::OneForOne);
        let a = AgentId::new();
        sup.add_child(a, 0, 1_000);
        for t in 0..3 {
            assert_eq!(sup.on_failure(a, "boom", t), vec![a]);
        }
        assert!(sup.on_failure(a, "boom", 3).is_empty());
    }

    #[test]
    fn unhealthy_children_are_reported_past_timeout() {
        let mut sup = supervisor(RestartStrategy::OneForOne);
        let a = AgentId::new();
        sup.add_child(a, 0, 1_000);
        assert!(sup.unhealthy_children(500).is_empty());
        assert_eq!(sup.unhealthy_children(2_000), vec![a]);
    }

    #[test]
    fn start_returns_children_in_insertion_order() {
        let mut sup = supervisor(RestartStrategy::OneForOne);
        let (a, b, c) = (AgentId::new(), AgentId::new(), AgentId::new());
        for id in [a, b, c] {
            sup.add_child(id, 0, 1_000);
        }
        assert_eq!(sup.start(), vec![a, b, c]);
        assert_eq!(sup.state(), crate::actor::AgentState::Running);
    }

    #[test]
    fn stop_returns_children_in_reverse_order() {
        let mut sup = supervisor(RestartStrategy::OneForOne);
        let (a, b, c) = (AgentId::new(), AgentId::new(), AgentId::new());
        for id in [a, b, c] {
            sup.add_child(id, 0, 1_000);
        }
        sup.start();
        assert_eq!(sup.stop(), vec![c, b, a]);
        assert_eq!(sup.state(), crate::actor::AgentState::Stopped);
    }
}
