//! Agent lifecycle state machine (§4.1).
//!
//! ```text
//! Created -> Starting -> Running -> Stopping -> Stopped
//!                |           |          |
//!                v           v          v
//!              Failed      Failed     Failed
//! ```

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};

/// Lifecycle state of one agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    /// Registered but not yet started.
    Created,
    /// `pre_start` / handler registration in progress.
    Starting,
    /// Draining its mailbox.
    Running,
    /// Shutdown requested, draining remaining messages before stopping.
    Stopping,
    /// Stopped cleanly.
    Stopped,
    /// Stopped due to an unrecoverable error; eligible for supervisor restart.
    Failed,
}

impl Default for AgentState {
    fn default() -> Self {
        Self::Created
    }
}

impl AgentState {
    /// Whether this state is terminal (no further transitions expected
    /// without a supervisor-driven restart).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Failed)
    }
}

/// Tracks an agent's current state, restart count, and last transition time.
#[derive(Debug, Clone)]
pub struct AgentLifecycle {
    state: AgentState,
    last_state_change: DateTime<Utc>,
    restart_count: u32,
}

impl AgentLifecycle {
    /// New lifecycle tracker, starting in `Created`.
    pub fn new() -> Self {
        Self {
            state: AgentState::Created,
            last_state_change: Utc::now(),
            restart_count: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> AgentState {
        self.state
    }

    /// When the state last changed.
    pub fn last_state_change(&self) -> DateTime<Utc> {
        self.last_state_change
    }

    /// Number of times this agent has been restarted by a supervisor.
    pub fn restart_count(&self) -> u32 {
        self.restart_count
    }

    /// Move to `new_state`, bumping `restart_count` when re-entering
    /// `Starting` after a prior terminal state.
    pub fn transition_to(&mut self, new_state: AgentState) {
        if new_state == AgentState::Starting && self.state.is_terminal() {
            self.restart_count += 1;
        }
        self.state = new_state;
        self.last_state_change = Utc::now();
    }
}

impl Default for AgentLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_created() {
        let lifecycle = AgentLifecycle::new();
        assert_eq!(lifecycle.state(), AgentState::Created);
        assert_eq!(lifecycle.restart_count(), 0);
    }

    #[test]
    fn restart_count_increments_after_failure() {
        let mut lifecycle = AgentLifecycle::new();
        lifecycle.transition_to(AgentState::Starting);
        lifecycle.transition_to(AgentState::Running);
        lifecycle.transition_to(AgentState::Failed);
        lifecycle.transition_to(AgentState::Starting);
        assert_eq!(lifecycle.restart_count(), 1);
    }

    #[test]
    fn terminal_states_are_identified() {
        assert!(AgentState::Stopped.is_terminal());
        assert!(AgentState::Failed.is_terminal());
        assert!(!AgentState::Running.is_terminal());
    }
}
