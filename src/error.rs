//! Crate-wide error taxonomy (§7).
//!
//! Each component keeps a focused `thiserror` enum close to its own code
//! (`supervisor::SupervisorError`, `mailbox::MailboxError`, …), one
//! `error.rs` per module. `RuntimeError` is the aggregate every component
//! error converts into via `#[from]`. The orchestrator boundary (§7) never
//! raises `RuntimeError` across a process boundary; it maps each variant to
//! a boolean, an empty id, or a not-found result.

use thiserror::Error;

use crate::ids::{AgentId, TaskId, VoteId};

/// Aggregate runtime error, tagged by taxonomy class (§7).
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Malformed client input: invalid enum value, out-of-range number, etc.
    #[error("invalid input: {0}")]
    Input(String),

    /// Lookup by id found no match.
    #[error("not found: {0}")]
    NotFound(String),

    /// Operation conflicts with existing state (slot taken, duplicate id).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Operation refused by policy (circuit breaker open, vote finalised, lock denied).
    #[error("policy refused: {0}")]
    Policy(String),

    /// A handler raised once; recorded on the circuit breaker, not fatal.
    #[error("transient failure: {0}")]
    Transient(String),

    /// The runtime itself cannot continue; the agent enters FAILED.
    #[error("fatal agent error: {0}")]
    FatalAgent(String),

    /// A blocking wait or deadline expired.
    #[error("timed out: {0}")]
    Timeout(String),
}

impl RuntimeError {
    /// Agent id lookup failure, pre-formatted for `NotFound`.
    pub fn agent_not_found(id: AgentId) -> Self {
        Self::NotFound(format!("agent {id}"))
    }

    /// Task id lookup failure, pre-formatted for `NotFound`.
    pub fn task_not_found(id: TaskId) -> Self {
        Self::NotFound(format!("task {id}"))
    }

    /// Vote id lookup failure, pre-formatted for `NotFound`.
    pub fn vote_not_found(id: VoteId) -> Self {
        Self::NotFound(format!("vote {id}"))
    }

    /// Whether the orchestrator boundary should surface this as "not found"
    /// rather than a generic failure (§7 propagation policy).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether a caller retrying the same operation might succeed later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_) | Self::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_helpers_tag_correctly() {
        let err = RuntimeError::agent_not_found(AgentId::new());
        assert!(err.is_not_found());
        assert!(err.to_string().contains("agent"));
    }

    #[test]
    fn transient_classification() {
        assert!(RuntimeError::Transient("boom".into()).is_transient());
        assert!(RuntimeError::Timeout("boom".into()).is_transient());
        assert!(!RuntimeError::Policy("boom".into()).is_transient());
    }
}
