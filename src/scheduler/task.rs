//! Task records for the scheduler (§4.6).

use serde_json::Value;

use crate::ids::{AgentId, TaskId};

/// Lifecycle state of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Waiting on one or more dependencies to complete.
    Pending,
    /// Dependencies satisfied; sitting in the ready queue.
    Ready,
    /// Handed out by `get_next_task`; awaiting a result.
    Dispatched,
    /// Finished successfully.
    Completed,
    /// Finished with a failure. Dependents are never auto-failed (§4.6):
    /// they simply never become ready, since this dependency never
    /// completes successfully.
    Failed,
    /// Withdrawn before completion; removed from the ready queue if present.
    Cancelled,
}

/// One unit of work submitted to the scheduler.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    /// Roles eligible to be dispatched this task. Empty means any role.
    pub required_roles: Vec<String>,
    pub priority: u8,
    pub dependencies: Vec<TaskId>,
    pub payload: Value,
    pub status: TaskStatus,
    /// Agent currently (or most recently) dispatched this task, if any.
    pub assigned_agent: Option<AgentId>,
    /// Result or error value recorded by `complete`/`fail`.
    pub result: Option<Value>,
}

impl Task {
    /// Build a new task in `Pending` (the scheduler promotes it to `Ready`
    /// immediately on submission if `dependencies` is empty). An empty
    /// `required_roles` means any role may be dispatched this task.
    pub fn new(
        id: TaskId,
        required_roles: Vec<String>,
        priority: u8,
        dependencies: Vec<TaskId>,
        payload: Value,
    ) -> Self {
        Self {
            id,
            required_roles,
            priority: priority.min(10),
            dependencies,
            payload,
            status: TaskStatus::Pending,
            assigned_agent: None,
            result: None,
        }
    }

    /// Whether `roles` is eligible to be dispatched this task: true if this
    /// task requires no particular role, or if `roles` intersects the set it
    /// requires.
    pub fn matches_roles(&self, roles: &[String]) -> bool {
        self.required_roles.is_empty() || self.required_roles.iter().any(|r| roles.contains(r))
    }
}
