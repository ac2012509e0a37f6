//! Priority-and-dependency task scheduler (§4.6).
//!
//! Ready tasks are tracked in a simple `Vec`, scanned for the
//! highest-priority match on each `get_next_task` call rather than a binary
//! heap — role filtering means a heap would still need a linear scan past
//! ineligible tasks, so the extra structure buys nothing at the scale this
//! runtime targets (`max_queue_size`, §6.4).

mod task;

pub use task::{Task, TaskStatus};

// Layer 1: Standard library imports
use std::collections::{HashMap, HashSet};

// Layer 2: Third-party crate imports
use serde_json::Value;

// Layer 3: Internal module imports
use crate::error::RuntimeError;
use crate::ids::{AgentId, TaskId};

/// Tracks tasks, their dependency graph, and a per-role ready queue.
pub struct TaskScheduler {
    tasks: HashMap<TaskId, Task>,
    /// dependency -> tasks waiting on it (the forward edge set).
    dependents: HashMap<TaskId, Vec<TaskId>>,
    /// unmet dependency count per pending task (drives Pending -> Ready).
    unmet: HashMap<TaskId, HashSet<TaskId>>,
    ready: Vec<TaskId>,
}

impl TaskScheduler {
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
            dependents: HashMap::new(),
            unmet: HashMap::new(),
            ready: Vec::new(),
        }
    }

    /// Submit a new task.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Conflict` if `task.id` was already submitted.
    pub fn submit(&mut self, mut task: Task) -> Result<(), RuntimeError> {
        if self.tasks.contains_key(&task.id) {
            return Err(RuntimeError::Conflict(format!("task {} already submitted", task.id)));
        }

        let deps: HashSet<TaskId> = task.dependencies.iter().copied().collect();
        for &dep in &deps {
            self.dependents.entry(dep).or_default().push(task.id);
        }

        if deps.is_empty() {
            task.status = TaskStatus::Ready;
            self.ready.push(task.id);
        } else {
            task.status = TaskStatus::Pending;
            self.unmet.insert(task.id, deps);
        }

        self.tasks.insert(task.id, task);
        Ok(())
    }

    /// Pop the highest-priority ready task whose `required_roles` is empty
    /// or intersects `roles`.
    ///
    /// A task is handed out at most once: it is removed from the ready set
    /// and marked `Dispatched` before being returned. Ties are broken FIFO,
    /// by submission order — `ready` is append-only until something is
    /// removed from it, so the first match scanned at the max priority is
    /// the earliest submitted.
    pub fn get_next_task(&mut self, roles: &[String]) -> Option<Task> {
        let mut best: Option<(usize, u8)> = None;
        for (pos, id) in self.ready.iter().enumerate() {
            let Some(task) = self.tasks.get(id) else { continue };
            if !task.matches_roles(roles) {
                continue;
            }
            if best.map(|(_, best_priority)| task.priority > best_priority).unwrap_or(true) {
                best = Some((pos, task.priority));
            }
        }

        let id = best.map(|(pos, _)| self.ready[pos])?;
        self.ready.retain(|&candidate| candidate != id);
        let task = self.tasks.get_mut(&id)?;
        task.status = TaskStatus::Dispatched;
        Some(task.clone())
    }

    /// Withdraw a task before it completes, removing it from the ready
    /// queue if it was still sitting there.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::NotFound` if `id` is unknown.
    pub fn cancel(&mut self, id: TaskId) -> Result<(), RuntimeError> {
        let task = self
            .tasks
            .get_mut(&id)
            .ok_or_else(|| RuntimeError::task_not_found(id))?;
        task.status = TaskStatus::Cancelled;
        self.ready.retain(|&candidate| candidate != id);
        Ok(())
    }

    /// Record a successful outcome and its result.
    ///
    /// Any dependent whose last unmet dependency was `id` becomes `Ready`.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::NotFound` if `id` is unknown.
    pub fn complete(&mut self, id: TaskId, result: Value) -> Result<(), RuntimeError> {
        let task = self
            .tasks
            .get_mut(&id)
            .ok_or_else(|| RuntimeError::task_not_found(id))?;
        task.status = TaskStatus::Completed;
        task.result = Some(result);

        if let Some(dependents) = self.dependents.get(&id).cloned() {
            for dependent in dependents {
                if let Some(unmet) = self.unmet.get_mut(&dependent) {
                    unmet.remove(&id);
                    if unmet.is_empty() {
                        self.unmet.remove(&dependent);
                        if let Some(t) = self.tasks.get_mut(&dependent) {
                            t.status = TaskStatus::Ready;
                        }
                        self.ready.push(dependent);
                    }
                }
            }
        }
        Ok(())
    }

    /// Record a failure and its error value. Dependents are left `Pending`
    /// forever — this scheduler never cascades a failure (§4.6).
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::NotFound` if `id` is unknown.
    pub fn fail(&mut self, id: TaskId, error: Value) -> Result<(), RuntimeError> {
        let task = self
            .tasks
            .get_mut(&id)
            .ok_or_else(|| RuntimeError::task_not_found(id))?;
        task.status = TaskStatus::Failed;
        task.result = Some(error);
        Ok(())
    }

    /// Set a task's status directly, optionally recording the agent it was
    /// assigned to. Used when a caller drives lifecycle transitions outside
    /// `get_next_task`/`complete`/`fail` (e.g. a manual reassignment).
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::NotFound` if `id` is unknown.
    pub fn update_status(
        &mut self,
        id: TaskId,
        status: TaskStatus,
        agent_id: Option<AgentId>,
    ) -> Result<(), RuntimeError> {
        let task = self
            .tasks
            .get_mut(&id)
            .ok_or_else(|| RuntimeError::task_not_found(id))?;
        task.status = status;
        if agent_id.is_some() {
            task.assigned_agent = agent_id;
        }
        Ok(())
    }

    pub fn status(&self, id: TaskId) -> Option<TaskStatus> {
        self.tasks.get(&id).map(|t| t.status)
    }

    /// The result or error value recorded by `complete`/`fail`, if any.
    pub fn get_result(&self, id: TaskId) -> Option<Value> {
        self.tasks.get(&id).and_then(|t| t.result.clone())
    }

    pub fn payload(&self, id: TaskId) -> Option<&Value> {
        self.tasks.get(&id).map(|t| &t.payload)
    }

    /// The full record for a task, for inspection.
    pub fn task(&self, id: TaskId) -> Option<Task> {
        self.tasks.get(&id).cloned()
    }

    /// Every task currently tracked, regardless of status.
    pub fn all(&self) -> Vec<Task> {
        self.tasks.values().cloned().collect()
    }

    /// Count of tasks still waiting on a dependency or sitting in the ready
    /// queue — i.e. not yet dispatched, completed, failed, or cancelled.
    pub fn pending_count(&self) -> usize {
        self.tasks
            .values()
            .filter(|t| matches!(t.status, TaskStatus::Pending | TaskStatus::Ready))
            .count()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn task(id: TaskId, role: &str, priority: u8, deps: Vec<TaskId>) -> Task {
        Task::new(id, vec![role.to_string()], priority, deps, json!({}))
    }

    fn roles(role: &str) -> Vec<String> {
        vec![role.to_string()]
    }

    #[test]
    fn duplicate_submission_is_rejected() {
        let mut sched = TaskScheduler::new();
        let id = TaskId::new();
        sched.submit(task(id, "worker", 5, vec![])).unwrap();
        assert!(sched.submit(task(id, "worker", 5, vec![])).is_err());
    }

    #[test]
    fn higher_priority_dispatched_first() {
        let mut sched = TaskScheduler::new();
        let low = TaskId::new();
        let high = TaskId::new();
        sched.submit(task(low, "worker", 1, vec![])).unwrap();
        sched.submit(task(high, "worker", 9, vec![])).unwrap();

        let dispatched = sched.get_next_task(&roles("worker")).unwrap();
        assert_eq!(dispatched.id, high);
    }

    #[test]
    fn role_filters_dispatch() {
        let mut sched = TaskScheduler::new();
        let reviewer_task = TaskId::new();
        sched.submit(task(reviewer_task, "reviewer", 5, vec![])).unwrap();
        assert!(sched.get_next_task(&roles("worker")).is_none());
        assert!(sched.get_next_task(&roles("reviewer")).is_some());
    }

    #[test]
    fn empty_required_roles_matches_any_role() {
        let mut sched = TaskScheduler::new();
        let id = TaskId::new();
        sched.submit(Task::new(id, vec![], 5, vec![], json!({}))).unwrap();
        assert_eq!(sched.get_next_task(&roles("whatever")).unwrap().id, id);
    }

    #[test]
    fn required_roles_match_on_any_intersection() {
        let mut sched = TaskScheduler::new();
        let id = TaskId::new();
        sched
            .submit(Task::new(id, vec!["reviewer".into(), "writer".into()], 5, vec![], json!({})))
            .unwrap();
        assert!(sched.get_next_task(&roles("editor")).is_none());
        assert_eq!(sched.get_next_task(&roles("writer")).unwrap().id, id);
    }

    #[test]
    fn dispatch_is_at_most_once() {
        let mut sched = TaskScheduler::new();
        let id = TaskId::new();
        sched.submit(task(id, "worker", 5, vec![])).unwrap();
        assert!(sched.get_next_task(&roles("worker")).is_some());
        assert!(sched.get_next_task(&roles("worker")).is_none());
    }

    #[test]
    fn dependent_becomes_ready_after_dependency_completes() {
        let mut sched = TaskScheduler::new();
        let base = TaskId::new();
        let dependent = TaskId::new();
        sched.submit(task(base, "worker", 5, vec![])).unwrap();
        sched.submit(task(dependent, "worker", 5, vec![base])).unwrap();

        assert_eq!(sched.status(dependent), Some(TaskStatus::Pending));
        let dispatched = sched.get_next_task(&roles("worker")).unwrap();
        assert_eq!(dispatched.id, base);
        sched.complete(base, json!("done")).unwrap();
        assert_eq!(sched.status(dependent), Some(TaskStatus::Ready));
        assert_eq!(sched.get_result(base), Some(json!("done")));
    }

    #[test]
    fn equal_priority_dispatches_fifo() {
        let mut sched = TaskScheduler::new();
        let first = TaskId::new();
        let second = TaskId::new();
        sched.submit(task(first, "worker", 5, vec![])).unwrap();
        sched.submit(task(second, "worker", 5, vec![])).unwrap();

        assert_eq!(sched.get_next_task(&roles("worker")).unwrap().id, first);
        assert_eq!(sched.get_next_task(&roles("worker")).unwrap().id, second);
    }

    #[test]
    fn cancel_removes_from_ready_queue() {
        let mut sched = TaskScheduler::new();
        let id = TaskId::new();
        sched.submit(task(id, "worker", 5, vec![])).unwrap();
        sched.cancel(id).unwrap();
        assert_eq!(sched.status(id), Some(TaskStatus::Cancelled));
        assert!(sched.get_next_task(&roles("worker")).is_none());
    }

    #[test]
    fn dependents_stay_pending_forever_on_failure() {
        let mut sched = TaskScheduler::new();
        let base = TaskId::new();
        let dependent = TaskId::new();
        sched.submit(task(base, "worker", 5, vec![])).unwrap();
        sched.submit(task(dependent, "worker", 5, vec![base])).unwrap();

        sched.get_next_task(&roles("worker")).unwrap();
        sched.fail(base, json!({"error": "boom"})).unwrap();
        assert_eq!(sched.status(dependent), Some(TaskStatus::Pending));
        assert_eq!(sched.status(base), Some(TaskStatus::Failed));
        assert_eq!(sched.get_result(base), Some(json!({"error": "boom"})));
    }

    #[test]
    fn update_status_records_assigned_agent() {
        let mut sched = TaskScheduler::new();
        let id = TaskId::new();
        sched.submit(task(id, "worker", 5, vec![])).unwrap();
        let agent = crate::ids::AgentId::new();
        sched.update_status(id, TaskStatus::Dispatched, Some(agent)).unwrap();
        assert_eq!(sched.status(id), Some(TaskStatus::Dispatched));
        assert_eq!(sched.task(id).unwrap().assigned_agent, Some(agent));
    }
}
