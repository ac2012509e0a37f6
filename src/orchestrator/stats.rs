//! Aggregate runtime statistics (§6.2's `GET /v1/agents/stats`).

use serde::Serialize;

/// Point-in-time snapshot of everything the orchestrator coordinates.
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub agent_count: usize,
    pub pending_tasks: usize,
    pub total_tasks: usize,
    pub knowledge_entries: usize,
    pub open_votes: usize,
    pub queued_messages: usize,
}
