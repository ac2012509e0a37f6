//! Structured message payloads (§9 design note on opaque payloads).
//!
//! Rather than carrying an opaque byte sequence parsed at the destination,
//! each message kind that needs structured fields gets its own payload
//! variant — the `Lock*`/`Doc*` messages in particular get typed section
//! indices instead of a re-parsed integer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{TaskId, VoteId};

/// Structured payload carried by a [`super::Message`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    /// Free-form payload for USER/REQUEST/RESPONSE/BROADCAST/DIRECT/EVENT.
    Json(Value),
    /// LOCK_REQUEST / LOCK_RELEASE / LOCK_ACQUIRED / LOCK_DENIED section index.
    Section { section_idx: usize },
    /// DOC_EDIT bytes targeting a section.
    DocEdit { section_idx: usize, bytes: Vec<u8> },
    /// DOC_UPDATE notification naming the edited section.
    DocUpdate { section_idx: usize },
    /// TASK announcement.
    Task { task_id: TaskId },
    /// TASK_RESULT payload.
    TaskResult {
        task_id: TaskId,
        success: bool,
        output: Value,
        error: String,
        duration_ms: u64,
    },
    /// ERROR notification sent to a supervisor.
    Error { message: String },
    /// CONSENSUS payload referencing a vote.
    Consensus { vote_id: VoteId },
    /// Empty payload (HEARTBEAT / HEARTBEAT_ACK / SHUTDOWN).
    Empty,
}

impl Payload {
    /// Convenience constructor for free-form JSON payloads.
    pub fn json(value: impl Serialize) -> Self {
        Self::Json(serde_json::to_value(value).unwrap_or(Value::Null))
    }
}

impl Default for Payload {
    fn default() -> Self {
        Self::Empty
    }
}
