//! The `Message` envelope (§3 data model).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use chrono::Utc;
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use super::{MessageKind, Payload};
use crate::ids::{AgentId, MessageId};

/// A single message exchanged between agents.
///
/// `to: None` means broadcast (§3). `priority` ranges 0-10, 10 highest,
/// matching the mailbox's notion of urgency even though the default
/// mailbox delivers strictly FIFO per recipient (priority is informative
/// for callers building their own dispatch, not reordered by the mailbox).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub from: Option<AgentId>,
    pub to: Option<AgentId>,
    pub kind: MessageKind,
    pub payload: Payload,
    pub subject: Option<String>,
    pub conversation: Option<MessageId>,
    pub priority: u8,
    pub timestamp_ms: i64,
}

impl Message {
    /// Build a message addressed to a specific recipient.
    pub fn new(from: Option<AgentId>, to: AgentId, kind: MessageKind, payload: Payload) -> Self {
        Self {
            id: MessageId::new(),
            from,
            to: Some(to),
            kind,
            payload,
            subject: None,
            conversation: None,
            priority: 5,
            timestamp_ms: Utc::now().timestamp_millis(),
        }
    }

    /// Build a broadcast message (`to == None`).
    pub fn broadcast(from: Option<AgentId>, kind: MessageKind, payload: Payload) -> Self {
        Self {
            id: MessageId::new(),
            from,
            to: None,
            kind,
            payload,
            subject: None,
            conversation: None,
            priority: 5,
            timestamp_ms: Utc::now().timestamp_millis(),
        }
    }

    /// Whether this message is a broadcast (empty `to`).
    pub fn is_broadcast(&self) -> bool {
        self.to.is_none()
    }

    /// Attach a priority (0-10, clamped).
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority.min(10);
        self
    }

    /// Attach a subject line.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Attach a correlation id.
    pub fn with_conversation(mut self, conversation: MessageId) -> Self {
        self.conversation = Some(conversation);
        self
    }
}
