//! Per-agent context handed to handlers while a message is being processed.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use tokio::sync::mpsc::UnboundedSender;

// Layer 3: Internal module imports
use crate::ids::AgentId;
use crate::message::Message;

/// Metadata and an outbox available to a [`super::handler::Handler`] while it
/// runs.
///
/// Handlers never hold a direct reference to the registry or to other
/// agents' mailboxes; they can only push outbound messages onto `outbox`,
/// which the owning [`super::runtime::AgentRuntime`] drains and routes after
/// the handler returns. This keeps a single agent's message loop the only
/// thing ever mutating its own state.
pub struct AgentContext {
    id: AgentId,
    created_at: DateTime<Utc>,
    outbox: UnboundedSender<Message>,
}

impl AgentContext {
    pub(crate) fn new(id: AgentId, outbox: UnboundedSender<Message>) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            outbox,
        }
    }

    /// This agent's id.
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// When this agent's context was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Queue a message for delivery once the current handler returns.
    ///
    /// Errors only if the runtime loop has already shut down.
    pub fn send(&self, message: Message) {
        let _ = self.outbox.send(message);
    }
}
