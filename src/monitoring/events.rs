//! Event types recorded by a [`super::Monitor`] (ambient observability, §A.1).

use chrono::{DateTime, Utc};

use crate::actor::AgentState;
use crate::ids::AgentId;
use crate::message::MessageKind;
use crate::supervisor::RestartStrategy;

/// Agent lifecycle and message-processing events.
#[derive(Debug, Clone)]
pub enum AgentEvent {
    /// The agent's message loop started running.
    Started { id: AgentId },
    /// The agent's message loop exited.
    Stopped { id: AgentId, state: AgentState },
    /// A registered handler returned an error.
    HandlerFailed { id: AgentId, kind: MessageKind },
}

impl AgentEvent {
    /// The agent this event concerns.
    pub fn agent_id(&self) -> AgentId {
        match self {
            Self::Started { id } | Self::Stopped { id, .. } | Self::HandlerFailed { id, .. } => {
                *id
            }
        }
    }
}

/// Supervisor tree events (§4.3).
#[derive(Debug, Clone)]
pub enum SupervisionEvent {
    /// A child was started under a supervisor.
    ChildStarted { supervisor: AgentId, child: AgentId },
    /// A child failed and the supervisor observed it.
    ChildFailed {
        supervisor: AgentId,
        child: AgentId,
        reason: String,
    },
    /// A child was restarted following a failure.
    ChildRestarted {
        supervisor: AgentId,
        child: AgentId,
        restart_count: u32,
    },
    /// The sliding-window restart limit was exceeded; the child was not restarted.
    RestartLimitExceeded { supervisor: AgentId, child: AgentId },
    /// A restart strategy was applied, naming which siblings were affected.
    StrategyApplied {
        supervisor: AgentId,
        strategy: RestartStrategy,
        affected: Vec<AgentId>,
    },
}

/// A recorded event with the wall-clock time it was observed, used by
/// [`super::InMemoryMonitor`] for history retention.
#[derive(Debug, Clone)]
pub struct Recorded<E> {
    pub at: DateTime<Utc>,
    pub event: E,
}

impl<E> Recorded<E> {
    pub(crate) fn now(event: E) -> Self {
        Self {
            at: Utc::now(),
            event,
        }
    }
}
