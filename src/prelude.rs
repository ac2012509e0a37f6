//! Convenience re-exports for building on top of the runtime.
//!
//! ```rust,ignore
//! use agentmesh_rt::prelude::*;
//! ```
//!
//! # What's included
//!
//! ## Identity, time, errors, configuration
//! - [`AgentId`], [`MessageId`], [`TaskId`], [`VoteId`] — UUID newtypes
//! - [`Clock`], [`SharedClock`], [`system_clock`] — injectable wall clock
//! - [`RuntimeError`] — the aggregate error type every operation returns
//! - [`Config`], [`ConfigBuilder`] — runtime tunables
//!
//! ## Messaging
//! - [`Message`], [`MessageKind`], [`Payload`] — the wire envelope
//! - [`MailboxSender`], [`MailboxReceiver`], [`MailboxError`] — per-agent channel
//! - [`CircuitBreaker`], [`CircuitState`] — handler failure containment
//! - [`HealthStatus`] — heartbeat-driven liveness
//!
//! ## Agent execution
//! - [`Handler`] — the trait agent logic implements
//! - [`AgentContext`] — what a handler uses to reply or emit messages
//! - [`AgentRuntime`], [`AgentHandle`] — the run loop and its external handle
//! - [`AgentLifecycle`], [`AgentState`] — lifecycle tracking
//! - [`Monitor`], [`InMemoryMonitor`], [`NoopMonitor`] — observability sinks
//! - [`AgentEvent`], [`SupervisionEvent`], [`Recorded`] — event types
//!
//! ## Coordination
//! - [`AgentRegistry`], [`AgentInfo`] — directory and routing
//! - [`Supervisor`], [`RestartStrategy`], [`RestartRateLimiter`] — supervision
//! - [`DocumentCoordinator`], [`Section`], [`LockState`] — shared document
//! - [`KnowledgeBase`], [`KnowledgeEntry`] — shared knowledge store
//! - [`TaskScheduler`], [`Task`], [`TaskStatus`] — task queue
//! - [`ConsensusManager`], [`Vote`], [`VoteKind`], [`VoteStatus`], [`Ballot`] — voting
//!
//! ## Composition root
//! - [`Orchestrator`], [`WorkflowStep`], [`Stats`] — the top-level handle

// Identity, time, errors, configuration
pub use crate::clock::{system_clock, Clock, SharedClock};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::RuntimeError;
pub use crate::ids::{AgentId, MessageId, TaskId, VoteId};

// Messaging
pub use crate::circuit_breaker::{CircuitBreaker, CircuitState};
pub use crate::health::HealthStatus;
pub use crate::mailbox::{MailboxError, MailboxReceiver, MailboxSender};
pub use crate::message::{Message, MessageKind, Payload};

// Agent execution
pub use crate::actor::{AgentContext, AgentHandle, AgentLifecycle, AgentRuntime, AgentState, Handler};
pub use crate::monitoring::{AgentEvent, InMemoryMonitor, Monitor, NoopMonitor, Recorded, SupervisionEvent};

// Coordination
pub use crate::consensus::{Ballot, ConsensusManager, Vote, VoteKind, VoteStatus};
pub use crate::document::{DocumentCoordinator, LockState, Section, SECTION_WIDTH};
pub use crate::knowledge::{KnowledgeBase, KnowledgeEntry};
pub use crate::registry::{AgentInfo, AgentRegistry};
pub use crate::scheduler::{Task, TaskScheduler, TaskStatus};
pub use crate::supervisor::{RestartRateLimiter, RestartStrategy, Supervisor};

// Composition root
pub use crate::orchestrator::{Orchestrator, Stats, WorkflowStep};
