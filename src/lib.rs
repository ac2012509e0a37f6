//! # agentmesh-rt — in-process multi-agent coordination runtime
//!
//! A runtime for composing several autonomous agents inside one process:
//! each agent runs its own supervised mailbox loop, and a shared
//! [`Orchestrator`] gives agents a registry to address each other through,
//! a section-locked shared document, a tagged knowledge base, a
//! priority-and-dependency task scheduler, and a consensus voting
//! mechanism for decisions that need more than one agent's say-so.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use agentmesh_rt::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), RuntimeError> {
//!     let orchestrator = Orchestrator::new(Config::default(), Arc::new(NoopMonitor));
//!     let a = orchestrator.spawn_agent("writer", Some("writer".into())).await?;
//!     let b = orchestrator.spawn_agent("reviewer", Some("reviewer".into())).await?;
//!     orchestrator
//!         .send_message(Message::new(Some(a), b, MessageKind::User, Payload::Empty))
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! # Module organization
//!
//! ## Identity and time
//! - [`ids`] — UUID newtypes addressing agents, messages, tasks, and votes
//! - [`clock`] — injectable wall-clock abstraction for deterministic tests
//! - [`error`] — crate-wide error taxonomy
//! - [`config`] — runtime tunables and defaults
//!
//! ## Messaging
//! - [`message`] — envelope, kind, and payload types
//! - [`mailbox`] — bounded per-agent message channel
//! - [`circuit_breaker`] — trips on repeated handler failure
//! - [`health`] — liveness tracking via heartbeat timestamps
//!
//! ## Agent execution
//! - [`actor`] — handler trait, lifecycle, and the supervised run loop
//! - [`monitoring`] — observability events emitted by agents and the supervisor
//!
//! ## Coordination
//! - [`registry`] — agent directory and message routing/broadcast
//! - [`supervisor`] — restart strategies and rate limiting
//! - [`document`] — section-locked shared document
//! - [`knowledge`] — tagged, versioned shared knowledge base
//! - [`scheduler`] — priority-and-dependency task queue
//! - [`consensus`] — majority/supermajority/unanimous/weighted voting
//!
//! ## Composition root
//! - [`orchestrator`] — wires every component above into one handle

pub mod actor;
pub mod circuit_breaker;
pub mod clock;
pub mod config;
pub mod consensus;
pub mod document;
pub mod error;
pub mod health;
pub mod ids;
pub mod knowledge;
pub mod mailbox;
pub mod message;
pub mod monitoring;
pub mod orchestrator;
pub mod registry;
pub mod scheduler;
pub mod supervisor;

pub mod prelude;

pub use config::Config;
pub use error::RuntimeError;
pub use orchestrator::{Orchestrator, WorkflowStep};
