//! Agents: mailbox-driven actors with runtime-registered per-kind handlers (§4.1).

mod context;
mod handler;
mod lifecycle;
mod runtime;

pub use context::AgentContext;
pub use handler::{BoxedHandlerFuture, Handler};
pub use lifecycle::{AgentLifecycle, AgentState};
pub use runtime::{AgentHandle, AgentRuntime, SharedLifecycle};
