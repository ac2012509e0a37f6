//! Per-kind message handlers (§4.1).
//!
//! An agent registers a handler per [`MessageKind`] at runtime rather than
//! dispatching through a single compile-time message type, so `Handler` is
//! an object-safe `async_trait` dispatched through an `Arc<dyn Handler>`
//! rather than a generic parameter.

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use super::context::AgentContext;
use crate::error::RuntimeError;
use crate::message::Message;

/// Handles one [`crate::message::MessageKind`] for a single agent.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Process one message, optionally emitting replies via `ctx`.
    async fn handle(&self, message: &Message, ctx: &mut AgentContext) -> Result<(), RuntimeError>;
}

#[async_trait]
impl<F> Handler for F
where
    F: for<'a> Fn(&'a Message, &'a mut AgentContext) -> BoxedHandlerFuture<'a> + Send + Sync,
{
    async fn handle(&self, message: &Message, ctx: &mut AgentContext) -> Result<(), RuntimeError> {
        (self)(message, ctx).await
    }
}

/// Boxed future returned by closures used as [`Handler`]s.
pub type BoxedHandlerFuture<'a> =
    std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), RuntimeError>> + Send + 'a>>;
