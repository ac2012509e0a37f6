//! The agent message loop (§4.1, §4.3).
//!
//! Each agent owns exactly one [`AgentRuntime`], driven to completion by a
//! single `tokio::spawn`ed task. Handlers are looked up by [`MessageKind`]
//! in a plain `HashMap`; unregistered kinds fall through to the agent's
//! built-in defaults (`Heartbeat` replies `HeartbeatAck`; `Shutdown` stops
//! the loop once handled, discarding anything still queued behind it).
//! Outbound messages a handler produces are pushed onto
//! `outbound`, a channel the registry drains to actually route them — the
//! runtime never reaches into another agent's mailbox itself.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{debug, warn};

// Layer 3: Internal module imports
use super::context::AgentContext;
use super::handler::Handler;
use super::lifecycle::{AgentLifecycle, AgentState};
use crate::circuit_breaker::CircuitBreaker;
use crate::ids::{AgentId, TaskId};
use crate::mailbox::{self, MailboxReceiver, MailboxSender};
use crate::message::{Message, MessageKind, Payload};
use crate::monitoring::{AgentEvent, Monitor};

/// Shared, externally observable lifecycle state for one agent.
pub type SharedLifecycle = Arc<RwLock<AgentLifecycle>>;

/// Everything needed to drive one agent's message loop.
pub struct AgentRuntime {
    id: AgentId,
    lifecycle: SharedLifecycle,
    mailbox: MailboxReceiver,
    handlers: HashMap<MessageKind, Arc<dyn Handler>>,
    monitor: Arc<dyn Monitor>,
    outbound: mpsc::UnboundedSender<Message>,
    circuit_breaker: Arc<CircuitBreaker>,
    supervisor: Option<AgentId>,
}

/// A handle to a spawned agent, held by whoever created it (typically the
/// [`crate::registry::AgentRegistry`]).
#[derive(Clone)]
pub struct AgentHandle {
    id: AgentId,
    role: String,
    sender: MailboxSender,
    lifecycle: SharedLifecycle,
    current_task: Arc<RwLock<Option<TaskId>>>,
    created_at: i64,
}

impl AgentHandle {
    /// This agent's id.
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// The role this agent was spawned under, used for task/role matching.
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AgentState {
        self.lifecycle.read().state()
    }

    /// Force this agent's tracked state, bypassing its own internal
    /// transitions. Used by the registry to reflect externally observed
    /// state (e.g. a supervisor marking an unresponsive agent `Failed`).
    pub fn force_state(&self, state: AgentState) {
        self.lifecycle.write().transition_to(state);
    }

    /// The task currently assigned to this agent, if any.
    pub fn current_task(&self) -> Option<TaskId> {
        *self.current_task.read()
    }

    /// Record (or clear) the task currently assigned to this agent.
    pub fn set_current_task(&self, task: Option<TaskId>) {
        *self.current_task.write() = task;
    }

    /// Epoch-millisecond timestamp this agent was spawned at.
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Enqueue a message into this agent's mailbox.
    pub async fn send(&self, message: Message) -> Result<(), mailbox::MailboxError> {
        self.sender.send(message).await
    }

    /// Ask this agent to shut down cooperatively.
    pub async fn shutdown(&self) -> Result<(), mailbox::MailboxError> {
        self.sender
            .send(Message::broadcast(None, MessageKind::Shutdown, Payload::Empty))
            .await
    }
}

impl AgentRuntime {
    /// Build a runtime and its paired external handle.
    ///
    /// `outbound` is where any message a handler sends via
    /// [`AgentContext::send`] ends up; the caller (registry/orchestrator) is
    /// responsible for draining it and routing each message onward.
    pub fn new(
        id: AgentId,
        role: impl Into<String>,
        mailbox_capacity: usize,
        monitor: Arc<dyn Monitor>,
        outbound: mpsc::UnboundedSender<Message>,
        created_at: i64,
    ) -> (Self, AgentHandle, MailboxSender) {
        Self::with_supervision(
            id,
            role,
            mailbox_capacity,
            monitor,
            outbound,
            created_at,
            Arc::new(CircuitBreaker::new(5, 2, 30_000, crate::clock::system_clock())),
            None,
        )
    }

    /// Build a runtime wired to a circuit breaker and an optional supervisor
    /// to notify (via an ERROR message) on handler failure.
    #[allow(clippy::too_many_arguments)]
    pub fn with_supervision(
        id: AgentId,
        role: impl Into<String>,
        mailbox_capacity: usize,
        monitor: Arc<dyn Monitor>,
        outbound: mpsc::UnboundedSender<Message>,
        created_at: i64,
        circuit_breaker: Arc<CircuitBreaker>,
        supervisor: Option<AgentId>,
    ) -> (Self, AgentHandle, MailboxSender) {
        let (tx, rx) = mailbox::channel(mailbox_capacity);
        let lifecycle = Arc::new(RwLock::new(AgentLifecycle::new()));

        let handle = AgentHandle {
            id,
            role: role.into(),
            sender: tx.clone(),
            lifecycle: Arc::clone(&lifecycle),
            current_task: Arc::new(RwLock::new(None)),
            created_at,
        };

        let runtime = Self {
            id,
            lifecycle,
            mailbox: rx,
            handlers: HashMap::new(),
            monitor,
            outbound,
            circuit_breaker,
            supervisor,
        };

        (runtime, handle, tx)
    }

    /// Register a handler for one message kind, replacing any prior one.
    pub fn register_handler(&mut self, kind: MessageKind, handler: Arc<dyn Handler>) {
        self.handlers.insert(kind, handler);
    }

    /// Run the message loop to completion, returning the terminal state.
    ///
    /// Per §4.1's drain-on-stop contract: once `Shutdown` is observed the
    /// loop finishes the message currently in hand, then exits without
    /// processing whatever else is still queued.
    pub async fn run(mut self) -> AgentState {
        self.lifecycle.write().transition_to(AgentState::Starting);
        self.monitor.record_agent(AgentEvent::Started { id: self.id });
        self.lifecycle.write().transition_to(AgentState::Running);

        loop {
            let Some(message) = self.mailbox.recv().await else {
                break;
            };

            if message.kind == MessageKind::Shutdown {
                self.lifecycle.write().transition_to(AgentState::Stopping);
                self.dispatch(&message).await;
                self.lifecycle.write().transition_to(AgentState::Stopped);
                break;
            }

            self.dispatch(&message).await;

            if self.lifecycle.read().state() == AgentState::Failed {
                break;
            }
        }

        let final_state = self.lifecycle.read().state();
        self.monitor.record_agent(AgentEvent::Stopped {
            id: self.id,
            state: final_state,
        });
        final_state
    }

    async fn dispatch(&mut self, message: &Message) {
        let mut ctx = AgentContext::new(self.id, self.outbound.clone());

        if let Some(handler) = self.handlers.get(&message.kind).cloned() {
            if !self.circuit_breaker.allow_request() {
                warn!(agent = %self.id, kind = ?message.kind, "circuit open, handler skipped");
                self.notify_supervisor(&mut ctx, format!("circuit open for {:?}", message.kind));
                return;
            }

            if let Err(err) = handler.handle(message, &mut ctx).await {
                warn!(agent = %self.id, kind = ?message.kind, error = %err, "handler failed");
                self.circuit_breaker.record_failure();
                self.monitor.record_agent(AgentEvent::HandlerFailed {
                    id: self.id,
                    kind: message.kind,
                });
                self.notify_supervisor(&mut ctx, err.to_string());
                if !err.is_transient() {
                    self.lifecycle.write().transition_to(AgentState::Failed);
                }
            } else {
                self.circuit_breaker.record_success();
            }
            return;
        }

        match message.kind {
            MessageKind::Heartbeat => {
                let reply_to = message.from.unwrap_or(self.id);
                ctx.send(Message::new(
                    Some(self.id),
                    reply_to,
                    MessageKind::HeartbeatAck,
                    Payload::Empty,
                ));
            }
            _ => {
                debug!(agent = %self.id, kind = ?message.kind, "no handler registered for message kind");
            }
        }
    }

    /// Send an ERROR message to this agent's supervisor, if it has one.
    /// Notification only — the runtime never restarts itself.
    fn notify_supervisor(&self, ctx: &mut AgentContext, reason: String) {
        if let Some(supervisor) = self.supervisor {
            ctx.send(Message::new(
                Some(self.id),
                supervisor,
                MessageKind::Error,
                Payload::Error { message: reason },
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::monitoring::NoopMonitor;

    struct CountingHandler(Arc<AtomicUsize>);

    #[async_trait]
    impl Handler for CountingHandler {
        async fn handle(
            &self,
            _message: &Message,
            _ctx: &mut AgentContext,
        ) -> Result<(), crate::error::RuntimeError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingHandler(Arc<AtomicUsize>);

    #[async_trait]
    impl Handler for FailingHandler {
        async fn handle(
            &self,
            _message: &Message,
            _ctx: &mut AgentContext,
        ) -> Result<(), crate::error::RuntimeError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(crate::error::RuntimeError::Transient("boom".into()))
        }
    }

    #[tokio::test]
    async fn shutdown_discards_messages_queued_behind_it() {
        let (outbound_tx, _outbound_rx) = mpsc::unbounded_channel();
        let count = Arc::new(AtomicUsize::new(0));
        let (mut runtime, _handle, tx) =
            AgentRuntime::new(AgentId::new(), "worker", 10, Arc::new(NoopMonitor), outbound_tx, 0);
        runtime.register_handler(MessageKind::User, Arc::new(CountingHandler(Arc::clone(&count))));

        tx.send(Message::broadcast(None, MessageKind::User, Payload::Empty))
            .await
            .unwrap();
        tx.send(Message::broadcast(None, MessageKind::Shutdown, Payload::Empty))
            .await
            .unwrap();
        tx.send(Message::broadcast(None, MessageKind::User, Payload::Empty))
            .await
            .unwrap();

        let final_state = runtime.run().await;

        assert_eq!(final_state, AgentState::Stopped);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(tx.len().await, 1);
    }

    #[tokio::test]
    async fn open_circuit_breaker_skips_handler_and_notifies_supervisor() {
        use crate::circuit_breaker::CircuitState;
        use crate::clock::fake::FakeClock;

        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
        let count = Arc::new(AtomicUsize::new(0));
        let supervisor = AgentId::new();
        let breaker = Arc::new(CircuitBreaker::new(2, 1, 60_000, Arc::new(FakeClock::new(0))));

        let (mut runtime, _handle, tx) = AgentRuntime::with_supervision(
            AgentId::new(),
            "worker",
            10,
            Arc::new(NoopMonitor),
            outbound_tx,
            0,
            Arc::clone(&breaker),
            Some(supervisor),
        );
        runtime.register_handler(MessageKind::User, Arc::new(FailingHandler(Arc::clone(&count))));

        for _ in 0..3 {
            tx.send(Message::broadcast(None, MessageKind::User, Payload::Empty)).await.unwrap();
        }
        tx.send(Message::broadcast(None, MessageKind::Shutdown, Payload::Empty)).await.unwrap();

        runtime.run().await;

        // Two failures trip the breaker; the third message finds it open and
        // never reaches the handler.
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(breaker.state(), CircuitState::Open);

        let mut notices = Vec::new();
        while let Ok(msg) = outbound_rx.try_recv() {
            notices.push(msg);
        }
        assert_eq!(notices.len(), 3);
        assert!(notices.iter().all(|m| m.to == Some(supervisor) && m.kind == MessageKind::Error));
    }
}
