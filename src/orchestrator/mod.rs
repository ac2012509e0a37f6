//! Process-wide coordinator composing the registry, supervisor, document
//! coordinator, knowledge base, scheduler, and consensus manager (§4.9).
//!
//! An `Arc<Inner>` handle, cheaply `Clone`, that spawns its own background
//! workers at construction time — a message-forwarding task (draining every
//! agent's outbound channel into the registry, since `AgentRuntime` never
//! routes directly) and the housekeeping sweep (§4.9).

mod health_monitor;
mod housekeeping;
mod stats;

pub use stats::Stats;

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use parking_lot::Mutex as SyncMutex;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio::task::JoinHandle;

// Layer 3: Internal module imports
use crate::actor::{AgentRuntime, AgentState};
use crate::circuit_breaker::CircuitBreaker;
use crate::clock::{system_clock, SharedClock};
use crate::config::Config;
use crate::consensus::{ConsensusManager, Vote, VoteKind};
use crate::document::DocumentCoordinator;
use crate::error::RuntimeError;
use crate::ids::{AgentId, TaskId, VoteId};
use crate::knowledge::{KnowledgeBase, KnowledgeEntry};
use crate::message::{Message, MessageKind, Payload};
use crate::monitoring::{Monitor, SupervisionEvent};
use crate::registry::{AgentInfo, AgentRegistry};
use crate::scheduler::{Task, TaskScheduler};
use crate::supervisor::{RestartStrategy, Supervisor};

/// One step of a batch task submission (§6.2 `POST /v1/tasks/workflow`).
///
/// `depends_on` indices refer to other steps in the same batch, resolved to
/// freshly minted [`TaskId`]s before any step is submitted — so a later step
/// can depend on an earlier one without the caller pre-allocating ids.
#[derive(Debug, Clone)]
pub struct WorkflowStep {
    pub required_roles: Vec<String>,
    pub priority: u8,
    pub depends_on: Vec<usize>,
    pub payload: Value,
}

struct Inner {
    config: Config,
    clock: SharedClock,
    monitor: Arc<dyn Monitor>,
    registry: AgentRegistry,
    supervisor_id: AgentId,
    supervisor: AsyncMutex<Supervisor>,
    document: AsyncMutex<DocumentCoordinator>,
    knowledge: KnowledgeBase,
    scheduler: AsyncMutex<TaskScheduler>,
    consensus: AsyncMutex<ConsensusManager>,
    messages: Arc<SyncMutex<Vec<(Message, i64)>>>,
    outbound: mpsc::UnboundedSender<Message>,
    forwarder: SyncMutex<Option<JoinHandle<()>>>,
    housekeeper: SyncMutex<Option<JoinHandle<()>>>,
    health_monitor: SyncMutex<Option<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = self.forwarder.lock().take() {
            handle.abort();
        }
        if let Some(handle) = self.housekeeper.lock().take() {
            handle.abort();
        }
        if let Some(handle) = self.health_monitor.lock().take() {
            handle.abort();
        }
    }
}

/// Composition root for one running mesh of agents.
///
/// Cheaply cloneable — every clone shares the same registry, scheduler,
/// knowledge base, and background workers.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

impl Orchestrator {
    /// Build a new orchestrator, spawning its message forwarder and
    /// housekeeping loop immediately.
    pub fn new(config: Config, monitor: Arc<dyn Monitor>) -> Self {
        Self::with_clock(config, monitor, system_clock())
    }

    /// Build a new orchestrator against an explicit clock, for deterministic
    /// tests of the housekeeping sweep.
    pub fn with_clock(config: Config, monitor: Arc<dyn Monitor>, clock: SharedClock) -> Self {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let messages = Arc::new(SyncMutex::new(Vec::new()));
        let supervisor_id = AgentId::new();

        let mut supervisor = Supervisor::new(
            supervisor_id,
            RestartStrategy::OneForOne,
            config.max_restarts,
            config.max_restart_window_ms,
            Arc::clone(&monitor),
        );
        supervisor.start();

        let inner = Arc::new(Inner {
            registry: AgentRegistry::new(),
            supervisor_id,
            supervisor: AsyncMutex::new(supervisor),
            document: AsyncMutex::new(DocumentCoordinator::new(config.document_size)),
            knowledge: KnowledgeBase::new(config.kb_max_entries),
            scheduler: AsyncMutex::new(TaskScheduler::new()),
            consensus: AsyncMutex::new(ConsensusManager::new()),
            messages: Arc::clone(&messages),
            outbound: outbound_tx,
            forwarder: SyncMutex::new(None),
            housekeeper: SyncMutex::new(None),
            health_monitor: SyncMutex::new(None),
            clock: Arc::clone(&clock),
            monitor,
            config: config.clone(),
        });

        *inner.forwarder.lock() = Some(spawn_forwarder(Arc::clone(&inner), outbound_rx));
        *inner.housekeeper.lock() = Some(housekeeping::spawn(
            messages,
            clock,
            config.housekeeping_interval_ms,
            config.retention_ms,
        ));
        *inner.health_monitor.lock() = Some(health_monitor::spawn(
            Arc::clone(&inner),
            config.health_check_interval_ms,
        ));

        Self { inner }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    // ---- Agents (composes C5/C6/C7) ----------------------------------

    /// Spawn and register a new agent, optionally under a named slot.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Policy` at `max_agents` capacity, or
    /// `RuntimeError::Conflict` on a slot collision.
    pub async fn spawn_agent(
        &self,
        role: impl Into<String>,
        slot: Option<String>,
    ) -> Result<AgentId, RuntimeError> {
        if self.inner.registry.len() >= self.inner.config.max_agents {
            return Err(RuntimeError::Policy(format!(
                "max_agents ({}) reached",
                self.inner.config.max_agents
            )));
        }

        let id = AgentId::new();
        let now = self.inner.clock.now_ms();
        let circuit_breaker = Arc::new(CircuitBreaker::new(
            self.inner.config.failure_threshold,
            self.inner.config.success_threshold,
            self.inner.config.open_timeout_ms,
            Arc::clone(&self.inner.clock),
        ));
        let (runtime, handle, _sender) = AgentRuntime::with_supervision(
            id,
            role,
            self.inner.config.mailbox_capacity,
            Arc::clone(&self.inner.monitor),
            self.inner.outbound.clone(),
            now,
            circuit_breaker,
            Some(self.inner.supervisor_id),
        );
        self.inner.registry.register(handle, slot)?;

        self.inner.supervisor.lock().await.add_child(
            id,
            now,
            self.inner.config.default_agent_timeout_ms,
        );

        tokio::spawn(runtime.run());
        Ok(id)
    }

    pub fn list_agents(&self) -> Vec<AgentId> {
        self.inner.registry.ids()
    }

    pub fn get_agent(&self, id: AgentId) -> Option<AgentInfo> {
        self.inner.registry.get(id).map(|h| AgentInfo::from(&h))
    }

    pub fn get_agent_by_slot(&self, slot: &str) -> Option<AgentId> {
        self.inner.registry.get_by_slot(slot)
    }

    pub fn is_slot_agent(&self, id: AgentId, slot: &str) -> bool {
        self.inner.registry.is_slot_agent(id, slot)
    }

    pub fn update_agent_state(&self, id: AgentId, state: AgentState) -> bool {
        self.inner.registry.update_state(id, state)
    }

    pub fn update_agent_current_task(&self, id: AgentId, task: Option<TaskId>) -> bool {
        self.inner.registry.update_current_task(id, task)
    }

    pub fn get_agents_by_role(&self, role: &str) -> Vec<AgentId> {
        self.inner.registry.get_agents_by_role(role)
    }

    pub fn get_agents_by_state(&self, state: AgentState) -> Vec<AgentId> {
        self.inner.registry.get_agents_by_state(state)
    }

    pub fn get_all_agents(&self) -> Vec<AgentInfo> {
        self.inner.registry.get_all_agents()
    }

    /// Ask an agent to shut down and drop it from the registry and its
    /// supervisor.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::NotFound` if `id` is not registered.
    pub async fn terminate_agent(&self, id: AgentId) -> Result<(), RuntimeError> {
        let handle = self
            .inner
            .registry
            .get(id)
            .ok_or_else(|| RuntimeError::agent_not_found(id))?;
        let _ = handle.shutdown().await;
        self.inner.registry.unregister(id);
        self.inner.supervisor.lock().await.remove_child(id);
        Ok(())
    }

    // ---- Messaging (composes C4/C6) -----------------------------------

    /// Send a direct message, logging it for retention/`drain_messages`.
    pub async fn send_message(&self, message: Message) -> Result<(), RuntimeError> {
        self.log_message(message.clone());
        self.inner.registry.route(message).await
    }

    /// Broadcast a message to every agent except `exclude`.
    pub async fn broadcast_message(&self, message: Message, exclude: Option<AgentId>) {
        self.log_message(message.clone());
        self.inner.registry.broadcast(message, exclude).await;
    }

    /// Drain every logged message addressed to `agent_id`.
    pub fn drain_messages(&self, agent_id: AgentId) -> Vec<Message> {
        let mut log = self.inner.messages.lock();
        let (mine, rest): (Vec<_>, Vec<_>) =
            log.drain(..).partition(|(m, _)| m.to == Some(agent_id));
        *log = rest;
        mine.into_iter().map(|(m, _)| m).collect()
    }

    fn log_message(&self, message: Message) {
        let now = self.inner.clock.now_ms();
        self.inner.messages.lock().push((message, now));
    }

    // ---- Document coordination (composes C8) ---------------------------

    pub async fn request_lock(&self, section_idx: usize, requester: AgentId) -> Message {
        self.inner.document.lock().await.request_lock(section_idx, requester)
    }

    pub async fn release_lock(&self, section_idx: usize, requester: AgentId) -> Result<(), RuntimeError> {
        self.inner.document.lock().await.release_lock(section_idx, requester)
    }

    pub async fn edit_document(
        &self,
        section_idx: usize,
        editor: AgentId,
        bytes: Vec<u8>,
    ) -> Result<Message, RuntimeError> {
        self.inner.document.lock().await.edit(section_idx, editor, bytes)
    }

    // ---- Knowledge base (composes C9) -----------------------------------

    /// Insert or update a knowledge entry, routing change notices to any
    /// subscribers.
    pub async fn put_knowledge(
        &self,
        key: impl Into<String>,
        value: Value,
        contributor: AgentId,
        tags: Vec<String>,
    ) -> Result<u64, RuntimeError> {
        let now = self.inner.clock.now_ms();
        let (version, events) = self.inner.knowledge.put(key, value, contributor, tags, now)?;
        for event in events {
            let _ = self.inner.registry.route(event).await;
        }
        Ok(version)
    }

    pub fn get_knowledge(&self, key: &str) -> Option<KnowledgeEntry> {
        self.inner.knowledge.get(key)
    }

    /// Full version history of `key`, oldest first.
    pub fn history_knowledge(&self, key: &str) -> Vec<KnowledgeEntry> {
        self.inner.knowledge.history(key)
    }

    pub fn query_knowledge(&self, tags: &[String]) -> Vec<KnowledgeEntry> {
        self.inner.knowledge.query_by_tags(tags)
    }

    pub fn subscribe_knowledge(&self, key: impl Into<String>, agent: AgentId) {
        self.inner.knowledge.subscribe(key, agent);
    }

    pub fn unsubscribe_knowledge(&self, key: &str, agent: AgentId) {
        self.inner.knowledge.unsubscribe(key, agent);
    }

    // ---- Task scheduler (composes C10) ----------------------------------

    pub async fn submit_task(
        &self,
        required_roles: Vec<String>,
        priority: u8,
        dependencies: Vec<TaskId>,
        payload: Value,
    ) -> Result<TaskId, RuntimeError> {
        let id = TaskId::new();
        self.inner
            .scheduler
            .lock()
            .await
            .submit(Task::new(id, required_roles, priority, dependencies, payload))?;
        Ok(id)
    }

    /// Submit a batch of tasks whose `depends_on` indices reference each
    /// other within the same batch.
    pub async fn submit_workflow(&self, steps: Vec<WorkflowStep>) -> Result<Vec<TaskId>, RuntimeError> {
        let ids: Vec<TaskId> = steps.iter().map(|_| TaskId::new()).collect();
        let mut scheduler = self.inner.scheduler.lock().await;
        for (i, step) in steps.into_iter().enumerate() {
            let dependencies = step.depends_on.iter().map(|&idx| ids[idx]).collect();
            scheduler.submit(Task::new(ids[i], step.required_roles, step.priority, dependencies, step.payload))?;
        }
        Ok(ids)
    }

    pub async fn get_task(&self, id: TaskId) -> Option<Task> {
        self.inner.scheduler.lock().await.task(id)
    }

    pub async fn list_tasks(&self) -> Vec<Task> {
        self.inner.scheduler.lock().await.all()
    }

    pub async fn cancel_task(&self, id: TaskId) -> Result<(), RuntimeError> {
        self.inner.scheduler.lock().await.cancel(id)
    }

    pub async fn get_next_task(&self, roles: &[String]) -> Option<Task> {
        self.inner.scheduler.lock().await.get_next_task(roles)
    }

    /// Record a task's successful completion and its result, unblocking any
    /// dependents whose last unmet dependency was `id`.
    pub async fn complete_task(&self, id: TaskId, result: Value) -> Result<(), RuntimeError> {
        self.inner.scheduler.lock().await.complete(id, result)
    }

    /// Record a task's failure. Dependents are left pending forever (§4.6).
    pub async fn fail_task(&self, id: TaskId, error: Value) -> Result<(), RuntimeError> {
        self.inner.scheduler.lock().await.fail(id, error)
    }

    /// The result or error value recorded for a finished task, if any.
    pub async fn get_task_result(&self, id: TaskId) -> Option<Value> {
        self.inner.scheduler.lock().await.get_result(id)
    }

    // ---- Consensus (composes C11) ---------------------------------------

    pub async fn create_vote(
        &self,
        question: impl Into<String> + Send,
        kind: VoteKind,
        options: Vec<String>,
        deadline_ms: Option<i64>,
    ) -> VoteId {
        self.inner.consensus.lock().await.create_vote(question, kind, options, deadline_ms)
    }

    pub async fn cast_vote(
        &self,
        vote_id: VoteId,
        voter: AgentId,
        option: usize,
        weight: f64,
    ) -> Result<(), RuntimeError> {
        self.inner.consensus.lock().await.cast_vote(vote_id, voter, option, weight)
    }

    pub async fn finalize_vote(&self, vote_id: VoteId) -> Result<Option<usize>, RuntimeError> {
        self.inner.consensus.lock().await.finalize_vote(vote_id)
    }

    pub async fn get_vote(&self, vote_id: VoteId) -> Option<Vote> {
        self.inner.consensus.lock().await.get(vote_id).cloned()
    }

    pub async fn is_vote_finalized(&self, vote_id: VoteId) -> bool {
        self.inner.consensus.lock().await.is_finalized(vote_id)
    }

    pub async fn get_all_votes(&self) -> Vec<Vote> {
        self.inner.consensus.lock().await.get_all_votes().into_iter().cloned().collect()
    }

    // ---- Aggregate stats --------------------------------------------------

    pub async fn stats(&self) -> Stats {
        let scheduler = self.inner.scheduler.lock().await;
        let consensus = self.inner.consensus.lock().await;
        Stats {
            agent_count: self.inner.registry.len(),
            pending_tasks: scheduler.pending_count(),
            total_tasks: scheduler.len(),
            knowledge_entries: self.inner.knowledge.len(),
            open_votes: consensus.open_count(),
            queued_messages: self.inner.messages.lock().len(),
        }
    }
}

fn spawn_forwarder(inner: Arc<Inner>, mut outbound_rx: mpsc::UnboundedReceiver<Message>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if message.to == Some(inner.supervisor_id) {
                handle_supervisor_message(&inner, message).await;
            } else if message.to.is_some() {
                let _ = inner.registry.route(message).await;
            } else {
                let exclude = message.from;
                inner.registry.broadcast(message, exclude).await;
            }
        }
    })
}

/// The supervisor has no real mailbox registered in the [`AgentRegistry`], so
/// messages addressed to it (heartbeat acks, failure notifications) are
/// intercepted here instead of being routed normally.
async fn handle_supervisor_message(inner: &Arc<Inner>, message: Message) {
    let Some(from) = message.from else { return };
    let now = inner.clock.now_ms();
    match message.kind {
        MessageKind::HeartbeatAck => {
            inner.supervisor.lock().await.record_heartbeat(from, now);
        }
        MessageKind::Error => {
            let reason = match message.payload {
                Payload::Error { message } => message,
                _ => "handler failed".to_string(),
            };
            inner.monitor.record_supervision(SupervisionEvent::ChildFailed {
                supervisor: inner.supervisor_id,
                child: from,
                reason,
            });
        }
        _ => {}
    }
}
