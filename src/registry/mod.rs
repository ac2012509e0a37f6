//! Lock-free agent registry (§4.8, §5).
//!
//! A `DashMap` keyed lookup table gives O(1) concurrent resolution without a
//! global lock. No actor pools or routing-key caches — just id lookup, an
//! optional named "slot" per agent, and exclusion-aware broadcast.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use dashmap::DashMap;

// Layer 3: Internal module imports
use crate::actor::{AgentHandle, AgentState};
use crate::error::RuntimeError;
use crate::ids::{AgentId, TaskId};
use crate::mailbox::MailboxError;
use crate::message::Message;

/// A point-in-time snapshot of one agent's registry-tracked metadata.
#[derive(Debug, Clone)]
pub struct AgentInfo {
    pub id: AgentId,
    pub role: String,
    pub state: AgentState,
    pub current_task: Option<TaskId>,
    pub created_at: i64,
}

impl From<&AgentHandle> for AgentInfo {
    fn from(handle: &AgentHandle) -> Self {
        Self {
            id: handle.id(),
            role: handle.role().to_string(),
            state: handle.state(),
            current_task: handle.current_task(),
            created_at: handle.created_at(),
        }
    }
}

/// Registry of live agents, addressable by id and by an optional unique slot
/// name (e.g. a role like `"coordinator"`).
pub struct AgentRegistry {
    by_id: DashMap<AgentId, AgentHandle>,
    slots: DashMap<String, AgentId>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            by_id: DashMap::new(),
            slots: DashMap::new(),
        }
    }

    /// Register a freshly spawned agent, optionally claiming a named slot.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Conflict` if `id` is already registered or the
    /// requested slot is already claimed by a different agent.
    pub fn register(
        &self,
        handle: AgentHandle,
        slot: Option<String>,
    ) -> Result<(), RuntimeError> {
        let id = handle.id();
        if self.by_id.contains_key(&id) {
            return Err(RuntimeError::Conflict(format!("agent {id} already registered")));
        }
        if let Some(ref name) = slot {
            if let Some(existing) = self.slots.get(name) {
                if *existing != id {
                    return Err(RuntimeError::Conflict(format!("slot {name} already claimed")));
                }
            }
        }
        self.by_id.insert(id, handle);
        if let Some(name) = slot {
            self.slots.insert(name, id);
        }
        Ok(())
    }

    /// Remove an agent from the registry, along with any slot it held.
    pub fn unregister(&self, id: AgentId) {
        self.by_id.remove(&id);
        self.slots.retain(|_, v| *v != id);
    }

    /// Look up an agent's handle by id.
    pub fn get(&self, id: AgentId) -> Option<AgentHandle> {
        self.by_id.get(&id).map(|entry| entry.clone())
    }

    /// Look up an agent's id by its claimed slot name.
    pub fn get_by_slot(&self, slot: &str) -> Option<AgentId> {
        self.slots.get(slot).map(|entry| *entry)
    }

    /// Whether `id` is the agent currently holding `slot`.
    pub fn is_slot_agent(&self, id: AgentId, slot: &str) -> bool {
        self.slots.get(slot).is_some_and(|entry| *entry == id)
    }

    /// The slot name `id` currently holds, if any (reverse of [`Self::get_by_slot`]).
    pub fn slot_of(&self, id: AgentId) -> Option<String> {
        self.slots.iter().find(|entry| *entry.value() == id).map(|entry| entry.key().clone())
    }

    /// Force `id`'s tracked state, bypassing its own internal transitions.
    /// Returns `false` if `id` is not registered.
    pub fn update_state(&self, id: AgentId, state: AgentState) -> bool {
        match self.get(id) {
            Some(handle) => {
                handle.force_state(state);
                true
            }
            None => false,
        }
    }

    /// Record (or clear) the task currently assigned to `id`. Returns
    /// `false` if `id` is not registered.
    pub fn update_current_task(&self, id: AgentId, task: Option<TaskId>) -> bool {
        match self.get(id) {
            Some(handle) => {
                handle.set_current_task(task);
                true
            }
            None => false,
        }
    }

    /// Every registered agent whose role matches exactly.
    pub fn get_agents_by_role(&self, role: &str) -> Vec<AgentId> {
        self.by_id
            .iter()
            .filter(|entry| entry.value().role() == role)
            .map(|entry| *entry.key())
            .collect()
    }

    /// Every registered agent currently in `state`.
    pub fn get_agents_by_state(&self, state: AgentState) -> Vec<AgentId> {
        self.by_id
            .iter()
            .filter(|entry| entry.value().state() == state)
            .map(|entry| *entry.key())
            .collect()
    }

    /// A snapshot of every registered agent's metadata.
    pub fn get_all_agents(&self) -> Vec<AgentInfo> {
        self.by_id.iter().map(|entry| AgentInfo::from(entry.value())).collect()
    }

    /// Number of currently registered agents.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// All currently registered agent ids.
    pub fn ids(&self) -> Vec<AgentId> {
        self.by_id.iter().map(|entry| *entry.key()).collect()
    }

    /// Deliver `message` to the recipient named in `message.to`.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::NotFound` if the recipient is not registered.
    pub async fn route(&self, message: Message) -> Result<(), RuntimeError> {
        let Some(to) = message.to else {
            return Err(RuntimeError::Input("route requires a direct recipient".into()));
        };
        let handle = self
            .get(to)
            .ok_or_else(|| RuntimeError::agent_not_found(to))?;
        handle
            .send(message)
            .await
            .map_err(|MailboxError::Closed| RuntimeError::agent_not_found(to))
    }

    /// Deliver `message` to every registered agent except `exclude`.
    ///
    /// Individual delivery failures (a closed mailbox) are swallowed; a
    /// broadcast never fails because one stale recipient could not be
    /// reached.
    pub async fn broadcast(&self, message: Message, exclude: Option<AgentId>) {
        let targets = self.ids();
        for id in targets {
            if Some(id) == exclude {
                continue;
            }
            if let Some(handle) = self.get(id) {
                let mut copy = message.clone();
                copy.to = Some(id);
                let _ = handle.send(copy).await;
            }
        }
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::AgentRuntime;
    use crate::message::{MessageKind, Payload};
    use crate::monitoring::NoopMonitor;
    use std::sync::Arc;

    fn spawn_handle() -> AgentHandle {
        let (outbound_tx, _outbound_rx) = tokio::sync::mpsc::unbounded_channel();
        let (runtime, handle, _sender) =
            AgentRuntime::new(AgentId::new(), "worker", 16, Arc::new(NoopMonitor), outbound_tx, 0);
        tokio::spawn(runtime.run());
        handle
    }

    #[tokio::test]
    async fn register_rejects_duplicate_id() {
        let registry = AgentRegistry::new();
        let handle = spawn_handle();
        let dup = handle.clone();
        registry.register(handle, None).unwrap();
        assert!(registry.register(dup, None).is_err());
    }

    #[tokio::test]
    async fn register_rejects_slot_collision() {
        let registry = AgentRegistry::new();
        registry
            .register(spawn_handle(), Some("coordinator".into()))
            .unwrap();
        let err = registry.register(spawn_handle(), Some("coordinator".into()));
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn route_delivers_to_recipient() {
        let registry = AgentRegistry::new();
        let handle = spawn_handle();
        let id = handle.id();
        registry.register(handle, None).unwrap();

        let msg = Message::new(None, id, MessageKind::User, Payload::Empty);
        registry.route(msg).await.unwrap();
    }

    #[tokio::test]
    async fn route_to_unknown_agent_is_not_found() {
        let registry = AgentRegistry::new();
        let msg = Message::new(None, AgentId::new(), MessageKind::User, Payload::Empty);
        assert!(registry.route(msg).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn slot_of_reverse_looks_up_a_slot_name() {
        let registry = AgentRegistry::new();
        let handle = spawn_handle();
        let id = handle.id();
        registry.register(handle, Some("coordinator".into())).unwrap();
        assert_eq!(registry.slot_of(id), Some("coordinator".to_string()));
        assert_eq!(registry.slot_of(AgentId::new()), None);
    }

    #[tokio::test]
    async fn broadcast_excludes_sender() {
        let registry = AgentRegistry::new();
        let a = spawn_handle();
        let b = spawn_handle();
        let a_id = a.id();
        registry.register(a, None).unwrap();
        registry.register(b, None).unwrap();

        let msg = Message::broadcast(Some(a_id), MessageKind::Event, Payload::Empty);
        registry.broadcast(msg, Some(a_id)).await;
    }
}
