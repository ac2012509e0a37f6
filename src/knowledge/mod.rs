//! Shared knowledge base: versioned entries, tag queries, and
//! subscription-as-events (§4.5, §9 design note).
//!
//! Subscribers are never invoked as inline callbacks — a `put` that matches
//! a subscription returns `EVENT` [`Message`]s for the caller to route
//! through the registry, the same outbound-via-context discipline the actor
//! runtime uses for handler replies.

mod entry;

pub use entry::KnowledgeEntry;

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
use parking_lot::RwLock;
use serde_json::Value;

// Layer 3: Internal module imports
use crate::error::RuntimeError;
use crate::ids::AgentId;
use crate::message::{Message, MessageKind, Payload};

/// Versioned, tag-queryable, subscribable key/value store.
///
/// Reads take a shared lock; writes (`put`, `import`) take an exclusive
/// lock — the usual reader/writer discipline for a store read far more
/// often than it's written.
pub struct KnowledgeBase {
    max_entries: usize,
    entries: RwLock<HashMap<String, Vec<KnowledgeEntry>>>,
    subscribers: RwLock<HashMap<String, Vec<AgentId>>>,
}

impl KnowledgeBase {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            entries: RwLock::new(HashMap::new()),
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or update `key`, bumping its version and appending to its
    /// history. Returns the new version and an `EVENT` message for every
    /// subscriber of this key.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Policy` if inserting a brand-new key would
    /// exceed `max_entries`.
    pub fn put(
        &self,
        key: impl Into<String>,
        value: Value,
        contributor: AgentId,
        tags: Vec<String>,
        now_ms: i64,
    ) -> Result<(u64, Vec<Message>), RuntimeError> {
        let key = key.into();
        let mut entries = self.entries.write();

        let version = match entries.get(&key) {
            Some(history) => history.last().map(|e| e.version + 1).unwrap_or(1),
            None => {
                if entries.len() >= self.max_entries {
                    return Err(RuntimeError::Policy(format!(
                        "knowledge base at capacity ({})",
                        self.max_entries
                    )));
                }
                1
            }
        };

        entries.entry(key.clone()).or_default().push(KnowledgeEntry {
            key: key.clone(),
            value: value.clone(),
            contributor,
            version,
            tags,
            updated_at_ms: now_ms,
        });
        drop(entries);

        let events = self
            .subscribers
            .read()
            .get(&key)
            .map(|subs| {
                subs.iter()
                    .map(|&agent| {
                        Message::new(
                            None,
                            agent,
                            MessageKind::Event,
                            Payload::json(KnowledgeChangeNotice {
                                key: key.clone(),
                                version,
                            }),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok((version, events))
    }

    /// Look up the current (highest-version) entry for `key`.
    pub fn get(&self, key: &str) -> Option<KnowledgeEntry> {
        self.entries.read().get(key).and_then(|h| h.last().cloned())
    }

    /// Full version history for `key`, oldest first. Empty if the key has
    /// never been written.
    pub fn history(&self, key: &str) -> Vec<KnowledgeEntry> {
        self.entries.read().get(key).cloned().unwrap_or_default()
    }

    /// Latest entry of every key whose tag set is a superset of `tags`.
    pub fn query_by_tags(&self, tags: &[String]) -> Vec<KnowledgeEntry> {
        self.entries
            .read()
            .values()
            .filter_map(|history| history.last())
            .filter(|entry| entry.matches_tags(tags))
            .cloned()
            .collect()
    }

    /// Register `agent` to receive an `EVENT` on every future `put` of `key`.
    pub fn subscribe(&self, key: impl Into<String>, agent: AgentId) {
        let key = key.into();
        let mut subs = self.subscribers.write();
        let list = subs.entry(key).or_default();
        if !list.contains(&agent) {
            list.push(agent);
        }
    }

    /// Remove a subscription.
    pub fn unsubscribe(&self, key: &str, agent: AgentId) {
        if let Some(list) = self.subscribers.write().get_mut(key) {
            list.retain(|&id| id != agent);
        }
    }

    /// Snapshot every version of every entry, for persistence or transfer to
    /// another process. Each key's versions stay contiguous and oldest-first.
    pub fn export(&self) -> Vec<KnowledgeEntry> {
        self.entries.read().values().flatten().cloned().collect()
    }

    /// Replace the store's contents with a previously exported snapshot.
    ///
    /// Subscriptions are left untouched; only entry data is replaced.
    pub fn import(&self, snapshot: Vec<KnowledgeEntry>) {
        let mut entries = self.entries.write();
        entries.clear();
        for entry in snapshot {
            entries.entry(entry.key.clone()).or_default().push(entry);
        }
    }

    /// Number of distinct keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[derive(serde::Serialize)]
struct KnowledgeChangeNotice {
    key: String,
    version: u64,
}
