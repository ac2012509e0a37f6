//! A single knowledge-base entry (§4.5).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::AgentId;

/// One versioned fact in the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub key: String,
    pub value: Value,
    pub contributor: AgentId,
    pub version: u64,
    pub tags: Vec<String>,
    pub updated_at_ms: i64,
}

impl KnowledgeEntry {
    /// Whether every tag in `query` is present on this entry.
    pub fn matches_tags(&self, query: &[String]) -> bool {
        query.iter().all(|tag| self.tags.contains(tag))
    }
}
