//! Runtime configuration (§6.4) with documented defaults.
//!
//! A flat struct with a `Default` impl backed by named constants, plus a
//! builder for partial overrides.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::consensus::VoteKind;

/// Default maximum number of concurrently registered agents.
pub const DEFAULT_MAX_AGENTS: usize = 10;
/// Default per-agent health timeout, in milliseconds.
pub const DEFAULT_AGENT_TIMEOUT_MS: i64 = 300_000;
/// Default maximum number of knowledge-base entries retained.
pub const DEFAULT_KB_MAX_ENTRIES: usize = 10_000;
/// Default scheduler ready-queue size cap (advisory; memory-bounded beyond this).
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 1_000;
/// Default deadline for an unfinalised vote, in milliseconds.
pub const DEFAULT_VOTING_TIMEOUT_MS: i64 = 60_000;
/// Default message retention window, in milliseconds (24 hours).
pub const DEFAULT_RETENTION_MS: i64 = 86_400_000;
/// Default maximum serialized message size, in bytes.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 1_048_576;
/// Default per-agent mailbox capacity.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 10_000;
/// Default supervisor health-check cadence, in milliseconds.
pub const DEFAULT_HEALTH_CHECK_INTERVAL_MS: i64 = 1_000;
/// Default sliding window for restart rate limiting, in milliseconds.
pub const DEFAULT_MAX_RESTART_WINDOW_MS: i64 = 60_000;
/// Default maximum restarts allowed within the window.
pub const DEFAULT_MAX_RESTARTS: usize = 3;
/// Default circuit breaker failure threshold.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;
/// Default circuit breaker success threshold (HALF_OPEN -> CLOSED).
pub const DEFAULT_SUCCESS_THRESHOLD: u32 = 2;
/// Default circuit breaker open-state timeout, in milliseconds.
pub const DEFAULT_OPEN_TIMEOUT_MS: i64 = 30_000;
/// Default housekeeping cadence, in milliseconds.
pub const DEFAULT_HOUSEKEEPING_INTERVAL_MS: i64 = 10_000;
/// Default shared-document size, in bytes, partitioned into fixed-width
/// sections (§4.4).
pub const DEFAULT_DOCUMENT_SIZE: usize = 10_000;

/// Full set of tunables recognised by the runtime (§6.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub max_agents: usize,
    pub default_agent_timeout_ms: i64,

    pub kb_max_entries: usize,
    pub kb_persistence: bool,
    pub kb_storage_path: Option<String>,

    pub max_queue_size: usize,

    pub consensus_default_type: VoteKind,
    pub voting_timeout_ms: i64,

    pub retention_ms: i64,
    pub max_message_size: usize,
    pub mailbox_capacity: usize,

    pub health_check_interval_ms: i64,
    pub max_restart_window_ms: i64,
    pub max_restarts: usize,

    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub open_timeout_ms: i64,

    pub housekeeping_interval_ms: i64,

    pub document_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_agents: DEFAULT_MAX_AGENTS,
            default_agent_timeout_ms: DEFAULT_AGENT_TIMEOUT_MS,
            kb_max_entries: DEFAULT_KB_MAX_ENTRIES,
            kb_persistence: false,
            kb_storage_path: None,
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
            consensus_default_type: VoteKind::SimpleMajority,
            voting_timeout_ms: DEFAULT_VOTING_TIMEOUT_MS,
            retention_ms: DEFAULT_RETENTION_MS,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            health_check_interval_ms: DEFAULT_HEALTH_CHECK_INTERVAL_MS,
            max_restart_window_ms: DEFAULT_MAX_RESTART_WINDOW_MS,
            max_restarts: DEFAULT_MAX_RESTARTS,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            success_threshold: DEFAULT_SUCCESS_THRESHOLD,
            open_timeout_ms: DEFAULT_OPEN_TIMEOUT_MS,
            housekeeping_interval_ms: DEFAULT_HOUSEKEEPING_INTERVAL_MS,
            document_size: DEFAULT_DOCUMENT_SIZE,
        }
    }
}

impl Config {
    /// Start building a configuration from defaults.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Fluent builder for partial [`Config`] overrides.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            config: Config::default(),
        }
    }
}

macro_rules! with_field {
    ($method:ident, $field:ident, $ty:ty) => {
        pub fn $method(mut self, value: $ty) -> Self {
            self.config.$field = value;
            self
        }
    };
}

impl ConfigBuilder {
    with_field!(max_agents, max_agents, usize);
    with_field!(default_agent_timeout_ms, default_agent_timeout_ms, i64);
    with_field!(kb_max_entries, kb_max_entries, usize);
    with_field!(kb_persistence, kb_persistence, bool);
    with_field!(max_queue_size, max_queue_size, usize);
    with_field!(voting_timeout_ms, voting_timeout_ms, i64);
    with_field!(retention_ms, retention_ms, i64);
    with_field!(max_message_size, max_message_size, usize);
    with_field!(mailbox_capacity, mailbox_capacity, usize);
    with_field!(
        health_check_interval_ms,
        health_check_interval_ms,
        i64
    );
    with_field!(max_restart_window_ms, max_restart_window_ms, i64);
    with_field!(max_restarts, max_restarts, usize);
    with_field!(failure_threshold, failure_threshold, u32);
    with_field!(success_threshold, success_threshold, u32);
    with_field!(open_timeout_ms, open_timeout_ms, i64);
    with_field!(housekeeping_interval_ms, housekeeping_interval_ms, i64);
    with_field!(document_size, document_size, usize);

    /// Set the knowledge-base storage path (implies `kb_persistence`).
    pub fn kb_storage_path(mut self, path: impl Into<String>) -> Self {
        self.config.kb_storage_path = Some(path.into());
        self.config.kb_persistence = true;
        self
    }

    /// Finish building, producing the concrete [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = Config::default();
        assert_eq!(config.max_agents, 10);
        assert_eq!(config.mailbox_capacity, 10_000);
        assert_eq!(config.retention_ms, 86_400_000);
        assert_eq!(config.failure_threshold, 5);
        assert_eq!(config.success_threshold, 2);
        assert_eq!(config.open_timeout_ms, 30_000);
        assert_eq!(config.max_restarts, 3);
    }

    #[test]
    fn builder_overrides_only_requested_fields() {
        let config = Config::builder().max_agents(50).max_restarts(7).build();
        assert_eq!(config.max_agents, 50);
        assert_eq!(config.max_restarts, 7);
        assert_eq!(config.mailbox_capacity, DEFAULT_MAILBOX_CAPACITY);
    }

    #[test]
    fn kb_storage_path_implies_persistence() {
        let config = Config::builder().kb_storage_path("/tmp/kb.json").build();
        assert!(config.kb_persistence);
        assert_eq!(config.kb_storage_path.as_deref(), Some("/tmp/kb.json"));
    }
}
