//! The closed set of wire-tagged message kinds (§6.1).

use serde::{Deserialize, Serialize};

/// Canonical message kind tag.
///
/// An implementation may group these internally but must preserve the
/// semantics each kind carries in §4 (e.g. `LockRequest` always carries a
/// section index; `DocEdit` always carries a section index and bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    User,
    Heartbeat,
    HeartbeatAck,
    Shutdown,
    Error,
    Task,
    TaskResult,
    DocEdit,
    DocUpdate,
    LockRequest,
    LockRelease,
    LockAcquired,
    LockDenied,
    Request,
    Response,
    Broadcast,
    Direct,
    Event,
    Consensus,
}

impl MessageKind {
    /// Lower snake_case wire name, matching §6.1's "enum strings on the wire".
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Heartbeat => "heartbeat",
            Self::HeartbeatAck => "heartbeat_ack",
            Self::Shutdown => "shutdown",
            Self::Error => "error",
            Self::Task => "task",
            Self::TaskResult => "task_result",
            Self::DocEdit => "doc_edit",
            Self::DocUpdate => "doc_update",
            Self::LockRequest => "lock_request",
            Self::LockRelease => "lock_release",
            Self::LockAcquired => "lock_acquired",
            Self::LockDenied => "lock_denied",
            Self::Request => "request",
            Self::Response => "response",
            Self::Broadcast => "broadcast",
            Self::Direct => "direct",
            Self::Event => "event",
            Self::Consensus => "consensus",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_strings_are_snake_case() {
        assert_eq!(MessageKind::HeartbeatAck.as_wire_str(), "heartbeat_ack");
        assert_eq!(MessageKind::LockRequest.as_wire_str(), "lock_request");
    }

    #[test]
    fn serde_round_trip() {
        let kind = MessageKind::DocUpdate;
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, "\"doc_update\"");
        let back: MessageKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kind);
    }
}
