//! Identifier types used throughout the runtime.
//!
//! Every entity that needs to be addressed across an async boundary —
//! agents, messages, tasks, votes — gets a UUID v4 newtype. UUIDs give
//! collision resistance within a process run without a shared counter.

// Layer 1: Standard library imports
use std::fmt::{self, Display};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Layer 3: Internal module imports
// (none)

macro_rules! uuid_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Borrow the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(AgentId, "Unique identifier for a registered agent.");
uuid_id!(MessageId, "Unique identifier for a message envelope.");
uuid_id!(TaskId, "Unique identifier for a scheduled task.");
uuid_id!(VoteId, "Unique identifier for a consensus vote.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(AgentId::new(), AgentId::new());
        assert_ne!(TaskId::new(), TaskId::new());
        assert_ne!(VoteId::new(), VoteId::new());
        assert_ne!(MessageId::new(), MessageId::new());
    }

    #[test]
    fn display_matches_uuid_text() {
        let id = AgentId::new();
        assert_eq!(format!("{id}"), id.as_uuid().to_string());
    }

    #[test]
    fn from_uuid_round_trips() {
        let uuid = Uuid::new_v4();
        let id = TaskId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), &uuid);
    }
}
