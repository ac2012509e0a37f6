//! Runtime observability: a [`Monitor`] sink for agent and supervision events.
//!
//! One object-safe trait (`Monitor`) shared across the two event streams
//! this runtime cares about, with `InMemoryMonitor` and `NoopMonitor`
//! implementations.

mod events;
mod in_memory;
mod noop;
mod traits;

pub use events::{AgentEvent, Recorded, SupervisionEvent};
pub use in_memory::InMemoryMonitor;
pub use noop::NoopMonitor;
pub use traits::Monitor;
