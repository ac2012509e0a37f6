//! Message types: the wire-level kind tag, structured payloads, and the
//! envelope that carries them between agents (§3, §6.1).

mod envelope;
mod kind;
mod payload;

pub use envelope::Message;
pub use kind::MessageKind;
pub use payload::Payload;
