//! Per-agent mailboxes: bounded FIFO queues with drop-oldest overflow (§4.1).

mod bounded;
mod error;

pub use bounded::{channel, MailboxReceiver, MailboxSender};
pub use error::{MailboxError, TryRecvError};
