//! Mailbox error types.

use thiserror::Error;

/// Errors raised by mailbox send/receive operations.
#[derive(Debug, Error)]
pub enum MailboxError {
    /// The mailbox's receiving half has been dropped.
    #[error("mailbox is closed")]
    Closed,
}

/// Non-blocking receive error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TryRecvError {
    /// No message currently queued.
    #[error("mailbox is empty")]
    Empty,
    /// The sending half has been dropped and the queue is drained.
    #[error("mailbox is closed")]
    Closed,
}
