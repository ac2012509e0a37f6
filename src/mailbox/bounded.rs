//! Bounded FIFO mailbox with drop-oldest overflow (§4.1).
//!
//! Exactly one overflow policy: once `capacity` is reached, the oldest
//! queued message is evicted to make room for the newest. Delivery order for
//! a single recipient is always FIFO; eviction only ever removes from the
//! front.

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use tokio::sync::{Mutex, Notify};

// Layer 3: Internal module imports
use super::error::{MailboxError, TryRecvError};
use crate::message::Message;

/// How long [`MailboxReceiver::recv`] waits on the notifier before waking up
/// to re-check the closed flag, per §4.1's cooperative-stop contract.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

struct Inner {
    queue: Mutex<VecDeque<Message>>,
    capacity: usize,
    notify: Notify,
    closed: AtomicBool,
    dropped: AtomicU64,
}

/// Sending half of a mailbox. Cheaply `Clone`d; many agents may hold one.
#[derive(Clone)]
pub struct MailboxSender {
    inner: Arc<Inner>,
}

/// Receiving half of a mailbox, owned by exactly one agent's message loop.
pub struct MailboxReceiver {
    inner: Arc<Inner>,
}

/// Create a bounded mailbox, returning its sender and receiver halves.
pub fn channel(capacity: usize) -> (MailboxSender, MailboxReceiver) {
    let inner = Arc::new(Inner {
        queue: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
        capacity: capacity.max(1),
        notify: Notify::new(),
        closed: AtomicBool::new(false),
        dropped: AtomicU64::new(0),
    });
    (
        MailboxSender {
            inner: Arc::clone(&inner),
        },
        MailboxReceiver { inner },
    )
}

impl MailboxSender {
    /// Enqueue a message, evicting the oldest queued message if full.
    ///
    /// Never blocks and never fails except when the receiver has been
    /// dropped.
    pub async fn send(&self, message: Message) -> Result<(), MailboxError> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(MailboxError::Closed);
        }
        let mut queue = self.inner.queue.lock().await;
        if queue.len() >= self.inner.capacity {
            queue.pop_front();
            self.inner.dropped.fetch_add(1, Ordering::Relaxed);
        }
        queue.push_back(message);
        drop(queue);
        self.inner.notify.notify_one();
        Ok(())
    }

    /// Number of messages evicted by overflow since creation.
    pub fn dropped_count(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }

    /// Current queue depth.
    pub async fn len(&self) -> usize {
        self.inner.queue.lock().await.len()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }
}

impl MailboxReceiver {
    /// Block until a message is available, waking periodically to observe
    /// `stop` so a cooperative shutdown never waits the full period.
    ///
    /// Returns `None` only once the mailbox is closed and drained.
    pub async fn recv(&mut self) -> Option<Message> {
        loop {
            {
                let mut queue = self.inner.queue.lock().await;
                if let Some(message) = queue.pop_front() {
                    return Some(message);
                }
                if self.inner.closed.load(Ordering::Acquire) {
                    return None;
                }
            }
            tokio::select! {
                _ = self.inner.notify.notified() => {}
                _ = tokio::time::sleep(POLL_INTERVAL) => {}
            }
        }
    }

    /// Non-blocking receive.
    pub fn try_recv(&mut self) -> Result<Message, TryRecvError> {
        match self.inner.queue.try_lock() {
            Ok(mut queue) => queue.pop_front().ok_or_else(|| {
                if self.inner.closed.load(Ordering::Acquire) {
                    TryRecvError::Closed
                } else {
                    TryRecvError::Empty
                }
            }),
            Err(_) => Err(TryRecvError::Empty),
        }
    }

    /// Mark the mailbox closed; a subsequent `recv` drains remaining
    /// messages before returning `None`.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
        self.inner.notify.notify_waiters();
    }
}

impl Drop for MailboxReceiver {
    fn drop(&mut self) {
        self.close();
    }
}
