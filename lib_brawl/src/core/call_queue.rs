//! # Sequential Call Queue
//!
//! Guarantees that at most one API call is outstanding at any instant across
//! all refresh loops and the maintenance probe, and that waiters are served
//! strictly in arrival order.
//!
//! The queue is a single-permit `tokio::sync::Semaphore`, which is FIFO-fair.
//! [`CallQueue::wait`] returns a [`CallSlot`]; the slot is handed to the next
//! waiter either by [`CallSlot::release`] or when the slot is dropped, so an
//! early return, a `?` or a panic inside the holder can never leave the queue
//! stuck.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// FIFO mutual exclusion for outbound calls.
#[derive(Debug, Clone)]
pub struct CallQueue {
    slot: Arc<Semaphore>,
}

/// Exclusive right to perform one call. Released on drop.
#[derive(Debug)]
#[must_use = "the slot is released as soon as it is dropped"]
pub struct CallSlot {
    _permit: OwnedSemaphorePermit,
}

impl CallQueue {
    /// Creates an idle queue.
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Semaphore::new(1)),
        }
    }

    /// Suspends until the caller is the unique holder of the execution slot.
    pub async fn wait(&self) -> CallSlot {
        // The semaphore lives as long as the queue and is never closed.
        match Arc::clone(&self.slot).acquire_owned().await {
            Ok(permit) => CallSlot { _permit: permit },
            Err(_) => unreachable!("call queue semaphore is never closed"),
        }
    }

    /// True when nobody holds the slot.
    pub fn is_idle(&self) -> bool {
        self.slot.available_permits() == 1
    }
}

impl Default for CallQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CallSlot {
    /// Hands the slot to the next waiter.
    pub fn release(self) {
        drop(self);
    }
}
