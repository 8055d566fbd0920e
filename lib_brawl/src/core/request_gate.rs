//! # Request Gate
//!
//! Composes the three pieces every engine call passes through:
//!
//! 1. [`CallQueue`]: wait for the single execution slot (ordering, mutual exclusion);
//! 2. [`KeyRotator`]: pick the next token;
//! 3. the fetch itself;
//! 4. [`Throttler`]: pace before handing the slot on;
//! 5. release the slot.
//!
//! Throttling inside the slot means the next queued call cannot start until the
//! pacing delay of the previous one has elapsed. The slot is a drop guard, so it
//! is released on every path out of [`RequestGate::fetch`].

use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::core::call_queue::CallQueue;
use crate::core::key_rotator::KeyRotator;
use crate::core::throttler::Throttler;
use crate::retrieve::{ApiResponse, Fetch};

/// Serialized, throttled, key-rotating access to a [`Fetch`] implementation.
#[derive(Debug)]
pub struct RequestGate {
    queue: CallQueue,
    keys: KeyRotator,
    throttler: Throttler,
    timeout: Option<Duration>,
}

impl RequestGate {
    /// Builds a gate; the throttler limit should already account for the
    /// number of keys.
    pub fn new(keys: KeyRotator, throttler: Throttler, timeout: Option<Duration>) -> Self {
        Self {
            queue: CallQueue::new(),
            keys,
            throttler,
            timeout,
        }
    }

    /// Performs one gated GET.
    pub async fn fetch<F: Fetch>(&self, fetcher: &F, url: Url) -> ApiResponse<Value> {
        let slot = self.queue.wait().await;
        let token = self.keys.next_token();
        let response = fetcher.fetch(url, token, self.timeout).await;
        self.throttler.throttle().await;
        slot.release();
        response
    }

    /// The underlying call queue.
    pub fn queue(&self) -> &CallQueue {
        &self.queue
    }
}
