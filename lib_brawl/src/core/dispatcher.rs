//! # Event Dispatcher
//!
//! The event sink the refresh loops publish into. External code subscribes by
//! [`EventName`] (or to everything) and receives events on its own channel.
//!
//! ## Core Design Principles:
//!
//! 1.  **Fire-and-forget publication**: each subscriber owns an unbounded MPSC
//!     channel. `publish` only enqueues, so a slow, stuck or panicking
//!     subscriber can never stall or break the loop that detected the change.
//!
//! 2.  **Zero-copy fan-out**: an event is wrapped in an `Arc` once and every
//!     matching subscriber receives a clone of the pointer.
//!
//! 3.  **Self-cleaning**: when a subscriber's receiver is dropped, the next
//!     publish notices the failed send and removes the subscriber.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::core::events::{BrawlEvent, EventName};

/// Handle identifying a subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// The receiving side of a subscription.
#[derive(Debug)]
pub struct Subscription {
    /// Identifier to pass to [`Dispatcher::unsubscribe`].
    pub id: SubscriptionId,
    receiver: mpsc::UnboundedReceiver<Arc<BrawlEvent>>,
}

impl Subscription {
    /// Waits for the next event; `None` once unsubscribed.
    pub async fn recv(&mut self) -> Option<Arc<BrawlEvent>> {
        self.receiver.recv().await
    }

    /// Returns an already queued event without waiting.
    pub fn try_recv(&mut self) -> Option<Arc<BrawlEvent>> {
        self.receiver.try_recv().ok()
    }
}

/// An internal registration.
struct Subscriber {
    id: SubscriptionId,
    /// `None` receives every event.
    filter: Option<EventName>,
    sender: mpsc::UnboundedSender<Arc<BrawlEvent>>,
}

/// Publish/subscribe hub for [`BrawlEvent`]s.
#[derive(Default)]
pub struct Dispatcher {
    subscribers: Mutex<Vec<Subscriber>>,
    next_id: AtomicU64,
}

impl Dispatcher {
    /// Creates a dispatcher with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    fn subscribers(&self) -> MutexGuard<'_, Vec<Subscriber>> {
        self.subscribers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn register(&self, filter: Option<EventName>) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers().push(Subscriber { id, filter, sender });
        debug!(?id, ?filter, "subscriber registered");
        Subscription { id, receiver }
    }

    /// Subscribes to a single event name.
    pub fn subscribe(&self, name: EventName) -> Subscription {
        self.register(Some(name))
    }

    /// Subscribes to every event.
    pub fn subscribe_all(&self) -> Subscription {
        self.register(None)
    }

    /// Runs `handler` on its own task for every `name` event.
    ///
    /// A panic inside the handler ends that task only; the subscriber is
    /// dropped on the next publish.
    ///
    /// # Panics
    /// Must be called from within a tokio runtime.
    pub fn on<H>(&self, name: EventName, mut handler: H) -> SubscriptionId
    where
        H: FnMut(Arc<BrawlEvent>) + Send + 'static,
    {
        let mut subscription = self.subscribe(name);
        let id = subscription.id;
        tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                handler(event);
            }
        });
        id
    }

    /// Removes a subscription. Its receiver sees the end of the stream.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        before != subscribers.len()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers().len()
    }

    /// Delivers `event` to every matching subscriber; returns how many got it.
    pub fn publish(&self, event: BrawlEvent) -> usize {
        let name = event.name();
        let event = Arc::new(event);
        let mut delivered = 0;

        self.subscribers().retain(|subscriber| {
            if subscriber.filter.is_some_and(|filter| filter != name) {
                return true;
            }
            match subscriber.sender.send(Arc::clone(&event)) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => {
                    warn!(id = ?subscriber.id, event = %name, "subscriber went away, removing it");
                    false
                }
            }
        });

        delivered
    }
}
