//! # Core Engine Module
//!
//! The building blocks the polling engine is assembled from. Everything here is
//! independent of the HTTP transport and of the engine's loops, so each piece
//! can be tested on its own.
//!
//! ## Core Components:
//!
//! - **`throttler`**: sliding-window rate limiter shared by every outbound call.
//!
//! - **`call_queue`**: single-slot FIFO queue; at most one call in flight.
//!
//! - **`key_rotator`**: round-robin over the configured API tokens.
//!
//! - **`request_gate`**: queue → key → fetch → throttle → release, in one call.
//!
//! - **`watch_list`**: ordered tag stores with the mid-cycle break flag.
//!
//! - **`change_detector`**: snapshot pair → ordered events.
//!
//! - **`maintenance`**: probe status → maintenance transitions.
//!
//! - **`events`** / **`dispatcher`**: the event vocabulary and the
//!   publish/subscribe sink.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Sequential FIFO execution slot.
pub mod call_queue;
/// Snapshot diffing.
pub mod change_detector;
/// Fan-out of events to subscribers.
pub mod dispatcher;
/// Event names and payloads.
pub mod events;
/// Round-robin credential pool.
pub mod key_rotator;
/// Maintenance on/off tracking.
pub mod maintenance;
/// Composition of queue, rotator and throttler.
pub mod request_gate;
/// Sliding-window rate limiting.
pub mod throttler;
/// Watched tags and their last snapshots.
pub mod watch_list;

// --- Public API Re-exports ---
pub use call_queue::{CallQueue, CallSlot};
pub use change_detector::{diff_battles, diff_club, diff_player};
pub use dispatcher::{Dispatcher, Subscription, SubscriptionId};
pub use events::{BrawlEvent, EventName};
pub use key_rotator::{EmptyPool, KeyRotator};
pub use maintenance::MaintenanceMonitor;
pub use request_gate::RequestGate;
pub use throttler::Throttler;
pub use watch_list::{WatchEntry, WatchList};
