//! # Data Ingestors Module
//!
//! Long-running clients that pull data from the API on their own schedule.
//!
//! ## Contained Modules:
//! - **`events_poller`**: the watch-list polling engine (`BrawlEvents`), which
//!   refreshes watched players, clubs and battle logs, probes for maintenance
//!   and publishes change events.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// The watch-list polling engine.
pub mod events_poller;

// --- Public API Re-exports ---
pub use events_poller::{BrawlEvents, EventsHandle};
