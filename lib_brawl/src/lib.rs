//! # lib_brawl
//!
//! Client library and change-event engine for the Brawl Stars public API.
//!
//! - [`client::BrawlClient`] performs one-shot typed reads.
//! - [`ingestors::BrawlEvents`] watches players, clubs and battle logs, polls
//!   them on a fixed cadence through one throttled, key-rotating call queue and
//!   publishes every detected change as a [`core::BrawlEvent`].

// Declare the modules to re-export
pub mod client;
pub mod configs;
pub mod core;
pub mod ingestors;
#[cfg(feature = "loggers")]
pub mod loggers;
pub mod models;
pub mod retrieve;
pub mod utils;

// Re-export the common entry points
pub use client::{BrawlClient, ClientError, SearchOptions};
pub use configs::{ClientOptions, ConfigError, EventsOptions};
pub use crate::core::{BrawlEvent, Dispatcher, EventName, Subscription, SubscriptionId};
pub use ingestors::{BrawlEvents, EventsHandle};
pub use retrieve::{ApiClient, ApiResponse, Fetch};
pub use utils::tags::{Tag, TagError};
