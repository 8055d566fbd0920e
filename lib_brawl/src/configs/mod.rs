//! # Configuration Modules
//!
//! Options for the polling engine and the REST client, loadable from JSON.

/// Engine and client options with their defaults and validation.
pub mod options;

pub use options::{ClientOptions, ConfigError, EventsOptions};
