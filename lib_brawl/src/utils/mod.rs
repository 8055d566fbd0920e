//! # Utilities Module
//!
//! Small parsing helpers shared by the client, the models and the engine.
//!
//! ## Contained Modules:
//!
//! - **`tags`**: player/club tag validation and canonicalisation.
//! - **`battle_time`**: the API's compact battle timestamp format.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Compact battle timestamp parsing.
pub mod battle_time;
/// Tag validation.
pub mod tags;

pub use battle_time::parse_battle_time;
pub use tags::{Tag, TagError};
