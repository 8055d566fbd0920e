//! # Data Retrieval Module
//!
//! The HTTP layer shared by the REST client and the polling engine.
//!
//! ## Contained Modules:
//!
//! - **`ky_http`**: `ApiClient`, a thin `reqwest` wrapper returning
//!   [`ApiResponse`] envelopes, and the [`Fetch`] trait the engine is generic
//!   over. Failed calls are never retried here; the refresh loops simply try
//!   again on their next cycle.
//!
//! This module also hosts [`endpoint`], which joins the configured base URL
//! with an API path.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Generic HTTP API client and the `Fetch` abstraction.
pub mod ky_http;

pub use ky_http::{ApiClient, ApiResponse, Fetch, TRANSPORT_FAILURE_STATUS};

/// Appends `path` (which starts with `/`) to `base`.
///
/// `Url::join` would drop the last segment of a base like `.../v1`, so the
/// two are concatenated as strings and parsed once.
pub fn endpoint(base: &str, path: &str) -> Result<url::Url, url::ParseError> {
    url::Url::parse(&format!("{}{}", base.trim_end_matches('/'), path))
}
