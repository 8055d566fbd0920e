//! # Engine and Client Options
//!
//! Plain `serde` structs (camelCase, every field defaulted) so that a partial
//! JSON file is a valid configuration. `validate` is called by the engine and
//! the client constructors; nothing is checked at deserialisation time.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::tags::{Tag, TagError};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.brawlstars.com/v1";
/// Calls per window allowed for each token.
pub const DEFAULT_RATE_LIMIT: usize = 10;
/// Rate window length.
pub const DEFAULT_RATE_WINDOW_MS: u64 = 1_000;
/// Cadence of the player, club and battle loops.
pub const DEFAULT_REFRESH_RATE_MS: u64 = 120_000;
/// A long-lived account used to detect maintenance.
pub const DEFAULT_MAINTENANCE_PROBE_TAG: &str = "#YJ0LVRQQ";
/// Cadence of the maintenance probe.
pub const DEFAULT_MAINTENANCE_INTERVAL_MS: u64 = 30_000;

/// Errors raised while loading or validating options.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No API token was configured.
    #[error("at least one API token is required")]
    NoTokens,

    /// A configured token is blank.
    #[error("API token #{0} is empty")]
    BlankToken(usize),

    /// `rateLimit` is zero.
    #[error("rate limit must be greater than zero")]
    ZeroRateLimit,

    /// `rateWindowMs` is zero.
    #[error("rate window must be greater than zero")]
    ZeroRateWindow,

    /// `refreshRateMs` is zero.
    #[error("refresh rate must be greater than zero")]
    ZeroRefreshRate,

    /// `maintenanceIntervalMs` is zero.
    #[error("maintenance interval must be greater than zero")]
    ZeroMaintenanceInterval,

    /// `baseUrl` does not parse.
    #[error("invalid base URL {url:?}: {source}")]
    InvalidBaseUrl {
        /// The configured value.
        url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },

    /// `maintenanceProbeTag` is not a valid tag.
    #[error("invalid maintenance probe tag: {0}")]
    InvalidProbeTag(#[from] TagError),

    /// The options file could not be read.
    #[error("I/O error occurred: {0}")]
    Io(#[from] std::io::Error),

    /// The options file is not valid JSON for this structure.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

fn check_base_url(base_url: &str) -> Result<(), ConfigError> {
    url::Url::parse(base_url)
        .map(|_| ())
        .map_err(|source| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })
}

fn timeout_from_ms(timeout_ms: Option<u64>) -> Option<Duration> {
    timeout_ms.filter(|ms| *ms > 0).map(Duration::from_millis)
}

/// Configuration of the polling engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventsOptions {
    /// API tokens, used round-robin.
    pub tokens: Vec<String>,
    /// API root, without trailing slash.
    pub base_url: String,
    /// Per-call timeout; `None` waits as long as the transport does.
    pub timeout_ms: Option<u64>,
    /// Calls per window per token.
    pub rate_limit: usize,
    /// Sliding window length.
    pub rate_window_ms: u64,
    /// Target duration of one refresh cycle, measured from its start.
    pub refresh_rate_ms: u64,
    /// Player tag fetched by the maintenance probe.
    pub maintenance_probe_tag: String,
    /// Interval between maintenance probes.
    pub maintenance_interval_ms: u64,
}

impl Default for EventsOptions {
    fn default() -> Self {
        Self {
            tokens: Vec::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: None,
            rate_limit: DEFAULT_RATE_LIMIT,
            rate_window_ms: DEFAULT_RATE_WINDOW_MS,
            refresh_rate_ms: DEFAULT_REFRESH_RATE_MS,
            maintenance_probe_tag: DEFAULT_MAINTENANCE_PROBE_TAG.to_string(),
            maintenance_interval_ms: DEFAULT_MAINTENANCE_INTERVAL_MS,
        }
    }
}

impl EventsOptions {
    /// Defaults with the given tokens.
    pub fn with_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Loads options from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Checks every field the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tokens.is_empty() {
            return Err(ConfigError::NoTokens);
        }
        if let Some(index) = self.tokens.iter().position(|t| t.trim().is_empty()) {
            return Err(ConfigError::BlankToken(index));
        }
        if self.rate_limit == 0 {
            return Err(ConfigError::ZeroRateLimit);
        }
        if self.rate_window_ms == 0 {
            return Err(ConfigError::ZeroRateWindow);
        }
        if self.refresh_rate_ms == 0 {
            return Err(ConfigError::ZeroRefreshRate);
        }
        if self.maintenance_interval_ms == 0 {
            return Err(ConfigError::ZeroMaintenanceInterval);
        }
        check_base_url(&self.base_url)?;
        self.probe_tag()?;
        Ok(())
    }

    /// The probe tag in canonical form.
    pub fn probe_tag(&self) -> Result<Tag, TagError> {
        Tag::parse(&self.maintenance_probe_tag)
    }

    /// Overall ceiling: the per-token limit times the number of tokens.
    pub fn effective_rate_limit(&self) -> usize {
        self.rate_limit.saturating_mul(self.tokens.len().max(1))
    }

    /// Per-call timeout. `0` means no timeout.
    pub fn timeout(&self) -> Option<Duration> {
        timeout_from_ms(self.timeout_ms)
    }

    /// Rate window.
    pub fn rate_window(&self) -> Duration {
        Duration::from_millis(self.rate_window_ms)
    }

    /// Refresh cadence.
    pub fn refresh_rate(&self) -> Duration {
        Duration::from_millis(self.refresh_rate_ms)
    }

    /// Maintenance probe cadence.
    pub fn maintenance_interval(&self) -> Duration {
        Duration::from_millis(self.maintenance_interval_ms)
    }
}

/// Configuration of the one-shot REST client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientOptions {
    /// API token.
    pub token: String,
    /// API root.
    pub base_url: String,
    /// Per-call timeout.
    pub timeout_ms: Option<u64>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            token: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: None,
        }
    }
}

impl ClientOptions {
    /// Defaults with the given token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }

    /// Checks the token and the base URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::NoTokens);
        }
        check_base_url(&self.base_url)
    }

    /// Per-call timeout. `0` means no timeout.
    pub fn timeout(&self) -> Option<Duration> {
        timeout_from_ms(self.timeout_ms)
    }
}
