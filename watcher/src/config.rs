use clap::Parser;
use lib_brawl::configs::options::{
    DEFAULT_BASE_URL, DEFAULT_MAINTENANCE_INTERVAL_MS, DEFAULT_MAINTENANCE_PROBE_TAG, DEFAULT_RATE_LIMIT,
    DEFAULT_RATE_WINDOW_MS, DEFAULT_REFRESH_RATE_MS,
};
use lib_brawl::EventsOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const DEFAULT_CONFIG_FILE: &str = "brawl_watch.conf";

#[derive(Parser, Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[clap(about = "Watches Brawl Stars players, clubs and battle logs and logs every change", version)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[clap(long, env = "BRAWL_CONFIG_PATH", help = "Path to the JSON configuration file.")]
    pub config_path: Option<PathBuf>,

    #[clap(long, env = "BRAWL_LOG_DIR", help = "Directory for log files.")]
    pub log_dir: Option<PathBuf>,

    #[clap(long, env = "BRAWL_LOG_LEVEL", help = "Logging level (trace, debug, info, warn, error).")]
    pub log_level: Option<String>,

    #[clap(long, env = "BRAWL_TOKENS", value_delimiter = ',', help = "Comma separated API tokens.")]
    pub tokens: Option<Vec<String>>,

    #[clap(long, env = "BRAWL_BASE_URL", help = "API root URL.")]
    pub base_url: Option<String>,

    #[clap(long, env = "BRAWL_TIMEOUT_MS", help = "Per-call timeout in milliseconds.")]
    pub timeout_ms: Option<u64>,

    #[clap(long, env = "BRAWL_RATE_LIMIT", help = "Calls per window allowed for each token.")]
    pub rate_limit: Option<usize>,

    #[clap(long, env = "BRAWL_RATE_WINDOW_MS", help = "Rate limit window in milliseconds.")]
    pub rate_window_ms: Option<u64>,

    #[clap(long, env = "BRAWL_REFRESH_RATE_MS", help = "Refresh cadence of the watch-lists in milliseconds.")]
    pub refresh_rate_ms: Option<u64>,

    #[clap(long, env = "BRAWL_MAINTENANCE_PROBE_TAG", help = "Player tag probed to detect maintenance.")]
    pub maintenance_probe_tag: Option<String>,

    #[clap(long, env = "BRAWL_MAINTENANCE_INTERVAL_MS", help = "Maintenance probe interval in milliseconds.")]
    pub maintenance_interval_ms: Option<u64>,

    #[clap(long, env = "BRAWL_PLAYERS", value_delimiter = ',', help = "Player tags to watch.")]
    pub players: Option<Vec<String>>,

    #[clap(long, env = "BRAWL_CLUBS", value_delimiter = ',', help = "Club tags to watch.")]
    pub clubs: Option<Vec<String>>,

    #[clap(long, env = "BRAWL_BATTLES", value_delimiter = ',', help = "Player tags whose battle logs to watch.")]
    pub battles: Option<Vec<String>>,
}

impl Config {
    // Merge two Config structs, where 'other' overrides 'self' for Some values
    fn merge(self, other: Config) -> Config {
        Config {
            config_path: other.config_path.or(self.config_path),
            log_dir: other.log_dir.or(self.log_dir),
            log_level: other.log_level.or(self.log_level),
            tokens: other.tokens.or(self.tokens),
            base_url: other.base_url.or(self.base_url),
            timeout_ms: other.timeout_ms.or(self.timeout_ms),
            rate_limit: other.rate_limit.or(self.rate_limit),
            rate_window_ms: other.rate_window_ms.or(self.rate_window_ms),
            refresh_rate_ms: other.refresh_rate_ms.or(self.refresh_rate_ms),
            maintenance_probe_tag: other.maintenance_probe_tag.or(self.maintenance_probe_tag),
            maintenance_interval_ms: other.maintenance_interval_ms.or(self.maintenance_interval_ms),
            players: other.players.or(self.players),
            clubs: other.clubs.or(self.clubs),
            battles: other.battles.or(self.battles),
        }
    }

    fn defaults() -> Config {
        Config {
            log_dir: Some(PathBuf::from("./logs")),
            log_level: Some("info".to_string()),
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            rate_limit: Some(DEFAULT_RATE_LIMIT),
            rate_window_ms: Some(DEFAULT_RATE_WINDOW_MS),
            refresh_rate_ms: Some(DEFAULT_REFRESH_RATE_MS),
            maintenance_probe_tag: Some(DEFAULT_MAINTENANCE_PROBE_TAG.to_string()),
            maintenance_interval_ms: Some(DEFAULT_MAINTENANCE_INTERVAL_MS),
            ..Default::default()
        }
    }

    /// Engine options; unset fields keep the library defaults.
    pub fn events_options(&self) -> EventsOptions {
        let defaults = EventsOptions::default();
        EventsOptions {
            tokens: self.tokens.clone().unwrap_or_default(),
            base_url: self.base_url.clone().unwrap_or(defaults.base_url),
            timeout_ms: self.timeout_ms,
            rate_limit: self.rate_limit.unwrap_or(defaults.rate_limit),
            rate_window_ms: self.rate_window_ms.unwrap_or(defaults.rate_window_ms),
            refresh_rate_ms: self.refresh_rate_ms.unwrap_or(defaults.refresh_rate_ms),
            maintenance_probe_tag: self
                .maintenance_probe_tag
                .clone()
                .unwrap_or(defaults.maintenance_probe_tag),
            maintenance_interval_ms: self.maintenance_interval_ms.unwrap_or(defaults.maintenance_interval_ms),
        }
    }
}

// Returns None (with a log line) when the file is missing or unusable.
fn read_config_file(path: &Path) -> Option<Config> {
    if !path.exists() {
        info!("Config file not found at {}. Using defaults and environment/CLI variables.", path.display());
        return None;
    }
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Failed to read config file {}: {}. Falling back to other sources.", path.display(), e);
            return None;
        }
    };
    match serde_json::from_str::<Config>(&raw) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("Failed to parse config file {}: {}. Falling back to other sources.", path.display(), e);
            None
        }
    }
}

/// Resolves defaults, then the JSON file, then environment and CLI.
fn resolve(cli: Config) -> Config {
    let config_file_path = cli
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let mut current_config = Config::defaults();
    if let Some(file_config) = read_config_file(&config_file_path) {
        current_config = current_config.merge(file_config);
    }
    // clap already folded the environment into the CLI values
    current_config.merge(cli)
}

pub fn load_config() -> Config {
    resolve(Config::parse())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watch.conf");
        fs::write(
            &path,
            r##"{ "tokens": ["file-token"], "refreshRateMs": 60000, "players": ["#2PP"], "logLevel": "debug" }"##,
        )
        .unwrap();

        let cli = Config {
            config_path: Some(path),
            refresh_rate_ms: Some(5000),
            ..Default::default()
        };
        let config = resolve(cli);

        assert_eq!(config.tokens, Some(vec!["file-token".to_string()]));
        assert_eq!(config.refresh_rate_ms, Some(5000));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.players, Some(vec!["#2PP".to_string()]));
        assert_eq!(config.rate_limit, Some(DEFAULT_RATE_LIMIT));
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.conf");
        fs::write(&path, "not json").unwrap();

        let config = resolve(Config {
            config_path: Some(path),
            ..Default::default()
        });
        assert_eq!(config.log_dir, Some(PathBuf::from("./logs")));
        assert_eq!(config.tokens, None);
    }

    #[test]
    fn events_options_follow_the_merged_config() {
        let config = Config {
            tokens: Some(vec!["a".into(), "b".into()]),
            timeout_ms: Some(1500),
            ..Config::defaults()
        };
        let options = config.events_options();
        assert_eq!(options.tokens, ["a", "b"]);
        assert_eq!(options.timeout_ms, Some(1500));
        assert_eq!(options.refresh_rate_ms, DEFAULT_REFRESH_RATE_MS);
        assert!(options.validate().is_ok());
    }
}
