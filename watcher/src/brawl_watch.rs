//! # Brawl Watch
//!
//! Runs the change-event engine over the players, clubs and battle logs named
//! in the configuration and writes every event to the log as one JSON line.
//!
//! ## Workflow:
//! 1.  Load `.env`, then the merged configuration (defaults, JSON file,
//!     environment, CLI).
//! 2.  Install console + daily JSON file logging.
//! 3.  Build the engine, register the watch-lists and subscribe to everything.
//! 4.  Start the loops and log events until `CTRL+C` or `SIGTERM`.
//! 5.  Cancel the loops and wait for them to exit.

use anyhow::{Context, Result};
use lib_brawl::loggers::setup_logging;
use lib_brawl::{BrawlEvents, Subscription};
use tokio::signal;
use tracing::{error, info, warn};

mod config;

/// Logs events until the subscription ends.
async fn log_events(mut subscription: Subscription) {
    while let Some(event) = subscription.recv().await {
        match serde_json::to_string(event.as_ref()) {
            Ok(line) => info!(target: "brawl_events", event = %event.name(), "{}", line),
            Err(e) => warn!(event = %event.name(), error = %e, "failed to serialize event"),
        }
    }
}

/// Resolves on the first of `CTRL+C` and (on UNIX) `SIGTERM`.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term_signal) => {
                term_signal.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl-C received, initiating shutdown."),
        _ = terminate => info!("SIGTERM received, initiating shutdown."),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; anything else is worth a line on stderr.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to load .env: {}", e);
        }
    }

    let config = config::load_config();
    let log_dir = config.log_dir.clone().unwrap_or_else(|| "./logs".into());
    let log_level = config.log_level.clone().unwrap_or_else(|| "info".to_string());
    let _guard = setup_logging(&log_dir, "brawl_watch", &log_level).context("failed to initialize logging")?;

    let events = BrawlEvents::new(config.events_options()).context("invalid engine configuration")?;

    let players = events
        .add_players(config.players.iter().flatten())
        .context("invalid player tag")?;
    let clubs = events.add_clubs(config.clubs.iter().flatten()).context("invalid club tag")?;
    let battles = events
        .add_battles(config.battles.iter().flatten())
        .context("invalid battle log tag")?;
    info!(players, clubs, battles, "watch-lists registered");

    let logger = tokio::spawn(log_events(events.subscribe_all()));
    let handle = events.start();

    shutdown_signal().await;

    handle.shutdown().await;
    logger.abort();

    info!("Shutdown complete.");
    Ok(())
}
