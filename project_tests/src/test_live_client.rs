//! # Live REST Client Check
//!
//! Exercises `lib_brawl::BrawlClient` against the real API with the token in
//! `BRAWL_TOKEN` (a `.env` file is honoured). Prints what each call returned;
//! nothing is asserted, since the live data changes constantly.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

use anyhow::{Context, Result};
use clap::Parser;
use lib_brawl::client::GLOBAL;
use lib_brawl::{ApiResponse, BrawlClient, ClientOptions, SearchOptions};

/// Command line of the live check.
#[derive(Parser, Debug)]
#[clap(about = "Calls the Brawl Stars API once per endpoint and prints the results")]
struct Args {
    /// API token.
    #[clap(long, env = "BRAWL_TOKEN")]
    token: String,

    /// Player to look up.
    #[clap(long, default_value = "#YJ0LVRQQ")]
    player: String,

    /// API root.
    #[clap(long, env = "BRAWL_BASE_URL")]
    base_url: Option<String>,
}

fn report<T>(label: &str, response: &ApiResponse<T>, summary: impl FnOnce(&T) -> String) {
    match response.data.as_ref().filter(|_| response.ok) {
        Some(data) => println!("[ok  {}] {}: {}", response.status, label, summary(data)),
        None => println!("[err {}] {}", response.status, label),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let mut options = ClientOptions::with_token(args.token);
    if let Some(base_url) = args.base_url {
        options.base_url = base_url;
    }
    options.timeout_ms = Some(10_000);
    let client = BrawlClient::new(options).context("failed to build client")?;

    println!("--- Starting live API checks ---");

    let player = client.player(&args.player).await?;
    report("player", &player, |p| format!("{} ({} trophies, {} brawlers)", p.name, p.trophies, p.brawlers.len()));

    let battles = client.player_battles(&args.player).await?;
    report("battle log", &battles, |log| format!("{} battles", log.items.len()));

    if let Some(club_tag) = player.data.as_ref().and_then(|p| p.club_tag()) {
        let club = client.club(club_tag).await?;
        report("club", &club, |c| format!("{} ({} members)", c.name, c.members.len()));
    }

    let brawlers = client.brawlers().await?;
    report("brawlers", &brawlers, |list| format!("{} brawlers", list.items.len()));

    let search = SearchOptions {
        limit: Some(3),
        ..SearchOptions::default()
    };
    let rankings = client.player_rankings(GLOBAL, Some(&search)).await?;
    report("global player rankings", &rankings, |list| {
        list.items
            .iter()
            .map(|r| format!("#{} {}", r.rank, r.name))
            .collect::<Vec<_>>()
            .join(", ")
    });

    let seasons = client.power_play_seasons(GLOBAL, Some(&search)).await?;
    report("power play seasons", &seasons, |list| format!("{} seasons", list.items.len()));

    println!("--- Done ---");
    Ok(())
}
