//! # Watch-List Polling Engine
//!
//! A self-scheduling ingestor that keeps three watch-lists (players, clubs,
//! battle logs) fresh and turns every observed change into a [`BrawlEvent`].
//!
//! ## Key Design Principles:
//! - **Self-Scheduling**: each list has its own task running
//!   `CycleStart → Iterating → CycleSleep`. The cadence is measured from the
//!   start of the cycle, so the refresh frequency stays close to
//!   `refreshRateMs` whatever the list size.
//! - **One Pipe Out**: all four tasks (three lists plus the maintenance probe)
//!   share a single [`RequestGate`], so the whole engine never has more than
//!   one call in flight and never exceeds `rateLimit × tokens` per window.
//! - **Skip, Don't Fail**: a failed fetch keeps the previous snapshot and the
//!   loop moves on to the next tag; the tag is retried next cycle.
//! - **Immediate Clear**: `clear_*` empties the list at once and stops the
//!   running cycle before its next fetch.
//! - **Maintenance Aware**: while the probe reports maintenance, cycles skip
//!   their body but keep their cadence.

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::configs::{ConfigError, EventsOptions};
use crate::core::change_detector::{diff_battles, diff_club, diff_player};
use crate::core::dispatcher::{Dispatcher, Subscription};
use crate::core::events::{BrawlEvent, EventName};
use crate::core::key_rotator::KeyRotator;
use crate::core::maintenance::MaintenanceMonitor;
use crate::core::request_gate::RequestGate;
use crate::core::throttler::Throttler;
use crate::core::watch_list::{WatchEntry, WatchList};
use crate::models::{BattleLog, Club, Player};
use crate::retrieve::{endpoint, ApiClient, ApiResponse, Fetch};
use crate::utils::tags::{parse_all, Tag, TagError};

/// Which watch-list a refresh loop serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchKind {
    Players,
    Clubs,
    Battles,
}

impl fmt::Display for WatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WatchKind::Players => "players",
            WatchKind::Clubs => "clubs",
            WatchKind::Battles => "battles",
        })
    }
}

/// State shared by the control surface and every loop.
struct Shared<F: Fetch> {
    options: EventsOptions,
    probe_url: Url,
    fetcher: F,
    gate: RequestGate,
    dispatcher: Dispatcher,
    players: WatchList<WatchEntry<Player>>,
    clubs: WatchList<WatchEntry<Club>>,
    battles: WatchList<i64>,
    maintenance: MaintenanceMonitor,
    // token of the loops currently running, if any
    running: Mutex<Option<CancellationToken>>,
}

/// The polling engine.
///
/// Cloning is cheap and every clone controls the same engine.
pub struct BrawlEvents<F: Fetch = ApiClient> {
    shared: Arc<Shared<F>>,
}

impl<F: Fetch> Clone for BrawlEvents<F> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Running loops started by [`BrawlEvents::start`].
///
/// Dropping the handle leaves the loops running; call [`EventsHandle::shutdown`]
/// to stop them.
#[derive(Debug)]
pub struct EventsHandle {
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl EventsHandle {
    /// Cancels every loop and waits for them to exit.
    ///
    /// A fetch in flight is abandoned; its queue slot is released on drop.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "engine task ended abnormally");
            }
        }
        info!("event engine stopped");
    }

    /// A token that is cancelled when the engine shuts down.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl BrawlEvents<ApiClient> {
    /// Builds an engine on a fresh `reqwest` connection pool.
    pub fn new(options: EventsOptions) -> Result<Self, ConfigError> {
        let fetcher = ApiClient::new()?;
        Self::with_fetcher(options, fetcher)
    }
}

impl<F: Fetch> BrawlEvents<F> {
    /// Builds an engine on a caller-supplied transport.
    pub fn with_fetcher(options: EventsOptions, fetcher: F) -> Result<Self, ConfigError> {
        options.validate()?;

        let probe = options.probe_tag()?;
        let probe_url = endpoint(&options.base_url, &format!("/players/{}", probe.encoded())).map_err(|source| {
            ConfigError::InvalidBaseUrl {
                url: options.base_url.clone(),
                source,
            }
        })?;

        let keys = KeyRotator::new(options.tokens.clone()).map_err(|_| ConfigError::NoTokens)?;
        let throttler = Throttler::new(options.effective_rate_limit(), options.rate_window());
        let gate = RequestGate::new(keys, throttler, options.timeout());

        Ok(Self {
            shared: Arc::new(Shared {
                options,
                probe_url,
                fetcher,
                gate,
                dispatcher: Dispatcher::new(),
                players: WatchList::new(),
                clubs: WatchList::new(),
                battles: WatchList::new(),
                maintenance: MaintenanceMonitor::new(),
                running: Mutex::new(None),
            }),
        })
    }

    /// The options the engine was built with.
    pub fn options(&self) -> &EventsOptions {
        &self.shared.options
    }

    /// The event sink.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.shared.dispatcher
    }

    /// Shorthand for `dispatcher().subscribe(name)`.
    pub fn subscribe(&self, name: EventName) -> Subscription {
        self.shared.dispatcher.subscribe(name)
    }

    /// Shorthand for `dispatcher().subscribe_all()`.
    pub fn subscribe_all(&self) -> Subscription {
        self.shared.dispatcher.subscribe_all()
    }

    // --- Control surface ---

    /// Starts watching player profiles. The whole batch is rejected if any tag
    /// is invalid. Returns how many tags were newly added.
    pub fn add_players<I, S>(&self, tags: I) -> Result<usize, TagError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags = parse_all(tags)?;
        Ok(tags
            .into_iter()
            .filter(|tag| self.shared.players.insert_if_absent(tag.clone(), WatchEntry::Empty))
            .count())
    }

    /// Stops watching player profiles. Returns how many were removed.
    pub fn remove_players<I, S>(&self, tags: I) -> Result<usize, TagError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags = parse_all(tags)?;
        Ok(tags.iter().filter(|tag| self.shared.players.remove(tag)).count())
    }

    /// Forgets every watched player and stops the running player cycle.
    pub fn clear_players(&self) {
        self.shared.players.clear_and_break();
    }

    /// Starts watching clubs.
    pub fn add_clubs<I, S>(&self, tags: I) -> Result<usize, TagError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags = parse_all(tags)?;
        Ok(tags
            .into_iter()
            .filter(|tag| self.shared.clubs.insert_if_absent(tag.clone(), WatchEntry::Empty))
            .count())
    }

    /// Stops watching clubs.
    pub fn remove_clubs<I, S>(&self, tags: I) -> Result<usize, TagError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags = parse_all(tags)?;
        Ok(tags.iter().filter(|tag| self.shared.clubs.remove(tag)).count())
    }

    /// Forgets every watched club and stops the running club cycle.
    pub fn clear_clubs(&self) {
        self.shared.clubs.clear_and_break();
    }

    /// Starts watching battle logs. Only battles played after this call are
    /// reported.
    pub fn add_battles<I, S>(&self, tags: I) -> Result<usize, TagError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags = parse_all(tags)?;
        let now = Utc::now().timestamp_millis();
        Ok(tags
            .into_iter()
            .filter(|tag| self.shared.battles.insert_if_absent(tag.clone(), now))
            .count())
    }

    /// Stops watching battle logs.
    pub fn remove_battles<I, S>(&self, tags: I) -> Result<usize, TagError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags = parse_all(tags)?;
        Ok(tags.iter().filter(|tag| self.shared.battles.remove(tag)).count())
    }

    /// Forgets every watched battle log and stops the running battle cycle.
    pub fn clear_battles(&self) {
        self.shared.battles.clear_and_break();
    }

    // --- Read accessors ---

    /// Watched players in insertion order.
    pub fn watched_players(&self) -> Vec<Tag> {
        self.shared.players.keys()
    }

    /// Watched clubs in insertion order.
    pub fn watched_clubs(&self) -> Vec<Tag> {
        self.shared.clubs.keys()
    }

    /// Watched battle logs in insertion order.
    pub fn watched_battles(&self) -> Vec<Tag> {
        self.shared.battles.keys()
    }

    /// Last successful snapshot of a watched player.
    pub fn player_snapshot(&self, tag: &str) -> Option<Arc<Player>> {
        let tag = Tag::parse(tag).ok()?;
        self.shared.players.get(&tag)?.snapshot()
    }

    /// Last successful snapshot of a watched club.
    pub fn club_snapshot(&self, tag: &str) -> Option<Arc<Club>> {
        let tag = Tag::parse(tag).ok()?;
        self.shared.clubs.get(&tag)?.snapshot()
    }

    /// Time (epoch millis) of the newest battle seen for a watched log.
    pub fn battle_cursor(&self, tag: &str) -> Option<i64> {
        let tag = Tag::parse(tag).ok()?;
        self.shared.battles.get(&tag)
    }

    /// Whether the maintenance probe currently reports maintenance.
    pub fn in_maintenance(&self) -> bool {
        self.shared.maintenance.is_active()
    }

    /// Spawns the maintenance probe and the three refresh loops.
    ///
    /// Returns as soon as they are launched. While the loops run, a further
    /// call spawns nothing and returns a handle on the running engine: its
    /// `shutdown` stops the loops. The engine can be started again once shut down.
    ///
    /// # Panics
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> EventsHandle {
        let cancel = {
            let mut running = self.shared.running.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(cancel) = running.as_ref().filter(|cancel| !cancel.is_cancelled()) {
                warn!("event engine already running, start ignored");
                return EventsHandle {
                    cancel: cancel.clone(),
                    tasks: Vec::new(),
                };
            }
            let cancel = CancellationToken::new();
            *running = Some(cancel.clone());
            cancel
        };
        let mut tasks = Vec::with_capacity(4);

        tasks.push(tokio::spawn(maintenance_loop(Arc::clone(&self.shared), cancel.clone())));
        for kind in [WatchKind::Players, WatchKind::Battles, WatchKind::Clubs] {
            tasks.push(tokio::spawn(refresh_loop(Arc::clone(&self.shared), kind, cancel.clone())));
        }

        info!(
            tokens = self.shared.options.tokens.len(),
            refresh_rate_ms = self.shared.options.refresh_rate_ms,
            "event engine started"
        );
        EventsHandle { cancel, tasks }
    }
}

impl<F: Fetch> Shared<F> {
    fn url(&self, path: &str) -> Option<Url> {
        match endpoint(&self.options.base_url, path) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(path, error = %e, "cannot build request URL");
                None
            }
        }
    }

    fn publish_all(&self, events: Vec<BrawlEvent>) {
        for event in events {
            self.dispatcher.publish(event);
        }
    }

    /// One cycle over a snapshot list. Returns the number of successful fetches.
    async fn refresh_snapshots<T>(
        &self,
        list: &WatchList<WatchEntry<T>>,
        path: impl Fn(&Tag) -> String,
        diff: fn(&Arc<T>, &Arc<T>) -> Vec<BrawlEvent>,
    ) -> usize
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let mut fetched = 0;
        for tag in list.begin_cycle() {
            if list.break_requested() {
                break;
            }
            let Some(url) = self.url(&path(&tag)) else {
                continue;
            };
            let response: ApiResponse<T> = self.gate.fetch(&self.fetcher, url).await.decode();
            let status = response.status;
            let Some(new) = response.into_data() else {
                trace!(%tag, status, "fetch failed, keeping previous snapshot");
                continue;
            };
            fetched += 1;

            let new = Arc::new(new);
            match list.get(&tag) {
                Some(WatchEntry::Populated(old)) => self.publish_all(diff(&old, &new)),
                Some(WatchEntry::Empty) => {}
                // removed while the fetch was in flight
                None => continue,
            }
            list.replace_if_present(&tag, WatchEntry::Populated(new));
        }
        fetched
    }

    async fn refresh_battles(&self) -> usize {
        let mut fetched = 0;
        for tag in self.battles.begin_cycle() {
            if self.battles.break_requested() {
                break;
            }
            let Some(url) = self.url(&format!("/players/{}/battlelog", tag.encoded())) else {
                continue;
            };
            let response: ApiResponse<BattleLog> = self.gate.fetch(&self.fetcher, url).await.decode();
            let status = response.status;
            let Some(log) = response.into_data() else {
                trace!(%tag, status, "battle log fetch failed");
                continue;
            };
            fetched += 1;

            let Some(cursor) = self.battles.get(&tag) else {
                continue;
            };
            let (events, next) = diff_battles(&tag, cursor, &log);
            self.publish_all(events);
            self.battles.replace_if_present(&tag, next);
        }
        fetched
    }

    async fn run_cycle(&self, kind: WatchKind) {
        let started = Instant::now();
        let fetched = match kind {
            WatchKind::Players => {
                self.refresh_snapshots(&self.players, |tag| format!("/players/{}", tag.encoded()), diff_player)
                    .await
            }
            WatchKind::Clubs => {
                self.refresh_snapshots(&self.clubs, |tag| format!("/clubs/{}", tag.encoded()), diff_club)
                    .await
            }
            WatchKind::Battles => self.refresh_battles().await,
        };

        let broken = match kind {
            WatchKind::Players => self.players.finish_cycle(),
            WatchKind::Clubs => self.clubs.finish_cycle(),
            WatchKind::Battles => self.battles.finish_cycle(),
        };
        if broken {
            debug!(%kind, "watch-list cleared during the cycle");
        }
        debug!(%kind, fetched, elapsed_ms = started.elapsed().as_millis() as u64, "refresh cycle finished");
    }
}

async fn refresh_loop<F: Fetch>(shared: Arc<Shared<F>>, kind: WatchKind, cancel: CancellationToken) {
    debug!(%kind, "refresh loop started");
    let cadence = shared.options.refresh_rate();

    loop {
        let cycle_start = Instant::now();

        if shared.maintenance.is_active() {
            debug!(%kind, "in maintenance, skipping cycle");
        } else {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = shared.run_cycle(kind) => {}
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = sleep_until(cycle_start + cadence) => {}
        }
    }
    debug!(%kind, "refresh loop stopped");
}

async fn maintenance_loop<F: Fetch>(shared: Arc<Shared<F>>, cancel: CancellationToken) {
    let interval = shared.options.maintenance_interval();

    loop {
        let probe_start = Instant::now();

        let response = tokio::select! {
            _ = cancel.cancelled() => break,
            response = shared.gate.fetch(&shared.fetcher, shared.probe_url.clone()) => response,
        };
        if let Some(event) = shared.maintenance.observe(response.status) {
            info!(event = %event.name(), "maintenance state changed");
            shared.dispatcher.publish(event);
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = sleep_until(probe_start + interval) => {}
        }
    }
    debug!("maintenance probe stopped");
}
