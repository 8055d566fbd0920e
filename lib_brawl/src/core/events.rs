//! # Change Events
//!
//! The public vocabulary of the engine. Every change the refresh loops detect
//! is published as one immutable [`BrawlEvent`]; subscribers select events by
//! [`EventName`].
//!
//! Snapshots are carried as `Arc`s so that one fetched player fans out to any
//! number of events and subscribers without copying the profile.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use crate::models::{Battle, Club, ClubMember, Player, PlayerBrawler};
use crate::utils::tags::Tag;

/// Name of an event, as used when subscribing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EventName {
    /// The probe started answering 503.
    MaintenanceStart,
    /// The probe answers 200 again.
    MaintenanceEnd,
    /// A scalar profile field of a watched player changed.
    PlayerUpdate,
    /// A brawler of a watched player was unlocked or upgraded.
    PlayerBrawlerUpdate,
    /// A scalar field of a watched club changed.
    ClubUpdate,
    /// A player joined a watched club.
    ClubMemberAdd,
    /// A player left a watched club.
    ClubMemberRemove,
    /// A new battle appeared in a watched battle log.
    PlayerBattle,
}

impl EventName {
    /// Every event name, in declaration order.
    pub const ALL: [EventName; 8] = [
        EventName::MaintenanceStart,
        EventName::MaintenanceEnd,
        EventName::PlayerUpdate,
        EventName::PlayerBrawlerUpdate,
        EventName::ClubUpdate,
        EventName::ClubMemberAdd,
        EventName::ClubMemberRemove,
        EventName::PlayerBattle,
    ];

    /// The camelCase wire name, e.g. `playerBrawlerUpdate`.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::MaintenanceStart => "maintenanceStart",
            EventName::MaintenanceEnd => "maintenanceEnd",
            EventName::PlayerUpdate => "playerUpdate",
            EventName::PlayerBrawlerUpdate => "playerBrawlerUpdate",
            EventName::ClubUpdate => "clubUpdate",
            EventName::ClubMemberAdd => "clubMemberAdd",
            EventName::ClubMemberRemove => "clubMemberRemove",
            EventName::PlayerBattle => "playerBattle",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("unknown event name: {}", s))
    }
}

/// One detected change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum BrawlEvent {
    /// Upstream entered maintenance.
    MaintenanceStart,
    /// Upstream left maintenance.
    MaintenanceEnd,
    /// Profile fields changed; carries both full snapshots.
    PlayerUpdate {
        /// Previous snapshot.
        old: Arc<Player>,
        /// Current snapshot.
        new: Arc<Player>,
    },
    /// One brawler is new or changed.
    PlayerBrawlerUpdate {
        /// Current player snapshot.
        player: Arc<Player>,
        /// The brawler as it was, `None` if newly unlocked.
        old_brawler: Option<PlayerBrawler>,
        /// The brawler as it is now.
        new_brawler: PlayerBrawler,
    },
    /// Club fields changed; carries both full snapshots.
    ClubUpdate {
        /// Previous snapshot.
        old: Arc<Club>,
        /// Current snapshot.
        new: Arc<Club>,
    },
    /// A member joined.
    ClubMemberAdd {
        /// Current club snapshot.
        club: Arc<Club>,
        /// The new member.
        member: ClubMember,
    },
    /// A member left.
    ClubMemberRemove {
        /// Current club snapshot.
        club: Arc<Club>,
        /// The member as last seen.
        member: ClubMember,
    },
    /// A battle newer than the last one reported.
    PlayerBattle {
        /// Owner of the battle log.
        tag: Tag,
        /// The battle.
        battle: Battle,
    },
}

impl BrawlEvent {
    /// The name subscribers use to select this event.
    pub fn name(&self) -> EventName {
        match self {
            BrawlEvent::MaintenanceStart => EventName::MaintenanceStart,
            BrawlEvent::MaintenanceEnd => EventName::MaintenanceEnd,
            BrawlEvent::PlayerUpdate { .. } => EventName::PlayerUpdate,
            BrawlEvent::PlayerBrawlerUpdate { .. } => EventName::PlayerBrawlerUpdate,
            BrawlEvent::ClubUpdate { .. } => EventName::ClubUpdate,
            BrawlEvent::ClubMemberAdd { .. } => EventName::ClubMemberAdd,
            BrawlEvent::ClubMemberRemove { .. } => EventName::ClubMemberRemove,
            BrawlEvent::PlayerBattle { .. } => EventName::PlayerBattle,
        }
    }
}
