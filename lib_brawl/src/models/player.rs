//! # Player Profile Model
//!
//! Strongly-typed representation of `GET /players/{tag}`. Only the fields the
//! API has shipped consistently are required; the seasonal counters that come
//! and go between API versions are `Option` so that an older or newer payload
//! still decodes.

use serde::{Deserialize, Serialize};

/// Profile icon reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    /// Icon id from the game's asset catalog.
    #[serde(default)]
    pub id: i64,
}

/// Club affiliation embedded in a player profile.
///
/// The API sends `{}` for players without a club, so both fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerClub {
    /// Club tag, absent when the player has no club.
    #[serde(default)]
    pub tag: Option<String>,
    /// Club name, absent when the player has no club.
    #[serde(default)]
    pub name: Option<String>,
}

/// A gadget, star power or gear owned on a brawler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accessory {
    /// Accessory id.
    pub id: i64,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// One brawler as it appears in a player's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerBrawler {
    /// Brawler id, stable across players.
    pub id: i64,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Power level (1..=11).
    #[serde(default)]
    pub power: i64,
    /// Rank reached on this brawler.
    #[serde(default)]
    pub rank: i64,
    /// Current trophies on this brawler.
    #[serde(default)]
    pub trophies: i64,
    /// Highest trophies ever reached on this brawler.
    #[serde(default)]
    pub highest_trophies: i64,
    /// Unlocked star powers.
    #[serde(default)]
    pub star_powers: Vec<Accessory>,
    /// Unlocked gadgets.
    #[serde(default)]
    pub gadgets: Vec<Accessory>,
}

/// Full player profile snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Canonical player tag.
    pub tag: String,
    /// In-game name.
    pub name: String,
    /// Name colour as an ARGB hex string, e.g. `0xffffffff`.
    #[serde(default)]
    pub name_color: Option<String>,
    /// Profile icon.
    #[serde(default)]
    pub icon: Icon,
    /// Current trophies.
    #[serde(default)]
    pub trophies: i64,
    /// Highest trophies ever reached.
    #[serde(default)]
    pub highest_trophies: i64,
    /// Experience level.
    #[serde(default)]
    pub exp_level: i64,
    /// Experience points.
    #[serde(default)]
    pub exp_points: i64,
    /// Current power play points.
    #[serde(default)]
    pub power_play_points: Option<i64>,
    /// Highest power play points ever reached.
    #[serde(default)]
    pub highest_power_play_points: Option<i64>,
    /// Solo showdown victories.
    #[serde(default)]
    pub solo_victories: i64,
    /// Duo showdown victories.
    #[serde(default)]
    pub duo_victories: i64,
    /// 3v3 victories.
    #[serde(default, rename = "3vs3Victories")]
    pub trio_victories: i64,
    /// Best Robo Rumble time.
    #[serde(default)]
    pub best_robo_rumble_time: Option<i64>,
    /// Best time as Big Brawler.
    #[serde(default)]
    pub best_time_as_big_brawler: Option<i64>,
    /// Whether the player qualified from the championship challenge.
    #[serde(default)]
    pub is_qualified_from_championship_challenge: bool,
    /// Club affiliation.
    #[serde(default)]
    pub club: Option<PlayerClub>,
    /// Every brawler the player has unlocked.
    #[serde(default)]
    pub brawlers: Vec<PlayerBrawler>,
}

impl Player {
    /// Tag of the player's club, if they are in one.
    pub fn club_tag(&self) -> Option<&str> {
        self.club.as_ref().and_then(|club| club.tag.as_deref())
    }

    /// Looks up a brawler by id.
    pub fn brawler(&self, id: i64) -> Option<&PlayerBrawler> {
        self.brawlers.iter().find(|brawler| brawler.id == id)
    }
}
