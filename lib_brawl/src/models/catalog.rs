//! Catalog and leaderboard models: brawler list, rankings, power play seasons.

use serde::{Deserialize, Serialize};

use super::player::{Accessory, Icon};

/// Paged list wrapper used by every collection endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemList<T> {
    /// Entries of the current page.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Cursor information, passed through untouched.
    #[serde(default)]
    pub paging: Option<serde_json::Value>,
}

/// A brawler from the global catalog (`GET /brawlers`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brawler {
    /// Brawler id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Every star power that exists for this brawler.
    #[serde(default)]
    pub star_powers: Vec<Accessory>,
    /// Every gadget that exists for this brawler.
    #[serde(default)]
    pub gadgets: Vec<Accessory>,
}

/// Club shown next to a ranked player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingClub {
    /// Club name.
    pub name: String,
}

/// Entry of a player or brawler leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRanking {
    /// Player tag.
    pub tag: String,
    /// Player name.
    pub name: String,
    /// Name colour.
    #[serde(default)]
    pub name_color: Option<String>,
    /// Profile icon.
    #[serde(default)]
    pub icon: Icon,
    /// Trophies (or power play points on the power play board).
    #[serde(default)]
    pub trophies: i64,
    /// Position on the board.
    pub rank: i64,
    /// Club, when the player has one.
    #[serde(default)]
    pub club: Option<RankingClub>,
}

/// Entry of a club leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubRanking {
    /// Club tag.
    pub tag: String,
    /// Club name.
    pub name: String,
    /// Club trophies.
    #[serde(default)]
    pub trophies: i64,
    /// Position on the board.
    pub rank: i64,
    /// Number of members.
    #[serde(default)]
    pub member_count: i64,
    /// Badge id.
    #[serde(default)]
    pub badge_id: i64,
}

/// A power play season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerPlaySeason {
    /// Season id, used by the season leaderboard endpoint.
    pub id: String,
    /// Compact start timestamp.
    pub start_time: String,
    /// Compact end timestamp.
    pub end_time: String,
}
