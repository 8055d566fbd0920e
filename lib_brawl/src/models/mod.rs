//! # Response Models
//!
//! `serde` types for every payload the API returns. They are plain data: the
//! engine stores them as immutable snapshots behind an `Arc` and the change
//! detector compares them field by field.
//!
//! ## Contained Modules:
//! - **`player`**: player profile and owned brawlers.
//! - **`club`**: club profile and roster.
//! - **`battle`**: battle log entries.
//! - **`catalog`**: brawler catalog, leaderboards and power play seasons.

/// Player profile and owned brawlers.
pub mod player;
/// Club profile and roster.
pub mod club;
/// Battle log entries.
pub mod battle;
/// Brawler catalog, leaderboards and seasons.
pub mod catalog;

pub use battle::{Battle, BattleBrawler, BattleDetails, BattleEvent, BattleLog, BattlePlayer};
pub use catalog::{Brawler, ClubRanking, ItemList, PlayerRanking, PowerPlaySeason, RankingClub};
pub use club::{Club, ClubMember};
pub use player::{Accessory, Icon, Player, PlayerBrawler, PlayerClub};
