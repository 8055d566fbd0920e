//! Battle log model for `GET /players/{tag}/battlelog`.
//!
//! Battles carry no id; the `battle_time` string is the only thing that
//! orders them. The team layout differs per mode (teams for 3v3 and duo
//! showdown, a flat player list for solo showdown), so both shapes are
//! optional.

use serde::{Deserialize, Serialize};

use crate::utils::battle_time::parse_battle_time;

/// Brawler used by a participant in a battle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleBrawler {
    /// Brawler id.
    #[serde(default)]
    pub id: i64,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Power level.
    #[serde(default)]
    pub power: i64,
    /// Trophies on that brawler at battle time.
    #[serde(default)]
    pub trophies: i64,
}

/// A participant in a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattlePlayer {
    /// Participant's player tag.
    pub tag: String,
    /// Participant's name.
    #[serde(default)]
    pub name: String,
    /// Brawler played. Absent in duels, which list several brawlers instead.
    #[serde(default)]
    pub brawler: Option<BattleBrawler>,
}

/// Event (mode + map) the battle was played on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleEvent {
    /// Event id.
    #[serde(default)]
    pub id: i64,
    /// Game mode.
    #[serde(default)]
    pub mode: Option<String>,
    /// Map name.
    #[serde(default)]
    pub map: Option<String>,
}

/// Outcome and participants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleDetails {
    /// Game mode.
    #[serde(default)]
    pub mode: Option<String>,
    /// Battle type (`ranked`, `soloRanked`, `friendly`, ...).
    #[serde(default, rename = "type")]
    pub battle_type: Option<String>,
    /// `victory`, `defeat` or `draw` for team modes.
    #[serde(default)]
    pub result: Option<String>,
    /// Final placement for showdown modes.
    #[serde(default)]
    pub rank: Option<i64>,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: Option<i64>,
    /// Trophy delta for the log owner.
    #[serde(default)]
    pub trophy_change: Option<i64>,
    /// Star player of the match.
    #[serde(default)]
    pub star_player: Option<BattlePlayer>,
    /// Team layout.
    #[serde(default)]
    pub teams: Option<Vec<Vec<BattlePlayer>>>,
    /// Flat participant list (solo showdown).
    #[serde(default)]
    pub players: Option<Vec<BattlePlayer>>,
}

/// One entry of a battle log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Battle {
    /// Compact UTC timestamp, `YYYYMMDDTHHMMSS.fffZ`.
    pub battle_time: String,
    /// Event the battle was played on.
    #[serde(default)]
    pub event: BattleEvent,
    /// Outcome and participants.
    #[serde(default)]
    pub battle: BattleDetails,
}

impl Battle {
    /// Battle time as epoch milliseconds, `None` if the timestamp is malformed.
    pub fn played_at_millis(&self) -> Option<i64> {
        parse_battle_time(&self.battle_time)
    }
}

/// Battle log response, newest battle first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleLog {
    /// Recent battles as returned by the API.
    #[serde(default)]
    pub items: Vec<Battle>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_team_and_solo_layouts() {
        let log: BattleLog = serde_json::from_value(json!({
            "items": [
                {
                    "battleTime": "20240305T181522.000Z",
                    "event": { "id": 15000007, "mode": "gemGrab", "map": "Hard Rock Mine" },
                    "battle": {
                        "mode": "gemGrab", "type": "ranked", "result": "victory",
                        "duration": 120, "trophyChange": 8,
                        "starPlayer": { "tag": "#2PP", "name": "Frank",
                                        "brawler": { "id": 16000000, "name": "SHELLY", "power": 9, "trophies": 500 } },
                        "teams": [[{ "tag": "#2PP", "name": "Frank" }], [{ "tag": "#9UV", "name": "Mia" }]]
                    }
                },
                {
                    "battleTime": "20240305T180000.000Z",
                    "event": { "id": 15000010 },
                    "battle": { "mode": "soloShowdown", "rank": 3, "players": [{ "tag": "#2PP", "name": "Frank" }] }
                }
            ]
        }))
        .unwrap();

        assert_eq!(log.items.len(), 2);
        assert_eq!(log.items[0].battle.teams.as_ref().map(Vec::len), Some(2));
        assert_eq!(log.items[1].battle.rank, Some(3));
        assert!(log.items[0].played_at_millis() > log.items[1].played_at_millis());
    }
}
