//! Club model for `GET /clubs/{tag}` and `GET /clubs/{tag}/members`.

use serde::{Deserialize, Serialize};

use super::player::Icon;

/// A member entry in a club roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubMember {
    /// Member's player tag.
    pub tag: String,
    /// Member's in-game name.
    pub name: String,
    /// Name colour as an ARGB hex string.
    #[serde(default)]
    pub name_color: Option<String>,
    /// Role inside the club (`member`, `senior`, `vicePresident`, `president`).
    #[serde(default)]
    pub role: String,
    /// Member's trophies.
    #[serde(default)]
    pub trophies: i64,
    /// Member's profile icon.
    #[serde(default)]
    pub icon: Icon,
}

/// Full club snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    /// Canonical club tag.
    pub tag: String,
    /// Club name.
    pub name: String,
    /// Free-text description, absent when the club never set one.
    #[serde(default)]
    pub description: Option<String>,
    /// Sum of member trophies.
    #[serde(default)]
    pub trophies: i64,
    /// Trophies required to join.
    #[serde(default)]
    pub required_trophies: i64,
    /// Join policy (`open`, `inviteOnly`, `closed`).
    #[serde(default, rename = "type")]
    pub club_type: String,
    /// Badge id.
    #[serde(default)]
    pub badge_id: i64,
    /// Current roster.
    #[serde(default)]
    pub members: Vec<ClubMember>,
}

impl Club {
    /// Looks up a member by player tag.
    pub fn member(&self, tag: &str) -> Option<&ClubMember> {
        self.members.iter().find(|member| member.tag == tag)
    }
}
