//! # Change Detector
//!
//! Pure functions turning an (old, new) snapshot pair into an ordered list of
//! [`BrawlEvent`]s. No I/O and no shared state: the refresh loops call these
//! and publish whatever comes back.

use std::collections::HashSet;
use std::sync::Arc;

use crate::core::events::BrawlEvent;
use crate::models::{BattleLog, Club, Player, PlayerBrawler};
use crate::utils::tags::Tag;

/// Whether any tracked profile field differs.
fn player_fields_changed(old: &Player, new: &Player) -> bool {
    old.name != new.name
        || old.icon.id != new.icon.id
        || old.name_color != new.name_color
        || old.trophies != new.trophies
        || old.highest_trophies != new.highest_trophies
        || old.exp_level != new.exp_level
        || old.exp_points != new.exp_points
        || old.power_play_points != new.power_play_points
        || old.highest_power_play_points != new.highest_power_play_points
        || old.solo_victories != new.solo_victories
        || old.duo_victories != new.duo_victories
        || old.trio_victories != new.trio_victories
        || old.best_robo_rumble_time != new.best_robo_rumble_time
        || old.best_time_as_big_brawler != new.best_time_as_big_brawler
        || old.is_qualified_from_championship_challenge != new.is_qualified_from_championship_challenge
        || old.club_tag() != new.club_tag()
}

fn brawler_changed(old: &PlayerBrawler, new: &PlayerBrawler) -> bool {
    old.gadgets.len() != new.gadgets.len()
        || old.star_powers.len() != new.star_powers.len()
        || old.rank != new.rank
        || old.power != new.power
}

/// Events for a refreshed player.
///
/// Emits at most one `PlayerUpdate`, then one `PlayerBrawlerUpdate` per brawler
/// that is new or whose gadgets, star powers, rank or power changed, in the
/// order of the new snapshot.
pub fn diff_player(old: &Arc<Player>, new: &Arc<Player>) -> Vec<BrawlEvent> {
    let mut events = Vec::new();

    if player_fields_changed(old, new) {
        events.push(BrawlEvent::PlayerUpdate {
            old: Arc::clone(old),
            new: Arc::clone(new),
        });
    }

    for brawler in &new.brawlers {
        let previous = old.brawler(brawler.id);
        if previous.is_none_or(|previous| brawler_changed(previous, brawler)) {
            events.push(BrawlEvent::PlayerBrawlerUpdate {
                player: Arc::clone(new),
                old_brawler: previous.cloned(),
                new_brawler: brawler.clone(),
            });
        }
    }

    events
}

/// Events for a refreshed club: `ClubUpdate`, then removals, then additions.
///
/// A member present in both rosters with different fields produces nothing.
pub fn diff_club(old: &Arc<Club>, new: &Arc<Club>) -> Vec<BrawlEvent> {
    let mut events = Vec::new();

    if old.name != new.name
        || old.badge_id != new.badge_id
        || old.description != new.description
        || old.required_trophies != new.required_trophies
        || old.club_type != new.club_type
    {
        events.push(BrawlEvent::ClubUpdate {
            old: Arc::clone(old),
            new: Arc::clone(new),
        });
    }

    let old_tags: HashSet<&str> = old.members.iter().map(|m| m.tag.as_str()).collect();
    let new_tags: HashSet<&str> = new.members.iter().map(|m| m.tag.as_str()).collect();

    events.extend(
        old.members
            .iter()
            .filter(|member| !new_tags.contains(member.tag.as_str()))
            .map(|member| BrawlEvent::ClubMemberRemove {
                club: Arc::clone(new),
                member: member.clone(),
            }),
    );
    events.extend(
        new.members
            .iter()
            .filter(|member| !old_tags.contains(member.tag.as_str()))
            .map(|member| BrawlEvent::ClubMemberAdd {
                club: Arc::clone(new),
                member: member.clone(),
            }),
    );

    events
}

/// Events for a refreshed battle log, plus the advanced cursor.
///
/// Battles strictly newer than `cursor` are emitted in API order. The returned
/// cursor is the maximum of `cursor` and every parsable battle time, so it
/// never moves backwards and an empty log leaves it as is.
pub fn diff_battles(tag: &Tag, cursor: i64, log: &BattleLog) -> (Vec<BrawlEvent>, i64) {
    let mut events = Vec::new();
    let mut newest = cursor;

    for battle in &log.items {
        let Some(played_at) = battle.played_at_millis() else {
            continue;
        };
        if played_at > cursor {
            events.push(BrawlEvent::PlayerBattle {
                tag: tag.clone(),
                battle: battle.clone(),
            });
        }
        newest = newest.max(played_at);
    }

    (events, newest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::EventName;
    use serde_json::json;

    fn player(brawlers: serde_json::Value) -> Player {
        serde_json::from_value(json!({
            "tag": "#2PP",
            "name": "Frank",
            "trophies": 1000,
            "club": { "tag": "#9UV", "name": "Alpha" },
            "brawlers": brawlers
        }))
        .unwrap()
    }

    fn club(members: &[&str]) -> Arc<Club> {
        let members: Vec<_> = members
            .iter()
            .map(|tag| json!({ "tag": tag, "name": tag, "role": "member" }))
            .collect();
        Arc::new(
            serde_json::from_value(json!({
                "tag": "#9UV", "name": "Alpha", "type": "open", "members": members
            }))
            .unwrap(),
        )
    }

    fn battle_log(times: &[&str]) -> BattleLog {
        let items: Vec<_> = times.iter().map(|t| json!({ "battleTime": t })).collect();
        serde_json::from_value(json!({ "items": items })).unwrap()
    }

    fn names(events: &[BrawlEvent]) -> Vec<EventName> {
        events.iter().map(BrawlEvent::name).collect()
    }

    #[test]
    fn identical_players_produce_nothing() {
        let p = player(json!([{ "id": 1, "rank": 5, "power": 3 }]));
        assert!(diff_player(&Arc::new(p.clone()), &Arc::new(p)).is_empty());
    }

    #[test]
    fn a_rank_up_produces_one_brawler_update() {
        let old = Arc::new(player(json!([{ "id": 1, "rank": 5, "power": 3, "gadgets": [], "starPowers": [] }])));
        let new = Arc::new(player(json!([{ "id": 1, "rank": 6, "power": 3, "gadgets": [], "starPowers": [] }])));

        let events = diff_player(&old, &new);
        assert_eq!(events.len(), 1);
        match &events[0] {
            BrawlEvent::PlayerBrawlerUpdate { old_brawler, new_brawler, .. } => {
                assert_eq!(old_brawler.as_ref().map(|b| b.rank), Some(5));
                assert_eq!(new_brawler.rank, 6);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn every_changed_or_new_brawler_is_reported() {
        let old = Arc::new(player(json!([
            { "id": 1, "rank": 5, "power": 3 },
            { "id": 2, "rank": 1, "power": 1 }
        ])));
        let new = Arc::new(player(json!([
            { "id": 1, "rank": 5, "power": 4 },
            { "id": 2, "rank": 1, "power": 1, "gadgets": [{ "id": 9 }] },
            { "id": 3, "rank": 1, "power": 1 }
        ])));

        let events = diff_player(&old, &new);
        let ids: Vec<(i64, bool)> = events
            .iter()
            .map(|e| match e {
                BrawlEvent::PlayerBrawlerUpdate { old_brawler, new_brawler, .. } => {
                    (new_brawler.id, old_brawler.is_some())
                }
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(ids, [(1, true), (2, true), (3, false)]);
    }

    #[test]
    fn trophy_change_and_club_change_are_profile_updates() {
        let old = player(json!([]));
        let mut new = old.clone();
        new.trophies += 8;
        assert_eq!(
            names(&diff_player(&Arc::new(old.clone()), &Arc::new(new))),
            [EventName::PlayerUpdate]
        );

        let mut left_club = old.clone();
        left_club.club = None;
        assert_eq!(
            names(&diff_player(&Arc::new(old), &Arc::new(left_club))),
            [EventName::PlayerUpdate]
        );
    }

    #[test]
    fn brawler_trophies_alone_are_not_an_update() {
        let old = Arc::new(player(json!([{ "id": 1, "trophies": 100 }])));
        let new = Arc::new(player(json!([{ "id": 1, "trophies": 120 }])));
        assert!(diff_player(&old, &new).is_empty());
    }

    #[test]
    fn roster_change_removes_before_adding() {
        let events = diff_club(&club(&["#A", "#B"]), &club(&["#B", "#C"]));

        let summary: Vec<(EventName, &str)> = events
            .iter()
            .map(|e| match e {
                BrawlEvent::ClubMemberRemove { member, .. } | BrawlEvent::ClubMemberAdd { member, .. } => {
                    (e.name(), member.tag.as_str())
                }
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(
            summary,
            [(EventName::ClubMemberRemove, "#A"), (EventName::ClubMemberAdd, "#C")]
        );
    }

    #[test]
    fn club_field_change_comes_first() {
        let old = club(&["#A"]);
        let mut renamed = (*club(&[])).clone();
        renamed.name = "Beta".into();

        let events = diff_club(&old, &Arc::new(renamed));
        assert_eq!(names(&events), [EventName::ClubUpdate, EventName::ClubMemberRemove]);
    }

    #[test]
    fn role_change_is_not_reported() {
        let old = club(&["#A"]);
        let mut promoted = (*old).clone();
        promoted.members[0].role = "senior".into();
        assert!(diff_club(&old, &Arc::new(promoted)).is_empty());
    }

    #[test]
    fn only_battles_newer_than_the_cursor_are_emitted() {
        let tag = Tag::parse("#2PP").unwrap();
        let log = battle_log(&["20201121T173203.000Z", "20201121T170000.000Z", "20201121T160000.000Z"]);
        let cursor = crate::utils::battle_time::parse_battle_time("20201121T170000.000Z").unwrap();

        let (events, next) = diff_battles(&tag, cursor, &log);
        assert_eq!(events.len(), 1);
        assert_eq!(next, 1_605_979_923_000);
    }

    #[test]
    fn cursor_is_monotonic_across_fetches() {
        let tag = Tag::parse("#2PP").unwrap();
        let fetches = [
            battle_log(&["20201121T173203.000Z", "20201121T170000.000Z"]),
            battle_log(&["20201121T160000.000Z"]),
            battle_log(&[]),
            battle_log(&["not a time", "20201122T000000.000Z"]),
        ];

        let mut cursor = 0;
        let mut emitted = 0;
        let mut max_seen = 0;
        for log in &fetches {
            let (events, next) = diff_battles(&tag, cursor, log);
            emitted += events.len();
            assert!(next >= cursor);
            cursor = next;
            max_seen = log
                .items
                .iter()
                .filter_map(|b| b.played_at_millis())
                .fold(max_seen, i64::max);
            assert_eq!(cursor, max_seen);
        }
        assert_eq!(emitted, 3);
    }

    #[test]
    fn empty_log_keeps_the_cursor() {
        let tag = Tag::parse("#2PP").unwrap();
        let (events, next) = diff_battles(&tag, 42, &battle_log(&[]));
        assert!(events.is_empty());
        assert_eq!(next, 42);
    }
}
