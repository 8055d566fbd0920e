//! Parser for the compact battle timestamp used by the battle log endpoint.
//!
//! The API encodes times as `YYYYMMDDTHHMMSS.fffZ` (e.g. `20240305T181522.000Z`),
//! always in UTC. The trailing `Z` is accepted but not required.

use chrono::NaiveDateTime;

const BATTLE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S%.f";

/// Converts a battle timestamp to Unix epoch milliseconds.
///
/// Returns `None` when the string does not follow the compact format.
pub fn parse_battle_time(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let without_zone = trimmed.strip_suffix('Z').unwrap_or(trimmed);
    NaiveDateTime::parse_from_str(without_zone, BATTLE_TIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_api_timestamps() {
        // 2020-11-21T17:32:03Z
        assert_eq!(parse_battle_time("20201121T173203.000Z"), Some(1_605_979_923_000));
        assert_eq!(parse_battle_time("20201121T173203.250"), Some(1_605_979_923_250));
    }

    #[test]
    fn ordering_follows_wall_clock() {
        let earlier = parse_battle_time("20240305T181522.000Z").unwrap();
        let later = parse_battle_time("20240305T181523.000Z").unwrap();
        assert!(later > earlier);
        assert_eq!(later - earlier, 1000);
    }

    #[test]
    fn rejects_other_formats() {
        assert_eq!(parse_battle_time("2024-03-05T18:15:22Z"), None);
        assert_eq!(parse_battle_time(""), None);
        assert_eq!(parse_battle_time("20241305T181522.000Z"), None);
    }
}
