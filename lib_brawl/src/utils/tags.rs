//! # Tag Validation
//!
//! Players and clubs are addressed by a short "tag": a `#` followed by 3 to 9
//! characters from a 14-symbol alphabet. Users type tags in all sorts of ways
//! (lower case, with a letter `O` instead of a zero, with or without the hash,
//! with trailing garbage pasted from chat), so every tag goes through
//! [`Tag::parse`] before it is used as a URL segment or a watch-list key.
//!
//! ## Normalization:
//! 1. Upper-case the input.
//! 2. Replace every letter `O` with the digit `0`.
//! 3. Drop the first `#`.
//! 4. Take the first run of 3 to 9 alphabet characters, scanning left to right.
//!
//! Anything after that run is discarded. The canonical form is `#` + the run.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};
use static_init::dynamic;
use thiserror::Error;

/// Characters that can appear in a tag, after normalization.
pub const TAG_ALPHABET: &str = "0289PYLQGRJCUV";

#[dynamic]
static TAG_PATTERN: Regex = Regex::new("[0289PYLQGRJCUV]{3,9}").expect("tag pattern is a valid regex");

/// Errors produced while normalizing a raw tag string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TagError {
    /// The input was empty (or only whitespace).
    #[error("tag is empty")]
    Empty,

    /// No run of 3 to 9 alphabet characters was found in the input.
    #[error("invalid tag: {0:?}")]
    Invalid(String),
}

/// A canonical player or club tag, e.g. `#2PP`.
///
/// Two tags are equal iff their canonical forms are equal; a `Tag` can only be
/// built through [`Tag::parse`], so every value in the program is canonical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tag(String);

impl Tag {
    /// Normalizes and validates `raw`.
    ///
    /// ```
    /// use lib_brawl::utils::tags::Tag;
    ///
    /// let tag = Tag::parse("o2pql").unwrap();
    /// assert_eq!(tag.as_str(), "#02PQL");
    /// ```
    pub fn parse(raw: &str) -> Result<Self, TagError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TagError::Empty);
        }

        let normalized = trimmed.to_uppercase().replace('O', "0").replacen('#', "", 1);

        TAG_PATTERN
            .find(&normalized)
            .map(|run| Tag(format!("#{}", run.as_str())))
            .ok_or_else(|| TagError::Invalid(raw.to_string()))
    }

    /// The canonical form, including the leading `#`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The tag as a URL path segment (`#` percent-encoded as `%23`).
    pub fn encoded(&self) -> String {
        format!("%23{}", &self.0[1..])
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Tag {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tag::parse(s)
    }
}

impl TryFrom<String> for Tag {
    type Error = TagError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Tag::parse(&value)
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.0
    }
}

/// Parses every entry of `raws`, failing on the first invalid one.
///
/// Used by the watch-list mutators so that a batch is applied either fully or
/// not at all.
pub fn parse_all<I, S>(raws: I) -> Result<Vec<Tag>, TagError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raws.into_iter().map(|raw| Tag::parse(raw.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_o_becomes_zero() {
        assert_eq!(Tag::parse("o2pql").unwrap().as_str(), "#02PQL");
    }

    #[test]
    fn leading_hash_is_optional() {
        assert_eq!(Tag::parse("#2ppq").unwrap(), Tag::parse("2ppq").unwrap());
    }

    #[test]
    fn canonical_form_is_a_fixed_point() {
        for raw in ["#YJ0LVRQQ", "yj0lvrqq", " #pp2 ", "ooo", "#c9uv8"] {
            let once = Tag::parse(raw).unwrap();
            let twice = Tag::parse(once.as_str()).unwrap();
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn trailing_garbage_after_the_first_run_is_dropped() {
        assert_eq!(Tag::parse("#2PPQ-hello").unwrap().as_str(), "#2PPQ");
        // "AB" is outside the alphabet; the first run is "PQL"
        assert_eq!(Tag::parse("ABPQL").unwrap().as_str(), "#PQL");
    }

    #[test]
    fn runs_longer_than_nine_are_truncated() {
        assert_eq!(Tag::parse("2222222222222").unwrap().as_str(), "#222222222");
    }

    #[test]
    fn rejects_inputs_without_a_valid_run() {
        assert_eq!(Tag::parse(""), Err(TagError::Empty));
        assert_eq!(Tag::parse("   "), Err(TagError::Empty));
        assert!(matches!(Tag::parse("#2P"), Err(TagError::Invalid(_))));
        assert!(matches!(Tag::parse("abcdef"), Err(TagError::Invalid(_))));
    }

    #[test]
    fn encoded_form_escapes_the_hash() {
        assert_eq!(Tag::parse("#YJ0LVRQQ").unwrap().encoded(), "%23YJ0LVRQQ");
    }

    #[test]
    fn deserializes_through_validation() {
        let tag: Tag = serde_json::from_str("\"#yj0lvrqq\"").unwrap();
        assert_eq!(tag.as_str(), "#YJ0LVRQQ");
        assert!(serde_json::from_str::<Tag>("\"nope\"").is_err());
    }

    #[test]
    fn parse_all_is_all_or_nothing() {
        assert_eq!(parse_all(["2pp", "#9uv"]).unwrap().len(), 2);
        assert!(parse_all(["2pp", "xx"]).is_err());
    }
}
