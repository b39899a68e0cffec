//! Title parsing.
//!
//! Turns a raw release name into quality/codec facts plus a base score
//! that the ranker starts from. The ranker treats both as opaque; any
//! implementation of [`TitleParser`] can be plugged into the engine.

mod release;
mod similarity;

pub use release::{CodecPreferences, ReleaseTitleParser};
pub use similarity::{levenshtein_distance, similarity_ratio};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::candidate::ResolutionTier;

/// Errors that make a title unusable for ranking.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TitleParseError {
    #[error("Title is empty")]
    EmptyTitle,

    #[error("Title has no alphanumeric content: {0}")]
    NoAlphanumeric(String),

    #[error("Invalid info hash: {0}")]
    InvalidInfoHash(String),
}

/// Facts extracted from a release name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedFacts {
    /// Title portion of the release name, before year/episode/quality tokens.
    pub parsed_title: String,
    /// `Unknown` when no resolution token was found.
    pub resolution: ResolutionTier,
    /// Video codec family (`avc`, `hevc`, `xvid`, `av1`).
    pub video_codec: Option<String>,
    /// Audio codec labels, in detection order.
    pub audio: Vec<String>,
    /// Language codes named in the release.
    pub languages: Vec<String>,
    /// HDR formats (`HDR`, `DV`).
    pub hdr: Vec<String>,
    pub dubbed: bool,
    /// Closeness of `parsed_title` to the expected title, in [0, 1].
    pub title_similarity: f64,
}

/// Output of a successful parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTitle {
    /// Codec/quality preference score the rank starts from.
    pub base_score: i64,
    pub facts: ParsedFacts,
}

/// Parses raw release names into [`ParsedTitle`]s.
pub trait TitleParser: Send + Sync {
    /// Name of this parser for logging.
    fn name(&self) -> &str;

    /// Parse `raw_title`, scoring similarity against `clean_title`.
    ///
    /// `info_hash` is validated when present; an absent hash is fine.
    fn parse(
        &self,
        raw_title: &str,
        clean_title: &str,
        info_hash: Option<&str>,
    ) -> Result<ParsedTitle, TitleParseError>;
}

/// Whether `hash` is a BitTorrent v1 info hash: 40 hex chars, or 32
/// base32 chars.
pub fn is_valid_info_hash(hash: &str) -> bool {
    let hex = hash.len() == 40 && hash.chars().all(|c| c.is_ascii_hexdigit());
    let base32 = hash.len() == 32
        && hash
            .chars()
            .all(|c| c.is_ascii_uppercase() || ('2'..='7').contains(&c));
    hex || base32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(TitleParseError::EmptyTitle.to_string(), "Title is empty");
        assert_eq!(
            TitleParseError::InvalidInfoHash("xyz".to_string()).to_string(),
            "Invalid info hash: xyz"
        );
    }

    #[test]
    fn test_info_hash_validation() {
        assert!(is_valid_info_hash("ABCDEF0123456789abcdef0123456789ABCDEF01"));
        assert!(is_valid_info_hash("ABCDEFGHIJKLMNOPQRSTUVWXYZ234567"));
        assert!(!is_valid_info_hash("abcdefghijklmnopqrstuvwxyz234567"));
        assert!(!is_valid_info_hash("abc"));
        assert!(!is_valid_info_hash("ZZCDEF0123456789abcdef0123456789ABCDEF01"));
    }
}
