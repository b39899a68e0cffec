//! Types for normalized stream candidates.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Sentinel for numeric fields whose value a provider did not report.
pub const UNKNOWN: i64 = -1;

/// Perceived video resolution / source quality of a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResolutionTier {
    #[serde(rename = "SD")]
    Sd,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "4K")]
    Uhd,
    #[serde(rename = "SCR")]
    Scr,
    #[serde(rename = "CAM")]
    Cam,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl ResolutionTier {
    /// Wire label of this tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionTier::Sd => "SD",
            ResolutionTier::P720 => "720p",
            ResolutionTier::P1080 => "1080p",
            ResolutionTier::Uhd => "4K",
            ResolutionTier::Scr => "SCR",
            ResolutionTier::Cam => "CAM",
            ResolutionTier::Unknown => "unknown",
        }
    }

    /// Map a provider-reported resolution label onto a tier.
    ///
    /// Providers use loose labels ("2160p", "4k", "1080p", "480p", ...).
    /// Anything unrecognised, including an empty label, is `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "2160p" | "4k" | "uhd" => ResolutionTier::Uhd,
            // 1440p has no tier of its own
            "1440p" | "2k" | "1080p" | "1080i" => ResolutionTier::P1080,
            "720p" => ResolutionTier::P720,
            "576p" | "480p" | "360p" | "240p" | "sd" => ResolutionTier::Sd,
            "scr" | "screener" => ResolutionTier::Scr,
            "cam" | "ts" | "tc" => ResolutionTier::Cam,
            _ => ResolutionTier::Unknown,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ResolutionTier::Unknown)
    }
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Debrid cache availability as reported by a provider.
///
/// Serialized as the strings `"true"`, `"false"` and `"unknown"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CacheStatus {
    Cached,
    NotCached,
    #[default]
    Unknown,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Cached => "true",
            CacheStatus::NotCached => "false",
            CacheStatus::Unknown => "unknown",
        }
    }

    /// Parse a provider flag. Only explicit `true`/`false` are trusted.
    pub fn from_flag(flag: &str) -> Self {
        match flag.trim().to_lowercase().as_str() {
            "true" => CacheStatus::Cached,
            "false" => CacheStatus::NotCached,
            _ => CacheStatus::Unknown,
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, CacheStatus::Cached)
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CacheStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CacheStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(CacheStatus::from_flag(&raw))
    }
}

/// Source of candidate metadata. Each variant has its own payload shape
/// and ranking policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// Stremio addon aggregator returning stream entries with stat lines.
    Torrentio,
    /// Debrid gateway emitting `key:value` descriptor blocks.
    Aiostreams,
    /// Indexer search engine.
    Prowlarr,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Torrentio, Provider::Aiostreams, Provider::Prowlarr];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Torrentio => "torrentio",
            Provider::Aiostreams => "aiostreams",
            Provider::Prowlarr => "prowlarr",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown provider: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "torrentio" => Ok(Provider::Torrentio),
            "aiostreams" => Ok(Provider::Aiostreams),
            "prowlarr" => Ok(Provider::Prowlarr),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// A single normalized media-file entry eligible for ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Original filename or release title used for parsing.
    pub raw_title: String,
    /// Content identifier, absent for some non-debrid sources.
    pub info_hash: Option<String>,
    /// Expected title the raw title is compared against.
    pub clean_title: String,
    pub seeders: i64,
    pub leechers: i64,
    pub file_size_bytes: i64,
    pub duration_seconds: i64,
    pub resolution: ResolutionTier,
    pub audio_codecs: BTreeSet<String>,
    /// ISO-639-1-like language codes.
    pub languages: BTreeSet<String>,
    pub cached: CacheStatus,
    /// Debrid service short name, empty when none.
    pub service: String,
    /// Selected file inside the torrent, -1 when none.
    pub file_index: i64,
    pub url: Option<String>,
    /// Peer-to-peer tracker URIs (`tracker:<url>`, `dht:<hash>`).
    pub sources: Vec<String>,
    pub provider: Provider,
    pub rank: i64,
    /// Lexical closeness of `raw_title` to `clean_title`, in [0, 1].
    pub title_similarity: f64,
}

impl Candidate {
    /// Build a candidate with every optional field at its "unknown" default.
    pub fn new(provider: Provider, raw_title: impl Into<String>) -> Self {
        Self {
            raw_title: raw_title.into(),
            info_hash: None,
            clean_title: String::new(),
            seeders: 0,
            leechers: UNKNOWN,
            file_size_bytes: UNKNOWN,
            duration_seconds: UNKNOWN,
            resolution: ResolutionTier::Unknown,
            audio_codecs: BTreeSet::new(),
            languages: BTreeSet::new(),
            cached: CacheStatus::Unknown,
            service: String::new(),
            file_index: UNKNOWN,
            url: None,
            sources: Vec::new(),
            provider,
            rank: 0,
            title_similarity: 0.0,
        }
    }

    /// Magnet link for this candidate, if it carries an info hash.
    pub fn magnet_uri(&self) -> Option<String> {
        self.info_hash
            .as_deref()
            .and_then(|hash| crate::magnet::magnet_uri(hash, &self.sources))
    }
}
