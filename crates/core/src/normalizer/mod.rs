//! Provider payload normalization.
//!
//! Each provider returns its own JSON shape. A normalizer maps one payload
//! onto [`Candidate`]s, reporting every entry it could not use as an
//! explicit [`SkipReason`] instead of dropping it silently.

mod aiostreams;
mod prowlarr;
mod torrentio;

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::candidate::{Candidate, Provider, UNKNOWN};

/// Invocation-level normalization failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("unexpected response body from {provider}: {reason}")]
    UnexpectedShape { provider: Provider, reason: String },
}

/// Why a payload entry did not become a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingDescription,
    MissingFileName,
    MissingTitle,
    MissingInfoHash,
    UnsupportedProtocol,
    UnparsableTitle,
    MalformedEntry,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::MissingDescription => "missing_description",
            SkipReason::MissingFileName => "missing_file_name",
            SkipReason::MissingTitle => "missing_title",
            SkipReason::MissingInfoHash => "missing_info_hash",
            SkipReason::UnsupportedProtocol => "unsupported_protocol",
            SkipReason::UnparsableTitle => "unparsable_title",
            SkipReason::MalformedEntry => "malformed_entry",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-reason skip counts for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SkipTally {
    counts: BTreeMap<SkipReason, usize>,
}

impl SkipTally {
    pub fn record(&mut self, reason: SkipReason) {
        *self.counts.entry(reason).or_insert(0) += 1;
    }

    pub fn count(&self, reason: SkipReason) -> usize {
        self.counts.get(&reason).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SkipReason, usize)> + '_ {
        self.counts.iter().map(|(reason, count)| (*reason, *count))
    }
}

/// A candidate built from one payload entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub candidate: Candidate,
    /// Alternative name to parse when `candidate.raw_title` carries no
    /// resolution (some packs only describe quality in the folder name).
    pub fallback_title: Option<String>,
}

impl Normalized {
    pub fn new(candidate: Candidate) -> Self {
        Self {
            candidate,
            fallback_title: None,
        }
    }
}

/// Result of normalizing a single payload entry.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateOutcome {
    Accepted(Normalized),
    Skipped(SkipReason),
}

/// Accepted candidates in payload order plus skip counts.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub accepted: Vec<Normalized>,
    pub skipped: SkipTally,
}

impl NormalizedBatch {
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = CandidateOutcome>) -> Self {
        let mut batch = NormalizedBatch::default();
        for outcome in outcomes {
            match outcome {
                CandidateOutcome::Accepted(normalized) => batch.accepted.push(normalized),
                CandidateOutcome::Skipped(reason) => batch.skipped.record(reason),
            }
        }
        batch
    }
}

/// Per-invocation inputs the payload itself does not carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeContext {
    /// Expected title, used when an entry carries none.
    pub clean_title: String,
    /// Whether the request went through a debrid backend.
    pub using_debrid: bool,
}

impl NormalizeContext {
    pub fn new(clean_title: impl Into<String>, using_debrid: bool) -> Self {
        Self {
            clean_title: clean_title.into(),
            using_debrid,
        }
    }
}

impl Provider {
    /// Normalize a raw provider payload.
    ///
    /// Fails only when the payload lacks its expected top-level shape;
    /// unusable entries are counted in the batch's [`SkipTally`].
    pub fn normalize(
        &self,
        payload: &Value,
        ctx: &NormalizeContext,
    ) -> Result<NormalizedBatch, NormalizeError> {
        let outcomes = match self {
            Provider::Torrentio => torrentio::normalize(payload, ctx)?,
            Provider::Aiostreams => aiostreams::normalize(payload, ctx)?,
            Provider::Prowlarr => prowlarr::normalize(payload, ctx)?,
        };
        Ok(NormalizedBatch::from_outcomes(outcomes))
    }
}

/// The `streams` array of a Stremio-style addon response.
fn streams_array(provider: Provider, payload: &Value) -> Result<&Vec<Value>, NormalizeError> {
    payload
        .get("streams")
        .and_then(Value::as_array)
        .ok_or_else(|| NormalizeError::UnexpectedShape {
            provider,
            reason: "missing `streams` array".to_string(),
        })
}

/// Non-empty, trimmed string field.
fn str_field<'a>(entry: &'a Value, key: &str) -> Option<&'a str> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Integer field, accepting JSON numbers and numeric strings.
fn int_field(entry: &Value, key: &str) -> Option<i64> {
    match entry.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn int_or(entry: &Value, key: &str, default: i64) -> i64 {
    int_field(entry, key).unwrap_or(default)
}

fn string_list(entry: &Value, key: &str) -> Vec<String> {
    entry
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn file_index(entry: &Value) -> i64 {
    int_or(entry, "fileIdx", UNKNOWN)
}
