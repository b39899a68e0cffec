//! Response assembly: filter, order and wrap ranked candidates.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::candidate::{Candidate, Provider};
use crate::ranker::ProviderPolicy;

const ERROR_PREFIX: &str = "error - ";

/// Overall outcome of one provider invocation.
///
/// Serialized as `"success"` or `"error - <message>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoStatus {
    Success,
    Error(String),
}

impl GoStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, GoStatus::Success)
    }
}

impl fmt::Display for GoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoStatus::Success => f.write_str("success"),
            GoStatus::Error(message) => write!(f, "{ERROR_PREFIX}{message}"),
        }
    }
}

impl Serialize for GoStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GoStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == "success" {
            return Ok(GoStatus::Success);
        }
        let message = raw
            .strip_prefix(ERROR_PREFIX)
            .or_else(|| raw.strip_prefix("error"))
            .unwrap_or(&raw);
        Ok(GoStatus::Error(message.to_string()))
    }
}

/// The response for one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEnvelope {
    pub go_status: GoStatus,
    pub provider: Provider,
    /// Ranked candidates, best first.
    pub streams: Vec<Candidate>,
}

impl StreamEnvelope {
    pub fn success(provider: Provider, streams: Vec<Candidate>) -> Self {
        Self {
            go_status: GoStatus::Success,
            provider,
            streams,
        }
    }

    /// Error envelope; never carries partial results.
    pub fn error(provider: Provider, message: impl fmt::Display) -> Self {
        Self {
            go_status: GoStatus::Error(message.to_string()),
            provider,
            streams: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.go_status.is_success()
    }
}

/// Post-ranking filters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterPolicy {
    /// Drop candidates whose title similarity is below this value.
    pub min_similarity: Option<f64>,
}

impl From<&ProviderPolicy> for FilterPolicy {
    fn from(policy: &ProviderPolicy) -> Self {
        Self {
            min_similarity: policy.similarity_threshold,
        }
    }
}

/// Filter `candidates`, then sort them by rank, highest first. Equal ranks
/// keep their input order.
pub fn assemble(
    provider: Provider,
    candidates: Vec<Candidate>,
    filter: &FilterPolicy,
) -> StreamEnvelope {
    let mut streams: Vec<Candidate> = match filter.min_similarity {
        Some(min) => candidates
            .into_iter()
            .filter(|c| c.title_similarity >= min)
            .collect(),
        None => candidates,
    };
    streams.sort_by(|a, b| b.rank.cmp(&a.rank));

    StreamEnvelope::success(provider, streams)
}
