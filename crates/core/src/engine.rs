//! Normalize, parse, rank and assemble one provider response.
//!
//! The engine is synchronous and performs no I/O; fetching happens before
//! [`RankingEngine::run`] is called.

use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::assembler::{assemble, FilterPolicy, StreamEnvelope};
use crate::candidate::Provider;
use crate::config::RankingConfig;
use crate::metrics;
use crate::normalizer::{NormalizeContext, NormalizeError, Normalized, SkipReason, SkipTally};
use crate::parser::{ParsedTitle, ReleaseTitleParser, TitleParseError, TitleParser};
use crate::query::{MediaQuery, QueryError};
use crate::ranker::Ranker;
use crate::resolution::ResolutionClassifier;

/// Invocation-level failures. Each one turns into an error envelope.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("payload belongs to {actual}, not {expected}")]
    ProviderMismatch { expected: Provider, actual: Provider },
}

/// A fetched provider payload, ready for ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub provider: Provider,
    pub payload: Value,
    /// Whether availability is judged by debrid cache status rather than
    /// seeders.
    pub using_debrid: bool,
}

impl ProviderResponse {
    pub fn new(provider: Provider, payload: Value, using_debrid: bool) -> Self {
        Self {
            provider,
            payload,
            using_debrid,
        }
    }
}

/// Candidate counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Entries the normalizer turned into candidates.
    pub accepted: usize,
    /// Candidates whose title parsed and which received a rank.
    pub ranked: usize,
    /// Ranked candidates removed by the similarity filter.
    pub filtered: usize,
    pub skipped: SkipTally,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankOutcome {
    pub envelope: StreamEnvelope,
    pub report: BatchReport,
}

/// Runs the ranking pipeline with a pluggable title parser.
#[derive(Clone)]
pub struct RankingEngine {
    parser: Arc<dyn TitleParser>,
    ranker: Ranker,
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self::new(Arc::new(ReleaseTitleParser::default()), Ranker::default())
    }
}

impl std::fmt::Debug for RankingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankingEngine")
            .field("parser", &self.parser.name())
            .field("ranker", &self.ranker)
            .finish()
    }
}

impl RankingEngine {
    pub fn new(parser: Arc<dyn TitleParser>, ranker: Ranker) -> Self {
        Self { parser, ranker }
    }

    /// Engine with the default release parser and the configured tables.
    pub fn from_config(config: &RankingConfig) -> Self {
        let classifier = ResolutionClassifier::new(config.resolution_tokens.clone());
        let parser = ReleaseTitleParser::new(classifier, config.codec_preferences.clone());
        Self::new(Arc::new(parser), Ranker::new(config.policy.clone()))
    }

    pub fn ranker(&self) -> &Ranker {
        &self.ranker
    }

    pub fn parser_name(&self) -> &str {
        self.parser.name()
    }

    /// Rank `response`, turning invocation-level failures into an error
    /// envelope.
    pub fn run(
        &self,
        provider: Provider,
        query: &MediaQuery,
        response: &ProviderResponse,
    ) -> RankOutcome {
        match self.try_run(provider, query, response) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(provider = %provider, error = %e, "Returning error envelope");
                RankOutcome {
                    envelope: StreamEnvelope::error(provider, &e),
                    report: BatchReport::default(),
                }
            }
        }
    }

    /// Like [`run`](Self::run) but hands invocation-level failures back to
    /// the caller.
    pub fn try_run(
        &self,
        provider: Provider,
        query: &MediaQuery,
        response: &ProviderResponse,
    ) -> Result<RankOutcome, EngineError> {
        if response.provider != provider {
            return Err(EngineError::ProviderMismatch {
                expected: provider,
                actual: response.provider,
            });
        }
        query.validate_for(provider)?;

        let ctx = NormalizeContext::new(query.title.trim(), response.using_debrid);
        let batch = provider.normalize(&response.payload, &ctx)?;

        let mut report = BatchReport {
            accepted: batch.accepted.len(),
            skipped: batch.skipped,
            ..Default::default()
        };
        let requested = query.language_list();
        let ranker = if requested.is_empty() {
            Cow::Borrowed(&self.ranker)
        } else {
            Cow::Owned(self.ranker.accepting_languages(&requested))
        };
        let provider_policy = ranker.provider_policy(provider);

        let mut ranked = Vec::with_capacity(batch.accepted.len());
        for normalized in batch.accepted {
            let parsed = match self.parse(&normalized) {
                Ok(parsed) => parsed,
                Err(e) => {
                    debug!(
                        provider = %provider,
                        title = %normalized.candidate.raw_title,
                        error = %e,
                        "Skipping candidate with unparsable title"
                    );
                    report.skipped.record(SkipReason::UnparsableTitle);
                    continue;
                }
            };

            let mut candidate = normalized.candidate;
            if tracing::enabled!(tracing::Level::TRACE) {
                let breakdown = ranker.explain(
                    &candidate,
                    &parsed,
                    response.using_debrid,
                    &provider_policy,
                );
                trace!(title = %candidate.raw_title, ?breakdown, "Rank breakdown");
            }
            ranker.rank(&mut candidate, &parsed, response.using_debrid, &provider_policy);
            ranked.push(candidate);
        }
        report.ranked = ranked.len();

        let envelope = assemble(provider, ranked, &FilterPolicy::from(&provider_policy));
        report.filtered = report.ranked - envelope.streams.len();

        record_metrics(provider, &report);
        info!(
            provider = %provider,
            accepted = report.accepted,
            ranked = report.ranked,
            filtered = report.filtered,
            skipped = report.skipped.total(),
            "Ranked provider response"
        );

        Ok(RankOutcome { envelope, report })
    }

    /// Parse the candidate's title, retrying with the fallback title when
    /// the primary one carries no resolution.
    fn parse(&self, normalized: &Normalized) -> Result<ParsedTitle, TitleParseError> {
        let candidate = &normalized.candidate;
        let hash = candidate.info_hash.as_deref();
        let parsed = self
            .parser
            .parse(&candidate.raw_title, &candidate.clean_title, hash)?;

        if parsed.facts.resolution.is_unknown() {
            if let Some(fallback) = &normalized.fallback_title {
                if let Ok(reparsed) = self.parser.parse(fallback, &candidate.clean_title, hash) {
                    return Ok(reparsed);
                }
            }
        }
        Ok(parsed)
    }
}

fn record_metrics(provider: Provider, report: &BatchReport) {
    let label = provider.as_str();
    metrics::CANDIDATES_NORMALIZED
        .with_label_values(&[label])
        .inc_by(report.accepted as u64);
    metrics::CANDIDATES_RANKED
        .with_label_values(&[label])
        .inc_by(report.ranked as u64);
    metrics::CANDIDATES_FILTERED
        .with_label_values(&[label])
        .inc_by(report.filtered as u64);
    for (reason, count) in report.skipped.iter() {
        metrics::CANDIDATES_SKIPPED
            .with_label_values(&[label, reason.as_str()])
            .inc_by(count as u64);
    }
}
