//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Normalization and ranking (accepted, skipped and ranked candidates)
//! - Provider requests (outcomes, latency, retries)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Engine Metrics
// =============================================================================

/// Candidates produced by a normalizer, by provider.
pub static CANDIDATES_NORMALIZED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "streamrank_candidates_normalized_total",
            "Total payload entries normalized into candidates",
        ),
        &["provider"],
    )
    .unwrap()
});

/// Payload entries or candidates dropped before ranking.
pub static CANDIDATES_SKIPPED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "streamrank_candidates_skipped_total",
            "Total candidates dropped before ranking",
        ),
        &["provider", "reason"],
    )
    .unwrap()
});

/// Candidates that received a rank.
pub static CANDIDATES_RANKED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "streamrank_candidates_ranked_total",
            "Total candidates ranked",
        ),
        &["provider"],
    )
    .unwrap()
});

/// Ranked candidates removed by the similarity filter.
pub static CANDIDATES_FILTERED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "streamrank_candidates_filtered_total",
            "Total ranked candidates removed by the similarity filter",
        ),
        &["provider"],
    )
    .unwrap()
});

// =============================================================================
// Provider Request Metrics
// =============================================================================

/// Provider fetches by result.
pub static PROVIDER_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "streamrank_provider_requests_total",
            "Total provider fetches",
        ),
        &["provider", "result"], // "success", "error"
    )
    .unwrap()
});

/// Provider fetch duration in seconds, retries included.
pub static PROVIDER_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "streamrank_provider_request_duration_seconds",
            "Duration of provider fetches",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["provider"],
    )
    .unwrap()
});

/// HTTP retries issued by the fetcher.
pub static HTTP_RETRIES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "streamrank_http_retries_total",
            "Total HTTP requests retried",
        ),
        &["reason"], // "status", "transport"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Engine
        Box::new(CANDIDATES_NORMALIZED.clone()),
        Box::new(CANDIDATES_SKIPPED.clone()),
        Box::new(CANDIDATES_RANKED.clone()),
        Box::new(CANDIDATES_FILTERED.clone()),
        // Provider requests
        Box::new(PROVIDER_REQUESTS.clone()),
        Box::new(PROVIDER_REQUEST_DURATION.clone()),
        Box::new(HTTP_RETRIES.clone()),
    ]
}
