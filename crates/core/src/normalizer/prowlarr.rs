//! Prowlarr search results: a bare array of release objects.

use serde_json::Value;

use super::{
    int_or, str_field, CandidateOutcome, NormalizeContext, NormalizeError, Normalized, SkipReason,
};
use crate::candidate::{Candidate, Provider, UNKNOWN};

const TORRENT_PROTOCOL: &str = "torrent";

pub(super) fn normalize(
    payload: &Value,
    ctx: &NormalizeContext,
) -> Result<Vec<CandidateOutcome>, NormalizeError> {
    let releases = payload
        .as_array()
        .ok_or_else(|| NormalizeError::UnexpectedShape {
            provider: Provider::Prowlarr,
            reason: "expected a top-level array of releases".to_string(),
        })?;
    Ok(releases.iter().map(|entry| normalize_entry(entry, ctx)).collect())
}

fn normalize_entry(entry: &Value, ctx: &NormalizeContext) -> CandidateOutcome {
    if !entry.is_object() {
        return CandidateOutcome::Skipped(SkipReason::MalformedEntry);
    }
    if let Some(protocol) = str_field(entry, "protocol") {
        if !protocol.eq_ignore_ascii_case(TORRENT_PROTOCOL) {
            return CandidateOutcome::Skipped(SkipReason::UnsupportedProtocol);
        }
    }
    let Some(title) = str_field(entry, "title") else {
        return CandidateOutcome::Skipped(SkipReason::MissingTitle);
    };

    let mut candidate = Candidate::new(Provider::Prowlarr, title);
    candidate.info_hash = str_field(entry, "infoHash").map(str::to_string);
    candidate.clean_title = ctx.clean_title.clone();
    candidate.seeders = int_or(entry, "seeders", 0);
    candidate.leechers = int_or(entry, "leechers", UNKNOWN);
    candidate.file_size_bytes = int_or(entry, "size", UNKNOWN);
    candidate.url = str_field(entry, "magnetUrl")
        .or_else(|| str_field(entry, "downloadUrl"))
        .map(str::to_string)
        .or_else(|| candidate.magnet_uri());

    CandidateOutcome::Accepted(Normalized::new(candidate))
}
