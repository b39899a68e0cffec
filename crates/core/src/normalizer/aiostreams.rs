//! AIOStreams gateway streams.
//!
//! The gateway is configured with a formatter template that renders each
//! stream's metadata as a descriptor block in the `description` field.

use serde_json::Value;

use super::{
    file_index, str_field, streams_array, string_list, CandidateOutcome, NormalizeContext,
    NormalizeError, Normalized, SkipReason,
};
use crate::candidate::{CacheStatus, Candidate, Provider, ResolutionTier};
use crate::extractor::parse_descriptor;

pub(super) fn normalize(
    payload: &Value,
    ctx: &NormalizeContext,
) -> Result<Vec<CandidateOutcome>, NormalizeError> {
    let streams = streams_array(Provider::Aiostreams, payload)?;
    Ok(streams.iter().map(|entry| normalize_entry(entry, ctx)).collect())
}

fn normalize_entry(entry: &Value, ctx: &NormalizeContext) -> CandidateOutcome {
    if !entry.is_object() {
        return CandidateOutcome::Skipped(SkipReason::MalformedEntry);
    }
    let Some(description) = entry.get("description").and_then(Value::as_str) else {
        return CandidateOutcome::Skipped(SkipReason::MissingDescription);
    };

    let block = parse_descriptor(description);
    let Some(file_name) = block.non_empty("file_name") else {
        return CandidateOutcome::Skipped(SkipReason::MissingFileName);
    };

    let mut candidate = Candidate::new(Provider::Aiostreams, file_name);
    candidate.info_hash = block
        .non_empty("info_hash")
        .or_else(|| str_field(entry, "infoHash"))
        .map(str::to_string);
    candidate.clean_title = block
        .non_empty("title")
        .unwrap_or(&ctx.clean_title)
        .to_string();
    candidate.seeders = block.seeders();
    candidate.file_size_bytes = block.file_size();
    candidate.duration_seconds = block.int("duration");
    candidate.resolution = ResolutionTier::from_label(block.text("resolution"));
    candidate.audio_codecs = block.list("audio_tags").into_iter().collect();
    candidate.languages = block
        .list("languages_codes")
        .into_iter()
        .map(|code| code.to_lowercase())
        .collect();
    candidate.cached = CacheStatus::from_flag(block.text("cached"));
    candidate.service = block.text("service").trim().to_string();
    candidate.url = str_field(entry, "url").map(str::to_string);
    candidate.sources = string_list(entry, "sources");
    candidate.file_index = file_index(entry);

    CandidateOutcome::Accepted(Normalized {
        candidate,
        fallback_title: block.non_empty("folder_name").map(str::to_string),
    })
}
