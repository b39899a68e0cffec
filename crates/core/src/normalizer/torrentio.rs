//! Torrentio addon streams.
//!
//! Entry titles look like `"<torrent name>\n<file>\n👤 12 💾 1.4 GB ⚙️ src"`.
//! When the request carried a Real-Debrid key, the info hash and file index
//! move into the playback URL and the `name` carries an `[RD+]` marker for
//! cached torrents.

use serde_json::Value;

use super::{
    file_index, str_field, streams_array, string_list, CandidateOutcome, NormalizeContext,
    NormalizeError, Normalized, SkipReason,
};
use crate::candidate::{CacheStatus, Candidate, Provider, UNKNOWN};
use crate::extractor::{flag_languages, parse_torrent_stats};

const CACHED_MARKER: &str = "[RD+]";
const DEBRID_SEGMENT: &str = "realdebrid";
const DEBRID_SERVICE: &str = "RD";

pub(super) fn normalize(
    payload: &Value,
    ctx: &NormalizeContext,
) -> Result<Vec<CandidateOutcome>, NormalizeError> {
    let streams = streams_array(Provider::Torrentio, payload)?;
    Ok(streams.iter().map(|entry| normalize_entry(entry, ctx)).collect())
}

fn normalize_entry(entry: &Value, ctx: &NormalizeContext) -> CandidateOutcome {
    if !entry.is_object() {
        return CandidateOutcome::Skipped(SkipReason::MalformedEntry);
    }

    let has_filename = entry
        .get("behaviorHints")
        .and_then(|hints| str_field(hints, "filename"))
        .is_some();
    if !has_filename {
        return CandidateOutcome::Skipped(SkipReason::MissingFileName);
    }

    let Some(title) = str_field(entry, "title") else {
        return CandidateOutcome::Skipped(SkipReason::MissingTitle);
    };
    let Some(raw_title) = title.lines().next().map(str::trim).filter(|l| !l.is_empty()) else {
        return CandidateOutcome::Skipped(SkipReason::MissingTitle);
    };

    let mut info_hash = str_field(entry, "infoHash").map(str::to_string);
    let mut index = file_index(entry);
    let mut cached = CacheStatus::Unknown;
    let mut service = String::new();

    if ctx.using_debrid {
        let name = str_field(entry, "name").unwrap_or("");
        cached = if name.contains(CACHED_MARKER) {
            CacheStatus::Cached
        } else {
            CacheStatus::NotCached
        };
        service = DEBRID_SERVICE.to_string();

        if let Some((hash, idx)) = str_field(entry, "url").and_then(debrid_location) {
            info_hash = hash;
            index = idx;
        }
    }

    let Some(info_hash) = info_hash.filter(|h| !h.is_empty()) else {
        return CandidateOutcome::Skipped(SkipReason::MissingInfoHash);
    };

    let mut candidate = Candidate::new(Provider::Torrentio, raw_title);
    candidate.info_hash = Some(info_hash);
    candidate.clean_title = ctx.clean_title.clone();
    candidate.file_index = index;
    candidate.cached = cached;
    candidate.service = service;
    candidate.sources = string_list(entry, "sources");
    // Peer-to-peer entries get a magnet built from the hash and trackers
    candidate.url = str_field(entry, "url")
        .map(str::to_string)
        .or_else(|| candidate.magnet_uri());
    candidate.languages = flag_languages(title).into_iter().collect();

    if let Some(stats) = parse_torrent_stats(title) {
        candidate.seeders = stats.seeders;
        candidate.file_size_bytes = stats.size_bytes();
    }

    CandidateOutcome::Accepted(Normalized::new(candidate))
}

/// Info hash and file index from a debrid playback URL of the form
/// `…/realdebrid/<key>/<hash>/<id>/<fileIdx>/<name>`.
///
/// Returns `None` when the URL has no debrid segment. Missing trailing
/// segments yield a `None` hash or a `-1` index.
fn debrid_location(url: &str) -> Option<(Option<String>, i64)> {
    let parts: Vec<&str> = url.split('/').collect();
    let pos = parts.iter().position(|p| *p == DEBRID_SEGMENT)?;

    let hash = parts
        .get(pos + 2)
        .filter(|h| !h.is_empty())
        .map(|h| h.to_string());
    let index = parts
        .get(pos + 4)
        .and_then(|i| i.parse::<i64>().ok())
        .unwrap_or(UNKNOWN);

    Some((hash, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const HASH: &str = "0123456789abcdef0123456789abcdef01234567";

    fn entry(title: &str) -> Value {
        json!({
            "name": "Torrentio\n1080p",
            "title": title,
            "infoHash": HASH,
            "fileIdx": 2,
            "behaviorHints": {"bingeGroup": "x", "filename": "Movie.2024.1080p.mkv"},
            "sources": ["tracker:udp://open.example:1337/announce", "dht:0123"]
        })
    }

    fn accepted(outcome: CandidateOutcome) -> Candidate {
        match outcome {
            CandidateOutcome::Accepted(n) => n.candidate,
            CandidateOutcome::Skipped(reason) => panic!("unexpected skip: {reason}"),
        }
    }

    #[test]
    fn test_plain_entry() {
        let ctx = NormalizeContext::new("Movie", false);
        let candidate = accepted(normalize_entry(
            &entry("Movie.2024.1080p.WEB-DL\nMovie.2024.1080p.mkv\n👤 57 💾 2 GB ⚙️ YTS 🇮🇹"),
            &ctx,
        ));

        assert_eq!(candidate.raw_title, "Movie.2024.1080p.WEB-DL");
        assert_eq!(candidate.clean_title, "Movie");
        assert_eq!(candidate.info_hash.as_deref(), Some(HASH));
        assert_eq!(candidate.file_index, 2);
        assert_eq!(candidate.seeders, 57);
        assert_eq!(candidate.file_size_bytes, 2_147_483_648);
        assert_eq!(candidate.cached, CacheStatus::Unknown);
        assert!(candidate.service.is_empty());
        assert!(candidate.languages.contains("it"));
        assert_eq!(candidate.sources.len(), 2);
        assert_eq!(
            candidate.url.as_deref(),
            Some(
                "magnet:?xt=urn:btih:0123456789abcdef0123456789abcdef01234567\
                 &tr=udp%3A%2F%2Fopen.example%3A1337%2Fannounce"
            )
        );
    }

    #[test]
    fn test_entry_without_stat_line_keeps_defaults() {
        let ctx = NormalizeContext::default();
        let candidate = accepted(normalize_entry(&entry("Movie.2024.720p"), &ctx));
        assert_eq!(candidate.seeders, 0);
        assert_eq!(candidate.file_size_bytes, -1);
    }

    #[test]
    fn test_debrid_entry_reads_url() {
        let ctx = NormalizeContext::new("Movie", true);
        let value = json!({
            "name": "[RD+] Torrentio\n4k",
            "title": "Movie.2024.2160p\n👤 3 💾 20 GB",
            "url": format!("https://torrentio.strem.fun/realdebrid/KEY/{HASH}/null/4/Movie.mkv"),
            "behaviorHints": {"filename": "Movie.mkv"}
        });
        let candidate = accepted(normalize_entry(&value, &ctx));

        assert_eq!(candidate.info_hash.as_deref(), Some(HASH));
        assert_eq!(candidate.file_index, 4);
        assert_eq!(candidate.cached, CacheStatus::Cached);
        assert_eq!(candidate.service, "RD");
        assert!(candidate.url.as_deref().unwrap().starts_with("https://torrentio.strem.fun/"));
    }

    #[test]
    fn test_debrid_entry_not_cached() {
        let ctx = NormalizeContext::new("Movie", true);
        let value = json!({
            "name": "[RD download] Torrentio",
            "title": "Movie.2024.1080p",
            "url": format!("https://host/realdebrid/KEY/{HASH}/null/0/Movie.mkv"),
            "behaviorHints": {"filename": "Movie.mkv"}
        });
        let candidate = accepted(normalize_entry(&value, &ctx));
        assert_eq!(candidate.cached, CacheStatus::NotCached);
        assert_eq!(candidate.file_index, 0);
    }

    #[test]
    fn test_skips() {
        let ctx = NormalizeContext::default();

        let mut no_filename = entry("Movie");
        no_filename["behaviorHints"] = json!({});
        assert_eq!(
            normalize_entry(&no_filename, &ctx),
            CandidateOutcome::Skipped(SkipReason::MissingFileName)
        );

        let mut no_title = entry("Movie");
        no_title.as_object_mut().unwrap().remove("title");
        assert_eq!(
            normalize_entry(&no_title, &ctx),
            CandidateOutcome::Skipped(SkipReason::MissingTitle)
        );

        let mut no_hash = entry("Movie");
        no_hash.as_object_mut().unwrap().remove("infoHash");
        assert_eq!(
            normalize_entry(&no_hash, &ctx),
            CandidateOutcome::Skipped(SkipReason::MissingInfoHash)
        );

        assert_eq!(
            normalize_entry(&json!("garbage"), &ctx),
            CandidateOutcome::Skipped(SkipReason::MalformedEntry)
        );
    }

    #[test]
    fn test_debrid_location() {
        let (hash, idx) = debrid_location("https://h/realdebrid/k/abc/null/7/f.mkv").unwrap();
        assert_eq!(hash.as_deref(), Some("abc"));
        assert_eq!(idx, 7);

        let (hash, idx) = debrid_location("https://h/realdebrid/k").unwrap();
        assert!(hash.is_none());
        assert_eq!(idx, -1);

        assert!(debrid_location("https://h/stream/abc").is_none());
    }

    #[test]
    fn test_empty_streams_is_not_an_error() {
        let outcomes = normalize(&json!({"streams": []}), &NormalizeContext::default()).unwrap();
        assert!(outcomes.is_empty());
    }
}
