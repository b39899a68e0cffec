//! Testing utilities and mock implementations.
//!
//! This module provides a mock [`ProviderClient`](crate::fetcher::ProviderClient)
//! and payload fixtures in each provider's wire shape. The crate's own
//! tests also get an axum server with canned responses for exercising the
//! real clients.
//!
//! # Example
//!
//! ```rust,ignore
//! use streamrank_core::testing::{fixtures, MockProviderClient};
//!
//! let client = MockProviderClient::new(Provider::Prowlarr);
//! client.set_payload(fixtures::prowlarr_payload(vec![
//!     fixtures::prowlarr_release("The.Matrix.1999.1080p.x264", 120, 8_000_000_000),
//! ])).await;
//! ```

mod mock_provider;
#[cfg(test)]
mod stub_server;

pub use mock_provider::MockProviderClient;
#[cfg(test)]
pub use stub_server::{RecordedRequest, StubResponse, StubServer};

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};

    /// A deterministic 40-character hex info hash derived from `seed`.
    pub fn info_hash(seed: &str) -> String {
        let h = seed
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325u64, |acc, b| {
                (acc ^ b as u64).wrapping_mul(0x0100_0000_01b3)
            });
        format!("{h:016x}{:016x}{:08x}", h.rotate_left(17), h as u32)
    }

    /// A torrentio stream without debrid, as returned by the addon.
    pub fn torrentio_stream(release: &str, seeders: i64, size: &str) -> Value {
        json!({
            "name": "Torrentio\n1080p",
            "title": format!("{release}\n👤 {seeders} 💾 {size} ⚙️ ThePirateBay"),
            "infoHash": info_hash(release),
            "fileIdx": 0,
            "behaviorHints": {
                "bingeGroup": "torrentio|1080p",
                "filename": format!("{release}.mkv")
            },
            "sources": [format!("dht:{}", info_hash(release))]
        })
    }

    /// A torrentio stream resolved through Real-Debrid.
    pub fn torrentio_debrid_stream(release: &str, cached: bool, size: &str) -> Value {
        let hash = info_hash(release);
        let marker = if cached { "[RD+]" } else { "[RD download]" };
        json!({
            "name": format!("{marker} Torrentio\n1080p"),
            "title": format!("{release}\n👤 0 💾 {size} ⚙️ ThePirateBay"),
            "url": format!("https://torrentio.strem.fun/realdebrid/KEY/{hash}/null/0/{release}.mkv"),
            "behaviorHints": {"filename": format!("{release}.mkv")}
        })
    }

    pub fn torrentio_payload(streams: Vec<Value>) -> Value {
        json!({ "streams": streams })
    }

    /// Build an aiostreams `key:value` description block.
    pub fn aiostreams_description(fields: &[(&str, &str)]) -> String {
        fields
            .iter()
            .map(|(key, value)| format!("{key}:{value}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// An aiostreams stream with the common descriptor fields filled in.
    pub fn aiostreams_stream(
        title: &str,
        file_name: &str,
        seeders: i64,
        file_size: i64,
        cached: bool,
    ) -> Value {
        let seeders = seeders.to_string();
        let file_size = file_size.to_string();
        let hash = info_hash(file_name);
        let description = aiostreams_description(&[
            ("addon", "Torrentio"),
            ("title", title),
            ("info_hash", &hash),
            ("service", if cached { "RD" } else { "" }),
            ("cached", if cached { "true" } else { "false" }),
            ("file_size", &file_size),
            ("seeders", &seeders),
            ("audio_tags", ""),
            ("languages_codes", "en"),
            ("file_name", file_name),
            ("folder_name", ""),
        ]);
        json!({
            "name": "AIOStreams",
            "description": description,
            "fileIdx": 0
        })
    }

    pub fn aiostreams_payload(streams: Vec<Value>) -> Value {
        json!({ "streams": streams })
    }

    /// A prowlarr torrent release.
    pub fn prowlarr_release(title: &str, seeders: i64, size: i64) -> Value {
        json!({
            "title": title,
            "protocol": "torrent",
            "infoHash": info_hash(title),
            "seeders": seeders,
            "leechers": 3,
            "size": size,
            "indexer": "mock-indexer",
            "magnetUrl": format!("magnet:?xt=urn:btih:{}", info_hash(title))
        })
    }

    pub fn prowlarr_payload(releases: Vec<Value>) -> Value {
        Value::Array(releases)
    }
}
