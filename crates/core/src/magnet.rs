//! Magnet link construction from an info hash and tracker sources.

/// Build a magnet URI for `info_hash`.
///
/// Only `tracker:<url>` sources become `tr=` parameters; other kinds
/// (`dht:...`) are skipped. Duplicate trackers are emitted once, in
/// first-seen order. Returns `None` for an empty hash.
pub fn magnet_uri(info_hash: &str, sources: &[String]) -> Option<String> {
    let hash = info_hash.trim();
    if hash.is_empty() {
        return None;
    }

    let mut uri = format!("magnet:?xt=urn:btih:{}", hash.to_lowercase());
    let mut seen: Vec<&str> = Vec::new();

    for source in sources {
        let Some((kind, value)) = source.split_once(':') else {
            continue;
        };
        if kind != "tracker" || value.is_empty() || seen.contains(&value) {
            continue;
        }
        seen.push(value);
        uri.push_str("&tr=");
        uri.push_str(&urlencoding::encode(value));
    }

    Some(uri)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnet_without_sources() {
        let uri = magnet_uri("ABCDEF0123456789ABCDEF0123456789ABCDEF01", &[]).unwrap();
        assert_eq!(uri, "magnet:?xt=urn:btih:abcdef0123456789abcdef0123456789abcdef01");
    }

    #[test]
    fn test_magnet_empty_hash() {
        assert!(magnet_uri("", &[]).is_none());
        assert!(magnet_uri("   ", &[]).is_none());
    }

    #[test]
    fn test_magnet_trackers_deduplicated_and_encoded() {
        let sources = vec![
            "tracker:udp://tracker.example.org:1337/announce".to_string(),
            "dht:abcdef".to_string(),
            "tracker:udp://tracker.example.org:1337/announce".to_string(),
            "tracker:http://other.example/announce".to_string(),
        ];
        let uri = magnet_uri("abc", &sources).unwrap();

        assert_eq!(uri.matches("&tr=").count(), 2);
        assert!(uri.contains("&tr=udp%3A%2F%2Ftracker.example.org%3A1337%2Fannounce"));
        assert!(uri.ends_with("&tr=http%3A%2F%2Fother.example%2Fannounce"));
        assert!(!uri.contains("dht"));
    }
}
