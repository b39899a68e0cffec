//! Signals embedded in free-text stream titles: seeders, sizes, languages.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::candidate::UNKNOWN;

static STAT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"👤\s*(\S+)\s*💾\s*([\d.]+\s*[A-Za-z]+)").unwrap());

static SIZE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(\d+(?:\.\d+)?)\s*([KMGT]?)(?:I?B)?\s*$").unwrap());

/// Country flags used by addon titles to advertise audio languages.
const FLAG_LANGUAGES: &[(&str, &str)] = &[
    ("🇬🇧", "en"),
    ("🇺🇸", "en"),
    ("🇮🇹", "it"),
    ("🇷🇺", "ru"),
    ("🇫🇷", "fr"),
    ("🇪🇸", "es"),
    ("🇲🇽", "es"),
    ("🇩🇪", "de"),
    ("🇯🇵", "ja"),
    ("🇰🇷", "ko"),
    ("🇨🇳", "zh"),
    ("🇵🇹", "pt"),
    ("🇧🇷", "pt"),
    ("🇵🇱", "pl"),
    ("🇳🇱", "nl"),
    ("🇺🇦", "uk"),
    ("🇮🇳", "hi"),
    ("🇹🇷", "tr"),
];

/// Seeder count and size extracted from an addon stat line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentStats {
    /// Seeders, `0` when the count is not a number.
    pub seeders: i64,
    /// Human readable size, e.g. `"2.1 GB"`.
    pub size_text: String,
}

impl TorrentStats {
    /// Size in bytes, `-1` when the size text cannot be parsed.
    pub fn size_bytes(&self) -> i64 {
        parse_size(&self.size_text)
    }
}

/// Extract the `👤 <seeders> 💾 <size> <unit>` segment of a title.
pub fn parse_torrent_stats(title: &str) -> Option<TorrentStats> {
    let caps = STAT_LINE.captures(title)?;
    let seeders = caps
        .get(1)
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .unwrap_or(0);
    let size_text = caps
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    Some(TorrentStats { seeders, size_text })
}

/// Convert a human size string (`"1.4 GB"`, `"700MB"`, `"3 TiB"`) to bytes
/// using binary multiples. Returns `-1` when it cannot be parsed.
pub fn parse_size(text: &str) -> i64 {
    let Some(caps) = SIZE.captures(text) else {
        return UNKNOWN;
    };
    let Some(value) = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok()) else {
        return UNKNOWN;
    };
    let exponent = match caps.get(2).map(|m| m.as_str().to_ascii_uppercase()).as_deref() {
        Some("K") => 1,
        Some("M") => 2,
        Some("G") => 3,
        Some("T") => 4,
        _ => 0,
    };

    (value * 1024f64.powi(exponent)).round() as i64
}

/// Language codes advertised by flag emoji in `text`, in table order.
pub fn flag_languages(text: &str) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    for (flag, code) in FLAG_LANGUAGES {
        if text.contains(flag) && !codes.iter().any(|c| c == code) {
            codes.push(code.to_string());
        }
    }
    codes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stat_line() {
        let title = "Movie.2024.1080p.WEB-DL.x264\n👤 120 💾 2.1 GB ⚙️ YTS";
        let stats = parse_torrent_stats(title).unwrap();
        assert_eq!(stats.seeders, 120);
        assert_eq!(stats.size_text, "2.1 GB");
        assert_eq!(stats.size_bytes(), 2_254_857_830);
    }

    #[test]
    fn test_parse_stat_line_non_numeric_seeders() {
        let stats = parse_torrent_stats("x\n👤 ? 💾 700 MB").unwrap();
        assert_eq!(stats.seeders, 0);
        assert_eq!(stats.size_bytes(), 734_003_200);
    }

    #[test]
    fn test_parse_stat_line_missing() {
        assert!(parse_torrent_stats("Movie.2024.1080p").is_none());
    }

    #[test]
    fn test_parse_size_units() {
        assert_eq!(parse_size("512 KB"), 524_288);
        assert_eq!(parse_size("1GB"), 1_073_741_824);
        assert_eq!(parse_size("1.5 TiB"), 1_649_267_441_664);
        assert_eq!(parse_size("100 B"), 100);
        assert_eq!(parse_size("big"), -1);
        assert_eq!(parse_size(""), -1);
    }

    #[test]
    fn test_flag_languages() {
        let codes = flag_languages("Film 🇮🇹 🇬🇧 🇺🇸");
        assert_eq!(codes, vec!["en", "it"]);
        assert!(flag_languages("no flags here").is_empty());
    }
}
