//! Descriptor block parsing.
//!
//! A descriptor block is newline-separated `key:value` text embedded by a
//! provider in a free-text field, e.g.
//!
//! ```text
//! addon:ExampleAddon
//! title:My Show
//! resolution:1080p
//! seeders:42
//! file_size:734003200
//! cached:true
//! ```

use std::collections::HashMap;

use crate::candidate::UNKNOWN;

/// Key/value pairs parsed from a descriptor block.
///
/// `seeders` and `file_size` are coerced to integers while parsing; a value
/// that fails to parse resets the field to `-1` without affecting the
/// remaining lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptorBlock {
    fields: HashMap<String, String>,
    seeders: Option<i64>,
    file_size: Option<i64>,
}

/// Parse a descriptor block.
///
/// - Lines without a `:` are ignored.
/// - The key is everything before the first `:`; the value may itself
///   contain colons.
/// - A later duplicate key overwrites the earlier value.
/// - An empty value is stored as an empty string.
pub fn parse_descriptor(block: &str) -> DescriptorBlock {
    let mut parsed = DescriptorBlock::default();

    for line in block.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };

        match key {
            "seeders" => parsed.seeders = Some(coerce_int(value)),
            "file_size" => parsed.file_size = Some(coerce_int(value)),
            _ => {}
        }
        parsed.fields.insert(key.to_string(), value.to_string());
    }

    parsed
}

fn coerce_int(value: &str) -> i64 {
    value.trim().parse::<i64>().unwrap_or(UNKNOWN)
}

impl DescriptorBlock {
    /// Raw value for `key`, if the key appeared.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Raw value for `key`, empty when absent.
    pub fn text(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    /// Trimmed value, `None` when absent or blank.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Seeder count, `-1` when absent or non-numeric.
    pub fn seeders(&self) -> i64 {
        self.seeders.unwrap_or(UNKNOWN)
    }

    /// File size in bytes, `-1` when absent or non-numeric.
    pub fn file_size(&self) -> i64 {
        self.file_size.unwrap_or(UNKNOWN)
    }

    /// Integer value for any other key, `-1` when absent or non-numeric.
    pub fn int(&self, key: &str) -> i64 {
        self.get(key).map(coerce_int).unwrap_or(UNKNOWN)
    }

    /// Comma-separated list value, trimmed, with empty items dropped.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.text(key)
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_block() {
        let block = parse_descriptor(
            "addon:ExampleAddon\ntitle:My Show\nresolution:1080p\nseeders:42\nfile_size:734003200\ncached:true",
        );

        assert_eq!(block.get("addon"), Some("ExampleAddon"));
        assert_eq!(block.get("title"), Some("My Show"));
        assert_eq!(block.get("resolution"), Some("1080p"));
        assert_eq!(block.seeders(), 42);
        assert_eq!(block.file_size(), 734003200);
        assert_eq!(block.get("cached"), Some("true"));
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let block = parse_descriptor("a:1\na:2");
        assert_eq!(block.get("a"), Some("2"));
        assert_eq!(block.len(), 1);
    }

    #[test]
    fn test_lines_without_separator_ignored() {
        let block = parse_descriptor("My Show (2022)\n\nfile_name:show.mkv\njust text");
        assert_eq!(block.len(), 1);
        assert_eq!(block.get("file_name"), Some("show.mkv"));
    }

    #[test]
    fn test_empty_value_kept() {
        let block = parse_descriptor("folder_name:\nfile_name:x.mkv");
        assert_eq!(block.get("folder_name"), Some(""));
        assert!(block.non_empty("folder_name").is_none());
    }

    #[test]
    fn test_value_with_colon() {
        let block = parse_descriptor("title:Star Wars: Andor");
        assert_eq!(block.get("title"), Some("Star Wars: Andor"));
    }

    #[test]
    fn test_numeric_fallbacks() {
        let block = parse_descriptor("seeders:lots\nfile_size:\ntitle:x");
        assert_eq!(block.seeders(), -1);
        assert_eq!(block.file_size(), -1);
        assert_eq!(block.get("title"), Some("x"));

        let missing = parse_descriptor("title:x");
        assert_eq!(missing.seeders(), -1);
        assert_eq!(missing.file_size(), -1);
    }

    #[test]
    fn test_invalid_number_overwrites_valid_one() {
        let block = parse_descriptor("seeders:10\nseeders:n/a");
        assert_eq!(block.seeders(), -1);
    }

    #[test]
    fn test_crlf_lines() {
        let block = parse_descriptor("seeders:7\r\nfile_name:a.mkv\r\n");
        assert_eq!(block.seeders(), 7);
        assert_eq!(block.get("file_name"), Some("a.mkv"));
    }

    #[test]
    fn test_list_and_int() {
        let block = parse_descriptor("languages_codes:en, it,,ru\nduration:5400\nage:3d");
        assert_eq!(block.list("languages_codes"), vec!["en", "it", "ru"]);
        assert_eq!(block.int("duration"), 5400);
        assert_eq!(block.int("age"), -1);
        assert_eq!(block.int("missing"), -1);
        assert!(block.list("missing").is_empty());
    }
}
