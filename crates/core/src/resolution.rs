//! Resolution tier classification from release-name tokens.
//!
//! Classification is an ordered series of substring checks. Order matters
//! because token sets overlap: screener markers are checked before cam
//! markers, cam markers before any resolution digits, and the bare `.hd.`
//! marker only applies when nothing else matched.

use serde::{Deserialize, Serialize};

use crate::candidate::ResolutionTier;

/// Token lists for each tier, checked in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionTokens {
    /// Identifies this token set in logs and sanitized config.
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_scr")]
    pub scr: Vec<String>,
    #[serde(default = "default_cam")]
    pub cam: Vec<String>,
    #[serde(default = "default_720")]
    pub p720: Vec<String>,
    #[serde(default = "default_1080")]
    pub p1080: Vec<String>,
    #[serde(default = "default_4k")]
    pub uhd: Vec<String>,
    /// Marker treated as 720p when no other token matched.
    #[serde(default = "default_hd_fallback")]
    pub hd_fallback: String,
}

fn strings(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

fn default_version() -> String {
    "v1".to_string()
}

fn default_scr() -> Vec<String> {
    strings(&["dvdscr", "screener", ".scr.", ".r5", ".r6"])
}

fn default_cam() -> Vec<String> {
    strings(&[
        "1xbet", "betwin", ".cam.", "camrip", "cam.rip", "dvdcam", "dvd.cam", "dvdts", "hdcam",
        ".hd.cam", ".hctc", ".hc.tc", ".hdtc", ".hd.tc", "hdts", ".hd.ts", "hqcam", ".hg.cam",
        ".tc.", ".tc1", ".tc7", ".ts.", ".ts1", ".ts7", "tsrip", "telecine", "telesync",
        "tele.sync",
    ])
}

fn default_720() -> Vec<String> {
    strings(&["720", "72o"])
}

fn default_1080() -> Vec<String> {
    strings(&["1080", "1o8o", "108o", "1o80", ".fhd."])
}

fn default_4k() -> Vec<String> {
    strings(&["2160", "216o", ".4k", "ultrahd", "ultra.hd", ".uhd."])
}

fn default_hd_fallback() -> String {
    ".hd.".to_string()
}

impl Default for ResolutionTokens {
    fn default() -> Self {
        Self {
            version: default_version(),
            scr: default_scr(),
            cam: default_cam(),
            p720: default_720(),
            p1080: default_1080(),
            uhd: default_4k(),
            hd_fallback: default_hd_fallback(),
        }
    }
}

/// Maps a release term onto exactly one resolution tier.
#[derive(Debug, Clone, Default)]
pub struct ResolutionClassifier {
    tokens: ResolutionTokens,
}

impl ResolutionClassifier {
    pub fn new(tokens: ResolutionTokens) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &ResolutionTokens {
        &self.tokens
    }

    /// Classify `text`, falling back to `SD` when no token matches.
    ///
    /// The text is lowercased here; separator normalization is the caller's
    /// job (see [`normalize_term`]).
    pub fn classify(&self, text: &str) -> ResolutionTier {
        self.detect(text).unwrap_or(ResolutionTier::Sd)
    }

    /// Like [`classify`](Self::classify) but returns `None` when nothing
    /// matched, so callers can tell "no signal" apart from a real SD marker.
    pub fn detect(&self, text: &str) -> Option<ResolutionTier> {
        let term = text.to_lowercase();

        if contains_any(&term, &self.tokens.scr) {
            Some(ResolutionTier::Scr)
        } else if contains_any(&term, &self.tokens.cam) {
            Some(ResolutionTier::Cam)
        } else if contains_any(&term, &self.tokens.p720) {
            Some(ResolutionTier::P720)
        } else if contains_any(&term, &self.tokens.p1080) {
            Some(ResolutionTier::P1080)
        } else if contains_any(&term, &self.tokens.uhd) {
            Some(ResolutionTier::Uhd)
        } else if !self.tokens.hd_fallback.is_empty() && term.contains(&self.tokens.hd_fallback) {
            Some(ResolutionTier::P720)
        } else {
            None
        }
    }
}

fn contains_any(term: &str, tokens: &[String]) -> bool {
    tokens
        .iter()
        .any(|t| !t.is_empty() && term.contains(t.as_str()))
}

/// Lowercase a release name and turn every separator into a single `.`,
/// wrapping the result in dots so edge tokens like `.ts.` match too.
pub fn normalize_term(text: &str) -> String {
    let mut term = String::with_capacity(text.len() + 2);
    term.push('.');
    for c in text.chars().flat_map(char::to_lowercase) {
        let c = match c {
            ' ' | '_' | '-' | '[' | ']' | '(' | ')' | '/' | '+' | '\t' | '\n' => '.',
            other => other,
        };
        if c == '.' && term.ends_with('.') {
            continue;
        }
        term.push(c);
    }
    if !term.ends_with('.') {
        term.push('.');
    }
    term
}
