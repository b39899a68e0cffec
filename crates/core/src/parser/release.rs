//! Token-based release name parser.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use super::similarity::similarity_ratio;
use super::{is_valid_info_hash, ParsedFacts, ParsedTitle, TitleParseError, TitleParser};
use crate::candidate::ResolutionTier;
use crate::resolution::{normalize_term, ResolutionClassifier};

// All patterns run against a `normalize_term` output, so `.` is the only
// separator and every token is dot-delimited.
static AVC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.(?:x\.?264|h\.?264|avc)\.").unwrap());
static HEVC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.(?:x\.?265|h\.?265|hevc)\.").unwrap());
static XVID: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.(?:xvid|divx)\.").unwrap());
static AV1: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.av1\.").unwrap());

static ATMOS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.atmos\.").unwrap());
static TRUEHD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.truehd(?:\d\.\d)?\.").unwrap());
static DTS_LOSSLESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.dts\.?(?:hd\.?ma|x)(?:\d\.\d)?\.").unwrap());
static DTS_LOSSY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.dts(?:\.?hd)?(?:\d\.\d)?\.").unwrap());
static DDP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.(?:ddp|eac3|e\.?ac\.?3)(?:\d\.\d)?\.").unwrap());
static DD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.(?:dd|ac3|ac\.3)(?:\d\.\d)?\.").unwrap());
static AAC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.aac(?:\d\.\d)?\.").unwrap());
static FLAC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.flac(?:\d\.\d)?\.").unwrap());
static OPUS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.opus\.").unwrap());
static MP3: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.mp3\.").unwrap());

static HDR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.hdr(?:10)?(?:plus)?\.").unwrap());
static DOLBY_VISION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.(?:dv|dovi|dolby\.vision)\.").unwrap());
static DUBBED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.(?:dubbed|dub|dublado)\.").unwrap());

static LANGUAGES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\.(?:eng|english)\.", "en"),
        (r"\.(?:ita|italian|italiano)\.", "it"),
        (r"\.(?:rus|russian)\.", "ru"),
        (r"\.(?:fre|french|truefrench|vff|vostfr)\.", "fr"),
        (r"\.(?:spa|spanish|castellano|latino)\.", "es"),
        (r"\.(?:ger|german)\.", "de"),
        (r"\.(?:jap|japanese)\.", "ja"),
        (r"\.(?:por|portuguese)\.", "pt"),
        (r"\.(?:hin|hindi)\.", "hi"),
        (r"\.(?:kor|korean)\.", "ko"),
    ]
    .into_iter()
    .map(|(pattern, code)| (Regex::new(pattern).unwrap(), code))
    .collect()
});

/// Words that end the title portion of a release name.
static TITLE_STOP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?:19|20)\d{2}|s\d{1,2}(?:e\d{1,3})?|\d{1,2}x\d{2}|\d{3,4}[pi]|4k|uhd|hdr|web|webrip|webdl|bluray|brrip|bdrip|dvdrip|hdtv|hdrip|remux|x264|x265|h264|h265|hevc|xvid|cam|camrip|hdcam|hdts|ts|dvdscr)$",
    )
    .unwrap()
});

/// Score adjustments per detected codec and flag.
///
/// The default is tuned for browser playback: AVC is preferred over HEVC
/// and surround formats a browser would have to transcode are penalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecPreferences {
    pub avc: i64,
    pub hevc: i64,
    pub xvid: i64,
    pub av1: i64,
    pub atmos: i64,
    pub dolby_digital: i64,
    pub dolby_digital_plus: i64,
    pub dts_lossless: i64,
    pub dts_lossy: i64,
    pub hdr: i64,
    pub dolby_vision: i64,
    pub dubbed: i64,
}

impl Default for CodecPreferences {
    fn default() -> Self {
        Self {
            avc: 450,
            hevc: 400,
            xvid: -150,
            av1: 0,
            atmos: -300,
            dolby_digital: -300,
            dolby_digital_plus: -300,
            dts_lossless: -300,
            dts_lossy: -500,
            hdr: 10,
            dolby_vision: 0,
            dubbed: -100,
        }
    }
}

/// Default [`TitleParser`]: regex token detection over the normalized
/// release name.
#[derive(Debug, Clone, Default)]
pub struct ReleaseTitleParser {
    classifier: ResolutionClassifier,
    preferences: CodecPreferences,
}

impl ReleaseTitleParser {
    pub fn new(classifier: ResolutionClassifier, preferences: CodecPreferences) -> Self {
        Self {
            classifier,
            preferences,
        }
    }

    pub fn preferences(&self) -> &CodecPreferences {
        &self.preferences
    }

    fn video_codec(term: &str) -> Option<&'static str> {
        if AVC.is_match(term) {
            Some("avc")
        } else if HEVC.is_match(term) {
            Some("hevc")
        } else if XVID.is_match(term) {
            Some("xvid")
        } else if AV1.is_match(term) {
            Some("av1")
        } else {
            None
        }
    }

    fn audio(term: &str) -> Vec<String> {
        let mut audio = Vec::new();
        if ATMOS.is_match(term) {
            audio.push("Atmos");
        }
        if TRUEHD.is_match(term) {
            audio.push("TrueHD");
        }
        if DTS_LOSSLESS.is_match(term) {
            audio.push("DTS Lossless");
        } else if DTS_LOSSY.is_match(term) {
            audio.push("DTS Lossy");
        }
        if DDP.is_match(term) {
            audio.push("Dolby Digital Plus");
        }
        if DD.is_match(term) {
            audio.push("Dolby Digital");
        }
        if AAC.is_match(term) {
            audio.push("AAC");
        }
        if FLAC.is_match(term) {
            audio.push("FLAC");
        }
        if OPUS.is_match(term) {
            audio.push("Opus");
        }
        if MP3.is_match(term) {
            audio.push("MP3");
        }
        audio.into_iter().map(str::to_string).collect()
    }

    fn hdr(term: &str) -> Vec<String> {
        let mut hdr = Vec::new();
        if HDR.is_match(term) {
            hdr.push("HDR".to_string());
        }
        if DOLBY_VISION.is_match(term) {
            hdr.push("DV".to_string());
        }
        hdr
    }

    fn languages(term: &str) -> Vec<String> {
        LANGUAGES
            .iter()
            .filter(|(pattern, _)| pattern.is_match(term))
            .map(|(_, code)| code.to_string())
            .collect()
    }

    /// Words before the first year, episode or quality marker. A leading
    /// year is kept as part of the title ("2012", "1917").
    fn title_portion(term: &str) -> String {
        let words: Vec<&str> = term.split('.').filter(|w| !w.is_empty()).collect();
        let mut title = Vec::new();
        for (i, word) in words.iter().enumerate() {
            if i > 0 && TITLE_STOP.is_match(word) {
                break;
            }
            title.push(*word);
        }
        title.join(" ")
    }

    fn score(&self, facts: &ParsedFacts) -> i64 {
        let prefs = &self.preferences;
        let mut score = match facts.video_codec.as_deref() {
            Some("avc") => prefs.avc,
            Some("hevc") => prefs.hevc,
            Some("xvid") => prefs.xvid,
            Some("av1") => prefs.av1,
            _ => 0,
        };
        for audio in &facts.audio {
            score += match audio.as_str() {
                "Atmos" => prefs.atmos,
                "Dolby Digital" => prefs.dolby_digital,
                "Dolby Digital Plus" => prefs.dolby_digital_plus,
                "DTS Lossless" => prefs.dts_lossless,
                "DTS Lossy" => prefs.dts_lossy,
                _ => 0,
            };
        }
        for hdr in &facts.hdr {
            score += match hdr.as_str() {
                "HDR" => prefs.hdr,
                "DV" => prefs.dolby_vision,
                _ => 0,
            };
        }
        if facts.dubbed {
            score += prefs.dubbed;
        }
        score
    }
}

impl TitleParser for ReleaseTitleParser {
    fn name(&self) -> &str {
        "release"
    }

    fn parse(
        &self,
        raw_title: &str,
        clean_title: &str,
        info_hash: Option<&str>,
    ) -> Result<ParsedTitle, TitleParseError> {
        let raw_title = raw_title.trim();
        if raw_title.is_empty() {
            return Err(TitleParseError::EmptyTitle);
        }
        if !raw_title.chars().any(char::is_alphanumeric) {
            return Err(TitleParseError::NoAlphanumeric(raw_title.to_string()));
        }
        if let Some(hash) = info_hash {
            if !is_valid_info_hash(hash) {
                return Err(TitleParseError::InvalidInfoHash(hash.to_string()));
            }
        }

        let term = normalize_term(raw_title);
        let parsed_title = Self::title_portion(&term);
        let title_similarity = similarity_ratio(&parsed_title, clean_title);

        let facts = ParsedFacts {
            resolution: self
                .classifier
                .detect(&term)
                .unwrap_or(ResolutionTier::Unknown),
            video_codec: Self::video_codec(&term).map(str::to_string),
            audio: Self::audio(&term),
            languages: Self::languages(&term),
            hdr: Self::hdr(&term),
            dubbed: DUBBED.is_match(&term),
            parsed_title,
            title_similarity,
        };

        Ok(ParsedTitle {
            base_score: self.score(&facts),
            facts,
        })
    }
}
