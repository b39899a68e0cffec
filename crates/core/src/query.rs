//! The media lookup request every provider is queried with.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::candidate::Provider;

/// Errors for queries that cannot be sent to a provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tvshow,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Movie => f.write_str("movie"),
            MediaType::Tvshow => f.write_str("tvshow"),
        }
    }
}

/// What to look up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaQuery {
    pub media_type: MediaType,
    /// IMDB identifier, e.g. `tt0133093`.
    pub imdb_id: String,
    /// Clean title, compared against release names.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub season: Option<u32>,
    #[serde(default)]
    pub episode: Option<u32>,
    /// Runtime in seconds.
    #[serde(default)]
    pub duration: Option<u64>,
    /// Comma-separated language codes.
    #[serde(default)]
    pub languages: String,
    /// Real-Debrid key, used by the torrentio provider.
    #[serde(default)]
    pub debrid_api_key: Option<String>,
    /// Provider connection string (`host|uuid|password` for aiostreams).
    #[serde(default)]
    pub connection_string: Option<String>,
}

impl MediaQuery {
    pub fn movie(imdb_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            media_type: MediaType::Movie,
            imdb_id: imdb_id.into(),
            title: title.into(),
            year: None,
            season: None,
            episode: None,
            duration: None,
            languages: String::new(),
            debrid_api_key: None,
            connection_string: None,
        }
    }

    pub fn episode(
        imdb_id: impl Into<String>,
        title: impl Into<String>,
        season: u32,
        episode: u32,
    ) -> Self {
        Self {
            media_type: MediaType::Tvshow,
            season: Some(season),
            episode: Some(episode),
            ..Self::movie(imdb_id, title)
        }
    }

    /// Check the fields every provider needs.
    pub fn validate(&self) -> Result<(), QueryError> {
        let imdb_id = self.imdb_id.trim();
        if imdb_id.is_empty() {
            return Err(QueryError::MissingField("imdb_id"));
        }
        if !imdb_id.starts_with("tt") {
            return Err(QueryError::InvalidField {
                field: "imdb_id",
                reason: format!("expected an id starting with 'tt', got '{imdb_id}'"),
            });
        }

        if self.media_type == MediaType::Tvshow {
            positive("season", self.season)?;
            positive("episode", self.episode)?;
        }

        Ok(())
    }

    /// [`validate`](Self::validate) plus the provider's own requirements.
    pub fn validate_for(&self, provider: Provider) -> Result<(), QueryError> {
        self.validate()?;
        if provider == Provider::Prowlarr && self.title.trim().is_empty() {
            return Err(QueryError::MissingField("title"));
        }
        Ok(())
    }

    /// Lowercased, trimmed language codes.
    pub fn language_list(&self) -> Vec<String> {
        self.languages
            .split(',')
            .map(|code| code.trim().to_lowercase())
            .filter(|code| !code.is_empty())
            .collect()
    }

    /// Stremio stream resource path, e.g. `movie/tt0133093.json` or
    /// `series/tt0903747:5:14.json`.
    pub fn stream_path(&self) -> String {
        match self.media_type {
            MediaType::Movie => format!("movie/{}.json", self.imdb_id.trim()),
            MediaType::Tvshow => format!(
                "series/{}:{}:{}.json",
                self.imdb_id.trim(),
                self.season.unwrap_or(0),
                self.episode.unwrap_or(0)
            ),
        }
    }

    /// Free-text search term: `Title (Year)` for movies, `Title S01E02`
    /// for episodes.
    pub fn search_term(&self) -> String {
        let title = self.title.trim();
        match self.media_type {
            MediaType::Movie => match self.year {
                Some(year) if year > 0 => format!("{title} ({year})"),
                _ => title.to_string(),
            },
            MediaType::Tvshow => format!(
                "{title} S{:02}E{:02}",
                self.season.unwrap_or(0),
                self.episode.unwrap_or(0)
            ),
        }
    }

    pub fn debrid_api_key(&self) -> Option<&str> {
        self.debrid_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

fn positive(field: &'static str, value: Option<u32>) -> Result<(), QueryError> {
    match value {
        None => Err(QueryError::MissingField(field)),
        Some(0) => Err(QueryError::InvalidField {
            field,
            reason: "must be greater than zero".to_string(),
        }),
        Some(_) => Ok(()),
    }
}
