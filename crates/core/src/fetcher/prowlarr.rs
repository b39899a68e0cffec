use async_trait::async_trait;
use tracing::debug;

use super::{FetchError, HttpFetcher, ProviderClient};
use crate::candidate::Provider;
use crate::engine::ProviderResponse;
use crate::query::{MediaQuery, MediaType};

pub const DEFAULT_PROWLARR_LIMIT: u32 = 30;

/// Client for the Prowlarr indexer search API.
#[derive(Clone)]
pub struct ProwlarrClient {
    fetcher: HttpFetcher,
    base_url: String,
    api_key: String,
    limit: u32,
}

impl std::fmt::Debug for ProwlarrClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProwlarrClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("limit", &self.limit)
            .finish()
    }
}

impl ProwlarrClient {
    pub fn new(
        fetcher: HttpFetcher,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        limit: u32,
    ) -> Self {
        Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            limit,
        }
    }

    pub fn search_url(&self, query: &MediaQuery) -> String {
        let search_type = match query.media_type {
            MediaType::Movie => "moviesearch",
            MediaType::Tvshow => "tvsearch",
        };
        format!(
            "{}/api/v1/search?query={}&type={}&limit={}",
            self.base_url,
            urlencoding::encode(&query.search_term()),
            search_type,
            self.limit
        )
    }
}

#[async_trait]
impl ProviderClient for ProwlarrClient {
    fn provider(&self) -> Provider {
        Provider::Prowlarr
    }

    async fn fetch(&self, query: &MediaQuery) -> Result<ProviderResponse, FetchError> {
        if query.title.trim().is_empty() {
            return Err(FetchError::Configuration(
                "prowlarr searches need a title".to_string(),
            ));
        }

        let url = self.search_url(query);
        debug!(term = %query.search_term(), limit = self.limit, "Searching prowlarr");

        let payload = self
            .fetcher
            .get_json(&url, &[("Authorization", format!("Bearer {}", self.api_key))])
            .await?;
        // Indexer results carry seeders, never debrid cache state.
        Ok(ProviderResponse::new(Provider::Prowlarr, payload, false))
    }
}
