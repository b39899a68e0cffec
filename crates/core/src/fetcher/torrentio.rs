use async_trait::async_trait;
use tracing::debug;

use super::{FetchError, HttpFetcher, ProviderClient};
use crate::candidate::Provider;
use crate::engine::ProviderResponse;
use crate::query::MediaQuery;

pub const DEFAULT_TORRENTIO_URL: &str = "https://torrentio.strem.fun";

/// Client for the Torrentio Stremio addon.
///
/// With a Real-Debrid key the addon marks cached results and resolves them
/// to debrid download URLs.
#[derive(Debug, Clone)]
pub struct TorrentioClient {
    fetcher: HttpFetcher,
    base_url: String,
    debrid_api_key: Option<String>,
}

impl TorrentioClient {
    pub fn new(fetcher: HttpFetcher, base_url: impl Into<String>, debrid_api_key: Option<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            debrid_api_key: debrid_api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// Key for this query: the query's own key wins over the configured one.
    fn debrid_key<'a>(&'a self, query: &'a MediaQuery) -> Option<&'a str> {
        query.debrid_api_key().or(self.debrid_api_key.as_deref())
    }
}

/// `{base}[/realdebrid={key}]/stream/{stream_path}`
pub fn build_url(base_url: &str, debrid_api_key: Option<&str>, query: &MediaQuery) -> String {
    let debrid = debrid_api_key
        .map(|key| format!("/realdebrid={key}"))
        .unwrap_or_default();
    format!("{base_url}{debrid}/stream/{}", query.stream_path())
}

#[async_trait]
impl ProviderClient for TorrentioClient {
    fn provider(&self) -> Provider {
        Provider::Torrentio
    }

    async fn fetch(&self, query: &MediaQuery) -> Result<ProviderResponse, FetchError> {
        let key = self.debrid_key(query);
        let url = build_url(&self.base_url, key, query);
        debug!(imdb_id = %query.imdb_id, using_debrid = key.is_some(), "Fetching torrentio streams");

        let payload = self.fetcher.get_json(&url, &[]).await?;
        Ok(ProviderResponse::new(Provider::Torrentio, payload, key.is_some()))
    }
}
