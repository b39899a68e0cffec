//! Provider HTTP clients.
//!
//! Each provider gets a [`ProviderClient`] that turns a [`MediaQuery`] into
//! a raw [`ProviderResponse`]. Requests go through [`HttpFetcher`], which
//! retries transport failures and a fixed set of server errors.

mod aiostreams;
mod http;
mod prowlarr;
mod retry;
mod torrentio;

pub use aiostreams::{AioStreamsClient, AioStreamsConnection, UserSession};
pub use http::HttpFetcher;
pub use prowlarr::{ProwlarrClient, DEFAULT_PROWLARR_LIMIT};
pub use retry::RetryPolicy;
pub use torrentio::{TorrentioClient, DEFAULT_TORRENTIO_URL};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::warn;

use crate::candidate::Provider;
use crate::config::Config;
use crate::engine::ProviderResponse;
use crate::metrics;
use crate::query::MediaQuery;

/// Errors that can occur while fetching a provider payload.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("error during HTTP call - {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("{0}")]
    Upstream(String),
}

/// Fetches raw payloads from one provider.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    fn provider(&self) -> Provider;

    /// Fetch the provider's response for `query`.
    async fn fetch(&self, query: &MediaQuery) -> Result<ProviderResponse, FetchError>;
}

/// [`ProviderClient::fetch`] with request count and latency recorded.
pub async fn fetch_instrumented(
    client: &dyn ProviderClient,
    query: &MediaQuery,
) -> Result<ProviderResponse, FetchError> {
    let provider = client.provider();
    let start = Instant::now();
    let result = client.fetch(query).await;

    metrics::PROVIDER_REQUEST_DURATION
        .with_label_values(&[provider.as_str()])
        .observe(start.elapsed().as_secs_f64());
    let outcome = match &result {
        Ok(_) => "success",
        Err(e) => {
            warn!(provider = %provider, error = %e, "Provider fetch failed");
            "error"
        }
    };
    metrics::PROVIDER_REQUESTS
        .with_label_values(&[provider.as_str(), outcome])
        .inc();

    result
}

/// Build a client for every configured provider, in [`Provider::ALL`]
/// order. All clients share one connection pool.
pub fn build_clients(config: &Config) -> Result<Vec<Arc<dyn ProviderClient>>, FetchError> {
    let fetcher = HttpFetcher::new(config.http.timeout(), config.http.retry_policy())?;
    let providers = &config.providers;
    let mut clients: Vec<Arc<dyn ProviderClient>> = Vec::new();

    if let Some(torrentio) = &providers.torrentio {
        clients.push(Arc::new(TorrentioClient::new(
            fetcher.clone(),
            &torrentio.url,
            torrentio.debrid_api_key.clone(),
        )));
    }
    if let Some(aiostreams) = &providers.aiostreams {
        let connection = aiostreams
            .connection_string
            .as_deref()
            .map(AioStreamsConnection::parse)
            .transpose()?;
        clients.push(Arc::new(AioStreamsClient::new(fetcher.clone(), connection)));
    }
    if let Some(prowlarr) = &providers.prowlarr {
        clients.push(Arc::new(ProwlarrClient::new(
            fetcher.clone(),
            &prowlarr.url,
            &prowlarr.api_key,
            prowlarr.limit,
        )));
    }

    Ok(clients)
}

/// Trim a response body for error messages.
fn excerpt(body: &str) -> String {
    body.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockProviderClient;
    use serde_json::json;

    #[test]
    fn test_error_display() {
        let err = FetchError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "error during HTTP call - connection refused");

        let err = FetchError::Status {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503: unavailable");
    }

    #[test]
    fn test_excerpt() {
        let long = "x".repeat(500);
        assert_eq!(excerpt(&long).len(), 200);
        assert_eq!(excerpt("short"), "short");
    }

    #[tokio::test]
    async fn test_fetch_instrumented_passes_result_through() {
        let client = MockProviderClient::new(Provider::Torrentio);
        client.set_payload(json!({"streams": []})).await;

        let query = MediaQuery::movie("tt1", "Movie");
        let response = fetch_instrumented(&client, &query).await.unwrap();
        assert_eq!(response.provider, Provider::Torrentio);

        client
            .set_next_error(FetchError::Upstream("down".to_string()))
            .await;
        assert!(fetch_instrumented(&client, &query).await.is_err());
    }

    #[test]
    fn test_build_clients_in_provider_order() {
        let config = crate::config::load_config_from_str(
            r#"
[providers.prowlarr]
url = "http://localhost:9696"
api_key = "key"

[providers.torrentio]
"#,
        )
        .unwrap();

        let providers: Vec<Provider> = build_clients(&config)
            .unwrap()
            .iter()
            .map(|c| c.provider())
            .collect();
        assert_eq!(providers, vec![Provider::Torrentio, Provider::Prowlarr]);
    }

    #[test]
    fn test_build_clients_rejects_bad_connection_string() {
        let config = crate::config::load_config_from_str(
            r#"
[providers.aiostreams]
connection_string = "nope"
"#,
        )
        .unwrap();
        assert!(matches!(
            build_clients(&config),
            Err(FetchError::Configuration(_))
        ));
    }
}
