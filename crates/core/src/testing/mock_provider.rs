//! Mock provider client for testing.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::candidate::Provider;
use crate::engine::ProviderResponse;
use crate::fetcher::{FetchError, ProviderClient};
use crate::query::MediaQuery;

/// Mock implementation of the ProviderClient trait.
///
/// Provides controllable behavior for testing:
/// - Return a configurable payload
/// - Track fetched queries for assertions
/// - Simulate failures
///
/// # Example
///
/// ```rust,ignore
/// use streamrank_core::testing::{fixtures, MockProviderClient};
///
/// let client = MockProviderClient::new(Provider::Torrentio);
/// client.set_payload(fixtures::torrentio_payload(vec![
///     fixtures::torrentio_stream("Movie.2024.1080p.x264", 40, "2 GB"),
/// ])).await;
///
/// let response = client.fetch(&query).await?;
/// assert_eq!(client.recorded_queries().await.len(), 1);
/// ```
pub struct MockProviderClient {
    provider: Provider,
    /// Payload returned by successful fetches.
    payload: Arc<RwLock<Value>>,
    using_debrid: Arc<RwLock<bool>>,
    /// Queries received, in order.
    queries: Arc<RwLock<Vec<MediaQuery>>>,
    /// If set, the next fetch fails with this error.
    next_error: Arc<RwLock<Option<FetchError>>>,
}

impl std::fmt::Debug for MockProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProviderClient")
            .field("provider", &self.provider)
            .field("payload", &"<payload>")
            .field("queries", &"<queries>")
            .field("next_error", &"<next_error>")
            .finish()
    }
}

impl MockProviderClient {
    /// A client returning an empty stream list in the provider's shape.
    pub fn new(provider: Provider) -> Self {
        let payload = match provider {
            Provider::Prowlarr => Value::Array(Vec::new()),
            Provider::Torrentio | Provider::Aiostreams => serde_json::json!({"streams": []}),
        };
        Self {
            provider,
            payload: Arc::new(RwLock::new(payload)),
            using_debrid: Arc::new(RwLock::new(false)),
            queries: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn set_payload(&self, payload: Value) {
        *self.payload.write().await = payload;
    }

    pub async fn set_using_debrid(&self, using_debrid: bool) {
        *self.using_debrid.write().await = using_debrid;
    }

    /// Make the next fetch fail. Later fetches succeed again.
    pub async fn set_next_error(&self, error: FetchError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn recorded_queries(&self) -> Vec<MediaQuery> {
        self.queries.read().await.clone()
    }
}

#[async_trait]
impl ProviderClient for MockProviderClient {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn fetch(&self, query: &MediaQuery) -> Result<ProviderResponse, FetchError> {
        self.queries.write().await.push(query.clone());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        Ok(ProviderResponse::new(
            self.provider,
            self.payload.read().await.clone(),
            *self.using_debrid.read().await,
        ))
    }
}
