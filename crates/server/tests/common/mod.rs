//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! with a mock client for every provider, so the endpoints can be driven
//! without network access.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use streamrank_core::{
    config::{AioStreamsConfig, ProwlarrConfig, TorrentioConfig},
    testing::MockProviderClient,
    Config, Provider, ProviderClient, RankingEngine,
};

/// Re-export fixtures for test convenience
pub use streamrank_core::testing::fixtures;

/// Test fixture with a mock client per provider.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_streams() {
///     let fixture = TestFixture::new();
///     fixture.torrentio.set_payload(fixtures::torrentio_payload(vec![])).await;
///
///     let response = fixture.post("/api/v1/streams", json!({
///         "provider": "torrentio",
///         "query": { "media_type": "movie", "imdb_id": "tt0133093" }
///     })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    pub torrentio: Arc<MockProviderClient>,
    pub aiostreams: Arc<MockProviderClient>,
    pub prowlarr: Arc<MockProviderClient>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// All three providers configured.
    pub fn new() -> Self {
        Self::with_providers(&Provider::ALL)
    }

    /// Only `providers` are configured and served.
    pub fn with_providers(providers: &[Provider]) -> Self {
        let torrentio = Arc::new(MockProviderClient::new(Provider::Torrentio));
        let aiostreams = Arc::new(MockProviderClient::new(Provider::Aiostreams));
        let prowlarr = Arc::new(MockProviderClient::new(Provider::Prowlarr));

        let mut config = Config::default();
        config.server.host = std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST);
        config.server.port = 0;

        let mut clients: Vec<Arc<dyn ProviderClient>> = Vec::new();
        for provider in Provider::ALL {
            if !providers.contains(&provider) {
                continue;
            }
            match provider {
                Provider::Torrentio => {
                    config.providers.torrentio = Some(TorrentioConfig {
                        debrid_api_key: Some("secret-rd-key".to_string()),
                        ..Default::default()
                    });
                    clients.push(Arc::clone(&torrentio) as Arc<dyn ProviderClient>);
                }
                Provider::Aiostreams => {
                    config.providers.aiostreams = Some(AioStreamsConfig {
                        connection_string: Some(
                            "https://aio.example.com|uuid-1|secret-password".to_string(),
                        ),
                    });
                    clients.push(Arc::clone(&aiostreams) as Arc<dyn ProviderClient>);
                }
                Provider::Prowlarr => {
                    config.providers.prowlarr = Some(ProwlarrConfig {
                        url: "http://localhost:9696".to_string(),
                        api_key: "secret-prowlarr-key".to_string(),
                        limit: 30,
                    });
                    clients.push(Arc::clone(&prowlarr) as Arc<dyn ProviderClient>);
                }
            }
        }

        let engine = RankingEngine::from_config(&config.ranking);
        let state = Arc::new(streamrank_server::state::AppState::new(
            config, engine, clients,
        ));
        let router = streamrank_server::api::create_router(state);

        Self {
            router,
            torrentio,
            aiostreams,
            prowlarr,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// GET a path and return the raw body text (for non-JSON endpoints).
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
