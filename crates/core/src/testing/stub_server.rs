//! HTTP server returning canned responses.

use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

/// A canned response.
#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
}

impl StubResponse {
    pub fn json(status: u16, value: &Value) -> Self {
        Self {
            status,
            body: value.to_string(),
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

impl IntoResponse for StubResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, "application/json")], self.body).into_response()
    }
}

/// A request the stub received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path and query string, e.g. `/api/v1/search?query=x`.
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone)]
struct StubState {
    /// Responses not yet served; the last one is repeated once drained.
    responses: Arc<Mutex<VecDeque<StubResponse>>>,
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
}

/// Serves `responses` in order, one per request, then keeps repeating
/// the last one.
///
/// # Example
///
/// ```rust,ignore
/// let server = StubServer::start(vec![StubResponse::json(200, &json!({"streams": []}))]).await?;
/// let client = TorrentioClient::new(fetcher, server.url(), None);
/// client.fetch(&query).await?;
/// assert_eq!(server.requests().await[0].path, "/stream/movie/tt1.json");
/// ```
pub struct StubServer {
    url: String,
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl std::fmt::Debug for StubServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StubServer")
            .field("url", &self.url)
            .field("requests", &"<requests>")
            .finish()
    }
}

impl StubServer {
    pub async fn start(responses: Vec<StubResponse>) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("http://{}", listener.local_addr()?);

        let state = StubState {
            responses: Arc::new(Mutex::new(responses.into())),
            requests: Arc::new(RwLock::new(Vec::new())),
        };
        let requests = Arc::clone(&state.requests);
        let app = Router::new().fallback(respond).with_state(state);

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            url,
            requests,
            handle,
        })
    }

    /// Base URL without a trailing slash.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().await.clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn respond(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> StubResponse {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    let headers = headers
        .iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
        .collect();
    state.requests.write().await.push(RecordedRequest {
        method: method.to_string(),
        path,
        headers,
    });

    let mut responses = state.responses.lock().await;
    let response = if responses.len() > 1 {
        responses.pop_front()
    } else {
        responses.front().cloned()
    };
    response.unwrap_or_else(|| StubResponse::text(500, "no canned response"))
}
