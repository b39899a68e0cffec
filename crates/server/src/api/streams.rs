//! Stream ranking API handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use streamrank_core::{
    fetch_instrumented, EngineError, FetchError, GoStatus, MediaQuery, Provider, ProviderClient,
    ProviderResponse, QueryError, StreamEnvelope,
};
use tracing::debug;

use crate::metrics::ENVELOPES_TOTAL;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    pub provider: String,
    pub query: MediaQuery,
    pub payload: Value,
    #[serde(default)]
    pub using_debrid: bool,
}

#[derive(Debug, Deserialize)]
pub struct StreamsRequest {
    pub provider: String,
    pub query: MediaQuery,
}

#[derive(Debug, Deserialize)]
pub struct AllStreamsRequest {
    pub query: MediaQuery,
}

/// Envelope body for failed requests. The provider is kept as given so
/// unknown names can be echoed back.
#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    go_status: GoStatus,
    provider: String,
    streams: Vec<Value>,
}

/// Failures that end a single-provider request.
#[derive(Debug)]
pub enum ApiError {
    UnknownProvider(String),
    NotConfigured(Provider),
    Query { provider: Provider, error: QueryError },
    Fetch { provider: Provider, error: FetchError },
    Engine { provider: Provider, error: EngineError },
    /// The request body was not valid JSON for the endpoint.
    Body(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownProvider(_) | ApiError::NotConfigured(_) => StatusCode::NOT_FOUND,
            ApiError::Query { .. } | ApiError::Body(_) => StatusCode::BAD_REQUEST,
            // Bad per-query credentials are the caller's to fix.
            ApiError::Fetch {
                error: FetchError::Configuration(_),
                ..
            } => StatusCode::BAD_REQUEST,
            ApiError::Fetch { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Engine { error, .. } => match error {
                EngineError::Query(_) => StatusCode::BAD_REQUEST,
                EngineError::Normalize(_) => StatusCode::BAD_GATEWAY,
                EngineError::ProviderMismatch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::UnknownProvider(name) => format!("Unknown provider: {name}"),
            ApiError::NotConfigured(provider) => format!("provider {provider} is not configured"),
            ApiError::Query { error, .. } => error.to_string(),
            ApiError::Fetch { error, .. } => error.to_string(),
            ApiError::Engine { error, .. } => error.to_string(),
            ApiError::Body(message) => message.clone(),
        }
    }

    fn provider_name(&self) -> String {
        match self {
            ApiError::UnknownProvider(name) => name.clone(),
            ApiError::Body(_) => String::new(),
            ApiError::NotConfigured(provider)
            | ApiError::Query { provider, .. }
            | ApiError::Fetch { provider, .. }
            | ApiError::Engine { provider, .. } => provider.as_str().to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorEnvelope {
            go_status: GoStatus::Error(self.message()),
            provider: self.provider_name(),
            streams: Vec::new(),
        };
        // Unknown names stay out of label values.
        if !matches!(self, ApiError::UnknownProvider(_) | ApiError::Body(_)) {
            ENVELOPES_TOTAL
                .with_label_values(&[body.provider.as_str(), "error"])
                .inc();
        }
        (self.status(), Json(body)).into_response()
    }
}

fn parse_provider(name: &str) -> Result<Provider, ApiError> {
    name.parse()
        .map_err(|_| ApiError::UnknownProvider(name.trim().to_string()))
}

fn record_envelope(envelope: &StreamEnvelope) {
    let status = if envelope.is_success() { "success" } else { "error" };
    ENVELOPES_TOTAL
        .with_label_values(&[envelope.provider.as_str(), status])
        .inc();
}

/// Validate, fetch and rank one provider.
async fn fetch_and_rank(
    state: &AppState,
    client: &dyn ProviderClient,
    query: &MediaQuery,
) -> Result<StreamEnvelope, ApiError> {
    let provider = client.provider();
    query
        .validate_for(provider)
        .map_err(|error| ApiError::Query { provider, error })?;

    let response = fetch_instrumented(client, query)
        .await
        .map_err(|error| ApiError::Fetch { provider, error })?;

    let outcome = state
        .engine()
        .try_run(provider, query, &response)
        .map_err(|error| ApiError::Engine { provider, error })?;
    Ok(outcome.envelope)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/rank
///
/// Rank a payload the caller already fetched. No network access.
pub async fn rank(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RankRequest>, JsonRejection>,
) -> Result<Json<StreamEnvelope>, ApiError> {
    let Json(body) = body?;
    let provider = parse_provider(&body.provider)?;
    let response = ProviderResponse::new(provider, body.payload, body.using_debrid);

    let outcome = state
        .engine()
        .try_run(provider, &body.query, &response)
        .map_err(|error| ApiError::Engine { provider, error })?;

    record_envelope(&outcome.envelope);
    Ok(Json(outcome.envelope))
}

/// POST /api/v1/streams
///
/// Fetch and rank one configured provider.
pub async fn streams(
    State(state): State<Arc<AppState>>,
    body: Result<Json<StreamsRequest>, JsonRejection>,
) -> Result<Json<StreamEnvelope>, ApiError> {
    let Json(body) = body?;
    let provider = parse_provider(&body.provider)?;
    let client = state
        .client(provider)
        .ok_or(ApiError::NotConfigured(provider))?;

    let envelope = fetch_and_rank(&state, client.as_ref(), &body.query).await?;
    record_envelope(&envelope);
    Ok(Json(envelope))
}

/// POST /api/v1/streams/all
///
/// Fetch and rank every configured provider concurrently. A failing
/// provider yields an error envelope; the others are unaffected.
pub async fn all_streams(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AllStreamsRequest>, JsonRejection>,
) -> Result<Json<Vec<StreamEnvelope>>, ApiError> {
    let Json(body) = body?;
    let query = &body.query;
    let requests = state.clients().iter().map(|client| {
        let state = &state;
        async move {
            match fetch_and_rank(state, client.as_ref(), query).await {
                Ok(envelope) => envelope,
                Err(e) => {
                    debug!(provider = %client.provider(), error = %e.message(), "Provider failed in fan-out");
                    StreamEnvelope::error(client.provider(), e.message())
                }
            }
        }
    });

    let envelopes = join_all(requests).await;
    envelopes.iter().for_each(record_envelope);
    Ok(Json(envelopes))
}
