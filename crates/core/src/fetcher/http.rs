//! JSON over HTTP with retries.

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::{excerpt, FetchError, RetryPolicy};
use crate::metrics;

const USER_AGENT: &str = concat!("streamrank/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client for provider requests.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    policy: RetryPolicy,
}

impl HttpFetcher {
    /// Create a fetcher with its own client and the given per-request timeout.
    pub fn new(timeout: Duration, policy: RetryPolicy) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Configuration(format!("failed to create HTTP client: {e}")))?;
        Ok(Self::with_client(client, policy))
    }

    pub fn with_client(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// GET `url` and decode the body as JSON.
    ///
    /// Transport errors and retryable statuses are retried per the policy;
    /// any other non-2xx status fails immediately with
    /// [`FetchError::Status`].
    pub async fn get_json(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
    ) -> Result<Value, FetchError> {
        let host = host_of(url);
        let mut retry = 0;

        loop {
            let mut request = self
                .client
                .get(url)
                .header(ACCEPT, "application/json, text/plain, */*");
            for (name, value) in headers {
                request = request.header(*name, value);
            }

            let error = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body = response.text().await.map_err(transport_error)?;
                        debug!(host = %host, status = status.as_u16(), bytes = body.len(), "Provider request complete");
                        return serde_json::from_str(&body)
                            .map_err(|e| FetchError::Decode(e.to_string()));
                    }

                    let body = response.text().await.unwrap_or_default();
                    let error = FetchError::Status {
                        status: status.as_u16(),
                        body: excerpt(&body),
                    };
                    if !self.policy.should_retry_status(status.as_u16()) {
                        return Err(error);
                    }
                    error
                }
                Err(e) => transport_error(e),
            };

            if retry >= self.policy.retries {
                return Err(error);
            }
            retry += 1;

            let reason = match error {
                FetchError::Status { .. } => "status",
                _ => "transport",
            };
            metrics::HTTP_RETRIES.with_label_values(&[reason]).inc();

            let delay = self.policy.delay(retry);
            warn!(
                host = %host,
                retry,
                max_retries = self.policy.retries,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Retrying provider request"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

fn transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Transport("request timed out".to_string())
    } else if e.is_connect() {
        FetchError::Transport(format!("connection failed: {e}"))
    } else {
        FetchError::Transport(e.to_string())
    }
}

/// Host part of `url` for logging; paths and queries can carry credentials.
fn host_of(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "<invalid url>".to_string())
}
