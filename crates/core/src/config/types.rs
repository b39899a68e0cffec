use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

use crate::candidate::Provider;
use crate::fetcher::{RetryPolicy, DEFAULT_PROWLARR_LIMIT, DEFAULT_TORRENTIO_URL};
use crate::parser::CodecPreferences;
use crate::ranker::RankPolicy;
use crate::resolution::ResolutionTokens;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl Config {
    /// Providers with a config section, in [`Provider::ALL`] order.
    pub fn configured_providers(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|p| self.providers.is_configured(*p))
            .collect()
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Outbound HTTP behavior shared by every provider client.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
    #[serde(default = "default_retry_statuses")]
    pub retry_statuses: Vec<u16>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            retries: default_retries(),
            backoff_factor: default_backoff_factor(),
            retry_statuses: default_retry_statuses(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.retries,
            backoff_factor: self.backoff_factor,
            retry_statuses: self.retry_statuses.clone(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    RetryPolicy::default().retries
}

fn default_backoff_factor() -> f64 {
    RetryPolicy::default().backoff_factor
}

fn default_retry_statuses() -> Vec<u16> {
    RetryPolicy::default().retry_statuses
}

/// Ranking heuristics. Every table can be overridden piecemeal.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RankingConfig {
    #[serde(default)]
    pub policy: RankPolicy,
    #[serde(default)]
    pub codec_preferences: CodecPreferences,
    #[serde(default)]
    pub resolution_tokens: ResolutionTokens,
}

/// Provider sections. A provider without a section is not served.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub torrentio: Option<TorrentioConfig>,
    #[serde(default)]
    pub aiostreams: Option<AioStreamsConfig>,
    #[serde(default)]
    pub prowlarr: Option<ProwlarrConfig>,
}

impl ProvidersConfig {
    pub fn is_configured(&self, provider: Provider) -> bool {
        match provider {
            Provider::Torrentio => self.torrentio.is_some(),
            Provider::Aiostreams => self.aiostreams.is_some(),
            Provider::Prowlarr => self.prowlarr.is_some(),
        }
    }
}

/// Torrentio addon configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TorrentioConfig {
    /// Addon base URL (default: "https://torrentio.strem.fun")
    #[serde(default = "default_torrentio_url")]
    pub url: String,
    /// Real-Debrid key used when a query carries none.
    #[serde(default)]
    pub debrid_api_key: Option<String>,
}

impl Default for TorrentioConfig {
    fn default() -> Self {
        Self {
            url: default_torrentio_url(),
            debrid_api_key: None,
        }
    }
}

fn default_torrentio_url() -> String {
    DEFAULT_TORRENTIO_URL.to_string()
}

/// AIOStreams configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AioStreamsConfig {
    /// `host|uuid|password`, used when a query carries none.
    #[serde(default)]
    pub connection_string: Option<String>,
}

/// Prowlarr search configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProwlarrConfig {
    /// Prowlarr server URL (e.g., "http://localhost:9696")
    pub url: String,
    /// Prowlarr API key
    pub api_key: String,
    /// Maximum results per search (default: 30)
    #[serde(default = "default_prowlarr_limit")]
    pub limit: u32,
}

fn default_prowlarr_limit() -> u32 {
    DEFAULT_PROWLARR_LIMIT
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub ranking: SanitizedRankingConfig,
    pub providers: SanitizedProvidersConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedRankingConfig {
    /// `name-version` of the rank policy.
    pub policy_id: String,
    pub resolution_tokens_version: String,
    pub similarity_threshold: f64,
    pub flagged_languages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedProvidersConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub torrentio: Option<SanitizedTorrentioConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aiostreams: Option<SanitizedAioStreamsConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prowlarr: Option<SanitizedProwlarrConfig>,
}

/// Sanitized Torrentio config (debrid key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTorrentioConfig {
    pub url: String,
    pub debrid_api_key_configured: bool,
}

/// Sanitized AIOStreams config (connection string hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAioStreamsConfig {
    pub connection_string_configured: bool,
}

/// Sanitized Prowlarr config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedProwlarrConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub limit: u32,
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let policy = &config.ranking.policy;
        Self {
            server: config.server.clone(),
            http: config.http.clone(),
            ranking: SanitizedRankingConfig {
                policy_id: policy.id(),
                resolution_tokens_version: config.ranking.resolution_tokens.version.clone(),
                similarity_threshold: policy.similarity_threshold,
                flagged_languages: policy.flagged_languages.iter().cloned().collect(),
            },
            providers: SanitizedProvidersConfig {
                torrentio: config.providers.torrentio.as_ref().map(|t| SanitizedTorrentioConfig {
                    url: t.url.clone(),
                    debrid_api_key_configured: is_set(&t.debrid_api_key),
                }),
                aiostreams: config.providers.aiostreams.as_ref().map(|a| SanitizedAioStreamsConfig {
                    connection_string_configured: is_set(&a.connection_string),
                }),
                prowlarr: config.providers.prowlarr.as_ref().map(|p| SanitizedProwlarrConfig {
                    url: p.url.clone(),
                    api_key_configured: !p.api_key.is_empty(),
                    limit: p.limit,
                }),
            },
        }
    }
}
