use super::{types::Config, ConfigError};
use crate::fetcher::AioStreamsConnection;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - HTTP timeout is positive and backoff is not negative
/// - Similarity threshold lies in [0, 1]
/// - Configured providers have usable URLs and credentials
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(invalid("server.port cannot be 0"));
    }

    // HTTP validation
    if config.http.timeout_secs == 0 {
        return Err(invalid("http.timeout_secs must be greater than 0"));
    }
    if !(config.http.backoff_factor >= 0.0) {
        return Err(invalid("http.backoff_factor cannot be negative"));
    }

    // Ranking validation
    let threshold = config.ranking.policy.similarity_threshold;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(invalid(format!(
            "ranking.policy.similarity_threshold must be between 0 and 1, got {threshold}"
        )));
    }

    // Provider validation
    if let Some(torrentio) = &config.providers.torrentio {
        if torrentio.url.trim().is_empty() {
            return Err(invalid("providers.torrentio.url cannot be empty"));
        }
    }
    if let Some(aiostreams) = &config.providers.aiostreams {
        if let Some(connection) = aiostreams.connection_string.as_deref() {
            AioStreamsConnection::parse(connection).map_err(|_| {
                invalid("providers.aiostreams.connection_string must be host|uuid|password")
            })?;
        }
    }
    if let Some(prowlarr) = &config.providers.prowlarr {
        if prowlarr.url.trim().is_empty() {
            return Err(invalid("providers.prowlarr.url cannot be empty"));
        }
        if prowlarr.api_key.trim().is_empty() {
            return Err(invalid("providers.prowlarr.api_key cannot be empty"));
        }
        if prowlarr.limit == 0 {
            return Err(invalid("providers.prowlarr.limit must be greater than 0"));
        }
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}
