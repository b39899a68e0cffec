use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{FetchError, HttpFetcher, ProviderClient};
use crate::candidate::Provider;
use crate::engine::ProviderResponse;
use crate::query::MediaQuery;

/// Parsed `host|uuid|password` connection string for an AIOStreams
/// instance.
#[derive(Clone, PartialEq, Eq)]
pub struct AioStreamsConnection {
    pub host: String,
    pub uuid: String,
    pub password: String,
}

impl std::fmt::Debug for AioStreamsConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AioStreamsConnection")
            .field("host", &self.host)
            .field("uuid", &self.uuid)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl AioStreamsConnection {
    pub fn parse(connection_string: &str) -> Result<Self, FetchError> {
        let invalid = || FetchError::Configuration("Invalid or missing connection_string".to_string());

        let parts: Vec<&str> = connection_string.split('|').map(str::trim).collect();
        let [host, uuid, password] = parts.as_slice() else {
            return Err(invalid());
        };
        if host.is_empty() || uuid.is_empty() || password.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            host: host.trim_end_matches('/').to_string(),
            uuid: uuid.to_string(),
            password: password.to_string(),
        })
    }

    pub fn user_url(&self) -> String {
        format!(
            "{}/api/v1/user?uuid={}&password={}",
            self.host,
            urlencoding::encode(&self.uuid),
            urlencoding::encode(&self.password)
        )
    }

    pub fn stream_url(&self, encrypted_password: &str, query: &MediaQuery) -> String {
        format!(
            "{}/stremio/{}/{}/stream/{}",
            self.host,
            self.uuid,
            encrypted_password,
            query.stream_path()
        )
    }
}

/// What the user lookup tells us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub encrypted_password: String,
    /// At least one debrid service is enabled for the user.
    pub using_debrid: bool,
}

impl UserSession {
    /// Read the `/api/v1/user` response body.
    pub fn from_response(body: &Value) -> Result<Self, FetchError> {
        if !body.get("success").and_then(Value::as_bool).unwrap_or(false) {
            let error = match body.get("error") {
                Some(Value::String(message)) => message.clone(),
                Some(other) if !other.is_null() => other.to_string(),
                _ => "user lookup failed".to_string(),
            };
            return Err(FetchError::Upstream(error));
        }

        let data = body.get("data").unwrap_or(&Value::Null);
        let encrypted_password = data
            .get("encryptedPassword")
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| FetchError::Decode("user response has no encryptedPassword".to_string()))?
            .to_string();

        let using_debrid = data
            .pointer("/userData/services")
            .and_then(Value::as_array)
            .map(|services| {
                services
                    .iter()
                    .any(|s| s.get("enabled").and_then(Value::as_bool).unwrap_or(false))
            })
            .unwrap_or(false);

        Ok(Self {
            encrypted_password,
            using_debrid,
        })
    }
}

/// Client for a self-hosted AIOStreams instance.
///
/// Each fetch first resolves the user's encrypted password and enabled
/// debrid services, then requests the stream list.
#[derive(Debug, Clone)]
pub struct AioStreamsClient {
    fetcher: HttpFetcher,
    connection: Option<AioStreamsConnection>,
}

impl AioStreamsClient {
    /// A client with a configured connection. Queries may still carry
    /// their own connection string.
    pub fn new(fetcher: HttpFetcher, connection: Option<AioStreamsConnection>) -> Self {
        Self { fetcher, connection }
    }

    fn connection_for(&self, query: &MediaQuery) -> Result<AioStreamsConnection, FetchError> {
        match query.connection_string.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => AioStreamsConnection::parse(s),
            _ => self.connection.clone().ok_or_else(|| {
                FetchError::Configuration("Invalid or missing connection_string".to_string())
            }),
        }
    }
}

#[async_trait]
impl ProviderClient for AioStreamsClient {
    fn provider(&self) -> Provider {
        Provider::Aiostreams
    }

    async fn fetch(&self, query: &MediaQuery) -> Result<ProviderResponse, FetchError> {
        let connection = self.connection_for(query)?;

        let user = self.fetcher.get_json(&connection.user_url(), &[]).await?;
        let session = UserSession::from_response(&user)?;
        debug!(
            host = %connection.host,
            using_debrid = session.using_debrid,
            "Resolved aiostreams user"
        );

        let url = connection.stream_url(&session.encrypted_password, query);
        let payload = self.fetcher.get_json(&url, &[]).await?;
        Ok(ProviderResponse::new(
            Provider::Aiostreams,
            payload,
            session.using_debrid,
        ))
    }
}
