use std::sync::Arc;
use streamrank_core::{Config, Provider, ProviderClient, RankingEngine, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    engine: RankingEngine,
    /// One client per configured provider, in configuration order.
    clients: Vec<Arc<dyn ProviderClient>>,
}

impl AppState {
    pub fn new(
        config: Config,
        engine: RankingEngine,
        clients: Vec<Arc<dyn ProviderClient>>,
    ) -> Self {
        Self {
            config,
            engine,
            clients,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn engine(&self) -> &RankingEngine {
        &self.engine
    }

    pub fn clients(&self) -> &[Arc<dyn ProviderClient>] {
        &self.clients
    }

    /// Client for `provider`, if one is configured.
    pub fn client(&self, provider: Provider) -> Option<Arc<dyn ProviderClient>> {
        self.clients
            .iter()
            .find(|client| client.provider() == provider)
            .cloned()
    }

    pub fn providers(&self) -> Vec<Provider> {
        self.clients.iter().map(|client| client.provider()).collect()
    }
}
