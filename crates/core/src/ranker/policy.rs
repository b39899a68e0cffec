//! Ranking policies: every magnitude and threshold the ranker applies.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::candidate::Provider;

/// Default title-similarity cut-off for providers that filter on it.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

/// One row of a seeder tier table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SeederRule {
    /// Matches when `seeders >= threshold`.
    AtLeast { seeders: i64, adjustment: i64 },
    /// Matches when `seeders < threshold`.
    Below { seeders: i64, adjustment: i64 },
}

impl SeederRule {
    pub fn matches(&self, seeders: i64) -> bool {
        match *self {
            SeederRule::AtLeast { seeders: min, .. } => seeders >= min,
            SeederRule::Below { seeders: max, .. } => seeders < max,
        }
    }

    pub fn adjustment(&self) -> i64 {
        match *self {
            SeederRule::AtLeast { adjustment, .. } | SeederRule::Below { adjustment, .. } => {
                adjustment
            }
        }
    }
}

/// Ordered seeder rules, first match wins. Seeder counts no rule matches
/// get no adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeederTierTable {
    pub rules: Vec<SeederRule>,
}

impl SeederTierTable {
    /// Peer-to-peer availability table. 10 to 24 seeders fall in a gap
    /// with no adjustment.
    pub fn peer() -> Self {
        Self {
            rules: vec![
                SeederRule::AtLeast { seeders: 50, adjustment: 500 },
                SeederRule::AtLeast { seeders: 25, adjustment: 250 },
                SeederRule::Below { seeders: 10, adjustment: -200 },
            ],
        }
    }

    /// Indexer search table. The `< 5` row sits behind `< 10` and never
    /// matches; it is kept so the table reads as published.
    pub fn indexer() -> Self {
        Self {
            rules: vec![
                SeederRule::AtLeast { seeders: 100, adjustment: 900 },
                SeederRule::AtLeast { seeders: 50, adjustment: 600 },
                SeederRule::AtLeast { seeders: 25, adjustment: 300 },
                SeederRule::Below { seeders: 10, adjustment: -500 },
                SeederRule::Below { seeders: 5, adjustment: -1000 },
            ],
        }
    }

    pub fn adjustment(&self, seeders: i64) -> i64 {
        self.rules
            .iter()
            .find(|rule| rule.matches(seeders))
            .map(SeederRule::adjustment)
            .unwrap_or(0)
    }
}

/// Named, versioned set of ranking magnitudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankPolicy {
    pub name: String,
    pub version: String,
    pub unknown_resolution_penalty: i64,
    pub missing_audio_penalty: i64,
    /// Added for confirmed-cached candidates when streaming through debrid.
    pub cached_bonus: i64,
    pub min_file_size_bytes: i64,
    pub small_file_penalty: i64,
    pub flagged_languages: BTreeSet<String>,
    pub flagged_language_penalty: i64,
    pub peer_seeders: SeederTierTable,
    pub indexer_seeders: SeederTierTable,
    /// Cut-off used by providers whose policy filters on title similarity.
    pub similarity_threshold: f64,
}

impl Default for RankPolicy {
    fn default() -> Self {
        Self {
            name: "browser".to_string(),
            version: "v1".to_string(),
            unknown_resolution_penalty: -2000,
            missing_audio_penalty: -300,
            cached_bonus: 10_000,
            min_file_size_bytes: 50_000_000,
            small_file_penalty: -2000,
            flagged_languages: ["it", "ru"].iter().map(|s| s.to_string()).collect(),
            flagged_language_penalty: -50,
            peer_seeders: SeederTierTable::peer(),
            indexer_seeders: SeederTierTable::indexer(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl RankPolicy {
    /// `name-version`, e.g. `browser-v1`.
    pub fn id(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    pub fn seeder_table(&self, scheme: SeederScheme) -> &SeederTierTable {
        match scheme {
            SeederScheme::Peer => &self.peer_seeders,
            SeederScheme::Indexer => &self.indexer_seeders,
        }
    }
}

/// Which seeder table a provider's candidates are scored with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeederScheme {
    Peer,
    Indexer,
}

/// Provider-specific ranking and filtering behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProviderPolicy {
    pub seeder_scheme: SeederScheme,
    /// Drop candidates whose title similarity is below this value.
    pub similarity_threshold: Option<f64>,
}

impl ProviderPolicy {
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        if self.similarity_threshold.is_some() {
            self.similarity_threshold = Some(threshold);
        }
        self
    }
}

impl Provider {
    pub fn policy(&self) -> ProviderPolicy {
        match self {
            Provider::Torrentio | Provider::Aiostreams => ProviderPolicy {
                seeder_scheme: SeederScheme::Peer,
                similarity_threshold: None,
            },
            Provider::Prowlarr => ProviderPolicy {
                seeder_scheme: SeederScheme::Indexer,
                similarity_threshold: Some(DEFAULT_SIMILARITY_THRESHOLD),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_table_boundaries() {
        let table = SeederTierTable::peer();
        assert_eq!(table.adjustment(50), 500);
        assert_eq!(table.adjustment(49), 250);
        assert_eq!(table.adjustment(25), 250);
        assert_eq!(table.adjustment(24), 0);
        assert_eq!(table.adjustment(10), 0);
        assert_eq!(table.adjustment(9), -200);
        assert_eq!(table.adjustment(-1), -200);
    }

    #[test]
    fn test_indexer_table_boundaries() {
        let table = SeederTierTable::indexer();
        assert_eq!(table.adjustment(100), 900);
        assert_eq!(table.adjustment(99), 600);
        assert_eq!(table.adjustment(50), 600);
        assert_eq!(table.adjustment(25), 300);
        assert_eq!(table.adjustment(24), 0);
        assert_eq!(table.adjustment(10), 0);
        assert_eq!(table.adjustment(9), -500);
        // `< 5` never wins over `< 10`
        assert_eq!(table.adjustment(3), -500);
        assert_eq!(table.adjustment(0), -500);
    }

    #[test]
    fn test_provider_policies() {
        assert_eq!(Provider::Torrentio.policy().seeder_scheme, SeederScheme::Peer);
        assert_eq!(Provider::Aiostreams.policy().similarity_threshold, None);
        let prowlarr = Provider::Prowlarr.policy();
        assert_eq!(prowlarr.seeder_scheme, SeederScheme::Indexer);
        assert_eq!(prowlarr.similarity_threshold, Some(0.8));
    }

    #[test]
    fn test_threshold_override_only_for_filtering_providers() {
        let policy = Provider::Prowlarr.policy().with_similarity_threshold(0.5);
        assert_eq!(policy.similarity_threshold, Some(0.5));
        let policy = Provider::Torrentio.policy().with_similarity_threshold(0.5);
        assert_eq!(policy.similarity_threshold, None);
    }

    #[test]
    fn test_policy_id_and_toml_overrides() {
        assert_eq!(RankPolicy::default().id(), "browser-v1");

        let policy: RankPolicy = toml::from_str(
            r#"
            version = "v2"
            cached_bonus = 5000
            flagged_languages = ["de"]

            [[peer_seeders]]
            op = "at_least"
            seeders = 10
            adjustment = 100
            "#,
        )
        .unwrap();

        assert_eq!(policy.id(), "browser-v2");
        assert_eq!(policy.cached_bonus, 5000);
        assert_eq!(policy.missing_audio_penalty, -300);
        assert!(policy.flagged_languages.contains("de"));
        assert_eq!(policy.peer_seeders.adjustment(12), 100);
        assert_eq!(policy.indexer_seeders, SeederTierTable::indexer());
    }
}
