//! Candidate ranking.
//!
//! A candidate's rank starts at the parser's base score and receives a
//! fixed, ordered list of heuristic adjustments, each applied once.

mod policy;

pub use policy::{
    ProviderPolicy, RankPolicy, SeederRule, SeederScheme, SeederTierTable,
    DEFAULT_SIMILARITY_THRESHOLD,
};

use serde::Serialize;

use crate::candidate::{Candidate, Provider};
use crate::parser::ParsedTitle;

/// The ranking heuristics, in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    UnknownResolution,
    MissingAudio,
    Availability,
    SmallFile,
    FlaggedLanguage,
}

impl Heuristic {
    pub const ORDER: [Heuristic; 5] = [
        Heuristic::UnknownResolution,
        Heuristic::MissingAudio,
        Heuristic::Availability,
        Heuristic::SmallFile,
        Heuristic::FlaggedLanguage,
    ];
}

/// Score contribution of one heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Adjustment {
    pub heuristic: Heuristic,
    pub delta: i64,
}

/// How a rank was computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankBreakdown {
    pub base_score: i64,
    /// One entry per heuristic, zero deltas included.
    pub adjustments: Vec<Adjustment>,
}

impl RankBreakdown {
    pub fn total(&self) -> i64 {
        self.base_score + self.adjustments.iter().map(|a| a.delta).sum::<i64>()
    }
}

/// Applies a [`RankPolicy`] to candidates.
#[derive(Debug, Clone, Default)]
pub struct Ranker {
    policy: RankPolicy,
}

impl Ranker {
    pub fn new(policy: RankPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RankPolicy {
        &self.policy
    }

    /// A ranker that no longer penalizes `languages`, for queries that asked
    /// for them explicitly.
    pub fn accepting_languages(&self, languages: &[String]) -> Ranker {
        let mut policy = self.policy.clone();
        for language in languages {
            policy.flagged_languages.remove(language);
        }
        Ranker { policy }
    }

    /// Provider policy with this ranker's similarity threshold applied.
    pub fn provider_policy(&self, provider: Provider) -> ProviderPolicy {
        provider
            .policy()
            .with_similarity_threshold(self.policy.similarity_threshold)
    }

    /// Rank `candidate` in place and return the new rank.
    ///
    /// Derived fields are filled from the parsed facts first: resolution
    /// when the provider reported none, audio codecs, languages when the
    /// provider reported none, and title similarity.
    pub fn rank(
        &self,
        candidate: &mut Candidate,
        parsed: &ParsedTitle,
        using_debrid: bool,
        provider_policy: &ProviderPolicy,
    ) -> i64 {
        apply_facts(candidate, parsed);
        candidate.rank = self
            .breakdown(candidate, parsed, using_debrid, provider_policy)
            .total();
        candidate.rank
    }

    /// Per-heuristic adjustments [`rank`](Self::rank) would apply, without
    /// touching `candidate`.
    pub fn explain(
        &self,
        candidate: &Candidate,
        parsed: &ParsedTitle,
        using_debrid: bool,
        provider_policy: &ProviderPolicy,
    ) -> RankBreakdown {
        let mut candidate = candidate.clone();
        apply_facts(&mut candidate, parsed);
        self.breakdown(&candidate, parsed, using_debrid, provider_policy)
    }

    fn breakdown(
        &self,
        candidate: &Candidate,
        parsed: &ParsedTitle,
        using_debrid: bool,
        provider_policy: &ProviderPolicy,
    ) -> RankBreakdown {
        let adjustments = Heuristic::ORDER
            .iter()
            .map(|&heuristic| Adjustment {
                heuristic,
                delta: self.adjust(heuristic, candidate, parsed, using_debrid, provider_policy),
            })
            .collect();

        RankBreakdown {
            base_score: parsed.base_score,
            adjustments,
        }
    }

    fn adjust(
        &self,
        heuristic: Heuristic,
        candidate: &Candidate,
        parsed: &ParsedTitle,
        using_debrid: bool,
        provider_policy: &ProviderPolicy,
    ) -> i64 {
        let policy = &self.policy;
        match heuristic {
            Heuristic::UnknownResolution if candidate.resolution.is_unknown() => {
                policy.unknown_resolution_penalty
            }
            Heuristic::MissingAudio if parsed.facts.audio.is_empty() => {
                policy.missing_audio_penalty
            }
            Heuristic::Availability if using_debrid => {
                if candidate.cached.is_cached() {
                    policy.cached_bonus
                } else {
                    0
                }
            }
            Heuristic::Availability => policy
                .seeder_table(provider_policy.seeder_scheme)
                .adjustment(candidate.seeders),
            Heuristic::SmallFile if candidate.file_size_bytes < policy.min_file_size_bytes => {
                policy.small_file_penalty
            }
            Heuristic::FlaggedLanguage
                if candidate
                    .languages
                    .iter()
                    .any(|lang| policy.flagged_languages.contains(lang)) =>
            {
                policy.flagged_language_penalty
            }
            _ => 0,
        }
    }
}

fn apply_facts(candidate: &mut Candidate, parsed: &ParsedTitle) {
    let facts = &parsed.facts;
    if candidate.resolution.is_unknown() {
        candidate.resolution = facts.resolution;
    }
    candidate.audio_codecs.extend(facts.audio.iter().cloned());
    if candidate.languages.is_empty() {
        candidate.languages.extend(facts.languages.iter().cloned());
    }
    candidate.title_similarity = facts.title_similarity;
}
