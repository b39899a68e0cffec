//! Normalize and rank media stream candidates from torrent providers.
//!
//! Each provider response is normalized into [`Candidate`]s, their release
//! titles parsed, ranked against a [`RankPolicy`] and returned as a
//! [`StreamEnvelope`] sorted best first.

pub mod assembler;
pub mod candidate;
pub mod config;
pub mod engine;
pub mod extractor;
pub mod fetcher;
pub mod magnet;
pub mod metrics;
pub mod normalizer;
pub mod parser;
pub mod query;
pub mod ranker;
pub mod resolution;
pub mod testing;

pub use assembler::{assemble, FilterPolicy, GoStatus, StreamEnvelope};
pub use candidate::{CacheStatus, Candidate, Provider, ResolutionTier, UnknownProvider, UNKNOWN};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use engine::{BatchReport, EngineError, ProviderResponse, RankOutcome, RankingEngine};
pub use fetcher::{build_clients, fetch_instrumented, FetchError, ProviderClient};
pub use normalizer::{NormalizeError, SkipReason, SkipTally};
pub use parser::{ParsedTitle, ReleaseTitleParser, TitleParseError, TitleParser};
pub use query::{MediaQuery, MediaType, QueryError};
pub use ranker::{RankPolicy, Ranker};
pub use resolution::{ResolutionClassifier, ResolutionTokens};
