//! Claim/citance matching and scoring.
//!
//! Claims extracted from a paper are cross-matched against the citances that cite it by an
//! external text-completion oracle, and the judgments are reduced to per-corpus coverage and
//! precision.
//!
//! # Pipeline
//!
//! - [`corpus`] groups raw claim and citance exports by corpus ID.
//! - [`matching`] batches oracle requests for both directions and aggregates the answers into
//!   [`MatchRecord`]s.
//! - [`pipeline`] runs collection over every corpus under one shared concurrency cap and scores
//!   the resulting [`MatchCache`] with [`metrics::compute`].
//! - [`store`] reads inputs and writes the cache and report files.
//!
//! [`extraction`] and [`quality`] produce the claim and citance-score inputs.
//!
//! ## Test/Mock Support
//! [`oracle::MockOracle`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod corpus;
pub mod extraction;
pub mod hashing;
pub mod matching;
pub mod metrics;
pub mod oracle;
pub mod pipeline;
pub mod quality;
pub mod store;

pub use config::{Config, ConfigError, OracleBackend};
pub use corpus::{Citance, Claim, Corpus, group_by_corpus};
pub use extraction::{ClaimExtractor, ExtractionError};
pub use hashing::{ItemKey, ItemKind};
pub use matching::{BatchRequester, Direction, FailureMode, MatchRecord, MatchSet, RequestError};
pub use metrics::{ClaimFilter, MetricKind, MetricResult};
#[cfg(any(test, feature = "mock"))]
pub use oracle::MockOracle;
pub use oracle::{ConcurrencyLimiter, Oracle, OracleError, RetryPolicy, build_oracle};
pub use pipeline::{EvaluationParams, EvaluationReport, MatchCache, MatchCollector, Summary};
pub use quality::QualityScorer;
pub use store::{ReportPaths, StoreError};
