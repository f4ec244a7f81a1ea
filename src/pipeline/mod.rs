//! End-to-end evaluation: collect matches for every corpus, then score them.
//!
//! Collection ([`MatchCollector`]) is the only async part; it talks to the oracle and produces a
//! [`MatchCache`]. Scoring ([`run`]) is synchronous and works from a cache alone, so it can be
//! rerun with other thresholds or filters without new oracle calls.

pub mod collector;
pub mod orchestrator;
pub mod types;


pub use collector::MatchCollector;
pub use orchestrator::run;
pub use types::{CorpusMatches, EvaluationParams, EvaluationReport, MatchCache, Summary};
