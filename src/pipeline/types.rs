use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::corpus::{Citance, Claim, Corpus};
use crate::matching::MatchSet;
use crate::metrics::{ClaimFilter, MetricResult};

/// Everything the metric pass needs for one corpus: its items and both match directions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusMatches {
    #[serde(default)]
    pub citances: Vec<Citance>,
    #[serde(default)]
    pub claims: Vec<Claim>,
    #[serde(default)]
    pub matches: MatchSet,
}

impl CorpusMatches {
    /// Snapshot of `corpus` with its collected matches.
    pub fn new(corpus: &Corpus, matches: MatchSet) -> Self {
        Self {
            citances: corpus.citances.clone(),
            claims: corpus.claims.clone(),
            matches,
        }
    }

    /// Rebuilds the [`Corpus`] (keys are re-derived, so caches written without keys work).
    pub fn to_corpus(&self, corpus_id: &str) -> Corpus {
        Corpus::new(corpus_id, self.claims.clone(), self.citances.clone())
    }
}

/// Match cache keyed by corpus ID.
pub type MatchCache = BTreeMap<String, CorpusMatches>;

/// Thresholds and claim restrictions of one metric run.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationParams {
    pub dm_threshold: f64,
    pub quality_threshold: f64,
    pub filter: ClaimFilter,
}

/// Run-level averages.
///
/// `average_claims_per_corpus` is taken over corpora with a precision result and
/// `average_citances_per_corpus` over corpora with a coverage result; the two counters are
/// reported alongside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub average_precision: f64,
    pub average_coverage: f64,
    #[serde(rename = "average_claims_per_corpusId")]
    pub average_claims_per_corpus: f64,
    #[serde(rename = "average_citances_per_corpusId")]
    pub average_citances_per_corpus: f64,
    pub precision_corpus_count: usize,
    pub coverage_corpus_count: usize,
    pub dm_threshold: f64,
    pub quality_threshold: f64,
    #[serde(default)]
    pub themes: Option<Vec<String>>,
    #[serde(default)]
    pub sections: Option<Vec<String>>,
    pub run_id: String,
    /// RFC 3339 timestamp.
    pub generated_at: String,
}

/// Per-corpus results of both metrics plus the averages.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub coverage_report: BTreeMap<String, MetricResult>,
    pub precision_report: BTreeMap<String, MetricResult>,
    pub summary: Summary,
}
