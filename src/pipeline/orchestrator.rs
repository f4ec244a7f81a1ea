use std::collections::BTreeMap;

use tracing::{info, warn};

use super::types::{EvaluationParams, EvaluationReport, MatchCache, Summary};
use crate::metrics::{MetricKind, compute};

/// Scores every corpus of `cache` for coverage and precision and averages the results.
///
/// A corpus lacking claims or citances is skipped outright. Otherwise each metric is computed
/// independently: a `None` for one metric only removes the corpus from that metric's averages.
pub fn run(cache: &MatchCache, params: &EvaluationParams) -> EvaluationReport {
    let mut coverage_report = BTreeMap::new();
    let mut precision_report = BTreeMap::new();

    let mut coverage_sum = 0.0;
    let mut precision_sum = 0.0;
    let mut citance_total = 0usize;
    let mut claim_total = 0usize;

    for (corpus_id, entry) in cache {
        if entry.claims.is_empty() || entry.citances.is_empty() {
            info!(%corpus_id, "Skipping corpus with no claims or no citances");
            continue;
        }
        let corpus = entry.to_corpus(corpus_id);

        let score = |kind| {
            compute(
                &corpus,
                &entry.matches,
                params.dm_threshold,
                params.quality_threshold,
                kind,
                &params.filter,
            )
        };

        if let Some(result) = score(MetricKind::Coverage) {
            coverage_sum += result.value;
            citance_total += result.citance_count;
            coverage_report.insert(corpus_id.clone(), result);
        }
        if let Some(result) = score(MetricKind::Precision) {
            precision_sum += result.value;
            claim_total += result.claim_count;
            precision_report.insert(corpus_id.clone(), result);
        }
    }

    let coverage_corpus_count = coverage_report.len();
    let precision_corpus_count = precision_report.len();
    if coverage_corpus_count == 0 && precision_corpus_count == 0 {
        warn!("No corpus produced a metric");
    }

    let summary = Summary {
        average_precision: mean(precision_sum, precision_corpus_count),
        average_coverage: mean(coverage_sum, coverage_corpus_count),
        average_claims_per_corpus: mean(claim_total as f64, precision_corpus_count),
        average_citances_per_corpus: mean(citance_total as f64, coverage_corpus_count),
        precision_corpus_count,
        coverage_corpus_count,
        dm_threshold: params.dm_threshold,
        quality_threshold: params.quality_threshold,
        themes: params.filter.themes().map(<[String]>::to_vec),
        sections: params.filter.sections().map(<[String]>::to_vec),
        run_id: uuid::Uuid::new_v4().to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
    };

    info!(
        run_id = %summary.run_id,
        average_coverage = summary.average_coverage,
        average_precision = summary.average_precision,
        coverage_corpora = coverage_corpus_count,
        precision_corpora = precision_corpus_count,
        "Evaluation finished"
    );

    EvaluationReport {
        coverage_report,
        precision_report,
        summary,
    }
}

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { sum / count as f64 }
}
