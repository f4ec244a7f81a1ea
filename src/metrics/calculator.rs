use std::collections::HashSet;

use tracing::{debug, info};

use super::types::{ClaimFilter, MetricKind, MetricResult};
use crate::corpus::Corpus;
use crate::matching::{Identity, MatchRecord, MatchSet};

/// Computes coverage or precision for one corpus.
///
/// Returns `None` when no claim survives `filter` or no citance has a match reaching
/// `quality_threshold`; the corpus then does not count towards that metric.
///
/// Matches are joined to the corpus by canonical text. De-duplication keeps the first kept
/// match per citance (coverage) or per claim (precision) in stored record order.
pub fn compute(
    corpus: &Corpus,
    matches: &MatchSet,
    dm_threshold: f64,
    quality_threshold: f64,
    kind: MetricKind,
    filter: &ClaimFilter,
) -> Option<MetricResult> {
    let corpus_id = &corpus.corpus_id;

    let filtered_claims: HashSet<&str> = corpus
        .claims
        .iter()
        .filter(|c| filter.allows(c))
        .map(|c| c.text.as_str())
        .collect();
    if filtered_claims.is_empty() {
        info!(%corpus_id, metric = %kind, "No claims left after filtering; skipping");
        return None;
    }

    let records = matches.for_direction(kind.direction());
    let textless = records.iter().filter(|m| !m.has_texts()).count();
    if textless > 0 {
        debug!(%corpus_id, metric = %kind, textless, "Ignoring matches without a citance or claim text");
    }

    let candidates: Vec<&MatchRecord> = records
        .iter()
        .filter(|m| m.has_texts() && filtered_claims.contains(m.claim.text()))
        .collect();

    let quality_ok = |m: &MatchRecord| {
        m.citance_quality_score
            .is_some_and(|score| score >= quality_threshold)
    };

    let potential: HashSet<&str> = candidates
        .iter()
        .copied()
        .filter(|m| quality_ok(m))
        .map(|m| m.citance_text.as_str())
        .collect();
    let eligible: HashSet<&str> = corpus
        .citances
        .iter()
        .map(|c| c.text.as_str())
        .filter(|text| potential.contains(text))
        .collect();
    if eligible.is_empty() {
        info!(%corpus_id, metric = %kind, "No eligible citances after filtering; skipping");
        return None;
    }

    let mut seen: HashSet<Identity> = HashSet::new();
    let mut matched_citances: HashSet<&str> = HashSet::new();
    let mut matched_claims: HashSet<&str> = HashSet::new();
    let mut matched_pairs = Vec::new();

    for record in candidates {
        if !eligible.contains(record.citance_text.as_str())
            || !quality_ok(record)
            || record.degree_of_match < dm_threshold
        {
            continue;
        }

        let identity = match kind {
            MetricKind::Coverage => record.citance_identity(),
            MetricKind::Precision => record.claim_identity(),
        };
        if !seen.insert(identity) {
            continue;
        }

        matched_citances.insert(record.citance_text.as_str());
        matched_claims.insert(record.claim.text());
        matched_pairs.push(record.clone());
    }

    let value = match kind {
        MetricKind::Coverage => matched_citances.len() as f64 / eligible.len() as f64,
        MetricKind::Precision => matched_claims.len() as f64 / filtered_claims.len() as f64,
    };

    debug!(
        %corpus_id,
        metric = %kind,
        matches = matched_pairs.len(),
        citances = eligible.len(),
        claims = filtered_claims.len(),
        value,
        "Computed metric"
    );

    Some(MetricResult {
        metric: kind,
        match_count: matched_pairs.len(),
        citance_count: eligible.len(),
        claim_count: filtered_claims.len(),
        matched_pairs,
        value,
    })
}
