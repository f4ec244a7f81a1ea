//! Turns parsed oracle answers into [`MatchRecord`]s for one corpus.

use serde_json::Value;
use tracing::{debug, warn};

use super::resolver::{Resolution, TextResolver};
use super::types::{BatchResponse, ClaimRef, Direction, MatchRecord};
use crate::constants::MAX_SCORE;
use crate::corpus::Corpus;
use crate::hashing::ItemKey;

/// Lookup tables for resolving oracle-echoed texts back to a corpus's claims and citances.
///
/// Doubles as the `citance text -> quality score` lookup: a resolved citance carries its
/// quality score, an unresolved one gets `None`.
#[derive(Debug)]
pub struct CorpusIndex<'a> {
    corpus: &'a Corpus,
    claims: TextResolver<'a>,
    citances: TextResolver<'a>,
}

/// Canonical citance side of a record.
struct ResolvedCitance {
    text: String,
    key: Option<ItemKey>,
    quality_score: Option<f64>,
}

impl<'a> CorpusIndex<'a> {
    /// Indexes `corpus`. `fuzzy_cutoff: None` restricts resolution to exact text.
    pub fn new(corpus: &'a Corpus, fuzzy_cutoff: Option<f64>) -> Self {
        Self {
            corpus,
            claims: TextResolver::new(corpus.claims.iter().map(|c| c.text.as_str()), fuzzy_cutoff),
            citances: TextResolver::new(
                corpus.citances.iter().map(|c| c.text.as_str()),
                fuzzy_cutoff,
            ),
        }
    }

    pub fn corpus(&self) -> &'a Corpus {
        self.corpus
    }

    /// Resolves a claim text to the corpus claim, or a stub.
    pub fn resolve_claim(&self, text: &str) -> ClaimRef {
        let resolution = self.claims.resolve(text);
        self.log_fuzzy("claim", text, resolution);
        match resolution.index().and_then(|i| self.corpus.claims.get(i)) {
            Some(claim) => ClaimRef::Resolved(claim.clone()),
            None => {
                debug!(corpus_id = %self.corpus.corpus_id, claim = %text, "Unresolved claim text");
                ClaimRef::stub(text)
            }
        }
    }

    fn resolve_citance(&self, text: &str) -> ResolvedCitance {
        let resolution = self.citances.resolve(text);
        self.log_fuzzy("citance", text, resolution);
        match resolution.index().and_then(|i| self.corpus.citances.get(i)) {
            Some(citance) => ResolvedCitance {
                text: citance.text.clone(),
                key: citance.key,
                quality_score: citance.quality_score,
            },
            None => {
                debug!(corpus_id = %self.corpus.corpus_id, citance = %text, "Unresolved citance text");
                ResolvedCitance {
                    text: text.to_string(),
                    key: None,
                    quality_score: None,
                }
            }
        }
    }

    fn log_fuzzy(&self, kind: &str, text: &str, resolution: Resolution) {
        if let Resolution::Fuzzy { index, similarity } = resolution {
            let resolver = if kind == "claim" {
                &self.claims
            } else {
                &self.citances
            };
            warn!(
                corpus_id = %self.corpus.corpus_id,
                kind,
                returned = %text,
                resolved = resolver.text(index).unwrap_or_default(),
                similarity,
                "Resolved oracle text by fuzzy match"
            );
        }
    }
}

/// Builds match records from the parsed answers of one direction.
///
/// Records come out in batch order, then item order, then match order. A single bad item or
/// match is skipped with a warning; the rest of the batch still counts.
pub fn aggregate(
    direction: Direction,
    responses: &[BatchResponse],
    index: &CorpusIndex<'_>,
) -> Vec<MatchRecord> {
    let mut ordered: Vec<&BatchResponse> = responses.iter().collect();
    ordered.sort_by_key(|r| r.batch_index);

    let corpus_id = &index.corpus().corpus_id;
    let subject_field = direction.subject_field();
    let candidate_field = direction.candidate_field();
    let mut records = Vec::new();

    for response in ordered {
        let Some(items) = response.payload.get(direction.result_key()).and_then(Value::as_array)
        else {
            warn!(
                %corpus_id,
                %direction,
                batch = response.batch_index,
                "Oracle response lacks the result list; dropping batch"
            );
            continue;
        };

        for item in items {
            let Some(subject) = item.get(subject_field).and_then(Value::as_str) else {
                warn!(%corpus_id, %direction, batch = response.batch_index, "Result item without subject text");
                continue;
            };
            let Some(matches) = item.get("matches").and_then(Value::as_array) else {
                warn!(%corpus_id, %direction, subject, "Result item without a matches list");
                continue;
            };

            for entry in matches {
                let Some(candidate) = entry.get(candidate_field).and_then(Value::as_str) else {
                    warn!(%corpus_id, %direction, subject, "Match without candidate text");
                    continue;
                };
                let degree_of_match = match coerce_dm(entry.get("dm")) {
                    Ok(dm) => dm,
                    Err(raw) => {
                        warn!(%corpus_id, %direction, subject, candidate, dm = %raw, "Skipping match with malformed dm");
                        continue;
                    }
                };

                let (citance_text, claim_text) = match direction {
                    Direction::CitanceToClaims => (subject, candidate),
                    Direction::ClaimToCitances => (candidate, subject),
                };
                let citance = index.resolve_citance(citance_text);

                records.push(MatchRecord {
                    citance_text: citance.text,
                    claim: index.resolve_claim(claim_text),
                    citance_quality_score: citance.quality_score,
                    degree_of_match,
                    citance_key: citance.key,
                });
            }
        }
    }

    debug!(%corpus_id, %direction, records = records.len(), "Aggregated matches");
    records
}

/// Reads a `dm` value. A missing value counts as `0.0`; anything else must be a finite number
/// (or numeric string) in `[0, MAX_SCORE]`. The offending value is returned on failure.
pub fn coerce_dm(value: Option<&Value>) -> Result<f64, String> {
    let dm = match value {
        None => return Ok(0.0),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match dm {
        Some(dm) if dm.is_finite() && (0.0..=MAX_SCORE).contains(&dm) => Ok(dm),
        _ => Err(value.map(Value::to_string).unwrap_or_default()),
    }
}
