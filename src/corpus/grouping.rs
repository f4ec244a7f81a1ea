//! Groups raw claim and citance exports by corpus ID.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::types::{Citance, Claim, Corpus, opt_string_or_number};

/// One entry of a claims export: a paper and its extracted claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimsEntry {
    #[serde(
        default,
        rename = "corpusid",
        alias = "corpusId",
        alias = "corpusID",
        deserialize_with = "opt_string_or_number"
    )]
    pub corpus_id: Option<String>,

    #[serde(default)]
    pub claims: Vec<Claim>,
}

/// One entry of a citances export: a cited paper and the citances referencing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitancesEntry {
    #[serde(
        default,
        rename = "corpusId",
        alias = "paper_id",
        alias = "corpusid",
        deserialize_with = "opt_string_or_number"
    )]
    pub corpus_id: Option<String>,

    #[serde(default)]
    pub citances: Vec<Citance>,
}

/// Joins the two exports on corpus ID.
///
/// Output follows the order of `citance_entries`. Corpora lacking claims or citances are
/// dropped here, so every returned [`Corpus`] is non-degenerate. When the claims export repeats
/// a corpus ID the last entry wins.
pub fn group_by_corpus(
    citance_entries: Vec<CitancesEntry>,
    claim_entries: Vec<ClaimsEntry>,
) -> Vec<Corpus> {
    let mut claims_by_corpus: HashMap<String, Vec<Claim>> = HashMap::new();
    for entry in claim_entries {
        match entry.corpus_id {
            Some(id) => {
                claims_by_corpus.insert(id, entry.claims);
            }
            None => warn!("Claims entry without corpus ID; skipping"),
        }
    }

    let mut corpora = Vec::new();
    for entry in citance_entries {
        let Some(corpus_id) = entry.corpus_id else {
            warn!("Citances entry without corpus ID; skipping");
            continue;
        };
        let claims = claims_by_corpus.get(&corpus_id).cloned().unwrap_or_default();
        if claims.is_empty() || entry.citances.is_empty() {
            debug!(corpus_id = %corpus_id, "No claims or citances for corpus; skipping");
            continue;
        }
        corpora.push(Corpus::new(corpus_id, claims, entry.citances));
    }
    corpora
}
