use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{info, instrument, warn};

use super::types::{CorpusMatches, MatchCache};
use crate::config::Config;
use crate::corpus::Corpus;
use crate::matching::{
    BatchRequester, CorpusIndex, Direction, MatchSet, RequestError, aggregate,
};
use crate::oracle::{ConcurrencyLimiter, Oracle};

/// Runs both match directions for every corpus and gathers the results into a [`MatchCache`].
///
/// All corpora share the requester's limiter, so the concurrency cap holds across the whole run.
#[derive(Debug)]
pub struct MatchCollector {
    requester: BatchRequester,
    fuzzy_cutoff: Option<f64>,
}

impl MatchCollector {
    pub fn new(requester: BatchRequester, fuzzy_cutoff: Option<f64>) -> Self {
        Self {
            requester,
            fuzzy_cutoff,
        }
    }

    /// Builds a collector with a fresh limiter sized from `config`.
    pub fn from_config(oracle: Arc<dyn Oracle>, config: &Config) -> Self {
        let limiter = ConcurrencyLimiter::new(config.max_concurrent_requests);
        let requester = BatchRequester::new(oracle, limiter, config.batch_size)
            .with_failure_mode(config.failure_mode);
        Self::new(requester, config.fuzzy_cutoff)
    }

    /// Collects matches for one corpus, both directions in flight together.
    #[instrument(skip_all, fields(corpus_id = %corpus.corpus_id))]
    pub async fn collect_corpus(&self, corpus: &Corpus) -> Result<MatchSet, RequestError> {
        let citances = corpus.citance_texts();
        let claims = corpus.claim_texts();

        let (forward, backward) = tokio::join!(
            self.requester
                .request_matches(Direction::CitanceToClaims, &citances, &claims),
            self.requester
                .request_matches(Direction::ClaimToCitances, &claims, &citances),
        );
        let (forward, backward) = (forward?, backward?);

        let index = CorpusIndex::new(corpus, self.fuzzy_cutoff);
        let matches = MatchSet {
            citance_to_claims: aggregate(Direction::CitanceToClaims, &forward, &index),
            claim_to_citances: aggregate(Direction::ClaimToCitances, &backward, &index),
        };

        info!(
            citance_to_claims = matches.citance_to_claims.len(),
            claim_to_citances = matches.claim_to_citances.len(),
            "Collected matches"
        );
        Ok(matches)
    }

    /// Collects every corpus concurrently.
    ///
    /// Degenerate corpora are skipped up front. A corpus whose request fails is logged and left
    /// out of the cache; the others are unaffected.
    pub async fn collect(&self, corpora: &[Corpus]) -> MatchCache {
        let active: Vec<&Corpus> = corpora
            .iter()
            .filter(|corpus| {
                if corpus.is_degenerate() {
                    info!(corpus_id = %corpus.corpus_id, "Skipping corpus with no claims or no citances");
                    false
                } else {
                    true
                }
            })
            .collect();

        info!(
            corpora = active.len(),
            batch_size = self.requester.batch_size(),
            failure_mode = %self.requester.failure_mode(),
            "Collecting matches"
        );

        let outcomes = join_all(active.iter().map(|corpus| async move {
            (*corpus, self.collect_corpus(corpus).await)
        }))
        .await;

        let mut cache = MatchCache::new();
        for (corpus, outcome) in outcomes {
            match outcome {
                Ok(matches) => {
                    cache.insert(corpus.corpus_id.clone(), CorpusMatches::new(corpus, matches));
                }
                Err(e) => {
                    warn!(corpus_id = %corpus.corpus_id, error = %e, "Dropping corpus after failed request");
                }
            }
        }

        info!(
            collected = cache.len(),
            failed = active.len() - cache.len(),
            "Match collection finished"
        );
        cache
    }
}
