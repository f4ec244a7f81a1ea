use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::error::{ExtractionError, ExtractionResult};
use super::parse::parse_claims;
use crate::corpus::{Claim, ClaimsEntry};
use crate::corpus::types::opt_string_or_number;
use crate::oracle::{ConcurrencyLimiter, Oracle, RetryPolicy};
use crate::store;

const EXTRACTION_INSTRUCTION: &str = "Extract the main findings of the paper below as claims. \
Each claim must be concise, self-contained and verifiable. Answer only with a JSON array:\n\
[{\"claim\": \"...\", \"section_name\": \"...\", \"context\": \"...\", \"theme\": \"Novelty|Performance|Applicability|Background\"}]";

/// One paper of the extraction input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    #[serde(
        default,
        rename = "corpusId",
        alias = "corpusID",
        alias = "corpusid",
        deserialize_with = "opt_string_or_number"
    )]
    pub corpus_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub contents: Option<String>,
}

/// Renders the extraction request for `paper`.
pub fn render_extraction_prompt(paper: &Paper) -> String {
    format!(
        "{EXTRACTION_INSTRUCTION}\n\nTitle: {}\n\nAbstract: {}\n\nContent: {}",
        paper.title.as_deref().unwrap_or_default(),
        paper.abstract_text.as_deref().unwrap_or_default(),
        paper.contents.as_deref().unwrap_or_default(),
    )
}

/// Extracts claims from papers, retrying each paper on failure.
pub struct ClaimExtractor {
    oracle: Arc<dyn Oracle>,
    limiter: ConcurrencyLimiter,
    retry: RetryPolicy,
}

impl ClaimExtractor {
    /// Creates an extractor with the default retry schedule.
    pub fn new(oracle: Arc<dyn Oracle>, limiter: ConcurrencyLimiter) -> Self {
        Self {
            oracle,
            limiter,
            retry: RetryPolicy::extraction(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// One attempt: a single oracle call and a tolerant parse.
    async fn extract_once(&self, prompt: &str) -> ExtractionResult<Vec<Claim>> {
        let answer = {
            let _permit = self.limiter.acquire().await?;
            self.oracle.complete(prompt).await?
        };
        debug!(answer_len = answer.len(), "Extraction answer received");

        let claims = parse_claims(&answer);
        if claims.is_empty() {
            return Err(ExtractionError::NoClaims);
        }
        Ok(claims)
    }

    /// Extracts the claims of one paper, numbered `"1".."n"`.
    ///
    /// Returns an empty list once every attempt failed.
    #[instrument(skip_all, fields(corpus_id = paper.corpus_id.as_deref().unwrap_or_default()))]
    pub async fn extract_paper(&self, paper: &Paper) -> Vec<Claim> {
        let rendered = render_extraction_prompt(paper);
        let prompt = rendered.as_str();
        let label = paper.corpus_id.as_deref().unwrap_or("unknown");

        let claims = self
            .retry
            .run(label, |attempt| async move {
                match self.extract_once(prompt).await {
                    Ok(claims) => Some(claims),
                    Err(e) => {
                        warn!(attempt, error = %e, "Claim extraction attempt failed");
                        None
                    }
                }
            })
            .await
            .unwrap_or_default();

        claims
            .into_iter()
            .enumerate()
            .map(|(i, claim)| claim.with_id((i + 1).to_string()))
            .collect()
    }

    /// Extracts every paper not listed in `done`, concurrently.
    ///
    /// Papers without an ID or without claims after all retries are left out.
    pub async fn extract_all(&self, papers: &[Paper], done: &HashSet<String>) -> Vec<ClaimsEntry> {
        let pending: Vec<(&str, &Paper)> = papers
            .iter()
            .filter_map(|paper| match paper.corpus_id.as_deref() {
                Some(id) => Some((id, paper)),
                None => {
                    warn!(title = paper.title.as_deref().unwrap_or_default(), "Paper without corpus ID; skipping");
                    None
                }
            })
            .filter(|(id, _)| !done.contains(*id))
            .collect();

        info!(
            pending = pending.len(),
            skipped = papers.len() - pending.len(),
            "Extracting claims"
        );

        let results = join_all(pending.iter().map(|(id, paper)| async move {
            (*id, self.extract_paper(paper).await)
        }))
        .await;

        results
            .into_iter()
            .filter_map(|(id, claims)| {
                if claims.is_empty() {
                    warn!(corpus_id = id, "No claims extracted");
                    None
                } else {
                    Some(ClaimsEntry {
                        corpus_id: Some(id.to_string()),
                        claims,
                    })
                }
            })
            .collect()
    }

    /// Extracts claims for `papers_path` into `output_path`, resuming from its current content.
    pub async fn extract_to_file(
        &self,
        papers_path: &Path,
        output_path: &Path,
    ) -> ExtractionResult<usize> {
        let papers: Vec<Paper> = store::load_records(papers_path)?;

        let mut existing: Vec<ClaimsEntry> = if output_path.exists() {
            match store::load_claims(output_path) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(error = %e, "Existing output unreadable; starting fresh");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };
        let done: HashSet<String> = existing
            .iter()
            .filter_map(|entry| entry.corpus_id.clone())
            .collect();

        let fresh = self.extract_all(&papers, &done).await;
        let added = fresh.len();
        if added == 0 {
            info!("No new papers extracted");
            return Ok(0);
        }

        existing.extend(fresh);
        store::save_json(output_path, &existing)?;
        info!(added, total = existing.len(), path = %output_path.display(), "Saved extracted claims");
        Ok(added)
    }
}
