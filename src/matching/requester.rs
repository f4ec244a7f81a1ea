use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, warn};

use super::error::RequestError;
use super::prompt::render_batch_prompt;
use super::types::{BatchResponse, Direction, FailureMode};
use crate::oracle::{ConcurrencyLimiter, Oracle, OracleResult, strip_code_fences};

/// Issues batched match-judgment requests to the oracle.
///
/// Subjects are split into consecutive batches of `batch_size`; every batch carries the full
/// candidate list. All batches of a call are in flight together, each holding a permit of the
/// shared [`ConcurrencyLimiter`] while its oracle call runs.
pub struct BatchRequester {
    oracle: Arc<dyn Oracle>,
    limiter: ConcurrencyLimiter,
    batch_size: usize,
    failure_mode: FailureMode,
}

impl std::fmt::Debug for BatchRequester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchRequester")
            .field("model", &self.oracle.model())
            .field("limiter", &self.limiter)
            .field("batch_size", &self.batch_size)
            .field("failure_mode", &self.failure_mode)
            .finish()
    }
}

impl BatchRequester {
    /// Creates a requester. A `batch_size` of zero is treated as one.
    pub fn new(oracle: Arc<dyn Oracle>, limiter: ConcurrencyLimiter, batch_size: usize) -> Self {
        Self {
            oracle,
            limiter,
            batch_size: batch_size.max(1),
            failure_mode: FailureMode::default(),
        }
    }

    /// Sets how failed oracle calls are handled.
    pub fn with_failure_mode(mut self, failure_mode: FailureMode) -> Self {
        self.failure_mode = failure_mode;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn failure_mode(&self) -> FailureMode {
        self.failure_mode
    }

    /// Requests judgments for every subject against every candidate.
    ///
    /// Returns the parsed answers in batch order. Answers that are not valid JSON are logged
    /// and dropped. A failed oracle call fails the whole request in
    /// [`FailureMode::Strict`] and is dropped like a malformed answer in
    /// [`FailureMode::Lenient`].
    pub async fn request_matches(
        &self,
        direction: Direction,
        subjects: &[String],
        candidates: &[String],
    ) -> Result<Vec<BatchResponse>, RequestError> {
        if subjects.is_empty() || candidates.is_empty() {
            return Ok(Vec::new());
        }

        let prompts: Vec<String> = subjects
            .chunks(self.batch_size)
            .map(|batch| render_batch_prompt(direction, batch, candidates))
            .collect();

        debug!(
            %direction,
            batches = prompts.len(),
            subjects = subjects.len(),
            candidates = candidates.len(),
            "Issuing match batches"
        );

        let outcomes = join_all(prompts.iter().map(|prompt| self.issue(prompt))).await;

        let mut responses = Vec::with_capacity(outcomes.len());
        for (batch_index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(text) => match parse_batch_payload(&text) {
                    Ok(payload) => responses.push(BatchResponse {
                        batch_index,
                        payload,
                    }),
                    Err(e) => {
                        warn!(
                            %direction,
                            batch = batch_index,
                            error = %e,
                            "Failed to parse oracle response; dropping batch"
                        );
                    }
                },
                Err(source) => match self.failure_mode {
                    FailureMode::Strict => {
                        return Err(RequestError::BatchFailed {
                            direction,
                            batch_index,
                            source,
                        });
                    }
                    FailureMode::Lenient => {
                        warn!(
                            %direction,
                            batch = batch_index,
                            error = %source,
                            "Oracle call failed; dropping batch"
                        );
                    }
                },
            }
        }

        Ok(responses)
    }

    async fn issue(&self, prompt: &str) -> OracleResult<String> {
        let _permit = self.limiter.acquire().await?;
        self.oracle.complete(prompt).await
    }
}

/// Strips code fences and decodes the answer as JSON.
pub fn parse_batch_payload(text: &str) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::from_str(strip_code_fences(text))
}
