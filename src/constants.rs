//! Cross-cutting, shared constants.
//!
//! Thresholds and concurrency defaults are shared by the CLI, [`Config`](crate::config::Config)
//! and the test suites. Keep them here so the defaults cannot drift between entry points.

use std::time::Duration;

/// Default degree-of-match threshold (inclusive).
pub const DEFAULT_DM_THRESHOLD: f64 = 6.0;

/// Default citance quality-score threshold (inclusive).
pub const DEFAULT_QUALITY_THRESHOLD: f64 = 8.0;

/// Upper bound of the oracle's 0-10 scoring scale.
pub const MAX_SCORE: f64 = 10.0;

/// Subjects per oracle request in the matching pathway.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Process-wide cap on in-flight oracle calls while matching.
pub const DEFAULT_MATCH_CONCURRENCY: usize = 200;

/// Cap on in-flight oracle calls while extracting claims.
pub const DEFAULT_EXTRACTION_CONCURRENCY: usize = 80;

/// Attempts made per paper by the claim-extraction pathway.
pub const EXTRACTION_RETRIES: usize = 10;

/// Fixed delay between claim-extraction attempts.
pub const EXTRACTION_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Minimum normalized similarity accepted when resolving oracle-echoed text.
pub const DEFAULT_FUZZY_CUTOFF: f64 = 0.9;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Base URL of the OpenAI-compatible chat completions API.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Sampling temperature for every oracle call.
pub const DEFAULT_TEMPERATURE: f32 = 0.0;

/// Per-request HTTP timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// File name of the match cache written by the `match` command.
pub const MATCH_CACHE_FILENAME: &str = "eval_cache_filtered.json";

/// Result list key of a citance-to-claims oracle response.
pub const CITANCE_TO_CLAIMS_KEY: &str = "citance_to_claims";

/// Result list key of a claim-to-citances oracle response.
pub const CLAIM_TO_CITANCES_KEY: &str = "claim_to_citances";
