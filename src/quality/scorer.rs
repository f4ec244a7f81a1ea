use std::path::Path;
use std::sync::Arc;

use futures_util::future::join_all;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::constants::{DEFAULT_FUZZY_CUTOFF, MAX_SCORE};
use crate::corpus::{Citance, CitancesEntry};
use crate::matching::TextResolver;
use crate::oracle::{ConcurrencyLimiter, Oracle, OracleResult, strip_code_fences_lenient};
use crate::store::{self, StoreResult};

const QUALITY_INSTRUCTION: &str = "The following citation sentences come from research papers. \
Rate the quality of the conclusion each one draws. Good citances declare something is better, \
propose something new, or describe a new finding or cause-effect relationship. \
Give each an overall score from 0 to 10 and answer only with a JSON array:\n\
[{\"citance\": \"The statement\", \"score\": 0}]";

/// A citance text as echoed by the oracle, with the score it received.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCitance {
    pub text: String,
    pub score: Option<f64>,
}

/// Renders the scoring request: the citances numbered from 1.
pub fn render_quality_prompt(citances: &[String]) -> String {
    let listed: Vec<String> = citances
        .iter()
        .enumerate()
        .map(|(i, text)| format!("{}. {}", i + 1, text))
        .collect();
    format!("{QUALITY_INSTRUCTION}\n\n{}", listed.join("\n\n"))
}

/// Reads `(citance, score)` pairs from a scoring answer.
///
/// Accepts a JSON array (or a single object, or an object wrapping the array). Otherwise falls
/// back to line pairs: a `citance: ...` line followed by a `score: N` line.
pub fn parse_scores(text: &str) -> Vec<ScoredCitance> {
    let body = strip_code_fences_lenient(text);

    let items = match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => Some(items),
        Ok(Value::Object(map)) if map.contains_key("citance") => Some(vec![Value::Object(map)]),
        Ok(Value::Object(map)) => map.into_iter().find_map(|(_, v)| match v {
            Value::Array(items) => Some(items),
            _ => None,
        }),
        _ => None,
    };

    match items {
        Some(items) => items
            .iter()
            .filter_map(|item| {
                let text = item.get("citance")?.as_str()?;
                Some(ScoredCitance {
                    text: text.trim().to_string(),
                    score: item.get("score").and_then(score_value),
                })
            })
            .collect(),
        None => parse_score_lines(body),
    }
}

fn score_value(value: &Value) -> Option<f64> {
    let score = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (score.is_finite() && (0.0..=MAX_SCORE).contains(&score)).then_some(score)
}

fn parse_score_lines(body: &str) -> Vec<ScoredCitance> {
    let lines: Vec<String> = body
        .lines()
        .map(|line| {
            line.chars()
                .filter(|c| !matches!(c, '`' | '[' | ']' | '{' | '}'))
                .collect::<String>()
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty() && line != "," && !line.eq_ignore_ascii_case("json"))
        .collect();

    let mut scored = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        if let Some(text) = field_value(&lines[i], "citance") {
            let score = lines.get(i + 1).and_then(|next| field_value(next, "score"));
            if score.is_some() {
                i += 1;
            } else {
                warn!(citance = %text, "No score line after citance");
            }
            scored.push(ScoredCitance {
                text: text.to_string(),
                score: score.and_then(|s| s.parse::<f64>().ok()).filter(|s| (0.0..=MAX_SCORE).contains(s)),
            });
        } else {
            debug!(line = %lines[i], "Ignoring unexpected line in scoring answer");
        }
        i += 1;
    }
    scored
}

/// Value of a `name: value` line; the key may be quoted, the value loses quotes and a trailing comma.
fn field_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let (key, value) = line.split_once(':')?;
    if !key.trim().trim_matches('"').eq_ignore_ascii_case(name) {
        return None;
    }
    Some(value.trim().trim_end_matches(',').trim().trim_matches('"'))
}

/// Gives each citance the score of the closest scored text (similarity `>= cutoff`), or `None`.
pub fn assign_scores(citances: &mut [Citance], scored: &[ScoredCitance], cutoff: f64) {
    let resolver = TextResolver::new(scored.iter().map(|s| s.text.as_str()), Some(cutoff));
    for citance in citances.iter_mut() {
        citance.quality_score = resolver
            .resolve(&citance.text)
            .index()
            .and_then(|i| scored.get(i))
            .and_then(|s| s.score);
        if citance.quality_score.is_none() {
            debug!(citance = %citance.text, "No score found for citance");
        }
    }
}

/// Scores the citances of every corpus, one oracle call per corpus.
pub struct QualityScorer {
    oracle: Arc<dyn Oracle>,
    limiter: ConcurrencyLimiter,
    cutoff: f64,
}

impl QualityScorer {
    pub fn new(oracle: Arc<dyn Oracle>, limiter: ConcurrencyLimiter) -> Self {
        Self {
            oracle,
            limiter,
            cutoff: DEFAULT_FUZZY_CUTOFF,
        }
    }

    async fn ask(&self, prompt: &str) -> OracleResult<String> {
        let _permit = self.limiter.acquire().await?;
        self.oracle.complete(prompt).await
    }

    /// Scores one entry in place. A failed call leaves every score `None`.
    #[instrument(skip_all, fields(corpus_id = entry.corpus_id.as_deref().unwrap_or_default()))]
    pub async fn score_entry(&self, entry: &mut CitancesEntry) {
        if entry.citances.is_empty() {
            return;
        }
        let texts: Vec<String> = entry.citances.iter().map(|c| c.text.clone()).collect();

        let scored = match self.ask(&render_quality_prompt(&texts)).await {
            Ok(answer) => parse_scores(&answer),
            Err(e) => {
                warn!(error = %e, "Quality scoring call failed");
                Vec::new()
            }
        };
        assign_scores(&mut entry.citances, &scored, self.cutoff);

        let scored_count = entry
            .citances
            .iter()
            .filter(|c| c.quality_score.is_some())
            .count();
        info!(citances = texts.len(), scored = scored_count, "Scored citances");
    }

    /// Scores every entry concurrently.
    pub async fn score_all(&self, mut entries: Vec<CitancesEntry>) -> Vec<CitancesEntry> {
        join_all(entries.iter_mut().map(|entry| self.score_entry(entry))).await;
        entries
    }

    /// Reads a citances export, scores it and writes the result to `output`.
    pub async fn score_file(&self, input: &Path, output: &Path) -> StoreResult<usize> {
        let entries = store::load_citances(input)?;
        let entries = self.score_all(entries).await;
        store::save_json(output, &entries)?;
        Ok(entries.len())
    }
}
