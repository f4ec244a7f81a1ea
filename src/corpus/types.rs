use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::hashing::{ItemKey, ItemKind};

/// An atomic finding extracted from a paper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Claim text. Unique within its corpus.
    #[serde(rename = "claim")]
    pub text: String,

    /// Section of the paper the claim came from.
    #[serde(default, alias = "section_name")]
    pub section: String,

    /// Theme label (e.g. "Performance", "Novelty").
    #[serde(default)]
    pub theme: String,

    /// Surrounding context supplied by the extractor.
    #[serde(default)]
    pub context: String,

    /// Extractor-assigned id (`"1".."n"` per paper).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "opt_string_or_number"
    )]
    pub id: Option<String>,

    /// Stable identity assigned at ingestion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<ItemKey>,
}

impl Claim {
    /// Creates a claim with the fields the metric filters look at.
    pub fn new(text: impl Into<String>, section: impl Into<String>, theme: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            section: section.into(),
            theme: theme.into(),
            context: String::new(),
            id: None,
            key: None,
        }
    }

    /// Sets the extractor id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the context.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }
}

/// A sentence in another paper that cites the corpus paper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citance {
    /// Citance text. Unique within its corpus.
    #[serde(rename = "citance")]
    pub text: String,

    /// Paper the citance cites.
    #[serde(
        default,
        rename = "corpusId",
        alias = "paper_id",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "opt_string_or_number"
    )]
    pub source_corpus_id: Option<String>,

    #[serde(
        default,
        rename = "paragraphId",
        alias = "paragraph_id",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "opt_string_or_number"
    )]
    pub paragraph_id: Option<String>,

    #[serde(
        default,
        rename = "citanceId",
        alias = "citance_id",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "opt_string_or_number"
    )]
    pub citance_id: Option<String>,

    /// Independent 0-10 relevance score from the quality pass.
    #[serde(default, rename = "score")]
    pub quality_score: Option<f64>,

    /// Stable identity assigned at ingestion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<ItemKey>,
}

impl Citance {
    /// Creates a citance with an optional quality score.
    pub fn new(text: impl Into<String>, quality_score: Option<f64>) -> Self {
        Self {
            text: text.into(),
            source_corpus_id: None,
            paragraph_id: None,
            citance_id: None,
            quality_score,
            key: None,
        }
    }
}

/// One source paper: its claims and the citances that reference it.
#[derive(Debug, Clone, PartialEq)]
pub struct Corpus {
    pub corpus_id: String,
    pub claims: Vec<Claim>,
    pub citances: Vec<Citance>,
}

impl Corpus {
    /// Builds a corpus, assigning stable keys and dropping repeated texts.
    ///
    /// Text is the uniqueness key within a corpus; the first occurrence of a repeated claim or
    /// citance text wins.
    pub fn new(corpus_id: impl Into<String>, claims: Vec<Claim>, citances: Vec<Citance>) -> Self {
        let corpus_id = corpus_id.into();

        let mut seen = HashSet::new();
        let mut unique_claims = Vec::with_capacity(claims.len());
        for mut claim in claims {
            if !seen.insert(claim.text.clone()) {
                warn!(corpus_id = %corpus_id, claim = %claim.text, "Dropping duplicate claim text");
                continue;
            }
            claim.key = Some(ItemKey::derive(&corpus_id, ItemKind::Claim, &claim.text));
            unique_claims.push(claim);
        }

        seen.clear();
        let mut unique_citances = Vec::with_capacity(citances.len());
        for mut citance in citances {
            if !seen.insert(citance.text.clone()) {
                warn!(corpus_id = %corpus_id, citance = %citance.text, "Dropping duplicate citance text");
                continue;
            }
            citance.key = Some(ItemKey::derive(&corpus_id, ItemKind::Citance, &citance.text));
            unique_citances.push(citance);
        }

        Self {
            corpus_id,
            claims: unique_claims,
            citances: unique_citances,
        }
    }

    /// Returns `true` if the corpus has nothing to match (no claims or no citances).
    pub fn is_degenerate(&self) -> bool {
        self.claims.is_empty() || self.citances.is_empty()
    }

    /// Claim texts in corpus order.
    pub fn claim_texts(&self) -> Vec<String> {
        self.claims.iter().map(|c| c.text.clone()).collect()
    }

    /// Citance texts in corpus order.
    pub fn citance_texts(&self) -> Vec<String> {
        self.citances.iter().map(|c| c.text.clone()).collect()
    }
}

/// Accepts a JSON string or number (ids are numeric in some exports) and yields a string.
pub(crate) fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
