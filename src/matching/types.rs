use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{CITANCE_TO_CLAIMS_KEY, CLAIM_TO_CITANCES_KEY};
use crate::corpus::Claim;
use crate::hashing::ItemKey;

/// Which side is the subject of an oracle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Each citance is scored against every claim (feeds coverage).
    CitanceToClaims,
    /// Each claim is scored against every citance (feeds precision).
    ClaimToCitances,
}

impl Direction {
    /// Key of the result list in the oracle's JSON answer.
    pub fn result_key(self) -> &'static str {
        match self {
            Direction::CitanceToClaims => CITANCE_TO_CLAIMS_KEY,
            Direction::ClaimToCitances => CLAIM_TO_CITANCES_KEY,
        }
    }

    /// Field naming the subject inside each result item.
    pub fn subject_field(self) -> &'static str {
        match self {
            Direction::CitanceToClaims => "citance",
            Direction::ClaimToCitances => "claim",
        }
    }

    /// Field naming the candidate inside each match.
    pub fn candidate_field(self) -> &'static str {
        match self {
            Direction::CitanceToClaims => "claim",
            Direction::ClaimToCitances => "citance",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.result_key())
    }
}

/// What a failed oracle call does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// The request fails; the caller drops the whole corpus.
    #[default]
    Strict,
    /// The failed batch is logged and dropped; other batches still count.
    Lenient,
}

impl FromStr for FailureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            _ => Err(format!("Unknown failure mode: {}", s)),
        }
    }
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureMode::Strict => f.write_str("strict"),
            FailureMode::Lenient => f.write_str("lenient"),
        }
    }
}

/// Parsed JSON answer of one batch call.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResponse {
    /// Position of the batch among the subject batches.
    pub batch_index: usize,
    /// Decoded answer (code fences already stripped).
    pub payload: serde_json::Value,
}

/// A claim text echoed by the oracle that matched no known claim.
///
/// Caches written by earlier runs store `{"claim": null}` when the oracle omitted the text;
/// that reads back as an empty text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClaimStub {
    #[serde(deserialize_with = "null_as_empty")]
    pub claim: String,
}

/// The claim side of a match: the full claim when resolvable, a text stub otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimRef {
    /// Only the text survived.
    Unresolved(ClaimStub),
    /// Resolved to a claim of the corpus.
    Resolved(Claim),
}

impl ClaimRef {
    /// Creates a stub for unresolvable `text`.
    pub fn stub(text: impl Into<String>) -> Self {
        ClaimRef::Unresolved(ClaimStub { claim: text.into() })
    }

    /// Claim text (canonical when resolved).
    pub fn text(&self) -> &str {
        match self {
            ClaimRef::Unresolved(stub) => &stub.claim,
            ClaimRef::Resolved(claim) => &claim.text,
        }
    }

    /// Stable key when resolved.
    pub fn key(&self) -> Option<ItemKey> {
        match self {
            ClaimRef::Unresolved(_) => None,
            ClaimRef::Resolved(claim) => claim.key,
        }
    }

    /// The resolved claim, if any.
    pub fn claim(&self) -> Option<&Claim> {
        match self {
            ClaimRef::Unresolved(_) => None,
            ClaimRef::Resolved(claim) => Some(claim),
        }
    }
}

/// One oracle judgment: how well a claim and a citance represent each other.
///
/// Field names on the wire follow the match cache format (`citance`, `claim`, `c_score`,
/// `dm_score`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Empty when the oracle gave no citance text (stored as `null` in older caches).
    #[serde(rename = "citance", deserialize_with = "null_as_empty")]
    pub citance_text: String,

    pub claim: ClaimRef,

    /// Quality score of the citance; `None` never passes a threshold.
    #[serde(rename = "c_score", default)]
    pub citance_quality_score: Option<f64>,

    /// Degree of match in `[0, 10]`.
    #[serde(rename = "dm_score")]
    pub degree_of_match: f64,

    /// Stable key of the citance when resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citance_key: Option<ItemKey>,
}

impl MatchRecord {
    /// Returns `true` if both the citance and the claim carry a text.
    pub fn has_texts(&self) -> bool {
        !self.citance_text.is_empty() && !self.claim.text().is_empty()
    }

    /// Identity of the citance: its key, or its text when unresolved.
    pub fn citance_identity(&self) -> Identity {
        match self.citance_key {
            Some(key) => Identity::Key(key),
            None => Identity::Text(self.citance_text.clone()),
        }
    }

    /// Identity of the claim: its key, or its text when unresolved.
    pub fn claim_identity(&self) -> Identity {
        match self.claim.key() {
            Some(key) => Identity::Key(key),
            None => Identity::Text(self.claim.text().to_string()),
        }
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Join identity used for de-duplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    Key(ItemKey),
    Text(String),
}

/// Both directions of a corpus's matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchSet {
    #[serde(default)]
    pub citance_to_claims: Vec<MatchRecord>,
    #[serde(default)]
    pub claim_to_citances: Vec<MatchRecord>,
}

impl MatchSet {
    /// Records produced by requests in `direction`.
    pub fn for_direction(&self, direction: Direction) -> &[MatchRecord] {
        match direction {
            Direction::CitanceToClaims => &self.citance_to_claims,
            Direction::ClaimToCitances => &self.claim_to_citances,
        }
    }

    /// Total records across both directions.
    pub fn len(&self) -> usize {
        self.citance_to_claims.len() + self.claim_to_citances.len()
    }

    /// Returns `true` if neither direction has records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
