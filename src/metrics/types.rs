use std::fmt;

use serde::{Deserialize, Serialize};

use crate::corpus::Claim;
use crate::matching::{Direction, MatchRecord};

/// Which statistic to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Share of eligible citances represented by at least one claim.
    Coverage,
    /// Share of filtered claims represented by at least one citance.
    Precision,
}

impl MetricKind {
    /// Direction whose matches feed this metric.
    pub fn direction(self) -> Direction {
        match self {
            MetricKind::Coverage => Direction::CitanceToClaims,
            MetricKind::Precision => Direction::ClaimToCitances,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Coverage => f.write_str("coverage"),
            MetricKind::Precision => f.write_str("precision"),
        }
    }
}

/// Theme and section restrictions on eligible claims.
///
/// Comparison is case-insensitive. `None` means no restriction, which is different from an
/// empty set (nothing passes). Entries are only ever stored case-folded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimFilter {
    themes: Option<Vec<String>>,
    sections: Option<Vec<String>>,
}

impl ClaimFilter {
    /// Creates a filter, case-folding every entry.
    pub fn new(themes: Option<Vec<String>>, sections: Option<Vec<String>>) -> Self {
        let fold = |values: Vec<String>| values.into_iter().map(|v| v.to_lowercase()).collect();
        Self {
            themes: themes.map(fold),
            sections: sections.map(fold),
        }
    }

    /// Treats empty lists as "no restriction" (how repeatable CLI flags arrive when absent).
    pub fn from_flags(themes: Vec<String>, sections: Vec<String>) -> Self {
        let opt = |values: Vec<String>| (!values.is_empty()).then_some(values);
        Self::new(opt(themes), opt(sections))
    }

    /// Allowed themes, lower-cased.
    pub fn themes(&self) -> Option<&[String]> {
        self.themes.as_deref()
    }

    /// Allowed sections, lower-cased.
    pub fn sections(&self) -> Option<&[String]> {
        self.sections.as_deref()
    }

    pub fn is_unrestricted(&self) -> bool {
        self.themes.is_none() && self.sections.is_none()
    }

    /// Returns `true` if `claim` passes both restrictions.
    pub fn allows(&self, claim: &Claim) -> bool {
        let passes = |allowed: &Option<Vec<String>>, value: &str| match allowed {
            None => true,
            Some(allowed) => {
                let value = value.to_lowercase();
                allowed.iter().any(|a| *a == value)
            }
        };
        passes(&self.themes, &claim.theme) && passes(&self.sections, &claim.section)
    }

    /// File-name fragment identifying the active restrictions, e.g. `_themes_novelty_sections_results`.
    pub fn file_tag(&self) -> String {
        let mut tag = String::new();
        if let Some(themes) = self.themes.as_ref().filter(|t| !t.is_empty()) {
            tag.push_str("_themes_");
            tag.push_str(&themes.join("_"));
        }
        if let Some(sections) = self.sections.as_ref().filter(|s| !s.is_empty()) {
            tag.push_str("_sections_");
            tag.push_str(&sections.join("_"));
        }
        tag
    }
}

/// Outcome of one metric on one corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    pub metric: MetricKind,

    /// Matches kept after thresholds and de-duplication.
    #[serde(rename = "number_of_matches")]
    pub match_count: usize,

    /// Eligible citances (those with a match above the quality threshold).
    #[serde(rename = "number_of_citances")]
    pub citance_count: usize,

    /// Claims surviving the theme/section filter.
    #[serde(rename = "number_of_claims")]
    pub claim_count: usize,

    pub matched_pairs: Vec<MatchRecord>,

    /// Coverage or precision, in `[0, 1]`.
    pub value: f64,
}
