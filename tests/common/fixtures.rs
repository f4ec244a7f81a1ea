//! Shared corpora and a judging mock oracle.

use std::collections::HashMap;

use claimmatch::MockOracle;
use claimmatch::corpus::{Citance, CitancesEntry, Claim, ClaimsEntry};
use serde_json::{Value, json};

/// Scenario corpus: one performance claim, one citance scored 9.
pub const CLAIM_X: &str = "X improves Y by 10%";
pub const CITANCE_X: &str = "Prior work shows X improves Y.";

pub fn claims_entry(corpus_id: &str, claims: Vec<Claim>) -> ClaimsEntry {
    ClaimsEntry {
        corpus_id: Some(corpus_id.to_string()),
        claims,
    }
}

pub fn citances_entry(corpus_id: &str, citances: Vec<Citance>) -> CitancesEntry {
    CitancesEntry {
        corpus_id: Some(corpus_id.to_string()),
        citances,
    }
}

/// Judgments keyed by `(citance, claim)`; pairs not listed are not returned at all.
#[derive(Debug, Clone, Default)]
pub struct Judgments {
    pairs: HashMap<(String, String), u32>,
}

impl Judgments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, citance: &str, claim: &str, dm: u32) -> Self {
        self.pairs
            .insert((citance.to_string(), claim.to_string()), dm);
        self
    }

    /// Oracle answering both directions from these judgments, echoing `echo(text)` back.
    pub fn oracle_with_echo(self, echo: fn(&str) -> String) -> MockOracle {
        MockOracle::new(move |prompt| Ok(self.answer(prompt, echo).to_string()))
    }

    pub fn oracle(self) -> MockOracle {
        self.oracle_with_echo(|text| text.to_string())
    }

    /// The answer these judgments give to `prompt`, echoing texts verbatim.
    pub fn respond(&self, prompt: &str) -> String {
        self.answer(prompt, |text| text.to_string()).to_string()
    }

    fn answer(&self, prompt: &str, echo: fn(&str) -> String) -> Value {
        let forward = prompt.contains("\"citance_to_claims\"");
        let label = if forward { "Citance" } else { "Claim" };

        let mut grouped: Vec<(String, Vec<Value>)> = Vec::new();
        for ((citance, claim), dm) in &self.pairs {
            let (subject, candidate, field) = if forward {
                (citance, claim, "claim")
            } else {
                (claim, citance, "citance")
            };
            if !prompt.contains(&format!("{label}: {subject}\n")) {
                continue;
            }
            let entry = json!({ field: echo(candidate), "dm": dm });
            match grouped.iter_mut().find(|(s, _)| s == subject) {
                Some((_, matches)) => matches.push(entry),
                None => grouped.push((subject.clone(), vec![entry])),
            }
        }

        let (key, subject_field) = if forward {
            ("citance_to_claims", "citance")
        } else {
            ("claim_to_citances", "claim")
        };
        let items: Vec<Value> = grouped
            .into_iter()
            .map(|(subject, matches)| json!({ subject_field: echo(&subject), "matches": matches }))
            .collect();
        json!({ key: items })
    }
}
