//! Tolerant reading of claim lists returned by the oracle.

use serde_json::Value;
use tracing::warn;

use crate::corpus::Claim;
use crate::oracle::strip_code_fences_lenient;

/// Reads the claims from an extraction answer.
///
/// The answer should be a JSON array of claim objects. If it is not valid JSON, every balanced
/// `{...}` object in the text is tried on its own and those carrying a `claim` field are kept.
/// Claims with empty text are dropped.
pub fn parse_claims(text: &str) -> Vec<Claim> {
    let body = strip_code_fences_lenient(text);

    let claims = match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => items.into_iter().filter_map(claim_from_value).collect(),
        Ok(Value::Object(map)) => {
            // Some answers wrap the list in an object, e.g. {"claims": [...]}.
            match map.into_iter().find_map(|(_, v)| match v {
                Value::Array(items) => Some(items),
                _ => None,
            }) {
                Some(items) => items.into_iter().filter_map(claim_from_value).collect(),
                None => Vec::new(),
            }
        }
        Ok(_) => Vec::new(),
        Err(e) => {
            warn!(error = %e, "Extraction answer is not valid JSON; scanning for claim objects");
            balanced_objects(body)
                .into_iter()
                .filter_map(|raw| serde_json::from_str::<Value>(raw).ok())
                .filter_map(claim_from_value)
                .collect()
        }
    };

    claims
        .into_iter()
        .filter(|c: &Claim| !c.text.trim().is_empty())
        .collect()
}

fn claim_from_value(value: Value) -> Option<Claim> {
    serde_json::from_value(value).ok()
}

/// Returns every top-level balanced `{...}` span of `text`, ignoring braces inside strings.
pub fn balanced_objects(text: &str) -> Vec<&str> {
    let mut objects = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    objects.push(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    objects
}
