//! Oracle request rendering for both match directions.
//!
//! Item layout is fixed for compatibility with cached runs:
//! `"Citance {n}:\nCitance: {text}\nClaims: {list}\n"` (roles swapped for claims), where
//! `{list}` is the candidate texts as a Python list literal.

use super::types::Direction;

const CITANCE_TO_CLAIMS_INSTRUCTION: &str = r#"For each citance provided (citation sentences in other papers), evaluate how accurately each claim represents the citance by assigning a degree of match (0-10).

 Respond **only** in JSON format without any additional text or code fences:

{
    "citance_to_claims": [
        {
            "citance": "...",
            "matches": [
                {"claim": "...", "dm": ...},
                ...
            ]
        },
        ...
    ]
}
"#;

const CLAIM_TO_CITANCES_INSTRUCTION: &str = r#"For each claim provided, evaluate how accurately each citance (citation sentences in other papers) represents the claim by assigning a degree of match (0-10).

 Respond **only** in JSON format without any additional text or code fences:

{
    "claim_to_citances": [
        {
            "claim": "...",
            "matches": [
                {"citance": "...", "dm": ...},
                ...
            ]
        },
        ...
    ]
}
"#;

/// Renders one batch request: every subject in `batch` against the full `candidates` list.
pub fn render_batch_prompt(direction: Direction, batch: &[String], candidates: &[String]) -> String {
    let (instruction, subject_label, candidates_label) = match direction {
        Direction::CitanceToClaims => (CITANCE_TO_CLAIMS_INSTRUCTION, "Citance", "Claims"),
        Direction::ClaimToCitances => (CLAIM_TO_CITANCES_INSTRUCTION, "Claim", "Citances"),
    };
    let candidate_list = python_list_repr(candidates);

    let items: Vec<String> = batch
        .iter()
        .enumerate()
        .map(|(idx, subject)| {
            format!(
                "{subject_label} {n}:\n{subject_label}: {subject}\n{candidates_label}: {candidate_list}\n",
                n = idx + 1
            )
        })
        .collect();

    format!("{}\n\n{}", instruction, items.join("\n"))
}

/// Renders `items` the way Python's `repr(list_of_str)` does.
pub fn python_list_repr(items: &[String]) -> String {
    let parts: Vec<String> = items.iter().map(|s| python_str_repr(s)).collect();
    format!("[{}]", parts.join(", "))
}

/// Renders a string literal the way Python's `repr(str)` does.
pub fn python_str_repr(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
