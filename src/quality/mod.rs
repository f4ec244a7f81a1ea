//! Citance quality scoring.
//!
//! One oracle call per corpus rates every citance 0-10. Scores are mapped back to the original
//! citances by closest text, since the oracle tends to reformat what it echoes.

pub mod scorer;


pub use scorer::{QualityScorer, ScoredCitance, assign_scores, parse_scores, render_quality_prompt};
