//! Claims, citances and their grouping into corpora.

pub mod grouping;
pub mod types;


pub use grouping::{CitancesEntry, ClaimsEntry, group_by_corpus};
pub use types::{Citance, Claim, Corpus};
