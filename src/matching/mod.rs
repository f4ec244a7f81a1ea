//! Oracle-judged matching between claims and citances.
//!
//! [`BatchRequester`] sends subjects to the oracle in batches, each batch against the full
//! candidate list, and returns the parsed answers. [`aggregate`] turns those answers into
//! [`MatchRecord`]s, resolving echoed texts through a [`CorpusIndex`] (exact first, then a
//! fuzzy fallback that is always logged).

pub mod aggregator;
pub mod error;
pub mod prompt;
pub mod requester;
pub mod resolver;
pub mod types;

#[cfg(test)]
mod tests;

pub use aggregator::{CorpusIndex, aggregate, coerce_dm};
pub use error::RequestError;
pub use prompt::{python_list_repr, python_str_repr, render_batch_prompt};
pub use requester::{BatchRequester, parse_batch_payload};
pub use resolver::{Resolution, TextResolver};
pub use types::{
    BatchResponse, ClaimRef, ClaimStub, Direction, FailureMode, Identity, MatchRecord, MatchSet,
};
