//! Claim extraction from paper text.
//!
//! Unlike matching, each paper is retried on failure ([`RetryPolicy::extraction`]): a transport
//! error or an answer without usable claims counts as a failed attempt.
//!
//! [`RetryPolicy::extraction`]: crate::oracle::RetryPolicy::extraction

pub mod error;
pub mod extractor;
pub mod parse;


pub use error::{ExtractionError, ExtractionResult};
pub use extractor::{ClaimExtractor, Paper, render_extraction_prompt};
pub use parse::{balanced_objects, parse_claims};
