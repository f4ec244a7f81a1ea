//! Coverage and precision over a corpus's match set.

pub mod calculator;
pub mod types;


pub use calculator::compute;
pub use types::{ClaimFilter, MetricKind, MetricResult};
