//! Access to the external text-completion oracle.
//!
//! The oracle is a black box: `complete(prompt) -> text`. This module owns everything around
//! that call (backends, the shared concurrency cap, the extraction retry schedule, and the
//! code-fence cleanup applied before any JSON parsing).
//!
//! # Concurrency
//!
//! [`ConcurrencyLimiter`] is constructed explicitly by the caller and passed down. It is never
//! ambient global state, which lets tests inject a small pool and assert the cap through
//! [`MockOracle::peak_in_flight`].

pub mod client;
pub mod error;
pub mod limiter;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod retry;
pub mod sanitize;


pub use client::{GenaiOracle, OpenAiOracle, Oracle, build_oracle, chat_completions_url};
pub use error::{OracleError, OracleResult};
pub use limiter::ConcurrencyLimiter;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockOracle;
pub use retry::RetryPolicy;
pub use sanitize::{strip_code_fences, strip_code_fences_lenient};
