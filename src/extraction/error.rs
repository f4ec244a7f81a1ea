use thiserror::Error;

use crate::oracle::OracleError;
use crate::store::StoreError;

#[derive(Error, Debug)]
/// Errors from the claim-extraction pathway.
pub enum ExtractionError {
    /// The oracle call failed.
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// Nothing usable could be read from the answer.
    #[error("no claims found in oracle answer")]
    NoClaims,

    /// Reading papers or writing results failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenience result type for extraction.
pub type ExtractionResult<T> = Result<T, ExtractionError>;
