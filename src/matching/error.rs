use thiserror::Error;

use super::types::Direction;
use crate::oracle::OracleError;

/// Errors from the batch requester.
#[derive(Debug, Error)]
pub enum RequestError {
    /// An oracle call failed in strict mode.
    #[error("{direction} batch {batch_index} failed: {source}")]
    BatchFailed {
        direction: Direction,
        batch_index: usize,
        #[source]
        source: OracleError,
    },
}
