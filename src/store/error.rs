use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
/// Errors reading or writing run artifacts.
pub enum StoreError {
    /// Input file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input file is not the expected JSON.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Output file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Value could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Output directory could not be created.
    #[error("failed to create directory {path}")]
    DirCreationFailed { path: PathBuf },
}

/// Convenience result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
