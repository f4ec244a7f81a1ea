use thiserror::Error;

/// Errors returned by oracle calls.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The provider answered with a non-success HTTP status.
    #[error("oracle call failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response (connect, timeout, body read).
    #[error("oracle transport error: {0}")]
    Transport(String),

    /// Error surfaced by a provider SDK.
    #[error("oracle provider error: {0}")]
    Provider(String),

    /// The response envelope could not be decoded.
    #[error("malformed oracle envelope: {0}")]
    MalformedEnvelope(String),

    /// The response carried no text.
    #[error("oracle returned an empty completion")]
    EmptyResponse,

    /// The request could not be built.
    #[error("invalid oracle request: {0}")]
    InvalidRequest(String),

    /// No API key was configured for a backend that needs one.
    #[error("no API key configured (set OPENAI_API_KEY)")]
    MissingApiKey,

    /// The shared concurrency limiter was closed.
    #[error("concurrency limiter closed")]
    LimiterClosed,
}

impl OracleError {
    /// HTTP status if the provider returned one.
    pub fn status(&self) -> Option<u16> {
        match self {
            OracleError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type OracleResult<T> = Result<T, OracleError>;
