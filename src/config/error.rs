//! Configuration error types.

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric variable could not be parsed.
    #[error("failed to parse {name}='{value}': {reason}")]
    InvalidNumber {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Backend name is not one of the supported oracle backends.
    #[error("unknown oracle backend '{value}' (expected 'openai' or 'genai')")]
    UnknownBackend { value: String },

    /// Failure mode name is not recognised.
    #[error("unknown failure mode '{value}' (expected 'strict' or 'lenient')")]
    UnknownFailureMode { value: String },

    /// A required environment variable was not set.
    #[error("missing required environment variable: {name}")]
    MissingEnvVar { name: &'static str },

    /// A value that must be positive was zero.
    #[error("{name} must be greater than zero")]
    ZeroValue { name: &'static str },

    /// Fuzzy cutoff outside `[0, 1]`.
    #[error("fuzzy cutoff {value} must be within 0.0..=1.0")]
    InvalidFuzzyCutoff { value: f64 },

    /// Temperature outside the provider range.
    #[error("temperature {value} must be within 0.0..=2.0")]
    InvalidTemperature { value: f32 },
}
