//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `CLAIMMATCH_*` environment variables;
//! the CLI applies its own flags on top of the result.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_API_BASE, DEFAULT_BATCH_SIZE, DEFAULT_FUZZY_CUTOFF, DEFAULT_MATCH_CONCURRENCY,
    DEFAULT_MODEL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TEMPERATURE,
};
use crate::matching::FailureMode;

/// Which oracle implementation serves completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OracleBackend {
    /// Direct HTTP against an OpenAI-compatible `/chat/completions` endpoint.
    #[default]
    OpenAi,
    /// Provider-agnostic client (`genai`), keyed by model name.
    Genai,
}

impl FromStr for OracleBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "genai" => Ok(Self::Genai),
            _ => Err(ConfigError::UnknownBackend {
                value: s.to_string(),
            }),
        }
    }
}

/// Runtime configuration for oracle access and the matching pathway.
#[derive(Debug, Clone)]
pub struct Config {
    /// Model identifier sent with every request. Default: `gpt-4o`.
    pub model: String,

    /// Oracle implementation. Default: [`OracleBackend::OpenAi`].
    pub backend: OracleBackend,

    /// Base URL for the OpenAI-compatible backend.
    pub api_base: String,

    /// Bearer token for the OpenAI-compatible backend.
    pub api_key: Option<String>,

    /// Sampling temperature. Default: `0.0`.
    pub temperature: f32,

    /// Per-request HTTP timeout. Default: 120 s.
    pub request_timeout: Duration,

    /// Process-wide cap on in-flight oracle calls. Default: `200`.
    pub max_concurrent_requests: usize,

    /// Subjects per oracle request. Default: `5`.
    pub batch_size: usize,

    /// What a failed oracle call does to its corpus. Default: strict.
    pub failure_mode: FailureMode,

    /// Similarity cutoff for resolving echoed text; `None` disables fuzzy resolution.
    pub fuzzy_cutoff: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            backend: OracleBackend::default(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            temperature: DEFAULT_TEMPERATURE,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_concurrent_requests: DEFAULT_MATCH_CONCURRENCY,
            batch_size: DEFAULT_BATCH_SIZE,
            failure_mode: FailureMode::default(),
            fuzzy_cutoff: Some(DEFAULT_FUZZY_CUTOFF),
        }
    }
}

impl Config {
    const ENV_MODEL: &'static str = "CLAIMMATCH_MODEL";
    const ENV_BACKEND: &'static str = "CLAIMMATCH_BACKEND";
    const ENV_API_BASE: &'static str = "CLAIMMATCH_API_BASE";
    const ENV_API_KEY: &'static str = "OPENAI_API_KEY";
    const ENV_TEMPERATURE: &'static str = "CLAIMMATCH_TEMPERATURE";
    const ENV_REQUEST_TIMEOUT_SECS: &'static str = "CLAIMMATCH_REQUEST_TIMEOUT_SECS";
    const ENV_MAX_CONCURRENT: &'static str = "CLAIMMATCH_MAX_CONCURRENT_REQUESTS";
    const ENV_BATCH_SIZE: &'static str = "CLAIMMATCH_BATCH_SIZE";
    const ENV_FAILURE_MODE: &'static str = "CLAIMMATCH_FAILURE_MODE";
    const ENV_FUZZY_CUTOFF: &'static str = "CLAIMMATCH_FUZZY_CUTOFF";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let model = Self::parse_string_from_env(Self::ENV_MODEL, defaults.model);
        let backend = match Self::parse_optional_string_from_env(Self::ENV_BACKEND) {
            Some(value) => value.parse::<OracleBackend>()?,
            None => defaults.backend,
        };
        let api_base = Self::parse_string_from_env(Self::ENV_API_BASE, defaults.api_base);
        let api_key = Self::parse_optional_string_from_env(Self::ENV_API_KEY);
        let temperature = Self::parse_number_from_env(Self::ENV_TEMPERATURE, defaults.temperature)?;
        let request_timeout = Duration::from_secs(Self::parse_number_from_env(
            Self::ENV_REQUEST_TIMEOUT_SECS,
            defaults.request_timeout.as_secs(),
        )?);
        let max_concurrent_requests =
            Self::parse_number_from_env(Self::ENV_MAX_CONCURRENT, defaults.max_concurrent_requests)?;
        let batch_size = Self::parse_number_from_env(Self::ENV_BATCH_SIZE, defaults.batch_size)?;
        let failure_mode = match Self::parse_optional_string_from_env(Self::ENV_FAILURE_MODE) {
            Some(value) => value
                .parse::<FailureMode>()
                .map_err(|_| ConfigError::UnknownFailureMode { value })?,
            None => defaults.failure_mode,
        };
        let fuzzy_cutoff = match Self::parse_optional_string_from_env(Self::ENV_FUZZY_CUTOFF) {
            Some(value) => parse_fuzzy_cutoff(&value)?,
            None => defaults.fuzzy_cutoff,
        };

        Ok(Self {
            model,
            backend,
            api_base,
            api_key,
            temperature,
            request_timeout,
            max_concurrent_requests,
            batch_size,
            failure_mode,
            fuzzy_cutoff,
        })
    }

    /// Validates basic invariants. Does not contact the oracle.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroValue { name: "batch size" });
        }
        if self.max_concurrent_requests == 0 {
            return Err(ConfigError::ZeroValue {
                name: "max concurrent requests",
            });
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidTemperature {
                value: self.temperature,
            });
        }
        if let Some(cutoff) = self.fuzzy_cutoff
            && !(0.0..=1.0).contains(&cutoff)
        {
            return Err(ConfigError::InvalidFuzzyCutoff { value: cutoff });
        }
        if self.backend == OracleBackend::OpenAi && self.api_key.is_none() {
            return Err(ConfigError::MissingEnvVar {
                name: Self::ENV_API_KEY,
            });
        }
        Ok(())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_number_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match Self::parse_optional_string_from_env(var_name) {
            Some(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidNumber {
                name: var_name,
                reason: e.to_string(),
                value,
            }),
            None => Ok(default),
        }
    }
}

/// Parses a cutoff value; `off` or `0` disables fuzzy resolution.
pub fn parse_fuzzy_cutoff(value: &str) -> Result<Option<f64>, ConfigError> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("off") {
        return Ok(None);
    }
    let cutoff: f64 = trimmed.parse().map_err(|e: std::num::ParseFloatError| {
        ConfigError::InvalidNumber {
            name: "CLAIMMATCH_FUZZY_CUTOFF",
            value: value.to_string(),
            reason: e.to_string(),
        }
    })?;
    if !(0.0..=1.0).contains(&cutoff) {
        return Err(ConfigError::InvalidFuzzyCutoff { value: cutoff });
    }
    Ok((cutoff > 0.0).then_some(cutoff))
}
