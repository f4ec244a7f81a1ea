use super::*;
use serial_test::serial;
use std::env;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_claimmatch_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("CLAIMMATCH_MODEL");
        env::remove_var("CLAIMMATCH_BACKEND");
        env::remove_var("CLAIMMATCH_API_BASE");
        env::remove_var("OPENAI_API_KEY");
        env::remove_var("CLAIMMATCH_TEMPERATURE");
        env::remove_var("CLAIMMATCH_REQUEST_TIMEOUT_SECS");
        env::remove_var("CLAIMMATCH_MAX_CONCURRENT_REQUESTS");
        env::remove_var("CLAIMMATCH_BATCH_SIZE");
        env::remove_var("CLAIMMATCH_FAILURE_MODE");
        env::remove_var("CLAIMMATCH_FUZZY_CUTOFF");
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.model, "gpt-4o");
    assert_eq!(config.backend, OracleBackend::OpenAi);
    assert_eq!(config.api_base, "https://api.openai.com/v1");
    assert!(config.api_key.is_none());
    assert_eq!(config.temperature, 0.0);
    assert_eq!(config.max_concurrent_requests, 200);
    assert_eq!(config.batch_size, 5);
    assert_eq!(config.failure_mode, FailureMode::Strict);
    assert_eq!(config.fuzzy_cutoff, Some(0.9));
}

#[test]
#[serial]
fn test_from_env_uses_defaults_when_unset() {
    clear_claimmatch_env();
    let config = Config::from_env().unwrap();
    assert_eq!(config.model, "gpt-4o");
    assert_eq!(config.batch_size, 5);
    assert!(config.api_key.is_none());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_claimmatch_env();
    let config = with_env_vars(
        &[
            ("CLAIMMATCH_MODEL", "gpt-4o-mini"),
            ("CLAIMMATCH_BACKEND", "GenAI"),
            ("OPENAI_API_KEY", "sk-test"),
            ("CLAIMMATCH_BATCH_SIZE", "3"),
            ("CLAIMMATCH_MAX_CONCURRENT_REQUESTS", "7"),
            ("CLAIMMATCH_FAILURE_MODE", "lenient"),
            ("CLAIMMATCH_FUZZY_CUTOFF", "off"),
            ("CLAIMMATCH_REQUEST_TIMEOUT_SECS", "30"),
        ],
        Config::from_env,
    )
    .unwrap();

    assert_eq!(config.model, "gpt-4o-mini");
    assert_eq!(config.backend, OracleBackend::Genai);
    assert_eq!(config.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.batch_size, 3);
    assert_eq!(config.max_concurrent_requests, 7);
    assert_eq!(config.failure_mode, FailureMode::Lenient);
    assert_eq!(config.fuzzy_cutoff, None);
    assert_eq!(config.request_timeout, Duration::from_secs(30));
}

#[test]
#[serial]
fn test_from_env_rejects_bad_number() {
    clear_claimmatch_env();
    let result = with_env_vars(&[("CLAIMMATCH_BATCH_SIZE", "five")], Config::from_env);
    assert!(matches!(
        result,
        Err(ConfigError::InvalidNumber {
            name: "CLAIMMATCH_BATCH_SIZE",
            ..
        })
    ));
}

#[test]
#[serial]
fn test_from_env_rejects_unknown_backend() {
    clear_claimmatch_env();
    let result = with_env_vars(&[("CLAIMMATCH_BACKEND", "carrier-pigeon")], Config::from_env);
    assert!(matches!(result, Err(ConfigError::UnknownBackend { .. })));
}

#[test]
fn test_validate_requires_api_key_for_openai() {
    let config = Config::default();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::MissingEnvVar {
            name: "OPENAI_API_KEY"
        })
    ));

    let config = Config {
        api_key: Some("sk-test".to_string()),
        ..Config::default()
    };
    assert!(config.validate().is_ok());

    let config = Config {
        backend: OracleBackend::Genai,
        ..Config::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_rejects_zero_batch_and_concurrency() {
    let base = Config {
        backend: OracleBackend::Genai,
        ..Config::default()
    };

    let config = Config {
        batch_size: 0,
        ..base.clone()
    };
    assert!(matches!(config.validate(), Err(ConfigError::ZeroValue { .. })));

    let config = Config {
        max_concurrent_requests: 0,
        ..base
    };
    assert!(matches!(config.validate(), Err(ConfigError::ZeroValue { .. })));
}

#[test]
fn test_parse_fuzzy_cutoff() {
    assert_eq!(parse_fuzzy_cutoff("0.85").unwrap(), Some(0.85));
    assert_eq!(parse_fuzzy_cutoff("OFF").unwrap(), None);
    assert_eq!(parse_fuzzy_cutoff("0").unwrap(), None);
    assert!(matches!(
        parse_fuzzy_cutoff("1.5"),
        Err(ConfigError::InvalidFuzzyCutoff { .. })
    ));
    assert!(parse_fuzzy_cutoff("high").is_err());
}
