use std::sync::Arc;
use std::time::Instant;

use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
};
use async_trait::async_trait;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use tracing::debug;

use super::error::{OracleError, OracleResult};
use crate::config::{Config, OracleBackend};

#[async_trait]
/// Black-box text-completion service used as the match judge and extractor.
///
/// Model and temperature are bound when the oracle is constructed, so call sites only pass
/// the prompt.
pub trait Oracle: Send + Sync {
    /// Returns the completion text for `prompt`.
    async fn complete(&self, prompt: &str) -> OracleResult<String>;

    /// Model identifier used for every call.
    fn model(&self) -> &str;
}

/// Builds the oracle selected by `config.backend`.
pub fn build_oracle(config: &Config) -> OracleResult<Arc<dyn Oracle>> {
    match config.backend {
        OracleBackend::OpenAi => Ok(Arc::new(OpenAiOracle::new(config)?)),
        OracleBackend::Genai => Ok(Arc::new(GenaiOracle::new(config))),
    }
}

/// OpenAI-compatible `/chat/completions` client.
///
/// Any non-2xx answer becomes [`OracleError::Status`] carrying the status and body.
pub struct OpenAiOracle {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl std::fmt::Debug for OpenAiOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiOracle")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl OpenAiOracle {
    /// Creates a client from `config`. Fails without an API key.
    pub fn new(config: &Config) -> OracleResult<Self> {
        let api_key = config.api_key.clone().ok_or(OracleError::MissingApiKey)?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: chat_completions_url(&config.api_base),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    fn build_request(&self, prompt: &str) -> OracleResult<CreateChatCompletionRequest> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| OracleError::InvalidRequest(e.to_string()))?;

        CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([ChatCompletionRequestMessage::User(message)])
            .temperature(self.temperature)
            .build()
            .map_err(|e| OracleError::InvalidRequest(e.to_string()))
    }
}

#[async_trait]
impl Oracle for OpenAiOracle {
    async fn complete(&self, prompt: &str) -> OracleResult<String> {
        let started = Instant::now();
        let request = self.build_request(prompt)?;

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CreateChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| OracleError::MalformedEnvelope(e.to_string()))?;

        debug!(
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Oracle request completed"
        );

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(OracleError::EmptyResponse)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Provider-agnostic oracle backed by `genai` (provider inferred from the model name).
pub struct GenaiOracle {
    client: genai::Client,
    model: String,
    options: ChatOptions,
}

impl GenaiOracle {
    /// Creates a client using `genai`'s default provider resolution.
    pub fn new(config: &Config) -> Self {
        Self {
            client: genai::Client::default(),
            model: config.model.clone(),
            options: ChatOptions::default().with_temperature(f64::from(config.temperature)),
        }
    }
}

#[async_trait]
impl Oracle for GenaiOracle {
    async fn complete(&self, prompt: &str) -> OracleResult<String> {
        let started = Instant::now();
        let request = ChatRequest::new(vec![ChatMessage::user(prompt)]);

        let response = self
            .client
            .exec_chat(&self.model, request, Some(&self.options))
            .await
            .map_err(|e| OracleError::Provider(e.to_string()))?;

        debug!(
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Oracle request completed"
        );

        response
            .first_text()
            .map(str::to_string)
            .filter(|content| !content.trim().is_empty())
            .ok_or(OracleError::EmptyResponse)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Joins an API base and the completions path without doubling slashes.
pub fn chat_completions_url(api_base: &str) -> String {
    format!("{}/chat/completions", api_base.trim_end_matches('/'))
}
