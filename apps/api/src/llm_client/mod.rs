/// LLM Client — the single point of entry for all chat-completion calls in ResumeCraft.
///
/// ARCHITECTURAL RULE: No other module may call the provider API directly.
/// Enrichment tasks depend on the `ChatCompletion` trait; `LlmClient` is the
/// production implementation talking to an OpenRouter-compatible endpoint.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::LlmSettings;

pub mod prompts;

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";
/// Sent as `X-Title` for the provider's own attribution.
const CLIENT_TITLE: &str = "ResumeCraft";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM provider is not configured: {0}")]
    Configuration(String),

    #[error("LLM provider error (status {status}): {message}")]
    Provider { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse AI response: {0}")]
    Parse(String),
}

impl LlmError {
    /// Transport failures count as provider failures; callers only see three kinds.
    pub fn is_provider_error(&self) -> bool {
        matches!(self, LlmError::Provider { .. } | LlmError::Http(_))
    }

    /// Rate limits, provider 5xx and transport failures may succeed on a later attempt.
    fn is_transient(&self) -> bool {
        match self {
            LlmError::Provider { status, .. } => *status == 429 || *status >= 500,
            LlmError::Http(e) => !e.is_decode(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One role-tagged message. Order within a conversation is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Per-call knobs. `model: None` means the client's configured default.
/// `extra` is merged into the request body last and may override core fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub extra: Map<String, Value>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            extra: Map::new(),
        }
    }
}

impl CompletionOptions {
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
            ..Self::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: Option<ProviderErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    message: Option<String>,
}

/// Something that can turn a conversation into one reply text.
///
/// Carried in `AppState` as `Arc<dyn ChatCompletion>` so tests can swap in a fake.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, LlmError>;
}

/// HTTP chat-completion client. Holds no per-call state; clones share the connection pool.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    settings: LlmSettings,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        let client = Client::builder().build()?;
        Ok(Self { client, settings })
    }

    /// The model used when a call does not name one.
    pub fn default_model(&self) -> &str {
        &self.settings.model
    }

    /// Performs one chat-completion exchange and returns the first choice's text.
    ///
    /// An empty `choices` array yields `Ok("")`; detecting unusable output is the
    /// caller's job. Transient failures are retried only when `max_retries > 0`.
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, LlmError> {
        let result = self.chat_with_retries(messages, options).await;
        if let Err(e) = &result {
            error!(
                provider_failure = e.is_provider_error(),
                "LLM completion call failed: {e}"
            );
        }
        result
    }

    async fn chat_with_retries(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, LlmError> {
        let api_key = self.settings.api_key.as_deref().ok_or_else(|| {
            LlmError::Configuration("OpenRouter API key is not configured".to_string())
        })?;

        let model = options.model.as_deref().unwrap_or(&self.settings.model);
        let body = build_request_body(model, messages, options);
        let url = format!(
            "{}{}",
            self.settings.base_url.trim_end_matches('/'),
            CHAT_COMPLETIONS_PATH
        );

        let mut attempt = 0;
        loop {
            match self.send_once(&url, api_key, &body).await {
                Ok(text) => {
                    debug!(
                        "LLM call succeeded: model={model}, content_len={}",
                        text.len()
                    );
                    return Ok(text);
                }
                Err(e) if e.is_transient() && attempt < self.settings.max_retries => {
                    attempt += 1;
                    let delay = backoff_delay(attempt);
                    warn!(
                        "LLM call attempt {} failed ({e}), retrying after {}ms...",
                        attempt,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(&self, url: &str, api_key: &str, body: &Value) -> Result<String, LlmError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.settings.app_url)
            .header("X-Title", CLIENT_TITLE)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Provider {
                status: status.as_u16(),
                message: provider_error_message(status, &body),
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        Ok(first_choice_text(completion))
    }
}

#[async_trait]
impl ChatCompletion for LlmClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, LlmError> {
        self.chat(messages, options).await
    }
}

fn build_request_body(model: &str, messages: &[ChatMessage], options: &CompletionOptions) -> Value {
    let mut body = Map::new();
    body.insert("model".to_string(), Value::from(model));
    body.insert(
        "messages".to_string(),
        serde_json::to_value(messages).unwrap_or(Value::Array(Vec::new())),
    );
    body.insert("temperature".to_string(), Value::from(options.temperature));
    body.insert("max_tokens".to_string(), Value::from(options.max_tokens));
    for (key, value) in &options.extra {
        body.insert(key.clone(), value.clone());
    }
    Value::Object(body)
}

/// Prefers the provider's `error.message`, falling back to the status reason text.
fn provider_error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ProviderErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string())
        })
}

fn first_choice_text(response: ChatCompletionResponse) -> String {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .unwrap_or_default()
}

// Exponential backoff: 1s, 2s, 4s, ... capped at 64s
fn backoff_delay(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(6);
    Duration::from_millis(1000 * (1u64 << exponent))
}
