//! OpenAI chat completions integration.
//!
//! Implements the standard generation tier, and provides the transport the
//! enhanced tier reuses.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::prompts::{optimize_prompt, outline_prompt};
use super::{GenerationError, GenerationProvider, GenerationRequest, GenerationTier};
use crate::core::{
    get_or_warn, AiConfig, ConfigStore, InstructionKind, PlatformConstraints, API_KEY_KEY,
    MODEL_KEY,
};

/// Sampling parameters passed through to the endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: Option<f32>,
}

impl Default for RequestParams {
    fn default() -> Self {
        let ai = AiConfig::default();
        Self { model: ai.model, temperature: ai.temperature, max_tokens: ai.max_tokens, top_p: None }
    }
}

/// OpenAI API provider.
pub struct OpenAIProvider {
    client: Client,
    store: Arc<dyn ConfigStore>,
    env_api_key: Option<String>,
    base_url: String,
    params: RequestParams,
    model_from_store: bool,
    constraints: PlatformConstraints,
}

impl OpenAIProvider {
    /// Create a provider that reads its credential and model from `store`.
    ///
    /// The `OPENAI_API_KEY` environment variable is used when the store has
    /// no credential.
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self {
            client: Client::new(),
            store,
            env_api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            base_url: AiConfig::default().base_url,
            params: RequestParams::default(),
            model_from_store: true,
            constraints: PlatformConstraints::builtin(),
        }
    }

    /// Create a provider from the `[ai]` config section.
    pub fn from_config(store: Arc<dyn ConfigStore>, config: &AiConfig) -> Self {
        Self::new(store).with_base_url(&config.base_url).with_params(RequestParams {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            top_p: None,
        })
    }

    /// Use a custom base URL (for compatible APIs).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_params(mut self, params: RequestParams) -> Self {
        self.params = params;
        self
    }

    /// Pin the model, ignoring the model preference in the store.
    pub fn with_fixed_model(mut self, model: impl Into<String>) -> Self {
        self.params.model = model.into();
        self.model_from_store = false;
        self
    }

    /// Replace the fallback credential normally read from the environment.
    pub fn with_env_api_key(mut self, key: Option<String>) -> Self {
        self.env_api_key = key;
        self
    }

    pub fn with_constraints(mut self, constraints: PlatformConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub(crate) fn constraints(&self) -> &PlatformConstraints {
        &self.constraints
    }

    /// Model that the next request will use.
    pub fn model(&self) -> String {
        if self.model_from_store {
            if let Some(model) = get_or_warn(self.store.as_ref(), MODEL_KEY) {
                return model;
            }
        }
        self.params.model.clone()
    }

    fn api_key(&self) -> Option<String> {
        get_or_warn(self.store.as_ref(), API_KEY_KEY).or_else(|| self.env_api_key.clone())
    }

    /// Whether a credential is configured.
    pub fn has_credential(&self) -> bool {
        self.api_key().is_some()
    }

    /// Send one system + user message pair and return the first completion.
    pub(crate) async fn complete(
        &self,
        system: &str,
        user_message: &str,
    ) -> Result<String, GenerationError> {
        let api_key = self.api_key().ok_or_else(GenerationError::missing_credential)?;

        let request = ChatRequest {
            model: self.model(),
            messages: vec![
                ChatMessage { role: "system".to_string(), content: system.to_string() },
                ChatMessage { role: "user".to_string(), content: user_message.to_string() },
            ],
            temperature: Some(self.params.temperature),
            max_tokens: Some(self.params.max_tokens),
            top_p: self.params.top_p,
        };

        tracing::debug!(model = %request.model, url = %self.base_url, "Sending completion request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::transport(None, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::transport(Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            return Err(GenerationError::transport(
                Some(status.as_u16()),
                format!("API request failed with status {}: {}", status.as_u16(), error_message(&body)),
            ));
        }

        parse_completion(&body)
    }
}

#[async_trait]
impl GenerationProvider for OpenAIProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let user_message = match (request.kind, request.platform) {
            (InstructionKind::Optimize, Some(platform)) => {
                optimize_prompt(&request.prompt, platform, &self.constraints)
            }
            _ => outline_prompt(&request.prompt, request.content_type),
        };

        self.complete(&request.instruction, &user_message).await
    }

    fn tier(&self) -> GenerationTier {
        GenerationTier::Standard
    }

    fn name(&self) -> &str {
        "openai"
    }
}

impl fmt::Debug for OpenAIProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIProvider")
            .field("base_url", &self.base_url)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Pull the first completion out of a response body.
fn parse_completion(body: &str) -> Result<String, GenerationError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::malformed(format!("Invalid response body: {e}")))?;

    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| GenerationError::malformed("No completion in response"))?;

    if text.trim().is_empty() {
        return Err(GenerationError::malformed("Completion was empty"));
    }
    Ok(text)
}

/// Best-effort message from an error body.
///
/// Understands both `{"error": {"message": ...}}` and the flat
/// `{"errorCode": ..., "message": ...}` envelope.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error: Some(detail), .. }) => detail.message,
        Ok(ErrorEnvelope { error_code: Some(code), message: Some(message), .. }) => {
            format!("{code}: {message}")
        }
        Ok(ErrorEnvelope { message: Some(message), .. }) => message,
        _ => "Unknown error".to_string(),
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
    #[serde(rename = "errorCode")]
    error_code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}
