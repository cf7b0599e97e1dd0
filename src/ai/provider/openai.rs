//! OpenAI API Provider
//!
//! LLM provider using OpenAI's Chat Completions API.
//! Structured calls use `json_object` mode with the schema embedded in the system prompt.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::{
    ChatRequest, ChatRole, LlmProvider, LlmResponse, ModelRequest, ProviderConfig,
    ResponseMetadata, ResponseTiming, TokenUsage, error_from_response, error_from_transport,
    prompt_utils,
};
use crate::types::{ErrorCategory, LlmError, MentorError, Result};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";
const PROVIDER: &str = "openai";

const STRUCTURED_SYSTEM: &str = "You are a senior software reviewer. Always respond with valid JSON.";

/// OpenAI API Provider with secure API key handling
pub struct OpenAiProvider {
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key_str = config
            .api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                MentorError::Config(
                    "OpenAI API key not found. Set OPENAI_API_KEY env var or provide in config"
                        .to_string(),
                )
            })?;

        let api_base = config
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let model = config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MentorError::LlmApi(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key_str),
            api_base,
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn structured_request(&self, request: &ModelRequest) -> ChatCompletionRequest {
        let structured = !request.schema.is_null();
        let system = if structured {
            prompt_utils::build_schema_prompt(STRUCTURED_SYSTEM, &request.schema)
        } else {
            STRUCTURED_SYSTEM.to_string()
        };

        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                Message::new("system", system),
                Message::new("user", request.prompt()),
            ],
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
            response_format: structured.then(|| ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        }
    }

    fn chat_request(&self, request: ChatRequest<'_>) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(Message::new("system", request.system.to_string()));
        messages.extend(request.messages.iter().map(|m| {
            let role = match m.role {
                ChatRole::User => "user",
                ChatRole::Model => "assistant",
            };
            Message::new(role, m.text.clone())
        }));

        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
            response_format: None,
        }
    }

    async fn send(&self, request: &ChatCompletionRequest) -> Result<LlmResponse> {
        let start_time = Instant::now();
        let url = format!("{}/chat/completions", self.api_base);

        debug!("Sending request to OpenAI API");

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| error_from_transport(e, PROVIDER))?;

        if !response.status().is_success() {
            return Err(error_from_response(response, PROVIDER).await);
        }

        let response_body: ChatCompletionResponse = response.json().await.map_err(|e| {
            MentorError::Llm(LlmError::with_provider(
                ErrorCategory::Unknown,
                format!("Failed to decode OpenAI response: {}", e),
                PROVIDER,
            ))
        })?;
        let elapsed = start_time.elapsed();

        let usage = response_body
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        let choice = response_body.choices.into_iter().next();
        let finish_reason = choice.as_ref().and_then(|c| c.finish_reason.clone());
        let content = choice.and_then(|c| c.message.content).unwrap_or_default();

        Ok(LlmResponse::with_metrics(
            content,
            usage,
            ResponseTiming::from_duration(elapsed),
            ResponseMetadata {
                model: self.model.clone(),
                provider: PROVIDER.to_string(),
                finish_reason,
            },
        ))
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate(&self, request: &ModelRequest) -> Result<LlmResponse> {
        info!(
            "Generating with OpenAI (model: {}, temperature: {})",
            self.model, self.temperature
        );
        self.send(&self.structured_request(request)).await
    }

    async fn converse(&self, request: ChatRequest<'_>) -> Result<LlmResponse> {
        self.send(&self.chat_request(request)).await
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

impl Message {
    fn new(role: &str, content: String) -> Self {
        Self {
            role: role.to_string(),
            content,
        }
    }
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<UsageInfo>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageInfo {
    prompt_tokens: u32,
    completion_tokens: u32,
}
