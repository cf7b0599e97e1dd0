//! LLM Provider Abstraction
//!
//! Defines the `LlmProvider` trait, the single boundary to an external model.
//! Two call shapes exist:
//!
//! - `generate`: one-shot, schema-constrained generation used by analysis stages
//! - `converse`: multi-turn chat under a fixed system instruction
//!
//! Providers return the raw model text. Parsing and schema checks happen in the
//! stage executor so every provider is validated the same way.

mod gemini;
mod ollama;
mod openai;
mod prompt_utils;

pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

pub use crate::types::{ChatMessage, ChatRole, ErrorCategory, ErrorClassifier, LlmError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::types::{MentorError, Result};

// =============================================================================
// Requests
// =============================================================================

/// One schema-constrained generation request
#[derive(Debug, Clone)]
pub struct ModelRequest {
    /// Role and task instruction for this call
    pub instruction: String,
    /// Project context plus any prior structured results
    pub context: String,
    /// JSON Schema the response must satisfy (`Value::Null` for free text)
    pub schema: Value,
}

impl ModelRequest {
    pub fn new(instruction: impl Into<String>, context: impl Into<String>, schema: Value) -> Self {
        Self {
            instruction: instruction.into(),
            context: context.into(),
            schema,
        }
    }

    /// Instruction and context as a single prompt body
    pub fn prompt(&self) -> String {
        if self.context.is_empty() {
            self.instruction.clone()
        } else {
            format!("{}\n\n{}", self.instruction, self.context)
        }
    }
}

/// One chat turn request: fixed system text plus the full history, last entry from the user
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub system: &'a str,
    pub messages: &'a [ChatMessage],
}

// =============================================================================
// LLM Response with Usage Metrics
// =============================================================================

#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Raw model text
    pub content: String,
    pub usage: TokenUsage,
    /// Cost in USD when the provider reports it
    pub cost_usd: f64,
    pub timing: ResponseTiming,
    pub metadata: ResponseMetadata,
}

impl LlmResponse {
    pub fn with_metrics(
        content: String,
        usage: TokenUsage,
        timing: ResponseTiming,
        metadata: ResponseMetadata,
    ) -> Self {
        Self {
            content,
            usage,
            cost_usd: 0.0,
            timing,
            metadata,
        }
    }
}

/// Token usage metrics for cost tracking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResponseTiming {
    /// Wall clock time in milliseconds
    pub total_ms: u64,
}

impl ResponseTiming {
    pub fn from_duration(duration: std::time::Duration) -> Self {
        Self {
            total_ms: duration.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResponseMetadata {
    pub model: String,
    pub provider: String,
    /// Provider-reported stop reason, if any
    pub finish_reason: Option<String>,
}

/// Shared provider handle, cloned into pipelines and chat sessions
pub type SharedProvider = Arc<dyn LlmProvider>;

// =============================================================================
// Provider Configuration
// =============================================================================

/// Configuration for LLM providers
///
/// API keys are never serialized and are redacted in debug output.
/// Each provider converts the key to `SecretString` internally.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type: "gemini", "openai", "ollama"
    pub provider: String,
    /// Model name (provider default when unset)
    pub model: Option<String>,
    pub timeout_secs: u64,
    pub temperature: f32,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

fn default_max_tokens() -> usize {
    8192
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: None,
            timeout_secs: crate::constants::network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.2,
            api_key: None,
            api_base: None,
            max_tokens: default_max_tokens(),
        }
    }
}

// =============================================================================
// LLM Provider Trait
// =============================================================================

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Single schema-constrained generation. Exactly one upstream request.
    async fn generate(&self, request: &ModelRequest) -> Result<LlmResponse>;

    /// Chat reply given the fixed system text and the full history.
    async fn converse(&self, request: ChatRequest<'_>) -> Result<LlmResponse>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;
}

/// Create a shared provider from configuration
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    match config.provider.as_str() {
        "gemini" => Ok(Arc::new(GeminiProvider::new(config.clone())?)),
        "openai" => Ok(Arc::new(OpenAiProvider::new(config.clone())?)),
        "ollama" => Ok(Arc::new(OllamaProvider::new(config.clone())?)),
        _ => Err(MentorError::Config(format!(
            "Unknown provider: {}. Supported: gemini, openai, ollama",
            config.provider
        ))),
    }
}

/// Map a non-success HTTP response onto a classified error
pub(crate) async fn error_from_response(response: reqwest::Response, provider: &str) -> MentorError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = format!("{} API error ({}): {}", provider, status, body);
    MentorError::Llm(ErrorClassifier::classify_http_status(
        status.as_u16(),
        &message,
        provider,
    ))
}

/// Map a transport failure onto a classified error
pub(crate) fn error_from_transport(err: reqwest::Error, provider: &str) -> MentorError {
    let category = if err.is_timeout() || err.is_connect() {
        ErrorCategory::Network
    } else {
        ErrorClassifier::classify(&err.to_string(), provider).category
    };
    MentorError::Llm(LlmError::with_provider(
        category,
        format!("{} request failed: {}", provider, err),
        provider,
    ))
}
