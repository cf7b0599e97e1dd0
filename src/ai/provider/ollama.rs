//! Ollama Local LLM Provider
//!
//! LLM provider for locally-running Ollama models via `/api/chat`.
//! Structured calls pass the JSON schema as `format`, which Ollama enforces natively.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{
    ChatRequest, ChatRole, LlmProvider, LlmResponse, ModelRequest, ProviderConfig,
    ResponseMetadata, ResponseTiming, TokenUsage, error_from_response, prompt_utils,
};
use crate::types::{ErrorCategory, LlmError, MentorError, Result};

const DEFAULT_API_BASE: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3:latest";
const PROVIDER: &str = "ollama";

/// Ollama Local LLM Provider
pub struct OllamaProvider {
    api_base: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_base = config
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let api_base = Self::validate_endpoint(&api_base)?;

        let model = config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MentorError::LlmApi(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_base,
            model,
            temperature: config.temperature,
            client,
        })
    }

    /// Only http/https endpoints are accepted; non-local hosts are logged.
    fn validate_endpoint(endpoint: &str) -> Result<String> {
        let url = url::Url::parse(endpoint).map_err(|e| {
            MentorError::Config(format!("Invalid Ollama endpoint URL '{}': {}", endpoint, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(MentorError::Config(format!(
                "Ollama endpoint must use http or https scheme, got: {}",
                url.scheme()
            )));
        }

        if let Some(host) = url.host_str()
            && !matches!(host, "localhost" | "127.0.0.1" | "[::1]" | "::1")
        {
            warn!(
                "Ollama endpoint is not localhost: {}. Ensure this is intentional.",
                host
            );
        }

        let mut result = url.to_string();
        if result.ends_with('/') {
            result.pop();
        }
        Ok(result)
    }

    fn structured_request(&self, request: &ModelRequest) -> OllamaChatRequest {
        let format = if request.schema.is_null() {
            None
        } else {
            Some(request.schema.clone())
        };

        OllamaChatRequest {
            model: self.model.clone(),
            messages: vec![OllamaMessage {
                role: "user".to_string(),
                content: prompt_utils::build_schema_prompt(&request.prompt(), &request.schema),
            }],
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
            },
            format,
        }
    }

    fn chat_request(&self, request: ChatRequest<'_>) -> OllamaChatRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(OllamaMessage {
            role: "system".to_string(),
            content: request.system.to_string(),
        });
        messages.extend(request.messages.iter().map(|m| OllamaMessage {
            role: match m.role {
                ChatRole::User => "user".to_string(),
                ChatRole::Model => "assistant".to_string(),
            },
            content: m.text.clone(),
        }));

        OllamaChatRequest {
            model: self.model.clone(),
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
            },
            format: None,
        }
    }

    async fn send(&self, request: &OllamaChatRequest) -> Result<LlmResponse> {
        let start_time = Instant::now();
        let url = format!("{}/api/chat", self.api_base);

        debug!("Sending request to Ollama API");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_connect() {
                    format!(
                        "Failed to connect to Ollama at {}. Is Ollama running? Start with: ollama serve",
                        self.api_base
                    )
                } else {
                    format!("Ollama request failed: {}", e)
                };
                MentorError::Llm(LlmError::with_provider(
                    ErrorCategory::Network,
                    message,
                    PROVIDER,
                ))
            })?;

        if !response.status().is_success() {
            return Err(error_from_response(response, PROVIDER).await);
        }

        let response_body: OllamaChatResponse = response.json().await.map_err(|e| {
            MentorError::Llm(LlmError::with_provider(
                ErrorCategory::Unknown,
                format!("Failed to decode Ollama response: {}", e),
                PROVIDER,
            ))
        })?;
        let elapsed = start_time.elapsed();

        let usage = TokenUsage::new(
            response_body.prompt_eval_count.unwrap_or(0),
            response_body.eval_count.unwrap_or(0),
        );

        Ok(LlmResponse::with_metrics(
            response_body.message.content,
            usage,
            ResponseTiming::from_duration(elapsed),
            ResponseMetadata {
                model: self.model.clone(),
                provider: PROVIDER.to_string(),
                finish_reason: response_body.done_reason,
            },
        ))
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn generate(&self, request: &ModelRequest) -> Result<LlmResponse> {
        info!(
            "Generating with Ollama (model: {}, temperature: {})",
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
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    options: OllamaOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> ProviderConfig {
        ProviderConfig {
            provider: "ollama".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let provider = OllamaProvider::new(config()).expect("Failed to create provider");
        assert_eq!(provider.api_base, DEFAULT_API_BASE);
        assert_eq!(provider.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        let result = OllamaProvider::new(ProviderConfig {
            api_base: Some("file:///etc/passwd".to_string()),
            ..config()
        });
        assert!(matches!(result, Err(MentorError::Config(_))));
    }

    #[test]
    fn test_structured_request_sets_format() {
        let provider = OllamaProvider::new(config()).unwrap();
        let schema = json!({"type": "object"});
        let body = provider.structured_request(&ModelRequest::new("Review", "ctx", schema.clone()));

        assert_eq!(body.format, Some(schema));
        assert!(!body.stream);
        assert!(body.messages[0].content.starts_with("Review\n\nctx"));
    }
}
