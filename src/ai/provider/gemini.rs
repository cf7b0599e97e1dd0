//! Google Gemini Provider
//!
//! Uses the `generateContent` REST endpoint. Structured calls set
//! `responseMimeType: application/json` with a `responseSchema`, chat calls pass the
//! bound project context as `systemInstruction` and the history as `contents`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::{
    ChatRequest, ChatRole, LlmProvider, LlmResponse, ModelRequest, ProviderConfig,
    ResponseMetadata, ResponseTiming, TokenUsage, error_from_response, error_from_transport,
};
use crate::types::{ErrorCategory, LlmError, MentorError, Result};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-pro";
const PROVIDER: &str = "gemini";

/// Gemini provider with secure API key handling
pub struct GeminiProvider {
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl GeminiProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .or_else(|| std::env::var("API_KEY").ok())
            .ok_or_else(|| {
                MentorError::Config(
                    "Gemini API key not found. Set GEMINI_API_KEY env var or provide in config"
                        .to_string(),
                )
            })?;

        let api_base = config
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(
                crate::constants::network::CONNECTION_TIMEOUT_SECS,
            ))
            .build()
            .map_err(|e| MentorError::LlmApi(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            api_base,
            model: config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    fn generation_config(&self, schema: Option<&Value>) -> GenerationConfig {
        GenerationConfig {
            temperature: self.temperature,
            max_output_tokens: self.max_tokens,
            response_mime_type: schema.map(|_| "application/json".to_string()),
            response_schema: schema.map(to_gemini_schema),
        }
    }

    async fn send(&self, body: &GenerateContentRequest) -> Result<LlmResponse> {
        let start_time = Instant::now();

        let response = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| error_from_transport(e, PROVIDER))?;

        if !response.status().is_success() {
            return Err(error_from_response(response, PROVIDER).await);
        }

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            MentorError::Llm(LlmError::with_provider(
                ErrorCategory::Unknown,
                format!("Failed to decode Gemini response: {}", e),
                PROVIDER,
            ))
        })?;
        let elapsed = start_time.elapsed();

        if let Some(feedback) = &body.prompt_feedback
            && let Some(reason) = &feedback.block_reason
        {
            return Err(MentorError::Llm(LlmError::with_provider(
                ErrorCategory::BadRequest,
                format!("Prompt blocked by Gemini: {}", reason),
                PROVIDER,
            )));
        }

        let candidate = body.candidates.into_iter().next();
        let finish_reason = candidate.as_ref().and_then(|c| c.finish_reason.clone());
        let text = candidate
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        debug!(
            "Gemini returned {} chars (finish_reason: {:?})",
            text.len(),
            finish_reason
        );

        let usage = body
            .usage_metadata
            .map(|u| TokenUsage::new(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();

        Ok(LlmResponse::with_metrics(
            text,
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
impl LlmProvider for GeminiProvider {
    async fn generate(&self, request: &ModelRequest) -> Result<LlmResponse> {
        info!(
            "Generating with Gemini (model: {}, temperature: {})",
            self.model, self.temperature
        );

        let schema = (!request.schema.is_null()).then_some(&request.schema);
        let body = GenerateContentRequest {
            system_instruction: None,
            contents: vec![Content::text("user", request.prompt())],
            generation_config: self.generation_config(schema),
        };

        self.send(&body).await
    }

    async fn converse(&self, request: ChatRequest<'_>) -> Result<LlmResponse> {
        debug!(
            "Gemini chat turn (model: {}, history: {})",
            self.model,
            request.messages.len()
        );

        let contents = request
            .messages
            .iter()
            .map(|m| {
                let role = match m.role {
                    ChatRole::User => "user",
                    ChatRole::Model => "model",
                };
                Content::text(role, m.text.clone())
            })
            .collect();

        let body = GenerateContentRequest {
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part {
                    text: Some(request.system.to_string()),
                }],
            }),
            contents,
            generation_config: self.generation_config(None),
        };

        self.send(&body).await
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Convert a JSON Schema into Gemini's OpenAPI-subset schema.
///
/// Type names are upper-cased and keywords Gemini rejects are dropped.
fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, value) in map {
                match key.as_str() {
                    "additionalProperties" | "$schema" | "title" | "minimum" | "maximum" => {}
                    "type" => {
                        let upper = value
                            .as_str()
                            .map(|t| Value::String(t.to_ascii_uppercase()))
                            .unwrap_or_else(|| value.clone());
                        out.insert(key.clone(), upper);
                    }
                    "properties" => {
                        let props = value
                            .as_object()
                            .map(|props| {
                                props
                                    .iter()
                                    .map(|(k, v)| (k.clone(), to_gemini_schema(v)))
                                    .collect::<Map<_, _>>()
                            })
                            .unwrap_or_default();
                        out.insert(key.clone(), Value::Object(props));
                    }
                    "items" => {
                        out.insert(key.clone(), to_gemini_schema(value));
                    }
                    _ => {
                        out.insert(key.clone(), value.clone());
                    }
                }
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: &str, text: String) -> Self {
        Self {
            role: Some(role.to_string()),
            parts: vec![Part { text: Some(text) }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}
