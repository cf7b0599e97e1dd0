//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! Two layers:
//!
//! - [`StageError`]: what a single model-backed stage can fail with
//!   (the call itself failed, the payload broke its schema, or the run was cancelled)
//! - [`MentorError`]: the crate-wide error, including [`MentorError::PipelineAborted`]
//!   which tags a `StageError` with the step that was executing
//!
//! Model failures carry an [`LlmError`] classified into an [`ErrorCategory`] so callers
//! can tell an expired key from a rate limit without string matching.

use std::time::Duration;
use thiserror::Error;

use super::step::StepId;

// =============================================================================
// Error Categories
// =============================================================================

/// Classification of a failed model call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited by the provider
    RateLimit,
    /// Request exceeded the model's input capacity
    TokenLimit,
    /// Authentication failed
    Auth,
    /// Connectivity issue or timeout
    Network,
    /// Provider unavailable or model not found
    Unavailable,
    /// Request rejected as invalid
    BadRequest,
    /// Temporary server-side issue
    Transient,
    /// Anything else
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::TokenLimit => write!(f, "TOKEN_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// Whether restarting the whole run has a realistic chance of succeeding.
    ///
    /// Nothing in the crate retries on its own; this is a hint for the caller.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimit | Self::Network | Self::Transient)
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// Model call failure with category and provider context
#[derive(Debug, Clone)]
pub struct LlmError {
    pub category: ErrorCategory,
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
    /// Wait time suggested by the provider, if any
    pub retry_after: Option<Duration>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
            retry_after: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
            retry_after: None,
        }
    }

    pub fn retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps raw provider failures onto [`ErrorCategory`]
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an error message from any provider
    pub fn classify(message: &str, provider: &str) -> LlmError {
        let lower = message.to_lowercase();

        if lower.contains("rate limit")
            || lower.contains("429")
            || lower.contains("too many requests")
            || lower.contains("quota exceeded")
            || lower.contains("resource_exhausted")
        {
            return LlmError::with_provider(ErrorCategory::RateLimit, message, provider)
                .retry_after(Duration::from_secs(30));
        }

        if lower.contains("token")
            && (lower.contains("limit") || lower.contains("exceed") || lower.contains("maximum"))
            || lower.contains("context length")
            || lower.contains("context too long")
            || lower.contains("too large")
        {
            return LlmError::with_provider(ErrorCategory::TokenLimit, message, provider);
        }

        if lower.contains("auth")
            || lower.contains("401")
            || lower.contains("403")
            || lower.contains("api key")
            || lower.contains("invalid key")
            || lower.contains("permission denied")
        {
            return LlmError::with_provider(ErrorCategory::Auth, message, provider);
        }

        if lower.contains("network")
            || lower.contains("connection")
            || lower.contains("connect")
            || lower.contains("dns")
            || lower.contains("timeout")
            || lower.contains("timed out")
            || lower.contains("unreachable")
        {
            return LlmError::with_provider(ErrorCategory::Network, message, provider);
        }

        if lower.contains("503")
            || lower.contains("502")
            || lower.contains("service unavailable")
            || lower.contains("not found")
        {
            return LlmError::with_provider(ErrorCategory::Unavailable, message, provider);
        }

        if lower.contains("400") || lower.contains("bad request") || lower.contains("invalid") {
            return LlmError::with_provider(ErrorCategory::BadRequest, message, provider);
        }

        if lower.contains("500")
            || lower.contains("internal error")
            || lower.contains("overloaded")
            || lower.contains("temporary")
        {
            return LlmError::with_provider(ErrorCategory::Transient, message, provider);
        }

        LlmError::with_provider(ErrorCategory::Unknown, message, provider)
    }

    /// Classify an HTTP status code directly (more accurate than string matching)
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        match status {
            429 => LlmError::with_provider(ErrorCategory::RateLimit, message, provider)
                .retry_after(Duration::from_secs(30)),
            401 | 403 => LlmError::with_provider(ErrorCategory::Auth, message, provider),
            413 => LlmError::with_provider(ErrorCategory::TokenLimit, message, provider),
            400 => Self::classify(message, provider),
            404 => LlmError::with_provider(ErrorCategory::Unavailable, message, provider),
            500 | 502 | 503 | 504 => {
                LlmError::with_provider(ErrorCategory::Transient, message, provider)
            }
            _ => LlmError::with_provider(ErrorCategory::Unknown, message, provider),
        }
    }

    /// Classify any [`MentorError`] raised while talking to a provider
    pub fn classify_mentor_error(err: &MentorError, provider: &str) -> LlmError {
        match err {
            MentorError::Llm(llm_err) => llm_err.clone(),
            MentorError::LlmApi(msg) => Self::classify(msg, provider),
            MentorError::Timeout { .. } => {
                LlmError::with_provider(ErrorCategory::Network, err.to_string(), provider)
            }
            MentorError::Io(_) => {
                LlmError::with_provider(ErrorCategory::Network, err.to_string(), provider)
            }
            MentorError::Config(_) => {
                LlmError::with_provider(ErrorCategory::BadRequest, err.to_string(), provider)
            }
            _ => LlmError::with_provider(ErrorCategory::Unknown, err.to_string(), provider),
        }
    }
}

// =============================================================================
// Stage Error
// =============================================================================

/// Discriminant of [`StageError`], handy for assertions and log fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageErrorKind {
    ModelCallFailure,
    SchemaViolation,
    Cancelled,
}

impl std::fmt::Display for StageErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ModelCallFailure => write!(f, "model_call_failure"),
            Self::SchemaViolation => write!(f, "schema_violation"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Failure of a single structured model call
#[derive(Debug, Clone, Error)]
pub enum StageError {
    /// The call did not complete: transport, timeout, rate limit, auth
    #[error("model call failed: {0}")]
    ModelCallFailure(LlmError),

    /// The call completed but the payload does not match the expected shape
    #[error("response violates schema '{schema}': {detail}")]
    SchemaViolation {
        schema: String,
        detail: String,
        raw: String,
    },

    #[error("cancelled")]
    Cancelled,
}

impl StageError {
    pub fn kind(&self) -> StageErrorKind {
        match self {
            Self::ModelCallFailure(_) => StageErrorKind::ModelCallFailure,
            Self::SchemaViolation { .. } => StageErrorKind::SchemaViolation,
            Self::Cancelled => StageErrorKind::Cancelled,
        }
    }

    pub fn schema_violation(
        schema: impl Into<String>,
        detail: impl Into<String>,
        raw: impl Into<String>,
    ) -> Self {
        Self::SchemaViolation {
            schema: schema.into(),
            detail: detail.into(),
            raw: raw.into(),
        }
    }

    /// Raw model payload, when the call got that far
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::SchemaViolation { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

impl From<LlmError> for StageError {
    fn from(err: LlmError) -> Self {
        StageError::ModelCallFailure(err)
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum MentorError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // -------------------------------------------------------------------------
    // LLM Errors
    // -------------------------------------------------------------------------
    #[error("LLM error: {0}")]
    Llm(LlmError),

    /// Unclassified provider failure, classified later by the caller
    #[error("LLM API error: {0}")]
    LlmApi(String),

    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Pipeline Errors
    // -------------------------------------------------------------------------
    /// A stage failed; the run produced no report
    #[error("Analysis aborted during {at_step}: {cause}")]
    PipelineAborted { at_step: StepId, cause: StageError },

    #[error("Invalid step transition: {from} -> {to}")]
    InvalidTransition { from: StepId, to: StepId },

    /// Assembly was attempted before every stage produced a result
    #[error("Analysis incomplete: missing {missing} result")]
    IncompleteRun { missing: StepId },

    // -------------------------------------------------------------------------
    // Chat Errors
    // -------------------------------------------------------------------------
    #[error("Chat reply failed: {0}")]
    Chat(StageError),

    #[error("Message is empty")]
    EmptyMessage,

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Ingestion failed for {path}: {message}")]
    Ingest { path: String, message: String },
}

impl From<LlmError> for MentorError {
    fn from(err: LlmError) -> Self {
        MentorError::Llm(err)
    }
}

pub type Result<T> = std::result::Result<T, MentorError>;

impl MentorError {
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    pub fn aborted(at_step: StepId, cause: StageError) -> Self {
        Self::PipelineAborted { at_step, cause }
    }

    /// Step at which an analysis run stopped, if this is a pipeline failure
    pub fn failed_step(&self) -> Option<StepId> {
        match self {
            Self::PipelineAborted { at_step, .. } => Some(*at_step),
            _ => None,
        }
    }

    /// Underlying stage failure for pipeline and chat errors
    pub fn stage_error(&self) -> Option<&StageError> {
        match self {
            Self::PipelineAborted { cause, .. } | Self::Chat(cause) => Some(cause),
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::RateLimit.to_string(), "RATE_LIMIT");
        assert_eq!(ErrorCategory::TokenLimit.to_string(), "TOKEN_LIMIT");
        assert_eq!(ErrorCategory::Auth.to_string(), "AUTH");
    }

    #[test]
    fn test_classify_rate_limit() {
        let err = ErrorClassifier::classify("Rate limit exceeded, please retry", "gemini");
        assert_eq!(err.category, ErrorCategory::RateLimit);
        assert!(err.category.is_transient());
        assert_eq!(err.retry_after, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_classify_token_limit() {
        let err = ErrorClassifier::classify(
            "The input token count (1200000) exceeds the maximum number of tokens allowed",
            "gemini",
        );
        assert_eq!(err.category, ErrorCategory::TokenLimit);
        assert!(!err.category.is_transient());
    }

    #[test]
    fn test_classify_auth() {
        let err = ErrorClassifier::classify("API key not valid. Please pass a valid API key.", "gemini");
        assert_eq!(err.category, ErrorCategory::Auth);
    }

    #[test]
    fn test_classify_network() {
        let err = ErrorClassifier::classify("Connection timed out after 30s", "ollama");
        assert_eq!(err.category, ErrorCategory::Network);
    }

    #[test]
    fn test_classify_unknown() {
        let err = ErrorClassifier::classify("Something weird happened", "test");
        assert_eq!(err.category, ErrorCategory::Unknown);
        assert_eq!(err.provider.as_deref(), Some("test"));
    }

    #[test]
    fn test_classify_http_status() {
        let rate_limit = ErrorClassifier::classify_http_status(429, "Rate limited", "test");
        assert_eq!(rate_limit.category, ErrorCategory::RateLimit);

        let auth = ErrorClassifier::classify_http_status(401, "Unauthorized", "test");
        assert_eq!(auth.category, ErrorCategory::Auth);

        let too_large = ErrorClassifier::classify_http_status(413, "Payload too large", "test");
        assert_eq!(too_large.category, ErrorCategory::TokenLimit);

        let server_error = ErrorClassifier::classify_http_status(500, "Server error", "test");
        assert_eq!(server_error.category, ErrorCategory::Transient);
    }

    #[test]
    fn test_classify_timeout_as_network() {
        let err = MentorError::timeout("understanding stage", Duration::from_secs(5));
        let llm = ErrorClassifier::classify_mentor_error(&err, "gemini");
        assert_eq!(llm.category, ErrorCategory::Network);
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::with_provider(ErrorCategory::RateLimit, "Too many requests", "openai");
        assert_eq!(err.to_string(), "[openai:RATE_LIMIT] Too many requests");

        let err_no_provider = LlmError::new(ErrorCategory::Network, "Connection failed");
        assert_eq!(err_no_provider.to_string(), "[NETWORK] Connection failed");
    }

    #[test]
    fn test_stage_error_kind_and_raw() {
        let violation = StageError::schema_violation("understanding", "missing 'summary'", "{}");
        assert_eq!(violation.kind(), StageErrorKind::SchemaViolation);
        assert_eq!(violation.raw_response(), Some("{}"));

        let failure = StageError::from(LlmError::new(ErrorCategory::Auth, "bad key"));
        assert_eq!(failure.kind(), StageErrorKind::ModelCallFailure);
        assert!(failure.raw_response().is_none());

        assert_eq!(StageError::Cancelled.kind(), StageErrorKind::Cancelled);
    }

    #[test]
    fn test_pipeline_aborted_accessors() {
        let err = MentorError::aborted(StepId::Architecture, StageError::Cancelled);
        assert_eq!(err.failed_step(), Some(StepId::Architecture));
        assert_eq!(err.stage_error().map(StageError::kind), Some(StageErrorKind::Cancelled));
        assert_eq!(err.to_string(), "Analysis aborted during architecture: cancelled");
    }
}
