//! AI Integration Layer
//!
//! Model providers, response validation, timeouts and usage metrics.

pub mod metrics;
pub mod provider;
pub mod timeout;
pub mod validation;

pub use metrics::{MetricsCollector, MetricsSummary, SharedMetrics, StageMetrics};
pub use provider::{
    ChatRequest, ErrorCategory, ErrorClassifier, GeminiProvider, LlmError, LlmProvider,
    LlmResponse, ModelRequest, OllamaProvider, OpenAiProvider, ProviderConfig, ResponseMetadata,
    ResponseTiming, SharedProvider, TokenUsage, create_provider,
};
pub use timeout::{TimeoutConfig, with_timeout};
pub use validation::{
    Field, FieldKind, JsonRepairer, RepairFailure, Schema, Violation, extract_json_from_response,
};
