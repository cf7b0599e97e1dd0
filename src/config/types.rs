//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/codementor/) and project (.codementor/) level configuration.

use serde::{Deserialize, Serialize};

use crate::ai::provider::ProviderConfig;
use crate::constants::{context as ctx_constants, ingest as ingest_constants, network};
use crate::types::{MentorError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Model provider used by the analysis pipeline
    pub llm: LlmConfig,

    /// Mentor chat settings
    pub chat: ChatConfig,

    /// Analysis context assembly
    pub context: ContextConfig,

    /// Folder ingestion rules
    pub ingest: IngestConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            chat: ChatConfig::default(),
            context: ContextConfig::default(),
            ingest: IngestConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `MentorError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.llm.provider.as_str(), "gemini" | "openai" | "ollama") {
            return Err(MentorError::Config(format!(
                "Unknown LLM provider '{}'. Supported: gemini, openai, ollama",
                self.llm.provider
            )));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(MentorError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(MentorError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.context.max_file_chars == 0 {
            return Err(MentorError::Config(
                "context.max_file_chars must be greater than 0".to_string(),
            ));
        }

        if self.ingest.extensions.is_empty() {
            return Err(MentorError::Config(
                "ingest.extensions must list at least one extension".to_string(),
            ));
        }

        Ok(())
    }

    /// Provider settings for the analysis pipeline
    pub fn analysis_provider(&self) -> ProviderConfig {
        self.llm.to_provider_config(None)
    }

    /// Provider settings for chat sessions, honoring `chat.model`
    pub fn chat_provider(&self) -> ProviderConfig {
        self.llm.to_provider_config(self.chat.model.clone())
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: gemini, openai, ollama
    pub provider: String,

    /// Model name (provider default when unset)
    pub model: Option<String>,

    /// Request timeout in seconds, applied to every model call
    pub timeout_secs: u64,

    /// Temperature for generation
    pub temperature: f32,

    /// Maximum tokens to generate per call
    pub max_tokens: usize,

    /// API key; falls back to provider env vars. Never written back out.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Custom endpoint
    pub api_base: Option<String>,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.2,
            max_tokens: 8192,
            api_key: None,
            api_base: None,
        }
    }
}

impl LlmConfig {
    fn to_provider_config(&self, model_override: Option<String>) -> ProviderConfig {
        ProviderConfig {
            provider: self.provider.clone(),
            model: model_override.or_else(|| self.model.clone()),
            timeout_secs: self.timeout_secs,
            temperature: self.temperature,
            api_key: self.api_key.clone(),
            api_base: self.api_base.clone(),
            max_tokens: self.max_tokens,
        }
    }
}

// =============================================================================
// Chat Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Chat model override; chat usually runs on a faster model than analysis
    pub model: Option<String>,
}

// =============================================================================
// Context Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Per-file character cap in the analysis context
    pub max_file_chars: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_file_chars: ctx_constants::MAX_FILE_CHARS,
        }
    }
}

// =============================================================================
// Ingest Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Text file extensions to include (without dot)
    pub extensions: Vec<String>,

    /// Directory names skipped anywhere in the tree
    pub ignored_dirs: Vec<String>,

    /// Additional glob exclude patterns
    pub exclude: Vec<String>,

    /// Files larger than this are skipped (bytes)
    pub max_file_size: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            extensions: ingest_constants::TEXT_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ignored_dirs: ingest_constants::IGNORED_DIRS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude: Vec::new(),
            max_file_size: ingest_constants::MAX_FILE_SIZE,
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
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.context.max_file_chars, 4000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.llm.temperature = 3.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.llm.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.context.max_file_chars = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.llm.provider = "claude-code".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_chat_provider_uses_override() {
        let mut config = Config::default();
        config.llm.model = Some("gemini-2.5-pro".to_string());
        config.chat.model = Some("gemini-2.5-flash".to_string());

        assert_eq!(config.analysis_provider().model.as_deref(), Some("gemini-2.5-pro"));
        assert_eq!(config.chat_provider().model.as_deref(), Some("gemini-2.5-flash"));
    }

    #[test]
    fn test_api_key_not_serialized_or_debugged() {
        let mut config = Config::default();
        config.llm.api_key = Some("secret-value".to_string());

        let toml_text = toml::to_string(&config).unwrap();
        assert!(!toml_text.contains("secret-value"));
        assert!(!format!("{:?}", config.llm).contains("secret-value"));
    }
}
