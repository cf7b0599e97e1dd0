//! codementor - LLM-Driven Project Review and Mentor Chat
//!
//! Feeds a source project through a fixed five-stage model pipeline and
//! returns one structured report, then keeps a chat session grounded in the
//! same files for follow-up questions.
//!
//! ## Pipeline
//!
//! 1. **Understanding**: summary, tech stack, base score
//! 2. **Architecture**: dominant pattern with pros and cons
//! 3. **Resilience Audit**: security issues and optimizations
//! 4. **Documentation**: README and Mermaid diagram
//! 5. **Pitch**: stakeholder pitch
//!
//! Stages run strictly in order; the first failure aborts the run and no
//! partial report is produced.
//!
//! ## Quick Start
//!
//! ```ignore
//! use codementor::{ProjectLoader, ProviderConfig, create_provider, run_analysis, open_chat};
//!
//! let files = ProjectLoader::new("./my-app").load()?;
//! let provider = create_provider(&ProviderConfig::default())?;
//!
//! let report = run_analysis(provider.clone(), &files, "Harden for production", &|event| {
//!     println!("{}", event.message);
//! })
//! .await?;
//!
//! let mut chat = open_chat(provider, &files);
//! let reply = chat.send("Where is the API key used?").await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: model providers, JSON repair, schema validation, timeouts, usage metrics
//! - [`analysis`]: context building, stage execution, orchestration, chat sessions
//! - [`ingest`]: folder loading and the bundled sample project
//! - [`config`]: figment-based hierarchical configuration
//! - [`cli`]: command handlers and console rendering

pub mod ai;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod constants;
pub mod ingest;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use config::{Config, ConfigLoader};

pub use types::{
    AnalysisReport, ChatMessage, ChatRole, ErrorCategory, LlmError, MentorError, ProjectFile,
    Result, StageError, StepId,
};

// =============================================================================
// Analysis Re-exports
// =============================================================================

pub use analysis::{
    AnalysisPipeline, ChatSession, ContextBuilder, NullProgress, ProgressEvent, ProgressLog,
    ProgressSink,
};

pub use ai::{
    LlmProvider, LlmResponse, MetricsCollector, MetricsSummary, ProviderConfig, SharedProvider,
    TimeoutConfig, create_provider,
};

pub use ingest::{ProjectLoader, sample_files, sample_goal};

// =============================================================================
// Entry Points
// =============================================================================

/// Run the five-stage analysis with default timeout and truncation
pub async fn run_analysis<P>(
    provider: SharedProvider,
    files: &[ProjectFile],
    goal: &str,
    sink: &P,
) -> Result<AnalysisReport>
where
    P: ProgressSink + ?Sized,
{
    AnalysisPipeline::new(provider).run(files, goal, sink).await
}

/// Open a mentor chat session bound to the given files
pub fn open_chat(provider: SharedProvider, files: &[ProjectFile]) -> ChatSession {
    ChatSession::open(files, provider)
}
