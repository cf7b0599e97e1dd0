//! Core type definitions shared across the crate

pub mod chat;
pub mod error;
pub mod project;
pub mod report;
pub mod step;
pub mod utils;

pub use chat::{ChatMessage, ChatRole};
pub use error::{
    ErrorCategory, ErrorClassifier, LlmError, MentorError, Result, StageError, StageErrorKind,
};
pub use project::{ProjectFile, guess_mime_type};
pub use report::{
    AnalysisReport, Architecture, Documentation, Impact, OptimizationCategory,
    OptimizationSuggestion, Pitch, ResilienceAudit, SecurityIssue, Severity, Understanding,
};
pub use step::StepId;
