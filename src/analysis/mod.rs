//! Analysis Orchestration
//!
//! ```text
//! ProjectFile[] --ContextBuilder--> codebase text
//!                                        |
//!        AnalysisPipeline: Understanding -> Architecture -> Resilience Audit
//!                          -> Documentation -> Pitch -> AnalysisReport
//!                                        |
//!                            ProgressSink (live events)
//!
//! ProjectFile[] --full_context--> ChatSession (fixed system text + history)
//! ```
//!
//! Every model call goes through [`StageExecutor`], which owns timeout,
//! cancellation, repair and schema validation.

pub mod chat;
pub mod context;
pub mod executor;
pub mod pipeline;
pub mod progress;
pub mod stages;

#[cfg(test)]
pub(crate) mod testing;

pub use chat::ChatSession;
pub use context::{ContextBuilder, full_context};
pub use executor::StageExecutor;
pub use pipeline::{AnalysisPipeline, RunState};
pub use progress::{NullProgress, ProgressEvent, ProgressLog, ProgressSink};
pub use stages::{Stage, StageInputs, StageResults};
