//! Analysis Pipeline
//!
//! Drives the five stages strictly in order over one shared context string.
//!
//! ## Run Lifecycle
//!
//! ```text
//! idle -> understanding -> architecture -> improvements -> documentation -> pitching -> complete
//!              \               \                \                \              \
//!               +---------------+----------------+----------------+--------------+--> error
//! ```
//!
//! - A single driver loop advances [`RunState`]; each step stores its result in
//!   the run accumulator before the next step starts
//! - The first stage failure ends the run with [`MentorError::PipelineAborted`];
//!   no later stage is called and no partial report is returned
//! - Progress is emitted as it happens: a start and a completion event per
//!   stage, then one `complete` or one `error` event

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use super::context::ContextBuilder;
use super::executor::StageExecutor;
use super::progress::{ProgressEvent, ProgressSink};
use super::stages::{
    ArchitectureStage, DocumentationStage, PitchStage, ResilienceAuditStage, Stage, StageInputs,
    StageResults, UnderstandingStage,
};
use crate::ai::metrics::{MetricsCollector, MetricsSummary, SharedMetrics};
use crate::ai::provider::SharedProvider;
use crate::ai::timeout::TimeoutConfig;
use crate::config::Config;
use crate::types::{AnalysisReport, MentorError, ProjectFile, Result, StepId};

// =============================================================================
// Run State
// =============================================================================

/// Current step plus accumulated results of one run
#[derive(Debug, Default)]
pub struct RunState {
    step: StepId,
    results: StageResults,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> StepId {
        self.step
    }

    pub fn results(&self) -> &StageResults {
        &self.results
    }

    /// Move to `to`, rejecting anything but the direct successor or `error`
    pub fn transition(&mut self, to: StepId) -> Result<()> {
        if !self.step.can_transition_to(to) {
            return Err(MentorError::InvalidTransition {
                from: self.step,
                to,
            });
        }
        self.step = to;
        Ok(())
    }

    /// Enter the terminal error state; no-op once terminal
    pub fn fail(&mut self) {
        if !self.step.is_terminal() {
            self.step = StepId::Error;
        }
    }
}

// =============================================================================
// Pipeline
// =============================================================================

pub struct AnalysisPipeline {
    executor: StageExecutor,
    context_builder: ContextBuilder,
    metrics: SharedMetrics,
}

impl AnalysisPipeline {
    pub fn new(provider: SharedProvider) -> Self {
        let pipeline_id = Uuid::new_v4().to_string();
        Self {
            executor: StageExecutor::new(provider),
            context_builder: ContextBuilder::default(),
            metrics: Arc::new(MetricsCollector::new(pipeline_id)),
        }
    }

    /// Pipeline with timeout and truncation taken from configuration
    pub fn from_config(provider: SharedProvider, config: &Config) -> Self {
        Self::new(provider)
            .with_timeout(TimeoutConfig::from_secs(config.llm.timeout_secs).stage_request)
            .with_context_builder(ContextBuilder::new(config.context.max_file_chars))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.executor = self.executor.with_timeout(timeout);
        self
    }

    pub fn with_context_builder(mut self, builder: ContextBuilder) -> Self {
        self.context_builder = builder;
        self
    }

    /// Usage across every run made with this pipeline
    pub fn metrics(&self) -> MetricsSummary {
        self.metrics.snapshot()
    }

    pub async fn run<P>(&self, files: &[ProjectFile], goal: &str, sink: &P) -> Result<AnalysisReport>
    where
        P: ProgressSink + ?Sized,
    {
        self.run_with_cancel(files, goal, sink, &CancellationToken::new())
            .await
    }

    /// Run all five stages; cancelling the token aborts the in-flight call
    pub async fn run_with_cancel<P>(
        &self,
        files: &[ProjectFile],
        goal: &str,
        sink: &P,
        cancel: &CancellationToken,
    ) -> Result<AnalysisReport>
    where
        P: ProgressSink + ?Sized,
    {
        let run_id = Uuid::new_v4();
        let span = info_span!("analysis", %run_id, files = files.len());

        let mut state = RunState::new();
        let result = self
            .drive(&mut state, files, goal, sink, cancel)
            .instrument(span.clone())
            .await;

        let _entered = span.enter();
        match &result {
            Ok(report) => info!(
                score = report.score,
                security_issues = report.security_issues.len(),
                "Analysis complete"
            ),
            Err(err) => {
                let at_step = state.step();
                state.fail();
                let message = err
                    .stage_error()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| err.to_string());
                warn!(step = %at_step, "Analysis aborted: {}", message);
                sink.emit(ProgressEvent::new(
                    StepId::Error,
                    format!("Analysis interrupted: {}", message),
                ));
            }
        }
        info!("Pipeline usage:\n{}", self.metrics.snapshot().display());

        result
    }

    async fn drive<P>(
        &self,
        state: &mut RunState,
        files: &[ProjectFile],
        goal: &str,
        sink: &P,
        cancel: &CancellationToken,
    ) -> Result<AnalysisReport>
    where
        P: ProgressSink + ?Sized,
    {
        let codebase = self.context_builder.build(files);
        debug!(
            context_chars = codebase.len(),
            max_file_chars = self.context_builder.max_file_chars(),
            "Context assembled"
        );

        sink.emit(ProgressEvent::new(
            StepId::Understanding,
            format!(
                "Initializing {} reasoning core...",
                self.executor.provider().model()
            ),
        ));

        while let Some(next) = state.step().next() {
            state.transition(next)?;
            match next {
                StepId::Understanding => {
                    self.run_stage::<UnderstandingStage, P>(state, goal, &codebase, sink, cancel)
                        .await?
                }
                StepId::Architecture => {
                    self.run_stage::<ArchitectureStage, P>(state, goal, &codebase, sink, cancel)
                        .await?
                }
                StepId::Improvements => {
                    self.run_stage::<ResilienceAuditStage, P>(state, goal, &codebase, sink, cancel)
                        .await?
                }
                StepId::Documentation => {
                    self.run_stage::<DocumentationStage, P>(state, goal, &codebase, sink, cancel)
                        .await?
                }
                StepId::Pitching => {
                    self.run_stage::<PitchStage, P>(state, goal, &codebase, sink, cancel)
                        .await?
                }
                StepId::Complete => break,
                StepId::Idle | StepId::Error => {
                    return Err(MentorError::InvalidTransition {
                        from: state.step(),
                        to: next,
                    });
                }
            }
        }

        let report = std::mem::take(&mut state.results).into_report()?;
        sink.emit(ProgressEvent::new(
            StepId::Complete,
            "Analysis complete. Report ready.",
        ));
        Ok(report)
    }

    async fn run_stage<S, P>(
        &self,
        state: &mut RunState,
        goal: &str,
        codebase: &str,
        sink: &P,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        S: Stage,
        P: ProgressSink + ?Sized,
    {
        let inputs = StageInputs {
            goal,
            codebase,
            results: &state.results,
        };
        let instruction = S::instruction(&inputs)?;
        let context = S::context(&inputs);

        sink.emit(ProgressEvent::new(S::STEP, S::start_message()));
        info!(stage = %S::STEP, "Stage {}: {}", S::STEP.stage_number().unwrap_or(0), S::STEP.title());
        debug!(
            instruction_chars = instruction.len(),
            context_chars = context.len(),
            "Stage request built"
        );

        match self
            .executor
            .execute::<S::Output>(instruction, context, &S::SCHEMA, cancel)
            .await
        {
            Ok((output, response)) => {
                self.metrics.record_stage(S::STEP, &response);
                let message = S::completion_message(&output);
                info!(
                    stage = %S::STEP,
                    tokens = response.usage.total(),
                    latency_ms = response.timing.total_ms,
                    "{}",
                    message
                );
                S::store(&mut state.results, output);
                sink.emit(ProgressEvent::new(S::STEP, message));
                Ok(())
            }
            Err(cause) => {
                self.metrics.record_failure();
                warn!(stage = %S::STEP, kind = %cause.kind(), "Stage failed: {}", cause);
                Err(MentorError::aborted(S::STEP, cause))
            }
        }
    }
}
