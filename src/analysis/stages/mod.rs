//! Stage Definitions
//!
//! Each of the five stages is a zero-sized type implementing [`Stage`]. A stage
//! supplies only data: its step id, schema table, prompt text and progress
//! messages. Execution, validation and sequencing live elsewhere.
//!
//! ```text
//! Understanding -> Architecture -> Resilience Audit -> Documentation -> Pitch
//!       |               ^  |               ^
//!       +-- summary ----+  +-- pattern ----+
//! ```

mod architecture;
mod audit;
mod documentation;
mod pitch;
mod understanding;

pub use architecture::ArchitectureStage;
pub use audit::ResilienceAuditStage;
pub use documentation::DocumentationStage;
pub use pitch::PitchStage;
pub use understanding::UnderstandingStage;

use serde::de::DeserializeOwned;

use crate::ai::validation::Schema;
use crate::types::{
    AnalysisReport, Architecture, Documentation, MentorError, Pitch, ResilienceAudit, Result,
    StepId, Understanding,
};

/// What a stage may read when building its request
#[derive(Debug, Clone, Copy)]
pub struct StageInputs<'a> {
    pub goal: &'a str,
    /// Shared, per-file truncated project context
    pub codebase: &'a str,
    pub results: &'a StageResults,
}

pub trait Stage {
    const STEP: StepId;
    const SCHEMA: Schema;

    type Output: DeserializeOwned + Send;

    /// Progress message emitted before the model call
    fn start_message() -> &'static str;

    /// Role and task text, including any prior structured results
    fn instruction(inputs: &StageInputs<'_>) -> Result<String>;

    /// Context payload; the project codebase unless the stage says otherwise
    fn context(inputs: &StageInputs<'_>) -> String {
        codebase_section(inputs.codebase)
    }

    /// Progress message emitted after a conformant result
    fn completion_message(output: &Self::Output) -> String;

    /// Move the result into the run accumulator
    fn store(results: &mut StageResults, output: Self::Output);
}

pub(crate) fn codebase_section(codebase: &str) -> String {
    format!("CODEBASE:\n{}", codebase)
}

// =============================================================================
// Run Accumulator
// =============================================================================

/// Completed stage outputs for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageResults {
    pub understanding: Option<Understanding>,
    pub architecture: Option<Architecture>,
    pub audit: Option<ResilienceAudit>,
    pub documentation: Option<Documentation>,
    pub pitch: Option<Pitch>,
}

impl StageResults {
    pub fn understanding(&self) -> Result<&Understanding> {
        self.understanding.as_ref().ok_or(MentorError::IncompleteRun {
            missing: StepId::Understanding,
        })
    }

    pub fn architecture(&self) -> Result<&Architecture> {
        self.architecture.as_ref().ok_or(MentorError::IncompleteRun {
            missing: StepId::Architecture,
        })
    }

    /// Number of stages that have produced a result
    pub fn completed(&self) -> usize {
        [
            self.understanding.is_some(),
            self.architecture.is_some(),
            self.audit.is_some(),
            self.documentation.is_some(),
            self.pitch.is_some(),
        ]
        .into_iter()
        .filter(|done| *done)
        .count()
    }

    /// Merge into the final report; fails if any stage is missing
    pub fn into_report(self) -> Result<AnalysisReport> {
        let missing = |step| MentorError::IncompleteRun { missing: step };
        Ok(AnalysisReport::assemble(
            self.understanding.ok_or(missing(StepId::Understanding))?,
            self.architecture.ok_or(missing(StepId::Architecture))?,
            self.audit.ok_or(missing(StepId::Improvements))?,
            self.documentation.ok_or(missing(StepId::Documentation))?,
            self.pitch.ok_or(missing(StepId::Pitching))?,
        ))
    }
}
