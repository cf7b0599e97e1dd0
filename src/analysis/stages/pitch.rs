//! Stage 5: stakeholder pitch

use super::{Stage, StageInputs, StageResults};
use crate::ai::validation::{Field, FieldKind, Schema};
use crate::types::{Pitch, Result, StepId};

pub struct PitchStage;

const FIELDS: &[Field] = &[Field::required(
    "pitch",
    FieldKind::Text,
    "Short, high-impact value proposition",
)];

impl Stage for PitchStage {
    const STEP: StepId = StepId::Pitching;
    const SCHEMA: Schema = Schema {
        name: "pitch",
        description: "Stakeholder pitch",
        fields: FIELDS,
    };

    type Output = Pitch;

    fn start_message() -> &'static str {
        "Synthesizing project value proposition for stakeholders..."
    }

    fn instruction(inputs: &StageInputs<'_>) -> Result<String> {
        let mut instruction = format!("ACT AS: A Startup Coach.\nGOAL: {}\n", inputs.goal);
        if let Some(understanding) = &inputs.results.understanding {
            instruction.push_str(&format!("PROJECT: {}\n", understanding.summary));
        }
        instruction.push_str("TASK: Draft a high-impact pitch.");
        Ok(instruction)
    }

    /// The pitch is written from the goal alone, not the codebase
    fn context(_inputs: &StageInputs<'_>) -> String {
        String::new()
    }

    fn completion_message(_output: &Pitch) -> String {
        "Pitch refined and ready.".to_string()
    }

    fn store(results: &mut StageResults, output: Pitch) {
        results.pitch = Some(output);
    }
}
