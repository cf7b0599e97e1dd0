//! Stage 1: project understanding

use super::{Stage, StageInputs, StageResults};
use crate::ai::validation::{Field, FieldKind, Schema};
use crate::types::{Result, StepId, Understanding};

pub struct UnderstandingStage;

const FIELDS: &[Field] = &[
    Field::required(
        "summary",
        FieldKind::Text,
        "Core business logic and primary purpose of the software",
    ),
    Field::required(
        "techStack",
        FieldKind::TextList,
        "Primary languages, frameworks and key libraries",
    ),
    Field::required(
        "scoreBase",
        FieldKind::Number {
            min: Some(0.0),
            max: Some(100.0),
        },
        "Project maturity and consistency score from 0 to 100",
    ),
];

impl Stage for UnderstandingStage {
    const STEP: StepId = StepId::Understanding;
    const SCHEMA: Schema = Schema {
        name: "understanding",
        description: "High-level project scan",
        fields: FIELDS,
    };

    type Output = Understanding;

    fn start_message() -> &'static str {
        "Scanning project structure and identifying tech stack..."
    }

    fn instruction(inputs: &StageInputs<'_>) -> Result<String> {
        Ok(format!(
            "ACT AS: A Principal Software Architect.\n\
             TASK: Perform a high-level scan of the provided codebase to establish context.\n\
             USER GOAL: \"{}\"\n\n\
             INSTRUCTIONS:\n\
             1. Identify the primary programming languages, frameworks, and key libraries (techStack).\n\
             2. Summarize the core business logic and primary purpose of this software (summary).\n\
             3. Calculate an initial \"Project Maturity/Consistency\" score (0-100) based on standard engineering conventions seen in the code (scoreBase).\n\n\
             OUTPUT FORMAT: JSON strictly matching the provided schema.",
            inputs.goal
        ))
    }

    fn completion_message(output: &Understanding) -> String {
        format!(
            "Context mapped. Found {} major technologies.",
            output.tech_stack.len()
        )
    }

    fn store(results: &mut StageResults, output: Understanding) {
        results.understanding = Some(output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_carries_goal() {
        let results = StageResults::default();
        let inputs = StageInputs {
            goal: "Harden auth",
            codebase: "File: a.js",
            results: &results,
        };
        let instruction = UnderstandingStage::instruction(&inputs).unwrap();
        assert!(instruction.starts_with("ACT AS: A Principal Software Architect."));
        assert!(instruction.contains("USER GOAL: \"Harden auth\""));
        assert_eq!(UnderstandingStage::context(&inputs), "CODEBASE:\nFile: a.js");
    }

    #[test]
    fn test_score_out_of_range_rejected() {
        let violations = UnderstandingStage::SCHEMA
            .validate(&serde_json::json!({"summary": "s", "techStack": [], "scoreBase": 101}));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "scoreBase");
    }
}
