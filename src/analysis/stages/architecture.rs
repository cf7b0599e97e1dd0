//! Stage 2: architecture review

use super::{Stage, StageInputs, StageResults};
use crate::ai::validation::{Field, FieldKind, Schema};
use crate::types::{Architecture, Result, StepId};

pub struct ArchitectureStage;

const FIELDS: &[Field] = &[
    Field::required(
        "pattern",
        FieldKind::Text,
        "Architectural pattern, e.g. MVC, Hexagonal, Layered, Event-Driven",
    ),
    Field::required(
        "pros",
        FieldKind::TextList,
        "3-4 ways the architecture supports the goal",
    ),
    Field::required(
        "cons",
        FieldKind::TextList,
        "3-4 architectural bottlenecks or anti-patterns",
    ),
];

impl Stage for ArchitectureStage {
    const STEP: StepId = StepId::Architecture;
    const SCHEMA: Schema = Schema {
        name: "architecture",
        description: "Structural integrity review",
        fields: FIELDS,
    };

    type Output = Architecture;

    fn start_message() -> &'static str {
        "Evaluating structural integrity and design patterns..."
    }

    fn instruction(inputs: &StageInputs<'_>) -> Result<String> {
        let understanding = serde_json::to_string(inputs.results.understanding()?)?;
        Ok(format!(
            "ACT AS: A Systems Design Consultant.\n\
             CONTEXT: {}\n\
             USER GOAL: \"{}\"\n\n\
             TASK: Evaluate the codebase's structural integrity.\n\
             INSTRUCTIONS:\n\
             1. Classify the architectural pattern (e.g., MVC, Hexagonal, Layered, Event-Driven, Micro-kernel).\n\
             2. Analyze Strengths: List 3-4 specific ways this architecture supports the user's goal.\n\
             3. Analyze Gaps: List 3-4 specific architectural bottlenecks or anti-patterns.\n\n\
             OUTPUT FORMAT: JSON strictly matching the provided schema.",
            understanding, inputs.goal
        ))
    }

    fn completion_message(output: &Architecture) -> String {
        format!("Identified {} architecture.", output.pattern)
    }

    fn store(results: &mut StageResults, output: Architecture) {
        results.architecture = Some(output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MentorError, Understanding};

    #[test]
    fn test_instruction_embeds_understanding_json() {
        let results = StageResults {
            understanding: Some(Understanding {
                summary: "Todo app".into(),
                tech_stack: vec!["JS".into()],
                score_base: 40.0,
            }),
            ..Default::default()
        };
        let inputs = StageInputs {
            goal: "g",
            codebase: "code",
            results: &results,
        };
        let instruction = ArchitectureStage::instruction(&inputs).unwrap();
        assert!(instruction.contains(
            r#"CONTEXT: {"summary":"Todo app","techStack":["JS"],"scoreBase":40.0}"#
        ));
        assert_eq!(ArchitectureStage::context(&inputs), "CODEBASE:\ncode");
    }

    #[test]
    fn test_instruction_without_understanding_fails() {
        let results = StageResults::default();
        let inputs = StageInputs {
            goal: "g",
            codebase: "",
            results: &results,
        };
        assert!(matches!(
            ArchitectureStage::instruction(&inputs),
            Err(MentorError::IncompleteRun {
                missing: StepId::Understanding
            })
        ));
    }
}
