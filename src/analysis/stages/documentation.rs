//! Stage 4: README and system diagram

use super::{Stage, StageInputs, StageResults};
use crate::ai::validation::{Field, FieldKind, Schema};
use crate::types::{Documentation, Result, StepId};

pub struct DocumentationStage;

const FIELDS: &[Field] = &[
    Field::required("readme", FieldKind::Text, "Technical README in Markdown"),
    Field::required(
        "diagram",
        FieldKind::Text,
        "Mermaid.js graph source describing the system flow",
    ),
];

impl Stage for DocumentationStage {
    const STEP: StepId = StepId::Documentation;
    const SCHEMA: Schema = Schema {
        name: "documentation",
        description: "Generated documentation",
        fields: FIELDS,
    };

    type Output = Documentation;

    fn start_message() -> &'static str {
        "Generating system diagrams and technical README..."
    }

    fn instruction(_inputs: &StageInputs<'_>) -> Result<String> {
        Ok("ACT AS: A Technical Writer.\n\
            TASK: Generate high-fidelity documentation and a Mermaid.js diagram."
            .to_string())
    }

    fn completion_message(_output: &Documentation) -> String {
        "System flow visualizer generated.".to_string()
    }

    fn store(results: &mut StageResults, output: Documentation) {
        results.documentation = Some(output);
    }
}
