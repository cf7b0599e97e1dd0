//! Stage 3: resilience audit (security and performance)

use super::{Stage, StageInputs, StageResults};
use crate::ai::validation::{Field, FieldKind, Schema};
use crate::types::{Impact, OptimizationCategory, ResilienceAudit, Result, Severity, StepId};

pub struct ResilienceAuditStage;

const SECURITY_ISSUE: &[Field] = &[
    Field::required("severity", FieldKind::OneOf(Severity::ALL), ""),
    Field::optional("description", FieldKind::Text, ""),
    Field::optional("location", FieldKind::Text, "File or component"),
    Field::optional("fix", FieldKind::Text, "Concrete remediation"),
];

const OPTIMIZATION: &[Field] = &[
    Field::required("impact", FieldKind::OneOf(Impact::ALL), ""),
    Field::required("category", FieldKind::OneOf(OptimizationCategory::ALL), ""),
    Field::optional("description", FieldKind::Text, ""),
    Field::optional("example", FieldKind::Text, "Code or approach illustrating the change"),
];

const FIELDS: &[Field] = &[
    Field::required(
        "security",
        FieldKind::ObjectList(SECURITY_ISSUE),
        "Vulnerabilities, OWASP focus",
    ),
    Field::required(
        "optimization",
        FieldKind::ObjectList(OPTIMIZATION),
        "Performance leaks and structural improvements",
    ),
];

impl Stage for ResilienceAuditStage {
    const STEP: StepId = StepId::Improvements;
    const SCHEMA: Schema = Schema {
        name: "resilience_audit",
        description: "Security and performance audit",
        fields: FIELDS,
    };

    type Output = ResilienceAudit;

    fn start_message() -> &'static str {
        "Initiating security audit and performance scan..."
    }

    fn instruction(inputs: &StageInputs<'_>) -> Result<String> {
        let architecture = serde_json::to_string(inputs.results.architecture()?)?;
        Ok(format!(
            "ACT AS: A Senior Security & Site Reliability Engineer.\n\
             ARCHITECTURE CONTEXT: {}\n\n\
             TASK: Perform a rigorous code audit for Resilience.\n\
             INSTRUCTIONS:\n\
             1. SECURITY: Identify vulnerabilities (OWASP focus).\n\
             2. OPTIMIZATION: Identify performance leaks.\n\n\
             OUTPUT FORMAT: JSON strictly matching the provided schema.",
            architecture
        ))
    }

    fn completion_message(output: &ResilienceAudit) -> String {
        format!(
            "Audit complete: {} security items found.",
            output.security.len()
        )
    }

    fn store(results: &mut StageResults, output: ResilienceAudit) {
        results.audit = Some(output);
    }
}
