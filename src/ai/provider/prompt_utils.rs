//! Prompt building utilities for providers without native schema support.

use serde_json::Value;

/// Append JSON schema instructions to a prompt.
///
/// Returns the original prompt if schema is null.
pub fn build_schema_prompt(prompt: &str, schema: &Value) -> String {
    if schema.is_null() {
        return prompt.to_string();
    }

    let schema_str = serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string());
    format!(
        "{}\n\n---\n\nRespond with valid JSON matching this schema:\n```json\n{}\n```\n\nRespond ONLY with valid JSON, no explanation.",
        prompt, schema_str
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_schema_passthrough() {
        assert_eq!(build_schema_prompt("Explain", &Value::Null), "Explain");
    }

    #[test]
    fn test_schema_appended() {
        let schema = json!({"type": "object", "properties": {"pitch": {"type": "string"}}});
        let result = build_schema_prompt("Write a pitch", &schema);

        assert!(result.starts_with("Write a pitch"));
        assert!(result.contains("\"pitch\""));
        assert!(result.contains("Respond ONLY with valid JSON"));
    }
}
