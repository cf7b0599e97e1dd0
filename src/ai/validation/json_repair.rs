//! JSON extraction and repair for model output
//!
//! Handles the usual ways a model wraps or damages JSON:
//! - Markdown code fence wrapping (```json ... ```)
//! - Trailing commas
//! - JSON embedded in explanatory text
//!
//! Truncated output (unterminated strings, unclosed brackets) is never closed
//! up; it stays a parse failure so the damaged payload is rejected. Whether a
//! parsed result has the right shape is the schema validator's job.

use serde_json::Value;
use tracing::debug;

/// Why a payload could not be turned into JSON
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairFailure {
    /// Parser error from the last attempt
    pub reason: String,
}

impl std::fmt::Display for RepairFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "not valid JSON: {}", self.reason)
    }
}

/// Parse JSON from a model response, repairing if needed
pub fn extract_json_from_response(content: &str) -> Result<Value, RepairFailure> {
    JsonRepairer::new().parse_or_repair(content).map(|(v, _)| v)
}

pub struct JsonRepairer;

impl Default for JsonRepairer {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonRepairer {
    pub fn new() -> Self {
        Self
    }

    /// Returns (value, was_repaired)
    pub fn parse_or_repair(&self, raw: &str) -> Result<(Value, bool), RepairFailure> {
        let cleaned = preprocess(raw);

        let first_error = match serde_json::from_str::<Value>(&cleaned) {
            Ok(value) => return Ok((value, false)),
            Err(e) => e.to_string(),
        };

        debug!("Initial JSON parse failed ({}), attempting repair", first_error);

        let candidates = [
            fix_trailing_commas(&cleaned),
            extract_json_from_mixed(&cleaned)
                .map(|s| fix_trailing_commas(&s))
                .unwrap_or_default(),
        ];

        for candidate in candidates.iter().filter(|c| !c.is_empty()) {
            if let Ok(value) = serde_json::from_str::<Value>(candidate) {
                debug!("JSON repaired");
                return Ok((value, true));
            }
        }

        Err(RepairFailure {
            reason: first_error,
        })
    }
}

fn preprocess(raw: &str) -> String {
    let trimmed = raw.trim().trim_start_matches('\u{feff}');
    strip_code_fences(trimmed).trim().to_string()
}

fn strip_code_fences(s: &str) -> &str {
    let mut result = s;
    if result.starts_with("```")
        && let Some(first_newline) = result.find('\n')
    {
        result = &result[first_newline + 1..];
    }
    if let Some(stripped) = result.trim_end().strip_suffix("```") {
        result = stripped;
    }
    result
}

/// Drop commas that directly precede `]` or `}` outside strings
fn fix_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escape = false;

    for (i, &ch) in chars.iter().enumerate() {
        if in_string {
            match ch {
                _ if escape => escape = false,
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            result.push(ch);
            continue;
        }

        if ch == '"' {
            in_string = true;
        } else if ch == ',' {
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some(']') | Some('}')) {
                continue;
            }
        }
        result.push(ch);
    }

    result
}

/// First balanced `{...}` or `[...]` span in mixed text; `None` if it never closes
fn extract_json_from_mixed(s: &str) -> Option<String> {
    let start = s.find(['{', '['])?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape = false;

    for (i, ch) in s[start..].char_indices() {
        if in_string {
            match ch {
                _ if escape => escape = false,
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(s[start..start + i + 1].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_json() {
        let (value, repaired) = JsonRepairer::new()
            .parse_or_repair(r#"{"pitch": "Ship it"}"#)
            .unwrap();
        assert!(!repaired);
        assert_eq!(value["pitch"], "Ship it");
    }

    #[test]
    fn test_strip_code_fences() {
        let input = "```json\n{\"pattern\": \"MVC\"}\n```";
        let value = extract_json_from_response(input).unwrap();
        assert_eq!(value["pattern"], "MVC");
    }

    #[test]
    fn test_fix_trailing_comma() {
        let input = r#"{"pros": ["simple", "fast",], "cons": [],}"#;
        let (value, repaired) = JsonRepairer::new().parse_or_repair(input).unwrap();
        assert!(repaired);
        assert_eq!(value["pros"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_trailing_comma_inside_string_kept() {
        let input = r#"{"fix": "use a, ]", "x": 1,}"#;
        let value = extract_json_from_response(input).unwrap();
        assert_eq!(value["fix"], "use a, ]");
    }

    #[test]
    fn test_truncated_output_is_not_closed() {
        for input in [
            r#"{"pitch": "Ship a hardened TaskFl"#,
            r#"{"security": [{"severity": "high", "description": "eval use"}"#,
            r#"{"pros": ["simple", "fast","#,
            "Result follows:\n{\"summary\": \"cut off",
        ] {
            assert!(extract_json_from_response(input).is_err(), "accepted: {}", input);
        }
    }

    #[test]
    fn test_mixed_text_requires_balanced_span() {
        assert_eq!(extract_json_from_mixed("see {\"a\": [1, 2"), None);
        assert_eq!(
            extract_json_from_mixed("see {\"a\": \"}\"} done").as_deref(),
            Some("{\"a\": \"}\"}")
        );
    }

    #[test]
    fn test_extract_from_mixed() {
        let input = "Here is the analysis:\n{\"summary\": \"ok\"}\nHope this helps!";
        let (value, repaired) = JsonRepairer::new().parse_or_repair(input).unwrap();
        assert!(repaired);
        assert_eq!(value["summary"], "ok");
    }

    #[test]
    fn test_plain_prose_fails() {
        let err = extract_json_from_response("I cannot help with that.").unwrap_err();
        assert!(!err.reason.is_empty());
    }
}
