//! Data-described response schemas
//!
//! Each stage declares its expected output as a static [`Schema`] table. The same
//! table drives two things:
//!
//! - [`Schema::to_json_schema`]: the JSON Schema sent to the provider
//! - [`Schema::validate`]: the generic check applied to whatever came back
//!
//! Unknown fields are ignored. A `null` value counts as absent.

use serde_json::{Map, Value, json};
use std::fmt;

// =============================================================================
// Schema Table
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub name: &'static str,
    pub description: &'static str,
    pub fields: &'static [Field],
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Text,
    Number { min: Option<f64>, max: Option<f64> },
    TextList,
    /// String restricted to a closed set
    OneOf(&'static [&'static str]),
    /// Array of objects, each described by the nested fields
    ObjectList(&'static [Field]),
}

impl Field {
    pub const fn required(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
        }
    }
}

// =============================================================================
// Violations
// =============================================================================

/// One mismatch between a payload and its schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path to the offending value, e.g. `security[2].severity`
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Join violations into a single diagnostic line
pub fn describe_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Validation
// =============================================================================

impl Schema {
    /// Check a payload against the table. Empty result means conformant.
    pub fn validate(&self, value: &Value) -> Vec<Violation> {
        let mut violations = Vec::new();
        match value.as_object() {
            Some(object) => validate_fields(self.fields, object, "", &mut violations),
            None => violations.push(Violation {
                path: String::new(),
                message: format!("expected a JSON object, got {}", type_name(value)),
            }),
        }
        violations
    }

    /// Render the table as JSON Schema
    pub fn to_json_schema(&self) -> Value {
        let mut schema = object_schema(self.fields);
        schema["description"] = json!(self.description);
        schema
    }
}

fn validate_fields(
    fields: &[Field],
    object: &Map<String, Value>,
    prefix: &str,
    out: &mut Vec<Violation>,
) {
    for field in fields {
        let path = if prefix.is_empty() {
            field.name.to_string()
        } else {
            format!("{}.{}", prefix, field.name)
        };

        match object.get(field.name) {
            None | Some(Value::Null) => {
                if field.required {
                    out.push(Violation {
                        path,
                        message: "missing required field".to_string(),
                    });
                }
            }
            Some(value) => validate_value(&field.kind, value, &path, out),
        }
    }
}

fn validate_value(kind: &FieldKind, value: &Value, path: &str, out: &mut Vec<Violation>) {
    let mut push = |message: String| {
        out.push(Violation {
            path: path.to_string(),
            message,
        })
    };

    match kind {
        FieldKind::Text => {
            if !value.is_string() {
                push(format!("expected string, got {}", type_name(value)));
            }
        }
        FieldKind::Number { min, max } => match value.as_f64() {
            None => push(format!("expected number, got {}", type_name(value))),
            Some(n) => {
                if min.is_some_and(|m| n < m) || max.is_some_and(|m| n > m) {
                    push(format!(
                        "{} is outside [{}, {}]",
                        n,
                        min.map_or("-inf".to_string(), |m| m.to_string()),
                        max.map_or("inf".to_string(), |m| m.to_string())
                    ));
                }
            }
        },
        FieldKind::TextList => match value.as_array() {
            None => push(format!("expected array of strings, got {}", type_name(value))),
            Some(items) => {
                if let Some(idx) = items.iter().position(|v| !v.is_string()) {
                    push(format!(
                        "item {} is {}, expected string",
                        idx,
                        type_name(&items[idx])
                    ));
                }
            }
        },
        FieldKind::OneOf(allowed) => match value.as_str() {
            Some(s) if allowed.contains(&s) => {}
            Some(s) => push(format!("'{}' is not one of [{}]", s, allowed.join(", "))),
            None => push(format!("expected string, got {}", type_name(value))),
        },
        FieldKind::ObjectList(fields) => match value.as_array() {
            None => push(format!("expected array, got {}", type_name(value))),
            Some(items) => {
                for (idx, item) in items.iter().enumerate() {
                    let item_path = format!("{}[{}]", path, idx);
                    match item.as_object() {
                        Some(object) => validate_fields(fields, object, &item_path, out),
                        None => out.push(Violation {
                            path: item_path,
                            message: format!("expected object, got {}", type_name(item)),
                        }),
                    }
                }
            }
        },
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// JSON Schema Rendering
// =============================================================================

fn object_schema(fields: &[Field]) -> Value {
    let properties: Map<String, Value> = fields
        .iter()
        .map(|f| (f.name.to_string(), field_schema(f)))
        .collect();
    let required: Vec<&str> = fields.iter().filter(|f| f.required).map(|f| f.name).collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn field_schema(field: &Field) -> Value {
    let mut schema = match &field.kind {
        FieldKind::Text => json!({"type": "string"}),
        FieldKind::Number { min, max } => {
            let mut s = json!({"type": "number"});
            if let Some(min) = min {
                s["minimum"] = json!(min);
            }
            if let Some(max) = max {
                s["maximum"] = json!(max);
            }
            s
        }
        FieldKind::TextList => json!({"type": "array", "items": {"type": "string"}}),
        FieldKind::OneOf(allowed) => json!({"type": "string", "enum": allowed}),
        FieldKind::ObjectList(fields) => json!({"type": "array", "items": object_schema(fields)}),
    };
    if !field.description.is_empty() {
        schema["description"] = json!(field.description);
    }
    schema
}
