//! Model Response Validation
//!
//! Two steps, applied in order to every structured response:
//! - JSON extraction and repair for syntactically damaged output
//! - Generic validation against a stage's data-described [`Schema`]

mod json_repair;
mod schema;

pub use json_repair::{JsonRepairer, RepairFailure, extract_json_from_response};
pub use schema::{Field, FieldKind, Schema, Violation, describe_violations};
