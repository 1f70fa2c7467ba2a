//! Draft payload validation against a guidance document.

use serde_json::{json, Map, Value};

use crate::error::{GuidanceError, SchemaError, ValidateError};
use crate::guidance::project_with;
use crate::model::Document;
use crate::policy::PolicyTable;
use crate::types::GuidanceOptions;

/// Build a standalone JSON Schema for the request body of a guidance
/// document.
///
/// The component schemas are embedded under `components/schemas` so the
/// document's `#/components/schemas/...` references resolve unchanged.
/// OpenAPI `nullable: true` is rewritten to a `null` alternative in `type`.
///
/// # Errors
///
/// `InvariantViolation` unless the document holds exactly one operation
/// with a request-body schema.
pub fn guidance_schema(guidance: &Document) -> Result<Value, GuidanceError> {
    let (_, _, operation) = guidance.sole_operation()?;
    let root = to_value(operation.request_schema()?)?;
    let schemas = to_value(&guidance.components.schemas)?;

    let mut schema = json!({
        "allOf": [root],
        "components": { "schemas": schemas }
    });
    rewrite_nullable(&mut schema);
    Ok(schema)
}

/// Validate a draft record against an already projected guidance document.
///
/// # Errors
///
/// `ValidateError::Invalid` listing every violation, or
/// `ValidateError::Guidance` if the document has no usable request body.
pub fn validate_draft(guidance: &Document, payload: &Value) -> Result<(), ValidateError> {
    let schema = guidance_schema(guidance)?;
    validate_against_schema(&schema, payload)
}

/// Project `document` for `options` and validate `payload` against the
/// result.
pub fn validate(
    document: Document,
    payload: &Value,
    options: &GuidanceOptions,
    policies: &PolicyTable,
) -> Result<(), ValidateError> {
    let guidance = project_with(document, options, policies)?;
    validate_draft(&guidance, payload)
}

/// Validate a payload against a plain JSON Schema.
pub fn validate_against_schema(schema: &Value, payload: &Value) -> Result<(), ValidateError> {
    let validator = jsonschema::validator_for(schema).map_err(|e| {
        ValidateError::Guidance(GuidanceError::InvariantViolation {
            message: format!("guidance schema does not compile: {}", e),
        })
    })?;

    let errors: Vec<SchemaError> = validator
        .iter_errors(payload)
        .map(|e| SchemaError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::Invalid { errors })
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, GuidanceError> {
    serde_json::to_value(value).map_err(|e| GuidanceError::InvariantViolation {
        message: format!("schema is not representable as JSON: {}", e),
    })
}

fn rewrite_nullable(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.get("nullable") == Some(&Value::Bool(true)) {
                map.remove("nullable");
                widen_type(map);
            }
            for child in map.values_mut() {
                rewrite_nullable(child);
            }
        }
        Value::Array(items) => {
            for item in items {
                rewrite_nullable(item);
            }
        }
        _ => {}
    }
}

fn widen_type(map: &mut Map<String, Value>) {
    if let Some(Value::String(type_name)) = map.get("type") {
        let widened = json!([type_name, "null"]);
        map.insert("type".to_string(), widened);
    }
}
