//! Atomic schema edits addressed by component schema name.
//!
//! Each edit is idempotent: applying it twice leaves the document exactly as
//! applying it once.

use serde_json::Value;
use tracing::debug;

use crate::error::GuidanceError;
use crate::model::Document;
use crate::types::PolicyEdit;

/// Add `property` to the required set of component `schema`.
///
/// # Errors
///
/// `SchemaNotFound` if the component does not exist.
pub fn mark_required(
    document: &mut Document,
    schema: &str,
    property: &str,
) -> Result<(), GuidanceError> {
    let target = document.component_mut(schema)?;
    if target.required.insert(property.to_string()) {
        debug!(schema, property, "marked required");
    }
    Ok(())
}

/// Remove `property` from component `schema`. An absent property is a no-op.
///
/// The required set is not touched.
///
/// # Errors
///
/// `SchemaNotFound` if the component does not exist.
pub fn remove_property(
    document: &mut Document,
    schema: &str,
    property: &str,
) -> Result<(), GuidanceError> {
    let target = document.component_mut(schema)?;
    if target.properties.shift_remove(property).is_some() {
        debug!(schema, property, "removed property");
    }
    Ok(())
}

/// Keep only the enum values of component `schema` listed in `allowed`,
/// preserving their original order. Never adds values.
///
/// # Errors
///
/// `SchemaNotFound` if the component does not exist.
pub fn limit_enum<S: AsRef<str>>(
    document: &mut Document,
    schema: &str,
    allowed: &[S],
) -> Result<(), GuidanceError> {
    let target = document.component_mut(schema)?;
    let before = target.enum_values.len();
    target
        .enum_values
        .retain(|value| is_allowed(value, allowed));
    debug!(
        schema,
        kept = target.enum_values.len(),
        dropped = before - target.enum_values.len(),
        "limited enum"
    );
    Ok(())
}

/// Enum values are compared as strings; non-string values never match.
fn is_allowed<S: AsRef<str>>(value: &Value, allowed: &[S]) -> bool {
    value
        .as_str()
        .map(|v| allowed.iter().any(|a| a.as_ref() == v))
        .unwrap_or(false)
}

/// Apply one policy edit.
pub fn apply_edit(document: &mut Document, edit: &PolicyEdit) -> Result<(), GuidanceError> {
    match edit {
        PolicyEdit::MarkRequired { schema, property } => mark_required(document, schema, property),
        PolicyEdit::RemoveProperty { schema, property } => {
            remove_property(document, schema, property)
        }
        PolicyEdit::LimitEnum { schema, allowed } => limit_enum(document, schema, allowed),
    }
}

/// Apply edits in order, stopping at the first failure.
pub fn apply_edits(document: &mut Document, edits: &[PolicyEdit]) -> Result<(), GuidanceError> {
    for edit in edits {
        apply_edit(document, edit)?;
    }
    Ok(())
}
