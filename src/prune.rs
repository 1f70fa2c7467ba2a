//! Reachability pruning of component schemas.

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::error::GuidanceError;
use crate::model::{Document, Schema};

/// Names of every component schema reachable from `root`.
///
/// Follows references, items, property schemas and allOf/oneOf/anyOf
/// members. Each named schema is expanded at most once, so self references
/// and mutual cycles terminate. Inline schemas are walked through but never
/// recorded. Names come back in discovery order.
///
/// # Errors
///
/// `SchemaNotFound` if a reachable reference names a schema missing from
/// `components`.
pub fn reachable_schemas(
    components: &IndexMap<String, Schema>,
    root: &Schema,
) -> Result<IndexSet<String>, GuidanceError> {
    let mut reached = IndexSet::new();
    let mut stack = vec![root];

    while let Some(schema) = stack.pop() {
        match schema {
            Schema::Reference(reference) => {
                let name = reference.name()?;
                if reached.contains(name) {
                    continue;
                }
                let target = components
                    .get(name)
                    .ok_or_else(|| GuidanceError::SchemaNotFound {
                        name: name.to_string(),
                    })?;
                reached.insert(name.to_string());
                stack.push(target);
            }
            Schema::Inline(_) => {
                // Reverse so the first child is expanded first.
                let children: Vec<&Schema> = schema.children().collect();
                stack.extend(children.into_iter().rev());
            }
        }
    }

    Ok(reached)
}

/// Remove every component schema not reachable from `root`.
///
/// Only removes; surviving schemas are untouched. Running it again with the
/// same root removes nothing. Returns the removed names.
///
/// # Errors
///
/// `SchemaNotFound` as for [`reachable_schemas`]. The document is left
/// unchanged on error.
pub fn prune(document: &mut Document, root: &Schema) -> Result<Vec<String>, GuidanceError> {
    let reached = reachable_schemas(&document.components.schemas, root)?;
    Ok(retain_reached(document, &reached))
}

/// Prune components down to those reachable from the request body of the
/// document's only operation.
///
/// # Errors
///
/// `InvariantViolation` if the document does not hold exactly one
/// operation with a request-body schema, else as for [`prune`].
pub fn prune_to_request_body(document: &mut Document) -> Result<Vec<String>, GuidanceError> {
    let (_, _, operation) = document.sole_operation()?;
    let root = operation.request_schema()?;
    let reached = reachable_schemas(&document.components.schemas, root)?;
    Ok(retain_reached(document, &reached))
}

fn retain_reached(document: &mut Document, reached: &IndexSet<String>) -> Vec<String> {
    let removed: Vec<String> = document
        .components
        .schemas
        .keys()
        .filter(|name| !reached.contains(name.as_str()))
        .cloned()
        .collect();
    document
        .components
        .schemas
        .retain(|name, _| reached.contains(name.as_str()));

    debug!(
        reached = reached.len(),
        removed = removed.len(),
        "pruned component schemas"
    );
    removed
}
