//! Guidance projection: full contract in, single-operation guidance out.

use tracing::{debug, debug_span};

use crate::adjust::apply_edits;
use crate::error::GuidanceError;
use crate::model::Document;
use crate::policy::PolicyTable;
use crate::prune::prune_to_request_body;
use crate::select::select;
use crate::types::GuidanceOptions;

/// Project `document` with the built-in policy table.
///
/// See [`project_with`].
pub fn project(document: Document, options: &GuidanceOptions) -> Result<Document, GuidanceError> {
    project_with(document, options, &PolicyTable::builtin())
}

/// Project `document` onto one operation and tailor it to a context.
///
/// Stages run in a fixed order:
/// 1. keep only `options.path` / `options.verb`,
/// 2. prune component schemas to those reachable from the operation's
///    request-body schema,
/// 3. apply the policy edits resolved for `options.context`.
///
/// Edits run after pruning, so a schema that only a removed property
/// referenced stays in the components.
///
/// The document is consumed; on error nothing of it is returned.
///
/// # Errors
///
/// `UnsupportedUseCase` before any work if the table has no rule for the
/// use-case, `ContractNotFound` from selection, `InvariantViolation` for a
/// missing request body, `SchemaNotFound` from pruning or from an edit.
pub fn project_with(
    mut document: Document,
    options: &GuidanceOptions,
    policies: &PolicyTable,
) -> Result<Document, GuidanceError> {
    let span = debug_span!(
        "project",
        path = %options.path,
        verb = %options.verb,
        use_case = %options.context.use_case
    );
    let _guard = span.enter();

    let edits = policies.resolve(&options.context)?;

    select(&mut document, &options.path, options.verb)?;
    let removed = prune_to_request_body(&mut document)?;
    debug!(?removed, "components outside the request body dropped");
    apply_edits(&mut document, &edits)?;

    Ok(document)
}
