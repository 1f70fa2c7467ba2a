//! Selection of a single path and operation.

use tracing::debug;

use crate::error::GuidanceError;
use crate::model::Document;
use crate::types::Verb;

/// Reduce `document` to the one path matching `path` (case-insensitively)
/// and the one `verb` operation on it.
///
/// The remaining path keeps its original key. If several keys differ only in
/// case, the first one in document order is kept.
///
/// # Errors
///
/// `ContractNotFound` naming the path (and the verb, when the path exists
/// without that operation). The document is left unchanged on error.
pub fn select(document: &mut Document, path: &str, verb: Verb) -> Result<(), GuidanceError> {
    let wanted = path.to_lowercase();
    let (index, (key, item)) = document
        .paths
        .iter()
        .enumerate()
        .find(|(_, (key, _))| key.to_lowercase() == wanted)
        .ok_or_else(|| GuidanceError::ContractNotFound {
            path: path.to_string(),
            verb: None,
        })?;
    if !item.operations.contains_key(&verb) {
        return Err(GuidanceError::ContractNotFound {
            path: key.clone(),
            verb: Some(verb.to_string()),
        });
    }

    let paths_before = document.paths.len();
    let mut kept = 0;
    document.paths.retain(|_, _| {
        let keep = kept == index;
        kept += 1;
        keep
    });
    for item in document.paths.values_mut() {
        item.operations.retain(|v, _| *v == verb);
    }

    debug!(
        path,
        %verb,
        paths_removed = paths_before - document.paths.len(),
        "selected operation"
    );
    Ok(())
}
