//! Consolidated document assembly

use crate::binder::BoundComment;

/// Join the cleaned bodies of the bound comments in list order, exactly one
/// blank line between consecutive entries, no trailing separator.
pub fn assemble(comments: &[BoundComment]) -> String {
    comments
        .iter()
        .map(|c| c.cleaned_text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
