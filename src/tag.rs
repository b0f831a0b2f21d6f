//! Sentinel tag matching and comment body cleaning
//!
//! A comment is marked for extraction by carrying the sentinel literal
//! anywhere in its text. Matching is a plain substring search, so a comment
//! that merely mentions the sentinel in prose is extracted too; callers that
//! care should keep the sentinel out of ordinary prose.

use std::sync::LazyLock;

use regex::Regex;

use crate::syntax::CommentForm;

/// The literal tag that marks a comment for extraction.
pub const SENTINEL: &str = "#DOCMAP_v0.0.1:";

/// Matches the `" * "` decoration block comments carry on continuation lines.
static DECORATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\*\s?").expect("DECORATION_PATTERN regex is invalid"));

/// A successful tag match: the cleaned body and the comment's shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMatch {
    /// Body text after the sentinel with per-line decoration stripped,
    /// internal newlines preserved, outer whitespace trimmed.
    pub cleaned_text: String,
    /// True iff the comment's syntactic form was a block comment,
    /// independent of how many lines the cleaned body has.
    pub is_multiline: bool,
}

/// Check a comment's text (delimiters already stripped) for the sentinel.
///
/// Returns `None` when the sentinel is absent. No side effects.
pub fn match_tag(value: &str, form: CommentForm) -> Option<TagMatch> {
    let at = value.find(SENTINEL)?;
    let body = &value[at + SENTINEL.len()..];
    let cleaned: Vec<String> = body
        .split('\n')
        .map(|line| DECORATION_PATTERN.replace(line, "").into_owned())
        .collect();
    Some(TagMatch {
        cleaned_text: cleaned.join("\n").trim().to_string(),
        is_multiline: form == CommentForm::Block,
    })
}
