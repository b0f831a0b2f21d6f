//! Binding tagged comments to the single node and role they describe
//!
//! The attachment model legitimately reports one comment on two nodes at
//! once: the trailing list of the code before it and the leading list of the
//! code after it. Binding walks the nodes in pre-order, picks exactly one
//! owner and role per tagged comment, records the location facts the
//! downstream passes need, and detaches the comment from every list so no
//! later node can claim it again.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{DocmapError, Result};
use crate::locate::has_blank_line_before;
use crate::syntax::SyntaxTree;
use crate::tag::{TagMatch, match_tag};

/// Which side of its code a bound comment annotates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Sits above the code it describes.
    Leading,
    /// Shares the last line of the code it describes.
    Trailing,
}

/// A tagged comment bound to exactly one code location.
#[derive(Debug, Clone)]
pub struct BoundComment {
    pub id: usize,
    /// Original comment text including the sentinel.
    pub raw_text: String,
    /// Body after sentinel and decoration stripping.
    pub cleaned_text: String,
    /// True iff the original form was a block comment.
    pub is_multiline: bool,
    pub source_file: PathBuf,
    pub role: Role,
    /// Start position of the code node the comment describes.
    pub bound_line: usize,
    pub bound_column: usize,
    /// True iff the line above the comment's first line was blank.
    pub has_blank_line_before: bool,
}

/// Walk the tree and bind every tagged comment.
///
/// Returns the bound comments in discovery order (pre-order over nodes,
/// leading list before trailing list at each node) and leaves the tree with
/// every bound comment detached from every list.
///
/// Rules, per node:
/// - leading list: block-form tagged comments bind here, at this node's
///   start position;
/// - trailing list: tagged comments of either form bind here only when the
///   comment's first line equals this node's end line; otherwise the comment
///   stays attached so a later node's leading pass can claim it.
///
/// A tagged comment no pass claims is left in place and reported at warn
/// level; it does not reach the output list.
pub fn bind_comments(tree: &mut SyntaxTree, source_file: &Path) -> Result<Vec<BoundComment>> {
    for comment in tree.comments() {
        if comment.start.line == 0 || comment.byte_range.end > tree.source().len() {
            return Err(DocmapError::MissingPosition {
                file: source_file.to_path_buf(),
                line: comment.start.line,
            });
        }
    }

    let mut bound = Vec::new();
    let mut taken: HashSet<usize> = HashSet::new();

    for idx in 0..tree.nodes().len() {
        for id in tree.nodes()[idx].leading.clone() {
            if taken.contains(&id) {
                continue;
            }
            let comment = tree.comment(id);
            let Some(tag) = match_tag(comment.value(), comment.form) else {
                continue;
            };
            if !tag.is_multiline {
                continue;
            }
            bound.push(make_bound(tree, idx, id, tag, Role::Leading, source_file));
            taken.insert(id);
            tree.detach(id);
        }

        for id in tree.nodes()[idx].trailing.clone() {
            if taken.contains(&id) {
                continue;
            }
            let comment = tree.comment(id);
            let Some(tag) = match_tag(comment.value(), comment.form) else {
                continue;
            };
            if comment.start.line != tree.nodes()[idx].end.line {
                // Not on this node's last line; a later node's leading pass
                // may still claim it.
                continue;
            }
            bound.push(make_bound(tree, idx, id, tag, Role::Trailing, source_file));
            taken.insert(id);
            tree.detach(id);
        }
    }

    for comment in tree.comments() {
        if !taken.contains(&comment.id) && match_tag(comment.value(), comment.form).is_some() {
            log::warn!(
                "{}:{}: tagged comment could not be bound to a node, leaving it in place",
                source_file.display(),
                comment.start.line
            );
        }
    }

    Ok(bound)
}

fn make_bound(
    tree: &SyntaxTree,
    node_idx: usize,
    id: usize,
    tag: TagMatch,
    role: Role,
    source_file: &Path,
) -> BoundComment {
    let comment = tree.comment(id);
    let node = &tree.nodes()[node_idx];
    BoundComment {
        id,
        raw_text: comment.text.clone(),
        cleaned_text: tag.cleaned_text,
        is_multiline: tag.is_multiline,
        source_file: source_file.to_path_buf(),
        role,
        bound_line: node.start.line,
        bound_column: node.start.column,
        has_blank_line_before: has_blank_line_before(tree.source(), comment.start.line),
    }
}
