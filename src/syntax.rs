//! Parsing, comment attachment, and layout-preserving printing
//!
//! Wraps tree-sitter behind the small contract the rest of the crate needs:
//! parse text into a tree whose nodes expose leading and trailing comment
//! lists with position metadata, and print the edited tree back to text.
//!
//! A comment sitting between two pieces of code shows up in two lists at
//! once: the trailing list of the node before it and the leading list of the
//! node after it. That mirrors how attachment-style parsers report comments;
//! the binder is the one that resolves the ambiguity.

use std::collections::BTreeSet;
use std::ops::Range;
use std::path::Path;

use crate::error::{DocmapError, Result};
use crate::language::Language;

/// A position in source text. Lines are 1-based, columns 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// Syntactic form of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentForm {
    /// `// ...`
    Line,
    /// `/* ... */`
    Block,
}

/// A comment as read from the source, before any binding decision.
#[derive(Debug, Clone)]
pub struct SourceComment {
    /// Identity unique within the containing tree.
    pub id: usize,
    /// Full source text including delimiters.
    pub text: String,
    pub form: CommentForm,
    pub start: Position,
    pub end: Position,
    pub byte_range: Range<usize>,
}

impl SourceComment {
    /// Comment text with the syntactic delimiters stripped.
    pub fn value(&self) -> &str {
        match self.form {
            CommentForm::Line => self.text.strip_prefix("//").unwrap_or(&self.text),
            CommentForm::Block => {
                let inner = self.text.strip_prefix("/*").unwrap_or(&self.text);
                inner.strip_suffix("*/").unwrap_or(inner)
            }
        }
    }
}

/// A code node that comments can attach to.
#[derive(Debug, Clone)]
pub struct AttachedNode {
    pub start: Position,
    pub end: Position,
    pub start_byte: usize,
    pub end_byte: usize,
    /// Ids of comments sitting above this node.
    pub leading: Vec<usize>,
    /// Ids of comments sitting after this node.
    pub trailing: Vec<usize>,
}

/// A parsed file: nodes in pre-order with their comment lists, plus the
/// original text the tree was parsed from.
#[derive(Debug)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<AttachedNode>,
    comments: Vec<SourceComment>,
    removed: BTreeSet<usize>,
}

/// Parse source text into an attached tree.
///
/// A file the grammar cannot parse cleanly is a hard failure; every
/// downstream pass depends on trustworthy positions.
pub fn parse(source: &str, language: Language, file: &Path) -> Result<SyntaxTree> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&language.grammar())
        .map_err(|e| DocmapError::Parse {
            file: file.to_path_buf(),
            reason: e.to_string(),
        })?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| DocmapError::Parse {
            file: file.to_path_buf(),
            reason: "parser produced no tree".to_string(),
        })?;
    if tree.root_node().has_error() {
        return Err(DocmapError::Parse {
            file: file.to_path_buf(),
            reason: "source contains syntax errors".to_string(),
        });
    }

    let mut nodes = Vec::new();
    let mut comments = Vec::new();
    collect(tree.root_node(), language, source, 0, &mut nodes, &mut comments);
    attach(&mut nodes, &comments);

    Ok(SyntaxTree {
        source: source.to_string(),
        nodes,
        comments,
        removed: BTreeSet::new(),
    })
}

/// Pre-order walk gathering comments and attachable nodes.
fn collect(
    node: tree_sitter::Node,
    language: Language,
    source: &str,
    depth: usize,
    nodes: &mut Vec<AttachedNode>,
    comments: &mut Vec<SourceComment>,
) {
    if language.comment_kinds().contains(&node.kind()) {
        let text = source[node.byte_range()].to_string();
        let form = if text.starts_with("/*") {
            CommentForm::Block
        } else {
            CommentForm::Line
        };
        comments.push(SourceComment {
            id: comments.len(),
            text,
            form,
            start: position(node.start_position()),
            end: position(node.end_position()),
            byte_range: node.byte_range(),
        });
        return;
    }
    if depth > 0 && node.is_named() {
        nodes.push(AttachedNode {
            start: position(node.start_position()),
            end: position(node.end_position()),
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            leading: Vec::new(),
            trailing: Vec::new(),
        });
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect(child, language, source, depth + 1, nodes, comments);
    }
}

fn position(point: tree_sitter::Point) -> Position {
    Position {
        line: point.row + 1,
        column: point.column,
    }
}

/// Attach each comment to the code around it: the trailing list of the
/// nearest node ending before it, and the leading list of the first node
/// starting after it. Both attachments can hold at once.
fn attach(nodes: &mut [AttachedNode], comments: &[SourceComment]) {
    for comment in comments {
        if let Some(idx) = nodes
            .iter()
            .position(|n| n.start_byte >= comment.byte_range.end)
        {
            nodes[idx].leading.push(comment.id);
        }
        let mut owner: Option<usize> = None;
        for (idx, node) in nodes.iter().enumerate() {
            if node.end_byte <= comment.byte_range.start
                && owner.is_none_or(|o| nodes[o].end_byte < node.end_byte)
            {
                owner = Some(idx);
            }
        }
        if let Some(idx) = owner {
            nodes[idx].trailing.push(comment.id);
        }
    }
}

impl SyntaxTree {
    /// The text this tree was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Attachable nodes in pre-order.
    pub fn nodes(&self) -> &[AttachedNode] {
        &self.nodes
    }

    /// All comments in document order, indexed by id.
    pub fn comments(&self) -> &[SourceComment] {
        &self.comments
    }

    pub fn comment(&self, id: usize) -> &SourceComment {
        &self.comments[id]
    }

    /// Remove a comment from every node's leading and trailing lists and
    /// mark it for deletion when the tree is printed.
    pub fn detach(&mut self, id: usize) {
        for node in &mut self.nodes {
            node.leading.retain(|&c| c != id);
            node.trailing.retain(|&c| c != id);
        }
        self.removed.insert(id);
    }

    /// True once a comment has been detached.
    pub fn is_detached(&self, id: usize) -> bool {
        self.removed.contains(&id)
    }

    /// Print the tree back to text: the original layout with detached
    /// comments spliced out. A comment that had its lines to itself takes
    /// the line slot with it; an inline comment takes the padding before it.
    pub fn print(&self) -> String {
        let mut ranges: Vec<Range<usize>> = self
            .removed
            .iter()
            .map(|&id| self.deletion_range(id))
            .collect();
        ranges.sort_by_key(|r| r.start);

        let mut out = String::with_capacity(self.source.len());
        let mut cursor = 0;
        for range in ranges {
            if range.start > cursor {
                out.push_str(&self.source[cursor..range.start]);
            }
            cursor = cursor.max(range.end);
        }
        out.push_str(&self.source[cursor..]);
        out
    }

    fn deletion_range(&self, id: usize) -> Range<usize> {
        let bytes = self.source.as_bytes();
        let comment = &self.comments[id];
        let mut start = comment.byte_range.start;
        let mut end = comment.byte_range.end;
        while start > 0 && (bytes[start - 1] == b' ' || bytes[start - 1] == b'\t') {
            start -= 1;
        }
        let owns_line = start == 0 || bytes[start - 1] == b'\n';
        if owns_line {
            let mut probe = end;
            while probe < bytes.len() && (bytes[probe] == b' ' || bytes[probe] == b'\t') {
                probe += 1;
            }
            if probe == bytes.len() || bytes[probe] == b'\n' {
                end = (probe + 1).min(bytes.len());
            }
        }
        start..end
    }
}
