//! Tree editing: comment removal and reflow
//!
//! Removal itself happens in the syntax tree (detach plus layout-preserving
//! print); this module owns the reflow pass that runs over the printed text,
//! collapsing each blank-line run to a single line. The drift constants in
//! `offset` assume exactly this collapsing rule.

use crate::syntax::SyntaxTree;

/// Print the edited tree and reflow the result.
pub fn rewrite(tree: &SyntaxTree) -> String {
    reflow(&tree.print())
}

/// Collapse every run of blank lines to one and strip whitespace from the
/// lines that stay blank. All other layout is preserved.
pub fn reflow(text: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut prev_blank = false;
    for line in text.lines() {
        let blank = line.trim().is_empty();
        if blank && prev_blank {
            continue;
        }
        kept.push(if blank { "" } else { line });
        prev_blank = blank;
    }
    let mut out = kept.join("\n");
    if text.ends_with('\n') && !out.is_empty() {
        out.push('\n');
    }
    out
}
