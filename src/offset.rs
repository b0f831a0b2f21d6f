//! Predicting where extracted comments land and where their code went
//!
//! Walks the bound comments in document order and emits one mapping row per
//! physical line of cleaned text. The original line of each row is the code
//! node's start line corrected by a cumulative drift offset: deleting a
//! comment's lines and collapsing the blank line above it moves everything
//! below up by a predictable amount.
//!
//! The constants model a reflow that collapses each blank-line run to a
//! single line and a block comment that spends one line on the sentinel and
//! two on delimiters. They are a prediction of the rewritten layout, not a
//! measurement of it; a different reflow rule would drift.

use std::fs;
use std::path::{Path, PathBuf};

use crate::binder::BoundComment;
use crate::error::Result;

/// One row of the position map. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMapping {
    /// 1-based line in the consolidated document.
    pub generated_line: usize,
    pub generated_column: usize,
    pub source_file: PathBuf,
    /// 1-based predicted line in the rewritten source file.
    pub original_line: usize,
    pub original_column: usize,
}

/// Read-once-per-file cache backing the map's embedded source table.
/// Entries keep first-use order.
#[derive(Debug, Default)]
pub struct SourceCache {
    entries: Vec<(PathBuf, String)>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry without touching the filesystem.
    pub fn preload(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.entries.push((path.into(), content.into()));
    }

    fn record(&mut self, path: &Path) -> Result<()> {
        if self.entries.iter().any(|(p, _)| p == path) {
            return Ok(());
        }
        let content = fs::read_to_string(path)?;
        self.entries.push((path.to_path_buf(), content));
        Ok(())
    }
}

/// The synthesizer's full output: mapping rows plus the embedded sources in
/// first-use order.
#[derive(Debug, Default)]
pub struct OffsetTable {
    pub rows: Vec<GeneratedMapping>,
    pub sources: Vec<(PathBuf, String)>,
}

/// Compute the position map rows for the bound comments, in list order.
///
/// Drift bookkeeping, per comment:
/// 1. a blank line directly above costs one line (the reflow collapses it);
/// 2. a body of `n > 1` lines costs `n + 3` (delimiters and sentinel line);
///    a block comment whose body collapsed to one line still costs 3;
///    a single-line form costs nothing;
/// 3. every body line maps to `bound_line - offset`;
/// 4. the generated line advances past the body and its blank separator.
pub fn synthesize(comments: &[BoundComment], mut cache: SourceCache) -> Result<OffsetTable> {
    let mut rows = Vec::new();
    let mut generated_line = 1usize;
    let mut offset = 0usize;

    for comment in comments {
        if comment.has_blank_line_before {
            offset += 1;
        }
        let n = comment.cleaned_text.split('\n').count();
        if n > 1 {
            offset += n + 3;
        } else if comment.is_multiline {
            offset += 3;
        }
        for i in 0..n {
            rows.push(GeneratedMapping {
                generated_line: generated_line + i,
                generated_column: 0,
                source_file: comment.source_file.clone(),
                original_line: comment.bound_line.saturating_sub(offset).max(1),
                original_column: 0,
            });
        }
        generated_line += n + 1;
        cache.record(&comment.source_file)?;
    }

    Ok(OffsetTable {
        rows,
        sources: cache.entries,
    })
}
