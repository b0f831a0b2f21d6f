//! Error types for docmap operations

use std::path::PathBuf;

use thiserror::Error;

/// Result type for docmap operations
pub type Result<T> = std::result::Result<T, DocmapError>;

/// Everything that can abort a run.
///
/// None of these are caught or retried: the first failure while processing a
/// file ends the whole run, and no output is guaranteed consistent after
/// that.
#[derive(Error, Debug)]
pub enum DocmapError {
    /// A source file could not be parsed into a tree
    #[error("cannot parse {}: {}", .file.display(), .reason)]
    Parse { file: PathBuf, reason: String },

    /// A comment lacks the position data every downstream pass depends on
    #[error("{}:{}: comment has no usable position data", .file.display(), .line)]
    MissingPosition { file: PathBuf, line: usize },

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The position map could not be serialized
    #[error("cannot serialize position map: {0}")]
    Map(#[from] serde_json::Error),
}
