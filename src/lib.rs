//! Docmap - pulls tagged doc comments out of a source tree into one document
//! with a position map back to the code

pub mod binder;
pub mod document;
pub mod editor;
pub mod error;
pub mod file_utils;
pub mod language;
pub mod locate;
pub mod offset;
pub mod run;
pub mod sourcemap;
pub mod syntax;
pub mod tag;

pub use binder::{BoundComment, Role, bind_comments};
pub use error::{DocmapError, Result};
pub use language::Language;
pub use run::{RunOptions, RunSummary, execute, print_summary};
pub use tag::{SENTINEL, match_tag};
