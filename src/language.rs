//! Source language detection and grammar selection
//!
//! Maps the small fixed set of supported extensions to a language and the
//! tree-sitter grammar used to parse it.

use std::path::Path;

/// Languages docmap can parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    JavaScript,
    TypeScript,
    Tsx,
    Rust,
}

impl Language {
    /// Detect language from a file extension.
    ///
    /// Returns `None` if the extension is not one docmap processes.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "ts" => Some(Language::TypeScript),
            "tsx" => Some(Language::Tsx),
            "rs" => Some(Language::Rust),
            _ => None,
        }
    }

    /// Detect language from a file path.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::from_extension(ext)
    }

    /// Returns the human-readable name of the language.
    pub fn name(&self) -> &'static str {
        match self {
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Tsx => "TSX",
            Language::Rust => "Rust",
        }
    }

    /// Tree-sitter grammar for this language.
    pub fn grammar(&self) -> tree_sitter::Language {
        match self {
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Language::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Language::Rust => tree_sitter_rust::LANGUAGE.into(),
        }
    }

    /// Node kinds the grammar uses for comments.
    pub fn comment_kinds(&self) -> &'static [&'static str] {
        match self {
            Language::JavaScript | Language::TypeScript | Language::Tsx => &["comment"],
            Language::Rust => &["line_comment", "block_comment"],
        }
    }
}
