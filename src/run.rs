//! One extraction run: walk, bind, rewrite, emit
//!
//! All state lives in the run itself; nothing is shared across runs. Files
//! are processed strictly one at a time, each file's binding completing
//! before the next file starts, and any failure aborts the whole run.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::binder::{BoundComment, bind_comments};
use crate::document;
use crate::editor;
use crate::error::Result;
use crate::file_utils::read_source_file;
use crate::offset::{self, SourceCache};
use crate::sourcemap;
use crate::syntax;

/// Options for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory tree to process.
    pub root: PathBuf,
    /// Directory the document and map are written into.
    pub out_dir: PathBuf,
    pub doc_name: String,
    pub map_name: String,
    /// Extract and report without writing any file.
    pub dry_run: bool,
    /// Process all files (ignore gitignore filtering).
    pub show_all: bool,
    /// File name patterns to skip.
    pub ignore_patterns: Vec<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            out_dir: PathBuf::from("docmap-out"),
            doc_name: "DOCMAP.md".to_string(),
            map_name: "DOCMAP.md.map".to_string(),
            dry_run: false,
            show_all: false,
            ignore_patterns: Vec::new(),
        }
    }
}

/// What a run did, for the closing summary.
#[derive(Debug, Default, Clone)]
pub struct RunSummary {
    pub files_scanned: usize,
    pub files_rewritten: usize,
    pub comments_extracted: usize,
    pub document_lines: usize,
    pub dry_run: bool,
}

/// Process the whole tree and write the three outputs.
///
/// Files are visited in sorted path order so discovery order, and with it
/// the document and map, is stable across runs.
pub fn execute(options: &RunOptions) -> Result<RunSummary> {
    let mut summary = RunSummary {
        dry_run: options.dry_run,
        ..Default::default()
    };
    let mut collected: Vec<BoundComment> = Vec::new();

    for path in source_files(options) {
        let Some((source, language)) = read_source_file(&path)? else {
            continue;
        };
        summary.files_scanned += 1;

        let mut tree = syntax::parse(&source, language, &path)?;
        let bound = bind_comments(&mut tree, &path)?;
        if bound.is_empty() {
            continue;
        }
        log::debug!("{}: {} tagged comments", path.display(), bound.len());

        let rewritten = editor::rewrite(&tree);
        if !options.dry_run {
            fs::write(&path, rewritten)?;
        }
        summary.files_rewritten += 1;
        collected.extend(bound);
    }

    summary.comments_extracted = collected.len();
    let mut doc = document::assemble(&collected);
    summary.document_lines = doc.lines().count();

    let table = offset::synthesize(&collected, SourceCache::new())?;
    let map = sourcemap::build(&options.doc_name, &options.root, &table);

    if !options.dry_run {
        fs::create_dir_all(&options.out_dir)?;
        if !doc.is_empty() {
            doc.push('\n');
        }
        fs::write(options.out_dir.join(&options.doc_name), doc)?;
        fs::write(
            options.out_dir.join(&options.map_name),
            serde_json::to_string_pretty(&map)?,
        )?;
    }

    Ok(summary)
}

/// Collect candidate files under the root in a stable order.
fn source_files(options: &RunOptions) -> Vec<PathBuf> {
    let mut builder = WalkBuilder::new(&options.root);
    if options.show_all {
        builder
            .hidden(false)
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false);
    } else {
        builder
            .hidden(true)
            .ignore(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true);
    }
    builder.sort_by_file_path(|a, b| a.cmp(b));

    let mut files = Vec::new();
    for entry in builder.build().flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.components().any(|c| c.as_os_str() == ".git") {
            continue;
        }
        if should_ignore_path(path, &options.ignore_patterns) {
            continue;
        }
        files.push(path.to_path_buf());
    }
    files
}

/// Check a file name against the `-I` patterns.
fn should_ignore_path(path: &Path, ignore_patterns: &[String]) -> bool {
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    ignore_patterns
        .iter()
        .any(|pattern| name == *pattern || glob_match(pattern, &name))
}

/// Match a glob pattern against a name.
fn glob_match(pattern: &str, name: &str) -> bool {
    glob::Pattern::new(pattern)
        .map(|p| p.matches(name))
        .unwrap_or(false)
}

/// Print the one-line closing summary.
pub fn print_summary(summary: &RunSummary, use_color: bool) -> io::Result<()> {
    let choice = if use_color {
        ColorChoice::Always
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    let mut count_spec = ColorSpec::new();
    count_spec.set_fg(Some(Color::Green)).set_bold(true);

    stdout.set_color(&count_spec)?;
    write!(stdout, "{}", summary.comments_extracted)?;
    stdout.reset()?;
    write!(stdout, " comments extracted from ")?;
    stdout.set_color(&count_spec)?;
    write!(stdout, "{}", summary.files_rewritten)?;
    stdout.reset()?;
    write!(
        stdout,
        " of {} source files",
        summary.files_scanned
    )?;
    if summary.dry_run {
        write!(stdout, " (dry run, nothing written)")?;
    }
    writeln!(stdout)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn options_for(dir: &TempDir) -> RunOptions {
        RunOptions {
            root: dir.path().to_path_buf(),
            out_dir: dir.path().join("docmap-out"),
            ..Default::default()
        }
    }

    #[test]
    fn test_execute_writes_all_three_outputs() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("app.js");
        fs::write(&file, "const x = 1; // #DOCMAP_v0.0.1: hello\n").unwrap();

        let summary = execute(&options_for(&dir)).unwrap();
        assert_eq!(summary.comments_extracted, 1);
        assert_eq!(summary.files_rewritten, 1);

        assert_eq!(fs::read_to_string(&file).unwrap(), "const x = 1;\n");
        let doc = fs::read_to_string(dir.path().join("docmap-out/DOCMAP.md")).unwrap();
        assert_eq!(doc, "hello\n");
        let map: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("docmap-out/DOCMAP.md.map")).unwrap())
                .unwrap();
        assert_eq!(map["version"], 3);
        assert_eq!(map["sources"][0], "app.js");
        assert_eq!(map["mappings"], "AAAA");
    }

    #[test]
    fn test_embedded_source_is_the_rewritten_text() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("app.js");
        fs::write(&file, "const x = 1; // #DOCMAP_v0.0.1: hello\n").unwrap();

        execute(&options_for(&dir)).unwrap();
        let map: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("docmap-out/DOCMAP.md.map")).unwrap())
                .unwrap();
        assert_eq!(map["sourcesContent"][0], "const x = 1;\n");
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("app.js");
        let original = "const x = 1; // #DOCMAP_v0.0.1: hello\n";
        fs::write(&file, original).unwrap();

        let mut options = options_for(&dir);
        options.dry_run = true;
        let summary = execute(&options).unwrap();

        assert_eq!(summary.comments_extracted, 1);
        assert!(summary.dry_run);
        assert_eq!(fs::read_to_string(&file).unwrap(), original);
        assert!(!options.out_dir.exists());
    }

    #[test]
    fn test_files_without_tags_are_not_rewritten() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("app.js");
        let original = "const x = 1;\n\n\n\nconst y = 2; // plain\n";
        fs::write(&file, original).unwrap();

        let summary = execute(&options_for(&dir)).unwrap();
        assert_eq!(summary.files_rewritten, 0);
        // No bound comments means no reflow either: the file is untouched.
        assert_eq!(fs::read_to_string(&file).unwrap(), original);
    }

    #[test]
    fn test_discovery_order_is_sorted_by_path() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("b.js"),
            "const b = 1; // #DOCMAP_v0.0.1: from b\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("a.js"),
            "const a = 1; // #DOCMAP_v0.0.1: from a\n",
        )
        .unwrap();

        execute(&options_for(&dir)).unwrap();
        let doc = fs::read_to_string(dir.path().join("docmap-out/DOCMAP.md")).unwrap();
        assert_eq!(doc, "from a\n\nfrom b\n");
    }

    #[test]
    fn test_ignore_patterns_skip_files() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("keep.js"),
            "const a = 1; // #DOCMAP_v0.0.1: kept\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("skip.test.js"),
            "const b = 1; // #DOCMAP_v0.0.1: skipped\n",
        )
        .unwrap();

        let mut options = options_for(&dir);
        options.ignore_patterns = vec!["*.test.js".to_string()];
        execute(&options).unwrap();

        let doc = fs::read_to_string(dir.path().join("docmap-out/DOCMAP.md")).unwrap();
        assert_eq!(doc, "kept\n");
    }

    #[test]
    fn test_parse_failure_aborts_the_run() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.js"), "const = ;;;(\n").unwrap();
        fs::write(
            dir.path().join("good.js"),
            "const a = 1; // #DOCMAP_v0.0.1: fine\n",
        )
        .unwrap();

        assert!(execute(&options_for(&dir)).is_err());
    }

    #[test]
    fn test_empty_tree_still_writes_empty_outputs() {
        let dir = TempDir::new().unwrap();
        let summary = execute(&options_for(&dir)).unwrap();
        assert_eq!(summary.comments_extracted, 0);
        assert_eq!(
            fs::read_to_string(dir.path().join("docmap-out/DOCMAP.md")).unwrap(),
            ""
        );
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("*.js", "main.js"));
        assert!(!glob_match("*.js", "main.rs"));
        assert!(glob_match("test?.js", "test1.js"));
        assert!(glob_match("exact", "exact"));
        assert!(!glob_match("exact", "notexact"));
    }
}
