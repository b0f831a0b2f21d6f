//! CLI entry point for docmap

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use docmap::{RunOptions, execute, print_summary};

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            // Respect FORCE_COLOR environment variable
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            // Respect TERM=dumb
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            // Check if stdout is a TTY
            std::io::stdout().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "docmap")]
#[command(about = "Pull tagged doc comments out of a source tree into one document with a position map")]
#[command(version)]
struct Args {
    /// Directory to process
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Directory for the consolidated document and position map
    #[arg(short = 'o', long = "out", default_value = "docmap-out")]
    out: PathBuf,

    /// File name for the consolidated document
    #[arg(long = "doc-name", default_value = "DOCMAP.md")]
    doc_name: String,

    /// File name for the position map
    #[arg(long = "map-name", default_value = "DOCMAP.md.map")]
    map_name: String,

    /// Extract and report without writing any file
    #[arg(short = 'n', long = "dry-run")]
    dry_run: bool,

    /// Process all files (ignore .gitignore filtering)
    #[arg(short = 'a', long = "all")]
    all: bool,

    /// Ignore files matching pattern (can be used multiple times)
    #[arg(short = 'I', long = "ignore")]
    ignore: Vec<String>,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Maximum file size for extraction (default: 1MB)
    /// Files larger than this are skipped. Use suffixes: K, M, G (e.g. 5M for 5MB)
    #[arg(long = "max-file-size", value_name = "SIZE")]
    max_file_size: Option<String>,
}

/// Parse a file size string like "5M", "100K", "1G" into bytes.
/// Supports suffixes: K/KB (1024), M/MB (1024^2), G/GB (1024^3)
/// Without suffix, interprets as bytes.
fn parse_file_size(s: &str) -> Result<u64, String> {
    let s = s.trim().to_uppercase();
    let (num_str, multiplier) = if let Some(n) = s.strip_suffix("GB") {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix('G') {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("MB") {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix('M') {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("KB") {
        (n, 1024)
    } else if let Some(n) = s.strip_suffix('K') {
        (n, 1024)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("invalid number: {}", num_str))?;

    Ok(num * multiplier)
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Some(ref size_str) = args.max_file_size {
        match parse_file_size(size_str) {
            Ok(size) => docmap::file_utils::set_max_file_size(size),
            Err(e) => {
                eprintln!("docmap: invalid --max-file-size '{}': {}", size_str, e);
                process::exit(1);
            }
        }
    }

    let root = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(&args.path)
    };
    if !root.is_dir() {
        eprintln!(
            "docmap: cannot access '{}': No such directory",
            args.path.display()
        );
        process::exit(1);
    }

    let options = RunOptions {
        root,
        out_dir: args.out.clone(),
        doc_name: args.doc_name.clone(),
        map_name: args.map_name.clone(),
        dry_run: args.dry_run,
        show_all: args.all,
        ignore_patterns: args.ignore.clone(),
    };

    match execute(&options) {
        Ok(summary) => {
            if let Err(e) = print_summary(&summary, should_use_color(args.color)) {
                eprintln!("docmap: error writing output: {}", e);
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("docmap: {}", e);
            process::exit(1);
        }
    }
}
