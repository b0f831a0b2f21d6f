//! Shared file reading utilities
//!
//! Size-capped source reading with extension detection, shared by the run
//! pipeline and the tests.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;
use crate::language::Language;

/// Default maximum file size for extraction (1MB).
/// Files larger than this are skipped to prevent excessive memory usage.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_000_000;

/// Global configurable max file size. Set via `set_max_file_size()`.
static MAX_FILE_SIZE: AtomicU64 = AtomicU64::new(DEFAULT_MAX_FILE_SIZE);

/// Set the maximum file size for extraction.
/// This affects all subsequent calls to `read_source_file`.
pub fn set_max_file_size(size: u64) {
    MAX_FILE_SIZE.store(size, Ordering::SeqCst);
}

/// Get the current maximum file size setting.
pub fn get_max_file_size() -> u64 {
    MAX_FILE_SIZE.load(Ordering::SeqCst)
}

/// Read a source file if it is one docmap processes.
///
/// Returns `Ok(None)` when the file should be skipped: unrecognized
/// extension, larger than the configured cap, or not valid UTF-8. Real I/O
/// failures are errors and abort the run.
pub fn read_source_file(path: &Path) -> Result<Option<(String, Language)>> {
    let Some(language) = Language::from_path(path) else {
        return Ok(None);
    };

    let metadata = path.metadata()?;
    if metadata.len() > get_max_file_size() {
        log::debug!(
            "{}: skipped, larger than {} bytes",
            path.display(),
            get_max_file_size()
        );
        return Ok(None);
    }

    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some((content, language))),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            log::warn!("{}: skipped, not valid UTF-8", path.display());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Serializes tests that modify MAX_FILE_SIZE so parallel tests don't
    // interfere with each other.
    static MAX_FILE_SIZE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_read_source_file_success() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("app.js");
        fs::write(&file_path, "const x = 1;").unwrap();

        let result = read_source_file(&file_path).unwrap();
        let (content, language) = result.unwrap();
        assert_eq!(content, "const x = 1;");
        assert_eq!(language, Language::JavaScript);
    }

    #[test]
    fn test_read_source_file_no_extension() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("Makefile");
        fs::write(&file_path, "all: build").unwrap();

        assert!(read_source_file(&file_path).unwrap().is_none());
    }

    #[test]
    fn test_read_source_file_unrecognized_extension() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("notes.txt");
        fs::write(&file_path, "some notes").unwrap();

        assert!(read_source_file(&file_path).unwrap().is_none());
    }

    #[test]
    fn test_read_source_file_nonexistent_is_error() {
        // A file with a supported extension that cannot be read is an I/O
        // failure, not a skip.
        let result = read_source_file(Path::new("/nonexistent/app.js"));
        assert!(result.is_err());
    }

    #[test]
    fn test_read_source_file_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("app.JS");
        fs::write(&file_path, "const x = 1;").unwrap();

        let result = read_source_file(&file_path).unwrap();
        let (_, language) = result.unwrap();
        assert_eq!(language, Language::JavaScript);
    }

    #[test]
    fn test_invalid_utf8_is_skipped() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("binary.js");
        fs::write(&file_path, [0xFF, 0xFE, 0x00, 0x01]).unwrap();

        assert!(read_source_file(&file_path).unwrap().is_none());
    }

    #[test]
    fn test_file_over_max_size_is_skipped() {
        let _lock = MAX_FILE_SIZE_TEST_LOCK.lock().unwrap();
        let original_max = get_max_file_size();

        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("big.js");
        let test_max_size = 50_000u64;
        set_max_file_size(test_max_size);

        // Exactly at the limit is read (the check uses > not >=)
        fs::write(&file_path, "x".repeat(test_max_size as usize)).unwrap();
        assert!(read_source_file(&file_path).unwrap().is_some());

        // One byte over is skipped
        fs::write(&file_path, "x".repeat((test_max_size + 1) as usize)).unwrap();
        assert!(read_source_file(&file_path).unwrap().is_none());

        set_max_file_size(original_max);
    }

    #[test]
    fn test_set_max_file_size() {
        let _lock = MAX_FILE_SIZE_TEST_LOCK.lock().unwrap();
        let original = get_max_file_size();

        set_max_file_size(500_000);
        assert_eq!(get_max_file_size(), 500_000);

        set_max_file_size(original);
    }

    #[test]
    fn test_empty_file() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("empty.ts");
        fs::write(&file_path, "").unwrap();

        let result = read_source_file(&file_path).unwrap();
        let (content, language) = result.unwrap();
        assert_eq!(content, "");
        assert_eq!(language, Language::TypeScript);
    }

    #[test]
    fn test_default_max_file_size() {
        assert_eq!(DEFAULT_MAX_FILE_SIZE, 1_000_000);
    }
}
