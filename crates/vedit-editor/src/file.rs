//! Persistence: reading and writing plain newline-delimited text files.
//!
//! The editor talks to storage through the [`FileStore`] trait so tests can
//! swap the disk for memory. [`DiskStore`] is the real implementation.
//!
//! # Format
//!
//! - Loading splits on `\n`. A final `\n` does not start another line, and
//!   `\r` is kept as line content.
//! - Saving writes every line followed by `\n`, the last one included. An
//!   empty last line therefore produces a file ending in a blank line.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::FileError;

/// Storage backend for buffers.
pub trait FileStore {
    /// True if something exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Read the lines of `path`.
    ///
    /// # Errors
    ///
    /// [`FileError::Open`] when the file cannot be opened or read.
    fn load(&self, path: &Path) -> Result<Vec<String>, FileError>;

    /// Write `lines` to `path`, replacing any previous content.
    ///
    /// # Errors
    ///
    /// [`FileError::Write`] when the file cannot be created or written.
    fn save(&mut self, path: &Path, lines: &[String]) -> Result<(), FileError>;
}

/// The file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskStore;

impl FileStore for DiskStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn load(&self, path: &Path) -> Result<Vec<String>, FileError> {
        let bytes = fs::read(path).map_err(|source| FileError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8_lossy(&bytes);
        tracing::info!(path = %path.display(), bytes = bytes.len(), "loaded file");
        Ok(split_lines(&text))
    }

    fn save(&mut self, path: &Path, lines: &[String]) -> Result<(), FileError> {
        fs::write(path, join_lines(lines)).map_err(|source| {
            tracing::warn!(path = %path.display(), %source, "write failed");
            FileError::Write {
                path: path.to_path_buf(),
                source,
            }
        })?;
        tracing::info!(path = %path.display(), lines = lines.len(), "saved file");
        Ok(())
    }
}

/// Split file content into lines the way a line reader does.
#[must_use]
pub fn split_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let body = text.strip_suffix('\n').unwrap_or(text);
    body.split('\n').map(str::to_owned).collect()
}

/// Join lines into file content, terminating each one.
#[must_use]
pub fn join_lines(lines: &[String]) -> String {
    let mut out = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// A store that keeps files in a map. Used by tests of the editor core.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    files: std::collections::HashMap<PathBuf, Vec<String>>,
    /// When set, every save fails.
    pub read_only: bool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, lines: &[&str]) -> Self {
        self.files
            .insert(path.into(), lines.iter().map(|&s| s.to_owned()).collect());
        self
    }

    /// Content of a stored file.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&[String]> {
        self.files.get(path).map(Vec::as_slice)
    }
}

impl FileStore for MemoryStore {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn load(&self, path: &Path) -> Result<Vec<String>, FileError> {
        self.files.get(path).cloned().ok_or_else(|| FileError::Open {
            path: path.to_path_buf(),
            source: io::Error::from(io::ErrorKind::NotFound),
        })
    }

    fn save(&mut self, path: &Path, lines: &[String]) -> Result<(), FileError> {
        if self.read_only {
            return Err(FileError::Write {
                path: path.to_path_buf(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            });
        }
        self.files.insert(path.to_path_buf(), lines.to_vec());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn split_drops_final_terminator_only() {
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b"]);
        assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\n\n"), vec!["a", ""]);
        assert!(split_lines("").is_empty());
        assert_eq!(split_lines("\n"), vec![""]);
    }

    #[test]
    fn split_keeps_carriage_returns() {
        assert_eq!(split_lines("a\r\nb\r\n"), vec!["a\r", "b\r"]);
    }

    #[test]
    fn join_terminates_every_line() {
        let lines = vec!["a".to_owned(), String::new()];
        assert_eq!(join_lines(&lines), "a\n\n");
    }

    #[test]
    fn disk_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        let mut store = DiskStore;
        assert!(!store.exists(&path));

        let lines = vec!["first".to_owned(), "second".to_owned(), String::new()];
        store.save(&path, &lines).unwrap();
        assert!(store.exists(&path));
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n\n");
        assert_eq!(store.load(&path).unwrap(), lines);
    }

    #[test]
    fn disk_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = DiskStore.load(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, FileError::Open { .. }));
    }

    #[test]
    fn disk_save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/file.txt");
        let err = DiskStore.save(&path, &["x".to_owned()]).unwrap_err();
        assert!(matches!(err, FileError::Write { .. }));
    }

    #[test]
    fn memory_store_read_only() {
        let mut store = MemoryStore::new().with_file("a", &["1"]);
        assert_eq!(store.load(Path::new("a")).unwrap(), vec!["1"]);
        store.read_only = true;
        assert!(store.save(Path::new("b"), &[]).is_err());
        assert!(!store.exists(Path::new("b")));
    }
}
