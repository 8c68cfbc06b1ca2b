//! Error types.
//!
//! Nothing in the core is fatal. Every error here ends up as a status-line
//! message: the `Display` text of each variant is exactly what the user
//! sees.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A failed file operation.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("Error: Cannot open file '{}'.", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error saving file: {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File '{}' is empty.", path.display())]
    Empty { path: PathBuf },
}

impl FileError {
    /// The path the operation was about.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Open { path, .. } | Self::Write { path, .. } | Self::Empty { path } => path,
        }
    }
}

/// A rejected ex command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("No command entered.")]
    Empty,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("No filename specified. Use :w <filename> to save.")]
    NoFileName,

    #[error("No filename specified. Use :w <filename> to save before quitting.")]
    NoFileNameOnQuit,

    #[error("E37: No write since last change (add ! to override)")]
    Unsaved,

    #[error("Usage: :r <filename>")]
    ReadUsage,

    #[error("E518: Unknown option: {0}")]
    UnknownOption(String),

    #[error("E474: Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    File(#[from] FileError),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_status_text() {
        assert_eq!(
            CommandError::Unsaved.to_string(),
            "E37: No write since last change (add ! to override)"
        );
        assert_eq!(
            CommandError::Unknown("foo".into()).to_string(),
            "Unknown command: foo"
        );
        assert_eq!(CommandError::Empty.to_string(), "No command entered.");
    }

    #[test]
    fn file_errors_pass_through_transparently() {
        let err: CommandError = FileError::Empty {
            path: PathBuf::from("x.txt"),
        }
        .into();
        assert_eq!(err.to_string(), "File 'x.txt' is empty.");
    }

    #[test]
    fn open_error_keeps_source() {
        let err = FileError::Open {
            path: PathBuf::from("/nope"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(err.to_string(), "Error: Cannot open file '/nope'.");
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.path(), std::path::Path::new("/nope"));
    }
}
