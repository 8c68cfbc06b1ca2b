//! Buffer-wide token classification for syntax colouring.
//!
//! The [`lexer`](crate::lexer) works a line at a time with state threaded
//! between lines. [`Highlighter`] folds it over the whole buffer and keeps
//! the result until the buffer content changes, so painting a frame after a
//! pure cursor motion does not re-scan anything.
//!
//! Colouring applies to C and C++ sources only (see [`detect_language`]).

use std::path::Path;

use crate::buffer::{Buffer, Snapshot};
use crate::lexer::{self, LexState, Token};

/// Detect the language from a file extension.
#[must_use]
pub fn detect_language(path: &Path) -> Option<&'static str> {
    match path.extension()?.to_str()? {
        "c" | "h" => Some("c"),
        "cc" | "cpp" | "cxx" | "hh" | "hpp" | "hxx" => Some("cpp"),
        _ => None,
    }
}

/// Cached tokens for every buffer line.
#[derive(Debug, Default)]
pub struct Highlighter {
    /// Content the cache was built from.
    source: Option<Snapshot>,
    lines: Vec<Vec<Token>>,
}

impl Highlighter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            source: None,
            lines: Vec::new(),
        }
    }

    /// Re-tokenize if the buffer changed since the last call.
    pub fn refresh(&mut self, buf: &Buffer) {
        if self.source.as_ref().is_some_and(|snap| buf.matches(snap)) {
            return;
        }
        self.lines = tokenize_buffer(buf);
        self.source = Some(buf.snapshot());
    }

    /// Tokens of `line`; empty past the end or before the first refresh.
    #[must_use]
    pub fn line(&self, line: usize) -> &[Token] {
        self.lines.get(line).map_or(&[], Vec::as_slice)
    }
}

/// Tokenize every line of `buf` in order from a fresh state.
#[must_use]
pub fn tokenize_buffer(buf: &Buffer) -> Vec<Vec<Token>> {
    let mut state = LexState::new();
    (0..buf.line_count())
        .map(|n| lexer::tokenize(&buf.line(n), &mut state))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
