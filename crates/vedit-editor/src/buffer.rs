//! Text buffer: the ordered sequence of lines being edited.
//!
//! A `Buffer` wraps a [`ropey::Rope`] and exposes it as a list of lines that
//! never contain their own terminator. Lines are joined by a single `\n` in
//! the rope and the last line has no trailing newline, so a rope of `N`
//! newlines is always exactly `N + 1` lines.
//!
//! # Invariants
//!
//! - **Never empty.** An empty rope is one empty line. Removing every line
//!   leaves that single empty line behind.
//! - **Columns are char offsets**, not byte offsets.
//! - **Positions are clamped.** Every editing method clamps its positions
//!   into the buffer instead of panicking; the interpreter never has to
//!   pre-validate a motion result before handing it over.
//!
//! # Snapshots
//!
//! [`Buffer::snapshot`] clones the rope. Rope clones share their tree nodes,
//! so the undo stack can hold one full snapshot per change without copying
//! the text. Comparing a snapshot with the live buffer is a content check,
//! which is what the "unmodified" test and the undo policy both need.

use std::fmt;

use ropey::Rope;

use crate::position::{Position, Range};

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// An immutable copy of a buffer's content.
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot(Rope);

impl Snapshot {
    /// Number of lines in the captured content.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.0.len_lines()
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Snapshot({} lines)", self.line_count())
    }
}

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

/// A line-oriented text buffer backed by a rope.
#[derive(Clone, PartialEq, Eq)]
pub struct Buffer {
    rope: Rope,
}

impl Buffer {
    // -- Construction -------------------------------------------------------

    /// A buffer holding one empty line.
    #[must_use]
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Build a buffer from a list of lines. An empty list yields one empty
    /// line.
    #[must_use]
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut text = String::new();
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            text.push_str(line.as_ref());
        }
        Self {
            rope: Rope::from_str(&text),
        }
    }

    /// Build a buffer from `\n`-separated text.
    ///
    /// Every `\n` starts a new line, so `"a\n"` is the two lines `"a"` and
    /// `""`.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    // -- Text access --------------------------------------------------------

    /// Number of lines. Always at least 1.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Index of the last line.
    #[inline]
    #[must_use]
    pub fn last_line(&self) -> usize {
        self.line_count() - 1
    }

    /// Content of a line without its terminator. Empty for out-of-range lines.
    #[must_use]
    pub fn line(&self, line: usize) -> String {
        if line >= self.line_count() {
            return String::new();
        }
        let mut text = self.rope.line(line).to_string();
        if text.ends_with('\n') {
            text.pop();
        }
        text
    }

    /// Number of chars in a line, excluding the terminator. 0 when the line
    /// does not exist.
    #[must_use]
    pub fn line_len(&self, line: usize) -> usize {
        if line >= self.line_count() {
            return 0;
        }
        let slice = self.rope.line(line);
        let total = slice.len_chars();
        if total > 0 && slice.char(total - 1) == '\n' {
            total - 1
        } else {
            total
        }
    }

    /// The character at `pos`, or `None` past the end of its line.
    #[must_use]
    pub fn char_at(&self, pos: Position) -> Option<char> {
        if pos.line >= self.line_count() || pos.col >= self.line_len(pos.line) {
            return None;
        }
        Some(self.rope.char(self.rope.line_to_char(pos.line) + pos.col))
    }

    /// All lines, in order.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        (0..self.line_count()).map(|i| self.line(i)).collect()
    }

    /// The whole buffer as `\n`-joined text.
    #[must_use]
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    /// The text covered by `range`.
    #[must_use]
    pub fn text(&self, range: Range) -> String {
        let start = self.char_idx(range.start);
        let end = self.char_idx(range.end);
        self.rope.slice(start..end).to_string()
    }

    // -- Coordinate conversion ----------------------------------------------

    /// Absolute char index of `pos`, clamped to the buffer.
    ///
    /// The line is clamped to the last line and the column to the line
    /// length, so the result is always a valid insertion point.
    #[must_use]
    pub fn char_idx(&self, pos: Position) -> usize {
        let line = pos.line.min(self.last_line());
        self.rope.line_to_char(line) + pos.col.min(self.line_len(line))
    }

    /// Position of an absolute char index, clamped to the end of the buffer.
    #[must_use]
    pub fn position_of(&self, char_idx: usize) -> Position {
        let idx = char_idx.min(self.rope.len_chars());
        let line = self.rope.char_to_line(idx);
        Position::new(line, idx - self.rope.line_to_char(line))
    }

    // -- Editing ------------------------------------------------------------

    /// Insert a single character. `'\n'` splits the line at `pos`.
    pub fn insert_char(&mut self, pos: Position, ch: char) {
        let idx = self.char_idx(pos);
        self.rope.insert_char(idx, ch);
    }

    /// Insert text at `pos`. Embedded newlines create new lines.
    pub fn insert(&mut self, pos: Position, text: &str) {
        let idx = self.char_idx(pos);
        self.rope.insert(idx, text);
    }

    /// Delete the text in `range` and return it.
    pub fn delete(&mut self, range: Range) -> String {
        let start = self.char_idx(range.start);
        let end = self.char_idx(range.end);
        if start >= end {
            return String::new();
        }
        let removed = self.rope.slice(start..end).to_string();
        self.rope.remove(start..end);
        removed
    }

    /// Remove up to `count` whole lines starting at `first` and return them.
    ///
    /// Removing every line leaves one empty line.
    pub fn remove_lines(&mut self, first: usize, count: usize) -> Vec<String> {
        let total = self.line_count();
        if first >= total || count == 0 {
            return Vec::new();
        }
        let end_line = first.saturating_add(count).min(total);
        let removed = (first..end_line).map(|i| self.line(i)).collect();

        let (start, end) = if end_line < total {
            (
                self.rope.line_to_char(first),
                self.rope.line_to_char(end_line),
            )
        } else if first > 0 {
            // Taking the tail: swallow the newline that ended the line above.
            (self.rope.line_to_char(first) - 1, self.rope.len_chars())
        } else {
            (0, self.rope.len_chars())
        };
        self.rope.remove(start..end);
        removed
    }

    /// Insert whole lines so that the first of them becomes line `at`.
    ///
    /// `at` is clamped to `line_count()`, which appends after the last line.
    pub fn insert_lines<S: AsRef<str>>(&mut self, at: usize, lines: &[S]) {
        if lines.is_empty() {
            return;
        }
        let joined = lines
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\n");
        if at >= self.line_count() {
            let end = self.rope.len_chars();
            self.rope.insert(end, &format!("\n{joined}"));
        } else {
            let idx = self.rope.line_to_char(at);
            self.rope.insert(idx, &format!("{joined}\n"));
        }
    }

    /// Replace the content of one line.
    pub fn set_line(&mut self, line: usize, text: &str) {
        if line >= self.line_count() {
            return;
        }
        let start = self.rope.line_to_char(line);
        let end = start + self.line_len(line);
        self.rope.remove(start..end);
        self.rope.insert(start, text);
    }

    // -- Snapshots ----------------------------------------------------------

    /// Capture the current content.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot(self.rope.clone())
    }

    /// Replace the content with a previously captured snapshot.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.rope = snapshot.0.clone();
    }

    /// True when the content equals `snapshot`.
    #[must_use]
    pub fn matches(&self, snapshot: &Snapshot) -> bool {
        self.rope == snapshot.0
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.lines()).finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn buf(lines: &[&str]) -> Buffer {
        Buffer::from_lines(lines)
    }

    // -- construction --

    #[test]
    fn new_buffer_has_one_empty_line() {
        let b = Buffer::new();
        assert_eq!(b.line_count(), 1);
        assert_eq!(b.line(0), "");
        assert_eq!(b.line_len(0), 0);
    }

    #[test]
    fn from_empty_lines_is_one_empty_line() {
        let b = Buffer::from_lines::<&str>(&[]);
        assert_eq!(b.lines(), vec![String::new()]);
    }

    #[test]
    fn from_lines_round_trips() {
        let b = buf(&["one", "two", "", "four"]);
        assert_eq!(b.line_count(), 4);
        assert_eq!(b.lines(), vec!["one", "two", "", "four"]);
    }

    #[test]
    fn carriage_return_is_line_content() {
        let b = Buffer::from_text("a\rb\nc");
        assert_eq!(b.line_count(), 2);
        assert_eq!(b.line(0), "a\rb");
    }

    #[test]
    fn from_text_trailing_newline_adds_empty_line() {
        assert_eq!(Buffer::from_text("a\n").lines(), vec!["a", ""]);
    }

    // -- access --

    #[test]
    fn line_len_counts_chars() {
        let b = buf(&["café", "x"]);
        assert_eq!(b.line_len(0), 4);
        assert_eq!(b.line_len(1), 1);
        assert_eq!(b.line_len(9), 0);
    }

    #[test]
    fn char_at_respects_line_end() {
        let b = buf(&["ab", "c"]);
        assert_eq!(b.char_at(Position::new(0, 1)), Some('b'));
        assert_eq!(b.char_at(Position::new(0, 2)), None);
        assert_eq!(b.char_at(Position::new(1, 0)), Some('c'));
        assert_eq!(b.char_at(Position::new(2, 0)), None);
    }

    #[test]
    fn char_idx_clamps() {
        let b = buf(&["abc", "de"]);
        assert_eq!(b.char_idx(Position::new(0, 99)), 3);
        assert_eq!(b.char_idx(Position::new(1, 1)), 5);
        assert_eq!(b.char_idx(Position::new(7, 0)), 4);
    }

    #[test]
    fn position_of_inverts_char_idx() {
        let b = buf(&["abc", "de"]);
        assert_eq!(b.position_of(4), Position::new(1, 0));
        assert_eq!(b.position_of(100), Position::new(1, 2));
    }

    #[test]
    fn text_spans_lines() {
        let b = buf(&["abc", "def"]);
        let r = Range::ordered(Position::new(0, 1), Position::new(1, 2));
        assert_eq!(b.text(r), "bc\nde");
    }

    // -- editing --

    #[test]
    fn insert_newline_splits_line() {
        let mut b = buf(&["hello"]);
        b.insert_char(Position::new(0, 2), '\n');
        assert_eq!(b.lines(), vec!["he", "llo"]);
    }

    #[test]
    fn delete_returns_removed_text() {
        let mut b = buf(&["abc", "def"]);
        let removed = b.delete(Range::ordered(Position::new(0, 0), Position::new(1, 0)));
        assert_eq!(removed, "abc\n");
        assert_eq!(b.lines(), vec!["def"]);
    }

    #[test]
    fn delete_empty_range_is_noop() {
        let mut b = buf(&["abc"]);
        let p = Position::new(0, 1);
        assert_eq!(b.delete(Range::ordered(p, p)), "");
        assert_eq!(b.lines(), vec!["abc"]);
    }

    #[test]
    fn remove_lines_middle() {
        let mut b = buf(&["a", "b", "c", "d"]);
        assert_eq!(b.remove_lines(1, 2), vec!["b", "c"]);
        assert_eq!(b.lines(), vec!["a", "d"]);
    }

    #[test]
    fn remove_lines_tail() {
        let mut b = buf(&["a", "b", "c"]);
        assert_eq!(b.remove_lines(1, 5), vec!["b", "c"]);
        assert_eq!(b.lines(), vec!["a"]);
    }

    #[test]
    fn remove_every_line_leaves_one_empty_line() {
        let mut b = buf(&["a", "b"]);
        assert_eq!(b.remove_lines(0, 2), vec!["a", "b"]);
        assert_eq!(b.lines(), vec![""]);
        assert_eq!(b.line_count(), 1);
    }

    #[test]
    fn remove_lines_out_of_range() {
        let mut b = buf(&["a"]);
        assert!(b.remove_lines(3, 1).is_empty());
        assert!(b.remove_lines(0, 0).is_empty());
        assert_eq!(b.lines(), vec!["a"]);
    }

    #[test]
    fn insert_lines_before_and_after() {
        let mut b = buf(&["a", "d"]);
        b.insert_lines(1, &["b", "c"]);
        assert_eq!(b.lines(), vec!["a", "b", "c", "d"]);
        b.insert_lines(99, &["e"]);
        assert_eq!(b.lines(), vec!["a", "b", "c", "d", "e"]);
        b.insert_lines(0, &["_"]);
        assert_eq!(b.lines()[0], "_");
    }

    #[test]
    fn insert_lines_into_empty_buffer() {
        let mut b = Buffer::new();
        b.insert_lines(1, &["x"]);
        assert_eq!(b.lines(), vec!["", "x"]);
    }

    #[test]
    fn set_line_replaces_content_only() {
        let mut b = buf(&["abc", "def"]);
        b.set_line(0, "XY");
        assert_eq!(b.lines(), vec!["XY", "def"]);
        b.set_line(5, "nope");
        assert_eq!(b.line_count(), 2);
    }

    // -- snapshots --

    #[test]
    fn snapshot_restore() {
        let mut b = buf(&["one", "two"]);
        let snap = b.snapshot();
        b.remove_lines(0, 1);
        assert!(!b.matches(&snap));
        b.restore(&snap);
        assert!(b.matches(&snap));
        assert_eq!(b.lines(), vec!["one", "two"]);
    }

    #[test]
    fn snapshot_is_independent_of_later_edits() {
        let mut b = buf(&["abc"]);
        let snap = b.snapshot();
        b.insert(Position::new(0, 3), "def");
        assert_eq!(snap.line_count(), 1);
        b.restore(&snap);
        assert_eq!(b.line(0), "abc");
    }
}
