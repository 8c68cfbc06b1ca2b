//! Editor state: the buffer and cursor model every component mutates.
//!
//! [`Editor`] owns everything a keystroke can change: the text, the cursor,
//! the mode, undo history, clipboard, visual selection, options, the status
//! message and the viewport. There is exactly one per process and it is
//! passed by `&mut` into the interpreter, the operations and the view.
//!
//! The methods here are primitives: single-character edits, line removal,
//! cursor placement that respects the mode's column limit, and viewport
//! scrolling. Key dispatch lives in [`interpreter`](crate::interpreter).

use std::path::{Path, PathBuf};

use crate::buffer::{Buffer, Snapshot};
use crate::cursor::{self, Cursor};
use crate::file::{DiskStore, FileStore};
use crate::history::History;
use crate::key::Key;
use crate::mode::Mode;
use crate::options::Options;
use crate::position::{Position, Range};
use crate::register::Register;
use crate::selection::SelectionTracker;

// ---------------------------------------------------------------------------
// Status message
// ---------------------------------------------------------------------------

/// A transient message for the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub is_error: bool,
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// The window onto the buffer: first visible line and text area size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// First buffer line shown.
    pub top: usize,
    /// Rows available for text (the status line excluded).
    pub height: usize,
    /// Columns available.
    pub width: usize,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            top: 0,
            height: 23,
            width: 80,
        }
    }
}

/// The frame scroll commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scroll {
    /// `Ctrl-D`
    HalfDown,
    /// `Ctrl-U`
    HalfUp,
    /// `Ctrl-F`
    PageForward,
    /// `Ctrl-B`
    PageBackward,
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

/// All mutable editing state.
pub struct Editor {
    pub buffer: Buffer,
    pub cursor: Cursor,
    pub history: History,
    pub register: Register,
    pub selection: SelectionTracker,
    pub options: Options,
    pub viewport: Viewport,
    mode: Mode,
    status: Option<Status>,
    bell: bool,
    running: bool,
    filename: Option<PathBuf>,
    /// Content at startup or at the last successful write.
    baseline: Snapshot,
    /// Keys of the most recent repeatable change.
    last_change: Vec<Key>,
    /// True while `.` is replaying `last_change`.
    replaying: bool,
    store: Box<dyn FileStore>,
}

impl Editor {
    // -- Construction -------------------------------------------------------

    /// An untitled editor with one empty line, backed by the disk.
    #[must_use]
    pub fn new() -> Self {
        Self::with_store(Buffer::new(), Box::new(DiskStore))
    }

    /// An editor on `buffer` using `store` for `:w` and `:r`.
    #[must_use]
    pub fn with_store(buffer: Buffer, store: Box<dyn FileStore>) -> Self {
        let baseline = buffer.snapshot();
        Self {
            buffer,
            cursor: Cursor::new(),
            history: History::new(),
            register: Register::new(),
            selection: SelectionTracker::new(),
            options: Options::default(),
            viewport: Viewport::default(),
            mode: Mode::Command,
            status: None,
            bell: false,
            running: true,
            filename: None,
            baseline,
            last_change: Vec::new(),
            replaying: false,
            store,
        }
    }

    /// Startup: load `path` if it exists, otherwise start empty but bound
    /// to it so the first `:w` creates it. A load failure leaves an empty
    /// buffer and an error on the status line.
    #[must_use]
    pub fn open(path: Option<PathBuf>, store: Box<dyn FileStore>) -> Self {
        let Some(path) = path else {
            return Self::with_store(Buffer::new(), store);
        };
        let mut status = None;
        let buffer = if store.exists(&path) {
            match store.load(&path) {
                Ok(lines) => Buffer::from_lines(&lines),
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "load failed");
                    status = Some(Status {
                        text: err.to_string(),
                        is_error: true,
                    });
                    Buffer::new()
                }
            }
        } else {
            tracing::info!(path = %path.display(), "new file");
            Buffer::new()
        };
        let mut ed = Self::with_store(buffer, store);
        ed.filename = Some(path);
        ed.status = status;
        ed
    }

    // -- Mode ---------------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch mode and pull the cursor inside the new column limit.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            tracing::debug!(from = %self.mode, to = %mode, "mode switch");
        }
        self.mode = mode;
        self.cursor.clamp(&self.buffer, mode.cursor_past_end());
    }

    // -- Cursor -------------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.cursor.position()
    }

    #[inline]
    #[must_use]
    pub const fn past_end(&self) -> bool {
        self.mode.cursor_past_end()
    }

    /// Place the cursor, clamped for the current mode.
    pub fn move_to(&mut self, pos: Position) {
        self.cursor.set_position(pos, &self.buffer, self.past_end());
        self.scroll_to_cursor();
    }

    /// Place the cursor allowing the slot past the line end, whatever the
    /// mode. Used by edits that are followed by a mode change.
    pub fn move_to_unclamped(&mut self, pos: Position) {
        self.cursor.set_position(pos, &self.buffer, true);
        self.scroll_to_cursor();
    }

    /// Re-clamp after the buffer changed under the cursor.
    pub fn clamp_cursor(&mut self) {
        self.cursor.clamp(&self.buffer, self.past_end());
        self.scroll_to_cursor();
    }

    /// Move the cursor to the first non-blank of its line. Blank lines put
    /// it at the end.
    pub fn move_to_first_non_blank(&mut self) {
        self.cursor
            .move_to_first_non_blank(&self.buffer, self.past_end());
    }

    // -- Single-character edits ---------------------------------------------

    /// Insert `ch` at the cursor and move past it. `'\n'` splits the line
    /// and moves to the start of the new one.
    pub fn insert_char(&mut self, ch: char) {
        let pos = self.position();
        self.buffer.insert_char(pos, ch);
        let next = if ch == '\n' {
            Position::new(pos.line + 1, 0)
        } else {
            Position::new(pos.line, pos.col + 1)
        };
        self.move_to_unclamped(next);
    }

    /// Insert `text` at the cursor, leaving the cursor just past it.
    pub fn insert_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.insert_char(ch);
        }
    }

    /// Backspace: remove the character before the cursor, joining with the
    /// previous line at column 0. Returns the removed character (`'\n'` for
    /// a join), or `None` at the very start of the buffer.
    pub fn delete_backward(&mut self) -> Option<char> {
        let pos = self.position();
        let col = pos.col.min(self.buffer.line_len(pos.line));
        let start = if col > 0 {
            Position::new(pos.line, col - 1)
        } else if pos.line > 0 {
            Position::new(pos.line - 1, self.buffer.line_len(pos.line - 1))
        } else {
            return None;
        };
        let removed = self
            .buffer
            .delete(Range::ordered(start, Position::new(pos.line, col)));
        self.move_to_unclamped(start);
        removed.chars().next()
    }

    /// Delete: remove the character under the cursor, joining the next
    /// line at the end of a line. Returns the removed character, or `None`
    /// at the very end of the buffer.
    pub fn delete_forward(&mut self) -> Option<char> {
        let pos = self.position();
        let len = self.buffer.line_len(pos.line);
        let end = if pos.col < len {
            Position::new(pos.line, pos.col + 1)
        } else if pos.line < self.buffer.last_line() {
            Position::new(pos.line + 1, 0)
        } else {
            return None;
        };
        let removed = self.buffer.delete(Range::ordered(pos, end));
        removed.chars().next()
    }

    // -- Larger edits ---------------------------------------------------------

    /// Delete `range` and put the cursor at its start. Returns the text.
    pub fn delete_range(&mut self, range: Range) -> String {
        let removed = self.buffer.delete(range);
        self.move_to(range.start);
        removed
    }

    /// Remove `count` whole lines starting at `first`. The cursor goes to
    /// column 0 of the line that took their place.
    pub fn remove_lines(&mut self, first: usize, count: usize) -> Vec<String> {
        let removed = self.buffer.remove_lines(first, count);
        self.move_to(Position::new(first, 0));
        removed
    }

    /// Insert whole lines below the cursor line and move to the first.
    pub fn insert_lines_below(&mut self, lines: &[String]) {
        let at = self.position().line + 1;
        self.buffer.insert_lines(at, lines);
        self.move_to(Position::new(at, 0));
    }

    // -- Status and bell ----------------------------------------------------

    #[must_use]
    pub const fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// Show an informational message.
    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            is_error: false,
        });
    }

    /// Show an error message.
    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            is_error: true,
        });
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Reject the current input audibly.
    pub const fn ring_bell(&mut self) {
        self.bell = true;
    }

    /// True if the bell rang since the last call. Clears the flag.
    pub const fn take_bell(&mut self) -> bool {
        std::mem::replace(&mut self.bell, false)
    }

    // -- Session ------------------------------------------------------------

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    pub fn quit(&mut self) {
        tracing::info!("quit");
        self.running = false;
    }

    #[must_use]
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn set_filename(&mut self, path: PathBuf) {
        self.filename = Some(path);
    }

    /// True when the text differs from what was loaded or last written.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        !self.buffer.matches(&self.baseline)
    }

    /// Write the buffer to `path` and make it the new baseline.
    ///
    /// # Errors
    ///
    /// Propagates the store's [`FileError`](crate::error::FileError); the
    /// buffer and baseline are untouched.
    pub fn save(&mut self, path: &Path) -> Result<(), crate::error::FileError> {
        self.store.save(path, &self.buffer.lines())?;
        self.baseline = self.buffer.snapshot();
        Ok(())
    }

    /// Read the lines of `path` through the store.
    ///
    /// # Errors
    ///
    /// Propagates the store's [`FileError`](crate::error::FileError).
    pub fn load(&self, path: &Path) -> Result<Vec<String>, crate::error::FileError> {
        self.store.load(path)
    }

    // -- Repeat buffer --------------------------------------------------------

    #[must_use]
    pub fn last_change(&self) -> &[Key] {
        &self.last_change
    }

    pub fn set_last_change(&mut self, keys: Vec<Key>) {
        tracing::debug!(keys = %keys.iter().map(ToString::to_string).collect::<String>(), "recorded change");
        self.last_change = keys;
    }

    #[must_use]
    pub const fn is_replaying(&self) -> bool {
        self.replaying
    }

    pub const fn set_replaying(&mut self, replaying: bool) {
        self.replaying = replaying;
    }

    // -- Viewport -----------------------------------------------------------

    /// Resize the text area.
    pub fn set_viewport_size(&mut self, height: usize, width: usize) {
        self.viewport.height = height.max(1);
        self.viewport.width = width.max(1);
        self.scroll_to_cursor();
    }

    /// Scroll the minimum needed to bring the cursor line into view.
    pub const fn scroll_to_cursor(&mut self) {
        let line = self.cursor.line();
        let height = if self.viewport.height == 0 { 1 } else { self.viewport.height };
        if line < self.viewport.top {
            self.viewport.top = line;
        } else if line >= self.viewport.top + height {
            self.viewport.top = line + 1 - height;
        }
    }

    /// A frame scroll. The cursor lands on column 0.
    pub fn scroll(&mut self, kind: Scroll) {
        let height = self.viewport.height.max(1);
        let half = (height / 2).max(1);
        let last = self.buffer.last_line();
        let line = self.cursor.line();
        let top = self.viewport.top;
        let (top, line) = match kind {
            Scroll::HalfDown => (
                (top + half).min((last + 1).saturating_sub(height)),
                line + half,
            ),
            Scroll::HalfUp => (top.saturating_sub(half), line.saturating_sub(half)),
            Scroll::PageForward => {
                let top = if top + height <= last { top + height } else { top };
                (top, line + height)
            }
            Scroll::PageBackward => (top.saturating_sub(height), line.saturating_sub(height)),
        };
        self.viewport.top = top;
        self.cursor
            .set_position(Position::new(line, 0), &self.buffer, self.past_end());
        self.scroll_to_cursor();
    }

    // -- Info -----------------------------------------------------------------

    /// The `Ctrl-G` summary.
    #[must_use]
    pub fn file_info(&self) -> String {
        let name = self
            .filename
            .as_ref()
            .map_or_else(|| "[No Name]".to_string(), |p| p.display().to_string());
        let modified = if self.is_modified() { " [Modified]" } else { "" };
        let total = self.buffer.line_count();
        let pos = self.position();
        let percent = (pos.line + 1) * 100 / total;
        format!("\"{name}\"{modified} {total} lines --{percent}%-- {pos}")
    }

    /// Largest column the cursor may take on `line` in the current mode.
    #[must_use]
    pub fn max_col(&self, line: usize) -> usize {
        cursor::max_col(&self.buffer, line, self.past_end())
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("buffer", &self.buffer)
            .field("cursor", &self.cursor)
            .field("mode", &self.mode)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::MemoryStore;
    use pretty_assertions::assert_eq;

    fn ed(lines: &[&str]) -> Editor {
        Editor::with_store(Buffer::from_lines(lines), Box::new(MemoryStore::new()))
    }

    // -- startup --

    #[test]
    fn open_without_path_is_untitled_empty() {
        let e = Editor::open(None, Box::new(MemoryStore::new()));
        assert_eq!(e.buffer.lines(), vec![""]);
        assert_eq!(e.filename(), None);
        assert!(!e.is_modified());
    }

    #[test]
    fn open_existing_file_loads_it() {
        let store = MemoryStore::new().with_file("a.txt", &["one", "two"]);
        let e = Editor::open(Some("a.txt".into()), Box::new(store));
        assert_eq!(e.buffer.lines(), vec!["one", "two"]);
        assert_eq!(e.filename(), Some(Path::new("a.txt")));
        assert!(!e.is_modified());
    }

    #[test]
    fn open_missing_file_binds_name() {
        let e = Editor::open(Some("new.txt".into()), Box::new(MemoryStore::new()));
        assert_eq!(e.buffer.lines(), vec![""]);
        assert_eq!(e.filename(), Some(Path::new("new.txt")));
    }

    #[test]
    fn open_empty_file_is_one_empty_line() {
        let store = MemoryStore::new().with_file("e", &[]);
        let e = Editor::open(Some("e".into()), Box::new(store));
        assert_eq!(e.buffer.lines(), vec![""]);
    }

    // -- edits --

    #[test]
    fn insert_char_and_newline() {
        let mut e = ed(&["ac"]);
        e.set_mode(Mode::Insert);
        e.move_to(Position::new(0, 1));
        e.insert_char('b');
        assert_eq!(e.position(), Position::new(0, 2));
        e.insert_char('\n');
        assert_eq!(e.buffer.lines(), vec!["ab", "c"]);
        assert_eq!(e.position(), Position::new(1, 0));
    }

    #[test]
    fn backspace_joins_lines() {
        let mut e = ed(&["ab", "cd"]);
        e.set_mode(Mode::Insert);
        e.move_to(Position::new(1, 0));
        assert_eq!(e.delete_backward(), Some('\n'));
        assert_eq!(e.buffer.lines(), vec!["abcd"]);
        assert_eq!(e.position(), Position::new(0, 2));
    }

    #[test]
    fn backspace_at_origin_fails() {
        let mut e = ed(&["ab"]);
        assert_eq!(e.delete_backward(), None);
        assert_eq!(e.buffer.lines(), vec!["ab"]);
    }

    #[test]
    fn delete_forward_joins_at_line_end() {
        let mut e = ed(&["ab", "cd"]);
        e.set_mode(Mode::Insert);
        e.move_to(Position::new(0, 2));
        assert_eq!(e.delete_forward(), Some('\n'));
        assert_eq!(e.buffer.lines(), vec!["abcd"]);
        e.move_to(Position::new(0, 4));
        assert_eq!(e.delete_forward(), None);
    }

    #[test]
    fn mode_switch_clamps_cursor() {
        let mut e = ed(&["abc"]);
        e.set_mode(Mode::Insert);
        e.move_to(Position::new(0, 3));
        e.set_mode(Mode::Command);
        assert_eq!(e.position(), Position::new(0, 2));
    }

    // -- status --

    #[test]
    fn bell_is_taken_once() {
        let mut e = ed(&[""]);
        e.ring_bell();
        assert!(e.take_bell());
        assert!(!e.take_bell());
    }

    #[test]
    fn status_messages() {
        let mut e = ed(&[""]);
        e.set_error("bad");
        assert_eq!(
            e.status(),
            Some(&Status {
                text: "bad".into(),
                is_error: true
            })
        );
        e.clear_status();
        assert_eq!(e.status(), None);
    }

    // -- save baseline --

    #[test]
    fn save_resets_modified() {
        let mut e = ed(&["x"]);
        e.buffer.set_line(0, "y");
        assert!(e.is_modified());
        e.save(Path::new("out")).unwrap();
        assert!(!e.is_modified());
    }

    #[test]
    fn failed_save_keeps_modified() {
        let mut store = MemoryStore::new();
        store.read_only = true;
        let mut e = Editor::with_store(Buffer::from_lines(&["x"]), Box::new(store));
        e.buffer.set_line(0, "y");
        assert!(e.save(Path::new("out")).is_err());
        assert!(e.is_modified());
        assert_eq!(e.buffer.lines(), vec!["y"]);
    }

    // -- viewport --

    #[test]
    fn scroll_to_cursor_follows_cursor() {
        let lines: Vec<String> = (0..50).map(|i| i.to_string()).collect();
        let mut e = Editor::with_store(Buffer::from_lines(&lines), Box::new(MemoryStore::new()));
        e.set_viewport_size(10, 80);
        e.move_to(Position::new(30, 0));
        assert_eq!(e.viewport.top, 21);
        e.move_to(Position::new(5, 0));
        assert_eq!(e.viewport.top, 5);
    }

    #[test]
    fn half_page_scrolls() {
        let lines: Vec<String> = (0..50).map(|i| i.to_string()).collect();
        let mut e = Editor::with_store(Buffer::from_lines(&lines), Box::new(MemoryStore::new()));
        e.set_viewport_size(10, 80);
        e.scroll(Scroll::HalfDown);
        assert_eq!(e.position(), Position::new(5, 0));
        assert_eq!(e.viewport.top, 5);
        e.scroll(Scroll::HalfUp);
        assert_eq!(e.position(), Position::new(0, 0));
        assert_eq!(e.viewport.top, 0);
    }

    #[test]
    fn page_scrolls_clamp_at_buffer_end() {
        let lines: Vec<String> = (0..15).map(|i| i.to_string()).collect();
        let mut e = Editor::with_store(Buffer::from_lines(&lines), Box::new(MemoryStore::new()));
        e.set_viewport_size(10, 80);
        e.scroll(Scroll::PageForward);
        assert_eq!(e.position(), Position::new(10, 0));
        e.scroll(Scroll::PageForward);
        assert_eq!(e.position(), Position::new(14, 0));
        e.scroll(Scroll::PageBackward);
        assert_eq!(e.position(), Position::new(4, 0));
    }

    #[test]
    fn file_info_summary() {
        let mut e = ed(&["a", "b"]);
        e.set_filename("f.txt".into());
        e.buffer.set_line(0, "z");
        assert_eq!(e.file_info(), "\"f.txt\" [Modified] 2 lines --50%-- 1,1");
    }
}
