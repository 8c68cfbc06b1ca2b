//! Cursor: a position plus the column remembered across vertical motion.
//!
//! # Preferred column
//!
//! Moving up or down through lines of different lengths tries to return to
//! the column the cursor had when it last moved horizontally. Only horizontal
//! motion and direct placement overwrite it. `$` stores [`usize::MAX`] so that
//! subsequent vertical moves stay glued to the end of each line.
//!
//! # Column limit
//!
//! Every method takes `past_end`. When `true` (Insert and Replace mode) the
//! cursor may sit on the slot after the last character; when `false` it must
//! sit on a character, or on column 0 of an empty line. The caller passes
//! [`Mode::cursor_past_end`](crate::mode::Mode::cursor_past_end).

use crate::buffer::Buffer;
use crate::position::Position;

/// A cursor in a text buffer. Holds no reference to the buffer; every
/// movement method takes it as a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pos: Position,
    preferred_col: usize,
}

impl Cursor {
    /// A cursor at the origin.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pos: Position::ZERO,
            preferred_col: 0,
        }
    }

    /// A cursor at `pos` whose preferred column is `pos.col`.
    #[must_use]
    pub const fn at(pos: Position) -> Self {
        Self {
            pos,
            preferred_col: pos.col,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    #[must_use]
    pub const fn line(&self) -> usize {
        self.pos.line
    }

    #[inline]
    #[must_use]
    pub const fn col(&self) -> usize {
        self.pos.col
    }

    /// The column vertical motion tries to return to.
    #[inline]
    #[must_use]
    pub const fn preferred_col(&self) -> usize {
        self.preferred_col
    }

    // -- Direct positioning -------------------------------------------------

    /// Place the cursor at `pos`, clamped to the buffer, and remember the
    /// requested column.
    pub fn set_position(&mut self, pos: Position, buf: &Buffer, past_end: bool) {
        self.preferred_col = pos.col;
        self.pos = pos;
        self.clamp(buf, past_end);
    }

    /// Go to column 0 of `line`.
    pub fn goto_line(&mut self, line: usize, buf: &Buffer, past_end: bool) {
        self.set_position(Position::new(line, 0), buf, past_end);
    }

    // -- Horizontal movement ------------------------------------------------

    /// Move left by `count` characters without leaving the line.
    pub fn move_left(&mut self, count: usize, buf: &Buffer, past_end: bool) {
        let col = self.pos.col.min(max_col(buf, self.pos.line, past_end));
        self.set_position(
            Position::new(self.pos.line, col.saturating_sub(count)),
            buf,
            past_end,
        );
    }

    /// Move right by `count` characters without leaving the line.
    pub fn move_right(&mut self, count: usize, buf: &Buffer, past_end: bool) {
        let col = self.pos.col.saturating_add(count);
        self.set_position(Position::new(self.pos.line, col), buf, past_end);
        self.preferred_col = self.pos.col;
    }

    /// `0`: column 0.
    pub const fn move_to_line_start(&mut self) {
        self.pos.col = 0;
        self.preferred_col = 0;
    }

    /// `^`: first non-blank character of the line. Lines that are entirely
    /// blank put the cursor at their end.
    pub fn move_to_first_non_blank(&mut self, buf: &Buffer, past_end: bool) {
        let col = first_non_blank(&buf.line(self.pos.line));
        self.set_position(Position::new(self.pos.line, col), buf, past_end);
    }

    /// `$`: last character of the line; vertical motion then sticks to the
    /// end of every line it visits.
    pub fn move_to_line_end(&mut self, buf: &Buffer, past_end: bool) {
        self.pos.col = max_col(buf, self.pos.line, past_end);
        self.preferred_col = usize::MAX;
    }

    // -- Vertical movement --------------------------------------------------

    /// Move up by `count` lines, returning to the preferred column.
    pub fn move_up(&mut self, count: usize, buf: &Buffer, past_end: bool) {
        self.pos.line = self.pos.line.saturating_sub(count);
        self.clamp_vertical(buf, past_end);
    }

    /// Move down by `count` lines, returning to the preferred column.
    pub fn move_down(&mut self, count: usize, buf: &Buffer, past_end: bool) {
        self.pos.line = self.pos.line.saturating_add(count);
        self.clamp_vertical(buf, past_end);
    }

    // -- Clamping -----------------------------------------------------------

    /// Pull the cursor back inside the buffer after an edit or mode change.
    /// Keeps the preferred column.
    pub fn clamp(&mut self, buf: &Buffer, past_end: bool) {
        self.pos.line = self.pos.line.min(buf.last_line());
        self.pos.col = self.pos.col.min(max_col(buf, self.pos.line, past_end));
    }

    /// Clamp the line, then take the column from the preferred column.
    pub fn clamp_vertical(&mut self, buf: &Buffer, past_end: bool) {
        self.pos.line = self.pos.line.min(buf.last_line());
        self.pos.col = self.preferred_col.min(max_col(buf, self.pos.line, past_end));
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Largest column the cursor may occupy on `line`.
#[must_use]
pub fn max_col(buf: &Buffer, line: usize, past_end: bool) -> usize {
    let len = buf.line_len(line);
    if past_end { len } else { len.saturating_sub(1) }
}

/// Column of the first character that is not a space or tab; the line
/// length when there is none.
#[must_use]
pub fn first_non_blank(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(lines: &[&str]) -> Buffer {
        Buffer::from_lines(lines)
    }

    #[test]
    fn set_position_clamps_in_command_mode() {
        let b = buf(&["abc"]);
        let mut c = Cursor::new();
        c.set_position(Position::new(0, 10), &b, false);
        assert_eq!(c.position(), Position::new(0, 2));
        c.set_position(Position::new(0, 10), &b, true);
        assert_eq!(c.position(), Position::new(0, 3));
    }

    #[test]
    fn empty_line_column_is_zero() {
        let b = buf(&[""]);
        let mut c = Cursor::new();
        c.set_position(Position::new(0, 4), &b, false);
        assert_eq!(c.col(), 0);
    }

    #[test]
    fn preferred_column_survives_short_line() {
        let b = buf(&["long line here", "ab", "another long one"]);
        let mut c = Cursor::at(Position::new(0, 8));
        c.move_down(1, &b, false);
        assert_eq!(c.position(), Position::new(1, 1));
        c.move_down(1, &b, false);
        assert_eq!(c.position(), Position::new(2, 8));
    }

    #[test]
    fn vertical_motion_clamps_at_buffer_edges() {
        let b = buf(&["a", "b"]);
        let mut c = Cursor::new();
        c.move_up(5, &b, false);
        assert_eq!(c.line(), 0);
        c.move_down(5, &b, false);
        assert_eq!(c.line(), 1);
    }

    #[test]
    fn horizontal_motion_resets_preferred() {
        let b = buf(&["abcdef", "abcdef"]);
        let mut c = Cursor::at(Position::new(0, 5));
        c.move_left(3, &b, false);
        assert_eq!(c.preferred_col(), 2);
        c.move_down(1, &b, false);
        assert_eq!(c.position(), Position::new(1, 2));
    }

    #[test]
    fn move_right_stops_at_last_char() {
        let b = buf(&["abc"]);
        let mut c = Cursor::new();
        c.move_right(10, &b, false);
        assert_eq!(c.col(), 2);
        assert_eq!(c.preferred_col(), 2);
    }

    #[test]
    fn line_end_sticks_across_lines() {
        let b = buf(&["abcdef", "ab", "abcdefghij"]);
        let mut c = Cursor::new();
        c.move_to_line_end(&b, false);
        assert_eq!(c.col(), 5);
        c.move_down(1, &b, false);
        assert_eq!(c.col(), 1);
        c.move_down(1, &b, false);
        assert_eq!(c.col(), 9);
    }

    #[test]
    fn first_non_blank_skips_spaces_and_tabs() {
        assert_eq!(first_non_blank("  \tx"), 3);
        assert_eq!(first_non_blank("x"), 0);
        assert_eq!(first_non_blank("   "), 3);
    }

    #[test]
    fn move_to_first_non_blank_on_blank_line_goes_to_end() {
        let b = buf(&["    "]);
        let mut c = Cursor::new();
        c.move_to_first_non_blank(&b, true);
        assert_eq!(c.col(), 4);
        c.move_to_first_non_blank(&b, false);
        assert_eq!(c.col(), 3);
    }

    #[test]
    fn clamp_after_edit_keeps_preferred() {
        let b = buf(&["abcdefgh"]);
        let mut c = Cursor::at(Position::new(0, 7));
        let shorter = buf(&["ab"]);
        c.clamp(&shorter, false);
        assert_eq!(c.col(), 1);
        assert_eq!(c.preferred_col(), 7);
        c.clamp_vertical(&b, false);
        assert_eq!(c.col(), 7);
    }
}
