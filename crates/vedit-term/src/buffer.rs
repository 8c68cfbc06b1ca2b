// SPDX-License-Identifier: MIT
//
// FrameBuffer: the grid of cells a frame is painted into.
//
// The view paints text rows and the status line here; the diff renderer
// then compares it against the previous frame. Cells are stored in one
// row-major `Vec` so a row is a contiguous slice and unchanged rows can be
// skipped with a single slice comparison.
//
// Wide characters take two cells: the codepoint and a continuation cell.
// Painting over either half of a wide character blanks the other half so
// no orphaned half is ever sent to the terminal.

use unicode_width::UnicodeWidthChar;

use crate::cell::{Attr, Cell, CellColor};

// ─── FrameBuffer ────────────────────────────────────────────────────────────────

/// A `width × height` grid of cells.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// A grid of empty cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; usize::from(width) * usize::from(height)],
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y >= self.height {
            return None;
        }
        let start = self.index(0, y);
        Some(&self.cells[start..start + usize::from(self.width)])
    }

    /// The characters of row `y` with continuation cells dropped. For tests
    /// and logging.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        self.row(y)
            .map(|row| row.iter().filter_map(|c| c.character()).collect())
            .unwrap_or_default()
    }

    /// Reset every cell to empty.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Change dimensions. Content is discarded.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(usize::from(width) * usize::from(height), Cell::EMPTY);
    }

    /// Copy `other`'s cells into this buffer without reallocating.
    /// Sizes must match; a mismatched copy is ignored.
    pub fn copy_from(&mut self, other: &Self) {
        if self.width == other.width && self.height == other.height {
            self.cells.copy_from_slice(&other.cells);
        }
    }

    // ─── Painting ───────────────────────────────────────────────────────────

    /// Write one cell. Returns `false` out of bounds.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        self.break_wide_char_at(x, y);
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    /// Restyle row `y` from column `x` to the right edge, keeping the
    /// characters. Used to extend a status bar's background.
    pub fn fill_row(&mut self, x: u16, y: u16, fg: CellColor, bg: CellColor, attrs: Attr) {
        if y >= self.height || x >= self.width {
            return;
        }
        let start = self.index(x, y);
        let end = self.index(0, y) + usize::from(self.width);
        for cell in &mut self.cells[start..end] {
            cell.fg = fg;
            cell.bg = bg;
            cell.attrs = attrs;
        }
    }

    /// Paint `text` from `(x, y)` rightwards, stopping at the right edge.
    ///
    /// Zero-width characters are skipped. A wide character that would
    /// straddle the edge is painted as a space. Returns the columns used.
    pub fn paint_text(
        &mut self,
        x: u16,
        y: u16,
        text: &str,
        fg: CellColor,
        bg: CellColor,
        attrs: Attr,
    ) -> u16 {
        if y >= self.height {
            return 0;
        }
        let mut col = x;
        for ch in text.chars() {
            if col >= self.width {
                break;
            }
            match char_width(ch) {
                0 => {}
                1 => {
                    self.set(col, y, Cell::styled(ch, fg, bg, attrs));
                    col += 1;
                }
                _ if col + 1 >= self.width => {
                    self.set(col, y, Cell::styled(' ', fg, bg, attrs));
                    col += 1;
                }
                _ => {
                    self.set(col, y, Cell::styled(ch, fg, bg, attrs));
                    self.set(col + 1, y, Cell::continuation(fg, bg, attrs));
                    col += 2;
                }
            }
        }
        col - x
    }

    /// Blank the other half of a wide character before `(x, y)` changes.
    fn break_wide_char_at(&mut self, x: u16, y: u16) {
        let idx = self.index(x, y);
        if self.cells[idx].is_continuation() {
            if x > 0 {
                let start = idx - 1;
                self.cells[start] = Cell::EMPTY.with_bg(self.cells[start].bg);
            }
        } else if x + 1 < self.width && self.cells[idx + 1].is_continuation() {
            self.cells[idx + 1] = Cell::EMPTY.with_bg(self.cells[idx + 1].bg);
        }
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameBuffer({}x{})", self.width, self.height)
    }
}

// ─── Text Width ─────────────────────────────────────────────────────────────────

/// Display width of `ch` in columns: 0 for control and combining
/// characters, 2 for wide characters, 1 otherwise.
///
/// ```
/// use vedit_term::buffer::char_width;
///
/// assert_eq!(char_width('a'), 1);
/// assert_eq!(char_width('中'), 2);
/// assert_eq!(char_width('\n'), 0);
/// ```
#[inline]
#[must_use]
pub fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

/// Display width of `s` in columns.
#[must_use]
pub fn string_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

// ─── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain(buf: &mut FrameBuffer, x: u16, y: u16, text: &str) -> u16 {
        buf.paint_text(x, y, text, CellColor::Default, CellColor::Default, Attr::empty())
    }

    // ── Construction ────────────────────────────────────────────────────

    #[test]
    fn new_buffer_is_blank() {
        let buf = FrameBuffer::new(4, 2);
        assert_eq!(buf.width(), 4);
        assert_eq!(buf.height(), 2);
        assert_eq!(buf.row_text(1), "    ");
        assert_eq!(buf.get(4, 0), None);
        assert_eq!(buf.row(2), None);
    }

    #[test]
    fn resize_discards_content() {
        let mut buf = FrameBuffer::new(4, 2);
        plain(&mut buf, 0, 0, "ab");
        buf.resize(3, 3);
        assert_eq!(buf.row_text(0), "   ");
        assert_eq!(buf.row_text(2), "   ");
    }

    #[test]
    fn copy_from_requires_equal_size() {
        let mut a = FrameBuffer::new(3, 1);
        let mut b = FrameBuffer::new(3, 1);
        plain(&mut b, 0, 0, "xyz");
        a.copy_from(&b);
        assert_eq!(a, b);

        let mut c = FrameBuffer::new(2, 1);
        c.copy_from(&b);
        assert_eq!(c.row_text(0), "  ");
    }

    // ── Text ────────────────────────────────────────────────────────────

    #[test]
    fn paint_text_clips_at_edge() {
        let mut buf = FrameBuffer::new(5, 1);
        assert_eq!(plain(&mut buf, 2, 0, "hello"), 3);
        assert_eq!(buf.row_text(0), "  hel");
    }

    #[test]
    fn paint_text_wide_chars() {
        let mut buf = FrameBuffer::new(6, 1);
        assert_eq!(plain(&mut buf, 0, 0, "a中b"), 4);
        assert!(buf.get(2, 0).unwrap().is_continuation());
        assert_eq!(buf.row_text(0), "a中b  ");
    }

    #[test]
    fn wide_char_at_edge_becomes_space() {
        let mut buf = FrameBuffer::new(3, 1);
        plain(&mut buf, 0, 0, "ab中");
        assert_eq!(buf.row_text(0), "ab ");
    }

    #[test]
    fn overwriting_half_a_wide_char_blanks_the_other() {
        let mut buf = FrameBuffer::new(4, 1);
        plain(&mut buf, 0, 0, "中");
        buf.set(1, 0, Cell::new('x'));
        assert_eq!(buf.row_text(0), " x  ");

        plain(&mut buf, 2, 0, "中");
        buf.set(2, 0, Cell::new('y'));
        assert_eq!(buf.row_text(0), " xy ");
    }

    #[test]
    fn fill_row_keeps_characters() {
        let mut buf = FrameBuffer::new(4, 1);
        plain(&mut buf, 0, 0, "ab");
        buf.fill_row(1, 0, CellColor::Default, CellColor::Default, Attr::INVERSE);
        assert_eq!(buf.row_text(0), "ab  ");
        assert_eq!(buf.get(0, 0).unwrap().attrs, Attr::empty());
        assert_eq!(buf.get(3, 0).unwrap().attrs, Attr::INVERSE);
    }

    // ── Width ───────────────────────────────────────────────────────────

    #[test]
    fn string_widths() {
        assert_eq!(string_width("hello"), 5);
        assert_eq!(string_width("中文"), 4);
        assert_eq!(string_width("a\u{301}"), 1);
    }
}
