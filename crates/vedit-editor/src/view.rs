//! View: paints the editor state into a terminal frame.
//!
//! The layout is the text area above a one-row status line:
//!
//! ```text
//! ┌──────┬──────────────────────────────┐
//! │gutter│ text rows (viewport.top ..)  │
//! │      │ ~                            │
//! ├──────┴──────────────────────────────┤
//! │ -- INSERT --       Line: 3, Col: 7  │
//! └─────────────────────────────────────┘
//! ```
//!
//! - The gutter appears with `:set number`.
//! - Tabs expand to the next multiple of [`TAB_WIDTH`]. Wide characters
//!   take two columns.
//! - Token colours come from the [`Highlighter`] for C and C++ files while
//!   `syntax` is on.
//! - The visual selection is drawn in reverse video. A line selection
//!   covers the row to the right edge.
//! - A `:`, `/` or `?` prompt replaces the status line while it is typed.
//!
//! The vertical scroll position lives in the editor's viewport. The view
//! only keeps the horizontal offset and the highlighter cache.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use vedit_term::buffer::FrameBuffer;
use vedit_term::cell::{Attr, Cell, CellColor};

use crate::editor::Editor;
use crate::highlight::{Highlighter, detect_language};
use crate::lexer::TokenKind;
use crate::mode::VisualShape;
use crate::position::Position;

/// Columns per tab stop.
pub const TAB_WIDTH: usize = 8;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Gutter columns for `line_count` lines: the digits plus one separator.
/// Zero when numbers are off.
#[must_use]
pub fn gutter_width(line_count: usize, show_numbers: bool) -> u16 {
    if !show_numbers {
        return 0;
    }
    let digits = line_count.max(1).ilog10() + 1;
    #[allow(clippy::cast_possible_truncation)]
    let width = digits as u16 + 1;
    width
}

/// Display column of char column `char_col` in `line`.
#[must_use]
pub fn display_col(line: &str, char_col: usize) -> usize {
    line.chars()
        .take(char_col)
        .fold(0, |col, ch| col + cell_width(ch, col))
}

fn cell_width(ch: char, at: usize) -> usize {
    if ch == '\t' {
        TAB_WIDTH - at % TAB_WIDTH
    } else {
        ch.width().unwrap_or(0)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn to_u16(n: usize) -> u16 {
    n.min(usize::from(u16::MAX)) as u16
}

/// Foreground and attributes for a token class.
#[must_use]
pub const fn token_style(kind: TokenKind) -> (CellColor, Attr) {
    match kind {
        TokenKind::Keyword => (CellColor::Rgb(61, 101, 133), Attr::BOLD),
        TokenKind::NumericLiteral => (CellColor::Rgb(163, 185, 151), Attr::empty()),
        TokenKind::StringLiteral => (CellColor::Rgb(198, 141, 116), Attr::empty()),
        TokenKind::Identifier => (CellColor::Rgb(135, 190, 219), Attr::empty()),
        TokenKind::Comment => (CellColor::Rgb(99, 143, 80), Attr::ITALIC),
        TokenKind::PreprocessorDirective => (CellColor::Rgb(196, 133, 191), Attr::empty()),
        TokenKind::MismatchedBrace
        | TokenKind::MismatchedBracket
        | TokenKind::MismatchedParenthesis => (CellColor::RED, Attr::BOLD),
        TokenKind::Operator | TokenKind::Punctuation | TokenKind::PlainText => {
            (CellColor::Default, Attr::empty())
        }
    }
}

const STATUS_BAR: (CellColor, CellColor) = (CellColor::WHITE, CellColor::BLUE);
const STATUS_ERROR: (CellColor, CellColor) = (CellColor::WHITE, CellColor::RED);
const STATUS_INFO: (CellColor, CellColor) = (CellColor::GREEN, CellColor::Default);
const TILDE: CellColor = CellColor::BLUE;

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// Paints an [`Editor`] into a [`FrameBuffer`].
#[derive(Debug, Default)]
pub struct View {
    /// First display column shown.
    left_col: usize,
    highlighter: Highlighter,
}

impl View {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Text rows for a terminal of `rows` rows.
    #[must_use]
    pub const fn text_rows(rows: u16) -> usize {
        rows.saturating_sub(1) as usize
    }

    /// Paint everything. `prompt` is the command line being typed, if any.
    ///
    /// Returns where the terminal cursor belongs: on the prompt while one
    /// is open, otherwise on the buffer cursor when it is on screen.
    pub fn render(
        &mut self,
        ed: &Editor,
        prompt: Option<&str>,
        frame: &mut FrameBuffer,
    ) -> Option<(u16, u16)> {
        let (width, height) = (frame.width(), frame.height());
        if width == 0 || height == 0 {
            return None;
        }

        let colored = ed.options.syntax && ed.filename().and_then(detect_language).is_some();
        if colored {
            self.highlighter.refresh(&ed.buffer);
        }

        let line_count = ed.buffer.line_count();
        let gutter = gutter_width(line_count, ed.options.number).min(width);
        let text_width = usize::from(width - gutter);
        let text_height = height - 1;

        let pos = ed.position();
        let cursor_col = display_col(&ed.buffer.line(pos.line), pos.col);
        self.scroll_horizontally(cursor_col, text_width);

        let mut cursor = None;
        for row in 0..text_height {
            let line = ed.viewport.top + usize::from(row);
            if line >= line_count {
                frame.set(0, row, Cell::styled('~', TILDE, CellColor::Default, Attr::empty()));
                continue;
            }
            if gutter > 0 {
                paint_line_number(frame, row, gutter, line + 1);
            }
            self.paint_text_line(frame, ed, line, row, gutter, colored);
            if line == pos.line && cursor_col >= self.left_col {
                let offset = cursor_col - self.left_col;
                if offset < text_width {
                    cursor = Some((gutter + to_u16(offset), row));
                }
            }
        }

        let status_row = height - 1;
        match prompt {
            Some(text) => {
                let used = frame.paint_text(0, status_row, text, CellColor::Default, CellColor::Default, Attr::empty());
                Some((used.min(width - 1), status_row))
            }
            None => {
                paint_status_line(frame, ed, status_row);
                cursor
            }
        }
    }

    fn scroll_horizontally(&mut self, cursor_col: usize, text_width: usize) {
        if text_width == 0 {
            return;
        }
        if cursor_col < self.left_col {
            self.left_col = cursor_col;
        } else if cursor_col >= self.left_col + text_width {
            self.left_col = cursor_col + 1 - text_width;
        }
    }

    fn paint_text_line(
        &self,
        frame: &mut FrameBuffer,
        ed: &Editor,
        line: usize,
        y: u16,
        x0: u16,
        colored: bool,
    ) {
        let text = ed.buffer.line(line);
        let mut styles = vec![(CellColor::Default, Attr::empty()); text.chars().count()];
        if colored {
            for token in self.highlighter.line(line) {
                let style = token_style(token.kind);
                let end = token.end().min(styles.len());
                for slot in styles.iter_mut().take(end).skip(token.start) {
                    *slot = style;
                }
            }
        }

        let right = self.left_col + usize::from(frame.width() - x0);
        let mut col = 0;
        for (i, ch) in text.chars().enumerate() {
            if col >= right {
                break;
            }
            let w = cell_width(ch, col);
            if w == 0 {
                continue;
            }
            let (fg, attrs) = if ed.selection.contains(Position::new(line, i)) {
                (CellColor::Default, Attr::INVERSE)
            } else {
                styles[i]
            };
            let fits = col >= self.left_col && col + w <= right;
            if fits && ch != '\t' {
                let x = x0 + to_u16(col - self.left_col);
                frame.set(x, y, Cell::styled(ch, fg, CellColor::Default, attrs));
                if w == 2 {
                    frame.set(x + 1, y, Cell::continuation(fg, CellColor::Default, attrs));
                }
            } else {
                // Tabs, and wide characters cut by either edge, become blanks.
                for c in col.max(self.left_col)..(col + w).min(right) {
                    let x = x0 + to_u16(c - self.left_col);
                    frame.set(x, y, Cell::styled(' ', fg, CellColor::Default, attrs));
                }
            }
            col += w;
        }

        let whole_line = ed.selection.shape() == Some(VisualShape::Line)
            && ed.selection.contains(Position::new(line, 0));
        let empty_selected = text.is_empty() && ed.selection.contains(Position::new(line, 0));
        if whole_line || empty_selected {
            let from = col.max(self.left_col);
            let to = if whole_line { right } else { (from + 1).min(right) };
            for c in from..to {
                let x = x0 + to_u16(c - self.left_col);
                frame.set(x, y, Cell::EMPTY.with_attrs(Attr::INVERSE));
            }
        }
    }
}

fn paint_line_number(frame: &mut FrameBuffer, y: u16, gutter: u16, number: usize) {
    let digits = usize::from(gutter - 1);
    let label = format!("{number:>digits$}");
    frame.paint_text(0, y, &label, CellColor::Default, CellColor::Default, Attr::DIM);
}

/// Left: the status message, or the mode indicator, or the file name
/// (`-- COMMAND --` when untitled). Right: `Line: r, Col: c`.
fn paint_status_line(frame: &mut FrameBuffer, ed: &Editor, y: u16) {
    let (left, (fg, bg)) = match ed.status() {
        Some(status) if status.is_error => (status.text.clone(), STATUS_ERROR),
        Some(status) => (status.text.clone(), STATUS_INFO),
        None => {
            let text = ed.mode().indicator().map_or_else(
                || {
                    ed.filename()
                        .map_or_else(|| "-- COMMAND --".to_string(), |p| p.display().to_string())
                },
                str::to_string,
            );
            (text, STATUS_BAR)
        }
    };
    let pos = ed.position();
    let right = format!("Line: {}, Col: {}", pos.line + 1, pos.col + 1);

    let width = frame.width();
    let right_start = width.saturating_sub(to_u16(right.width()));
    frame.fill_row(0, y, fg, bg, Attr::empty());
    frame.paint_text(0, y, &left, fg, bg, Attr::empty());
    frame.paint_text(right_start, y, &right, fg, bg, Attr::empty());
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
