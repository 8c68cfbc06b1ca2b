// SPDX-License-Identifier: MIT
//
// Cell: one character position on screen.
//
// A cell holds a codepoint, a foreground and background colour, and text
// attributes. The view paints a grid of these, the diff renderer compares
// grids, and the cell writer turns changed cells into bytes.
//
// Wide characters (CJK, some emoji) occupy two columns. The first cell
// holds the codepoint; the second is a continuation cell (ch = 0) that the
// renderer skips when writing characters.

// ─── Colour ──────────────────────────────────────────────────────────────────

/// A terminal colour as the renderer emits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellColor {
    /// The terminal's own foreground or background.
    #[default]
    Default,
    /// Palette index. 0-7 are the standard colours, 8-15 their bright
    /// variants, 16-255 the extended palette.
    Ansi(u8),
    /// 24-bit colour.
    Rgb(u8, u8, u8),
}

impl CellColor {
    pub const BLACK: Self = Self::Ansi(0);
    pub const RED: Self = Self::Ansi(1);
    pub const GREEN: Self = Self::Ansi(2);
    pub const YELLOW: Self = Self::Ansi(3);
    pub const BLUE: Self = Self::Ansi(4);
    pub const MAGENTA: Self = Self::Ansi(5);
    pub const CYAN: Self = Self::Ansi(6);
    pub const WHITE: Self = Self::Ansi(7);
    pub const BRIGHT_BLACK: Self = Self::Ansi(8);
}

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text attributes, one bit per SGR parameter.
    ///
    /// ```
    /// use vedit_term::cell::Attr;
    ///
    /// let style = Attr::BOLD | Attr::INVERSE;
    /// assert!(style.contains(Attr::INVERSE));
    /// assert!(!style.contains(Attr::DIM));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1
        const BOLD      = 1 << 0;
        /// SGR 2
        const DIM       = 1 << 1;
        /// SGR 3
        const ITALIC    = 1 << 2;
        /// SGR 4
        const UNDERLINE = 1 << 3;
        /// SGR 7: swap foreground and background. Used for the visual
        /// selection and the status line.
        const INVERSE   = 1 << 4;
    }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// A single terminal cell.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Codepoint to display. `0` marks a continuation cell.
    pub ch: u32,
    pub fg: CellColor,
    pub bg: CellColor,
    pub attrs: Attr,
}

const CONTINUATION: u32 = 0;
const SPACE: u32 = b' ' as u32;

impl Cell {
    /// Space, default colours, no attributes.
    pub const EMPTY: Self = Self {
        ch: SPACE,
        fg: CellColor::Default,
        bg: CellColor::Default,
        attrs: Attr::empty(),
    };

    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            ch: ch as u32,
            ..Self::EMPTY
        }
    }

    #[inline]
    #[must_use]
    pub const fn styled(ch: char, fg: CellColor, bg: CellColor, attrs: Attr) -> Self {
        Self {
            ch: ch as u32,
            fg,
            bg,
            attrs,
        }
    }

    /// The second column of a wide character. Carries the style so the
    /// background fills both columns.
    #[inline]
    #[must_use]
    pub const fn continuation(fg: CellColor, bg: CellColor, attrs: Attr) -> Self {
        Self {
            ch: CONTINUATION,
            fg,
            bg,
            attrs,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        self.ch == CONTINUATION
    }

    /// Space with no styling.
    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }

    /// The codepoint as a `char`; `None` for continuation cells.
    #[inline]
    #[must_use]
    pub const fn character(self) -> Option<char> {
        if self.ch == CONTINUATION {
            return None;
        }
        char::from_u32(self.ch)
    }

    #[inline]
    #[must_use]
    pub const fn with_fg(self, fg: CellColor) -> Self {
        Self { fg, ..self }
    }

    #[inline]
    #[must_use]
    pub const fn with_bg(self, bg: CellColor) -> Self {
        Self { bg, ..self }
    }

    #[inline]
    #[must_use]
    pub const fn with_attrs(self, attrs: Attr) -> Self {
        Self { attrs, ..self }
    }

    /// Same colours and attributes, whatever the character.
    #[inline]
    #[must_use]
    pub fn same_style(self, other: &Self) -> bool {
        self.fg == other.fg && self.bg == other.bg && self.attrs == other.attrs
    }
}

impl Default for Cell {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_continuation() {
            return write!(f, "Cell(continuation)");
        }
        let ch = char::from_u32(self.ch).unwrap_or('?');
        write!(f, "Cell({ch:?}")?;
        if self.fg != CellColor::Default {
            write!(f, ", fg={:?}", self.fg)?;
        }
        if self.bg != CellColor::Default {
            write!(f, ", bg={:?}", self.bg)?;
        }
        if !self.attrs.is_empty() {
            write!(f, ", {:?}", self.attrs)?;
        }
        write!(f, ")")
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Construction ─────────────────────────────────────────────────────

    #[test]
    fn default_cell_is_empty() {
        let cell = Cell::default();
        assert!(cell.is_empty());
        assert_eq!(cell.character(), Some(' '));
    }

    #[test]
    fn new_cell_has_default_style() {
        let cell = Cell::new('x');
        assert_eq!(cell.character(), Some('x'));
        assert!(cell.same_style(&Cell::EMPTY));
        assert!(!cell.is_empty());
    }

    #[test]
    fn builders_set_one_field() {
        let cell = Cell::new('a')
            .with_fg(CellColor::RED)
            .with_bg(CellColor::Rgb(1, 2, 3))
            .with_attrs(Attr::BOLD);
        assert_eq!(
            cell,
            Cell::styled('a', CellColor::Ansi(1), CellColor::Rgb(1, 2, 3), Attr::BOLD)
        );
    }

    // ── Continuation ─────────────────────────────────────────────────────

    #[test]
    fn continuation_has_no_character() {
        let cell = Cell::continuation(CellColor::Default, CellColor::BLUE, Attr::empty());
        assert!(cell.is_continuation());
        assert_eq!(cell.character(), None);
        assert_eq!(format!("{cell:?}"), "Cell(continuation)");
    }

    // ── Style comparison ─────────────────────────────────────────────────

    #[test]
    fn same_style_ignores_character() {
        let a = Cell::styled('a', CellColor::GREEN, CellColor::Default, Attr::INVERSE);
        let b = Cell::styled('b', CellColor::GREEN, CellColor::Default, Attr::INVERSE);
        assert!(a.same_style(&b));
        assert!(!a.same_style(&b.with_attrs(Attr::empty())));
    }

    #[test]
    fn debug_lists_only_non_default_fields() {
        let cell = Cell::new('q').with_fg(CellColor::CYAN);
        assert_eq!(format!("{cell:?}"), "Cell('q', fg=Ansi(6))");
    }
}
