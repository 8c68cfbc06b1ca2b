//! Modal editing state.
//!
//! The editor is always in exactly one [`Mode`]. Each mode changes how keys
//! are interpreted and how far right the cursor may go:
//!
//! | Mode    | Indicator            | Cursor limit       | Purpose              |
//! |---------|----------------------|--------------------|----------------------|
//! | Command | file name            | `0..len-1`         | Motions, operators   |
//! | Insert  | `-- INSERT --`       | `0..len`           | Typing text          |
//! | Replace | `-- REPLACE --`      | `0..len`           | Overwriting text     |
//! | Visual  | `-- VISUAL … --`     | `0..len-1`         | Selecting text       |

use std::fmt;

use vedit_term::ansi::CursorShape;

// ---------------------------------------------------------------------------
// VisualShape
// ---------------------------------------------------------------------------

/// The shape of a visual selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualShape {
    /// `v`: character-wise, inclusive of both ends.
    Character,
    /// `V`: whole lines.
    Line,
    /// `Ctrl-V`: a column rectangle.
    Block,
}

impl fmt::Display for VisualShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Character => f.write_str("VISUAL"),
            Self::Line => f.write_str("VISUAL LINE"),
            Self::Block => f.write_str("VISUAL BLOCK"),
        }
    }
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// The current editing mode.
///
/// Pure data: key dispatch and transitions live in the
/// [`interpreter`](crate::interpreter).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Keys are commands, motions and operators.
    #[default]
    Command,
    /// Keys produce characters in the buffer.
    Insert,
    /// Keys overwrite characters in the buffer (`R`).
    Replace,
    /// Motions extend a selection.
    Visual(VisualShape),
}

impl Mode {
    /// Status-line indicator for the mode. `None` in Command mode, where
    /// the status line shows the file name instead.
    #[must_use]
    pub const fn indicator(self) -> Option<&'static str> {
        match self {
            Self::Command => None,
            Self::Insert => Some("-- INSERT --"),
            Self::Replace => Some("-- REPLACE --"),
            Self::Visual(VisualShape::Character) => Some("-- VISUAL --"),
            Self::Visual(VisualShape::Line) => Some("-- VISUAL LINE --"),
            Self::Visual(VisualShape::Block) => Some("-- VISUAL BLOCK --"),
        }
    }

    /// The terminal cursor shape for this mode.
    #[must_use]
    pub const fn cursor_shape(self) -> CursorShape {
        match self {
            Self::Command | Self::Visual(_) => CursorShape::SteadyBlock,
            Self::Insert => CursorShape::SteadyBar,
            Self::Replace => CursorShape::SteadyUnderline,
        }
    }

    /// True if the cursor may sit one past the last character.
    #[inline]
    #[must_use]
    pub const fn cursor_past_end(self) -> bool {
        matches!(self, Self::Insert | Self::Replace)
    }

    /// True if keys are text input (insert or replace).
    #[inline]
    #[must_use]
    pub const fn is_input(self) -> bool {
        matches!(self, Self::Insert | Self::Replace)
    }

    #[inline]
    #[must_use]
    pub const fn is_visual(self) -> bool {
        matches!(self, Self::Visual(_))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command => f.write_str("COMMAND"),
            Self::Insert => f.write_str("INSERT"),
            Self::Replace => f.write_str("REPLACE"),
            Self::Visual(shape) => shape.fmt(f),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
