//! Operations: small executable edits with enough state to reverse them.
//!
//! The interpreter turns Insert and Replace mode keys (and simple Command
//! mode motions) into an [`Operation`] and hands it back to its caller,
//! which runs [`apply`](Operation::apply). Each operation records the
//! cursor before it ran, and deletions record what they removed, so
//! [`reverse`](Operation::reverse) can put the text back.
//!
//! Undo does not go through `reverse`; it restores whole snapshots from
//! [`History`](crate::history::History). `reverse` exists for callers that
//! want to back out a single keystroke.

use crate::editor::{Editor, Scroll};
use crate::motion;
use crate::position::Position;

/// Which way a deletion eats characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteDir {
    /// Backspace: the character before the cursor.
    Backward,
    /// Delete: the character under the cursor.
    Forward,
}

/// Motions an operation can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    Left,
    Right,
    Up,
    Down,
    WordForward,
    WordBackward,
    /// `$`: with a count, the end of the line `count - 1` below.
    LineEnd,
    Scroll(Scroll),
}

/// An executable edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Type one character; `'\n'` splits the line.
    Insert { ch: char, before: Position },

    /// Remove `count` characters. `substitute` enters Insert afterwards.
    Delete {
        direction: DeleteDir,
        count: usize,
        substitute: bool,
        before: Position,
        after: Position,
        /// The removed text in reading order.
        removed: String,
    },

    /// Move the cursor `count` times. Not reversible.
    Motion { kind: MotionKind, count: usize },
}

impl Operation {
    #[must_use]
    pub const fn insert(ch: char) -> Self {
        Self::Insert {
            ch,
            before: Position::ZERO,
        }
    }

    #[must_use]
    pub const fn delete(direction: DeleteDir, count: usize) -> Self {
        Self::Delete {
            direction,
            count,
            substitute: false,
            before: Position::ZERO,
            after: Position::ZERO,
            removed: String::new(),
        }
    }

    /// `s`: delete forward, then enter Insert mode.
    #[must_use]
    pub const fn substitute(count: usize) -> Self {
        Self::Delete {
            direction: DeleteDir::Forward,
            count,
            substitute: true,
            before: Position::ZERO,
            after: Position::ZERO,
            removed: String::new(),
        }
    }

    #[must_use]
    pub const fn motion(kind: MotionKind, count: usize) -> Self {
        Self::Motion { kind, count }
    }

    /// The text a delete removed; empty for other operations.
    #[must_use]
    pub fn removed(&self) -> &str {
        match self {
            Self::Delete { removed, .. } => removed,
            _ => "",
        }
    }

    /// Run the operation. Returns `false` (and rings the bell) when it
    /// could not do everything it was asked.
    pub fn apply(&mut self, ed: &mut Editor) -> bool {
        match self {
            Self::Insert { ch, before } => {
                *before = ed.position();
                ed.insert_char(*ch);
                true
            }
            Self::Delete {
                direction,
                count,
                substitute,
                before,
                after,
                removed,
            } => {
                *before = ed.position();
                removed.clear();
                let mut complete = true;
                for _ in 0..*count {
                    let ch = match direction {
                        DeleteDir::Backward => ed.delete_backward(),
                        DeleteDir::Forward => ed.delete_forward(),
                    };
                    match (ch, *direction) {
                        (Some(c), DeleteDir::Backward) => removed.insert(0, c),
                        (Some(c), DeleteDir::Forward) => removed.push(c),
                        (None, _) => {
                            complete = false;
                            break;
                        }
                    }
                }
                *after = ed.position();
                if *substitute {
                    ed.set_mode(crate::mode::Mode::Insert);
                } else {
                    ed.clamp_cursor();
                }
                if !complete {
                    ed.ring_bell();
                }
                complete
            }
            Self::Motion { kind, count } => apply_motion(ed, *kind, *count),
        }
    }

    /// Back the operation out: the buffer and cursor return to how they
    /// were before [`apply`](Self::apply).
    pub fn reverse(&self, ed: &mut Editor) {
        match self {
            Self::Insert { ch, before } => {
                let past = if *ch == '\n' {
                    Position::new(before.line + 1, 0)
                } else {
                    Position::new(before.line, before.col + 1)
                };
                ed.move_to_unclamped(past);
                ed.delete_backward();
                ed.move_to_unclamped(*before);
            }
            Self::Delete {
                before,
                after,
                removed,
                ..
            } => {
                ed.move_to_unclamped(*after);
                ed.insert_text(removed);
                ed.move_to_unclamped(*before);
            }
            Self::Motion { .. } => {}
        }
        ed.clamp_cursor();
    }
}

/// Apply a motion `count` times. A word motion that cannot move leaves the
/// cursor where it started and rings the bell.
fn apply_motion(ed: &mut Editor, kind: MotionKind, count: usize) -> bool {
    let count = count.max(1);
    let past_end = ed.past_end();
    match kind {
        MotionKind::Left => ed.cursor.move_left(count, &ed.buffer, past_end),
        MotionKind::Right => ed.cursor.move_right(count, &ed.buffer, past_end),
        MotionKind::Up => ed.cursor.move_up(count, &ed.buffer, past_end),
        MotionKind::Down => ed.cursor.move_down(count, &ed.buffer, past_end),
        MotionKind::LineEnd => {
            ed.cursor.move_down(count - 1, &ed.buffer, past_end);
            ed.cursor.move_to_line_end(&ed.buffer, past_end);
        }
        MotionKind::WordForward | MotionKind::WordBackward => {
            let step = if kind == MotionKind::WordForward {
                motion::word_forward
            } else {
                motion::word_backward
            };
            let mut pos = ed.position();
            for _ in 0..count {
                let Some(next) = step(&ed.buffer, pos) else {
                    ed.ring_bell();
                    return false;
                };
                pos = next;
            }
            ed.move_to(pos);
        }
        MotionKind::Scroll(scroll) => {
            for _ in 0..count {
                ed.scroll(scroll);
            }
        }
    }
    ed.scroll_to_cursor();
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
