//! Visual selection tracker.
//!
//! A selection is an anchor (where `v`, `V` or `Ctrl-V` was pressed) and a
//! live end that follows the cursor. The two are stored exactly as set;
//! [`bounds`](SelectionTracker::bounds) normalizes them into reading order
//! on every query without touching the stored values.
//!
//! | Shape     | Covers                                                   |
//! |-----------|----------------------------------------------------------|
//! | Character | every char from `start` to `end`, both inclusive         |
//! | Line      | every line from `start.line` to `end.line`               |
//! | Block     | columns `min(col)..=max(col)` on each line in the span   |

use crate::mode::VisualShape;
use crate::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Selection {
    anchor: Position,
    live: Position,
    shape: VisualShape,
}

/// Inactive, or active with an anchor, a live end and a shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionTracker {
    active: Option<Selection>,
}

impl SelectionTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self { active: None }
    }

    /// Activate with both ends at `pos`.
    pub const fn start(&mut self, pos: Position, shape: VisualShape) {
        self.active = Some(Selection {
            anchor: pos,
            live: pos,
            shape,
        });
    }

    /// Change the shape of an active selection. Bounds are untouched.
    pub const fn set_shape(&mut self, shape: VisualShape) {
        if let Some(sel) = &mut self.active {
            sel.shape = shape;
        }
    }

    /// Move the live end.
    pub const fn update(&mut self, pos: Position) {
        if let Some(sel) = &mut self.active {
            sel.live = pos;
        }
    }

    pub const fn clear(&mut self) {
        self.active = None;
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn shape(&self) -> Option<VisualShape> {
        self.active.map(|s| s.shape)
    }

    /// The anchor and live end as stored.
    #[must_use]
    pub fn ends(&self) -> Option<(Position, Position)> {
        self.active.map(|s| (s.anchor, s.live))
    }

    /// `(start, end)` in reading order.
    #[must_use]
    pub fn bounds(&self) -> Option<(Position, Position)> {
        self.active.map(|s| {
            if s.anchor <= s.live {
                (s.anchor, s.live)
            } else {
                (s.live, s.anchor)
            }
        })
    }

    /// Leftmost and rightmost column of a block selection.
    #[must_use]
    pub fn block_columns(&self) -> Option<(usize, usize)> {
        self.active.map(|s| {
            (
                s.anchor.col.min(s.live.col),
                s.anchor.col.max(s.live.col),
            )
        })
    }

    /// True when `pos` is inside the selection, honoring its shape.
    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        let (Some(sel), Some((start, end))) = (self.active, self.bounds()) else {
            return false;
        };
        if pos.line < start.line || pos.line > end.line {
            return false;
        }
        match sel.shape {
            VisualShape::Character => start <= pos && pos <= end,
            VisualShape::Line => true,
            VisualShape::Block => {
                let (left, right) = self.block_columns().unwrap_or_default();
                (left..=right).contains(&pos.col)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
