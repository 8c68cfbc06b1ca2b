//! # vedit-editor: Editor core for vedit
//!
//! Everything a keystroke can reach, with no terminal I/O of its own:
//!
//! - **[`position`]**, **[`buffer`]**, **[`cursor`]**: `(line, col)` positions,
//!   the rope-backed line buffer and cursor placement rules
//! - **[`mode`]**: Command, Insert, Replace and the three Visual shapes
//! - **[`history`]**, **[`register`]**, **[`selection`]**: undo snapshots,
//!   the clipboard and the visual selection
//! - **[`motion`]**, **[`operation`]**: cursor motions and the repeatable
//!   edit operations built on them
//! - **[`search`]**: `/` and `?` search with wrap-around
//! - **[`command`]**, **[`options`]**: ex commands (`:w`, `:q`, `:r`,
//!   `:set`, line jumps)
//! - **[`interpreter`]**: turns [`key::Key`]s into operations, counts,
//!   undo units and `.` repeat
//! - **[`lexer`]**, **[`highlight`]**: C/C++ token classification
//! - **[`view`]**: paints an [`editor::Editor`] into a frame buffer
//!
//! File access goes through the [`file::FileStore`] trait so the core can
//! be tested without touching the disk.

pub mod buffer;
pub mod command;
pub mod cursor;
pub mod editor;
pub mod error;
pub mod file;
pub mod highlight;
pub mod history;
pub mod interpreter;
pub mod key;
pub mod lexer;
pub mod mode;
pub mod motion;
pub mod operation;
pub mod options;
pub mod position;
pub mod register;
pub mod search;
pub mod selection;
pub mod view;
