// SPDX-License-Identifier: MIT
//
// vedit-term: Terminal layer for vedit.
//
// Everything the editor core needs from a terminal and nothing more: raw
// mode and the alternate screen, a grid of styled cells to paint a frame
// into, a differential renderer that writes only the cells that changed,
// a key parser for the escape sequences a terminal sends, and a blocking
// single-threaded event loop that ties them together.
//
// The terminal is driven directly with ANSI escape sequences and termios.
// No TUI framework sits in between.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod diff;
pub mod event_loop;
pub mod input;
pub mod output;
pub mod reader;
pub mod terminal;
