// SPDX-License-Identifier: MIT
//
// vedit: a modal, keystroke-driven terminal text editor.
//
// This binary wires the two crates together:
//
//   vedit-term   → raw mode, input parsing, frame buffer, event loop
//   vedit-editor → buffer model, keystroke interpreter, view
//
// `Session` implements vedit-term's App trait. Each keypress flows through:
//
//   stdin → parser → on_event → Interpreter::handle_key → Editor mutation
//   paint → View::render → framebuffer → diff renderer → terminal
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ text area + gutter           │  ← rows - 1
//   ├──────────────────────────────┤
//   │ status line / prompt         │  ← 1 row
//   └──────────────────────────────┘
//
// Logs go to $TMPDIR/vedit/vedit.log, filtered by VEDIT_LOG. The terminal
// is never written to by the logger.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use vedit_editor::editor::Editor;
use vedit_editor::file::{DiskStore, FileStore};
use vedit_editor::interpreter::Interpreter;
use vedit_editor::key::Key;
use vedit_editor::view::View;

use vedit_term::ansi::CursorShape;
use vedit_term::buffer::FrameBuffer;
use vedit_term::event_loop::{Action, App, EventLoop};
use vedit_term::input::Event;
use vedit_term::terminal::Size;

// ─── Session ────────────────────────────────────────────────────────────────

/// The editor, its interpreter and its view, driven by the event loop.
struct Session {
    ed: Editor,
    interp: Interpreter,
    view: View,
    /// Screen cursor from the last paint.
    cursor: Option<(u16, u16)>,
}

impl Session {
    fn new(ed: Editor) -> Self {
        Self {
            ed,
            interp: Interpreter::new(),
            view: View::new(),
            cursor: None,
        }
    }

    fn open(path: Option<PathBuf>, store: Box<dyn FileStore>) -> Self {
        Self::new(Editor::open(path, store))
    }

    /// Feed pasted text as if it were typed.
    fn paste(&mut self, text: &str) {
        for ch in text.chars() {
            let key = match ch {
                '\r' | '\n' => Key::Enter,
                '\t' => Key::Tab,
                c if c.is_control() => continue,
                c => Key::Char(c),
            };
            self.interp.handle_key(&mut self.ed, key);
        }
    }
}

impl App for Session {
    fn on_event(&mut self, event: &Event) -> Action {
        match event {
            Event::Key(key) => {
                if let Some(key) = Key::from_event(key) {
                    self.interp.handle_key(&mut self.ed, key);
                }
            }
            Event::Paste(text) => self.paste(text),
        }
        if self.ed.is_running() {
            Action::Continue
        } else {
            Action::Quit
        }
    }

    fn on_resize(&mut self, size: Size) {
        let text_rows = View::text_rows(size.rows);
        self.ed.set_viewport_size(text_rows, usize::from(size.cols));
    }

    fn paint(&mut self, frame: &mut FrameBuffer) {
        let prompt = self.interp.prompt();
        self.cursor = self.view.render(&self.ed, prompt.as_deref(), frame);
    }

    fn cursor(&self) -> Option<(u16, u16, CursorShape)> {
        let (x, y) = self.cursor?;
        let shape = if self.interp.prompt().is_some() {
            CursorShape::SteadyBar
        } else {
            self.ed.mode().cursor_shape()
        };
        Some((x, y, shape))
    }

    fn take_bell(&mut self) -> bool {
        self.ed.take_bell()
    }
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// File logging under the temp dir. Silently skipped when the directory
/// or the file cannot be created.
fn init_logging() {
    let dir = env::temp_dir().join("vedit");
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(appender) = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("vedit.log")
        .build(&dir)
    else {
        return;
    };
    let filter = EnvFilter::try_from_env("VEDIT_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(appender)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

// ─── Arguments ──────────────────────────────────────────────────────────────

/// `vedit [FILE]`. Anything more is a usage error.
fn parse_args(args: impl IntoIterator<Item = OsString>) -> Result<Option<PathBuf>, String> {
    let mut args = args.into_iter().skip(1);
    let file = args.next().map(PathBuf::from);
    if args.next().is_some() {
        return Err("usage: vedit [FILE]".to_string());
    }
    Ok(file)
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() {
    let path = parse_args(env::args_os()).unwrap_or_else(|usage| {
        eprintln!("{usage}");
        process::exit(2);
    });

    init_logging();
    tracing::info!(file = ?path, "starting");

    let mut session = Session::open(path, Box::new(DiskStore));
    if let Err(e) = EventLoop::new().run(&mut session) {
        tracing::error!(%e, "terminal failure");
        eprintln!("vedit: {e}");
        process::exit(1);
    }
    tracing::info!("exiting");
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vedit_editor::file::MemoryStore;
    use vedit_editor::position::Position;
    use vedit_term::input::{KeyCode, KeyEvent, Modifiers};

    // ── Helpers ───────────────────────────────────────────────────────────

    fn press(ch: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(ch), Modifiers::empty()))
    }

    fn code(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, Modifiers::empty()))
    }

    fn session(lines: &[&str]) -> Session {
        let store = MemoryStore::new().with_file("a.txt", lines);
        let mut s = Session::open(Some(PathBuf::from("a.txt")), Box::new(store));
        s.on_resize(Size { cols: 30, rows: 5 });
        s
    }

    fn send(s: &mut Session, keys: &str) -> Action {
        let mut action = Action::Continue;
        for ch in keys.chars() {
            action = s.on_event(&press(ch));
        }
        action
    }

    fn paint(s: &mut Session) -> FrameBuffer {
        let mut frame = FrameBuffer::new(30, 5);
        s.paint(&mut frame);
        frame
    }

    // ── Arguments ─────────────────────────────────────────────────────────

    #[test]
    fn args_take_one_optional_file() {
        let args = |v: &[&str]| parse_args(v.iter().map(OsString::from));
        assert_eq!(args(&["vedit"]), Ok(None));
        assert_eq!(args(&["vedit", "notes.txt"]), Ok(Some(PathBuf::from("notes.txt"))));
        assert!(args(&["vedit", "a", "b"]).is_err());
    }

    // ── Events ────────────────────────────────────────────────────────────

    #[test]
    fn keys_reach_the_interpreter() {
        let mut s = session(&["hello"]);
        send(&mut s, "x");
        assert_eq!(s.ed.buffer.lines(), vec!["ello"]);
    }

    #[test]
    fn quit_command_stops_the_loop() {
        let mut s = session(&["hello"]);
        assert_eq!(send(&mut s, ":q"), Action::Continue);
        assert_eq!(s.on_event(&code(KeyCode::Enter)), Action::Quit);
    }

    #[test]
    fn quit_with_changes_keeps_running() {
        let mut s = session(&["hello"]);
        send(&mut s, "x:q");
        assert_eq!(s.on_event(&code(KeyCode::Enter)), Action::Continue);
        assert!(s.ed.status().is_some_and(|st| st.is_error));
    }

    #[test]
    fn paste_types_each_character() {
        let mut s = session(&[""]);
        send(&mut s, "i");
        s.on_event(&Event::Paste("ab\ncd".to_string()));
        s.on_event(&code(KeyCode::Escape));
        assert_eq!(s.ed.buffer.lines(), vec!["ab", "cd"]);
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        let mut s = session(&["hello"]);
        assert_eq!(s.on_event(&code(KeyCode::F(1))), Action::Continue);
        assert_eq!(s.ed.buffer.lines(), vec!["hello"]);
    }

    // ── Resize ────────────────────────────────────────────────────────────

    #[test]
    fn resize_leaves_a_row_for_status() {
        let mut s = session(&["a"]);
        s.on_resize(Size { cols: 40, rows: 10 });
        assert_eq!(s.ed.viewport.height, 9);
        assert_eq!(s.ed.viewport.width, 40);
    }

    // ── Paint ─────────────────────────────────────────────────────────────

    #[test]
    fn paint_places_cursor_with_mode_shape() {
        let mut s = session(&["hello", "world"]);
        send(&mut s, "jll");
        let frame = paint(&mut s);
        assert_eq!(frame.row_text(0).trim_end(), "hello");
        assert_eq!(s.cursor(), Some((2, 1, CursorShape::SteadyBlock)));
        assert_eq!(s.ed.position(), Position::new(1, 2));

        send(&mut s, "i");
        paint(&mut s);
        assert_eq!(s.cursor(), Some((2, 1, CursorShape::SteadyBar)));
    }

    #[test]
    fn prompt_owns_the_cursor() {
        let mut s = session(&["hello"]);
        send(&mut s, ":wq");
        let frame = paint(&mut s);
        assert_eq!(frame.row_text(4).trim_end(), ":wq");
        assert_eq!(s.cursor(), Some((3, 4, CursorShape::SteadyBar)));
    }

    #[test]
    fn rejected_motion_rings_the_bell_once() {
        let mut s = session(&["hello"]);
        send(&mut s, "b");
        assert!(s.take_bell());
        assert!(!s.take_bell());
    }
}
