// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop: the single thread the editor runs on.
//
// Each turn blocks in the key reader for one event, hands it to the app,
// and repaints. Nothing runs between keystrokes: there are no ticks, timers
// or background threads.
//
//   read event → App::on_event → App::paint → diff render → cursor → bell
//
// When several events arrive in one read (a paste or fast typing), frames
// are only drawn once the parsed backlog is empty.
//
// Resize arrives as SIGWINCH. The handler only sets a flag; it is installed
// without SA_RESTART so the blocking poll returns EINTR, the reader reports
// an interruption, and the loop picks up the new size before blocking again.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::ansi::{self, CursorShape};
use crate::buffer::FrameBuffer;
use crate::diff::DiffRenderer;
use crate::input::Event;
use crate::reader::{ByteSource, KeyReader, StdinSource};
use crate::terminal::{Size, Terminal};

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = 0;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {}

// ─── App Trait ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// What the event loop drives.
///
/// Per event the loop calls [`on_event`](App::on_event), then, once no
/// parsed input is left, [`paint`](App::paint), [`cursor`](App::cursor)
/// and [`take_bell`](App::take_bell).
pub trait App {
    fn on_event(&mut self, event: &Event) -> Action;

    /// The terminal changed size. The frame buffer is already resized.
    fn on_resize(&mut self, _size: Size) {}

    /// Paint the whole frame. `buf` is cleared beforehand.
    fn paint(&mut self, buf: &mut FrameBuffer);

    /// Where to show the hardware cursor, or `None` to hide it.
    fn cursor(&self) -> Option<(u16, u16, CursorShape)> {
        None
    }

    /// Whether to ring the terminal bell after this frame. Clears the
    /// request.
    fn take_bell(&mut self) -> bool {
        false
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// Owns the terminal, the key reader and the renderer.
///
/// ```no_run
/// use vedit_term::buffer::FrameBuffer;
/// use vedit_term::event_loop::{Action, App, EventLoop};
/// use vedit_term::input::{Event, KeyCode, KeyEvent};
///
/// struct Quitter;
///
/// impl App for Quitter {
///     fn on_event(&mut self, event: &Event) -> Action {
///         match event {
///             Event::Key(KeyEvent { code: KeyCode::Char('q'), .. }) => Action::Quit,
///             _ => Action::Continue,
///         }
///     }
///
///     fn paint(&mut self, _buf: &mut FrameBuffer) {}
/// }
///
/// EventLoop::new().run(&mut Quitter)?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct EventLoop {
    terminal: Terminal,
    session: Session<StdinSource>,
}

impl EventLoop {
    #[must_use]
    pub fn new() -> Self {
        let terminal = Terminal::new();
        let session = Session::new(KeyReader::stdin(), terminal.size());
        Self { terminal, session }
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Enter the terminal, run until the app quits or input ends, and
    /// restore the terminal whatever happened.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be entered or output fails.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        install_sigwinch_handler();
        self.session.resize(self.terminal.refresh_size());

        let result = self.run_inner(app);
        let restored = self.terminal.leave();
        result.and(restored)
    }

    fn run_inner(&mut self, app: &mut impl App) -> io::Result<()> {
        let mut out = io::stdout();
        app.on_resize(self.terminal.size());
        self.session.draw(app, &mut out)?;
        loop {
            if SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
                let size = self.terminal.refresh_size();
                tracing::debug!(cols = size.cols, rows = size.rows, "resize");
                self.session.resize(size);
                app.on_resize(size);
                self.session.draw(app, &mut out)?;
            }
            if self.session.turn(app, &mut out)? == Action::Quit {
                return Ok(());
            }
        }
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// The terminal-independent part of the loop: read, dispatch, draw.
#[derive(Debug)]
struct Session<S> {
    reader: KeyReader<S>,
    renderer: DiffRenderer,
    frame: FrameBuffer,
}

impl<S: ByteSource> Session<S> {
    fn new(reader: KeyReader<S>, size: Size) -> Self {
        Self {
            reader,
            renderer: DiffRenderer::new(),
            frame: FrameBuffer::new(size.cols, size.rows),
        }
    }

    fn resize(&mut self, size: Size) {
        self.frame.resize(size.cols, size.rows);
        self.renderer.force_redraw();
    }

    /// Handle one event. End of input counts as a quit.
    fn turn(&mut self, app: &mut impl App, out: &mut impl Write) -> io::Result<Action> {
        let event = match self.reader.read_event() {
            Ok(Some(event)) => event,
            Ok(None) => return Ok(Action::Continue),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                tracing::info!("input closed");
                return Ok(Action::Quit);
            }
            Err(e) => return Err(e),
        };

        if app.on_event(&event) == Action::Quit {
            return Ok(Action::Quit);
        }
        if !self.reader.has_buffered() {
            self.draw(app, out)?;
        }
        Ok(Action::Continue)
    }

    fn draw(&mut self, app: &mut impl App, out: &mut impl Write) -> io::Result<()> {
        self.frame.clear();
        app.paint(&mut self.frame);
        let stats = self.renderer.render(&self.frame);
        tracing::trace!(
            rendered = stats.cells_rendered,
            skipped = stats.cells_skipped,
            bytes = stats.bytes_written,
            "frame"
        );

        let mut tail = Vec::new();
        match app.cursor() {
            Some((x, y, shape)) => {
                ansi::cursor_to(&mut tail, x, y)?;
                ansi::set_cursor_shape(&mut tail, shape)?;
                ansi::cursor_show(&mut tail)?;
            }
            None => ansi::cursor_hide(&mut tail)?,
        }
        if app.take_bell() {
            ansi::bell(&mut tail)?;
        }
        self.renderer.queue(&tail);
        self.renderer.flush_to(out)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
