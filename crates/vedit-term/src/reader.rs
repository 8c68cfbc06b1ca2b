// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Blocking key reader.
//
// The editor is single-threaded: the event loop blocks here until the next
// input event arrives. Bytes come from a `ByteSource` (stdin in the real
// program, a script in tests) and run through the input parser.
//
// A lone ESC is only resolved once the source stays quiet for
// `ESC_TIMEOUT_MS`. That wait is the only timed read; with nothing pending
// the reader blocks indefinitely.
//
// Events the parser produced but the caller has not taken yet wait in a
// queue. Callers can also push an event back to the front of it.
//
// A signal interrupting the wait (SIGWINCH on resize) makes `read_event`
// return `Ok(None)` so the loop can react before blocking again.

use std::collections::VecDeque;
use std::io;

use crate::input::{Event, Parser};

/// How long a lone ESC waits for the rest of an escape sequence.
pub const ESC_TIMEOUT_MS: i32 = 25;

const READ_BUF_SIZE: usize = 4096;

// ─── ByteSource ──────────────────────────────────────────────────────────────

/// Where raw input bytes come from.
pub trait ByteSource {
    /// Wait up to `timeout_ms` (negative: forever) and read what is available.
    ///
    /// Returns `Ok(None)` on timeout and `Ok(Some(0))` at end of input. An
    /// interrupted wait is reported as [`io::ErrorKind::Interrupted`].
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying wait or read.
    fn read_bytes(&mut self, buf: &mut [u8], timeout_ms: i32) -> io::Result<Option<usize>>;
}

/// Standard input through `poll(2)` and `read(2)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinSource;

#[cfg(unix)]
impl ByteSource for StdinSource {
    fn read_bytes(&mut self, buf: &mut [u8], timeout_ms: i32) -> io::Result<Option<usize>> {
        let mut pfd = libc::pollfd {
            fd: libc::STDIN_FILENO,
            events: libc::POLLIN,
            revents: 0,
        };
        let ready = unsafe { libc::poll(&raw mut pfd, 1, timeout_ms) };
        if ready < 0 {
            return Err(io::Error::last_os_error());
        }
        if ready == 0 {
            return Ok(None);
        }
        let n = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        #[allow(clippy::cast_sign_loss)]
        Ok(Some(n as usize))
    }
}

#[cfg(not(unix))]
impl ByteSource for StdinSource {
    fn read_bytes(&mut self, buf: &mut [u8], _timeout_ms: i32) -> io::Result<Option<usize>> {
        use std::io::Read;
        io::stdin().lock().read(buf).map(Some)
    }
}

// ─── KeyReader ───────────────────────────────────────────────────────────────

/// Parses a [`ByteSource`] into events, one at a time.
#[derive(Debug)]
pub struct KeyReader<S = StdinSource> {
    source: S,
    parser: Parser,
    queue: VecDeque<Event>,
}

impl KeyReader<StdinSource> {
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(StdinSource)
    }
}

impl<S: ByteSource> KeyReader<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            parser: Parser::new(),
            queue: VecDeque::new(),
        }
    }

    /// Events already parsed and waiting.
    #[must_use]
    pub fn has_buffered(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Put `event` back so the next [`read_event`](Self::read_event)
    /// returns it.
    pub fn push_back(&mut self, event: Event) {
        self.queue.push_front(event);
    }

    /// Block until the next event.
    ///
    /// Returns `Ok(None)` when a signal interrupted the wait.
    ///
    /// # Errors
    ///
    /// [`io::ErrorKind::UnexpectedEof`] once input ends, or any read error.
    pub fn read_event(&mut self) -> io::Result<Option<Event>> {
        let mut buf = [0u8; READ_BUF_SIZE];
        loop {
            if let Some(event) = self.queue.pop_front() {
                return Ok(Some(event));
            }

            let timeout = if self.parser.has_pending() {
                ESC_TIMEOUT_MS
            } else {
                -1
            };
            match self.source.read_bytes(&mut buf, timeout) {
                Ok(None) => self.queue.extend(self.parser.flush()),
                Ok(Some(0)) => {
                    self.queue.extend(self.parser.flush());
                    if self.queue.is_empty() {
                        return Err(io::ErrorKind::UnexpectedEof.into());
                    }
                }
                Ok(Some(n)) => self.queue.extend(self.parser.advance(&buf[..n])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(None),
                Err(e) => return Err(e),
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
