// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into key and paste events. Understands what a
// terminal sends with the modes `terminal.rs` enables:
//
// - Control bytes (Ctrl+letter, Backspace, Tab, Enter)
// - Legacy CSI sequences (arrows, editing keys, function keys, modifiers)
// - SS3 sequences (arrows and F1-F4 in application mode)
// - Alt+key (ESC followed by a printable character)
// - Bracketed paste
// - UTF-8 multi-byte characters
//
// Escape sequences can be split across reads, so the parser keeps the
// unconsumed tail of its input. A lone ESC stays pending until either more
// bytes arrive or the reader times out and calls `flush`, which turns it
// into an Escape key.

use bitflags::bitflags;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A parsed terminal input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// Text between the bracketed paste delimiters, delivered whole.
    Paste(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self {
            code,
            modifiers,
            kind: KeyEventKind::Press,
        }
    }
}

/// Legacy terminal input only reports presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum KeyEventKind {
    #[default]
    Press,
}

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Char(char),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    // ── Function keys ───────────────────────────────────────────
    /// F1 through F20.
    F(u8),
}

bitflags! {
    /// Keyboard modifiers. The xterm CSI encoding sends `1 + bits`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const META  = 0b1000;
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

const PASTE_START: &[u8] = b"\x1b[200~";
const PASTE_END: &[u8] = b"\x1b[201~";

/// Incremental input parser.
///
/// ```
/// use vedit_term::input::{Event, KeyCode, KeyEvent, Modifiers, Parser};
///
/// let mut parser = Parser::new();
/// let events = parser.advance(b"x\x1b[A");
/// assert_eq!(events, vec![
///     Event::Key(KeyEvent::new(KeyCode::Char('x'), Modifiers::empty())),
///     Event::Key(KeyEvent::new(KeyCode::Up, Modifiers::empty())),
/// ]);
/// ```
#[derive(Debug, Default)]
pub struct Parser {
    buf: Vec<u8>,
    in_paste: bool,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes and return every event they complete. An incomplete
    /// sequence at the end is kept for the next call.
    pub fn advance(&mut self, data: &[u8]) -> Vec<Event> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            let remaining = &self.buf[pos..];

            if self.in_paste {
                let Some(end) = find_subsequence(remaining, PASTE_END) else {
                    break;
                };
                let text = String::from_utf8_lossy(&remaining[..end]).into_owned();
                events.push(Event::Paste(text));
                pos += end + PASTE_END.len();
                self.in_paste = false;
                continue;
            }

            if remaining.starts_with(PASTE_START) {
                self.in_paste = true;
                pos += PASTE_START.len();
                continue;
            }
            // A prefix of the paste opener: wait for the rest.
            if remaining.len() < PASTE_START.len()
                && remaining.len() > 2
                && PASTE_START.starts_with(remaining)
            {
                break;
            }

            match try_parse(remaining) {
                Parsed::Event(event, consumed) => {
                    events.push(event);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }

        self.buf.drain(..pos);
        events
    }

    /// Whether bytes are waiting for the rest of a sequence.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Resolve pending bytes after the input went quiet. A lone ESC
    /// becomes Escape; anything else is replayed as separate keys.
    /// An unterminated paste is delivered as it stands.
    pub fn flush(&mut self) -> Vec<Event> {
        let pending = std::mem::take(&mut self.buf);
        if std::mem::take(&mut self.in_paste) {
            return vec![Event::Paste(String::from_utf8_lossy(&pending).into_owned())];
        }
        pending
            .iter()
            .filter_map(|&byte| match byte {
                0x1B => Some(press(KeyCode::Escape)),
                _ => match try_parse(&[byte]) {
                    Parsed::Event(event, _) => Some(event),
                    Parsed::Incomplete | Parsed::Skip(_) => None,
                },
            })
            .collect()
    }
}

// ─── Parsing ────────────────────────────────────────────────────────────────

enum Parsed {
    /// An event and the bytes it used.
    Event(Event, usize),
    Incomplete,
    /// Unrecognised bytes to drop.
    Skip(usize),
}

fn try_parse(buf: &[u8]) -> Parsed {
    let Some(&first) = buf.first() else {
        return Parsed::Skip(0);
    };
    match first {
        0x1B => parse_escape(buf),
        0x00 => Parsed::Event(key_with(KeyCode::Char('@'), Modifiers::CTRL), 1),
        0x08 | 0x7F => Parsed::Event(press(KeyCode::Backspace), 1),
        0x09 => Parsed::Event(press(KeyCode::Tab), 1),
        0x0A | 0x0D => Parsed::Event(press(KeyCode::Enter), 1),
        b @ 0x01..=0x1A => Parsed::Event(key_with(ctrl_letter(b), Modifiers::CTRL), 1),
        b @ 0x20..=0x7E => Parsed::Event(press(KeyCode::Char(char::from(b))), 1),
        0xC0..=0xFF => parse_utf8(buf),
        _ => Parsed::Skip(1),
    }
}

fn parse_escape(buf: &[u8]) -> Parsed {
    let Some(&next) = buf.get(1) else {
        return Parsed::Incomplete;
    };
    match next {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        0x1B => Parsed::Event(key_with(KeyCode::Escape, Modifiers::ALT), 2),
        b @ 0x20..=0x7E => Parsed::Event(key_with(KeyCode::Char(char::from(b)), Modifiers::ALT), 2),
        b @ 0x01..=0x1A => Parsed::Event(
            key_with(ctrl_letter(b), Modifiers::ALT | Modifiers::CTRL),
            2,
        ),
        _ => Parsed::Event(press(KeyCode::Escape), 1),
    }
}

// ── CSI ─────────────────────────────────────────────────────────────────────

fn parse_csi(buf: &[u8]) -> Parsed {
    // Parameter bytes are 0x30..=0x3F, intermediates 0x20..=0x2F, and the
    // final byte 0x40..=0x7E.
    let mut end = 2;
    loop {
        let Some(&b) = buf.get(end) else {
            return Parsed::Incomplete;
        };
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }

    let final_byte = buf[end];
    let params = parse_params(&buf[2..end]);
    let consumed = end + 1;
    let modifiers = params.get(1).map_or(Modifiers::empty(), |&p| decode_modifiers(p));

    let code = if final_byte == b'~' {
        match params.first().copied().unwrap_or(0) {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            n @ 11..=15 => KeyCode::F(fkey(n - 10)),
            n @ 17..=21 => KeyCode::F(fkey(n - 11)),
            n @ 23..=26 => KeyCode::F(fkey(n - 12)),
            n @ 28..=29 => KeyCode::F(fkey(n - 13)),
            n @ 31..=34 => KeyCode::F(fkey(n - 14)),
            _ => return Parsed::Skip(consumed),
        }
    } else {
        match final_byte {
            b'A' => KeyCode::Up,
            b'B' => KeyCode::Down,
            b'C' => KeyCode::Right,
            b'D' => KeyCode::Left,
            b'H' => KeyCode::Home,
            b'F' => KeyCode::End,
            b'P' => KeyCode::F(1),
            b'Q' => KeyCode::F(2),
            b'R' => KeyCode::F(3),
            b'S' => KeyCode::F(4),
            b'Z' => return Parsed::Event(key_with(KeyCode::Tab, Modifiers::SHIFT), consumed),
            _ => return Parsed::Skip(consumed),
        }
    };
    Parsed::Event(key_with(code, modifiers), consumed)
}

// ── SS3 ─────────────────────────────────────────────────────────────────────

fn parse_ss3(buf: &[u8]) -> Parsed {
    let Some(&b) = buf.get(2) else {
        return Parsed::Incomplete;
    };
    let code = match b {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return Parsed::Skip(3),
    };
    Parsed::Event(press(code), 3)
}

// ── UTF-8 ───────────────────────────────────────────────────────────────────

fn parse_utf8(buf: &[u8]) -> Parsed {
    let expected = match buf[0] {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return Parsed::Skip(1),
    };
    if buf.len() < expected {
        return Parsed::Incomplete;
    }
    match std::str::from_utf8(&buf[..expected]).ok().and_then(|s| s.chars().next()) {
        Some(ch) => Parsed::Event(press(KeyCode::Char(ch)), expected),
        None => Parsed::Skip(1),
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────────

const fn press(code: KeyCode) -> Event {
    key_with(code, Modifiers::empty())
}

const fn key_with(code: KeyCode, modifiers: Modifiers) -> Event {
    Event::Key(KeyEvent::new(code, modifiers))
}

/// Control byte 0x01..=0x1A to its letter.
fn ctrl_letter(b: u8) -> KeyCode {
    KeyCode::Char(char::from(b - 1 + b'a'))
}

#[allow(clippy::cast_possible_truncation)]
const fn fkey(n: u16) -> u8 {
    n as u8
}

/// Semicolon-separated numeric parameters. Colon sub-parameters are dropped.
fn parse_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, &b| {
                    acc.saturating_mul(10).saturating_add(u16::from(b - b'0'))
                })
        })
        .collect()
}

/// `1 + bits` to flags; 0 and 1 mean none.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    Modifiers::from_bits_truncate(param.saturating_sub(1) as u8)
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(data: &[u8]) -> Vec<Event> {
        Parser::new().advance(data)
    }

    fn key(code: KeyCode) -> Event {
        press(code)
    }

    fn key_mod(code: KeyCode, modifiers: Modifiers) -> Event {
        key_with(code, modifiers)
    }

    // ── Plain bytes ─────────────────────────────────────────────────────

    #[test]
    fn ascii_chars() {
        assert_eq!(
            parse(b"dw"),
            vec![key(KeyCode::Char('d')), key(KeyCode::Char('w'))]
        );
    }

    #[test]
    fn control_bytes() {
        assert_eq!(parse(b"\x16"), vec![key_mod(KeyCode::Char('v'), Modifiers::CTRL)]);
        assert_eq!(parse(b"\x0c"), vec![key_mod(KeyCode::Char('l'), Modifiers::CTRL)]);
        assert_eq!(parse(b"\x00"), vec![key_mod(KeyCode::Char('@'), Modifiers::CTRL)]);
    }

    #[test]
    fn enter_tab_backspace() {
        assert_eq!(parse(b"\r"), vec![key(KeyCode::Enter)]);
        assert_eq!(parse(b"\n"), vec![key(KeyCode::Enter)]);
        assert_eq!(parse(b"\t"), vec![key(KeyCode::Tab)]);
        assert_eq!(parse(b"\x7f"), vec![key(KeyCode::Backspace)]);
        assert_eq!(parse(b"\x08"), vec![key(KeyCode::Backspace)]);
    }

    #[test]
    fn utf8_characters() {
        assert_eq!(parse("é中".as_bytes()), vec![key(KeyCode::Char('é')), key(KeyCode::Char('中'))]);
    }

    #[test]
    fn stray_continuation_byte_is_dropped() {
        assert_eq!(parse(b"\x80a"), vec![key(KeyCode::Char('a'))]);
    }

    // ── CSI ─────────────────────────────────────────────────────────────

    #[test]
    fn arrows() {
        assert_eq!(
            parse(b"\x1b[A\x1b[B\x1b[C\x1b[D"),
            vec![key(KeyCode::Up), key(KeyCode::Down), key(KeyCode::Right), key(KeyCode::Left)]
        );
    }

    #[test]
    fn modified_arrow() {
        assert_eq!(parse(b"\x1b[1;5C"), vec![key_mod(KeyCode::Right, Modifiers::CTRL)]);
        assert_eq!(
            parse(b"\x1b[1;4D"),
            vec![key_mod(KeyCode::Left, Modifiers::SHIFT | Modifiers::ALT)]
        );
    }

    #[test]
    fn tilde_keys() {
        assert_eq!(parse(b"\x1b[3~"), vec![key(KeyCode::Delete)]);
        assert_eq!(parse(b"\x1b[2~"), vec![key(KeyCode::Insert)]);
        assert_eq!(parse(b"\x1b[1~"), vec![key(KeyCode::Home)]);
        assert_eq!(parse(b"\x1b[4~"), vec![key(KeyCode::End)]);
        assert_eq!(parse(b"\x1b[5~"), vec![key(KeyCode::PageUp)]);
        assert_eq!(parse(b"\x1b[6~"), vec![key(KeyCode::PageDown)]);
    }

    #[test]
    fn function_keys() {
        assert_eq!(parse(b"\x1b[15~"), vec![key(KeyCode::F(5))]);
        assert_eq!(parse(b"\x1b[17~"), vec![key(KeyCode::F(6))]);
        assert_eq!(parse(b"\x1b[24~"), vec![key(KeyCode::F(12))]);
        assert_eq!(parse(b"\x1b[34~"), vec![key(KeyCode::F(20))]);
        assert_eq!(parse(b"\x1bOP"), vec![key(KeyCode::F(1))]);
    }

    #[test]
    fn shift_tab() {
        assert_eq!(parse(b"\x1b[Z"), vec![key_mod(KeyCode::Tab, Modifiers::SHIFT)]);
    }

    #[test]
    fn unknown_csi_is_skipped() {
        assert_eq!(parse(b"\x1b[99~x"), vec![key(KeyCode::Char('x'))]);
        assert_eq!(parse(b"\x1b[?1;2cx"), vec![key(KeyCode::Char('x'))]);
    }

    #[test]
    fn ss3_arrows() {
        assert_eq!(parse(b"\x1bOA"), vec![key(KeyCode::Up)]);
        assert_eq!(parse(b"\x1bOH"), vec![key(KeyCode::Home)]);
    }

    // ── Escape ──────────────────────────────────────────────────────────

    #[test]
    fn alt_keys() {
        assert_eq!(parse(b"\x1bj"), vec![key_mod(KeyCode::Char('j'), Modifiers::ALT)]);
        assert_eq!(parse(b"\x1b\x1b"), vec![key_mod(KeyCode::Escape, Modifiers::ALT)]);
    }

    #[test]
    fn lone_escape_waits_for_flush() {
        let mut parser = Parser::new();
        assert!(parser.advance(b"\x1b").is_empty());
        assert!(parser.has_pending());
        assert_eq!(parser.flush(), vec![key(KeyCode::Escape)]);
        assert!(!parser.has_pending());
    }

    #[test]
    fn split_sequence_completes_on_next_read() {
        let mut parser = Parser::new();
        assert!(parser.advance(b"\x1b[").is_empty());
        assert_eq!(parser.advance(b"A"), vec![key(KeyCode::Up)]);
    }

    #[test]
    fn flush_replays_partial_sequence_as_keys() {
        let mut parser = Parser::new();
        assert!(parser.advance(b"\x1b[1;").is_empty());
        assert_eq!(
            parser.flush(),
            vec![
                key(KeyCode::Escape),
                key(KeyCode::Char('[')),
                key(KeyCode::Char('1')),
                key(KeyCode::Char(';')),
            ]
        );
    }

    #[test]
    fn split_utf8_waits() {
        let mut parser = Parser::new();
        let bytes = "中".as_bytes();
        assert!(parser.advance(&bytes[..1]).is_empty());
        assert_eq!(parser.advance(&bytes[1..]), vec![key(KeyCode::Char('中'))]);
    }

    // ── Paste ───────────────────────────────────────────────────────────

    #[test]
    fn bracketed_paste() {
        assert_eq!(
            parse(b"\x1b[200~a\x1b[Ab\x1b[201~x"),
            vec![Event::Paste("a\x1b[Ab".into()), key(KeyCode::Char('x'))]
        );
    }

    #[test]
    fn paste_split_across_reads() {
        let mut parser = Parser::new();
        assert!(parser.advance(b"\x1b[20").is_empty());
        assert!(parser.advance(b"0~hel").is_empty());
        assert_eq!(parser.advance(b"lo\x1b[201~"), vec![Event::Paste("hello".into())]);
    }

    #[test]
    fn unterminated_paste_flushes_as_paste() {
        let mut parser = Parser::new();
        assert!(parser.advance(b"\x1b[200~abc").is_empty());
        assert_eq!(parser.flush(), vec![Event::Paste("abc".into())]);
    }
}
