//! Input codes understood by the core.
//!
//! The terminal layer reports rich [`KeyEvent`]s. The keystroke interpreter
//! only needs a handful of distinctions, so events are folded into [`Key`]
//! first. Keys also have a textual notation (`<Esc>`, `<C-v>`, `<CR>`) used
//! by tests and by the repeat buffer's debug output.

use std::fmt;

use vedit_term::input::{KeyCode, KeyEvent, Modifiers};

/// One keystroke as seen by the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character.
    Char(char),
    /// Ctrl plus a letter, stored lowercase.
    Ctrl(char),
    Enter,
    Backspace,
    Delete,
    Escape,
    Tab,
    Up,
    Down,
    Left,
    Right,
}

impl Key {
    /// Fold a terminal key event. Returns `None` for keys the editor
    /// ignores (function keys, Home/End, releases).
    #[must_use]
    pub fn from_event(ev: &KeyEvent) -> Option<Self> {
        let key = match ev.code {
            KeyCode::Char(c) if ev.modifiers.contains(Modifiers::CTRL) => {
                Self::Ctrl(c.to_ascii_lowercase())
            }
            KeyCode::Char(c) => Self::Char(c),
            KeyCode::Enter => Self::Enter,
            KeyCode::Backspace => Self::Backspace,
            KeyCode::Delete => Self::Delete,
            KeyCode::Escape => Self::Escape,
            KeyCode::Tab => Self::Tab,
            KeyCode::Up => Self::Up,
            KeyCode::Down => Self::Down,
            KeyCode::Left => Self::Left,
            KeyCode::Right => Self::Right,
            _ => return None,
        };
        Some(key)
    }

    /// The digit value of `0`..=`9`.
    #[must_use]
    pub const fn digit(self) -> Option<usize> {
        match self {
            Self::Char(c @ '0'..='9') => Some(c as usize - '0' as usize),
            _ => None,
        }
    }

    /// The character this key types in Insert mode.
    #[must_use]
    pub const fn text(self) -> Option<char> {
        match self {
            Self::Char(c) => Some(c),
            Self::Tab => Some('\t'),
            _ => None,
        }
    }

    /// Parse key notation: plain characters stand for themselves, `<...>`
    /// names a special key. A `<` that does not start a known name is the
    /// character `<`.
    ///
    /// ```
    /// use vedit_editor::key::Key;
    /// assert_eq!(
    ///     Key::parse_sequence("x<Esc>"),
    ///     vec![Key::Char('x'), Key::Escape]
    /// );
    /// ```
    #[must_use]
    pub fn parse_sequence(notation: &str) -> Vec<Self> {
        let mut keys = Vec::new();
        let mut rest = notation;
        while let Some(c) = rest.chars().next() {
            if c == '<' {
                if let Some(end) = rest.find('>') {
                    if let Some(key) = Self::parse_name(&rest[1..end]) {
                        keys.push(key);
                        rest = &rest[end + 1..];
                        continue;
                    }
                }
            }
            keys.push(Self::Char(c));
            rest = &rest[c.len_utf8()..];
        }
        keys
    }

    fn parse_name(name: &str) -> Option<Self> {
        let key = match name {
            "Esc" => Self::Escape,
            "CR" | "Enter" => Self::Enter,
            "BS" => Self::Backspace,
            "Del" => Self::Delete,
            "Tab" => Self::Tab,
            "Up" => Self::Up,
            "Down" => Self::Down,
            "Left" => Self::Left,
            "Right" => Self::Right,
            "lt" => Self::Char('<'),
            _ => {
                let c = name.strip_prefix("C-")?;
                let mut chars = c.chars();
                let ch = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                Self::Ctrl(ch.to_ascii_lowercase())
            }
        };
        Some(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char('<') => f.write_str("<lt>"),
            Self::Char(c) => write!(f, "{c}"),
            Self::Ctrl(c) => write!(f, "<C-{c}>"),
            Self::Enter => f.write_str("<CR>"),
            Self::Backspace => f.write_str("<BS>"),
            Self::Delete => f.write_str("<Del>"),
            Self::Escape => f.write_str("<Esc>"),
            Self::Tab => f.write_str("<Tab>"),
            Self::Up => f.write_str("<Up>"),
            Self::Down => f.write_str("<Down>"),
            Self::Left => f.write_str("<Left>"),
            Self::Right => f.write_str("<Right>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use vedit_term::input::KeyEventKind;

    fn event(code: KeyCode, modifiers: Modifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
        }
    }

    #[test]
    fn ctrl_letters_fold_to_lowercase() {
        let ev = event(KeyCode::Char('V'), Modifiers::CTRL | Modifiers::SHIFT);
        assert_eq!(Key::from_event(&ev), Some(Key::Ctrl('v')));
    }

    #[test]
    fn shifted_chars_stay_chars() {
        let ev = event(KeyCode::Char('A'), Modifiers::SHIFT);
        assert_eq!(Key::from_event(&ev), Some(Key::Char('A')));
    }

    #[test]
    fn unsupported_keys_are_dropped() {
        assert_eq!(Key::from_event(&event(KeyCode::F(1), Modifiers::empty())), None);
        assert_eq!(
            Key::from_event(&event(KeyCode::Home, Modifiers::empty())),
            None
        );
    }

    #[test]
    fn digits() {
        assert_eq!(Key::Char('7').digit(), Some(7));
        assert_eq!(Key::Char('a').digit(), None);
        assert_eq!(Key::Escape.digit(), None);
    }

    #[test]
    fn parse_notation() {
        assert_eq!(
            Key::parse_sequence("3dw<C-v><CR><lt>a<b"),
            vec![
                Key::Char('3'),
                Key::Char('d'),
                Key::Char('w'),
                Key::Ctrl('v'),
                Key::Enter,
                Key::Char('<'),
                Key::Char('a'),
                Key::Char('<'),
                Key::Char('b'),
            ]
        );
    }

    #[test]
    fn display_round_trips_notation() {
        let keys = Key::parse_sequence("ia<lt>b<Esc><C-d>");
        let text: String = keys.iter().map(ToString::to_string).collect();
        assert_eq!(text, "ia<lt>b<Esc><C-d>");
    }
}
