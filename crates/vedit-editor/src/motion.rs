//! Motions: pure position computations over a [`Buffer`].
//!
//! Every function here takes the buffer and a starting position and returns
//! where the motion lands, or `None` when it cannot move. None of them
//! touch the cursor; the interpreter decides whether to move it, delete up
//! to the result, or ring the bell.
//!
//! "Blank" means any Unicode whitespace. A word is a run of non-blank
//! characters.

use crate::buffer::Buffer;
use crate::position::Position;

/// Direction of an in-line character search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindDir {
    /// `f`: to the right of the cursor.
    Forward,
    /// `F`: to the left of the cursor.
    Backward,
}

fn chars(buf: &Buffer, line: usize) -> Vec<char> {
    buf.line(line).chars().collect()
}

// ---------------------------------------------------------------------------
// Word motions
// ---------------------------------------------------------------------------

/// `w`: start of the next word.
///
/// On the starting line the rest of the current word is skipped, then any
/// blanks. If that exhausts the line the search continues at column 0 of
/// each following line, where only leading blanks are skipped. `None` when
/// no word follows anywhere below.
#[must_use]
pub fn word_forward(buf: &Buffer, from: Position) -> Option<Position> {
    let first: Vec<char> = chars(buf, from.line);
    let mut col = from.col.min(first.len());
    while col < first.len() && !first[col].is_whitespace() {
        col += 1;
    }
    while col < first.len() && first[col].is_whitespace() {
        col += 1;
    }
    if col < first.len() {
        return Some(Position::new(from.line, col));
    }

    for line in from.line + 1..buf.line_count() {
        let text = chars(buf, line);
        if let Some(col) = text.iter().position(|c| !c.is_whitespace()) {
            return Some(Position::new(line, col));
        }
    }
    None
}

/// `b`: start of the previous word.
///
/// Steps back one character (onto the previous line's end when at column
/// 0), skips blanks backward across lines, then skips the word to its first
/// character. Stepping onto an empty line stops there. Running off the top
/// lands on the origin. `None` only when already at the origin.
#[must_use]
pub fn word_backward(buf: &Buffer, from: Position) -> Option<Position> {
    if from.is_zero() {
        return None;
    }
    let mut line = from.line;
    let mut text = chars(buf, line);
    let mut col = from.col.min(text.len());
    if col == 0 {
        line -= 1;
        text = chars(buf, line);
        if text.is_empty() {
            return Some(Position::new(line, 0));
        }
        col = text.len();
    }
    // `col` is one past the candidate character from here on.
    loop {
        while col > 0 && text[col - 1].is_whitespace() {
            col -= 1;
        }
        if col > 0 {
            break;
        }
        if line == 0 {
            return Some(Position::ZERO);
        }
        line -= 1;
        text = chars(buf, line);
        col = text.len();
    }
    while col > 0 && !text[col - 1].is_whitespace() {
        col -= 1;
    }
    Some(Position::new(line, col))
}

// ---------------------------------------------------------------------------
// Character find
// ---------------------------------------------------------------------------

/// `f` / `F`: column of the `count`-th occurrence of `target` on `line`
/// after (or before) `col`. Never leaves the line.
#[must_use]
pub fn find_char(line: &str, col: usize, target: char, dir: FindDir, count: usize) -> Option<usize> {
    let text: Vec<char> = line.chars().collect();
    let mut at = col;
    for _ in 0..count.max(1) {
        at = match dir {
            FindDir::Forward => (at + 1..text.len()).find(|&i| text[i] == target)?,
            FindDir::Backward => (0..at.min(text.len())).rev().find(|&i| text[i] == target)?,
        };
    }
    Some(at)
}

// ---------------------------------------------------------------------------
// Brackets
// ---------------------------------------------------------------------------

const fn partner(c: char) -> Option<(char, bool)> {
    match c {
        '(' => Some((')', true)),
        '[' => Some((']', true)),
        '{' => Some(('}', true)),
        ')' => Some(('(', false)),
        ']' => Some(('[', false)),
        '}' => Some(('{', false)),
        _ => None,
    }
}

/// `%` without a count.
///
/// On a bracket, jump to its partner, counting nested brackets of the same
/// kind and crossing lines as needed. Off a bracket, jump to the next
/// closing bracket on the line; failing that, to the partner of the next
/// opening bracket on the line.
#[must_use]
pub fn match_bracket(buf: &Buffer, from: Position) -> Option<Position> {
    let text = chars(buf, from.line);
    if let Some(&c) = text.get(from.col) {
        if partner(c).is_some() {
            return partner_of(buf, from);
        }
    }

    let rest = from.col + 1..text.len();
    if let Some(col) = rest.clone().find(|&i| matches!(text[i], ')' | ']' | '}')) {
        return Some(Position::new(from.line, col));
    }
    let col = rest.into_iter().find(|&i| matches!(text[i], '(' | '[' | '{'))?;
    partner_of(buf, Position::new(from.line, col))
}

/// Partner of the bracket at `at`.
fn partner_of(buf: &Buffer, at: Position) -> Option<Position> {
    let open = buf.char_at(at)?;
    let (close, forward) = partner(open)?;
    let mut depth = 1usize;

    if forward {
        for line in at.line..buf.line_count() {
            let text = chars(buf, line);
            let start = if line == at.line { at.col + 1 } else { 0 };
            for (col, &c) in text.iter().enumerate().skip(start) {
                if c == open {
                    depth += 1;
                } else if c == close {
                    depth -= 1;
                    if depth == 0 {
                        return Some(Position::new(line, col));
                    }
                }
            }
        }
    } else {
        for line in (0..=at.line).rev() {
            let text = chars(buf, line);
            let end = if line == at.line { at.col } else { text.len() };
            for col in (0..end).rev() {
                let c = text[col];
                if c == open {
                    depth += 1;
                } else if c == close {
                    depth -= 1;
                    if depth == 0 {
                        return Some(Position::new(line, col));
                    }
                }
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Percent jump
// ---------------------------------------------------------------------------

/// `{N}%`: the line `N` percent of the way through the buffer, for `N` in
/// `1..=100`.
#[must_use]
pub fn percent_line(buf: &Buffer, percent: usize) -> Option<usize> {
    if !(1..=100).contains(&percent) {
        return None;
    }
    Some(percent * buf.last_line() / 100)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(lines: &[&str]) -> Buffer {
        Buffer::from_lines(lines)
    }

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    // -- w --

    #[test]
    fn word_forward_same_line() {
        let b = buf(&["foo bar  baz"]);
        assert_eq!(word_forward(&b, p(0, 0)), Some(p(0, 4)));
        assert_eq!(word_forward(&b, p(0, 5)), Some(p(0, 9)));
        assert_eq!(word_forward(&b, p(0, 3)), Some(p(0, 4)));
    }

    #[test]
    fn word_forward_crosses_lines() {
        let b = buf(&["abc", "", "   def"]);
        assert_eq!(word_forward(&b, p(0, 0)), Some(p(2, 3)));
    }

    #[test]
    fn word_forward_next_line_word_at_column_zero() {
        let b = buf(&["abc", "def"]);
        assert_eq!(word_forward(&b, p(0, 1)), Some(p(1, 0)));
    }

    #[test]
    fn word_forward_fails_on_last_word() {
        let b = buf(&["abc def", "   "]);
        assert_eq!(word_forward(&b, p(0, 4)), None);
    }

    // -- b --

    #[test]
    fn word_backward_same_line() {
        let b = buf(&["foo bar baz"]);
        assert_eq!(word_backward(&b, p(0, 8)), Some(p(0, 4)));
        assert_eq!(word_backward(&b, p(0, 6)), Some(p(0, 4)));
        assert_eq!(word_backward(&b, p(0, 4)), Some(p(0, 0)));
    }

    #[test]
    fn word_backward_crosses_lines() {
        let b = buf(&["foo bar", "   ", "baz"]);
        assert_eq!(word_backward(&b, p(2, 0)), Some(p(0, 4)));
    }

    #[test]
    fn word_backward_stops_on_empty_previous_line() {
        let b = buf(&["foo", "", "baz"]);
        assert_eq!(word_backward(&b, p(2, 0)), Some(p(1, 0)));
    }

    #[test]
    fn word_backward_runs_to_origin() {
        let b = buf(&["   x"]);
        assert_eq!(word_backward(&b, p(0, 3)), Some(p(0, 0)));
        assert_eq!(word_backward(&b, p(0, 0)), None);
    }

    // -- f / F --

    #[test]
    fn find_char_forward_and_backward() {
        assert_eq!(find_char("a,b,c", 0, ',', FindDir::Forward, 1), Some(1));
        assert_eq!(find_char("a,b,c", 0, ',', FindDir::Forward, 2), Some(3));
        assert_eq!(find_char("a,b,c", 4, ',', FindDir::Backward, 1), Some(3));
        assert_eq!(find_char("a,b,c", 4, ',', FindDir::Backward, 2), Some(1));
    }

    #[test]
    fn find_char_skips_cursor_char() {
        assert_eq!(find_char("aaa", 0, 'a', FindDir::Forward, 1), Some(1));
        assert_eq!(find_char("aaa", 0, 'a', FindDir::Backward, 1), None);
    }

    #[test]
    fn find_char_count_too_large_fails() {
        assert_eq!(find_char("a,b", 0, ',', FindDir::Forward, 2), None);
        assert_eq!(find_char("abc", 0, 'z', FindDir::Forward, 1), None);
    }

    // -- % --

    #[test]
    fn match_bracket_nested_forward_and_back() {
        let b = buf(&["f(a(b)c)"]);
        assert_eq!(match_bracket(&b, p(0, 1)), Some(p(0, 7)));
        assert_eq!(match_bracket(&b, p(0, 7)), Some(p(0, 1)));
        assert_eq!(match_bracket(&b, p(0, 3)), Some(p(0, 5)));
    }

    #[test]
    fn match_bracket_across_lines() {
        let b = buf(&["fn x() {", "  {}", "}"]);
        assert_eq!(match_bracket(&b, p(0, 7)), Some(p(2, 0)));
        assert_eq!(match_bracket(&b, p(2, 0)), Some(p(0, 7)));
    }

    #[test]
    fn match_bracket_off_bracket_prefers_next_close() {
        let b = buf(&["a) (b)"]);
        assert_eq!(match_bracket(&b, p(0, 0)), Some(p(0, 1)));
    }

    #[test]
    fn match_bracket_off_bracket_uses_next_open() {
        let b = buf(&["x [1", "]"]);
        assert_eq!(match_bracket(&b, p(0, 0)), Some(p(1, 0)));
    }

    #[test]
    fn match_bracket_none() {
        let b = buf(&["plain", "(unclosed"]);
        assert_eq!(match_bracket(&b, p(0, 0)), None);
        assert_eq!(match_bracket(&b, p(1, 0)), None);
    }

    // -- N% --

    #[test]
    fn percent_line_scales_last_line() {
        let lines: Vec<String> = (0..11).map(|i| i.to_string()).collect();
        let b = Buffer::from_lines(&lines);
        assert_eq!(percent_line(&b, 50), Some(5));
        assert_eq!(percent_line(&b, 100), Some(10));
        assert_eq!(percent_line(&b, 1), Some(0));
        assert_eq!(percent_line(&b, 0), None);
        assert_eq!(percent_line(&b, 101), None);
    }
}
