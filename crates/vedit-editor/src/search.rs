//! Literal substring search with wraparound.
//!
//! `/` scans forward from the character after the cursor to the end of the
//! buffer, then (with `wrapscan`) from the top back down to the cursor.
//! `?` is the mirror image. The cursor position itself is the very last
//! candidate, so a query that occurs anywhere in the buffer is always
//! found.
//!
//! Matching is on chars, case-sensitive, and never spans a line break.

use std::fmt;

use crate::buffer::Buffer;
use crate::position::Position;

/// Search direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDir {
    /// `/`
    Forward,
    /// `?`
    Backward,
}

impl SearchDir {
    /// `N` searches the other way.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    /// The prompt character.
    #[must_use]
    pub const fn prompt(self) -> char {
        match self {
            Self::Forward => '/',
            Self::Backward => '?',
        }
    }
}

/// A successful search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub pos: Position,
    /// True if the scan went past a buffer end to find it.
    pub wrapped: bool,
}

/// Why a search found nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFailure {
    /// The query occurs nowhere (reachable).
    NotFound(String),
    /// `nowrapscan` stopped the scan at the bottom.
    HitBottom(String),
    /// `nowrapscan` stopped the scan at the top.
    HitTop(String),
}

impl fmt::Display for SearchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(q) => write!(f, "E486: Pattern not found: {q}"),
            Self::HitBottom(q) => write!(f, "E385: Search hit BOTTOM without match for: {q}"),
            Self::HitTop(q) => write!(f, "E384: Search hit TOP without match for: {q}"),
        }
    }
}

impl Match {
    /// The status text for a wrapped match.
    #[must_use]
    pub const fn wrap_message(dir: SearchDir) -> &'static str {
        match dir {
            SearchDir::Forward => "search hit BOTTOM, continuing at TOP",
            SearchDir::Backward => "search hit TOP, continuing at BOTTOM",
        }
    }
}

/// Start column of the first occurrence of `needle` starting at or after
/// `from`.
fn find_from(hay: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.len() > hay.len() {
        return None;
    }
    (from..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()] == *needle)
}

/// Start column of the last occurrence of `needle` starting before
/// `before`.
fn rfind_before(hay: &[char], needle: &[char], before: usize) -> Option<usize> {
    if needle.len() > hay.len() {
        return None;
    }
    let last = (hay.len() - needle.len() + 1).min(before);
    (0..last).rev().find(|&i| hay[i..i + needle.len()] == *needle)
}

fn line_chars(buf: &Buffer, line: usize) -> Vec<char> {
    buf.line(line).chars().collect()
}

/// Find the next occurrence of `query` from `from`.
///
/// # Errors
///
/// [`SearchFailure`] when there is no occurrence in reach. An empty query
/// never matches.
pub fn find(
    buf: &Buffer,
    from: Position,
    query: &str,
    dir: SearchDir,
    wrapscan: bool,
) -> Result<Match, SearchFailure> {
    let needle: Vec<char> = query.chars().collect();
    if needle.is_empty() {
        return Err(SearchFailure::NotFound(String::new()));
    }
    let found = |line: usize, col: usize, wrapped: bool| Match {
        pos: Position::new(line, col),
        wrapped,
    };

    match dir {
        SearchDir::Forward => {
            let hay = line_chars(buf, from.line);
            if let Some(col) = find_from(&hay, &needle, from.col + 1) {
                return Ok(found(from.line, col, false));
            }
            for line in from.line + 1..buf.line_count() {
                if let Some(col) = find_from(&line_chars(buf, line), &needle, 0) {
                    return Ok(found(line, col, false));
                }
            }
            if !wrapscan {
                return Err(SearchFailure::HitBottom(query.to_string()));
            }
            for line in 0..from.line {
                if let Some(col) = find_from(&line_chars(buf, line), &needle, 0) {
                    return Ok(found(line, col, true));
                }
            }
            match find_from(&hay, &needle, 0) {
                Some(col) if col <= from.col => Ok(found(from.line, col, true)),
                _ => Err(SearchFailure::NotFound(query.to_string())),
            }
        }
        SearchDir::Backward => {
            let hay = line_chars(buf, from.line);
            if let Some(col) = rfind_before(&hay, &needle, from.col) {
                return Ok(found(from.line, col, false));
            }
            for line in (0..from.line).rev() {
                if let Some(col) = rfind_before(&line_chars(buf, line), &needle, usize::MAX) {
                    return Ok(found(line, col, false));
                }
            }
            if !wrapscan {
                return Err(SearchFailure::HitTop(query.to_string()));
            }
            for line in (from.line + 1..buf.line_count()).rev() {
                if let Some(col) = rfind_before(&line_chars(buf, line), &needle, usize::MAX) {
                    return Ok(found(line, col, true));
                }
            }
            match rfind_before(&hay, &needle, usize::MAX) {
                Some(col) if col >= from.col => Ok(found(from.line, col, true)),
                _ => Err(SearchFailure::NotFound(query.to_string())),
            }
        }
    }
}

/// Repeat [`find`] `count` times, each from the previous match.
///
/// # Errors
///
/// The first failure; nothing is returned for partial progress.
pub fn find_nth(
    buf: &Buffer,
    from: Position,
    query: &str,
    dir: SearchDir,
    count: usize,
    wrapscan: bool,
) -> Result<Match, SearchFailure> {
    let mut at = Match {
        pos: from,
        wrapped: false,
    };
    for _ in 0..count.max(1) {
        let next = find(buf, at.pos, query, dir, wrapscan)?;
        at = Match {
            pos: next.pos,
            wrapped: at.wrapped || next.wrapped,
        };
    }
    Ok(at)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
