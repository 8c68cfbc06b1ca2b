//! Register: the single unnamed clipboard.
//!
//! Every yank and delete stores its text here as a list of strings, one per
//! line of captured text. The register also remembers how the text was
//! captured, because paste places it differently:
//!
//! - **Char-wise**: `p` inserts after the cursor, `P` at the cursor. A
//!   multi-element char-wise register spans line breaks.
//! - **Line-wise**: `p` inserts whole lines below the cursor line, `P` above.

/// How the register content was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterKind {
    /// A span of characters (`x`, `dw`, `y$`, visual `v`).
    #[default]
    Char,
    /// Whole lines (`dd`, `yy`, `dj`, visual `V`).
    Line,
}

/// The clipboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Register {
    lines: Vec<String>,
    kind: RegisterKind,
}

impl Register {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            kind: RegisterKind::Char,
        }
    }

    /// Replace the content.
    pub fn store(&mut self, lines: Vec<String>, kind: RegisterKind) {
        self.lines = lines;
        self.kind = kind;
    }

    /// Store a char-wise span given as text with embedded newlines.
    pub fn store_text(&mut self, text: &str) {
        self.store(text.split('\n').map(str::to_owned).collect(), RegisterKind::Char);
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[must_use]
    pub const fn kind(&self) -> RegisterKind {
        self.kind
    }

    /// True when there is nothing to paste.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The content as `\n`-joined text.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let r = Register::new();
        assert!(r.is_empty());
        assert_eq!(r.kind(), RegisterKind::Char);
    }

    #[test]
    fn store_replaces_previous_content() {
        let mut r = Register::new();
        r.store(vec!["a".into()], RegisterKind::Line);
        r.store(vec!["b".into(), "c".into()], RegisterKind::Char);
        assert_eq!(r.lines(), ["b", "c"]);
        assert_eq!(r.kind(), RegisterKind::Char);
    }

    #[test]
    fn store_text_splits_lines() {
        let mut r = Register::new();
        r.store_text("abc\nde");
        assert_eq!(r.lines(), ["abc", "de"]);
        assert_eq!(r.text(), "abc\nde");
    }

    #[test]
    fn store_text_empty_is_one_empty_piece() {
        let mut r = Register::new();
        r.store_text("");
        assert_eq!(r.lines(), [""]);
        assert!(!r.is_empty());
    }
}
