//! Token classifier for C-family source lines.
//!
//! [`tokenize`] scans one line and returns its tokens. Two things carry
//! over from one line to the next and live in [`LexState`]: whether a
//! `/* ... */` comment is still open, and the stack of open delimiters used
//! to flag unmatched closing brackets. Lines must be fed in buffer order;
//! the same lines from the same starting state always give the same tokens.
//!
//! Recognition order at each position:
//!
//! 1. the rest of an open block comment
//! 2. `//` line comments, `/*` block comments
//! 3. `"` and `'` literals with backslash escapes (unterminated is fine)
//! 4. `#` directives to the end of the line
//! 5. numbers: a digit, then digits, `.`, `x`, `X`
//! 6. two-character operators, then one-character operators
//! 7. punctuation `();{}[],` with delimiter tracking
//! 8. identifiers and keywords
//! 9. any other single character as plain text
//!
//! Columns are char indices.

/// Token classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    NumericLiteral,
    StringLiteral,
    Identifier,
    Comment,
    PreprocessorDirective,
    Operator,
    Punctuation,
    /// `}` with no matching `{` open.
    MismatchedBrace,
    /// `]` with no matching `[` open.
    MismatchedBracket,
    /// `)` with no matching `(` open.
    MismatchedParenthesis,
    PlainText,
}

impl TokenKind {
    #[must_use]
    pub const fn is_mismatched(self) -> bool {
        matches!(
            self,
            Self::MismatchedBrace | Self::MismatchedBracket | Self::MismatchedParenthesis
        )
    }
}

/// A classified span of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Char column of the first character.
    pub start: usize,
}

impl Token {
    fn new(kind: TokenKind, chars: &[char], start: usize, end: usize) -> Self {
        Self {
            kind,
            text: chars[start..end].iter().collect(),
            start,
        }
    }

    /// Char column just past the token.
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.text.chars().count()
    }
}

/// Scanner state carried between lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexState {
    /// Inside an unterminated `/*`.
    pub in_block_comment: bool,
    /// Open `(`, `[`, `{` and template `<`, innermost last.
    pub delimiters: Vec<char>,
    /// The last token was the `template` keyword.
    template_pending: bool,
}

impl LexState {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            in_block_comment: false,
            delimiters: Vec::new(),
            template_pending: false,
        }
    }
}

const KEYWORDS: &[&str] = &[
    "alignas", "alignof", "and", "and_eq", "asm", "atomic_cancel", "atomic_commit",
    "atomic_noexcept", "auto", "bitand", "bitor", "bool", "break", "case", "catch", "char",
    "char8_t", "char16_t", "char32_t", "class", "compl", "concept", "const", "consteval",
    "constexpr", "constinit", "const_cast", "continue", "co_await", "co_return", "co_yield",
    "decltype", "default", "delete", "do", "double", "dynamic_cast", "else", "enum", "explicit",
    "export", "extern", "false", "float", "for", "friend", "goto", "if", "inline", "int", "long",
    "mutable", "namespace", "new", "noexcept", "not", "not_eq", "nullptr", "operator", "or",
    "or_eq", "private", "protected", "public", "reflexpr", "register", "reinterpret_cast",
    "requires", "return", "short", "signed", "sizeof", "static", "static_assert", "static_cast",
    "struct", "switch", "synchronized", "template", "this", "thread_local", "throw", "true",
    "try", "typedef", "typeid", "typename", "union", "unsigned", "using", "virtual", "void",
    "volatile", "wchar_t", "while", "xor", "xor_eq",
];

const TWO_CHAR_OPERATORS: &[&str] = &[
    "==", "!=", "<=", ">=", "++", "--", "&&", "||", "+=", "-=", "*=", "/=", "%=", "&=", "|=",
    "^=", "->", "::",
];

const OPERATOR_CHARS: &str = "+-*/%=<>!&|^~?:.";
const PUNCTUATION_CHARS: &str = "();{}[],";

fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

const fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Index of the first `*/` at or after `from`.
fn find_comment_end(chars: &[char], from: usize) -> Option<usize> {
    (from..chars.len().saturating_sub(1)).find(|&i| chars[i] == '*' && chars[i + 1] == '/')
}

fn starts_with(chars: &[char], at: usize, pat: &str) -> bool {
    let mut i = at;
    for p in pat.chars() {
        if chars.get(i) != Some(&p) {
            return false;
        }
        i += 1;
    }
    true
}

/// Tokenize one line, updating `state` for the next.
#[must_use]
pub fn tokenize(line: &str, state: &mut LexState) -> Vec<Token> {
    let chars: Vec<char> = line.chars().collect();
    let len = chars.len();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < len {
        if state.in_block_comment {
            let end = match find_comment_end(&chars, i) {
                Some(e) => {
                    state.in_block_comment = false;
                    e + 2
                }
                None => len,
            };
            tokens.push(Token::new(TokenKind::Comment, &chars, i, end));
            i = end;
            continue;
        }

        let c = chars[i];
        let start = i;

        if starts_with(&chars, i, "//") {
            tokens.push(Token::new(TokenKind::Comment, &chars, i, len));
            break;
        }
        if starts_with(&chars, i, "/*") {
            let end = match find_comment_end(&chars, i + 2) {
                Some(e) => e + 2,
                None => {
                    state.in_block_comment = true;
                    len
                }
            };
            tokens.push(Token::new(TokenKind::Comment, &chars, i, end));
            i = end;
            continue;
        }

        if c == '"' || c == '\'' {
            i += 1;
            let mut escaped = false;
            while i < len {
                let d = chars[i];
                i += 1;
                if escaped {
                    escaped = false;
                } else if d == '\\' {
                    escaped = true;
                } else if d == c {
                    break;
                }
            }
            push(&mut tokens, state, Token::new(TokenKind::StringLiteral, &chars, start, i));
            continue;
        }

        if c == '#' {
            push(&mut tokens, state, Token::new(TokenKind::PreprocessorDirective, &chars, i, len));
            break;
        }

        if c.is_ascii_digit() {
            while i < len && (chars[i].is_ascii_digit() || matches!(chars[i], '.' | 'x' | 'X')) {
                i += 1;
            }
            push(&mut tokens, state, Token::new(TokenKind::NumericLiteral, &chars, start, i));
            continue;
        }

        if OPERATOR_CHARS.contains(c) {
            if let Some(op) = TWO_CHAR_OPERATORS.iter().find(|op| starts_with(&chars, i, op)) {
                i += op.len();
            } else {
                i += 1;
                track_angle(state, c);
            }
            push(&mut tokens, state, Token::new(TokenKind::Operator, &chars, start, i));
            continue;
        }

        if PUNCTUATION_CHARS.contains(c) {
            let kind = track_delimiter(state, c);
            i += 1;
            push(&mut tokens, state, Token::new(kind, &chars, start, i));
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            while i < len && is_ident_char(chars[i]) {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let kind = classify_word(&word, state);
            let template = word == "template";
            push(&mut tokens, state, Token::new(kind, &chars, start, i));
            state.template_pending = template;
            continue;
        }

        i += 1;
        let token = Token::new(TokenKind::PlainText, &chars, start, i);
        if c.is_whitespace() {
            tokens.push(token);
        } else {
            push(&mut tokens, state, token);
        }
    }
    tokens
}

/// Push a non-blank token; any such token ends a pending `template`.
fn push(tokens: &mut Vec<Token>, state: &mut LexState, token: Token) {
    state.template_pending = false;
    tokens.push(token);
}

/// `<` opens a template argument list right after `template` or inside one;
/// `>` closes the innermost.
fn track_angle(state: &mut LexState, c: char) {
    match c {
        '<' if state.template_pending || state.delimiters.last() == Some(&'<') => {
            state.delimiters.push('<');
        }
        '>' if state.delimiters.last() == Some(&'<') => {
            state.delimiters.pop();
        }
        _ => {}
    }
}

fn track_delimiter(state: &mut LexState, c: char) -> TokenKind {
    let (open, mismatch) = match c {
        '(' | '[' | '{' => {
            state.delimiters.push(c);
            return TokenKind::Punctuation;
        }
        ')' => ('(', TokenKind::MismatchedParenthesis),
        ']' => ('[', TokenKind::MismatchedBracket),
        '}' => ('{', TokenKind::MismatchedBrace),
        _ => return TokenKind::Punctuation,
    };
    if state.delimiters.last() == Some(&open) {
        state.delimiters.pop();
        TokenKind::Punctuation
    } else {
        mismatch
    }
}

fn classify_word(word: &str, state: &LexState) -> TokenKind {
    if !is_keyword(word) {
        return TokenKind::Identifier;
    }
    match word {
        "typename" | "concept" if state.delimiters.last() != Some(&'<') => TokenKind::Identifier,
        _ => TokenKind::Keyword,
    }
}

/// Tokenize every line in order from a fresh state.
#[must_use]
pub fn tokenize_lines<S: AsRef<str>>(lines: &[S]) -> Vec<Vec<Token>> {
    let mut state = LexState::new();
    lines
        .iter()
        .map(|line| tokenize(line.as_ref(), &mut state))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(line: &str) -> Vec<(TokenKind, String)> {
        tokenize(line, &mut LexState::new())
            .into_iter()
            .filter(|t| !t.text.trim().is_empty())
            .map(|t| (t.kind, t.text))
            .collect()
    }

    fn k(kind: TokenKind, text: &str) -> (TokenKind, String) {
        (kind, text.to_string())
    }

    // -- basics --

    #[test]
    fn declaration() {
        use TokenKind::*;
        assert_eq!(
            kinds("int x = 0x1F;"),
            vec![
                k(Keyword, "int"),
                k(Identifier, "x"),
                k(Operator, "="),
                k(NumericLiteral, "0x1F"),
                k(Punctuation, ";"),
            ]
        );
    }

    #[test]
    fn columns_are_char_indices() {
        let toks = tokenize("é x", &mut LexState::new());
        assert_eq!(toks[0].kind, TokenKind::PlainText);
        assert_eq!(toks[2].start, 2);
        assert_eq!(toks[2].end(), 3);
    }

    #[test]
    fn whitespace_is_plain_text() {
        let toks = tokenize("a b", &mut LexState::new());
        assert_eq!(toks[1], Token { kind: TokenKind::PlainText, text: " ".into(), start: 1 });
    }

    #[test]
    fn two_char_operators_win() {
        use TokenKind::*;
        assert_eq!(
            kinds("a->b::c != d"),
            vec![
                k(Identifier, "a"),
                k(Operator, "->"),
                k(Identifier, "b"),
                k(Operator, "::"),
                k(Identifier, "c"),
                k(Operator, "!="),
                k(Identifier, "d"),
            ]
        );
    }

    #[test]
    fn permissive_numbers() {
        assert_eq!(kinds("1.2.3"), vec![k(TokenKind::NumericLiteral, "1.2.3")]);
    }

    // -- literals and comments --

    #[test]
    fn strings_with_escapes() {
        use TokenKind::*;
        assert_eq!(
            kinds(r#"s = "a\"b" + 'c';"#),
            vec![
                k(Identifier, "s"),
                k(Operator, "="),
                k(StringLiteral, r#""a\"b""#),
                k(Operator, "+"),
                k(StringLiteral, "'c'"),
                k(Punctuation, ";"),
            ]
        );
    }

    #[test]
    fn unterminated_string_runs_to_eol() {
        assert_eq!(kinds("\"abc"), vec![k(TokenKind::StringLiteral, "\"abc")]);
    }

    #[test]
    fn line_comment_takes_the_rest() {
        assert_eq!(
            kinds("x; // note ( ]"),
            vec![
                k(TokenKind::Identifier, "x"),
                k(TokenKind::Punctuation, ";"),
                k(TokenKind::Comment, "// note ( ]"),
            ]
        );
    }

    #[test]
    fn directive_takes_the_line() {
        assert_eq!(
            kinds("#include <vector>"),
            vec![k(TokenKind::PreprocessorDirective, "#include <vector>")]
        );
    }

    #[test]
    fn block_comment_spans_lines() {
        let tokens = tokenize_lines(&["a /* one", "two", "three */ b"]);
        assert_eq!(tokens[0].last().map(|t| t.kind), Some(TokenKind::Comment));
        assert_eq!(tokens[1], vec![Token { kind: TokenKind::Comment, text: "two".into(), start: 0 }]);
        assert_eq!(tokens[2][0].text, "three */");
        assert_eq!(tokens[2].last().map(|t| (t.kind, t.text.as_str())), Some((TokenKind::Identifier, "b")));
    }

    #[test]
    fn closed_block_comment_inline() {
        let mut state = LexState::new();
        let toks = tokenize("a /* x */ b", &mut state);
        assert!(!state.in_block_comment);
        assert_eq!(toks[2].text, "/* x */");
        assert_eq!(toks[4].text, "b");
    }

    // -- delimiters --

    #[test]
    fn unmatched_closers_are_flagged_per_kind() {
        use TokenKind::*;
        assert_eq!(
            kinds(") ] }"),
            vec![
                k(MismatchedParenthesis, ")"),
                k(MismatchedBracket, "]"),
                k(MismatchedBrace, "}"),
            ]
        );
    }

    #[test]
    fn crossed_delimiters_mismatch() {
        let toks = kinds("( ]");
        assert_eq!(toks[1], k(TokenKind::MismatchedBracket, "]"));
    }

    #[test]
    fn delimiters_carry_across_lines() {
        let tokens = tokenize_lines(&["int f() {", "  return 0;", "}"]);
        assert!(tokens.iter().flatten().all(|t| !t.kind.is_mismatched()));
    }

    // -- keywords --

    #[test]
    fn typename_outside_template_is_identifier() {
        assert_eq!(kinds("typename"), vec![k(TokenKind::Identifier, "typename")]);
    }

    #[test]
    fn typename_inside_template_is_keyword() {
        use TokenKind::*;
        assert_eq!(
            kinds("template <typename T>"),
            vec![
                k(Keyword, "template"),
                k(Operator, "<"),
                k(Keyword, "typename"),
                k(Identifier, "T"),
                k(Operator, ">"),
            ]
        );
    }

    #[test]
    fn template_angle_closes() {
        let mut state = LexState::new();
        let _ = tokenize("template <class T> concept", &mut state);
        assert!(state.delimiters.is_empty());
        assert_eq!(
            kinds("template <class T> concept").last(),
            Some(&k(TokenKind::Identifier, "concept"))
        );
    }

    #[test]
    fn less_than_is_not_a_delimiter() {
        let mut state = LexState::new();
        let _ = tokenize("if (a < b) {}", &mut state);
        assert!(state.delimiters.is_empty());
    }
}
