//! Keystroke interpreter.
//!
//! [`Interpreter::handle_key`] takes one [`Key`] and either builds an
//! [`Operation`] and applies it, or performs the command directly. Keys
//! that need more input (an operator waiting for its motion, `f` waiting for
//! its character, a `:` or `/` prompt being typed) park the interpreter in a
//! [`Pending`] state until the next key arrives, so the caller never blocks
//! inside a command.
//!
//! # Counts
//!
//! A count is `1`-`9` followed by any digits. A lone `0` is the motion to
//! column 0. An operator may take a second count before its motion; the two
//! multiply (`2d3w` deletes six words).
//!
//! # Undo units and repeat
//!
//! Keys are grouped into units. A unit opens on the first key typed while
//! the editor is idle (Command mode, nothing pending) and closes the next
//! time it is idle again, so `3dw`, `ihello<Esc>` and `vjd` are one unit
//! each. When a unit closes with the buffer changed, the content from before
//! the unit goes onto the undo history and the unit's keys become the
//! repeat buffer for `.`. Units started by `u` are not undoable; units
//! started by `u`, `.`, `n`, `N`, `:`, `/` or `?` are not repeatable.

use crate::buffer::{Buffer, Snapshot};
use crate::command;
use crate::editor::{Editor, Scroll};
use crate::key::Key;
use crate::mode::{Mode, VisualShape};
use crate::motion::{self, FindDir};
use crate::operation::{DeleteDir, MotionKind, Operation};
use crate::position::{Position, Range};
use crate::register::RegisterKind;
use crate::search::{self, Match, SearchDir};

// ---------------------------------------------------------------------------
// Pending state
// ---------------------------------------------------------------------------

/// `d`, `c` or `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Delete,
    Change,
    Yank,
}

impl Operator {
    const fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Char('d') => Some(Self::Delete),
            Key::Char('c') => Some(Self::Change),
            Key::Char('y') => Some(Self::Yank),
            _ => None,
        }
    }

    /// The key that doubles this operator into its line form (`dd`).
    const fn key(self) -> char {
        match self {
            Self::Delete => 'd',
            Self::Change => 'c',
            Self::Yank => 'y',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKind {
    Ex,
    Search(SearchDir),
}

impl PromptKind {
    const fn leader(self) -> char {
        match self {
            Self::Ex => ':',
            Self::Search(dir) => dir.prompt(),
        }
    }
}

/// What the next key completes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum Pending {
    #[default]
    None,
    /// `d`, `c`, `y` waiting for a motion, with its own count so far.
    Operator {
        op: Operator,
        count: usize,
        motion_count: Option<usize>,
    },
    /// `df` / `dF` waiting for the character.
    OperatorFind {
        op: Operator,
        count: usize,
        dir: FindDir,
    },
    /// `f` / `F` waiting for the character.
    Find { dir: FindDir, count: usize },
    /// `r` waiting for the replacement.
    Replace { count: usize },
    /// A `:`, `/` or `?` line being typed.
    Prompt {
        kind: PromptKind,
        input: String,
        count: usize,
    },
}

/// An open undo unit.
#[derive(Debug)]
struct Unit {
    checkpoint: Snapshot,
    cursor: Position,
    keys: Vec<Key>,
    repeatable: bool,
}

/// An Insert or Replace session.
#[derive(Debug)]
struct InsertSession {
    count: usize,
    /// Keys typed since the session began, Escape excluded.
    typed: Vec<Key>,
    /// Started by `o` / `O`: each repetition opens a new line.
    open_line: bool,
    /// Whether the count repeats the typed text.
    repeat: bool,
}

impl InsertSession {
    const fn new(count: usize, open_line: bool, repeat: bool) -> Self {
        Self {
            count,
            typed: Vec::new(),
            open_line,
            repeat,
        }
    }
}

// ---------------------------------------------------------------------------
// Interpreter
// ---------------------------------------------------------------------------

/// Keystroke state machine. One per editor.
#[derive(Debug, Default)]
pub struct Interpreter {
    pending: Pending,
    count: Option<usize>,
    insert: Option<InsertSession>,
    unit: Option<Unit>,
    last_find: Option<(char, FindDir)>,
    last_search: Option<(String, SearchDir)>,
}

impl Interpreter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interpret one key.
    pub fn handle_key(&mut self, ed: &mut Editor, key: Key) {
        if self.unit.is_none() && self.is_idle(ed) {
            ed.clear_status();
            self.unit = Some(Unit {
                checkpoint: ed.buffer.snapshot(),
                cursor: ed.position(),
                keys: Vec::new(),
                repeatable: true,
            });
        }
        if let Some(unit) = &mut self.unit {
            unit.keys.push(key);
        }
        self.dispatch(ed, key);
        if self.is_idle(ed) {
            self.close_unit(ed);
        }
    }

    /// Interpret every key of a notation string such as `"dw"` or
    /// `"ihello<Esc>"`.
    pub fn feed(&mut self, ed: &mut Editor, notation: &str) {
        for key in Key::parse_sequence(notation) {
            self.handle_key(ed, key);
        }
    }

    /// The prompt line being typed, leader included (`":wq"`).
    #[must_use]
    pub fn prompt(&self) -> Option<String> {
        match &self.pending {
            Pending::Prompt { kind, input, .. } => Some(format!("{}{input}", kind.leader())),
            _ => None,
        }
    }

    /// True when no command is in progress.
    #[must_use]
    pub fn is_idle(&self, ed: &Editor) -> bool {
        ed.mode() == Mode::Command && self.pending == Pending::None && self.count.is_none()
    }

    fn close_unit(&mut self, ed: &mut Editor) {
        let Some(unit) = self.unit.take() else {
            return;
        };
        if ed.buffer.matches(&unit.checkpoint) {
            return;
        }
        let first = unit.keys.iter().copied().find(|k| k.digit().is_none());
        if first != Some(Key::Char('u')) && ed.history.push(unit.checkpoint, unit.cursor) {
            tracing::debug!(depth = ed.history.len(), "undo checkpoint");
        }
        let repeatable = unit.repeatable
            && !matches!(
                first,
                Some(Key::Char(':' | '/' | '?' | 'n' | 'N' | 'u' | '.'))
            );
        if repeatable && !ed.is_replaying() {
            ed.set_last_change(unit.keys);
        }
    }

    /// Interpret a key and apply the operation it produced.
    fn dispatch(&mut self, ed: &mut Editor, key: Key) {
        let from_command = ed.mode() == Mode::Command;
        if let Some(mut op) = self.interpret(ed, key) {
            op.apply(ed);
            if from_command && !op.removed().is_empty() {
                ed.register.store_text(op.removed());
            }
        }
    }

    fn interpret(&mut self, ed: &mut Editor, key: Key) -> Option<Operation> {
        if self.pending != Pending::None {
            let pending = std::mem::take(&mut self.pending);
            self.resolve_pending(ed, pending, key);
            return None;
        }
        let mode = ed.mode();
        if matches!(mode, Mode::Command | Mode::Visual(_)) {
            if let Some(d) = key.digit() {
                if d > 0 || self.count.is_some() {
                    self.count = Some(push_digit(self.count, d));
                    return None;
                }
            }
        }
        match mode {
            Mode::Command => self.command_key(ed, key),
            Mode::Insert => self.insert_key(ed, key),
            Mode::Replace => self.replace_key(ed, key),
            Mode::Visual(shape) => {
                self.visual_key(ed, key, shape);
                None
            }
        }
    }

    fn resolve_pending(&mut self, ed: &mut Editor, pending: Pending, key: Key) {
        match pending {
            Pending::None => {}
            Pending::Operator {
                op,
                count,
                motion_count,
            } => match key.digit() {
                Some(d) if d > 0 || motion_count.is_some() => {
                    self.pending = Pending::Operator {
                        op,
                        count,
                        motion_count: Some(push_digit(motion_count, d)),
                    };
                }
                _ => {
                    let n = count.saturating_mul(motion_count.unwrap_or(1)).min(MAX_COUNT);
                    self.apply_operator(ed, op, n, key);
                }
            },
            Pending::OperatorFind { op, count, dir } => {
                if let Key::Char(c) = key {
                    self.operator_find(ed, op, count, dir, c);
                }
            }
            Pending::Find { dir, count } => {
                if let Key::Char(c) = key {
                    self.last_find = Some((c, dir));
                    find_on_line(ed, c, dir, count);
                }
            }
            Pending::Replace { count } => {
                if let Key::Char(c) = key {
                    replace_chars(ed, c, count);
                }
            }
            Pending::Prompt {
                kind,
                mut input,
                count,
            } => match key {
                Key::Escape => {}
                Key::Enter => match kind {
                    PromptKind::Ex => command::run(ed, &input),
                    PromptKind::Search(dir) => self.search(ed, input, dir, count),
                },
                Key::Backspace => {
                    if input.pop().is_some() {
                        self.pending = Pending::Prompt { kind, input, count };
                    }
                }
                other => {
                    if let Some(c) = other.text() {
                        input.push(c);
                    }
                    self.pending = Pending::Prompt { kind, input, count };
                }
            },
        }
    }

    // -- Command mode ---------------------------------------------------------

    fn command_key(&mut self, ed: &mut Editor, key: Key) -> Option<Operation> {
        let explicit = self.count.is_some();
        let n = self.count.take().unwrap_or(1);
        let pos = ed.position();
        let len = ed.buffer.line_len(pos.line);

        if let Some(op) = Operator::from_key(key) {
            self.pending = Pending::Operator {
                op,
                count: n,
                motion_count: None,
            };
            return None;
        }

        match key {
            // Mode entry
            Key::Char('i') => self.enter_input(ed, Mode::Insert, InsertSession::new(n, false, true)),
            Key::Char('I') => {
                self.enter_input(ed, Mode::Insert, InsertSession::new(n, false, true));
                ed.move_to_first_non_blank();
            }
            Key::Char('a') => {
                self.enter_input(ed, Mode::Insert, InsertSession::new(n, false, true));
                ed.move_to(Position::new(pos.line, pos.col + 1));
            }
            Key::Char('A') => {
                self.enter_input(ed, Mode::Insert, InsertSession::new(n, false, true));
                ed.move_to(Position::new(pos.line, len));
            }
            Key::Char('o') => {
                ed.insert_lines_below(&[String::new()]);
                self.enter_input(ed, Mode::Insert, InsertSession::new(n, true, true));
            }
            Key::Char('O') => {
                ed.buffer.insert_lines(pos.line, &[""]);
                ed.move_to(Position::new(pos.line, 0));
                self.enter_input(ed, Mode::Insert, InsertSession::new(n, true, true));
            }
            Key::Char('R') => self.enter_input(ed, Mode::Replace, InsertSession::new(n, false, true)),
            Key::Char('v') => enter_visual(ed, VisualShape::Character),
            Key::Char('V') => enter_visual(ed, VisualShape::Line),
            Key::Ctrl('v') => enter_visual(ed, VisualShape::Block),

            // Motions
            Key::Char('h') | Key::Left => return Some(Operation::motion(MotionKind::Left, n)),
            Key::Char('l') | Key::Right => return Some(Operation::motion(MotionKind::Right, n)),
            Key::Char('j') | Key::Down => return Some(Operation::motion(MotionKind::Down, n)),
            Key::Char('k') | Key::Up => return Some(Operation::motion(MotionKind::Up, n)),
            Key::Char('w') => return Some(Operation::motion(MotionKind::WordForward, n)),
            Key::Char('b') => return Some(Operation::motion(MotionKind::WordBackward, n)),
            Key::Char('$') => return Some(Operation::motion(MotionKind::LineEnd, n)),
            Key::Char('0') => ed.move_to(Position::new(pos.line, 0)),
            Key::Char('^') => ed.move_to_first_non_blank(),
            Key::Char('%') if explicit => match motion::percent_line(&ed.buffer, n) {
                Some(line) => {
                    ed.move_to(Position::new(line, 0));
                    ed.move_to_first_non_blank();
                }
                None => ed.ring_bell(),
            },
            Key::Char('%') => match motion::match_bracket(&ed.buffer, pos) {
                Some(to) => ed.move_to(to),
                None => ed.ring_bell(),
            },
            Key::Char('f') => {
                self.pending = Pending::Find {
                    dir: FindDir::Forward,
                    count: n,
                };
            }
            Key::Char('F') => {
                self.pending = Pending::Find {
                    dir: FindDir::Backward,
                    count: n,
                };
            }
            Key::Char(';') => match self.last_find {
                Some((c, dir)) => find_on_line(ed, c, dir, n),
                None => ed.ring_bell(),
            },
            Key::Ctrl('b') => return Some(Operation::motion(MotionKind::Scroll(Scroll::PageBackward), n)),
            Key::Ctrl('d') => return Some(Operation::motion(MotionKind::Scroll(Scroll::HalfDown), n)),
            Key::Ctrl('u') => return Some(Operation::motion(MotionKind::Scroll(Scroll::HalfUp), n)),
            Key::Ctrl('f') => return Some(Operation::motion(MotionKind::Scroll(Scroll::PageForward), n)),

            // Edits
            Key::Char('x') | Key::Delete => {
                let k = len.saturating_sub(pos.col).min(n);
                if k == 0 {
                    ed.ring_bell();
                } else {
                    return Some(Operation::delete(DeleteDir::Forward, k));
                }
            }
            Key::Char('X') => {
                let k = pos.col.min(n);
                if k == 0 {
                    ed.ring_bell();
                } else {
                    return Some(Operation::delete(DeleteDir::Backward, k));
                }
            }
            Key::Char('s') => {
                self.insert = Some(InsertSession::new(1, false, false));
                return Some(Operation::substitute(len.saturating_sub(pos.col).min(n)));
            }
            Key::Char('S') => self.apply_operator(ed, Operator::Change, n, Key::Char('c')),
            Key::Char('r') => self.pending = Pending::Replace { count: n },
            Key::Char('J') => join_lines(ed, n),
            Key::Char('p') => paste(ed, true, n),
            Key::Char('P') => paste(ed, false, n),
            Key::Char('u') => undo(ed),
            Key::Char('.') => self.repeat(ed),

            // Prompts and search
            Key::Char(':') => self.open_prompt(PromptKind::Ex, n),
            Key::Char('/') => self.open_prompt(PromptKind::Search(SearchDir::Forward), n),
            Key::Char('?') => self.open_prompt(PromptKind::Search(SearchDir::Backward), n),
            Key::Char('n') => self.search_again(ed, false, n),
            Key::Char('N') => self.search_again(ed, true, n),

            Key::Ctrl('g') => {
                let info = ed.file_info();
                ed.set_status(info);
            }
            _ => {}
        }
        None
    }

    fn enter_input(&mut self, ed: &mut Editor, mode: Mode, session: InsertSession) {
        self.insert = Some(session);
        ed.set_mode(mode);
    }

    /// Start a change session at `at` (after `c`, `S`, visual `c`).
    fn begin_change(&mut self, ed: &mut Editor, at: Position) {
        self.enter_input(ed, Mode::Insert, InsertSession::new(1, false, false));
        ed.move_to(at);
    }

    fn open_prompt(&mut self, kind: PromptKind, count: usize) {
        self.pending = Pending::Prompt {
            kind,
            input: String::new(),
            count,
        };
    }

    fn repeat(&mut self, ed: &mut Editor) {
        if ed.is_replaying() {
            return;
        }
        if let Some(unit) = &mut self.unit {
            unit.repeatable = false;
        }
        let keys = ed.last_change().to_vec();
        if keys.is_empty() {
            ed.ring_bell();
            ed.set_error("No last change to repeat");
            return;
        }
        tracing::debug!(keys = keys.len(), "replaying last change");
        ed.set_replaying(true);
        for key in keys {
            self.dispatch(ed, key);
        }
        ed.set_replaying(false);
    }

    // -- Operators ------------------------------------------------------------

    fn apply_operator(&mut self, ed: &mut Editor, op: Operator, n: usize, key: Key) {
        let pos = ed.position();
        let (line, col) = (pos.line, pos.col);
        let len = ed.buffer.line_len(line);
        let last = ed.buffer.last_line();
        let lines_left = last - line + 1;

        match key {
            Key::Char('0') => self.charwise(ed, op, Range::ordered(Position::new(line, 0), pos)),
            Key::Char('$') => {
                let end = line.saturating_add(n - 1).min(last);
                let to = Position::new(end, ed.buffer.line_len(end));
                self.charwise(ed, op, Range::ordered(pos, to));
            }
            Key::Char('h') | Key::Left => {
                let k = col.min(n);
                self.charwise(ed, op, Range::ordered(Position::new(line, col - k), pos));
            }
            Key::Char('l') | Key::Right => {
                let k = len.saturating_sub(col).min(n);
                self.charwise(ed, op, Range::ordered(pos, Position::new(line, col + k)));
            }
            // `dj` takes one line more than its count; `cj` and `yj` do not.
            Key::Char('j') | Key::Down => {
                let count = match op {
                    Operator::Delete => lines_left.min(n.saturating_add(1)),
                    Operator::Change | Operator::Yank => lines_left.min(n),
                };
                if op == Operator::Change {
                    self.change_lines(ed, line, count, line);
                } else {
                    self.linewise(ed, op, line, count);
                }
            }
            // `dk` reaches one line further up than `ck`; `yk` copies the
            // lines above without the current one.
            Key::Char('k') | Key::Up => {
                let k = match op {
                    Operator::Delete => line.min(n.saturating_add(1)),
                    Operator::Change | Operator::Yank => line.min(n),
                };
                if k == 0 {
                    ed.ring_bell();
                } else if op == Operator::Yank {
                    self.linewise(ed, op, line - k, k);
                } else if op == Operator::Change {
                    self.change_lines(ed, line + 1 - k, k, line - k);
                } else {
                    self.linewise(ed, op, line + 1 - k, k);
                }
            }
            Key::Char(c) if c == op.key() => self.linewise(ed, op, line, lines_left.min(n)),
            Key::Char(c @ ('w' | 'b' | '%')) => {
                let step: fn(&Buffer, Position) -> Option<Position> = match c {
                    'w' => motion::word_forward,
                    'b' => motion::word_backward,
                    _ => motion::match_bracket,
                };
                let mut at = pos;
                for _ in 0..n {
                    let Some(next) = step(&ed.buffer, at) else {
                        ed.ring_bell();
                        return;
                    };
                    at = next;
                }
                self.charwise(ed, op, Range::ordered(pos, at));
            }
            Key::Char('f') => {
                self.pending = Pending::OperatorFind {
                    op,
                    count: n,
                    dir: FindDir::Forward,
                };
            }
            Key::Char('F') => {
                self.pending = Pending::OperatorFind {
                    op,
                    count: n,
                    dir: FindDir::Backward,
                };
            }
            _ => {}
        }
    }

    fn operator_find(&mut self, ed: &mut Editor, op: Operator, count: usize, dir: FindDir, c: char) {
        self.last_find = Some((c, dir));
        let pos = ed.position();
        let Some(target) = motion::find_char(&ed.buffer.line(pos.line), pos.col, c, dir, count) else {
            ed.ring_bell();
            ed.set_error(format!("Character '{c}' not found"));
            return;
        };
        let (from, to) = match dir {
            FindDir::Forward => (pos.col, target),
            FindDir::Backward => (target, pos.col),
        };
        // `c` also takes the character at the right end of the span.
        let to = if op == Operator::Change {
            (to + 1).min(ed.buffer.line_len(pos.line))
        } else {
            to
        };
        let range = Range::ordered(Position::new(pos.line, from), Position::new(pos.line, to));
        self.charwise(ed, op, range);
    }

    fn charwise(&mut self, ed: &mut Editor, op: Operator, range: Range) {
        match op {
            Operator::Yank => {
                let text = ed.buffer.text(range);
                if !text.is_empty() {
                    ed.register.store_text(&text);
                }
            }
            Operator::Delete => {
                let text = ed.delete_range(range);
                if !text.is_empty() {
                    ed.register.store_text(&text);
                }
            }
            Operator::Change => {
                let text = ed.buffer.delete(range);
                if !text.is_empty() {
                    ed.register.store_text(&text);
                }
                self.begin_change(ed, range.start);
            }
        }
    }

    fn linewise(&mut self, ed: &mut Editor, op: Operator, first: usize, count: usize) {
        match op {
            Operator::Yank => {
                let lines = (first..first + count).map(|l| ed.buffer.line(l)).collect();
                ed.register.store(lines, RegisterKind::Line);
                ed.set_status(format!("Yanked {count} line(s)."));
            }
            Operator::Delete => {
                let removed = ed.remove_lines(first, count);
                ed.register.store(removed, RegisterKind::Line);
            }
            Operator::Change => {
                let every_line = count >= ed.buffer.line_count();
                let removed = ed.buffer.remove_lines(first, count);
                ed.register.store(removed, RegisterKind::Line);
                if !every_line {
                    ed.buffer.insert_lines(first, &[""]);
                }
                self.begin_change(ed, Position::new(first, 0));
            }
        }
    }

    /// `cj` / `ck`: drop the lines and type at the start of line `land`.
    /// Unlike `cc`, no blank line is opened in their place.
    fn change_lines(&mut self, ed: &mut Editor, first: usize, count: usize, land: usize) {
        let removed = ed.buffer.remove_lines(first, count);
        ed.register.store(removed, RegisterKind::Line);
        self.begin_change(ed, Position::new(land, 0));
    }

    // -- Insert and Replace ---------------------------------------------------

    fn insert_key(&mut self, ed: &mut Editor, key: Key) -> Option<Operation> {
        if key == Key::Escape {
            self.finish_input(ed);
            return None;
        }
        self.record_typed(key);
        input_operation(key)
    }

    fn replace_key(&mut self, ed: &mut Editor, key: Key) -> Option<Operation> {
        match key {
            Key::Escape => {
                self.finish_input(ed);
                None
            }
            Key::Backspace => {
                self.record_typed(key);
                Some(Operation::motion(MotionKind::Left, 1))
            }
            _ => {
                self.record_typed(key);
                if let Some(c) = key.text() {
                    let pos = ed.position();
                    if pos.col < ed.buffer.line_len(pos.line) {
                        ed.delete_forward();
                    }
                    ed.insert_char(c);
                    None
                } else {
                    input_operation(key)
                }
            }
        }
    }

    fn record_typed(&mut self, key: Key) {
        if let Some(session) = &mut self.insert {
            session.typed.push(key);
        }
    }

    /// Escape: repeat the typed text for the count, step left, back to
    /// Command mode.
    fn finish_input(&mut self, ed: &mut Editor) {
        if let Some(session) = self.insert.take() {
            if session.repeat {
                for _ in 1..session.count {
                    if session.open_line {
                        Operation::insert('\n').apply(ed);
                    }
                    for &key in &session.typed {
                        self.dispatch(ed, key);
                    }
                }
            }
        }
        let past_end = ed.past_end();
        ed.cursor.move_left(1, &ed.buffer, past_end);
        ed.set_mode(Mode::Command);
    }

    // -- Visual mode ----------------------------------------------------------

    fn visual_key(&mut self, ed: &mut Editor, key: Key, shape: VisualShape) {
        let n = self.count.take().unwrap_or(1);
        let motion = match key {
            Key::Char('h') | Key::Left => Some(MotionKind::Left),
            Key::Char('l') | Key::Right => Some(MotionKind::Right),
            Key::Char('j') | Key::Down => Some(MotionKind::Down),
            Key::Char('k') | Key::Up => Some(MotionKind::Up),
            Key::Char('w') => Some(MotionKind::WordForward),
            Key::Char('b') => Some(MotionKind::WordBackward),
            Key::Char('$') => Some(MotionKind::LineEnd),
            _ => None,
        };
        if let Some(kind) = motion {
            Operation::motion(kind, n).apply(ed);
            ed.selection.update(ed.position());
            return;
        }

        match key {
            Key::Char('0') => {
                ed.move_to(Position::new(ed.position().line, 0));
                ed.selection.update(ed.position());
            }
            Key::Char('y') => {
                let at = yank_selection(ed);
                exit_visual(ed);
                ed.move_to(at);
                ed.set_status("Yanked selection");
            }
            Key::Char('d' | 'x' | 'X') => {
                let at = delete_selection(ed);
                exit_visual(ed);
                ed.move_to(at);
                ed.set_status("Deleted selection");
            }
            Key::Char('c') => {
                let total = ed.buffer.line_count();
                let span = ed.selection.bounds().map(|(s, e)| (s.line, e.line - s.line + 1));
                let mut at = delete_selection(ed);
                if let (VisualShape::Line, Some((first, count))) = (shape, span) {
                    // A changed line range leaves one empty line to type into.
                    if count < total {
                        ed.buffer.insert_lines(first, &[""]);
                    }
                    at = Position::new(first.min(ed.buffer.last_line()), 0);
                }
                exit_visual(ed);
                self.begin_change(ed, at);
            }
            Key::Char('v') => switch_shape(ed, shape, VisualShape::Character),
            Key::Char('V') => switch_shape(ed, shape, VisualShape::Line),
            Key::Ctrl('v') => switch_shape(ed, shape, VisualShape::Block),
            Key::Escape => exit_visual(ed),
            Key::Char('.') => {
                exit_visual(ed);
                self.repeat(ed);
            }
            _ => {}
        }
    }

    // -- Search ---------------------------------------------------------------

    fn search(&mut self, ed: &mut Editor, query: String, dir: SearchDir, count: usize) {
        if query.is_empty() {
            return;
        }
        run_search(ed, &query, dir, count);
        self.last_search = Some((query, dir));
    }

    fn search_again(&self, ed: &mut Editor, reverse: bool, count: usize) {
        let Some((query, dir)) = &self.last_search else {
            ed.ring_bell();
            ed.set_error("E35: No previous regular expression");
            return;
        };
        let dir = if reverse { dir.reversed() } else { *dir };
        run_search(ed, query, dir, count);
    }
}

// ---------------------------------------------------------------------------
// Commands that need no interpreter state
// ---------------------------------------------------------------------------

/// Largest count a command takes. More digits are ignored.
pub const MAX_COUNT: usize = 9_999;

fn push_digit(count: Option<usize>, digit: usize) -> usize {
    count
        .unwrap_or(0)
        .saturating_mul(10)
        .saturating_add(digit)
        .min(MAX_COUNT)
}

/// Insert and Replace mode keys that map directly onto an operation.
fn input_operation(key: Key) -> Option<Operation> {
    match key {
        Key::Enter => Some(Operation::insert('\n')),
        Key::Backspace => Some(Operation::delete(DeleteDir::Backward, 1)),
        Key::Delete => Some(Operation::delete(DeleteDir::Forward, 1)),
        Key::Left => Some(Operation::motion(MotionKind::Left, 1)),
        Key::Right => Some(Operation::motion(MotionKind::Right, 1)),
        Key::Up => Some(Operation::motion(MotionKind::Up, 1)),
        Key::Down => Some(Operation::motion(MotionKind::Down, 1)),
        other => other.text().map(Operation::insert),
    }
}

fn find_on_line(ed: &mut Editor, c: char, dir: FindDir, count: usize) {
    let pos = ed.position();
    match motion::find_char(&ed.buffer.line(pos.line), pos.col, c, dir, count) {
        Some(col) => ed.move_to(Position::new(pos.line, col)),
        None => {
            ed.ring_bell();
            ed.set_error(format!("Character '{c}' not found"));
        }
    }
}

/// `r<c>`: overwrite `count` characters, cursor on the last.
fn replace_chars(ed: &mut Editor, c: char, count: usize) {
    let pos = ed.position();
    let len = ed.buffer.line_len(pos.line);
    if pos.col.saturating_add(count) > len || count == 0 {
        ed.ring_bell();
        return;
    }
    let end = Position::new(pos.line, pos.col + count);
    ed.buffer.delete(Range::ordered(pos, end));
    ed.buffer.insert(pos, &c.to_string().repeat(count));
    ed.move_to(Position::new(pos.line, pos.col + count - 1));
}

/// `J`: join the next line onto this one, `count` times.
fn join_lines(ed: &mut Editor, count: usize) {
    for _ in 0..count {
        let line = ed.position().line;
        if line >= ed.buffer.last_line() {
            ed.ring_bell();
            return;
        }
        let current = ed.buffer.line(line);
        let next = ed.buffer.line(line + 1);
        let stripped = next.trim_start_matches([' ', '\t']);
        let space = !current.is_empty() && !current.ends_with([' ', '\t']) && !stripped.is_empty();
        let joined = format!("{current}{}{stripped}", if space { " " } else { "" });
        ed.buffer.remove_lines(line + 1, 1);
        ed.buffer.set_line(line, &joined);
        ed.move_to(Position::new(line, current.chars().count()));
    }
}

/// `p` (after) / `P` (before), `count` times.
fn paste(ed: &mut Editor, after: bool, count: usize) {
    if ed.register.is_empty() {
        ed.ring_bell();
        ed.set_error("Clipboard is empty. Nothing to paste.");
        return;
    }
    let pos = ed.position();
    match ed.register.kind() {
        RegisterKind::Line => {
            let block: Vec<String> = std::iter::repeat_n(ed.register.lines(), count)
                .flatten()
                .cloned()
                .collect();
            let at = if after { pos.line + 1 } else { pos.line };
            ed.buffer.insert_lines(at, &block);
            let line = if after { at + block.len() - 1 } else { at };
            ed.move_to(Position::new(line, 0));
        }
        RegisterKind::Char => {
            let text = ed.register.text().repeat(count);
            let at = if after && ed.buffer.line_len(pos.line) > 0 {
                Position::new(pos.line, pos.col + 1)
            } else {
                pos
            };
            let start = ed.buffer.char_idx(at);
            ed.buffer.insert(at, &text);
            let last = start + text.chars().count().saturating_sub(1);
            let to = ed.buffer.position_of(last);
            ed.move_to(to);
        }
    }
}

fn undo(ed: &mut Editor) {
    match ed.history.undo(&mut ed.buffer) {
        Some(pos) => {
            tracing::debug!(depth = ed.history.len(), "undo");
            ed.move_to(pos);
        }
        None => ed.set_status("Already at oldest change"),
    }
}

fn run_search(ed: &mut Editor, query: &str, dir: SearchDir, count: usize) {
    match search::find_nth(&ed.buffer, ed.position(), query, dir, count, ed.options.wrapscan) {
        Ok(found) => {
            ed.move_to(found.pos);
            if found.wrapped {
                ed.set_status(Match::wrap_message(dir));
            } else {
                ed.set_status(format!("{}{query}", dir.prompt()));
            }
        }
        Err(failure) => {
            ed.ring_bell();
            ed.set_error(failure.to_string());
        }
    }
}

// -- Visual helpers -----------------------------------------------------------

fn enter_visual(ed: &mut Editor, shape: VisualShape) {
    ed.selection.start(ed.position(), shape);
    ed.set_mode(Mode::Visual(shape));
}

fn exit_visual(ed: &mut Editor) {
    ed.selection.clear();
    ed.set_mode(Mode::Command);
}

/// Pressing the current shape's key leaves Visual mode; another shape's key
/// switches to it.
fn switch_shape(ed: &mut Editor, current: VisualShape, shape: VisualShape) {
    if current == shape {
        exit_visual(ed);
    } else {
        ed.selection.set_shape(shape);
        ed.set_mode(Mode::Visual(shape));
    }
}

/// The inclusive character span of a `v` selection as a half-open range.
fn character_range(buf: &Buffer, start: Position, end: Position) -> Range {
    let end_col = (end.col + 1).min(buf.line_len(end.line));
    Range::ordered(start, Position::new(end.line, end_col))
}

/// The column span `[left, right]` of one row, clipped to the line.
fn block_range(buf: &Buffer, line: usize, left: usize, right: usize) -> Range {
    let len = buf.line_len(line);
    Range::ordered(
        Position::new(line, left.min(len)),
        Position::new(line, (right + 1).min(len)),
    )
}

/// Copy the selection into the register. Returns where the cursor goes.
fn yank_selection(ed: &mut Editor) -> Position {
    let (Some((start, end)), Some(shape)) = (ed.selection.bounds(), ed.selection.shape()) else {
        return ed.position();
    };
    match shape {
        VisualShape::Character => {
            let text = ed.buffer.text(character_range(&ed.buffer, start, end));
            ed.register.store_text(&text);
            start
        }
        VisualShape::Line => {
            let lines = (start.line..=end.line).map(|l| ed.buffer.line(l)).collect();
            ed.register.store(lines, RegisterKind::Line);
            Position::new(start.line, 0)
        }
        VisualShape::Block => {
            let (left, right) = ed.selection.block_columns().unwrap_or_default();
            let rows = (start.line..=end.line)
                .map(|l| ed.buffer.text(block_range(&ed.buffer, l, left, right)))
                .collect();
            ed.register.store(rows, RegisterKind::Char);
            Position::new(start.line, left)
        }
    }
}

/// Cut the selection into the register. Returns where the cursor goes.
fn delete_selection(ed: &mut Editor) -> Position {
    let (Some((start, end)), Some(shape)) = (ed.selection.bounds(), ed.selection.shape()) else {
        return ed.position();
    };
    match shape {
        VisualShape::Character => {
            let text = ed.buffer.delete(character_range(&ed.buffer, start, end));
            ed.register.store_text(&text);
            start
        }
        VisualShape::Line => {
            let removed = ed.buffer.remove_lines(start.line, end.line - start.line + 1);
            ed.register.store(removed, RegisterKind::Line);
            Position::new(start.line.min(ed.buffer.last_line()), 0)
        }
        VisualShape::Block => {
            let (left, right) = ed.selection.block_columns().unwrap_or_default();
            let rows = (start.line..=end.line)
                .map(|l| ed.buffer.delete(block_range(&ed.buffer, l, left, right)))
                .collect();
            ed.register.store(rows, RegisterKind::Char);
            Position::new(start.line, left)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
