//! Editor options: the `:set` system.
//!
//! Parses `:set` arguments into [`SetDirective`]s and applies them to
//! [`Options`].
//!
//! # Supported syntax
//!
//! | Syntax           | Effect                        |
//! |------------------|-------------------------------|
//! | `:set option`    | Enable                        |
//! | `:set nooption`  | Disable                       |
//! | `:set option!`   | Toggle                        |
//! | `:set option?`   | Query current value           |
//! | `:set`           | Show changed options          |
//! | `:set all`       | Show all options              |
//!
//! # Option names
//!
//! | Full name  | Abbrev | Default |
//! |------------|--------|---------|
//! | `syntax`   | `sy`   | true    |
//! | `number`   | `nu`   | false   |
//! | `wrapscan` | `ws`   | true    |

use crate::error::CommandError;

/// A parsed `:set` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    /// `:set option`
    On(String),

    /// `:set nooption`
    Off(String),

    /// `:set option!`
    Toggle(String),

    /// `:set option?`
    Query(String),

    /// `:set option=value`, rejected since every option is boolean.
    Assign(String, String),

    /// `:set` with no arguments.
    ShowChanged,

    /// `:set all`
    ShowAll,
}

/// Which option a name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionName {
    Syntax,
    Number,
    Wrapscan,
}

impl OptionName {
    const ALL: [Self; 3] = [Self::Number, Self::Syntax, Self::Wrapscan];

    /// Resolve a full name or abbreviation.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "syntax" | "sy" => Some(Self::Syntax),
            "number" | "nu" => Some(Self::Number),
            "wrapscan" | "ws" => Some(Self::Wrapscan),
            _ => None,
        }
    }

    #[must_use]
    pub const fn full_name(self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::Number => "number",
            Self::Wrapscan => "wrapscan",
        }
    }
}

/// Parse the full `:set` arguments string into directives.
///
/// An empty argument string produces [`SetDirective::ShowChanged`].
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    let trimmed = args.trim();
    if trimmed.is_empty() {
        return vec![SetDirective::ShowChanged];
    }
    trimmed.split_whitespace().map(parse_set_arg).collect()
}

/// Parse a single `:set` argument into a directive.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if arg == "all" {
        return SetDirective::ShowAll;
    }

    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }

    if let Some(name) = arg.strip_suffix('?') {
        return SetDirective::Query(name.to_string());
    }

    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }

    // `nonumber` is Off, but a name that merely starts with "no" is not.
    if let Some(name) = arg.strip_prefix("no") {
        if OptionName::parse(name).is_some() {
            return SetDirective::Off(name.to_string());
        }
    }

    SetDirective::On(arg.to_string())
}

/// Format a boolean option for display: `name` or `noname`.
#[must_use]
pub fn format_bool(name: &str, value: bool) -> String {
    if value {
        name.to_string()
    } else {
        format!("no{name}")
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Runtime options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Token-classified colouring for C-family files.
    pub syntax: bool,
    /// Line-number gutter.
    pub number: bool,
    /// Searches wrap around the buffer ends.
    pub wrapscan: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            syntax: true,
            number: false,
            wrapscan: true,
        }
    }
}

impl Options {
    #[must_use]
    pub const fn get(&self, name: OptionName) -> bool {
        match name {
            OptionName::Syntax => self.syntax,
            OptionName::Number => self.number,
            OptionName::Wrapscan => self.wrapscan,
        }
    }

    pub const fn set(&mut self, name: OptionName, value: bool) {
        match name {
            OptionName::Syntax => self.syntax = value,
            OptionName::Number => self.number = value,
            OptionName::Wrapscan => self.wrapscan = value,
        }
    }

    /// Run the arguments of a `:set` command. Returns the text to show, if
    /// any.
    ///
    /// # Errors
    ///
    /// [`CommandError::UnknownOption`] for a name that is not an option,
    /// [`CommandError::InvalidArgument`] for `name=value`.
    pub fn apply(&mut self, args: &str) -> Result<Option<String>, CommandError> {
        let mut shown = Vec::new();
        for directive in parse_set(args) {
            match directive {
                SetDirective::On(name) => self.set(resolve(&name)?, true),
                SetDirective::Off(name) => self.set(resolve(&name)?, false),
                SetDirective::Toggle(name) => {
                    let opt = resolve(&name)?;
                    self.set(opt, !self.get(opt));
                }
                SetDirective::Query(name) => {
                    let opt = resolve(&name)?;
                    shown.push(format_bool(opt.full_name(), self.get(opt)));
                }
                SetDirective::Assign(name, value) => {
                    resolve(&name)?;
                    return Err(CommandError::InvalidArgument(format!("{name}={value}")));
                }
                SetDirective::ShowChanged => {
                    let defaults = Self::default();
                    shown.extend(
                        OptionName::ALL
                            .iter()
                            .filter(|&&o| self.get(o) != defaults.get(o))
                            .map(|&o| format_bool(o.full_name(), self.get(o))),
                    );
                }
                SetDirective::ShowAll => shown.extend(
                    OptionName::ALL
                        .iter()
                        .map(|&o| format_bool(o.full_name(), self.get(o))),
                ),
            }
        }
        Ok((!shown.is_empty()).then(|| shown.join("  ")))
    }
}

fn resolve(name: &str) -> Result<OptionName, CommandError> {
    OptionName::parse(name).ok_or_else(|| CommandError::UnknownOption(name.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
