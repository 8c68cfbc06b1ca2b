//! Ex commands: the `:` prompt.
//!
//! The line typed after `:` is trimmed, split into a command word and an
//! argument, parsed into an [`ExCommand`] and run against the editor.
//!
//! # Supported commands
//!
//! | Command      | Action                                              |
//! |--------------|-----------------------------------------------------|
//! | `:w [file]`  | Save to `file`, or to the current file name         |
//! | `:q`         | Quit, refused when there are unsaved changes        |
//! | `:q!`        | Quit, discarding changes                            |
//! | `:wq [file]` | Save, then quit if the save worked                  |
//! | `:0`         | Go to the first line                                |
//! | `:$`         | Go to the last line                                 |
//! | `:N`         | Go to line `N` (clamped)                            |
//! | `:r file`    | Insert the lines of `file` below the cursor         |
//! | `:set ...`   | Options, see [`options`](crate::options)            |

use std::path::PathBuf;

use crate::editor::Editor;
use crate::error::{CommandError, FileError};
use crate::position::Position;

/// A parsed ex command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExCommand {
    /// `:w [file]`
    Write(Option<PathBuf>),
    /// `:q`
    Quit,
    /// `:q!`
    ForceQuit,
    /// `:wq [file]`
    WriteQuit(Option<PathBuf>),
    /// `:0`
    First,
    /// `:$`
    Last,
    /// `:N`, 1-indexed as typed.
    Goto(usize),
    /// `:r file`
    Read(PathBuf),
    /// `:set args`
    Set(String),
}

impl ExCommand {
    /// Parse the text typed after `:`.
    ///
    /// # Errors
    ///
    /// [`CommandError::Empty`] for blank input, [`CommandError::ReadUsage`]
    /// for `:r` without a file, [`CommandError::Unknown`] otherwise.
    pub fn parse(input: &str) -> Result<Self, CommandError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(CommandError::Empty);
        }
        let (word, rest) = trimmed
            .split_once(char::is_whitespace)
            .map_or((trimmed, ""), |(w, r)| (w, r.trim()));
        let file = rest.split_whitespace().next().map(PathBuf::from);

        let cmd = match word {
            "w" => Self::Write(file),
            "q" => Self::Quit,
            "q!" => Self::ForceQuit,
            "wq" => Self::WriteQuit(file),
            "0" => Self::First,
            "$" => Self::Last,
            "r" => Self::Read(file.ok_or(CommandError::ReadUsage)?),
            "set" | "se" => Self::Set(rest.to_string()),
            n if n.bytes().all(|b| b.is_ascii_digit()) => {
                Self::Goto(n.parse().unwrap_or(usize::MAX))
            }
            _ => return Err(CommandError::Unknown(trimmed.to_string())),
        };
        Ok(cmd)
    }

    /// Run the command.
    ///
    /// # Errors
    ///
    /// Any [`CommandError`]; the editor is left as it was before the
    /// failing step.
    pub fn execute(self, ed: &mut Editor) -> Result<(), CommandError> {
        match self {
            Self::Write(file) => {
                let path = file
                    .or_else(|| ed.filename().map(PathBuf::from))
                    .ok_or(CommandError::NoFileName)?;
                write(ed, path)?;
            }
            Self::Quit => {
                if ed.is_modified() {
                    return Err(CommandError::Unsaved);
                }
                ed.quit();
            }
            Self::ForceQuit => ed.quit(),
            Self::WriteQuit(file) => {
                let path = file
                    .or_else(|| ed.filename().map(PathBuf::from))
                    .ok_or(CommandError::NoFileNameOnQuit)?;
                write(ed, path)?;
                ed.quit();
            }
            Self::First => {
                ed.move_to(Position::ZERO);
                ed.set_status("Moved to the beginning of the file.");
            }
            Self::Last => {
                ed.move_to(Position::new(ed.buffer.last_line(), 0));
                ed.set_status("Moved to the end of the file.");
            }
            Self::Goto(n) => {
                let line = n.min(ed.buffer.line_count()).saturating_sub(1);
                ed.move_to(Position::new(line, 0));
            }
            Self::Read(path) => {
                let lines = ed.load(&path)?;
                if lines.is_empty() {
                    return Err(FileError::Empty { path }.into());
                }
                ed.insert_lines_below(&lines);
                ed.set_status(format!("Inserted content from '{}'.", path.display()));
            }
            Self::Set(args) => {
                if let Some(shown) = ed.options.apply(&args)? {
                    ed.set_status(shown);
                }
            }
        }
        Ok(())
    }
}

fn write(ed: &mut Editor, path: PathBuf) -> Result<(), CommandError> {
    ed.save(&path)?;
    ed.set_status(format!("File saved: {}", path.display()));
    ed.set_filename(path);
    Ok(())
}

/// Parse and run `input`, reporting the outcome on the status line.
pub fn run(ed: &mut Editor, input: &str) {
    let result = ExCommand::parse(input).and_then(|cmd| cmd.execute(ed));
    if let Err(err) = result {
        tracing::warn!(input, %err, "ex command failed");
        ed.set_error(err.to_string());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
