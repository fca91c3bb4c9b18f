//! Terminal input handling for the CodeQuest REPL.
//!
//! Wraps rustyline configuration and completion of front-end commands and
//! script vocabulary, with a plain stdin fallback when no terminal is attached.

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use codequest_data::Action;
use lazy_static::lazy_static;
use log::{info, warn};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::command::COMMAND_HELP;
use crate::world::ENEMY_NEAR;

/// Outcome of reading a line from the REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Line(String),
    Eof,
    Interrupted,
}

lazy_static! {
    static ref COMMAND_TERMS: Vec<String> = build_command_terms();
}

type ReplEditor = rustyline::Editor<CodeQuestHelper, DefaultHistory>;

#[derive(Default)]
struct CodeQuestHelper;

impl Helper for CodeQuestHelper {}

impl Completer for CodeQuestHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        let (start, prefix) = current_word(line, pos);
        if prefix.is_empty() {
            return Ok((start, Vec::new()));
        }
        let pairs = COMMAND_TERMS
            .iter()
            .filter(|term| term.starts_with(prefix))
            .map(|term| Pair {
                display: term.clone(),
                replacement: term.clone(),
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for CodeQuestHelper {
    type Hint = String;
}

impl Highlighter for CodeQuestHelper {}

impl Validator for CodeQuestHelper {}

/// The word under the cursor and where it starts.
fn current_word(line: &str, pos: usize) -> (usize, &str) {
    let slice = &line[..pos];
    let start = slice
        .rfind(|c: char| c.is_whitespace() || "();{}".contains(c))
        .map_or(0, |idx| idx + 1);
    (start, &slice[start..])
}

fn build_command_terms() -> Vec<String> {
    let mut terms: Vec<String> = COMMAND_HELP
        .iter()
        .filter_map(|(usage, _)| usage.split_whitespace().next())
        .map(str::to_string)
        .collect();
    terms.extend(Action::ALL.iter().map(|action| action.name().to_string()));
    terms.extend(["if", "for", "int", ENEMY_NEAR].map(str::to_string));
    terms.sort_unstable();
    terms.dedup();
    terms
}

/// Reads lines from rustyline when stdin is a terminal, otherwise from plain stdin.
pub struct InputManager {
    backend: Backend,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        let backend = if io::stdin().is_terminal() {
            match RustylineInput::new() {
                Ok(editor) => {
                    info!("using rustyline-backed REPL input");
                    Backend::Rustyline(editor)
                },
                Err(err) => {
                    warn!("failed to initialize rustyline ({err}), falling back to basic stdin");
                    Backend::plain()
                },
            }
        } else {
            info!("stdin is not a TTY; using basic input mode");
            Backend::plain()
        };

        Self { backend }
    }

    /// Read a line. If rustyline fails, switch to plain stdin and retry once.
    ///
    /// # Errors
    /// Returns IO errors from the plain stdin backend.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        match self.backend.read_line(prompt) {
            Ok(event) => Ok(event),
            Err(err) if self.backend.is_rustyline() => {
                warn!("rustyline input failed: {err} -- switching to basic stdin");
                self.backend = Backend::plain();
                self.backend.read_line(prompt)
            },
            Err(err) => Err(err),
        }
    }
}

enum Backend {
    Rustyline(Box<RustylineInput>),
    Plain(StdinInput),
}

impl Backend {
    fn plain() -> Self {
        Backend::Plain(StdinInput::default())
    }

    fn is_rustyline(&self) -> bool {
        matches!(self, Backend::Rustyline(_))
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        match self {
            Backend::Rustyline(editor) => editor.read_line(prompt),
            Backend::Plain(stdin) => stdin.read_line(prompt),
        }
    }
}

struct RustylineInput {
    editor: ReplEditor,
    history_path: Option<PathBuf>,
}

impl RustylineInput {
    fn new() -> io::Result<Box<Self>> {
        let mut editor = rustyline::Editor::<CodeQuestHelper, _>::new().map_err(map_io_err)?;
        editor.set_helper(Some(CodeQuestHelper));
        let history_path = history_file_path();

        if let Some(path) = history_path.as_ref() {
            if let Some(dir) = path.parent()
                && let Err(err) = fs::create_dir_all(dir)
            {
                warn!("failed to create history directory {}: {err}", dir.display());
            }

            if let Err(err) = editor.load_history(path) {
                match err {
                    ReadlineError::Io(ref io_err) if io_err.kind() == io::ErrorKind::NotFound => {
                        info!("no prior history found at {}, starting fresh", path.display());
                    },
                    other => warn!("failed to load history from {}: {other}", path.display()),
                }
            }
        }

        Ok(Box::new(Self { editor, history_path }))
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(err) = self.editor.add_history_entry(line.as_str()) {
                        warn!("failed to append to history: {err}");
                    }
                    if let Some(path) = self.history_path.as_ref()
                        && let Err(err) = self.editor.save_history(path)
                    {
                        warn!("failed to persist history to {}: {err}", path.display());
                    }
                }
                Ok(InputEvent::Line(line))
            },
            Err(err) => convert_readline_error(err),
        }
    }
}

#[derive(Default)]
struct StdinInput {
    buffer: String,
}

impl StdinInput {
    fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        print!("{prompt}");
        io::stdout().flush()?;

        self.buffer.clear();
        let bytes = io::stdin().read_line(&mut self.buffer)?;
        if bytes == 0 {
            return Ok(InputEvent::Eof);
        }
        let line = self.buffer.trim_end_matches(['\n', '\r']);
        Ok(InputEvent::Line(line.to_string()))
    }
}

fn convert_readline_error(err: ReadlineError) -> io::Result<InputEvent> {
    match err {
        ReadlineError::Interrupted => Ok(InputEvent::Interrupted),
        ReadlineError::Eof => Ok(InputEvent::Eof),
        ReadlineError::Io(io_err) => Err(io_err),
        other => Err(io::Error::other(other)),
    }
}

fn map_io_err(err: ReadlineError) -> io::Error {
    match err {
        ReadlineError::Io(io_err) => io_err,
        other => io::Error::other(other),
    }
}

fn history_file_path() -> Option<PathBuf> {
    dirs::data_dir()
        .or_else(dirs::data_local_dir)
        .map(|base| build_history_path(&base))
}

fn build_history_path(base: &Path) -> PathBuf {
    base.join("codequest").join("history.txt")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_readline_ctrl_c_to_interrupt() {
        let result = convert_readline_error(ReadlineError::Interrupted).unwrap();
        assert_eq!(result, InputEvent::Interrupted);
    }

    #[test]
    fn history_path_appends_components() {
        let path = build_history_path(Path::new("/tmp/codequest-test"));
        assert!(path.ends_with(Path::new("codequest/history.txt")));
    }

    #[test]
    fn terms_cover_commands_and_actions() {
        assert!(COMMAND_TERMS.iter().any(|term| term == "run"));
        assert!(COMMAND_TERMS.iter().any(|term| term == "level"));
        assert!(COMMAND_TERMS.iter().any(|term| term == "moveLeft"));
        assert!(COMMAND_TERMS.iter().any(|term| term == "enemyNear"));
    }

    #[test]
    fn current_word_stops_at_script_punctuation() {
        assert_eq!(current_word("if (ene", 7), (4, "ene"));
        assert_eq!(current_word("sho", 3), (0, "sho"));
    }
}
