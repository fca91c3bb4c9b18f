//! Command module
//!
//! Front-end commands typed at the `codequest>` prompt.

use variantly::Variantly;

#[derive(Debug, Clone, PartialEq, Eq, Variantly)]
pub enum Command {
    Help,
    Instructions,
    Levels,
    Level(String),
    Show,
    Snapshot,
    Code,
    Edit,
    Load(String),
    Run,
    Reset,
    Next,
    Quit,
    Unknown(String),
}

/// Usage and description for each command, in the order `help` lists them.
pub const COMMAND_HELP: &[(&str, &str)] = &[
    ("help", "show this list and the current level's help"),
    ("instructions", "repeat the level instructions"),
    ("levels", "list all levels"),
    ("level <n|name>", "jump to a level"),
    ("code", "show the script that `run` will execute"),
    ("edit", "type a new script; finish with a line holding only ."),
    ("load <file>", "read the script from a file"),
    ("run", "run the script"),
    ("show", "describe the playfield"),
    ("snapshot", "print the playfield as JSON"),
    ("reset", "put the level back to its starting state"),
    ("next", "move on to the next level once this one is completed"),
    ("quit", "leave CodeQuest"),
];

/// Parses an input line into a `Command`.
pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();
    let (verb, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (trimmed, ""),
    };
    match (verb.to_lowercase().as_str(), rest) {
        ("help" | "?" | "h", _) => Command::Help,
        ("instructions" | "i", "") => Command::Instructions,
        ("levels", "") => Command::Levels,
        ("level" | "goto", name) if !name.is_empty() => Command::Level(name.to_string()),
        ("show" | "look", "") => Command::Show,
        ("snapshot", "") => Command::Snapshot,
        ("code" | "list", "") => Command::Code,
        ("edit", "") => Command::Edit,
        ("load", path) if !path.is_empty() => Command::Load(path.to_string()),
        ("run" | "r", "") => Command::Run,
        ("reset", "") => Command::Reset,
        ("next", "") => Command::Next,
        ("quit" | "exit" | "q", "") => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}
