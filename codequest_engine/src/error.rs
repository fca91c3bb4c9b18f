//! Non-fatal problems reported while running a script.
//!
//! The `Display` text of each variant is exactly the line written to the run
//! trace, so the player sees the same wording the engine logs.

use codequest_data::{Action, MAX_SPEED, MIN_SPEED};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ExecError {
    #[error("Unrecognized command: {text}")]
    UnrecognizedStatement { text: String, line: usize },
    #[error("Error: Variable '{0}' not defined")]
    UndefinedVariableReference(String),
    #[error("Error: Speed {0} is out of range ({min}-{max})", min = MIN_SPEED, max = MAX_SPEED)]
    OutOfRangeValue(i64),
    #[error("Error: Malformed loop bounds in `{header}`: {reason}. Loop skipped.")]
    MalformedLoopBounds { header: String, reason: String },
    #[error("Error: Unknown condition '{0}'")]
    UnknownCondition(String),
    #[error("Error: {0}() needs a value")]
    MissingArgument(Action),
}

/// Misuse of a level session or campaign by its driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a script is already running")]
    RunInProgress,
    #[error("the run was cancelled")]
    RunCancelled,
    #[error("level '{0}' is not completed yet")]
    LevelNotCompleted(String),
    #[error("no level matches '{0}'")]
    UnknownLevel(String),
    #[error("the level catalog is empty")]
    EmptyCatalog,
}
