//! codequest_script: statement recognizer for CodeQuest player scripts
//!
//! Scripts are a tiny, C-flavoured language:
//! - `name = 10;` assigns a variable
//! - `moveLeft();`, `setSpeed(name);`, `setSpeed(7);` call a level action
//! - `if (enemyNear) { ... }` runs a flat body when a named world condition holds
//! - `for (int i = 0; i < 3; i++) { ... }` repeats a flat body
//!
//! `//` starts a comment. Anything else is kept as an unrecognized statement
//! so the engine can report it without stopping the run.

mod parser;
pub use parser::{ShapeError, recognize, strip_comments};

/// Longest loop a script may ask for. Longer ranges are reported as malformed.
pub const MAX_LOOP_ITERATIONS: i64 = 100;

use std::fmt;

use codequest_data::Action;

/// Value passed to an action call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    Variable(String),
    Literal(i64),
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Variable(name) => f.write_str(name),
            Argument::Literal(value) => write!(f, "{value}"),
        }
    }
}

/// One recognized unit of a script.
///
/// Bodies of `Conditional` and `ForLoop` never contain another block; a nested
/// block is recognized as `Unrecognized` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Assignment {
        name: String,
        value: i64,
    },
    ActionCall {
        action: Action,
        argument: Option<Argument>,
    },
    Conditional {
        condition: String,
        body: Vec<Statement>,
    },
    /// Runs `body` for `var` in `start..end`.
    ForLoop {
        var: String,
        start: i64,
        end: i64,
        body: Vec<Statement>,
    },
    /// Text that matched no statement form.
    Unrecognized {
        text: String,
        line: usize,
        reason: String,
    },
    /// A well-formed `for` header whose bounds cannot be used.
    MalformedLoop {
        header: String,
        line: usize,
        reason: String,
    },
}

impl Statement {
    /// True if this is a call to `action`.
    pub fn calls(&self, action: Action) -> bool {
        matches!(self, Statement::ActionCall { action: called, .. } if *called == action)
    }

    pub fn is_action_call(&self) -> bool {
        matches!(self, Statement::ActionCall { .. })
    }

    pub fn is_problem(&self) -> bool {
        matches!(self, Statement::Unrecognized { .. } | Statement::MalformedLoop { .. })
    }

    /// Statements nested in a block, or an empty slice.
    pub fn body(&self) -> &[Statement] {
        match self {
            Statement::Conditional { body, .. } | Statement::ForLoop { body, .. } => body,
            _ => &[],
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Statement::Assignment { .. } => "assignment",
            Statement::ActionCall { .. } => "action",
            Statement::Conditional { .. } => "conditional",
            Statement::ForLoop { .. } => "loop",
            Statement::Unrecognized { .. } => "unrecognized",
            Statement::MalformedLoop { .. } => "malformed loop",
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Assignment { name, value } => write!(f, "{name} = {value};"),
            Statement::ActionCall { action, argument } => match argument {
                Some(arg) => write!(f, "{action}({arg});"),
                None => write!(f, "{action}();"),
            },
            Statement::Conditional { condition, body } => {
                write!(f, "if ({condition}) {{")?;
                write_body(f, body)
            },
            Statement::ForLoop { var, start, end, body } => {
                write!(f, "for (int {var} = {start}; {var} < {end}; {var}++) {{")?;
                write_body(f, body)
            },
            Statement::Unrecognized { text, .. } => f.write_str(text),
            Statement::MalformedLoop { header, .. } => write!(f, "{header} {{ ... }}"),
        }
    }
}

fn write_body(f: &mut fmt::Formatter<'_>, body: &[Statement]) -> fmt::Result {
    for statement in body {
        write!(f, " {statement}")?;
    }
    f.write_str(" }")
}

/// The ordered result of recognizing a script.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Script {
    pub statements: Vec<Statement>,
}

impl Script {
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn into_statements(self) -> Vec<Statement> {
        self.statements
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Unrecognized and malformed statements, including those inside block bodies.
    pub fn problems(&self) -> Vec<&Statement> {
        self.statements
            .iter()
            .flat_map(|statement| std::iter::once(statement).chain(statement.body()))
            .filter(|statement| statement.is_problem())
            .collect()
    }
}
