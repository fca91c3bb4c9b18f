//! Execution engine.
//!
//! Walks recognized statements in source order against the world and the
//! variable store, appending trace lines, issues and animation events to a
//! [`RunOutput`]. Execution is resumable: [`Execution::step`] returns at each
//! pacing point between loop iterations so the driver can wait, cancel, or
//! carry on without the engine ever blocking.

use std::time::Duration;

use codequest_data::Action;
use codequest_script::{Argument, MAX_LOOP_ITERATIONS, Statement};
use log::{debug, warn};

use crate::completion::Techniques;
use crate::error::ExecError;
use crate::events::LevelEvent;
use crate::grammar::LevelGrammar;
use crate::variables::VariableStore;
use crate::world::WorldState;

/// Everything a run has produced so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOutput {
    pub trace: Vec<String>,
    pub issues: Vec<ExecError>,
    pub events: Vec<LevelEvent>,
}

impl RunOutput {
    pub fn log(&mut self, line: impl Into<String>) {
        let line = line.into();
        debug!("trace: {line}");
        self.trace.push(line);
    }

    /// Record a non-fatal error; its message also goes to the trace.
    pub fn report(&mut self, err: ExecError) {
        warn!("script error: {err}");
        self.trace.push(err.to_string());
        self.issues.push(err);
    }

    pub fn emit(&mut self, event: LevelEvent) {
        self.events.push(event);
    }
}

/// State a statement may read or change, plus where its output goes.
pub struct ExecContext<'a> {
    pub world: &'a mut WorldState,
    pub variables: &'a mut VariableStore,
    pub techniques: &'a mut Techniques,
    pub grammar: &'a LevelGrammar,
    pub output: &'a mut RunOutput,
}

/// Outcome of advancing an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A loop iteration finished and more remain; resume after the delay.
    Pace(Duration),
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LoopCursor {
    statement: usize,
    next: i64,
    end: i64,
}

/// A script part-way through execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    statements: Vec<Statement>,
    pc: usize,
    active_loop: Option<LoopCursor>,
}

impl Execution {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self {
            statements,
            pc: 0,
            active_loop: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.active_loop.is_none() && self.pc >= self.statements.len()
    }

    /// Execute until the next pacing point or the end of the script.
    pub fn step(&mut self, ctx: &mut ExecContext<'_>, pacing: Duration) -> Step {
        loop {
            if let Some(cursor) = self.active_loop {
                let iteration = cursor.next;
                let more = iteration + 1 < cursor.end;
                if more {
                    self.active_loop = Some(LoopCursor {
                        next: iteration + 1,
                        ..cursor
                    });
                } else {
                    self.active_loop = None;
                    self.pc = cursor.statement + 1;
                }
                if let Some(Statement::ForLoop { var, body, .. }) = self.statements.get(cursor.statement) {
                    run_iteration(ctx, var, iteration, body);
                }
                if more {
                    ctx.output.emit(LevelEvent::Pacing {
                        iteration,
                        delay: pacing,
                    });
                    return Step::Pace(pacing);
                }
                continue;
            }

            let Some(statement) = self.statements.get(self.pc) else {
                return Step::Finished;
            };
            if let Statement::ForLoop { var, start, end, body } = statement {
                if enter_loop(ctx, var, *start, *end, body) {
                    self.active_loop = Some(LoopCursor {
                        statement: self.pc,
                        next: *start,
                        end: *end,
                    });
                } else {
                    self.pc += 1;
                }
                continue;
            }
            execute(ctx, statement);
            self.pc += 1;
        }
    }

    /// Run to the end, skipping every pacing delay.
    pub fn run_to_end(&mut self, ctx: &mut ExecContext<'_>) {
        while let Step::Pace(_) = self.step(ctx, Duration::ZERO) {}
    }
}

/// Log the loop header and record loop techniques. Returns false when there is nothing to iterate.
fn enter_loop(ctx: &mut ExecContext<'_>, var: &str, start: i64, end: i64, body: &[Statement]) -> bool {
    if end.saturating_sub(start) > MAX_LOOP_ITERATIONS {
        ctx.output.report(ExecError::MalformedLoopBounds {
            header: format!("for (int {var} = {start}; {var} < {end}; {var}++)"),
            reason: format!("loops are limited to {MAX_LOOP_ITERATIONS} iterations"),
        });
        return false;
    }
    if start >= end {
        ctx.output
            .log(format!("For loop with {var} from {start} to {end} runs zero times"));
        return false;
    }
    ctx.output
        .log(format!("Executing for loop with {var} from {start} to {}", end - 1));
    if body.iter().any(Statement::is_action_call) {
        ctx.techniques.used_loop = true;
    }
    ctx.techniques.looped_actions.extend(body.iter().filter_map(|statement| match statement {
        Statement::ActionCall { action, .. } => Some(*action),
        _ => None,
    }));
    true
}

fn run_iteration(ctx: &mut ExecContext<'_>, var: &str, iteration: i64, body: &[Statement]) {
    ctx.output.log(format!("Loop iteration: {var} = {iteration}"));
    for statement in body {
        execute(ctx, statement);
    }
}

/// Execute one statement to completion.
pub fn execute(ctx: &mut ExecContext<'_>, statement: &Statement) {
    match statement {
        Statement::Assignment { name, value } => assign(ctx, name, *value),
        Statement::ActionCall { action, argument } => perform(ctx, *action, argument.as_ref()),
        Statement::Conditional { condition, body } => conditional(ctx, condition, body),
        Statement::ForLoop { var, start, end, body } => {
            // Loops inside bodies run without pacing.
            if enter_loop(ctx, var, *start, *end, body) {
                for iteration in *start..*end {
                    run_iteration(ctx, var, iteration, body);
                }
            }
        },
        Statement::Unrecognized { text, line, reason } => {
            debug!("line {line} unrecognized: {reason}");
            ctx.output.report(ExecError::UnrecognizedStatement {
                text: text.clone(),
                line: *line,
            });
        },
        Statement::MalformedLoop { header, reason, .. } => {
            ctx.output.report(ExecError::MalformedLoopBounds {
                header: header.clone(),
                reason: reason.clone(),
            });
        },
    }
}

fn assign(ctx: &mut ExecContext<'_>, name: &str, value: i64) {
    let verb = match ctx.variables.set(name, value) {
        Some(_) => "updated",
        None => "created",
    };
    ctx.output.log(format!("Variable {verb}: {name} = {value}"));
    ctx.output.emit(LevelEvent::VariableSet {
        name: name.to_string(),
        value,
    });
}

fn perform(ctx: &mut ExecContext<'_>, action: Action, argument: Option<&Argument>) {
    let performed = match action {
        Action::MoveLeft | Action::MoveRight | Action::MoveBack => {
            ctx.output.log(format!("Executing: {action}()"));
            let movement = match action {
                Action::MoveLeft => ctx.world.move_left(),
                Action::MoveRight => ctx.world.move_right(),
                _ => ctx.world.move_back(),
            };
            ctx.output.emit(LevelEvent::Moved {
                action,
                from: movement.from,
                to: movement.to,
            });
            true
        },
        Action::Jump => {
            ctx.output.log(format!("Executing: {action}()"));
            let (x, y) = ctx.world.position();
            ctx.output.emit(LevelEvent::Jumped { x, y });
            true
        },
        Action::Shoot => {
            ctx.output.log(format!("Executing: {action}()"));
            let (x, y) = ctx.world.position();
            let target = ctx.world.shoot();
            match target {
                Some(idx) => ctx.output.log(format!(
                    "Target {} hit! ({}/{})",
                    idx + 1,
                    ctx.world.targets_hit(),
                    ctx.world.targets().len()
                )),
                None => ctx.output.log("Shot missed: no targets left"),
            }
            ctx.output.emit(LevelEvent::Shot { x, y, target });
            true
        },
        Action::SetSpeed => set_speed(ctx, argument),
    };
    if performed {
        ctx.techniques.invoked.insert(action);
    }
}

fn set_speed(ctx: &mut ExecContext<'_>, argument: Option<&Argument>) -> bool {
    let (value, variable) = match argument {
        None => {
            ctx.output.report(ExecError::MissingArgument(Action::SetSpeed));
            return false;
        },
        Some(Argument::Literal(value)) => (*value, None),
        Some(Argument::Variable(name)) => match ctx.variables.get(name) {
            Some(value) => (value, Some(name.as_str())),
            None => {
                ctx.output
                    .report(ExecError::UndefinedVariableReference(name.clone()));
                return false;
            },
        },
    };

    if let Err(err) = ctx.world.set_speed(value) {
        ctx.output.report(err);
        return false;
    }
    match variable {
        Some(name) => {
            ctx.output
                .log(format!("Set speed to {value} using variable {name}"));
            ctx.techniques.speed_from_variable = true;
        },
        None => ctx.output.log(format!("Set speed to {value}")),
    }
    ctx.output.emit(LevelEvent::SpeedChanged { speed: value });
    true
}

fn conditional(ctx: &mut ExecContext<'_>, condition: &str, body: &[Statement]) {
    // Read once; the body runs against this value even if the flag changes meanwhile.
    let Some(value) = ctx.world.condition(condition) else {
        ctx.output
            .report(ExecError::UnknownCondition(condition.to_string()));
        ctx.output.log("Condition is false, skipping if block");
        return;
    };
    ctx.output
        .log(format!("Checking condition: {condition} is {value}"));
    if !value {
        ctx.output.log("Condition is false, skipping if block");
        return;
    }

    ctx.output.log("Condition is true, executing if block");
    ctx.techniques.conditional_taken = true;
    if let Some(retreat) = ctx.grammar.retreat_action()
        && body.iter().any(|statement| statement.calls(retreat))
    {
        ctx.techniques.retreat_handled = true;
    }
    for statement in body {
        execute(ctx, statement);
    }
}
