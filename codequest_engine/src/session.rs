//! Level state machine.
//!
//! A `LevelSession` owns everything about one attempt at a level: the world,
//! the variable store, the technique flags and the enemy schedule. It accepts
//! run requests, drives the execution engine through its pacing points, checks
//! completion after each full pass, and handles reset.
//!
//! ```text
//! Idle --begin_run--> Running --finished, predicate false--> Idle
//!                        |
//!                        +----finished, predicate true----> Completed
//! any state --reset--> Idle
//! ```
//!
//! `Completed` is sticky: later runs are allowed but never un-complete the level.

use std::fmt;
use std::time::Duration;

use codequest_data::{Catalog, LevelKind};
use log::{debug, info};
use serde::Serialize;
use variantly::Variantly;

use crate::completion::Techniques;
use crate::error::{ExecError, SessionError};
use crate::events::{EventSink, LevelEvent};
use crate::exec::{ExecContext, Execution, RunOutput, Step};
use crate::grammar::LevelGrammar;
use crate::schedule::EnemySchedule;
use crate::settings::EngineSettings;
use crate::variables::VariableStore;
use crate::world::{WorldSnapshot, WorldState};

pub const RUN_HEADER: &str = "--- Running your code ---";
pub const COMPLETED_MESSAGE: &str = "Congratulations! Level completed!";
pub const RESET_MESSAGE: &str = "Level reset. Let's try again!";
pub const OBSTACLE_MESSAGE: &str = "Ouch! You hit an obstacle.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Variantly)]
pub enum LevelStatus {
    Idle,
    Running,
    Completed,
}

/// Identifies one run. Tickets from cancelled or reset runs are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunTicket(u64);

/// Result of resuming a run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunStep {
    /// Between loop iterations; call `resume` again after `delay`.
    Paused { ticket: RunTicket, delay: Duration },
    Finished(RunReport),
    /// The ticket no longer names the active run.
    Cancelled,
}

/// What a completed pass produced, for the presentation side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Trace lines in order, starting with the run header.
    pub log: Vec<String>,
    /// Completion state after this run.
    pub completed: bool,
    /// True only for the run that first completed the level.
    pub newly_completed: bool,
    pub issues: Vec<ExecError>,
    pub events: Vec<LevelEvent>,
    pub techniques: Techniques,
    pub snapshot: WorldSnapshot,
}

struct ActiveRun {
    ticket: RunTicket,
    execution: Execution,
    output: RunOutput,
    published: usize,
}

pub struct LevelSession {
    grammar: LevelGrammar,
    settings: EngineSettings,
    world: WorldState,
    variables: VariableStore,
    techniques: Techniques,
    completed: bool,
    schedule: Option<EnemySchedule>,
    active: Option<ActiveRun>,
    next_ticket: u64,
    sinks: Vec<Box<dyn EventSink>>,
}

impl fmt::Debug for LevelSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LevelSession")
            .field("level", &self.grammar.kind())
            .field("status", &self.status())
            .field("world", &self.world)
            .field("variables", &self.variables)
            .field("techniques", &self.techniques)
            .field("sinks", &self.sinks.len())
            .finish_non_exhaustive()
    }
}

impl LevelSession {
    pub fn new(grammar: LevelGrammar, settings: EngineSettings) -> Self {
        info!("entering {}", grammar.title());
        let world = grammar.initial_world();
        let schedule = grammar.has_enemy().then(|| settings.enemy.schedule());
        Self {
            grammar,
            settings,
            world,
            variables: VariableStore::new(),
            techniques: Techniques::default(),
            completed: false,
            schedule,
            active: None,
            next_ticket: 1,
            sinks: Vec::new(),
        }
    }

    /// Session for `kind` from `catalog`.
    ///
    /// # Errors
    /// [`SessionError::UnknownLevel`] if the catalog has no such level.
    pub fn from_catalog(catalog: &Catalog, kind: LevelKind, settings: EngineSettings) -> Result<Self, SessionError> {
        let grammar = LevelGrammar::from_catalog(catalog, kind)
            .ok_or_else(|| SessionError::UnknownLevel(kind.slug().to_string()))?;
        Ok(Self::new(grammar, settings))
    }

    pub fn grammar(&self) -> &LevelGrammar {
        &self.grammar
    }

    pub fn kind(&self) -> LevelKind {
        self.grammar.kind()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn variables(&self) -> &VariableStore {
        &self.variables
    }

    pub fn techniques(&self) -> &Techniques {
        &self.techniques
    }

    pub fn schedule(&self) -> Option<&EnemySchedule> {
        self.schedule.as_ref()
    }

    pub fn status(&self) -> LevelStatus {
        if self.active.is_some() {
            LevelStatus::Running
        } else if self.completed {
            LevelStatus::Completed
        } else {
            LevelStatus::Idle
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        self.world.snapshot()
    }

    pub fn help(&self) -> &str {
        self.grammar.help()
    }

    pub fn instructions(&self) -> &str {
        self.grammar.instructions()
    }

    pub fn starter_code(&self) -> &str {
        self.grammar.starter_code()
    }

    /// Deliver future events to `sink`.
    pub fn subscribe(&mut self, sink: impl EventSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    /// Recognize `source` and start running it.
    ///
    /// # Errors
    /// [`SessionError::RunInProgress`] if another run has not finished.
    pub fn begin_run(&mut self, source: &str) -> Result<RunTicket, SessionError> {
        if self.active.is_some() {
            return Err(SessionError::RunInProgress);
        }
        let script = self.grammar.recognize(source);
        let ticket = RunTicket(self.next_ticket);
        self.next_ticket += 1;
        info!(
            "{}: run {} started with {} statements",
            self.grammar.kind(),
            ticket.0,
            script.statements().len()
        );

        let mut output = RunOutput::default();
        output.log(RUN_HEADER);
        output.emit(LevelEvent::RunStarted);
        publish(&mut self.sinks, &output.events);
        self.active = Some(ActiveRun {
            ticket,
            execution: Execution::new(script.into_statements()),
            published: output.events.len(),
            output,
        });
        Ok(ticket)
    }

    /// Advance the run named by `ticket` to its next pacing point or its end.
    pub fn resume(&mut self, ticket: RunTicket) -> RunStep {
        let Some(run) = self.active.as_mut().filter(|run| run.ticket == ticket) else {
            debug!("resume with stale ticket {}", ticket.0);
            return RunStep::Cancelled;
        };

        let mut ctx = ExecContext {
            world: &mut self.world,
            variables: &mut self.variables,
            techniques: &mut self.techniques,
            grammar: &self.grammar,
            output: &mut run.output,
        };
        let step = run.execution.step(&mut ctx, self.settings.pacing());
        publish(&mut self.sinks, &run.output.events[run.published..]);
        run.published = run.output.events.len();

        match step {
            Step::Pace(delay) => RunStep::Paused { ticket, delay },
            Step::Finished => match self.active.take() {
                Some(run) => RunStep::Finished(self.finish(run)),
                None => RunStep::Cancelled,
            },
        }
    }

    /// Run `source` to completion without waiting at pacing points.
    ///
    /// # Errors
    /// [`SessionError::RunInProgress`] if another run has not finished.
    pub fn run(&mut self, source: &str) -> Result<RunReport, SessionError> {
        let ticket = self.begin_run(source)?;
        loop {
            match self.resume(ticket) {
                RunStep::Paused { .. } => {},
                RunStep::Finished(report) => return Ok(report),
                RunStep::Cancelled => return Err(SessionError::RunCancelled),
            }
        }
    }

    /// Abandon the active run, keeping whatever it already changed. Returns false if nothing was running.
    pub fn cancel(&mut self) -> bool {
        match self.active.take() {
            Some(run) => {
                info!("run {} cancelled", run.ticket.0);
                true
            },
            None => false,
        }
    }

    /// Return the level to its initial state and hand back the fresh starter script.
    pub fn reset(&mut self) -> &str {
        self.cancel();
        self.world = self.grammar.initial_world();
        self.variables.clear();
        self.techniques.clear();
        self.completed = false;
        if let Some(schedule) = self.schedule.as_mut() {
            schedule.stop();
            schedule.restart();
        }
        publish(&mut self.sinks, &[LevelEvent::Reset]);
        info!("{}: {RESET_MESSAGE}", self.grammar.kind());
        self.grammar.starter_code()
    }

    /// Let wall-clock time pass for the enemy. Returns the enemy moves it caused.
    pub fn advance_clock(&mut self, elapsed: Duration) -> Vec<LevelEvent> {
        let Some(schedule) = self.schedule.as_mut() else {
            return Vec::new();
        };
        let events: Vec<_> = schedule
            .advance(elapsed)
            .into_iter()
            .filter(|proximity| self.world.set_enemy_near(proximity.is_near()))
            .map(|proximity| LevelEvent::EnemyMoved {
                near: proximity.is_near(),
            })
            .collect();
        publish(&mut self.sinks, &events);
        events
    }

    fn finish(&mut self, run: ActiveRun) -> RunReport {
        let ActiveRun {
            ticket,
            mut output,
            published,
            ..
        } = run;

        if self.grammar.has_obstacles()
            && let Some(index) = self.world.obstacle_collision()
        {
            self.world.move_back();
            output.log(OBSTACLE_MESSAGE);
            output.emit(LevelEvent::ObstacleHit { index });
        }

        let newly_completed = !self.completed && self.grammar.is_complete(&self.world, &self.techniques);
        if newly_completed {
            self.completed = true;
            output.log(COMPLETED_MESSAGE);
            output.emit(LevelEvent::Completed);
            if let Some(schedule) = self.schedule.as_mut() {
                schedule.stop();
            }
            info!("{} completed", self.grammar.title());
        }
        output.emit(LevelEvent::RunFinished {
            completed: self.completed,
        });
        publish(&mut self.sinks, &output.events[published..]);
        info!(
            "run {} finished: {} trace lines, {} issues",
            ticket.0,
            output.trace.len(),
            output.issues.len()
        );

        RunReport {
            log: output.trace,
            completed: self.completed,
            newly_completed,
            issues: output.issues,
            events: output.events,
            techniques: self.techniques.clone(),
            snapshot: self.world.snapshot(),
        }
    }
}

fn publish(sinks: &mut [Box<dyn EventSink>], events: &[LevelEvent]) {
    for event in events {
        for sink in sinks.iter_mut() {
            sink.notify(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::builtin_catalog;
    use std::sync::mpsc;

    fn session(kind: LevelKind) -> LevelSession {
        let catalog = builtin_catalog().expect("builtin catalog");
        LevelSession::from_catalog(&catalog, kind, EngineSettings::default().without_pacing()).expect("session")
    }

    #[test]
    fn new_session_is_idle() {
        let session = session(LevelKind::Commands);
        assert!(session.status().is_idle());
        assert_eq!(session.world().position(), (150.0, 200.0));
    }

    #[test]
    fn second_run_while_running_is_rejected() {
        let mut session = session(LevelKind::Loops);
        let _ticket = session
            .begin_run("for (int i = 0; i < 3; i++) { shoot(); }")
            .expect("first run");
        assert!(session.status().is_running());
        assert_eq!(session.begin_run("shoot();"), Err(SessionError::RunInProgress));
    }

    #[test]
    fn reset_invalidates_outstanding_ticket() {
        let mut session = session(LevelKind::Loops);
        let ticket = session
            .begin_run("for (int i = 0; i < 3; i++) { shoot(); }")
            .expect("run");
        assert!(matches!(session.resume(ticket), RunStep::Paused { .. }));
        assert_eq!(session.world().targets_hit(), 1);
        session.reset();
        assert_eq!(session.resume(ticket), RunStep::Cancelled);
        assert_eq!(session.world().targets_hit(), 0);
        assert!(session.status().is_idle());
    }

    #[test]
    fn reset_hands_back_starter_code() {
        let mut session = session(LevelKind::Commands);
        session.run("moveLeft();").expect("run");
        let starter = session.starter_code().to_string();
        assert_eq!(session.reset(), starter);
        assert!(starter.contains("moveLeft() and jump()"));
    }

    #[test]
    fn cancel_keeps_partial_progress() {
        let mut session = session(LevelKind::Loops);
        let ticket = session
            .begin_run("for (int i = 0; i < 3; i++) { shoot(); }")
            .expect("run");
        session.resume(ticket);
        assert!(session.cancel());
        assert!(!session.cancel());
        assert_eq!(session.world().targets_hit(), 1);
        assert_eq!(session.resume(ticket), RunStep::Cancelled);
    }

    #[test]
    fn run_log_starts_with_header() {
        let mut session = session(LevelKind::Commands);
        let report = session.run("jump();").expect("run");
        assert_eq!(report.log[0], RUN_HEADER);
        assert!(!report.completed);
        assert!(session.status().is_idle());
    }

    #[test]
    fn completion_is_logged_once_and_sticks() {
        let mut session = session(LevelKind::Commands);
        let report = session.run("moveLeft();\njump();").expect("run");
        assert!(report.newly_completed);
        assert_eq!(report.log.last().map(String::as_str), Some(COMPLETED_MESSAGE));

        let again = session.run("jump();").expect("second run");
        assert!(again.completed);
        assert!(!again.newly_completed);
        assert!(!again.log.iter().any(|line| line == COMPLETED_MESSAGE));
        assert!(session.status().is_completed());
    }

    #[test]
    fn subscribers_receive_events_in_order() {
        let mut session = session(LevelKind::Commands);
        let (tx, rx) = mpsc::channel();
        session.subscribe(tx);
        session.run("moveLeft();").expect("run");
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.first(), Some(&LevelEvent::RunStarted));
        assert!(matches!(events.get(1), Some(LevelEvent::Moved { .. })));
        assert_eq!(events.last(), Some(&LevelEvent::RunFinished { completed: false }));
    }

    #[test]
    fn enemy_follows_the_clock() {
        let mut session = session(LevelKind::Conditionals);
        assert!(session.advance_clock(Duration::from_millis(2000)).is_empty());
        assert_eq!(
            session.advance_clock(Duration::from_millis(2000)),
            vec![LevelEvent::EnemyMoved { near: true }]
        );
        assert!(session.world().enemy_near());
    }

    #[test]
    fn levels_without_enemy_ignore_the_clock() {
        let mut session = session(LevelKind::Commands);
        assert!(session.schedule().is_none());
        assert!(session.advance_clock(Duration::from_secs(10)).is_empty());
    }
}
