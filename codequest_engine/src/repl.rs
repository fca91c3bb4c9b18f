//! REPL
//!
//! The interactive loop standing in for the game's presentation layer. It
//! keeps the player's script buffer, feeds wall-clock time to the enemy
//! schedule between commands, and paces runs for animation.

pub mod input;

use std::fs;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use codequest_data::{Catalog, LevelKind};
use log::{info, warn};

use crate::campaign::{Campaign, Progress};
use crate::command::{COMMAND_HELP, Command, parse_command};
use crate::error::SessionError;
use crate::events::LevelEvent;
use crate::session::{RESET_MESSAGE, RunStep};
use crate::view::{LevelLine, View, ViewItem};
use input::{InputEvent, InputManager};

/// Line that ends multi-line script entry.
const EDIT_TERMINATOR: &str = ".";

enum Flow {
    Continue,
    Quit,
}

struct Repl<'a> {
    campaign: &'a mut Campaign,
    input: InputManager,
    view: View,
    script: String,
    last_tick: Instant,
    events_tx: Sender<LevelEvent>,
    events_rx: Receiver<LevelEvent>,
}

/// Run the interactive loop until the player quits or input ends.
///
/// # Errors
/// Returns IO errors from the terminal.
pub fn run_repl(campaign: &mut Campaign) -> Result<()> {
    let (events_tx, events_rx) = mpsc::channel();
    let mut repl = Repl {
        script: campaign.session().starter_code().to_string(),
        campaign,
        input: InputManager::new(),
        view: View::new(),
        last_tick: Instant::now(),
        events_tx,
        events_rx,
    };
    repl.attach();
    repl.push_intro();
    repl.view.flush();

    loop {
        let prompt = format!("{}> ", repl.campaign.current_level().slug());
        let line = match repl.input.read_line(&prompt).context("reading command")? {
            InputEvent::Line(line) => line,
            InputEvent::Eof => break,
            InputEvent::Interrupted => {
                repl.view
                    .push(ViewItem::EngineMessage("Interrupted. Type `quit` to leave.".into()));
                repl.view.flush();
                continue;
            },
        };
        if line.trim().is_empty() {
            continue;
        }

        repl.tick_enemy();
        let flow = repl.dispatch(parse_command(&line))?;
        repl.drain_events();
        repl.view.flush();
        if let Flow::Quit = flow {
            break;
        }
    }
    info!("leaving the REPL");
    Ok(())
}

impl Repl<'_> {
    fn dispatch(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Help => {
                self.view.push(ViewItem::CommandHelp(COMMAND_HELP.to_vec()));
                self.view
                    .push(ViewItem::LevelHelp(self.campaign.session().help().to_string()));
            },
            Command::Instructions => self.view.push(ViewItem::Instructions(
                self.campaign.session().instructions().to_string(),
            )),
            Command::Levels => self.list_levels(),
            Command::Level(name) => self.select_level(&name),
            Command::Show => self.view.push(ViewItem::Snapshot(self.campaign.session().snapshot())),
            Command::Snapshot => {
                let json = serde_json::to_string_pretty(&self.campaign.session().snapshot())
                    .context("serializing world snapshot")?;
                self.view.push(ViewItem::Json(json));
            },
            Command::Code => self.view.push(ViewItem::Code(self.script.clone())),
            Command::Edit => self.edit_script()?,
            Command::Load(path) => self.load_script(&path),
            Command::Run => self.run_script(),
            Command::Reset => {
                self.script = self.campaign.session_mut().reset().to_string();
                self.view.push(ViewItem::EngineMessage(RESET_MESSAGE.to_string()));
                self.view.push(ViewItem::Code(self.script.clone()));
            },
            Command::Next => self.next_level(),
            Command::Quit => {
                self.view.push(ViewItem::EngineMessage("Thanks for playing CodeQuest!".into()));
                return Ok(Flow::Quit);
            },
            Command::Unknown(text) => self.view.push(ViewItem::Error(format!(
                "I don't know the command `{text}`. Type `help` for a list."
            ))),
        }
        Ok(Flow::Continue)
    }

    /// Subscribe the animation channel to the current session.
    fn attach(&mut self) {
        self.campaign.session_mut().subscribe(self.events_tx.clone());
    }

    fn push_intro(&mut self) {
        let grammar = self.campaign.session().grammar();
        self.view.push(ViewItem::LevelIntro {
            title: grammar.title(),
            instructions: grammar.instructions().to_string(),
        });
    }

    fn tick_enemy(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick);
        self.last_tick = now;
        self.campaign.session_mut().advance_clock(elapsed);
    }

    fn drain_events(&mut self) {
        for event in self.events_rx.try_iter() {
            if matches!(
                event,
                LevelEvent::Pacing { .. } | LevelEvent::RunStarted | LevelEvent::RunFinished { .. }
            ) {
                continue;
            }
            self.view.push(ViewItem::Animation(event.to_string()));
        }
    }

    fn list_levels(&mut self) {
        let current = self.campaign.current_level();
        let levels = self
            .campaign
            .catalog()
            .ordered()
            .into_iter()
            .map(|level| LevelLine {
                number: level.number,
                name: level.name.clone(),
                slug: level.kind.slug().to_string(),
                current: level.kind == current,
            })
            .collect();
        self.view.push(ViewItem::LevelList(levels));
    }

    fn select_level(&mut self, name: &str) {
        let Some(kind) = find_level(self.campaign.catalog(), name) else {
            self.view
                .push(ViewItem::Error(SessionError::UnknownLevel(name.to_string()).to_string()));
            return;
        };
        match self.campaign.select(kind) {
            Ok(()) => self.enter_level(),
            Err(err) => self.view.push(ViewItem::Error(err.to_string())),
        }
    }

    fn next_level(&mut self) {
        match self.campaign.advance() {
            Ok(Progress::Level(_)) => self.enter_level(),
            Ok(Progress::Finished) => self.view.push(ViewItem::LevelCompleted(
                "You finished every level of CodeQuest!".into(),
            )),
            Err(err) => self.view.push(ViewItem::Error(err.to_string())),
        }
    }

    fn enter_level(&mut self) {
        self.attach();
        self.script = self.campaign.session().starter_code().to_string();
        self.last_tick = Instant::now();
        self.push_intro();
    }

    fn edit_script(&mut self) -> Result<()> {
        println!("Enter your code. Finish with a line containing only `{EDIT_TERMINATOR}`.");
        let mut lines = Vec::new();
        loop {
            match self.input.read_line("... ").context("reading script")? {
                InputEvent::Line(line) if line.trim() == EDIT_TERMINATOR => break,
                InputEvent::Line(line) => lines.push(line),
                InputEvent::Eof => break,
                InputEvent::Interrupted => {
                    self.view
                        .push(ViewItem::EngineMessage("Edit cancelled; script unchanged.".into()));
                    return Ok(());
                },
            }
        }
        self.script = lines.join("\n");
        self.view.push(ViewItem::Code(self.script.clone()));
        Ok(())
    }

    fn load_script(&mut self, path: &str) {
        match fs::read_to_string(path) {
            Ok(text) => {
                info!("script loaded from '{path}'");
                self.script = text;
                self.view.push(ViewItem::Code(self.script.clone()));
            },
            Err(err) => {
                warn!("could not read script '{path}': {err}");
                self.view
                    .push(ViewItem::Error(format!("Could not read `{path}`: {err}")));
            },
        }
    }

    /// Run the script, sleeping at each pacing point and showing animation as it happens.
    fn run_script(&mut self) {
        let ticket = match self.campaign.session_mut().begin_run(&self.script) {
            Ok(ticket) => ticket,
            Err(err) => {
                self.view.push(ViewItem::Error(err.to_string()));
                return;
            },
        };
        loop {
            match self.campaign.session_mut().resume(ticket) {
                RunStep::Paused { delay, .. } => {
                    self.drain_events();
                    self.view.flush();
                    thread::sleep(delay);
                },
                RunStep::Finished(report) => {
                    self.drain_events();
                    self.view.push(ViewItem::RunTrace(report.log));
                    if report.newly_completed {
                        self.view.push(ViewItem::LevelCompleted(
                            "Type `next` to continue to the next level.".into(),
                        ));
                    }
                    break;
                },
                RunStep::Cancelled => {
                    self.view.push(ViewItem::Error(SessionError::RunCancelled.to_string()));
                    break;
                },
            }
        }
    }
}

/// Resolve a level by number, slug or name.
fn find_level(catalog: &Catalog, name: &str) -> Option<LevelKind> {
    let name = name.trim();
    if let Ok(number) = name.parse::<u32>() {
        return catalog.level_by_number(number).map(|level| level.kind);
    }
    LevelKind::from_slug(name)
        .filter(|kind| catalog.level(*kind).is_some())
        .or_else(|| {
            catalog
                .levels
                .iter()
                .find(|level| level.name.eq_ignore_ascii_case(name))
                .map(|level| level.kind)
        })
}
