//! View module.
//!
//! Handlers never print directly. They push `ViewItem`s, and the REPL flushes
//! the collected items once per command, grouped into sections.

use colored::Colorize;
use textwrap::{Options, fill, termwidth};
use variantly::Variantly;

use crate::style::GameStyle;
use crate::world::WorldSnapshot;

const ICON_SUCCESS: &str = "\u{2611}";
const ICON_ERROR: &str = "⚠︎";
const ICON_ENGINE: &str = "⚙";

/// One row of the `levels` listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelLine {
    pub number: u32,
    pub name: String,
    pub slug: String,
    pub current: bool,
}

/// Everything that may be shown to the player.
#[derive(Debug, Clone, PartialEq, Variantly)]
pub enum ViewItem {
    LevelIntro { title: String, instructions: String },
    Instructions(String),
    LevelHelp(String),
    CommandHelp(Vec<(&'static str, &'static str)>),
    LevelList(Vec<LevelLine>),
    Code(String),
    RunTrace(Vec<String>),
    Snapshot(WorldSnapshot),
    Json(String),
    Animation(String),
    LevelCompleted(String),
    EngineMessage(String),
    Error(String),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Section {
    Level,
    Results,
    System,
}

impl ViewItem {
    pub fn section(&self) -> Section {
        match self {
            ViewItem::LevelIntro { .. }
            | ViewItem::Instructions(_)
            | ViewItem::LevelHelp(_)
            | ViewItem::Code(_)
            | ViewItem::Snapshot(_) => Section::Level,
            ViewItem::RunTrace(_) | ViewItem::Animation(_) | ViewItem::LevelCompleted(_) | ViewItem::Error(_) => {
                Section::Results
            },
            ViewItem::CommandHelp(_) | ViewItem::LevelList(_) | ViewItem::Json(_) | ViewItem::EngineMessage(_) => {
                Section::System
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct View {
    pub width: usize,
    pub items: Vec<ViewItem>,
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}

impl View {
    pub fn new() -> Self {
        Self {
            width: termwidth(),
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: ViewItem) {
        self.items.push(item);
    }

    /// Clear the buffer without printing.
    pub fn reset(&mut self) {
        self.items.clear();
    }

    /// Print everything collected since the last flush, section by section.
    pub fn flush(&mut self) {
        self.width = termwidth();
        for (section, label) in [
            (Section::Level, "level"),
            (Section::Results, "results"),
            (Section::System, "codequest"),
        ] {
            let items: Vec<&ViewItem> = self.items.iter().filter(|item| item.section() == section).collect();
            if items.is_empty() {
                continue;
            }
            println!("{:.>width$}\n", label.section_style(), width = self.width);
            for item in items {
                self.render(item);
            }
            println!();
        }
        self.items.clear();
    }

    fn render(&self, item: &ViewItem) {
        match item {
            ViewItem::LevelIntro { title, instructions } => {
                println!("{:^width$}\n", title.title_style(), width = self.width);
                println!("{}", fill(instructions, normal_block()).instructions_style());
            },
            ViewItem::Instructions(text) => println!("{}", fill(text, normal_block()).instructions_style()),
            ViewItem::LevelHelp(text) => {
                println!("{}", "Help".subheading_style());
                println!("{}", text.as_str().hint_style());
            },
            ViewItem::CommandHelp(commands) => {
                for (usage, description) in commands {
                    println!("  {:<18} {}", usage.bold(), description);
                }
            },
            ViewItem::LevelList(levels) => {
                for level in levels {
                    let marker = if level.current { "▶" } else { " " };
                    println!(
                        "{marker} {}. {} ({})",
                        level.number,
                        level.name,
                        level.slug.as_str().hint_style()
                    );
                }
            },
            ViewItem::Code(code) => {
                for (idx, line) in code.lines().enumerate() {
                    println!("{:>3} {}", (idx + 1).to_string().dimmed(), line.code_style());
                }
            },
            ViewItem::RunTrace(lines) => {
                for line in lines {
                    println!("{}", line.trace_style());
                }
            },
            ViewItem::Snapshot(snapshot) => {
                for line in describe_snapshot(snapshot) {
                    println!("{line}");
                }
            },
            ViewItem::Json(json) => println!("{json}"),
            ViewItem::Animation(text) => println!("  {}", text.event_style()),
            ViewItem::LevelCompleted(text) => println!("{ICON_SUCCESS} {}", text.success_style()),
            ViewItem::EngineMessage(text) => println!("{ICON_ENGINE} {}", fill(text, normal_block())),
            ViewItem::Error(text) => println!("{ICON_ERROR} {}", text.error_style()),
        }
    }
}

fn normal_block() -> Options<'static> {
    Options::new(termwidth().min(100)).initial_indent("").subsequent_indent("")
}

/// Plain-text status lines for a world snapshot.
pub fn describe_snapshot(snapshot: &WorldSnapshot) -> Vec<String> {
    let mut lines = vec![format!(
        "Character at ({}, {}), speed {}",
        snapshot.x, snapshot.y, snapshot.speed
    )];
    if let Some(goal) = snapshot.goal {
        let status = if snapshot.in_goal { "inside" } else { "outside" };
        lines.push(format!(
            "Goal x {}..{}, y {}..{} ({status})",
            goal.x,
            goal.right(),
            goal.y,
            goal.bottom()
        ));
    }
    if !snapshot.targets.is_empty() {
        lines.push(format!(
            "Targets hit: {}/{}",
            snapshot.targets_hit,
            snapshot.targets.len()
        ));
    }
    if !snapshot.obstacles.is_empty() {
        let xs: Vec<String> = snapshot
            .obstacles
            .iter()
            .filter(|obstacle| obstacle.active)
            .map(|obstacle| obstacle.area.x.to_string())
            .collect();
        lines.push(format!("Obstacles at x = {}", xs.join(", ")));
    }
    if let Some(enemy) = snapshot.enemy {
        let proximity = if enemy.near { "near" } else { "far" };
        lines.push(format!("Enemy at x = {} ({proximity})", enemy.area.x));
    }
    lines
}
