use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Slowest speed a script may set.
pub const MIN_SPEED: i64 = 1;
/// Fastest speed a script may set.
pub const MAX_SPEED: i64 = 20;

/// Built-in verbs a script can call.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    MoveLeft,
    MoveRight,
    Jump,
    Shoot,
    MoveBack,
    SetSpeed,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::MoveLeft,
        Action::MoveRight,
        Action::Jump,
        Action::Shoot,
        Action::MoveBack,
        Action::SetSpeed,
    ];

    /// Name as written in a script, e.g. `moveLeft`.
    pub fn name(self) -> &'static str {
        match self {
            Action::MoveLeft => "moveLeft",
            Action::MoveRight => "moveRight",
            Action::Jump => "jump",
            Action::Shoot => "shoot",
            Action::MoveBack => "moveBack",
            Action::SetSpeed => "setSpeed",
        }
    }

    /// Look up an action by its script name. Names are case-sensitive.
    pub fn from_name(name: &str) -> Option<Action> {
        Self::ALL.into_iter().find(|action| action.name() == name)
    }

    /// True if the call takes exactly one argument.
    pub fn takes_argument(self) -> bool {
        matches!(self, Action::SetSpeed)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of actions a level accepts.
pub type ActionSet = BTreeSet<Action>;

/// Selects which level descriptor applies.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LevelKind {
    Commands,
    Variables,
    Conditionals,
    Loops,
    FreeRoam,
}

impl LevelKind {
    pub const ALL: [LevelKind; 5] = [
        LevelKind::Commands,
        LevelKind::Variables,
        LevelKind::Conditionals,
        LevelKind::Loops,
        LevelKind::FreeRoam,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            LevelKind::Commands => "commands",
            LevelKind::Variables => "variables",
            LevelKind::Conditionals => "conditionals",
            LevelKind::Loops => "loops",
            LevelKind::FreeRoam => "free-roam",
        }
    }

    pub fn from_slug(slug: &str) -> Option<LevelKind> {
        let lower = slug.trim().to_lowercase();
        Self::ALL.into_iter().find(|kind| kind.slug() == lower)
    }
}

impl fmt::Display for LevelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Axis-aligned rectangle in playfield pixels. `x`/`y` is the top-left corner.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Edges are inclusive.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Same rectangle moved to a new x.
    pub fn with_x(&self, x: f64) -> Self {
        Self { x, ..*self }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Dimensions shared by every level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayfieldDef {
    pub width: f64,
    pub height: f64,
    pub character_width: f64,
    pub character_height: f64,
    /// Pixels moved per unit of speed.
    pub step_scale: f64,
    /// An obstacle closer than this (in x) to the character's final position counts as a hit.
    pub collision_margin: f64,
}

impl Default for PlayfieldDef {
    fn default() -> Self {
        Self {
            width: 1004.0,
            height: 330.0,
            character_width: 80.0,
            character_height: 48.0,
            step_scale: 10.0,
            collision_margin: 30.0,
        }
    }
}

impl PlayfieldDef {
    /// Rightmost x the character's left edge may reach.
    pub fn max_x(&self) -> f64 {
        (self.width - self.character_width).max(0.0)
    }
}

/// An enemy that moves between a far and a near position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyDef {
    /// Area occupied while the enemy is far.
    pub area: Rect,
    /// X position taken while the enemy is near.
    pub near_x: f64,
}

/// One clause of a level's completion predicate. A level is complete when all clauses hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Requirement {
    /// Character x is at or left of `max`.
    ReachX { max: f64 },
    /// Character position lies within the goal rectangle.
    InGoal,
    /// The action was performed at least once.
    Invoked { action: Action },
    /// `setSpeed` succeeded with a variable argument.
    SpeedFromVariable,
    /// A true conditional containing the retreat action ran.
    RetreatHandled,
    /// A loop whose body calls `action` ran at least once.
    LoopedAction { action: Action },
    /// Every target is hit.
    AllTargetsHit,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::ReachX { max } => write!(f, "reach x <= {max}"),
            Requirement::InGoal => write!(f, "reach the goal"),
            Requirement::Invoked { action } => write!(f, "use {action}()"),
            Requirement::SpeedFromVariable => write!(f, "set the speed from a variable"),
            Requirement::RetreatHandled => write!(f, "retreat when the enemy is near"),
            Requirement::LoopedAction { action } => write!(f, "call {action}() inside a loop"),
            Requirement::AllTargetsHit => write!(f, "hit every target"),
        }
    }
}

fn default_speed() -> i64 {
    5
}

/// Everything needed to build one level: text, layout, grammar and completion rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    pub kind: LevelKind,
    pub number: u32,
    pub name: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub starter_code: String,
    #[serde(default)]
    pub help: String,
    pub allowed_actions: ActionSet,
    pub start: Point,
    #[serde(default = "default_speed")]
    pub speed: i64,
    #[serde(default)]
    pub goal: Option<Rect>,
    #[serde(default)]
    pub obstacles: Vec<Rect>,
    #[serde(default)]
    pub targets: Vec<Rect>,
    #[serde(default)]
    pub enemy: Option<EnemyDef>,
    /// Action that counts as retreating inside a true conditional.
    #[serde(default)]
    pub retreat_action: Option<Action>,
    pub complete_when: Vec<Requirement>,
}

/// The full set of levels plus shared playfield dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Catalog {
    #[serde(default)]
    pub playfield: PlayfieldDef,
    #[serde(default)]
    pub levels: Vec<LevelDef>,
}

impl Catalog {
    pub fn level(&self, kind: LevelKind) -> Option<&LevelDef> {
        self.levels.iter().find(|level| level.kind == kind)
    }

    pub fn level_by_number(&self, number: u32) -> Option<&LevelDef> {
        self.levels.iter().find(|level| level.number == number)
    }

    /// Levels sorted by number.
    pub fn ordered(&self) -> Vec<&LevelDef> {
        let mut levels: Vec<&LevelDef> = self.levels.iter().collect();
        levels.sort_by_key(|level| level.number);
        levels
    }
}
