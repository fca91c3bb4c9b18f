//! World state for one level attempt.
//!
//! The character, goal, obstacles, targets and enemy all live here. Script
//! actions mutate it only through the methods below; the enemy flag is the one
//! field also driven from outside the interpreter, by the enemy schedule.

use codequest_data::{LevelDef, MAX_SPEED, MIN_SPEED, PlayfieldDef, Point, Rect};
use serde::Serialize;

use crate::error::ExecError;

/// Name of the enemy proximity condition usable in `if (...)`.
pub const ENEMY_NEAR: &str = "enemyNear";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Character {
    pub x: f64,
    pub y: f64,
    pub speed: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Target {
    pub area: Rect,
    pub active: bool,
    pub hit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Obstacle {
    pub area: Rect,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Enemy {
    pub far: Rect,
    pub near_x: f64,
    pub near: bool,
    pub active: bool,
}

impl Enemy {
    /// Area the enemy currently occupies.
    pub fn area(&self) -> Rect {
        if self.near { self.far.with_x(self.near_x) } else { self.far }
    }
}

/// Horizontal displacement produced by a move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Movement {
    pub from: f64,
    pub to: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldState {
    character: Character,
    start: Point,
    playfield: PlayfieldDef,
    goal: Option<Rect>,
    obstacles: Vec<Obstacle>,
    targets: Vec<Target>,
    enemy: Option<Enemy>,
}

impl WorldState {
    /// Build the initial layout of a level.
    pub fn from_level(def: &LevelDef, playfield: &PlayfieldDef) -> Self {
        Self {
            character: Character {
                x: def.start.x,
                y: def.start.y,
                speed: def.speed,
            },
            start: def.start,
            playfield: playfield.clone(),
            goal: def.goal,
            obstacles: def
                .obstacles
                .iter()
                .map(|area| Obstacle { area: *area, active: true })
                .collect(),
            targets: def
                .targets
                .iter()
                .map(|area| Target {
                    area: *area,
                    active: true,
                    hit: false,
                })
                .collect(),
            enemy: def.enemy.as_ref().map(|enemy| Enemy {
                far: enemy.area,
                near_x: enemy.near_x,
                near: false,
                active: true,
            }),
        }
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn position(&self) -> (f64, f64) {
        (self.character.x, self.character.y)
    }

    pub fn speed(&self) -> i64 {
        self.character.speed
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn goal(&self) -> Option<&Rect> {
        self.goal.as_ref()
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn enemy(&self) -> Option<&Enemy> {
        self.enemy.as_ref()
    }

    /// Pixels covered by one move at the current speed.
    pub fn step(&self) -> f64 {
        self.character.speed as f64 * self.playfield.step_scale
    }

    pub fn move_left(&mut self) -> Movement {
        let target = self.character.x - self.step();
        self.move_to(target)
    }

    pub fn move_right(&mut self) -> Movement {
        let target = self.character.x + self.step();
        self.move_to(target)
    }

    /// Return to the level's starting x.
    pub fn move_back(&mut self) -> Movement {
        self.move_to(self.start.x)
    }

    fn move_to(&mut self, x: f64) -> Movement {
        let from = self.character.x;
        self.character.x = x.clamp(0.0, self.playfield.max_x());
        Movement {
            from,
            to: self.character.x,
        }
    }

    /// Set the speed if it lies within the allowed range, otherwise leave it unchanged.
    ///
    /// # Errors
    /// Returns [`ExecError::OutOfRangeValue`] when `speed` is outside `MIN_SPEED..=MAX_SPEED`.
    pub fn set_speed(&mut self, speed: i64) -> Result<(), ExecError> {
        if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
            return Err(ExecError::OutOfRangeValue(speed));
        }
        self.character.speed = speed;
        Ok(())
    }

    /// Hit the first target that is still standing, in list order.
    pub fn shoot(&mut self) -> Option<usize> {
        let (idx, target) = self
            .targets
            .iter_mut()
            .enumerate()
            .find(|(_, target)| target.active && !target.hit)?;
        target.hit = true;
        target.active = false;
        Some(idx)
    }

    pub fn targets_hit(&self) -> usize {
        self.targets.iter().filter(|target| target.hit).count()
    }

    pub fn all_targets_hit(&self) -> bool {
        self.targets.iter().all(|target| target.hit)
    }

    pub fn in_goal(&self) -> bool {
        self.goal
            .is_some_and(|goal| goal.contains(self.character.x, self.character.y))
    }

    /// Value of a named world condition, if the level defines it.
    pub fn condition(&self, name: &str) -> Option<bool> {
        match name {
            ENEMY_NEAR => self.enemy.as_ref().map(|enemy| enemy.near),
            _ => None,
        }
    }

    pub fn enemy_near(&self) -> bool {
        self.enemy.as_ref().is_some_and(|enemy| enemy.near)
    }

    /// Move the enemy. Returns true if its proximity changed.
    pub fn set_enemy_near(&mut self, near: bool) -> bool {
        match self.enemy.as_mut() {
            Some(enemy) if enemy.near != near => {
                enemy.near = near;
                true
            },
            _ => false,
        }
    }

    /// Index of the first active obstacle whose x is within the collision margin of the character.
    pub fn obstacle_collision(&self) -> Option<usize> {
        let margin = self.playfield.collision_margin;
        self.obstacles
            .iter()
            .position(|obstacle| obstacle.active && (self.character.x - obstacle.area.x).abs() < margin)
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            x: self.character.x,
            y: self.character.y,
            speed: self.character.speed,
            goal: self.goal,
            in_goal: self.in_goal(),
            obstacles: self.obstacles.clone(),
            targets: self.targets.clone(),
            targets_hit: self.targets_hit(),
            enemy: self.enemy.as_ref().map(|enemy| EnemySnapshot {
                area: enemy.area(),
                near: enemy.near,
            }),
        }
    }
}

/// Read-only view of the world handed to the presentation side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldSnapshot {
    pub x: f64,
    pub y: f64,
    pub speed: i64,
    pub goal: Option<Rect>,
    pub in_goal: bool,
    pub obstacles: Vec<Obstacle>,
    pub targets: Vec<Target>,
    pub targets_hit: usize,
    pub enemy: Option<EnemySnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnemySnapshot {
    pub area: Rect,
    pub near: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use codequest_data::{Action, EnemyDef, LevelKind, Requirement};

    fn level() -> LevelDef {
        LevelDef {
            kind: LevelKind::FreeRoam,
            number: 5,
            name: "Test".into(),
            instructions: String::new(),
            starter_code: String::new(),
            help: String::new(),
            allowed_actions: Action::ALL.into_iter().collect(),
            start: Point { x: 50.0, y: 200.0 },
            speed: 5,
            goal: Some(Rect::new(500.0, 200.0, 80.0, 80.0)),
            obstacles: vec![Rect::new(120.0, 200.0, 30.0, 100.0)],
            targets: vec![Rect::new(150.0, 100.0, 25.0, 25.0), Rect::new(250.0, 300.0, 25.0, 25.0)],
            enemy: Some(EnemyDef {
                area: Rect::new(250.0, 200.0, 40.0, 40.0),
                near_x: 170.0,
            }),
            retreat_action: Some(Action::MoveBack),
            complete_when: vec![Requirement::AllTargetsHit],
        }
    }

    fn world() -> WorldState {
        WorldState::from_level(&level(), &PlayfieldDef::default())
    }

    #[test]
    fn moves_scale_with_speed() {
        let mut world = world();
        let step = world.move_right();
        assert_eq!(step, Movement { from: 50.0, to: 100.0 });
        world.set_speed(12).expect("valid speed");
        world.move_left();
        assert!((world.position().0 - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn moves_clamp_to_playfield() {
        let mut world = world();
        world.set_speed(20).expect("valid speed");
        for _ in 0..10 {
            world.move_right();
        }
        assert!((world.position().0 - 924.0).abs() < f64::EPSILON);
        world.move_back();
        assert!((world.position().0 - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn speed_outside_range_is_rejected() {
        let mut world = world();
        assert_eq!(world.set_speed(0), Err(ExecError::OutOfRangeValue(0)));
        assert_eq!(world.set_speed(21), Err(ExecError::OutOfRangeValue(21)));
        assert_eq!(world.speed(), 5);
        assert!(world.set_speed(20).is_ok());
        assert_eq!(world.speed(), 20);
    }

    #[test]
    fn shoot_hits_targets_in_order_then_misses() {
        let mut world = world();
        assert_eq!(world.shoot(), Some(0));
        assert_eq!(world.shoot(), Some(1));
        assert_eq!(world.shoot(), None);
        assert!(world.all_targets_hit());
        assert!(world.targets().iter().all(|target| !target.active));
    }

    #[test]
    fn enemy_condition_tracks_proximity() {
        let mut world = world();
        assert_eq!(world.condition(ENEMY_NEAR), Some(false));
        assert!(world.set_enemy_near(true));
        assert!(!world.set_enemy_near(true));
        assert_eq!(world.condition(ENEMY_NEAR), Some(true));
        assert!((world.snapshot().enemy.expect("enemy").area.x - 170.0).abs() < f64::EPSILON);
        assert_eq!(world.condition("treasureNear"), None);
    }

    #[test]
    fn obstacle_collision_uses_margin() {
        let mut world = world();
        assert_eq!(world.obstacle_collision(), None);
        world.move_right();
        assert_eq!(world.obstacle_collision(), Some(0));
        world.move_right();
        assert_eq!(world.obstacle_collision(), None);
    }
}
