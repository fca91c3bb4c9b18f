use std::collections::HashSet;
use std::fmt;

use crate::*;

/// Structural problem found in a level catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    DuplicateLevel { kind: &'static str, id: String },
    MissingEntity { level: String, entity: &'static str, context: String },
    DisallowedAction { level: String, action: Action, context: String },
    InvalidValue { context: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateLevel { kind, id } => {
                write!(f, "duplicate level {kind} '{id}'")
            },
            ValidationError::MissingEntity { level, entity, context } => {
                write!(f, "level '{level}' has no {entity} ({context})")
            },
            ValidationError::DisallowedAction { level, action, context } => {
                write!(f, "level '{level}' does not allow {action} ({context})")
            },
            ValidationError::InvalidValue { context } => {
                write!(f, "invalid value ({context})")
            },
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate layout and rule consistency across a catalog.
///
/// ```
/// use codequest_data::{Action, Catalog, LevelDef, LevelKind, Point, Requirement, validate_catalog};
///
/// let catalog = Catalog {
///     levels: vec![LevelDef {
///         kind: LevelKind::Commands,
///         number: 1,
///         name: "Learn Commands".into(),
///         instructions: String::new(),
///         starter_code: String::new(),
///         help: String::new(),
///         allowed_actions: [Action::MoveLeft, Action::Jump].into_iter().collect(),
///         start: Point { x: 150.0, y: 200.0 },
///         speed: 5,
///         goal: None,
///         obstacles: Vec::new(),
///         targets: Vec::new(),
///         enemy: None,
///         retreat_action: None,
///         complete_when: vec![Requirement::ReachX { max: 100.0 }],
///     }],
///     ..Catalog::default()
/// };
/// assert!(validate_catalog(&catalog).is_empty());
/// ```
pub fn validate_catalog(catalog: &Catalog) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if catalog.levels.is_empty() {
        errors.push(ValidationError::InvalidValue {
            context: "catalog has no levels".to_string(),
        });
    }

    let field = &catalog.playfield;
    if field.step_scale <= 0.0 {
        errors.push(ValidationError::InvalidValue {
            context: format!("playfield step_scale must be positive ({})", field.step_scale),
        });
    }
    if field.width <= field.character_width {
        errors.push(ValidationError::InvalidValue {
            context: format!(
                "playfield width {} leaves no room for a character {} wide",
                field.width, field.character_width
            ),
        });
    }

    let mut kinds = HashSet::new();
    let mut numbers = HashSet::new();
    for level in &catalog.levels {
        if !kinds.insert(level.kind) {
            errors.push(ValidationError::DuplicateLevel {
                kind: "kind",
                id: level.kind.to_string(),
            });
        }
        if !numbers.insert(level.number) {
            errors.push(ValidationError::DuplicateLevel {
                kind: "number",
                id: level.number.to_string(),
            });
        }
        validate_level(level, field, &mut errors);
    }

    errors
}

fn validate_level(level: &LevelDef, field: &PlayfieldDef, errors: &mut Vec<ValidationError>) {
    let name = level.name.clone();

    if !(MIN_SPEED..=MAX_SPEED).contains(&level.speed) {
        errors.push(ValidationError::InvalidValue {
            context: format!("level '{name}' start speed {} outside {MIN_SPEED}..={MAX_SPEED}", level.speed),
        });
    }
    if level.start.x < 0.0 || level.start.x > field.max_x() {
        errors.push(ValidationError::InvalidValue {
            context: format!("level '{name}' start x {} outside playfield", level.start.x),
        });
    }
    if level.complete_when.is_empty() {
        errors.push(ValidationError::InvalidValue {
            context: format!("level '{name}' has no completion requirements"),
        });
    }

    let rects = level
        .goal
        .iter()
        .chain(&level.obstacles)
        .chain(&level.targets)
        .chain(level.enemy.iter().map(|enemy| &enemy.area));
    for rect in rects {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            errors.push(ValidationError::InvalidValue {
                context: format!("level '{name}' has an empty area at ({}, {})", rect.x, rect.y),
            });
        }
    }

    if let Some(retreat) = level.retreat_action {
        check_allowed(level, retreat, "retreat action", errors);
    }

    for requirement in &level.complete_when {
        let context = format!("requirement '{requirement}'");
        match requirement {
            Requirement::InGoal if level.goal.is_none() => {
                errors.push(ValidationError::MissingEntity {
                    level: name.clone(),
                    entity: "goal",
                    context,
                });
            },
            Requirement::AllTargetsHit if level.targets.is_empty() => {
                errors.push(ValidationError::MissingEntity {
                    level: name.clone(),
                    entity: "targets",
                    context,
                });
            },
            Requirement::RetreatHandled => {
                if level.enemy.is_none() {
                    errors.push(ValidationError::MissingEntity {
                        level: name.clone(),
                        entity: "enemy",
                        context: context.clone(),
                    });
                }
                if level.retreat_action.is_none() {
                    errors.push(ValidationError::MissingEntity {
                        level: name.clone(),
                        entity: "retreat action",
                        context,
                    });
                }
            },
            Requirement::Invoked { action } | Requirement::LoopedAction { action } => {
                check_allowed(level, *action, &context, errors);
            },
            Requirement::SpeedFromVariable => {
                check_allowed(level, Action::SetSpeed, &context, errors);
            },
            _ => {},
        }
    }
}

fn check_allowed(level: &LevelDef, action: Action, context: &str, errors: &mut Vec<ValidationError>) {
    if !level.allowed_actions.contains(&action) {
        errors.push(ValidationError::DisallowedAction {
            level: level.name.clone(),
            action,
            context: context.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loops_level() -> LevelDef {
        LevelDef {
            kind: LevelKind::Loops,
            number: 4,
            name: "Learn Loops".into(),
            instructions: String::new(),
            starter_code: String::new(),
            help: String::new(),
            allowed_actions: [Action::MoveRight, Action::Shoot].into_iter().collect(),
            start: Point { x: 50.0, y: 200.0 },
            speed: 5,
            goal: Some(Rect::new(500.0, 200.0, 100.0, 50.0)),
            obstacles: Vec::new(),
            targets: vec![Rect::new(200.0, 100.0, 30.0, 30.0)],
            enemy: None,
            retreat_action: None,
            complete_when: vec![
                Requirement::AllTargetsHit,
                Requirement::LoopedAction { action: Action::Shoot },
                Requirement::InGoal,
            ],
        }
    }

    fn catalog(levels: Vec<LevelDef>) -> Catalog {
        Catalog {
            levels,
            ..Catalog::default()
        }
    }

    #[test]
    fn valid_level_passes() {
        assert!(validate_catalog(&catalog(vec![loops_level()])).is_empty());
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let errors = validate_catalog(&catalog(Vec::new()));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn duplicate_kinds_and_numbers_are_reported() {
        let errors = validate_catalog(&catalog(vec![loops_level(), loops_level()]));
        assert!(errors.contains(&ValidationError::DuplicateLevel {
            kind: "kind",
            id: "loops".into()
        }));
        assert!(errors.contains(&ValidationError::DuplicateLevel {
            kind: "number",
            id: "4".into()
        }));
    }

    #[test]
    fn requirement_needing_missing_entity_is_reported() {
        let mut level = loops_level();
        level.goal = None;
        level.targets.clear();
        let errors = validate_catalog(&catalog(vec![level]));
        let missing: Vec<_> = errors
            .iter()
            .filter_map(|err| match err {
                ValidationError::MissingEntity { entity, .. } => Some(*entity),
                _ => None,
            })
            .collect();
        assert_eq!(missing, vec!["targets", "goal"]);
    }

    #[test]
    fn requirement_on_disallowed_action_is_reported() {
        let mut level = loops_level();
        level.allowed_actions.remove(&Action::Shoot);
        let errors = validate_catalog(&catalog(vec![level]));
        assert!(matches!(
            errors.as_slice(),
            [ValidationError::DisallowedAction {
                action: Action::Shoot,
                ..
            }]
        ));
    }

    #[test]
    fn retreat_requirement_needs_enemy_and_action() {
        let mut level = loops_level();
        level.complete_when = vec![Requirement::RetreatHandled];
        let errors = validate_catalog(&catalog(vec![level]));
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|err| err.to_string().contains("has no")));
    }

    #[test]
    fn out_of_range_start_speed_is_invalid() {
        let mut level = loops_level();
        level.speed = 25;
        let errors = validate_catalog(&catalog(vec![level]));
        assert!(matches!(errors.as_slice(), [ValidationError::InvalidValue { .. }]));
    }
}
