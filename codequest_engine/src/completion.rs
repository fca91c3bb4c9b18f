//! module: completion
//!
//! Technique flags gathered while scripts run, and evaluation of a level's
//! completion requirements against them and the world.

use std::collections::BTreeSet;

use codequest_data::{Action, Requirement};
use serde::Serialize;

use crate::world::WorldState;

/// Which programming techniques the player has used during this attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Techniques {
    /// Actions performed at least once, anywhere in a script.
    pub invoked: BTreeSet<Action>,
    /// `setSpeed` succeeded with a variable argument.
    pub speed_from_variable: bool,
    /// Some conditional evaluated true and ran its body.
    pub conditional_taken: bool,
    /// A true conditional whose body holds the level's retreat action ran.
    pub retreat_handled: bool,
    /// A loop with at least one action call ran at least one iteration.
    pub used_loop: bool,
    /// Actions called from within loops that ran.
    pub looped_actions: BTreeSet<Action>,
}

impl Techniques {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// True if no technique has been recorded.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Check a single requirement.
pub fn requirement_met(requirement: &Requirement, world: &WorldState, techniques: &Techniques) -> bool {
    match requirement {
        Requirement::ReachX { max } => world.position().0 <= *max,
        Requirement::InGoal => world.in_goal(),
        Requirement::Invoked { action } => techniques.invoked.contains(action),
        Requirement::SpeedFromVariable => techniques.speed_from_variable,
        Requirement::RetreatHandled => techniques.retreat_handled,
        Requirement::LoopedAction { action } => techniques.looped_actions.contains(action),
        Requirement::AllTargetsHit => world.all_targets_hit(),
    }
}

/// A level with no requirements is never complete.
pub fn all_met(requirements: &[Requirement], world: &WorldState, techniques: &Techniques) -> bool {
    !requirements.is_empty()
        && requirements
            .iter()
            .all(|requirement| requirement_met(requirement, world, techniques))
}
