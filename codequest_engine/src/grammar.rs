//! Level grammar descriptors.
//!
//! One engine serves every level; a `LevelGrammar` supplies what differs
//! between them: the actions a script may call, the completion requirements,
//! and the initial entity layout.

use codequest_data::{Action, ActionSet, Catalog, LevelDef, LevelKind, PlayfieldDef, Requirement};
use codequest_script::{Script, recognize};

use crate::completion::{Techniques, all_met};
use crate::world::WorldState;

#[derive(Debug, Clone, PartialEq)]
pub struct LevelGrammar {
    def: LevelDef,
    playfield: PlayfieldDef,
}

impl LevelGrammar {
    pub fn new(def: LevelDef, playfield: PlayfieldDef) -> Self {
        Self { def, playfield }
    }

    /// Descriptor for `kind`, if the catalog defines it.
    pub fn from_catalog(catalog: &Catalog, kind: LevelKind) -> Option<Self> {
        catalog
            .level(kind)
            .map(|def| Self::new(def.clone(), catalog.playfield.clone()))
    }

    pub fn kind(&self) -> LevelKind {
        self.def.kind
    }

    pub fn number(&self) -> u32 {
        self.def.number
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn instructions(&self) -> &str {
        &self.def.instructions
    }

    pub fn starter_code(&self) -> &str {
        &self.def.starter_code
    }

    pub fn help(&self) -> &str {
        &self.def.help
    }

    pub fn allowed_actions(&self) -> &ActionSet {
        &self.def.allowed_actions
    }

    pub fn retreat_action(&self) -> Option<Action> {
        self.def.retreat_action
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.def.complete_when
    }

    pub fn has_enemy(&self) -> bool {
        self.def.enemy.is_some()
    }

    pub fn has_obstacles(&self) -> bool {
        !self.def.obstacles.is_empty()
    }

    pub fn definition(&self) -> &LevelDef {
        &self.def
    }

    /// Fresh world in the level's starting layout.
    pub fn initial_world(&self) -> WorldState {
        WorldState::from_level(&self.def, &self.playfield)
    }

    /// Recognize `source` against this level's allowed actions.
    pub fn recognize(&self, source: &str) -> Script {
        recognize(source, &self.def.allowed_actions)
    }

    /// The completion predicate.
    pub fn is_complete(&self, world: &WorldState, techniques: &Techniques) -> bool {
        all_met(&self.def.complete_when, world, techniques)
    }

    /// Heading shown above the level, e.g. `Level 2: Learn Variables`.
    pub fn title(&self) -> String {
        format!("Level {}: {}", self.def.number, self.def.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::builtin_catalog;

    #[test]
    fn every_kind_has_a_builtin_descriptor() {
        let catalog = builtin_catalog().expect("builtin catalog");
        for kind in LevelKind::ALL {
            let grammar = LevelGrammar::from_catalog(&catalog, kind).expect("descriptor");
            assert_eq!(grammar.kind(), kind);
            assert!(!grammar.requirements().is_empty());
        }
    }

    #[test]
    fn recognizer_respects_allowed_actions() {
        let catalog = builtin_catalog().expect("builtin catalog");
        let commands = LevelGrammar::from_catalog(&catalog, LevelKind::Commands).expect("commands");
        let script = commands.recognize("shoot();\njump();");
        assert!(script.statements()[0].is_problem());
        assert!(script.statements()[1].calls(Action::Jump));
    }

    #[test]
    fn title_includes_number_and_name() {
        let catalog = builtin_catalog().expect("builtin catalog");
        let loops = LevelGrammar::from_catalog(&catalog, LevelKind::Loops).expect("loops");
        assert_eq!(loops.title(), "Level 4: Learn Loops");
    }
}
