use std::collections::HashMap;

use serde::Serialize;

/// Script variables for one level attempt. Survives between runs and is
/// cleared only when the level is reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariableStore {
    values: HashMap<String, i64>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `name`. Returns the previous value, if any.
    pub fn set(&mut self, name: &str, value: i64) -> Option<i64> {
        self.values.insert(name.to_string(), value)
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Variables sorted by name.
    pub fn sorted(&self) -> Vec<(&str, i64)> {
        let mut entries: Vec<_> = self.values.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_unstable_by_key(|(name, _)| *name);
        entries
    }
}
