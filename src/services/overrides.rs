use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Manual coverage overrides keyed by character id.
///
/// An override applies to the character in every chapter, not only in the
/// chapter where it was toggled.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct OverrideStore {
    entries: HashMap<String, bool>,
}

impl OverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, character_id: &str) -> Option<bool> {
        self.entries.get(character_id).copied()
    }

    pub fn set(&mut self, character_id: &str, value: bool) {
        self.entries.insert(character_id.to_string(), value);
    }

    /// Stores the negation of the character's current reported status, an
    /// unknown status counting as `false`. Returns the stored value.
    pub fn toggle(&mut self, character_id: &str, current: Option<bool>) -> bool {
        let value = !current.unwrap_or(false);
        self.set(character_id, value);
        value
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
