use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::RulesError;

/// Settings the engine reads. Loaded once and passed explicitly; nothing in
/// the crate mutates it after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RulesConfig {
    /// Priority given to rule elements that do not declare one.
    pub default_priority: i32,
    /// Rule element keys treated as ignored everywhere.
    pub disabled_keys: BTreeSet<String>,
    /// Deepest parenthesis nesting a value formula may use.
    pub max_formula_depth: usize,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            default_priority: 100,
            disabled_keys: BTreeSet::new(),
            max_formula_depth: 32,
        }
    }
}

impl RulesConfig {
    /// Parse settings from JSON. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::Json`] on malformed input.
    pub fn from_json(input: &str) -> Result<Self, RulesError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Read a JSON settings file.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError`] on I/O or parse failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_json(&input)
    }

    #[must_use]
    pub fn is_disabled(&self, key: &str) -> bool {
        self.disabled_keys.contains(key)
    }
}
