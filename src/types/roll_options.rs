use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The actor's roll-option set: tag -> whether the tag currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RollOptions {
    options: BTreeMap<String, bool>,
}

impl RollOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a tag. Later writes replace earlier ones.
    pub fn set(&mut self, tag: impl Into<String>, value: bool) {
        self.options.insert(tag.into(), value);
    }

    /// The value last written for `tag`, if any.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<bool> {
        self.options.get(tag).copied()
    }

    #[must_use]
    pub fn is_active(&self, tag: &str) -> bool {
        self.get(tag).unwrap_or(false)
    }

    /// Active tags in lexical order.
    pub fn active(&self) -> impl Iterator<Item = &str> {
        self.options
            .iter()
            .filter(|(_, on)| **on)
            .map(|(tag, _)| tag.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for RollOptions {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut options = RollOptions::new();
        for tag in iter {
            options.set(tag, true);
        }
        options
    }
}
