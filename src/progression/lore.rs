use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{ActorUpdates, sluggify};

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ability {
    Str,
    Dex,
    Con,
    Int,
    Wis,
    Cha,
}

impl Ability {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Ability::Str => "str",
            Ability::Dex => "dex",
            Ability::Con => "con",
            Ability::Int => "int",
            Ability::Wis => "wis",
            Ability::Cha => "cha",
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The update that adds an untrained lore skill named `name`, keyed by its
/// slug. An empty name adds nothing.
#[must_use]
pub fn lore_update(name: &str, ability: Ability) -> Option<ActorUpdates> {
    if name.is_empty() {
        return None;
    }
    let mut updates = ActorUpdates::new();
    updates.set(
        format!("lores.{}", sluggify(name)),
        json!({"name": name, "rank": 0, "ability": ability.as_str()}),
    );
    Some(updates)
}
