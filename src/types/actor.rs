use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::condition::ConditionSystemSource;
use super::crafting::CraftingEntryData;
use super::document::Document;
use super::roll_options::RollOptions;
use crate::rules::RuleElementSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorType {
    Character,
    Npc,
    Familiar,
    Hazard,
    Loot,
    Vehicle,
}

impl fmt::Display for ActorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActorType::Character => "character",
            ActorType::Npc => "npc",
            ActorType::Familiar => "familiar",
            ActorType::Hazard => "hazard",
            ActorType::Loot => "loot",
            ActorType::Vehicle => "vehicle",
        };
        f.write_str(name)
    }
}

/// A piece of game content owned by an actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub system: Document,
}

impl Item {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, item_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            item_type: item_type.into(),
            system: Document::new(),
        }
    }

    #[must_use]
    pub fn with_system(mut self, path: &str, value: impl Into<Json>) -> Self {
        self.system.set(path, value.into());
        self
    }

    /// Append a raw rule source to `system.rules`.
    #[must_use]
    pub fn with_rule(mut self, source: Json) -> Self {
        let mut rules = match self.system.get("rules") {
            Some(Json::Array(existing)) => existing.clone(),
            _ => Vec::new(),
        };
        rules.push(source);
        self.system.set("rules", Json::Array(rules));
        self
    }

    /// The rule sources declared in `system.rules`, in declaration order.
    /// Entries that are not objects become empty sources, which fail
    /// validation for lack of a key.
    #[must_use]
    pub fn rule_sources(&self) -> Vec<RuleElementSource> {
        match self.system.get("rules") {
            Some(Json::Array(rules)) => rules.iter().map(RuleElementSource::from_json).collect(),
            _ => Vec::new(),
        }
    }

    #[must_use]
    pub fn slug(&self) -> Option<&str> {
        self.system.get("slug").and_then(Json::as_str)
    }

    #[must_use]
    pub fn description(&self) -> &str {
        self.system
            .get("description.value")
            .and_then(Json::as_str)
            .unwrap_or("")
    }

    pub fn set_description(&mut self, text: impl Into<String>) {
        self.system
            .set("description.value", Json::String(text.into()));
    }

    /// Condition data when this item is a condition with a well-formed system.
    #[must_use]
    pub fn condition(&self) -> Option<ConditionSystemSource> {
        if self.item_type != "condition" {
            return None;
        }
        match serde_json::from_value(Json::Object(self.system.as_map().clone())) {
            Ok(source) => Some(source),
            Err(err) => {
                tracing::debug!(item = %self.id, error = %err, "skipping malformed condition");
                None
            }
        }
    }
}

/// An actor document as the rule engine sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub actor_type: ActorType,
    #[serde(default)]
    pub system: Document,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default, rename = "rollOptions")]
    pub roll_options: RollOptions,
}

impl Actor {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, actor_type: ActorType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            actor_type,
            system: Document::new(),
            items: Vec::new(),
            roll_options: RollOptions::new(),
        }
    }

    #[must_use]
    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    #[must_use]
    pub fn with_system(mut self, path: &str, value: impl Into<Json>) -> Self {
        self.system.set(path, value.into());
        self
    }

    #[must_use]
    pub fn with_roll_option(mut self, tag: &str) -> Self {
        self.roll_options.set(tag, true);
        self
    }

    #[must_use]
    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    #[must_use]
    pub fn item_index(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    /// Whether anything is stored under `crafting.entries.<selector>`,
    /// whatever its shape.
    #[must_use]
    pub fn has_crafting_entry(&self, selector: &str) -> bool {
        !selector.is_empty()
            && self
                .system
                .get("crafting.entries")
                .and_then(|entries| entries.get(selector))
                .is_some()
    }

    /// The crafting entry stored under `crafting.entries.<selector>`.
    #[must_use]
    pub fn crafting_entry(&self, selector: &str) -> Option<CraftingEntryData> {
        if selector.is_empty() {
            return None;
        }
        let raw = self.system.get("crafting.entries")?.get(selector)?;
        serde_json::from_value(raw.clone()).ok()
    }

    /// Roll data for formula substitution, scoped to one owning item.
    #[must_use]
    pub fn roll_data(&self, item_index: Option<usize>) -> RollData<'_> {
        RollData {
            actor: &self.system,
            item: item_index
                .and_then(|idx| self.items.get(idx))
                .map(|item| &item.system),
        }
    }
}

/// Read-only dictionary that `@path` formula references resolve against.
///
/// `@actor.<path>` reads the actor's system data, `@item.<path>` the owning
/// item's system data, and any other path falls back to the actor.
#[derive(Debug, Clone, Copy)]
pub struct RollData<'a> {
    actor: &'a Document,
    item: Option<&'a Document>,
}

impl<'a> RollData<'a> {
    #[must_use]
    pub fn new(actor: &'a Document, item: Option<&'a Document>) -> Self {
        Self { actor, item }
    }

    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&'a Json> {
        if let Some(rest) = path.strip_prefix("actor.") {
            self.actor.get(rest)
        } else if let Some(rest) = path.strip_prefix("item.") {
            self.item?.get(rest)
        } else {
            self.actor.get(path)
        }
    }
}
