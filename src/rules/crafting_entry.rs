use serde_json::Value as Json;

use super::base::{Lifecycle, RuleElementBase};
use crate::{Actor, ActorType, ActorUpdates, CraftingEntryData, Predicate, ValidationError, sluggify};

/// Priority crafting entries run at, so their roll option is in place before
/// any active-effect-like element that predicates on it.
pub const CRAFTING_ENTRY_PRIORITY: i32 = 5;

/// Grants the actor a crafting entry while the owning item is held.
#[derive(Debug, Clone, PartialEq)]
pub struct CraftingEntry {
    pub selector: String,
    pub name: String,
    pub is_alchemical: Option<bool>,
    pub is_daily_prep: Option<bool>,
    pub is_prepared: Option<bool>,
    pub craftable_items: Predicate,
    pub max_item_level: Option<i64>,
    pub max_slots: Option<i64>,
}

impl CraftingEntry {
    pub(crate) fn new(base: &mut RuleElementBase, actor_type: ActorType) -> Self {
        base.set_priority(CRAFTING_ENTRY_PRIORITY);

        let source = base.source().clone();
        let name = source
            .string("name")
            .unwrap_or(&base.data().label)
            .to_owned();

        let selector = match source.string("selector") {
            Some(selector) => selector.to_owned(),
            None => {
                base.fail_validation(ValidationError::MissingField {
                    field: "selector".into(),
                });
                String::new()
            }
        };

        if actor_type != ActorType::Character {
            let key = base.data().key.clone();
            base.fail_validation(ValidationError::InvalidActorType {
                key,
                actor_type: actor_type.to_string(),
            });
        }

        // An unreadable craftable-items predicate accepts everything.
        let craftable_items = source
            .get("craftableItems")
            .and_then(|raw| Predicate::from_json(raw).ok())
            .unwrap_or_default();

        Self {
            selector,
            name,
            is_alchemical: source.bool("isAlchemical"),
            is_daily_prep: source.bool("isDailyPrep"),
            is_prepared: source.bool("isPrepared"),
            craftable_items,
            max_item_level: source.integer("maxItemLevel"),
            max_slots: source.integer("maxSlots"),
        }
    }

    fn resolved_selector(&self, base: &RuleElementBase, actor: &Actor) -> String {
        base.resolve_value(&Json::String(self.selector.clone()), &base.roll_data(actor))
            .map(|v| v.to_plain_string())
            .unwrap_or_else(|| self.selector.clone())
    }

    fn entry_path(selector: &str) -> String {
        format!("crafting.entries.{selector}")
    }
}

impl Lifecycle for CraftingEntry {
    fn on_create(&self, base: &RuleElementBase, actor: &Actor, updates: &mut ActorUpdates) {
        let selector = self.resolved_selector(base, actor);
        let entry = CraftingEntryData {
            selector: selector.clone(),
            name: self.name.clone(),
            is_alchemical: self.is_alchemical,
            is_daily_prep: self.is_daily_prep,
            is_prepared: self.is_prepared,
            craftable_items: self.craftable_items.clone(),
            max_item_level: self.max_item_level,
            max_slots: self.max_slots,
            actor_prepared_formulas: Vec::new(),
        };
        match serde_json::to_value(&entry) {
            Ok(value) => updates.set(Self::entry_path(&selector), value),
            Err(err) => tracing::warn!(
                selector = %selector,
                error = %err,
                "could not serialize crafting entry"
            ),
        }
    }

    fn on_apply_active_effects(&self, base: &RuleElementBase, actor: &mut Actor) {
        let selector = self.resolved_selector(base, actor);
        if !actor.has_crafting_entry(&selector) {
            return;
        }
        let option = format!("crafting:entry:{}", sluggify(&selector));
        actor.roll_options.set(option, true);
    }

    fn on_delete(&self, base: &RuleElementBase, actor: &Actor, updates: &mut ActorUpdates) {
        let selector = self.resolved_selector(base, actor);
        updates.delete(Self::entry_path(&selector));
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::rules::{RuleElement, RuleElementKind, RuleElementSource};
    use crate::{Item, RulesConfig, UpdateCommand};

    fn element(raw: Json, actor_type: ActorType) -> RuleElement {
        let actor = Actor::new("a", "A", actor_type).with_item(Item::new("i1", "Alchemy", "feat"));
        RuleElement::from_source(
            RuleElementSource::from_json(&raw),
            &actor,
            0,
            0,
            &RulesConfig::default(),
        )
    }

    #[test]
    fn reads_fields_and_forces_priority() {
        let el = element(
            json!({
                "key": "CraftingEntry",
                "selector": "alchemical",
                "priority": 90,
                "isAlchemical": true,
                "maxItemLevel": 3,
                "craftableItems": ["item:trait:alchemical"]
            }),
            ActorType::Character,
        );
        assert_eq!(el.priority(), CRAFTING_ENTRY_PRIORITY);
        assert!(el.base().is_valid());
        let RuleElementKind::CraftingEntry(entry) = el.kind() else {
            panic!("expected a crafting entry");
        };
        assert_eq!(entry.selector, "alchemical");
        assert_eq!(entry.name, "Alchemy");
        assert_eq!(entry.is_alchemical, Some(true));
        assert_eq!(entry.max_item_level, Some(3));
        assert!(!entry.craftable_items.is_always());
    }

    #[test]
    fn missing_selector_fails_validation() {
        let el = element(json!({"key": "CraftingEntry"}), ActorType::Character);
        assert!(matches!(
            el.base().failure(),
            Some(ValidationError::MissingField { field }) if field == "selector"
        ));
        let RuleElementKind::CraftingEntry(entry) = el.kind() else {
            panic!("expected a crafting entry");
        };
        assert_eq!(entry.selector, "");
    }

    #[test]
    fn non_character_actors_are_rejected() {
        let el = element(
            json!({"key": "CraftingEntry", "selector": "alchemical"}),
            ActorType::Npc,
        );
        assert!(matches!(
            el.base().failure(),
            Some(ValidationError::InvalidActorType { actor_type, .. }) if actor_type == "npc"
        ));
    }

    #[test]
    fn bad_craftable_items_accepts_everything() {
        let el = element(
            json!({"key": "CraftingEntry", "selector": "s", "craftableItems": {"xor": 1}}),
            ActorType::Character,
        );
        assert!(el.base().is_valid());
        let RuleElementKind::CraftingEntry(entry) = el.kind() else {
            panic!("expected a crafting entry");
        };
        assert!(entry.craftable_items.is_always());
    }

    #[test]
    fn delete_writes_a_removal() {
        let actor = Actor::new("a", "A", ActorType::Character)
            .with_item(Item::new("i1", "Alchemy", "feat"));
        let el = element(
            json!({"key": "CraftingEntry", "selector": "snares"}),
            ActorType::Character,
        );
        let mut updates = ActorUpdates::new();
        assert!(el.on_delete(&actor, &mut updates));
        assert_eq!(
            updates.get("crafting.entries.snares"),
            Some(&UpdateCommand::Delete {
                path: "crafting.entries.snares".into()
            })
        );
        assert_eq!(
            updates.to_flat_map().get("crafting.entries.-=snares"),
            Some(&Json::Null)
        );
    }
}
