use serde::{Deserialize, Serialize};

use super::predicate::Predicate;
use super::roll_options::RollOptions;

/// A crafting entry as stored under the actor's `crafting.entries.<selector>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CraftingEntryData {
    pub selector: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_alchemical: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_daily_prep: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_prepared: Option<bool>,
    #[serde(default)]
    pub craftable_items: Predicate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_item_level: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_slots: Option<i64>,
    #[serde(default)]
    pub actor_prepared_formulas: Vec<PreparedFormula>,
}

/// A formula the actor has prepared in an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedFormula {
    #[serde(rename = "itemUUID")]
    pub item_uuid: String,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub expended: bool,
    #[serde(default)]
    pub is_signature_item: bool,
}

fn one() -> u32 {
    1
}

impl CraftingEntryData {
    /// Whether an item of `level`, described by `item_options`, may be
    /// prepared in this entry.
    #[must_use]
    pub fn accepts(&self, level: i64, item_options: &RollOptions) -> bool {
        self.max_item_level.map_or(true, |max| level <= max)
            && self.craftable_items.test(item_options)
    }

    /// Slots still free, or `None` when the entry has no slot limit.
    #[must_use]
    pub fn remaining_slots(&self) -> Option<i64> {
        let used: i64 = self
            .actor_prepared_formulas
            .iter()
            .map(|f| i64::from(f.quantity))
            .sum();
        self.max_slots.map(|max| (max - used).max(0))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::option;

    fn entry() -> CraftingEntryData {
        CraftingEntryData {
            selector: "alchemy".into(),
            name: "Alchemy".into(),
            is_alchemical: Some(true),
            is_daily_prep: None,
            is_prepared: Some(true),
            craftable_items: Predicate::always().and(option("item:trait:alchemical")),
            max_item_level: Some(3),
            max_slots: Some(2),
            actor_prepared_formulas: Vec::new(),
        }
    }

    #[test]
    fn accepts_checks_level_and_predicate() {
        let alchemical: RollOptions = ["item:trait:alchemical"].into_iter().collect();
        assert!(entry().accepts(3, &alchemical));
        assert!(!entry().accepts(4, &alchemical));
        assert!(!entry().accepts(1, &RollOptions::new()));
    }

    #[test]
    fn remaining_slots_counts_quantities() {
        let mut e = entry();
        e.actor_prepared_formulas.push(PreparedFormula {
            item_uuid: "Compendium.x.y".into(),
            quantity: 3,
            expended: false,
            is_signature_item: false,
        });
        assert_eq!(e.remaining_slots(), Some(0));
        e.max_slots = None;
        assert_eq!(e.remaining_slots(), None);
    }

    #[test]
    fn camel_case_wire_form() {
        let value = serde_json::to_value(entry()).unwrap();
        assert_eq!(value["maxSlots"], json!(2));
        assert_eq!(value["isAlchemical"], json!(true));
        assert_eq!(value["craftableItems"], json!(["item:trait:alchemical"]));
        assert_eq!(value["actorPreparedFormulas"], json!([]));
        assert!(value.get("isDailyPrep").is_none());

        let back: CraftingEntryData = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry());
    }
}
