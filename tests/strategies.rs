use proptest::prelude::*;
use rulebinder::{Actor, ActorType, Item, Predicate, RollOptions, option, option_value};
use serde_json::{Value as Json, json};

// --- Fixed option schema ---
// tags     : one of TAGS, active or not
// self:level:<n> for n in 1..=20 (at most one)

const TAGS: &[&str] = &[
    "stance:mountain",
    "crafting:entry:alchemical",
    "self:condition:frightened",
    "target:undead",
    "feat:toughness",
];

const PATHS: &[&str] = &["attributes.hp.max", "attributes.speed.bonus", "skills.cra.bonus"];

/// Generate a roll-option set drawn from the fixed schema.
pub fn arb_roll_options() -> impl Strategy<Value = RollOptions> {
    (
        prop::collection::vec(prop::sample::select(TAGS), 0..=TAGS.len()),
        prop::option::of(1_i64..=20),
    )
        .prop_map(|(tags, level)| {
            let mut options: RollOptions = tags.into_iter().collect();
            if let Some(level) = level {
                options.set(format!("self:level:{level}"), true);
            }
            options
        })
}

fn arb_leaf_predicate() -> impl Strategy<Value = Predicate> {
    prop_oneof![
        prop::sample::select(TAGS).prop_map(option),
        (1_i64..=20, 0_u8..6).prop_map(|(val, op)| {
            let v = option_value("self:level");
            match op {
                0 => v.eq(val),
                1 => v.neq(val),
                2 => v.gt(val),
                3 => v.gte(val),
                4 => v.lt(val),
                _ => v.lte(val),
            }
        }),
    ]
}

/// Generate a predicate tree (AND, OR, NOT of leaves), bounded depth.
pub fn arb_predicate(max_depth: u32) -> impl Strategy<Value = Predicate> {
    arb_leaf_predicate().prop_recursive(max_depth, 16, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(Predicate::And),
            prop::collection::vec(inner.clone(), 1..3).prop_map(Predicate::Or),
            inner.prop_map(|p| !p),
        ]
    })
}

/// One generated rule element source.
#[derive(Debug, Clone)]
pub struct GenRule {
    pub source: Json,
}

fn common_fields(
    source: &mut Json,
    priority: Option<i32>,
    predicate: Option<Predicate>,
    ignored: bool,
) {
    if let Json::Object(map) = source {
        if let Some(priority) = priority {
            map.insert("priority".into(), json!(priority));
        }
        if let Some(predicate) = predicate {
            map.insert("predicate".into(), predicate.to_json());
        }
        if ignored {
            map.insert("ignored".into(), json!(true));
        }
    }
}

/// Generate a rule of one of the implemented kinds, or an unknown key.
pub fn arb_rule(ignored: impl Strategy<Value = bool>) -> impl Strategy<Value = GenRule> {
    let body = prop_oneof![
        (prop::sample::select(TAGS), any::<bool>())
            .prop_map(|(tag, value)| json!({"key": "RollOption", "option": tag, "value": value})),
        (
            prop::sample::select(PATHS),
            prop::sample::select(&["add", "subtract", "upgrade", "downgrade", "override"][..]),
            -5_i64..=5,
        )
            .prop_map(|(path, mode, value)| json!({
                "key": "ActiveEffectLike",
                "path": path,
                "mode": mode,
                "value": value
            })),
        (any::<bool>(), "[a-z]{0,4}").prop_map(|(replace, text)| json!({
            "key": "AdjustDescription",
            "replace": replace,
            "value": text
        })),
        prop::sample::select(&["alchemical", "snares"][..])
            .prop_map(|selector| json!({"key": "CraftingEntry", "selector": selector})),
        Just(json!({"key": "FlatModifier", "value": 1})),
    ];
    (
        body,
        prop::option::of(-10_i32..=200),
        prop::option::of(arb_predicate(2)),
        ignored,
    )
        .prop_map(|(mut source, priority, predicate, ignored)| {
            common_fields(&mut source, priority, predicate, ignored);
            GenRule { source }
        })
}

/// A character with 1..=3 items holding 0..=4 generated rules each.
pub fn arb_actor(ignored: impl Strategy<Value = bool> + Clone) -> impl Strategy<Value = Actor> {
    (
        prop::collection::vec(prop::collection::vec(arb_rule(ignored), 0..=4), 1..=3),
        arb_roll_options(),
        0_i64..=20,
    )
        .prop_map(|(items, options, level)| {
            let mut actor = Actor::new("a1", "Generated", ActorType::Character)
                .with_system("details.level.value", level)
                .with_system("attributes.hp.max", 20)
                .with_system(
                    "crafting.entries.alchemical",
                    json!({"selector": "alchemical", "name": "Alchemy"}),
                );
            actor.roll_options = options;
            for (i, rules) in items.into_iter().enumerate() {
                let item = rules.into_iter().fold(
                    Item::new(format!("i{i}"), format!("Item {i}"), "feat")
                        .with_system("description.value", "base"),
                    |item, rule| item.with_rule(rule.source),
                );
                actor = actor.with_item(item);
            }
            actor
        })
}
