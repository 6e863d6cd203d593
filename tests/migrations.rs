use rulebinder::migrations::{MemoryCompendium, MigrationError, MigrationRunner, schema_version};
use rulebinder::{Actor, ActorType, Item, RulesError};
use serde_json::json;

fn compendium() -> MemoryCompendium {
    MemoryCompendium::new()
        .with_feat(
            Item::new("srd-toughness", "Toughness", "feat")
                .with_system("slug", "toughness")
                .with_system("rules", json!([{"key": "RollOption", "option": "feat:toughness"}])),
        )
        .with_feat(
            Item::new("srd-stoutness", "Mountain's Stoutness", "feat")
                .with_system("slug", "mountains-stoutness"),
        )
}

fn stored_character(version: f64) -> Actor {
    Actor::new("a1", "Amiri", ActorType::Character)
        .with_system("schema.version", version)
        .with_item(
            Item::new("f1", "Toughness", "feat")
                .with_system("slug", "toughness")
                .with_system("location", "general-1"),
        )
        .with_item(
            Item::new("f2", "Mountain's Stoutness", "feat").with_system("slug", "mountain-s-stoutness"),
        )
}

#[test]
fn builtin_runner_migrates_old_actor() {
    let runner = MigrationRunner::with_builtin();
    let mut actor = stored_character(0.6);

    let applied = runner.run(&mut actor, &compendium()).unwrap();
    assert_eq!(applied, vec![0.611]);
    assert_eq!(schema_version(&actor), 0.611);

    let tough = actor.item("f1").unwrap();
    assert_eq!(tough.system.get("location"), Some(&json!("general-1")));
    assert_eq!(tough.rule_sources().len(), 1);
    assert_eq!(actor.item("f2").unwrap().slug(), Some("mountains-stoutness"));
}

#[test]
fn migrated_rules_take_effect() {
    let mut actor = stored_character(0.0);
    MigrationRunner::with_builtin()
        .run(&mut actor, &compendium())
        .unwrap();
    let prepared = rulebinder::RuleEngine::default().prepare(&actor);
    assert!(prepared.actor().roll_options.is_active("feat:toughness"));
}

#[test]
fn current_actor_is_left_alone() {
    let mut actor = stored_character(0.611);
    let before = actor.clone();
    let applied = MigrationRunner::with_builtin()
        .run(&mut actor, &MemoryCompendium::new())
        .unwrap();
    assert!(applied.is_empty());
    assert_eq!(actor, before);
}

#[test]
fn missing_compendium_entry_fails_fast() {
    let mut actor = stored_character(0.5);
    let before = actor.clone();
    let err: RulesError = MigrationRunner::with_builtin()
        .run(&mut actor, &MemoryCompendium::new())
        .unwrap_err()
        .into();
    assert!(matches!(
        err,
        RulesError::Migration(MigrationError::MissingCompendiumEntry { ref slug }) if slug == "toughness"
    ));
    assert_eq!(err.to_string(), "expected compendium entry 'toughness' not found");
    assert_eq!(actor, before);
}
