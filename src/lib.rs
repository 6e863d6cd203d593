mod config;
mod engine;
mod error;
pub mod migrations;
pub mod parse;
pub mod progression;
pub mod rules;
mod slug;
mod types;

pub use config::RulesConfig;
pub use engine::{PreparedActor, RuleEngine};
pub use error::RulesError;
pub use slug::sluggify;
pub use types::{
    Actor, ActorType, ActorUpdates, AlsoApplies, CompareOp, ConditionDuration, ConditionHud,
    ConditionModifier, ConditionReferences, ConditionSlug, ConditionSources,
    ConditionSystemSource, ConditionValueData, CraftingEntryData, Document, DocumentRef,
    HookRecord, HudImage, Item, LinkedCondition, OptionValueExpr, Phase, PreparationReport,
    PreparedFormula, Predicate, ResolutionError, RollData, RollOptions, UpdateCommand,
    ValidationError, ValidationFailure, Value, ValueSourceModifier, option, option_value,
};
