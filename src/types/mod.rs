mod actor;
mod condition;
mod crafting;
mod document;
mod error;
mod predicate;
mod report;
mod roll_options;
mod updates;
mod value;

pub use actor::{Actor, ActorType, Item, RollData};
pub use condition::{
    AlsoApplies, ConditionDuration, ConditionHud, ConditionModifier, ConditionReferences,
    ConditionSlug, ConditionSources, ConditionSystemSource, ConditionValueData, DocumentRef,
    HudImage, LinkedCondition, ValueSourceModifier,
};
pub use crafting::{CraftingEntryData, PreparedFormula};
pub use document::Document;
pub use error::{ResolutionError, ValidationError};
pub use predicate::{CompareOp, OptionValueExpr, Predicate, option, option_value};
pub use report::{HookRecord, Phase, PreparationReport, ValidationFailure};
pub use roll_options::RollOptions;
pub use updates::{ActorUpdates, UpdateCommand};
pub use value::Value;
