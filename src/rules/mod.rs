mod active_effect_like;
mod adjust_description;
mod base;
mod crafting_entry;
mod element;
mod roll_option;
mod source;

pub use active_effect_like::{ActiveEffectLike, ChangeMode, ChangePhase};
pub use adjust_description::AdjustDescription;
pub use base::{RuleElementBase, resolve_formula};
pub use crafting_entry::{CRAFTING_ENTRY_PRIORITY, CraftingEntry};
pub use element::{RuleElement, RuleElementKind};
pub use roll_option::RollOption;
pub use source::{RuleElementData, RuleElementSource};
