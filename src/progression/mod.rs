//! Data behind the character build screens: the per-level skill matrix and
//! lore creation.

mod lore;
mod skill_matrix;

pub use lore::{Ability, lore_update};
pub use skill_matrix::{
    LevelTraining, MAX_LEVEL, ProficiencyRank, Skill, SkillBuild, SkillCell, skill_matrix,
};
