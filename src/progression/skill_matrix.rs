use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Actor;

/// Highest character level the matrix covers.
pub const MAX_LEVEL: u8 = 20;

/// The sixteen core skills, in sheet order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skill {
    Acr,
    Arc,
    Ath,
    Cra,
    Dec,
    Dip,
    Itm,
    Med,
    Nat,
    Occ,
    Prf,
    Rel,
    Soc,
    Ste,
    Sur,
    Thi,
}

impl Skill {
    pub const ALL: [Skill; 16] = [
        Skill::Acr,
        Skill::Arc,
        Skill::Ath,
        Skill::Cra,
        Skill::Dec,
        Skill::Dip,
        Skill::Itm,
        Skill::Med,
        Skill::Nat,
        Skill::Occ,
        Skill::Prf,
        Skill::Rel,
        Skill::Soc,
        Skill::Ste,
        Skill::Sur,
        Skill::Thi,
    ];

    #[must_use]
    pub fn abbreviation(self) -> &'static str {
        match self {
            Skill::Acr => "acr",
            Skill::Arc => "arc",
            Skill::Ath => "ath",
            Skill::Cra => "cra",
            Skill::Dec => "dec",
            Skill::Dip => "dip",
            Skill::Itm => "itm",
            Skill::Med => "med",
            Skill::Nat => "nat",
            Skill::Occ => "occ",
            Skill::Prf => "prf",
            Skill::Rel => "rel",
            Skill::Soc => "soc",
            Skill::Ste => "ste",
            Skill::Sur => "sur",
            Skill::Thi => "thi",
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Proficiency in a skill, ordered from untrained to legendary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProficiencyRank {
    #[default]
    Untrained,
    Trained,
    Expert,
    Master,
    Legendary,
}

impl ProficiencyRank {
    /// The next rank up, capped at legendary.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            ProficiencyRank::Untrained => ProficiencyRank::Trained,
            ProficiencyRank::Trained => ProficiencyRank::Expert,
            ProficiencyRank::Expert => ProficiencyRank::Master,
            ProficiencyRank::Master | ProficiencyRank::Legendary => ProficiencyRank::Legendary,
        }
    }

    /// Lowest character level at which a skill at this rank may be increased.
    #[must_use]
    pub fn increase_level(self) -> Option<u8> {
        match self {
            ProficiencyRank::Untrained => Some(0),
            ProficiencyRank::Trained => Some(2),
            ProficiencyRank::Expert => Some(7),
            ProficiencyRank::Master => Some(15),
            ProficiencyRank::Legendary => None,
        }
    }

    #[must_use]
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ProficiencyRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProficiencyRank::Untrained => "Untrained",
            ProficiencyRank::Trained => "Trained",
            ProficiencyRank::Expert => "Expert",
            ProficiencyRank::Master => "Master",
            ProficiencyRank::Legendary => "Legendary",
        };
        f.write_str(name)
    }
}

/// A character's planned skill choices, stored under `build.skills`.
/// Levels missing from a map count as no choices and no allowance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillBuild {
    pub manual: bool,
    pub skill_training: BTreeMap<u8, Vec<Skill>>,
    pub skill_increases: BTreeMap<u8, Vec<Skill>>,
    pub allowed_training: BTreeMap<u8, i64>,
    pub allowed_increases: BTreeMap<u8, i64>,
}

impl SkillBuild {
    /// Read the build stored on a character. Absent or malformed builds
    /// yield `None`.
    #[must_use]
    pub fn from_actor(actor: &Actor) -> Option<Self> {
        let raw = actor.system.get("build.skills")?;
        match serde_json::from_value(raw.clone()) {
            Ok(build) => Some(build),
            Err(err) => {
                tracing::debug!(actor = %actor.id, error = %err, "skipping malformed skill build");
                None
            }
        }
    }

    fn trained_at(&self, level: u8, skill: Skill) -> bool {
        self.skill_training
            .get(&level)
            .is_some_and(|skills| skills.contains(&skill))
    }

    fn increased_at(&self, level: u8, skill: Skill) -> bool {
        self.skill_increases
            .get(&level)
            .is_some_and(|skills| skills.contains(&skill))
    }

    fn count(map: &BTreeMap<u8, Vec<Skill>>, level: u8) -> i64 {
        map.get(&level)
            .map_or(0, |skills| i64::try_from(skills.len()).unwrap_or(i64::MAX))
    }
}

/// One skill at one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillCell {
    pub skill: Skill,
    pub rank: ProficiencyRank,
    pub trained: bool,
    pub increased: bool,
    pub can_be_trained: bool,
    pub can_be_increased: bool,
}

/// All skills at one level, with the level's remaining allowances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelTraining {
    pub level: u8,
    pub allowed_training: i64,
    pub allowed_increases: i64,
    pub remaining_training: i64,
    pub remaining_increases: i64,
    pub eligible: bool,
    pub skills: Vec<SkillCell>,
}

impl LevelTraining {
    #[must_use]
    pub fn cell(&self, skill: Skill) -> Option<&SkillCell> {
        self.skills.iter().find(|c| c.skill == skill)
    }
}

/// Walk levels 0 through 20, carrying each skill's rank forward.
///
/// Training only takes an untrained skill to trained. An increase raises a
/// skill by one rank up to legendary. Choices that do not apply leave the
/// rank unchanged.
#[must_use]
pub fn skill_matrix(build: &SkillBuild) -> Vec<LevelTraining> {
    let mut previous = [ProficiencyRank::Untrained; 16];
    let mut levels = Vec::with_capacity(usize::from(MAX_LEVEL) + 1);

    for level in 0..=MAX_LEVEL {
        let skills: Vec<SkillCell> = Skill::ALL
            .iter()
            .zip(previous.iter_mut())
            .map(|(&skill, prev)| {
                let trained = build.trained_at(level, skill);
                let increased = build.increased_at(level, skill);
                let before = *prev;
                let rank = if trained && before == ProficiencyRank::Untrained {
                    ProficiencyRank::Trained
                } else if increased && before < ProficiencyRank::Legendary {
                    before.next()
                } else {
                    before
                };
                *prev = rank;
                SkillCell {
                    skill,
                    rank,
                    trained,
                    increased,
                    can_be_trained: before == ProficiencyRank::Untrained,
                    can_be_increased: before.increase_level().is_some_and(|min| level >= min),
                }
            })
            .collect();

        let allowed_training = build.allowed_training.get(&level).copied().unwrap_or(0);
        let allowed_increases = build.allowed_increases.get(&level).copied().unwrap_or(0);
        levels.push(LevelTraining {
            level,
            allowed_training,
            allowed_increases,
            remaining_training: allowed_training - SkillBuild::count(&build.skill_training, level),
            remaining_increases: allowed_increases
                - SkillBuild::count(&build.skill_increases, level),
            eligible: allowed_training > 0 || allowed_increases > 0,
            skills,
        });
    }
    levels
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ActorType;

    fn build(value: serde_json::Value) -> SkillBuild {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn covers_every_level_and_skill() {
        let matrix = skill_matrix(&SkillBuild::default());
        assert_eq!(matrix.len(), 21);
        assert!(matrix.iter().all(|l| l.skills.len() == 16));
        assert!(matrix.iter().all(|l| !l.eligible));
        let cell = matrix[0].cell(Skill::Ath).unwrap();
        assert_eq!(cell.rank, ProficiencyRank::Untrained);
        assert!(cell.can_be_trained);
        assert!(cell.can_be_increased);
    }

    #[test]
    fn training_then_increases() {
        let b = build(json!({
            "skillTraining": {"1": ["ath", "cra"]},
            "skillIncreases": {"3": ["ath"], "7": ["ath"], "15": ["ath"], "16": ["ath"]},
            "allowedTraining": {"1": 3},
            "allowedIncreases": {"3": 1}
        }));
        let matrix = skill_matrix(&b);
        let rank = |level: usize, skill| matrix[level].cell(skill).unwrap().rank;

        assert_eq!(rank(0, Skill::Ath), ProficiencyRank::Untrained);
        assert_eq!(rank(1, Skill::Ath), ProficiencyRank::Trained);
        assert_eq!(rank(2, Skill::Ath), ProficiencyRank::Trained);
        assert_eq!(rank(3, Skill::Ath), ProficiencyRank::Expert);
        assert_eq!(rank(7, Skill::Ath), ProficiencyRank::Master);
        assert_eq!(rank(15, Skill::Ath), ProficiencyRank::Legendary);
        assert_eq!(rank(16, Skill::Ath), ProficiencyRank::Legendary);
        assert_eq!(rank(20, Skill::Cra), ProficiencyRank::Trained);

        assert_eq!(matrix[1].remaining_training, 1);
        assert_eq!(matrix[3].remaining_increases, 0);
        assert!(matrix[1].eligible);
        assert!(!matrix[2].eligible);
    }

    #[test]
    fn training_an_already_trained_skill_does_nothing() {
        let b = build(json!({"skillTraining": {"1": ["arc"], "2": ["arc"]}}));
        let matrix = skill_matrix(&b);
        let cell = matrix[2].cell(Skill::Arc).unwrap();
        assert_eq!(cell.rank, ProficiencyRank::Trained);
        assert!(cell.trained);
        assert!(!cell.can_be_trained);
    }

    #[test]
    fn increase_thresholds_follow_rank() {
        let b = build(json!({"skillTraining": {"0": ["med"]}, "skillIncreases": {"2": ["med"]}}));
        let matrix = skill_matrix(&b);
        assert!(!matrix[1].cell(Skill::Med).unwrap().can_be_increased);
        assert!(matrix[2].cell(Skill::Med).unwrap().can_be_increased);
        // expert from level 2 on; master needs level 7
        assert!(!matrix[6].cell(Skill::Med).unwrap().can_be_increased);
        assert!(matrix[7].cell(Skill::Med).unwrap().can_be_increased);
    }

    #[test]
    fn reads_build_from_actor() {
        let actor = Actor::new("a", "A", ActorType::Character)
            .with_system("build.skills", json!({"manual": true, "allowedTraining": {"1": 2}}));
        let b = SkillBuild::from_actor(&actor).unwrap();
        assert!(b.manual);
        assert_eq!(b.allowed_training.get(&1), Some(&2));

        let bare = Actor::new("a", "A", ActorType::Character);
        assert!(SkillBuild::from_actor(&bare).is_none());
    }

    #[test]
    fn rank_ordering_and_labels() {
        assert!(ProficiencyRank::Untrained < ProficiencyRank::Legendary);
        assert_eq!(ProficiencyRank::Master.as_u8(), 3);
        assert_eq!(ProficiencyRank::Legendary.next(), ProficiencyRank::Legendary);
        assert_eq!(ProficiencyRank::Expert.to_string(), "Expert");
        assert_eq!(Skill::Itm.to_string(), "itm");
    }
}
