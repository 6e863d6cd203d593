use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of condition slugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionSlug {
    Blinded,
    Broken,
    Clumsy,
    Concealed,
    Confused,
    Controlled,
    Dazzled,
    Deafened,
    Doomed,
    Drained,
    Dying,
    Encumbered,
    Enfeebled,
    Fascinated,
    Fatigued,
    FlatFooted,
    Fleeing,
    Friendly,
    Frightened,
    Grabbed,
    Helpful,
    Hidden,
    Hostile,
    Immobilized,
    Indifferent,
    Invisible,
    Observed,
    Paralyzed,
    PersistentDamage,
    Petrified,
    Prone,
    Quickened,
    Restrained,
    Sickened,
    Slowed,
    Stunned,
    Stupefied,
    Unconscious,
    Undetected,
    Unfriendly,
    Unnoticed,
    Wounded,
}

impl ConditionSlug {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ConditionSlug::Blinded => "blinded",
            ConditionSlug::Broken => "broken",
            ConditionSlug::Clumsy => "clumsy",
            ConditionSlug::Concealed => "concealed",
            ConditionSlug::Confused => "confused",
            ConditionSlug::Controlled => "controlled",
            ConditionSlug::Dazzled => "dazzled",
            ConditionSlug::Deafened => "deafened",
            ConditionSlug::Doomed => "doomed",
            ConditionSlug::Drained => "drained",
            ConditionSlug::Dying => "dying",
            ConditionSlug::Encumbered => "encumbered",
            ConditionSlug::Enfeebled => "enfeebled",
            ConditionSlug::Fascinated => "fascinated",
            ConditionSlug::Fatigued => "fatigued",
            ConditionSlug::FlatFooted => "flat-footed",
            ConditionSlug::Fleeing => "fleeing",
            ConditionSlug::Friendly => "friendly",
            ConditionSlug::Frightened => "frightened",
            ConditionSlug::Grabbed => "grabbed",
            ConditionSlug::Helpful => "helpful",
            ConditionSlug::Hidden => "hidden",
            ConditionSlug::Hostile => "hostile",
            ConditionSlug::Immobilized => "immobilized",
            ConditionSlug::Indifferent => "indifferent",
            ConditionSlug::Invisible => "invisible",
            ConditionSlug::Observed => "observed",
            ConditionSlug::Paralyzed => "paralyzed",
            ConditionSlug::PersistentDamage => "persistent-damage",
            ConditionSlug::Petrified => "petrified",
            ConditionSlug::Prone => "prone",
            ConditionSlug::Quickened => "quickened",
            ConditionSlug::Restrained => "restrained",
            ConditionSlug::Sickened => "sickened",
            ConditionSlug::Slowed => "slowed",
            ConditionSlug::Stunned => "stunned",
            ConditionSlug::Stupefied => "stupefied",
            ConditionSlug::Unconscious => "unconscious",
            ConditionSlug::Undetected => "undetected",
            ConditionSlug::Unfriendly => "unfriendly",
            ConditionSlug::Unnoticed => "unnoticed",
            ConditionSlug::Wounded => "wounded",
        }
    }
}

impl fmt::Display for ConditionSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// System data of a condition item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionSystemSource {
    pub slug: ConditionSlug,
    #[serde(default = "yes")]
    pub active: bool,
    #[serde(default = "yes")]
    pub removable: bool,
    #[serde(default)]
    pub references: ConditionReferences,
    #[serde(default)]
    pub hud: ConditionHud,
    #[serde(default)]
    pub duration: ConditionDuration,
    #[serde(default)]
    pub modifiers: Vec<ConditionModifier>,
    #[serde(default)]
    pub base: Option<ConditionSlug>,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub value: ConditionValueData,
    #[serde(default)]
    pub sources: ConditionSources,
    #[serde(default)]
    pub also_applies: AlsoApplies,
    #[serde(default)]
    pub overrides: Vec<String>,
}

fn yes() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: String,
    #[serde(rename = "type")]
    pub ref_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionReferences {
    #[serde(default)]
    pub parent: Option<DocumentRef>,
    #[serde(default)]
    pub children: Vec<DocumentRef>,
    #[serde(default)]
    pub overridden_by: Vec<DocumentRef>,
    #[serde(default)]
    pub overrides: Vec<DocumentRef>,
    /// Conditions this one is immune from, and thereby inactive.
    #[serde(default)]
    pub immunity_from: Vec<DocumentRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionHud {
    #[serde(default)]
    pub status_name: String,
    #[serde(default)]
    pub img: HudImage,
    #[serde(default)]
    pub selectable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HudImage {
    #[serde(default)]
    pub use_status_name: bool,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionDuration {
    #[serde(default)]
    pub perpetual: bool,
    #[serde(default)]
    pub value: i64,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionModifier {
    #[serde(rename = "type")]
    pub modifier_type: String,
    pub name: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub value: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionValueData {
    #[serde(default)]
    pub is_valued: bool,
    #[serde(default)]
    pub immutable: bool,
    #[serde(default)]
    pub value: Option<i64>,
    #[serde(default)]
    pub modifiers: Vec<ValueSourceModifier>,
}

impl ConditionValueData {
    /// The numeric value, present only for valued conditions.
    #[must_use]
    pub fn get(&self) -> Option<i64> {
        if self.is_valued {
            self.value
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSourceModifier {
    pub value: i64,
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionSources {
    #[serde(default)]
    pub hud: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlsoApplies {
    #[serde(default)]
    pub linked: Vec<LinkedCondition>,
    #[serde(default)]
    pub unlinked: Vec<LinkedCondition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedCondition {
    pub condition: ConditionSlug,
    #[serde(default)]
    pub value: Option<i64>,
}

impl ConditionSystemSource {
    /// An active condition counts unless something it is immune from is listed.
    #[must_use]
    pub fn is_in_effect(&self) -> bool {
        self.active && self.references.immunity_from.is_empty()
    }

    /// Roll options this condition contributes while in effect:
    /// `self:condition:<slug>` and, for valued ones, `self:condition:<slug>:<n>`.
    #[must_use]
    pub fn roll_options(&self) -> Vec<String> {
        if !self.is_in_effect() {
            return Vec::new();
        }
        let base = format!("self:condition:{}", self.slug);
        match self.value.get() {
            Some(n) => vec![base.clone(), format!("{base}:{n}")],
            None => vec![base],
        }
    }
}
