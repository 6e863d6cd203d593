use super::active_effect_like::ActiveEffectLike;
use super::adjust_description::AdjustDescription;
use super::base::{Lifecycle, RuleElementBase};
use super::crafting_entry::CraftingEntry;
use super::roll_option::RollOption;
use super::source::{RuleElementData, RuleElementSource};
use crate::{Actor, ActorUpdates, Phase, RulesConfig, ValidationError};

/// The closed set of rule element behaviours, selected by `key`.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleElementKind {
    AdjustDescription(AdjustDescription),
    CraftingEntry(CraftingEntry),
    RollOption(RollOption),
    ActiveEffectLike(ActiveEffectLike),
    /// A key this crate does not implement. Always inert.
    Unknown,
}

impl RuleElementKind {
    fn behaviour(&self) -> Option<&dyn Lifecycle> {
        match self {
            RuleElementKind::AdjustDescription(v) => Some(v),
            RuleElementKind::CraftingEntry(v) => Some(v),
            RuleElementKind::RollOption(v) => Some(v),
            RuleElementKind::ActiveEffectLike(v) => Some(v),
            RuleElementKind::Unknown => None,
        }
    }
}

/// One instantiated rule element: shared state plus its variant.
#[derive(Debug, Clone)]
pub struct RuleElement {
    base: RuleElementBase,
    kind: RuleElementKind,
}

impl RuleElement {
    /// Build an element from raw source declared on `actor.items[item_index]`.
    ///
    /// Never fails: any problem is recorded on the element, which then stays
    /// inert for its whole life.
    #[must_use]
    pub fn from_source(
        source: RuleElementSource,
        actor: &Actor,
        item_index: usize,
        declaration: usize,
        config: &RulesConfig,
    ) -> Self {
        let (item_id, item_name) = actor
            .items
            .get(item_index)
            .map(|item| (item.id.clone(), item.name.as_str()))
            .unwrap_or_default();

        let (data, problems) = RuleElementData::narrow(&source, item_name, config.default_priority);
        let mut base = RuleElementBase::new(
            data,
            source,
            item_index,
            item_id,
            declaration,
            config.max_formula_depth,
        );
        for problem in problems {
            base.fail_validation(problem);
        }

        let key = base.data().key.clone();
        if config.is_disabled(&key) {
            base.ignore();
        }

        let kind = match key.as_str() {
            "AdjustDescription" => RuleElementKind::AdjustDescription(AdjustDescription::new(&mut base)),
            "CraftingEntry" => {
                RuleElementKind::CraftingEntry(CraftingEntry::new(&mut base, actor.actor_type))
            }
            "RollOption" => RuleElementKind::RollOption(RollOption::new(&mut base)),
            "ActiveEffectLike" => RuleElementKind::ActiveEffectLike(ActiveEffectLike::new(&mut base)),
            "" => RuleElementKind::Unknown,
            _ => {
                base.fail_validation(ValidationError::UnknownKey { key });
                RuleElementKind::Unknown
            }
        };

        Self { base, kind }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.base.data().key
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.base.data().label
    }

    #[must_use]
    pub fn priority(&self) -> i32 {
        self.base.data().priority
    }

    #[must_use]
    pub fn base(&self) -> &RuleElementBase {
        &self.base
    }

    #[must_use]
    pub fn kind(&self) -> &RuleElementKind {
        &self.kind
    }

    /// Run order: priority ascending, then declaration order.
    #[must_use]
    pub fn sort_key(&self) -> (i32, usize) {
        (self.priority(), self.base.declaration())
    }

    fn gate(&self, phase: Phase, actor: &Actor) -> Option<&dyn Lifecycle> {
        if !self.base.is_active(actor) {
            return None;
        }
        tracing::debug!(
            phase = %phase,
            key = %self.key(),
            item = %self.base.item_id(),
            priority = self.priority(),
            "running rule element hook"
        );
        self.kind.behaviour()
    }

    /// Returns whether the hook passed its gate and ran. The same holds for
    /// every hook below.
    pub fn before_prepare_data(&self, actor: &mut Actor) -> bool {
        let Some(hooks) = self.gate(Phase::BeforePrepareData, actor) else {
            return false;
        };
        hooks.before_prepare_data(&self.base, actor);
        true
    }

    pub fn on_apply_active_effects(&self, actor: &mut Actor) -> bool {
        let Some(hooks) = self.gate(Phase::ApplyActiveEffects, actor) else {
            return false;
        };
        hooks.on_apply_active_effects(&self.base, actor);
        true
    }

    pub fn after_prepare_data(&self, actor: &mut Actor) -> bool {
        let Some(hooks) = self.gate(Phase::AfterPrepareData, actor) else {
            return false;
        };
        hooks.after_prepare_data(&self.base, actor);
        true
    }

    pub fn on_create(&self, actor: &Actor, updates: &mut ActorUpdates) -> bool {
        let Some(hooks) = self.gate(Phase::Create, actor) else {
            return false;
        };
        hooks.on_create(&self.base, actor, updates);
        true
    }

    pub fn on_delete(&self, actor: &Actor, updates: &mut ActorUpdates) -> bool {
        let Some(hooks) = self.gate(Phase::Delete, actor) else {
            return false;
        };
        hooks.on_delete(&self.base, actor, updates);
        true
    }

    /// Dispatch one of the three preparation hooks.
    pub fn run_phase(&self, phase: Phase, actor: &mut Actor) -> bool {
        match phase {
            Phase::BeforePrepareData => self.before_prepare_data(actor),
            Phase::ApplyActiveEffects => self.on_apply_active_effects(actor),
            Phase::AfterPrepareData => self.after_prepare_data(actor),
            Phase::Create | Phase::Delete => false,
        }
    }
}
