use std::fmt;

use serde_json::Value as Json;

use super::base::{Lifecycle, RuleElementBase};
use crate::{Actor, ValidationError, Value};

/// How an active-effect-like change combines with the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeMode {
    Add,
    Subtract,
    Multiply,
    Upgrade,
    Downgrade,
    Override,
}

impl ChangeMode {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "add" => Some(ChangeMode::Add),
            "subtract" | "remove" => Some(ChangeMode::Subtract),
            "multiply" => Some(ChangeMode::Multiply),
            "upgrade" => Some(ChangeMode::Upgrade),
            "downgrade" => Some(ChangeMode::Downgrade),
            "override" => Some(ChangeMode::Override),
            _ => None,
        }
    }

    /// Combine `current` (missing counts as 0) with `change`. `None` when a
    /// numeric mode meets a non-numeric operand.
    #[must_use]
    pub fn apply(self, current: Option<&Json>, change: &Value) -> Option<Json> {
        if self == ChangeMode::Override {
            return Some(change.clone().into());
        }
        let current = match current {
            None | Some(Json::Null) => 0.0,
            Some(raw) => Value::from_json(raw)?.as_f64()?,
        };
        let change = change.as_f64()?;
        let next = match self {
            ChangeMode::Add => current + change,
            ChangeMode::Subtract => current - change,
            ChangeMode::Multiply => current * change,
            ChangeMode::Upgrade => current.max(change),
            ChangeMode::Downgrade => current.min(change),
            ChangeMode::Override => change,
        };
        Some(Value::from_number(next).into())
    }
}

impl fmt::Display for ChangeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChangeMode::Add => "add",
            ChangeMode::Subtract => "subtract",
            ChangeMode::Multiply => "multiply",
            ChangeMode::Upgrade => "upgrade",
            ChangeMode::Downgrade => "downgrade",
            ChangeMode::Override => "override",
        };
        f.write_str(name)
    }
}

/// Which preparation hook the change runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangePhase {
    BeforeDerived,
    #[default]
    ApplyActiveEffects,
    AfterDerived,
}

impl ChangePhase {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "beforeDerived" => Some(ChangePhase::BeforeDerived),
            "applyAEs" => Some(ChangePhase::ApplyActiveEffects),
            "afterDerived" => Some(ChangePhase::AfterDerived),
            _ => None,
        }
    }
}

/// Changes a value in the actor's system data, the way an active effect would.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveEffectLike {
    /// Dotted path relative to the actor's system data.
    pub path: String,
    pub mode: ChangeMode,
    pub phase: ChangePhase,
}

impl ActiveEffectLike {
    pub(crate) fn new(base: &mut RuleElementBase) -> Self {
        let source = base.source().clone();

        let path = match source.string("path") {
            Some(path) => path.strip_prefix("system.").unwrap_or(path).to_owned(),
            None => {
                base.fail_validation(ValidationError::MissingField {
                    field: "path".into(),
                });
                String::new()
            }
        };

        let mode = match source.string("mode") {
            Some(name) => ChangeMode::from_name(name).unwrap_or_else(|| {
                base.fail_validation(ValidationError::InvalidField {
                    field: "mode".into(),
                    reason: format!("unrecognized mode '{name}'"),
                });
                ChangeMode::Override
            }),
            None => {
                base.fail_validation(ValidationError::MissingField {
                    field: "mode".into(),
                });
                ChangeMode::Override
            }
        };

        let phase = match source.string("phase") {
            None => ChangePhase::default(),
            Some(name) => ChangePhase::from_name(name).unwrap_or_else(|| {
                base.fail_validation(ValidationError::InvalidField {
                    field: "phase".into(),
                    reason: format!("unrecognized phase '{name}'"),
                });
                ChangePhase::default()
            }),
        };

        Self { path, mode, phase }
    }

    fn apply(&self, base: &RuleElementBase, actor: &mut Actor) {
        let Some(change) = base.resolve_value(&base.data().value, &base.roll_data(actor)) else {
            tracing::warn!(key = %base.data().key, path = %self.path, "change has no value");
            return;
        };
        match self.mode.apply(actor.system.get(&self.path), &change) {
            Some(next) => actor.system.set(&self.path, next),
            None => tracing::warn!(
                path = %self.path,
                mode = %self.mode,
                value = %change,
                "non-numeric operand for numeric change"
            ),
        }
    }
}

impl Lifecycle for ActiveEffectLike {
    fn before_prepare_data(&self, base: &RuleElementBase, actor: &mut Actor) {
        if self.phase == ChangePhase::BeforeDerived {
            self.apply(base, actor);
        }
    }

    fn on_apply_active_effects(&self, base: &RuleElementBase, actor: &mut Actor) {
        if self.phase == ChangePhase::ApplyActiveEffects {
            self.apply(base, actor);
        }
    }

    fn after_prepare_data(&self, base: &RuleElementBase, actor: &mut Actor) {
        if self.phase == ChangePhase::AfterDerived {
            self.apply(base, actor);
        }
    }
}
