use serde_json::Value as Json;

use super::base::{Lifecycle, RuleElementBase};
use crate::{Actor, ValidationError};

/// Sets one roll option on the actor during active-effect application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollOption {
    pub option: String,
    pub value: bool,
}

impl RollOption {
    pub(crate) fn new(base: &mut RuleElementBase) -> Self {
        let option = match base.source().string("option") {
            Some(option) => option.to_owned(),
            None => {
                base.fail_validation(ValidationError::MissingField {
                    field: "option".into(),
                });
                String::new()
            }
        };

        let value = match base.data().value.clone() {
            Json::Null => true,
            Json::Bool(value) => value,
            _ => {
                base.fail_validation(ValidationError::InvalidField {
                    field: "value".into(),
                    reason: "expected a boolean".into(),
                });
                true
            }
        };

        Self { option, value }
    }
}

impl Lifecycle for RollOption {
    fn on_apply_active_effects(&self, _base: &RuleElementBase, actor: &mut Actor) {
        actor.roll_options.set(self.option.clone(), self.value);
    }
}
