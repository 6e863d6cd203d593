use super::base::{Lifecycle, RuleElementBase};
use crate::Actor;

/// Appends to, or replaces, the owning item's description before data
/// preparation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustDescription {
    pub replace: bool,
}

impl AdjustDescription {
    pub(crate) fn new(base: &mut RuleElementBase) -> Self {
        Self {
            replace: base.source().bool("replace").unwrap_or(false),
        }
    }
}

impl Lifecycle for AdjustDescription {
    fn before_prepare_data(&self, base: &RuleElementBase, actor: &mut Actor) {
        let text = base
            .resolve_value(&base.data().value, &base.roll_data(actor))
            .map(|v| v.to_plain_string())
            .unwrap_or_default();

        let Some(item) = actor.items.get_mut(base.item_index()) else {
            return;
        };
        if self.replace {
            item.set_description(text);
        } else {
            let appended = format!("{}{text}", item.description());
            item.set_description(appended);
        }
    }
}
