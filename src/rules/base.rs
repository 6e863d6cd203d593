use serde_json::Value as Json;

use super::source::{RuleElementData, RuleElementSource};
use crate::parse::{nesting_depth, parse_formula};
use crate::{Actor, ActorUpdates, ResolutionError, RollData, RollOptions, ValidationError, Value};

/// State every rule element carries: its narrowed data, where it was
/// declared, and whether it is still valid.
#[derive(Debug, Clone)]
pub struct RuleElementBase {
    data: RuleElementData,
    source: RuleElementSource,
    item_index: usize,
    item_id: String,
    declaration: usize,
    max_formula_depth: usize,
    failure: Option<ValidationError>,
}

impl RuleElementBase {
    pub(crate) fn new(
        data: RuleElementData,
        source: RuleElementSource,
        item_index: usize,
        item_id: String,
        declaration: usize,
        max_formula_depth: usize,
    ) -> Self {
        Self {
            data,
            source,
            item_index,
            item_id,
            declaration,
            max_formula_depth,
            failure: None,
        }
    }

    #[must_use]
    pub fn data(&self) -> &RuleElementData {
        &self.data
    }

    /// The raw source, for variant-specific fields.
    #[must_use]
    pub fn source(&self) -> &RuleElementSource {
        &self.source
    }

    #[must_use]
    pub fn item_index(&self) -> usize {
        self.item_index
    }

    #[must_use]
    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    /// Position among all elements of the actor, in item then rule order.
    #[must_use]
    pub fn declaration(&self) -> usize {
        self.declaration
    }

    pub(crate) fn set_priority(&mut self, priority: i32) {
        self.data.priority = priority;
    }

    pub(crate) fn ignore(&mut self) {
        self.data.ignored = true;
    }

    /// Mark the element inert for the rest of its life. The first reason wins.
    pub fn fail_validation(&mut self, error: ValidationError) {
        tracing::warn!(
            key = %self.data.key,
            item = %self.item_id,
            error = %error,
            "rule element failed validation"
        );
        if self.failure.is_none() {
            self.failure = Some(error);
        }
    }

    #[must_use]
    pub fn failure(&self) -> Option<&ValidationError> {
        self.failure.as_ref()
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.failure.is_none()
    }

    /// Whether the predicate holds. No predicate means always.
    #[must_use]
    pub fn test(&self, options: &RollOptions) -> bool {
        self.data
            .predicate
            .as_ref()
            .map_or(true, |p| p.test(options))
    }

    /// The gate every hook passes through.
    #[must_use]
    pub fn is_active(&self, actor: &Actor) -> bool {
        !self.data.ignored && self.is_valid() && self.test(&actor.roll_options)
    }

    /// Roll data scoped to this element's owning item.
    #[must_use]
    pub fn roll_data<'a>(&self, actor: &'a Actor) -> RollData<'a> {
        actor.roll_data(Some(self.item_index))
    }

    /// Interpret a raw configured value.
    ///
    /// Numbers and booleans are literals. Strings are evaluated as formulas
    /// against `data`; when that fails the string comes back unresolved.
    /// Null, arrays and objects have no scalar value.
    #[must_use]
    pub fn resolve_value(&self, raw: &Json, data: &RollData<'_>) -> Option<Value> {
        match raw {
            Json::String(text) => match resolve_formula(text, data, self.max_formula_depth) {
                Ok(value) => Some(value),
                Err(err) => {
                    if text.contains('@') {
                        tracing::warn!(
                            key = %self.data.key,
                            item = %self.item_id,
                            formula = %text,
                            error = %err,
                            "formula left unresolved"
                        );
                    }
                    Some(Value::String(text.clone()))
                }
            },
            other => Value::from_json(other),
        }
    }
}

/// Parse and evaluate a formula string.
///
/// # Errors
///
/// Returns [`ResolutionError`] when the text is not a formula, nests deeper
/// than `max_depth`, or fails to evaluate.
pub fn resolve_formula(
    text: &str,
    data: &RollData<'_>,
    max_depth: usize,
) -> Result<Value, ResolutionError> {
    if nesting_depth(text) > max_depth {
        return Err(ResolutionError::TooDeep { limit: max_depth });
    }
    let formula = parse_formula(text).map_err(|e| ResolutionError::Parse {
        formula: text.to_owned(),
        message: e.to_string(),
    })?;
    formula.evaluate(data).map(Value::from_number)
}

/// Variant behaviour at each lifecycle point. Every method defaults to a
/// no-op; the caller has already checked [`RuleElementBase::is_active`].
pub(crate) trait Lifecycle {
    fn before_prepare_data(&self, _base: &RuleElementBase, _actor: &mut Actor) {}

    fn on_apply_active_effects(&self, _base: &RuleElementBase, _actor: &mut Actor) {}

    fn after_prepare_data(&self, _base: &RuleElementBase, _actor: &mut Actor) {}

    fn on_create(&self, _base: &RuleElementBase, _actor: &Actor, _updates: &mut ActorUpdates) {}

    fn on_delete(&self, _base: &RuleElementBase, _actor: &Actor, _updates: &mut ActorUpdates) {}
}
