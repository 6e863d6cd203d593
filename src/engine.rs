use std::time::Instant;

use crate::rules::{RuleElement, RuleElementSource};
use crate::{
    Actor, ActorUpdates, HookRecord, Item, Phase, PreparationReport, RulesConfig, RulesError,
    ValidationFailure,
};

const PREPARATION_PHASES: [Phase; 3] = [
    Phase::BeforePrepareData,
    Phase::ApplyActiveEffects,
    Phase::AfterPrepareData,
];

/// Runs rule element lifecycles against actors.
///
/// The engine holds only configuration, so one instance can be shared
/// behind `Arc` and used from several threads at once.
///
/// # Example
///
/// ```
/// use rulebinder::{Actor, ActorType, Item, RuleEngine};
/// use serde_json::json;
///
/// let actor = Actor::new("a1", "Ezren", ActorType::Character).with_item(
///     Item::new("f1", "Mountain Stance", "action")
///         .with_rule(json!({"key": "RollOption", "option": "stance:mountain"})),
/// );
///
/// let prepared = RuleEngine::default().prepare(&actor);
/// assert!(prepared.actor().roll_options.is_active("stance:mountain"));
/// assert!(!actor.roll_options.is_active("stance:mountain"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    config: RulesConfig,
}

/// The outcome of one preparation pass.
#[derive(Debug, Clone)]
#[must_use]
pub struct PreparedActor {
    actor: Actor,
    report: PreparationReport,
}

impl PreparedActor {
    /// The derived actor.
    #[must_use]
    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn report(&self) -> &PreparationReport {
        &self.report
    }

    #[must_use]
    pub fn into_actor(self) -> Actor {
        self.actor
    }

    pub fn into_parts(self) -> (Actor, PreparationReport) {
        (self.actor, self.report)
    }
}

impl RuleEngine {
    #[must_use]
    pub fn new(config: RulesConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    /// Build every rule element declared on the actor's items, in run order.
    #[must_use]
    pub fn instantiate(&self, actor: &Actor) -> Vec<RuleElement> {
        let mut elements = Vec::new();
        let mut declaration = 0;
        for (index, item) in actor.items.iter().enumerate() {
            self.push_item_elements(actor, index, item, &mut declaration, &mut elements);
        }
        sort_for_run(&mut elements);
        elements
    }

    fn push_item_elements(
        &self,
        actor: &Actor,
        index: usize,
        item: &Item,
        declaration: &mut usize,
        out: &mut Vec<RuleElement>,
    ) {
        for source in item.rule_sources() {
            out.push(self.build(source, actor, index, *declaration));
            *declaration += 1;
        }
    }

    fn build(
        &self,
        source: RuleElementSource,
        actor: &Actor,
        index: usize,
        declaration: usize,
    ) -> RuleElement {
        RuleElement::from_source(source, actor, index, declaration, &self.config)
    }

    /// Elements of one item only, numbered as they would be in a full pass.
    fn instantiate_item(&self, actor: &Actor, index: usize) -> Vec<RuleElement> {
        let mut declaration = actor.items[..index]
            .iter()
            .map(|item| item.rule_sources().len())
            .sum();
        let mut elements = Vec::new();
        if let Some(item) = actor.items.get(index) {
            self.push_item_elements(actor, index, item, &mut declaration, &mut elements);
        }
        sort_for_run(&mut elements);
        elements
    }

    /// Derive prepared data for `source`.
    ///
    /// The source actor is cloned and never mutated, so every pass starts
    /// from the same stored data. Conditions in effect contribute their roll
    /// options first; then each preparation phase runs over every element in
    /// priority order.
    pub fn prepare(&self, source: &Actor) -> PreparedActor {
        let start = Instant::now();
        let mut actor = source.clone();
        seed_condition_options(&mut actor);

        let elements = self.instantiate(&actor);
        let failures: Vec<ValidationFailure> = elements
            .iter()
            .filter_map(|el| {
                el.base().failure().map(|error| ValidationFailure {
                    item_id: el.base().item_id().to_owned(),
                    key: el.key().to_owned(),
                    error: error.clone(),
                })
            })
            .collect();

        let mut executed = Vec::new();
        for phase in PREPARATION_PHASES {
            for element in &elements {
                if element.run_phase(phase, &mut actor) {
                    executed.push(record(phase, element));
                }
            }
        }

        tracing::debug!(
            actor = %actor.id,
            elements = elements.len(),
            hooks = executed.len(),
            failures = failures.len(),
            "prepared actor"
        );

        PreparedActor {
            actor,
            report: PreparationReport::new(executed, failures, start.elapsed()),
        }
    }

    /// Add `item` to the actor and run its elements' creation hooks.
    ///
    /// The collected updates are applied to `actor.system` as one batch and
    /// returned for the host to persist.
    pub fn create_item(&self, actor: &mut Actor, item: Item) -> ActorUpdates {
        actor.items.push(item);
        let index = actor.items.len() - 1;

        let mut updates = ActorUpdates::new();
        for element in self.instantiate_item(actor, index) {
            element.on_create(actor, &mut updates);
        }
        updates.apply_to(&mut actor.system);

        tracing::debug!(
            actor = %actor.id,
            item = %actor.items[index].id,
            updates = updates.len(),
            "item created"
        );
        updates
    }

    /// Run the deletion hooks of item `id`, then remove it from the actor.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::ItemNotFound`] when the actor has no such item.
    pub fn delete_item(&self, actor: &mut Actor, id: &str) -> Result<ActorUpdates, RulesError> {
        let index = actor
            .item_index(id)
            .ok_or_else(|| RulesError::ItemNotFound { id: id.to_owned() })?;

        let mut updates = ActorUpdates::new();
        for element in self.instantiate_item(actor, index) {
            element.on_delete(actor, &mut updates);
        }
        actor.items.remove(index);
        updates.apply_to(&mut actor.system);

        tracing::debug!(actor = %actor.id, item = %id, updates = updates.len(), "item deleted");
        Ok(updates)
    }
}

fn sort_for_run(elements: &mut [RuleElement]) {
    elements.sort_by_key(RuleElement::sort_key);
}

fn record(phase: Phase, element: &RuleElement) -> HookRecord {
    HookRecord {
        phase,
        key: element.key().to_owned(),
        label: element.label().to_owned(),
        item_id: element.base().item_id().to_owned(),
        priority: element.priority(),
    }
}

fn seed_condition_options(actor: &mut Actor) {
    let options: Vec<String> = actor
        .items
        .iter()
        .filter_map(Item::condition)
        .flat_map(|condition| condition.roll_options())
        .collect();
    for option in options {
        actor.roll_options.set(option, true);
    }
}
