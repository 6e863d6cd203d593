use std::fmt;
use std::time::Duration;

use super::error::ValidationError;

/// Lifecycle phase a hook belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    BeforePrepareData,
    ApplyActiveEffects,
    AfterPrepareData,
    Create,
    Delete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::BeforePrepareData => "beforePrepareData",
            Phase::ApplyActiveEffects => "onApplyActiveEffects",
            Phase::AfterPrepareData => "afterPrepareData",
            Phase::Create => "onCreate",
            Phase::Delete => "onDelete",
        };
        f.write_str(name)
    }
}

/// One hook that passed its gate and ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookRecord {
    pub phase: Phase,
    pub key: String,
    pub label: String,
    pub item_id: String,
    pub priority: i32,
}

/// A rule element that was made inert while being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub item_id: String,
    pub key: String,
    pub error: ValidationError,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on item {}: {}", self.key, self.item_id, self.error)
    }
}

/// Diagnostics for one data-preparation pass, returned by
/// [`RuleEngine::prepare()`](crate::RuleEngine::prepare).
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct PreparationReport {
    executed: Vec<HookRecord>,
    failures: Vec<ValidationFailure>,
    duration: Duration,
}

impl PreparationReport {
    pub(crate) fn new(
        executed: Vec<HookRecord>,
        failures: Vec<ValidationFailure>,
        duration: Duration,
    ) -> Self {
        Self {
            executed,
            failures,
            duration,
        }
    }

    /// Hooks that ran, in execution order.
    #[must_use]
    pub fn executed(&self) -> &[HookRecord] {
        &self.executed
    }

    /// Hooks of one phase that ran, in execution order.
    pub fn executed_in(&self, phase: Phase) -> impl Iterator<Item = &HookRecord> {
        self.executed.iter().filter(move |r| r.phase == phase)
    }

    /// Rule elements that failed validation, for content-authoring warnings.
    #[must_use]
    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    /// Wall-clock duration of the pass.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for PreparationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ran: Vec<String> = self
            .executed
            .iter()
            .map(|r| format!("{}:{}", r.phase, r.key))
            .collect();
        write!(f, "executed: [{}]", ran.join(", "))?;
        write!(f, ", failures: {}", self.failures.len())?;
        write!(f, ", duration: {:?}", self.duration)?;
        Ok(())
    }
}
