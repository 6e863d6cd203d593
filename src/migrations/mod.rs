//! Versioned fixes to stored actor data.
//!
//! Each [`Migration`] carries the schema version it brings an actor up to.
//! [`MigrationRunner`] applies the ones newer than the actor's
//! `schema.version`, oldest first, and stops at the first failure.

mod toughness;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::{Actor, Item};

pub use toughness::ToughnessMountainsStoutness;

/// A migration that cannot complete. Fatal to the run that raised it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrationError {
    #[error("expected compendium entry '{slug}' not found")]
    MissingCompendiumEntry { slug: String },
}

/// Read access to canonical item data.
pub trait Compendium {
    /// The canonical feat with this slug.
    fn feat(&self, slug: &str) -> Option<Item>;
}

/// A compendium held in memory, keyed by slug.
#[derive(Debug, Clone, Default)]
pub struct MemoryCompendium {
    feats: BTreeMap<String, Item>,
}

impl MemoryCompendium {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a feat under its `system.slug`. Feats without a slug are skipped.
    #[must_use]
    pub fn with_feat(mut self, item: Item) -> Self {
        if let Some(slug) = item.slug() {
            self.feats.insert(slug.to_owned(), item);
        }
        self
    }
}

impl Compendium for MemoryCompendium {
    fn feat(&self, slug: &str) -> Option<Item> {
        self.feats.get(slug).cloned()
    }
}

pub trait Migration: Send + Sync {
    /// Schema version an actor reaches once this migration has run.
    fn version(&self) -> f64;

    /// Rewrite one actor's stored data in place.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError`] when the migration cannot be completed.
    fn update_actor(
        &self,
        actor: &mut Actor,
        compendium: &dyn Compendium,
    ) -> Result<(), MigrationError>;
}

/// Applies pending migrations in version order.
#[derive(Default)]
pub struct MigrationRunner {
    migrations: Vec<Box<dyn Migration>>,
}

impl std::fmt::Debug for MigrationRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let versions: Vec<f64> = self.migrations.iter().map(|m| m.version()).collect();
        f.debug_struct("MigrationRunner")
            .field("versions", &versions)
            .finish()
    }
}

impl MigrationRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A runner loaded with every migration this crate ships.
    #[must_use]
    pub fn with_builtin() -> Self {
        Self::new().with(ToughnessMountainsStoutness)
    }

    #[must_use]
    pub fn with(mut self, migration: impl Migration + 'static) -> Self {
        self.migrations.push(Box::new(migration));
        self.migrations
            .sort_by(|a, b| a.version().total_cmp(&b.version()));
        self
    }

    /// The newest version any registered migration reaches.
    #[must_use]
    pub fn latest_version(&self) -> Option<f64> {
        self.migrations.last().map(|m| m.version())
    }

    /// Bring `actor` up to date, returning the versions applied.
    ///
    /// Work happens on a copy. The actor is only replaced, with
    /// `schema.version` advanced, once every pending migration succeeds.
    ///
    /// # Errors
    ///
    /// Returns the first [`MigrationError`] raised. The actor is left as it was.
    pub fn run(
        &self,
        actor: &mut Actor,
        compendium: &dyn Compendium,
    ) -> Result<Vec<f64>, MigrationError> {
        let current = schema_version(actor);
        let mut working = actor.clone();
        let mut applied = Vec::new();

        for migration in self.migrations.iter().filter(|m| m.version() > current) {
            migration.update_actor(&mut working, compendium).map_err(|err| {
                tracing::error!(
                    actor = %actor.id,
                    version = migration.version(),
                    error = %err,
                    "migration failed"
                );
                err
            })?;
            tracing::info!(actor = %actor.id, version = migration.version(), "migration applied");
            applied.push(migration.version());
        }

        if let Some(&latest) = applied.last() {
            working.system.set("schema.version", latest.into());
            *actor = working;
        }
        Ok(applied)
    }
}

/// The schema version recorded on an actor; unrecorded counts as 0.
#[must_use]
pub fn schema_version(actor: &Actor) -> f64 {
    actor
        .system
        .get("schema.version")
        .and_then(serde_json::Value::as_f64)
        .unwrap_or(0.0)
}
