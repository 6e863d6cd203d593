use thiserror::Error;

use crate::migrations::MigrationError;
use crate::parse::ParseError;

/// Unified error type for the fallible, caller-facing operations: parsing,
/// configuration loading, item removal and migrations.
///
/// Per-element faults during a preparation pass are not errors; they are
/// recorded on the element and surfaced through the
/// [`PreparationReport`](crate::PreparationReport).
#[derive(Debug, Error)]
pub enum RulesError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("item '{id}' not found on actor")]
    ItemNotFound { id: String },

    #[error(transparent)]
    Migration(#[from] MigrationError),
}
