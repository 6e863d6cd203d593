use thiserror::Error;

/// Why a rule element was made inert. Recorded on the element and in the
/// preparation report; never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("required field '{field}' not found")]
    MissingField { field: String },

    #[error("field '{field}' is invalid: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("malformed predicate: {reason}")]
    MalformedPredicate { reason: String },

    #[error("unknown rule element key '{key}'")]
    UnknownKey { key: String },

    #[error("rule element '{key}' is not valid on {actor_type} actors")]
    InvalidActorType { key: String, actor_type: String },
}

/// Why a formula could not be resolved. `resolve_value` swallows these and
/// falls back to the unresolved text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("cannot parse formula '{formula}': {message}")]
    Parse { formula: String, message: String },

    #[error("unresolved reference '@{path}'")]
    UnresolvedReference { path: String },

    #[error("reference '@{path}' is not numeric")]
    NotNumeric { path: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("formula nests deeper than {limit} levels")]
    TooDeep { limit: usize },
}
