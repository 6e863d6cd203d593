use std::fmt;

/// Which content language a [`ParseError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// The text predicate DSL used in rule element `predicate` fields.
    Predicate,
    /// Value formulas such as `@actor.details.level.value * 2`.
    Formula,
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Syntax::Predicate => "predicate",
            Syntax::Formula => "formula",
        })
    }
}

/// Content text that could not be parsed as a predicate or formula.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed {syntax}: {message}")]
pub struct ParseError {
    syntax: Syntax,
    message: String,
}

impl ParseError {
    pub(crate) fn new(syntax: Syntax, message: impl Into<String>) -> Self {
        Self {
            syntax,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    /// The rendered parser diagnostic, without the syntax prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
