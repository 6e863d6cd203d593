mod error;
mod formula;
mod grammar;

pub use error::{ParseError, Syntax};
pub use formula::{BinaryOp, Formula, Function, nesting_depth};

use crate::Predicate;

/// Deepest parenthesis nesting a text predicate may use.
pub const MAX_PREDICATE_DEPTH: usize = 64;

/// Parse a predicate written in the text DSL, e.g.
/// `crafting:entry:alchemy AND NOT self:level < 5`.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a valid predicate or nests
/// parentheses deeper than [`MAX_PREDICATE_DEPTH`].
pub fn parse_predicate(input: &str) -> Result<Predicate, ParseError> {
    use winnow::Parser;
    if nesting_depth(input) > MAX_PREDICATE_DEPTH {
        return Err(ParseError::new(
            Syntax::Predicate,
            format!("nests deeper than {MAX_PREDICATE_DEPTH} levels"),
        ));
    }
    grammar::parse_predicate
        .parse(input)
        .map_err(|e| ParseError::new(Syntax::Predicate, e.to_string()))
}

/// Parse an arithmetic formula such as `floor(@actor.level / 2) + 1`.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a valid formula.
pub fn parse_formula(input: &str) -> Result<Formula, ParseError> {
    use winnow::Parser;
    formula::parse_formula
        .parse(input)
        .map_err(|e| ParseError::new(Syntax::Formula, e.to_string()))
}
