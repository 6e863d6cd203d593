//! Arithmetic formulas with `@path` references, as used by rule element values.
//!
//! ```text
//! formula := sum
//! sum     := product (('+' | '-') product)*
//! product := unary (('*' | '/' | '%') unary)*
//! unary   := '-'* atom
//! atom    := number | '@' path | func '(' sum (',' sum)* ')' | '(' sum ')'
//! ```

use winnow::ascii::digit1;
use winnow::combinator::{alt, cut_err, delimited, opt, preceded, repeat, separated};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

use super::grammar::ws;
use crate::{ResolutionError, RollData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Floor,
    Ceil,
    Round,
    Abs,
    Min,
    Max,
}

impl Function {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "floor" => Function::Floor,
            "ceil" => Function::Ceil,
            "round" => Function::Round,
            "abs" => Function::Abs,
            "min" => Function::Min,
            "max" => Function::Max,
            _ => return None,
        })
    }

    fn accepts(self, arity: usize) -> bool {
        match self {
            Function::Floor | Function::Ceil | Function::Round | Function::Abs => arity == 1,
            Function::Min | Function::Max => arity >= 1,
        }
    }
}

impl BinaryOp {
    fn apply(self, l: f64, r: f64) -> Result<f64, ResolutionError> {
        match self {
            BinaryOp::Add => Ok(l + r),
            BinaryOp::Sub => Ok(l - r),
            BinaryOp::Mul => Ok(l * r),
            BinaryOp::Div | BinaryOp::Rem if r == 0.0 => Err(ResolutionError::DivisionByZero),
            BinaryOp::Div => Ok(l / r),
            BinaryOp::Rem => Ok(l % r),
        }
    }
}

/// Parsed formula tree. References stay symbolic until evaluation.
///
/// Operator runs of one precedence level are kept flat, so tree depth follows
/// parenthesis nesting rather than formula length.
#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    Number(f64),
    Reference(String),
    Neg(Box<Formula>),
    /// `first op rest[0] op rest[1] ...`, evaluated left to right.
    Chain {
        first: Box<Formula>,
        rest: Vec<(BinaryOp, Formula)>,
    },
    Call {
        func: Function,
        args: Vec<Formula>,
    },
}

impl Formula {
    /// Evaluate against roll data.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError`] for missing or non-numeric references and
    /// division by zero.
    pub fn evaluate(&self, data: &RollData<'_>) -> Result<f64, ResolutionError> {
        match self {
            Formula::Number(n) => Ok(*n),
            Formula::Reference(path) => lookup_number(data, path),
            Formula::Neg(inner) => Ok(-inner.evaluate(data)?),
            Formula::Chain { first, rest } => rest
                .iter()
                .try_fold(first.evaluate(data)?, |acc, (op, rhs)| {
                    op.apply(acc, rhs.evaluate(data)?)
                }),
            Formula::Call { func, args } => {
                let values = args
                    .iter()
                    .map(|a| a.evaluate(data))
                    .collect::<Result<Vec<f64>, _>>()?;
                Ok(match func {
                    Function::Floor => values[0].floor(),
                    Function::Ceil => values[0].ceil(),
                    Function::Round => values[0].round(),
                    Function::Abs => values[0].abs(),
                    Function::Min => values.into_iter().fold(f64::INFINITY, f64::min),
                    Function::Max => values.into_iter().fold(f64::NEG_INFINITY, f64::max),
                })
            }
        }
    }
}

fn lookup_number(data: &RollData<'_>, path: &str) -> Result<f64, ResolutionError> {
    let raw = data
        .lookup(path)
        .ok_or_else(|| ResolutionError::UnresolvedReference {
            path: path.to_owned(),
        })?;
    let number = match raw {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.ok_or_else(|| ResolutionError::NotNumeric {
        path: path.to_owned(),
    })
}

/// Deepest parenthesis nesting in `input`; checked before parsing so the
/// recursive grammar has a bounded stack.
#[must_use]
pub fn nesting_depth(input: &str) -> usize {
    let mut depth = 0_usize;
    let mut max = 0_usize;
    for c in input.chars() {
        match c {
            '(' => {
                depth += 1;
                max = max.max(depth);
            }
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max
}

// -- Grammar ----------------------------------------------------------------

fn number(input: &mut &str) -> ModalResult<Formula> {
    (digit1, opt(('.', digit1)))
        .take()
        .try_map(|s: &str| s.parse::<f64>())
        .map(Formula::Number)
        .parse_next(input)
}

fn reference(input: &mut &str) -> ModalResult<Formula> {
    preceded(
        '@',
        cut_err(take_while(1.., |c: char| {
            c.is_ascii_alphanumeric() || c == '.' || c == '_'
        })),
    )
    .map(|path: &str| Formula::Reference(path.to_owned()))
    .context(StrContext::Expected(StrContextValue::Description(
        "reference path",
    )))
    .parse_next(input)
}

fn call(input: &mut &str) -> ModalResult<Formula> {
    let func = take_while(1.., |c: char| c.is_ascii_lowercase())
        .verify_map(Function::from_name)
        .parse_next(input)?;
    let args: Vec<Formula> = delimited(
        (ws, '('),
        cut_err(separated(1.., sum, (ws, ','))),
        (ws, cut_err(')')),
    )
    .parse_next(input)?;
    if !func.accepts(args.len()) {
        return Err(winnow::error::ErrMode::from_input(input).cut());
    }
    Ok(Formula::Call { func, args })
}

fn atom(input: &mut &str) -> ModalResult<Formula> {
    ws.parse_next(input)?;
    alt((
        number,
        reference,
        call,
        delimited('(', sum, (ws, cut_err(')'))),
    ))
    .context(StrContext::Expected(StrContextValue::Description("operand")))
    .parse_next(input)
}

/// A run of minus signs collapses by parity: `--x` is `x`.
fn unary(input: &mut &str) -> ModalResult<Formula> {
    let signs: usize = repeat(0.., preceded(ws, '-')).parse_next(input)?;
    if signs == 0 {
        return atom(input);
    }
    let inner = cut_err(atom).parse_next(input)?;
    Ok(if signs % 2 == 1 {
        Formula::Neg(Box::new(inner))
    } else {
        inner
    })
}

fn chain(first: Formula, rest: Vec<(char, Formula)>) -> Formula {
    if rest.is_empty() {
        return first;
    }
    let rest = rest
        .into_iter()
        .map(|(sym, rhs)| {
            let op = match sym {
                '+' => BinaryOp::Add,
                '-' => BinaryOp::Sub,
                '*' => BinaryOp::Mul,
                '/' => BinaryOp::Div,
                _ => BinaryOp::Rem,
            };
            (op, rhs)
        })
        .collect();
    Formula::Chain {
        first: Box::new(first),
        rest,
    }
}

fn product(input: &mut &str) -> ModalResult<Formula> {
    let first = unary(input)?;
    let rest: Vec<(char, Formula)> = repeat(
        0..,
        (preceded(ws, one_of(['*', '/', '%'])), cut_err(unary)),
    )
    .parse_next(input)?;
    Ok(chain(first, rest))
}

fn sum(input: &mut &str) -> ModalResult<Formula> {
    let first = product(input)?;
    let rest: Vec<(char, Formula)> =
        repeat(0.., (preceded(ws, one_of(['+', '-'])), cut_err(product))).parse_next(input)?;
    Ok(chain(first, rest))
}

pub fn parse_formula(input: &mut &str) -> ModalResult<Formula> {
    let formula = sum(input)?;
    ws.parse_next(input)?;
    Ok(formula)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_formula;
    use crate::{Actor, ActorType, Item};

    fn actor() -> Actor {
        Actor::new("a", "A", ActorType::Character)
            .with_system("details.level.value", 6)
            .with_system("abilities.str.mod", "3")
            .with_system("name", "Valeros")
            .with_item(Item::new("i", "I", "feat").with_system("level.value", 2))
    }

    fn eval(src: &str) -> Result<f64, ResolutionError> {
        let actor = actor();
        let formula = parse_formula(src).map_err(|e| ResolutionError::Parse {
            formula: src.to_owned(),
            message: e.to_string(),
        })?;
        formula.evaluate(&actor.roll_data(Some(0)))
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(eval("1 + 2 * 3").unwrap(), 7.0);
        assert_eq!(eval("(1 + 2) * 3").unwrap(), 9.0);
        assert_eq!(eval("10 - 4 - 3").unwrap(), 3.0);
        assert_eq!(eval("-2 * -3").unwrap(), 6.0);
        assert_eq!(eval("7 % 4").unwrap(), 3.0);
        assert_eq!(eval("1.5 * 2").unwrap(), 3.0);
    }

    #[test]
    fn references_resolve() {
        assert_eq!(eval("@actor.details.level.value").unwrap(), 6.0);
        assert_eq!(eval("@details.level.value + @item.level.value").unwrap(), 8.0);
        assert_eq!(eval("@abilities.str.mod").unwrap(), 3.0);
    }

    #[test]
    fn functions() {
        assert_eq!(eval("floor(@details.level.value / 4)").unwrap(), 1.0);
        assert_eq!(eval("ceil(7 / 2)").unwrap(), 4.0);
        assert_eq!(eval("max(1, @details.level.value, 3)").unwrap(), 6.0);
        assert_eq!(eval("min(5)").unwrap(), 5.0);
        assert_eq!(eval("abs(-3)").unwrap(), 3.0);
    }

    #[test]
    fn resolution_failures() {
        assert_eq!(
            eval("@missing.path"),
            Err(ResolutionError::UnresolvedReference {
                path: "missing.path".into()
            })
        );
        assert_eq!(
            eval("@name"),
            Err(ResolutionError::NotNumeric {
                path: "name".into()
            })
        );
        assert_eq!(eval("1 / 0"), Err(ResolutionError::DivisionByZero));
    }

    #[test]
    fn parse_failures() {
        for src in ["1 +", "(1", "foo(1)", "floor(1, 2)", "1d20", "@", "", "hello"] {
            assert!(parse_formula(src).is_err(), "accepted {src:?}");
        }
    }

    #[test]
    fn nesting_depth_counts_parens() {
        assert_eq!(nesting_depth("1 + 2"), 0);
        assert_eq!(nesting_depth("((1) + (2 * (3)))"), 3);
        assert_eq!(nesting_depth(")("), 1);
    }

    #[test]
    fn sign_runs_collapse() {
        assert_eq!(eval("--3").unwrap(), 3.0);
        assert_eq!(eval("- - -3").unwrap(), -3.0);
        assert_eq!(eval("2 - -1").unwrap(), 3.0);
        assert!(parse_formula("--").is_err());

        let long = format!("{}1", "-".repeat(200_001));
        assert_eq!(eval(&long).unwrap(), -1.0);
    }

    #[test]
    fn long_operator_runs_stay_flat() {
        let long = vec!["1"; 100_000].join(" + ");
        assert_eq!(eval(&long).unwrap(), 100_000.0);
        match parse_formula("1 - 2 + 3").unwrap() {
            Formula::Chain { rest, .. } => assert_eq!(rest.len(), 2),
            other => panic!("expected a chain, got {other:?}"),
        }
    }
}
