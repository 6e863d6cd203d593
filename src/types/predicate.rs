use std::fmt;
use std::ops::Not;

use serde_json::json;

use super::error::ValidationError;
use super::roll_options::RollOptions;
use super::value::Value;

/// Comparison operators supported in predicate statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    fn json_key(self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Neq => "neq",
            CompareOp::Gt => "gt",
            CompareOp::Gte => "gte",
            CompareOp::Lt => "lt",
            CompareOp::Lte => "lte",
        }
    }

    fn from_json_key(key: &str) -> Option<Self> {
        Some(match key {
            "eq" => CompareOp::Eq,
            "neq" => CompareOp::Neq,
            "gt" => CompareOp::Gt,
            "gte" => CompareOp::Gte,
            "lt" => CompareOp::Lt,
            "lte" => CompareOp::Lte,
            _ => return None,
        })
    }
}

/// Boolean expression tree over roll options.
///
/// Evaluation is pure: the same [`RollOptions`] always produce the same answer.
/// An empty `And` is the always-true predicate.
#[derive(Debug, Clone, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub enum Predicate {
    /// True when the roll option is active.
    Atom(String),
    /// True when some active option `<option>:<suffix>` has a suffix that
    /// compares true against `value`.
    Compare {
        option: String,
        op: CompareOp,
        value: Value,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    /// The predicate that passes against any roll-option set.
    #[must_use]
    pub fn always() -> Self {
        Predicate::And(Vec::new())
    }

    #[must_use]
    pub fn is_always(&self) -> bool {
        matches!(self, Predicate::And(children) if children.is_empty())
    }

    /// Evaluate against a roll-option set.
    #[must_use]
    pub fn test(&self, options: &RollOptions) -> bool {
        match self {
            Predicate::Atom(tag) => options.is_active(tag),
            Predicate::Compare { option, op, value } => options.active().any(|active| {
                active
                    .strip_prefix(option.as_str())
                    .and_then(|rest| rest.strip_prefix(':'))
                    .and_then(|suffix| Value::from_option_suffix(suffix).compare(*op, value))
                    .unwrap_or(false)
            }),
            Predicate::And(children) => children.iter().all(|c| c.test(options)),
            Predicate::Or(children) => children.iter().any(|c| c.test(options)),
            Predicate::Not(inner) => !inner.test(options),
        }
    }

    #[must_use]
    pub fn and(self, other: Predicate) -> Predicate {
        match self {
            Predicate::And(mut children) => {
                children.push(other);
                Predicate::And(children)
            }
            first => Predicate::And(vec![first, other]),
        }
    }

    #[must_use]
    pub fn or(self, other: Predicate) -> Predicate {
        match self {
            Predicate::Or(mut children) => {
                children.push(other);
                Predicate::Or(children)
            }
            first => Predicate::Or(vec![first, other]),
        }
    }

    /// Whether a raw JSON predicate is well-formed.
    #[must_use]
    pub fn validate(raw: &serde_json::Value) -> bool {
        Self::from_json(raw).is_ok()
    }

    /// Narrow a raw JSON predicate.
    ///
    /// Accepts a bare string, an array of statements (implicit AND), the
    /// `and`/`or`/`nor`/`not` and comparison objects, and the legacy
    /// `{all, any, not}` shape.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MalformedPredicate`] for any other shape.
    pub fn from_json(raw: &serde_json::Value) -> Result<Predicate, ValidationError> {
        match raw {
            serde_json::Value::String(tag) if !tag.is_empty() => Ok(Predicate::Atom(tag.clone())),
            serde_json::Value::Array(items) => Ok(Predicate::And(statements(items)?)),
            serde_json::Value::Object(map) => {
                let legacy = ["all", "any"].iter().any(|k| map.contains_key(*k))
                    || map.get("not").is_some_and(serde_json::Value::is_array);
                if legacy {
                    return legacy_predicate(map);
                }
                if map.len() != 1 {
                    return Err(malformed("statement objects take exactly one key"));
                }
                let Some((key, body)) = map.iter().next() else {
                    return Err(malformed("empty statement object"));
                };
                match key.as_str() {
                    "and" => Ok(Predicate::And(statement_list(body)?)),
                    "or" => Ok(Predicate::Or(statement_list(body)?)),
                    "nor" => Ok(!Predicate::Or(statement_list(body)?)),
                    "not" => Ok(!Predicate::from_json(body)?),
                    other => match CompareOp::from_json_key(other) {
                        Some(op) => comparison(op, body),
                        None => Err(malformed(format!("unknown operator '{other}'"))),
                    },
                }
            }
            _ => Err(malformed("expected a string, array or object")),
        }
    }

    /// Render in the statement-array JSON form accepted by [`from_json`](Self::from_json).
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Predicate::And(children) => {
                serde_json::Value::Array(children.iter().map(Predicate::statement_json).collect())
            }
            other => serde_json::Value::Array(vec![other.statement_json()]),
        }
    }

    fn statement_json(&self) -> serde_json::Value {
        match self {
            Predicate::Atom(tag) => json!(tag),
            Predicate::Compare { option, op, value } => {
                json!({ op.json_key(): [option, serde_json::Value::from(value.clone())] })
            }
            Predicate::And(children) => {
                json!({ "and": children.iter().map(Predicate::statement_json).collect::<Vec<_>>() })
            }
            Predicate::Or(children) => {
                json!({ "or": children.iter().map(Predicate::statement_json).collect::<Vec<_>>() })
            }
            Predicate::Not(inner) => json!({ "not": inner.statement_json() }),
        }
    }
}

fn malformed(reason: impl Into<String>) -> ValidationError {
    ValidationError::MalformedPredicate {
        reason: reason.into(),
    }
}

fn statements(items: &[serde_json::Value]) -> Result<Vec<Predicate>, ValidationError> {
    items.iter().map(Predicate::from_json).collect()
}

fn statement_list(body: &serde_json::Value) -> Result<Vec<Predicate>, ValidationError> {
    match body {
        serde_json::Value::Array(items) => statements(items),
        _ => Err(malformed("expected an array of statements")),
    }
}

fn comparison(op: CompareOp, body: &serde_json::Value) -> Result<Predicate, ValidationError> {
    match body.as_array().map(Vec::as_slice) {
        Some([serde_json::Value::String(option), operand]) => {
            let value = Value::from_json(operand)
                .ok_or_else(|| malformed("comparison operand must be a scalar"))?;
            Ok(Predicate::Compare {
                option: option.clone(),
                op,
                value,
            })
        }
        _ => Err(malformed("comparison takes [option, value]")),
    }
}

fn legacy_predicate(
    map: &serde_json::Map<String, serde_json::Value>,
) -> Result<Predicate, ValidationError> {
    let mut parts = Vec::new();
    for (key, body) in map {
        let list = statement_list(body)?;
        match key.as_str() {
            "all" => parts.extend(list),
            "any" if !list.is_empty() => parts.push(Predicate::Or(list)),
            "not" if !list.is_empty() => parts.push(!Predicate::Or(list)),
            "any" | "not" => {}
            other => return Err(malformed(format!("unknown legacy key '{other}'"))),
        }
    }
    Ok(Predicate::And(parts))
}

impl TryFrom<serde_json::Value> for Predicate {
    type Error = ValidationError;

    fn try_from(raw: serde_json::Value) -> Result<Self, Self::Error> {
        Predicate::from_json(&raw)
    }
}

impl From<Predicate> for serde_json::Value {
    fn from(predicate: Predicate) -> Self {
        predicate.to_json()
    }
}

impl Default for Predicate {
    fn default() -> Self {
        Predicate::always()
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::Neq => write!(f, "!="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Gte => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Lte => write!(f, "<="),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, children: &[Predicate], sep: &str) -> fmt::Result {
            write!(f, "(")?;
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    write!(f, " {sep} ")?;
                }
                write!(f, "{child}")?;
            }
            write!(f, ")")
        }

        match self {
            Predicate::Atom(tag) => write!(f, "{tag}"),
            Predicate::Compare { option, op, value } => write!(f, "({option} {op} {value})"),
            Predicate::And(children) if children.is_empty() => write!(f, "(always)"),
            Predicate::And(children) => join(f, children, "AND"),
            Predicate::Or(children) => join(f, children, "OR"),
            Predicate::Not(inner) => write!(f, "(NOT {inner})"),
        }
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }
}

/// Intermediate builder for comparisons against a roll option's value suffix.
/// Created by [`option_value()`]; requires a comparison method to produce a [`Predicate`].
#[derive(Debug, Clone)]
pub struct OptionValueExpr {
    option: String,
}

impl OptionValueExpr {
    fn build(self, op: CompareOp, value: impl Into<Value>) -> Predicate {
        Predicate::Compare {
            option: self.option,
            op,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn eq(self, value: impl Into<Value>) -> Predicate {
        self.build(CompareOp::Eq, value)
    }

    #[must_use]
    pub fn neq(self, value: impl Into<Value>) -> Predicate {
        self.build(CompareOp::Neq, value)
    }

    #[must_use]
    pub fn gt(self, value: impl Into<Value>) -> Predicate {
        self.build(CompareOp::Gt, value)
    }

    #[must_use]
    pub fn gte(self, value: impl Into<Value>) -> Predicate {
        self.build(CompareOp::Gte, value)
    }

    #[must_use]
    pub fn lt(self, value: impl Into<Value>) -> Predicate {
        self.build(CompareOp::Lt, value)
    }

    #[must_use]
    pub fn lte(self, value: impl Into<Value>) -> Predicate {
        self.build(CompareOp::Lte, value)
    }
}

/// A predicate satisfied by a single active roll option.
#[must_use]
pub fn option(tag: &str) -> Predicate {
    Predicate::Atom(tag.to_owned())
}

/// Start a comparison against the value suffix of `option:<value>` roll options.
#[must_use]
pub fn option_value(option: &str) -> OptionValueExpr {
    OptionValueExpr {
        option: option.to_owned(),
    }
}
