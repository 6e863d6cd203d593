use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use crate::parse::parse_predicate;
use crate::{Predicate, ValidationError};

/// Untyped rule element configuration as authored in game content.
/// Only `key` is meaningful before a variant narrows the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleElementSource {
    fields: Map<String, Json>,
}

impl RuleElementSource {
    /// Wrap a raw JSON value. Non-objects become an empty source.
    #[must_use]
    pub fn from_json(raw: &Json) -> Self {
        match raw {
            Json::Object(fields) => Self {
                fields: fields.clone(),
            },
            _ => Self::default(),
        }
    }

    /// The variant discriminator, when present and a non-empty string.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.fields
            .get("key")
            .and_then(Json::as_str)
            .filter(|k| !k.is_empty())
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Json> {
        self.fields.get(field)
    }

    /// A non-empty string field.
    #[must_use]
    pub fn string(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Json::as_str).filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(Json::as_bool)
    }

    #[must_use]
    pub fn integer(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Json::as_i64)
    }
}

impl From<Map<String, Json>> for RuleElementSource {
    fn from(fields: Map<String, Json>) -> Self {
        Self { fields }
    }
}

/// The fields every rule element shares, narrowed from a [`RuleElementSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct RuleElementData {
    pub key: String,
    pub label: String,
    pub value: Json,
    pub priority: i32,
    pub predicate: Option<Predicate>,
    pub ignored: bool,
}

impl RuleElementData {
    /// Narrow the common fields. Problems are returned alongside the best-effort
    /// data so the caller can mark the element inert.
    pub(crate) fn narrow(
        source: &RuleElementSource,
        item_name: &str,
        default_priority: i32,
    ) -> (Self, Vec<ValidationError>) {
        let mut problems = Vec::new();

        let key = match source.key() {
            Some(key) => key.to_owned(),
            None => {
                problems.push(ValidationError::MissingField {
                    field: "key".into(),
                });
                String::new()
            }
        };

        let priority = match source.get("priority") {
            None | Some(Json::Null) => default_priority,
            Some(raw) => match raw.as_i64().and_then(|p| i32::try_from(p).ok()) {
                Some(p) => p,
                None => {
                    problems.push(ValidationError::InvalidField {
                        field: "priority".into(),
                        reason: "expected an integer".into(),
                    });
                    default_priority
                }
            },
        };

        let predicate = match source.get("predicate") {
            None | Some(Json::Null) => None,
            Some(raw) => match narrow_predicate(raw) {
                Ok(p) => Some(p),
                Err(err) => {
                    problems.push(err);
                    None
                }
            },
        };

        let data = Self {
            key,
            label: source.string("label").unwrap_or(item_name).to_owned(),
            value: source.get("value").cloned().unwrap_or(Json::Null),
            priority,
            predicate,
            ignored: source.bool("ignored").unwrap_or(false),
        };
        (data, problems)
    }
}

/// JSON predicates, plus a text-DSL shorthand for strings that are clearly
/// expressions rather than a single tag.
fn narrow_predicate(raw: &Json) -> Result<Predicate, ValidationError> {
    match raw {
        Json::String(text) if text.contains(|c: char| c.is_whitespace() || c == '(') => {
            parse_predicate(text).map_err(|e| ValidationError::MalformedPredicate {
                reason: e.message().to_owned(),
            })
        }
        other => Predicate::from_json(other),
    }
}
