use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

/// A JSON object tree addressed by dot-separated paths such as
/// `"crafting.entries.alchemy.maxSlots"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    data: Map<String, Json>,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value at a dot-separated path (builder form).
    #[must_use]
    pub fn with(mut self, path: &str, value: impl Into<Json>) -> Self {
        self.set(path, value.into());
        self
    }

    /// Set a value at a dot-separated path. Creates intermediate objects as
    /// needed and replaces non-object values that sit in the way.
    pub fn set(&mut self, path: &str, value: Json) {
        let segments: Vec<&str> = path.split('.').collect();
        Self::set_recursive(&mut self.data, &segments, value);
    }

    /// Look up the value at a dot-separated path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Json> {
        let segments: Vec<&str> = path.split('.').collect();
        Self::get_recursive(&self.data, &segments)
    }

    /// Remove the key at a dot-separated path, returning the removed value.
    pub fn delete(&mut self, path: &str) -> Option<Json> {
        let segments: Vec<&str> = path.split('.').collect();
        Self::delete_recursive(&mut self.data, &segments)
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Json> {
        &self.data
    }

    fn set_recursive(map: &mut Map<String, Json>, segments: &[&str], value: Json) {
        match segments {
            [] => {}
            [last] => {
                map.insert((*last).to_owned(), value);
            }
            [first, rest @ ..] => {
                let entry = map
                    .entry((*first).to_owned())
                    .or_insert_with(|| Json::Object(Map::new()));
                if !entry.is_object() {
                    *entry = Json::Object(Map::new());
                }
                if let Json::Object(nested) = entry {
                    Self::set_recursive(nested, rest, value);
                }
            }
        }
    }

    fn get_recursive<'a>(map: &'a Map<String, Json>, segments: &[&str]) -> Option<&'a Json> {
        match segments {
            [] => None,
            [last] => map.get(*last),
            [first, rest @ ..] => match map.get(*first)? {
                Json::Object(nested) => Self::get_recursive(nested, rest),
                _ => None,
            },
        }
    }

    fn delete_recursive(map: &mut Map<String, Json>, segments: &[&str]) -> Option<Json> {
        match segments {
            [] => None,
            [last] => map.remove(*last),
            [first, rest @ ..] => match map.get_mut(*first)? {
                Json::Object(nested) => Self::delete_recursive(nested, rest),
                _ => None,
            },
        }
    }
}

impl From<Map<String, Json>> for Document {
    fn from(data: Map<String, Json>) -> Self {
        Self { data }
    }
}
