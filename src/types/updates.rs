use serde_json::{Map, Value as Json};

use super::document::Document;

/// One pending write against an actor's system data.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateCommand {
    Set { path: String, value: Json },
    Delete { path: String },
}

impl UpdateCommand {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            UpdateCommand::Set { path, .. } | UpdateCommand::Delete { path } => path,
        }
    }
}

/// Actor update accumulator shared by every rule element in one create or
/// delete batch. Commands keep their insertion order; when two commands touch
/// the same path the later one wins.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct ActorUpdates {
    commands: Vec<UpdateCommand>,
}

impl ActorUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, path: impl Into<String>, value: impl Into<Json>) {
        self.commands.push(UpdateCommand::Set {
            path: path.into(),
            value: value.into(),
        });
    }

    pub fn delete(&mut self, path: impl Into<String>) {
        self.commands.push(UpdateCommand::Delete { path: path.into() });
    }

    #[must_use]
    pub fn commands(&self) -> &[UpdateCommand] {
        &self.commands
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The last command written for `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&UpdateCommand> {
        self.commands.iter().rev().find(|c| c.path() == path)
    }

    /// Render the host's dotted-path form: deletions become
    /// `parent.-=key: null`. A set and a delete of the same path never both
    /// appear; the later command replaces the earlier one.
    #[must_use]
    pub fn to_flat_map(&self) -> Map<String, Json> {
        let mut flat = Map::new();
        for command in &self.commands {
            match command {
                UpdateCommand::Set { path, value } => {
                    flat.remove(&deletion_key(path));
                    flat.insert(path.clone(), value.clone());
                }
                UpdateCommand::Delete { path } => {
                    flat.remove(path);
                    flat.insert(deletion_key(path), Json::Null);
                }
            }
        }
        flat
    }

    /// Apply every command, in order, to `doc`.
    pub fn apply_to(&self, doc: &mut Document) {
        for command in &self.commands {
            match command {
                UpdateCommand::Set { path, value } => doc.set(path, value.clone()),
                UpdateCommand::Delete { path } => {
                    doc.delete(path);
                }
            }
        }
    }

    /// Append another batch after this one.
    pub fn extend(&mut self, other: ActorUpdates) {
        self.commands.extend(other.commands);
    }
}

fn deletion_key(path: &str) -> String {
    match path.rsplit_once('.') {
        Some((parent, leaf)) => format!("{parent}.-={leaf}"),
        None => format!("-={path}"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn flat_map_renders_deletion_markers() {
        let mut updates = ActorUpdates::new();
        updates.set("crafting.entries.alchemy", json!({"maxSlots": 2}));
        updates.delete("crafting.entries.snares");
        updates.delete("toplevel");

        let flat = updates.to_flat_map();
        assert_eq!(flat["crafting.entries.alchemy"], json!({"maxSlots": 2}));
        assert_eq!(flat["crafting.entries.-=snares"], Json::Null);
        assert_eq!(flat["-=toplevel"], Json::Null);
    }

    #[test]
    fn set_and_delete_of_one_path_keep_only_the_last() {
        let mut updates = ActorUpdates::new();
        updates.set("crafting.entries.alchemy", json!({"maxSlots": 2}));
        updates.delete("crafting.entries.alchemy");
        let flat = updates.to_flat_map();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat["crafting.entries.-=alchemy"], Json::Null);

        updates.set("crafting.entries.alchemy", json!({"maxSlots": 3}));
        let flat = updates.to_flat_map();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat["crafting.entries.alchemy"], json!({"maxSlots": 3}));

        let mut updates = ActorUpdates::new();
        updates.delete("top");
        updates.set("top", true);
        let flat = updates.to_flat_map();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat["top"], json!(true));
    }

    #[test]
    fn later_write_wins() {
        let mut updates = ActorUpdates::new();
        updates.set("x", 1);
        updates.set("x", 2);
        assert_eq!(
            updates.get("x"),
            Some(&UpdateCommand::Set {
                path: "x".into(),
                value: json!(2)
            })
        );
        assert_eq!(updates.to_flat_map()["x"], json!(2));

        let mut doc = Document::new();
        updates.apply_to(&mut doc);
        assert_eq!(doc.get("x"), Some(&json!(2)));
    }

    #[test]
    fn apply_runs_in_order() {
        let mut doc = Document::new().with("a.b", 1);
        let mut updates = ActorUpdates::new();
        updates.delete("a.b");
        updates.set("a.c", 3);
        updates.apply_to(&mut doc);
        assert_eq!(doc.get("a.b"), None);
        assert_eq!(doc.get("a.c"), Some(&json!(3)));
    }

    #[test]
    fn extend_appends() {
        let mut first = ActorUpdates::new();
        first.set("a", 1);
        let mut second = ActorUpdates::new();
        second.delete("b");
        first.extend(second);
        assert_eq!(first.len(), 2);
        assert_eq!(first.commands()[1].path(), "b");
    }
}
