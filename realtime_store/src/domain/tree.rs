// JSON value tree addressed by store paths.
//
// Empty objects and nulls are never stored: setting null removes, and removing the last child
// of an object removes the object itself.

use super::path::StorePath;
use serde_json::{Map, Value};

#[derive(Debug, Default)]
pub struct ValueTree {
    root: Value,
}

impl ValueTree {
    pub fn new() -> Self {
        Self { root: Value::Null }
    }

    /// Returns a copy of the value at `path`, or null when nothing is stored there.
    pub fn get(&self, path: &StorePath) -> Value {
        let mut node = &self.root;
        for segment in path.segments() {
            match node.get(segment.as_str()) {
                Some(child) => node = child,
                None => return Value::Null,
            }
        }
        node.clone()
    }

    /// Overwrites the value at `path`. Returns true if the tree changed.
    pub fn set(&mut self, path: &StorePath, value: Value) -> bool {
        let value = normalize(value);
        if value.is_null() {
            return self.remove(path);
        }
        if self.get(path) == value {
            return false;
        }

        let Some((last, parents)) = path.segments().split_last() else {
            self.root = value;
            return true;
        };

        let mut node = &mut self.root;
        for segment in parents {
            node = object_mut(node)
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        object_mut(node).insert(last.clone(), value);
        true
    }

    /// Removes the value at `path`. Returns true if anything was removed.
    pub fn remove(&mut self, path: &StorePath) -> bool {
        if path.is_root() {
            let changed = !self.root.is_null();
            self.root = Value::Null;
            return changed;
        }

        let changed = remove_at(&mut self.root, path.segments());
        if is_empty(&self.root) {
            self.root = Value::Null;
        }
        changed
    }
}

// Turns `node` into an object if it is anything else and returns its map.
fn object_mut(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced with an object"),
    }
}

fn remove_at(node: &mut Value, segments: &[String]) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        return false;
    };
    let Some(map) = node.as_object_mut() else {
        return false;
    };

    if rest.is_empty() {
        return map.remove(first).is_some();
    }

    let Some(child) = map.get_mut(first) else {
        return false;
    };
    let changed = remove_at(child, rest);
    if changed && is_empty(child) {
        map.remove(first);
    }
    changed
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

// Drops null members and empty objects recursively.
fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let cleaned: Map<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, normalize(v)))
                .filter(|(_, v)| !v.is_null())
                .collect();
            if cleaned.is_empty() {
                Value::Null
            } else {
                Value::Object(cleaned)
            }
        }
        other => other,
    }
}
