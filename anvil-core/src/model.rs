//! Model path resolver.
//!
//! Form fields are addressed by path strings:
//!
//! | Field           | Meaning                                                     |
//! |-----------------|-------------------------------------------------------------|
//! | `name`          | plain key                                                   |
//! | `user.name`     | nested object path                                          |
//! | `[start,end]`   | array destructuring: one raw key holding `[start, end]`     |
//! | `{a:x,b}`       | object renaming: one raw key holding `{ a, b }`, exposed as `x`, `b` |
//!
//! The raw model stores destructuring fields under their literal key.
//! [`expand`] produces the caller-facing view, [`contract`] writes a view back.

use serde_json::{Map, Value};

/// A parsed field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPath {
    Key(String),
    Nested(Vec<String>),
    Array { raw: String, keys: Vec<String> },
    Object { raw: String, pairs: Vec<(String, Option<String>)> },
}

impl FieldPath {
    pub fn parse(field: &str) -> Self {
        let trimmed = field.trim();
        if let Some(keys) = array_keys(trimmed) {
            return FieldPath::Array {
                raw: field.to_string(),
                keys,
            };
        }
        if let Some(pairs) = object_keys(trimmed) {
            return FieldPath::Object {
                raw: field.to_string(),
                pairs,
            };
        }
        if trimmed.contains('.') {
            return FieldPath::Nested(trimmed.split('.').map(str::to_string).collect());
        }
        FieldPath::Key(field.to_string())
    }

    /// Read the bound value; `null` when absent.
    pub fn get(&self, model: &Value) -> Value {
        match self {
            FieldPath::Nested(segments) => segments
                .iter()
                .try_fold(model, |current, segment| current.get(segment))
                .cloned()
                .unwrap_or(Value::Null),
            FieldPath::Key(raw) | FieldPath::Array { raw, .. } | FieldPath::Object { raw, .. } => {
                model.get(raw).cloned().unwrap_or(Value::Null)
            }
        }
    }

    /// Write the bound value, creating intermediate objects.
    pub fn set(&self, model: &mut Value, value: Value) {
        match self {
            FieldPath::Nested(segments) => {
                let mut current = model;
                for segment in &segments[..segments.len().saturating_sub(1)] {
                    current = ensure_object(current)
                        .entry(segment.clone())
                        .or_insert_with(|| Value::Object(Map::new()));
                }
                if let Some(last) = segments.last() {
                    ensure_object(current).insert(last.clone(), value);
                }
            }
            FieldPath::Key(raw) | FieldPath::Array { raw, .. } | FieldPath::Object { raw, .. } => {
                ensure_object(model).insert(raw.clone(), value);
            }
        }
    }

    pub fn contains(&self, model: &Value) -> bool {
        match self {
            FieldPath::Nested(segments) => segments
                .iter()
                .try_fold(model, |current, segment| current.get(segment))
                .is_some(),
            FieldPath::Key(raw) | FieldPath::Array { raw, .. } | FieldPath::Object { raw, .. } => {
                model.get(raw).is_some()
            }
        }
    }

    /// Register the field with `default` unless it already holds a value.
    pub fn seed(&self, model: &mut Value, default: Value) {
        if !self.contains(model) {
            self.set(model, default);
        }
    }
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}

fn array_keys(field: &str) -> Option<Vec<String>> {
    let inner = field.strip_prefix('[')?.strip_suffix(']')?;
    Some(
        inner
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn object_keys(field: &str) -> Option<Vec<(String, Option<String>)>> {
    let inner = field.strip_prefix('{')?.strip_suffix('}')?;
    Some(
        inner
            .split(',')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once(':') {
                Some((key, alias)) => (key.trim().to_string(), Some(alias.trim().to_string())),
                None => (pair.to_string(), None),
            })
            .collect(),
    )
}

/// Expand a raw model into the caller-facing view.
///
/// ```
/// use anvil_core::model::expand;
/// use serde_json::json;
///
/// let raw = json!({ "[start,end]": ["2024-01-01", "2024-01-31"], "name": "x" });
/// assert_eq!(
///     expand(&raw),
///     json!({ "start": "2024-01-01", "end": "2024-01-31", "name": "x" })
/// );
/// ```
pub fn expand(source: &Value) -> Value {
    match source {
        Value::Object(map) => {
            let mut target = Map::new();
            for (key, value) in map {
                if let Some(keys) = array_keys(key) {
                    for (index, name) in keys.into_iter().enumerate() {
                        let item = value.get(index).cloned().unwrap_or(Value::Null);
                        target.insert(name, item);
                    }
                } else if let Some(pairs) = object_keys(key) {
                    for (name, alias) in pairs {
                        let item = value.get(&name).cloned().unwrap_or(Value::Null);
                        target.insert(alias.unwrap_or(name), item);
                    }
                } else {
                    target.insert(key.clone(), expand(value));
                }
            }
            Value::Object(target)
        }
        Value::Array(items) => Value::Array(items.iter().map(expand).collect()),
        other => other.clone(),
    }
}

/// Write an expanded view back into the raw model.
///
/// Only keys already present in `target` are written; path keys are rebuilt
/// from their parts, other keys keep their current value when `source` has
/// none.
pub fn contract(target: &mut Value, source: &Value) {
    let Value::Object(map) = target else {
        return;
    };
    for (key, slot) in map.iter_mut() {
        if let Some(keys) = array_keys(key) {
            *slot = Value::Array(
                keys.iter()
                    .map(|name| source.get(name).cloned().unwrap_or(Value::Null))
                    .collect(),
            );
        } else if let Some(pairs) = object_keys(key) {
            let mut object = Map::new();
            for (name, alias) in pairs {
                let from = alias.as_deref().unwrap_or(&name);
                object.insert(
                    name.clone(),
                    source.get(from).cloned().unwrap_or(Value::Null),
                );
            }
            *slot = Value::Object(object);
        } else {
            match source.get(key) {
                Some(Value::Object(nested)) => {
                    if !slot.is_object() {
                        *slot = Value::Object(Map::new());
                    }
                    if let Value::Object(existing) = slot {
                        for name in nested.keys() {
                            existing.entry(name.clone()).or_insert(Value::Null);
                        }
                    }
                    contract(slot, &Value::Object(nested.clone()));
                }
                Some(Value::Null) | None => {}
                Some(value) => *slot = value.clone(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_classifies_fields() {
        assert_eq!(FieldPath::parse("name"), FieldPath::Key("name".into()));
        assert_eq!(
            FieldPath::parse("user.name"),
            FieldPath::Nested(vec!["user".into(), "name".into()])
        );
        assert_eq!(
            FieldPath::parse("[start, end]"),
            FieldPath::Array {
                raw: "[start, end]".into(),
                keys: vec!["start".into(), "end".into()]
            }
        );
        assert_eq!(
            FieldPath::parse("{a:x,b}"),
            FieldPath::Object {
                raw: "{a:x,b}".into(),
                pairs: vec![("a".into(), Some("x".into())), ("b".into(), None)]
            }
        );
    }

    #[test]
    fn nested_paths_create_intermediate_objects() {
        let mut model = json!({});
        let path = FieldPath::parse("user.profile.name");
        path.seed(&mut model, json!("juetan"));
        assert_eq!(model, json!({ "user": { "profile": { "name": "juetan" } } }));
        assert_eq!(path.get(&model), json!("juetan"));

        path.seed(&mut model, json!("other"));
        assert_eq!(path.get(&model), json!("juetan"));
    }

    #[test]
    fn object_keys_rename_on_expand() {
        let raw = json!({ "{a:x,b}": { "a": 1, "b": 2 } });
        assert_eq!(expand(&raw), json!({ "x": 1, "b": 2 }));
    }

    #[test]
    fn contract_round_trips_array_keys() {
        let mut raw = json!({ "[start,end]": [null, null], "name": "" });
        let view = json!({ "start": "2024-01-01", "end": "2024-01-31", "name": "x" });
        contract(&mut raw, &view);
        assert_eq!(
            raw,
            json!({ "[start,end]": ["2024-01-01", "2024-01-31"], "name": "x" })
        );
        assert_eq!(expand(&raw), view);
    }

    #[test]
    fn contract_round_trips_object_keys() {
        let mut raw = json!({ "{a:x,b}": {} });
        contract(&mut raw, &json!({ "x": 1, "b": 2 }));
        assert_eq!(raw, json!({ "{a:x,b}": { "a": 1, "b": 2 } }));
    }

    #[test]
    fn contract_keeps_values_missing_from_source() {
        let mut raw = json!({ "name": "keep", "age": 1 });
        contract(&mut raw, &json!({ "age": 2 }));
        assert_eq!(raw, json!({ "name": "keep", "age": 2 }));
    }
}
