//! Deep merge helpers over `serde_json::Value` trees.
//!
//! Three policies are used everywhere state or configuration is combined:
//!
//! - [`merge`]: the patch wins, objects merge recursively, arrays concatenate.
//! - [`defaults_deep`]: existing values win, the source only fills gaps.
//! - [`assign_deep`]: like [`merge`], but arrays are replaced. Used for model
//!   data, where a list value is a single field value.
//!
//! `null` in a patch behaves like an absent key.

use serde_json::map::Entry;
use serde_json::Value;

/// How a patch is combined with existing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// Deep merge; patch values overwrite, arrays are appended.
    #[default]
    Merge,
    /// Deep defaults; existing values are kept.
    Defaults,
    /// Deep merge; patch values overwrite, arrays are replaced.
    Assign,
}

/// Deep-merge `source` into `target`.
///
/// ```
/// use anvil_core::merge;
/// use serde_json::json;
///
/// let mut state = json!({ "items": [1], "props": { "a": 1 } });
/// merge(&mut state, json!({ "items": [2], "props": { "b": 2 } }));
/// assert_eq!(state, json!({ "items": [1, 2], "props": { "a": 1, "b": 2 } }));
/// ```
pub fn merge(target: &mut Value, source: Value) {
    match (target, source) {
        (_, Value::Null) => {}
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.entry(key) {
                    Entry::Occupied(mut slot) => merge(slot.get_mut(), value),
                    Entry::Vacant(slot) => {
                        if !value.is_null() {
                            slot.insert(value);
                        }
                    }
                }
            }
        }
        (Value::Array(target), Value::Array(source)) => target.extend(source),
        (target, source) => *target = source,
    }
}

/// Deep-merge `source` into `target`, replacing arrays instead of appending.
pub fn assign_deep(target: &mut Value, source: Value) {
    match (target, source) {
        (_, Value::Null) => {}
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.entry(key) {
                    Entry::Occupied(mut slot) => assign_deep(slot.get_mut(), value),
                    Entry::Vacant(slot) => {
                        if !value.is_null() {
                            slot.insert(value);
                        }
                    }
                }
            }
        }
        (target, source) => *target = source,
    }
}

/// Fill every gap of `target` with the matching value from `source`.
///
/// A `null` target is treated as missing and replaced wholesale.
pub fn defaults_deep(target: &mut Value, source: &Value) {
    if target.is_null() {
        *target = source.clone();
        return;
    }
    if let (Value::Object(target), Value::Object(source)) = (target, source) {
        for (key, value) in source {
            match target.entry(key.clone()) {
                Entry::Occupied(mut slot) => defaults_deep(slot.get_mut(), value),
                Entry::Vacant(slot) => {
                    slot.insert(value.clone());
                }
            }
        }
    }
}

/// Combine `source` into `target` with the given policy.
pub fn merge_with(target: &mut Value, source: Value, mode: MergeMode) {
    match mode {
        MergeMode::Merge => merge(target, source),
        MergeMode::Defaults => defaults_deep(target, &source),
        MergeMode::Assign => assign_deep(target, source),
    }
}
