//! State lookups for assertions.
//!
//! Paths use the same syntax as form fields ([`FieldPath`]): `paging.current`,
//! `formProps.layout`, or a destructured raw key such as `[start,end]`. A
//! numeric segment indexes into an array, so `rows.1.id` reads the second row.

use anvil_core::FieldPath;
use serde_json::Value;

/// Find the value at `path` in `state`; `None` when any segment is missing.
pub fn lookup<'v>(state: &'v Value, path: &str) -> Option<&'v Value> {
    match FieldPath::parse(path) {
        FieldPath::Nested(segments) => segments
            .iter()
            .try_fold(state, |current, segment| step(current, segment)),
        FieldPath::Key(key) => step(state, &key),
        FieldPath::Array { raw, .. } | FieldPath::Object { raw, .. } => state.get(raw.as_str()),
    }
}

fn step<'v>(value: &'v Value, segment: &str) -> Option<&'v Value> {
    match value {
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => value.get(segment),
    }
}
