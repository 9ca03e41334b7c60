//! # Output Filter
//!
//! Prunes a resolved map down to the requested fields.

use serde_json::{Map, Value};

use crate::filter::FilterTree;

/// Field selection over resolved documents
pub struct OutputFilter;

impl OutputFilter {
    /// Keep only the fields selected by `fields`
    ///
    /// An empty tree keeps everything. A selected key without children keeps
    /// its whole value; objects and arrays of objects below a key with
    /// children are pruned with those children.
    pub fn apply(map: Map<String, Value>, fields: &FilterTree) -> Map<String, Value> {
        if fields.is_empty() {
            return map;
        }

        map.into_iter()
            .filter(|(key, _)| fields.contains(key))
            .map(|(key, value)| {
                let pruned = Self::prune(value, fields.subtree(&key));
                (key, pruned)
            })
            .collect()
    }

    fn prune(value: Value, fields: &FilterTree) -> Value {
        match value {
            Value::Object(map) => Value::Object(Self::apply(map, fields)),
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(map) => Value::Object(Self::apply(map, fields)),
                        other => other,
                    })
                    .collect(),
            ),
            other => other,
        }
    }
}
