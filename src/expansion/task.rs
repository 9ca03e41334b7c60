//! # Expansion Tasks
//!
//! A task is one pending reference resolution. Instead of a closure over
//! the output map, a task records where its result goes: the absolute path
//! of the slot inside the provisional document and how to place the value
//! there. Each task therefore owns its own copy of the key or index.

use std::fmt;

use serde_json::{Map, Value};

use crate::node::is_empty_value;
use crate::observability::{log_event_with_fields, Event, Severity};
use crate::resolver::Reference;

/// One step into a JSON document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, ".{}", key),
            PathSegment::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// Render a path as `.a[0].b`, or `$` for the root
pub fn format_path(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return "$".to_string();
    }
    path.iter().map(PathSegment::to_string).collect()
}

/// How a resolved value is written into its slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Merge the resolved object's keys into the object at the path
    Merge,
    /// Set the object key named by the last path segment
    Field { omit_empty: bool },
    /// Replace the array element named by the last path segment
    Element,
}

/// A pending reference resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionTask {
    /// Name of the resolver that detected the reference
    pub resolver: String,
    pub reference: Reference,
    /// Absolute path of the slot in the provisional document
    pub path: Vec<PathSegment>,
    pub placement: Placement,
    /// Value written when the reference stays unresolved
    pub fallback: Option<Value>,
}

impl ExpansionTask {
    pub fn new(
        resolver: impl Into<String>,
        reference: Reference,
        path: Vec<PathSegment>,
        placement: Placement,
    ) -> Self {
        Self {
            resolver: resolver.into(),
            reference,
            path,
            placement,
            fallback: None,
        }
    }

    /// Attach the value written on failure
    pub fn with_fallback(mut self, fallback: Value) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Write a resolved value into the document
    ///
    /// Returns false when the slot no longer exists or the value cannot be
    /// placed there.
    pub fn on_success(&self, root: &mut Value, value: Value) -> bool {
        self.place(root, value)
    }

    /// Write the fallback value, if any
    ///
    /// Returns false when there is no fallback or it could not be placed.
    /// The document is left untouched in both cases.
    pub fn on_failure(&self, root: &mut Value) -> bool {
        match &self.fallback {
            Some(fallback) => self.place(root, fallback.clone()),
            None => false,
        }
    }

    fn place(&self, root: &mut Value, value: Value) -> bool {
        match self.placement {
            Placement::Merge => match (slot_mut(root, &self.path), value) {
                (Some(Value::Object(target)), Value::Object(resolved)) => {
                    merge_into(target, resolved);
                    true
                }
                (Some(_), _) => {
                    let path = format_path(&self.path);
                    log_event_with_fields(
                        Event::MergeRejected,
                        Severity::Warn,
                        &[("path", path.as_str()), ("resolver", self.resolver.as_str())],
                    );
                    false
                }
                (None, _) => self.slot_missing(),
            },
            Placement::Field { omit_empty } => {
                let Some((PathSegment::Key(key), parent)) = self.path.split_last() else {
                    return self.slot_missing();
                };
                match slot_mut(root, parent) {
                    Some(Value::Object(map)) => {
                        if omit_empty && is_empty_value(&value) {
                            map.remove(key);
                        } else {
                            map.insert(key.clone(), value);
                        }
                        true
                    }
                    _ => self.slot_missing(),
                }
            }
            Placement::Element => match slot_mut(root, &self.path) {
                Some(slot) if matches!(self.path.last(), Some(PathSegment::Index(_))) => {
                    *slot = value;
                    true
                }
                _ => self.slot_missing(),
            },
        }
    }

    fn slot_missing(&self) -> bool {
        let path = format_path(&self.path);
        log_event_with_fields(
            Event::TaskSlotMissing,
            Severity::Warn,
            &[
                ("path", path.as_str()),
                ("reference", self.reference.id.as_str()),
                ("resolver", self.resolver.as_str()),
            ],
        );
        false
    }
}

/// Follow `path` from `root`
pub fn slot_mut<'a>(root: &'a mut Value, path: &[PathSegment]) -> Option<&'a mut Value> {
    path.iter().try_fold(root, |current, segment| match segment {
        PathSegment::Key(key) => current.get_mut(key.as_str()),
        PathSegment::Index(index) => current.get_mut(*index),
    })
}

fn merge_into(target: &mut Map<String, Value>, resolved: Map<String, Value>) {
    for (key, value) in resolved {
        target.insert(key, value);
    }
}
