//! # Resolver Capability

use std::collections::HashMap;

use serde_json::Value;

use crate::node::Node;

/// A detected reference to externally stored data
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    /// Key under which the resolver reports the resolved value
    pub id: String,
    /// Whatever the resolver needs to fetch the data later
    pub payload: Node,
}

impl Reference {
    pub fn new(id: impl Into<String>, payload: Node) -> Self {
        Self {
            id: id.into(),
            payload,
        }
    }
}

/// Recognizes references of one kind and resolves them in batches
///
/// Implementations must not fail loudly: a reference that cannot be
/// resolved (missing data, unreachable backend) is left out of the
/// returned map and the expander falls back to the raw value.
pub trait Resolver: Send + Sync {
    /// Unique name; tasks are grouped under it
    fn name(&self) -> &str;

    /// Decide whether `node` is a reference of this kind
    fn detect(&self, node: &Node) -> Option<Reference>;

    /// Resolve all references in one go, keyed by [`Reference::id`]
    fn resolve_batch(&self, references: &[Reference]) -> HashMap<String, Value>;
}
