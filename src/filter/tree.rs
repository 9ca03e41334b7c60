//! # Filter Tree
//!
//! Immutable selection tree produced by the filter parser.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

static EMPTY_TREE: FilterTree = FilterTree {
    nodes: Vec::new(),
    wildcard: false,
};

/// A single selected field and the selection nested beneath it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterNode {
    /// Field name
    pub value: String,

    /// Nested selection, empty unless the expression had a group
    pub children: FilterTree,
}

impl FilterNode {
    /// Create a node without children
    pub fn leaf(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            children: FilterTree::default(),
        }
    }

    /// Create a node with a nested selection
    pub fn with_children(value: impl Into<String>, children: Vec<FilterNode>) -> Self {
        Self {
            value: value.into(),
            children: FilterTree::from_nodes(children),
        }
    }

    /// Whether a nested selection exists
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Ordered sequence of depth-0 filter nodes
///
/// An empty tree places no restriction. The `*` expression also produces an
/// empty tree but with the wildcard flag set, so callers can tell "everything
/// was requested" apart from "nothing was specified".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterTree {
    nodes: Vec<FilterNode>,
    wildcard: bool,
}

impl FilterTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the tree for the `*` expression
    pub fn wildcard() -> Self {
        Self {
            nodes: Vec::new(),
            wildcard: true,
        }
    }

    /// Create a tree from top-level nodes
    pub fn from_nodes(nodes: Vec<FilterNode>) -> Self {
        Self {
            nodes,
            wildcard: false,
        }
    }

    /// Parse a selection expression
    pub fn parse(expression: &str) -> super::FilterResult<Self> {
        super::parser::parse(expression)
    }

    /// Whether the tree has no nodes (no restriction)
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether this tree came from the `*` expression
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// Number of top-level nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Top-level nodes in expression order
    pub fn nodes(&self) -> &[FilterNode] {
        &self.nodes
    }

    /// Iterate over top-level nodes
    pub fn iter(&self) -> std::slice::Iter<'_, FilterNode> {
        self.nodes.iter()
    }

    /// Whether a top-level node selects `field`
    pub fn contains(&self, field: &str) -> bool {
        self.nodes.iter().any(|node| node.value == field)
    }

    /// First top-level node selecting `field`
    pub fn get(&self, field: &str) -> Option<&FilterNode> {
        self.nodes.iter().find(|node| node.value == field)
    }

    /// Nested selection under `field`, or the empty tree when there is none
    pub fn subtree(&self, field: &str) -> &FilterTree {
        match self.get(field) {
            Some(node) => &node.children,
            None => &EMPTY_TREE,
        }
    }
}

impl<'a> IntoIterator for &'a FilterTree {
    type Item = &'a FilterNode;
    type IntoIter = std::slice::Iter<'a, FilterNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

/// Renders the tree back into the selection grammar
impl fmt::Display for FilterTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.wildcard {
            return write!(f, "*");
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", node)?;
        }
        Ok(())
    }
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        if self.has_children() {
            write!(f, "({})", self.children)?;
        }
        Ok(())
    }
}

impl Serialize for FilterTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.nodes.serialize(serializer)
    }
}

impl Serialize for FilterNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("value", &self.value)?;
        map.serialize_entry("children", &self.children)?;
        map.end()
    }
}
