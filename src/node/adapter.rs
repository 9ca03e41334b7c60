//! # Node Adapters
//!
//! Converts host values into [`Node`]s. Optional and boxed values are
//! unwrapped here, so the walker only ever sees the inner value (or
//! [`Node::Null`] for an absent optional).
//!
//! Structs describe themselves with [`StructNode`]:
//!
//! ```ignore
//! impl ToNode for User {
//!     fn to_node(&self) -> Node {
//!         StructNode::new()
//!             .field("Id", &self.id)
//!             .with(Field::new("Name", self.name.to_node()).rename("name").omit_empty())
//!             .field("Team", &self.team)
//!             .build()
//!     }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use super::model::{Field, Node};

/// Conversion of a host value into the walker's node model
pub trait ToNode {
    fn to_node(&self) -> Node;
}

/// Builder for struct-like nodes
#[derive(Debug, Clone, Default)]
pub struct StructNode {
    fields: Vec<Field>,
}

impl StructNode {
    /// Start an empty struct
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field visible under its declared name
    pub fn field<T: ToNode + ?Sized>(self, name: &str, value: &T) -> Self {
        self.with(Field::new(name, value.to_node()))
    }

    /// Add a field exposed under `key`
    pub fn renamed<T: ToNode + ?Sized>(self, name: &str, key: &str, value: &T) -> Self {
        self.with(Field::new(name, value.to_node()).rename(key))
    }

    /// Add a field dropped from output when empty
    pub fn omit_empty<T: ToNode + ?Sized>(self, name: &str, value: &T) -> Self {
        self.with(Field::new(name, value.to_node()).omit_empty())
    }

    /// Add a fully described field
    pub fn with(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn build(self) -> Node {
        Node::Struct(self.fields)
    }
}

impl ToNode for Node {
    fn to_node(&self) -> Node {
        self.clone()
    }
}

impl ToNode for Value {
    fn to_node(&self) -> Node {
        Node::from(self)
    }
}

impl ToNode for bool {
    fn to_node(&self) -> Node {
        Node::Bool(*self)
    }
}

macro_rules! signed_to_node {
    ($($t:ty),*) => {
        $(impl ToNode for $t {
            fn to_node(&self) -> Node {
                Node::Int(i64::from(*self))
            }
        })*
    };
}

macro_rules! unsigned_to_node {
    ($($t:ty),*) => {
        $(impl ToNode for $t {
            fn to_node(&self) -> Node {
                Node::UInt(u64::from(*self))
            }
        })*
    };
}

signed_to_node!(i8, i16, i32, i64);
unsigned_to_node!(u8, u16, u32, u64);

impl ToNode for isize {
    fn to_node(&self) -> Node {
        Node::Int(*self as i64)
    }
}

impl ToNode for usize {
    fn to_node(&self) -> Node {
        Node::UInt(*self as u64)
    }
}

impl ToNode for f32 {
    fn to_node(&self) -> Node {
        Node::Float(f64::from(*self))
    }
}

impl ToNode for f64 {
    fn to_node(&self) -> Node {
        Node::Float(*self)
    }
}

impl ToNode for str {
    fn to_node(&self) -> Node {
        Node::String(self.to_string())
    }
}

impl ToNode for String {
    fn to_node(&self) -> Node {
        Node::String(self.clone())
    }
}

/// Timestamps use their RFC 3339 encoding verbatim
impl ToNode for DateTime<Utc> {
    fn to_node(&self) -> Node {
        Node::Text(self.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl<T: ToNode> ToNode for Option<T> {
    fn to_node(&self) -> Node {
        match self {
            Some(value) => value.to_node(),
            None => Node::Null,
        }
    }
}

impl<T: ToNode + ?Sized> ToNode for Box<T> {
    fn to_node(&self) -> Node {
        (**self).to_node()
    }
}

impl<T: ToNode + ?Sized> ToNode for &T {
    fn to_node(&self) -> Node {
        (**self).to_node()
    }
}

impl<T: ToNode> ToNode for [T] {
    fn to_node(&self) -> Node {
        Node::Seq(self.iter().map(ToNode::to_node).collect())
    }
}

impl<T: ToNode> ToNode for Vec<T> {
    fn to_node(&self) -> Node {
        self.as_slice().to_node()
    }
}

impl<V: ToNode> ToNode for HashMap<String, V> {
    fn to_node(&self) -> Node {
        Node::Map(self.iter().map(|(k, v)| (k.clone(), v.to_node())).collect())
    }
}

impl<V: ToNode> ToNode for BTreeMap<String, V> {
    fn to_node(&self) -> Node {
        Node::Map(self.iter().map(|(k, v)| (k.clone(), v.to_node())).collect())
    }
}
