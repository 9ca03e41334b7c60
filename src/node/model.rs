//! # Node Model
//!
//! Closed set of shapes the graph walker understands. Host types are turned
//! into nodes by the adapter layer; the walker never inspects anything else.

use serde_json::{Map, Number, Value};

use super::empty::is_empty_value;

/// A value in the object graph
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Node {
    /// Absent optional or null
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    /// Value with its own canonical text encoding (timestamps)
    Text(String),
    Seq(Vec<Node>),
    /// Mapping with string keys, in insertion order
    Map(Vec<(String, Node)>),
    /// Struct-like value: named fields in declaration order
    Struct(Vec<Field>),
}

/// A named struct field with its serialization metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Declared field name
    pub name: String,
    /// Externally-visible name, if different from the declared one
    pub rename: Option<String>,
    /// Drop the key from output when the value is semantically empty
    pub omit_empty: bool,
    pub value: Node,
}

impl Field {
    /// Create a field visible under its declared name
    pub fn new(name: impl Into<String>, value: Node) -> Self {
        Self {
            name: name.into(),
            rename: None,
            omit_empty: false,
            value,
        }
    }

    /// Expose the field under a different key
    pub fn rename(mut self, key: impl Into<String>) -> Self {
        self.rename = Some(key.into());
        self
    }

    /// Omit the field from output when its value is empty
    pub fn omit_empty(mut self) -> Self {
        self.omit_empty = true;
        self
    }

    /// The key this field appears under in output
    pub fn key(&self) -> &str {
        self.rename.as_deref().unwrap_or(&self.name)
    }
}

impl Node {
    /// Look up a struct field by declared name or a map entry by key
    pub fn member(&self, name: &str) -> Option<&Node> {
        match self {
            Node::Struct(fields) => fields.iter().find(|f| f.name == name).map(|f| &f.value),
            Node::Map(entries) => entries.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Text content of string-like nodes
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) | Node::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render the node as JSON without any expansion
    ///
    /// Struct fields use their external keys and honor omit-if-empty.
    /// Non-finite floats render as null.
    pub fn to_value(&self) -> Value {
        match self {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Int(i) => Value::Number((*i).into()),
            Node::UInt(u) => Value::Number((*u).into()),
            Node::Float(f) => float_value(*f),
            Node::String(s) | Node::Text(s) => Value::String(s.clone()),
            Node::Seq(items) => Value::Array(items.iter().map(Node::to_value).collect()),
            Node::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect(),
            ),
            Node::Struct(fields) => {
                let mut map = Map::new();
                for field in fields {
                    let value = field.value.to_value();
                    if field.omit_empty && is_empty_value(&value) {
                        continue;
                    }
                    map.insert(field.key().to_string(), value);
                }
                Value::Object(map)
            }
        }
    }
}

/// Convert a float to JSON, mapping NaN and infinities to null
fn float_value(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

/// JSON objects become struct-like nodes so references inside decoded
/// documents are detected the same way as in host structs.
impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Node::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Node::UInt(u)
                } else {
                    Node::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            Value::String(s) => Node::String(s),
            Value::Array(items) => Node::Seq(items.into_iter().map(Node::from).collect()),
            Value::Object(map) => Node::Struct(
                map.into_iter()
                    .map(|(k, v)| Field::new(k, Node::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for Node {
    fn from(value: &Value) -> Self {
        Node::from(value.clone())
    }
}
