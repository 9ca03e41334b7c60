//! Expansion pipeline properties
//!
//! Test Categories:
//! 1. Plain objects without references
//! 2. Field selection
//! 3. Omit-if-empty handling
//! 4. Malformed expressions
//! 5. Arrays

use std::collections::{BTreeMap, HashMap};

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use expander::resolver::{DbRef, DbRefResolver, MemoryFetcher};
use expander::{expand, expand_array, Expander, Node, ResolverSet, StructNode, ToNode};

struct SimpleSingleLevel {
    s: String,
    b: bool,
    i: i64,
    f: f64,
    ui: u32,
}

impl ToNode for SimpleSingleLevel {
    fn to_node(&self) -> Node {
        StructNode::new()
            .field("S", &self.s)
            .field("B", &self.b)
            .field("I", &self.i)
            .field("F", &self.f)
            .field("UI", &self.ui)
            .build()
    }
}

struct SimpleMultiLevel {
    si: Vec<i32>,
    msb: BTreeMap<String, bool>,
}

impl ToNode for SimpleMultiLevel {
    fn to_node(&self) -> Node {
        StructNode::new()
            .field("SI", &self.si)
            .field("MSB", &self.msb)
            .build()
    }
}

struct ComplexSingleLevel {
    s: String,
    ssl: SimpleSingleLevel,
}

impl ToNode for ComplexSingleLevel {
    fn to_node(&self) -> Node {
        StructNode::new()
            .field("S", &self.s)
            .field("SSL", &self.ssl)
            .build()
    }
}

struct SimpleWithDbRef {
    name: String,
    reference: DbRef,
}

impl ToNode for SimpleWithDbRef {
    fn to_node(&self) -> Node {
        StructNode::new()
            .omit_empty("Name", &self.name)
            .renamed("Ref", "ref", &self.reference)
            .build()
    }
}

struct SimpleWithTime {
    name: String,
    time: chrono::DateTime<Utc>,
}

impl ToNode for SimpleWithTime {
    fn to_node(&self) -> Node {
        StructNode::new()
            .field("Name", &self.name)
            .field("Time", &self.time)
            .build()
    }
}

fn single_level() -> SimpleSingleLevel {
    SimpleSingleLevel {
        s: "bar".into(),
        b: false,
        i: -1,
        f: 1.1,
        ui: 1,
    }
}

fn dbref_expander() -> Expander {
    let fetcher = MemoryFetcher::new()
        .with_response("http://api/users/1", json!({"_id": "1", "name": "ann"}));
    let uris = HashMap::from([("users".to_string(), "http://api/users/".to_string())]);

    let set = ResolverSet::new()
        .with(DbRefResolver::new(uris, false, Box::new(fetcher)))
        .unwrap();
    Expander::new(set)
}

// =============================================================================
// PLAIN OBJECTS
// =============================================================================

#[test]
fn test_absent_input_gives_empty_map() {
    assert!(expand(&Node::Null, &ResolverSet::new(), "", "").is_empty());
}

#[test]
fn test_plain_object_unchanged() {
    let result = expand(&single_level().to_node(), &ResolverSet::new(), "*", "");

    assert_eq!(
        Value::Object(result),
        json!({"S": "bar", "B": false, "I": -1, "F": 1.1, "UI": 1})
    );
}

#[test]
fn test_nested_collections_unchanged() {
    let object = SimpleMultiLevel {
        si: vec![1, 2],
        msb: BTreeMap::from([("key1".to_string(), true), ("key2".to_string(), false)]),
    };
    let result = expand(&object.to_node(), &ResolverSet::new(), "*", "");

    assert_eq!(result["SI"], json!([1, 2]));
    assert_eq!(result["MSB"], json!({"key1": true, "key2": false}));
}

#[test]
fn test_nested_struct_unchanged() {
    let object = ComplexSingleLevel {
        s: "a string".into(),
        ssl: single_level(),
    };
    let result = expand(&object.to_node(), &ResolverSet::new(), "*", "");

    assert_eq!(result["S"], "a string");
    assert_eq!(
        result["SSL"],
        json!({"S": "bar", "B": false, "I": -1, "F": 1.1, "UI": 1})
    );
}

#[test]
fn test_timestamp_rendered_as_text() {
    let object = SimpleWithTime {
        name: "foo".into(),
        time: Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap(),
    };
    let result = expand(&object.to_node(), &ResolverSet::new(), "*", "");

    assert_eq!(result["Name"], "foo");
    assert_eq!(result["Time"], "2021-03-04T05:06:07Z");
}

// =============================================================================
// FIELD SELECTION
// =============================================================================

#[test]
fn test_field_selection_keeps_only_requested() {
    let result = expand(&single_level().to_node(), &ResolverSet::new(), "*", "S,I");
    assert_eq!(Value::Object(result), json!({"S": "bar", "I": -1}));
}

#[test]
fn test_nested_field_selection() {
    let object = ComplexSingleLevel {
        s: "a string".into(),
        ssl: single_level(),
    };
    let result = expand(&object.to_node(), &ResolverSet::new(), "*", "SSL(B,UI)");
    assert_eq!(Value::Object(result), json!({"SSL": {"B": false, "UI": 1}}));
}

#[test]
fn test_expansion_follows_field_list() {
    let expander = dbref_expander();
    let object = SimpleWithDbRef {
        name: "post".into(),
        reference: DbRef::new("users", "1", "main"),
    };

    let result = expander.expand_object(&object, "*", "ref");
    assert_eq!(Value::Object(result), json!({"ref": {"_id": "1", "name": "ann"}}));

    let result = expander.expand_object(&object, "ref", "");
    assert_eq!(result["ref"]["name"], "ann");
    assert_eq!(result["Name"], "post");
}

#[test]
fn test_unselected_reference_stays_raw() {
    let expander = dbref_expander();
    let object = SimpleWithDbRef {
        name: "post".into(),
        reference: DbRef::new("users", "1", "main"),
    };

    let result = expander.expand_object(&object, "Name", "");
    assert_eq!(
        result["ref"],
        json!({"Collection": "users", "Id": "1", "Database": "main"})
    );
}

// =============================================================================
// OMIT-IF-EMPTY
// =============================================================================

#[test]
fn test_omit_empty_string_field() {
    let expander = dbref_expander();

    let empty = SimpleWithDbRef {
        name: String::new(),
        reference: DbRef::new("users", "1", "main"),
    };
    let result = expander.expand_object(&empty, "*", "");
    assert!(!result.contains_key("Name"));
    assert!(result.contains_key("ref"));

    let named = SimpleWithDbRef {
        name: "x".into(),
        reference: DbRef::new("users", "1", "main"),
    };
    let result = expander.expand_object(&named, "*", "");
    assert_eq!(result["Name"], "x");
}

#[test]
fn test_omit_empty_zero_time() {
    let node = StructNode::new()
        .omit_empty("Created", expander::node::ZERO_TIME_LITERAL)
        .field("Id", &1u8)
        .build();

    let result = expand(&node, &ResolverSet::new(), "*", "");
    assert_eq!(Value::Object(result), json!({"Id": 1}));
}

// =============================================================================
// MALFORMED EXPRESSIONS
// =============================================================================

#[test]
fn test_malformed_expansion_leaves_reference_raw() {
    let expander = dbref_expander();
    let object = SimpleWithDbRef {
        name: "post".into(),
        reference: DbRef::new("users", "1", "main"),
    };

    let result = expander.expand_object(&object, "*,((", "");
    assert_eq!(result["ref"]["Collection"], "users");
    assert_eq!(result["Name"], "post");
    assert_eq!(expander.metrics().snapshot().filters_rejected, 1);
}

#[test]
fn test_malformed_fields_keep_everything() {
    let result = expand(&single_level().to_node(), &ResolverSet::new(), "*", "S)");
    assert_eq!(result.len(), 5);
}

// =============================================================================
// ARRAYS
// =============================================================================

#[test]
fn test_expand_array_matches_single_expansion() {
    let set = ResolverSet::new();
    let items: Vec<SimpleSingleLevel> = (0..3)
        .map(|i| SimpleSingleLevel {
            i,
            ..single_level()
        })
        .collect();

    let results = expand_array(&items.to_node(), &set, "*", "");
    assert_eq!(results.len(), 3);
    for (item, result) in items.iter().zip(&results) {
        assert_eq!(result, &expand(&item.to_node(), &set, "*", ""));
    }
}

#[test]
fn test_expand_array_non_sequence() {
    let results = expand_array(&single_level().to_node(), &ResolverSet::new(), "*", "");
    assert!(results.is_empty());
}
