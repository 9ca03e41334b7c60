//! Database reference batching tests
//!
//! Test Categories:
//! 1. One backend request per collection in bulk mode
//! 2. Each slot receives its own document regardless of ordering
//! 3. Fallback when a collection has no endpoint
//! 4. Cross-element batching for arrays

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};

use expander::resolver::{DbRef, DbRefResolver, MemoryFetcher, RefFetcher};
use expander::{Expander, ExpanderConfig, Node, ResolverSet, StructNode, ToNode};

/// Shares one fetcher between the resolver and the test body
struct SharedFetcher(Arc<MemoryFetcher>);

impl RefFetcher for SharedFetcher {
    fn get(&self, url: &str) -> Option<Value> {
        self.0.get(url)
    }
}

fn uris() -> HashMap<String, String> {
    HashMap::from([
        ("users".to_string(), "http://api/users/".to_string()),
        ("tags".to_string(), "http://api/tags/".to_string()),
    ])
}

fn bulk_fetcher() -> Arc<MemoryFetcher> {
    Arc::new(
        MemoryFetcher::new()
            .with_response(
                "http://api/users/u1,u2,",
                json!({"data": [
                    {"_id": "u2", "name": "bob"},
                    {"_id": "u1", "name": "ann"}
                ]}),
            )
            .with_response(
                "http://api/tags/t1,t2,",
                json!({"data": [
                    {"_id": "t1", "label": "rust"},
                    {"_id": "t2", "label": "json"}
                ]}),
            ),
    )
}

fn expander(fetcher: &Arc<MemoryFetcher>, config: ExpanderConfig) -> Expander {
    let resolver = DbRefResolver::new(uris(), true, Box::new(SharedFetcher(Arc::clone(fetcher))));
    let set = ResolverSet::new().with(resolver).unwrap();
    Expander::with_config(set, config)
}

fn article(author: &str, reviewer: &str, tags: &[&str]) -> Node {
    let tags: Vec<DbRef> = tags.iter().map(|t| DbRef::new("tags", *t, "main")).collect();
    StructNode::new()
        .field("title", "hello")
        .field("author", &DbRef::new("users", author, "main"))
        .field("reviewer", &DbRef::new("users", reviewer, "main"))
        .field("tags", &tags)
        .build()
}

// =============================================================================
// ONE REQUEST PER COLLECTION
// =============================================================================

#[test]
fn test_one_request_per_collection() {
    let fetcher = bulk_fetcher();
    let expander = expander(&fetcher, ExpanderConfig::default());

    let result = expander.expand(&article("u1", "u2", &["t1", "t2"]), "*", "");

    assert_eq!(fetcher.request_count(), 2);
    assert_eq!(
        fetcher.requests(),
        vec!["http://api/users/u1,u2,", "http://api/tags/t1,t2,"]
    );
    assert_eq!(result["title"], "hello");
    assert_eq!(expander.metrics().snapshot().batch_calls, 1);
}

// =============================================================================
// SLOT ASSIGNMENT
// =============================================================================

#[test]
fn test_each_slot_gets_its_own_document() {
    let fetcher = bulk_fetcher();
    let expander = expander(&fetcher, ExpanderConfig::default());

    // The users response lists u2 before u1
    let result = expander.expand(&article("u1", "u2", &["t1", "t2"]), "*", "");

    assert_eq!(result["author"]["name"], "ann");
    assert_eq!(result["reviewer"]["name"], "bob");
    assert_eq!(
        result["tags"],
        json!([{"_id": "t1", "label": "rust"}, {"_id": "t2", "label": "json"}])
    );
}

#[test]
fn test_duplicate_references_share_one_id() {
    let fetcher = Arc::new(MemoryFetcher::new().with_response(
        "http://api/users/u1,",
        json!({"data": [{"_id": "u1", "name": "ann"}]}),
    ));
    let expander = expander(&fetcher, ExpanderConfig::default());

    let result = expander.expand(&article("u1", "u1", &[]), "author,reviewer", "");

    assert_eq!(fetcher.requests(), vec!["http://api/users/u1,"]);
    assert_eq!(result["author"], result["reviewer"]);
    assert_eq!(result["tags"], json!([]));
}

// =============================================================================
// FALLBACKS
// =============================================================================

#[test]
fn test_collection_without_endpoint_falls_back() {
    let fetcher = Arc::new(MemoryFetcher::new());
    let expander = expander(&fetcher, ExpanderConfig::default());

    let node = StructNode::new()
        .field("owner", &DbRef::new("teams", "x1", "main"))
        .build();
    let result = expander.expand(&node, "*", "");

    assert_eq!(fetcher.request_count(), 0);
    assert_eq!(
        result["owner"],
        json!({"Collection": "teams", "Id": "x1", "Database": "main"})
    );
    assert_eq!(expander.metrics().snapshot().fallbacks_applied, 1);
}

#[test]
fn test_unresolved_array_element_stays_raw() {
    let fetcher = Arc::new(MemoryFetcher::new());
    let expander = expander(&fetcher, ExpanderConfig::default());

    let result = expander.expand(&article("u1", "u2", &["t9"]), "tags", "tags");

    assert_eq!(
        result["tags"],
        json!([{"Collection": "tags", "Id": "t9", "Database": "main"}])
    );
    assert_eq!(expander.metrics().snapshot().tasks_unresolved, 1);
}

// =============================================================================
// ARRAY BATCHING
// =============================================================================

#[test]
fn test_batched_array_one_request_per_collection() {
    let fetcher = bulk_fetcher();
    let expander = expander(&fetcher, ExpanderConfig::batched());

    let items = Node::Seq(vec![
        article("u1", "u2", &["t1"]),
        article("u2", "u1", &["t2"]),
    ]);
    let results = expander.expand_array(&items, "author,tags", "author(name),tags");

    assert_eq!(fetcher.request_count(), 2);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["author"], json!({"name": "ann"}));
    assert_eq!(results[1]["author"], json!({"name": "bob"}));
    assert_eq!(results[1]["tags"][0]["label"], "json");
}

#[test]
fn test_independent_array_requests_per_element() {
    let fetcher = Arc::new(
        MemoryFetcher::new()
            .with_response("http://api/users/u1,", json!({"data": [{"_id": "u1"}]}))
            .with_response("http://api/users/u2,", json!({"data": [{"_id": "u2"}]})),
    );
    let expander = expander(&fetcher, ExpanderConfig::default());

    let items = vec![
        StructNode::new().field("author", &DbRef::new("users", "u1", "")).build(),
        StructNode::new().field("author", &DbRef::new("users", "u2", "")).build(),
    ];
    let results = expander.expand_array(&items.to_node(), "author", "");

    assert_eq!(fetcher.request_count(), 2);
    assert_eq!(results[0]["author"]["_id"], "u1");
    assert_eq!(results[1]["author"]["_id"], "u2");
}

#[test]
fn test_root_reference_is_merged() {
    let fetcher = Arc::new(MemoryFetcher::new().with_response(
        "http://api/users/u1,",
        json!({"data": [{"_id": "u1", "name": "ann"}]}),
    ));
    let expander = expander(&fetcher, ExpanderConfig::default());

    let result = expander.expand_object(&DbRef::new("users", "u1", "main"), "*", "");
    assert_eq!(Value::Object(result), json!({"_id": "u1", "name": "ann"}));
}
