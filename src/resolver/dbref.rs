//! # Database Reference Resolver
//!
//! Detects database references (`{collection, id, database}` triples) and
//! loads the referenced documents over a [`RefFetcher`].
//!
//! Two request modes:
//! - single: one request per document at `base + id`
//! - bulk: one request per collection at `base + "id1,id2,"`, answered with
//!   `{"data": [{"_id": ...}, ...]}`
//!
//! Ids are deduplicated per collection. A collection without an endpoint is
//! skipped and its references fall back to their raw values.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::node::{Node, StructNode, ToNode};
use crate::observability::{log_event_with_fields, Event, Severity};

use super::errors::{ResolverError, ResolverResult};
use super::fetcher::RefFetcher;
use super::resolver::{Reference, Resolver};

/// Name under which database references are grouped
pub const DBREF_RESOLVER_NAME: &str = "DbRefResolver";

const OBJECT_ID_PREFIX: &str = "ObjectId(";

/// A reference to a document in another collection
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DbRef {
    pub collection: String,
    pub id: String,
    #[serde(default)]
    pub database: String,
}

impl DbRef {
    pub fn new(
        collection: impl Into<String>,
        id: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
            database: database.into(),
        }
    }

    /// Recognize a database reference
    ///
    /// The node must be struct-like with exactly three fields named
    /// collection, id (or `_id`) and database, compared case-insensitively.
    /// Collection and id must be non-empty.
    pub fn from_node(node: &Node) -> Option<DbRef> {
        let fields: Vec<(&str, &Node)> = match node {
            Node::Struct(fields) => fields.iter().map(|f| (f.name.as_str(), &f.value)).collect(),
            Node::Map(entries) => entries.iter().map(|(k, v)| (k.as_str(), v)).collect(),
            _ => return None,
        };
        if fields.len() != 3 {
            return None;
        }

        let mut collection = None;
        let mut id = None;
        let mut database = None;
        for (name, value) in fields {
            match name.to_ascii_lowercase().as_str() {
                "collection" => collection = Some(value.as_str()?.to_string()),
                "id" | "_id" => id = Some(id_text(value)?),
                "database" => {
                    database = Some(match value {
                        Node::Null => String::new(),
                        other => other.as_str()?.to_string(),
                    })
                }
                _ => return None,
            }
        }

        let collection = collection.filter(|c| !c.is_empty())?;
        let id = id.filter(|i| !i.is_empty())?;
        Some(DbRef {
            collection,
            id,
            database: database?,
        })
    }

    /// Key identifying the referenced document across collections
    pub fn unique_key(&self) -> String {
        reference_key(&self.collection, &self.id)
    }
}

/// Reference id for `id` in `collection`
///
/// The collection is length-prefixed so no collection/id pair can produce
/// another pair's key, whatever characters either contains.
fn reference_key(collection: &str, id: &str) -> String {
    format!("{}:{}.{}", collection.len(), collection, id)
}

impl ToNode for DbRef {
    fn to_node(&self) -> Node {
        StructNode::new()
            .field("Collection", &self.collection)
            .field("Id", &self.id)
            .field("Database", &self.database)
            .build()
    }
}

/// Text form of an id, with any `ObjectId(...)` wrapper removed
fn id_text(value: &Node) -> Option<String> {
    let text = match value {
        Node::String(s) | Node::Text(s) => s.clone(),
        Node::Int(i) => i.to_string(),
        Node::UInt(u) => u.to_string(),
        _ => return None,
    };

    match text.strip_prefix(OBJECT_ID_PREFIX) {
        Some(rest) => Some(rest.trim_end_matches(')').trim_matches('"').to_string()),
        None => Some(text),
    }
}

fn default_bulk_requests() -> bool {
    false
}

/// Endpoint configuration for [`DbRefResolver`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DbRefConfig {
    /// Collection name to base URI; ids are appended verbatim
    #[serde(default)]
    pub uris: HashMap<String, String>,

    /// Fetch each collection's documents with one request
    #[serde(default = "default_bulk_requests")]
    pub bulk_requests: bool,
}

impl DbRefConfig {
    /// Validate every configured endpoint
    pub fn validate(&self) -> ResolverResult<()> {
        for (collection, uri) in &self.uris {
            if uri.is_empty() || !(uri.contains("://") || uri.starts_with('/')) {
                return Err(ResolverError::InvalidEndpoint {
                    collection: collection.clone(),
                    uri: uri.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Resolver for database references
pub struct DbRefResolver {
    uris: HashMap<String, String>,
    bulk_requests: bool,
    fetcher: Box<dyn RefFetcher>,
}

impl DbRefResolver {
    pub fn new(
        uris: HashMap<String, String>,
        bulk_requests: bool,
        fetcher: Box<dyn RefFetcher>,
    ) -> Self {
        Self {
            uris,
            bulk_requests,
            fetcher,
        }
    }

    /// Build a resolver from validated configuration
    pub fn from_config(config: &DbRefConfig, fetcher: Box<dyn RefFetcher>) -> ResolverResult<Self> {
        config.validate()?;
        Ok(Self::new(config.uris.clone(), config.bulk_requests, fetcher))
    }

    pub fn bulk_requests(&self) -> bool {
        self.bulk_requests
    }

    /// Unique ids per collection, both in first-appearance order
    fn group_by_collection(references: &[Reference]) -> Vec<(String, Vec<String>)> {
        let mut groups: Vec<(String, Vec<String>)> = Vec::new();
        for reference in references {
            let Some(dbref) = DbRef::from_node(&reference.payload) else {
                continue;
            };
            match groups.iter_mut().find(|(c, _)| *c == dbref.collection) {
                Some((_, ids)) => {
                    if !ids.contains(&dbref.id) {
                        ids.push(dbref.id);
                    }
                }
                None => groups.push((dbref.collection, vec![dbref.id])),
            }
        }
        groups
    }

    fn endpoint(&self, collection: &str) -> Option<&str> {
        let base = self.uris.get(collection).map(String::as_str);
        if base.is_none() {
            log_event_with_fields(
                Event::EndpointMissing,
                Severity::Warn,
                &[("collection", collection)],
            );
        }
        base
    }

    fn fetch(&self, url: &str) -> Option<Value> {
        log_event_with_fields(Event::BackendRequest, Severity::Trace, &[("url", url)]);
        match self.fetcher.get(url) {
            Some(Value::Null) | None => {
                log_event_with_fields(Event::BackendNoData, Severity::Warn, &[("url", url)]);
                None
            }
            Some(body) => Some(body),
        }
    }

    fn resolve_single(&self, collection: &str, ids: &[String], out: &mut HashMap<String, Value>) {
        let Some(base) = self.endpoint(collection) else {
            return;
        };
        for id in ids {
            if let Some(body) = self.fetch(&format!("{}{}", base, id)) {
                out.insert(reference_key(collection, id), body);
            }
        }
    }

    fn resolve_bulk(&self, collection: &str, ids: &[String], out: &mut HashMap<String, Value>) {
        let Some(base) = self.endpoint(collection) else {
            return;
        };
        let id_list: String = ids.iter().map(|id| format!("{},", id)).collect();
        let Some(body) = self.fetch(&format!("{}{}", base, id_list)) else {
            return;
        };

        let items = match body.get("data").and_then(Value::as_array) {
            Some(items) => items,
            None => {
                log_event_with_fields(
                    Event::BackendNoData,
                    Severity::Warn,
                    &[("collection", collection), ("reason", "missing data array")],
                );
                return;
            }
        };
        for item in items {
            let Some(id) = item.get("_id").map(Node::from).and_then(|n| id_text(&n)) else {
                continue;
            };
            out.insert(reference_key(&collection, &id), item.clone());
        }
    }
}

impl Resolver for DbRefResolver {
    fn name(&self) -> &str {
        DBREF_RESOLVER_NAME
    }

    fn detect(&self, node: &Node) -> Option<Reference> {
        let dbref = DbRef::from_node(node)?;
        Some(Reference::new(dbref.unique_key(), dbref.to_node()))
    }

    fn resolve_batch(&self, references: &[Reference]) -> HashMap<String, Value> {
        let mut out = HashMap::new();
        for (collection, ids) in Self::group_by_collection(references) {
            if self.bulk_requests {
                self.resolve_bulk(&collection, &ids, &mut out);
            } else {
                self.resolve_single(&collection, &ids, &mut out);
            }
        }
        out
    }
}
