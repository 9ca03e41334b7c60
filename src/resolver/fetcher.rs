//! # Reference Fetchers
//!
//! Transport used by [`DbRefResolver`](super::DbRefResolver) to load
//! documents. A fetcher turns a URL into a decoded JSON body, or `None`
//! when nothing usable came back.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

/// Loads a decoded JSON document from a URL
pub trait RefFetcher: Send + Sync {
    fn get(&self, url: &str) -> Option<Value>;
}

impl<F> RefFetcher for F
where
    F: Fn(&str) -> Option<Value> + Send + Sync,
{
    fn get(&self, url: &str) -> Option<Value> {
        self(url)
    }
}

/// Serves canned responses from memory and records every request
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    responses: HashMap<String, Value>,
    requests: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the body returned for `url`
    pub fn insert(&mut self, url: impl Into<String>, body: Value) {
        self.responses.insert(url.into(), body);
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with_response(mut self, url: impl Into<String>, body: Value) -> Self {
        self.insert(url, body);
        self
    }

    /// URLs requested so far, in request order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    /// Number of requests made so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|log| log.len()).unwrap_or(0)
    }
}

impl From<HashMap<String, Value>> for MemoryFetcher {
    fn from(responses: HashMap<String, Value>) -> Self {
        Self {
            responses,
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl RefFetcher for MemoryFetcher {
    fn get(&self, url: &str) -> Option<Value> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(url.to_string());
        }
        self.responses.get(url).cloned()
    }
}
