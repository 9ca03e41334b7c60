//! # Resolver Set
//!
//! Ordered collection of resolvers handed to every expand call.
//! Detection tries resolvers in registration order; the first match wins.

use std::fmt;

use crate::node::Node;
use crate::observability::{log_event_with_fields, Event, Severity};

use super::errors::{ResolverError, ResolverResult};
use super::resolver::{Reference, Resolver};

/// Ordered set of resolvers with unique names
#[derive(Default)]
pub struct ResolverSet {
    resolvers: Vec<Box<dyn Resolver>>,
}

impl ResolverSet {
    /// Create an empty set (nothing is ever detected)
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resolver after the existing ones
    pub fn add(&mut self, resolver: impl Resolver + 'static) -> ResolverResult<()> {
        self.add_boxed(Box::new(resolver))
    }

    /// Register an already boxed resolver
    pub fn add_boxed(&mut self, resolver: Box<dyn Resolver>) -> ResolverResult<()> {
        if self.get(resolver.name()).is_some() {
            return Err(ResolverError::AlreadyRegistered(resolver.name().to_string()));
        }

        log_event_with_fields(
            Event::ResolverRegistered,
            Severity::Info,
            &[("resolver", resolver.name())],
        );
        self.resolvers.push(resolver);
        Ok(())
    }

    /// Builder-style registration
    pub fn with(mut self, resolver: impl Resolver + 'static) -> ResolverResult<Self> {
        self.add(resolver)?;
        Ok(self)
    }

    /// Remove every resolver
    pub fn clear(&mut self) {
        self.resolvers.clear();
    }

    /// Look up a resolver by name
    pub fn get(&self, name: &str) -> Option<&dyn Resolver> {
        self.resolvers
            .iter()
            .find(|r| r.name() == name)
            .map(|r| r.as_ref())
    }

    /// Resolvers in registration order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Resolver> + '_ {
        self.resolvers.iter().map(|r| r.as_ref())
    }

    /// Resolver names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// First resolver that recognizes `node`, with the reference it produced
    pub fn detect(&self, node: &Node) -> Option<(&dyn Resolver, Reference)> {
        self.resolvers
            .iter()
            .find_map(|r| r.detect(node).map(|reference| (r.as_ref(), reference)))
    }
}

impl fmt::Debug for ResolverSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverSet")
            .field("resolvers", &self.names())
            .finish()
    }
}
