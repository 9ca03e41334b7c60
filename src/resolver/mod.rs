//! Reference resolution subsystem
//!
//! A [`Resolver`] recognizes one kind of reference inside the object graph
//! and resolves many of them in a single batch. Resolvers are collected in
//! an ordered [`ResolverSet`] that every expand call borrows.
//!
//! # Invariants
//!
//! - Detection tries resolvers in registration order; first match wins
//! - Resolver names are unique within a set
//! - Resolution never fails loudly: unresolved references are just absent

mod dbref;
mod errors;
mod fetcher;
mod resolver;
mod set;

pub use dbref::{DbRef, DbRefConfig, DbRefResolver, DBREF_RESOLVER_NAME};
pub use errors::{ResolverError, ResolverResult};
pub use fetcher::{MemoryFetcher, RefFetcher};
pub use resolver::{Reference, Resolver};
pub use set::ResolverSet;
