//! expander - field selection and batched reference expansion
//!
//! Shapes an object graph into a filtered, partially expanded JSON map:
//! references selected by an expansion expression are resolved in batches,
//! then the result is pruned to the fields a caller asked for.
//!
//! ```ignore
//! use expander::{expand, ResolverSet, StructNode};
//!
//! let post = StructNode::new().field("title", "hello").build();
//! let map = expand(&post, &ResolverSet::new(), "*", "title");
//! ```

pub mod cli;
pub mod expansion;
pub mod filter;
pub mod node;
pub mod observability;
pub mod resolver;

pub use expansion::{expand, expand_array, Expander, ExpanderConfig, FilterPlan};
pub use filter::{FilterNode, FilterTree};
pub use node::{Field, Node, StructNode, ToNode};
pub use resolver::{DbRef, DbRefResolver, MemoryFetcher, Reference, Resolver, ResolverSet};
