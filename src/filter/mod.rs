//! Field selection subsystem
//!
//! Parses selection expressions such as `name,owner(email,address(city))`
//! into a [`FilterTree`]. The same grammar drives both which references get
//! expanded and which fields survive into the output.
//!
//! # Invariants
//!
//! - Bracket balance is validated before parsing
//! - `*` and the empty expression both parse to an empty tree
//! - A rejected expression must be treated as "no restriction" by callers

mod errors;
mod parser;
mod tree;

pub use errors::{FilterError, FilterResult};
pub use parser::{parse, validate};
pub use tree::{FilterNode, FilterTree};
