//! Value model walked by the expander
//!
//! Host data is converted into a [`Node`] tree by the adapter layer
//! ([`ToNode`]). The tree is owned, so it cannot contain cycles.

mod adapter;
mod empty;
mod model;

pub use adapter::{StructNode, ToNode};
pub use empty::{is_empty_value, ZERO_TIME_LITERAL};
pub use model::{Field, Node};
