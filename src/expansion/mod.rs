//! Expansion subsystem
//!
//! One call runs four steps:
//! 1. parse the expansion and field expressions into a [`FilterPlan`]
//! 2. walk the object graph into a provisional map plus pending tasks
//! 3. resolve all tasks with one batch per resolver
//! 4. prune the result to the requested fields
//!
//! # Invariants
//!
//! - Every detected and selected reference yields exactly one task
//! - Every task is settled exactly once
//! - A malformed expression never fails the call; it lifts all restrictions

mod config;
mod errors;
mod expand;
mod output;
mod scheduler;
mod task;
mod walker;

pub use config::ExpanderConfig;
pub use errors::{ExpandError, ExpandResult};
pub use expand::{expand, expand_array, Expander, FilterPlan};
pub use output::OutputFilter;
pub use scheduler::{ResolutionScheduler, ScheduleSummary};
pub use task::{format_path, slot_mut, ExpansionTask, PathSegment, Placement};
pub use walker::{GraphWalker, WalkOutput};
