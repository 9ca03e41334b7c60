//! Observable events of the expansion pipeline
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file loaded
    ConfigLoaded,
    /// Resolver registered into a set
    ResolverRegistered,

    // Filters
    /// Expansion or field expression rejected; call proceeds unrestricted
    FilterRejected,

    // Walk
    /// Root value has a shape the walker cannot turn into a map
    WalkRootUnsupported,
    /// Reference scheduled for resolution
    TaskScheduled,

    // Scheduling
    /// One batch handed to a resolver
    ResolveBatch,
    /// Reference missing from its batch result; fallback applied
    ResolveFallback,
    /// Task refers to a resolver that is not in the set
    ResolverMissing,
    /// Task slot no longer exists in the provisional map
    TaskSlotMissing,
    /// Resolved value could not be merged into the root
    MergeRejected,

    // Backend
    /// Backend request issued by a resolver
    BackendRequest,
    /// Backend request returned nothing
    BackendNoData,
    /// Reference collection has no configured endpoint
    EndpointMissing,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ResolverRegistered => "RESOLVER_REGISTERED",

            Event::FilterRejected => "FILTER_REJECTED",

            Event::WalkRootUnsupported => "WALK_ROOT_UNSUPPORTED",
            Event::TaskScheduled => "TASK_SCHEDULED",

            Event::ResolveBatch => "RESOLVE_BATCH",
            Event::ResolveFallback => "RESOLVE_FALLBACK",
            Event::ResolverMissing => "RESOLVER_MISSING",
            Event::TaskSlotMissing => "TASK_SLOT_MISSING",
            Event::MergeRejected => "MERGE_REJECTED",

            Event::BackendRequest => "BACKEND_REQUEST",
            Event::BackendNoData => "BACKEND_NO_DATA",
            Event::EndpointMissing => "ENDPOINT_MISSING",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
