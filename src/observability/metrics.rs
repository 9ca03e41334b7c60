//! Expansion metrics registry
//!
//! - Counters only
//! - Monotonic increase
//! - Thread-safe but lock-minimal

use std::sync::atomic::{AtomicU64, Ordering};

/// Operational counters for an expander
///
/// All counters use Relaxed atomics; values are exact once the
/// incrementing call has returned.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Completed expand calls (one per array element in array calls)
    expansions: AtomicU64,
    /// Filter expressions rejected and downgraded
    filters_rejected: AtomicU64,
    /// Expansion tasks created by walks
    tasks_scheduled: AtomicU64,
    /// Batch calls made to resolvers
    batch_calls: AtomicU64,
    /// Tasks that received a resolved value
    references_resolved: AtomicU64,
    /// Tasks that fell back to the raw value
    fallbacks_applied: AtomicU64,
    /// Tasks left without a value (no fallback, or missing slot)
    tasks_unresolved: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_expansions(&self) {
        self.expansions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_filters_rejected(&self) {
        self.filters_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_tasks_scheduled(&self, count: u64) {
        self.tasks_scheduled.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_batch_calls(&self, count: u64) {
        self.batch_calls.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_references_resolved(&self, count: u64) {
        self.references_resolved.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_fallbacks_applied(&self, count: u64) {
        self.fallbacks_applied.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_tasks_unresolved(&self, count: u64) {
        self.tasks_unresolved.fetch_add(count, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            expansions: self.expansions.load(Ordering::Relaxed),
            filters_rejected: self.filters_rejected.load(Ordering::Relaxed),
            tasks_scheduled: self.tasks_scheduled.load(Ordering::Relaxed),
            batch_calls: self.batch_calls.load(Ordering::Relaxed),
            references_resolved: self.references_resolved.load(Ordering::Relaxed),
            fallbacks_applied: self.fallbacks_applied.load(Ordering::Relaxed),
            tasks_unresolved: self.tasks_unresolved.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    pub expansions: u64,
    pub filters_rejected: u64,
    pub tasks_scheduled: u64,
    pub batch_calls: u64,
    pub references_resolved: u64,
    pub fallbacks_applied: u64,
    pub tasks_unresolved: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let registry = MetricsRegistry::new();
        assert_eq!(registry.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_increment_counters() {
        let registry = MetricsRegistry::new();

        registry.increment_expansions();
        registry.increment_expansions();
        registry.increment_filters_rejected();
        registry.add_tasks_scheduled(5);
        registry.add_batch_calls(1);
        registry.add_references_resolved(4);
        registry.add_fallbacks_applied(1);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.expansions, 2);
        assert_eq!(snapshot.filters_rejected, 1);
        assert_eq!(snapshot.tasks_scheduled, 5);
        assert_eq!(snapshot.batch_calls, 1);
        assert_eq!(snapshot.references_resolved, 4);
        assert_eq!(snapshot.fallbacks_applied, 1);
        assert_eq!(snapshot.tasks_unresolved, 0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let registry = MetricsRegistry::new();
        registry.add_batch_calls(2);

        let value = serde_json::to_value(registry.snapshot()).unwrap();
        assert_eq!(value["batch_calls"], 2);
        assert_eq!(value["expansions"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let mut handles = vec![];

        for _ in 0..8 {
            let reg = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    reg.increment_expansions();
                    reg.add_tasks_scheduled(2);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.expansions, 800);
        assert_eq!(snapshot.tasks_scheduled, 1600);
    }
}
