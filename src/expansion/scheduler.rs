//! # Resolution Scheduler
//!
//! Resolves pending tasks with one batch call per resolver.
//!
//! # Invariants
//!
//! - Resolvers are visited in registration order, not task order
//! - At most one `resolve_batch` call per resolver per run
//! - Every task gets exactly one outcome: success, fallback, or untouched

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::observability::{log_event_with_fields, Event, Severity};
use crate::resolver::{Reference, ResolverSet};

use super::task::ExpansionTask;

/// Outcome counts of one scheduler run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ScheduleSummary {
    /// `resolve_batch` calls made
    pub batches: u64,
    /// Tasks that received a resolved value
    pub resolved: u64,
    /// Tasks whose fallback was written
    pub fallbacks: u64,
    /// Tasks left as they were in the provisional document
    pub unresolved: u64,
}

/// Runs batch resolution against one resolver set
pub struct ResolutionScheduler<'r> {
    resolvers: &'r ResolverSet,
}

impl<'r> ResolutionScheduler<'r> {
    pub fn new(resolvers: &'r ResolverSet) -> Self {
        Self { resolvers }
    }

    /// Resolve `tasks` and write every outcome into `document`
    pub fn run(&self, tasks: Vec<ExpansionTask>, document: &mut Value) -> ScheduleSummary {
        let mut summary = ScheduleSummary::default();
        if tasks.is_empty() {
            return summary;
        }

        let mut groups: HashMap<String, Vec<ExpansionTask>> = HashMap::new();
        for task in tasks {
            groups.entry(task.resolver.clone()).or_default().push(task);
        }

        for resolver in self.resolvers.iter() {
            let Some(group) = groups.remove(resolver.name()) else {
                continue;
            };

            let references: Vec<Reference> =
                group.iter().map(|task| task.reference.clone()).collect();
            let count = references.len().to_string();
            log_event_with_fields(
                Event::ResolveBatch,
                Severity::Info,
                &[("references", count.as_str()), ("resolver", resolver.name())],
            );

            let results = resolver.resolve_batch(&references);
            summary.batches += 1;

            for task in &group {
                match results.get(&task.reference.id) {
                    Some(value) => {
                        if task.on_success(document, value.clone()) {
                            summary.resolved += 1;
                        } else {
                            summary.unresolved += 1;
                        }
                    }
                    None => Self::fall_back(task, document, &mut summary),
                }
            }
        }

        // Tasks whose resolver left the set
        for (name, group) in groups {
            let count = group.len().to_string();
            log_event_with_fields(
                Event::ResolverMissing,
                Severity::Warn,
                &[("resolver", name.as_str()), ("tasks", count.as_str())],
            );
            for task in &group {
                Self::fall_back(task, document, &mut summary);
            }
        }

        summary
    }

    fn fall_back(task: &ExpansionTask, document: &mut Value, summary: &mut ScheduleSummary) {
        log_event_with_fields(
            Event::ResolveFallback,
            Severity::Trace,
            &[
                ("reference", task.reference.id.as_str()),
                ("resolver", task.resolver.as_str()),
            ],
        );
        if task.on_failure(document) {
            summary.fallbacks += 1;
        } else {
            summary.unresolved += 1;
        }
    }
}
