//! # Graph Walker
//!
//! Turns a [`Node`] into a provisional JSON map and collects one
//! [`ExpansionTask`] per reference selected for expansion.
//!
//! Selection rules:
//! - a reference under a struct field or map entry is scheduled when its key
//!   is in the current filter level, or the walk is recursive
//! - a reference inside a sequence is scheduled when the sequence's key is in
//!   the current filter level, or the walk is recursive
//! - unscheduled references are written raw
//! - resolved values are never walked again

use serde_json::{Map, Value};

use crate::filter::FilterTree;
use crate::node::{is_empty_value, Node};
use crate::observability::{log_event_with_fields, Event, Severity};
use crate::resolver::ResolverSet;

use super::task::{format_path, ExpansionTask, PathSegment, Placement};

/// Result of walking one root value
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WalkOutput {
    /// Map with every unscheduled value in place
    pub provisional: Map<String, Value>,
    /// Pending resolutions, in discovery order
    pub tasks: Vec<ExpansionTask>,
}

/// Mutable state threaded through one walk
struct WalkContext {
    path: Vec<PathSegment>,
    tasks: Vec<ExpansionTask>,
}

impl WalkContext {
    fn new(prefix: Vec<PathSegment>) -> Self {
        Self {
            path: prefix,
            tasks: Vec::new(),
        }
    }

    fn child_path(&self, segment: PathSegment) -> Vec<PathSegment> {
        let mut path = self.path.clone();
        path.push(segment);
        path
    }

    fn schedule(&mut self, task: ExpansionTask) {
        let path = format_path(&task.path);
        log_event_with_fields(
            Event::TaskScheduled,
            Severity::Trace,
            &[
                ("path", path.as_str()),
                ("reference", task.reference.id.as_str()),
                ("resolver", task.resolver.as_str()),
            ],
        );
        self.tasks.push(task);
    }
}

/// Walks object graphs against one resolver set
pub struct GraphWalker<'r> {
    resolvers: &'r ResolverSet,
    recursive: bool,
}

impl<'r> GraphWalker<'r> {
    /// Create a walker
    ///
    /// In recursive mode every detected reference is scheduled regardless
    /// of the expansion filter.
    pub fn new(resolvers: &'r ResolverSet, recursive: bool) -> Self {
        Self {
            resolvers,
            recursive,
        }
    }

    /// Walk a root value whose result lives at the document root
    pub fn walk(&self, root: &Node, expansion: &FilterTree) -> WalkOutput {
        self.walk_at(root, expansion, Vec::new())
    }

    /// Walk a root value whose result will be stored at `prefix`
    ///
    /// Task paths are absolute, so several walks can share one document
    /// and one scheduler run.
    pub fn walk_at(
        &self,
        root: &Node,
        expansion: &FilterTree,
        prefix: Vec<PathSegment>,
    ) -> WalkOutput {
        let mut ctx = WalkContext::new(prefix);

        if self.recursive {
            if let Some((resolver, reference)) = self.resolvers.detect(root) {
                let task = ExpansionTask::new(
                    resolver.name(),
                    reference,
                    ctx.path.clone(),
                    Placement::Merge,
                );
                ctx.schedule(task);
                return WalkOutput {
                    provisional: Map::new(),
                    tasks: ctx.tasks,
                };
            }
        }

        let provisional = match root {
            Node::Struct(_) | Node::Map(_) => self.walk_object(root, expansion, &mut ctx),
            Node::Null => Map::new(),
            _ => {
                log_event_with_fields(Event::WalkRootUnsupported, Severity::Trace, &[]);
                Map::new()
            }
        };

        WalkOutput {
            provisional,
            tasks: ctx.tasks,
        }
    }

    /// Walk the members of a struct or map
    fn walk_object(
        &self,
        node: &Node,
        filter: &FilterTree,
        ctx: &mut WalkContext,
    ) -> Map<String, Value> {
        let mut out = Map::new();

        match node {
            Node::Struct(fields) => {
                for field in fields {
                    self.walk_member(
                        field.key(),
                        &field.value,
                        field.omit_empty,
                        filter,
                        ctx,
                        &mut out,
                    );
                }
            }
            Node::Map(entries) => {
                for (key, value) in entries {
                    self.walk_member(key, value, false, filter, ctx, &mut out);
                }
            }
            _ => {}
        }

        out
    }

    /// Walk one named member and write it into `out`
    fn walk_member(
        &self,
        key: &str,
        value: &Node,
        omit_empty: bool,
        filter: &FilterTree,
        ctx: &mut WalkContext,
        out: &mut Map<String, Value>,
    ) {
        let selected = self.recursive || filter.contains(key);

        if let Some((resolver, reference)) = self.resolvers.detect(value) {
            let raw = value.to_value();
            if selected {
                let task = ExpansionTask::new(
                    resolver.name(),
                    reference,
                    ctx.child_path(PathSegment::Key(key.to_string())),
                    Placement::Field { omit_empty },
                )
                .with_fallback(raw);
                ctx.schedule(task);
            } else {
                write_member(out, key, raw, omit_empty);
            }
            return;
        }

        let scheduled_before = ctx.tasks.len();
        ctx.path.push(PathSegment::Key(key.to_string()));
        let walked = self.walk_value(value, key, selected, filter, ctx);
        ctx.path.pop();

        if ctx.tasks.len() > scheduled_before {
            // Slots below this member are still pending
            out.insert(key.to_string(), walked);
        } else {
            write_member(out, key, walked, omit_empty);
        }
    }

    /// Walk the value of member `key`; `filter` is the level holding `key`
    fn walk_value(
        &self,
        value: &Node,
        key: &str,
        selected: bool,
        filter: &FilterTree,
        ctx: &mut WalkContext,
    ) -> Value {
        match value {
            Node::Struct(_) | Node::Map(_) => {
                Value::Object(self.walk_object(value, filter.subtree(key), ctx))
            }
            Node::Seq(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    ctx.path.push(PathSegment::Index(index));
                    out.push(self.walk_element(item, key, selected, filter, ctx));
                    ctx.path.pop();
                }
                Value::Array(out)
            }
            scalar => scalar.to_value(),
        }
    }

    /// Walk one sequence element; the current path already ends in its index
    fn walk_element(
        &self,
        item: &Node,
        key: &str,
        selected: bool,
        filter: &FilterTree,
        ctx: &mut WalkContext,
    ) -> Value {
        if selected {
            if let Some((resolver, reference)) = self.resolvers.detect(item) {
                let task = ExpansionTask::new(
                    resolver.name(),
                    reference,
                    ctx.path.clone(),
                    Placement::Element,
                );
                ctx.schedule(task);
                return item.to_value();
            }
        }
        self.walk_value(item, key, selected, filter, ctx)
    }
}

fn write_member(out: &mut Map<String, Value>, key: &str, value: Value, omit_empty: bool) {
    if omit_empty && is_empty_value(&value) {
        out.remove(key);
    } else {
        out.insert(key.to_string(), value);
    }
}
