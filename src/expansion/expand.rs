//! # Expand Pipeline
//!
//! parse → walk → schedule → filter, for one object or a sequence of them.

use serde_json::{Map, Value};

use crate::filter::FilterTree;
use crate::node::{Node, ToNode};
use crate::observability::{
    log_event_with_fields, Event, MetricsRegistry, ObservationScope, Severity, Timer,
};
use crate::resolver::ResolverSet;

use super::config::ExpanderConfig;
use super::errors::{ExpandError, ExpandResult};
use super::output::OutputFilter;
use super::scheduler::{ResolutionScheduler, ScheduleSummary};
use super::task::PathSegment;
use super::walker::GraphWalker;

/// Parsed selection for one expand call
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterPlan {
    /// Which references to expand (ignored when recursive)
    pub expansion: FilterTree,
    /// Which fields survive into the output
    pub fields: FilterTree,
    /// Expand every reference anywhere
    pub recursive: bool,
}

impl FilterPlan {
    /// Plan that expands nothing and keeps everything
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Parse both expressions
    ///
    /// - `*` expansion with a concrete field list expands those fields
    /// - `*` expansion otherwise, or both expressions empty, is recursive
    pub fn try_parse(expansion: &str, fields: &str) -> ExpandResult<Self> {
        let expansion_tree =
            FilterTree::parse(expansion).map_err(|source| ExpandError::InvalidExpansionFilter {
                expression: expansion.to_string(),
                source,
            })?;
        let fields_tree =
            FilterTree::parse(fields).map_err(|source| ExpandError::InvalidFieldFilter {
                expression: fields.to_string(),
                source,
            })?;

        let plan = if expansion_tree.is_wildcard() {
            if fields_tree.is_empty() {
                Self::recursive(fields_tree)
            } else {
                Self {
                    expansion: fields_tree.clone(),
                    fields: fields_tree,
                    recursive: false,
                }
            }
        } else if expansion_tree.is_empty() && fields_tree.is_empty() {
            Self::recursive(fields_tree)
        } else {
            Self {
                expansion: expansion_tree,
                fields: fields_tree,
                recursive: false,
            }
        };
        Ok(plan)
    }

    fn recursive(fields: FilterTree) -> Self {
        Self {
            expansion: FilterTree::new(),
            fields,
            recursive: true,
        }
    }
}

fn warn_rejected(err: &ExpandError, expansion: &str, fields: &str) {
    let reason = err.to_string();
    log_event_with_fields(
        Event::FilterRejected,
        Severity::Warn,
        &[
            ("code", err.code()),
            ("expansion", expansion),
            ("fields", fields),
            ("reason", reason.as_str()),
        ],
    );
}

/// Borrowed view of everything one call needs
struct Pipeline<'a> {
    resolvers: &'a ResolverSet,
    config: &'a ExpanderConfig,
    metrics: &'a MetricsRegistry,
}

impl Pipeline<'_> {
    fn plan(&self, expansion: &str, fields: &str) -> FilterPlan {
        match FilterPlan::try_parse(expansion, fields) {
            Ok(plan) => plan,
            Err(err) => {
                self.metrics.increment_filters_rejected();
                if self.config.warn_on_invalid_filter {
                    warn_rejected(&err, expansion, fields);
                }
                FilterPlan::unrestricted()
            }
        }
    }

    fn record(&self, tasks: usize, summary: &ScheduleSummary) {
        self.metrics.add_tasks_scheduled(tasks as u64);
        self.metrics.add_batch_calls(summary.batches);
        self.metrics.add_references_resolved(summary.resolved);
        self.metrics.add_fallbacks_applied(summary.fallbacks);
        self.metrics.add_tasks_unresolved(summary.unresolved);
    }

    fn expand(&self, node: &Node, plan: &FilterPlan) -> Map<String, Value> {
        let scope = ObservationScope::with_fields(
            "EXPAND",
            &[("recursive", if plan.recursive { "true" } else { "false" })],
        );
        let timer = Timer::new();

        let walker = GraphWalker::new(self.resolvers, plan.recursive);
        let output = walker.walk(node, &plan.expansion);
        let task_count = output.tasks.len();

        let mut document = Value::Object(output.provisional);
        let summary = ResolutionScheduler::new(self.resolvers).run(output.tasks, &mut document);
        self.record(task_count, &summary);

        let resolved = match document {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let result = OutputFilter::apply(resolved, &plan.fields);
        self.metrics.increment_expansions();

        let tasks = task_count.to_string();
        let elapsed = timer.elapsed_us();
        scope.complete_with_fields(&[("tasks", tasks.as_str()), ("us", elapsed.as_str())]);
        result
    }

    fn expand_array(&self, node: &Node, plan: &FilterPlan) -> Vec<Map<String, Value>> {
        let Node::Seq(items) = node else {
            return Vec::new();
        };

        if !self.config.batch_array_items {
            return items.iter().map(|item| self.expand(item, plan)).collect();
        }

        let scope = ObservationScope::with_fields("EXPAND_ARRAY", &[("batched", "true")]);
        let walker = GraphWalker::new(self.resolvers, plan.recursive);

        let mut provisional = Vec::with_capacity(items.len());
        let mut tasks = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let output = walker.walk_at(item, &plan.expansion, vec![PathSegment::Index(index)]);
            provisional.push(Value::Object(output.provisional));
            tasks.extend(output.tasks);
        }
        let task_count = tasks.len();

        let mut document = Value::Array(provisional);
        let summary = ResolutionScheduler::new(self.resolvers).run(tasks, &mut document);
        self.record(task_count, &summary);

        let elements = match document {
            Value::Array(elements) => elements,
            _ => Vec::new(),
        };
        let results: Vec<Map<String, Value>> = elements
            .into_iter()
            .map(|element| {
                self.metrics.increment_expansions();
                match element {
                    Value::Object(map) => OutputFilter::apply(map, &plan.fields),
                    _ => Map::new(),
                }
            })
            .collect();

        let count = results.len().to_string();
        let tasks = task_count.to_string();
        scope.complete_with_fields(&[("items", count.as_str()), ("tasks", tasks.as_str())]);
        results
    }
}

/// Expands objects against an owned resolver set
///
/// ```ignore
/// let mut expander = Expander::new(ResolverSet::new());
/// expander.resolvers_mut().add(DbRefResolver::from_config(&config, fetcher)?)?;
/// let map = expander.expand_object(&post, "author", "title,author(name)");
/// ```
#[derive(Debug, Default)]
pub struct Expander {
    resolvers: ResolverSet,
    config: ExpanderConfig,
    metrics: MetricsRegistry,
}

impl Expander {
    pub fn new(resolvers: ResolverSet) -> Self {
        Self::with_config(resolvers, ExpanderConfig::default())
    }

    pub fn with_config(resolvers: ResolverSet, config: ExpanderConfig) -> Self {
        Self {
            resolvers,
            config,
            metrics: MetricsRegistry::new(),
        }
    }

    pub fn resolvers(&self) -> &ResolverSet {
        &self.resolvers
    }

    /// Mutable access for registering resolvers between calls
    pub fn resolvers_mut(&mut self) -> &mut ResolverSet {
        &mut self.resolvers
    }

    pub fn config(&self) -> &ExpanderConfig {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    fn pipeline(&self) -> Pipeline<'_> {
        Pipeline {
            resolvers: &self.resolvers,
            config: &self.config,
            metrics: &self.metrics,
        }
    }

    /// Parse both expressions the way [`expand`](Self::expand) does
    pub fn plan(&self, expansion: &str, fields: &str) -> FilterPlan {
        self.pipeline().plan(expansion, fields)
    }

    /// Expand one value
    pub fn expand(&self, node: &Node, expansion: &str, fields: &str) -> Map<String, Value> {
        let pipeline = self.pipeline();
        let plan = pipeline.plan(expansion, fields);
        pipeline.expand(node, &plan)
    }

    /// Expand one host value
    pub fn expand_object<T: ToNode + ?Sized>(
        &self,
        object: &T,
        expansion: &str,
        fields: &str,
    ) -> Map<String, Value> {
        self.expand(&object.to_node(), expansion, fields)
    }

    /// Expand every element of a sequence; any other input gives no elements
    pub fn expand_array(
        &self,
        node: &Node,
        expansion: &str,
        fields: &str,
    ) -> Vec<Map<String, Value>> {
        let pipeline = self.pipeline();
        let plan = pipeline.plan(expansion, fields);
        pipeline.expand_array(node, &plan)
    }

}

/// One-off expansion with default configuration
pub fn expand(
    node: &Node,
    resolvers: &ResolverSet,
    expansion: &str,
    fields: &str,
) -> Map<String, Value> {
    let config = ExpanderConfig::default();
    let metrics = MetricsRegistry::new();
    let pipeline = Pipeline {
        resolvers,
        config: &config,
        metrics: &metrics,
    };
    let plan = pipeline.plan(expansion, fields);
    pipeline.expand(node, &plan)
}

/// One-off array expansion with default configuration
pub fn expand_array(
    node: &Node,
    resolvers: &ResolverSet,
    expansion: &str,
    fields: &str,
) -> Vec<Map<String, Value>> {
    let config = ExpanderConfig::default();
    let metrics = MetricsRegistry::new();
    let pipeline = Pipeline {
        resolvers,
        config: &config,
        metrics: &metrics,
    };
    let plan = pipeline.plan(expansion, fields);
    pipeline.expand_array(node, &plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::StructNode;
    use crate::resolver::{Reference, Resolver};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Resolves `@name` strings to `{"name": name}` and counts batches
    struct EchoResolver {
        batches: Arc<AtomicUsize>,
    }

    impl Resolver for EchoResolver {
        fn name(&self) -> &str {
            "echo"
        }

        fn detect(&self, node: &Node) -> Option<Reference> {
            let id = node.as_str()?.strip_prefix('@')?;
            Some(Reference::new(id, node.clone()))
        }

        fn resolve_batch(&self, references: &[Reference]) -> HashMap<String, Value> {
            self.batches.fetch_add(1, Ordering::SeqCst);
            references
                .iter()
                .filter(|r| r.id != "missing")
                .map(|r| (r.id.clone(), json!({ "name": r.id })))
                .collect()
        }
    }

    fn expander(config: ExpanderConfig) -> (Expander, Arc<AtomicUsize>) {
        let batches = Arc::new(AtomicUsize::new(0));
        let set = ResolverSet::new()
            .with(EchoResolver {
                batches: Arc::clone(&batches),
            })
            .unwrap();
        (Expander::with_config(set, config), batches)
    }

    fn post(author: &str) -> Node {
        StructNode::new()
            .field("title", "hello")
            .field("author", author)
            .build()
    }

    #[test]
    fn test_plan_rules() {
        let plan = FilterPlan::try_parse("*", "").unwrap();
        assert!(plan.recursive);

        let plan = FilterPlan::try_parse("", "").unwrap();
        assert!(plan.recursive);

        let plan = FilterPlan::try_parse("*", "*").unwrap();
        assert!(plan.recursive);

        let plan = FilterPlan::try_parse("*", "S,I").unwrap();
        assert!(!plan.recursive);
        assert!(plan.expansion.contains("S") && plan.expansion.contains("I"));

        let plan = FilterPlan::try_parse("a", "b").unwrap();
        assert!(!plan.recursive);
        assert!(plan.expansion.contains("a"));
        assert!(plan.fields.contains("b"));

        let plan = FilterPlan::try_parse("", "S").unwrap();
        assert!(!plan.recursive);
        assert!(plan.expansion.is_empty());
    }

    #[test]
    fn test_plan_rejects_unbalanced() {
        let err = FilterPlan::try_parse("*,((", "").unwrap_err();
        assert_eq!(err.code(), "EXPANDER_EXPANSION_FILTER_INVALID");

        let err = FilterPlan::try_parse("a", "b)").unwrap_err();
        assert_eq!(err.code(), "EXPANDER_FIELD_FILTER_INVALID");
    }

    #[test]
    fn test_rejected_plan_is_unrestricted_and_counted() {
        let quiet = ExpanderConfig {
            warn_on_invalid_filter: false,
            ..Default::default()
        };
        let (expander, _) = expander(quiet);

        assert_eq!(expander.plan("a(", ""), FilterPlan::unrestricted());
        assert_eq!(expander.plan("a", "b))"), FilterPlan::unrestricted());
        assert_eq!(expander.metrics().snapshot().filters_rejected, 2);

        let plan = expander.plan("*", "title");
        assert!(!plan.recursive);
        assert!(plan.expansion.contains("title"));
        assert_eq!(expander.metrics().snapshot().filters_rejected, 2);
    }

    #[test]
    fn test_expand_resolves_reference() {
        let (expander, batches) = expander(ExpanderConfig::default());
        let map = expander.expand(&post("@ann"), "*", "");

        assert_eq!(Value::Object(map), json!({"title": "hello", "author": {"name": "ann"}}));
        assert_eq!(batches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalid_filter_leaves_reference_raw() {
        let (expander, batches) = expander(ExpanderConfig::default());
        let map = expander.expand(&post("@ann"), "*,((", "");

        assert_eq!(Value::Object(map), json!({"title": "hello", "author": "@ann"}));
        assert_eq!(batches.load(Ordering::SeqCst), 0);
        assert_eq!(expander.metrics().snapshot().filters_rejected, 1);
    }

    #[test]
    fn test_fallback_when_unresolved() {
        let (expander, _) = expander(ExpanderConfig::default());
        let map = expander.expand(&post("@missing"), "author", "");
        assert_eq!(map["author"], "@missing");
        assert_eq!(expander.metrics().snapshot().fallbacks_applied, 1);
    }

    #[test]
    fn test_field_filter_applies_after_resolution() {
        let (expander, _) = expander(ExpanderConfig::default());
        let map = expander.expand(&post("@ann"), "author", "author(name)");
        assert_eq!(Value::Object(map), json!({"author": {"name": "ann"}}));
    }

    #[test]
    fn test_array_independent_and_batched_agree() {
        let items = Node::Seq(vec![post("@a"), post("@b"), post("@c")]);

        let (independent, batches) = expander(ExpanderConfig::default());
        let expected = independent.expand_array(&items, "*", "");
        assert_eq!(expected.len(), 3);
        assert_eq!(batches.load(Ordering::SeqCst), 3);
        assert_eq!(expected[1]["author"], json!({"name": "b"}));

        let (batched, batches) = expander(ExpanderConfig::batched());
        let actual = batched.expand_array(&items, "*", "");
        assert_eq!(actual, expected);
        assert_eq!(batches.load(Ordering::SeqCst), 1);
        assert_eq!(batched.metrics().snapshot().expansions, 3);
    }

    #[test]
    fn test_array_requires_sequence() {
        let (expander, _) = expander(ExpanderConfig::default());
        assert!(expander.expand_array(&post("@a"), "*", "").is_empty());
        assert!(expander.expand_array(&Node::Null, "*", "").is_empty());
    }

    #[test]
    fn test_null_input_gives_empty_map() {
        let (expander, _) = expander(ExpanderConfig::default());
        assert!(expander.expand(&Node::Null, "*", "").is_empty());
    }

    #[test]
    fn test_root_reference_merges() {
        let (expander, _) = expander(ExpanderConfig::default());
        let map = expander.expand(&Node::String("@root".into()), "*", "");
        assert_eq!(Value::Object(map), json!({"name": "root"}));
    }

    #[test]
    fn test_free_functions() {
        let set = ResolverSet::new()
            .with(EchoResolver {
                batches: Arc::new(AtomicUsize::new(0)),
            })
            .unwrap();

        let map = expand(&post("@x"), &set, "", "title");
        assert_eq!(Value::Object(map), json!({"title": "hello"}));

        let list = expand_array(&Node::Seq(vec![post("@x")]), &set, "*", "author");
        assert_eq!(list, vec![json!({"author": {"name": "x"}}).as_object().unwrap().clone()]);
    }

    #[test]
    fn test_metrics_recorded() {
        let (expander, _) = expander(ExpanderConfig::default());
        expander.expand(&post("@a"), "*", "");

        let snapshot = expander.metrics().snapshot();
        assert_eq!(snapshot.expansions, 1);
        assert_eq!(snapshot.tasks_scheduled, 1);
        assert_eq!(snapshot.batch_calls, 1);
        assert_eq!(snapshot.references_resolved, 1);
    }
}
