//! State graph: named nodes, one entry, direct and conditional edges.
//!
//! Register nodes with `add_node`, pick the first one with `set_entry`, wire
//! each node with exactly one `add_edge` or `add_conditional_edges` (use `END`
//! to terminate), then `compile` to get a `CompiledStateGraph`. The same node
//! catalog can be wired into many differently shaped graphs.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Arc;

use crate::graph::compile_error::{CompilationError, GraphError, GraphViolation};
use crate::graph::compiled::CompiledStateGraph;
use crate::graph::node::Node;
use crate::graph::node_middleware::NodeMiddleware;
use crate::graph::router::Router;
use crate::graph::routing::Routing;

/// Terminal marker: a valid edge destination that ends the run. Not a node.
pub const END: &str = "__end__";

/// State graph under construction.
///
/// Generic over state type `S`. Registration methods validate eagerly and
/// return `&mut Self` so calls chain with `?`:
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use storyflow::graph::{FnNode, StateGraph, END};
/// # fn build() -> Result<(), Box<dyn std::error::Error>> {
/// let mut graph = StateGraph::<i32>::new();
/// graph
///     .add_node("inc", Arc::new(FnNode::new("inc", |n: i32| async move { Ok(n + 1) })))?
///     .set_entry("inc")?
///     .add_edge("inc", END)?;
/// let compiled = graph.compile()?;
/// # Ok(()) }
/// ```
///
/// **Interaction**: Accepts `Arc<dyn Node<S>>` and `Router<S>`; produces `CompiledStateGraph<S>`.
pub struct StateGraph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    entry: Option<String>,
    routes: HashMap<String, Routing<S>>,
    middleware: Option<Arc<dyn NodeMiddleware<S>>>,
}

impl<S> Default for StateGraph<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            entry: None,
            routes: HashMap::new(),
            middleware: None,
        }
    }

    /// Attaches node middleware; the compiled graph wraps every node run with it.
    pub fn with_middleware(self, middleware: Arc<dyn NodeMiddleware<S>>) -> Self {
        Self {
            middleware: Some(middleware),
            ..self
        }
    }

    /// Registers a node under `id`.
    ///
    /// Fails with `DuplicateNode` if `id` is taken and `ReservedName` for `END`.
    pub fn add_node(
        &mut self,
        id: impl Into<String>,
        node: Arc<dyn Node<S>>,
    ) -> Result<&mut Self, GraphError> {
        let id = id.into();
        if id == END {
            return Err(GraphError::ReservedName(id));
        }
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        self.nodes.insert(id, node);
        Ok(self)
    }

    /// Designates the entry node. Fails with `UnknownNode` if not registered.
    pub fn set_entry(&mut self, id: impl Into<String>) -> Result<&mut Self, GraphError> {
        let id = id.into();
        if !self.nodes.contains_key(&id) {
            return Err(GraphError::UnknownNode(id));
        }
        self.entry = Some(id);
        Ok(self)
    }

    /// Adds an unconditional edge `from -> to`. `to` may be `END`.
    pub fn add_edge(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Result<&mut Self, GraphError> {
        let from = from.into();
        let to = to.into();
        self.check_source(&from)?;
        self.check_target(&to)?;
        self.routes.insert(from, Routing::Direct(to));
        Ok(self)
    }

    /// Adds a conditional edge set: after `from` runs, `router` picks a label
    /// that is looked up in `targets` (values are node ids or `END`).
    pub fn add_conditional_edges<R, I, L, T>(
        &mut self,
        from: impl Into<String>,
        router: R,
        targets: I,
    ) -> Result<&mut Self, GraphError>
    where
        R: Router<S> + 'static,
        I: IntoIterator<Item = (L, T)>,
        L: Into<String>,
        T: Into<String>,
    {
        let from = from.into();
        self.check_source(&from)?;
        let targets: HashMap<String, String> = targets
            .into_iter()
            .map(|(label, to)| (label.into(), to.into()))
            .collect();
        let mut sorted: Vec<&String> = targets.values().collect();
        sorted.sort();
        for to in sorted {
            self.check_target(to)?;
        }
        self.routes.insert(
            from,
            Routing::Conditional {
                router: Arc::new(router),
                targets,
            },
        );
        Ok(self)
    }

    fn check_source(&self, from: &str) -> Result<(), GraphError> {
        if !self.nodes.contains_key(from) {
            return Err(GraphError::UnknownNode(from.to_string()));
        }
        if self.routes.contains_key(from) {
            return Err(GraphError::DuplicateEdge(from.to_string()));
        }
        Ok(())
    }

    fn check_target(&self, to: &str) -> Result<(), GraphError> {
        if to != END && !self.nodes.contains_key(to) {
            return Err(GraphError::UnknownNode(to.to_string()));
        }
        Ok(())
    }

    /// Validates the graph and returns an immutable executable handle.
    ///
    /// Checks that the entry exists, every edge target is a node or `END`,
    /// every node reachable from the entry has outgoing routing and every
    /// registered node is reachable. All violations are reported together.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        let violations = self.validate();
        if !violations.is_empty() {
            return Err(CompilationError { violations });
        }
        let entry = self
            .entry
            .ok_or(CompilationError {
                violations: vec![GraphViolation::MissingEntry],
            })?;
        Ok(CompiledStateGraph {
            nodes: self.nodes,
            entry,
            routes: self.routes,
            middleware: self.middleware,
        })
    }

    fn validate(&self) -> Vec<GraphViolation> {
        let mut violations = Vec::new();

        let entry = match &self.entry {
            None => {
                violations.push(GraphViolation::MissingEntry);
                None
            }
            Some(e) if !self.nodes.contains_key(e) => {
                violations.push(GraphViolation::EntryNotFound(e.clone()));
                None
            }
            Some(e) => Some(e.clone()),
        };

        let mut sources: Vec<&String> = self.routes.keys().collect();
        sources.sort();
        for from in sources {
            for to in self.routes[from].targets() {
                if to != END && !self.nodes.contains_key(to) {
                    violations.push(GraphViolation::DanglingTarget {
                        from: from.clone(),
                        to: to.to_string(),
                    });
                }
            }
        }

        let Some(entry) = entry else {
            return violations;
        };

        let mut reached: BTreeSet<String> = BTreeSet::new();
        let mut queue = VecDeque::from([entry]);
        while let Some(id) = queue.pop_front() {
            if !reached.insert(id.clone()) {
                continue;
            }
            if let Some(routing) = self.routes.get(&id) {
                for to in routing.targets() {
                    if to != END && self.nodes.contains_key(to) && !reached.contains(to) {
                        queue.push_back(to.to_string());
                    }
                }
            }
        }

        for id in &reached {
            if !self.routes.contains_key(id) {
                violations.push(GraphViolation::NoOutgoingRoute(id.clone()));
            }
        }

        let mut unreachable: Vec<&String> = self
            .nodes
            .keys()
            .filter(|id| !reached.contains(*id))
            .collect();
        unreachable.sort();
        violations.extend(
            unreachable
                .into_iter()
                .map(|id| GraphViolation::Unreachable(id.clone())),
        );

        violations
    }
}
