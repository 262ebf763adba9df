//! Outgoing routing of a node: one direct edge or one conditional edge set.

use std::collections::HashMap;
use std::sync::Arc;

use super::router::Router;

/// Routing configured for a single source node.
///
/// A node carries at most one `Routing`; `StateGraph` rejects a second edge
/// configuration with `GraphError::DuplicateEdge`.
pub enum Routing<S> {
    /// Always continue with `to` (a node id or `END`).
    Direct(String),
    /// Ask `router` for a label and continue with `targets[label]`.
    Conditional {
        router: Arc<dyn Router<S>>,
        targets: HashMap<String, String>,
    },
}

impl<S> Clone for Routing<S> {
    fn clone(&self) -> Self {
        match self {
            Routing::Direct(to) => Routing::Direct(to.clone()),
            Routing::Conditional { router, targets } => Routing::Conditional {
                router: Arc::clone(router),
                targets: targets.clone(),
            },
        }
    }
}

impl<S> Routing<S> {
    /// Every destination this routing can lead to, sorted for stable reporting.
    pub fn targets(&self) -> Vec<&str> {
        match self {
            Routing::Direct(to) => vec![to.as_str()],
            Routing::Conditional { targets, .. } => {
                let mut all: Vec<&str> = targets.values().map(String::as_str).collect();
                all.sort_unstable();
                all.dedup();
                all
            }
        }
    }
}

impl<S> std::fmt::Debug for Routing<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Routing::Direct(to) => f.debug_tuple("Direct").field(to).finish(),
            Routing::Conditional { targets, .. } => f
                .debug_struct("Conditional")
                .field("targets", targets)
                .finish_non_exhaustive(),
        }
    }
}
