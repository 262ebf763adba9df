//! Graph registration and compilation errors.
//!
//! `GraphError` is returned eagerly by `StateGraph::add_node`, `set_entry`,
//! `add_edge` and `add_conditional_edges`. `CompilationError` is returned by
//! `StateGraph::compile` and lists every violation found, not just the first.

use std::fmt;

use thiserror::Error;

/// Error when registering nodes, entry or edges on a `StateGraph`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// A node with this name is already registered.
    #[error("node already registered: {0}")]
    DuplicateNode(String),

    /// A referenced node is not registered (and is not `END` where allowed).
    #[error("node not found: {0}")]
    UnknownNode(String),

    /// The node already has an outgoing edge configuration.
    #[error("node already has outgoing routing: {0}")]
    DuplicateEdge(String),

    /// `END` is a terminal marker, not a node.
    #[error("'{0}' is reserved and cannot be registered as a node")]
    ReservedName(String),
}

/// One structural problem found by `StateGraph::compile`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphViolation {
    /// `set_entry` was never called.
    MissingEntry,
    /// The entry names a node that is not registered.
    EntryNotFound(String),
    /// A node reachable from the entry has neither a direct nor a conditional edge.
    NoOutgoingRoute(String),
    /// An edge points at a node that is not registered.
    DanglingTarget { from: String, to: String },
    /// A registered node cannot be reached from the entry.
    Unreachable(String),
}

impl fmt::Display for GraphViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphViolation::MissingEntry => write!(f, "no entry node set"),
            GraphViolation::EntryNotFound(id) => write!(f, "entry node not registered: {}", id),
            GraphViolation::NoOutgoingRoute(id) => {
                write!(f, "node '{}' has no outgoing edge", id)
            }
            GraphViolation::DanglingTarget { from, to } => {
                write!(f, "edge '{}' -> '{}' targets an unknown node", from, to)
            }
            GraphViolation::Unreachable(id) => {
                write!(f, "node '{}' is unreachable from the entry", id)
            }
        }
    }
}

/// Error when compiling a state graph.
///
/// Carries all violations in a deterministic order (entry problems first,
/// then per-node problems sorted by node name).
#[derive(Debug, Error, PartialEq, Eq)]
#[error("graph validation failed: {}", join_violations(.violations))]
pub struct CompilationError {
    pub violations: Vec<GraphViolation>,
}

impl CompilationError {
    /// True when `violation` is among the reported problems.
    pub fn contains(&self, violation: &GraphViolation) -> bool {
        self.violations.contains(violation)
    }
}

fn join_violations(violations: &[GraphViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: CompilationError display lists every violation.
    #[test]
    fn compilation_error_lists_all_violations() {
        let err = CompilationError {
            violations: vec![
                GraphViolation::MissingEntry,
                GraphViolation::NoOutgoingRoute("a".into()),
            ],
        };
        let s = err.to_string();
        assert!(s.contains("no entry node set"), "{}", s);
        assert!(s.contains("node 'a' has no outgoing edge"), "{}", s);
        assert!(err.contains(&GraphViolation::MissingEntry));
    }
}
