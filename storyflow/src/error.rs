//! Run-time error types.
//!
//! Returned by `Node::run` and propagated unmodified out of
//! `CompiledStateGraph::invoke`. Registration and compile-time errors live in
//! `graph::GraphError` and `graph::CompilationError`.

use thiserror::Error;

use crate::store::StoreError;
use crate::truncation::TruncationError;

/// Error raised while a graph is running.
///
/// Node failures (external calls, missing or duplicate entities) and the
/// engine's own routing failures share this type so callers observe one
/// error channel per run. The engine never retries; retry policy belongs to
/// the node that owns the external call.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Execution failed with a message (e.g. a collaborator returned garbage).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// More node invocations were attempted than the caller allowed.
    #[error("recursion limit of {limit} reached without hitting END")]
    RecursionLimitExceeded { limit: usize },

    /// A router returned a label its conditional edge set does not map.
    #[error("router on node '{node}' returned unmapped label '{label}'")]
    UnknownRouteLabel { node: String, label: String },

    /// The entity was required not to exist but was found.
    #[error("{kind} '{name}' already exists")]
    EntityExists { kind: String, name: String },

    /// The entity was required to exist but was not found.
    #[error("{kind} '{name}' does not exist")]
    EntityMissing { kind: String, name: String },

    /// The generative-model provider failed (after the node's own retries).
    #[error("llm call failed: {0}")]
    Llm(String),

    /// A model response could not be parsed into the expected shape.
    #[error("could not parse model output: {0}")]
    Parse(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Truncation(#[from] TruncationError),
}

impl AgentError {
    /// True for errors that indicate a wiring defect rather than a failed step.
    pub fn is_configuration(&self) -> bool {
        matches!(self, AgentError::UnknownRouteLabel { .. })
    }
}
