//! Execution trace: ordered (node id, resulting state) pairs of one run.
//!
//! Produced by `CompiledStateGraph::invoke_with_trace` for diagnostics; the
//! engine never persists it.

/// One visited node and the state it returned.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceStep<S> {
    pub node_id: String,
    pub state: S,
}

/// Ordered record of every node invocation in a run.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionTrace<S> {
    steps: Vec<TraceStep<S>>,
}

impl<S> Default for ExecutionTrace<S> {
    fn default() -> Self {
        Self { steps: Vec::new() }
    }
}

impl<S> ExecutionTrace<S> {
    pub(crate) fn record(&mut self, node_id: &str, state: S) {
        self.steps.push(TraceStep {
            node_id: node_id.to_string(),
            state,
        });
    }

    /// Node ids in visitation order (repeats included for cycles).
    pub fn node_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.node_id.as_str()).collect()
    }

    pub fn steps(&self) -> &[TraceStep<S>] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// State returned by the last visited node, if any node ran.
    pub fn last_state(&self) -> Option<&S> {
        self.steps.last().map(|s| &s.state)
    }
}
