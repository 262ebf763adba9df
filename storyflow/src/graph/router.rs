//! Routers pick the outgoing edge label of a conditional edge set.

/// Reads state and returns an edge label. Never mutates state.
///
/// Implemented for any `Fn(&S) -> String`, so plain functions and closures
/// can be passed to `StateGraph::add_conditional_edges` directly.
pub trait Router<S>: Send + Sync {
    fn route(&self, state: &S) -> String;
}

impl<S, F> Router<S> for F
where
    F: Fn(&S) -> String + Send + Sync,
{
    fn route(&self, state: &S) -> String {
        self(state)
    }
}
