//! Logging utilities for graph execution.
//!
//! Structured events for graph start/finish, node execution, routing decisions
//! and the recursion-limit breaker. Uses `tracing` when the feature is on.

/// Log graph execution start.
pub fn log_graph_start(entry: &str, recursion_limit: usize) {
    #[cfg(feature = "tracing")]
    tracing::info!(entry = entry, recursion_limit, "Starting graph execution");

    #[cfg(not(feature = "tracing"))]
    eprintln!(
        "[INFO] Starting graph execution: entry={} recursion_limit={}",
        entry, recursion_limit
    );
}

/// Log node execution start.
pub fn log_node_start(node_id: &str, step: usize) {
    #[cfg(feature = "tracing")]
    tracing::debug!(node_id = node_id, step, "Starting node execution");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[DEBUG] Starting node execution: {} (step {})", node_id, step);
}

/// Log node execution completion and the node chosen next.
pub fn log_node_complete(node_id: &str, next: &str) {
    #[cfg(feature = "tracing")]
    tracing::debug!(node_id = node_id, next = next, "Node execution complete");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[DEBUG] Node execution complete: {} -> {}", node_id, next);
}

/// Log a router decision.
pub fn log_route(node_id: &str, label: &str, target: Option<&str>) {
    #[cfg(feature = "tracing")]
    tracing::debug!(node_id = node_id, label = label, ?target, "Route selected");

    #[cfg(not(feature = "tracing"))]
    eprintln!(
        "[DEBUG] Route selected: {} label={} target={:?}",
        node_id, label, target
    );
}

/// Log graph execution completion.
pub fn log_graph_complete(steps: usize) {
    #[cfg(feature = "tracing")]
    tracing::info!(steps, "Graph execution complete");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[INFO] Graph execution complete after {} steps", steps);
}

/// Log graph execution error.
pub fn log_graph_error(error: &crate::error::AgentError) {
    #[cfg(feature = "tracing")]
    tracing::error!(%error, "Graph execution error");

    #[cfg(not(feature = "tracing"))]
    eprintln!("[ERROR] Graph execution error: {}", error);
}
